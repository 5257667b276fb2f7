use crate::errors::{PricingError, PricingResult};
use crate::models::PricingModel;
use crate::state::{ParameterSet, PriceResult};

/// Cox-Ross-Rubinstein binomial tree for European options.
///
/// dt = T/N, u = e^(v*sqrt(dt)), d = 1/u
/// q = (e^(r*dt) - d) / (u - d), disc = e^(-r*dt)
///
/// Leaves hold S * d^(N-i) * u^i for i up-moves. Backward induction
/// averages adjacent children and discounts one period per step, with
/// no early-exercise comparison at interior nodes.
///
/// Error vs. the closed form shrinks roughly as O(1/N); cost is O(N^2)
/// time over an O(N) buffer.
pub struct BinomialTree {
    steps: usize,
}

impl BinomialTree {
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl PricingModel for BinomialTree {
    #[inline]
    fn name(&self) -> &'static str {
        "Binomial (CRR)"
    }

    fn price(&self, params: &ParameterSet) -> PricingResult<PriceResult> {
        params.validate()?;

        let n = self.steps;
        if n == 0 {
            return Err(PricingError::InvalidParameter {
                name: "steps",
                value: 0.0,
                reason: "must be >= 1",
            });
        }

        let dt = params.time_to_expiry / n as f64;
        let jump = params.volatility * dt.sqrt();
        let u = jump.exp();
        let d = (-jump).exp();
        let q = ((params.risk_free_rate * dt).exp() - d) / (u - d);

        // q outside (0, 1) would misprice silently; surface it instead
        if !(q > 0.0 && q < 1.0) {
            tracing::debug!(q, steps = n, "rejecting degenerate lattice");
            return Err(PricingError::DegenerateModel { q, steps: n });
        }

        let disc = (-params.risk_free_rate * dt).exp();
        let disc_q = disc * q;
        let disc_1mq = disc * (1.0 - q);

        // Terminal payoffs. Buffers sized once to N+1; the live prefix
        // shrinks by one per backward step.
        let mut calls = vec![0.0_f64; n + 1];
        let mut puts = vec![0.0_f64; n + 1];

        // S * d^(N-i) * u^i = e^(ln S + (2i - N) * jump), per node in log
        // space so d^N never underflows the whole row to zero. Far-down
        // leaves may still round to 0 (put payoff K, exact to rounding);
        // far-up leaves may overflow, which only the call column sees.
        let ln_spot = params.spot.ln();
        let mut calls_finite = true;
        for i in 0..=n {
            let node = (ln_spot + (2.0 * i as f64 - n as f64) * jump).exp();
            calls_finite &= node.is_finite();
            calls[i] = (node - params.strike).max(0.0);
            puts[i] = (params.strike - node).max(0.0);
        }

        // Level i has i+1 live nodes. Reading j+1 before it is overwritten
        // makes the in-place forward sweep safe.
        for i in (0..n).rev() {
            for j in 0..=i {
                puts[j] = disc_q * puts[j + 1] + disc_1mq * puts[j];
            }
            if calls_finite {
                for j in 0..=i {
                    calls[j] = disc_q * calls[j + 1] + disc_1mq * calls[j];
                }
            }
        }

        let put = puts[0];
        let call = if calls_finite {
            calls[0]
        } else {
            // Parity is exact on a European tree: call - put = S - K*disc^N
            tracing::debug!(steps = n, "top leaves overflow, call taken from tree parity");
            put + params.spot - params.strike * params.discount_factor()
        };

        if !(call.is_finite() && put.is_finite()) {
            return Err(PricingError::NonFinitePrice { steps: n });
        }

        Ok(PriceResult { call, put })
    }
}
