use crate::errors::PricingResult;
use crate::models::PricingModel;
use crate::state::{ParameterSet, PriceResult};
use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes-Merton closed form for European options, no dividend yield.
///
/// d1 = (ln(S/K) + (r + v^2/2)*T) / (v * sqrt(T))
/// d2 = d1 - v * sqrt(T)
/// call = S*Phi(d1) - K*e^(-rT)*Phi(d2)
/// put  = K*e^(-rT)*Phi(-d2) - S*Phi(-d1)
///
/// Put-call parity (call - put = S - K*e^(-rT)) holds by construction.
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    /// The d1/d2 terms of the closed form.
    pub fn d1_d2(&self, params: &ParameterSet) -> PricingResult<(f64, f64)> {
        params.validate()?;
        Ok(d1_d2_unchecked(params))
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn d1_d2_unchecked(p: &ParameterSet) -> (f64, f64) {
    let sigma_sqrt_t = p.sigma_sqrt_t();
    let d1 = ((p.spot / p.strike).ln()
        + (p.risk_free_rate + 0.5 * p.volatility * p.volatility) * p.time_to_expiry)
        / sigma_sqrt_t;
    (d1, d1 - sigma_sqrt_t)
}

impl PricingModel for BlackScholes {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn price(&self, params: &ParameterSet) -> PricingResult<PriceResult> {
        params.validate()?;

        let (d1, d2) = d1_d2_unchecked(params);
        let pv_strike = params.strike * params.discount_factor();

        let call = params.spot * self.normal.cdf(d1) - pv_strike * self.normal.cdf(d2);
        let put = pv_strike * self.normal.cdf(-d2) - params.spot * self.normal.cdf(-d1);

        Ok(PriceResult { call, put })
    }
}
