use crate::config::AppConfig;
use crate::errors::{PricingError, PricingResult};
use crate::feeds::treasury_api::TreasuryClient;
use std::str::FromStr;
use std::sync::Arc;

// ── Pricing inputs ──

/// The five market inputs of a European option.
///
/// Stored verbatim: construction never clamps or rejects. Models call
/// [`ParameterSet::validate`] before consuming a set, so an invalid set
/// can exist but can never be priced.
///
/// Copy, immutable once built. Replace the whole value to change it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ParameterSet {
    /// Current price of the underlying (S)
    pub spot: f64,
    /// Exercise price (K)
    pub strike: f64,
    /// Years until expiration (T)
    pub time_to_expiry: f64,
    /// Continuously-compounded annual rate (r), any sign
    pub risk_free_rate: f64,
    /// Annualized std dev of log-returns (v)
    pub volatility: f64,
}

impl ParameterSet {
    #[inline]
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
        }
    }

    /// S, K, T, v must be finite and strictly positive; r must be finite.
    pub fn validate(&self) -> PricingResult<()> {
        require_positive("spot", self.spot)?;
        require_positive("strike", self.strike)?;
        require_positive("time_to_expiry", self.time_to_expiry)?;
        require_positive("volatility", self.volatility)?;
        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::InvalidParameter {
                name: "risk_free_rate",
                value: self.risk_free_rate,
                reason: "must be finite",
            });
        }
        Ok(())
    }

    #[inline]
    pub fn sqrt_time(&self) -> f64 {
        self.time_to_expiry.sqrt()
    }

    #[inline]
    pub fn sigma_sqrt_t(&self) -> f64 {
        self.volatility * self.sqrt_time()
    }

    /// e^(-rT)
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiry).exp()
    }

    /// Copy of this set with a single field replaced.
    pub fn with_value(&self, axis: SweepAxis, value: f64) -> Self {
        let mut next = *self;
        match axis {
            SweepAxis::Spot => next.spot = value,
            SweepAxis::Strike => next.strike = value,
            SweepAxis::TimeToExpiry => next.time_to_expiry = value,
            SweepAxis::RiskFreeRate => next.risk_free_rate = value,
            SweepAxis::Volatility => next.volatility = value,
        }
        next
    }
}

#[inline]
fn require_positive(name: &'static str, value: f64) -> PricingResult<()> {
    // NaN fails the comparison and is rejected here too
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}

/// One of the five inputs, used to drive a parameter sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    Spot,
    Strike,
    TimeToExpiry,
    RiskFreeRate,
    Volatility,
}

impl std::fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spot => write!(f, "spot"),
            Self::Strike => write!(f, "strike"),
            Self::TimeToExpiry => write!(f, "time_to_expiry"),
            Self::RiskFreeRate => write!(f, "risk_free_rate"),
            Self::Volatility => write!(f, "volatility"),
        }
    }
}

// ── Pricing outputs ──

/// Call and put price for one parameter set. Produced fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PriceResult {
    pub call: f64,
    pub put: f64,
}

/// Which model a facade dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Analytic,
    Lattice,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Analytic, ModelKind::Lattice];
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analytic => write!(f, "analytic"),
            Self::Lattice => write!(f, "lattice"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analytic" | "black-scholes" | "bs" => Ok(Self::Analytic),
            "lattice" | "binomial" | "crr" => Ok(Self::Lattice),
            other => Err(format!("unknown model: {other}")),
        }
    }
}

// ── Shared application state (HTTP handlers) ──

/// Read-only after startup. Handlers never share a ParameterSet:
/// every request builds its own facade.
pub struct AppState {
    pub config: AppConfig,
    pub treasury: Option<TreasuryClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let treasury = config
            .alpha_vantage_api_key
            .as_deref()
            .map(|key| TreasuryClient::new(&config.alpha_vantage_base_url, key));
        Arc::new(Self { config, treasury })
    }
}
