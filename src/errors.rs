/// Failures raised by the pricing models.
/// Models fail fast: no partial results, no retries, no clamping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("degenerate lattice: risk-neutral probability q = {q} outside (0, 1) at {steps} steps")]
    DegenerateModel { q: f64, steps: usize },

    #[error("lattice produced a non-finite price at {steps} steps")]
    NonFinitePrice { steps: usize },

    #[error("parameters not set: update() must be called before pricing")]
    ParametersNotSet,
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Application-level errors (config, rate feed, HTTP surface).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate feed error: {0}")]
    RateFeed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Parse(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
