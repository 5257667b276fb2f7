pub mod binomial;
pub mod black_scholes;

use crate::errors::PricingResult;
use crate::state::{ParameterSet, PriceResult};

/// All pricing models implement this trait.
/// price() must be a pure function: deterministic output from inputs only,
/// never mutating the parameter set.
/// Send + Sync required for use across tokio tasks.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// European call and put for the given inputs.
    /// Validates the set first; an invalid set never reaches the math.
    fn price(&self, params: &ParameterSet) -> PricingResult<PriceResult>;
}
