use crate::errors::{PricingError, PricingResult};
use crate::models::PricingModel;
use crate::state::{ParameterSet, SweepAxis};

/// One sample of a parameter sweep (plot point).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SweepPoint {
    pub x: f64,
    pub call: f64,
    pub put: f64,
}

/// Price `model` at `points` evenly spaced values of `axis` over
/// [from, to] (both ends included), all other inputs held at `base`.
///
/// Fails on the first point the model rejects; no partial series.
pub fn sweep(
    model: &dyn PricingModel,
    base: &ParameterSet,
    axis: SweepAxis,
    from: f64,
    to: f64,
    points: usize,
) -> PricingResult<Vec<SweepPoint>> {
    if points < 2 {
        return Err(PricingError::InvalidParameter {
            name: "points",
            value: points as f64,
            reason: "must be >= 2",
        });
    }
    if !from.is_finite() {
        return Err(PricingError::InvalidParameter {
            name: "from",
            value: from,
            reason: "must be finite",
        });
    }
    if !to.is_finite() {
        return Err(PricingError::InvalidParameter {
            name: "to",
            value: to,
            reason: "must be finite",
        });
    }

    let step = (to - from) / (points - 1) as f64;
    let mut series = Vec::with_capacity(points);

    for i in 0..points {
        // Pin the last sample to `to` exactly
        let x = if i == points - 1 { to } else { from + step * i as f64 };
        let res = model.price(&base.with_value(axis, x))?;
        series.push(SweepPoint {
            x,
            call: res.call,
            put: res.put,
        });
    }

    tracing::debug!(model = model.name(), %axis, points, "sweep complete");
    Ok(series)
}
