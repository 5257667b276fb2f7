use crate::errors::{PricingError, PricingResult};
use crate::models::binomial::BinomialTree;
use crate::models::black_scholes::BlackScholes;
use crate::models::PricingModel;
use crate::state::{ModelKind, ParameterSet, PriceResult, SweepAxis};
use crate::sweep::{self, SweepPoint};

/// Holds the current parameter set and dispatches to a model.
///
/// No caching: every `price` call recomputes from the current set.
/// One facade per caller; it is not meant to be shared for mutation.
pub struct PricingFacade {
    params: Option<ParameterSet>,
    analytic: BlackScholes,
    lattice: BinomialTree,
}

impl PricingFacade {
    /// Empty facade. Pricing fails until `update` is called.
    pub fn new(lattice_steps: usize) -> Self {
        Self {
            params: None,
            analytic: BlackScholes::new(),
            lattice: BinomialTree::new(lattice_steps),
        }
    }

    pub fn with_params(lattice_steps: usize, params: ParameterSet) -> Self {
        let mut facade = Self::new(lattice_steps);
        facade.params = Some(params);
        facade
    }

    /// Replace all five inputs at once. Values are stored verbatim;
    /// the model validates them when pricing.
    pub fn update(&mut self, spot: f64, strike: f64, t: f64, r: f64, v: f64) {
        self.params = Some(ParameterSet::new(spot, strike, t, r, v));
    }

    pub fn params(&self) -> Option<&ParameterSet> {
        self.params.as_ref()
    }

    pub fn steps(&self) -> usize {
        self.lattice.steps()
    }

    pub fn model(&self, kind: ModelKind) -> &dyn PricingModel {
        match kind {
            ModelKind::Analytic => &self.analytic,
            ModelKind::Lattice => &self.lattice,
        }
    }

    pub fn price(&self, kind: ModelKind) -> PricingResult<PriceResult> {
        let params = self.params.as_ref().ok_or(PricingError::ParametersNotSet)?;
        self.model(kind).price(params)
    }

    /// Series for plotting: vary one input around the current set.
    pub fn sweep(
        &self,
        kind: ModelKind,
        axis: SweepAxis,
        from: f64,
        to: f64,
        points: usize,
    ) -> PricingResult<Vec<SweepPoint>> {
        let params = self.params.as_ref().ok_or(PricingError::ParametersNotSet)?;
        sweep::sweep(self.model(kind), params, axis, from, to, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_before_update_fails() {
        let facade = PricingFacade::new(100);
        assert_eq!(facade.price(ModelKind::Analytic), Err(PricingError::ParametersNotSet));
        assert_eq!(facade.price(ModelKind::Lattice), Err(PricingError::ParametersNotSet));
        assert!(facade
            .sweep(ModelKind::Analytic, SweepAxis::Spot, 1.0, 2.0, 2)
            .is_err());
    }

    #[test]
    fn test_update_replaces_all_fields() {
        let mut facade = PricingFacade::new(100);
        facade.update(42.0, 40.0, 0.5, 0.1, 0.2);
        facade.update(100.0, 95.0, 1.0, 0.03, 0.25);
        assert_eq!(
            facade.params(),
            Some(&ParameterSet::new(100.0, 95.0, 1.0, 0.03, 0.25))
        );
    }

    #[test]
    fn test_dispatches_to_selected_model() {
        let mut facade = PricingFacade::new(1000);
        facade.update(100.0, 100.0, 1.0, 0.05, 0.2);

        assert_eq!(facade.model(ModelKind::Analytic).name(), "Black-Scholes");
        assert_eq!(facade.model(ModelKind::Lattice).name(), "Binomial (CRR)");

        let bs = facade.price(ModelKind::Analytic).unwrap();
        let tree = facade.price(ModelKind::Lattice).unwrap();
        assert_ne!(bs, tree, "models should not share a code path");
        assert!((bs.call - tree.call).abs() < 0.05);
    }

    #[test]
    fn test_recomputes_after_update() {
        let mut facade = PricingFacade::new(200);
        facade.update(100.0, 100.0, 1.0, 0.05, 0.2);
        let before = facade.price(ModelKind::Analytic).unwrap();
        facade.update(120.0, 100.0, 1.0, 0.05, 0.2);
        let after = facade.price(ModelKind::Analytic).unwrap();
        assert!(after.call > before.call);
    }

    #[test]
    fn test_invalid_update_surfaces_on_price() {
        let mut facade = PricingFacade::new(200);
        facade.update(100.0, 100.0, 0.0, 0.05, 0.2);
        for kind in ModelKind::ALL {
            assert!(matches!(
                facade.price(kind),
                Err(PricingError::InvalidParameter { name: "time_to_expiry", .. })
            ));
        }
    }

    #[test]
    fn test_sweep_uses_current_params() {
        let facade = PricingFacade::with_params(100, ParameterSet::new(100.0, 100.0, 1.0, 0.05, 0.2));
        let series = facade
            .sweep(ModelKind::Lattice, SweepAxis::Spot, 90.0, 110.0, 3)
            .unwrap();
        let mid = facade.price(ModelKind::Lattice).unwrap();
        assert_eq!(series.len(), 3);
        assert!((series[1].call - mid.call).abs() < 1e-12);
    }
}
