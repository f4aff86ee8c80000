use crate::model::Expr;
use crate::network::{StreamId, StreamNetwork};
use methforge_schemas::component::{ComponentId, ComponentVector};

/// A single reaction with fixed conversion of its key component:
/// `out[c] = in[c] + ν[c]·X·in[key]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionModel {
    pub name: &'static str,
    pub stoichiometry: ComponentVector,
    pub key: ComponentId,
    pub conversion: f64,
}

impl ReactionModel {
    /// H2O → H2 + ½ O2
    pub fn electrolysis(conversion: f64) -> Self {
        Self {
            name: "electrolysis",
            stoichiometry: ComponentVector {
                h2: 1.0,
                h2o: -1.0,
                o2: 0.5,
                ..ComponentVector::default()
            },
            key: ComponentId::H2o,
            conversion,
        }
    }

    /// CO2 + 4 H2 → CH4 + 2 H2O
    pub fn methanation(conversion: f64) -> Self {
        Self {
            name: "methanation",
            stoichiometry: ComponentVector {
                co2: -1.0,
                h2: -4.0,
                ch4: 1.0,
                h2o: 2.0,
                ..ComponentVector::default()
            },
            key: ComponentId::Co2,
            conversion,
        }
    }

    pub fn apply(&self, inlet: &ComponentVector) -> ComponentVector {
        let extent = self.conversion * inlet[self.key];
        ComponentVector::from_fn(|c| inlet[c] + self.stoichiometry[c] * extent)
    }

    /// Outlet flow of `component` for the reactor fed by `inlet`.
    pub fn outlet_expr(&self, network: &StreamNetwork, inlet: StreamId, component: ComponentId) -> Expr {
        network.x(inlet, component) + network.x(inlet, self.key) * (self.stoichiometry[component] * self.conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn methanation_conserves_carbon() {
        let inlet = ComponentVector {
            co2: 26.0,
            h2: 104.0,
            ..ComponentVector::default()
        };
        let out = ReactionModel::methanation(1.0).apply(&inlet);
        assert_relative_eq!(out.co2 + out.ch4, inlet.co2 + inlet.ch4, max_relative = 1e-12);
        assert_relative_eq!(out.co2, 0.0);
        assert_relative_eq!(out.h2, 0.0);
        assert_relative_eq!(out.h2o, 52.0);
    }

    #[test]
    fn electrolysis_splits_water() {
        let inlet = ComponentVector {
            h2o: 104.0,
            ..ComponentVector::default()
        };
        let out = ReactionModel::electrolysis(1.0).apply(&inlet);
        assert_relative_eq!(out.h2, 104.0);
        assert_relative_eq!(out.o2, 52.0);
        assert_relative_eq!(out.h2o, 0.0);
    }

    #[test]
    fn partial_conversion_leaves_key_component() {
        let inlet = ComponentVector {
            co2: 10.0,
            h2: 40.0,
            ..ComponentVector::default()
        };
        let out = ReactionModel::methanation(0.8).apply(&inlet);
        assert_relative_eq!(out.co2, 2.0, max_relative = 1e-12);
        assert_relative_eq!(out.ch4, 8.0, max_relative = 1e-12);
    }
}
