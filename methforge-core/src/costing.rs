//! Purchased-equipment cost correlations and cost-index escalation.

use crate::error::MethforgeError;
use crate::model::Expr;
use methforge_schemas::{
    equipment::{EquipmentClass, EquipmentCostTable, SizeCostRecord},
    fan::FanCostPolynomial,
    parameters::Economics,
};
use serde::{Deserialize, Serialize};

/// m3/s to actual cubic feet per minute.
pub const M3S_TO_ACFM: f64 = 2118.88;

/// Escalation between two cost-index years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostIndex {
    pub basis: f64,
    pub current: f64,
}

impl CostIndex {
    pub fn ratio(&self) -> f64 {
        self.current / self.basis
    }

    /// Towler & Sinnott correlations are quoted in 2007 dollars.
    pub fn from_2007(economics: &Economics) -> Self {
        Self {
            basis: economics.cepci_2007,
            current: economics.cepci_2023,
        }
    }

    /// Seider et al. correlations are quoted in 2013 dollars.
    pub fn from_2013(economics: &Economics) -> Self {
        Self {
            basis: economics.cepci_2013,
            current: economics.cepci_2023,
        }
    }
}

/// `(a + b·size^n)·count·ratio`.
///
/// Sizes outside `[s_lower, s_upper]` are extrapolated; use
/// [`SizeCostRecord::contains`] to flag them in reports.
pub fn power_law_cost(record: &SizeCostRecord, size: f64, count: f64, ratio: f64) -> f64 {
    (record.a + record.b * size.powf(record.n)) * count * ratio
}

/// Expression form of [`power_law_cost`] for a sized and counted unit.
pub fn power_law_cost_expr(record: &SizeCostRecord, size: impl Into<Expr>, count: impl Into<Expr>, ratio: f64) -> Expr {
    (record.a + record.b * size.into().powf(record.n)) * count.into() * ratio
}

/// Looks up the correlation for `class`.
///
/// # Errors
///
/// Returns `MethforgeError::MissingProperty` when the table has no such record.
pub fn record(table: &EquipmentCostTable, class: EquipmentClass) -> Result<&SizeCostRecord, MethforgeError> {
    table.get(class).ok_or_else(|| MethforgeError::MissingProperty {
        kind: "equipment",
        key: format!("{class:?}"),
    })
}

/// Purchased cost of one bare fan handling `flow` m3/s, 2013 dollars.
pub fn fan_purchase_cost(poly: &FanCostPolynomial, flow: f64) -> f64 {
    let q = flow * M3S_TO_ACFM;
    poly.cubic * q.powi(3) + poly.quadratic * q.powi(2) + poly.linear * q + poly.constant
}

pub fn fan_purchase_cost_expr(poly: &FanCostPolynomial, flow: impl Into<Expr>) -> Expr {
    let q = flow.into() * M3S_TO_ACFM;
    poly.cubic * q.clone().powf(3.0) + poly.quadratic * q.clone().powf(2.0) + poly.linear * q + poly.constant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VarId;
    use approx::assert_relative_eq;
    use methforge_schemas::fan::{FanTable, FanType};

    #[test]
    fn reactor_cost_at_lower_bound() {
        let table = EquipmentCostTable::reference();
        let reactor = record(&table, EquipmentClass::Reactor).unwrap();
        let ratio = CostIndex::from_2007(&Economics::default()).ratio();
        let expected = (53000.0 + 28000.0 * 0.5_f64.powf(0.8)) * ratio * 16.0;
        assert_relative_eq!(power_law_cost(reactor, 0.5, 16.0, ratio), expected, max_relative = 1e-12);
        assert!(reactor.contains(0.5));
        assert!(!reactor.contains(120.0));
    }

    #[test]
    fn expression_matches_numeric_cost() {
        let table = EquipmentCostTable::reference();
        let vessel = record(&table, EquipmentClass::VerticalVessel).unwrap();
        let (s, n) = (VarId::new(0), VarId::new(1));
        let e = power_law_cost_expr(vessel, s, n, 1.5);
        assert_relative_eq!(e.eval(&[900.0, 2.0]), power_law_cost(vessel, 900.0, 2.0, 1.5), max_relative = 1e-12);
    }

    #[test]
    fn vane_axial_fan_cost_uses_acfm() {
        let fans = FanTable::reference();
        let poly = &fans.get(FanType::VaneAxial).unwrap().cost;
        let q = 10.0 * M3S_TO_ACFM;
        let expected = 8e-14 * q.powi(3) + 2e-8 * q.powi(2) + 0.1562 * q + 1042.9;
        assert_relative_eq!(fan_purchase_cost(poly, 10.0), expected, max_relative = 1e-12);
        let e = fan_purchase_cost_expr(poly, VarId::new(0));
        assert_relative_eq!(e.eval(&[10.0]), expected, max_relative = 1e-12);
    }
}
