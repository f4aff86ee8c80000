//! Annualised plant economics and the objective.
//!
//! Unit blocks register their capital and operating cost variables in the
//! [`CostLedger`]; this block sums them under their selection indicators,
//! prices the product and exported steam, and closes the model with
//! `TAC = CAPEX + OPEX − Profit`.

use crate::error::MethforgeError;
use crate::heat::SteamPrices;
use crate::model::{Expr, ModelBuilder, VarId};
use crate::network::{property, StreamId, StreamNetwork};
use crate::units::CostLedger;
use methforge_schemas::{
    component::{ComponentId, ComponentTable},
    parameters::Economics,
    technology::SteamLevel,
};
use serde::Serialize;

/// Annualised capital charge ratio `i(1+i)^n/((1+i)^n − 1)`.
///
/// At zero interest the ratio is straight-line, `1/n`.
pub fn annualized_capital(interest_rate: f64, years: f64) -> f64 {
    if interest_rate.abs() < 1e-12 {
        return 1.0 / years;
    }
    let growth = (1.0 + interest_rate).powf(years);
    interest_rate * growth / (growth - 1.0)
}

/// Model variables of the economic totals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EconomicVariables {
    pub tac: VarId,
    pub capex: VarId,
    pub opex: VarId,
    pub profit: VarId,
    pub product_revenue: VarId,
    pub steam_revenue: VarId,
}

/// Emits the totals, the TAC relation and the objective.
///
/// # Errors
///
/// Returns a `MethforgeError` if a component has no property record or a name
/// is already taken.
pub fn attach(
    builder: &mut ModelBuilder,
    network: &StreamNetwork,
    components: &ComponentTable,
    economics: &Economics,
    steam_prices: &SteamPrices,
    ledger: &CostLedger,
) -> Result<EconomicVariables, MethforgeError> {
    let accr = annualized_capital(economics.interest_rate, economics.plant_life_years);
    let hours = economics.operating_hours;

    let capex = builder.free("economics.capex")?;
    builder.equal("economics.capex.def", capex, ledger.capex_expr() * accr)?;
    let opex = builder.free("economics.opex")?;
    builder.equal("economics.opex.def", opex, ledger.opex_expr())?;

    let mut sales = Vec::with_capacity(ComponentId::COUNT);
    for c in ComponentId::ALL {
        sales.push(network.x(StreamId::PRODUCT, c) * property(components, c)?.price);
    }
    let product_revenue = builder.free("economics.product_revenue")?;
    builder.equal("economics.product_revenue.def", product_revenue, Expr::sum(sales) * hours)?;

    let exported = Expr::sum(
        SteamLevel::ALL
            .into_iter()
            .map(|l| network.x(StreamId::steam(l), ComponentId::H2o) * steam_prices.price(l)),
    );
    let steam_revenue = builder.free("economics.steam_revenue")?;
    builder.equal("economics.steam_revenue.def", steam_revenue, exported * hours)?;

    let profit = builder.free("economics.profit")?;
    builder.equal("economics.profit.def", profit, product_revenue + steam_revenue)?;

    let tac = builder.free("economics.tac")?;
    builder.equal("economics.tac", tac, capex + opex - profit)?;
    builder.minimize(tac);
    log::info!("Economics attached: ACCR = {accr:.6}, {} cost entries", ledger.entries().len());

    Ok(EconomicVariables {
        tac,
        capex,
        opex,
        profit,
        product_revenue,
        steam_revenue,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitEconomics {
    pub name: String,
    /// Installed cost, $ (not annualised).
    pub capex: f64,
    /// $/year
    pub opex: f64,
    pub selected: bool,
}

/// Economic totals read back from a solution, $/year unless noted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EconomicSummary {
    pub tac: f64,
    pub capex: f64,
    pub opex: f64,
    pub profit: f64,
    pub product_revenue: f64,
    pub steam_revenue: f64,
    pub units: Vec<UnitEconomics>,
}

impl EconomicSummary {
    pub fn from_point(vars: &EconomicVariables, ledger: &CostLedger, point: &[f64]) -> Self {
        let value = |id: VarId| point.get(id.index()).copied().unwrap_or(f64::NAN);
        let units = ledger
            .entries()
            .iter()
            .map(|e| UnitEconomics {
                name: e.unit.clone(),
                capex: e.capex.map_or(0.0, value),
                opex: e.opex.map_or(0.0, value),
                selected: e.indicator.eval(point) > 0.5,
            })
            .collect();
        Self {
            tac: value(vars.tac),
            capex: value(vars.capex),
            opex: value(vars.opex),
            profit: value(vars.profit),
            product_revenue: value(vars.product_revenue),
            steam_revenue: value(vars.steam_revenue),
            units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn capital_charge_at_eight_percent_over_twenty_years() {
        assert_relative_eq!(annualized_capital(0.08, 20.0), 0.10185220882315059, epsilon = 1e-9);
    }

    #[test]
    fn zero_interest_is_straight_line() {
        assert_relative_eq!(annualized_capital(0.0, 25.0), 0.04);
        // The reference rate is tiny but non-zero; it must still land near 1/n.
        assert_relative_eq!(annualized_capital(1.2e-8, 25.0), 0.04, max_relative = 1e-6);
    }

    #[test]
    fn summary_reads_selected_units() {
        let mut builder = ModelBuilder::new("t");
        let y = builder.binary("y").unwrap();
        let capex = builder.non_negative("c").unwrap();
        let mut ledger = CostLedger::default();
        ledger.record("boiler", Some(capex), None, Expr::one());
        ledger.record("dfm", Some(capex), None, Expr::Var(y));
        let vars = EconomicVariables {
            tac: capex,
            capex,
            opex: capex,
            profit: capex,
            product_revenue: capex,
            steam_revenue: capex,
        };
        let summary = EconomicSummary::from_point(&vars, &ledger, &[0.0, 120.0]);
        assert_eq!(summary.units.len(), 2);
        assert!(summary.units[0].selected);
        assert!(!summary.units[1].selected);
        assert_relative_eq!(summary.units[1].capex, 120.0);
        assert_relative_eq!(summary.units[0].opex, 0.0);
    }
}
