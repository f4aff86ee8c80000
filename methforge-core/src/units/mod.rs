//! Unit blocks. Each block reads its inlet flows from the stream network, emits its
//! sizing, physics and cost constraints, and defines exactly the outputs the
//! definition table assigns to it.

pub mod air_cooler;
pub mod air_intake;
pub mod dfm;
pub mod electrolysis;
pub mod furnace;
pub mod separator;
pub mod steam;
pub mod tvsa;

use crate::config::{DesignPins, Numerics};
use crate::error::MethforgeError;
use crate::heat::SteamTable;
use crate::model::{Expr, ModelBuilder, VarId};
use crate::network::StreamNetwork;
use crate::selection::Selections;
use methforge_schemas::{parameters::PlantParameters, tables::PropertyTables};
use serde::Serialize;

/// Everything a unit block may read or extend while it attaches itself.
pub struct UnitContext<'a> {
    pub builder: &'a mut ModelBuilder,
    pub network: &'a mut StreamNetwork,
    pub selections: &'a Selections,
    pub tables: &'a PropertyTables,
    pub params: &'a PlantParameters,
    pub pins: &'a DesignPins,
    pub numerics: &'a Numerics,
    pub steam: &'a dyn SteamTable,
    pub costs: &'a mut CostLedger,
}

impl UnitContext<'_> {
    /// Declares `name` as a non-negative quantity defined by `value`.
    ///
    /// # Errors
    ///
    /// Propagates builder errors.
    pub fn defined(&mut self, name: &str, value: Expr) -> Result<VarId, MethforgeError> {
        let id = self.builder.non_negative(name)?;
        self.builder.equal(format!("{name}.def"), id, value)?;
        Ok(id)
    }

    /// Declares `name` on `[lower, upper]`, fixed to `pin` when one is configured.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::InvalidBounds` if the pin lies outside the bounds.
    pub fn pinned_integer(&mut self, name: &str, lower: f64, upper: f64, pin: Option<f64>) -> Result<VarId, MethforgeError> {
        let id = self.builder.integer(name, lower, upper)?;
        if let Some(value) = pin {
            self.builder.pin(format!("{name}.pin"), id, value)?;
            self.builder.set_initial(id, value)?;
        }
        Ok(id)
    }

    /// Same as [`Self::pinned_integer`] for a continuous quantity.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::InvalidBounds` if the pin lies outside the bounds.
    pub fn pinned_continuous(&mut self, name: &str, lower: f64, upper: f64, pin: Option<f64>) -> Result<VarId, MethforgeError> {
        let id = self.builder.continuous(name, lower, upper)?;
        if let Some(value) = pin {
            self.builder.pin(format!("{name}.pin"), id, value)?;
            self.builder.set_initial(id, value)?;
        }
        Ok(id)
    }

    pub fn operating_hours(&self) -> f64 {
        self.params.economics.operating_hours
    }

    /// $/kWh
    pub fn electricity_price(&self) -> f64 {
        self.params.economics.electricity_price
    }

    pub fn log_epsilon(&self) -> f64 {
        self.numerics.log_epsilon
    }
}

/// Cost variables of one unit and the indicator that includes it in the plant totals.
#[derive(Debug, Clone, Serialize)]
pub struct CostEntry {
    pub unit: String,
    pub capex: Option<VarId>,
    pub opex: Option<VarId>,
    #[serde(skip)]
    pub indicator: Expr,
}

/// Unit costs collected while the blocks attach, summed by the economics block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CostLedger {
    entries: Vec<CostEntry>,
}

impl CostLedger {
    pub fn record(&mut self, unit: impl Into<String>, capex: Option<VarId>, opex: Option<VarId>, indicator: Expr) {
        let unit = unit.into();
        log::debug!(
            "Cost entry '{unit}' (capex: {}, opex: {})",
            capex.is_some(),
            opex.is_some()
        );
        self.entries.push(CostEntry {
            unit,
            capex,
            opex,
            indicator,
        });
    }

    pub fn entries(&self) -> &[CostEntry] {
        &self.entries
    }

    /// `Σ capex·indicator`, before annualisation.
    pub fn capex_expr(&self) -> Expr {
        Expr::sum(
            self.entries
                .iter()
                .filter_map(|e| e.capex.map(|c| c * e.indicator.clone())),
        )
    }

    /// `Σ opex·indicator`, $/year.
    pub fn opex_expr(&self) -> Expr {
        Expr::sum(
            self.entries
                .iter()
                .filter_map(|e| e.opex.map(|o| o * e.indicator.clone())),
        )
    }
}
