use super::UnitContext;
use crate::costing::{power_law_cost, record, CostIndex};
use crate::error::MethforgeError;
use crate::selection::FurnaceSelection;
use methforge_schemas::equipment::EquipmentClass;

/// Start-up furnace of fixed duty. Has no streams; when the policy rules it out
/// nothing is emitted.
///
/// # Errors
///
/// Returns `MethforgeError::MissingProperty` if the furnace cost record is missing.
pub fn attach(ctx: &mut UnitContext<'_>) -> Result<(), MethforgeError> {
    if ctx.selections.furnace == FurnaceSelection::Off {
        log::debug!("Furnace excluded");
        return Ok(());
    }
    let furnace = record(&ctx.tables.equipment, EquipmentClass::CylindricalFurnace)?;
    let ratio = CostIndex::from_2007(&ctx.params.economics).ratio();
    let cost = power_law_cost(furnace, ctx.params.furnace.duty, 1.0, ratio);
    let capex = ctx.defined("furnace.capex", cost.into())?;
    let indicator = ctx.selections.furnace.indicator();
    ctx.costs.record("furnace", Some(capex), None, indicator);
    Ok(())
}
