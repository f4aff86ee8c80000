use super::UnitContext;
use crate::costing::{power_law_cost_expr, record, CostIndex};
use crate::error::MethforgeError;
use crate::model::Expr;
use crate::network::{StreamId, UnitId};
use methforge_schemas::{component::ComponentId, equipment::EquipmentClass};
use std::f64::consts::PI;

const UNIT: UnitId = UnitId::Separator;
const M_TO_IN: f64 = 39.37;
const LB_TO_KG: f64 = 2.205;

/// Knock-out drum after the air cooler: condensed water leaves as stream 20, the
/// dry methane product as stream 10.
///
/// The vertical vessel is sized from the liquid hold-up (diameter from residence
/// time, height four diameters) and costed on its shell weight.
///
/// # Errors
///
/// Returns a `MethforgeError` if the vessel cost record is missing or the network
/// refuses an output.
pub fn attach(ctx: &mut UnitContext<'_>) -> Result<(), MethforgeError> {
    let p = ctx.params.separator.clone();
    for c in ComponentId::ALL {
        let inlet = ctx.network.x(StreamId::COOLER_OUTLET, c);
        let (liquid, gas) = if c == ComponentId::H2o {
            (inlet, Expr::zero())
        } else {
            (Expr::zero(), inlet)
        };
        ctx.network
            .define_output(ctx.builder, UNIT, StreamId::CONDENSATE, c, liquid)?;
        ctx.network.define_output(ctx.builder, UNIT, StreamId::DRY_GAS, c, gas)?;
    }

    let water = ctx.network.x(StreamId::COOLER_OUTLET, ComponentId::H2o);
    let diameter = ctx.defined(
        "separator.diameter",
        (water * (2.0 * 18.0 * p.residence_time / (1000.0 * PI))).powf(1.0 / 3.0),
    )?;
    let height = ctx.defined("separator.height", diameter * 4.0)?;

    let vessel = *record(&ctx.tables.equipment, EquipmentClass::VerticalVessel)?;
    let weight = ctx.builder.continuous("separator.shell_weight", vessel.s_lower, vessel.s_upper)?;
    let shell = (diameter * M_TO_IN + p.wall_thickness)
        * (height * M_TO_IN + diameter * (0.8 * M_TO_IN))
        * (PI * p.wall_thickness * p.shell_density / LB_TO_KG);
    ctx.builder.equal("separator.shell_weight.def", weight, shell)?;

    let ratio = CostIndex::from_2007(&ctx.params.economics).ratio();
    let capex = ctx.defined("separator.capex", power_law_cost_expr(&vessel, weight, 1.0, ratio))?;
    ctx.costs.record("separator", Some(capex), None, Expr::one());
    log::debug!("Attached separator");
    Ok(())
}
