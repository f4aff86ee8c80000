use super::UnitContext;
use crate::error::MethforgeError;
use crate::model::{Expr, VarId};
use crate::network::{StreamId, UnitId};
use crate::physics::ReactionModel;
use methforge_schemas::{component::ComponentId, technology::ElectrolyzerType};

/// Attaches every candidate electrolyzer and retires the rest.
///
/// Each candidate splits its water feed, routes the hydrogen to its hydrogen stream
/// and everything else to its vent. Electricity is charged per kmol of hydrogen at
/// the technology's specific energy, capital per kW of stack.
///
/// Returns the temperature (°C) of the hydrogen delivered to the capture route.
///
/// # Errors
///
/// Returns a `MethforgeError` if a candidate has no property record or the network
/// refuses one of its outputs.
pub fn attach(ctx: &mut UnitContext<'_>) -> Result<VarId, MethforgeError> {
    let reaction = ReactionModel::electrolysis(ctx.params.electrolysis.conversion);
    let economics = &ctx.params.economics;
    let (kj_price, water_cost, hours) = (
        economics.electricity_price_per_kj(),
        economics.water_cost,
        economics.operating_hours,
    );

    for kind in ElectrolyzerType::ALL {
        let unit = UnitId::Electrolyzer(kind);
        if !ctx.selections.electrolyzer.is_candidate(kind) {
            ctx.network.retire_unit(ctx.builder, unit)?;
            continue;
        }
        let record = *ctx
            .tables
            .electrolyzers
            .get(kind)
            .ok_or_else(|| MethforgeError::MissingProperty {
                kind: "electrolyzer",
                key: kind.label().to_string(),
            })?;
        let feed = StreamId::electrolyzer_feed(kind);
        let hydrogen = StreamId::electrolyzer_hydrogen(kind);
        let vent = StreamId::electrolyzer_vent(kind);

        for c in ComponentId::ALL {
            let outlet = reaction.outlet_expr(ctx.network, feed, c);
            let (to_hydrogen, to_vent) = if c == ComponentId::H2 {
                (outlet, Expr::zero())
            } else {
                (Expr::zero(), outlet)
            };
            ctx.network.define_output(ctx.builder, unit, hydrogen, c, to_hydrogen)?;
            ctx.network.define_output(ctx.builder, unit, vent, c, to_vent)?;
        }

        let h2 = ctx.network.x(hydrogen, ComponentId::H2);
        let opex = ctx.defined(
            &format!("{unit}.opex"),
            (h2.clone() * (kj_price * record.unit_energy) + ctx.network.x(feed, ComponentId::H2o) * water_cost) * hours,
        )?;
        let capex = ctx.defined(
            &format!("{unit}.capex"),
            h2 * (record.unit_energy * record.specific_capex / 3600.0),
        )?;
        ctx.costs.record(unit.to_string(), Some(capex), Some(opex), Expr::one());
        log::debug!("Attached {unit}");
    }

    let electrolyzers = &ctx.tables.electrolyzers;
    let delivered = ctx.selections.electrolyzer.blend(|kind| {
        Expr::constant(electrolyzers.get(kind).map_or(0.0, |r| r.operating_temperature))
    });
    let temperature = ctx.defined("hydrogen.temperature", delivered)?;
    Ok(temperature)
}
