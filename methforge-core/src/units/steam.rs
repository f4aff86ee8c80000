//! Waste-heat boiler on the reactor product: cools stream 7 into stream 8 and
//! raises saturated steam at the selected pressure level.

use super::UnitContext;
use crate::costing::{power_law_cost_expr, record, CostIndex};
use crate::error::MethforgeError;
use crate::heat::lmtd_expr;
use crate::model::{Expr, VarId};
use crate::network::{StreamId, UnitId};
use methforge_schemas::{
    component::ComponentId,
    equipment::EquipmentClass,
    technology::{AdsorptionTechnology, SteamLevel},
};

const UNIT: UnitId = UnitId::SteamGenerator;

/// Returns the boiler outlet temperature (°C) seen by the air cooler.
///
/// # Errors
///
/// Returns a `MethforgeError` if a steam level falls outside the steam table, the
/// boiler cost record is missing, or the network refuses an output.
pub fn attach(ctx: &mut UnitContext<'_>) -> Result<VarId, MethforgeError> {
    let steam = ctx.params.steam.clone();
    let (dfm_outlet, tvsa_outlet) = (ctx.params.dfm.outlet_temperature, ctx.params.tvsa.outlet_temperature);
    let temperature_upper = ctx.numerics.temperature_upper_bound;
    let duty_m = ctx.numerics.big_m.duty;
    let epsilon = ctx.log_epsilon();

    let inlet_temperature = ctx.builder.continuous("steam.inlet_temperature", 0.0, temperature_upper)?;
    ctx.builder.set_initial(inlet_temperature, dfm_outlet)?;
    let delivered = ctx.selections.adsorption.weighted(|tech| match tech {
        AdsorptionTechnology::Dfm => dfm_outlet,
        AdsorptionTechnology::Tvsa => tvsa_outlet,
    });
    ctx.builder.equal("steam.inlet_temperature.def", inlet_temperature, delivered)?;

    let outlet_temperature = ctx.builder.continuous("steam.outlet_temperature", 0.0, temperature_upper)?;
    ctx.builder
        .set_initial(outlet_temperature, steam.high_pressure_temperature + steam.min_approach)?;
    let saturation = ctx.selections.steam_level.weighted(|l| steam.saturation_temperature(l));
    ctx.builder.greater_equal(
        "steam.approach",
        outlet_temperature,
        saturation.clone() + steam.min_approach,
    )?;

    let rate = ctx.network.heat_capacity_rate(StreamId::PRODUCT, &ctx.tables.components)?;
    let duty = ctx.defined("steam.duty", rate * (inlet_temperature - outlet_temperature))?;

    let mut level_duties = Vec::new();
    for level in SteamLevel::ALL {
        let raised = StreamId::steam(level);
        if !ctx.selections.steam_level.is_candidate(level) {
            ctx.network
                .define_output(ctx.builder, UNIT, raised, ComponentId::H2o, 0.0)?;
            continue;
        }
        let label = level.label();
        let latent = ctx.steam.properties(steam.saturation_temperature(level))?.latent_heat;
        let level_duty = ctx.builder.non_negative(format!("steam.duty[{label}]"))?;
        ctx.selections.steam_level.gate(
            ctx.builder,
            format!("steam.duty[{label}].gate"),
            level_duty,
            level,
            duty_m,
        )?;
        ctx.network
            .define_output(ctx.builder, UNIT, raised, ComponentId::H2o, Expr::from(level_duty) / latent)?;
        level_duties.push(level_duty);
    }
    ctx.builder.equal("steam.duty.split", duty, Expr::sum(level_duties))?;

    // Product gas passes on to the cooler; raised steam leaves as export.
    for c in ComponentId::ALL {
        let product = ctx.network.x(StreamId::PRODUCT, c);
        ctx.network
            .define_output(ctx.builder, UNIT, StreamId::BOILER_OUTLET, c, product)?;
        for level in SteamLevel::ALL {
            let raised = ctx.network.x(StreamId::steam(level), c);
            ctx.network
                .define_output(ctx.builder, UNIT, StreamId::steam_export(level), c, raised)?;
        }
    }

    let exchanger = *record(&ctx.tables.equipment, EquipmentClass::ShellAndTubeExchanger)?;
    let count = ctx.builder.integer("steam.boiler_count", 1.0, 10.0)?;
    ctx.builder.set_initial(count, 1.0)?;
    let area = ctx.builder.continuous("steam.boiler_area", exchanger.s_lower, exchanger.s_upper)?;
    let driving_force = lmtd_expr(
        Expr::from(inlet_temperature) - saturation.clone(),
        Expr::from(outlet_temperature) - saturation,
        epsilon,
    );
    ctx.builder.equal(
        "steam.boiler_area.def",
        area,
        Expr::from(duty) / (driving_force * steam.boiler_u),
    )?;
    let ratio = CostIndex::from_2007(&ctx.params.economics).ratio();
    let capex = ctx.defined("steam.capex", power_law_cost_expr(&exchanger, area, count, ratio))?;
    ctx.costs.record("boiler", Some(capex), None, Expr::one());
    log::debug!("Attached steam generator");
    Ok(outlet_temperature)
}
