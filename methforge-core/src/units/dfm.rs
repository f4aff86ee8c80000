//! Dual-function material route: monolith beds that capture CO2 from air and
//! methanate it in place when hot hydrogen is passed over them.

use super::UnitContext;
use crate::costing::{power_law_cost_expr, record, CostIndex};
use crate::error::MethforgeError;
use crate::model::Expr;
use crate::network::{CaptureRoute, UnitId};
use crate::physics::{adsorption::uptake_expr, MonolithBed, ReactionModel};
use methforge_schemas::{component::ComponentId, equipment::EquipmentClass, technology::AdsorptionTechnology};
use std::f64::consts::PI;

const TECH: AdsorptionTechnology = AdsorptionTechnology::Dfm;

/// # Errors
///
/// Returns a `MethforgeError` if a pin lies outside its variable's bounds, the
/// reactor cost record is missing, or the network refuses an output.
pub fn attach(ctx: &mut UnitContext<'_>, available_head: &Expr) -> Result<(), MethforgeError> {
    let adsorber = UnitId::Adsorber(TECH);
    let reactor = UnitId::Reactor(TECH);
    if !ctx.selections.adsorption.is_candidate(TECH) {
        ctx.network.retire_unit(ctx.builder, adsorber)?;
        ctx.network.retire_unit(ctx.builder, reactor)?;
        return Ok(());
    }
    let p = ctx.params.dfm.clone();
    let ambient = ctx.params.ambient.clone();
    let hours = ctx.operating_hours();
    let kwh_price = ctx.electricity_price();
    let ratio = CostIndex::from_2007(&ctx.params.economics).ratio();
    let reactor_record = *record(&ctx.tables.equipment, EquipmentClass::Reactor)?;
    let route = CaptureRoute::of(TECH);
    let indicator = ctx.selections.adsorption.indicator(TECH);
    let bed = MonolithBed {
        channel_radius: p.channel_radius,
        viscosity: ctx.params.air_intake.air_viscosity,
    };

    // Adsorber: lean air leaves without CO2, all captured CO2 goes to the reactor.
    for c in ComponentId::ALL {
        let air = ctx.network.x(route.air, c);
        let (lean, captured) = if c == ComponentId::Co2 {
            (Expr::zero(), air)
        } else {
            (air, Expr::zero())
        };
        ctx.network.define_output(ctx.builder, adsorber, route.lean_air, c, lean)?;
        ctx.network.define_output(ctx.builder, adsorber, route.captured, c, captured)?;
    }

    // Bed geometry and pressure drop.
    let volumetric = ctx.network.volumetric_flow(route.air, &ctx.tables.components)?;
    let air_flow = ctx.defined("dfm.air_flow", volumetric)?;
    let count = ctx.pinned_integer("dfm.reactor_count", 1.0, 50.0, ctx.pins.reactor_count)?;
    let diameter = ctx.pinned_continuous("dfm.diameter", 0.5, 4.0, ctx.pins.reactor_diameter)?;
    let length = ctx.builder.continuous("dfm.length", 1.0, 5.0)?;
    ctx.builder.set_initial(length, 1.0)?;
    let area = Expr::from(diameter).powf(2.0) * (PI / 4.0);
    let velocity = ctx.builder.continuous("dfm.velocity", 0.0, 10.0)?;
    ctx.builder
        .equal("dfm.velocity.def", velocity, air_flow / count / area.clone())?;
    ctx.builder
        .greater_equal("dfm.velocity.min", velocity, indicator.clone() * 0.1)?;
    let pressure_drop = ctx.defined("dfm.pressure_drop", bed.pressure_drop_expr(length, velocity))?;
    ctx.builder.less_equal(
        "dfm.pressure_drop.head",
        pressure_drop * indicator.clone(),
        available_head.clone(),
    )?;
    let size = ctx.builder.continuous("dfm.reactor_size", reactor_record.s_lower, reactor_record.s_upper)?;
    ctx.builder.equal("dfm.reactor_size.def", size, area * length)?;

    // Loading and capture rate.
    let time_window = ctx.pins.adsorption_time;
    let time = ctx.builder.integer("dfm.adsorption_time", time_window.min, time_window.max)?;
    ctx.builder.set_initial(time, time_window.max)?;
    let loading = ctx
        .builder
        .continuous("dfm.loading", 0.0, p.loading_ceiling * p.equilibrium_loading)?;
    ctx.builder.equal(
        "dfm.loading.def",
        loading,
        uptake_expr(p.equilibrium_loading, p.uptake_rate, time),
    )?;
    let mass = ctx.builder.non_negative("dfm.mass")?;
    ctx.builder.less_equal(
        "dfm.mass.capacity",
        mass,
        size * count * (p.packing_fraction * p.washcoat_loading),
    )?;
    let captured_co2 = ctx.network.x(route.air, ComponentId::Co2);
    ctx.builder.equal(
        "dfm.capture_rate",
        captured_co2,
        loading * mass / (Expr::from(time) / 3600.0),
    )?;

    // Costs.
    let reactor_cost = ctx.defined(
        "dfm.reactor_cost",
        power_law_cost_expr(&reactor_record, size, count, ratio),
    )?;
    let capex = ctx.defined("dfm.capex", (reactor_cost + mass * p.unit_cost) * p.trains)?;

    // Regeneration heat: bed sensible heat plus heat of adsorption, less what the
    // hot hydrogen and the exothermic methanation supply.
    let hydrogen_heat = ctx.defined(
        "dfm.hydrogen_heat",
        ctx.network.x(route.hydrogen, ComponentId::H2) * p.hydrogen_heat_rate,
    )?;
    let captured = ctx.network.x(route.captured, ComponentId::Co2);
    let reaction_heat = ctx.defined("dfm.reaction_heat", captured.clone() * (p.methanation_enthalpy / 3.6))?;
    let sensible = mass * (p.heat_capacity * (p.reaction_temperature - ambient.temperature) / 3600.0);
    let heat = ctx.defined(
        "dfm.heat_demand",
        (sensible + captured * (p.adsorption_enthalpy / 3.6) - hydrogen_heat - reaction_heat) * hours,
    )?;
    let opex = ctx.defined("dfm.opex", heat * kwh_price)?;
    ctx.costs.record("dfm", Some(capex), Some(opex), indicator);

    // In-situ methanation.
    let methanation = ReactionModel::methanation(p.conversion);
    for c in ComponentId::ALL {
        let outlet = methanation.outlet_expr(ctx.network, route.reactor_feed, c);
        ctx.network.define_output(ctx.builder, reactor, route.reactor_outlet, c, outlet)?;
    }
    log::debug!("Attached DFM route");
    Ok(())
}
