//! Temperature-vacuum swing adsorption route: sorbent-coated contactors, vacuum
//! regeneration, CO2 compression and a packed-bed methanator.

use super::UnitContext;
use crate::costing::{power_law_cost, power_law_cost_expr, record, CostIndex};
use crate::error::MethforgeError;
use crate::model::{Expr, VarId};
use crate::network::{CaptureRoute, UnitId};
use crate::physics::{adsorption::uptake_expr, DualIsotherm, MonolithBed, PolytropicMachine, ReactionModel};
use methforge_schemas::{
    component::ComponentId,
    equipment::EquipmentClass,
    sorbent::{Sorbent, SorbentRecord},
    technology::AdsorptionTechnology,
};
use std::collections::BTreeMap;
use std::f64::consts::PI;

const TECH: AdsorptionTechnology = AdsorptionTechnology::Tvsa;

/// Working loading of one sorbent at the chosen regeneration conditions.
struct SorbentLoading {
    record: SorbentRecord,
    /// kmol/kg
    loading: VarId,
}

/// # Errors
///
/// Returns a `MethforgeError` if a sorbent or equipment record is missing, an
/// isotherm cannot be evaluated at ambient conditions, or the network refuses an output.
pub fn attach(ctx: &mut UnitContext<'_>, available_head: &Expr) -> Result<(), MethforgeError> {
    let adsorber = UnitId::Adsorber(TECH);
    let reactor = UnitId::Reactor(TECH);
    if !ctx.selections.adsorption.is_candidate(TECH) {
        ctx.network.retire_unit(ctx.builder, adsorber)?;
        ctx.network.retire_unit(ctx.builder, reactor)?;
        return Ok(());
    }
    let p = ctx.params.tvsa.clone();
    let ambient = ctx.params.ambient.clone();
    let hours = ctx.operating_hours();
    let kwh_price = ctx.electricity_price();
    let ratio = CostIndex::from_2007(&ctx.params.economics).ratio();
    let vessel = *record(&ctx.tables.equipment, EquipmentClass::Reactor)?;
    let machine_cost = *record(&ctx.tables.equipment, EquipmentClass::CentrifugalCompressor)?;
    let route = CaptureRoute::of(TECH);
    let indicator = ctx.selections.adsorption.indicator(TECH);

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

    // Regeneration conditions.
    let desorption_temperature = ctx.builder.continuous("tvsa.desorption_temperature", 80.0, 120.0)?;
    ctx.builder.set_initial(desorption_temperature, 120.0)?;
    let vacuum = ctx.builder.continuous("tvsa.vacuum_pressure", 0.005, 0.09)?;
    ctx.builder.set_initial(vacuum, 0.09)?;
    let time_window = ctx.pins.adsorption_time;
    let time = ctx.builder.integer("tvsa.cycle_time", time_window.min, time_window.max)?;
    ctx.builder.set_initial(time, time_window.max)?;
    let bed_temperature = Expr::from(desorption_temperature) + 273.0;

    // Every sorbent's working loading is modelled so candidates can be compared
    // from one solution; only the selected one enters the capture balance.
    let mut loadings: BTreeMap<Sorbent, SorbentLoading> = BTreeMap::new();
    for sorbent in Sorbent::ALL {
        let record = ctx
            .tables
            .sorbents
            .get(sorbent)
            .cloned()
            .ok_or_else(|| MethforgeError::MissingProperty {
                kind: "sorbent",
                key: sorbent.label().to_string(),
            })?;
        let label = sorbent.label();
        let isotherm = DualIsotherm::new(&record.isotherm, ambient.gas_constant);
        let q_ads = ctx.builder.free(format!("tvsa.q_ads[{label}]"))?;
        ctx.builder
            .equal(format!("tvsa.q_ads[{label}].def"), q_ads, isotherm.adsorption_capacity(&ambient)?)?;
        let q_des = ctx.builder.free(format!("tvsa.q_des[{label}]"))?;
        ctx.builder.equal(
            format!("tvsa.q_des[{label}].def"),
            q_des,
            isotherm.capacity_expr(bed_temperature.clone(), vacuum * ambient.co2_pressure_factor),
        )?;
        let net = ctx.builder.free(format!("tvsa.net_capacity[{label}]"))?;
        ctx.builder
            .equal(format!("tvsa.net_capacity[{label}].def"), net, q_ads - q_des)?;
        let loading = ctx.builder.free(format!("tvsa.loading[{label}]"))?;
        ctx.builder
            .equal(format!("tvsa.loading[{label}].def"), loading, uptake_expr(net, p.uptake_rate, time))?;
        ctx.builder
            .greater_equal(format!("tvsa.loading[{label}].min"), loading, 0.0)?;
        ctx.builder.less_equal(
            format!("tvsa.loading[{label}].ceiling"),
            loading,
            net * p.loading_ceiling,
        )?;
        loadings.insert(sorbent, SorbentLoading { record, loading });
    }

    let mass = ctx.builder.non_negative("tvsa.sorbent_mass")?;
    let selected_loading = ctx
        .selections
        .sorbent
        .blend(|s| loadings.get(&s).map_or_else(Expr::zero, |l| Expr::Var(l.loading)));
    ctx.builder.equal(
        "tvsa.capture_rate",
        ctx.network.x(route.air, ComponentId::Co2),
        selected_loading * mass / (Expr::from(time) / 3600.0),
    )?;

    // Contactors.
    let volumetric = ctx.network.volumetric_flow(route.air, &ctx.tables.components)?;
    let air_flow = ctx.defined("tvsa.air_flow", volumetric)?;
    let count = ctx.pinned_integer("tvsa.contactor_count", 1.0, 30.0, ctx.pins.contactor_count)?;
    let diameter = ctx.builder.continuous("tvsa.diameter", 0.5, 4.0)?;
    ctx.builder.set_initial(diameter, 1.5)?;
    let length = ctx.builder.continuous("tvsa.length", 1.0, 5.0)?;
    ctx.builder.set_initial(length, 1.0)?;
    let area = Expr::from(diameter).powf(2.0) * (PI / 4.0);
    let velocity = ctx.builder.continuous("tvsa.velocity", 0.0, 10.0)?;
    ctx.builder
        .equal("tvsa.velocity.def", velocity, air_flow / count / area.clone())?;
    ctx.builder
        .greater_equal("tvsa.velocity.min", velocity, indicator.clone() * 0.1)?;
    let bed = MonolithBed {
        channel_radius: ctx.params.dfm.channel_radius,
        viscosity: ctx.params.air_intake.air_viscosity,
    };
    let pressure_drop = ctx.defined("tvsa.pressure_drop", bed.pressure_drop_expr(length, velocity))?;
    ctx.builder.less_equal(
        "tvsa.pressure_drop.head",
        pressure_drop * indicator.clone(),
        available_head.clone(),
    )?;
    let size = ctx.builder.continuous("tvsa.contactor_size", vessel.s_lower, vessel.s_upper)?;
    ctx.builder.equal("tvsa.contactor_size.def", size, area * length)?;
    ctx.builder.less_equal(
        "tvsa.sorbent_mass.capacity",
        mass,
        size * count * (p.packing_fraction * p.washcoat_loading),
    )?;
    let contactor_cost = ctx.defined(
        "tvsa.contactor_cost",
        power_law_cost_expr(&vessel, size, count, ratio),
    )?;

    // Vacuum pumps draw the CO2 off the hot bed; compressors lift it to reactor pressure.
    let machine = PolytropicMachine::co2(&p, &ambient);
    let product = ctx.network.x(route.captured, ComponentId::Co2);
    let pump_count = ctx.builder.integer("tvsa.vacuum_pump_count", 1.0, 20.0)?;
    ctx.builder.set_initial(pump_count, 1.0)?;
    let pump_power = ctx.defined(
        "tvsa.vacuum_pump_power",
        machine.power_expr(
            bed_temperature.clone(),
            ambient.pressure / vacuum,
            product.clone(),
            pump_count,
        ),
    )?;
    let pump_cost = ctx.defined(
        "tvsa.vacuum_pump_cost",
        power_law_cost_expr(&machine_cost, pump_power, pump_count, ratio),
    )?;
    let compressor_count = ctx.builder.integer("tvsa.compressor_count", 1.0, 20.0)?;
    ctx.builder.set_initial(compressor_count, 1.0)?;
    let compressor_power = ctx.defined(
        "tvsa.compressor_power",
        machine.power_expr(
            ambient.temperature,
            p.reactor_pressure / ambient.pressure,
            product.clone(),
            compressor_count,
        ),
    )?;
    let compressor_cost = ctx.defined(
        "tvsa.compressor_cost",
        power_law_cost_expr(&machine_cost, compressor_power, compressor_count, ratio),
    )?;
    let methanator_cost = power_law_cost(&vessel, p.packed_bed_volume, 1.0, ratio);

    let capex = ctx.defined(
        "tvsa.capex",
        contactor_cost * p.trains
            + pump_cost
            + compressor_cost
            + methanator_cost
            + mass * (p.sorbent_unit_cost * p.trains),
    )?;
    let work = ctx.defined(
        "tvsa.work",
        (compressor_power * compressor_count + pump_power * pump_count) * hours,
    )?;
    let sensible = ctx.selections.sorbent.blend(|s| {
        loadings.get(&s).map_or_else(Expr::zero, |l| {
            (bed_temperature.clone() - ambient.temperature) * mass * (l.record.properties.heat_capacity / 3600.0 / 1000.0)
        })
    });
    let desorption = ctx.selections.sorbent.blend(|s| {
        loadings.get(&s).map_or_else(Expr::zero, |l| {
            product.clone() * (l.record.isotherm.chemical.heat_of_adsorption / 3600.0)
        })
    });
    let heat = ctx.defined("tvsa.heat_demand", (sensible + desorption) * hours)?;
    let opex = ctx.defined("tvsa.opex", (heat + work) * kwh_price)?;
    ctx.costs.record("tvsa", Some(capex), Some(opex), indicator);

    let methanation = ReactionModel::methanation(p.conversion);
    for c in ComponentId::ALL {
        let outlet = methanation.outlet_expr(ctx.network, route.reactor_feed, c);
        ctx.network.define_output(ctx.builder, reactor, route.reactor_outlet, c, outlet)?;
    }
    log::debug!("Attached TVSA route with {} sorbent isotherms", loadings.len());
    Ok(())
}
