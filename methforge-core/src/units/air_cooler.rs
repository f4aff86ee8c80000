//! Forced-draft air cooler between the boiler and the water separator.
//!
//! Sizing follows the short-cut air-cooler method: duty and LMTD give the
//! required bare-tube area, the face-velocity zone fixes the air rate, and the
//! bundle width that air rate implies bounds the available area. The method works
//! in field units (ft², °F, BTU/h, inches of water); conversions happen inline.

use super::UnitContext;
use crate::costing::{power_law_cost_expr, record, CostIndex};
use crate::error::MethforgeError;
use crate::model::{Expr, VarId};
use crate::network::{StreamId, UnitId};
use methforge_schemas::{component::ComponentId, equipment::EquipmentClass};
use std::f64::consts::PI;

const UNIT: UnitId = UnitId::AirCooler;
const M2_TO_FT2: f64 = 10.764;
const KJ_TO_BTU: f64 = 1.0 / 1.055;
const W_M2K_TO_BTU: f64 = 5.678;

fn fahrenheit(celsius: impl Into<Expr>) -> Expr {
    celsius.into() * 1.8 + 32.0
}

/// # Errors
///
/// Returns a `MethforgeError` if the condensation temperature is outside the steam
/// table, the air-cooler cost record is missing, or the network refuses an output.
pub fn attach(ctx: &mut UnitContext<'_>, gas_inlet_temperature: VarId) -> Result<(), MethforgeError> {
    let cooler = ctx.params.air_cooler.clone();
    let ambient = ctx.params.ambient.clone();
    let epsilon = ctx.log_epsilon();
    let (hours, kwh_price) = (ctx.operating_hours(), ctx.electricity_price());
    let t_gas = Expr::from(gas_inlet_temperature);
    let (t_product, t_air_in) = (ambient.product_temperature, ambient.air_inlet_temperature);
    let cold_end = t_product - t_air_in;

    for c in ComponentId::ALL {
        let passed = ctx.network.x(StreamId::BOILER_OUTLET, c);
        ctx.network
            .define_output(ctx.builder, UNIT, StreamId::COOLER_OUTLET, c, passed)?;
    }

    let t_air_out = ctx.builder.continuous("air_cooler.air_outlet_temperature", 35.0, 40.0)?;
    ctx.builder.set_initial(t_air_out, 37.0)?;
    let hot_end = t_gas.clone() - t_air_out;
    let lmtd = ctx.defined(
        "air_cooler.lmtd",
        (hot_end.clone() - cold_end) / ((hot_end / cold_end).ln() + epsilon),
    )?;

    let latent = ctx.steam.properties(cooler.condensation_temperature)?.latent_heat;
    let rate = ctx.network.heat_capacity_rate(StreamId::BOILER_OUTLET, &ctx.tables.components)?;
    let condensing = ctx.network.x(StreamId::BOILER_OUTLET, ComponentId::H2o) * latent;
    let duty = ctx.defined(
        "air_cooler.duty",
        rate * (t_gas.clone() - t_product) + condensing,
    )?;
    let area = ctx.defined(
        "air_cooler.area",
        duty / (lmtd * (cooler.overall_u * 3.6) + epsilon) * M2_TO_FT2,
    )?;

    // Approach-ratio window picks the face-velocity zone.
    let approach = ctx.defined(
        "air_cooler.approach",
        (t_gas.clone() - t_product) / (t_gas - t_air_in),
    )?;
    let zone_ratio = ctx.selections.air_cooler_zone.weighted(|z| z.approach_ratio());
    let offset = zone_ratio - approach * (100.0 / (cooler.overall_u / W_M2K_TO_BTU));
    ctx.builder.greater_equal("air_cooler.zone.lower", offset.clone(), 0.0)?;
    ctx.builder
        .less_equal("air_cooler.zone.upper", offset, cooler.approach_window)?;
    let face_velocity = ctx.builder.continuous("air_cooler.face_velocity", 400.0, 650.0)?;
    ctx.builder.set_initial(face_velocity, 550.0)?;
    ctx.builder.equal(
        "air_cooler.face_velocity.def",
        face_velocity,
        ctx.selections.air_cooler_zone.weighted(|z| z.face_velocity()),
    )?;

    let air_rise = fahrenheit(t_air_out) - fahrenheit(t_air_in);
    let face_area = ctx.defined(
        "air_cooler.face_area",
        (duty * KJ_TO_BTU) / (face_velocity * air_rise * 1.95 + epsilon),
    )?;
    let width = ctx.defined("air_cooler.bundle_width", face_area / cooler.tube_length)?;
    ctx.builder.equal(
        "air_cooler.air_balance",
        fahrenheit(t_air_out),
        fahrenheit(t_air_in) + (duty * KJ_TO_BTU) / (width * face_velocity * (cooler.tube_length * 1.95) + epsilon),
    )?;
    let available = ctx.defined(
        "air_cooler.available_area",
        width * (cooler.tube_rows / (cooler.tube_pitch / 12.0) * PI * (cooler.tube_outer_diameter / 12.0) * cooler.tube_length),
    )?;
    ctx.builder.less_equal("air_cooler.area.available", area, available)?;

    let pressure_drop = ctx.defined(
        "air_cooler.pressure_drop",
        (Expr::from(face_velocity) / 100.0).powf(1.8) * (0.0037 * cooler.tube_rows),
    )?;
    let brake_power = ctx.defined(
        "air_cooler.brake_horsepower",
        face_velocity * face_area * (Expr::from(t_air_out) + 273.0) * (pressure_drop + 0.1) / 1.15e6,
    )?;

    let correlation = *record(&ctx.tables.equipment, EquipmentClass::AirCooler)?;
    let ratio = CostIndex::from_2013(&ctx.params.economics).ratio();
    let capex = ctx.defined("air_cooler.capex", power_law_cost_expr(&correlation, area, 1.0, ratio))?;
    let opex = ctx.defined(
        "air_cooler.opex",
        brake_power * (hours * kwh_price / 1.341),
    )?;
    ctx.costs.record("air_cooler", Some(capex), Some(opex), Expr::one());
    log::debug!("Attached air cooler");
    Ok(())
}
