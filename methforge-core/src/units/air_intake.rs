use super::UnitContext;
use crate::costing::{fan_purchase_cost_expr, CostIndex};
use crate::error::MethforgeError;
use crate::model::{Expr, VarId};
use crate::network::{StreamId, UnitId};
use methforge_schemas::{
    component::ComponentId,
    fan::{FanRecord, FanType, HeadBand},
};
use std::collections::BTreeMap;

/// Attaches the candidate fan systems and returns the head (Pa) the selected
/// system delivers to the capture contactors.
///
/// # Errors
///
/// Returns a `MethforgeError` if a fan record or one of its head bands is missing,
/// or a configured fan count lies outside the fan's count range.
pub fn attach(ctx: &mut UnitContext<'_>) -> Result<Expr, MethforgeError> {
    let intake = ctx.params.air_intake.clone();
    let escalation = CostIndex::from_2013(&ctx.params.economics).ratio();
    let hours = ctx.operating_hours();
    let kwh_price = ctx.electricity_price();
    let mut heads: BTreeMap<FanType, VarId> = BTreeMap::new();

    for fan in FanType::ALL {
        let unit = UnitId::FanSystem(fan);
        if !ctx.selections.fan.is_candidate(fan) {
            ctx.network.retire_unit(ctx.builder, unit)?;
            continue;
        }
        let record = fan_record(ctx, fan)?.clone();
        let inlet = StreamId::fan_inlet(fan);
        let outlet = StreamId::fan_outlet(fan);

        let volumetric = ctx.network.volumetric_flow(inlet, &ctx.tables.components)?;
        let total_flow = ctx.defined(&format!("{unit}.flow"), volumetric)?;
        let count = ctx.pinned_integer(
            &format!("{unit}.count"),
            record.min_count,
            record.max_count,
            ctx.pins.fan_counts.get(&fan).copied(),
        )?;
        let per_fan = ctx.builder.continuous(format!("{unit}.flow_per_fan"), 0.0, record.max_flow)?;
        ctx.builder
            .equal(format!("{unit}.flow_per_fan.def"), per_fan, total_flow / count)?;

        let head = ctx.builder.continuous(format!("{unit}.head"), 0.0, record.max_head)?;
        let limit = ctx.selections.head_band.weighted(|band| band_record(&record, band).0);
        ctx.builder.less_equal(format!("{unit}.head_band"), head, limit)?;
        let head_factor = ctx.selections.head_band.weighted(|band| band_record(&record, band).1);

        let capex = ctx.defined(
            &format!("{unit}.capex"),
            fan_purchase_cost_expr(&record.cost, per_fan) * count * head_factor * (intake.material_factor * escalation),
        )?;
        let power = ctx.defined(
            &format!("{unit}.power"),
            per_fan * head / (1e3 * intake.fan_efficiency * intake.motor_efficiency) * count,
        )?;
        let opex = ctx.defined(&format!("{unit}.opex"), power * (hours * kwh_price))?;

        for c in ComponentId::ALL {
            let passed = ctx.network.x(inlet, c);
            ctx.network.define_output(ctx.builder, unit, outlet, c, passed)?;
        }
        let indicator = ctx.selections.fan.indicator(fan);
        ctx.costs.record(unit.to_string(), Some(capex), Some(opex), indicator);
        heads.insert(fan, head);
        log::debug!("Attached {unit} ({})", fan.label());
    }

    Ok(ctx
        .selections
        .fan
        .blend(|fan| heads.get(&fan).map_or_else(Expr::zero, |h| Expr::Var(*h))))
}

fn fan_record<'a>(ctx: &UnitContext<'a>, fan: FanType) -> Result<&'a FanRecord, MethforgeError> {
    let record = ctx.tables.fans.get(fan).ok_or_else(|| MethforgeError::MissingProperty {
        kind: "fan",
        key: fan.label().to_string(),
    })?;
    if let Some(band) = HeadBand::ALL.into_iter().find(|b| !record.head_bands.contains_key(b)) {
        return Err(MethforgeError::MissingProperty {
            kind: "fan head band",
            key: format!("{} {}", fan.label(), band.label()),
        });
    }
    Ok(record)
}

/// `(head limit, head factor)`; presence is checked by [`fan_record`].
fn band_record(record: &FanRecord, band: HeadBand) -> (f64, f64) {
    record
        .head_bands
        .get(&band)
        .map_or((0.0, 0.0), |b| (b.head_limit, b.factor))
}
