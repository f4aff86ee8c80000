//! CSV reports of a solved plant.

use crate::error::MethforgeError;
use crate::network::StreamId;
use crate::solve::PlantSolution;
use csv::Writer;
use methforge_schemas::{
    component::ComponentId,
    fan::{FanType, HeadBand},
    sorbent::Sorbent,
    technology::{AdsorptionTechnology, AirCoolerZone, ElectrolyzerType, SteamLevel},
};
use serde::Serialize;
use std::path::Path;

/// One-line record of the design and its economics.
#[derive(Debug, Clone, Serialize)]
pub struct Headline {
    pub status: String,
    pub tac: f64,
    pub capex: f64,
    pub opex: f64,
    pub profit: f64,
    /// kmol/h of CH4 in the dry product
    pub methane: f64,
    pub electrolyzer: String,
    pub fan: String,
    pub head_band: String,
    pub adsorption: String,
    pub sorbent: String,
    pub steam_level: String,
    pub air_cooler_zone: String,
    pub furnace: bool,
}

impl Headline {
    pub fn from_solution(solution: &PlantSolution<'_>) -> Self {
        fn label<T: crate::selection::Technology>(option: Option<T>) -> String {
            option.map_or_else(|| "undecided".to_string(), |o| o.label().to_string())
        }
        let summary = solution.summary();
        Self {
            status: solution.status().to_string(),
            tac: summary.tac,
            capex: summary.capex,
            opex: summary.opex,
            profit: summary.profit,
            methane: solution.flow(StreamId::DRY_GAS, ComponentId::Ch4),
            electrolyzer: label(solution.selected::<ElectrolyzerType>()),
            fan: label(solution.selected::<FanType>()),
            head_band: label(solution.selected::<HeadBand>()),
            adsorption: label(solution.selected::<AdsorptionTechnology>()),
            sorbent: label(solution.selected::<Sorbent>()),
            steam_level: label(solution.selected::<SteamLevel>()),
            air_cooler_zone: label(solution.selected::<AirCoolerZone>()),
            furnace: solution.furnace_installed(),
        }
    }
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> MethforgeError + '_ {
    move |e| MethforgeError::CsvError(path.display().to_string(), e)
}

/// Writes every stream's component flows (kmol/h), one row per stream.
///
/// # Errors
///
/// Returns `MethforgeError::CsvError` if the file cannot be written.
pub fn write_stream_table(solution: &PlantSolution<'_>, path: &Path) -> Result<(), MethforgeError> {
    let mut writer = Writer::from_path(path).map_err(csv_error(path))?;
    let header: Vec<&str> = std::iter::once("stream")
        .chain(ComponentId::ALL.iter().map(|c| c.label()))
        .collect();
    writer.write_record(&header).map_err(csv_error(path))?;
    let flows = solution.flows();
    for (stream, row) in StreamId::ALL.iter().zip(flows.rows()) {
        let record: Vec<String> = std::iter::once(stream.to_string())
            .chain(row.iter().map(|v| format!("{v:.6}")))
            .collect();
        writer.write_record(&record).map_err(csv_error(path))?;
    }
    writer
        .flush()
        .map_err(|e| MethforgeError::FileIO(path.display().to_string(), e))?;
    log::info!("Stream table written to {}", path.display());
    Ok(())
}

/// # Errors
///
/// Returns `MethforgeError::CsvError` if the file cannot be written.
pub fn write_headline(solution: &PlantSolution<'_>, path: &Path) -> Result<(), MethforgeError> {
    let mut writer = Writer::from_path(path).map_err(csv_error(path))?;
    writer
        .serialize(Headline::from_solution(solution))
        .map_err(csv_error(path))?;
    writer
        .flush()
        .map_err(|e| MethforgeError::FileIO(path.display().to_string(), e))?;
    Ok(())
}

/// Per-unit capital and operating cost.
///
/// # Errors
///
/// Returns `MethforgeError::CsvError` if the file cannot be written.
pub fn write_unit_costs(solution: &PlantSolution<'_>, path: &Path) -> Result<(), MethforgeError> {
    let mut writer = Writer::from_path(path).map_err(csv_error(path))?;
    for unit in solution.summary().units {
        writer.serialize(unit).map_err(csv_error(path))?;
    }
    writer
        .flush()
        .map_err(|e| MethforgeError::FileIO(path.display().to_string(), e))?;
    Ok(())
}
