//! Run configuration: scalar parameters, design pins, numerical tuning and solver options.
//!
//! Every field has a base-case default, so an empty YAML document is a valid
//! configuration.

use crate::error::MethforgeError;
use crate::selection::{BigM, FurnacePolicy};
use crate::solve::SolveOptions;
use methforge_schemas::{
    component::{reference_air_feed, ComponentVector},
    fan::{FanType, HeadBand},
    parameters::PlantParameters,
    sorbent::Sorbent,
    technology::{AdsorptionTechnology, AirCoolerZone, ElectrolyzerType, SteamLevel},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    pub parameters: PlantParameters,
    /// Air intake in kmol/h per component.
    pub feed: ComponentVector,
    pub pins: DesignPins,
    pub numerics: Numerics,
    pub solve: SolveOptions,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            parameters: PlantParameters::default(),
            feed: reference_air_feed(),
            pins: DesignPins::default(),
            numerics: Numerics::default(),
            solve: SolveOptions::default(),
        }
    }
}

impl PlantConfig {
    /// # Errors
    ///
    /// Returns `MethforgeError::YamlParsing` for malformed documents.
    pub fn from_yaml(source: &str, origin: &str) -> Result<Self, MethforgeError> {
        serde_yaml::from_str(source).map_err(|e| MethforgeError::YamlParsing(origin.to_string(), e))
    }

    /// Rejects settings that cannot produce a meaningful model.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), MethforgeError> {
        let n = &self.numerics;
        if !(n.log_epsilon > 0.0 && n.log_epsilon < 1e-3) {
            return Err(MethforgeError::ConfigError(format!(
                "log_epsilon must lie in (0, 1e-3), got {}",
                n.log_epsilon
            )));
        }
        if n.flow_upper_bound <= 0.0 || n.temperature_upper_bound <= 0.0 {
            return Err(MethforgeError::ConfigError(
                "flow and temperature upper bounds must be positive".to_string(),
            ));
        }
        if let Some((c, v)) = methforge_schemas::component::ComponentId::ALL
            .iter()
            .map(|&c| (c, self.feed[c]))
            .find(|(_, v)| *v < 0.0 || *v > n.flow_upper_bound)
        {
            return Err(MethforgeError::ConfigError(format!(
                "feed of {} = {v} kmol/h lies outside [0, {}]",
                c.label(),
                n.flow_upper_bound
            )));
        }
        let window = &self.pins.adsorption_time;
        if window.min <= 0.0 || window.min > window.max {
            return Err(MethforgeError::ConfigError(format!(
                "adsorption time window [{}, {}] s is empty or non-positive",
                window.min, window.max
            )));
        }
        let economics = &self.parameters.economics;
        if economics.plant_life_years <= 0.0 || economics.operating_hours <= 0.0 {
            return Err(MethforgeError::ConfigError(
                "plant life and operating hours must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options removed from consideration before the model is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    pub electrolyzer: Vec<ElectrolyzerType>,
    pub fan: Vec<FanType>,
    pub head_band: Vec<HeadBand>,
    pub adsorption: Vec<AdsorptionTechnology>,
    pub sorbent: Vec<Sorbent>,
    pub steam_level: Vec<SteamLevel>,
    pub air_cooler_zone: Vec<AirCoolerZone>,
}

/// Inclusive bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub min: f64,
    pub max: f64,
}

/// Fixed design decisions. A `None` technology pin leaves the family open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignPins {
    pub electrolyzer: Option<ElectrolyzerType>,
    pub fan: Option<FanType>,
    pub head_band: Option<HeadBand>,
    pub adsorption: Option<AdsorptionTechnology>,
    pub sorbent: Option<Sorbent>,
    pub steam_level: Option<SteamLevel>,
    pub air_cooler_zone: Option<AirCoolerZone>,
    pub furnace: FurnacePolicy,
    pub reactor_count: Option<f64>,
    pub contactor_count: Option<f64>,
    /// m
    pub reactor_diameter: Option<f64>,
    pub fan_counts: BTreeMap<FanType, f64>,
    pub adsorption_time: TimeWindow,
    pub exclusions: Exclusions,
}

impl Default for DesignPins {
    fn default() -> Self {
        Self {
            electrolyzer: Some(ElectrolyzerType::Soel),
            fan: Some(FanType::VaneAxial),
            head_band: None,
            adsorption: Some(AdsorptionTechnology::Dfm),
            sorbent: Some(Sorbent::Mil101CrPei800),
            steam_level: Some(SteamLevel::Low),
            air_cooler_zone: None,
            furnace: FurnacePolicy::Off,
            reactor_count: Some(16.0),
            contactor_count: Some(16.0),
            reactor_diameter: Some(4.0),
            fan_counts: BTreeMap::from([(FanType::VaneAxial, 3.0)]),
            adsorption_time: TimeWindow { min: 1000.0, max: 1000.0 },
            exclusions: Exclusions::default(),
        }
    }
}

impl DesignPins {
    /// No pins at all: every family is left to the solver.
    pub fn open() -> Self {
        Self {
            electrolyzer: None,
            fan: None,
            head_band: None,
            adsorption: None,
            sorbent: None,
            steam_level: None,
            air_cooler_zone: None,
            furnace: FurnacePolicy::Optional,
            reactor_count: None,
            contactor_count: None,
            reactor_diameter: None,
            fan_counts: BTreeMap::new(),
            adsorption_time: TimeWindow { min: 100.0, max: 10000.0 },
            exclusions: Exclusions::default(),
        }
    }
}

/// Tuning constants of the formulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Numerics {
    pub big_m: BigM,
    /// Added inside logarithms and denominators that can approach zero.
    pub log_epsilon: f64,
    /// kmol/h
    pub flow_upper_bound: f64,
    /// °C
    pub temperature_upper_bound: f64,
}

impl Default for Numerics {
    fn default() -> Self {
        Self {
            big_m: BigM::default(),
            log_epsilon: 1e-9,
            flow_upper_bound: 1e5,
            temperature_upper_bound: 800.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_base_case() {
        let config = PlantConfig::from_yaml("{}", "inline").unwrap();
        assert_eq!(config, PlantConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.pins.fan_counts.get(&FanType::VaneAxial), Some(&3.0));
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let yaml = "pins:\n  electrolyzer: null\n  exclusions:\n    electrolyzer: [PEMEL]\nnumerics:\n  log_epsilon: 1.0e-8\n";
        let config = PlantConfig::from_yaml(yaml, "inline").unwrap();
        assert_eq!(config.pins.electrolyzer, None);
        assert_eq!(config.pins.exclusions.electrolyzer, vec![ElectrolyzerType::Pemel]);
        assert_eq!(config.pins.adsorption, Some(AdsorptionTechnology::Dfm));
        assert_eq!(config.numerics.log_epsilon, 1e-8);
        assert_eq!(config.numerics.flow_upper_bound, 1e5);
    }

    #[test]
    fn invalid_numerics_are_rejected() {
        let mut config = PlantConfig::default();
        config.numerics.log_epsilon = 0.0;
        assert!(matches!(config.validate(), Err(MethforgeError::ConfigError(_))));
        let mut config = PlantConfig::default();
        config.pins.adsorption_time = TimeWindow { min: 2000.0, max: 1000.0 };
        assert!(matches!(config.validate(), Err(MethforgeError::ConfigError(_))));
    }
}
