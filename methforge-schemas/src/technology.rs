//! Discrete technology options of the superstructure and their reference data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElectrolyzerType {
    #[serde(rename = "AEL")]
    Ael,
    #[serde(rename = "SOEL")]
    Soel,
    #[serde(rename = "PEMEL")]
    Pemel,
}

impl ElectrolyzerType {
    pub const ALL: [ElectrolyzerType; 3] = [
        ElectrolyzerType::Ael,
        ElectrolyzerType::Soel,
        ElectrolyzerType::Pemel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ElectrolyzerType::Ael => "AEL",
            ElectrolyzerType::Soel => "SOEL",
            ElectrolyzerType::Pemel => "PEMEL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectrolyzerRecord {
    /// Electricity demand, kJ per kmol H2.
    pub unit_energy: f64,
    /// Installed cost, $/kW.
    pub specific_capex: f64,
    /// Stack outlet temperature, °C.
    pub operating_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectrolyzerTable {
    pub electrolyzers: BTreeMap<ElectrolyzerType, ElectrolyzerRecord>,
}

impl ElectrolyzerTable {
    pub fn get(&self, kind: ElectrolyzerType) -> Option<&ElectrolyzerRecord> {
        self.electrolyzers.get(&kind)
    }

    pub fn reference() -> Self {
        let rows = [
            (ElectrolyzerType::Ael, 463680.0, 950.0, 25.0),
            (ElectrolyzerType::Soel, 269900.0, 4200.0, 700.0),
            (ElectrolyzerType::Pemel, 483840.0, 1450.0, 25.0),
        ];
        let electrolyzers = rows
            .into_iter()
            .map(|(kind, unit_energy, specific_capex, operating_temperature)| {
                (
                    kind,
                    ElectrolyzerRecord {
                        unit_energy,
                        specific_capex,
                        operating_temperature,
                    },
                )
            })
            .collect();
        Self { electrolyzers }
    }
}

impl Default for ElectrolyzerTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// CO2 capture route: dual-function material beds with in-situ methanation, or
/// temperature-vacuum swing adsorption followed by a packed-bed methanator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdsorptionTechnology {
    #[serde(rename = "DFM")]
    Dfm,
    #[serde(rename = "TVSA")]
    Tvsa,
}

impl AdsorptionTechnology {
    pub const ALL: [AdsorptionTechnology; 2] = [AdsorptionTechnology::Dfm, AdsorptionTechnology::Tvsa];

    pub fn label(self) -> &'static str {
        match self {
            AdsorptionTechnology::Dfm => "DFM",
            AdsorptionTechnology::Tvsa => "TVSA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SteamLevel {
    #[serde(rename = "LP")]
    Low,
    #[serde(rename = "MP")]
    Medium,
    #[serde(rename = "HP")]
    High,
}

impl SteamLevel {
    pub const ALL: [SteamLevel; 3] = [SteamLevel::Low, SteamLevel::Medium, SteamLevel::High];

    pub fn label(self) -> &'static str {
        match self {
            SteamLevel::Low => "LP",
            SteamLevel::Medium => "MP",
            SteamLevel::High => "HP",
        }
    }
}

/// Face-velocity class of the air-cooled product condenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AirCoolerZone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
}

impl AirCoolerZone {
    pub const ALL: [AirCoolerZone; 5] = [
        AirCoolerZone::Z1,
        AirCoolerZone::Z2,
        AirCoolerZone::Z3,
        AirCoolerZone::Z4,
        AirCoolerZone::Z5,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AirCoolerZone::Z1 => "Z1",
            AirCoolerZone::Z2 => "Z2",
            AirCoolerZone::Z3 => "Z3",
            AirCoolerZone::Z4 => "Z4",
            AirCoolerZone::Z5 => "Z5",
        }
    }

    /// Lower edge of the approach-ratio window this zone covers.
    pub fn approach_ratio(self) -> f64 {
        match self {
            AirCoolerZone::Z1 => 0.4,
            AirCoolerZone::Z2 => 0.5,
            AirCoolerZone::Z3 => 0.7,
            AirCoolerZone::Z4 => 0.8,
            AirCoolerZone::Z5 => 1.0,
        }
    }

    /// Standard air face velocity, ft/min.
    pub fn face_velocity(self) -> f64 {
        match self {
            AirCoolerZone::Z1 => 650.0,
            AirCoolerZone::Z2 => 600.0,
            AirCoolerZone::Z3 => 550.0,
            AirCoolerZone::Z4 => 450.0,
            AirCoolerZone::Z5 => 400.0,
        }
    }
}
