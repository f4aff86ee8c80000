//! Scalar design and economic parameters of the base case.
//!
//! Every group implements `Default` with the base-case values, and every field may
//! be omitted from a YAML override file.

use crate::technology::SteamLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParameters {
    pub economics: Economics,
    pub ambient: Ambient,
    pub air_intake: AirIntake,
    pub electrolysis: Electrolysis,
    pub dfm: DfmReactor,
    pub tvsa: Tvsa,
    pub steam: SteamSystem,
    pub air_cooler: AirCooler,
    pub separator: Separator,
    pub furnace: Furnace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economics {
    pub interest_rate: f64,
    pub plant_life_years: f64,
    pub operating_hours: f64,
    pub cepci_2023: f64,
    pub cepci_2013: f64,
    pub cepci_2007: f64,
    /// $/kWh
    pub electricity_price: f64,
    /// $/kmol of electrolyzer feed water
    pub water_cost: f64,
    /// $/kJ
    pub fuel_price: f64,
    pub boiler_efficiency: f64,
    pub turbine_efficiency: f64,
    /// $/kmol
    pub boiler_feed_water_price: f64,
}

impl Default for Economics {
    fn default() -> Self {
        Self {
            interest_rate: 1.2e-8,
            plant_life_years: 20.0,
            operating_hours: 330.0 * 24.0,
            cepci_2023: 900.0,
            cepci_2013: 567.0,
            cepci_2007: 509.7,
            electricity_price: 0.22,
            water_cost: 1.1 * 1.72e-3 * 18.02e-3 * 1000.0,
            fuel_price: 5.6869e-6,
            boiler_efficiency: 0.8,
            turbine_efficiency: 0.85,
            boiler_feed_water_price: 0.0,
        }
    }
}

impl Economics {
    /// $/kJ
    pub fn electricity_price_per_kj(&self) -> f64 {
        self.electricity_price / 3600.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ambient {
    /// J/(mol·K)
    pub gas_constant: f64,
    pub compressibility: f64,
    /// K
    pub temperature: f64,
    /// MPa
    pub pressure: f64,
    /// CO2 partial pressure in ambient air, MPa.
    pub co2_partial_pressure: f64,
    /// Multiplier turning the vacuum pressure into a CO2 partial pressure.
    pub co2_pressure_factor: f64,
    /// Cooling-air inlet, °C.
    pub air_inlet_temperature: f64,
    /// Product gas leaving the air cooler, °C.
    pub product_temperature: f64,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            gas_constant: 8.314,
            compressibility: 0.98,
            temperature: 293.0,
            pressure: 0.1,
            co2_partial_pressure: 4e-5,
            co2_pressure_factor: 4e-4,
            air_inlet_temperature: 25.0,
            product_temperature: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirIntake {
    /// Pa·s
    pub air_viscosity: f64,
    /// kg/m3
    pub air_density: f64,
    pub fan_efficiency: f64,
    pub motor_efficiency: f64,
    /// Stainless-steel construction.
    pub material_factor: f64,
}

impl Default for AirIntake {
    fn default() -> Self {
        Self {
            air_viscosity: 1.85e-5,
            air_density: 1.185,
            fan_efficiency: 0.6,
            motor_efficiency: 0.9,
            material_factor: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Electrolysis {
    /// Fraction of feed water split.
    pub conversion: f64,
}

impl Default for Electrolysis {
    fn default() -> Self {
        Self { conversion: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DfmReactor {
    /// Monolith channel hydraulic radius, m.
    pub channel_radius: f64,
    /// $/kg
    pub unit_cost: f64,
    /// kg of washcoat per m3 of monolith.
    pub washcoat_loading: f64,
    /// Fraction of the reactor volume occupied by monolith.
    pub packing_fraction: f64,
    /// kmol CO2 per kg DFM at ambient conditions.
    pub equilibrium_loading: f64,
    /// Upper bound on the working loading as a fraction of equilibrium.
    pub loading_ceiling: f64,
    /// 1/s
    pub uptake_rate: f64,
    /// kJ/(kg·K)
    pub heat_capacity: f64,
    pub reaction_temperature: f64,
    /// kJ/mol
    pub adsorption_enthalpy: f64,
    /// kJ/mol
    pub methanation_enthalpy: f64,
    /// kW delivered per kmol/h of hot hydrogen.
    pub hydrogen_heat_rate: f64,
    /// °C
    pub outlet_temperature: f64,
    /// Parallel trains cycling between adsorption and reaction.
    pub trains: f64,
    pub conversion: f64,
}

impl Default for DfmReactor {
    fn default() -> Self {
        Self {
            channel_radius: 0.00105,
            unit_cost: 272.0,
            washcoat_loading: 85.43,
            packing_fraction: 0.95,
            equilibrium_loading: 1.14934e-3,
            loading_ceiling: 0.99,
            uptake_rate: 0.00023654,
            heat_capacity: 0.718,
            reaction_temperature: 523.0,
            adsorption_enthalpy: 151.79,
            methanation_enthalpy: 164.0,
            hydrogen_heat_rate: 577.0 / 104.0,
            outlet_temperature: 350.0,
            trains: 2.0,
            conversion: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tvsa {
    /// 1/s
    pub uptake_rate: f64,
    /// $/kg
    pub sorbent_unit_cost: f64,
    /// kg of sorbent per m3 of contactor monolith.
    pub washcoat_loading: f64,
    pub packing_fraction: f64,
    /// Working loading must stay below this fraction of the net capacity.
    pub loading_ceiling: f64,
    pub polytropic_efficiency: f64,
    /// Heat-capacity ratio of CO2.
    pub co2_heat_capacity_ratio: f64,
    /// Methanation reactor pressure, MPa.
    pub reactor_pressure: f64,
    /// Packed-bed methanator volume, m3.
    pub packed_bed_volume: f64,
    /// °C
    pub outlet_temperature: f64,
    pub trains: f64,
    pub conversion: f64,
}

impl Default for Tvsa {
    fn default() -> Self {
        Self {
            uptake_rate: 0.0002,
            sorbent_unit_cost: 15.0,
            washcoat_loading: 85.43,
            packing_fraction: 0.95,
            loading_ceiling: 0.99,
            polytropic_efficiency: 0.75,
            co2_heat_capacity_ratio: 1.3,
            reactor_pressure: 1.0,
            packed_bed_volume: 0.5,
            outlet_temperature: 350.0,
            trains: 3.0,
            conversion: 1.0,
        }
    }
}

impl Tvsa {
    /// Polytropic exponent of CO2 compression.
    pub fn polytropic_exponent(&self) -> f64 {
        let k = self.co2_heat_capacity_ratio;
        1.0 / (1.0 - (k - 1.0) / (k * self.polytropic_efficiency))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamSystem {
    /// °C
    pub low_pressure_temperature: f64,
    pub medium_pressure_temperature: f64,
    pub high_pressure_temperature: f64,
    /// Minimum hot/cold approach, °C.
    pub min_approach: f64,
    /// kJ/(h·m2·°C)
    pub boiler_u: f64,
}

impl Default for SteamSystem {
    fn default() -> Self {
        Self {
            low_pressure_temperature: 150.0,
            medium_pressure_temperature: 200.0,
            high_pressure_temperature: 250.0,
            min_approach: 20.0,
            boiler_u: 154.0,
        }
    }
}

impl SteamSystem {
    pub fn saturation_temperature(&self, level: SteamLevel) -> f64 {
        match level {
            SteamLevel::Low => self.low_pressure_temperature,
            SteamLevel::Medium => self.medium_pressure_temperature,
            SteamLevel::High => self.high_pressure_temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirCooler {
    /// W/(m2·°C)
    pub overall_u: f64,
    /// ft
    pub tube_length: f64,
    /// in
    pub tube_pitch: f64,
    /// in
    pub tube_outer_diameter: f64,
    pub tube_rows: f64,
    /// Water condenses at this temperature, °C.
    pub condensation_temperature: f64,
    /// Width of the admissible approach-ratio window above a zone's lower edge.
    pub approach_window: f64,
}

impl Default for AirCooler {
    fn default() -> Self {
        Self {
            overall_u: 770.0,
            tube_length: 40.0,
            tube_pitch: 2.5,
            tube_outer_diameter: 1.0,
            tube_rows: 5.0,
            condensation_temperature: 100.0,
            approach_window: 0.09,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Separator {
    /// in
    pub wall_thickness: f64,
    /// lb/in3
    pub shell_density: f64,
    /// Liquid residence time, h.
    pub residence_time: f64,
}

impl Default for Separator {
    fn default() -> Self {
        Self {
            wall_thickness: 0.25,
            shell_density: 0.284,
            residence_time: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Furnace {
    /// MW
    pub duty: f64,
}

impl Default for Furnace {
    fn default() -> Self {
        Self { duty: 0.54 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn water_cost_matches_unit_conversion() {
        assert_relative_eq!(Economics::default().water_cost, 0.03409384, max_relative = 1e-9);
    }

    #[test]
    fn polytropic_exponent_for_co2() {
        // n = 1 / (1 - 0.3 / 0.975)
        assert_relative_eq!(Tvsa::default().polytropic_exponent(), 1.4444444444444444, max_relative = 1e-12);
    }
}
