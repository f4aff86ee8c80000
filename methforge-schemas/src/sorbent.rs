//! Solid sorbents available to the swing-adsorption contactors.
//!
//! Each sorbent carries two Toth parameter sets (chemisorption and physisorption)
//! whose loadings add up, plus the bulk properties used for bed sizing and
//! regeneration duty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sorbent {
    #[serde(rename = "APDES-NFC")]
    ApdesNfc,
    #[serde(rename = "Tri-PE-MCM-41")]
    TriPeMcm41,
    #[serde(rename = "MIL-101(Cr)-PEI-800")]
    Mil101CrPei800,
    #[serde(rename = "Lewatit-VPOC-106")]
    LewatitVpoc106,
}

impl Sorbent {
    pub const ALL: [Sorbent; 4] = [
        Sorbent::ApdesNfc,
        Sorbent::TriPeMcm41,
        Sorbent::Mil101CrPei800,
        Sorbent::LewatitVpoc106,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sorbent::ApdesNfc => "APDES-NFC",
            Sorbent::TriPeMcm41 => "Tri-PE-MCM-41",
            Sorbent::Mil101CrPei800 => "MIL-101(Cr)-PEI-800",
            Sorbent::LewatitVpoc106 => "Lewatit-VPOC-106",
        }
    }
}

/// Temperature-dependent Toth isotherm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TothParameters {
    /// T0, K
    pub reference_temperature: f64,
    /// b0, 1/MPa
    pub affinity: f64,
    /// Q, J/mol
    pub heat_of_adsorption: f64,
    /// t0
    pub heterogeneity: f64,
    /// alpha
    pub heterogeneity_slope: f64,
    /// qs0, mol/kg
    pub saturation_capacity: f64,
    /// chi
    pub saturation_slope: f64,
}

impl TothParameters {
    /// A contribution with no uptake at any condition.
    pub fn is_inert(&self) -> bool {
        self.saturation_capacity == 0.0 || self.affinity == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SorbentIsotherm {
    pub chemical: TothParameters,
    pub physical: TothParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SorbentProperties {
    /// mm
    pub particle_diameter: f64,
    /// kg/m3
    pub solid_density: f64,
    /// kg/m3
    pub particle_density: f64,
    pub bed_fraction: f64,
    /// kg/m3
    pub bed_density: f64,
    /// J/(kg·K)
    pub heat_capacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SorbentRecord {
    pub isotherm: SorbentIsotherm,
    pub properties: SorbentProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SorbentTable {
    pub sorbents: BTreeMap<Sorbent, SorbentRecord>,
}

fn toth(t0: f64, b0: f64, q: f64, het: f64, slope: f64, qs0: f64, chi: f64) -> TothParameters {
    TothParameters {
        reference_temperature: t0,
        affinity: b0,
        heat_of_adsorption: q,
        heterogeneity: het,
        heterogeneity_slope: slope,
        saturation_capacity: qs0,
        saturation_slope: chi,
    }
}

fn bulk(dp: f64, ro_s: f64, ro_p: f64, fb: f64, ro_b: f64, cp: f64) -> SorbentProperties {
    SorbentProperties {
        particle_diameter: dp,
        solid_density: ro_s,
        particle_density: ro_p,
        bed_fraction: fb,
        bed_density: ro_b,
        heat_capacity: cp,
    }
}

impl SorbentTable {
    pub fn get(&self, sorbent: Sorbent) -> Option<&SorbentRecord> {
        self.sorbents.get(&sorbent)
    }

    pub fn reference() -> Self {
        let rows = [
            (
                Sorbent::ApdesNfc,
                toth(296.0, 0.560e6, 50000.0, 0.368, 0.368, 2.310, 2.501),
                toth(296.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0),
                bulk(1.3, 1589.9, 61.0, 0.908, 55.4, 2010.0),
            ),
            (
                Sorbent::TriPeMcm41,
                toth(298.0, 3.135e6, 117.8e3, 0.236, 0.482, 2.897, 0.207),
                toth(298.0, 0.636, 2.64e3, 0.872, 0.003, 8.208, 4.539),
                bulk(1.0, 2120.0, 550.0, 0.582, 320.0, 1000.0),
            ),
            (
                Sorbent::Mil101CrPei800,
                toth(270.0, 9.960e6, 68.3e3, 0.243, 1.802, 3.450, 4.504),
                toth(270.0, 93.2, 40.1e3, 0.163, 2.287, 6.205, 0.579),
                bulk(0.996, 1590.0, 500.0, 0.0, 377.1, 892.5),
            ),
            (
                Sorbent::LewatitVpoc106,
                toth(278.0, 2.540e6, 91.2e3, 0.442, 0.520, 2.211, 0.0),
                toth(278.0, 1.51e2, 5.19e3, 0.636, 2.407, 1.840, 7.186),
                bulk(0.688, 1070.0, 880.0, 0.773, 680.0, 1580.0),
            ),
        ];
        let sorbents = rows
            .into_iter()
            .map(|(sorbent, chemical, physical, properties)| {
                (
                    sorbent,
                    SorbentRecord {
                        isotherm: SorbentIsotherm { chemical, physical },
                        properties,
                    },
                )
            })
            .collect();
        Self { sorbents }
    }
}

impl Default for SorbentTable {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apdes_physisorption_is_inert() {
        let table = SorbentTable::reference();
        let apdes = table.get(Sorbent::ApdesNfc).unwrap();
        assert!(apdes.isotherm.physical.is_inert());
        assert!(!apdes.isotherm.chemical.is_inert());
        for s in Sorbent::ALL {
            assert!(table.get(s).is_some(), "missing {}", s.label());
        }
    }
}
