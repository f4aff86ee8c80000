use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equipment classes with a purchased-cost correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    /// Sized by shaft power, kW.
    CentrifugalCompressor,
    /// Sized by shaft power, kW.
    Pump,
    /// Sized by volumetric flow, m3/h.
    AxialFan,
    /// Sized by volumetric flow, m3/h.
    CentrifugalFan,
    /// Sized by heat-transfer area, m2.
    ShellAndTubeExchanger,
    /// Sized by duty, MW.
    CylindricalFurnace,
    /// Sized by volume, m3.
    Reactor,
    /// Sized by bare-tube area, ft2.
    AirCooler,
    /// Sized by shell weight, kg.
    VerticalVessel,
}

impl EquipmentClass {
    pub const ALL: [EquipmentClass; 9] = [
        EquipmentClass::CentrifugalCompressor,
        EquipmentClass::Pump,
        EquipmentClass::AxialFan,
        EquipmentClass::CentrifugalFan,
        EquipmentClass::ShellAndTubeExchanger,
        EquipmentClass::CylindricalFurnace,
        EquipmentClass::Reactor,
        EquipmentClass::AirCooler,
        EquipmentClass::VerticalVessel,
    ];
}

/// Coefficients of `cost = a + b·S^n`, valid for `S` in `[s_lower, s_upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeCostRecord {
    pub s_lower: f64,
    pub s_upper: f64,
    pub a: f64,
    pub b: f64,
    pub n: f64,
}

impl SizeCostRecord {
    /// Whether `size` lies inside the correlation's validated range.
    pub fn contains(&self, size: f64) -> bool {
        size >= self.s_lower && size <= self.s_upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCostTable {
    pub records: BTreeMap<EquipmentClass, SizeCostRecord>,
}

impl EquipmentCostTable {
    pub fn get(&self, class: EquipmentClass) -> Option<&SizeCostRecord> {
        self.records.get(&class)
    }

    /// Towler & Sinnott correlations, air cooler from Seider et al.
    pub fn reference() -> Self {
        use EquipmentClass::*;
        let rows = [
            (CentrifugalCompressor, 1.0, 30000.0, 490000.0, 16800.0, 0.6),
            (Pump, 1.0, 2500.0, 950.0, 1770.0, 0.6),
            (AxialFan, 100.0, 170000.0, 4200.0, 27.0, 0.8),
            (CentrifugalFan, 100.0, 170000.0, 53000.0, 28000.0, 0.8),
            (ShellAndTubeExchanger, 10.0, 1000.0, 24000.0, 46.0, 1.2),
            (CylindricalFurnace, 0.2, 60.0, 68500.0, 93000.0, 0.8),
            (Reactor, 0.5, 100.0, 53000.0, 28000.0, 0.8),
            (AirCooler, 40.0, 150.0, 0.0, 2835.0, 0.45),
            (VerticalVessel, 160.0, 250000.0, 10000.0, 29.0, 0.85),
        ];
        let records = rows
            .into_iter()
            .map(|(class, s_lower, s_upper, a, b, n)| {
                (
                    class,
                    SizeCostRecord {
                        s_lower,
                        s_upper,
                        a,
                        b,
                        n,
                    },
                )
            })
            .collect();
        Self { records }
    }
}

impl Default for EquipmentCostTable {
    fn default() -> Self {
        Self::reference()
    }
}
