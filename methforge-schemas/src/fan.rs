//! Air-intake fan types: operating envelopes, purchased-cost polynomials and
//! head-band derating factors (Seider et al.).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanType {
    CentrifugalBackwardCurved,
    CentrifugalStraightRadial,
    VaneAxial,
}

impl FanType {
    pub const ALL: [FanType; 3] = [
        FanType::CentrifugalBackwardCurved,
        FanType::CentrifugalStraightRadial,
        FanType::VaneAxial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FanType::CentrifugalBackwardCurved => "Centrifugal backward-curved",
            FanType::CentrifugalStraightRadial => "Centrifugal straight-radial",
            FanType::VaneAxial => "Vane-axial",
        }
    }

    /// Short tag used in variable names.
    pub fn tag(self) -> &'static str {
        match self {
            FanType::CentrifugalBackwardCurved => "f1",
            FanType::CentrifugalStraightRadial => "f2",
            FanType::VaneAxial => "f3",
        }
    }
}

/// Pressure-rise band shared by all fan systems; selects the head factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadBand {
    First,
    Second,
    Third,
    Fourth,
}

impl HeadBand {
    pub const ALL: [HeadBand; 4] = [
        HeadBand::First,
        HeadBand::Second,
        HeadBand::Third,
        HeadBand::Fourth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HeadBand::First => "band1",
            HeadBand::Second => "band2",
            HeadBand::Third => "band3",
            HeadBand::Fourth => "band4",
        }
    }
}

/// Upper pressure rise of a band and the cost multiplier that applies inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadBandRecord {
    /// Pa
    pub head_limit: f64,
    pub factor: f64,
}

/// `cost = c3·q³ + c2·q² + c1·q + c0` with `q` the per-fan flow in ACFM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanCostPolynomial {
    pub cubic: f64,
    pub quadratic: f64,
    pub linear: f64,
    pub constant: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanRecord {
    /// m3/s per fan
    pub min_flow: f64,
    /// m3/s per fan
    pub max_flow: f64,
    /// Pa
    pub max_head: f64,
    pub cost: FanCostPolynomial,
    pub head_bands: BTreeMap<HeadBand, HeadBandRecord>,
    /// Bounds on the number of fans in a system of this type.
    pub min_count: f64,
    pub max_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanTable {
    pub fans: BTreeMap<FanType, FanRecord>,
}

fn bands(limits: [f64; 4], factors: [f64; 4]) -> BTreeMap<HeadBand, HeadBandRecord> {
    HeadBand::ALL
        .into_iter()
        .zip(limits.into_iter().zip(factors))
        .map(|(band, (head_limit, factor))| (band, HeadBandRecord { head_limit, factor }))
        .collect()
}

impl FanTable {
    pub fn get(&self, fan: FanType) -> Option<&FanRecord> {
        self.fans.get(&fan)
    }

    pub fn reference() -> Self {
        let mut fans = BTreeMap::new();
        fans.insert(
            FanType::CentrifugalBackwardCurved,
            FanRecord {
                min_flow: 0.4722,
                max_flow: 47.2222,
                max_head: 10000.0,
                cost: FanCostPolynomial {
                    cubic: 0.0,
                    quadratic: 1e-6,
                    linear: 0.264,
                    constant: 1585.0,
                },
                head_bands: bands([2000.0, 3700.0, 7500.0, 10000.0], [1.15, 1.3, 1.45, 1.55]),
                min_count: 10.0,
                max_count: 100.0,
            },
        );
        fans.insert(
            FanType::CentrifugalStraightRadial,
            FanRecord {
                min_flow: 0.4722,
                max_flow: 9.4444,
                max_head: 7500.0,
                cost: FanCostPolynomial {
                    cubic: 0.0,
                    quadratic: 3e-6,
                    linear: 0.264,
                    constant: 1042.9,
                },
                head_bands: bands([2000.0, 3700.0, 7500.0, 7500.0], [1.15, 1.3, 1.45, 1.45]),
                min_count: 1.0,
                max_count: 100.0,
            },
        );
        fans.insert(
            FanType::VaneAxial,
            FanRecord {
                min_flow: 0.4722,
                max_flow: 377.7778,
                max_head: 4000.0,
                cost: FanCostPolynomial {
                    cubic: 8e-14,
                    quadratic: 2e-8,
                    linear: 0.1562,
                    constant: 1042.9,
                },
                head_bands: bands([2000.0, 4000.0, 4000.0, 4000.0], [1.15, 1.3, 1.3, 1.3]),
                min_count: 1.0,
                max_count: 20.0,
            },
        );
        Self { fans }
    }
}

impl Default for FanTable {
    fn default() -> Self {
        Self::reference()
    }
}
