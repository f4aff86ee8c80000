//! Mutually exclusive technology families.
//!
//! A family pinned by configuration (or narrowed to a single option by its
//! exclusions) resolves to [`Choice::Decided`] and contributes no binaries: its
//! indicators are the constants 1 and 0, so terms of unselected options fold away
//! while the expressions are built. Only open families reach the solver as
//! binaries with an exactly-one constraint and Big-M gates.

use crate::config::{DesignPins, Exclusions};
use crate::error::MethforgeError;
use crate::model::{Expr, ModelBuilder, VarId};
use crate::network::BranchGate;
use methforge_schemas::{
    fan::{FanType, HeadBand},
    sorbent::Sorbent,
    technology::{AdsorptionTechnology, AirCoolerZone, ElectrolyzerType, SteamLevel},
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub trait Technology: Copy + Eq + Ord + Debug + 'static {
    /// Family name used in variable names and error messages.
    const FAMILY: &'static str;

    fn all() -> &'static [Self];

    fn label(self) -> &'static str;

    /// Case-insensitive lookup by label.
    fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|o| o.label().eq_ignore_ascii_case(label))
    }

    /// The resolved family inside a plant's selections.
    fn choice(selections: &Selections) -> &Choice<Self>;
}

macro_rules! impl_technology {
    ($ty:ty, $family:literal, $field:ident) => {
        impl Technology for $ty {
            const FAMILY: &'static str = $family;

            fn all() -> &'static [Self] {
                &<$ty>::ALL
            }

            fn label(self) -> &'static str {
                <$ty>::label(self)
            }

            fn choice(selections: &Selections) -> &Choice<Self> {
                &selections.$field
            }
        }
    };
}

impl_technology!(ElectrolyzerType, "electrolyzer", electrolyzer);
impl_technology!(FanType, "fan", fan);
impl_technology!(HeadBand, "head_band", head_band);
impl_technology!(AdsorptionTechnology, "adsorption", adsorption);
impl_technology!(Sorbent, "sorbent", sorbent);
impl_technology!(SteamLevel, "steam_level", steam_level);
impl_technology!(AirCoolerZone, "air_cooler_zone", air_cooler_zone);

/// A technology family after configuration has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice<T: Technology> {
    Decided(T),
    /// One binary per remaining option.
    Open(Vec<(T, VarId)>),
}

impl<T: Technology> Choice<T> {
    /// Applies a pin and exclusions to the family, declaring binaries and the
    /// exactly-one constraint when more than one option remains.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::SelectionConflict` if the pinned option is also
    /// excluded, or if every option is excluded.
    pub fn resolve(builder: &mut ModelBuilder, pin: Option<T>, exclusions: &[T]) -> Result<Self, MethforgeError> {
        if let Some(pinned) = pin {
            if exclusions.contains(&pinned) {
                return Err(MethforgeError::SelectionConflict {
                    family: T::FAMILY,
                    reason: format!("'{}' is both pinned and excluded", pinned.label()),
                });
            }
            log::debug!("{} pinned to {}", T::FAMILY, pinned.label());
            return Ok(Choice::Decided(pinned));
        }

        let remaining: Vec<T> = T::all()
            .iter()
            .copied()
            .filter(|o| !exclusions.contains(o))
            .collect();
        match remaining.as_slice() {
            [] => Err(MethforgeError::SelectionConflict {
                family: T::FAMILY,
                reason: "every option is excluded".to_string(),
            }),
            [only] => {
                log::debug!("{} narrowed to {} by exclusions", T::FAMILY, only.label());
                Ok(Choice::Decided(*only))
            }
            options => {
                let mut binaries = Vec::with_capacity(options.len());
                for &option in options {
                    let y = builder.binary(format!("y.{}[{}]", T::FAMILY, option.label()))?;
                    binaries.push((option, y));
                }
                builder.equal(
                    format!("select.{}", T::FAMILY),
                    Expr::sum(binaries.iter().map(|(_, y)| *y)),
                    1.0,
                )?;
                log::debug!("{} left open over {} options", T::FAMILY, binaries.len());
                Ok(Choice::Open(binaries))
            }
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(self, Choice::Decided(_))
    }

    /// Options that may still end up selected.
    pub fn candidates(&self) -> Vec<T> {
        match self {
            Choice::Decided(t) => vec![*t],
            Choice::Open(binaries) => binaries.iter().map(|(t, _)| *t).collect(),
        }
    }

    pub fn is_candidate(&self, option: T) -> bool {
        match self {
            Choice::Decided(t) => *t == option,
            Choice::Open(binaries) => binaries.iter().any(|(t, _)| *t == option),
        }
    }

    pub fn binaries(&self) -> &[(T, VarId)] {
        match self {
            Choice::Decided(_) => &[],
            Choice::Open(binaries) => binaries,
        }
    }

    /// 1 or 0 for a decided family, the option's binary otherwise.
    pub fn indicator(&self, option: T) -> Expr {
        match self {
            Choice::Decided(t) => Expr::constant(if *t == option { 1.0 } else { 0.0 }),
            Choice::Open(binaries) => binaries
                .iter()
                .find(|(t, _)| *t == option)
                .map_or_else(Expr::zero, |(_, y)| Expr::Var(*y)),
        }
    }

    /// `Σ value(option)·indicator(option)`.
    pub fn weighted(&self, value: impl Fn(T) -> f64) -> Expr {
        self.blend(|o| Expr::constant(value(o)))
    }

    /// `Σ term(option)·indicator(option)` over the candidates.
    pub fn blend(&self, term: impl Fn(T) -> Expr) -> Expr {
        match self {
            Choice::Decided(t) => term(*t),
            Choice::Open(binaries) => Expr::sum(binaries.iter().map(|(o, y)| term(*o) * *y)),
        }
    }

    /// Forces `quantity` to zero unless `option` is selected.
    ///
    /// A decided family emits `quantity = 0` for unselected options and nothing for
    /// the selected one; an open family emits `quantity ≤ big_m·y`.
    ///
    /// # Errors
    ///
    /// Propagates builder errors such as duplicate constraint names.
    pub fn gate(
        &self,
        builder: &mut ModelBuilder,
        name: impl Into<String>,
        quantity: impl Into<Expr>,
        option: T,
        big_m: f64,
    ) -> Result<(), MethforgeError> {
        match self {
            Choice::Decided(t) if *t == option => Ok(()),
            Choice::Decided(_) => builder.equal(name, quantity, 0.0),
            Choice::Open(_) => builder.less_equal(name, quantity, self.indicator(option) * big_m),
        }
    }

    /// The option selected at `point`, if the binaries settle on one.
    pub fn selected(&self, point: &[f64]) -> Option<T> {
        match self {
            Choice::Decided(t) => Some(*t),
            Choice::Open(binaries) => binaries
                .iter()
                .find(|(_, y)| point.get(y.index()).is_some_and(|v| *v > 0.5))
                .map(|(t, _)| *t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnacePolicy {
    #[default]
    Off,
    On,
    /// Left to the solver.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FurnaceSelection {
    Off,
    On,
    Optional(VarId),
}

impl FurnaceSelection {
    /// # Errors
    ///
    /// Propagates builder errors.
    pub fn resolve(builder: &mut ModelBuilder, policy: FurnacePolicy) -> Result<Self, MethforgeError> {
        Ok(match policy {
            FurnacePolicy::Off => FurnaceSelection::Off,
            FurnacePolicy::On => FurnaceSelection::On,
            FurnacePolicy::Optional => FurnaceSelection::Optional(builder.binary("y.furnace")?),
        })
    }

    pub fn indicator(&self) -> Expr {
        match self {
            FurnaceSelection::Off => Expr::zero(),
            FurnaceSelection::On => Expr::one(),
            FurnaceSelection::Optional(y) => Expr::Var(*y),
        }
    }

    pub fn installed(&self, point: &[f64]) -> bool {
        match self {
            FurnaceSelection::Off => false,
            FurnaceSelection::On => true,
            FurnaceSelection::Optional(y) => point.get(y.index()).is_some_and(|v| *v > 0.5),
        }
    }
}

/// Big-M magnitudes for flow gates (kmol/h) and duty gates (kJ/h).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigM {
    pub flow: f64,
    pub duty: f64,
}

impl Default for BigM {
    fn default() -> Self {
        Self {
            flow: 1e10,
            duty: 1e12,
        }
    }
}

impl BigM {
    /// Each magnitude must cover the largest value its gated quantity can take.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::BigMTooSmall` naming the family that would bind.
    pub fn validate(&self, max_flow: f64, max_duty: f64) -> Result<(), MethforgeError> {
        if self.flow < max_flow {
            return Err(MethforgeError::BigMTooSmall {
                family: "flow".to_string(),
                configured: self.flow,
                required: max_flow,
            });
        }
        if self.duty < max_duty {
            return Err(MethforgeError::BigMTooSmall {
                family: "duty".to_string(),
                configured: self.duty,
                required: max_duty,
            });
        }
        Ok(())
    }
}

/// Every technology family of the plant after resolution.
#[derive(Debug, Clone)]
pub struct Selections {
    pub electrolyzer: Choice<ElectrolyzerType>,
    pub fan: Choice<FanType>,
    pub head_band: Choice<HeadBand>,
    pub adsorption: Choice<AdsorptionTechnology>,
    pub sorbent: Choice<Sorbent>,
    pub steam_level: Choice<SteamLevel>,
    pub air_cooler_zone: Choice<AirCoolerZone>,
    pub furnace: FurnaceSelection,
}

impl Selections {
    /// # Errors
    ///
    /// Returns the first `SelectionConflict` among the families.
    pub fn resolve(builder: &mut ModelBuilder, pins: &DesignPins) -> Result<Self, MethforgeError> {
        let Exclusions {
            electrolyzer,
            fan,
            head_band,
            adsorption,
            sorbent,
            steam_level,
            air_cooler_zone,
        } = &pins.exclusions;
        Ok(Self {
            electrolyzer: Choice::resolve(builder, pins.electrolyzer, electrolyzer)?,
            fan: Choice::resolve(builder, pins.fan, fan)?,
            head_band: Choice::resolve(builder, pins.head_band, head_band)?,
            adsorption: Choice::resolve(builder, pins.adsorption, adsorption)?,
            sorbent: Choice::resolve(builder, pins.sorbent, sorbent)?,
            steam_level: Choice::resolve(builder, pins.steam_level, steam_level)?,
            air_cooler_zone: Choice::resolve(builder, pins.air_cooler_zone, air_cooler_zone)?,
            furnace: FurnaceSelection::resolve(builder, pins.furnace)?,
        })
    }

    /// Gates one splitter branch by the option it feeds.
    ///
    /// # Errors
    ///
    /// Propagates builder errors.
    pub fn gate_branch(
        &self,
        builder: &mut ModelBuilder,
        name: String,
        quantity: Expr,
        gate: BranchGate,
        big_m: f64,
    ) -> Result<(), MethforgeError> {
        match gate {
            BranchGate::Fan(f) => self.fan.gate(builder, name, quantity, f, big_m),
            BranchGate::Electrolyzer(e) => self.electrolyzer.gate(builder, name, quantity, e, big_m),
            BranchGate::Adsorption(a) => self.adsorption.gate(builder, name, quantity, a, big_m),
        }
    }

    /// Every open binary with its family, for invariant checks and reporting.
    pub fn open_families(&self) -> Vec<(&'static str, Vec<VarId>)> {
        fn ids<T: Technology>(choice: &Choice<T>) -> Option<(&'static str, Vec<VarId>)> {
            let ids: Vec<VarId> = choice.binaries().iter().map(|(_, y)| *y).collect();
            (!ids.is_empty()).then_some((T::FAMILY, ids))
        }
        [
            ids(&self.electrolyzer),
            ids(&self.fan),
            ids(&self.head_band),
            ids(&self.adsorption),
            ids(&self.sorbent),
            ids(&self.steam_level),
            ids(&self.air_cooler_zone),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sense;

    #[test]
    fn pinned_family_has_no_binaries() {
        let mut b = ModelBuilder::new("t");
        let choice = Choice::resolve(&mut b, Some(ElectrolyzerType::Soel), &[]).unwrap();
        assert!(choice.is_decided());
        assert_eq!(b.num_variables(), 0);
        assert_eq!(choice.indicator(ElectrolyzerType::Soel), Expr::one());
        assert_eq!(choice.indicator(ElectrolyzerType::Ael), Expr::zero());
    }

    #[test]
    fn open_family_declares_exactly_one_constraint() {
        let mut b = ModelBuilder::new("t");
        let choice: Choice<SteamLevel> = Choice::resolve(&mut b, None, &[SteamLevel::High]).unwrap();
        assert_eq!(choice.candidates(), vec![SteamLevel::Low, SteamLevel::Medium]);
        assert_eq!(b.num_variables(), 2);
        assert_eq!(b.num_constraints(), 1);
        assert_eq!(choice.selected(&[0.0, 1.0]), Some(SteamLevel::Medium));
    }

    #[test]
    fn single_remaining_option_is_decided() {
        let mut b = ModelBuilder::new("t");
        let choice = Choice::resolve(&mut b, None, &[AdsorptionTechnology::Tvsa]).unwrap();
        assert_eq!(choice, Choice::Decided(AdsorptionTechnology::Dfm));
    }

    #[test]
    fn conflicts_name_the_family() {
        let mut b = ModelBuilder::new("t");
        let err = Choice::resolve(&mut b, Some(FanType::VaneAxial), &[FanType::VaneAxial]).unwrap_err();
        assert!(matches!(err, MethforgeError::SelectionConflict { family: "fan", .. }));
        let err = Choice::<AdsorptionTechnology>::resolve(&mut b, None, &AdsorptionTechnology::ALL).unwrap_err();
        assert!(matches!(err, MethforgeError::SelectionConflict { family: "adsorption", .. }));
    }

    #[test]
    fn decided_gate_pins_unselected_quantity() {
        let mut b = ModelBuilder::new("t");
        let q = b.non_negative("q").unwrap();
        let choice = Choice::Decided(FanType::VaneAxial);
        choice.gate(&mut b, "on", q, FanType::VaneAxial, 1e10).unwrap();
        choice.gate(&mut b, "off", q, FanType::CentrifugalStraightRadial, 1e10).unwrap();
        b.minimize(q);
        let model = b.freeze().unwrap();
        assert!(model.constraint("on").is_none());
        assert_eq!(model.constraint("off").map(|c| c.sense), Some(Sense::Eq));
    }

    #[test]
    fn labels_resolve_case_insensitively() {
        assert_eq!(FanType::from_label("vane-axial"), Some(FanType::VaneAxial));
        assert_eq!(<Sorbent as Technology>::from_label("mil-101(cr)-pei-800"), Some(Sorbent::Mil101CrPei800));
        assert_eq!(ElectrolyzerType::from_label("alkaline"), None);
    }

    #[test]
    fn big_m_below_plausible_maximum_is_rejected() {
        let m = BigM { flow: 1e4, duty: 1e12 };
        assert!(matches!(m.validate(6e5, 1e10), Err(MethforgeError::BigMTooSmall { .. })));
        assert!(BigM::default().validate(6e5, 1.4e10).is_ok());
    }
}
