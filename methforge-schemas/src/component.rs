//! Chemical species carried by the plant's streams and their reference properties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// The closed set of species tracked in every stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentId {
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "H2")]
    H2,
    #[serde(rename = "CH4")]
    Ch4,
    #[serde(rename = "H2O")]
    H2o,
    #[serde(rename = "N2")]
    N2,
    #[serde(rename = "O2")]
    O2,
}

impl ComponentId {
    pub const COUNT: usize = 6;

    pub const ALL: [ComponentId; Self::COUNT] = [
        ComponentId::Co2,
        ComponentId::H2,
        ComponentId::Ch4,
        ComponentId::H2o,
        ComponentId::N2,
        ComponentId::O2,
    ];

    /// Position of the species in [`ComponentId::ALL`].
    pub fn index(self) -> usize {
        match self {
            ComponentId::Co2 => 0,
            ComponentId::H2 => 1,
            ComponentId::Ch4 => 2,
            ComponentId::H2o => 3,
            ComponentId::N2 => 4,
            ComponentId::O2 => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComponentId::Co2 => "CO2",
            ComponentId::H2 => "H2",
            ComponentId::Ch4 => "CH4",
            ComponentId::H2o => "H2O",
            ComponentId::N2 => "N2",
            ComponentId::O2 => "O2",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Physical and market properties of one species at process conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// kg/kmol
    pub molar_mass: f64,
    /// $/kmol purchase cost
    pub cost: f64,
    /// $/kmol sale price; negative values penalise the species leaving in the product
    pub price: f64,
    /// kg/m3 at process conditions
    pub density: f64,
    /// kJ/(kmol·°C) around 350 °C
    pub heat_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTable {
    pub components: BTreeMap<ComponentId, Component>,
}

impl ComponentTable {
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Base-case property set.
    pub fn reference() -> Self {
        let rows = [
            (ComponentId::Co2, 44.01, 0.0, 0.0, 1.84, 47.25),
            (ComponentId::H2, 2.016, 0.0, -200.0, 0.0837, 29.29),
            (ComponentId::Ch4, 16.04, 0.0, 9.0, 0.657, 53.78),
            (ComponentId::H2o, 18.01528, 0.0, 0.0, 0.88, 37.21),
            (ComponentId::N2, 28.0134, 0.0, 0.0, 1.165, 0.0),
            (ComponentId::O2, 31.999, 0.0, 0.0, 1.331, 0.0),
        ];
        let components = rows
            .into_iter()
            .map(|(id, molar_mass, cost, price, density, heat_capacity)| {
                (
                    id,
                    Component {
                        molar_mass,
                        cost,
                        price,
                        density,
                        heat_capacity,
                    },
                )
            })
            .collect();
        Self { components }
    }
}

impl Default for ComponentTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// A per-species quantity, typically a molar flow in kmol/h.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentVector {
    #[serde(rename = "CO2", default)]
    pub co2: f64,
    #[serde(rename = "H2", default)]
    pub h2: f64,
    #[serde(rename = "CH4", default)]
    pub ch4: f64,
    #[serde(rename = "H2O", default)]
    pub h2o: f64,
    #[serde(rename = "N2", default)]
    pub n2: f64,
    #[serde(rename = "O2", default)]
    pub o2: f64,
}

impl ComponentVector {
    pub fn from_fn(mut f: impl FnMut(ComponentId) -> f64) -> Self {
        let mut out = Self::default();
        for c in ComponentId::ALL {
            out[c] = f(c);
        }
        out
    }

    /// Scales every species by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_fn(|c| self[c] * factor)
    }
}

impl Index<ComponentId> for ComponentVector {
    type Output = f64;

    fn index(&self, c: ComponentId) -> &f64 {
        match c {
            ComponentId::Co2 => &self.co2,
            ComponentId::H2 => &self.h2,
            ComponentId::Ch4 => &self.ch4,
            ComponentId::H2o => &self.h2o,
            ComponentId::N2 => &self.n2,
            ComponentId::O2 => &self.o2,
        }
    }
}

impl IndexMut<ComponentId> for ComponentVector {
    fn index_mut(&mut self, c: ComponentId) -> &mut f64 {
        match c {
            ComponentId::Co2 => &mut self.co2,
            ComponentId::H2 => &mut self.h2,
            ComponentId::Ch4 => &mut self.ch4,
            ComponentId::H2o => &mut self.h2o,
            ComponentId::N2 => &mut self.n2,
            ComponentId::O2 => &mut self.o2,
        }
    }
}

/// Base-case air intake, sized for roughly 10,000 t CO2 per year.
pub fn reference_air_feed() -> ComponentVector {
    ComponentVector {
        co2: 26.0,
        n2: 51226.0,
        o2: 13747.0,
        ..ComponentVector::default()
    }
}

/// Intake carrying `co2_flow` kmol/h of CO2 at the base-case air composition.
pub fn air_feed_for(co2_flow: f64) -> ComponentVector {
    let reference = reference_air_feed();
    reference.scaled(co2_flow / reference.co2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn indices_follow_all_order() {
        for (i, c) in ComponentId::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(ComponentId::from_label(c.label()), Some(*c));
        }
        assert_eq!(ComponentId::from_label("Ar"), None);
    }

    #[test]
    fn reference_table_covers_every_species() {
        let table = ComponentTable::reference();
        for c in ComponentId::ALL {
            assert!(table.get(c).is_some(), "missing {}", c.label());
        }
        assert_relative_eq!(table.get(ComponentId::H2o).unwrap().molar_mass, 18.01528);
    }

    #[test]
    fn scaled_feed_keeps_air_composition() {
        let feed = air_feed_for(2.6);
        assert_relative_eq!(feed.co2, 2.6, max_relative = 1e-12);
        assert_relative_eq!(feed.n2, 5122.6, max_relative = 1e-12);
        assert_relative_eq!(feed.o2, 1374.7, max_relative = 1e-12);
        assert_relative_eq!(feed.h2o, 0.0);
    }
}
