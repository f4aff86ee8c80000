use crate::{
    component::ComponentTable, equipment::EquipmentCostTable, fan::FanTable,
    sorbent::SorbentTable, tables::PropertyTables,
    technology::ElectrolyzerTable,
};
use serde::Deserialize;

/// A property override file. Each table present replaces the reference table as a whole.
#[derive(Debug, Deserialize)]
pub struct PropertyFile {
    pub schema_version: String,
    pub components: Option<ComponentTable>,
    pub equipment: Option<EquipmentCostTable>,
    pub sorbents: Option<SorbentTable>,
    pub fans: Option<FanTable>,
    pub electrolyzers: Option<ElectrolyzerTable>,
}

impl PropertyFile {
    /// Applies the overrides on top of `base`.
    pub fn apply(self, mut base: PropertyTables) -> PropertyTables {
        if let Some(components) = self.components {
            base.components = components;
        }
        if let Some(equipment) = self.equipment {
            base.equipment = equipment;
        }
        if let Some(sorbents) = self.sorbents {
            base.sorbents = sorbents;
        }
        if let Some(fans) = self.fans {
            base.fans = fans;
        }
        if let Some(electrolyzers) = self.electrolyzers {
            base.electrolyzers = electrolyzers;
        }
        base
    }
}
