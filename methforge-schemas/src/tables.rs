use crate::{
    component::ComponentTable, equipment::EquipmentCostTable, fan::FanTable,
    sorbent::SorbentTable, technology::ElectrolyzerTable,
};
use serde::{Deserialize, Serialize};

/// Every reference table the model reads, bundled for hand-off to the builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyTables {
    pub components: ComponentTable,
    pub equipment: EquipmentCostTable,
    pub sorbents: SorbentTable,
    pub fans: FanTable,
    pub electrolyzers: ElectrolyzerTable,
}
