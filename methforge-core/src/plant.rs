use crate::{
    config::PlantConfig,
    economics::{self, EconomicVariables},
    error::MethforgeError,
    heat::{SteamPrices, SteamTable, TabulatedSteamTable},
    model::{Model, ModelBuilder, VarId},
    network::{plant_nodes, DefinitionTable, NodeKind, StreamNetwork},
    selection::Selections,
    units::{air_cooler, air_intake, dfm, electrolysis, furnace, separator, steam, tvsa, CostLedger, UnitContext},
};
use methforge_schemas::{component::ComponentId, tables::PropertyTables};

/// A fluent builder for assembling the plant superstructure into a frozen `Model`.
///
/// Anything not supplied falls back to the base case: default configuration,
/// reference property tables and the built-in saturated-steam table.
#[derive(Default)]
pub struct PlantModelBuilder {
    config: Option<PlantConfig>,
    tables: Option<PropertyTables>,
    steam_table: Option<Box<dyn SteamTable>>,
}

impl PlantModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PlantConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the component, equipment, sorbent, fan and electrolyzer tables.
    pub fn with_properties(mut self, tables: PropertyTables) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn with_steam_table(mut self, table: Box<dyn SteamTable>) -> Self {
        self.steam_table = Some(table);
        self
    }

    /// Consumes the builder and emits every variable, constraint and the objective.
    ///
    /// # Errors
    ///
    /// Returns the first construction error: invalid configuration, selection
    /// conflict, undersized Big-M, missing property record, steam table range, or a
    /// flow whose definition is missing or duplicated.
    pub fn build(self) -> Result<PlantModel, MethforgeError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let tables = self.tables.unwrap_or_default();
        let steam_table: Box<dyn SteamTable> = match self.steam_table {
            Some(table) => table,
            None => Box::new(TabulatedSteamTable::reference()?),
        };
        let params = &config.parameters;
        let numerics = &config.numerics;

        let mut builder = ModelBuilder::new("methforge");
        let table = DefinitionTable::plant(&config.feed)?;
        let mut network = StreamNetwork::declare(&mut builder, table, numerics.flow_upper_bound)?;
        let selections = Selections::resolve(&mut builder, &config.pins)?;
        numerics.big_m.validate(
            numerics.flow_upper_bound * ComponentId::COUNT as f64,
            max_recoverable_duty(&tables, numerics.flow_upper_bound, numerics.temperature_upper_bound),
        )?;

        for node in plant_nodes() {
            network.attach_node(&mut builder, &node)?;
            if node.kind != NodeKind::Splitter {
                continue;
            }
            for (stream, gate) in &node.branches {
                let Some(gate) = gate else { continue };
                for c in ComponentId::ALL {
                    selections.gate_branch(
                        &mut builder,
                        format!("{}.gate[{stream},{}]", node.id.label(), c.label()),
                        network.x(*stream, c),
                        *gate,
                        numerics.big_m.flow,
                    )?;
                }
            }
        }

        let steam_prices = SteamPrices::from_table(steam_table.as_ref(), &params.steam, &params.economics)?;
        let mut costs = CostLedger::default();
        let hydrogen_temperature = {
            let mut ctx = UnitContext {
                builder: &mut builder,
                network: &mut network,
                selections: &selections,
                tables: &tables,
                params,
                pins: &config.pins,
                numerics,
                steam: steam_table.as_ref(),
                costs: &mut costs,
            };
            let hydrogen_temperature = electrolysis::attach(&mut ctx)?;
            let head = air_intake::attach(&mut ctx)?;
            dfm::attach(&mut ctx, &head)?;
            tvsa::attach(&mut ctx, &head)?;
            let cooled = steam::attach(&mut ctx)?;
            furnace::attach(&mut ctx)?;
            air_cooler::attach(&mut ctx, cooled)?;
            separator::attach(&mut ctx)?;
            hydrogen_temperature
        };

        let economics = economics::attach(
            &mut builder,
            &network,
            &tables.components,
            &params.economics,
            &steam_prices,
            &costs,
        )?;
        network.verify_complete()?;

        log::info!(
            "Assembled plant model: {} variables, {} constraints, {} open families",
            builder.num_variables(),
            builder.num_constraints(),
            selections.open_families().len()
        );
        let model = builder.freeze()?;
        Ok(PlantModel {
            model,
            network,
            selections,
            steam_prices,
            costs,
            economics,
            hydrogen_temperature,
            config,
        })
    }
}

/// Largest duty any gated heat bucket could carry, kJ/h.
fn max_recoverable_duty(tables: &PropertyTables, flow_upper: f64, temperature_upper: f64) -> f64 {
    ComponentId::ALL
        .into_iter()
        .filter_map(|c| tables.components.get(c))
        .map(|props| props.heat_capacity * flow_upper * temperature_upper)
        .sum()
}

/// The assembled superstructure and the handles needed to read a solution back.
#[derive(Debug)]
pub struct PlantModel {
    pub model: Model,
    pub network: StreamNetwork,
    pub selections: Selections,
    pub steam_prices: SteamPrices,
    pub costs: CostLedger,
    pub economics: EconomicVariables,
    /// °C of the hydrogen delivered to the capture route.
    pub hydrogen_temperature: VarId,
    pub config: PlantConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sense;

    #[test]
    fn base_case_builds_without_open_families_except_zone_and_band() {
        let plant = PlantModelBuilder::new().build().unwrap();
        let families: Vec<_> = plant.selections.open_families().into_iter().map(|(f, _)| f).collect();
        assert_eq!(families, vec!["head_band", "air_cooler_zone"]);
        assert!(plant.model.variable_id("y.adsorption[DFM]").is_none());
        assert_eq!(
            plant.model.constraint("economics.tac").map(|c| c.sense),
            Some(Sense::Eq)
        );
    }

    #[test]
    fn undersized_big_m_is_rejected() {
        let mut config = PlantConfig::default();
        config.numerics.big_m.flow = 10.0;
        let err = PlantModelBuilder::new().with_config(config).build().unwrap_err();
        assert!(matches!(err, MethforgeError::BigMTooSmall { .. }));
    }
}
