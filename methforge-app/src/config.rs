use anyhow::{Context, Result};
use methforge_core::{
    config::{DesignPins, PlantConfig},
    heat::{SteamTable, TabulatedSteamTable},
};
use methforge_schemas::{component::air_feed_for, file_formats::PropertyFile, tables::PropertyTables};
use std::{fs, path::Path};

/// Everything a run reads from disk before the model is assembled.
pub struct RunInputs {
    pub config: PlantConfig,
    pub tables: PropertyTables,
    /// `None` keeps the built-in saturated-steam table.
    pub steam_table: Option<Box<dyn SteamTable>>,
}

impl RunInputs {
    /// Loads the run configuration and optional property overrides.
    ///
    /// A missing configuration file means the base case.
    pub fn load(
        config_path: &Path,
        properties_path: Option<&Path>,
        steam_table_path: Option<&Path>,
        co2_intake: Option<f64>,
        open: bool,
    ) -> Result<Self> {
        let mut config = if config_path.exists() {
            println!("Loading configuration from '{}'...", config_path.display());
            let source = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            PlantConfig::from_yaml(&source, &config_path.display().to_string())?
        } else {
            println!(
                "No configuration at '{}', using the base case.",
                config_path.display()
            );
            PlantConfig::default()
        };
        if open {
            config.pins = DesignPins::open();
        }
        if let Some(co2) = co2_intake {
            config.feed = air_feed_for(co2);
            println!("Air intake rescaled to {co2} kmol/h CO2.");
        }

        let mut tables = PropertyTables::default();
        if let Some(path) = properties_path {
            println!("Applying property overrides from '{}'...", path.display());
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file: PropertyFile = serde_yaml::from_str(&source)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            log::debug!("Property file schema version {}", file.schema_version);
            tables = file.apply(tables);
        }

        let steam_table = match steam_table_path {
            Some(path) => {
                println!("Loading steam table from '{}'...", path.display());
                let table = TabulatedSteamTable::from_csv(path)?;
                Some(Box::new(table) as Box<dyn SteamTable>)
            }
            None => None,
        };

        Ok(Self {
            config,
            tables,
            steam_table,
        })
    }
}
