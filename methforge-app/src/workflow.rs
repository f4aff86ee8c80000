use crate::config::RunInputs;
use anyhow::{Context, Result};
use methforge_core::{
    export,
    plant::{PlantModel, PlantModelBuilder},
    solve::{Orchestrator, Solver},
};
use std::{fs, path::Path};

/// Assembles the superstructure and saves the frozen model next to the run's outputs.
pub fn build_model(inputs: RunInputs, output_dir: &Path) -> Result<PlantModel> {
    println!("\n--- [Workflow] Assembling Plant Model ---");
    let mut builder = PlantModelBuilder::new()
        .with_config(inputs.config)
        .with_properties(inputs.tables);
    if let Some(table) = inputs.steam_table {
        builder = builder.with_steam_table(table);
    }
    let plant = builder
        .build()
        .context("Failed to assemble the plant model")?;
    println!(
        "Model '{}': {} variables, {} constraints.",
        plant.model.name(),
        plant.model.num_variables(),
        plant.model.constraints().len()
    );
    let open: Vec<&str> = plant
        .selections
        .open_families()
        .into_iter()
        .map(|(family, _)| family)
        .collect();
    println!("Open technology families: {}", if open.is_empty() { "none".to_string() } else { open.join(", ") });

    let model_path = output_dir.join("model.json");
    let json = serde_json::to_string_pretty(&plant.model)?;
    fs::write(&model_path, json)
        .with_context(|| format!("Failed to write {}", model_path.display()))?;
    println!("Model written to '{}'", model_path.display());
    Ok(plant)
}

/// Solves once and writes the stream table, headline and per-unit costs.
pub fn solve_and_report(plant: &PlantModel, solver: &dyn Solver, output_dir: &Path) -> Result<()> {
    println!("\n--- [Workflow] Solving with '{}' ---", solver.name());
    let solution = Orchestrator::new(solver, plant.config.solve.clone()).run(plant)?;

    for note in solution.diagnostics() {
        println!("  ! {note}");
    }
    let broken = solution.check_invariants(plant.config.solve.feasibility_tolerance);
    for v in &broken {
        log::warn!("Invariant '{}' off by {:e}", v.name, v.amount);
    }

    println!("\n--- [Workflow] Writing Reports ---");
    export::write_stream_table(&solution, &output_dir.join("streams.csv"))?;
    export::write_headline(&solution, &output_dir.join("headline.csv"))?;
    export::write_unit_costs(&solution, &output_dir.join("unit_costs.csv"))?;

    let summary = solution.summary();
    println!("Status: {}", solution.status());
    println!("TAC:    {:>16.2} $/yr", summary.tac);
    println!("CAPEX:  {:>16.2} $/yr", summary.capex);
    println!("OPEX:   {:>16.2} $/yr", summary.opex);
    println!("Profit: {:>16.2} $/yr", summary.profit);
    Ok(())
}
