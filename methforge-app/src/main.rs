use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, path::PathBuf};

mod config;
mod solver;
mod workflow;

#[derive(Parser, Debug)]
#[command(version, about = "Builds and solves the direct-air-capture to methane superstructure")]
struct Cli {
    /// Run configuration (YAML); the base case is used if the file does not exist.
    #[arg(short, long, default_value = "methforge-app/run.yaml")]
    config: PathBuf,

    /// Property table overrides (YAML).
    #[arg(short, long)]
    properties: Option<PathBuf>,

    /// Saturated-steam table (CSV) replacing the built-in one.
    #[arg(long)]
    steam_table: Option<PathBuf>,

    /// CO2 in the air intake, kmol/h; the other species follow at ambient composition.
    #[arg(long)]
    co2_intake: Option<f64>,

    /// Leave every technology family to the solver.
    #[arg(long)]
    open: bool,

    /// External solver program; without it only the model is written.
    #[arg(short, long)]
    solver: Option<String>,

    /// Extra arguments passed to the solver before the request and outcome paths.
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,

    #[arg(short, long, default_value = "./data/runs")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    println!("--- Methforge Application ---");

    let inputs = config::RunInputs::load(
        &cli.config,
        cli.properties.as_deref(),
        cli.steam_table.as_deref(),
        cli.co2_intake,
        cli.open,
    )?;

    let output_dir = cli
        .output
        .join(format!("DAC_CH4_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    // Keep the effective configuration with the results.
    let effective = serde_yaml::to_string(&inputs.config)?;
    fs::write(output_dir.join("run.yaml"), effective)?;

    let plant = workflow::build_model(inputs, &output_dir)?;

    match &cli.solver {
        Some(program) => {
            let solver = solver::ExternalCommandSolver::new(program.clone(), cli.solver_args.clone(), &output_dir);
            workflow::solve_and_report(&plant, &solver, &output_dir)?;
        }
        None => println!("\nNo solver given; stopping after model assembly."),
    }

    println!("\nWorkflow complete. Results are in '{}'", output_dir.display());
    Ok(())
}
