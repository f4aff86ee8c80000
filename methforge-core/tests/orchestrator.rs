use methforge_core::{
    error::MethforgeError,
    export::{write_headline, write_stream_table, Headline},
    model::Model,
    plant::PlantModelBuilder,
    solve::{Orchestrator, SolveOptions, SolveStatus, Solver, SolverOutcome},
};
use methforge_schemas::technology::{AdsorptionTechnology, ElectrolyzerType};
use std::cell::Cell;

/// Returns the model's own starting point and counts how often it was asked.
struct StartingPoint {
    status: SolveStatus,
    calls: Cell<usize>,
}

impl Solver for StartingPoint {
    fn name(&self) -> &str {
        "starting-point"
    }

    fn solve(&self, model: &Model, _options: &SolveOptions) -> Result<SolverOutcome, MethforgeError> {
        self.calls.set(self.calls.get() + 1);
        let values = model.initial_point();
        Ok(SolverOutcome {
            status: self.status,
            objective: Some(model.evaluate_objective(&values)),
            values,
            message: None,
        })
    }
}

#[test]
fn optimal_outcome_becomes_a_plant_solution() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let solver = StartingPoint {
        status: SolveStatus::Optimal,
        calls: Cell::new(0),
    };
    let solution = Orchestrator::new(&solver, SolveOptions::default()).run(&plant).unwrap();
    assert_eq!(solver.calls.get(), 1);
    assert_eq!(solution.status(), SolveStatus::Optimal);
    assert_eq!(solution.selected::<ElectrolyzerType>(), Some(ElectrolyzerType::Soel));
    assert_eq!(solution.selected::<AdsorptionTechnology>(), Some(AdsorptionTechnology::Dfm));
    assert!(!solution.furnace_installed());
    assert_eq!(solution.quantity("dfm.reactor_count").unwrap(), 16.0);
    assert!(matches!(
        solution.quantity("no.such.variable"),
        Err(MethforgeError::UnknownVariable(_))
    ));

    let summary = solution.summary();
    let dfm = summary.units.iter().find(|u| u.name == "dfm").unwrap();
    assert!(dfm.selected);
    let headline = Headline::from_solution(&solution);
    assert_eq!(headline.adsorption, "DFM");
    assert_eq!(headline.status, "optimal");
}

#[test]
fn infeasible_outcome_is_an_error() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let solver = StartingPoint {
        status: SolveStatus::Infeasible,
        calls: Cell::new(0),
    };
    let err = Orchestrator::new(&solver, SolveOptions::default()).run(&plant).unwrap_err();
    assert!(matches!(err, MethforgeError::SolverFailure { .. }));
    assert_eq!(solver.calls.get(), 1);
}

#[test]
fn reports_are_written() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let solver = StartingPoint {
        status: SolveStatus::Feasible,
        calls: Cell::new(0),
    };
    let solution = Orchestrator::new(&solver, SolveOptions::default()).run(&plant).unwrap();
    let dir = std::env::temp_dir().join(format!("methforge-report-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let streams = dir.join("streams.csv");
    write_stream_table(&solution, &streams).unwrap();
    write_headline(&solution, &dir.join("headline.csv")).unwrap();
    let text = std::fs::read_to_string(&streams).unwrap();
    assert!(text.starts_with("stream,CO2,H2,CH4,H2O,N2,O2"));
    assert_eq!(text.lines().count(), 1 + 44);
    std::fs::remove_dir_all(&dir).unwrap();
}
