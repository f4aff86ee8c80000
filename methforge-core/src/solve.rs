//! Hand-off to an external MINLP solver and the typed view of its answer.

use crate::economics::EconomicSummary;
use crate::error::MethforgeError;
use crate::model::{Model, Violation};
use crate::network::{NodeKind, StreamId};
use crate::plant::PlantModel;
use crate::selection::Technology;
use methforge_schemas::component::ComponentId;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limits forwarded to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Wall-clock seconds; `None` leaves it to the solver.
    pub time_limit: Option<f64>,
    pub relative_gap: f64,
    pub feasibility_tolerance: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: None,
            relative_gap: 1e-4,
            feasibility_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// A point satisfying the constraints without a proof of optimality.
    Feasible,
    Infeasible,
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    /// One value per model variable, in declaration order.
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default)]
    pub objective: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A global MINLP solver.
pub trait Solver {
    fn name(&self) -> &str;

    /// Solves `model` once.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` when the solver cannot be run at all; solver-side
    /// failures are reported through [`SolveStatus`].
    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<SolverOutcome, MethforgeError>;
}

/// Runs a solver exactly once and turns its outcome into a [`PlantSolution`].
pub struct Orchestrator<'s> {
    solver: &'s dyn Solver,
    options: SolveOptions,
}

impl<'s> Orchestrator<'s> {
    pub fn new(solver: &'s dyn Solver, options: SolveOptions) -> Self {
        Self { solver, options }
    }

    /// # Errors
    ///
    /// Returns `MethforgeError::SolverFailure` for an infeasible or failed solve and
    /// `MethforgeError::SolutionShape` when the value vector does not match the model.
    pub fn run<'p>(&self, plant: &'p PlantModel) -> Result<PlantSolution<'p>, MethforgeError> {
        let model = &plant.model;
        log::info!(
            "Solving '{}' with {} ({} variables, {} constraints)",
            model.name(),
            self.solver.name(),
            model.num_variables(),
            model.constraints().len()
        );
        let outcome = self.solver.solve(model, &self.options)?;
        log::info!("Solver '{}' finished: {}", self.solver.name(), outcome.status);

        if matches!(outcome.status, SolveStatus::Infeasible | SolveStatus::Error) {
            return Err(MethforgeError::SolverFailure {
                solver: self.solver.name().to_string(),
                status: outcome.status.to_string(),
                message: outcome.message.unwrap_or_default(),
            });
        }
        if outcome.values.len() != model.num_variables() {
            return Err(MethforgeError::SolutionShape {
                expected: model.num_variables(),
                found: outcome.values.len(),
            });
        }

        let mut diagnostics = Vec::new();
        if outcome.status == SolveStatus::Feasible {
            let note = format!(
                "{} returned a feasible point without proving optimality{}",
                self.solver.name(),
                outcome.message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
            );
            log::warn!("{note}");
            diagnostics.push(note);
        }
        let violations = model.violations(&outcome.values, self.options.feasibility_tolerance);
        if !violations.is_empty() {
            log::warn!(
                "{} constraints or bounds violated beyond {:e}",
                violations.len(),
                self.options.feasibility_tolerance
            );
        }
        for v in &violations {
            log::debug!("Violated: {} by {:e}", v.name, v.amount);
            diagnostics.push(format!("'{}' violated by {:e}", v.name, v.amount));
        }

        Ok(PlantSolution {
            plant,
            status: outcome.status,
            values: outcome.values,
            diagnostics,
        })
    }
}

/// Solver values bound to the plant they came from.
#[derive(Debug, Clone)]
pub struct PlantSolution<'p> {
    plant: &'p PlantModel,
    status: SolveStatus,
    values: Vec<f64>,
    diagnostics: Vec<String>,
}

impl<'p> PlantSolution<'p> {
    /// Wraps a value vector without running a solver, e.g. one read from disk.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::SolutionShape` when the length does not match.
    pub fn from_values(plant: &'p PlantModel, status: SolveStatus, values: Vec<f64>) -> Result<Self, MethforgeError> {
        if values.len() != plant.model.num_variables() {
            return Err(MethforgeError::SolutionShape {
                expected: plant.model.num_variables(),
                found: values.len(),
            });
        }
        Ok(Self {
            plant,
            status,
            values,
            diagnostics: Vec::new(),
        })
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn plant(&self) -> &'p PlantModel {
        self.plant
    }

    /// kmol/h
    pub fn flow(&self, stream: StreamId, component: ComponentId) -> f64 {
        self.values[self.plant.network.var(stream, component).index()]
    }

    /// Every flow, one row per stream in [`StreamId::ALL`] order.
    pub fn flows(&self) -> Array2<f64> {
        Array2::from_shape_fn((StreamId::COUNT, ComponentId::COUNT), |(s, c)| {
            self.flow(StreamId::ALL[s], ComponentId::ALL[c])
        })
    }

    /// Value of a named model variable.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::UnknownVariable` if no variable has that name.
    pub fn quantity(&self, name: &str) -> Result<f64, MethforgeError> {
        self.plant
            .model
            .variable_id(name)
            .map(|id| self.values[id.index()])
            .ok_or_else(|| MethforgeError::UnknownVariable(name.to_string()))
    }

    pub fn selected<T: Technology>(&self) -> Option<T> {
        T::choice(&self.plant.selections).selected(&self.values)
    }

    pub fn furnace_installed(&self) -> bool {
        self.plant.selections.furnace.installed(&self.values)
    }

    pub fn summary(&self) -> EconomicSummary {
        EconomicSummary::from_point(&self.plant.economics, &self.plant.costs, &self.values)
    }

    /// Structural checks that hold for any valid design: non-negative flows, one
    /// option per open family, and mass balance at every splitter.
    pub fn check_invariants(&self, tolerance: f64) -> Vec<Violation> {
        let mut found = Vec::new();
        for s in StreamId::ALL {
            for c in ComponentId::ALL {
                let x = self.flow(s, c);
                if x < -tolerance {
                    found.push(Violation {
                        name: format!("x[{s},{}] >= 0", c.label()),
                        amount: -x,
                    });
                }
            }
        }
        for (family, binaries) in self.plant.selections.open_families() {
            let total: f64 = binaries.iter().map(|y| self.values[y.index()]).sum();
            if (total - 1.0).abs() > tolerance {
                found.push(Violation {
                    name: format!("select.{family}"),
                    amount: (total - 1.0).abs(),
                });
            }
        }
        for node in self.plant.network.nodes().iter().filter(|n| n.kind == NodeKind::Splitter) {
            for c in ComponentId::ALL {
                let branches: f64 = node.branches.iter().map(|(s, _)| self.flow(*s, c)).sum();
                let gap = (self.flow(node.trunk, c) - branches).abs();
                if gap > tolerance * self.flow(node.trunk, c).abs().max(1.0) {
                    found.push(Violation {
                        name: format!("{}.balance[{}]", node.id.label(), c.label()),
                        amount: gap,
                    });
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::PlantModelBuilder;

    struct Fixed(SolveStatus, Option<usize>);

    impl Solver for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn solve(&self, model: &Model, _options: &SolveOptions) -> Result<SolverOutcome, MethforgeError> {
            Ok(SolverOutcome {
                status: self.0,
                values: vec![0.0; self.1.unwrap_or(model.num_variables())],
                objective: None,
                message: Some("stub".to_string()),
            })
        }
    }

    #[test]
    fn failures_become_errors() {
        let plant = PlantModelBuilder::new().build().unwrap();
        for status in [SolveStatus::Infeasible, SolveStatus::Error] {
            let solver = Fixed(status, None);
            let err = Orchestrator::new(&solver, SolveOptions::default()).run(&plant).unwrap_err();
            assert!(matches!(err, MethforgeError::SolverFailure { .. }));
        }
        let solver = Fixed(SolveStatus::Optimal, Some(3));
        let err = Orchestrator::new(&solver, SolveOptions::default()).run(&plant).unwrap_err();
        assert!(matches!(err, MethforgeError::SolutionShape { found: 3, .. }));
    }

    #[test]
    fn feasible_status_is_reported() {
        let plant = PlantModelBuilder::new().build().unwrap();
        let solver = Fixed(SolveStatus::Feasible, None);
        let solution = Orchestrator::new(&solver, SolveOptions::default()).run(&plant).unwrap();
        assert_eq!(solution.status(), SolveStatus::Feasible);
        assert!(solution.diagnostics()[0].contains("without proving optimality"));
        // An all-zero point cannot satisfy the pinned air feed.
        assert!(solution.diagnostics().iter().any(|d| d.starts_with("'init[1,")));
    }
}
