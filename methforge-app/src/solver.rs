use methforge_core::{
    error::MethforgeError,
    model::Model,
    solve::{SolveOptions, Solver, SolverOutcome},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

#[derive(Serialize)]
struct SolveRequest<'a> {
    model: &'a Model,
    options: &'a SolveOptions,
}

/// A solver run as a separate program.
///
/// The program is called as `<program> <args...> <request.json> <outcome.json>`;
/// it reads the model and options from the first file and writes a
/// `SolverOutcome` to the second.
pub struct ExternalCommandSolver {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl ExternalCommandSolver {
    pub fn new(program: impl Into<String>, args: Vec<String>, work_dir: &Path) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir: work_dir.to_path_buf(),
        }
    }

    fn failure(&self, message: String) -> MethforgeError {
        MethforgeError::SolverFailure {
            solver: self.program.clone(),
            status: "error".to_string(),
            message,
        }
    }
}

impl Solver for ExternalCommandSolver {
    fn name(&self) -> &str {
        &self.program
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<SolverOutcome, MethforgeError> {
        let request_path = self.work_dir.join("solve_request.json");
        let outcome_path = self.work_dir.join("solve_outcome.json");
        let request = serde_json::to_string(&SolveRequest { model, options })?;
        fs::write(&request_path, request)
            .map_err(|e| MethforgeError::FileIO(request_path.display().to_string(), e))?;

        log::info!("Running '{}' on {}", self.program, request_path.display());
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&request_path)
            .arg(&outcome_path)
            .output()
            .map_err(|e| self.failure(format!("could not start: {e}")))?;
        if !output.status.success() {
            return Err(self.failure(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = fs::read_to_string(&outcome_path)
            .map_err(|e| MethforgeError::FileIO(outcome_path.display().to_string(), e))?;
        Ok(serde_json::from_str(&text)?)
    }
}
