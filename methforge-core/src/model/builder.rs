use super::expr::{Expr, VarId};
use super::variable::{Constraint, Domain, Sense, Variable};
use crate::error::MethforgeError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Accumulates variables and constraints until [`ModelBuilder::freeze`] turns them
/// into an immutable [`Model`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    name: String,
    variables: Vec<Variable>,
    variable_index: HashMap<String, VarId>,
    constraints: Vec<Constraint>,
    constraint_names: HashSet<String>,
    objective: Option<Expr>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares a variable.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if the name is already taken, if the bounds are
    /// inverted, or if an initial value lies outside them.
    pub fn add_variable(&mut self, variable: Variable) -> Result<VarId, MethforgeError> {
        if self.variable_index.contains_key(&variable.name) {
            return Err(MethforgeError::DuplicateVariable(variable.name));
        }
        let (lower, upper) = (variable.lower_bound(), variable.upper_bound());
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(MethforgeError::InvalidBounds {
                name: variable.name,
                lower,
                upper,
            });
        }
        if let Some(initial) = variable.initial {
            if initial < lower || initial > upper {
                return Err(MethforgeError::InvalidBounds {
                    name: format!("{} (initial {initial})", variable.name),
                    lower,
                    upper,
                });
            }
        }
        let id = VarId::new(self.variables.len());
        self.variable_index.insert(variable.name.clone(), id);
        self.variables.push(variable);
        Ok(id)
    }

    /// Continuous variable on `[lower, upper]`.
    pub fn continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> Result<VarId, MethforgeError> {
        self.add_variable(Variable {
            name: name.into(),
            domain: Domain::Continuous,
            lower: Some(lower),
            upper: finite(upper),
            initial: None,
        })
    }

    /// Continuous variable on `[0, ∞)`.
    pub fn non_negative(&mut self, name: impl Into<String>) -> Result<VarId, MethforgeError> {
        self.continuous(name, 0.0, f64::INFINITY)
    }

    /// Continuous variable without bounds.
    pub fn free(&mut self, name: impl Into<String>) -> Result<VarId, MethforgeError> {
        self.add_variable(Variable {
            name: name.into(),
            domain: Domain::Continuous,
            lower: None,
            upper: None,
            initial: None,
        })
    }

    pub fn integer(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> Result<VarId, MethforgeError> {
        self.add_variable(Variable {
            name: name.into(),
            domain: Domain::Integer,
            lower: Some(lower),
            upper: finite(upper),
            initial: None,
        })
    }

    pub fn binary(&mut self, name: impl Into<String>) -> Result<VarId, MethforgeError> {
        self.add_variable(Variable {
            name: name.into(),
            domain: Domain::Binary,
            lower: Some(0.0),
            upper: Some(1.0),
            initial: None,
        })
    }

    /// Sets a starting point for the solver.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if `value` lies outside the variable's bounds.
    pub fn set_initial(&mut self, id: VarId, value: f64) -> Result<(), MethforgeError> {
        let variable = self
            .variables
            .get_mut(id.index())
            .ok_or_else(|| MethforgeError::UnknownVariable(format!("#{}", id.index())))?;
        if value < variable.lower_bound() || value > variable.upper_bound() {
            return Err(MethforgeError::InvalidBounds {
                name: format!("{} (initial {value})", variable.name),
                lower: variable.lower_bound(),
                upper: variable.upper_bound(),
            });
        }
        variable.initial = Some(value);
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Result<VarId, MethforgeError> {
        self.variable_index
            .get(name)
            .copied()
            .ok_or_else(|| MethforgeError::UnknownVariable(name.to_string()))
    }

    /// Attaches a constraint.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if the name is already used or the body refers to
    /// a variable this builder never declared.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), MethforgeError> {
        if !self.constraint_names.insert(constraint.name.clone()) {
            return Err(MethforgeError::DuplicateConstraint(constraint.name));
        }
        if let Some(unknown) = constraint
            .body
            .variables()
            .into_iter()
            .find(|id| id.index() >= self.variables.len())
        {
            return Err(MethforgeError::UnknownVariable(format!(
                "#{} in constraint '{}'",
                unknown.index(),
                constraint.name
            )));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn equal(&mut self, name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Result<(), MethforgeError> {
        self.add_constraint(Constraint::new(name, lhs, Sense::Eq, rhs))
    }

    pub fn less_equal(&mut self, name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Result<(), MethforgeError> {
        self.add_constraint(Constraint::new(name, lhs, Sense::Le, rhs))
    }

    pub fn greater_equal(&mut self, name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Result<(), MethforgeError> {
        self.add_constraint(Constraint::new(name, lhs, Sense::Ge, rhs))
    }

    /// Pins `id` to `value` with a named equality.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if `value` lies outside the variable's bounds, since
    /// the pin would make the model infeasible before the solver ever runs.
    pub fn pin(&mut self, name: impl Into<String>, id: VarId, value: f64) -> Result<(), MethforgeError> {
        let variable = self
            .variables
            .get(id.index())
            .ok_or_else(|| MethforgeError::UnknownVariable(format!("#{}", id.index())))?;
        if value < variable.lower_bound() || value > variable.upper_bound() {
            return Err(MethforgeError::InvalidBounds {
                name: format!("{} pinned to {value}", variable.name),
                lower: variable.lower_bound(),
                upper: variable.upper_bound(),
            });
        }
        self.equal(name, id, value)
    }

    pub fn minimize(&mut self, objective: impl Into<Expr>) {
        self.objective = Some(objective.into());
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Consumes the builder and returns the finished model.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::MissingObjective` if no objective was set.
    pub fn freeze(self) -> Result<Model, MethforgeError> {
        let objective = self.objective.ok_or(MethforgeError::MissingObjective)?;
        log::info!(
            "Model '{}' frozen with {} variables and {} constraints",
            self.name,
            self.variables.len(),
            self.constraints.len()
        );
        Ok(Model {
            name: self.name,
            variables: self.variables,
            constraints: self.constraints,
            objective,
        })
    }
}

fn finite(bound: f64) -> Option<f64> {
    bound.is_finite().then_some(bound)
}

/// A frozen minimisation problem ready for an external solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Expr,
}

/// A constraint or bound that a candidate point fails by more than the tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub name: String,
    pub amount: f64,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &Expr {
        &self.objective
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(VarId::new)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Initial values where given, otherwise the bound closest to zero.
    pub fn initial_point(&self) -> Vec<f64> {
        self.variables
            .iter()
            .map(|v| {
                v.initial
                    .unwrap_or_else(|| 0.0_f64.clamp(v.lower_bound(), v.upper_bound()))
            })
            .collect()
    }

    pub fn evaluate_objective(&self, point: &[f64]) -> f64 {
        self.objective.eval(point)
    }

    /// Every constraint and variable bound violated by more than `tolerance` at `point`.
    pub fn violations(&self, point: &[f64], tolerance: f64) -> Vec<Violation> {
        let bounds = self
            .variables
            .iter()
            .zip(point)
            .map(|(v, &value)| (format!("bounds:{}", v.name), v.violation(value)));
        let rows = self
            .constraints
            .iter()
            .map(|c| (c.name.clone(), c.violation(point)));
        bounds
            .chain(rows)
            .filter(|(_, amount)| *amount > tolerance)
            .map(|(name, amount)| Violation { name, amount })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut b = ModelBuilder::new("t");
        b.non_negative("x").unwrap();
        assert!(matches!(b.non_negative("x"), Err(MethforgeError::DuplicateVariable(_))));
        let x = b.variable("x").unwrap();
        b.equal("c", x, 1.0).unwrap();
        assert!(matches!(b.equal("c", x, 2.0), Err(MethforgeError::DuplicateConstraint(_))));
    }

    #[test]
    fn inverted_bounds_and_bad_pins_fail() {
        let mut b = ModelBuilder::new("t");
        assert!(matches!(b.continuous("y", 2.0, 1.0), Err(MethforgeError::InvalidBounds { .. })));
        let n = b.integer("n", 1.0, 50.0).unwrap();
        assert!(b.pin("n.pin", n, 16.0).is_ok());
        assert!(matches!(b.pin("n.pin2", n, 60.0), Err(MethforgeError::InvalidBounds { .. })));
    }

    #[test]
    fn foreign_variables_are_rejected() {
        let mut other = ModelBuilder::new("other");
        other.non_negative("a").unwrap();
        let foreign = other.non_negative("b").unwrap();
        let mut b = ModelBuilder::new("t");
        assert!(matches!(b.equal("c", foreign, 0.0), Err(MethforgeError::UnknownVariable(_))));
    }

    #[test]
    fn freeze_requires_objective_and_reports_violations() {
        let mut b = ModelBuilder::new("t");
        let x = b.continuous("x", 0.0, 10.0).unwrap();
        b.less_equal("cap", x, 4.0).unwrap();
        let missing = ModelBuilder::new("empty").freeze();
        assert!(matches!(missing, Err(MethforgeError::MissingObjective)));
        b.minimize(-1.0 * x);
        let model = b.freeze().unwrap();
        assert!(model.violations(&[3.0], 1e-9).is_empty());
        let v = model.violations(&[12.0], 1e-9);
        let names: Vec<&str> = v.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["bounds:x", "cap"]);
        assert_eq!(model.variable_id("x"), Some(x));
        assert_eq!(model.initial_point(), vec![0.0]);
    }
}
