use super::expr::Expr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Continuous,
    Integer,
    Binary,
}

/// A decision variable. Missing bounds are unbounded in that direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<f64>,
}

impl Variable {
    pub fn lower_bound(&self) -> f64 {
        self.lower.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }

    /// Distance of `value` outside the variable's bounds and domain.
    pub fn violation(&self, value: f64) -> f64 {
        let below = (self.lower_bound() - value).max(0.0);
        let above = (value - self.upper_bound()).max(0.0);
        let integrality = match self.domain {
            Domain::Continuous => 0.0,
            Domain::Integer | Domain::Binary => (value - value.round()).abs(),
        };
        below.max(above).max(integrality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Eq,
    Le,
    Ge,
}

/// `body (sense) 0`, kept in residual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub body: Expr,
    pub sense: Sense,
}

impl Constraint {
    pub fn new(name: impl Into<String>, lhs: impl Into<Expr>, sense: Sense, rhs: impl Into<Expr>) -> Self {
        let lhs: Expr = lhs.into();
        let rhs: Expr = rhs.into();
        Self {
            name: name.into(),
            body: lhs - rhs,
            sense,
        }
    }

    pub fn residual(&self, point: &[f64]) -> f64 {
        self.body.eval(point)
    }

    /// How far `point` is from satisfying the constraint; NaN residuals count as infinite.
    pub fn violation(&self, point: &[f64]) -> f64 {
        let r = self.residual(point);
        if r.is_nan() {
            return f64::INFINITY;
        }
        match self.sense {
            Sense::Eq => r.abs(),
            Sense::Le => r.max(0.0),
            Sense::Ge => (-r).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expr::VarId;
    use approx::assert_relative_eq;

    #[test]
    fn violation_depends_on_sense() {
        let x = VarId::new(0);
        let le = Constraint::new("le", x, Sense::Le, 2.0);
        let ge = Constraint::new("ge", x, Sense::Ge, 2.0);
        let eq = Constraint::new("eq", x, Sense::Eq, 2.0);
        assert_relative_eq!(le.violation(&[3.0]), 1.0);
        assert_relative_eq!(le.violation(&[1.0]), 0.0);
        assert_relative_eq!(ge.violation(&[1.0]), 1.0);
        assert_relative_eq!(eq.violation(&[1.5]), 0.5);
    }

    #[test]
    fn integrality_counts_as_violation() {
        let v = Variable {
            name: "n".into(),
            domain: Domain::Integer,
            lower: Some(1.0),
            upper: Some(20.0),
            initial: None,
        };
        assert_relative_eq!(v.violation(3.25), 0.25);
        assert_relative_eq!(v.violation(0.0), 1.0);
        assert_relative_eq!(v.violation(7.0), 0.0);
    }
}
