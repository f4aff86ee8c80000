//! Algebraic expression trees over model variables.
//!
//! Expressions are built with ordinary arithmetic operators on [`Expr`], [`VarId`]
//! and `f64`. Constant sub-expressions fold while building, so a term multiplied by
//! a decided (constant) selector disappears instead of reaching the solver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Handle to a variable of a [`super::ModelBuilder`] or frozen [`super::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(usize);

impl VarId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Expr {
    Const(f64),
    Var(VarId),
    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    pub fn zero() -> Self {
        Expr::Const(0.0)
    }

    pub fn one() -> Self {
        Expr::Const(1.0)
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Expr::Const(v) => Some(*v),
            _ => None,
        }
    }

    /// Sum of an arbitrary number of terms.
    pub fn sum<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        terms
            .into_iter()
            .fold(Expr::zero(), |acc, term| add(acc, term.into()))
    }

    pub fn powf(self, exponent: impl Into<Expr>) -> Self {
        let exponent = exponent.into();
        match (self.as_constant(), exponent.as_constant()) {
            (_, Some(e)) if e == 1.0 => self,
            (Some(b), Some(e)) => Expr::Const(b.powf(e)),
            _ => Expr::Pow(Box::new(self), Box::new(exponent)),
        }
    }

    pub fn exp(self) -> Self {
        match self.as_constant() {
            Some(v) => Expr::Const(v.exp()),
            None => Expr::Exp(Box::new(self)),
        }
    }

    pub fn ln(self) -> Self {
        match self.as_constant() {
            Some(v) if v > 0.0 => Expr::Const(v.ln()),
            _ => Expr::Ln(Box::new(self)),
        }
    }

    /// Evaluates the expression at `point`, indexed by [`VarId::index`].
    /// Variables outside `point` evaluate to NaN.
    pub fn eval(&self, point: &[f64]) -> f64 {
        match self {
            Expr::Const(v) => *v,
            Expr::Var(id) => point.get(id.index()).copied().unwrap_or(f64::NAN),
            Expr::Sum(terms) => terms.iter().map(|t| t.eval(point)).sum(),
            Expr::Product(factors) => factors.iter().map(|f| f.eval(point)).product(),
            Expr::Div(num, den) => num.eval(point) / den.eval(point),
            Expr::Pow(base, exponent) => base.eval(point).powf(exponent.eval(point)),
            Expr::Exp(arg) => arg.eval(point).exp(),
            Expr::Ln(arg) => arg.eval(point).ln(),
            Expr::Neg(arg) => -arg.eval(point),
        }
    }

    pub fn collect_variables(&self, out: &mut BTreeSet<VarId>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(id) => {
                out.insert(*id);
            }
            Expr::Sum(items) | Expr::Product(items) => {
                items.iter().for_each(|e| e.collect_variables(out));
            }
            Expr::Div(a, b) | Expr::Pow(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Expr::Exp(arg) | Expr::Ln(arg) | Expr::Neg(arg) => arg.collect_variables(out),
        }
    }

    pub fn variables(&self) -> BTreeSet<VarId> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl From<VarId> for Expr {
    fn from(id: VarId) -> Self {
        Expr::Var(id)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

fn add(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Const(x), Expr::Const(y)) => Expr::Const(x + y),
        (Expr::Const(z), other) | (other, Expr::Const(z)) if z == 0.0 => other,
        (Expr::Sum(mut xs), Expr::Sum(ys)) => {
            xs.extend(ys);
            Expr::Sum(xs)
        }
        (Expr::Sum(mut xs), other) => {
            xs.push(other);
            Expr::Sum(xs)
        }
        (other, Expr::Sum(mut ys)) => {
            ys.insert(0, other);
            Expr::Sum(ys)
        }
        (a, b) => Expr::Sum(vec![a, b]),
    }
}

fn negate(a: Expr) -> Expr {
    match a {
        Expr::Const(v) => Expr::Const(-v),
        Expr::Neg(inner) => *inner,
        other => Expr::Neg(Box::new(other)),
    }
}

fn mul(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Const(x), Expr::Const(y)) => Expr::Const(x * y),
        (Expr::Const(z), _) | (_, Expr::Const(z)) if z == 0.0 => Expr::zero(),
        (Expr::Const(u), other) | (other, Expr::Const(u)) if u == 1.0 => other,
        (Expr::Product(mut xs), Expr::Product(ys)) => {
            xs.extend(ys);
            Expr::Product(xs)
        }
        (Expr::Product(mut xs), other) => {
            xs.push(other);
            Expr::Product(xs)
        }
        (other, Expr::Product(mut ys)) => {
            ys.insert(0, other);
            Expr::Product(ys)
        }
        (a, b) => Expr::Product(vec![a, b]),
    }
}

fn div(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Const(x), Expr::Const(y)) => Expr::Const(x / y),
        (num, Expr::Const(u)) if u == 1.0 => num,
        (Expr::Const(z), _) if z == 0.0 => Expr::zero(),
        (num, den) => Expr::Div(Box::new(num), Box::new(den)),
    }
}

fn sub(a: Expr, b: Expr) -> Expr {
    add(a, negate(b))
}

macro_rules! impl_binary_op {
    ($op:ident, $method:ident, $build:ident) => {
        impl<R: Into<Expr>> $op<R> for Expr {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                $build(self, rhs.into())
            }
        }

        impl<R: Into<Expr>> $op<R> for VarId {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                $build(Expr::Var(self), rhs.into())
            }
        }

        impl $op<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $build(Expr::Const(self), rhs)
            }
        }

        impl $op<VarId> for f64 {
            type Output = Expr;
            fn $method(self, rhs: VarId) -> Expr {
                $build(Expr::Const(self), Expr::Var(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, add);
impl_binary_op!(Sub, sub, sub);
impl_binary_op!(Mul, mul, mul);
impl_binary_op!(Div, div, div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        negate(self)
    }
}

impl Neg for VarId {
    type Output = Expr;
    fn neg(self) -> Expr {
        negate(Expr::Var(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constants_fold_while_building() {
        let x = VarId::new(0);
        assert_eq!(x * 0.0, Expr::zero());
        assert_eq!(x * 1.0, Expr::Var(x));
        assert_eq!(Expr::constant(2.0) + 3.0, Expr::Const(5.0));
        assert_eq!(x + 0.0, Expr::Var(x));
        assert_eq!(Expr::constant(4.0).powf(0.5), Expr::Const(2.0));
    }

    #[test]
    fn sums_flatten() {
        let (a, b, c) = (VarId::new(0), VarId::new(1), VarId::new(2));
        let e = a + b + c;
        match e {
            Expr::Sum(terms) => assert_eq!(terms.len(), 3),
            other => panic!("expected flat sum, got {other:?}"),
        }
    }

    #[test]
    fn eval_matches_closed_form() {
        let (x, y) = (VarId::new(0), VarId::new(1));
        let e = (2.0 * x + Expr::from(y).powf(2.0)) / (x - 1.0) + (Expr::from(y).ln()).exp();
        let point = [3.0, 4.0];
        assert_relative_eq!(e.eval(&point), (6.0 + 16.0) / 2.0 + 4.0, max_relative = 1e-12);
        let vars: Vec<usize> = e.variables().into_iter().map(VarId::index).collect();
        assert_eq!(vars, vec![0, 1]);
    }

    #[test]
    fn missing_variable_evaluates_to_nan() {
        assert!(Expr::Var(VarId::new(5)).eval(&[1.0]).is_nan());
    }

    #[test]
    fn serializes_with_operator_tags() {
        let e = VarId::new(0) * 2.0;
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"op\":\"product\""), "{json}");
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
