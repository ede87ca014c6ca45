//! Constraint solver integration for layout computation
//!
//! Solver variables live in a [`VariableTable`] arena and are addressed by
//! [`VariableId`]. Boxes and the graph only hold ids, never values; values
//! exist once [`ConstraintSolver::resolve`] has run and are read from the
//! returned [`Solution`].

use std::collections::HashMap;

use kasuari::{
    Expression, Solver as KasuariSolver, Strength, Term, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;

use crate::parser::LinearExpr;

/// Index of a named variable in a [`VariableTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Name-to-variable arena
///
/// Interning the same name twice gives the same id, so anchors are
/// reproducible from box ids alone.
#[derive(Debug, Default)]
pub struct VariableTable {
    names: Vec<String>,
    variables: Vec<KasuariVariable>,
    by_name: HashMap<String, VariableId>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the variable called `name`
    pub fn intern(&mut self, name: impl Into<String>) -> VariableId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = VariableId(self.names.len());
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        self.variables.push(KasuariVariable::new());
        id
    }

    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: VariableId) -> &str {
        &self.names[id.0]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn variable(&self, id: VariableId) -> KasuariVariable {
        self.variables[id.0]
    }

    /// Human-readable form of an expression for error messages
    pub fn describe(&self, expr: &LinearExpr<VariableId>) -> String {
        let mut out = String::new();
        for (id, coefficient) in &expr.terms {
            if !out.is_empty() {
                out.push_str(" + ");
            }
            if *coefficient == 1.0 {
                out.push_str(self.name(*id));
            } else {
                out.push_str(&format!("{} * {}", coefficient, self.name(*id)));
            }
        }
        if expr.constant != 0.0 || out.is_empty() {
            if !out.is_empty() {
                out.push_str(" + ");
            }
            out.push_str(&expr.constant.to_string());
        }
        out
    }
}

/// Relations the solver accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Comparison {
    fn symbol(self) -> &'static str {
        match self {
            Comparison::LessOrEqual => "<=",
            Comparison::Equal => "==",
            Comparison::GreaterOrEqual => ">=",
        }
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("unsatisfiable constraint: {constraint}")]
    Unsatisfiable { constraint: String },

    #[error("duplicate constraint: {constraint}")]
    Duplicate { constraint: String },

    #[error("internal solver error for {constraint}: {message}")]
    Internal { constraint: String, message: String },
}

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    constraint_count: usize,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            constraint_count: 0,
        }
    }

    pub fn constraint_count(&self) -> usize {
        self.constraint_count
    }

    fn expression(table: &VariableTable, expr: &LinearExpr<VariableId>) -> Expression {
        let terms = expr
            .terms
            .iter()
            .map(|(id, coefficient)| Term::new(table.variable(*id), *coefficient))
            .collect();
        Expression::new(terms, expr.constant)
    }

    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(e: kasuari::AddConstraintError, constraint: String) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                SolverError::Unsatisfiable { constraint }
            }
            kasuari::AddConstraintError::DuplicateConstraint => SolverError::Duplicate { constraint },
            kasuari::AddConstraintError::InternalSolverError(msg) => SolverError::Internal {
                constraint,
                message: msg.to_string(),
            },
        }
    }

    /// Add a required constraint `lhs <relation> rhs`
    pub fn add(
        &mut self,
        table: &VariableTable,
        lhs: &LinearExpr<VariableId>,
        comparison: Comparison,
        rhs: &LinearExpr<VariableId>,
    ) -> Result<(), SolverError> {
        let left = Self::expression(table, lhs);
        let right = Self::expression(table, rhs);
        let constraint = match comparison {
            Comparison::LessOrEqual => left | LE(Strength::REQUIRED) | right,
            Comparison::Equal => left | EQ(Strength::REQUIRED) | right,
            Comparison::GreaterOrEqual => left | GE(Strength::REQUIRED) | right,
        };
        self.solver.add_constraint(constraint).map_err(|e| {
            let desc = format!(
                "{} {} {}",
                table.describe(lhs),
                comparison.symbol(),
                table.describe(rhs)
            );
            Self::convert_kasuari_error(e, desc)
        })?;
        self.constraint_count += 1;
        Ok(())
    }

    /// Add a weak preference `lhs == rhs`
    ///
    /// Required constraints always win; preferences only pick among the
    /// solutions they leave open.
    pub fn prefer(
        &mut self,
        table: &VariableTable,
        lhs: &LinearExpr<VariableId>,
        rhs: &LinearExpr<VariableId>,
    ) -> Result<(), SolverError> {
        let constraint = Self::expression(table, lhs) | EQ(Strength::WEAK) | Self::expression(table, rhs);
        self.solver.add_constraint(constraint).map_err(|e| {
            let desc = format!("{} == {} (weak)", table.describe(lhs), table.describe(rhs));
            Self::convert_kasuari_error(e, desc)
        })?;
        self.constraint_count += 1;
        Ok(())
    }

    /// Solve the constraint system and read every variable of `table`
    ///
    /// Consumes the solver: nothing may be added after resolving.
    pub fn resolve(mut self, table: &VariableTable) -> Solution {
        let changes: HashMap<KasuariVariable, f64> =
            self.solver.fetch_changes().iter().copied().collect();
        // kasuari only reports variables that moved away from zero
        let values = table
            .variables
            .iter()
            .map(|var| changes.get(var).copied().unwrap_or(0.0))
            .collect();
        Solution { values }
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solved values indexed by [`VariableId`]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<f64>,
}

impl Solution {
    pub fn value(&self, id: VariableId) -> f64 {
        self.values.get(id.0).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: VariableId) -> LinearExpr<VariableId> {
        LinearExpr::variable(id)
    }

    fn constant(value: f64) -> LinearExpr<VariableId> {
        LinearExpr::constant(value)
    }

    #[test]
    fn test_intern_is_stable() {
        let mut table = VariableTable::new();
        let a = table.intern("a.left");
        let b = table.intern("b.left");
        assert_ne!(a, b);
        assert_eq!(table.intern("a.left"), a);
        assert_eq!(table.lookup("b.left"), Some(b));
        assert_eq!(table.name(a), "a.left");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_fixed_constraint() {
        let mut table = VariableTable::new();
        let width = table.intern("box.width");
        let mut solver = ConstraintSolver::new();

        solver
            .add(&table, &var(width), Comparison::Equal, &constant(100.0))
            .unwrap();

        let solution = solver.resolve(&table);
        assert!((solution.value(width) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_equal_constraint_with_offset() {
        let mut table = VariableTable::new();
        let a = table.intern("a.left");
        let b = table.intern("b.left");
        let mut solver = ConstraintSolver::new();

        solver
            .add(&table, &var(b), Comparison::Equal, &constant(50.0))
            .unwrap();
        let mut rhs = var(b);
        rhs.constant = 20.0;
        solver.add(&table, &var(a), Comparison::Equal, &rhs).unwrap();

        let solution = solver.resolve(&table);
        assert!((solution.value(a) - 70.0).abs() < 0.001);
        assert!((solution.value(b) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_untouched_variable_reads_zero() {
        let mut table = VariableTable::new();
        let a = table.intern("a.top");
        let solution = ConstraintSolver::new().resolve(&table);
        assert_eq!(solution.value(a), 0.0);
    }

    #[test]
    fn test_conflicting_constraints() {
        let mut table = VariableTable::new();
        let a = table.intern("a.left");
        let mut solver = ConstraintSolver::new();

        solver
            .add(&table, &var(a), Comparison::Equal, &constant(10.0))
            .unwrap();
        let err = solver
            .add(&table, &var(a), Comparison::GreaterOrEqual, &constant(20.0))
            .unwrap_err();

        match err {
            SolverError::Unsatisfiable { constraint } => {
                assert_eq!(constraint, "a.left >= 20");
            }
            other => panic!("expected unsatisfiable, got {:?}", other),
        }
        assert_eq!(solver.constraint_count(), 1);
    }

    #[test]
    fn test_describe_expression() {
        let mut table = VariableTable::new();
        let a = table.intern("a.width");
        let expr = LinearExpr {
            terms: vec![(a, 0.5)],
            constant: 3.0,
        };
        assert_eq!(table.describe(&expr), "0.5 * a.width + 3");
        assert_eq!(table.describe(&constant(0.0)), "0");
    }
}
