//! Turns a built diagram into solver constraints and solves them
//!
//! Every box gets the same set of geometric constraints: centres between
//! edges, a margin to the canvas, and edges derived from the measured label
//! size. The canvas is pinned at the origin and sized by its edges. User
//! equations are folded into linear expressions and added last. The solver
//! runs once, after every constraint has been added.

use log::debug;

use crate::geometry::Size;
use crate::parser::ast::{Equation, EquationTerm, EquationVariable, Relation, Span, Spanned};
use crate::parser::{fold_side, EquationFormatError, FoldError, LinearExpr};

use super::builder::Diagram;
use super::config::LayoutConfig;
use super::error::LayoutError;
use super::graph::{Anchor, AnchorSet, DiagramBox, Graph, SolvedGraph};
use super::solver::{Comparison, ConstraintSolver, Solution, VariableId, VariableTable};

fn var(id: VariableId) -> LinearExpr<VariableId> {
    LinearExpr::variable(id)
}

fn constant(value: f64) -> LinearExpr<VariableId> {
    LinearExpr::constant(value)
}

/// `id + offset`
fn offset(id: VariableId, offset: f64) -> LinearExpr<VariableId> {
    LinearExpr {
        terms: vec![(id, 1.0)],
        constant: offset,
    }
}

/// `a - b`
fn difference(a: VariableId, b: VariableId) -> LinearExpr<VariableId> {
    LinearExpr {
        terms: vec![(a, 1.0), (b, -1.0)],
        constant: 0.0,
    }
}

/// `(a + b) / 2`
fn midpoint(a: VariableId, b: VariableId) -> LinearExpr<VariableId> {
    LinearExpr {
        terms: vec![(a, 0.5), (b, 0.5)],
        constant: 0.0,
    }
}

struct ConstraintBuilder<'a> {
    table: &'a VariableTable,
    solver: ConstraintSolver,
}

impl<'a> ConstraintBuilder<'a> {
    fn new(table: &'a VariableTable) -> Self {
        Self {
            table,
            solver: ConstraintSolver::new(),
        }
    }

    fn le(&mut self, lhs: LinearExpr<VariableId>, rhs: LinearExpr<VariableId>) -> Result<(), LayoutError> {
        Ok(self.solver.add(self.table, &lhs, Comparison::LessOrEqual, &rhs)?)
    }

    fn eq(&mut self, lhs: LinearExpr<VariableId>, rhs: LinearExpr<VariableId>) -> Result<(), LayoutError> {
        Ok(self.solver.add(self.table, &lhs, Comparison::Equal, &rhs)?)
    }

    fn ge(&mut self, lhs: LinearExpr<VariableId>, rhs: LinearExpr<VariableId>) -> Result<(), LayoutError> {
        Ok(self.solver.add(self.table, &lhs, Comparison::GreaterOrEqual, &rhs)?)
    }

    fn prefer(&mut self, lhs: LinearExpr<VariableId>, rhs: LinearExpr<VariableId>) -> Result<(), LayoutError> {
        Ok(self.solver.prefer(self.table, &lhs, &rhs)?)
    }

    fn add_box(
        &mut self,
        anchors: &AnchorSet,
        canvas: &AnchorSet,
        size: Size,
        margin: f64,
    ) -> Result<(), LayoutError> {
        let b = anchors;

        self.le(var(b.left), var(b.center_x))?;
        self.le(var(b.center_x), var(b.right))?;
        self.le(var(b.top), var(b.center_y))?;
        self.le(var(b.center_y), var(b.bottom))?;

        self.ge(var(b.left), offset(canvas.left, margin))?;
        self.ge(var(b.top), offset(canvas.top, margin))?;
        self.le(var(b.right), offset(canvas.right, -margin))?;
        self.le(var(b.bottom), offset(canvas.bottom, -margin))?;

        self.ge(var(b.height), constant(0.0))?;
        self.ge(var(b.height), constant(size.height))?;
        self.ge(var(b.width), constant(0.0))?;
        self.ge(var(b.width), constant(size.width))?;

        self.eq(var(b.bottom), offset(b.top, size.height))?;
        self.eq(var(b.center_y), offset(b.top, size.height / 2.0))?;
        self.eq(var(b.right), offset(b.left, size.width))?;
        self.eq(var(b.center_x), offset(b.left, size.width / 2.0))?;
        self.eq(var(b.height), difference(b.bottom, b.top))?;
        self.eq(var(b.width), difference(b.right, b.left))?;

        // Keep boxes near the origin unless equations move them
        self.prefer(var(b.left), var(canvas.left))?;
        self.prefer(var(b.top), var(canvas.top))?;
        Ok(())
    }

    fn add_canvas(&mut self, canvas: &AnchorSet) -> Result<(), LayoutError> {
        self.eq(var(canvas.left), constant(0.0))?;
        self.le(var(canvas.left), var(canvas.right))?;
        self.le(var(canvas.center_x), var(canvas.right))?;
        self.eq(var(canvas.top), constant(0.0))?;
        self.le(var(canvas.top), var(canvas.center_y))?;
        self.le(var(canvas.center_y), var(canvas.bottom))?;

        self.eq(var(canvas.height), difference(canvas.bottom, canvas.top))?;
        self.eq(var(canvas.width), difference(canvas.right, canvas.left))?;
        self.eq(var(canvas.center_x), midpoint(canvas.left, canvas.right))?;
        self.eq(var(canvas.center_y), midpoint(canvas.top, canvas.bottom))?;

        // Smallest canvas that holds every box
        self.prefer(var(canvas.width), constant(0.0))?;
        self.prefer(var(canvas.height), constant(0.0))?;
        Ok(())
    }

    fn add_equation(&mut self, graph: &Graph, equation: &Spanned<Equation>) -> Result<(), LayoutError> {
        let span = &equation.span;
        let eq = &equation.node;
        let lhs = fold_equation_side(graph, eq, &eq.left, span)?;
        let rhs = fold_equation_side(graph, eq, &eq.right, span)?;
        let comparison = match eq.relation {
            Relation::LessOrEqual => Comparison::LessOrEqual,
            Relation::Equal => Comparison::Equal,
            Relation::GreaterOrEqual => Comparison::GreaterOrEqual,
            relation @ (Relation::Less | Relation::Greater) => {
                return Err(LayoutError::UnsupportedRelation {
                    relation,
                    span: span.clone(),
                })
            }
        };
        Ok(self.solver.add(self.table, &lhs, comparison, &rhs)?)
    }
}

/// Resolve `head.anchor` to its solver variable
///
/// `head` is a box id or `graph`; the tail must be exactly one anchor name.
pub fn resolve_variable(
    graph: &Graph,
    variable: &EquationVariable,
    span: &Span,
) -> Result<VariableId, LayoutError> {
    let head = variable.head.as_str();
    let anchors = graph
        .anchors_of(head)
        .ok_or_else(|| LayoutError::undefined(head, span.clone()))?;

    match variable.tail.as_slice() {
        [suffix] => Anchor::from_suffix(suffix.as_str())
            .map(|anchor| anchors.get(anchor))
            .ok_or_else(|| LayoutError::undefined(format!("{}.{}", head, suffix), span.clone())),
        [] => Err(LayoutError::undefined(head, span.clone())),
        tail => {
            let joined = tail
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(".");
            Err(LayoutError::undefined(format!("{}.{}", head, joined), span.clone()))
        }
    }
}

fn fold_equation_side(
    graph: &Graph,
    equation: &Equation,
    side: &[EquationTerm],
    span: &Span,
) -> Result<LinearExpr<VariableId>, LayoutError> {
    fold_side(side, |v| resolve_variable(graph, v, span)).map_err(|e| match e {
        FoldError::Lookup(err) => err,
        FoldError::Format(reason) => EquationFormatError::new(equation.parts(), reason).into(),
    })
}

/// Add every constraint of `diagram` and solve once
///
/// `measure` gives the label size of a box; boxes are never smaller.
pub fn solve(
    diagram: &Diagram,
    config: &LayoutConfig,
    measure: impl Fn(&DiagramBox) -> Size,
) -> Result<Solution, LayoutError> {
    let graph = &diagram.graph;
    let mut builder = ConstraintBuilder::new(&graph.variables);

    for b in graph.boxes.values() {
        let size = measure(b);
        builder.add_box(&b.anchors, &graph.anchors, size, config.outer_margin)?;
    }
    builder.add_canvas(&graph.anchors)?;

    for equation in &diagram.equations {
        builder.add_equation(graph, equation)?;
    }

    debug!(
        "solving {} constraints over {} variables",
        builder.solver.constraint_count(),
        graph.variables.len()
    );
    Ok(builder.solver.resolve(&graph.variables))
}

/// Solve `diagram` and attach the solution to its graph
pub fn solve_graph(
    diagram: Diagram,
    config: &LayoutConfig,
    measure: impl Fn(&DiagramBox) -> Size,
) -> Result<SolvedGraph, LayoutError> {
    let solution = solve(&diagram, config, measure)?;
    let solved = SolvedGraph::new(diagram.graph, solution);
    debug!("solved graph frame: {:?}", solved.graph_frame());
    Ok(solved)
}
