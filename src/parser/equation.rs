//! Equation validation and linear reduction
//!
//! Both sides of an equation are read strictly left to right, without
//! operator precedence: `a.left + 2 * 3` means `(a.left + 2) * 3`. Each
//! step combines the value so far with the next operation and term, and
//! combinations that would leave linear arithmetic are rejected.

use thiserror::Error;

use super::ast::*;
use super::lexer::{lex, Token};

/// A malformed equation, with the tokens it was built from
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid equation `{}`: {reason}", display_parts(.parts))]
pub struct EquationFormatError {
    pub parts: Vec<EquationPart>,
    pub reason: String,
}

impl EquationFormatError {
    pub fn new(parts: Vec<EquationPart>, reason: impl Into<String>) -> Self {
        Self {
            parts,
            reason: reason.into(),
        }
    }
}

fn display_parts(parts: &[EquationPart]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Σ coefficient·variable + constant`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpr<K> {
    pub terms: Vec<(K, f64)>,
    pub constant: f64,
}

impl<K> LinearExpr<K> {
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn variable(key: K) -> Self {
        Self {
            terms: vec![(key, 1.0)],
            constant: 0.0,
        }
    }

    fn scale(mut self, factor: f64) -> Self {
        for (_, coefficient) in &mut self.terms {
            *coefficient *= factor;
        }
        self.constant *= factor;
        self
    }

    fn add(mut self, other: LinearExpr<K>, sign: f64) -> Self {
        self.terms.extend(
            other
                .terms
                .into_iter()
                .map(|(key, coefficient)| (key, coefficient * sign)),
        );
        self.constant += other.constant * sign;
        self
    }
}

/// Why a side could not be reduced
#[derive(Debug, Clone, PartialEq)]
pub enum FoldError<E> {
    Format(&'static str),
    Lookup(E),
}

/// Reduction state after each token
enum FoldState<K> {
    Initial,
    Constant(f64),
    ConstantOp(f64, Operation),
    /// A single scaled variable
    Term(LinearExpr<K>),
    TermOp(LinearExpr<K>, Operation),
    /// A sum of terms
    Expr(LinearExpr<K>),
    ExprOp(LinearExpr<K>, Operation),
}

fn apply_constants(lhs: f64, op: Operation, rhs: f64) -> Result<f64, &'static str> {
    match op {
        Operation::Add => Ok(lhs + rhs),
        Operation::Subtract => Ok(lhs - rhs),
        Operation::Multiply => Ok(lhs * rhs),
        Operation::Divide if rhs == 0.0 => Err("division by zero"),
        Operation::Divide => Ok(lhs / rhs),
    }
}

fn sign(op: Operation) -> f64 {
    if op == Operation::Subtract {
        -1.0
    } else {
        1.0
    }
}

/// Fold one side of an equation into a linear expression
///
/// `resolve` maps each variable to the caller's key type; its errors are
/// passed through as [`FoldError::Lookup`].
pub fn fold_side<K, E>(
    terms: &[EquationTerm],
    mut resolve: impl FnMut(&EquationVariable) -> Result<K, E>,
) -> Result<LinearExpr<K>, FoldError<E>> {
    use FoldState::*;

    let mut state = Initial;
    for term in terms {
        state = match (state, term) {
            (Initial, EquationTerm::Constant(c)) => Constant(*c),
            (Initial, EquationTerm::Variable(v)) => {
                Term(LinearExpr::variable(resolve(v).map_err(FoldError::Lookup)?))
            }
            (Initial, EquationTerm::Operation(_)) => {
                return Err(FoldError::Format("expression starts with an operator"))
            }

            (Constant(c), EquationTerm::Operation(op)) => ConstantOp(c, *op),
            (Term(t), EquationTerm::Operation(op)) => TermOp(t, *op),
            (Expr(e), EquationTerm::Operation(op)) => ExprOp(e, *op),
            (Constant(_) | Term(_) | Expr(_), _) => {
                return Err(FoldError::Format("two terms without an operator between them"))
            }
            (ConstantOp(..) | TermOp(..) | ExprOp(..), EquationTerm::Operation(_)) => {
                return Err(FoldError::Format("two operators in a row"))
            }

            (ConstantOp(lhs, op), EquationTerm::Constant(rhs)) => {
                Constant(apply_constants(lhs, op, *rhs).map_err(FoldError::Format)?)
            }
            (ConstantOp(c, op), EquationTerm::Variable(v)) => {
                let var = LinearExpr::variable(resolve(v).map_err(FoldError::Lookup)?);
                match op {
                    Operation::Add | Operation::Subtract => {
                        Expr(LinearExpr::constant(c).add(var, sign(op)))
                    }
                    Operation::Multiply => Term(var.scale(c)),
                    Operation::Divide => {
                        return Err(FoldError::Format("division by a variable is not linear"))
                    }
                }
            }

            (TermOp(t, op), EquationTerm::Constant(c)) => match op {
                Operation::Add | Operation::Subtract => {
                    Expr(t.add(LinearExpr::constant(*c), sign(op)))
                }
                Operation::Multiply => Term(t.scale(*c)),
                Operation::Divide if *c == 0.0 => {
                    return Err(FoldError::Format("division by zero"))
                }
                Operation::Divide => Term(t.scale(1.0 / *c)),
            },
            (ExprOp(e, op), EquationTerm::Constant(c)) => match op {
                Operation::Add | Operation::Subtract => {
                    Expr(e.add(LinearExpr::constant(*c), sign(op)))
                }
                Operation::Multiply => Expr(e.scale(*c)),
                Operation::Divide if *c == 0.0 => {
                    return Err(FoldError::Format("division by zero"))
                }
                Operation::Divide => Expr(e.scale(1.0 / *c)),
            },

            (TermOp(lhs, op) | ExprOp(lhs, op), EquationTerm::Variable(v)) => match op {
                Operation::Add | Operation::Subtract => {
                    let var = LinearExpr::variable(resolve(v).map_err(FoldError::Lookup)?);
                    Expr(lhs.add(var, sign(op)))
                }
                Operation::Multiply => {
                    return Err(FoldError::Format("product of variables is not linear"))
                }
                Operation::Divide => {
                    return Err(FoldError::Format("division by a variable is not linear"))
                }
            },
        };
    }

    match state {
        Constant(c) => Ok(LinearExpr::constant(c)),
        Term(e) | Expr(e) => Ok(e),
        Initial => Err(FoldError::Format("empty expression")),
        ConstantOp(..) | TermOp(..) | ExprOp(..) => {
            Err(FoldError::Format("expression ends with an operator"))
        }
    }
}

impl Equation {
    /// Split raw equation tokens at the relation and validate both sides
    ///
    /// A comment ends the equation and must come after the relation.
    pub fn from_raw_parts(parts: Vec<EquationPart>) -> Result<Equation, EquationFormatError> {
        let mut relation = None;
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut line_comment = None;
        let fail = |reason| EquationFormatError::new(parts.clone(), reason);

        for part in &parts {
            match part {
                EquationPart::Term(term) => match relation {
                    None => left.push(term.clone()),
                    Some(_) => right.push(term.clone()),
                },
                EquationPart::Relation(r) => {
                    if relation.is_some() {
                        return Err(fail("more than one relation"));
                    }
                    if left.is_empty() {
                        return Err(fail("missing left-hand side"));
                    }
                    relation = Some(*r);
                }
                EquationPart::LineComment(comment) => {
                    if relation.is_none() {
                        return Err(fail("comment before relation"));
                    }
                    line_comment = Some(comment.clone());
                    break;
                }
            }
        }

        let Some(relation) = relation else {
            return Err(fail("missing relation"));
        };
        if right.is_empty() {
            return Err(fail("missing right-hand side"));
        }

        for side in [&left, &right] {
            let checked = fold_side(side, |v| Ok::<_, std::convert::Infallible>(v.clone()));
            if let Err(FoldError::Format(reason)) = checked {
                return Err(fail(reason));
            }
        }

        Ok(Equation {
            relation,
            left,
            right,
            line_comment,
        })
    }
}

/// Parse a single equation, e.g. `n1.left == n2.right + 30`
pub fn parse_equation(input: &str) -> Result<Equation, EquationFormatError> {
    let tokens = lex(input).map_err(|_| EquationFormatError::new(vec![], "unrecognized input"))?;

    let mut parts = Vec::new();
    let mut iter = tokens.into_iter().map(|(t, _)| t).peekable();
    while let Some(token) = iter.next() {
        let part = match token {
            Token::Number(n) => EquationPart::Term(EquationTerm::Constant(n)),
            Token::Plus => EquationPart::Term(EquationTerm::Operation(Operation::Add)),
            Token::Minus => EquationPart::Term(EquationTerm::Operation(Operation::Subtract)),
            Token::Star => EquationPart::Term(EquationTerm::Operation(Operation::Multiply)),
            Token::Slash => EquationPart::Term(EquationTerm::Operation(Operation::Divide)),
            Token::Less => EquationPart::Relation(Relation::Less),
            Token::LessOrEqual => EquationPart::Relation(Relation::LessOrEqual),
            Token::EqualEqual | Token::Equals => EquationPart::Relation(Relation::Equal),
            Token::GreaterOrEqual => EquationPart::Relation(Relation::GreaterOrEqual),
            Token::Greater => EquationPart::Relation(Relation::Greater),
            Token::LineComment(text) => EquationPart::LineComment(LineComment(text)),
            Token::Ident(head) => {
                let mut tail = Vec::new();
                while iter.peek() == Some(&Token::Dot) {
                    iter.next();
                    match iter.next() {
                        Some(Token::Ident(segment)) => tail.push(Identifier::new(segment)),
                        _ => {
                            return Err(EquationFormatError::new(
                                parts,
                                "expected a name after '.'",
                            ))
                        }
                    }
                }
                EquationPart::Term(EquationTerm::Variable(EquationVariable {
                    head: Identifier::new(head),
                    tail,
                }))
            }
            other => {
                return Err(EquationFormatError::new(
                    parts,
                    format!("unexpected token {:?}", other),
                ))
            }
        };
        parts.push(part);
    }

    Equation::from_raw_parts(parts)
}
