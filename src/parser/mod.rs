//! Parser for the boxes-and-arrows language

pub mod ast;
pub mod equation;
mod grammar;
pub mod lexer;
mod printer;

pub use ast::*;
pub use equation::{fold_side, parse_equation, EquationFormatError, FoldError, LinearExpr};
pub use grammar::parse;
