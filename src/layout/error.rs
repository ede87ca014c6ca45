//! Error types for building and solving the diagram

use thiserror::Error;

use crate::parser::ast::{Relation, Span};
use crate::parser::EquationFormatError;

use super::solver::SolverError;

/// Errors that can occur while building the diagram model or its constraints
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Reference to an undefined box, style, anchor or arrowhead
    #[error("undefined reference '{name}'")]
    UndefinedReference { name: String, span: Span },

    /// A known field used on a declaration that does not accept it
    #[error("field '{field}' is not supported on {context}")]
    UnsupportedField {
        field: String,
        context: &'static str,
        span: Span,
    },

    /// Two boxes or two styles with the same name
    #[error("{kind} '{name}' is defined more than once")]
    DuplicateDefinition {
        kind: &'static str,
        name: String,
        span: Span,
    },

    /// A box whose name is reserved for the canvas
    #[error("'{name}' is reserved and cannot name a box")]
    ReservedName { name: String, span: Span },

    #[error(transparent)]
    EquationFormat(#[from] EquationFormatError),

    /// `<` and `>` parse but cannot be solved
    #[error("relation '{relation}' is not supported, use <=, == or >=")]
    UnsupportedRelation { relation: Relation, span: Span },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

impl LayoutError {
    pub fn undefined(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedReference {
            name: name.into(),
            span,
        }
    }

    pub fn unsupported_field(field: impl Into<String>, context: &'static str, span: Span) -> Self {
        Self::UnsupportedField {
            field: field.into(),
            context,
            span,
        }
    }

    pub fn duplicate(kind: &'static str, name: impl Into<String>, span: Span) -> Self {
        Self::DuplicateDefinition {
            kind,
            name: name.into(),
            span,
        }
    }

    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::UndefinedReference { span, .. }
            | Self::UnsupportedField { span, .. }
            | Self::DuplicateDefinition { span, .. }
            | Self::ReservedName { span, .. }
            | Self::UnsupportedRelation { span, .. } => Some(span),
            Self::EquationFormat(_) | Self::Solver(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_reference_display() {
        let err = LayoutError::undefined("n3", 0..2);
        assert_eq!(err.to_string(), "undefined reference 'n3'");
        assert_eq!(err.span(), Some(&(0..2)));
    }

    #[test]
    fn test_unsupported_field_display() {
        let err = LayoutError::unsupported_field("label", "box-style", 5..10);
        assert_eq!(err.to_string(), "field 'label' is not supported on box-style");
    }

    #[test]
    fn test_unsupported_relation_display() {
        let err = LayoutError::UnsupportedRelation {
            relation: Relation::Less,
            span: 0..1,
        };
        assert!(err.to_string().contains("'<'"));
    }
}
