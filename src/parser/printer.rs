//! Source printer for parsed documents
//!
//! Printing a parsed document and parsing the output again gives the same
//! declarations (spans aside). Colours are normalised to `#RRGGBBAA` and
//! equality is always written as `==`.

use std::fmt;

use super::ast::*;

impl fmt::Display for LineComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}", self.0)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Less => "<",
            Relation::LessOrEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
            Relation::Greater => ">",
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        })
    }
}

impl fmt::Display for EquationVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for segment in &self.tail {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

impl fmt::Display for EquationTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquationTerm::Constant(c) => write!(f, "{}", c),
            EquationTerm::Operation(op) => write!(f, "{}", op),
            EquationTerm::Variable(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Display for EquationPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquationPart::Term(term) => write!(f, "{}", term),
            EquationPart::Relation(relation) => write!(f, "{}", relation),
            EquationPart::LineComment(comment) => write!(f, "{}", comment),
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .parts()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>();
        f.write_str(&parts.join(" "))
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

impl fmt::Display for BlockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockField::Color { key, value } => write!(f, "{}: {}", key.as_str(), value),
            BlockField::Number { key, value } => write!(f, "{}: {}", key.as_str(), value),
            BlockField::String { key, value } => {
                write!(f, "{}: ", key.as_str())?;
                write_string_literal(f, value)
            }
            BlockField::Variable { key, value } => write!(f, "{}: {}", key.as_str(), value),
            BlockField::LineComment(comment) => write!(f, "{}", comment),
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, fields: &[Spanned<BlockField>]) -> fmt::Result {
    if fields.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{\n")?;
    for field in fields {
        writeln!(f, "    {}", field.node)?;
    }
    f.write_str("}")
}

impl fmt::Display for TopLevelDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopLevelDecl::BoxStyle(style) => {
                write!(f, "box-style {} ", style.name.node)?;
                write_block(f, &style.fields)
            }
            TopLevelDecl::Box(b) => {
                write!(f, "box {}", b.name.node)?;
                if b.fields.is_empty() {
                    Ok(())
                } else {
                    f.write_str(" ")?;
                    write_block(f, &b.fields)
                }
            }
            TopLevelDecl::Connect(connect) => {
                write!(f, "connect {} {} ", connect.source.node, connect.target.node)?;
                write_block(f, &connect.fields)
            }
            TopLevelDecl::Constrain(equation) => write!(f, "constrain {}", equation),
            TopLevelDecl::LineComment(comment) => write!(f, "{}", comment),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.item)?;
        if let Some(comment) = &self.end_of_line {
            write!(f, " {}", comment)?;
        }
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for declaration in &self.declarations {
            writeln!(f, "{}", declaration.node)?;
        }
        Ok(())
    }
}
