//! Builds the diagram model from parsed declarations
//!
//! Declarations are grouped by kind before anything is built, so a box may
//! reference a style declared after it and a connector may reference boxes
//! declared after it. Styles are built first, then boxes, then connectors.
//! The first invalid reference aborts the build.

use log::debug;

use crate::parser::ast::*;

use super::error::LayoutError;
use super::graph::{Arrow, ArrowHead, Graph, GRAPH_HEAD};
use super::style::BoxStyle;

/// A built diagram: the model plus the user equations still to be solved
#[derive(Debug)]
pub struct Diagram {
    pub graph: Graph,
    pub equations: Vec<Spanned<Equation>>,
}

/// Name of the style holding a box's own colour fields
pub fn box_style_id(box_id: &str) -> String {
    format!("__!__box_{}", box_id)
}

struct Declarations<'a> {
    styles: Vec<&'a BoxStyleDecl>,
    boxes: Vec<&'a BoxDecl>,
    connects: Vec<&'a ConnectDecl>,
    equations: Vec<Spanned<Equation>>,
}

fn group(document: &Document) -> Declarations<'_> {
    let mut decls = Declarations {
        styles: Vec::new(),
        boxes: Vec::new(),
        connects: Vec::new(),
        equations: Vec::new(),
    };
    for decl in &document.declarations {
        match &decl.node.item {
            TopLevelDecl::BoxStyle(style) => decls.styles.push(style),
            TopLevelDecl::Box(b) => decls.boxes.push(b),
            TopLevelDecl::Connect(connect) => decls.connects.push(connect),
            TopLevelDecl::Constrain(equation) => decls
                .equations
                .push(Spanned::new(equation.clone(), decl.span.clone())),
            TopLevelDecl::LineComment(_) => {}
        }
    }
    decls
}

/// Build the diagram model from a parsed document
pub fn build(document: &Document) -> Result<Diagram, LayoutError> {
    let decls = group(document);
    let mut graph = Graph::new();

    for decl in &decls.styles {
        let style = box_style(decl)?;
        if graph.styles.contains(&style.id) {
            return Err(LayoutError::duplicate(
                "box-style",
                style.id,
                decl.name.span.clone(),
            ));
        }
        graph.styles.insert(style);
    }

    for decl in &decls.boxes {
        add_box(&mut graph, decl)?;
    }

    for decl in &decls.connects {
        let arrow = arrow(&graph, decl)?;
        graph.arrows.push(arrow);
    }

    debug!(
        "built diagram: {} boxes, {} arrows, {} styles, {} equations",
        graph.boxes.len(),
        graph.arrows.len(),
        graph.styles.len(),
        decls.equations.len()
    );

    Ok(Diagram {
        graph,
        equations: decls.equations,
    })
}

fn box_style(decl: &BoxStyleDecl) -> Result<BoxStyle, LayoutError> {
    let mut style = BoxStyle::new(decl.name.node.as_str());
    for field in &decl.fields {
        match &field.node {
            BlockField::Color { key, value } => match key {
                ColorField::BackgroundColor => style.background_color = Some(*value),
                ColorField::TextColor => style.text_color = Some(*value),
            },
            BlockField::LineComment(_) => {}
            other => return Err(unsupported(other, "box-style", field)),
        }
    }
    Ok(style)
}

fn add_box(graph: &mut Graph, decl: &BoxDecl) -> Result<(), LayoutError> {
    let id = decl.name.node.as_str();
    if id == GRAPH_HEAD {
        return Err(LayoutError::ReservedName {
            name: id.to_string(),
            span: decl.name.span.clone(),
        });
    }

    let mut own = BoxStyle::new(box_style_id(id));
    let mut parent: Option<String> = None;
    let mut label: Option<String> = None;

    for field in &decl.fields {
        match &field.node {
            BlockField::Color { key, value } => match key {
                ColorField::BackgroundColor => own.background_color = Some(*value),
                ColorField::TextColor => own.text_color = Some(*value),
            },
            BlockField::String {
                key: StringField::Label,
                value,
            } => label = Some(value.clone()),
            BlockField::Variable {
                key: VariableField::Style,
                value,
            } => {
                if !graph.styles.contains(value.as_str()) {
                    return Err(LayoutError::undefined(value.as_str(), field.span.clone()));
                }
                parent = Some(value.to_string());
            }
            BlockField::LineComment(_) => {}
            other => return Err(unsupported(other, "box", field)),
        }
    }

    // Inline colours get their own style; otherwise the box uses the
    // referenced style directly.
    let style = if own.background_color.is_some() || own.text_color.is_some() {
        if let Some(parent) = parent {
            own.inherits.push(parent);
        }
        let own_id = own.id.clone();
        graph.styles.insert(own);
        Some(own_id)
    } else {
        parent
    };

    let label = label.unwrap_or_else(|| id.to_string());
    if !graph.add_box(id, label, style) {
        return Err(LayoutError::duplicate("box", id, decl.name.span.clone()));
    }
    Ok(())
}

fn arrow(graph: &Graph, decl: &ConnectDecl) -> Result<Arrow, LayoutError> {
    for end in [&decl.source, &decl.target] {
        if graph.get_box(end.node.as_str()).is_none() {
            return Err(LayoutError::undefined(end.node.as_str(), end.span.clone()));
        }
    }

    let mut arrow = Arrow::new(decl.source.node.as_str(), decl.target.node.as_str());
    for field in &decl.fields {
        match &field.node {
            BlockField::Number {
                key: NumberField::LineWidth,
                value,
            } => arrow.line_width = *value,
            BlockField::Variable {
                key: VariableField::Head1,
                value,
            } => arrow.source_head = arrow_head(value, &field.span)?,
            BlockField::Variable {
                key: VariableField::Head2,
                value,
            } => arrow.target_head = arrow_head(value, &field.span)?,
            BlockField::LineComment(_) => {}
            other => return Err(unsupported(other, "connect", field)),
        }
    }
    Ok(arrow)
}

fn arrow_head(name: &Identifier, span: &Span) -> Result<ArrowHead, LayoutError> {
    ArrowHead::from_name(name.as_str()).ok_or_else(|| LayoutError::undefined(name.as_str(), span.clone()))
}

fn unsupported(
    field: &BlockField,
    context: &'static str,
    spanned: &Spanned<BlockField>,
) -> LayoutError {
    LayoutError::unsupported_field(field.key().unwrap_or("comment"), context, spanned.span.clone())
}
