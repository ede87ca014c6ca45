//! Abstract Syntax Tree types for the boxes-and-arrows language

use crate::geometry::Color;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Box, style or anchor name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text of a `//` comment, without the slashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComment(pub String);

/// Root AST node - a complete diagram description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub declarations: Vec<Spanned<Declaration>>,
}

/// A top-level item together with the comment that ends its line
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub item: TopLevelDecl,
    /// Trailing comment. For `constrain` it is kept on the equation instead.
    pub end_of_line: Option<LineComment>,
}

impl Declaration {
    pub fn new(item: TopLevelDecl) -> Self {
        Self {
            item,
            end_of_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelDecl {
    /// `box-style <name> { ... }`
    BoxStyle(BoxStyleDecl),
    /// `box <name> [{ ... }]`
    Box(BoxDecl),
    /// `connect <source> <target> { ... }`
    Connect(ConnectDecl),
    /// `constrain <equation>`
    Constrain(Equation),
    /// A comment on a line of its own
    LineComment(LineComment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyleDecl {
    pub name: Spanned<Identifier>,
    pub fields: Vec<Spanned<BlockField>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxDecl {
    pub name: Spanned<Identifier>,
    pub fields: Vec<Spanned<BlockField>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectDecl {
    pub source: Spanned<Identifier>,
    pub target: Spanned<Identifier>,
    pub fields: Vec<Spanned<BlockField>>,
}

/// A `key: value` entry inside `{ }`
///
/// The parser accepts every known key in every block; whether a key is
/// allowed for a given declaration is decided when the diagram is built.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockField {
    Color { key: ColorField, value: Color },
    Number { key: NumberField, value: f64 },
    String { key: StringField, value: String },
    Variable { key: VariableField, value: Identifier },
    LineComment(LineComment),
}

impl BlockField {
    /// Field key as written in source, `None` for comments
    pub fn key(&self) -> Option<&'static str> {
        match self {
            BlockField::Color { key, .. } => Some(key.as_str()),
            BlockField::Number { key, .. } => Some(key.as_str()),
            BlockField::String { key, .. } => Some(key.as_str()),
            BlockField::Variable { key, .. } => Some(key.as_str()),
            BlockField::LineComment(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    BackgroundColor,
    TextColor,
}

impl ColorField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorField::BackgroundColor => "background-color",
            ColorField::TextColor => "text-color",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    LineWidth,
}

impl NumberField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberField::LineWidth => "line-width",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringField {
    Label,
}

impl StringField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringField::Label => "label",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableField {
    Head1,
    Head2,
    Style,
}

impl VariableField {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableField::Head1 => "head1",
            VariableField::Head2 => "head2",
            VariableField::Style => "style",
        }
    }
}

/// The kind of value a field key expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Color(ColorField),
    Number(NumberField),
    String(StringField),
    Variable(VariableField),
}

impl FieldKey {
    pub fn from_name(name: &str) -> Option<FieldKey> {
        match name {
            "background-color" => Some(FieldKey::Color(ColorField::BackgroundColor)),
            "text-color" => Some(FieldKey::Color(ColorField::TextColor)),
            "line-width" => Some(FieldKey::Number(NumberField::LineWidth)),
            "label" => Some(FieldKey::String(StringField::Label)),
            "head1" => Some(FieldKey::Variable(VariableField::Head1)),
            "head2" => Some(FieldKey::Variable(VariableField::Head2)),
            "style" => Some(FieldKey::Variable(VariableField::Style)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Dotted reference such as `box1.left`
///
/// The parser accepts any number of tail segments; only `head.anchor`
/// resolves when constraints are built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquationVariable {
    pub head: Identifier,
    pub tail: Vec<Identifier>,
}

impl EquationVariable {
    pub fn new(head: impl Into<String>, tail: &[&str]) -> Self {
        Self {
            head: Identifier::new(head),
            tail: tail.iter().map(|s| Identifier::new(*s)).collect(),
        }
    }
}

/// One side of an equation is a list of alternating terms and operations
#[derive(Debug, Clone, PartialEq)]
pub enum EquationTerm {
    Constant(f64),
    Operation(Operation),
    Variable(EquationVariable),
}

/// Equation tokens as they appear in source, before sides are split
#[derive(Debug, Clone, PartialEq)]
pub enum EquationPart {
    Term(EquationTerm),
    Relation(Relation),
    LineComment(LineComment),
}

/// A validated linear relation between two expressions
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub relation: Relation,
    pub left: Vec<EquationTerm>,
    pub right: Vec<EquationTerm>,
    pub line_comment: Option<LineComment>,
}

impl Equation {
    /// The equation as a flat token list
    pub fn parts(&self) -> Vec<EquationPart> {
        let mut parts: Vec<EquationPart> = self.left.iter().cloned().map(EquationPart::Term).collect();
        parts.push(EquationPart::Relation(self.relation));
        parts.extend(self.right.iter().cloned().map(EquationPart::Term));
        if let Some(comment) = &self.line_comment {
            parts.push(EquationPart::LineComment(comment.clone()));
        }
        parts
    }

    /// All variables referenced on either side, left to right
    pub fn variables(&self) -> impl Iterator<Item = &EquationVariable> {
        self.left.iter().chain(&self.right).filter_map(|term| match term {
            EquationTerm::Variable(v) => Some(v),
            _ => None,
        })
    }
}
