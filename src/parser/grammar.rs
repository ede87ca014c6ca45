//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::geometry::Color;
use crate::parser::ast::*;
use crate::parser::lexer::{lex, Token};

/// A field value before its key decides how it is read
#[derive(Debug, Clone)]
enum RawValue {
    Hex(String),
    Number(f64),
    String(String),
    Ident(String),
}

/// Check a `key: value` pair against the known field keys
fn field_from_parts(key: &str, value: RawValue) -> Result<BlockField, String> {
    let Some(kind) = FieldKey::from_name(key) else {
        return Err(format!("Unknown field '{}'", key));
    };
    match (kind, value) {
        (FieldKey::Color(field), RawValue::Hex(hex)) => Color::from_hex(&hex)
            .map(|value| BlockField::Color { key: field, value })
            .ok_or_else(|| format!("Invalid hex color '{}'", hex)),
        (FieldKey::Color(field), RawValue::Ident(name)) => Color::named(&name)
            .map(|value| BlockField::Color { key: field, value })
            .ok_or_else(|| format!("Unknown color '{}'", name)),
        (FieldKey::Number(field), RawValue::Number(value)) => {
            Ok(BlockField::Number { key: field, value })
        }
        (FieldKey::String(field), RawValue::String(value)) => {
            Ok(BlockField::String { key: field, value })
        }
        (FieldKey::Variable(field), RawValue::Ident(name)) => Ok(BlockField::Variable {
            key: field,
            value: Identifier::new(name),
        }),
        (FieldKey::Color(_), _) => Err(format!("Field '{}' expects a color", key)),
        (FieldKey::Number(_), _) => Err(format!("Field '{}' expects a number", key)),
        (FieldKey::String(_), _) => Err(format!("Field '{}' expects a quoted string", key)),
        (FieldKey::Variable(_), _) => Err(format!("Field '{}' expects a name", key)),
    }
}

/// Parse source text into a document
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    let tokens = lex(input)?;
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (tok, SimpleSpan::from(span)));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn equation_part_parser<'a, I>(
) -> impl Parser<'a, I, EquationPart, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let name = select! { Token::Ident(s) => Identifier::new(s) };

    let variable = name
        .clone()
        .then(
            just(Token::Dot)
                .ignore_then(name)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(head, tail)| EquationVariable { head, tail });

    let operation = select! {
        Token::Plus => Operation::Add,
        Token::Minus => Operation::Subtract,
        Token::Star => Operation::Multiply,
        Token::Slash => Operation::Divide,
    };

    let relation = select! {
        Token::Less => Relation::Less,
        Token::LessOrEqual => Relation::LessOrEqual,
        Token::EqualEqual => Relation::Equal,
        Token::Equals => Relation::Equal,
        Token::GreaterOrEqual => Relation::GreaterOrEqual,
        Token::Greater => Relation::Greater,
    };

    choice((
        select! { Token::Number(n) => EquationTerm::Constant(n) }.map(EquationPart::Term),
        operation.map(|op| EquationPart::Term(EquationTerm::Operation(op))),
        variable.map(|v| EquationPart::Term(EquationTerm::Variable(v))),
        relation.map(EquationPart::Relation),
    ))
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let line_comment = select! {
        Token::LineComment(text) => LineComment(text),
    };

    let field_value = select! {
        Token::HexColor(h) => RawValue::Hex(h),
        Token::Number(n) => RawValue::Number(n),
        Token::String(s) => RawValue::String(s),
        Token::Ident(s) => RawValue::Ident(s),
    };

    // key: value, checked against the known keys
    let field = select! { Token::Ident(key) => key }
        .then_ignore(just(Token::Colon))
        .then(field_value)
        .try_map(|(key, value), span| {
            field_from_parts(&key, value).map_err(|msg| Rich::custom(span, msg))
        });

    let block_item = choice((field, line_comment.clone().map(BlockField::LineComment)))
        .map_with(|f, e| Spanned::new(f, span_range(&e.span())));

    // Fields end with `;` or a line break; the last terminator is optional
    let separators = choice((just(Token::Semicolon), just(Token::Newline)))
        .repeated()
        .at_least(1);

    let block = block_item
        .separated_by(separators)
        .allow_leading()
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BraceOpen), just(Token::BraceClose));

    let box_style = just(Token::BoxStyle)
        .ignore_then(identifier.clone())
        .then(block.clone())
        .map(|(name, fields)| TopLevelDecl::BoxStyle(BoxStyleDecl { name, fields }));

    let box_decl = just(Token::Box)
        .ignore_then(identifier.clone())
        .then(block.clone().or_not())
        .map(|(name, fields)| {
            TopLevelDecl::Box(BoxDecl {
                name,
                fields: fields.unwrap_or_default(),
            })
        });

    let connect = just(Token::Connect)
        .ignore_then(identifier.clone())
        .then(identifier.clone())
        .then(block)
        .map(|((source, target), fields)| {
            TopLevelDecl::Connect(ConnectDecl {
                source,
                target,
                fields,
            })
        });

    // The equation runs to the end of the line; a trailing comment belongs to it
    let constrain = just(Token::Constrain)
        .ignore_then(
            equation_part_parser()
                .repeated()
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .then(line_comment.clone().or_not())
        .try_map(|(mut parts, comment), span| {
            parts.extend(comment.map(EquationPart::LineComment));
            Equation::from_raw_parts(parts)
                .map(TopLevelDecl::Constrain)
                .map_err(|e| Rich::custom(span, e.to_string()))
        });

    let declaration = choice((
        choice((box_style, box_decl, connect))
            .then(line_comment.clone().or_not())
            .map(|(item, end_of_line)| Declaration { item, end_of_line }),
        constrain.map(Declaration::new),
        line_comment.map(|c| Declaration::new(TopLevelDecl::LineComment(c))),
    ))
    .map_with(|d, e| Spanned::new(d, span_range(&e.span())))
    .boxed();

    let line_breaks = just(Token::Newline).repeated().at_least(1);

    // Document is a list of declarations, one per line
    just(Token::Newline)
        .repeated()
        .ignore_then(
            declaration
                .separated_by(line_breaks)
                .allow_trailing()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
        .map(|declarations| Document { declarations })
}
