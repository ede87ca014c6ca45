//! Boxes and Arrows - text-to-diagram compiler
//!
//! A diagram is written as boxes, box styles, connectors between boxes and
//! linear equations over box anchors. This library parses that text, solves
//! the box placement with a constraint solver, routes each connector around
//! the other boxes and emits backend-neutral draw commands.
//!
//! # Example
//!
//! ```rust
//! use boxes_and_arrows::render;
//!
//! let svg = render(r#"
//!     box client
//!     box server
//!     connect client server { head2: filled_vee }
//!     constrain server.left == client.right + 40
//! "#).unwrap();
//!
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("client"));
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod parser;
pub mod renderer;

pub use config::{ConfigError, RenderConfig};
pub use error::ParseError;
pub use layout::{LayoutConfig, LayoutError};
pub use parser::{parse, Document};
pub use renderer::{DrawCommand, Drawing, Graphics, RecordingGraphics, SvgConfig, SvgGraphics};

use log::debug;
use thiserror::Error;

use crate::renderer::{FixedMetrics, TextConfig};

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error while building, solving or routing the diagram
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run the whole pipeline and draw the result with `graphics`
///
/// The drawing is sized to the solved graph frame. Connectors without a
/// route are left out; every other failure aborts before anything is drawn.
pub fn draw_spec<G: Graphics>(
    source: &str,
    graphics: &G,
    layout: &LayoutConfig,
    text: &TextConfig,
    background: Option<geometry::Color>,
) -> Result<<G::Drawing as Drawing>::Image, RenderError> {
    let document = parse(source)?;
    debug!("parsed {} declarations", document.declarations.len());

    let diagram = layout::build(&document)?;
    let solution = layout::solve(&diagram, layout, |b| {
        graphics.measure(&renderer::label_text(b, &diagram.graph.styles, text))
    })?;
    let solved = layout::SolvedGraph::new(diagram.graph, solution);
    debug!("solved graph frame: {:?}", solved.graph_frame());

    let connectors = layout::route_all(&solved, layout);
    let commands = renderer::emit(&solved, &connectors, graphics, text, background);

    let size = solved.graph_frame().size;
    Ok(graphics.make_drawing(size).draw(&commands))
}

/// Render source to SVG with default configuration
///
/// This is the main entry point for the library.
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &RenderConfig::default())
}

/// Render source to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use boxes_and_arrows::{render_with_config, LayoutConfig, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_layout(LayoutConfig::default().with_outer_margin(10.0))
///     .with_svg(SvgConfig::default().with_background(None));
///
/// let svg = render_with_config("box a", &config).unwrap();
/// assert!(svg.contains(r#"width="30""#));
/// ```
pub fn render_with_config(source: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let graphics = SvgGraphics::new(config.svg.clone(), &config.text);
    draw_spec(
        source,
        &graphics,
        &config.layout,
        &config.text,
        config.svg.background,
    )
}

/// Run the pipeline and return the draw commands instead of an image
pub fn render_commands(
    source: &str,
    config: &RenderConfig,
) -> Result<Vec<DrawCommand>, RenderError> {
    let graphics = RecordingGraphics::new(FixedMetrics::new(&config.text));
    let recorded = draw_spec(
        source,
        &graphics,
        &config.layout,
        &config.text,
        config.svg.background,
    )?;
    Ok(recorded.commands)
}
