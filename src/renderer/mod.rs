//! Draw-command emission and the rendering backends
//!
//! The emitter turns a solved, routed diagram into a backend-neutral list of
//! [`DrawCommand`]s. A [`Graphics`] backend measures label text and replays
//! the list: [`SvgGraphics`] produces an SVG document, [`RecordingGraphics`]
//! hands the commands back unchanged.

pub mod command;
pub mod config;
pub mod emitter;
pub mod metrics;
pub mod recorder;
pub mod svg;

pub use command::{DrawCommand, Drawing, Graphics, PathStyle, StyledText, TextAlignment};
pub use config::{SvgConfig, TextConfig};
pub use emitter::{emit, label_text};
pub use metrics::FixedMetrics;
pub use recorder::{Recorded, RecordingGraphics};
pub use svg::SvgGraphics;
