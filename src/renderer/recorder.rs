//! In-memory backend whose image is the command list itself

use crate::geometry::Size;

use super::command::{DrawCommand, Drawing, Graphics, StyledText};
use super::metrics::FixedMetrics;

/// What a [`RecordingGraphics`] drawing produces
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub size: Size,
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingGraphics {
    metrics: FixedMetrics,
}

impl RecordingGraphics {
    pub fn new(metrics: FixedMetrics) -> Self {
        Self { metrics }
    }
}

impl Graphics for RecordingGraphics {
    type Drawing = RecordingDrawing;

    fn measure(&self, text: &StyledText) -> Size {
        self.metrics.measure(text)
    }

    fn make_drawing(&self, size: Size) -> RecordingDrawing {
        RecordingDrawing { size }
    }
}

pub struct RecordingDrawing {
    size: Size,
}

impl Drawing for RecordingDrawing {
    type Image = Recorded;

    fn draw(self, commands: &[DrawCommand]) -> Recorded {
        Recorded {
            size: self.size,
            commands: commands.to_vec(),
        }
    }
}
