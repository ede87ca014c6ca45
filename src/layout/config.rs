//! Configuration for the layout engine

use serde::Deserialize;

/// Configuration options for constraint building and connector routing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Minimum distance between any box and the edge of the canvas
    pub outer_margin: f64,

    /// Side length of one routing grid cell
    pub cell_side: f64,

    /// Obstacle growth per connector; connector `n` (1-based) routes
    /// `n * routing_margin_step` away from other boxes
    pub routing_margin_step: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            outer_margin: 50.0,
            cell_side: 5.0,
            routing_margin_step: 4.0,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the margin kept between boxes and the canvas edge
    pub fn with_outer_margin(mut self, margin: f64) -> Self {
        self.outer_margin = margin;
        self
    }

    /// Set the routing grid cell size
    pub fn with_cell_side(mut self, side: f64) -> Self {
        self.cell_side = side;
        self
    }

    pub fn with_routing_margin_step(mut self, step: f64) -> Self {
        self.routing_margin_step = step;
        self
    }

    /// Obstacle margin for the connector at `index` (0-based)
    pub fn routing_margin(&self, index: usize) -> f64 {
        self.routing_margin_step * (index + 1) as f64
    }
}
