//! Layout engine for computing box frames and connector routes
//!
//! This module takes a parsed document through three stages: the builder
//! turns declarations into a [`Graph`], the constraint builder solves box
//! placement with kasuari, and the router draws each connector around the
//! other boxes on a grid.

pub mod builder;
pub mod config;
pub mod connector;
pub mod constraints;
pub mod error;
pub mod graph;
pub mod routing;
pub mod solver;
pub mod style;

pub use builder::{build, Diagram};
pub use config::LayoutConfig;
pub use connector::{route_all, Arrowhead, RoutedConnector};
pub use constraints::{solve, solve_graph};
pub use error::LayoutError;
pub use graph::{Anchor, Arrow, ArrowHead, DiagramBox, Graph, SolvedGraph};
pub use routing::{AccessGrid, ConnectionPointRegister, Coordinate, Direction};
pub use solver::SolverError;
pub use style::{BoxStyle, ResolvedStyle, StyleProperty, StyleSheet};
