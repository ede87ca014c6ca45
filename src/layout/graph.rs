//! Diagram model: boxes, arrows, styles and their solver anchors

use std::collections::BTreeMap;

use crate::geometry::Rectangle;

use super::solver::{Solution, VariableId, VariableTable};
use super::style::StyleSheet;

/// Box id used in equations to address the canvas
pub const GRAPH_HEAD: &str = "graph";

/// Prefix of the canvas variable names (`..top`, `..width`, ...)
const GRAPH_VARIABLE_PREFIX: &str = ".";

/// Named geometric quantity of a box or of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Top,
    CenterY,
    Bottom,
    Left,
    CenterX,
    Right,
    Height,
    Width,
}

impl Anchor {
    pub const ALL: [Anchor; 8] = [
        Anchor::Top,
        Anchor::CenterY,
        Anchor::Bottom,
        Anchor::Left,
        Anchor::CenterX,
        Anchor::Right,
        Anchor::Height,
        Anchor::Width,
    ];

    /// Name as written after the dot in equations
    pub fn suffix(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::CenterY => "centerY",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::CenterX => "centerX",
            Anchor::Right => "right",
            Anchor::Height => "height",
            Anchor::Width => "width",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Anchor> {
        Anchor::ALL.into_iter().find(|anchor| anchor.suffix() == suffix)
    }
}

/// Solver variables for the eight anchors of one box or of the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSet {
    pub top: VariableId,
    pub center_y: VariableId,
    pub bottom: VariableId,
    pub left: VariableId,
    pub center_x: VariableId,
    pub right: VariableId,
    pub height: VariableId,
    pub width: VariableId,
}

impl AnchorSet {
    /// Intern the variables `<owner>.<suffix>` for every anchor
    pub fn intern(table: &mut VariableTable, owner: &str) -> Self {
        let mut name = |anchor: Anchor| table.intern(format!("{}.{}", owner, anchor.suffix()));
        Self {
            top: name(Anchor::Top),
            center_y: name(Anchor::CenterY),
            bottom: name(Anchor::Bottom),
            left: name(Anchor::Left),
            center_x: name(Anchor::CenterX),
            right: name(Anchor::Right),
            height: name(Anchor::Height),
            width: name(Anchor::Width),
        }
    }

    pub fn get(&self, anchor: Anchor) -> VariableId {
        match anchor {
            Anchor::Top => self.top,
            Anchor::CenterY => self.center_y,
            Anchor::Bottom => self.bottom,
            Anchor::Left => self.left,
            Anchor::CenterX => self.center_x,
            Anchor::Right => self.right,
            Anchor::Height => self.height,
            Anchor::Width => self.width,
        }
    }

    /// Rectangle spanned by the solved edge anchors
    pub fn frame(&self, solution: &Solution) -> Rectangle {
        let left = solution.value(self.left);
        let top = solution.value(self.top);
        Rectangle::from_xywh(
            left,
            top,
            solution.value(self.right) - left,
            solution.value(self.bottom) - top,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramBox {
    pub id: String,
    pub label: String,
    /// Style the box is drawn with, if any
    pub style: Option<String>,
    pub anchors: AnchorSet,
}

/// End decoration of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowHead {
    #[default]
    Line,
    FilledVee,
}

impl ArrowHead {
    pub fn from_name(name: &str) -> Option<ArrowHead> {
        match name {
            "line" => Some(ArrowHead::Line),
            "filled_vee" => Some(ArrowHead::FilledVee),
            _ => None,
        }
    }
}

/// Directed connector between two boxes
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub source: String,
    pub target: String,
    pub source_head: ArrowHead,
    pub target_head: ArrowHead,
    pub line_width: f64,
}

impl Arrow {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_head: ArrowHead::Line,
            target_head: ArrowHead::Line,
            line_width: 1.0,
        }
    }
}

/// The complete diagram model
///
/// Boxes are keyed by id in a sorted map, so every iteration over boxes
/// is in id order.
#[derive(Debug)]
pub struct Graph {
    pub boxes: BTreeMap<String, DiagramBox>,
    /// Connectors in declaration order
    pub arrows: Vec<Arrow>,
    pub styles: StyleSheet,
    pub anchors: AnchorSet,
    pub variables: VariableTable,
}

impl Graph {
    pub fn new() -> Self {
        let mut variables = VariableTable::new();
        let anchors = AnchorSet::intern(&mut variables, GRAPH_VARIABLE_PREFIX);
        Self {
            boxes: BTreeMap::new(),
            arrows: Vec::new(),
            styles: StyleSheet::new(),
            anchors,
            variables,
        }
    }

    /// Add a box with freshly interned anchors
    ///
    /// Returns `false` and leaves the graph untouched when the id is taken.
    pub fn add_box(&mut self, id: &str, label: String, style: Option<String>) -> bool {
        if self.boxes.contains_key(id) {
            return false;
        }
        let anchors = AnchorSet::intern(&mut self.variables, id);
        self.boxes.insert(
            id.to_string(),
            DiagramBox {
                id: id.to_string(),
                label,
                style,
                anchors,
            },
        );
        true
    }

    pub fn get_box(&self, id: &str) -> Option<&DiagramBox> {
        self.boxes.get(id)
    }

    /// Anchors addressed by an equation head: a box id or [`GRAPH_HEAD`]
    pub fn anchors_of(&self, head: &str) -> Option<&AnchorSet> {
        if head == GRAPH_HEAD {
            Some(&self.anchors)
        } else {
            self.boxes.get(head).map(|b| &b.anchors)
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// A graph together with solved anchor values
#[derive(Debug)]
pub struct SolvedGraph {
    pub graph: Graph,
    pub solution: Solution,
}

impl SolvedGraph {
    pub fn new(graph: Graph, solution: Solution) -> Self {
        Self { graph, solution }
    }

    /// Solved value of one anchor of `head` (box id or `graph`)
    pub fn value(&self, head: &str, anchor: Anchor) -> Option<f64> {
        self.graph
            .anchors_of(head)
            .map(|anchors| self.solution.value(anchors.get(anchor)))
    }

    /// Solved rectangle of a box
    pub fn frame(&self, id: &str) -> Option<Rectangle> {
        self.graph
            .get_box(id)
            .map(|b| b.anchors.frame(&self.solution))
    }

    pub fn graph_frame(&self) -> Rectangle {
        self.graph.anchors.frame(&self.solution)
    }

    /// Every box with its solved rectangle, sorted by id
    pub fn box_frames(&self) -> impl Iterator<Item = (&DiagramBox, Rectangle)> {
        self.graph
            .boxes
            .values()
            .map(|b| (b, b.anchors.frame(&self.solution)))
    }
}
