//! Grid-based connector routing
//!
//! The canvas is tiled into square cells. Each cell records in which of the
//! four directions a route may leave it, based on the boxes that obstruct
//! the connector being routed. Routes are shortest paths over that grid.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::geometry::{Point, Rectangle};

/// Cell address, `x` to the right and `y` downwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Adjacent cell, `None` past the top or left edge
    pub fn neighbor(self, direction: Direction) -> Option<Coordinate> {
        match direction {
            Direction::Up => self.y.checked_sub(1).map(|y| Coordinate::new(self.x, y)),
            Direction::Right => Some(Coordinate::new(self.x + 1, self.y)),
            Direction::Down => Some(Coordinate::new(self.x, self.y + 1)),
            Direction::Left => self.x.checked_sub(1).map(|x| Coordinate::new(x, self.y)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Direction of a step between two adjacent cells
    pub fn between(from: Coordinate, to: Coordinate) -> Direction {
        if from.x == to.x {
            if from.y < to.y {
                Direction::Down
            } else {
                Direction::Up
            }
        } else if from.x < to.x {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

/// Directions a route may leave a cell in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl Access {
    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }

    fn set(&mut self, direction: Direction, value: bool) {
        match direction {
            Direction::Up => self.up = value,
            Direction::Right => self.right = value,
            Direction::Down => self.down = value,
            Direction::Left => self.left = value,
        }
    }
}

/// An obstructing box: its exact frame and the frame grown by the margin
struct Obstacle {
    frame: Rectangle,
    grown: Rectangle,
}

/// The two directions that leave `frame` fastest from `center`
///
/// Shorter distance to an edge wins; on equal distance the edge with the
/// wider side wins.
fn escape_directions(frame: &Rectangle, center: Point) -> [Direction; 2] {
    let width = frame.max_x() - frame.min_x();
    let height = frame.max_y() - frame.min_y();
    let mut options = [
        (Direction::Up, center.y - frame.min_y(), width),
        (Direction::Down, frame.max_y() - center.y, width),
        (Direction::Left, center.x - frame.min_x(), height),
        (Direction::Right, frame.max_x() - center.x, height),
    ];
    options.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
    });
    [options[0].0, options[1].0]
}

/// Dense passability grid for routing one connector
#[derive(Debug, Clone)]
pub struct AccessGrid {
    cells: Vec<Access>,
    width: usize,
    height: usize,
    cell_side: f64,
}

impl AccessGrid {
    /// Build the grid covering `frame`
    ///
    /// `obstacles` are the exact frames of the boxes the route must avoid,
    /// in id order; each is grown by `margin` before testing cells. Cells
    /// inside an obstacle may always leave through its two nearest edges.
    pub fn new(frame: Rectangle, obstacles: &[Rectangle], margin: f64, cell_side: f64) -> Self {
        let (width, height) = if cell_side > 0.0 {
            (
                (frame.max_x() / cell_side).ceil().max(0.0) as usize,
                (frame.max_y() / cell_side).ceil().max(0.0) as usize,
            )
        } else {
            (0, 0)
        };

        let obstacles: Vec<Obstacle> = obstacles
            .iter()
            .map(|frame| Obstacle {
                frame: *frame,
                grown: frame.inset_by(-margin),
            })
            .collect();
        let containing = |rect: &Rectangle| obstacles.iter().find(|o| o.grown.contains(rect));
        let obstructed = |rect: &Rectangle| obstacles.iter().any(|o| o.grown.intersects(rect));

        let mut cells = vec![Access::default(); width * height];
        for y in 0..height {
            for x in 0..width {
                let cell = Rectangle::from_xywh(
                    x as f64 * cell_side,
                    y as f64 * cell_side,
                    cell_side,
                    cell_side,
                );
                let container = containing(&cell);
                let escapes = container.map(|o| escape_directions(&o.frame, cell.center()));
                let inside = container.is_some();

                let access = &mut cells[y * width + x];
                for direction in Direction::ALL {
                    let at_border = match direction {
                        Direction::Up => y == 0,
                        Direction::Right => x + 1 >= width,
                        Direction::Down => y + 1 >= height,
                        Direction::Left => x == 0,
                    };
                    let passable = if at_border {
                        false
                    } else if escapes.is_some_and(|e| e.contains(&direction)) {
                        true
                    } else {
                        let neighbor = match direction {
                            Direction::Up => cell.offset_by(0.0, -cell_side),
                            Direction::Right => cell.offset_by(cell_side, 0.0),
                            Direction::Down => cell.offset_by(0.0, cell_side),
                            Direction::Left => cell.offset_by(-cell_side, 0.0),
                        };
                        (inside && containing(&neighbor).is_none()) || !obstructed(&neighbor)
                    };
                    access.set(direction, passable);
                }
            }
        }

        Self {
            cells,
            width,
            height,
            cell_side,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.x < self.width && coordinate.y < self.height
    }

    /// Access flags of a cell; cells outside the grid allow nothing
    pub fn access(&self, coordinate: Coordinate) -> Access {
        if self.contains(coordinate) {
            self.cells[coordinate.y * self.width + coordinate.x]
        } else {
            Access::default()
        }
    }

    /// Centre of a cell in canvas coordinates
    pub fn point(&self, coordinate: Coordinate) -> Point {
        Point::new(
            coordinate.x as f64 * self.cell_side + self.cell_side / 2.0,
            coordinate.y as f64 * self.cell_side + self.cell_side / 2.0,
        )
    }

    /// Cells covering `rect`, column by column
    ///
    /// Only cells lying wholly inside the rectangle are taken, so every
    /// returned cell is centred inside it; cells off the grid are dropped.
    pub fn coordinates_in(&self, rect: &Rectangle) -> Vec<Coordinate> {
        if self.cell_side <= 0.0 {
            return Vec::new();
        }
        let left = (rect.min_x() / self.cell_side).ceil().max(0.0) as usize;
        let top = (rect.min_y() / self.cell_side).ceil().max(0.0) as usize;
        let right = (rect.max_x() / self.cell_side).floor().max(0.0) as usize;
        let bottom = (rect.max_y() / self.cell_side).floor().max(0.0) as usize;

        (left..right)
            .flat_map(|x| (top..bottom).map(move |y| Coordinate::new(x, y)))
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Connection point candidates on the source and target boxes
    ///
    /// Overlapping boxes keep every cell. Otherwise each side is narrowed to
    /// the row or column of cells facing the other box.
    pub fn candidates(
        &self,
        source: &Rectangle,
        target: &Rectangle,
    ) -> (Vec<Coordinate>, Vec<Coordinate>) {
        let mut from = self.coordinates_in(source);
        let mut to = self.coordinates_in(target);
        if source.intersects(target) || from.is_empty() || to.is_empty() {
            return (from, to);
        }

        fn keep(coords: &mut Vec<Coordinate>, axis: fn(&Coordinate) -> usize, pick_max: bool) {
            let extreme = if pick_max {
                coords.iter().map(axis).max()
            } else {
                coords.iter().map(axis).min()
            };
            if let Some(extreme) = extreme {
                coords.retain(|c| axis(c) == extreme);
            }
        }
        let x = |c: &Coordinate| c.x;
        let y = |c: &Coordinate| c.y;

        if target.min_x() > source.max_x() {
            keep(&mut from, x, true);
            keep(&mut to, x, false);
        }
        if target.max_x() < source.min_x() {
            keep(&mut from, x, false);
            keep(&mut to, x, true);
        }
        if target.min_y() > source.max_y() {
            keep(&mut from, y, true);
            keep(&mut to, y, false);
        }
        if target.max_y() < source.min_y() {
            keep(&mut from, y, false);
            keep(&mut to, y, true);
        }
        (from, to)
    }

    /// Shortest path from `start` to `end`, both included
    ///
    /// Every step costs one. Among equally short paths the search settles
    /// cells in (distance, x, y) order and tries neighbours left, right, up,
    /// down, so the result is deterministic. `None` when `end` is unreachable.
    pub fn shortest_path(&self, start: Coordinate, end: Coordinate) -> Option<Vec<Coordinate>> {
        if !self.contains(start) || !self.contains(end) {
            return None;
        }
        if start == end {
            return Some(vec![start]);
        }

        let index = |c: Coordinate| c.y * self.width + c.x;
        let mut distance = vec![usize::MAX; self.cells.len()];
        let mut previous: Vec<Option<Coordinate>> = vec![None; self.cells.len()];
        let mut settled = vec![false; self.cells.len()];
        let mut heap = BinaryHeap::new();

        distance[index(start)] = 0;
        heap.push(SearchState {
            distance: 0,
            coordinate: start,
        });

        while let Some(SearchState {
            distance: current,
            coordinate,
        }) = heap.pop()
        {
            if coordinate == end {
                break;
            }
            if settled[index(coordinate)] {
                continue;
            }
            settled[index(coordinate)] = true;

            let access = self.access(coordinate);
            for direction in [
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
            ] {
                if !access.allows(direction) {
                    continue;
                }
                let Some(next) = coordinate.neighbor(direction) else {
                    continue;
                };
                if !self.contains(next) || settled[index(next)] {
                    continue;
                }
                let candidate = current + 1;
                if candidate < distance[index(next)] {
                    distance[index(next)] = candidate;
                    previous[index(next)] = Some(coordinate);
                    heap.push(SearchState {
                        distance: candidate,
                        coordinate: next,
                    });
                }
            }
        }

        previous[index(end)]?;
        let mut path = vec![end];
        let mut current = end;
        while let Some(prev) = previous[index(current)] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    /// Box-drawing picture of the grid, one 4-line block per row
    ///
    /// Solid edges are blocked, dashed edges are passable. Each cell shows
    /// its x on the first text line and its y on the second.
    pub fn picture(&self) -> String {
        let digits = self.width.to_string().len().max(self.height.to_string().len());
        let span = digits + 2;
        let edge = |open: bool| if open { "┄" } else { "━" }.repeat(span);
        let wall = |open: bool| if open { '┆' } else { '┃' };

        let mut out = String::new();
        for y in 0..self.height {
            let row: Vec<Access> = (0..self.width)
                .map(|x| self.access(Coordinate::new(x, y)))
                .collect();

            for cell in &row {
                out.push('┌');
                out.push_str(&edge(cell.up));
                out.push('┐');
            }
            out.push('\n');
            for value in [None, Some(y)] {
                for (x, cell) in row.iter().enumerate() {
                    out.push(wall(cell.left));
                    out.push_str(&format!(" {:>width$} ", value.unwrap_or(x), width = digits));
                    out.push(wall(cell.right));
                }
                out.push('\n');
            }
            for cell in &row {
                out.push('└');
                out.push_str(&edge(cell.down));
                out.push('┘');
            }
            out.push('\n');
        }
        out
    }
}

/// Priority queue entry; the heap pops the smallest (distance, x, y) first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchState {
    distance: usize,
    coordinate: Coordinate,
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.coordinate.x.cmp(&self.coordinate.x))
            .then_with(|| other.coordinate.y.cmp(&self.coordinate.y))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Connection points already claimed in one diagram
#[derive(Debug, Default)]
pub struct ConnectionPointRegister {
    used: HashSet<Coordinate>,
}

impl ConnectionPointRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the first unused candidate
    ///
    /// When every candidate is taken the first one is shared. `None` only
    /// for an empty candidate list.
    pub fn pick(&mut self, candidates: &[Coordinate]) -> Option<Coordinate> {
        for candidate in candidates {
            if self.used.insert(*candidate) {
                return Some(*candidate);
            }
        }
        candidates.first().copied()
    }

    pub fn is_used(&self, coordinate: Coordinate) -> bool {
        self.used.contains(&coordinate)
    }
}
