//! Turns grid paths into drawable connectors
//!
//! A raw grid path starts and ends on cells inside the source and target
//! boxes. Trimming replaces those ends with the points where the path
//! crosses the exact box edges, simplification drops the cells between
//! turns, and arrowheads are placed on the final segments.

use log::{debug, info, log_enabled, trace, Level};

use crate::geometry::{Point, Rectangle};

use super::config::LayoutConfig;
use super::graph::{Arrow, ArrowHead, SolvedGraph};
use super::routing::{AccessGrid, ConnectionPointRegister, Coordinate, Direction};

/// Filled triangle at one end of a connector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

/// A routed connector, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnector {
    /// Index of the arrow in declaration order
    pub arrow: usize,
    /// Polyline from the source edge to the target edge
    pub points: Vec<Point>,
    pub arrowheads: Vec<Arrowhead>,
    /// Claimed grid cells on the source and target boxes
    pub connection_points: (Coordinate, Coordinate),
    pub line_width: f64,
}

fn edge_crossing(direction: Direction, cell: Point, frame: &Rectangle, leaving: bool) -> Point {
    // Leaving the source crosses the edge ahead; entering the target
    // crosses the edge facing back.
    match (direction, leaving) {
        (Direction::Down, true) | (Direction::Up, false) => Point::new(cell.x, frame.max_y()),
        (Direction::Up, true) | (Direction::Down, false) => Point::new(cell.x, frame.min_y()),
        (Direction::Right, true) | (Direction::Left, false) => Point::new(frame.max_x(), cell.y),
        (Direction::Left, true) | (Direction::Right, false) => Point::new(frame.min_x(), cell.y),
    }
}

/// Cut a grid path to the exact source and target edges
///
/// The route starts where the path first steps from a cell centred inside
/// the source to one centred outside it, and ends where it last steps from
/// outside the target into it. The edge and crossing point come from that
/// step. Returns the start point, the cell centres in between, and the end
/// point; `None` when no cell of the path lies outside both boxes in order.
pub fn trim(
    grid: &AccessGrid,
    path: &[Coordinate],
    source: &Rectangle,
    target: &Rectangle,
) -> Option<(Point, Vec<Point>, Point)> {
    let leave = path
        .iter()
        .position(|c| !source.contains_point(grid.point(*c)))?;
    let enter = path
        .iter()
        .rposition(|c| !target.contains_point(grid.point(*c)))?;
    if enter < leave {
        return None;
    }

    let (line_start, first) = match leave.checked_sub(1) {
        Some(inside) => {
            let direction = Direction::between(path[inside], path[leave]);
            let crossing = edge_crossing(direction, grid.point(path[inside]), source, true);
            (crossing, leave)
        }
        // the path starts outside the source; begin at that cell
        None => (grid.point(path[0]), 1),
    };
    let (line_end, last) = match path.get(enter + 1) {
        Some(inside) => {
            let direction = Direction::between(path[enter], *inside);
            let crossing = edge_crossing(direction, grid.point(*inside), target, false);
            (crossing, enter + 1)
        }
        None => (grid.point(path[enter]), enter),
    };

    let interior = path
        .get(first..last)
        .unwrap_or_default()
        .iter()
        .map(|c| grid.point(*c))
        .collect();
    Some((line_start, interior, line_end))
}

/// Merge runs of points on one vertical or horizontal line
///
/// A point on the same line as the previous two replaces the previous one.
pub fn simplify(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if let [.., p1, p0] = out.as_slice() {
            let vertical = point.x == p0.x && point.x == p1.x;
            let horizontal = point.y == p0.y && point.y == p1.y;
            if vertical || horizontal {
                let last = out.len() - 1;
                out[last] = *point;
                continue;
            }
        }
        out.push(*point);
    }
    out
}

/// Filled arrowhead at `tip`, for a segment arriving from `from`
///
/// The base sits `3 + line_width` behind the tip and is `2 + line_width`
/// wide on each side. Diagonal or empty segments get no arrowhead.
pub fn filled_vee(tip: Point, from: Point, line_width: f64) -> Option<Arrowhead> {
    let length = 3.0 + line_width;
    let half_width = 2.0 + line_width;
    let dx = tip.x - from.x;
    let dy = tip.y - from.y;

    if dx == 0.0 && dy != 0.0 {
        let base_y = tip.y - dy.signum() * length;
        Some(Arrowhead {
            tip,
            left: Point::new(tip.x - half_width, base_y),
            right: Point::new(tip.x + half_width, base_y),
        })
    } else if dy == 0.0 && dx != 0.0 {
        let base_x = tip.x - dx.signum() * length;
        Some(Arrowhead {
            tip,
            left: Point::new(base_x, tip.y - half_width),
            right: Point::new(base_x, tip.y + half_width),
        })
    } else {
        None
    }
}

fn arrowheads(arrow: &Arrow, points: &[Point]) -> Vec<Arrowhead> {
    let mut heads = Vec::new();
    if let ([first, second, ..], ArrowHead::FilledVee) = (points, arrow.source_head) {
        heads.extend(filled_vee(*first, *second, arrow.line_width));
    }
    if let ([.., before_last, last], ArrowHead::FilledVee) = (points, arrow.target_head) {
        heads.extend(filled_vee(*last, *before_last, arrow.line_width));
    }
    heads
}

/// Route one arrow; `None` when it cannot be drawn
fn route(
    solved: &SolvedGraph,
    config: &LayoutConfig,
    index: usize,
    arrow: &Arrow,
    register: &mut ConnectionPointRegister,
) -> Option<RoutedConnector> {
    let source = solved.frame(&arrow.source)?;
    let target = solved.frame(&arrow.target)?;

    // The target stays passable so the route can reach it
    let obstacles: Vec<Rectangle> = solved
        .box_frames()
        .filter(|(b, _)| b.id != arrow.target)
        .map(|(_, frame)| frame)
        .collect();
    let grid = AccessGrid::new(
        solved.graph_frame(),
        &obstacles,
        config.routing_margin(index),
        config.cell_side,
    );
    if log_enabled!(Level::Trace) {
        trace!(
            "access grid for {} -> {}:\n{}",
            arrow.source,
            arrow.target,
            grid.picture()
        );
    }

    let (source_candidates, target_candidates) = grid.candidates(&source, &target);
    let start = register.pick(&source_candidates)?;
    let end = register.pick(&target_candidates)?;
    debug!(
        "connector {} -> {}: connection points {:?} -> {:?}",
        arrow.source, arrow.target, start, end
    );

    let path = grid.shortest_path(start, end)?;
    let (line_start, interior, line_end) = trim(&grid, &path, &source, &target)?;

    let mut points = Vec::with_capacity(interior.len() + 2);
    points.push(line_start);
    points.extend(interior);
    points.push(line_end);
    let mut points = simplify(&points);
    points.dedup();
    if points.len() < 2 {
        debug!(
            "connector {} -> {}: boxes touch, nothing to draw",
            arrow.source, arrow.target
        );
        return None;
    }

    Some(RoutedConnector {
        arrow: index,
        arrowheads: arrowheads(arrow, &points),
        points,
        connection_points: (start, end),
        line_width: arrow.line_width,
    })
}

/// Route every arrow of the graph in declaration order
///
/// Arrows without a route are left out.
pub fn route_all(solved: &SolvedGraph, config: &LayoutConfig) -> Vec<RoutedConnector> {
    let mut register = ConnectionPointRegister::new();
    solved
        .graph
        .arrows
        .iter()
        .enumerate()
        .filter_map(|(index, arrow)| {
            let routed = route(solved, config, index, arrow, &mut register);
            if routed.is_none() {
                info!("connector {} -> {} skipped: no route", arrow.source, arrow.target);
            }
            routed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c(x: usize, y: usize) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn grid() -> AccessGrid {
        AccessGrid::new(Rectangle::from_xywh(0.0, 0.0, 100.0, 100.0), &[], 0.0, 5.0)
    }

    #[test]
    fn test_trim_horizontal_path() {
        // source covers cells x 2..3, target covers x 8..9, all on row 4
        let source = Rectangle::from_xywh(10.0, 15.0, 10.0, 10.0);
        let target = Rectangle::from_xywh(40.0, 15.0, 10.0, 10.0);
        let path: Vec<Coordinate> = (3..=8).map(|x| c(x, 4)).collect();

        let (start, interior, end) = trim(&grid(), &path, &source, &target).unwrap();
        assert_eq!(start, p(20.0, 22.5));
        assert_eq!(end, p(40.0, 22.5));
        assert_eq!(
            interior,
            vec![p(22.5, 22.5), p(27.5, 22.5), p(32.5, 22.5), p(37.5, 22.5)]
        );
    }

    #[test]
    fn test_trim_drops_cells_inside_boxes() {
        // path starts deep inside the source and ends deep inside the target
        let source = Rectangle::from_xywh(0.0, 0.0, 20.0, 20.0);
        let target = Rectangle::from_xywh(0.0, 40.0, 20.0, 20.0);
        let path: Vec<Coordinate> = (1..=9).map(|y| c(1, y)).collect();

        let (start, interior, end) = trim(&grid(), &path, &source, &target).unwrap();
        assert_eq!(start, p(7.5, 20.0));
        assert_eq!(end, p(7.5, 40.0));
        assert_eq!(
            interior,
            vec![p(7.5, 22.5), p(7.5, 27.5), p(7.5, 32.5), p(7.5, 37.5)]
        );
    }

    #[test]
    fn test_trim_upward_and_leftward() {
        let source = Rectangle::from_xywh(40.0, 40.0, 10.0, 10.0);
        let target = Rectangle::from_xywh(10.0, 10.0, 10.0, 10.0);
        // up from (8, 8) to (8, 3), then left to (3, 3)
        let mut path: Vec<Coordinate> = (3..=8).rev().map(|y| c(8, y)).collect();
        path.extend((3..=7).rev().map(|x| c(x, 3)));

        let (start, interior, end) = trim(&grid(), &path, &source, &target).unwrap();
        assert_eq!(start, p(42.5, 40.0));
        assert_eq!(end, p(20.0, 17.5));
        assert_eq!(interior.first(), Some(&p(42.5, 37.5)));
        assert_eq!(interior.last(), Some(&p(22.5, 17.5)));
    }

    #[test]
    fn test_trim_path_turning_inside_target() {
        // enters the target on row 3, then turns down inside it
        let source = Rectangle::from_xywh(10.0, 15.0, 10.0, 10.0);
        let target = Rectangle::from_xywh(40.0, 15.0, 10.0, 10.0);
        let mut path: Vec<Coordinate> = (3..=9).map(|x| c(x, 3)).collect();
        path.push(c(9, 4));

        let (start, interior, end) = trim(&grid(), &path, &source, &target).unwrap();
        assert_eq!(start, p(20.0, 17.5));
        assert_eq!(end, p(40.0, 17.5));
        assert_eq!(
            interior,
            vec![p(22.5, 17.5), p(27.5, 17.5), p(32.5, 17.5), p(37.5, 17.5)]
        );
    }

    #[test]
    fn test_trim_path_turning_inside_source() {
        // leaves the source cell upwards, turns right inside it, then exits right
        let source = Rectangle::from_xywh(10.0, 10.0, 12.0, 12.0);
        let target = Rectangle::from_xywh(40.0, 10.0, 10.0, 10.0);
        let mut path = vec![c(2, 3), c(2, 2), c(3, 2), c(4, 2)];
        path.extend((5..=8).map(|x| c(x, 2)));

        let (start, interior, _) = trim(&grid(), &path, &source, &target).unwrap();
        assert_eq!(start, p(22.0, 12.5));
        assert_eq!(interior.first(), Some(&p(22.5, 12.5)));
    }

    #[test]
    fn test_trim_touching_boxes() {
        // every cell centre lies in one of the two boxes
        let source = Rectangle::from_xywh(10.0, 10.0, 10.0, 10.0);
        let target = Rectangle::from_xywh(10.0, 20.0, 10.0, 10.0);
        let path = vec![c(2, 3), c(2, 4)];
        assert_eq!(trim(&grid(), &path, &source, &target), None);
    }

    #[test]
    fn test_trim_needs_two_cells() {
        let frame = Rectangle::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert_eq!(trim(&grid(), &[c(1, 1)], &frame, &frame), None);
        assert_eq!(trim(&grid(), &[], &frame, &frame), None);
    }

    #[test]
    fn test_simplify_keeps_turns_only() {
        let points = vec![
            p(0.0, 0.0),
            p(0.0, 5.0),
            p(0.0, 10.0),
            p(5.0, 10.0),
            p(10.0, 10.0),
            p(10.0, 15.0),
        ];
        assert_eq!(
            simplify(&points),
            vec![p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 15.0)]
        );
    }

    #[test]
    fn test_simplify_short_lists_unchanged() {
        assert_eq!(simplify(&[]), Vec::<Point>::new());
        let two = vec![p(1.0, 1.0), p(1.0, 9.0)];
        assert_eq!(simplify(&two), two);
    }

    #[test]
    fn test_filled_vee_pointing_right() {
        let head = filled_vee(p(100.0, 50.0), p(60.0, 50.0), 1.0).unwrap();
        assert_eq!(head.tip, p(100.0, 50.0));
        assert_eq!(head.left, p(96.0, 47.0));
        assert_eq!(head.right, p(96.0, 53.0));
    }

    #[test]
    fn test_filled_vee_pointing_up() {
        let head = filled_vee(p(10.0, 10.0), p(10.0, 40.0), 2.0).unwrap();
        assert_eq!(head.left, p(6.0, 15.0));
        assert_eq!(head.right, p(14.0, 15.0));
    }

    #[test]
    fn test_filled_vee_rejects_diagonal() {
        assert_eq!(filled_vee(p(10.0, 10.0), p(0.0, 0.0), 1.0), None);
        assert_eq!(filled_vee(p(10.0, 10.0), p(10.0, 10.0), 1.0), None);
    }

    #[test]
    fn test_arrowheads_follow_arrow_heads() {
        let points = vec![p(0.0, 0.0), p(0.0, 20.0), p(30.0, 20.0)];
        let mut arrow = Arrow::new("a", "b");
        assert!(arrowheads(&arrow, &points).is_empty());

        arrow.target_head = ArrowHead::FilledVee;
        let heads = arrowheads(&arrow, &points);
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].tip, p(30.0, 20.0));

        arrow.source_head = ArrowHead::FilledVee;
        let heads = arrowheads(&arrow, &points);
        assert_eq!(heads.len(), 2);
        assert_eq!(heads[0].tip, p(0.0, 0.0));
    }
}
