//! End-to-end tests: source text in, draw commands out

use boxes_and_arrows::geometry::{Color, Point, Rectangle};
use boxes_and_arrows::layout::{
    build, route_all, solve_graph, BoxStyle, LayoutConfig, RoutedConnector, SolvedGraph,
    StyleProperty, StyleSheet,
};
use boxes_and_arrows::renderer::{label_text, FixedMetrics, TextConfig};
use boxes_and_arrows::{
    parse, render, render_commands, DrawCommand, Graphics, LayoutError, RecordingGraphics,
    RenderConfig, RenderError,
};
use pretty_assertions::assert_eq;

const EPSILON: f64 = 1e-6;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn commands(source: &str) -> Vec<DrawCommand> {
    render_commands(source, &RenderConfig::default()).expect("Should render")
}

/// Box outlines in emission order (id order)
fn box_rects(commands: &[DrawCommand]) -> Vec<Rectangle> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::AddRect(rect) => Some(*rect),
            _ => None,
        })
        .collect()
}

fn solve_and_route(source: &str) -> (SolvedGraph, Vec<RoutedConnector>) {
    let text = TextConfig::default();
    let graphics = RecordingGraphics::new(FixedMetrics::new(&text));
    let diagram = build(&parse(source).expect("Should parse")).expect("Should build");
    let styles = diagram.graph.styles.clone();
    let config = LayoutConfig::default();
    let solved = solve_graph(diagram, &config, |b| {
        graphics.measure(&label_text(b, &styles, &text))
    })
    .expect("Should solve");
    let connectors = route_all(&solved, &config);
    (solved, connectors)
}

/// Whether an axis-aligned segment passes through the inside of `rect`
fn crosses_interior(a: Point, b: Point, rect: &Rectangle) -> bool {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    x1 > rect.min_x() + EPSILON
        && x0 < rect.max_x() - EPSILON
        && y1 > rect.min_y() + EPSILON
        && y0 < rect.max_y() - EPSILON
}

#[test]
fn test_styled_pair_with_gap() {
    let commands = commands(
        r#"
box-style s1 { background-color: #FF90F4; text-color: black }
box n1 { style: s1 }
box n2
connect n1 n2 { head2: filled_vee }
constrain n1.left == n2.right + 30.0
"#,
    );

    let rects = box_rects(&commands);
    assert_eq!(rects.len(), 2);
    let (n1, n2) = (rects[0], rects[1]);
    assert!(close(n1.min_x(), n2.max_x() + 30.0), "n1 {:?} n2 {:?}", n1, n2);
    assert!(close(n1.min_y(), n2.min_y()));

    let fill = Color::from_hex("#FF90F4").unwrap();
    assert!(commands.iter().any(|c| matches!(
        c,
        DrawCommand::FillAndStrokePath(style) if style.fill_color == fill
    )));

    // exactly one arrowhead, with its tip on n2's right edge
    let heads: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, DrawCommand::FillPath(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(heads.len(), 1);
    match &commands[heads[0] - 4] {
        DrawCommand::Move(tip) => {
            assert!(close(tip.x, n2.max_x()), "tip {:?} n2 {:?}", tip, n2);
            assert!(tip.y > n2.min_y() && tip.y < n2.max_y());
        }
        other => panic!("expected arrowhead move, got {:?}", other),
    }
}

#[test]
fn test_stacked_boxes_route_around_middle() {
    let (solved, connectors) = solve_and_route(
        r#"
box box1
box box2
box box3
box box4
box box5
connect box1 box4 { head2: filled_vee }
connect box2 box5 { head2: filled_vee }
constrain box1.left == box2.left
constrain box1.left == box3.left
constrain box1.left == box4.left
constrain box1.left == box5.left
constrain box1.bottom + 40.0 == box2.top
constrain box2.bottom + 40.0 == box3.top
constrain box3.bottom + 40.0 == box4.top
constrain box4.bottom + 40.0 == box5.top
"#,
    );

    assert_eq!(connectors.len(), 2);

    let claimed = [
        connectors[0].connection_points.0,
        connectors[0].connection_points.1,
        connectors[1].connection_points.0,
        connectors[1].connection_points.1,
    ];
    for i in 0..claimed.len() {
        for j in i + 1..claimed.len() {
            assert_ne!(claimed[i], claimed[j], "connection point claimed twice");
        }
    }

    for connector in &connectors {
        let arrow = &solved.graph.arrows[connector.arrow];
        assert_eq!(connector.arrowheads.len(), 1);
        for (b, frame) in solved.box_frames() {
            if b.id == arrow.source || b.id == arrow.target {
                continue;
            }
            for segment in connector.points.windows(2) {
                assert!(
                    !crosses_interior(segment[0], segment[1], &frame),
                    "{} -> {} crosses {}",
                    arrow.source,
                    arrow.target,
                    b.id
                );
            }
        }
    }
}

#[test]
fn test_unroutable_connector_is_omitted() {
    // `inner` sits inside `wall`, which blocks every way in
    let source = r#"
box wall { label: "wwwwwwwwwwwwwwwwwwww" }
box inner { label: "i" }
box outside
connect outside inner { head2: filled_vee }
constrain inner.centerX == wall.centerX
constrain inner.centerY == wall.centerY
constrain outside.left == wall.right + 40
"#;
    let commands = commands(source);

    assert_eq!(box_rects(&commands).len(), 3);
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Move(_))));
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::FillPath(_))));

    let (_, connectors) = solve_and_route(source);
    assert!(connectors.is_empty());
}

#[test]
fn test_undefined_box_produces_no_commands() {
    let result = render_commands("box n1\nconnect n1 n3 {}", &RenderConfig::default());
    match result {
        Err(RenderError::Layout(LayoutError::UndefinedReference { name, .. })) => {
            assert_eq!(name, "n3")
        }
        other => panic!("expected undefined reference, got {:?}", other),
    }
}

#[test]
fn test_undefined_anchor_is_reference_error() {
    let result = render("box a\nconstrain a.middle == 10");
    assert!(matches!(
        result,
        Err(RenderError::Layout(LayoutError::UndefinedReference { ref name, .. })) if name == "a.middle"
    ));
}

#[test]
fn test_pipeline_is_idempotent() {
    let source = r#"
box-style base { background-color: #DDEEFF }
box a { style: base }
box b { label: "bee" }
box c
connect a b { head2: filled_vee }
connect c a { head1: filled_vee; head2: filled_vee }
constrain b.left == a.right + 60
constrain c.top == a.bottom + 40
"#;
    assert_eq!(commands(source), commands(source));
    assert_eq!(render(source).unwrap(), render(source).unwrap());
}

#[test]
fn test_style_cycle_terminates() {
    let mut cyclic = StyleSheet::new();
    cyclic.insert(BoxStyle::new("a").inheriting("b"));
    cyclic.insert(BoxStyle::new("b").inheriting("a").with_background(Color::GREEN));

    let mut acyclic = StyleSheet::new();
    acyclic.insert(BoxStyle::new("a").inheriting("b"));
    acyclic.insert(BoxStyle::new("b").with_background(Color::GREEN));

    for id in ["a", "b"] {
        for property in [StyleProperty::BackgroundColor, StyleProperty::TextColor] {
            assert_eq!(cyclic.resolve(id, property), acyclic.resolve(id, property));
        }
    }
}

/// Connected pair `cc -> aaa` with `cc` offset by (gx, gy) from `aaa`'s
/// top-right corner; `aaa` is 30 x 20 and `cc` is 20 x 20
fn offset_pair(gx: i32, gy: i32) -> String {
    format!(
        "box aaa\nbox cc\nconnect cc aaa {{ head2: filled_vee }}\nconstrain cc.top == aaa.top + {}\nconstrain cc.left == aaa.right + {}",
        gy, gx
    )
}

/// Free space between the two boxes of `offset_pair`, along the axis that
/// separates them most
fn offset_pair_gap(gx: i32, gy: i32) -> i32 {
    let x_gap = if gx >= 0 { gx } else { -(gx + 50) };
    let y_gap = if gy >= 0 { gy - 20 } else { -gy - 20 };
    x_gap.max(y_gap)
}

fn assert_orthogonal(connector: &RoutedConnector, what: &str) {
    assert!(connector.points.len() >= 2, "{}: {:?}", what, connector.points);
    for segment in connector.points.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        assert!(a != b, "{}: zero-length segment in {:?}", what, connector.points);
        assert!(
            close(a.x, b.x) || close(a.y, b.y),
            "{}: diagonal segment {:?} -> {:?}",
            what,
            a,
            b
        );
    }
}

#[test]
fn test_misaligned_offsets_route_orthogonally() {
    let offsets_x = [-73, -41, -12, 3, 11, 23, 37, 62];
    let offsets_y = [-57, -33, -8, 7, 29, 48];
    for gx in offsets_x {
        for gy in offsets_y {
            let what = format!("gx={} gy={}", gx, gy);
            let (solved, connectors) = solve_and_route(&offset_pair(gx, gy));
            if offset_pair_gap(gx, gy) >= 20 {
                assert_eq!(connectors.len(), 1, "{}: connector not routed", what);
            }
            for connector in &connectors {
                assert_orthogonal(connector, &what);
                assert_eq!(connector.arrowheads.len(), 1, "{}: arrowhead", what);

                let head = connector.arrowheads[0];
                let last = connector.points[connector.points.len() - 1];
                assert_eq!(head.tip, last, "{}", what);
                let target = solved.frame("aaa").unwrap();
                assert!(
                    close(last.x, target.min_x())
                        || close(last.x, target.max_x())
                        || close(last.y, target.min_y())
                        || close(last.y, target.max_y()),
                    "{}: tip {:?} off the edges of {:?}",
                    what,
                    last,
                    target
                );
            }
        }
    }
}

#[test]
fn test_side_by_side_with_small_vertical_offset() {
    let (solved, connectors) = solve_and_route(&offset_pair(23, 7));
    assert_eq!(connectors.len(), 1);
    let connector = &connectors[0];
    assert_orthogonal(connector, "side by side");
    assert_eq!(connector.arrowheads.len(), 1);

    // cc sits to the right, so the route ends on aaa's right edge
    let source = solved.frame("cc").unwrap();
    let target = solved.frame("aaa").unwrap();
    let first = connector.points[0];
    let last = connector.points[connector.points.len() - 1];
    assert!(
        close(first.x, source.min_x()) || close(first.y, source.min_y()),
        "start {:?} cc {:?}",
        first,
        source
    );
    assert!(close(last.x, target.max_x()), "end {:?} aaa {:?}", last, target);
    assert!(last.y > target.min_y() && last.y < target.max_y());
}

#[test]
fn test_overlapping_and_touching_boxes_draw_no_empty_stroke() {
    let mut sources: Vec<String> = [(-20, 7), (-35, -5), (-50, 20), (0, 0)]
        .iter()
        .map(|&(gx, gy)| offset_pair(gx, gy))
        .collect();
    sources.push(
        "box aaa\nbox bbbb\nconnect aaa bbbb { head2: filled_vee }\nconstrain bbbb.left == aaa.left\nconstrain bbbb.top == aaa.bottom"
            .to_string(),
    );

    for source in &sources {
        let (_, connectors) = solve_and_route(source);
        for connector in &connectors {
            assert_orthogonal(connector, source);
        }

        // every stroked connector path has some length
        let commands = commands(source);
        let mut path: Vec<Point> = Vec::new();
        for command in &commands {
            match command {
                DrawCommand::Move(p) => path = vec![*p],
                DrawCommand::AddLine(p) => path.push(*p),
                DrawCommand::StrokePath(_) if !path.is_empty() => {
                    assert!(
                        path.windows(2).any(|w| w[0] != w[1]),
                        "zero-length stroke {:?} for\n{}",
                        path,
                        source
                    );
                    path.clear();
                }
                _ => {}
            }
        }
    }
}

#[test]
fn test_touching_boxes_leave_connector_out() {
    let source = "box aaa\nbox bbbb\nconnect aaa bbbb { head2: filled_vee }\nconstrain bbbb.left == aaa.left\nconstrain bbbb.top == aaa.bottom";
    let (_, connectors) = solve_and_route(source);
    assert!(connectors.is_empty(), "{:?}", connectors);

    let commands = commands(source);
    assert_eq!(box_rects(&commands).len(), 2);
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Move(_))));
}
