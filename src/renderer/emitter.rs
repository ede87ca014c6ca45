//! Turns a solved, routed diagram into draw commands
//!
//! Output order is fixed: the canvas background, then every box in id
//! order (outline, then label), then every routed connector in declaration
//! order (line, then its arrowheads). Two runs over the same diagram give
//! the same command list.

use log::debug;

use crate::geometry::{Color, Point, Rectangle};
use crate::layout::{Arrowhead, DiagramBox, RoutedConnector, SolvedGraph, StyleSheet};

use super::command::{DrawCommand, Graphics, PathStyle, StyledText, TextAlignment};
use super::config::TextConfig;

const BOX_LINE_WIDTH: f64 = 1.0;

/// Label of a box with its resolved text colour
pub fn label_text(b: &DiagramBox, styles: &StyleSheet, text: &TextConfig) -> StyledText {
    let style = styles.resolved(b.style.as_deref());
    StyledText::new(b.label.as_str(), text.font_size)
        .with_color(style.text_color.unwrap_or(Color::BLACK))
        .with_alignment(TextAlignment::Center)
}

/// Emit the full command list for a diagram
///
/// `connectors` must come from routing the same solved graph; a connector
/// that could not be routed is simply absent from the list.
pub fn emit<G: Graphics>(
    solved: &SolvedGraph,
    connectors: &[RoutedConnector],
    graphics: &G,
    text: &TextConfig,
    background: Option<Color>,
) -> Vec<DrawCommand> {
    let mut commands = Vec::new();

    if let Some(color) = background {
        commands.push(DrawCommand::SetFill(color));
        commands.push(DrawCommand::Fill(vec![solved.graph_frame()]));
    }

    for (b, frame) in solved.box_frames() {
        emit_box(&mut commands, b, frame, &solved.graph.styles, graphics, text);
    }

    for connector in connectors {
        emit_connector(&mut commands, connector);
    }

    debug!(
        "emitted {} draw commands for {} boxes and {} connectors",
        commands.len(),
        solved.graph.boxes.len(),
        connectors.len()
    );
    commands
}

fn emit_box<G: Graphics>(
    commands: &mut Vec<DrawCommand>,
    b: &DiagramBox,
    frame: Rectangle,
    styles: &StyleSheet,
    graphics: &G,
    text: &TextConfig,
) {
    commands.push(DrawCommand::AddRect(frame));
    match styles.resolved(b.style.as_deref()).background_color {
        Some(fill) => commands.push(DrawCommand::FillAndStrokePath(PathStyle {
            line_width: BOX_LINE_WIDTH,
            stroke_color: Color::BLACK,
            fill_color: fill,
        })),
        None => commands.push(DrawCommand::StrokePath(PathStyle::stroke(
            BOX_LINE_WIDTH,
            Color::BLACK,
        ))),
    }

    let label = label_text(b, styles, text);
    let size = graphics.measure(&label);
    let center = frame.center();
    commands.push(DrawCommand::DrawText {
        text: label,
        point: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
    });
}

fn emit_connector(commands: &mut Vec<DrawCommand>, connector: &RoutedConnector) {
    let Some((first, rest)) = connector.points.split_first() else {
        return;
    };
    commands.push(DrawCommand::Move(*first));
    commands.extend(rest.iter().map(|p| DrawCommand::AddLine(*p)));
    commands.push(DrawCommand::StrokePath(PathStyle::stroke(
        connector.line_width,
        Color::BLACK,
    )));

    for head in &connector.arrowheads {
        emit_arrowhead(commands, head);
    }
}

fn emit_arrowhead(commands: &mut Vec<DrawCommand>, head: &Arrowhead) {
    commands.extend([
        DrawCommand::Move(head.tip),
        DrawCommand::AddLine(head.left),
        DrawCommand::AddLine(head.right),
        DrawCommand::AddLine(head.tip),
        DrawCommand::FillPath(PathStyle::fill(Color::BLACK)),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{build, route_all, solve_graph, LayoutConfig};
    use crate::parser::parse;
    use crate::renderer::metrics::FixedMetrics;
    use crate::renderer::recorder::RecordingGraphics;

    fn emit_source(source: &str, background: Option<Color>) -> Vec<DrawCommand> {
        let text = TextConfig::default();
        let graphics = RecordingGraphics::new(FixedMetrics::new(&text));
        let diagram = build(&parse(source).expect("Should parse")).expect("Should build");
        let config = LayoutConfig::default();
        let solved = solve_graph(diagram, &config, |b| {
            FixedMetrics::new(&text).measure(&StyledText::new(b.label.as_str(), text.font_size))
        })
        .expect("Should solve");
        let connectors = route_all(&solved, &config);
        emit(&solved, &connectors, &graphics, &text, background)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_single_box_commands() {
        let commands = emit_source("box abc", Some(Color::WHITE));
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], DrawCommand::SetFill(Color::WHITE));
        match &commands[1] {
            DrawCommand::Fill(rects) => {
                assert_eq!(rects.len(), 1);
                assert!(close(rects[0].size.width, 130.0));
                assert!(close(rects[0].size.height, 120.0));
            }
            other => panic!("expected fill, got {:?}", other),
        }
        assert!(matches!(commands[2], DrawCommand::AddRect(_)));
        assert_eq!(
            commands[3],
            DrawCommand::StrokePath(PathStyle::stroke(1.0, Color::BLACK))
        );
        match &commands[4] {
            DrawCommand::DrawText { text, point } => {
                assert_eq!(text.text, "abc");
                assert_eq!(text.color, Color::BLACK);
                assert!(close(point.x, 50.0));
                assert!(close(point.y, 50.0));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_no_background() {
        let commands = emit_source("box a", None);
        assert!(matches!(commands[0], DrawCommand::AddRect(_)));
    }

    #[test]
    fn test_styled_box_is_filled() {
        let commands = emit_source(
            "box-style s { background-color: yellow; text-color: red }\nbox a { style: s }",
            None,
        );
        assert_eq!(
            commands[1],
            DrawCommand::FillAndStrokePath(PathStyle {
                line_width: 1.0,
                stroke_color: Color::BLACK,
                fill_color: Color::YELLOW,
            })
        );
        match &commands[2] {
            DrawCommand::DrawText { text, .. } => assert_eq!(text.color, Color::RED),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_boxes_in_id_order() {
        let commands = emit_source("box zed\nbox alpha\nconstrain zed.left == alpha.right + 20", None);
        let labels: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawText { text, .. } => Some(text.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["alpha", "zed"]);
    }

    #[test]
    fn test_connector_with_arrowhead() {
        let commands = emit_source(
            "box a\nbox b\nconnect a b { head2: filled_vee; line-width: 2 }\nconstrain b.left == a.right + 40",
            None,
        );
        let strokes: Vec<&PathStyle> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokePath(style) => Some(style),
                _ => None,
            })
            .collect();
        // two box outlines, then the connector
        assert_eq!(strokes.len(), 3);
        assert_eq!(strokes[2].line_width, 2.0);

        let fills = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath(_)))
            .count();
        assert_eq!(fills, 1);
        assert!(matches!(commands.last(), Some(DrawCommand::FillPath(_))));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let source = "box a\nbox b\nbox c\nconnect a c {}\nconnect c b { head1: filled_vee }\nconstrain b.top == a.bottom + 30\nconstrain c.left == a.right + 30";
        assert_eq!(emit_source(source, Some(Color::WHITE)), emit_source(source, Some(Color::WHITE)));
    }
}
