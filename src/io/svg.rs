//! SVG export of graph snapshots for debugging.

use std::path::Path;

use crate::core::{Bounds, WorldPoint};
use crate::graph::GraphSnapshot;

/// Render a snapshot over the wall polygons as an SVG document.
///
/// Edges are shaded from light gray (probability 0) to red (probability 1);
/// unsearchable edges are drawn dashed. Nodes are coloured by type.
pub fn render_snapshot(snapshot: &GraphSnapshot, walls: &[Vec<WorldPoint>]) -> String {
    let mut bounds = snapshot.bounds();
    for point in walls.iter().flatten() {
        bounds.expand_to_include(*point);
    }
    if bounds.is_empty() {
        bounds = Bounds::new(WorldPoint::ZERO, WorldPoint::new(1.0, 1.0));
    }

    let margin = 0.5;
    let view_min_x = bounds.min.x - margin;
    let view_min_y = bounds.min.y - margin;
    let view_width = bounds.width() + 2.0 * margin;
    let view_height = bounds.height() + 2.0 * margin;

    let mut svg = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="800" height="600">
  <rect x="{}" y="{}" width="{}" height="{}" fill="white"/>
  <g transform="scale(1, -1) translate(0, -{})">
"#,
        view_min_x,
        -view_min_y - view_height,
        view_width,
        view_height,
        view_min_x,
        -view_min_y - view_height,
        view_width,
        view_height,
        2.0 * view_min_y + view_height
    );

    // Walls (black)
    svg.push_str("    <!-- Walls -->\n");
    for ring in walls {
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            svg.push_str(&format!(
                r#"    <line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="black" stroke-width="0.05"/>"#,
                a.x, a.y, b.x, b.y
            ));
            svg.push('\n');
        }
    }

    // Edges shaded by segment probability
    svg.push_str("    <!-- Graph Edges -->\n");
    for edge in &snapshot.edges {
        let (Some(p1), Some(p2)) = (snapshot.position(edge.a), snapshot.position(edge.b)) else {
            continue;
        };
        let dash = if edge.searchable {
            ""
        } else {
            r#" stroke-dasharray="0.1,0.1""#
        };
        svg.push_str(&format!(
            r#"    <line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}" stroke-width="0.04"{}/>"#,
            p1.x,
            p1.y,
            p2.x,
            p2.y,
            probability_color(edge.probability),
            dash
        ));
        svg.push('\n');
    }

    // Nodes
    svg.push_str("    <!-- Graph Nodes -->\n");
    for node in &snapshot.nodes {
        svg.push_str(&format!(
            r#"    <circle cx="{:.3}" cy="{:.3}" r="0.08" fill="{}"/>"#,
            node.position.x,
            node.position.y,
            node.node_type.svg_color()
        ));
        svg.push('\n');
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Render a snapshot and write it to `path`.
pub fn save_svg(
    snapshot: &GraphSnapshot,
    walls: &[Vec<WorldPoint>],
    path: &Path,
) -> std::io::Result<()> {
    std::fs::write(path, render_snapshot(snapshot, walls))
}

/// Light gray at 0, pure red at 1.
fn probability_color(probability: f32) -> String {
    let p = probability.clamp(0.0, 1.0);
    let red = (204.0 + 51.0 * p).round() as u8;
    let other = (204.0 * (1.0 - p)).round() as u8;
    format!("#{:02x}{:02x}{:02x}", red, other, other)
}
