//! Test fixtures shared by the integration tests.

#![allow(dead_code)]

use anveshan::WorldPoint;
use anveshan::graph::{NodeType, RoadGraph, RoadGraphConfig, RoadMap};
use anveshan::world::PolygonMap;

/// Install a logger once; repeated calls are no-ops.
pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Empty 6 x 6 room.
pub fn square_room() -> PolygonMap {
    PolygonMap::rectangle(6.0, 6.0)
}

/// Two 4.5 x 6 rooms joined by a one-unit door at y = 2.5..3.5.
pub fn two_rooms() -> PolygonMap {
    PolygonMap::rectangle(10.0, 6.0)
        .with_rect_hole(4.5, 0.0, 5.5, 2.5)
        .with_rect_hole(4.5, 3.5, 5.5, 6.0)
}

/// Chain of `edges` edges of length `spacing` along the x axis.
pub fn chain_map(edges: usize, spacing: f32) -> RoadMap {
    let mut map = RoadMap::new();
    for i in 0..=edges {
        let node_type = if i == 0 || i == edges {
            NodeType::DeadEnd
        } else {
            NodeType::Regular
        };
        map.push_node(WorldPoint::new(i as f32 * spacing, 0.0), node_type);
    }
    for i in 0..edges {
        map.push_edge(i, i + 1);
    }
    map
}

/// Square cycle with corners (0,0), (side,0), (side,side), (0,side).
pub fn square_cycle_map(side: f32) -> RoadMap {
    let mut map = RoadMap::new();
    let a = map.push_node(WorldPoint::new(0.0, 0.0), NodeType::Regular);
    let b = map.push_node(WorldPoint::new(side, 0.0), NodeType::Regular);
    let c = map.push_node(WorldPoint::new(side, side), NodeType::Regular);
    let d = map.push_node(WorldPoint::new(0.0, side), NodeType::Regular);
    map.push_edge(a, b);
    map.push_edge(b, c);
    map.push_edge(c, d);
    map.push_edge(d, a);
    map
}

/// Jittered 4 x 4 lattice with a few diagonals and a dangling corner node.
pub fn lattice_map() -> RoadMap {
    let mut map = RoadMap::new();
    for row in 0..4 {
        for col in 0..4 {
            let jitter = ((row * 7 + col * 3) % 5) as f32 * 0.15;
            map.push_node(
                WorldPoint::new(col as f32 * 2.0 + jitter, row as f32 * 2.0 - jitter),
                NodeType::Regular,
            );
        }
    }
    let idx = |row: usize, col: usize| row * 4 + col;
    for row in 0..4 {
        for col in 0..4 {
            if col + 1 < 4 {
                map.push_edge(idx(row, col), idx(row, col + 1));
            }
            if row + 1 < 4 {
                map.push_edge(idx(row, col), idx(row + 1, col));
            }
        }
    }
    map.push_edge(idx(0, 0), idx(1, 1));
    map.push_edge(idx(1, 2), idx(2, 1));
    map.push_edge(idx(2, 2), idx(3, 3));
    let corner = map.push_node(WorldPoint::new(7.0, -1.0), NodeType::Corner);
    map.push_edge(idx(0, 3), corner);
    map
}

/// Road graph over `map` with the given divided-layer edge cap.
pub fn graph_from(map: &RoadMap, max_segment_length: f32) -> RoadGraph {
    RoadGraph::from_road_map(
        map,
        RoadGraphConfig::default().with_max_segment_length(max_segment_length),
    )
}

/// Check every node of `map` is reachable from node 0.
pub fn is_connected(map: &RoadMap) -> bool {
    if map.is_empty() {
        return true;
    }
    let adjacency = map.adjacency();
    let mut seen = vec![false; map.node_count()];
    let mut stack = vec![0];
    seen[0] = true;
    while let Some(i) = stack.pop() {
        for &j in &adjacency[i] {
            if !seen[j] {
                seen[j] = true;
                stack.push(j);
            }
        }
    }
    seen.into_iter().all(|s| s)
}
