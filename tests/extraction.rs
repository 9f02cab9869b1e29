//! Road map extraction and regeneration on real polygon worlds.

mod common;

use anveshan::analysis::{DEFAULT_MAX_CYCLES, GraphProperties};
use anveshan::graph::NodeType;
use anveshan::io::{RoadMapStore, parse_road_map};
use anveshan::world::PolygonMap;
use anveshan::{SkeletonConfig, SkeletonExtractor};

#[test]
fn test_two_rooms_extract_connected_graph() {
    common::init_logging();
    let world = common::two_rooms();
    let map = SkeletonExtractor::default().extract(&world);

    assert!(map.node_count() >= 2);
    assert!(common::is_connected(&map));
    assert!(map.nodes.iter().all(|n| n.node_type != NodeType::Temporary));
    // Both rooms are covered.
    let mut walkable = map.nodes.iter().filter(|n| n.node_type != NodeType::Corner);
    assert!(walkable.clone().any(|n| n.position.x < 4.5));
    assert!(walkable.any(|n| n.position.x > 5.5));

    let graph = common::graph_from(&map, 1.0);
    let props = GraphProperties::analyze(graph.original(), DEFAULT_MAX_CYCLES);
    assert!(props.diameter > 1.0);
}

#[test]
fn test_bundled_two_rooms_map_matches_fixture() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("maps/two_rooms.yaml");
    let world = PolygonMap::load(&path).unwrap();
    let extractor = SkeletonExtractor::default();
    assert_eq!(extractor.extract(&world), extractor.extract(&common::two_rooms()));
}

#[test]
fn test_load_or_extract_replaces_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_rooms.roadmap");
    std::fs::write(&path, "0,0,regular\n1,1,wall\n-,-\n1,2\n").unwrap();
    assert!(parse_road_map(&std::fs::read_to_string(&path).unwrap()).is_err());

    let store = RoadMapStore::new(&path);
    let world = common::two_rooms();
    let map = store.load_or_extract(&world, &SkeletonConfig::default());
    assert!(map.node_count() >= 2);

    // The regenerated map replaced the broken file.
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.node_count(), map.node_count());
    assert_eq!(reloaded.edges, map.edges);
}

#[test]
fn test_load_or_extract_keeps_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.roadmap");
    std::fs::write(&path, "1,1,dead_end\n5,1,dead_end\n-,-\n1,2\n").unwrap();

    let store = RoadMapStore::new(&path);
    let map = store.load_or_extract(&common::two_rooms(), &SkeletonConfig::default());
    assert_eq!(map.node_count(), 2);
    assert_eq!(map.edges, vec![(0, 1)]);
}
