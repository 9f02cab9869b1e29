//! Belief update behaviour of the search segment model.

mod common;

use approx::assert_relative_eq;

use anveshan::search::{
    SearchConfig, SearchModel, UpdatePolicy, max_probability, propagation_decay,
};
use anveshan::world::{
    Blind, Clock, ConeFieldOfView, FieldOfView, ManualClock, OpenSight, ViewCone,
};
use anveshan::{AgentId, RoadGraph, WorldPoint};

fn run_ticks(
    model: &mut SearchModel,
    graph: &mut RoadGraph,
    fov: &impl FieldOfView,
    clock: &ManualClock,
    ticks: usize,
) {
    for _ in 0..ticks {
        clock.advance(0.1);
        model.tick(graph, fov, clock, 0.1);
    }
}

#[test]
fn test_probabilities_stay_in_unit_interval() {
    common::init_logging();
    for policy in [UpdatePolicy::Propagation, UpdatePolicy::Diffusion] {
        let mut graph = common::graph_from(&common::lattice_map(), 1.0);
        let config = SearchConfig::default()
            .with_policy(policy)
            .with_expansion_speed(3.0)
            .with_increment_rate(0.5);
        let mut model = SearchModel::new(&graph, config);
        let clock = ManualClock::new();
        model.seed_at_point(&mut graph, WorldPoint::new(0.5, 0.0), 1.0, &OpenSight);

        run_ticks(&mut model, &mut graph, &Blind, &clock, 200);

        for edge in graph.divided().edges() {
            let p = edge.segment.probability();
            assert!((0.0..=1.0).contains(&p), "{} has p={}", edge.key, p);
        }
        assert!(max_probability(graph.divided()) > 0.0);
    }
}

#[test]
fn test_observed_segments_reset() {
    let mut graph = common::graph_from(&common::chain_map(4, 2.0), 1.0);
    let config = SearchConfig::default().with_policy(UpdatePolicy::Diffusion);
    let mut model = SearchModel::new(&graph, config);
    for key in graph.divided().edge_keys() {
        model.seed_edge(&mut graph, key, 1.0);
    }

    let searcher = AgentId(1);
    model.add_searcher(searcher);
    let mut fov = ConeFieldOfView::new(OpenSight);
    fov.set_cone(
        searcher,
        ViewCone::new(WorldPoint::new(0.0, 0.0), 0.0, 2.5, std::f32::consts::FRAC_PI_4),
    );
    let clock = ManualClock::new();
    run_ticks(&mut model, &mut graph, &fov, &clock, 1);

    for edge in graph.divided().edges() {
        let (a, b) = edge.segment.endpoints();
        if a.x.max(b.x) <= 2.0 {
            assert_eq!(edge.segment.probability(), 0.0);
            assert!(edge.segment.is_observed());
            assert_relative_eq!(edge.segment.timestamp(), clock.elapsed());
        } else if a.x.min(b.x) >= 3.0 {
            assert!(edge.segment.probability() > 0.0);
            assert!(!edge.segment.is_observed());
        }
    }

    // Once the searcher looks away the cleared segments may fill again.
    fov.remove(searcher);
    run_ticks(&mut model, &mut graph, &fov, &clock, 20);
    assert!(graph.divided().edges().all(|e| !e.segment.is_observed()));
    assert!(
        graph
            .divided()
            .edges()
            .filter(|e| e.segment.endpoints().0.x < 2.0)
            .any(|e| e.segment.probability() > 0.0)
    );
}

#[test]
fn test_diffusion_converges_on_cycle() {
    let mut graph = common::graph_from(&common::square_cycle_map(2.0), 2.0);
    assert_eq!(graph.divided().edge_count(), 4);

    let config = SearchConfig::default()
        .with_policy(UpdatePolicy::Diffusion)
        .with_diffusion_factor(0.05);
    let mut model = SearchModel::new(&graph, config);
    let first = graph.divided().edge_keys()[0];
    assert!(model.seed_edge(&mut graph, first, 1.0));

    let clock = ManualClock::new();
    run_ticks(&mut model, &mut graph, &Blind, &clock, 1000);

    let values: Vec<f32> = graph
        .divided()
        .edges()
        .map(|e| e.segment.probability())
        .collect();
    let max = values.iter().copied().fold(f32::MIN, f32::max);
    let min = values.iter().copied().fold(f32::MAX, f32::min);
    assert!(max - min < 0.01, "spread {}", max - min);
    assert_relative_eq!(max, 1.0, epsilon = 1e-4);
}

#[test]
fn test_propagation_decay_from_geometry() {
    // Longest shortest path 10, longest edge 2: (10 - 3) / 10.
    let graph = common::graph_from(&common::chain_map(5, 2.0), 2.0);
    assert_relative_eq!(propagation_decay(graph.divided()), 0.7, epsilon = 1e-5);
}

#[test]
fn test_propagation_decays_along_chain() {
    let mut graph = common::graph_from(&common::chain_map(5, 2.0), 2.0);
    let config = SearchConfig::default()
        .with_expansion_speed(10.0)
        .with_increment_rate(0.0);
    let mut model = SearchModel::new(&graph, config);
    let first = graph.divided().edge_keys()[0];
    model.seed_edge(&mut graph, first, 1.0);

    let clock = ManualClock::new();
    run_ticks(&mut model, &mut graph, &Blind, &clock, 30);

    // Every hop multiplies by 0.7.
    let mut expected = 1.0;
    let mut keys = graph.divided().edge_keys();
    keys.sort_by_key(|k| k.low());
    for key in keys {
        let p = graph.divided().edge_by_key(key).unwrap().segment.probability();
        assert_relative_eq!(p, expected, epsilon = 1e-4);
        expected *= 0.7;
    }
}
