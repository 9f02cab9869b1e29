//! Single-source shortest distances over a weighted adjacency list.
//!
//! Used for the search model's propagation scale (longest shortest path)
//! and the graph properties analyser (eccentricities).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Priority queue entry.
#[derive(Clone, Copy, Debug)]
struct State {
    cost: f32,
    node: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other.cost.total_cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Distances from `source` to every node (`f32::INFINITY` when unreachable).
///
/// `edges[i]` lists `(neighbor, length)` pairs.
pub fn dijkstra_distances(edges: &[Vec<(usize, f32)>], source: usize) -> Vec<f32> {
    let n = edges.len();
    let mut dist = vec![f32::INFINITY; n];
    if source >= n {
        return dist;
    }
    dist[source] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State {
        cost: 0.0,
        node: source,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        for &(neighbor, length) in &edges[node] {
            let next = cost + length;
            if next < dist[neighbor] {
                dist[neighbor] = next;
                heap.push(State {
                    cost: next,
                    node: neighbor,
                });
            }
        }
    }

    dist
}

/// Largest finite shortest-path distance between any two nodes.
pub fn longest_shortest_path(edges: &[Vec<(usize, f32)>]) -> f32 {
    (0..edges.len())
        .filter(|&i| !edges[i].is_empty())
        .flat_map(|i| dijkstra_distances(edges, i))
        .filter(|d| d.is_finite())
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_simple_graph() -> Vec<Vec<(usize, f32)>> {
        // 0 --1.0-- 1 --1.0-- 2
        // |         |
        // 2.0       1.5
        // |         |
        // 3 --1.0-- 4
        vec![
            vec![(1, 1.0), (3, 2.0)],
            vec![(0, 1.0), (2, 1.0), (4, 1.5)],
            vec![(1, 1.0)],
            vec![(0, 2.0), (4, 1.0)],
            vec![(1, 1.5), (3, 1.0)],
        ]
    }

    #[test]
    fn test_distances() {
        let dist = dijkstra_distances(&make_simple_graph(), 0);
        assert_eq!(dist, vec![0.0, 1.0, 2.0, 2.0, 2.5]);
    }

    #[test]
    fn test_unreachable_and_invalid_source() {
        let edges = vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]];
        let dist = dijkstra_distances(&edges, 0);
        assert!(dist[2].is_infinite());
        assert!(dijkstra_distances(&edges, 7).iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_longest_shortest_path() {
        // 2 -> 3: 2-1-4-3 = 3.5 vs 2-1-0-3 = 4.0
        assert_eq!(longest_shortest_path(&make_simple_graph()), 3.5);
        assert_eq!(longest_shortest_path(&[]), 0.0);
    }
}
