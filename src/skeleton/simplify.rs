//! Working graph for skeleton simplification.
//!
//! Passes run in this order:
//!
//! | Pass | Effect |
//! |------|--------|
//! | [`SkeletonGraph::slim`] | Two-cell runs of one maxima block become one node |
//! | [`SkeletonGraph::prune_collinear`] | Degree-2 nodes on the line of their neighbors are removed |
//! | [`SkeletonGraph::coarsen`] | Close connected same-type nodes are merged |
//! | [`SkeletonGraph::remove_transitive_edges`] | The longest edge of every triangle is dropped |
//! | [`SkeletonGraph::reconnect_islands`] | Disconnected components are joined through walkable cells |

use std::collections::{BTreeSet, HashMap, VecDeque};

use log::{debug, warn};

use super::raster::WalkableRaster;
use super::ridge::{RidgeKind, RidgeMap};
use crate::core::geometry::perpendicular_distance;
use crate::core::{GridCoord, WorldPoint};
use crate::graph::{NodeType, RoadMap};
use crate::pathfinding::shortcut_path;
use crate::world::LineOfSight;

#[derive(Clone, Debug)]
pub(crate) struct SkeletonNode {
    pub position: WorldPoint,
    pub node_type: NodeType,
    pub alive: bool,
}

/// Mutable node/adjacency graph with tombstoned removal.
#[derive(Clone, Debug, Default)]
pub(crate) struct SkeletonGraph {
    pub nodes: Vec<SkeletonNode>,
    pub adjacency: Vec<BTreeSet<usize>>,
}

impl SkeletonGraph {
    /// One node per ridge cell, two-cell runs within a maxima block merged
    /// into one node; nodes joined when any member cells are 8-adjacent.
    pub fn from_ridge(raster: &WalkableRaster, ridge: &RidgeMap) -> Self {
        let cells: Vec<(GridCoord, RidgeKind)> = ridge.cells().collect();
        let index: HashMap<GridCoord, usize> =
            cells.iter().enumerate().map(|(i, &(c, _))| (c, i)).collect();

        let mut owner: Vec<usize> = (0..cells.len()).collect();
        Self::slim(ridge, &cells, &index, &mut owner);

        // Compact owners into graph nodes.
        let mut graph = Self::default();
        let mut node_of: HashMap<usize, usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        for (i, &(_, kind)) in cells.iter().enumerate() {
            let root = owner[i];
            let node = *node_of.entry(root).or_insert_with(|| {
                members.push(Vec::new());
                graph.push(WorldPoint::ZERO, NodeType::Regular)
            });
            members[node].push(i);
            if kind == RidgeKind::Maximum {
                graph.nodes[node].node_type = NodeType::Hump;
            }
        }
        for (node, cell_ids) in members.iter().enumerate() {
            let sum = cell_ids
                .iter()
                .map(|&i| raster.grid_to_world(cells[i].0))
                .fold(WorldPoint::ZERO, |acc, p| acc + p);
            graph.nodes[node].position = sum * (1.0 / cell_ids.len() as f32);
        }

        for (i, &(coord, _)) in cells.iter().enumerate() {
            for n in coord.neighbors_8() {
                if let Some(&j) = index.get(&n) {
                    let (a, b) = (node_of[&owner[i]], node_of[&owner[j]]);
                    graph.connect(a, b);
                }
            }
        }
        graph
    }

    /// Merge runs of exactly two ridge cells (horizontal, then vertical)
    /// whose cells belong to the same maxima block.
    fn slim(
        ridge: &RidgeMap,
        cells: &[(GridCoord, RidgeKind)],
        index: &HashMap<GridCoord, usize>,
        owner: &mut [usize],
    ) {
        let mut merged = vec![false; cells.len()];
        let steps = [GridCoord::new(1, 0), GridCoord::new(0, 1)];
        for step in steps {
            for (i, &(coord, _)) in cells.iter().enumerate() {
                let next = coord + step;
                let Some(&j) = index.get(&next) else {
                    continue;
                };
                let run_of_two = !ridge.is_ridge(coord - step) && !ridge.is_ridge(next + step);
                let same_block = ridge.block(coord).is_some() && ridge.block(coord) == ridge.block(next);
                if run_of_two && same_block && !merged[i] && !merged[j] {
                    owner[j] = owner[i];
                    merged[i] = true;
                    merged[j] = true;
                }
            }
        }
    }

    pub fn push(&mut self, position: WorldPoint, node_type: NodeType) -> usize {
        self.nodes.push(SkeletonNode {
            position,
            node_type,
            alive: true,
        });
        self.adjacency.push(BTreeSet::new());
        self.nodes.len() - 1
    }

    pub fn connect(&mut self, a: usize, b: usize) {
        if a != b {
            self.adjacency[a].insert(b);
            self.adjacency[b].insert(a);
        }
    }

    pub fn disconnect(&mut self, a: usize, b: usize) {
        self.adjacency[a].remove(&b);
        self.adjacency[b].remove(&a);
    }

    fn remove(&mut self, node: usize) {
        let neighbors: Vec<usize> = self.adjacency[node].iter().copied().collect();
        for n in neighbors {
            self.disconnect(node, n);
        }
        self.nodes[node].alive = false;
    }

    /// Fold `from` into `into`, placing `into` at their midpoint.
    fn merge(&mut self, into: usize, from: usize) {
        let neighbors: Vec<usize> = self.adjacency[from].iter().copied().collect();
        for n in neighbors {
            self.disconnect(from, n);
            self.connect(into, n);
        }
        let midpoint = self.nodes[into].position.lerp(&self.nodes[from].position, 0.5);
        self.nodes[into].position = midpoint;
        self.nodes[from].alive = false;
    }

    pub fn alive(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(|&i| self.nodes[i].alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.alive()
            .flat_map(|a| self.adjacency[a].iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect()
    }

    fn distance(&self, a: usize, b: usize) -> f32 {
        self.nodes[a].position.distance(&self.nodes[b].position)
    }

    /// Remove degree-2 nodes lying within `tolerance` of the line joining
    /// their neighbors, until none remain.
    pub fn prune_collinear(&mut self, tolerance: f32) -> usize {
        let mut removed = 0;
        loop {
            let mut changed = false;
            for node in 0..self.nodes.len() {
                if !self.nodes[node].alive || self.adjacency[node].len() != 2 {
                    continue;
                }
                let mut it = self.adjacency[node].iter().copied();
                let (Some(a), Some(b)) = (it.next(), it.next()) else {
                    continue;
                };
                if self.adjacency[a].contains(&b) {
                    continue;
                }
                let deviation = perpendicular_distance(
                    self.nodes[node].position,
                    self.nodes[a].position,
                    self.nodes[b].position,
                );
                if deviation <= tolerance {
                    self.remove(node);
                    self.connect(a, b);
                    removed += 1;
                    changed = true;
                }
            }
            if !changed {
                return removed;
            }
        }
    }

    /// Merge connected same-type node pairs closer than `distance`.
    pub fn coarsen(&mut self, distance: f32) -> usize {
        let mut merged = 0;
        loop {
            let pair = self.edges().into_iter().find(|&(a, b)| {
                self.nodes[a].node_type == self.nodes[b].node_type && self.distance(a, b) < distance
            });
            match pair {
                Some((a, b)) => {
                    self.merge(a, b);
                    merged += 1;
                }
                None => return merged,
            }
        }
    }

    /// Drop the longest edge of every triangle.
    pub fn remove_transitive_edges(&mut self) -> usize {
        let mut removed = 0;
        for (a, b) in self.edges() {
            if !self.adjacency[a].contains(&b) {
                continue;
            }
            let ab = self.distance(a, b);
            let closes_triangle = self.adjacency[a]
                .iter()
                .filter(|&&c| c != b && self.adjacency[b].contains(&c))
                .any(|&c| ab >= self.distance(a, c) && ab >= self.distance(b, c));
            if closes_triangle {
                self.disconnect(a, b);
                removed += 1;
            }
        }
        removed
    }

    /// Connected components of alive nodes, largest first.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = Vec::new();
        for start in self.alive() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                for &n in &self.adjacency[node] {
                    if !seen[n] {
                        seen[n] = true;
                        component.push(n);
                        queue.push_back(n);
                    }
                }
            }
            components.push(component);
        }
        components.sort_by_key(|c| std::cmp::Reverse(c.len()));
        components
    }

    /// Join every component to the largest one.
    ///
    /// A breadth-first search over walkable cells from the main component
    /// finds the nearest other component; the cell path is shortened by
    /// line of sight and added as a chain of regular nodes.
    pub fn reconnect_islands<L: LineOfSight + ?Sized>(
        &mut self,
        raster: &WalkableRaster,
        sight: &L,
    ) -> usize {
        let mut bridges = 0;
        loop {
            let components = self.components();
            if components.len() <= 1 {
                return bridges;
            }
            let mut component_of = vec![usize::MAX; self.nodes.len()];
            for (c, nodes) in components.iter().enumerate() {
                for &n in nodes {
                    component_of[n] = c;
                }
            }
            let Some(bridge) = self.find_bridge(raster, &components[0], &component_of) else {
                warn!(
                    "[Skeleton] {} islands cannot be reached through walkable cells",
                    components.len() - 1
                );
                return bridges;
            };
            self.add_bridge(bridge, sight);
            bridges += 1;
        }
    }

    fn find_bridge(
        &self,
        raster: &WalkableRaster,
        main: &[usize],
        component_of: &[usize],
    ) -> Option<(usize, Vec<WorldPoint>, usize)> {
        let mut cell_owner: HashMap<GridCoord, usize> = HashMap::new();
        for node in self.alive() {
            cell_owner.insert(raster.world_to_grid(self.nodes[node].position), node);
        }

        let mut parent: HashMap<GridCoord, GridCoord> = HashMap::new();
        let mut source: HashMap<GridCoord, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        for &node in main {
            let cell = raster.world_to_grid(self.nodes[node].position);
            if source.insert(cell, node).is_none() {
                queue.push_back(cell);
            }
        }

        while let Some(cell) = queue.pop_front() {
            for n in cell.neighbors_8() {
                if !raster.is_walkable(n) || source.contains_key(&n) {
                    continue;
                }
                source.insert(n, source[&cell]);
                parent.insert(n, cell);
                if let Some(&target) = cell_owner.get(&n)
                    && component_of[target] != 0
                {
                    let mut cells = vec![n];
                    let mut current = n;
                    while let Some(&p) = parent.get(&current) {
                        cells.push(p);
                        current = p;
                    }
                    cells.reverse();
                    let points = cells.iter().map(|&c| raster.grid_to_world(c)).collect();
                    return Some((source[&cell], points, target));
                }
                queue.push_back(n);
            }
        }
        None
    }

    fn add_bridge<L: LineOfSight + ?Sized>(
        &mut self,
        (from, cells, to): (usize, Vec<WorldPoint>, usize),
        sight: &L,
    ) {
        let mut path = Vec::with_capacity(cells.len() + 2);
        path.push(self.nodes[from].position);
        path.extend(cells);
        path.push(self.nodes[to].position);
        let path = shortcut_path(&path, sight);

        let mut previous = from;
        for &point in &path[1..path.len().saturating_sub(1)] {
            let node = self.push(point, NodeType::Regular);
            self.connect(previous, node);
            previous = node;
        }
        self.connect(previous, to);
        debug!(
            "[Skeleton] Bridged island at ({:.1},{:.1}) with {} waypoints",
            self.nodes[to].position.x,
            self.nodes[to].position.y,
            path.len().saturating_sub(2)
        );
    }

    /// Degree-1 (and isolated) nodes become dead ends.
    pub fn tag_dead_ends(&mut self) {
        for node in 0..self.nodes.len() {
            if self.nodes[node].alive
                && self.nodes[node].node_type != NodeType::Corner
                && self.adjacency[node].len() <= 1
            {
                self.nodes[node].node_type = NodeType::DeadEnd;
            }
        }
    }

    /// Compact alive nodes into a road map table.
    pub fn to_road_map(&self) -> RoadMap {
        let mut map = RoadMap::new();
        let mut index = vec![usize::MAX; self.nodes.len()];
        for node in self.alive() {
            index[node] = map.push_node(self.nodes[node].position, self.nodes[node].node_type);
        }
        for (a, b) in self.edges() {
            map.push_edge(index[a], index[b]);
        }
        map
    }
}
