//! Ridge detection on the distance field.
//!
//! Ridge cells are local maxima of the distance field plus the cells that
//! join separate maxima:
//!
//! ```text
//!   maxima ████        ████ maxima
//!              ↖ climb ↗
//!               saddle        (two rising arcs around one cell or 2x2 block)
//! ```

use serde::{Deserialize, Serialize};

use super::raster::{DistanceField, WalkableRaster};
use crate::core::GridCoord;

/// Why a cell is on the ridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RidgeKind {
    /// No 8-neighbor has a larger distance.
    Maximum,
    /// Two or more basins rise around this cell or its 2x2 block.
    Saddle,
    /// On a hill-climb from a saddle to a maximum.
    Climb,
}

/// Ridge cells of a raster.
#[derive(Clone, Debug)]
pub struct RidgeMap {
    kinds: Vec<Option<RidgeKind>>,
    /// Block id grouping co-located maxima of equal distance.
    blocks: Vec<Option<u32>>,
    width: usize,
}

impl RidgeMap {
    /// Detect maxima, group them into blocks, find saddles and climb from
    /// each saddle to the maxima it separates.
    pub fn detect(raster: &WalkableRaster, field: &DistanceField) -> Self {
        let count = raster.cell_count();
        let mut map = Self {
            kinds: vec![None; count],
            blocks: vec![None; count],
            width: raster.width(),
        };

        for i in 0..count {
            let coord = raster.index_to_coord(i);
            let value = field.get(coord);
            if value > 0 && coord.neighbors_8().iter().all(|&n| field.get(n) <= value) {
                map.kinds[i] = Some(RidgeKind::Maximum);
            }
        }
        map.group_blocks(raster, field);

        let mut saddles = Vec::new();
        for i in 0..count {
            let coord = raster.index_to_coord(i);
            let value = field.get(coord);
            if value == 0 || map.kinds[i].is_some() {
                continue;
            }
            let ring = coord.neighbors_8().map(|n| field.get(n));
            if rising_arcs(&ring, value) >= 2 {
                saddles.push((vec![coord], coord.neighbors_8().to_vec()));
                continue;
            }
            // 2x2 block with this cell at its lower-left corner.
            let block = [
                coord,
                GridCoord::new(coord.x + 1, coord.y),
                GridCoord::new(coord.x, coord.y + 1),
                GridCoord::new(coord.x + 1, coord.y + 1),
            ];
            let flat = block.iter().all(|&c| {
                field.get(c) == value
                    && raster.coord_to_index(c).is_some_and(|j| map.kinds[j].is_none())
            });
            if flat {
                let ring = coord.ring_12().map(|n| field.get(n));
                if rising_arcs(&ring, value) >= 2 {
                    saddles.push((block.to_vec(), coord.ring_12().to_vec()));
                }
            }
        }

        for (cells, ring) in saddles {
            for &cell in &cells {
                map.mark(raster, cell, RidgeKind::Saddle);
            }
            map.climb_arcs(raster, field, &cells, &ring);
        }
        map
    }

    fn mark(&mut self, raster: &WalkableRaster, coord: GridCoord, kind: RidgeKind) {
        if let Some(i) = raster.coord_to_index(coord) {
            if self.kinds[i].is_none() {
                self.kinds[i] = Some(kind);
            }
        }
    }

    /// Connect equal-valued adjacent maxima into blocks (plateau flood).
    fn group_blocks(&mut self, raster: &WalkableRaster, field: &DistanceField) {
        let mut next_block = 0;
        for start in 0..self.kinds.len() {
            if self.kinds[start] != Some(RidgeKind::Maximum) || self.blocks[start].is_some() {
                continue;
            }
            let value = field.get(raster.index_to_coord(start));
            self.blocks[start] = Some(next_block);
            let mut stack = vec![raster.index_to_coord(start)];
            while let Some(coord) = stack.pop() {
                for n in coord.neighbors_8() {
                    let Some(j) = raster.coord_to_index(n) else {
                        continue;
                    };
                    if self.kinds[j] == Some(RidgeKind::Maximum)
                        && self.blocks[j].is_none()
                        && field.get(n) == value
                    {
                        self.blocks[j] = Some(next_block);
                        stack.push(n);
                    }
                }
            }
            next_block += 1;
        }
    }

    /// Climb from the highest cell of every rising arc around a saddle.
    fn climb_arcs(
        &mut self,
        raster: &WalkableRaster,
        field: &DistanceField,
        saddle: &[GridCoord],
        ring: &[GridCoord],
    ) {
        let base = field.get(saddle[0]);
        let values: Vec<u32> = ring.iter().map(|&c| field.get(c)).collect();
        for arc in arcs(&values, base) {
            let Some(&top) = arc.iter().max_by_key(|&&k| values[k]) else {
                continue;
            };
            self.climb(raster, field, ring[top]);
        }
    }

    /// Steepest ascent until a ridge cell or a maximum is reached.
    fn climb(&mut self, raster: &WalkableRaster, field: &DistanceField, start: GridCoord) {
        let mut current = start;
        loop {
            let Some(i) = raster.coord_to_index(current) else {
                return;
            };
            if self.kinds[i].is_some() {
                return;
            }
            self.kinds[i] = Some(RidgeKind::Climb);
            let value = field.get(current);
            let higher = current
                .neighbors_8()
                .into_iter()
                .filter(|&n| field.get(n) > value)
                .max_by_key(|&n| field.get(n));
            match higher {
                Some(next) => current = next,
                None => return,
            }
        }
    }

    pub fn kind(&self, coord: GridCoord) -> Option<RidgeKind> {
        self.index(coord).and_then(|i| self.kinds[i])
    }

    pub fn block(&self, coord: GridCoord) -> Option<u32> {
        self.index(coord).and_then(|i| self.blocks[i])
    }

    pub fn is_ridge(&self, coord: GridCoord) -> bool {
        self.kind(coord).is_some()
    }

    /// All ridge cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, RidgeKind)> + '_ {
        let width = self.width;
        self.kinds.iter().enumerate().filter_map(move |(i, kind)| {
            kind.map(|k| (GridCoord::new((i % width) as i32, (i / width) as i32), k))
        })
    }

    pub fn len(&self) -> usize {
        self.kinds.iter().filter(|k| k.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.width == 0 || coord.x < 0 || coord.y < 0 || coord.x as usize >= self.width {
            return None;
        }
        let i = coord.y as usize * self.width + coord.x as usize;
        (i < self.kinds.len()).then_some(i)
    }
}

/// Number of maximal runs of ring cells strictly above `base`, cyclically.
fn rising_arcs(ring: &[u32], base: u32) -> usize {
    arcs(ring, base).len()
}

/// Maximal cyclic runs (as ring indices) of values strictly above `base`.
fn arcs(ring: &[u32], base: u32) -> Vec<Vec<usize>> {
    let n = ring.len();
    if n == 0 {
        return Vec::new();
    }
    let above = |k: usize| ring[k] > base;
    // Start right after a cell that is not above so no arc wraps.
    let Some(start) = (0..n).find(|&k| !above(k)) else {
        return vec![(0..n).collect()];
    };
    let mut result = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for offset in 1..=n {
        let k = (start + offset) % n;
        if above(k) {
            current.push(k);
        } else if !current.is_empty() {
            result.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}
