//! Spatial hash grid - the broad phase for collision detection
//!
//! Colliders are bucketed into fixed-size cells. Candidate partners for
//! each collider come from its own cell plus the 8 neighbors, and every
//! unordered pair is reported exactly once per frame: both traversal
//! directions meet in a scratch set keyed by the packed entity ids,
//! smaller id first.

use hashbrown::HashMap;
use rustc_hash::FxHashSet;

use crate::game::entities::Collider;
use crate::util::vec2::Vec2;

/// Grid cell key - (x, y) cell coordinates. Plain integer tuple, nothing
/// allocated per lookup.
pub type CellKey = (i32, i32);

/// Initial capacity for grid cells (expected non-empty cells)
const GRID_INITIAL_CAPACITY: usize = 64;

/// Initial capacity for collider vectors within cells
const CELL_INITIAL_CAPACITY: usize = 4;

const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0), (0,  0), (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Uniform-cell broad phase.
///
/// The cell size must be at least twice the largest collision radius or
/// the 3x3 neighborhood can miss a touching pair.
pub struct SpatialGrid {
    cell_size: f32,
    /// Inverse cell size for fast position-to-cell conversion
    inv_cell_size: f32,
    cells: HashMap<CellKey, Vec<Collider>>,
    /// Scratch pair-dedup set, reused across frames
    seen_pairs: FxHashSet<(u64, u64)>,
    len: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::with_capacity(GRID_INITIAL_CAPACITY),
            seen_pairs: FxHashSet::default(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn position_to_cell(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Empty all buckets, keeping their allocations for the next frame.
    #[inline]
    pub fn clear(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
        self.len = 0;
    }

    #[inline]
    pub fn insert(&mut self, collider: Collider) {
        let cell_key = self.position_to_cell(collider.position);
        self.cells
            .entry(cell_key)
            .or_insert_with(|| Vec::with_capacity(CELL_INITIAL_CAPACITY))
            .push(collider);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Invoke `f` once per unordered candidate pair.
    pub fn for_each_candidate_pair(&mut self, mut f: impl FnMut(Collider, Collider)) {
        self.seen_pairs.clear();
        for (&(cx, cy), cell) in &self.cells {
            for &collider in cell {
                let key_a = collider.id.packed();
                for &(dx, dy) in &NEIGHBOR_OFFSETS {
                    let Some(neighbors) = self.cells.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    for &other in neighbors {
                        let key_b = other.id.packed();
                        if key_a == key_b {
                            continue;
                        }
                        let pair = if key_a < key_b {
                            (key_a, key_b)
                        } else {
                            (key_b, key_a)
                        };
                        if self.seen_pairs.insert(pair) {
                            f(collider, other);
                        }
                    }
                }
            }
        }
    }

    /// Occupied cell count and stored collider count, for diagnostics.
    pub fn stats(&self) -> GridStats {
        GridStats {
            occupied_cells: self.cells.values().filter(|c| !c.is_empty()).count(),
            colliders: self.len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStats {
    pub occupied_cells: usize,
    pub colliders: usize,
}
