//! Sparse voxel storage.
//!
//! A [`GridStore`] maps occupied cells to their [`Voxel`] record. Empty cells
//! have no entry; asking for one is a valid query that answers `None`.

use hashbrown::HashMap;
use voxframe_core::{ColorIndex, GridBounds, GridPos, Voxel};

/// Sparse mapping from grid cell to voxel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridStore {
    cells: HashMap<GridPos, Voxel>,
}

impl GridStore {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty grid with room for `capacity` voxels.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: HashMap::with_capacity(capacity),
        }
    }

    /// Store a voxel, returning the previous occupant of the cell.
    #[inline]
    pub fn set(&mut self, pos: GridPos, voxel: Voxel) -> Option<Voxel> {
        self.cells.insert(pos, voxel)
    }

    /// Voxel at `pos`, if occupied.
    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<&Voxel> {
        self.cells.get(&pos)
    }

    #[inline]
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Voxel> {
        self.cells.get_mut(&pos)
    }

    /// Color of the voxel at `pos`, if occupied.
    #[inline]
    pub fn color(&self, pos: GridPos) -> Option<ColorIndex> {
        self.cells.get(&pos).map(|v| v.color)
    }

    /// Remove and return the voxel at `pos`.
    #[inline]
    pub fn remove(&mut self, pos: GridPos) -> Option<Voxel> {
        self.cells.remove(&pos)
    }

    /// Returns true if nothing occupies `pos`.
    #[inline]
    pub fn is_empty_at(&self, pos: GridPos) -> bool {
        !self.cells.contains_key(&pos)
    }

    /// Returns true if `pos` is occupied.
    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Number of occupied cells.
    #[inline]
    pub fn count(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no cell is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupied cells, in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells.keys().copied()
    }

    /// Voxel records, in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &Voxel> {
        self.cells.values()
    }

    /// `(cell, voxel)` pairs, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Voxel)> {
        self.cells.iter().map(|(pos, voxel)| (*pos, voxel))
    }

    /// Occupied cells in lexicographic `(x, y, z)` order.
    pub fn sorted_keys(&self) -> Vec<GridPos> {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    /// Remove every voxel.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Inclusive bounds of the occupied cells, `None` if the grid is empty.
    pub fn bounds(&self) -> Option<GridBounds> {
        GridBounds::from_points(self.keys())
    }
}

impl AsRef<GridStore> for GridStore {
    fn as_ref(&self) -> &GridStore {
        self
    }
}

impl FromIterator<(GridPos, Voxel)> for GridStore {
    fn from_iter<I: IntoIterator<Item = (GridPos, Voxel)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<(GridPos, Voxel)> for GridStore {
    fn extend<I: IntoIterator<Item = (GridPos, Voxel)>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}
