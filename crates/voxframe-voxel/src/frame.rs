//! Editable animation frames.
//!
//! A [`Frame`] owns one [`GridStore`], the local-to-world transform used to
//! convert picked positions into cells, and the queue of [`ProxyEvent`]s that
//! keeps the visual layer in step with the grid.

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use voxframe_core::{ColorIndex, Error, GridPos, ProxyId, Result, Voxel};

use crate::grid::GridStore;
use crate::proxy::ProxyEvent;

/// Every occupied cell of one frame, including fully occluded ones.
///
/// Cells are listed in lexicographic `(x, y, z)` order with a parallel color
/// array, which is what a baked artifact stores to reopen an editing session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub positions: Vec<GridPos>,
    pub color_indices: Vec<ColorIndex>,
}

impl FrameSnapshot {
    /// Snapshot of every occupied cell of a grid.
    pub fn from_grid(grid: &GridStore) -> Self {
        let positions = grid.sorted_keys();
        let color_indices = positions
            .iter()
            .filter_map(|pos| grid.color(*pos))
            .collect();
        Self {
            positions,
            color_indices,
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the snapshot holds no cells
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `(cell, color)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, ColorIndex)> + '_ {
        self.positions
            .iter()
            .copied()
            .zip(self.color_indices.iter().copied())
    }

    /// Check the parallel arrays agree and no cell is listed twice.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() != self.color_indices.len() {
            return Err(Error::InvalidData(format!(
                "snapshot has {} positions but {} colors",
                self.positions.len(),
                self.color_indices.len()
            )));
        }
        let mut sorted = self.positions.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::InvalidData(format!(
                "snapshot lists cell {} twice",
                pair[0]
            )));
        }
        Ok(())
    }
}

/// One editable frame of an animation.
#[derive(Debug)]
pub struct Frame {
    grid: GridStore,
    transform: Affine3A,
    next_proxy: u64,
    events: Vec<ProxyEvent>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Create an empty frame with an identity transform.
    pub fn new() -> Self {
        Self {
            grid: GridStore::new(),
            transform: Affine3A::IDENTITY,
            next_proxy: 1,
            events: Vec::new(),
        }
    }

    /// Create a frame holding a single voxel at the origin.
    pub fn with_seed_voxel(color: ColorIndex) -> Self {
        let mut frame = Self::new();
        frame.place(GridPos::ZERO, color);
        frame
    }

    /// Adopt the voxels of a grid, attaching a fresh proxy to each.
    ///
    /// Proxy handles already present in `grid` are discarded.
    pub fn from_grid(grid: &GridStore) -> Self {
        let mut frame = Self::new();
        frame.grid = GridStore::with_capacity(grid.count());
        for pos in grid.sorted_keys() {
            if let Some(color) = grid.color(pos) {
                frame.place(pos, color);
            }
        }
        frame
    }

    /// Rebuild a frame from a stored snapshot.
    pub fn from_snapshot(snapshot: &FrameSnapshot) -> Result<Self> {
        snapshot.validate()?;
        let grid: GridStore = snapshot
            .iter()
            .map(|(pos, color)| (pos, Voxel::new(color)))
            .collect();
        Ok(Self::from_grid(&grid))
    }

    /// Every occupied cell in lexicographic order.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::from_grid(&self.grid)
    }

    /// Deep copy with fresh proxies. Pending events are not copied.
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::from_grid(&self.grid);
        copy.transform = self.transform;
        copy
    }

    #[inline]
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Number of voxels
    #[inline]
    pub fn len(&self) -> usize {
        self.grid.count()
    }

    /// Returns true if the frame holds no voxel
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Local-to-world transform of the frame
    #[inline]
    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
    }

    /// World-space position of a cell.
    pub fn grid_to_world(&self, pos: GridPos) -> Vec3 {
        self.transform.transform_point3(pos.to_local_position())
    }

    /// Nearest cell to a world-space position.
    pub fn world_to_grid(&self, world_position: Vec3) -> GridPos {
        let local = self.transform.inverse().transform_point3(world_position);
        GridPos::from_local_position(local)
    }

    /// Integer grid direction of a world-space face normal.
    pub fn normal_to_direction(&self, normal: Vec3) -> GridPos {
        let (_, rotation, _) = self.transform.to_scale_rotation_translation();
        GridPos::from_direction(rotation.inverse() * normal)
    }

    /// Drop the grid entry whose proxy was destroyed outside the edit engine.
    ///
    /// `world_position` is where the proxy sat when it was destroyed. A
    /// position that maps to an empty cell means the proxy layer and the grid
    /// disagree.
    pub fn on_proxy_destroyed(&mut self, world_position: Vec3) -> bool {
        let pos = self.world_to_grid(world_position);
        let removed = self.grid.remove(pos);
        debug_assert!(
            removed.is_some(),
            "destroyed proxy at {pos} has no grid entry"
        );
        if removed.is_none() {
            tracing::warn!(%pos, "destroyed proxy has no grid entry");
        }
        removed.is_some()
    }

    /// Take every queued proxy event, oldest first.
    pub fn drain_events(&mut self) -> Vec<ProxyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queued proxy events, oldest first.
    pub fn pending_events(&self) -> &[ProxyEvent] {
        &self.events
    }

    /// Remove every voxel, destroying their proxies.
    pub fn clear(&mut self) {
        for pos in self.grid.sorted_keys() {
            self.destroy(pos);
        }
    }

    fn next_proxy(&mut self) -> ProxyId {
        let id = ProxyId(self.next_proxy);
        self.next_proxy += 1;
        id
    }

    /// Place a voxel in an empty cell.
    pub(crate) fn place(&mut self, pos: GridPos, color: ColorIndex) -> bool {
        if self.grid.contains(pos) {
            return false;
        }
        let proxy = self.next_proxy();
        self.grid.set(pos, Voxel::with_proxy(color, proxy));
        self.events.push(ProxyEvent::Created { proxy, pos, color });
        true
    }

    /// Remove a voxel and destroy its proxy.
    pub(crate) fn destroy(&mut self, pos: GridPos) -> Option<Voxel> {
        let voxel = self.grid.remove(pos)?;
        self.events.push(ProxyEvent::Destroyed {
            proxy: voxel.proxy,
            pos,
        });
        Some(voxel)
    }

    /// Change the color of an occupied cell.
    pub(crate) fn recolor(&mut self, pos: GridPos, color: ColorIndex) -> bool {
        let Some(voxel) = self.grid.get_mut(pos) else {
            return false;
        };
        voxel.color = color;
        let proxy = voxel.proxy;
        self.events
            .push(ProxyEvent::Recolored { proxy, pos, color });
        true
    }

    /// Destroy the proxy of a detached voxel that will not be put back.
    pub(crate) fn discard(&mut self, from: GridPos, voxel: Voxel) {
        self.events.push(ProxyEvent::Destroyed {
            proxy: voxel.proxy,
            pos: from,
        });
    }

    /// Lift a voxel out of the grid without notifying the visual layer.
    ///
    /// Must be followed by [`Self::attach`] for the same voxel.
    pub(crate) fn detach(&mut self, pos: GridPos) -> Option<Voxel> {
        self.grid.remove(pos)
    }

    /// Put a detached voxel back at `to`.
    ///
    /// If `to` is occupied the voxel is destroyed instead and false is returned.
    pub(crate) fn attach(&mut self, from: GridPos, to: GridPos, voxel: Voxel) -> bool {
        if self.grid.contains(to) {
            self.discard(from, voxel);
            return false;
        }
        self.grid.set(to, voxel);
        if from != to {
            self.events.push(ProxyEvent::Moved {
                proxy: voxel.proxy,
                from,
                to,
            });
        }
        true
    }
}

impl AsRef<GridStore> for Frame {
    fn as_ref(&self) -> &GridStore {
        &self.grid
    }
}
