//! Structural edits on a single frame.
//!
//! Every operation validates its preconditions before touching the grid and
//! reports a failed precondition by returning `false`, leaving the frame
//! exactly as it was. Region operations (flood fill, layers) walk an explicit
//! worklist with a visited set instead of recursing.

use hashbrown::HashSet;
use voxframe_core::{
    ColorIndex, Face, GridBounds, GridPos, PaletteIndex, PaletteProvider, Voxel,
};

use crate::frame::Frame;
use crate::selection::Selection;

/// How [`EditEngine::rescale`] interpreted the selection's scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RescaleMode {
    /// Scale was 1: rotation snap followed by grid snap.
    Snap,
    /// Each voxel became an `n × n × n` block.
    Upscale(i32),
    /// Each `n × n × n` block merged into one voxel.
    Downscale(i32),
    /// Scale rounded to a factor of 1, or was not a usable number.
    Unchanged,
}

/// Result of [`EditEngine::rescale`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RescaleOutcome {
    pub mode: RescaleMode,
    /// Voxels that changed cells
    pub moved: usize,
    /// Voxels placed to fill upscaled blocks
    pub created: usize,
    /// Voxels removed by merges or collisions
    pub destroyed: usize,
}

impl RescaleOutcome {
    const fn new(mode: RescaleMode) -> Self {
        Self {
            mode,
            moved: 0,
            created: 0,
            destroyed: 0,
        }
    }
}

/// Edit operations over one frame, with colors checked against a palette.
pub struct EditEngine<'a, P: PaletteProvider + ?Sized> {
    frame: &'a mut Frame,
    palettes: &'a P,
    palette: PaletteIndex,
}

impl<'a, P: PaletteProvider + ?Sized> EditEngine<'a, P> {
    /// Edit `frame` with colors from `palette` of `palettes`.
    pub fn new(frame: &'a mut Frame, palettes: &'a P, palette: PaletteIndex) -> Self {
        Self {
            frame,
            palettes,
            palette,
        }
    }

    #[inline]
    pub fn frame(&self) -> &Frame {
        self.frame
    }

    /// Palette new colors are checked against.
    #[inline]
    pub fn palette_index(&self) -> PaletteIndex {
        self.palette
    }

    /// Returns true if `color` exists in the active palette.
    pub fn is_valid_color(&self, color: ColorIndex) -> bool {
        self.palettes.color(self.palette, color).is_some()
    }

    /// Place a voxel next to `origin`, on the side given by `direction`.
    ///
    /// `origin` must be occupied, except that an empty frame accepts the grid
    /// origin. The target cell must be empty.
    pub fn add_next_to(&mut self, origin: GridPos, direction: GridPos, color: ColorIndex) -> bool {
        if !self.is_valid_color(color) {
            return false;
        }
        let bootstrap = self.frame.is_empty() && origin == GridPos::ZERO;
        if !bootstrap && !self.frame.grid().contains(origin) {
            return false;
        }
        let target = origin + direction;
        if !self.frame.place(target, color) {
            return false;
        }
        tracing::debug!(%target, color = color.0, "voxel added");
        true
    }

    /// Remove the voxel at `pos`. The last voxel of a frame cannot be removed.
    pub fn remove_voxel(&mut self, pos: GridPos) -> bool {
        if self.frame.len() <= 1 || !self.frame.grid().contains(pos) {
            return false;
        }
        self.frame.destroy(pos).is_some()
    }

    /// Recolor the voxel at `pos`; fails if empty or already that color.
    pub fn color_voxel(&mut self, pos: GridPos, color: ColorIndex) -> bool {
        if !self.is_valid_color(color) {
            return false;
        }
        match self.frame.grid().color(pos) {
            Some(current) if current != color => self.frame.recolor(pos, color),
            _ => false,
        }
    }

    /// Recolor the 6-connected region of same-colored voxels containing `pos`.
    pub fn fill_color(&mut self, pos: GridPos, color: ColorIndex) -> bool {
        if !self.is_valid_color(color) {
            return false;
        }
        let Some(base) = self.frame.grid().color(pos) else {
            return false;
        };
        if base == color {
            return false;
        }

        let mut visited = HashSet::new();
        visited.insert(pos);
        let mut stack = vec![pos];
        let mut filled = 0usize;
        while let Some(cell) = stack.pop() {
            if self.frame.grid().color(cell) != Some(base) {
                continue;
            }
            self.frame.recolor(cell, color);
            filled += 1;
            for face in Face::ALL {
                let next = cell + face.offset();
                if self.frame.grid().color(next) == Some(base) && visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        tracing::debug!(%pos, filled, "flood fill");
        true
    }

    /// Extrude the same-colored planar patch containing `pos` one cell
    /// along `direction`.
    ///
    /// A patch cell grows only where the cell in front of it is empty.
    pub fn add_layer(&mut self, pos: GridPos, direction: GridPos, color: ColorIndex) -> bool {
        if !self.is_valid_color(color) {
            return false;
        }
        let Some(base) = self.frame.grid().color(pos) else {
            return false;
        };
        if self.frame.grid().contains(pos + direction) {
            return false;
        }

        let mut added = 0usize;
        self.walk_plane(pos, direction, |frame, cell| {
            if frame.grid().color(cell) != Some(base) || !frame.place(cell + direction, color) {
                return false;
            }
            added += 1;
            true
        });
        tracing::debug!(%pos, %direction, added, "layer added");
        true
    }

    /// Erode the same-colored planar patch containing `pos`, removing the
    /// patch itself. Stops before the frame would become empty.
    pub fn remove_layer(&mut self, pos: GridPos, direction: GridPos) -> bool {
        let Some(base) = self.frame.grid().color(pos) else {
            return false;
        };
        if self.frame.len() <= 1 {
            return false;
        }

        let mut removed = 0usize;
        self.walk_plane(pos, direction, |frame, cell| {
            if frame.len() <= 1 || frame.grid().color(cell) != Some(base) {
                return false;
            }
            frame.destroy(cell);
            removed += 1;
            true
        });
        tracing::debug!(%pos, %direction, removed, "layer removed");
        true
    }

    /// Visit the plane through `start` orthogonal to `direction`.
    ///
    /// `visit` returns whether the cell belonged to the patch; only then are
    /// its four in-plane neighbors queued.
    fn walk_plane(
        &mut self,
        start: GridPos,
        direction: GridPos,
        mut visit: impl FnMut(&mut Frame, GridPos) -> bool,
    ) {
        let tangent = direction.tangent();
        let bitangent = direction.bitangent();
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut stack = vec![start];
        while let Some(cell) = stack.pop() {
            if !visit(self.frame, cell) {
                continue;
            }
            for next in [
                cell + tangent,
                cell - tangent,
                cell + bitangent,
                cell - bitangent,
            ] {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
    }

    /// Turn a free-transformed selection back into grid cells.
    ///
    /// The selection's uniform scale picks the mode: `1` snaps rotation and
    /// position to the grid, `> 1` splits every voxel into an
    /// `round(scale)`-sized block, `< 1` merges `round(1 / scale)`-sized
    /// blocks counted from the selection's minimum corner. An upscale whose
    /// blocks would overflow the grid is refused. Cells not occupied in the frame are ignored. When a voxel lands
    /// on a cell held by a voxel that was not selected, the occupant stays and
    /// the incoming voxel is destroyed.
    pub fn rescale(&mut self, selection: &Selection) -> RescaleOutcome {
        let scale = selection.scale();
        let outcome = if !scale.is_finite() || scale <= 0.0 {
            tracing::warn!(scale, "ignoring rescale with invalid scale");
            RescaleOutcome::new(RescaleMode::Unchanged)
        } else if (scale - 1.0).abs() < f32::EPSILON {
            self.snap(selection)
        } else if scale > 1.0 {
            match scale.round() as i32 {
                n if n > 1 => self.upscale(selection, n),
                _ => RescaleOutcome::new(RescaleMode::Unchanged),
            }
        } else {
            match scale.recip().round() as i32 {
                n if n > 1 => self.downscale(selection, n),
                _ => RescaleOutcome::new(RescaleMode::Unchanged),
            }
        };
        tracing::debug!(
            mode = ?outcome.mode,
            moved = outcome.moved,
            created = outcome.created,
            destroyed = outcome.destroyed,
            "rescale applied"
        );
        outcome
    }

    /// Lift the selected voxels out of the grid, in lexicographic order.
    fn detach_selected(&mut self, cells: impl Iterator<Item = GridPos>) -> Vec<(GridPos, Voxel)> {
        cells
            .filter_map(|cell| self.frame.detach(cell).map(|voxel| (cell, voxel)))
            .collect()
    }

    fn snap(&mut self, selection: &Selection) -> RescaleOutcome {
        let mut outcome = RescaleOutcome::new(RescaleMode::Snap);
        let mut snapped = selection.clone();
        snapped.snap_rotation();

        let movers: Vec<_> = snapped
            .voxels()
            .iter()
            .filter_map(|v| {
                let voxel = self.frame.detach(v.cell)?;
                Some((v.cell, GridPos::from_local_position(v.position), voxel))
            })
            .collect();

        for (from, to, voxel) in movers {
            if self.frame.attach(from, to, voxel) {
                if from != to {
                    outcome.moved += 1;
                }
            } else {
                outcome.destroyed += 1;
            }
        }
        outcome
    }

    fn upscale(&mut self, selection: &Selection, n: i32) -> RescaleOutcome {
        let plan: Option<Vec<(GridPos, GridPos)>> = selection
            .cells()
            .filter(|&cell| self.frame.grid().contains(cell))
            .map(|cell| upscaled_corner(cell, n).map(|corner| (cell, corner)))
            .collect();
        let Some(plan) = plan else {
            tracing::warn!(n, "upscaled block would leave the grid");
            return RescaleOutcome::new(RescaleMode::Unchanged);
        };

        let mut outcome = RescaleOutcome::new(RescaleMode::Upscale(n));
        let movers: Vec<_> = plan
            .into_iter()
            .filter_map(|(cell, corner)| self.frame.detach(cell).map(|voxel| (cell, corner, voxel)))
            .collect();
        for (cell, corner, voxel) in movers {
            if self.frame.attach(cell, corner, voxel) {
                if corner != cell {
                    outcome.moved += 1;
                }
            } else {
                outcome.destroyed += 1;
            }
            for x in 0..n {
                for y in 0..n {
                    for z in 0..n {
                        let offset = GridPos::new(x, y, z);
                        if offset != GridPos::ZERO && self.frame.place(corner + offset, voxel.color) {
                            outcome.created += 1;
                        }
                    }
                }
            }
        }
        outcome
    }

    fn downscale(&mut self, selection: &Selection, n: i32) -> RescaleOutcome {
        let mut outcome = RescaleOutcome::new(RescaleMode::Downscale(n));
        let mut movers = self.detach_selected(selection.cells());
        let Some(bounds) = GridBounds::from_points(movers.iter().map(|(cell, _)| *cell)) else {
            return outcome;
        };
        // Blocks start at the selection's minimum corner, not at the lattice origin.
        let block_of = |cell: GridPos| (cell - bounds.min).div_floor(n);
        movers.sort_by_key(|(cell, _)| (block_of(*cell), *cell));

        for block in movers.chunk_by(|a, b| block_of(a.0) == block_of(b.0)) {
            let target = (bounds.min + block_of(block[0].0) * n).div_floor(n);
            let color = majority_color(block.iter().map(|(_, voxel)| voxel.color));
            let mut survivor_placed = false;
            for &(cell, voxel) in block {
                if !survivor_placed && voxel.color == color {
                    survivor_placed = true;
                    if self.frame.attach(cell, target, voxel) {
                        if target != cell {
                            outcome.moved += 1;
                        }
                        continue;
                    }
                } else {
                    self.frame.discard(cell, voxel);
                }
                outcome.destroyed += 1;
            }
        }
        outcome
    }
}

/// Corner of the `n`-sized block `cell` grows into, or `None` if the block
/// would not fit in `i32` coordinates.
fn upscaled_corner(cell: GridPos, n: i32) -> Option<GridPos> {
    let corner = cell.checked_mul(n)?;
    let far = n - 1;
    let fits = corner.x.checked_add(far).is_some()
        && corner.y.checked_add(far).is_some()
        && corner.z.checked_add(far).is_some();
    fits.then_some(corner)
}

/// Most frequent color; ties go to the color seen first.
fn majority_color(colors: impl Iterator<Item = ColorIndex>) -> ColorIndex {
    let mut counts: Vec<(ColorIndex, usize)> = Vec::new();
    for color in colors {
        match counts.iter_mut().find(|(c, _)| *c == color) {
            Some((_, count)) => *count += 1,
            None => counts.push((color, 1)),
        }
    }
    let mut best = ColorIndex::default();
    let mut best_count = 0;
    for (color, count) in counts {
        if count > best_count {
            best = color;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridStore;
    use crate::proxy::ProxyEvent;
    use voxframe_core::{Palette, PaletteColor};

    fn palette() -> Palette {
        Palette::new(
            "test",
            (0..4)
                .map(|i| PaletteColor::rgba(i as f32 / 4.0, 0.0, 0.0, 1.0))
                .collect(),
        )
    }

    fn frame_of(cells: &[(GridPos, u32)]) -> Frame {
        let grid: GridStore = cells
            .iter()
            .map(|&(pos, color)| (pos, Voxel::new(ColorIndex(color))))
            .collect();
        let mut frame = Frame::from_grid(&grid);
        frame.drain_events();
        frame
    }

    #[test]
    fn majority_prefers_first_seen_on_ties() {
        let colors = [1, 2, 2, 1, 3].map(ColorIndex);
        assert_eq!(majority_color(colors.into_iter()), ColorIndex(1));
        let colors = [3, 2, 2].map(ColorIndex);
        assert_eq!(majority_color(colors.into_iter()), ColorIndex(2));
    }

    #[test]
    fn add_next_to_requires_occupied_origin_and_empty_target() {
        let palette = palette();
        let mut frame = Frame::with_seed_voxel(ColorIndex(0));
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(engine.add_next_to(GridPos::ZERO, GridPos::X, ColorIndex(0)));
        assert!(!engine.add_next_to(GridPos::ZERO, GridPos::X, ColorIndex(0)));
        assert!(!engine.add_next_to(GridPos::new(5, 5, 5), GridPos::X, ColorIndex(0)));
        assert!(!engine.add_next_to(GridPos::ZERO, GridPos::Y, ColorIndex(99)));
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn empty_frame_bootstraps_from_origin_only() {
        let palette = palette();
        let mut frame = Frame::new();
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(!engine.add_next_to(GridPos::X, GridPos::Y, ColorIndex(0)));
        assert!(engine.add_next_to(GridPos::ZERO, GridPos::Y, ColorIndex(1)));
        assert_eq!(frame.grid().color(GridPos::Y), Some(ColorIndex(1)));
        assert_eq!(frame.grid().color(GridPos::ZERO), None);
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn last_voxel_is_protected() {
        let palette = palette();
        let mut frame = frame_of(&[(GridPos::ZERO, 0), (GridPos::X, 0)]);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(!engine.remove_voxel(GridPos::Y));
        assert!(engine.remove_voxel(GridPos::X));
        assert!(!engine.remove_voxel(GridPos::ZERO));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn color_voxel_rejects_noops() {
        let palette = palette();
        let mut frame = frame_of(&[(GridPos::ZERO, 0)]);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(!engine.color_voxel(GridPos::ZERO, ColorIndex(0)));
        assert!(!engine.color_voxel(GridPos::X, ColorIndex(1)));
        assert!(engine.color_voxel(GridPos::ZERO, ColorIndex(2)));
        assert_eq!(frame.grid().color(GridPos::ZERO), Some(ColorIndex(2)));
        assert!(matches!(
            &frame.drain_events()[..],
            [ProxyEvent::Recolored {
                color: ColorIndex(2),
                ..
            }]
        ));
    }

    #[test]
    fn fill_stays_inside_connected_region() {
        let palette = palette();
        // Row of five color-0 voxels broken by a color-1 voxel at x = 2.
        let mut frame = frame_of(&[
            (GridPos::new(0, 0, 0), 0),
            (GridPos::new(1, 0, 0), 0),
            (GridPos::new(2, 0, 0), 1),
            (GridPos::new(3, 0, 0), 0),
            (GridPos::new(4, 0, 0), 0),
        ]);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(engine.fill_color(GridPos::ZERO, ColorIndex(3)));
        assert!(!engine.fill_color(GridPos::ZERO, ColorIndex(3)));

        let grid = frame.grid();
        assert_eq!(grid.color(GridPos::new(1, 0, 0)), Some(ColorIndex(3)));
        assert_eq!(grid.color(GridPos::new(2, 0, 0)), Some(ColorIndex(1)));
        assert_eq!(grid.color(GridPos::new(3, 0, 0)), Some(ColorIndex(0)));
        assert_eq!(frame.drain_events().len(), 2);
    }

    #[test]
    fn add_layer_extrudes_matching_patch() {
        let palette = palette();
        // 3x3 floor at y = 0, one corner a different color.
        let mut cells = Vec::new();
        for x in 0..3 {
            for z in 0..3 {
                let color = u32::from(x == 2 && z == 2);
                cells.push((GridPos::new(x, 0, z), color));
            }
        }
        let mut frame = frame_of(&cells);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(engine.add_layer(GridPos::ZERO, GridPos::Y, ColorIndex(2)));
        assert!(!engine.add_layer(GridPos::ZERO, GridPos::Y, ColorIndex(2)));

        let grid = frame.grid();
        assert_eq!(grid.count(), 9 + 8);
        assert_eq!(grid.color(GridPos::new(1, 1, 1)), Some(ColorIndex(2)));
        assert!(grid.is_empty_at(GridPos::new(2, 1, 2)));
    }

    #[test]
    fn remove_layer_erodes_patch_but_keeps_last_voxel() {
        let palette = palette();
        let mut frame = frame_of(&[
            (GridPos::new(0, 0, 0), 0),
            (GridPos::new(1, 0, 0), 0),
            (GridPos::new(0, 1, 0), 0),
        ]);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(engine.remove_layer(GridPos::ZERO, GridPos::Y));
        assert_eq!(frame.len(), 1);
        assert!(frame.grid().contains(GridPos::Y));

        let mut frame = frame_of(&[(GridPos::new(0, 0, 0), 0), (GridPos::new(1, 0, 0), 0)]);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert!(engine.remove_layer(GridPos::ZERO, GridPos::Y));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn snap_destroys_movers_landing_on_occupied_cells() {
        let palette = palette();
        let mut frame = frame_of(&[(GridPos::ZERO, 0), (GridPos::X, 1), (GridPos::new(3, 0, 0), 2)]);
        let mut selection = Selection::new([GridPos::X, GridPos::new(3, 0, 0)]);
        selection.translate(glam::Vec3::new(-0.1, 0.0, 0.0));
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        let outcome = engine.rescale(&selection);

        assert_eq!(outcome.mode, RescaleMode::Snap);
        assert_eq!(outcome.moved, 1);
        assert_eq!(outcome.destroyed, 1);
        let grid = frame.grid();
        assert_eq!(grid.color(GridPos::ZERO), Some(ColorIndex(0)));
        assert_eq!(grid.color(GridPos::new(2, 0, 0)), Some(ColorIndex(2)));
        assert_eq!(grid.count(), 2);
    }

    #[test]
    fn upscale_moves_corner_and_fills_block() {
        let palette = palette();
        let mut frame = frame_of(&[(GridPos::new(1, 0, 0), 3), (GridPos::new(-5, 0, 0), 0)]);
        let proxy = frame.grid().get(GridPos::new(1, 0, 0)).unwrap().proxy;
        let mut selection = Selection::new([GridPos::new(1, 0, 0)]);
        selection.set_scale(2.2);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        let outcome = engine.rescale(&selection);

        assert_eq!(outcome.mode, RescaleMode::Upscale(2));
        assert_eq!(outcome.moved, 1);
        assert_eq!(outcome.created, 7);
        let grid = frame.grid();
        assert_eq!(grid.count(), 9);
        assert_eq!(grid.get(GridPos::new(2, 0, 0)).unwrap().proxy, proxy);
        assert!(grid.is_empty_at(GridPos::new(1, 0, 0)));
        assert_eq!(grid.color(GridPos::new(3, 1, 1)), Some(ColorIndex(3)));
        assert!(grid.contains(GridPos::new(-5, 0, 0)));
    }

    #[test]
    fn downscale_merges_block_into_majority_color() {
        let palette = palette();
        let mut cells = Vec::new();
        for x in 2..4 {
            for y in 0..2 {
                for z in 0..2 {
                    let color = u32::from(x == 3 && y == 1);
                    cells.push((GridPos::new(x, y, z), color));
                }
            }
        }
        let mut frame = frame_of(&cells);
        let mut selection = Selection::new(cells.iter().map(|(pos, _)| *pos));
        selection.set_scale(0.5);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        let outcome = engine.rescale(&selection);

        assert_eq!(outcome.mode, RescaleMode::Downscale(2));
        assert_eq!(outcome.destroyed, 7);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.grid().color(GridPos::new(1, 0, 0)), Some(ColorIndex(0)));
    }

    #[test]
    fn downscale_keeps_unselected_voxels_and_negative_blocks() {
        let palette = palette();
        let mut frame = frame_of(&[
            (GridPos::new(-1, 0, 0), 1),
            (GridPos::new(-2, 0, 0), 2),
            (GridPos::new(5, 5, 5), 0),
        ]);
        let mut selection = Selection::new([GridPos::new(-1, 0, 0), GridPos::new(-2, 0, 0)]);
        selection.set_scale(0.5);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        engine.rescale(&selection);

        // Tie between colors 1 and 2; (-2, 0, 0) comes first in the block.
        let grid = frame.grid();
        assert_eq!(grid.count(), 2);
        assert_eq!(grid.color(GridPos::new(-1, 0, 0)), Some(ColorIndex(2)));
        assert!(grid.contains(GridPos::new(5, 5, 5)));
    }

    #[test]
    fn scale_rounding_to_one_changes_nothing() {
        let palette = palette();
        let mut frame = frame_of(&[(GridPos::X, 0)]);
        let mut selection = Selection::new([GridPos::X]);
        selection.set_scale(1.3);
        let mut engine = EditEngine::new(&mut frame, &palette, PaletteIndex(0));
        assert_eq!(engine.rescale(&selection).mode, RescaleMode::Unchanged);
        selection.set_scale(0.0);
        assert_eq!(engine.rescale(&selection).mode, RescaleMode::Unchanged);
        assert!(frame.grid().contains(GridPos::X));
    }
}
