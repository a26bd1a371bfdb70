//! Per-voxel face visibility.
//!
//! A face is visible when the neighbor across it is empty, or when the
//! neighbor is transparent and the voxel itself is opaque. Faces between two
//! opaque voxels or two transparent voxels are never visible.

use voxframe_core::{ColorIndex, Face, FaceSet, GridPos, Transparency};

use crate::grid::GridStore;

/// Visible faces of one occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CulledVoxel {
    pub pos: GridPos,
    pub color: ColorIndex,
    pub faces: FaceSet,
}

/// Check a single face of the voxel at `pos` with color `color`.
#[inline]
pub fn is_face_visible<T: Transparency + ?Sized>(
    grid: &GridStore,
    pos: GridPos,
    color: ColorIndex,
    face: Face,
    transparency: &T,
) -> bool {
    match grid.get(pos + face.offset()) {
        None => true,
        Some(neighbor) => {
            transparency.is_transparent(neighbor.color) && !transparency.is_transparent(color)
        }
    }
}

/// Visible faces of the voxel at `pos`; empty for unoccupied cells.
pub fn visible_faces<T: Transparency + ?Sized>(
    grid: &GridStore,
    pos: GridPos,
    transparency: &T,
) -> FaceSet {
    let Some(voxel) = grid.get(pos) else {
        return FaceSet::empty();
    };
    let mut faces = FaceSet::empty();
    for face in Face::ALL {
        if is_face_visible(grid, pos, voxel.color, face, transparency) {
            faces.insert_face(face);
        }
    }
    faces
}

/// Cull every voxel of a grid, in lexicographic cell order.
///
/// Fully occluded voxels are dropped.
pub fn cull_grid<T: Transparency + ?Sized>(grid: &GridStore, transparency: &T) -> Vec<CulledVoxel> {
    grid.sorted_keys()
        .into_iter()
        .filter_map(|pos| {
            let faces = visible_faces(grid, pos, transparency);
            let color = grid.color(pos)?;
            (!faces.is_empty()).then_some(CulledVoxel { pos, color, faces })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxframe_core::{TransparencyMask, Voxel};

    const OPAQUE: ColorIndex = ColorIndex(0);
    const GLASS: ColorIndex = ColorIndex(1);

    fn mask() -> TransparencyMask {
        TransparencyMask(vec![false, true])
    }

    fn pair(a: ColorIndex, b: ColorIndex) -> GridStore {
        [
            (GridPos::ZERO, Voxel::new(a)),
            (GridPos::X, Voxel::new(b)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lone_voxel_shows_all_faces() {
        let grid: GridStore = [(GridPos::ZERO, Voxel::new(OPAQUE))].into_iter().collect();
        assert_eq!(visible_faces(&grid, GridPos::ZERO, &mask()), FaceSet::all());
    }

    #[test]
    fn empty_cell_has_no_faces() {
        let grid = GridStore::new();
        assert!(visible_faces(&grid, GridPos::ZERO, &mask()).is_empty());
    }

    #[test]
    fn opaque_neighbors_hide_shared_face() {
        let grid = pair(OPAQUE, OPAQUE);
        let a = visible_faces(&grid, GridPos::ZERO, &mask());
        let b = visible_faces(&grid, GridPos::X, &mask());
        assert!(!a.has(Face::PosX));
        assert!(!b.has(Face::NegX));
        assert_eq!(a.count(), 5);
        assert_eq!(b.count(), 5);
    }

    #[test]
    fn transparent_neighbors_hide_shared_face() {
        let grid = pair(GLASS, GLASS);
        assert!(!visible_faces(&grid, GridPos::ZERO, &mask()).has(Face::PosX));
        assert!(!visible_faces(&grid, GridPos::X, &mask()).has(Face::NegX));
    }

    #[test]
    fn opaque_face_shows_through_glass() {
        let grid = pair(OPAQUE, GLASS);
        assert!(visible_faces(&grid, GridPos::ZERO, &mask()).has(Face::PosX));
        assert!(!visible_faces(&grid, GridPos::X, &mask()).has(Face::NegX));
    }

    #[test]
    fn cull_grid_drops_occluded_voxels() {
        let mut grid = GridStore::new();
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    grid.set(GridPos::new(x, y, z), Voxel::new(OPAQUE));
                }
            }
        }
        let culled = cull_grid(&grid, &mask());
        assert_eq!(culled.len(), 26);
        assert!(culled.iter().all(|v| v.pos != GridPos::ZERO));
        assert!(culled.windows(2).all(|w| w[0].pos < w[1].pos));
    }

    #[test]
    fn slices_work_as_transparency_tables() {
        let grid = pair(OPAQUE, GLASS);
        let table: &[bool] = &[false, true];
        assert!(visible_faces(&grid, GridPos::ZERO, table).has(Face::PosX));
    }
}
