//! Grids, frames, palettes and animations with known contents.

use voxframe_core::{ColorIndex, GridPos, Palette, PaletteColor, PaletteSet, Voxel};
use voxframe_voxel::{Animation, Frame, GridStore};

/// Opaque red in [`test_palette`].
pub const OPAQUE: ColorIndex = ColorIndex(0);
/// Opaque green in [`test_palette`].
pub const OPAQUE_ALT: ColorIndex = ColorIndex(1);
/// Half-transparent blue in [`test_palette`].
pub const GLASS: ColorIndex = ColorIndex(2);
/// Opaque near-black in [`test_palette`].
pub const OPAQUE_DARK: ColorIndex = ColorIndex(3);

/// Four-color palette; only [`GLASS`] is transparent.
pub fn test_palette() -> Palette {
    Palette::new(
        "test",
        vec![
            PaletteColor::rgba(0.9, 0.1, 0.1, 1.0),
            PaletteColor::rgba(0.1, 0.8, 0.2, 1.0).with_surface(0.0, 0.3),
            PaletteColor::rgba(0.2, 0.3, 0.9, 0.5),
            PaletteColor::rgba(0.05, 0.05, 0.05, 1.0).with_emissive(2.0),
        ],
    )
}

/// [`test_palette`] followed by a darker variant with the same transparency.
pub fn test_palette_set() -> PaletteSet {
    let night = Palette::new(
        "night",
        test_palette()
            .colors
            .iter()
            .map(|c| PaletteColor {
                color: (c.color.truncate() * 0.3).extend(c.color.w),
                ..*c
            })
            .collect(),
    );
    [test_palette(), night].into_iter().collect()
}

/// Grid holding exactly the given cells.
pub fn grid_of(cells: &[(GridPos, ColorIndex)]) -> GridStore {
    cells
        .iter()
        .map(|&(pos, color)| (pos, Voxel::new(color)))
        .collect()
}

/// Solid `size`-cell box of one color with its minimum corner at `min`.
pub fn solid_block(min: GridPos, size: GridPos, color: ColorIndex) -> GridStore {
    let mut grid = GridStore::with_capacity((size.x * size.y * size.z).max(0) as usize);
    for x in 0..size.x {
        for y in 0..size.y {
            for z in 0..size.z {
                grid.set(min + GridPos::new(x, y, z), Voxel::new(color));
            }
        }
    }
    grid
}

/// Frame adopting `grid`, with the creation events already drained.
pub fn frame_of(grid: &GridStore) -> Frame {
    let mut frame = Frame::from_grid(grid);
    frame.drain_events();
    frame
}

/// Animation with one frame per grid.
pub fn animation_of(grids: &[GridStore]) -> Animation {
    let frames = grids.iter().map(frame_of).collect();
    match Animation::from_frames(frames) {
        Ok(animation) => animation,
        Err(_) => Animation::new(OPAQUE),
    }
}

/// `frames` frames of a `size³` opaque cube with a glass voxel walking
/// along its top edge, one cell per frame.
pub fn sample_animation(frames: usize, size: i32) -> Animation {
    let size = size.max(1);
    let grids: Vec<_> = (0..frames.max(1))
        .map(|i| {
            let mut grid = solid_block(GridPos::ZERO, GridPos::splat(size), OPAQUE);
            let walker = GridPos::new(i as i32 % size, size, 0);
            grid.set(walker, Voxel::new(GLASS));
            grid
        })
        .collect();
    animation_of(&grids)
}
