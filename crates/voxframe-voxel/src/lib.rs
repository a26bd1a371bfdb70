//! Sparse voxel grids and structural editing for voxframe.
//!
//! - [`GridStore`]: hash-map backed cell → voxel storage
//! - [`culling`]: per-voxel visible-face computation
//! - [`Frame`] / [`Animation`]: editable frames with proxy back-references
//! - [`EditEngine`]: point, region and rescale edits over one frame

pub mod animation;
pub mod culling;
pub mod edit;
pub mod frame;
pub mod grid;
pub mod proxy;
pub mod selection;

pub use animation::Animation;
pub use culling::{cull_grid, is_face_visible, visible_faces, CulledVoxel};
pub use edit::{EditEngine, RescaleMode, RescaleOutcome};
pub use frame::{Frame, FrameSnapshot};
pub use grid::GridStore;
pub use proxy::ProxyEvent;
pub use selection::{SelectedVoxel, Selection};
