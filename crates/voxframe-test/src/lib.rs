//! Test fixtures for voxframe.
//!
//! Provides palettes with known transparency, solid voxel blocks and small
//! multi-frame animations shared by the unit, integration and bench suites.

pub mod fixtures;

pub use fixtures::{
    animation_of, frame_of, grid_of, sample_animation, solid_block, test_palette,
    test_palette_set, GLASS, OPAQUE, OPAQUE_ALT, OPAQUE_DARK,
};

/// Route `tracing` output to the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
