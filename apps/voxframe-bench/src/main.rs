//! Voxframe bake benchmark.
//!
//! Builds a sample animation through the edit operations, bakes it, and
//! reports timings and buffer statistics.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release -p voxframe-bench
//! cargo run --release -p voxframe-bench -- --frames 16 --size 24 --output sample.vxf
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voxframe_bake::{bake, PackConfig, PackedArtifact};
use voxframe_core::constants::VOXEL_SIZE;
use voxframe_core::{ColorIndex, GridPos, Palette, PaletteColor, PaletteIndex, PaletteSet};
use voxframe_render::{expand_frame_cpu, BufferLayout, FrameDispatch, StaticMesh};
use voxframe_voxel::{Animation, EditEngine, Selection};

const BODY: ColorIndex = ColorIndex(0);
const ACCENT: ColorIndex = ColorIndex(1);
const GLASS: ColorIndex = ColorIndex(2);

/// Thread group size assumed for dispatch statistics.
const GROUP_SIZE: u32 = 64;

/// Command-line options.
#[derive(Clone, Debug, PartialEq)]
struct BenchConfig {
    frames: usize,
    size: i32,
    sequential: bool,
    output: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            frames: 8,
            size: 12,
            sequential: false,
            output: None,
        }
    }
}

impl BenchConfig {
    /// Parse flags, ignoring the program name. Returns `None` for `--help`.
    fn parse(args: impl IntoIterator<Item = String>) -> Option<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" | "-f" => match args.next().map(|v| v.parse()) {
                    Some(Ok(frames)) if frames > 0 => config.frames = frames,
                    _ => warn!("--frames expects a positive integer"),
                },
                "--size" | "-s" => match args.next().map(|v| v.parse()) {
                    Some(Ok(size)) if size > 0 => config.size = size,
                    _ => warn!("--size expects a positive integer"),
                },
                "--sequential" => config.sequential = true,
                "--output" | "-o" => match args.next() {
                    Some(path) => config.output = Some(PathBuf::from(path)),
                    None => warn!("--output expects a path"),
                },
                "--help" | "-h" => return None,
                other => warn!(arg = other, "unknown argument"),
            }
        }

        Some(config)
    }
}

fn print_help() {
    println!("Voxframe Bench");
    println!();
    println!("Usage: voxframe-bench [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -f, --frames <N>     Animation frames (default: 8)");
    println!("  -s, --size <N>       Edge length of the sample cube in cells (default: 12)");
    println!("      --sequential     Cull frames on one thread");
    println!("  -o, --output <PATH>  Write the baked artifact and read it back");
    println!("  -h, --help           Show this help message");
}

fn init_logging() {
    #[cfg(feature = "profiling-tracy")]
    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,voxframe_bake=trace,voxframe_render=trace,voxframe_bench=trace")
        });
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_tracy::TracyLayer::default())
            .init();
    }
    #[cfg(not(feature = "profiling-tracy"))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }
}

fn palettes() -> PaletteSet {
    let day = Palette::new(
        "day",
        vec![
            PaletteColor::rgba(0.85, 0.55, 0.25, 1.0),
            PaletteColor::rgba(1.0, 0.9, 0.3, 1.0).with_emissive(1.5),
            PaletteColor::rgba(0.4, 0.7, 1.0, 0.4).with_surface(0.0, 0.95),
        ],
    );
    let night = Palette::new(
        "night",
        day.colors
            .iter()
            .map(|c| PaletteColor {
                color: (c.color.truncate() * 0.25).extend(c.color.w),
                ..*c
            })
            .collect(),
    );
    [day, night].into_iter().collect()
}

/// A `size`³ body with a glass cap and an accent cell walking across it.
fn build_animation(config: &BenchConfig, palettes: &PaletteSet) -> anyhow::Result<Animation> {
    let size = config.size;
    let mut animation = Animation::new(BODY);

    {
        let mut engine = EditEngine::new(animation.current_mut(), palettes, PaletteIndex(0));
        for axis in [GridPos::X, GridPos::Y, GridPos::Z] {
            for i in 0..size - 1 {
                ensure!(
                    engine.add_layer(axis * i, axis, BODY),
                    "layer {i} along {axis} was refused"
                );
            }
        }
        ensure!(
            engine.add_layer(GridPos::new(0, size - 1, 0), GridPos::Y, GLASS),
            "glass cap was refused"
        );
    }

    for i in 1..config.frames {
        animation.duplicate_current();
        let walker = GridPos::new(i as i32 % size, size, (i as i32 / size) % size);
        let mut engine = EditEngine::new(animation.current_mut(), palettes, PaletteIndex(0));
        engine.color_voxel(walker, ACCENT);
    }

    let cells: Vec<GridPos> = animation.current().grid().sorted_keys();
    let mut up = Selection::new(cells);
    up.set_scale(2.0);
    let mut engine = EditEngine::new(animation.current_mut(), palettes, PaletteIndex(0));
    let start = Instant::now();
    let grown = engine.rescale(&up);
    let cells: Vec<GridPos> = engine.frame().grid().sorted_keys();
    let mut down = Selection::new(cells);
    down.set_scale(0.5);
    let shrunk = engine.rescale(&down);
    info!(
        ?grown,
        ?shrunk,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "rescaled last frame up and back down"
    );

    // No visual layer consumes proxy events here.
    for index in 0..animation.len() {
        if let Some(frame) = animation.frame_mut(index) {
            frame.drain_events();
        }
    }
    Ok(animation)
}

fn report(artifact: &PackedArtifact) -> anyhow::Result<()> {
    let layout = BufferLayout::for_artifact(artifact);
    info!(
        frames = artifact.frame_count(),
        positions = artifact.positions.len(),
        instances = artifact.total_instances(),
        max_instance_count = artifact.max_instance_count,
        gpu_bytes = layout.total_bytes(),
        "artifact"
    );

    for frame in 0..artifact.frame_count() {
        let dispatch = FrameDispatch::for_frame(artifact, frame, GROUP_SIZE)?;
        tracing::debug!(
            frame,
            start = dispatch.instance_start,
            count = dispatch.instance_count,
            groups = dispatch.thread_groups,
            "dispatch"
        );
    }

    let start = Instant::now();
    let expanded = expand_frame_cpu(artifact, 0, VOXEL_SIZE)?;
    let mesh = StaticMesh::assemble(artifact, 0, &expanded)?;
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "static mesh of frame 0"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let Some(config) = BenchConfig::parse(std::env::args().skip(1)) else {
        print_help();
        return Ok(());
    };
    info!(?config, "Voxframe Bench");

    let palettes = palettes();

    let start = Instant::now();
    let animation = build_animation(&config, &palettes)?;
    let voxels: usize = animation.frames().iter().map(|f| f.len()).sum();
    info!(
        frames = animation.len(),
        voxels,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "animation built"
    );

    let pack = PackConfig::default().with_parallel(!config.sequential);
    let start = Instant::now();
    let artifact = bake(&animation, &palettes, PaletteIndex(0), pack)?;
    info!(
        parallel = pack.parallel,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "baked"
    );
    report(&artifact)?;

    if let Some(path) = &config.output {
        artifact
            .write_to(path)
            .with_context(|| format!("writing {}", path.display()))?;
        let read = PackedArtifact::read_from(path)
            .with_context(|| format!("reading {}", path.display()))?;
        ensure!(read == artifact, "artifact changed across a save/load cycle");
        let reopened = Animation::from_snapshots(&read.editor_frames)?;
        ensure!(
            reopened.snapshots() == animation.snapshots(),
            "editor frames changed across a save/load cycle"
        );
        info!(path = %path.display(), "artifact round trip verified");
    }

    Ok(())
}
