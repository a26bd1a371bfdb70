use voxframe_bake::{bake, PackConfig, PackedArtifact};
use voxframe_core::constants::VOXEL_SIZE;
use voxframe_core::PaletteIndex;
use voxframe_render::{
    expand_frame_cpu, ArtifactBuffers, ArtifactRenderer, BufferKind, GpuBackend, GpuColor,
    GpuError, PlaybackConfig, Result, SharedBuffers, StaticMesh,
};
use voxframe_test::{init_tracing, sample_animation, test_palette_set};

#[derive(Debug)]
struct MockBuffer {
    id: usize,
    bytes: usize,
}

/// Backend that tracks live buffers and can refuse one label.
#[derive(Default)]
struct MockBackend {
    created: usize,
    live: Vec<usize>,
    fail_on: Option<&'static str>,
}

impl MockBackend {
    fn failing_on(label: &'static str) -> Self {
        Self {
            fail_on: Some(label),
            ..Default::default()
        }
    }
}

impl GpuBackend for MockBackend {
    type Buffer = MockBuffer;

    fn create_buffer(
        &mut self,
        label: &str,
        len: usize,
        stride: usize,
        contents: Option<&[u8]>,
    ) -> Result<MockBuffer> {
        if self.fail_on == Some(label) {
            return Err(GpuError::AllocationFailed(format!("{label}: out of memory")));
        }
        if let Some(contents) = contents {
            assert_eq!(contents.len(), len * stride, "{label} upload size");
        }
        self.created += 1;
        self.live.push(self.created);
        Ok(MockBuffer {
            id: self.created,
            bytes: len * stride,
        })
    }

    fn release(&mut self, buffer: MockBuffer) {
        let before = self.live.len();
        self.live.retain(|&id| id != buffer.id);
        assert_eq!(self.live.len() + 1, before, "buffer {} released twice", buffer.id);
    }
}

fn artifact() -> PackedArtifact {
    bake(
        &sample_animation(4, 2),
        &test_palette_set(),
        PaletteIndex(0),
        PackConfig::default(),
    )
    .unwrap()
}

#[test]
fn buffers_are_released_on_disable() {
    init_tracing();
    let artifact = artifact();
    let mut backend = MockBackend::default();
    let mut buffers = ArtifactBuffers::<MockBackend>::new();

    buffers.enable(&mut backend, &artifact).unwrap();
    assert!(buffers.is_enabled());
    assert_eq!(backend.live.len(), BufferKind::ALL.len());
    assert_eq!(
        buffers.get(BufferKind::VoxelIndices).unwrap().bytes,
        artifact.voxel_indices.len() * 4
    );
    assert_eq!(
        buffers.get(BufferKind::TransformMatrices).unwrap().bytes,
        artifact.max_instance_count as usize * 64
    );

    assert!(matches!(
        buffers.enable(&mut backend, &artifact),
        Err(GpuError::InvalidState(_))
    ));

    buffers.disable(&mut backend);
    assert!(!buffers.is_enabled());
    assert!(backend.live.is_empty());
    buffers.disable(&mut backend);
    assert!(buffers.get(BufferKind::VoxelPositions).is_none());
}

#[test]
fn failed_allocation_unwinds_partial_uploads() {
    init_tracing();
    let artifact = artifact();
    let mut backend = MockBackend::failing_on("transform_matrices");
    let mut buffers = ArtifactBuffers::<MockBackend>::new();

    let result = buffers.enable(&mut backend, &artifact);
    assert!(matches!(result, Err(GpuError::AllocationFailed(_))));
    assert!(!buffers.is_enabled());
    assert!(backend.live.is_empty());
    assert_eq!(backend.created, 3);

    // The artifact itself is untouched.
    assert_eq!(artifact, self::artifact());
}

#[test]
fn shared_buffers_hold_one_color_buffer_per_palette() {
    let palettes = test_palette_set();
    let mut backend = MockBackend::default();
    let shared = SharedBuffers::create(&mut backend, &palettes).unwrap();

    assert_eq!(shared.palette_count(), 2);
    assert_eq!(
        shared.color_buffer(PaletteIndex(1)).unwrap().bytes,
        palettes.palettes()[1].len() * std::mem::size_of::<GpuColor>()
    );
    assert!(shared.color_buffer(PaletteIndex(2)).is_none());
    assert_eq!(shared.rotations.bytes, 6 * 64);

    shared.release(&mut backend);
    assert!(backend.live.is_empty());

    let mut failing = MockBackend::failing_on("night");
    assert!(SharedBuffers::create(&mut failing, &palettes).is_err());
    assert!(failing.live.is_empty());
}

#[test]
fn renderer_redispatches_on_frame_change_and_swaps_palettes() {
    init_tracing();
    let artifact = artifact();
    let mut backend = MockBackend::default();
    let shared = SharedBuffers::create(&mut backend, &test_palette_set()).unwrap();
    let mut renderer = ArtifactRenderer::new(artifact.clone(), PlaybackConfig::default(), 64);

    // Nothing happens before the buffers exist.
    assert_eq!(renderer.update(1.0).unwrap(), None);

    let first = renderer.enable(&mut backend).unwrap();
    assert_eq!(first.frame, 0);
    assert_eq!(first.instance_count, artifact.instance_count[0]);

    assert_eq!(renderer.update(0.125).unwrap(), None);
    let next = renderer.update(0.125).unwrap().unwrap();
    assert_eq!(next.frame, 1);
    assert_eq!(next.instance_start, artifact.instance_count[0]);
    assert_eq!(next.thread_groups, next.instance_count.div_ceil(64));

    let night = shared.color_buffer(PaletteIndex(1)).unwrap().id;
    assert!(renderer.set_palette(&shared, PaletteIndex(1)));
    assert_eq!(renderer.color_buffer(&shared).unwrap().id, night);
    assert!(!renderer.set_palette(&shared, PaletteIndex(9)));
    assert_eq!(renderer.artifact().palette_index, PaletteIndex(1));
    // Palette swaps never touch geometry.
    assert_eq!(renderer.artifact().voxel_indices, artifact.voxel_indices);

    renderer.disable(&mut backend);
    shared.release(&mut backend);
    assert!(backend.live.is_empty());
}

#[test]
fn exported_mesh_stays_inside_artifact_bounds() {
    let artifact = artifact();
    let expanded = expand_frame_cpu(&artifact, 0, VOXEL_SIZE).unwrap();
    let mesh = StaticMesh::assemble(&artifact, 0, &expanded).unwrap();

    let instances = artifact.instance_count[0] as usize;
    assert_eq!(mesh.vertex_count(), instances * 4);
    assert_eq!(mesh.triangle_count(), instances * 2);
    assert_eq!(mesh.normals.len(), mesh.vertex_count());

    let bounds = artifact.bounds.inflated(1e-5);
    for v in &mesh.vertices {
        assert!(bounds.contains_point(*v), "{v} outside bounds");
    }
}
