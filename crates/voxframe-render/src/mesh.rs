//! Static-mesh assembly for exporters.
//!
//! The compute kernel expands each face instance of a frame into four
//! vertices and one normal. [`StaticMesh::assemble`] turns that output into
//! an indexed triangle mesh whose UV x channel carries the color index.
//! [`expand_frame_cpu`] produces the same expansion without a GPU.

use glam::{Vec2, Vec3};
use voxframe_bake::PackedArtifact;
use voxframe_core::{ColorIndex, Face};

use crate::error::{GpuError, Result};
use crate::gpu::{instance_transform, QUAD_INDICES, QUAD_VERTICES};

const VERTICES_PER_FACE: usize = QUAD_VERTICES.len();

/// Per-instance expansion of one frame, in instance order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpandedFrame {
    /// Four corners per instance
    pub vertices: Vec<Vec3>,
    /// One normal per instance
    pub normals: Vec<Vec3>,
}

impl ExpandedFrame {
    #[inline]
    pub fn instance_count(&self) -> usize {
        self.normals.len()
    }
}

/// Expand `frame` of `artifact` on the CPU with the shared rotation table.
pub fn expand_frame_cpu(
    artifact: &PackedArtifact,
    frame: usize,
    voxel_size: f32,
) -> Result<ExpandedFrame> {
    let range = frame_range(artifact, frame)?;
    let mut expanded = ExpandedFrame {
        vertices: Vec::with_capacity(range.len() * VERTICES_PER_FACE),
        normals: Vec::with_capacity(range.len()),
    };

    for face in Face::ALL {
        let faces = artifact
            .face_range(frame, face)
            .ok_or_else(|| GpuError::InvalidState(format!("frame {frame} has no face counts")))?;
        for instance in faces {
            let position = instance_position(artifact, instance)?;
            let transform = instance_transform(face, position, voxel_size);
            expanded
                .vertices
                .extend(QUAD_VERTICES.iter().map(|v| transform.transform_point3(*v)));
            expanded.normals.push(face.normal());
        }
    }
    Ok(expanded)
}

/// Indexed triangle mesh of one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticMesh {
    pub vertices: Vec<Vec3>,
    /// One normal per vertex
    pub normals: Vec<Vec3>,
    /// Two triangles per face
    pub triangles: Vec<u32>,
    /// `(color index, 0)` per vertex
    pub uvs: Vec<Vec2>,
}

impl StaticMesh {
    /// Build the mesh of `frame` from its expanded instances.
    pub fn assemble(
        artifact: &PackedArtifact,
        frame: usize,
        expanded: &ExpandedFrame,
    ) -> Result<Self> {
        let range = frame_range(artifact, frame)?;
        let instances = range.len();
        if expanded.normals.len() != instances
            || expanded.vertices.len() != instances * VERTICES_PER_FACE
        {
            return Err(GpuError::InvalidState(format!(
                "frame {frame} has {instances} instances but the expansion holds {} vertices and {} normals",
                expanded.vertices.len(),
                expanded.normals.len()
            )));
        }

        let vertex_count = instances * VERTICES_PER_FACE;
        let mut mesh = Self {
            vertices: expanded.vertices.clone(),
            normals: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(instances * QUAD_INDICES.len()),
            uvs: Vec::with_capacity(vertex_count),
        };

        for (i, instance) in range.enumerate() {
            let base = (i * VERTICES_PER_FACE) as u32;
            mesh.triangles.extend(QUAD_INDICES.iter().map(|k| base + k));

            let normal = expanded.normals[i];
            let uv = Vec2::new(instance_color(artifact, instance)?.0 as f32, 0.0);
            for _ in 0..VERTICES_PER_FACE {
                mesh.normals.push(normal);
                mesh.uvs.push(uv);
            }
        }

        tracing::debug!(
            frame,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "static mesh assembled"
        );
        Ok(mesh)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

fn frame_range(artifact: &PackedArtifact, frame: usize) -> Result<std::ops::Range<usize>> {
    artifact.instance_range(frame).ok_or_else(|| {
        GpuError::InvalidState(format!(
            "frame {frame} out of range for {} frames",
            artifact.frame_count()
        ))
    })
}

fn voxel_index(artifact: &PackedArtifact, instance: usize) -> Result<usize> {
    artifact
        .voxel_indices
        .get(instance)
        .map(|&i| i as usize)
        .ok_or_else(|| GpuError::InvalidState(format!("instance {instance} out of range")))
}

fn instance_position(artifact: &PackedArtifact, instance: usize) -> Result<Vec3> {
    let index = voxel_index(artifact, instance)?;
    artifact
        .positions
        .get(index)
        .copied()
        .ok_or_else(|| GpuError::InvalidState(format!("voxel index {index} out of range")))
}

fn instance_color(artifact: &PackedArtifact, instance: usize) -> Result<ColorIndex> {
    let index = voxel_index(artifact, instance)?;
    artifact
        .color_indices
        .get(index)
        .copied()
        .ok_or_else(|| GpuError::InvalidState(format!("voxel index {index} has no color")))
}
