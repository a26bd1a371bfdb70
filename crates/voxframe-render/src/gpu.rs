//! GPU-compatible element types and the shared face geometry.
//!
//! Every instance is the same unit quad, rotated onto its face and moved to
//! its voxel. The rotation table is indexed by [`Face::index`], so its order
//! must stay in step with the face enumeration used when packing.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use voxframe_core::constants::VOXEL_SIZE;
use voxframe_core::{Face, Palette, PaletteColor};

/// One palette entry as the shaders read it.
///
/// Layout (28 bytes):
/// - color: [f32; 4] RGBA
/// - emissive: f32
/// - metallic: f32
/// - smoothness: f32
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuColor {
    pub color: [f32; 4],
    pub emissive: f32,
    pub metallic: f32,
    pub smoothness: f32,
}

impl From<&PaletteColor> for GpuColor {
    fn from(color: &PaletteColor) -> Self {
        Self {
            color: color.color.to_array(),
            emissive: color.emissive_intensity,
            metallic: color.metallic,
            smoothness: color.smoothness,
        }
    }
}

impl GpuColor {
    /// Color buffer contents for `palette`, in color-index order.
    pub fn palette_buffer(palette: &Palette) -> Vec<Self> {
        palette.colors.iter().map(Self::from).collect()
    }
}

/// Rotation taking the canonical +Y quad onto each face, indexed by face.
pub const FACE_ROTATIONS: [Mat3; 6] = [
    // +Y: about X by 0
    Mat3::IDENTITY,
    // -Z: about X by a quarter turn
    Mat3::from_cols(
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 1.0, 0.0),
    ),
    // -Y: about X by a half turn
    Mat3::from_cols(
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(0.0, 0.0, -1.0),
    ),
    // +Z: about X by three quarter turns
    Mat3::from_cols(
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, -1.0, 0.0),
    ),
    // -X: about Z by minus a quarter turn
    Mat3::from_cols(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ),
    // +X: about Z by a quarter turn
    Mat3::from_cols(
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ),
];

const HALF: f32 = VOXEL_SIZE * 0.5;

/// Corners of the +Y face of a voxel centered on the origin.
pub const QUAD_VERTICES: [Vec3; 4] = [
    Vec3::new(HALF, HALF, HALF),
    Vec3::new(HALF, HALF, -HALF),
    Vec3::new(-HALF, HALF, -HALF),
    Vec3::new(-HALF, HALF, HALF),
];

/// Two counter-clockwise triangles over [`QUAD_VERTICES`].
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Rotation of `face`.
#[inline]
pub fn face_rotation(face: Face) -> Mat3 {
    FACE_ROTATIONS[face.index()]
}

/// The rotation table as 4x4 matrices, the shape the compute kernel binds.
pub fn face_rotation_matrices() -> [Mat4; 6] {
    FACE_ROTATIONS.map(Mat4::from_mat3)
}

/// Local transform of one face instance.
///
/// `position` is in grid units; the quad is scaled from its canonical
/// [`VOXEL_SIZE`] to `voxel_size` and centered on the cell.
pub fn instance_transform(face: Face, position: Vec3, voxel_size: f32) -> Mat4 {
    let center = (position + Vec3::splat(0.5)) * voxel_size;
    Mat4::from_translation(center)
        * Mat4::from_mat3(face_rotation(face))
        * Mat4::from_scale(Vec3::splat(voxel_size / VOXEL_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gpu_color_layout() {
        // Must match the 7-float structured buffer stride.
        assert_eq!(std::mem::size_of::<GpuColor>(), 28);
    }

    #[test]
    fn gpu_color_from_palette_entry() {
        let entry = PaletteColor::rgba(0.1, 0.2, 0.3, 0.5)
            .with_emissive(2.0)
            .with_surface(0.4, 0.6);
        let gpu = GpuColor::from(&entry);
        assert_eq!(gpu.color, [0.1, 0.2, 0.3, 0.5]);
        assert_relative_eq!(gpu.emissive, 2.0);
        assert_relative_eq!(gpu.metallic, 0.4);
        assert_relative_eq!(gpu.smoothness, 0.6);
    }

    #[test]
    fn rotations_follow_face_order() {
        for face in Face::ALL {
            let rotation = face_rotation(face);
            assert_eq!(rotation * Vec3::Y, face.normal(), "{face:?}");
            assert_relative_eq!(rotation.determinant(), 1.0);
        }
    }

    #[test]
    fn rotated_quads_sit_on_their_face_and_wind_outward() {
        for face in Face::ALL {
            let rotation = face_rotation(face);
            let normal = face.normal();
            let v = QUAD_VERTICES.map(|v| rotation * v);
            for vertex in v {
                assert_relative_eq!(vertex.dot(normal), HALF);
            }
            let winding = (v[1] - v[0]).cross(v[2] - v[0]);
            assert!(winding.dot(normal) > 0.0, "{face:?} winds inward");
        }
    }

    #[test]
    fn instance_transform_centers_quad_on_cell() {
        let m = instance_transform(Face::PosX, Vec3::new(2.0, 0.0, -1.0), VOXEL_SIZE);
        let center = QUAD_VERTICES
            .iter()
            .map(|v| m.transform_point3(*v))
            .sum::<Vec3>()
            / 4.0;
        assert_relative_eq!(center.x, 0.3, epsilon = 1e-6);
        assert_relative_eq!(center.y, 0.05, epsilon = 1e-6);
        assert_relative_eq!(center.z, -0.05, epsilon = 1e-6);
    }

    #[test]
    fn rotation_matrices_keep_translation_empty() {
        for m in face_rotation_matrices() {
            assert_eq!(m.w_axis, glam::Vec4::W);
        }
    }
}
