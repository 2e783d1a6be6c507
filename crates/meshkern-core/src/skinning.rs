//! Vertex stage: skinning, model and view-projection transforms, and the
//! direction vectors consumed by the fragment stage.

use glam::{Mat4, UVec4, Vec2, Vec3, Vec4};

use crate::records::CameraUniform;

/// Attribute set of a surface pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Position and normal; flat material color.
    Basic,
    /// Adds texture coordinates.
    Textured,
    /// Adds texture coordinates and a tangent for normal mapping.
    NormalMapped,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 3] = [Self::Basic, Self::Textured, Self::NormalMapped];

    #[inline]
    pub fn has_tex_coords(self) -> bool {
        !matches!(self, Self::Basic)
    }

    #[inline]
    pub fn has_tangents(self) -> bool {
        matches!(self, Self::NormalMapped)
    }
}

/// Per-vertex attributes. `uv` and `tangent` are ignored by kinds that do not
/// carry them.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SurfaceVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec3,
}

/// Joints and blend weights influencing one vertex.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SkinInfluence {
    pub joints: UVec4,
    pub weights: Vec4,
}

/// Values handed to the fragment stage, plus the clip-space position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub normal: Vec3,
    pub light_dir: Vec3,
    pub camera_dir: Vec3,
    pub uv: Option<Vec2>,
    pub tangent: Option<Vec3>,
}

/// First palette entry used by instance `instance_index`. Wraps on overflow
/// like the `u32` arithmetic in the vertex shader.
#[inline]
pub fn palette_offset(transform_length: u32, instance_index: u32) -> u32 {
    transform_length.wrapping_mul(instance_index)
}

/// Weighted blend of the four joint matrices selected by `influence`.
///
/// Weights are used as given; they are expected to sum to one.
///
/// `joint + offset` wraps like the shader does.
///
/// # Panics
/// If a joint index plus `offset` is out of range for `palette`.
pub fn skin_matrix(influence: SkinInfluence, palette: &[Mat4], offset: u32) -> Mat4 {
    let SkinInfluence { joints, weights } = influence;
    let joint = |j: u32| palette[j.wrapping_add(offset) as usize];
    joint(joints.x) * weights.x
        + joint(joints.y) * weights.y
        + joint(joints.z) * weights.z
        + joint(joints.w) * weights.w
}

/// Transforms a vertex of a still (non-skinned) mesh.
pub fn transform_still(
    kind: SurfaceKind,
    vertex: &SurfaceVertex,
    model: Mat4,
    camera: &CameraUniform,
) -> VertexOutput {
    transform_vertex(kind, vertex, model, camera)
}

/// Transforms a vertex of a skinned mesh.
///
/// Instance `instance_index` reads its joint matrices from
/// `palette[camera.transform_length * instance_index..]`.
pub fn transform_skinned(
    kind: SurfaceKind,
    vertex: &SurfaceVertex,
    influence: SkinInfluence,
    model: Mat4,
    instance_index: u32,
    palette: &[Mat4],
    camera: &CameraUniform,
) -> VertexOutput {
    let offset = palette_offset(camera.transform_length, instance_index);
    let skin = skin_matrix(influence, palette, offset);
    transform_vertex(kind, vertex, model * skin, camera)
}

fn transform_vertex(
    kind: SurfaceKind,
    vertex: &SurfaceVertex,
    world_from_local: Mat4,
    camera: &CameraUniform,
) -> VertexOutput {
    let world = world_from_local * vertex.position.extend(1.0);
    let world_pos = world.truncate();

    let direction = |v: Vec3| (world_from_local * v.extend(0.0)).truncate().normalize_or_zero();

    VertexOutput {
        clip_position: camera.view_proj() * world,
        normal: direction(vertex.normal),
        light_dir: (camera.light_position() - world_pos).normalize_or_zero(),
        camera_dir: (camera.camera_position() - world_pos).normalize_or_zero(),
        uv: kind.has_tex_coords().then_some(vertex.uv),
        tangent: kind.has_tangents().then(|| direction(vertex.tangent)),
    }
}
