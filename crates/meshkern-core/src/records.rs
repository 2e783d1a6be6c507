//! Buffer records shared by the CPU kernels and the GPU bindings.
//!
//! All records are `#[repr(C)]` and `Pod` so they can be uploaded with
//! `bytemuck::cast_slice`. Uniform blocks are laid out for WGSL uniform
//! address space rules (vec3 aligned to 16 bytes).

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec4, Vec2, Vec3, Vec4};

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Position {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Normal {
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Tangent {
    pub tangent: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct TexCoord {
    pub uv: [f32; 2],
}

/// Blend weights of the four joints influencing a vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct JointWeights {
    pub weights: [f32; 4],
}

/// Indices of the four joints influencing a vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct JointIndices {
    pub joints: [u32; 4],
}

/// Per-instance model matrix (column-major).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    pub model: [[f32; 4]; 4],
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::from(Mat4::IDENTITY)
    }
}

/// Camera block bound at binding 0 of every surface pipeline.
///
/// `transform_length` is the number of joint matrices per instance in the
/// joint palette: instance `i` reads matrices starting at
/// `transform_length * i`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub padding: f32,
    pub light_position: [f32; 3],
    pub transform_length: u32,
}

impl CameraUniform {
    pub fn new(view_proj: Mat4, camera_position: Vec3, light_position: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.to_array(),
            padding: 0.0,
            light_position: light_position.to_array(),
            transform_length: 0,
        }
    }

    pub fn with_transform_length(mut self, transform_length: u32) -> Self {
        self.transform_length = transform_length;
        self
    }

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    #[inline]
    pub fn camera_position(&self) -> Vec3 {
        Vec3::from_array(self.camera_position)
    }

    #[inline]
    pub fn light_position(&self) -> Vec3 {
        Vec3::from_array(self.light_position)
    }
}

/// Material block bound at binding 1 of every surface pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Linear straight-alpha RGBA base color factor.
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub padding: [f32; 2], // 16-byte struct size
}

impl MaterialUniform {
    pub fn new(color: Vec4, metalness: f32, roughness: f32) -> Self {
        Self {
            color: color.to_array(),
            metalness,
            roughness,
            padding: [0.0; 2],
        }
    }

    #[inline]
    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

impl Default for MaterialUniform {
    fn default() -> Self {
        Self::new(Vec4::ONE, 1.0, 1.0)
    }
}

// ── glam conversions ──────────────────────────────────────────────────────

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self { position: v.to_array() }
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::from_array(p.position)
    }
}

impl From<Vec3> for Normal {
    fn from(v: Vec3) -> Self {
        Self { normal: v.to_array() }
    }
}

impl From<Normal> for Vec3 {
    fn from(n: Normal) -> Self {
        Vec3::from_array(n.normal)
    }
}

impl From<Vec3> for Tangent {
    fn from(v: Vec3) -> Self {
        Self { tangent: v.to_array() }
    }
}

impl From<Tangent> for Vec3 {
    fn from(t: Tangent) -> Self {
        Vec3::from_array(t.tangent)
    }
}

impl From<Vec2> for TexCoord {
    fn from(v: Vec2) -> Self {
        Self { uv: v.to_array() }
    }
}

impl From<TexCoord> for Vec2 {
    fn from(t: TexCoord) -> Self {
        Vec2::from_array(t.uv)
    }
}

impl From<Vec4> for JointWeights {
    fn from(v: Vec4) -> Self {
        Self { weights: v.to_array() }
    }
}

impl From<JointWeights> for Vec4 {
    fn from(w: JointWeights) -> Self {
        Vec4::from_array(w.weights)
    }
}

impl From<UVec4> for JointIndices {
    fn from(v: UVec4) -> Self {
        Self { joints: v.to_array() }
    }
}

impl From<JointIndices> for UVec4 {
    fn from(j: JointIndices) -> Self {
        UVec4::from_array(j.joints)
    }
}

impl From<Mat4> for InstanceTransform {
    fn from(m: Mat4) -> Self {
        Self { model: m.to_cols_array_2d() }
    }
}

impl From<InstanceTransform> for Mat4 {
    fn from(t: InstanceTransform) -> Self {
        Mat4::from_cols_array_2d(&t.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn record_sizes_match_wgsl_layouts() {
        assert_eq!(size_of::<Position>(), 12);
        assert_eq!(size_of::<TexCoord>(), 8);
        assert_eq!(size_of::<JointWeights>(), 16);
        assert_eq!(size_of::<JointIndices>(), 16);
        assert_eq!(size_of::<InstanceTransform>(), 64);
        assert_eq!(size_of::<CameraUniform>(), 96);
        assert_eq!(size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn transform_length_sits_after_light_position() {
        let camera = CameraUniform::new(Mat4::IDENTITY, Vec3::ZERO, Vec3::ONE)
            .with_transform_length(7);
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&camera));
        assert_eq!(words[23], 7);
        assert_eq!(f32::from_bits(words[20]), 1.0);
    }

    #[test]
    fn instance_transform_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let t = InstanceTransform::from(m);
        assert_eq!(t.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(Mat4::from(t), m);
    }
}
