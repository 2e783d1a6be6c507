//! Per-triangle tangent generation from texture-coordinate gradients.

use glam::{Vec2, Vec3};

use crate::dispatch::for_each_invocation;
use crate::normals::{TRIANGLE_FLOATS, triangle_vertex, write_triangle_vertex};

/// Floats per triangle in a flat texture-coordinate buffer.
pub const TRIANGLE_UV_FLOATS: usize = 6;

/// One triangle's inputs to tangent generation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TangentTriangle {
    pub positions: [Vec3; 3],
    pub uvs: [Vec2; 3],
    pub normals: [Vec3; 3],
}

/// Tangent used when the UV mapping of a triangle is degenerate.
///
/// Derived from the normal alone: `normalize((-n.y - n.z, n.x, n.x))`. It is
/// not orthogonal to `n` in general.
#[inline]
pub fn fallback_tangent(n: Vec3) -> Vec3 {
    Vec3::new(-n.y - n.z, n.x, n.x).normalize_or_zero()
}

/// Removes the component of `raw` along `normal` and normalizes the rest.
#[inline]
pub fn orthogonalize(raw: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    (raw - n * n.dot(raw)).normalize_or_zero()
}

/// Per-vertex tangents of one triangle.
///
/// When the UV determinant is exactly zero the triangle has no usable
/// gradient and every vertex takes [`fallback_tangent`] of its own normal.
pub fn triangle_tangents(tri: &TangentTriangle) -> [Vec3; 3] {
    let [a, b, c] = tri.positions;
    let [uv_a, uv_b, uv_c] = tri.uvs;

    let ab = b - a;
    let ac = c - a;
    let uv_ab = uv_b - uv_a;
    let uv_ac = uv_c - uv_a;

    let det = uv_ab.x * uv_ac.y - uv_ac.x * uv_ab.y;
    if det != 0.0 {
        let raw = (ab * uv_ac.y - ac * uv_ab.y) / det;
        tri.normals.map(|n| orthogonalize(raw, n))
    } else {
        tri.normals.map(fallback_tangent)
    }
}

/// Reads triangle `tri` from flat position, uv and normal buffers.
fn read_triangle(positions: &[f32], uvs: &[f32], normals: &[f32], tri: usize) -> TangentTriangle {
    let uv = |k: usize| {
        let base = tri * TRIANGLE_UV_FLOATS + k * 2;
        Vec2::new(uvs[base], uvs[base + 1])
    };
    TangentTriangle {
        positions: [0, 1, 2].map(|k| triangle_vertex(positions, tri, k)),
        uvs: [uv(0), uv(1), uv(2)],
        normals: [0, 1, 2].map(|k| triangle_vertex(normals, tri, k)),
    }
}

/// Computes tangents for every whole triangle in `positions`.
///
/// `positions`, `normals` and `tangents` hold 9 floats per triangle and `uvs`
/// holds 6.
///
/// # Panics
/// If `uvs`, `normals` or `tangents` are shorter than the whole triangles in
/// `positions`.
pub fn tangents_pass(positions: &[f32], uvs: &[f32], normals: &[f32], tangents: &mut [f32]) {
    let triangles = positions.len() / TRIANGLE_FLOATS;
    for_each_invocation(triangles, |tri| {
        let input = read_triangle(positions, uvs, normals, tri);
        for (k, t) in triangle_tangents(&input).into_iter().enumerate() {
            write_triangle_vertex(tangents, tri, k, t);
        }
    });
}
