//! Flat (per-face) normal generation for meshes that ship without normals.

use glam::Vec3;

use crate::dispatch::for_each_invocation;

/// Floats per triangle in a flat position or normal buffer.
pub const TRIANGLE_FLOATS: usize = 9;

/// Reads vertex `k` (0..3) of triangle `tri` from a flat float buffer.
#[inline]
pub(crate) fn triangle_vertex(data: &[f32], tri: usize, k: usize) -> Vec3 {
    let base = tri * TRIANGLE_FLOATS + k * 3;
    Vec3::new(data[base], data[base + 1], data[base + 2])
}

/// Writes vertex `k` (0..3) of triangle `tri` into a flat float buffer.
#[inline]
pub(crate) fn write_triangle_vertex(data: &mut [f32], tri: usize, k: usize, v: Vec3) {
    let base = tri * TRIANGLE_FLOATS + k * 3;
    data[base] = v.x;
    data[base + 1] = v.y;
    data[base + 2] = v.z;
}

/// Face normal of triangle `(a, b, c)`: `normalize((b - a) × (c - a))`.
///
/// Zero-area triangles return the zero vector.
#[inline]
pub fn flat_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Writes each triangle's face normal to its three vertices.
///
/// Both buffers hold 9 floats per triangle; trailing floats that do not form
/// a whole triangle are left untouched.
///
/// # Panics
/// If `normals` is shorter than the whole triangles in `positions`.
pub fn flat_normals_pass(positions: &[f32], normals: &mut [f32]) {
    let triangles = positions.len() / TRIANGLE_FLOATS;
    for_each_invocation(triangles, |tri| {
        let n = flat_normal(
            triangle_vertex(positions, tri, 0),
            triangle_vertex(positions, tri, 1),
            triangle_vertex(positions, tri, 2),
        );
        for k in 0..3 {
            write_triangle_vertex(normals, tri, k, n);
        }
    });
}
