//! Indexed gather ("unindexing"): expands indexed vertex data into one element
//! per index, so that `output[i] = input[index[i]]`.
//!
//! Indices are trusted. An index past the end of `input` panics here and is
//! clamped by WGSL bounds checks on the GPU; neither is reported.

use crate::dispatch::for_each_invocation;

/// Gathers one element (vec4, uvec4 and vec2 variants).
#[inline]
pub fn gather<T: Copy>(input: &[T], index: &[u32], id: usize) -> T {
    input[index[id] as usize]
}

/// Gathers one 3-float element from a flat float array.
///
/// Three-component vectors are stored tightly packed (stride 12), so the
/// components are moved one by one rather than as a vector.
#[inline]
pub fn gather_vec3(input: &[f32], index: &[u32], id: usize) -> [f32; 3] {
    let src = index[id] as usize * 3;
    [input[src], input[src + 1], input[src + 2]]
}

/// Runs [`gather`] for every index. `output` must hold `index.len()` elements.
///
/// # Panics
/// If `output` is shorter than `index` or an index is out of range.
pub fn gather_pass<T: Copy>(input: &[T], index: &[u32], output: &mut [T]) {
    for_each_invocation(index.len(), |id| {
        output[id] = gather(input, index, id);
    });
}

/// Runs [`gather_vec3`] for every index. `output` must hold `3 * index.len()` floats.
///
/// # Panics
/// If `output` is too short or an index is out of range.
pub fn gather_vec3_pass(input: &[f32], index: &[u32], output: &mut [f32]) {
    for_each_invocation(index.len(), |id| {
        let [x, y, z] = gather_vec3(input, index, id);
        let dst = id * 3;
        output[dst] = x;
        output[dst + 1] = y;
        output[dst + 2] = z;
    });
}
