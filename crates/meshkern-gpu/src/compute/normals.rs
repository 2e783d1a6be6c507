//! Flat per-triangle normals.

use anyhow::Result;

use meshkern_core::normals::TRIANGLE_FLOATS;

use crate::shaders;

use super::common::{Access, Binding, KernelPipeline, output_buffer, storage_buffer};
use super::ComputeCtx;

const TRIANGLE_BYTES: u64 = (TRIANGLE_FLOATS * 4) as u64;

static BINDINGS: [Binding; 2] = [
    Binding::per_invocation(Access::Read, TRIANGLE_BYTES),
    Binding::per_invocation(Access::ReadWrite, TRIANGLE_BYTES),
];

pub struct FlatNormalKernel {
    kernel: KernelPipeline,
}

impl Default for FlatNormalKernel {
    fn default() -> Self {
        Self {
            kernel: KernelPipeline::new("meshkern flat_normals", shaders::FLAT_NORMALS, &BINDINGS),
        }
    }
}

impl FlatNormalKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records normal generation for the first `triangles` triangles. Both
    /// buffers hold 9 floats per triangle.
    pub fn encode(
        &mut self,
        ctx: &ComputeCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        positions: &wgpu::Buffer,
        normals: &wgpu::Buffer,
        triangles: u32,
    ) -> Result<()> {
        self.kernel.encode(ctx, encoder, &[positions, normals], triangles)
    }

    /// Computes flat normals for an unindexed triangle list.
    pub fn compute(&mut self, ctx: &ComputeCtx<'_>, positions: &[f32]) -> Result<Vec<f32>> {
        anyhow::ensure!(
            positions.len() % TRIANGLE_FLOATS == 0,
            "position buffer of {} floats is not a whole number of triangles",
            positions.len()
        );
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let triangles = positions.len() / TRIANGLE_FLOATS;

        let position_buf =
            storage_buffer(ctx.device, "meshkern positions", bytemuck::cast_slice(positions));
        let normal_buf = output_buffer(
            ctx.device,
            "meshkern flat normals",
            std::mem::size_of_val(positions) as u64,
        );

        let mut encoder = ctx.encoder("meshkern flat_normals encoder");
        self.encode(ctx, &mut encoder, &position_buf, &normal_buf, triangles as u32)?;
        ctx.submit(encoder);

        crate::device::read_buffer(ctx.device, ctx.queue, &normal_buf, positions.len())
    }
}
