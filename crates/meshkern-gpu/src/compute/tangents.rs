//! Per-triangle tangents.

use anyhow::Result;

use meshkern_core::normals::TRIANGLE_FLOATS;
use meshkern_core::tangents::TRIANGLE_UV_FLOATS;

use crate::shaders;

use super::common::{Access, Binding, KernelPipeline, output_buffer, storage_buffer};
use super::ComputeCtx;

const TRIANGLE_BYTES: u64 = (TRIANGLE_FLOATS * 4) as u64;
const TRIANGLE_UV_BYTES: u64 = (TRIANGLE_UV_FLOATS * 4) as u64;

static BINDINGS: [Binding; 4] = [
    Binding::per_invocation(Access::Read, TRIANGLE_BYTES),
    Binding::per_invocation(Access::Read, TRIANGLE_UV_BYTES),
    Binding::per_invocation(Access::Read, TRIANGLE_BYTES),
    Binding::per_invocation(Access::ReadWrite, TRIANGLE_BYTES),
];

pub struct TangentKernel {
    kernel: KernelPipeline,
}

impl Default for TangentKernel {
    fn default() -> Self {
        Self {
            kernel: KernelPipeline::new("meshkern tangents", shaders::TANGENTS, &BINDINGS),
        }
    }
}

impl TangentKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records tangent generation for the first `triangles` triangles.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        &mut self,
        ctx: &ComputeCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        positions: &wgpu::Buffer,
        tex_coords: &wgpu::Buffer,
        normals: &wgpu::Buffer,
        tangents: &wgpu::Buffer,
        triangles: u32,
    ) -> Result<()> {
        self.kernel
            .encode(ctx, encoder, &[positions, tex_coords, normals, tangents], triangles)
    }

    /// Computes tangents for an unindexed triangle list.
    ///
    /// `positions` and `normals` hold 9 floats per triangle, `tex_coords` 6.
    pub fn compute(
        &mut self,
        ctx: &ComputeCtx<'_>,
        positions: &[f32],
        tex_coords: &[f32],
        normals: &[f32],
    ) -> Result<Vec<f32>> {
        anyhow::ensure!(
            positions.len() % TRIANGLE_FLOATS == 0,
            "position buffer of {} floats is not a whole number of triangles",
            positions.len()
        );
        let triangles = positions.len() / TRIANGLE_FLOATS;
        anyhow::ensure!(
            normals.len() == positions.len(),
            "expected {} normal floats, got {}",
            positions.len(),
            normals.len()
        );
        anyhow::ensure!(
            tex_coords.len() == triangles * TRIANGLE_UV_FLOATS,
            "expected {} tex coord floats, got {}",
            triangles * TRIANGLE_UV_FLOATS,
            tex_coords.len()
        );
        if triangles == 0 {
            return Ok(Vec::new());
        }

        let position_buf =
            storage_buffer(ctx.device, "meshkern positions", bytemuck::cast_slice(positions));
        let uv_buf =
            storage_buffer(ctx.device, "meshkern tex coords", bytemuck::cast_slice(tex_coords));
        let normal_buf =
            storage_buffer(ctx.device, "meshkern normals", bytemuck::cast_slice(normals));
        let tangent_buf = output_buffer(
            ctx.device,
            "meshkern tangents",
            std::mem::size_of_val(positions) as u64,
        );

        let mut encoder = ctx.encoder("meshkern tangents encoder");
        self.encode(
            ctx,
            &mut encoder,
            &position_buf,
            &uv_buf,
            &normal_buf,
            &tangent_buf,
            triangles as u32,
        )?;
        ctx.submit(encoder);

        crate::device::read_buffer(ctx.device, ctx.queue, &tangent_buf, positions.len())
    }
}
