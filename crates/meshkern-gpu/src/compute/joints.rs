//! In-place joint index remap.

use anyhow::Result;

use crate::shaders;

use super::common::{Access, Binding, KernelPipeline, storage_buffer};
use super::ComputeCtx;

static BINDINGS: [Binding; 2] = [
    Binding::per_invocation(Access::ReadWrite, 16),
    Binding::whole(Access::Read),
];

pub struct JointRemapKernel {
    kernel: KernelPipeline,
}

impl Default for JointRemapKernel {
    fn default() -> Self {
        Self {
            kernel: KernelPipeline::new("meshkern remap_joints", shaders::REMAP_JOINTS, &BINDINGS),
        }
    }
}

impl JointRemapKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an in-place remap of the first `count` `vec4<u32>` entries of
    /// `joints`. Entries past `count` are left untouched.
    pub fn encode(
        &mut self,
        ctx: &ComputeCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        joints: &wgpu::Buffer,
        mapping: &wgpu::Buffer,
        count: u32,
    ) -> Result<()> {
        self.kernel.encode(ctx, encoder, &[joints, mapping], count)
    }

    /// Remaps `joints` through `mapping` on the GPU and returns the result.
    pub fn remap(
        &mut self,
        ctx: &ComputeCtx<'_>,
        joints: &[[u32; 4]],
        mapping: &[u32],
    ) -> Result<Vec<[u32; 4]>> {
        if joints.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = joints.iter().flatten().find(|&&j| j as usize >= mapping.len()) {
            anyhow::bail!("joint {bad} out of range for a mapping of {} entries", mapping.len());
        }

        let joint_buf = storage_buffer(ctx.device, "meshkern joints", bytemuck::cast_slice(joints));
        let mapping_buf =
            storage_buffer(ctx.device, "meshkern joint mapping", bytemuck::cast_slice(mapping));

        let mut encoder = ctx.encoder("meshkern remap_joints encoder");
        self.encode(ctx, &mut encoder, &joint_buf, &mapping_buf, joints.len() as u32)?;
        ctx.submit(encoder);

        crate::device::read_buffer(ctx.device, ctx.queue, &joint_buf, joints.len())
    }
}
