//! Indexed gather: `gathered[i] = source[indices[i]]`.
//!
//! Used to unweld indexed meshes into flat per-corner attribute streams.

use anyhow::Result;

use crate::shaders;

use super::common::{Access, Binding, KernelPipeline, output_buffer, storage_buffer};
use super::ComputeCtx;

/// Source bound whole; indices and output sized to the gathered count.
const fn bindings(element_size: u64) -> [Binding; 3] {
    [
        Binding::whole(Access::Read),
        Binding::per_invocation(Access::Read, 4),
        Binding::per_invocation(Access::ReadWrite, element_size),
    ]
}

static VEC4_BINDINGS: [Binding; 3] = bindings(16);
static UVEC4_BINDINGS: [Binding; 3] = bindings(16);
static VEC3_BINDINGS: [Binding; 3] = bindings(12);
static VEC2_BINDINGS: [Binding; 3] = bindings(8);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GatherVariant {
    /// `vec4<f32>` elements (joint weights).
    Vec4,
    /// `vec4<u32>` elements (joint indices).
    UVec4,
    /// Three floats per element over flat `f32` arrays (positions, normals).
    Vec3,
    /// `vec2<f32>` elements (texture coordinates).
    Vec2,
}

impl GatherVariant {
    /// Bytes per gathered element.
    pub fn element_size(self) -> usize {
        match self {
            Self::Vec4 | Self::UVec4 => 16,
            Self::Vec3 => 12,
            Self::Vec2 => 8,
        }
    }
}

pub struct GatherKernels {
    vec4: KernelPipeline,
    uvec4: KernelPipeline,
    vec3: KernelPipeline,
    vec2: KernelPipeline,
}

impl Default for GatherKernels {
    fn default() -> Self {
        Self {
            vec4: KernelPipeline::new("meshkern gather_vec4", shaders::GATHER_VEC4, &VEC4_BINDINGS),
            uvec4: KernelPipeline::new(
                "meshkern gather_uvec4",
                shaders::GATHER_UVEC4,
                &UVEC4_BINDINGS,
            ),
            vec3: KernelPipeline::new("meshkern gather_vec3", shaders::GATHER_VEC3, &VEC3_BINDINGS),
            vec2: KernelPipeline::new("meshkern gather_vec2", shaders::GATHER_VEC2, &VEC2_BINDINGS),
        }
    }
}

impl GatherKernels {
    pub fn new() -> Self {
        Self::default()
    }

    fn kernel(&mut self, variant: GatherVariant) -> &mut KernelPipeline {
        match variant {
            GatherVariant::Vec4 => &mut self.vec4,
            GatherVariant::UVec4 => &mut self.uvec4,
            GatherVariant::Vec3 => &mut self.vec3,
            GatherVariant::Vec2 => &mut self.vec2,
        }
    }

    /// Records a gather of `count` elements over caller-owned buffers.
    ///
    /// `indices` and `gathered` must hold at least `count` elements; only the
    /// first `count` are read and written. Indices are not checked on the GPU.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        &mut self,
        ctx: &ComputeCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        variant: GatherVariant,
        source: &wgpu::Buffer,
        indices: &wgpu::Buffer,
        gathered: &wgpu::Buffer,
        count: u32,
    ) -> Result<()> {
        self.kernel(variant)
            .encode(ctx, encoder, &[source, indices, gathered], count)
    }

    /// Uploads, gathers and reads back.
    ///
    /// `source` is reinterpreted as elements of `variant.element_size()` bytes.
    /// With `indices = None` the result is a copy of `source`.
    pub fn gather<T: bytemuck::Pod>(
        &mut self,
        ctx: &ComputeCtx<'_>,
        variant: GatherVariant,
        source: &[T],
        indices: Option<&[u32]>,
    ) -> Result<Vec<T>> {
        let element_size = variant.element_size();
        let source_bytes: &[u8] = bytemuck::cast_slice(source);
        anyhow::ensure!(
            source_bytes.len() % element_size == 0,
            "{variant:?} gather: source of {} bytes is not a whole number of {element_size}-byte elements",
            source_bytes.len()
        );

        let Some(indices) = indices else {
            log::debug!("{variant:?} gather without indices: plain copy");
            return Ok(source.to_vec());
        };
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        let elements = source_bytes.len() / element_size;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= elements) {
            anyhow::bail!("{variant:?} gather: index {bad} out of range for {elements} elements");
        }

        let out_bytes = indices.len() * element_size;
        anyhow::ensure!(
            out_bytes % std::mem::size_of::<T>() == 0,
            "{variant:?} gather: output does not split into whole elements of the source type"
        );
        let out_count = out_bytes / std::mem::size_of::<T>();

        let source_buf = storage_buffer(ctx.device, "meshkern gather source", source_bytes);
        let index_buf =
            storage_buffer(ctx.device, "meshkern gather indices", bytemuck::cast_slice(indices));
        let out_buf = output_buffer(ctx.device, "meshkern gather output", out_bytes as u64);

        let mut encoder = ctx.encoder("meshkern gather encoder");
        self.encode(
            ctx,
            &mut encoder,
            variant,
            &source_buf,
            &index_buf,
            &out_buf,
            indices.len() as u32,
        )?;
        ctx.submit(encoder);

        crate::device::read_buffer(ctx.device, ctx.queue, &out_buf, out_count)
    }

    pub fn gather_vec4(
        &mut self,
        ctx: &ComputeCtx<'_>,
        source: &[[f32; 4]],
        indices: Option<&[u32]>,
    ) -> Result<Vec<[f32; 4]>> {
        self.gather(ctx, GatherVariant::Vec4, source, indices)
    }

    pub fn gather_uvec4(
        &mut self,
        ctx: &ComputeCtx<'_>,
        source: &[[u32; 4]],
        indices: Option<&[u32]>,
    ) -> Result<Vec<[u32; 4]>> {
        self.gather(ctx, GatherVariant::UVec4, source, indices)
    }

    /// `source` and the result are flat: 3 floats per element.
    pub fn gather_vec3(
        &mut self,
        ctx: &ComputeCtx<'_>,
        source: &[f32],
        indices: Option<&[u32]>,
    ) -> Result<Vec<f32>> {
        self.gather(ctx, GatherVariant::Vec3, source, indices)
    }

    pub fn gather_vec2(
        &mut self,
        ctx: &ComputeCtx<'_>,
        source: &[[f32; 2]],
        indices: Option<&[u32]>,
    ) -> Result<Vec<[f32; 2]>> {
        self.gather(ctx, GatherVariant::Vec2, source, indices)
    }
}
