//! Shared pipeline and buffer plumbing for the compute kernels.

use anyhow::Result;
use wgpu::util::DeviceExt;

use meshkern_core::workgroup_count;

use crate::shaders::COMPUTE_ENTRY;

use super::ComputeCtx;

// ── bindings ──────────────────────────────────────────────────────────────

/// How a kernel uses the storage buffer at one binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum Access {
    Read,
    ReadWrite,
}

/// How much of a buffer one dispatch binds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum Extent {
    /// Addressed through data (gather sources, remap tables).
    Whole,
    /// Bytes per invocation. The binding is cut to `invocations * stride`
    /// bytes, so `arrayLength` in the shader equals the dispatched count.
    PerInvocation(u64),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) struct Binding {
    access: Access,
    extent: Extent,
}

impl Binding {
    pub(super) const fn whole(access: Access) -> Self {
        Self {
            access,
            extent: Extent::Whole,
        }
    }

    pub(super) const fn per_invocation(access: Access, stride: u64) -> Self {
        Self {
            access,
            extent: Extent::PerInvocation(stride),
        }
    }

    /// Bytes bound for `invocations` threads; `None` binds the whole buffer.
    fn bound_size(self, invocations: u32) -> Option<u64> {
        match self.extent {
            Extent::Whole => None,
            Extent::PerInvocation(stride) => Some(stride * u64::from(invocations)),
        }
    }
}

fn storage_entry(binding: u32, access: Access) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage {
                read_only: access == Access::Read,
            },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// One compute kernel: WGSL source, binding table and the lazily built
/// pipeline objects.
pub(super) struct KernelPipeline {
    label: &'static str,
    source: &'static str,
    bindings: &'static [Binding],

    pipeline: Option<wgpu::ComputePipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
}

impl KernelPipeline {
    pub(super) const fn new(
        label: &'static str,
        source: &'static str,
        bindings: &'static [Binding],
    ) -> Self {
        Self {
            label,
            source,
            bindings,
            pipeline: None,
            bind_group_layout: None,
        }
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device) {
        if self.pipeline.is_some() && self.bind_group_layout.is_some() {
            return;
        }

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label),
            source: wgpu::ShaderSource::Wgsl(self.source.into()),
        });

        let entries: Vec<_> = self
            .bindings
            .iter()
            .enumerate()
            .map(|(i, b)| storage_entry(i as u32, b.access))
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(self.label),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(self.label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(self.label),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(COMPUTE_ENTRY),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("created compute pipeline {}", self.label);

        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
    }

    /// Records one dispatch of `invocations` threads with `buffers` bound in
    /// binding order. Zero invocations record nothing.
    ///
    /// Per-invocation buffers may be larger than needed; only the first
    /// `invocations` elements are visible to the shader.
    pub(super) fn encode(
        &mut self,
        ctx: &ComputeCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        buffers: &[&wgpu::Buffer],
        invocations: u32,
    ) -> Result<()> {
        anyhow::ensure!(
            buffers.len() == self.bindings.len(),
            "{}: expected {} buffers, got {}",
            self.label,
            self.bindings.len(),
            buffers.len()
        );
        if invocations == 0 {
            return Ok(());
        }

        let mut entries = Vec::with_capacity(buffers.len());
        for (i, (&buffer, binding)) in buffers.iter().zip(self.bindings).enumerate() {
            let size = binding.bound_size(invocations);
            if let Some(bytes) = size {
                anyhow::ensure!(
                    buffer.size() >= bytes,
                    "{}: binding {i} holds {} bytes, {invocations} invocations need {bytes}",
                    self.label,
                    buffer.size()
                );
            }
            entries.push(wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: size.and_then(wgpu::BufferSize::new),
                }),
            });
        }

        self.ensure_pipeline(ctx.device);
        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(bgl) = self.bind_group_layout.as_ref() else { return Ok(()) };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: bgl,
            entries: &entries,
        });

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(self.label),
            timestamp_writes: None,
        });
        cpass.set_pipeline(pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(workgroup_count(invocations), 1, 1);
        Ok(())
    }
}

// ── buffers ───────────────────────────────────────────────────────────────

/// Storage buffer initialized with `contents`, usable as kernel input or for
/// in-place kernels, and readable back.
pub fn storage_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST,
    })
}

/// Zeroed storage buffer of `size` bytes for kernel output.
pub fn output_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    log::debug!("allocating {label} ({size} bytes)");
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
