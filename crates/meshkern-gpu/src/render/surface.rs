use std::collections::HashMap;

use anyhow::{Context, Result};

use meshkern_core::skinning::SurfaceKind;

use crate::shaders;

use super::bindings;
use super::layout::{self, VertexSlot};

/// One surface pipeline: attribute set plus still or skinned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshVariant {
    pub kind: SurfaceKind,
    pub skinned: bool,
}

impl MeshVariant {
    #[inline]
    pub const fn still(kind: SurfaceKind) -> Self {
        Self { kind, skinned: false }
    }

    #[inline]
    pub const fn skinned(kind: SurfaceKind) -> Self {
        Self { kind, skinned: true }
    }

    /// All six variants.
    pub fn all() -> impl Iterator<Item = MeshVariant> {
        SurfaceKind::ALL
            .into_iter()
            .flat_map(|kind| [Self::still(kind), Self::skinned(kind)])
    }

    pub fn vertex_entry(self) -> &'static str {
        match (self.kind, self.skinned) {
            (SurfaceKind::Basic, false) => "vs_still_basic",
            (SurfaceKind::Textured, false) => "vs_still_textured",
            (SurfaceKind::NormalMapped, false) => "vs_still_normal_mapped",
            (SurfaceKind::Basic, true) => "vs_skinned_basic",
            (SurfaceKind::Textured, true) => "vs_skinned_textured",
            (SurfaceKind::NormalMapped, true) => "vs_skinned_normal_mapped",
        }
    }

    pub fn fragment_entry(self) -> &'static str {
        match self.kind {
            SurfaceKind::Basic => "fs_basic",
            SurfaceKind::Textured => "fs_textured",
            SurfaceKind::NormalMapped => "fs_normal_mapped",
        }
    }
}

/// Formats of the attachments the surface pipelines render into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceTargets {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl Default for SurfaceTargets {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
        }
    }
}

/// Sampler and texture views for textured variants.
#[derive(Copy, Clone)]
pub struct MaterialTextures<'a> {
    pub sampler: &'a wgpu::Sampler,
    pub albedo: &'a wgpu::TextureView,
    pub metal_rough: &'a wgpu::TextureView,
    /// Normal-mapped variants only.
    pub normal_map: Option<&'a wgpu::TextureView>,
}

/// Everything bound in group 0.
#[derive(Copy, Clone)]
pub struct SurfaceResources<'a> {
    pub camera: &'a wgpu::Buffer,
    pub material: &'a wgpu::Buffer,
    /// Skinned variants only.
    pub joint_matrices: Option<&'a wgpu::Buffer>,
    /// Textured and normal-mapped variants only.
    pub textures: Option<MaterialTextures<'a>>,
}

/// Vertex, instance and index buffers of one draw.
#[derive(Copy, Clone)]
pub struct MeshBuffers<'a> {
    pub positions: &'a wgpu::Buffer,
    pub normals: &'a wgpu::Buffer,
    pub tex_coords: Option<&'a wgpu::Buffer>,
    pub tangents: Option<&'a wgpu::Buffer>,
    pub joint_weights: Option<&'a wgpu::Buffer>,
    pub joint_indices: Option<&'a wgpu::Buffer>,
    /// One `InstanceTransform` per instance.
    pub instances: &'a wgpu::Buffer,

    pub vertex_count: u32,
    pub instance_count: u32,
    /// Index buffer, format and index count.
    pub indices: Option<(&'a wgpu::Buffer, wgpu::IndexFormat, u32)>,
}

impl<'a> MeshBuffers<'a> {
    fn slot(&self, slot: VertexSlot) -> Option<&'a wgpu::Buffer> {
        match slot {
            VertexSlot::Position => Some(self.positions),
            VertexSlot::Normal => Some(self.normals),
            VertexSlot::TexCoord => self.tex_coords,
            VertexSlot::Tangent => self.tangents,
            VertexSlot::JointWeights => self.joint_weights,
            VertexSlot::JointIndices => self.joint_indices,
            VertexSlot::Instance => Some(self.instances),
        }
    }
}

/// Renderer for still and skinned meshes with PBR shading.
///
/// Pipelines and bind group layouts are built per [`MeshVariant`] on first
/// use. The attachment formats are fixed at construction.
pub struct SurfaceRenderer {
    targets: SurfaceTargets,

    vertex_module: Option<wgpu::ShaderModule>,
    fragment_module: Option<wgpu::ShaderModule>,

    pipelines: HashMap<MeshVariant, wgpu::RenderPipeline>,
    bind_group_layouts: HashMap<MeshVariant, wgpu::BindGroupLayout>,
}

impl SurfaceRenderer {
    pub fn new(targets: SurfaceTargets) -> Self {
        Self {
            targets,
            vertex_module: None,
            fragment_module: None,
            pipelines: HashMap::new(),
            bind_group_layouts: HashMap::new(),
        }
    }

    /// Records one draw of `mesh` with `variant`.
    ///
    /// `bind_group` must come from [`SurfaceRenderer::create_bind_group`]
    /// for the same variant.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        variant: MeshVariant,
        bind_group: &wgpu::BindGroup,
        mesh: &MeshBuffers<'_>,
    ) -> Result<()> {
        self.ensure_pipeline(device, variant);
        let pipeline = self
            .pipelines
            .get(&variant)
            .with_context(|| format!("no pipeline for {variant:?}"))?;

        let slots = layout::vertex_slots(variant);
        let buffers = slots
            .iter()
            .map(|&slot| {
                mesh.slot(slot)
                    .with_context(|| format!("{variant:?}: missing {slot:?} buffer"))
            })
            .collect::<Result<Vec<_>>>()?;

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        for (i, buffer) in buffers.into_iter().enumerate() {
            pass.set_vertex_buffer(i as u32, buffer.slice(..));
        }

        match mesh.indices {
            Some((index_buffer, format, count)) => {
                pass.set_index_buffer(index_buffer.slice(..), format);
                pass.draw_indexed(0..count, 0, 0..mesh.instance_count);
            }
            None => pass.draw(0..mesh.vertex_count, 0..mesh.instance_count),
        }
        Ok(())
    }

    /// Builds the group 0 bind group for `variant`.
    pub fn create_bind_group(
        &mut self,
        device: &wgpu::Device,
        variant: MeshVariant,
        resources: &SurfaceResources<'_>,
    ) -> Result<wgpu::BindGroup> {
        self.ensure_bind_group_layout(device, variant);
        let bgl = self
            .bind_group_layouts
            .get(&variant)
            .with_context(|| format!("no bind group layout for {variant:?}"))?;

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: bindings::CAMERA,
                resource: resources.camera.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: bindings::MATERIAL,
                resource: resources.material.as_entire_binding(),
            },
        ];

        if variant.skinned {
            let joints = resources
                .joint_matrices
                .with_context(|| format!("{variant:?} needs a joint matrix buffer"))?;
            entries.push(wgpu::BindGroupEntry {
                binding: bindings::JOINT_MATRICES,
                resource: joints.as_entire_binding(),
            });
        }

        if variant.kind.has_tex_coords() {
            let textures = resources
                .textures
                .with_context(|| format!("{variant:?} needs material textures"))?;
            entries.push(wgpu::BindGroupEntry {
                binding: bindings::SAMPLER,
                resource: wgpu::BindingResource::Sampler(textures.sampler),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: bindings::ALBEDO,
                resource: wgpu::BindingResource::TextureView(textures.albedo),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: bindings::METAL_ROUGH,
                resource: wgpu::BindingResource::TextureView(textures.metal_rough),
            });

            if variant.kind.has_tangents() {
                let normal_map = textures
                    .normal_map
                    .with_context(|| format!("{variant:?} needs a normal map"))?;
                entries.push(wgpu::BindGroupEntry {
                    binding: bindings::NORMAL_MAP,
                    resource: wgpu::BindingResource::TextureView(normal_map),
                });
            }
        }

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("meshkern surface bind group"),
            layout: bgl,
            entries: &entries,
        }))
    }

    /// Sampler suited to material textures: linear filtering, repeat wrap.
    pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("meshkern material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        })
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_modules(&mut self, device: &wgpu::Device) {
        if self.vertex_module.is_none() {
            self.vertex_module = Some(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("meshkern skinning shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::SKINNING.into()),
            }));
        }
        if self.fragment_module.is_none() {
            self.fragment_module = Some(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("meshkern pbr shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::PBR.into()),
            }));
        }
    }

    fn ensure_bind_group_layout(&mut self, device: &wgpu::Device, variant: MeshVariant) {
        self.bind_group_layouts.entry(variant).or_insert_with(|| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("meshkern surface bgl"),
                entries: &bindings::layout_entries(variant),
            })
        });
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, variant: MeshVariant) {
        if self.pipelines.contains_key(&variant) {
            return;
        }

        self.ensure_modules(device);
        self.ensure_bind_group_layout(device, variant);

        let Some(vertex_module) = self.vertex_module.as_ref() else { return };
        let Some(fragment_module) = self.fragment_module.as_ref() else { return };
        let Some(bgl) = self.bind_group_layouts.get(&variant) else { return };

        let label = format!("meshkern surface {variant:?}");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&label),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });

        let buffers = layout::vertex_buffer_layouts(variant);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: vertex_module,
                entry_point: Some(variant.vertex_entry()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: fragment_module,
                entry_point: Some(variant.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.targets.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: self.targets.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!("created {label} pipeline");
        self.pipelines.insert(variant, pipeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_distinct_variants() {
        let variants: Vec<_> = MeshVariant::all().collect();
        assert_eq!(variants.len(), 6);
        let mut entries: Vec<_> = variants.iter().map(|v| v.vertex_entry()).collect();
        entries.sort_unstable();
        entries.dedup();
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn still_and_skinned_share_fragment_entry() {
        for kind in SurfaceKind::ALL {
            assert_eq!(
                MeshVariant::still(kind).fragment_entry(),
                MeshVariant::skinned(kind).fragment_entry()
            );
        }
    }

    #[test]
    fn entry_points_exist_in_shaders() {
        for v in MeshVariant::all() {
            assert!(shaders::SKINNING.contains(&format!("fn {}(", v.vertex_entry())), "{v:?}");
            assert!(shaders::PBR.contains(&format!("fn {}(", v.fragment_entry())), "{v:?}");
        }
    }
}
