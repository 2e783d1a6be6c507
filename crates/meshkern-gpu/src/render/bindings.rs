//! Bind group 0 layout of the surface pipelines.

use meshkern_core::records::{CameraUniform, MaterialUniform};

use super::MeshVariant;

pub const CAMERA: u32 = 0;
pub const MATERIAL: u32 = 1;
/// Skinned variants only.
pub const JOINT_MATRICES: u32 = 2;
pub const SAMPLER: u32 = 3;
pub const ALBEDO: u32 = 4;
pub const METAL_ROUGH: u32 = 5;
/// Normal-mapped variants only.
pub const NORMAL_MAP: u32 = 6;

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Layout entries used by `variant`, in binding order.
pub fn layout_entries(variant: MeshVariant) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![
        uniform_entry(
            CAMERA,
            wgpu::ShaderStages::VERTEX,
            std::mem::size_of::<CameraUniform>(),
        ),
        uniform_entry(
            MATERIAL,
            wgpu::ShaderStages::FRAGMENT,
            std::mem::size_of::<MaterialUniform>(),
        ),
    ];

    if variant.skinned {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: JOINT_MATRICES,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }

    if variant.kind.has_tex_coords() {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        entries.push(texture_entry(ALBEDO));
        entries.push(texture_entry(METAL_ROUGH));
    }

    if variant.kind.has_tangents() {
        entries.push(texture_entry(NORMAL_MAP));
    }

    entries
}

#[cfg(test)]
mod tests {
    use meshkern_core::skinning::SurfaceKind;

    use super::*;

    fn bindings(variant: MeshVariant) -> Vec<u32> {
        layout_entries(variant).iter().map(|e| e.binding).collect()
    }

    #[test]
    fn bindings_per_variant() {
        assert_eq!(bindings(MeshVariant::still(SurfaceKind::Basic)), vec![0, 1]);
        assert_eq!(bindings(MeshVariant::skinned(SurfaceKind::Basic)), vec![0, 1, 2]);
        assert_eq!(bindings(MeshVariant::still(SurfaceKind::Textured)), vec![0, 1, 3, 4, 5]);
        assert_eq!(
            bindings(MeshVariant::skinned(SurfaceKind::NormalMapped)),
            vec![0, 1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn uniforms_have_exact_min_size() {
        let entries = layout_entries(MeshVariant::still(SurfaceKind::Basic));
        let sizes: Vec<_> = entries
            .iter()
            .map(|e| match e.ty {
                wgpu::BindingType::Buffer { min_binding_size, .. } => {
                    min_binding_size.map(|s| s.get())
                }
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![Some(96), Some(32)]);
    }
}
