//! Vertex buffer layouts.
//!
//! Locations: 0 position, 1 normal, 2 uv, 3 tangent, 4 joint weights,
//! 5 joint indices, 6..=9 model matrix columns. Buffer slots follow the same
//! order, skipping attributes the variant does not use, with the instance
//! buffer last.

use meshkern_core::records::{
    InstanceTransform, JointIndices, JointWeights, Normal, Position, Tangent, TexCoord,
};

use super::MeshVariant;

/// A `meshkern-core` record that feeds one vertex buffer slot.
pub trait VertexRecord: bytemuck::Pod {
    const ATTRS: &'static [wgpu::VertexAttribute];
    const STEP_MODE: wgpu::VertexStepMode = wgpu::VertexStepMode::Vertex;

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: Self::STEP_MODE,
            attributes: Self::ATTRS,
        }
    }
}

impl VertexRecord for Position {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![0 => Float32x3];
}

impl VertexRecord for Normal {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![1 => Float32x3];
}

impl VertexRecord for TexCoord {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![2 => Float32x2];
}

impl VertexRecord for Tangent {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![3 => Float32x3];
}

impl VertexRecord for JointWeights {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![4 => Float32x4];
}

impl VertexRecord for JointIndices {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![5 => Uint32x4];
}

impl VertexRecord for InstanceTransform {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        6 => Float32x4, // column 0
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4  // column 3
    ];
    const STEP_MODE: wgpu::VertexStepMode = wgpu::VertexStepMode::Instance;
}

/// One vertex buffer slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VertexSlot {
    Position,
    Normal,
    TexCoord,
    Tangent,
    JointWeights,
    JointIndices,
    Instance,
}

impl VertexSlot {
    pub fn layout(self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            Self::Position => Position::layout(),
            Self::Normal => Normal::layout(),
            Self::TexCoord => TexCoord::layout(),
            Self::Tangent => Tangent::layout(),
            Self::JointWeights => JointWeights::layout(),
            Self::JointIndices => JointIndices::layout(),
            Self::Instance => InstanceTransform::layout(),
        }
    }
}

/// Buffer slots used by `variant`, in slot order.
pub fn vertex_slots(variant: MeshVariant) -> Vec<VertexSlot> {
    let mut slots = vec![VertexSlot::Position, VertexSlot::Normal];
    if variant.kind.has_tex_coords() {
        slots.push(VertexSlot::TexCoord);
    }
    if variant.kind.has_tangents() {
        slots.push(VertexSlot::Tangent);
    }
    if variant.skinned {
        slots.push(VertexSlot::JointWeights);
        slots.push(VertexSlot::JointIndices);
    }
    slots.push(VertexSlot::Instance);
    slots
}

pub fn vertex_buffer_layouts(variant: MeshVariant) -> Vec<wgpu::VertexBufferLayout<'static>> {
    vertex_slots(variant).into_iter().map(VertexSlot::layout).collect()
}

#[cfg(test)]
mod tests {
    use meshkern_core::skinning::SurfaceKind;

    use super::*;

    fn locations(variant: MeshVariant) -> Vec<u32> {
        vertex_buffer_layouts(variant)
            .iter()
            .flat_map(|l| l.attributes.iter().map(|a| a.shader_location))
            .collect()
    }

    #[test]
    fn still_basic_uses_position_normal_and_instance() {
        let v = MeshVariant::still(SurfaceKind::Basic);
        assert_eq!(locations(v), vec![0, 1, 6, 7, 8, 9]);
    }

    #[test]
    fn skinned_normal_mapped_uses_every_location() {
        let v = MeshVariant::skinned(SurfaceKind::NormalMapped);
        assert_eq!(locations(v), (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn instance_buffer_is_last_and_per_instance() {
        for kind in SurfaceKind::ALL {
            for v in [MeshVariant::still(kind), MeshVariant::skinned(kind)] {
                let layouts = vertex_buffer_layouts(v);
                let (last, rest) = layouts.split_last().unwrap_or_else(|| panic!("{v:?}"));
                assert_eq!(last.step_mode, wgpu::VertexStepMode::Instance);
                assert_eq!(last.array_stride, 64);
                assert!(rest.iter().all(|l| l.step_mode == wgpu::VertexStepMode::Vertex));
            }
        }
    }

    #[test]
    fn model_columns_are_consecutive() {
        let offsets: Vec<u64> = InstanceTransform::ATTRS.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48]);
    }
}
