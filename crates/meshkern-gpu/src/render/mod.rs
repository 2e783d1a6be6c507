//! Surface rendering: the skinning vertex stage and the PBR fragment stage.
//!
//! Meshes are drawn from one vertex buffer per attribute plus one
//! per-instance buffer of model matrices. Locations, buffer slots and bind
//! group bindings are fixed (see [`layout`] and [`bindings`]).

pub mod bindings;
pub mod layout;

mod surface;
mod texture;

pub use surface::{
    MaterialTextures, MeshBuffers, MeshVariant, SurfaceRenderer, SurfaceResources,
    SurfaceTargets,
};
pub use texture::{camera_buffer, joint_palette_buffer, material_buffer, upload_texture};
