//! meshkern GPU crate.
//!
//! WGSL versions of every `meshkern-core` kernel, the wgpu pipelines and bind
//! group layouts that run them, and a headless device to run them on.
//!
//! Convention:
//! - Compute kernels use bind group 0, entry point `main`, workgroup size 64.
//! - Surface pipelines use bind group 0 with a fixed binding per resource
//!   (see [`render::bindings`]).

pub mod device;
pub mod logging;

pub mod compute;
pub mod render;
pub mod shaders;

pub use meshkern_core;
