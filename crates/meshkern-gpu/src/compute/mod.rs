//! Compute kernels.
//!
//! Each kernel owns its pipeline and bind group layout, built lazily on first
//! use. Two ways in:
//! - `encode` records a dispatch over caller-owned storage buffers;
//! - the slice-based helpers upload, dispatch and read back in one call.

mod common;
mod ctx;

pub mod gather;
pub mod joints;
pub mod normals;
pub mod tangents;

pub use common::{output_buffer, storage_buffer};
pub use ctx::ComputeCtx;
pub use gather::{GatherKernels, GatherVariant};
pub use joints::JointRemapKernel;
pub use normals::FlatNormalKernel;
pub use tangents::TangentKernel;
