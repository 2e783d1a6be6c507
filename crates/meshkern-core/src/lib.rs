//! meshkern core crate.
//!
//! Every kernel in this crate is a pure function of one invocation's inputs:
//! one gathered element, one triangle, one vertex or one fragment. The GPU
//! versions in `meshkern-gpu` implement the same arithmetic in WGSL; this crate
//! is the reference they are tested against.
//!
//! Conventions:
//! - Matrices are column-major (`glam` and WGSL agree).
//! - Every normalization maps a zero-length vector to zero instead of NaN.

pub mod dispatch;
pub mod records;
pub mod texels;

pub mod gather;
pub mod joints;
pub mod normals;
pub mod tangents;

pub mod pbr;
pub mod skinning;

pub use dispatch::{WORKGROUP_SIZE, for_each_invocation, workgroup_count};
pub use records::{
    CameraUniform, InstanceTransform, JointIndices, JointWeights, MaterialUniform, Normal,
    Position, Tangent, TexCoord,
};
