//! Random indexed test meshes.

use glam::Vec3;
use rand::Rng;
use rand::rngs::StdRng;

/// Indexed mesh with every attribute the compute kernels touch.
pub struct IndexedMesh {
    /// Flat, 3 floats per vertex.
    pub positions: Vec<f32>,
    /// Flat, 3 floats per vertex.
    pub normals: Vec<f32>,
    pub tex_coords: Vec<[f32; 2]>,
    pub joint_weights: Vec<[f32; 4]>,
    pub joint_indices: Vec<[u32; 4]>,
    /// 3 per triangle.
    pub indices: Vec<u32>,
    /// Number of distinct joints referenced by `joint_indices`.
    pub joint_count: u32,
}

impl IndexedMesh {
    pub fn random(rng: &mut StdRng, triangles: usize) -> Self {
        // Roughly the vertex sharing of a closed triangle mesh.
        let vertices = (triangles / 2).max(3);
        let joint_count = 32;

        let positions = (0..vertices * 3)
            .map(|_| rng.random_range(-1.0..1.0))
            .collect();
        let normals = (0..vertices)
            .flat_map(|_| {
                let n = Vec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                );
                n.normalize_or(Vec3::Z).to_array()
            })
            .collect();
        let tex_coords = (0..vertices).map(|_| [rng.random(), rng.random()]).collect();
        let joint_weights = (0..vertices)
            .map(|_| {
                let w: [f32; 4] = std::array::from_fn(|_| rng.random_range(0.0..1.0));
                let sum: f32 = w.iter().sum::<f32>().max(f32::EPSILON);
                w.map(|x| x / sum)
            })
            .collect();
        let joint_indices = (0..vertices)
            .map(|_| std::array::from_fn(|_| rng.random_range(0..joint_count)))
            .collect();
        let indices = (0..triangles * 3)
            .map(|_| rng.random_range(0..vertices as u32))
            .collect();

        Self {
            positions,
            normals,
            tex_coords,
            joint_weights,
            joint_indices,
            indices,
            joint_count,
        }
    }
}
