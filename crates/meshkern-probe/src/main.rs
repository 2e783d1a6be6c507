mod mesh;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use glam::UVec4;
use rand::SeedableRng;
use rand::rngs::StdRng;

use meshkern_core::gather::{gather_pass, gather_vec3_pass};
use meshkern_core::joints::{compose_mappings, remap_joints_pass};
use meshkern_core::normals::flat_normals_pass;
use meshkern_core::tangents::tangents_pass;
use meshkern_gpu::compute::{FlatNormalKernel, GatherKernels, JointRemapKernel, TangentKernel};
use meshkern_gpu::device::{Gpu, GpuInit};
use meshkern_gpu::logging::{LoggingConfig, init_logging};

use mesh::IndexedMesh;
use report::Check;

/// Runs every compute kernel on the GPU against a random mesh and compares
/// the output with the CPU reference.
#[derive(Parser, Debug)]
#[command(name = "meshkern-probe", version, about)]
struct Args {
    /// Triangles in the generated mesh.
    #[arg(long, default_value_t = 256)]
    triangles: usize,

    /// Seed for the generated mesh.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Use a software adapter.
    #[arg(long)]
    fallback_adapter: bool,

    /// Log filter, `env_logger` syntax. Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

const FLOAT_TOLERANCE: f32 = 1e-4;
const TANGENT_TOLERANCE: f32 = 1e-3;

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log.clone().map(LoggingConfig::with_filter).unwrap_or_default());

    let init = if args.fallback_adapter {
        GpuInit::fallback()
    } else {
        GpuInit::default()
    };
    let gpu = Gpu::new_blocking(init).context("no usable GPU")?;
    let info = gpu.adapter_info();
    println!("adapter: {} ({:?})", info.name, info.backend);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mesh = IndexedMesh::random(&mut rng, args.triangles);
    log::info!(
        "mesh: {} triangles, {} vertices, seed {}",
        args.triangles,
        mesh.tex_coords.len(),
        args.seed
    );

    let checks = run_checks(&gpu, &mesh, &mut rng)?;

    for check in &checks {
        println!("{check}");
    }

    let failed = checks.iter().filter(|c| !c.passed()).count();
    anyhow::ensure!(failed == 0, "{failed} kernel(s) disagree with the CPU reference");
    println!("all {} kernels agree", checks.len());
    Ok(())
}

fn run_checks(gpu: &Gpu, mesh: &IndexedMesh, rng: &mut StdRng) -> Result<Vec<Check>> {
    let ctx = gpu.compute_ctx();
    let mut gather = GatherKernels::new();
    let corners = mesh.indices.len();
    let mut checks = Vec::new();

    // ── unweld ────────────────────────────────────────────────────────────

    let positions = gather
        .gather_vec3(&ctx, &mesh.positions, Some(&mesh.indices))
        .context("gather_vec3 (positions)")?;
    let mut cpu_positions = vec![0.0; corners * 3];
    gather_vec3_pass(&mesh.positions, &mesh.indices, &mut cpu_positions);
    checks.push(Check::exact("gather_vec3", &positions, &cpu_positions));

    let normals = gather
        .gather_vec3(&ctx, &mesh.normals, Some(&mesh.indices))
        .context("gather_vec3 (normals)")?;

    let tex_coords = gather
        .gather_vec2(&ctx, &mesh.tex_coords, Some(&mesh.indices))
        .context("gather_vec2")?;
    let mut cpu_tex_coords = vec![[0.0; 2]; corners];
    gather_pass(&mesh.tex_coords, &mesh.indices, &mut cpu_tex_coords);
    checks.push(Check::exact("gather_vec2", &tex_coords, &cpu_tex_coords));

    let weights = gather
        .gather_vec4(&ctx, &mesh.joint_weights, Some(&mesh.indices))
        .context("gather_vec4")?;
    let mut cpu_weights = vec![[0.0; 4]; corners];
    gather_pass(&mesh.joint_weights, &mesh.indices, &mut cpu_weights);
    checks.push(Check::exact("gather_vec4", &weights, &cpu_weights));

    let joints = gather
        .gather_uvec4(&ctx, &mesh.joint_indices, Some(&mesh.indices))
        .context("gather_uvec4")?;
    let mut cpu_joints = vec![[0; 4]; corners];
    gather_pass(&mesh.joint_indices, &mesh.indices, &mut cpu_joints);
    checks.push(Check::exact("gather_uvec4", &joints, &cpu_joints));

    // ── joints ────────────────────────────────────────────────────────────

    // Two remaps on the GPU against one composed remap on the CPU.
    let first = random_mapping(rng, mesh.joint_count);
    let second = random_mapping(rng, mesh.joint_count);
    let mut remapper = JointRemapKernel::new();
    let once = remapper.remap(&ctx, &joints, &first).context("remap_joints")?;
    let twice = remapper.remap(&ctx, &once, &second).context("remap_joints")?;

    let mut cpu_remapped: Vec<UVec4> = cpu_joints.iter().map(|&j| UVec4::from_array(j)).collect();
    remap_joints_pass(&mut cpu_remapped, &compose_mappings(&first, &second));
    let cpu_remapped: Vec<[u32; 4]> = cpu_remapped.iter().map(|j| j.to_array()).collect();
    checks.push(Check::exact("remap_joints", &twice, &cpu_remapped));

    // ── derived attributes ────────────────────────────────────────────────

    let flat = FlatNormalKernel::new()
        .compute(&ctx, &positions)
        .context("flat_normals")?;
    let mut cpu_flat = vec![0.0; positions.len()];
    flat_normals_pass(&positions, &mut cpu_flat);
    checks.push(Check::floats("flat_normals", &flat, &cpu_flat, FLOAT_TOLERANCE));

    let flat_uvs: Vec<f32> = tex_coords.iter().flatten().copied().collect();
    let tangents = TangentKernel::new()
        .compute(&ctx, &positions, &flat_uvs, &normals)
        .context("tangents")?;
    let mut cpu_tangents = vec![0.0; positions.len()];
    tangents_pass(&positions, &flat_uvs, &normals, &mut cpu_tangents);
    checks.push(Check::floats("tangents", &tangents, &cpu_tangents, TANGENT_TOLERANCE));

    Ok(checks)
}

fn random_mapping(rng: &mut StdRng, joints: u32) -> Vec<u32> {
    use rand::Rng;
    (0..joints).map(|_| rng.random_range(0..joints)).collect()
}
