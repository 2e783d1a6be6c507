//! WGSL sources for every kernel.

pub const GATHER_VEC4: &str = include_str!("shaders/gather_vec4.wgsl");
pub const GATHER_UVEC4: &str = include_str!("shaders/gather_uvec4.wgsl");
pub const GATHER_VEC3: &str = include_str!("shaders/gather_vec3.wgsl");
pub const GATHER_VEC2: &str = include_str!("shaders/gather_vec2.wgsl");
pub const REMAP_JOINTS: &str = include_str!("shaders/remap_joints.wgsl");
pub const FLAT_NORMALS: &str = include_str!("shaders/flat_normals.wgsl");
pub const TANGENTS: &str = include_str!("shaders/tangents.wgsl");

/// Vertex stage: `vs_{still,skinned}_{basic,textured,normal_mapped}`.
pub const SKINNING: &str = include_str!("shaders/skinning.wgsl");

/// Fragment stage: `fs_basic`, `fs_textured`, `fs_normal_mapped`.
pub const PBR: &str = include_str!("shaders/pbr.wgsl");

/// Entry point of every compute kernel.
pub const COMPUTE_ENTRY: &str = "main";

/// `(name, source)` of every compute module.
pub const COMPUTE_MODULES: [(&str, &str); 7] = [
    ("gather_vec4", GATHER_VEC4),
    ("gather_uvec4", GATHER_UVEC4),
    ("gather_vec3", GATHER_VEC3),
    ("gather_vec2", GATHER_VEC2),
    ("remap_joints", REMAP_JOINTS),
    ("flat_normals", FLAT_NORMALS),
    ("tangents", TANGENTS),
];

#[cfg(test)]
mod tests {
    use super::*;

    use meshkern_core::WORKGROUP_SIZE;

    fn parse(name: &str, source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name}: {}", e.emit_to_string(source)));
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(e) = validator.validate(&module) {
            panic!("{name}: {}", e.emit_to_string(source));
        }
        module
    }

    /// `(name, group, binding)` of every resource global.
    fn bindings(module: &naga::Module) -> Vec<(String, u32, u32)> {
        let mut out: Vec<_> = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| {
                let b = var.binding.as_ref()?;
                Some((var.name.clone().unwrap_or_default(), b.group, b.binding))
            })
            .collect();
        out.sort_by_key(|(_, _, binding)| *binding);
        out
    }

    fn entry_names(module: &naga::Module, stage: naga::ShaderStage) -> Vec<&str> {
        module
            .entry_points
            .iter()
            .filter(|ep| ep.stage == stage)
            .map(|ep| ep.name.as_str())
            .collect()
    }

    #[test]
    fn compute_modules_validate_with_fixed_workgroup_size() {
        for (name, source) in COMPUTE_MODULES {
            let module = parse(name, source);
            assert_eq!(module.entry_points.len(), 1, "{name}");
            let ep = &module.entry_points[0];
            assert_eq!(ep.name, COMPUTE_ENTRY, "{name}");
            assert_eq!(ep.stage, naga::ShaderStage::Compute, "{name}");
            assert_eq!(ep.workgroup_size, [WORKGROUP_SIZE, 1, 1], "{name}");
        }
    }

    #[test]
    fn gather_bindings() {
        for source in [GATHER_VEC4, GATHER_UVEC4, GATHER_VEC3, GATHER_VEC2] {
            let module = parse("gather", source);
            assert_eq!(
                bindings(&module),
                vec![
                    ("source".to_string(), 0, 0),
                    ("indices".to_string(), 0, 1),
                    ("gathered".to_string(), 0, 2),
                ]
            );
        }
    }

    #[test]
    fn remap_joints_bindings() {
        let module = parse("remap_joints", REMAP_JOINTS);
        assert_eq!(
            bindings(&module),
            vec![("joints".to_string(), 0, 0), ("mapping".to_string(), 0, 1)]
        );
    }

    #[test]
    fn flat_normals_bindings() {
        let module = parse("flat_normals", FLAT_NORMALS);
        assert_eq!(
            bindings(&module),
            vec![("positions".to_string(), 0, 0), ("normals".to_string(), 0, 1)]
        );
    }

    #[test]
    fn tangents_bindings() {
        let module = parse("tangents", TANGENTS);
        assert_eq!(
            bindings(&module),
            vec![
                ("positions".to_string(), 0, 0),
                ("tex_coords".to_string(), 0, 1),
                ("normals".to_string(), 0, 2),
                ("tangents".to_string(), 0, 3),
            ]
        );
    }

    #[test]
    fn skinning_module_has_all_vertex_entries() {
        let module = parse("skinning", SKINNING);
        let mut names = entry_names(&module, naga::ShaderStage::Vertex);
        names.sort_unstable();
        assert_eq!(
            names,
            [
                "vs_skinned_basic",
                "vs_skinned_normal_mapped",
                "vs_skinned_textured",
                "vs_still_basic",
                "vs_still_normal_mapped",
                "vs_still_textured",
            ]
        );
        assert_eq!(
            bindings(&module),
            vec![("camera".to_string(), 0, 0), ("joint_matrices".to_string(), 0, 2)]
        );
    }

    #[test]
    fn pbr_module_has_all_fragment_entries() {
        let module = parse("pbr", PBR);
        let mut names = entry_names(&module, naga::ShaderStage::Fragment);
        names.sort_unstable();
        assert_eq!(names, ["fs_basic", "fs_normal_mapped", "fs_textured"]);
        assert_eq!(
            bindings(&module),
            vec![
                ("material".to_string(), 0, 1),
                ("material_sampler".to_string(), 0, 3),
                ("albedo_texture".to_string(), 0, 4),
                ("metal_rough_texture".to_string(), 0, 5),
                ("normal_texture".to_string(), 0, 6),
            ]
        );
    }

    #[test]
    fn uniform_layouts_match_records() {
        use meshkern_core::{CameraUniform, MaterialUniform};

        let skinning = parse("skinning", SKINNING);
        let pbr = parse("pbr", PBR);

        let struct_size = |module: &naga::Module, name: &str| {
            let mut layouter = naga::proc::Layouter::default();
            layouter.update(module.to_ctx()).unwrap_or_else(|e| panic!("{e}"));
            module
                .types
                .iter()
                .find(|(_, ty)| ty.name.as_deref() == Some(name))
                .map(|(handle, _)| layouter[handle].size)
                .unwrap_or_else(|| panic!("struct {name} not found"))
        };

        assert_eq!(
            struct_size(&skinning, "Camera") as usize,
            std::mem::size_of::<CameraUniform>()
        );
        assert_eq!(
            struct_size(&pbr, "Material") as usize,
            std::mem::size_of::<MaterialUniform>()
        );
    }
}
