//! Fragment stage: metal/roughness microfacet shading.
//!
//! Specular lobe: GGX distribution with `a2 = roughness^4`, height-correlated
//! Smith visibility and Schlick Fresnel. It is blended with a Lambert diffuse
//! term by metalness, and both sides carry a constant ambient term.
//!
//! Two gating policies exist and are kept apart:
//! - [`SpecularGate::LightAndView`]: the lobe is zero unless `N·L > 0` and
//!   `N·V > 0`. Used by the basic and textured surfaces.
//! - [`SpecularGate::HalfVector`]: `N·L` and `N·V` are taken as absolute
//!   values and the lobe is zero unless `N·H > 0`. Used by normal-mapped
//!   surfaces, where the perturbed normal may face away from the light while
//!   the geometric surface does not.

use std::f32::consts::PI;

use glam::{Mat3, Vec3, Vec4, Vec4Swizzles};

use crate::records::MaterialUniform;

/// Constant ambient light intensity.
pub const AMBIENT: f32 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpecularGate {
    LightAndView,
    HalfVector,
}

/// Interpolated values arriving from the vertex stage. Directions need not be
/// unit length; they are renormalized here.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FragmentInput {
    pub normal: Vec3,
    pub light_dir: Vec3,
    pub camera_dir: Vec3,
    pub tangent: Vec3,
}

/// Resolved surface parameters for one fragment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSample {
    pub base_color: Vec4,
    pub metalness: f32,
    pub roughness: f32,
}

impl SurfaceSample {
    pub fn from_material(material: &MaterialUniform) -> Self {
        Self {
            base_color: material.color(),
            metalness: material.metalness,
            roughness: material.roughness,
        }
    }

    /// Applies the albedo texel and the packed metal/roughness texel
    /// (roughness in green, metalness in blue).
    pub fn textured(material: &MaterialUniform, albedo: Vec4, metal_rough: Vec4) -> Self {
        Self {
            base_color: material.color() * albedo,
            metalness: material.metalness * metal_rough.z,
            roughness: material.roughness * metal_rough.y,
        }
    }
}

/// GGX normal distribution with `a2 = roughness^4`.
#[inline]
pub fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a2 = alpha_squared(roughness);
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * d * d)
}

/// Height-correlated Smith visibility. Returns zero when both cosines are zero.
#[inline]
pub fn visibility_smith(n_dot_l: f32, n_dot_v: f32, roughness: f32) -> f32 {
    let a2 = alpha_squared(roughness);
    let ggx_v = n_dot_l * (n_dot_v * n_dot_v * (1.0 - a2) + a2).sqrt();
    let ggx_l = n_dot_v * (n_dot_l * n_dot_l * (1.0 - a2) + a2).sqrt();
    let denom = ggx_v + ggx_l;
    if denom > 0.0 { 0.5 / denom } else { 0.0 }
}

/// Schlick Fresnel approximation.
#[inline]
pub fn fresnel_schlick(f0: Vec3, v_dot_h: f32) -> Vec3 {
    f0 + (Vec3::ONE - f0) * (1.0 - v_dot_h).powi(5)
}

#[inline]
fn alpha_squared(roughness: f32) -> f32 {
    let a = roughness * roughness;
    a * a
}

/// Shades one fragment with the given normal, surface and gating policy.
pub fn shade(
    normal: Vec3,
    light_dir: Vec3,
    camera_dir: Vec3,
    surface: SurfaceSample,
    gate: SpecularGate,
) -> Vec4 {
    let n = normal.normalize_or_zero();
    let l = light_dir.normalize_or_zero();
    let v = camera_dir.normalize_or_zero();
    let h = (l + v).normalize_or_zero();

    let base = surface.base_color.xyz();
    let raw_nl = n.dot(l);
    let raw_nv = n.dot(v);
    let n_dot_h = n.dot(h);

    let (n_dot_l, n_dot_v, lit) = match gate {
        SpecularGate::LightAndView => (raw_nl, raw_nv, raw_nl > 0.0 && raw_nv > 0.0),
        SpecularGate::HalfVector => (raw_nl.abs(), raw_nv.abs(), n_dot_h > 0.0),
    };

    let lobe = if lit {
        let f = fresnel_schlick(base, v.dot(h).max(0.0));
        let d = distribution_ggx(n_dot_h, surface.roughness);
        let vis = visibility_smith(n_dot_l, n_dot_v, surface.roughness);
        f * (d * vis * n_dot_l)
    } else {
        Vec3::ZERO
    };

    let diffuse = base * (AMBIENT + raw_nl.max(0.0));
    let specular = lobe + base * AMBIENT;
    let rgb = diffuse.lerp(specular, surface.metalness);
    rgb.extend(surface.base_color.w)
}

/// Untextured surface: material color and factors only.
pub fn shade_basic(input: &FragmentInput, material: &MaterialUniform) -> Vec4 {
    shade(
        input.normal,
        input.light_dir,
        input.camera_dir,
        SurfaceSample::from_material(material),
        SpecularGate::LightAndView,
    )
}

/// Textured surface with an albedo and a packed metal/roughness texture.
pub fn shade_textured(
    input: &FragmentInput,
    material: &MaterialUniform,
    albedo: Vec4,
    metal_rough: Vec4,
) -> Vec4 {
    shade(
        input.normal,
        input.light_dir,
        input.camera_dir,
        SurfaceSample::textured(material, albedo, metal_rough),
        SpecularGate::LightAndView,
    )
}

/// Textured surface whose normal comes from a tangent-space normal map.
///
/// `normal_texel` is the raw `[0, 1]` texel; it is expanded to `[-1, 1]`.
pub fn shade_normal_mapped(
    input: &FragmentInput,
    material: &MaterialUniform,
    albedo: Vec4,
    metal_rough: Vec4,
    normal_texel: Vec3,
) -> Vec4 {
    let normal = perturb_normal(input.normal, input.tangent, normal_texel);
    shade(
        normal,
        input.light_dir,
        input.camera_dir,
        SurfaceSample::textured(material, albedo, metal_rough),
        SpecularGate::HalfVector,
    )
}

/// Tangent-space normal map lookup: `normalize(TBN * (2 * texel - 1))`.
///
/// The tangent is orthogonalized against the interpolated normal first and
/// the bitangent is `N × T`.
pub fn perturb_normal(normal: Vec3, tangent: Vec3, normal_texel: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    let t = (tangent - n * n.dot(tangent)).normalize_or_zero();
    let b = n.cross(t);
    let tbn = Mat3::from_cols(t, b, n);
    (tbn * (normal_texel * 2.0 - Vec3::ONE)).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).length() < 1e-5
    }

    fn input(light_dir: Vec3) -> FragmentInput {
        FragmentInput {
            normal: Vec3::Z,
            light_dir,
            camera_dir: Vec3::new(0.0, 0.3, 1.0),
            tangent: Vec3::X,
        }
    }

    fn material(metalness: f32, roughness: f32) -> MaterialUniform {
        MaterialUniform::new(Vec4::new(0.8, 0.5, 0.2, 0.9), metalness, roughness)
    }

    #[test]
    fn non_metal_is_lambert_plus_ambient() {
        let light = Vec3::new(0.0, 1.0, 1.0);
        let out = shade_basic(&input(light), &material(0.0, 0.4));
        let nl = light.normalize().z;
        let expected = (Vec3::new(0.8, 0.5, 0.2) * (AMBIENT + nl)).extend(0.9);
        assert!(approx(out, expected));
    }

    #[test]
    fn light_behind_surface_has_no_specular() {
        let out = shade_basic(&input(Vec3::new(0.0, 0.2, -1.0)), &material(1.0, 0.3));
        let expected = (Vec3::new(0.8, 0.5, 0.2) * AMBIENT).extend(0.9);
        assert!(approx(out, expected));
    }

    #[test]
    fn view_behind_surface_has_no_specular() {
        let mut frag = input(Vec3::Z);
        frag.camera_dir = Vec3::new(0.0, 1.0, -0.5);
        let out = shade_basic(&frag, &material(1.0, 0.3));
        let expected = (Vec3::new(0.8, 0.5, 0.2) * AMBIENT).extend(0.9);
        assert!(approx(out, expected));
    }

    #[test]
    fn lit_metal_gains_specular() {
        let out = shade_basic(&input(Vec3::new(0.0, -0.3, 1.0)), &material(1.0, 0.3));
        let ambient_only = Vec3::new(0.8, 0.5, 0.2) * AMBIENT;
        assert!(out.x > ambient_only.x);
        assert!(out.y > ambient_only.y);
        assert!(out.z > ambient_only.z);
    }

    #[test]
    fn alpha_passes_through() {
        let out = shade_basic(&input(Vec3::Z), &material(0.5, 0.5));
        assert_eq!(out.w, 0.9);
    }

    #[test]
    fn gating_policies_differ_for_back_lit_fragments() {
        // Light slightly behind the surface but the half vector still above it.
        let n = Vec3::Z;
        let l = Vec3::new(0.0, -1.0, -0.1);
        let v = Vec3::new(0.0, 1.0, 0.9);
        let surface = SurfaceSample {
            base_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            metalness: 1.0,
            roughness: 0.6,
        };
        assert!(n.dot((l.normalize() + v.normalize()).normalize()) > 0.0);

        let light_gated = shade(n, l, v, surface, SpecularGate::LightAndView);
        let half_gated = shade(n, l, v, surface, SpecularGate::HalfVector);

        assert!(approx(light_gated, Vec4::new(AMBIENT, AMBIENT, AMBIENT, 1.0)));
        assert!(half_gated.x > light_gated.x);
    }

    #[test]
    fn half_vector_gate_blocks_grazing_half_vector() {
        // Light and view both below the surface: the half vector is too.
        let n = Vec3::Z;
        let surface = SurfaceSample {
            base_color: Vec4::ONE,
            metalness: 1.0,
            roughness: 0.5,
        };
        let out = shade(
            n,
            Vec3::new(0.3, 0.0, -1.0),
            Vec3::new(-0.3, 0.0, -1.0),
            surface,
            SpecularGate::HalfVector,
        );
        assert!(approx(out, Vec4::new(AMBIENT, AMBIENT, AMBIENT, 1.0)));
    }

    #[test]
    fn ggx_peaks_at_normal_incidence() {
        let rough = 0.5;
        assert!(distribution_ggx(1.0, rough) > distribution_ggx(0.8, rough));
        let a2 = rough.powi(4);
        assert!((distribution_ggx(1.0, rough) - 1.0 / (PI * a2)).abs() < 1e-3);
    }

    #[test]
    fn visibility_is_zero_at_grazing_both_ways() {
        assert_eq!(visibility_smith(0.0, 0.0, 0.5), 0.0);
        assert!(visibility_smith(1.0, 1.0, 0.5) > 0.0);
    }

    #[test]
    fn fresnel_goes_white_at_grazing_angle() {
        let f0 = Vec3::new(0.2, 0.4, 0.6);
        assert!((fresnel_schlick(f0, 1.0) - f0).length() < 1e-6);
        assert!((fresnel_schlick(f0, 0.0) - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn textures_scale_material_factors() {
        let m = MaterialUniform::new(Vec4::new(1.0, 0.5, 1.0, 1.0), 0.8, 0.6);
        let albedo = Vec4::new(0.5, 1.0, 0.25, 0.5);
        let s = SurfaceSample::textured(&m, albedo, Vec4::new(0.0, 0.5, 0.25, 1.0));
        assert_eq!(s.base_color, Vec4::new(0.5, 0.5, 0.25, 0.5));
        assert!((s.roughness - 0.3).abs() < 1e-6);
        assert!((s.metalness - 0.2).abs() < 1e-6);
    }

    #[test]
    fn flat_normal_texel_keeps_geometric_normal() {
        let n = perturb_normal(Vec3::Z, Vec3::X, Vec3::new(0.5, 0.5, 1.0));
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn normal_texel_tilts_along_tangent() {
        let n = perturb_normal(Vec3::Z, Vec3::X, Vec3::new(1.0, 0.5, 0.5));
        assert!((n - Vec3::X).length() < 1e-6);
    }
}
