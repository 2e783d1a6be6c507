//! Buffer and texture uploads for the surface pipelines.

use anyhow::Result;
use wgpu::util::DeviceExt;

use meshkern_core::records::{CameraUniform, MaterialUniform};
use meshkern_core::texels::{PixelFormat, to_rgba8};

pub fn camera_buffer(device: &wgpu::Device, camera: &CameraUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("meshkern camera ubo"),
        contents: bytemuck::bytes_of(camera),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn material_buffer(device: &wgpu::Device, material: &MaterialUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("meshkern material ubo"),
        contents: bytemuck::bytes_of(material),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Joint matrices for every instance, `transform_length` per instance,
/// column-major.
pub fn joint_palette_buffer(device: &wgpu::Device, palette: &[glam::Mat4]) -> Result<wgpu::Buffer> {
    anyhow::ensure!(!palette.is_empty(), "joint palette is empty");
    let columns: Vec<[f32; 16]> = palette.iter().map(|m| m.to_cols_array()).collect();
    Ok(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("meshkern joint palette"),
        contents: bytemuck::cast_slice(&columns),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    }))
}

/// Converts decoded pixels to RGBA8 and uploads them as a sampled 2D texture.
///
/// Albedo maps should use `srgb = true`; metal-rough and normal maps hold
/// linear data.
#[allow(clippy::too_many_arguments)]
pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    format: PixelFormat,
    width: u32,
    height: u32,
    pixels: &[u8],
    srgb: bool,
) -> Result<wgpu::Texture> {
    anyhow::ensure!(width > 0 && height > 0, "{label}: texture has zero size");
    let expected = width as usize * height as usize;
    anyhow::ensure!(
        format.pixel_count(pixels.len()) == expected,
        "{label}: expected {expected} {format:?} pixels, got {}",
        format.pixel_count(pixels.len())
    );

    let rgba = to_rgba8(format, pixels);
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        },
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    log::debug!("uploaded {label} ({width}x{height} from {format:?})");
    Ok(texture)
}
