use std::sync::mpsc;

use anyhow::{Context, Result};

/// Copies the first `count` elements of `src` to the host and blocks until
/// the copy has landed.
///
/// `src` must have `COPY_SRC` usage.
pub fn read_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    src: &wgpu::Buffer,
    count: usize,
) -> Result<Vec<T>> {
    let size = (count * std::mem::size_of::<T>()) as u64;
    anyhow::ensure!(
        size <= src.size(),
        "readback of {size} bytes exceeds buffer size {}",
        src.size()
    );
    if size == 0 {
        return Ok(Vec::new());
    }

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("meshkern readback staging"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("meshkern readback encoder"),
    });
    encoder.copy_buffer_to_buffer(src, 0, &staging, 0, size);
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("device poll failed during readback")?;

    rx.recv()
        .context("readback callback was dropped")?
        .context("failed to map readback buffer")?;

    // Copy through a typed vec so the mapped range's alignment does not matter.
    let mut out = vec![<T as bytemuck::Zeroable>::zeroed(); count];
    {
        let data = slice.get_mapped_range();
        bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(&data);
    }
    staging.unmap();

    log::debug!("read back {count} elements ({size} bytes)");
    Ok(out)
}
