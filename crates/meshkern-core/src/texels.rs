//! Pixel format conversion to RGBA8 texels for sampled material textures.

/// Layout of decoded source pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8,
    R8G8,
    R8G8B8,
    R8G8B8A8,
    R16,
    R16G16,
    R16G16B16,
    R16G16B16A16,
    R32G32B32F,
    R32G32B32A32F,
}

impl PixelFormat {
    /// Number of channels per pixel.
    pub fn channels(self) -> usize {
        use PixelFormat::*;
        match self {
            R8 | R16 => 1,
            R8G8 | R16G16 => 2,
            R8G8B8 | R16G16B16 | R32G32B32F => 3,
            R8G8B8A8 | R16G16B16A16 | R32G32B32A32F => 4,
        }
    }

    /// Bytes per channel.
    pub fn channel_size(self) -> usize {
        use PixelFormat::*;
        match self {
            R8 | R8G8 | R8G8B8 | R8G8B8A8 => 1,
            R16 | R16G16 | R16G16B16 | R16G16B16A16 => 2,
            R32G32B32F | R32G32B32A32F => 4,
        }
    }

    #[inline]
    pub fn pixel_size(self) -> usize {
        self.channels() * self.channel_size()
    }

    /// Number of whole pixels in `bytes` of source data.
    #[inline]
    pub fn pixel_count(self, bytes: usize) -> usize {
        bytes / self.pixel_size()
    }

    /// Converts one channel's bytes to an 8-bit value.
    fn channel_to_u8(self, bytes: &[u8]) -> u8 {
        match self.channel_size() {
            1 => bytes[0],
            // 16-bit channels are little-endian; keep the high byte.
            2 => bytes[1],
            _ => {
                let v = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (v * 255.0).clamp(0.0, 255.0) as u8
            }
        }
    }
}

/// Converts one source pixel to RGBA8. Missing color channels are 0 and a
/// missing alpha channel is 255.
///
/// # Panics
/// If `pixel` is shorter than `format.pixel_size()`.
pub fn pixel_to_rgba8(format: PixelFormat, pixel: &[u8]) -> [u8; 4] {
    let mut out = [0, 0, 0, 255];
    let size = format.channel_size();
    for (c, slot) in out.iter_mut().enumerate().take(format.channels()) {
        *slot = format.channel_to_u8(&pixel[c * size..(c + 1) * size]);
    }
    out
}

/// Converts a buffer of source pixels to tightly packed RGBA8.
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn to_rgba8(format: PixelFormat, data: &[u8]) -> Vec<u8> {
    data.chunks_exact(format.pixel_size())
        .flat_map(|pixel| pixel_to_rgba8(format, pixel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(PixelFormat::R8.pixel_size(), 1);
        assert_eq!(PixelFormat::R8G8B8.pixel_size(), 3);
        assert_eq!(PixelFormat::R16G16.pixel_size(), 4);
        assert_eq!(PixelFormat::R16G16B16A16.pixel_size(), 8);
        assert_eq!(PixelFormat::R32G32B32F.pixel_size(), 12);
        assert_eq!(PixelFormat::R32G32B32A32F.pixel_size(), 16);
    }

    #[test]
    fn single_channel_fills_red_and_opaque_alpha() {
        assert_eq!(to_rgba8(PixelFormat::R8, &[7, 200]), vec![7, 0, 0, 255, 200, 0, 0, 255]);
    }

    #[test]
    fn rgb8_gets_opaque_alpha() {
        assert_eq!(to_rgba8(PixelFormat::R8G8B8, &[1, 2, 3]), vec![1, 2, 3, 255]);
    }

    #[test]
    fn rgba8_is_copied() {
        let data = [9, 8, 7, 6, 5, 4, 3, 2];
        assert_eq!(to_rgba8(PixelFormat::R8G8B8A8, &data), data.to_vec());
    }

    #[test]
    fn sixteen_bit_keeps_high_byte() {
        let data: Vec<u8> = [0x12ffu16, 0xab00]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        assert_eq!(to_rgba8(PixelFormat::R16G16, &data), vec![0x12, 0xab, 0, 255]);
    }

    #[test]
    fn float_channels_are_scaled_and_saturated() {
        let data: Vec<u8> = [0.5f32, -1.0, 2.0, 1.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        assert_eq!(to_rgba8(PixelFormat::R32G32B32A32F, &data), vec![127, 0, 255, 255]);
        assert_eq!(to_rgba8(PixelFormat::R32G32B32F, &data[..12]), vec![127, 0, 255, 255]);
    }

    #[test]
    fn partial_trailing_pixel_is_dropped() {
        assert_eq!(to_rgba8(PixelFormat::R8G8B8, &[1, 2, 3, 4, 5]), vec![1, 2, 3, 255]);
        assert_eq!(PixelFormat::R16G16B16.pixel_count(13), 2);
    }
}
