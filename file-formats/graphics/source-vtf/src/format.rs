//! Pixel format tags and texture flags

use bitflags::bitflags;

/// Pixel layout of one image surface.
///
/// Packed 16-bit formats name their channels from least- to
/// most-significant bit of the little-endian word, matching the byte
/// order the 8-bit-per-channel formats spell out. The four `Dxt*`
/// variants are 4×4 block-compressed; everything else stores whole
/// pixels at a fixed stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ImageFormat {
    /// 32-bit, bytes R, G, B, A
    Rgba8888 = 0,
    /// 32-bit, bytes A, B, G, R
    Abgr8888 = 1,
    /// 24-bit, bytes R, G, B, opaque
    Rgb888 = 2,
    /// 24-bit, bytes B, G, R, opaque
    Bgr888 = 3,
    /// 16-bit packed, R 5 bits, G 6, B 5
    Rgb565 = 4,
    /// 8-bit intensity replicated to RGB, opaque
    I8 = 5,
    /// 16-bit, intensity byte plus alpha byte
    Ia88 = 6,
    /// 8-bit palettized; no palette is carried by the container
    P8 = 7,
    /// 8-bit alpha only, RGB zero
    A8 = 8,
    /// 24-bit RGB where pure blue decodes as transparent
    Rgb888Bluescreen = 9,
    /// 24-bit BGR where pure blue decodes as transparent
    Bgr888Bluescreen = 10,
    /// 32-bit, bytes A, R, G, B
    Argb8888 = 11,
    /// 32-bit, bytes B, G, R, A
    Bgra8888 = 12,
    /// 4×4 block compression, 8-byte blocks, opaque
    Dxt1 = 13,
    /// 4×4 block compression, 16-byte blocks, explicit 4-bit alpha
    Dxt3 = 14,
    /// 4×4 block compression, 16-byte blocks, interpolated alpha
    Dxt5 = 15,
    /// 32-bit, bytes B, G, R, unused
    Bgrx8888 = 16,
    /// 16-bit packed, B 5 bits, G 6, R 5
    Bgr565 = 17,
    /// 16-bit packed, B 5 bits, G 5, R 5, high bit unused
    Bgrx5551 = 18,
    /// 16-bit packed, 4 bits per channel
    Bgra4444 = 19,
    /// DXT1 with the 3-color mode's fourth palette entry transparent
    Dxt1OneBitAlpha = 20,
    /// 16-bit packed, B 5 bits, G 5, R 5, A 1
    Bgra5551 = 21,
    /// 16-bit two-channel normal map, bytes U, V
    Uv88 = 22,
    /// 32-bit four-channel normal map, bytes U, V, W, Q
    Uvwq8888 = 23,
    /// 64-bit, four half-float channels
    Rgba16161616F = 24,
    /// 64-bit, four 16-bit integer channels
    Rgba16161616 = 25,
    /// 32-bit normal map, bytes U, V, L, unused
    Uvlx8888 = 26,
}

impl ImageFormat {
    /// Create from the raw header tag
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ImageFormat::Rgba8888),
            1 => Some(ImageFormat::Abgr8888),
            2 => Some(ImageFormat::Rgb888),
            3 => Some(ImageFormat::Bgr888),
            4 => Some(ImageFormat::Rgb565),
            5 => Some(ImageFormat::I8),
            6 => Some(ImageFormat::Ia88),
            7 => Some(ImageFormat::P8),
            8 => Some(ImageFormat::A8),
            9 => Some(ImageFormat::Rgb888Bluescreen),
            10 => Some(ImageFormat::Bgr888Bluescreen),
            11 => Some(ImageFormat::Argb8888),
            12 => Some(ImageFormat::Bgra8888),
            13 => Some(ImageFormat::Dxt1),
            14 => Some(ImageFormat::Dxt3),
            15 => Some(ImageFormat::Dxt5),
            16 => Some(ImageFormat::Bgrx8888),
            17 => Some(ImageFormat::Bgr565),
            18 => Some(ImageFormat::Bgrx5551),
            19 => Some(ImageFormat::Bgra4444),
            20 => Some(ImageFormat::Dxt1OneBitAlpha),
            21 => Some(ImageFormat::Bgra5551),
            22 => Some(ImageFormat::Uv88),
            23 => Some(ImageFormat::Uvwq8888),
            24 => Some(ImageFormat::Rgba16161616F),
            25 => Some(ImageFormat::Rgba16161616),
            26 => Some(ImageFormat::Uvlx8888),
            _ => None,
        }
    }

    /// Check if this format stores 4×4 compressed blocks
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            ImageFormat::Dxt1 | ImageFormat::Dxt3 | ImageFormat::Dxt5 | ImageFormat::Dxt1OneBitAlpha
        )
    }

    /// Bytes per pixel for fixed-stride formats, `None` for compressed
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            ImageFormat::I8 | ImageFormat::P8 | ImageFormat::A8 => Some(1),
            ImageFormat::Rgb565
            | ImageFormat::Ia88
            | ImageFormat::Bgr565
            | ImageFormat::Bgrx5551
            | ImageFormat::Bgra4444
            | ImageFormat::Bgra5551
            | ImageFormat::Uv88 => Some(2),
            ImageFormat::Rgb888
            | ImageFormat::Bgr888
            | ImageFormat::Rgb888Bluescreen
            | ImageFormat::Bgr888Bluescreen => Some(3),
            ImageFormat::Rgba8888
            | ImageFormat::Abgr8888
            | ImageFormat::Argb8888
            | ImageFormat::Bgra8888
            | ImageFormat::Bgrx8888
            | ImageFormat::Uvwq8888
            | ImageFormat::Uvlx8888 => Some(4),
            ImageFormat::Rgba16161616F | ImageFormat::Rgba16161616 => Some(8),
            ImageFormat::Dxt1
            | ImageFormat::Dxt3
            | ImageFormat::Dxt5
            | ImageFormat::Dxt1OneBitAlpha => None,
        }
    }

    /// Bytes per 4×4 block for compressed formats, `None` otherwise
    pub fn block_size(self) -> Option<usize> {
        match self {
            ImageFormat::Dxt1 | ImageFormat::Dxt1OneBitAlpha => Some(8),
            ImageFormat::Dxt3 | ImageFormat::Dxt5 => Some(16),
            _ => None,
        }
    }

    /// Storage density in bits per pixel
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            ImageFormat::Dxt1 | ImageFormat::Dxt1OneBitAlpha => 4,
            ImageFormat::Dxt3 | ImageFormat::Dxt5 => 8,
            other => match other.bytes_per_pixel() {
                Some(bytes) => bytes as u32 * 8,
                // All compressed formats are matched above
                None => 0,
            },
        }
    }

    /// Payload size in bytes of one surface with the given dimensions.
    ///
    /// Compressed formats round each axis up to whole 4×4 blocks.
    pub fn surface_size(self, width: u32, height: u32) -> u64 {
        match self.block_size() {
            Some(block) => {
                let blocks_x = u64::from(width.div_ceil(4));
                let blocks_y = u64::from(height.div_ceil(4));
                blocks_x * blocks_y * block as u64
            }
            None => {
                // bytes_per_pixel is Some for every non-compressed format
                let bpp = self.bytes_per_pixel().unwrap_or(0) as u64;
                u64::from(width) * u64::from(height) * bpp
            }
        }
    }
}

bitflags! {
    /// Texture flag word from the VTF header
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextureFlags: u32 {
        /// Point sampling (no filtering)
        const POINT_SAMPLE = 0x1;
        /// Trilinear filtering
        const TRILINEAR = 0x2;
        /// Clamp S coordinate
        const CLAMP_S = 0x4;
        /// Clamp T coordinate
        const CLAMP_T = 0x8;
        /// Anisotropic filtering
        const ANISOTROPIC = 0x10;
        /// Hint that DXT5 is used for skybox compositing
        const HINT_DXT5 = 0x20;
        /// Piecewise-linear gamma corrected
        const PWL_CORRECTED = 0x40;
        /// Normal map
        const NORMAL = 0x80;
        /// No mip levels stored
        const NO_MIP = 0x100;
        /// No level of detail
        const NO_LOD = 0x200;
        /// Keep every mip level resident
        const ALL_MIPS = 0x400;
        /// Procedural texture
        const PROCEDURAL = 0x800;
        /// One-bit alpha channel
        const ONE_BIT_ALPHA = 0x1000;
        /// Eight-bit alpha channel
        const EIGHT_BIT_ALPHA = 0x2000;
        /// Environment map (cubemap faces share each mip level)
        const ENVMAP = 0x4000;
        /// Render target
        const RENDER_TARGET = 0x8000;
        /// Depth render target
        const DEPTH_RENDER_TARGET = 0x10_0000;
        /// No debug override
        const NO_DEBUG_OVERRIDE = 0x20_0000;
        /// Single copy
        const SINGLE_COPY = 0x40_0000;
        /// Pre-applied sRGB conversion
        const PRE_SRGB = 0x80_0000;
        /// No depth buffer
        const NO_DEPTH_BUFFER = 0x800_0000;
        /// Clamp U coordinate
        const CLAMP_U = 0x2000_0000;
        /// Usable as a vertex texture
        const VERTEX_TEXTURE = 0x4000_0000;
        /// Self-shadowing bump map
        const SS_BUMP = 0x8000_0000;

        // Files in the wild carry bits outside the documented set
        const _ = !0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_from_raw_round_trip() {
        for raw in 0..27u32 {
            let format = ImageFormat::from_raw(raw).unwrap();
            assert_eq!(format as u32, raw);
        }
        assert_eq!(ImageFormat::from_raw(27), None);
        assert_eq!(ImageFormat::from_raw(0xffff_ffff), None);
    }

    #[test_case(ImageFormat::Rgba8888, 32)]
    #[test_case(ImageFormat::Rgb888, 24)]
    #[test_case(ImageFormat::Rgb565, 16)]
    #[test_case(ImageFormat::I8, 8)]
    #[test_case(ImageFormat::Rgba16161616F, 64)]
    #[test_case(ImageFormat::Dxt1, 4)]
    #[test_case(ImageFormat::Dxt5, 8)]
    fn test_bits_per_pixel(format: ImageFormat, bits: u32) {
        assert_eq!(format.bits_per_pixel(), bits);
    }

    #[test]
    fn test_surface_size_uncompressed() {
        assert_eq!(ImageFormat::Rgba8888.surface_size(16, 8), 16 * 8 * 4);
        assert_eq!(ImageFormat::I8.surface_size(3, 3), 9);
        assert_eq!(ImageFormat::Rgba16161616.surface_size(2, 2), 32);
    }

    #[test]
    fn test_surface_size_rounds_to_blocks() {
        assert_eq!(ImageFormat::Dxt1.surface_size(4, 4), 8);
        assert_eq!(ImageFormat::Dxt1.surface_size(8, 8), 32);
        // 1×1 and 5×5 both need whole blocks
        assert_eq!(ImageFormat::Dxt1.surface_size(1, 1), 8);
        assert_eq!(ImageFormat::Dxt5.surface_size(5, 5), 4 * 16);
    }

    #[test]
    fn test_surface_size_no_overflow() {
        // u16 dimension limits squared at 8 bytes per pixel stay in u64
        let size = ImageFormat::Rgba16161616.surface_size(u32::from(u16::MAX), u32::from(u16::MAX));
        assert_eq!(size, 65535u64 * 65535 * 8);
    }

    #[test]
    fn test_flags_retain_unknown_bits() {
        let flags = TextureFlags::from_bits_retain(0x0001_4001);
        assert!(flags.contains(TextureFlags::POINT_SAMPLE));
        assert!(flags.contains(TextureFlags::ENVMAP));
        assert_eq!(flags.bits(), 0x0001_4001);
    }
}
