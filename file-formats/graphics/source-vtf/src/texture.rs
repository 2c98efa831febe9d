//! Owned mip/frame image tree built from a parsed VTF file

use crate::codec::{self, Rgba};
use crate::format::{ImageFormat, TextureFlags};
use crate::header::{TextureHeader, parse_header};
use crate::{Error, Result};
use bytes::Bytes;
use log::trace;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// One decoded image surface.
///
/// The pixel bytes are a cheap refcounted view into the backing buffer
/// shared by every surface of the owning [`Texture`]; cloning an image
/// or letting it outlive the texture never copies pixel data.
#[derive(Debug, Clone)]
pub struct Image {
    /// Pixel layout of the surface
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded pixel bytes, exactly one surface long
    pub data: Bytes,
}

impl Image {
    /// Decode the pixel at `(x, y)` into normalized RGBA.
    ///
    /// Pure and reentrant; safe to call concurrently on a shared image.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is outside the image. Out-of-range
    /// coordinates are a caller bug; failing fast beats silently
    /// reading a neighboring pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        codec::decode_pixel(self, x, y)
    }
}

/// All frames of one mip level
#[derive(Debug, Clone)]
pub struct MipMap {
    /// Animation frames, cubemap faces and depth slices at this level,
    /// in on-disk order
    pub frames: Vec<Image>,
}

/// Parsed VTF texture.
///
/// `mipmaps[0]` is the full-resolution level; the smallest-first
/// on-disk order is reversed when the tree is built. All high-res
/// surfaces share one backing allocation, the thumbnail owns a second
/// one, so dropping a texture releases exactly two buffers regardless
/// of image count.
#[derive(Debug, Clone)]
pub struct Texture {
    header: TextureHeader,
    /// Mip levels, index 0 = full resolution
    pub mipmaps: Vec<MipMap>,
    /// Thumbnail image, if the file stores one
    pub thumbnail: Option<Image>,
}

impl Texture {
    /// Read and parse a VTF texture from the file system
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_owned()),
            _ => Error::Io(e),
        })?;

        // The buffer is sized from untrusted file metadata, so reserve
        // fallibly instead of letting the allocator abort.
        let len = file.metadata().map(|m| m.len()).unwrap_or(0) as usize;
        let mut input = Vec::new();
        input.try_reserve_exact(len)?;
        file.read_to_end(&mut input)?;

        Self::parse(&input)
    }

    /// Parse a VTF texture from an in-memory buffer
    pub fn parse(input: &[u8]) -> Result<Self> {
        let header = parse_header(input)?;
        build_texture(header, input)
    }

    /// Declared width of the full-resolution level
    pub fn width(&self) -> u16 {
        self.header.width
    }

    /// Declared height of the full-resolution level
    pub fn height(&self) -> u16 {
        self.header.height
    }

    /// Texture flag word
    pub fn flags(&self) -> TextureFlags {
        self.header.flags
    }

    /// Average color of the texture
    pub fn reflectivity(&self) -> [f32; 3] {
        self.header.reflectivity
    }

    /// Bump mapping scale
    pub fn bumpmap_scale(&self) -> f32 {
        self.header.bumpmap_scale
    }

    /// Pixel format of the high-res mip chain
    pub fn format(&self) -> ImageFormat {
        self.header.format
    }

    /// Minor format revision, retained uninterpreted
    pub fn minor_version(&self) -> u32 {
        self.header.minor_version
    }

    /// Declared animation frame count
    pub fn frame_count(&self) -> u16 {
        self.header.frames
    }

    /// Full parsed header, for fields without a dedicated accessor
    pub fn header(&self) -> &TextureHeader {
        &self.header
    }

    /// Number of mip levels
    pub fn mip_count(&self) -> usize {
        self.mipmaps.len()
    }

    /// Image at a given mip level and frame index
    pub fn image(&self, mip: usize, frame: usize) -> Option<&Image> {
        self.mipmaps.get(mip)?.frames.get(frame)
    }
}

/// Mip dimension invariant: each level halves, clamped at one texel
fn mip_dimension(base: u16, level: u32) -> u32 {
    (u32::from(base) >> level).max(1)
}

fn build_texture(header: TextureHeader, input: &[u8]) -> Result<Texture> {
    let header_end = header.header_size as usize;
    if header_end > input.len() {
        return Err(Error::invalid("header size exceeds file length"));
    }

    // Thumbnail payload sits at its resource offset, or right after the
    // header in the legacy sequential layout.
    let thumbnail_size = match header.thumbnail_format {
        Some(format) => format.surface_size(
            u32::from(header.thumbnail_width),
            u32::from(header.thumbnail_height),
        ),
        None => 0,
    };
    let thumbnail_offset = header
        .thumbnail_offset
        .map_or(header_end as u64, u64::from);

    let thumbnail = match header.thumbnail_format {
        Some(format) => Some(Image {
            format,
            width: u32::from(header.thumbnail_width),
            height: u32::from(header.thumbnail_height),
            data: copy_payload(input, thumbnail_offset, thumbnail_size, "thumbnail")?,
        }),
        None => None,
    };

    // High-res payload: per mip level smallest to largest, per frame,
    // per face, per depth slice, one surface each.
    let faces = header.face_count();
    let mip_count = u32::from(header.mipmap_count);

    let mut total: u64 = 0;
    for level in 0..mip_count {
        total = total
            .checked_add(level_size(&header, faces, level))
            .ok_or_else(|| Error::invalid("mip chain size overflow"))?;
    }

    let image_offset = header
        .image_offset
        .map_or_else(|| thumbnail_offset + thumbnail_size, u64::from);
    let backing = copy_payload(input, image_offset, total, "mip chain")?;
    trace!(
        "{} mip levels, {} faces, {} frames, {} payload bytes",
        mip_count,
        faces,
        header.frames,
        backing.len()
    );

    let mut mipmaps = Vec::new();
    mipmaps.try_reserve_exact(mip_count as usize)?;

    let mut cursor = 0usize;
    // Disk order is smallest mip first
    for level in (0..mip_count).rev() {
        let width = mip_dimension(header.width, level);
        let height = mip_dimension(header.height, level);
        let surface = header.format.surface_size(width, height) as usize;
        let count = images_at_level(&header, faces, level) as usize;

        let mut frames = Vec::new();
        frames.try_reserve_exact(count)?;
        for _ in 0..count {
            frames.push(Image {
                format: header.format,
                width,
                height,
                data: backing.slice(cursor..cursor + surface),
            });
            cursor += surface;
        }
        mipmaps.push(MipMap { frames });
    }
    // Expose index 0 as full resolution
    mipmaps.reverse();

    Ok(Texture {
        header,
        mipmaps,
        thumbnail,
    })
}

/// Surfaces stored at one mip level
fn images_at_level(header: &TextureHeader, faces: u32, level: u32) -> u64 {
    let slices = mip_dimension(header.depth, level);
    u64::from(header.frames) * u64::from(faces) * u64::from(slices)
}

/// Payload bytes of one mip level across all its surfaces
fn level_size(header: &TextureHeader, faces: u32, level: u32) -> u64 {
    let width = mip_dimension(header.width, level);
    let height = mip_dimension(header.height, level);
    header.format.surface_size(width, height) * images_at_level(header, faces, level)
}

/// Copy `size` payload bytes at `offset` into a single owned backing
/// buffer, validating bounds with widened arithmetic first
fn copy_payload(input: &[u8], offset: u64, size: u64, what: &str) -> Result<Bytes> {
    let end = offset
        .checked_add(size)
        .ok_or_else(|| Error::invalid(format!("{what} size overflow")))?;
    if end > input.len() as u64 {
        return Err(Error::invalid(format!(
            "{what} payload of {size} bytes at offset {offset} exceeds file length {}",
            input.len()
        )));
    }

    let mut buf = Vec::new();
    buf.try_reserve_exact(size as usize)?;
    buf.extend_from_slice(&input[offset as usize..end as usize]);
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_dimension_halves_and_clamps() {
        assert_eq!(mip_dimension(16, 0), 16);
        assert_eq!(mip_dimension(16, 1), 8);
        assert_eq!(mip_dimension(16, 4), 1);
        assert_eq!(mip_dimension(16, 10), 1);
        assert_eq!(mip_dimension(1, 3), 1);
    }

    #[test]
    fn test_copy_payload_bounds() {
        let input = [0u8; 16];
        assert!(copy_payload(&input, 0, 16, "test").is_ok());
        assert!(copy_payload(&input, 8, 8, "test").is_ok());
        assert!(matches!(
            copy_payload(&input, 8, 9, "test"),
            Err(Error::InvalidFile(_))
        ));
        assert!(matches!(
            copy_payload(&input, u64::MAX, 2, "test"),
            Err(Error::InvalidFile(_))
        ));
    }
}
