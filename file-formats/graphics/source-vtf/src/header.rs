//! VTF header structures and parsing

use crate::format::{ImageFormat, TextureFlags};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};

/// VTF file signature (`"VTF\0"`)
pub const VTF_MAGIC: u32 = 0x0046_5456;

/// The one supported major revision
pub const VTF_MAJOR_VERSION: u32 = 7;

/// Highest minor revision with a known header layout
pub const VTF_MAX_MINOR_VERSION: u32 = 5;

/// Raw thumbnail format tag meaning no thumbnail is stored
const FORMAT_NONE: u32 = 0xffff_ffff;

/// Resource dictionary tag for the thumbnail payload (7.3+)
const RSRC_THUMBNAIL: [u8; 3] = [0x01, 0, 0];

/// Resource dictionary tag for the high-res image payload (7.3+)
const RSRC_IMAGE: [u8; 3] = [0x30, 0, 0];

/// Resource entry flag: the offset field holds inline data, not a
/// payload location
const RSRC_FLAG_NO_DATA: u8 = 0x02;

/// Parsed VTF header.
///
/// Fields absent from older minor revisions are defaulted: `depth` is 1
/// below 7.2 and the resource offsets are `None` below 7.3.
#[derive(Debug, Clone)]
pub struct TextureHeader {
    /// Minor revision, retained but not interpreted beyond field layout
    pub minor_version: u32,
    /// Total header size including the resource dictionary
    pub header_size: u32,
    /// Declared width of mip level 0
    pub width: u16,
    /// Declared height of mip level 0
    pub height: u16,
    /// Texture flag word
    pub flags: TextureFlags,
    /// Animation frame count
    pub frames: u16,
    /// First animation frame, or `0xffff` for the spheremap quirk
    pub first_frame: u16,
    /// Average color of the texture
    pub reflectivity: [f32; 3],
    /// Bump mapping scale
    pub bumpmap_scale: f32,
    /// Pixel format of the high-res mip chain
    pub format: ImageFormat,
    /// Number of mip levels in the chain
    pub mipmap_count: u8,
    /// Pixel format of the thumbnail, if one is stored
    pub thumbnail_format: Option<ImageFormat>,
    /// Thumbnail width
    pub thumbnail_width: u8,
    /// Thumbnail height
    pub thumbnail_height: u8,
    /// Volume texture depth; 1 for flat textures
    pub depth: u16,
    /// Thumbnail payload offset from the resource dictionary
    pub thumbnail_offset: Option<u32>,
    /// High-res payload offset from the resource dictionary
    pub image_offset: Option<u32>,
}

impl TextureHeader {
    /// Number of cubemap faces sharing each mip level.
    ///
    /// Environment maps between 7.1 and 7.4 carry a seventh spheremap
    /// face when the first-frame field is `0xffff`.
    pub fn face_count(&self) -> u32 {
        if self.flags.contains(TextureFlags::ENVMAP) {
            if (1..=4).contains(&self.minor_version) && self.first_frame == 0xffff {
                7
            } else {
                6
            }
        } else {
            1
        }
    }
}

/// Consuming little-endian reader over the header bytes
struct HeaderReader<'a> {
    rest: &'a [u8],
    total: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            rest: input,
            total: input.len(),
        }
    }

    fn consumed(&self) -> usize {
        self.total - self.rest.len()
    }

    fn read_u8(&mut self) -> Result<u8> {
        ReadBytesExt::read_u8(&mut self.rest).map_err(|_| Error::invalid("truncated header"))
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.rest
            .read_u16::<LittleEndian>()
            .map_err(|_| Error::invalid("truncated header"))
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.rest
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::invalid("truncated header"))
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.rest
            .read_f32::<LittleEndian>()
            .map_err(|_| Error::invalid("truncated header"))
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.rest.len() {
            return Err(Error::invalid("truncated header"));
        }
        self.rest = &self.rest[n..];
        Ok(())
    }
}

pub(crate) fn parse_header(input: &[u8]) -> Result<TextureHeader> {
    let mut reader = HeaderReader::new(input);

    let magic = reader.read_u32()?;
    if magic != VTF_MAGIC {
        return Err(Error::BadMagic(magic));
    }

    let major = reader.read_u32()?;
    let minor = reader.read_u32()?;
    if major != VTF_MAJOR_VERSION || minor > VTF_MAX_MINOR_VERSION {
        return Err(Error::UnsupportedVersion { major, minor });
    }

    let header_size = reader.read_u32()?;
    let width = reader.read_u16()?;
    let height = reader.read_u16()?;
    if width == 0 || height == 0 {
        return Err(Error::invalid("zero texture dimensions"));
    }

    let flags = TextureFlags::from_bits_retain(reader.read_u32()?);

    let mut frames = reader.read_u16()?;
    if frames == 0 {
        warn!("Frame count 0 in header, assuming 1");
        frames = 1;
    }
    let first_frame = reader.read_u16()?;
    reader.skip(4)?;

    let reflectivity = [reader.read_f32()?, reader.read_f32()?, reader.read_f32()?];
    reader.skip(4)?;
    let bumpmap_scale = reader.read_f32()?;

    let format_raw = reader.read_u32()?;
    let format = ImageFormat::from_raw(format_raw).ok_or(Error::UnknownFormat(format_raw))?;

    let mut mipmap_count = reader.read_u8()?;
    if mipmap_count == 0 {
        warn!("Mipmap count 0 in header, assuming 1");
        mipmap_count = 1;
    }

    let thumbnail_raw = reader.read_u32()?;
    let thumbnail_format = if thumbnail_raw == FORMAT_NONE {
        None
    } else {
        Some(ImageFormat::from_raw(thumbnail_raw).ok_or(Error::UnknownFormat(thumbnail_raw))?)
    };
    let thumbnail_width = reader.read_u8()?;
    let thumbnail_height = reader.read_u8()?;

    // 7.2 introduced the volume depth field
    let depth = if minor >= 2 { reader.read_u16()?.max(1) } else { 1 };

    let mut thumbnail_offset = None;
    let mut image_offset = None;

    // 7.3 introduced the resource dictionary
    if minor >= 3 {
        reader.skip(3)?;
        let num_resources = reader.read_u32()?;
        reader.skip(8)?;

        let dictionary_room = (header_size as usize).saturating_sub(reader.consumed()) / 8;
        if num_resources as usize > dictionary_room {
            return Err(Error::invalid(format!(
                "resource dictionary of {num_resources} entries exceeds header size"
            )));
        }

        for _ in 0..num_resources {
            let tag = [reader.read_u8()?, reader.read_u8()?, reader.read_u8()?];
            let rsrc_flags = reader.read_u8()?;
            let offset = reader.read_u32()?;

            if rsrc_flags & RSRC_FLAG_NO_DATA != 0 {
                continue;
            }
            match tag {
                RSRC_THUMBNAIL => thumbnail_offset = Some(offset),
                RSRC_IMAGE => image_offset = Some(offset),
                _ => debug!("Ignoring resource {tag:02x?} at offset {offset:#x}"),
            }
        }
    }

    if (header_size as usize) < reader.consumed() {
        return Err(Error::invalid(format!(
            "declared header size {header_size} smaller than header fields"
        )));
    }

    Ok(TextureHeader {
        minor_version: minor,
        header_size,
        width,
        height,
        flags,
        frames,
        first_frame,
        reflectivity,
        bumpmap_scale,
        format,
        mipmap_count,
        thumbnail_format,
        thumbnail_width,
        thumbnail_height,
        depth,
        thumbnail_offset,
        image_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_count() {
        let mut header = TextureHeader {
            minor_version: 2,
            header_size: 80,
            width: 64,
            height: 64,
            flags: TextureFlags::empty(),
            frames: 1,
            first_frame: 0,
            reflectivity: [0.0; 3],
            bumpmap_scale: 1.0,
            format: ImageFormat::Dxt1,
            mipmap_count: 7,
            thumbnail_format: None,
            thumbnail_width: 0,
            thumbnail_height: 0,
            depth: 1,
            thumbnail_offset: None,
            image_offset: None,
        };
        assert_eq!(header.face_count(), 1);

        header.flags = TextureFlags::ENVMAP;
        assert_eq!(header.face_count(), 6);

        header.first_frame = 0xffff;
        assert_eq!(header.face_count(), 7);

        header.minor_version = 5;
        assert_eq!(header.face_count(), 6);
    }
}
