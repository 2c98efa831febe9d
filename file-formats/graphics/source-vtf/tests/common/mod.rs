//! Shared synthetic VTF stream builder for integration tests

use source_vtf::{ImageFormat, VTF_MAGIC, VTF_MAJOR_VERSION};

/// Builds byte-exact VTF streams without going through any encoder
pub struct VtfBuilder {
    pub minor: u32,
    pub width: u16,
    pub height: u16,
    pub flags: u32,
    pub frames: u16,
    pub first_frame: u16,
    pub reflectivity: [f32; 3],
    pub bumpmap_scale: f32,
    pub format: ImageFormat,
    pub mip_count: u8,
    pub thumbnail: Option<(ImageFormat, u8, u8, Vec<u8>)>,
    pub depth: u16,
    /// Junk bytes between header and thumbnail, locatable only through
    /// the 7.3+ resource dictionary
    pub gap: usize,
    pub payload: Vec<u8>,
}

impl VtfBuilder {
    pub fn new(width: u16, height: u16, format: ImageFormat) -> Self {
        Self {
            minor: 2,
            width,
            height,
            flags: 0,
            frames: 1,
            first_frame: 0,
            reflectivity: [0.2, 0.3, 0.4],
            bumpmap_scale: 1.0,
            format,
            mip_count: 1,
            thumbnail: None,
            depth: 1,
            gap: 0,
            payload: Vec::new(),
        }
    }

    pub fn minor(mut self, minor: u32) -> Self {
        self.minor = minor;
        self
    }

    pub fn mip_count(mut self, count: u8) -> Self {
        self.mip_count = count;
        self
    }

    pub fn frames(mut self, frames: u16) -> Self {
        self.frames = frames;
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn thumbnail(mut self, format: ImageFormat, width: u8, height: u8, data: Vec<u8>) -> Self {
        self.thumbnail = Some((format, width, height, data));
        self
    }

    pub fn gap(mut self, gap: usize) -> Self {
        assert!(self.minor >= 3, "legacy layout has no resource offsets");
        self.gap = gap;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut fixed = 63usize;
        if self.minor >= 2 {
            fixed += 2;
        }
        let mut resources = 0usize;
        if self.minor >= 3 {
            resources = 1 + usize::from(self.thumbnail.is_some());
            fixed += 15 + 8 * resources;
        }
        let header_size = fixed.next_multiple_of(16);

        let thumb_len = self.thumbnail.as_ref().map_or(0, |(_, _, _, d)| d.len());
        let thumbnail_offset = header_size + self.gap;
        let image_offset = thumbnail_offset + thumb_len;

        let mut out = Vec::new();
        out.extend_from_slice(&VTF_MAGIC.to_le_bytes());
        out.extend_from_slice(&VTF_MAJOR_VERSION.to_le_bytes());
        out.extend_from_slice(&self.minor.to_le_bytes());
        out.extend_from_slice(&(header_size as u32).to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.frames.to_le_bytes());
        out.extend_from_slice(&self.first_frame.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        for channel in self.reflectivity {
            out.extend_from_slice(&channel.to_le_bytes());
        }
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&self.bumpmap_scale.to_le_bytes());
        out.extend_from_slice(&(self.format as u32).to_le_bytes());
        out.push(self.mip_count);
        match &self.thumbnail {
            Some((format, width, height, _)) => {
                out.extend_from_slice(&(*format as u32).to_le_bytes());
                out.push(*width);
                out.push(*height);
            }
            None => {
                out.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
                out.push(0);
                out.push(0);
            }
        }
        if self.minor >= 2 {
            out.extend_from_slice(&self.depth.to_le_bytes());
        }
        if self.minor >= 3 {
            out.extend_from_slice(&[0; 3]);
            out.extend_from_slice(&(resources as u32).to_le_bytes());
            out.extend_from_slice(&[0; 8]);
            if self.thumbnail.is_some() {
                out.extend_from_slice(&[0x01, 0, 0, 0]);
                out.extend_from_slice(&(thumbnail_offset as u32).to_le_bytes());
            }
            out.extend_from_slice(&[0x30, 0, 0, 0]);
            out.extend_from_slice(&(image_offset as u32).to_le_bytes());
        }

        assert_eq!(out.len(), fixed);
        out.resize(header_size, 0);
        out.resize(header_size + self.gap, 0xee);
        if let Some((_, _, _, data)) = &self.thumbnail {
            out.extend_from_slice(data);
        }
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Payload length of one surface
pub fn surface_len(format: ImageFormat, width: u32, height: u32) -> usize {
    format.surface_size(width, height) as usize
}

/// Byte pattern making each payload region distinguishable
pub fn patterned(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}
