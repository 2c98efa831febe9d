//! 4×4 block-compression decoding
//!
//! Two block families: 8-byte color-only blocks (DXT1, with an
//! optional punch-through transparent palette slot) and 16-byte blocks
//! pairing the same color half with an alpha half, either explicit
//! 4-bit samples (DXT3) or two reference alphas plus an interpolated
//! palette (DXT5).

use super::Rgba;

/// Bytes of the 4×4 block containing `(x, y)`
fn block_bytes(data: &[u8], width: u32, x: u32, y: u32, block_size: usize) -> &[u8] {
    let blocks_per_row = width.div_ceil(4) as usize;
    let index = (y / 4) as usize * blocks_per_row + (x / 4) as usize;
    let offset = index * block_size;
    &data[offset..offset + block_size]
}

/// Expand a 5-6-5 endpoint color to normalized RGB
fn expand565(raw: u16) -> [f32; 3] {
    [
        f32::from((raw >> 11) & 0x1f) / 31.0,
        f32::from((raw >> 5) & 0x3f) / 63.0,
        f32::from(raw & 0x1f) / 31.0,
    ]
}

/// Weighted blend of two endpoint colors
fn mix(a: [f32; 3], b: [f32; 3], wa: f32, wb: f32) -> [f32; 3] {
    let total = wa + wb;
    [
        (a[0] * wa + b[0] * wb) / total,
        (a[1] * wa + b[1] * wb) / total,
        (a[2] * wa + b[2] * wb) / total,
    ]
}

/// Decode the 8-byte color half of a block: two 5-6-5 reference colors,
/// a derived palette, and a 2-bit index per pixel.
///
/// The palette has four interpolated entries when `color0 > color1`
/// (or always, for the DXT3/DXT5 color half), otherwise two endpoints,
/// their midpoint and a transparent slot. Returns the selected color
/// and whether the transparent slot was hit.
fn decode_color(block: &[u8], x: u32, y: u32, force_four: bool) -> ([f32; 3], bool) {
    let c0_raw = u16::from_le_bytes([block[0], block[1]]);
    let c1_raw = u16::from_le_bytes([block[2], block[3]]);
    let c0 = expand565(c0_raw);
    let c1 = expand565(c1_raw);

    let row = block[4 + (y % 4) as usize];
    let index = (row >> (2 * (x % 4))) & 0x3;

    let four_color = force_four || c0_raw > c1_raw;
    let color = match index {
        0 => c0,
        1 => c1,
        2 => {
            if four_color {
                mix(c0, c1, 2.0, 1.0)
            } else {
                mix(c0, c1, 1.0, 1.0)
            }
        }
        _ => {
            if four_color {
                mix(c0, c1, 1.0, 2.0)
            } else {
                [0.0, 0.0, 0.0]
            }
        }
    };

    (color, index == 3 && !four_color)
}

/// Entry `index` of the DXT5 alpha palette.
///
/// `alpha0 > alpha1` selects the 8-entry palette of pure interpolants;
/// otherwise 6 interpolants plus constant 0 and 255.
fn alpha_palette(alpha0: u8, alpha1: u8, index: u8) -> f32 {
    let a0 = f32::from(alpha0);
    let a1 = f32::from(alpha1);

    let value = match index {
        0 => a0,
        1 => a1,
        i if alpha0 > alpha1 => {
            let i = f32::from(i);
            ((8.0 - i) * a0 + (i - 1.0) * a1) / 7.0
        }
        6 => 0.0,
        7 => 255.0,
        i => {
            let i = f32::from(i);
            ((6.0 - i) * a0 + (i - 1.0) * a1) / 5.0
        }
    };
    value / 255.0
}

pub(super) fn decode_dxt1(data: &[u8], width: u32, x: u32, y: u32, punch_through: bool) -> Rgba {
    let block = block_bytes(data, width, x, y, 8);
    let (color, transparent) = decode_color(block, x, y, false);

    if transparent && punch_through {
        Rgba::TRANSPARENT
    } else {
        Rgba::new(color[0], color[1], color[2], 1.0)
    }
}

pub(super) fn decode_dxt3(data: &[u8], width: u32, x: u32, y: u32) -> Rgba {
    let block = block_bytes(data, width, x, y, 16);
    let (color, _) = decode_color(&block[8..], x, y, true);

    // 4-bit explicit alpha, one nibble per pixel, low nibble first
    let pixel = ((y % 4) * 4 + (x % 4)) as usize;
    let byte = block[pixel / 2];
    let nibble = if pixel % 2 == 0 { byte & 0xf } else { byte >> 4 };

    Rgba::new(color[0], color[1], color[2], f32::from(nibble) / 15.0)
}

pub(super) fn decode_dxt5(data: &[u8], width: u32, x: u32, y: u32) -> Rgba {
    let block = block_bytes(data, width, x, y, 16);
    let (color, _) = decode_color(&block[8..], x, y, true);

    // 48-bit little-endian field of 3-bit palette indices
    let mut field: u64 = 0;
    for (i, &byte) in block[2..8].iter().enumerate() {
        field |= u64::from(byte) << (8 * i);
    }
    let pixel = (y % 4) * 4 + (x % 4);
    let index = ((field >> (3 * pixel)) & 0x7) as u8;

    Rgba::new(
        color[0],
        color[1],
        color[2],
        alpha_palette(block[0], block[1], index),
    )
}
