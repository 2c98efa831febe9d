//! # source_vtf - VTF Texture Library
//!
//! Reader and pixel decoder for the VTF texture container format used
//! by Source engine games. A VTF file holds a mip chain of GPU-oriented
//! image surfaces (possibly several animation frames or cubemap faces
//! per level) in any of 27 pixel layouts, including the DXT 4×4
//! block-compression family, plus a small thumbnail.
//!
//! The crate parses a texture into an owned mip/frame tree and decodes
//! single pixels from any surface into normalized RGBA. It is strictly
//! read-only; encoding and compression are out of scope.
//!
//! ## Examples
//!
//! ```no_run
//! use source_vtf::Texture;
//!
//! # fn main() -> Result<(), source_vtf::Error> {
//! let texture = Texture::open("brickwall001a.vtf")?;
//! println!(
//!     "{}x{} {:?}, {} mips",
//!     texture.width(),
//!     texture.height(),
//!     texture.format(),
//!     texture.mip_count()
//! );
//!
//! // mip 0 is full resolution
//! let image = &texture.mipmaps[0].frames[0];
//! let pixel = image.pixel(0, 0);
//! println!("top-left: {} {} {} {}", pixel.r, pixel.g, pixel.b, pixel.a);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod codec;
pub mod error;
pub mod format;
pub mod header;
pub mod texture;

pub use codec::Rgba;
pub use error::{Error, Result};
pub use format::{ImageFormat, TextureFlags};
pub use header::{TextureHeader, VTF_MAGIC, VTF_MAJOR_VERSION};
pub use texture::{Image, MipMap, Texture};
