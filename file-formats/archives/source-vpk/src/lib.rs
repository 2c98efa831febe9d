//! # source_vpk - VPK Directory Library
//!
//! Reader for the VPK package-directory format used by Source engine
//! games. A `_dir.vpk` file is a hierarchical index of archived files:
//! it records, for every file, a checksum and where the payload bytes
//! live (a numbered archive chunk or the directory file itself), but
//! not the payload itself.
//!
//! This crate parses the directory stream into an owned
//! extension → path → file tree and exposes lookups over it. It is
//! strictly read-only and does not perform any chunk-file I/O.
//!
//! ## Examples
//!
//! ```no_run
//! use source_vpk::Directory;
//!
//! # fn main() -> Result<(), source_vpk::Error> {
//! let dir = Directory::open("hl2_misc_dir.vpk")?;
//!
//! for ext in &dir.extensions {
//!     for path in &ext.paths {
//!         for file in &path.files {
//!             println!("{}/{}.{}", path.name, file.name, ext.name);
//!         }
//!     }
//! }
//!
//! if let Some(file) = dir.find("materials/brick/brickwall001a.vtf") {
//!     println!("archive {} offset {}", file.entry.archive_index, file.entry.archive_offset);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod directory;
pub mod entry;
pub mod error;
mod parser;

pub use directory::{DirPath, Directory, Extension, FileEntry};
pub use entry::{DIR_ARCHIVE_INDEX, Entry};
pub use error::{Error, Result};
pub use parser::{MIN_HEADER_SIZE, VPK_SIGNATURE};
