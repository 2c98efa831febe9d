//! Binary parsing of the VPK directory stream

use crate::directory::{DirPath, Directory, Extension, FileEntry};
use crate::entry::{ENTRY_TERMINATOR, Entry};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};
use std::str;

/// VPK directory signature
pub const VPK_SIGNATURE: u32 = 0x55aa_1234;

/// Size of the version 1 header: signature, version, tree size
pub const MIN_HEADER_SIZE: usize = 12;

/// Consuming reader over the directory byte stream.
///
/// Fixed-width fields go through `byteorder`; names are NUL-terminated
/// and scanned with `memchr`. Reads past the end surface as
/// [`Error::UnexpectedEof`] so a truncated tree never panics.
struct TreeReader<'a> {
    rest: &'a [u8],
}

impl<'a> TreeReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { rest: input }
    }

    fn remaining(&self) -> usize {
        self.rest.len()
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.rest
            .read_u16::<LittleEndian>()
            .map_err(|_| Error::UnexpectedEof)
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.rest
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::UnexpectedEof)
    }

    /// Read a NUL-terminated name, not including the terminator
    fn read_name(&mut self) -> Result<&'a str> {
        let nul = memchr::memchr(0, self.rest).ok_or(Error::UnexpectedEof)?;
        let raw = &self.rest[..nul];
        self.rest = &self.rest[nul + 1..];
        str::from_utf8(raw).map_err(|_| Error::corrupted("name is not valid UTF-8"))
    }

    /// Advance past `n` bytes without exposing them
    fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.rest.len() {
            return Err(Error::UnexpectedEof);
        }
        self.rest = &self.rest[n..];
        Ok(())
    }
}

/// Reserve room for one more element before pushing, so an allocation
/// failure unwinds the partial tree instead of aborting
fn push_checked<T>(vec: &mut Vec<T>, value: T) -> Result<()> {
    vec.try_reserve(1)?;
    vec.push(value);
    Ok(())
}

pub(crate) fn parse_directory(input: &[u8]) -> Result<Directory> {
    if input.len() < MIN_HEADER_SIZE {
        return Err(Error::TooSmall { size: input.len() });
    }

    let mut reader = TreeReader::new(input);

    let signature = reader.read_u32()?;
    if signature != VPK_SIGNATURE {
        return Err(Error::BadSignature(signature));
    }

    let version = reader.read_u32()?;
    if version != 1 && version != 2 {
        return Err(Error::UnsupportedVersion(version));
    }

    let tree_size = reader.read_u32()?;

    if version == 2 {
        // Version 2 appends four section sizes after the tree size.
        // This library stops at the tree, but the fields still have to
        // be consumed before it starts.
        let file_data_size = reader.read_u32()?;
        let archive_md5_size = reader.read_u32()?;
        let other_md5_size = reader.read_u32()?;
        let signature_size = reader.read_u32()?;
        debug!(
            "v2 sections: file data {file_data_size}, archive md5 {archive_md5_size}, \
             other md5 {other_md5_size}, signature {signature_size}"
        );
    }

    let tree_start = input.len() - reader.remaining();
    let extensions = parse_tree(&mut reader)?;
    let consumed = input.len() - reader.remaining() - tree_start;
    if consumed != tree_size as usize {
        warn!("Directory tree consumed {consumed} bytes, header declared {tree_size}");
    }

    Ok(Directory {
        version,
        tree_size,
        extensions,
    })
}

/// Parse the nested extension → path → file runs. Each run is a
/// sequence of sibling records terminated by an empty name.
fn parse_tree(reader: &mut TreeReader<'_>) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();

    loop {
        let ext_name = reader.read_name()?;
        if ext_name.is_empty() {
            break;
        }

        let mut paths = Vec::new();
        loop {
            let path_name = reader.read_name()?;
            if path_name.is_empty() {
                break;
            }

            let mut files = Vec::new();
            loop {
                let file_name = reader.read_name()?;
                if file_name.is_empty() {
                    break;
                }

                let entry = read_entry(reader)?;
                // Inline preload bytes sit between this entry and the
                // next sibling record.
                reader.skip(entry.preload_bytes as usize)?;

                push_checked(
                    &mut files,
                    FileEntry {
                        name: file_name.to_owned(),
                        entry,
                    },
                )?;
            }

            push_checked(
                &mut paths,
                DirPath {
                    name: path_name.to_owned(),
                    files,
                },
            )?;
        }

        push_checked(
            &mut extensions,
            Extension {
                name: ext_name.to_owned(),
                paths,
            },
        )?;
    }

    Ok(extensions)
}

fn read_entry(reader: &mut TreeReader<'_>) -> Result<Entry> {
    let crc = reader.read_u32()?;
    let preload_bytes = reader.read_u16()?;
    let archive_index = reader.read_u16()?;
    let archive_offset = reader.read_u32()?;
    let length = reader.read_u32()?;

    let terminator = reader.read_u16()?;
    if terminator != ENTRY_TERMINATOR {
        return Err(Error::corrupted(format!(
            "bad entry terminator {terminator:#06x}"
        )));
    }

    Ok(Entry {
        crc,
        preload_bytes,
        archive_index,
        archive_offset,
        length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_name() {
        let mut reader = TreeReader::new(b"vtf\0\0rest");
        assert_eq!(reader.read_name().unwrap(), "vtf");
        assert_eq!(reader.read_name().unwrap(), "");
        assert_eq!(reader.remaining(), 4);
    }

    #[test]
    fn test_read_name_unterminated() {
        let mut reader = TreeReader::new(b"vtf");
        assert!(matches!(reader.read_name(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_skip_past_end() {
        let mut reader = TreeReader::new(b"ab");
        assert!(reader.skip(2).is_ok());
        assert!(matches!(reader.skip(1), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_fixed_width_reads() {
        let mut reader = TreeReader::new(&[0x34, 0x12, 0xaa, 0x55, 0xff, 0xff]);
        assert_eq!(reader.read_u32().unwrap(), VPK_SIGNATURE);
        assert_eq!(reader.read_u16().unwrap(), 0xffff);
        assert!(matches!(reader.read_u16(), Err(Error::UnexpectedEof)));
    }
}
