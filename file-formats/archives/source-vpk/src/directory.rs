//! Owned directory tree built from a parsed VPK directory file

use crate::entry::Entry;
use crate::parser::parse_directory;
use crate::{Error, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// One file record inside a [`DirPath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name without extension or path
    pub name: String,
    /// Payload location metadata
    pub entry: Entry,
}

/// One path (folder) grouping files that share an extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPath {
    /// Path name relative to the package root, without a trailing slash
    pub name: String,
    /// Files under this path, in on-disk encounter order
    pub files: Vec<FileEntry>,
}

impl DirPath {
    /// Look up a file by name
    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.name == name)
    }
}

/// One extension grouping all paths that contain files with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Extension name without the leading dot
    pub name: String,
    /// Paths under this extension, in on-disk encounter order
    pub paths: Vec<DirPath>,
}

impl Extension {
    /// Look up a path by name
    pub fn path(&self, name: &str) -> Option<&DirPath> {
        self.paths.iter().find(|p| p.name == name)
    }
}

/// Parsed VPK directory tree.
///
/// The tree nests extension → path → file exactly as encountered in the
/// byte stream; no sorting or regrouping is performed. The directory
/// owns every name and entry record, so dropping it releases the whole
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Directory format version (1 or 2)
    pub version: u32,
    /// Size of the tree section as declared by the header
    pub tree_size: u32,
    /// Extensions in on-disk encounter order
    pub extensions: Vec<Extension>,
}

impl Directory {
    /// Read and parse a VPK directory file from the file system
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

    /// Parse a VPK directory from an in-memory buffer
    pub fn parse(input: &[u8]) -> Result<Self> {
        parse_directory(input)
    }

    /// Look up an extension by name
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.name == name)
    }

    /// Total number of file records in the tree
    pub fn file_count(&self) -> usize {
        self.extensions
            .iter()
            .flat_map(|e| &e.paths)
            .map(|p| p.files.len())
            .sum()
    }

    /// Iterate over every file record in encounter order
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.extensions
            .iter()
            .flat_map(|e| &e.paths)
            .flat_map(|p| &p.files)
    }

    /// Look up a file by its full package path, e.g.
    /// `materials/brick/wall01.vtf`.
    ///
    /// Files stored at the package root are recorded under the blank
    /// path name `" "`, which is also accepted here as an empty path
    /// component.
    pub fn find(&self, full_path: &str) -> Option<&FileEntry> {
        let (dir, file) = match full_path.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => ("", full_path),
        };
        let (stem, ext) = file.rsplit_once('.')?;

        let extension = self.extension(ext)?;
        let path = if dir.is_empty() {
            extension.path("").or_else(|| extension.path(" "))?
        } else {
            extension.path(dir)?
        };
        path.file(stem)
    }
}
