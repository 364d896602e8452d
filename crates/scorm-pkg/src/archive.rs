//! Zip archive extraction into an in-memory file map.

use crate::ManifestError;
use log::{debug, warn};
use std::io::{self, Cursor, Read};
use thiserror::Error;
use zip::result::ZipError;

/// The manifest filename at the package root.
pub const MANIFEST_FILE: &str = "imsmanifest.xml";

/// Upper bound on the buffer reserved up front for one entry. The declared
/// size comes from the archive and is not trusted.
const MAX_PREALLOC: u64 = 1 << 20;

/// Errors that can occur when loading a content package.
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("failed to read package archive: {0}")]
    Archive(#[from] ZipError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

/// One extracted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// Path inside the archive.
    pub path: String,

    /// Decompressed content.
    pub data: Vec<u8>,
}

/// Extracted files keyed by archive path, in archive entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    files: Vec<PackageFile>,
}

impl FileMap {
    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Content of the file stored under exactly `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.data.as_slice())
    }

    /// Returns true if a file is stored under exactly `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Archive paths in entry order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageFile> {
        self.files.iter()
    }

    /// Index of the first file whose path ends with `href`.
    pub(crate) fn position_by_suffix(&self, href: &str) -> Option<usize> {
        self.files.iter().position(|file| file.path.ends_with(href))
    }

    pub(crate) fn by_index(&self, index: usize) -> Option<&PackageFile> {
        self.files.get(index)
    }
}

/// Result of reading an archive: its files and the manifest text, if any.
#[derive(Debug)]
pub(crate) struct ExtractedArchive {
    pub files: FileMap,
    pub manifest: Option<String>,
}

/// Read every file entry of a zip archive.
///
/// Directory entries are skipped. The first entry named `imsmanifest.xml`
/// (ignoring ASCII case) provides the manifest text; later ones are kept as
/// plain files.
pub(crate) fn read_archive(bytes: &[u8]) -> Result<ExtractedArchive, PackageError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Vec::with_capacity(archive.len());
    let mut manifest: Option<String> = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let path = entry.name().to_string();
        let reserve = usize::try_from(entry.size().min(MAX_PREALLOC)).unwrap_or_default();
        let mut data = Vec::with_capacity(reserve);
        if let Err(e) = entry.read_to_end(&mut data) {
            warn!("cannot decompress '{}': {}", path, e);
            return Err(ZipError::Io(e).into());
        }

        if path.eq_ignore_ascii_case(MANIFEST_FILE) {
            if manifest.is_none() {
                manifest = Some(String::from_utf8_lossy(&data).into_owned());
            } else {
                warn!("ignoring duplicate manifest entry '{}'", path);
            }
        }

        files.push(PackageFile { path, data });
    }

    debug!("extracted {} files from archive", files.len());
    Ok(ExtractedArchive {
        files: FileMap { files },
        manifest,
    })
}
