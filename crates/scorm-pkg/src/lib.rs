//! SCORM content packages.
//!
//! This crate provides:
//! - Parsing of `imsmanifest.xml` into metadata, resources and item trees
//! - Starting-resource selection for launching a package
//! - Zip archive extraction into an in-memory file map
//! - Scoped handles that resolve package files until released

mod archive;
mod handle;
mod manifest;
mod package;
mod xml;

pub use archive::{FileMap, PackageError, PackageFile, MANIFEST_FILE};
pub use handle::{ResourceHandle, HANDLE_PREFIX};
pub use manifest::{
    Item, ItemWalk, Manifest, ManifestError, Metadata, Organization, ParsedManifest, Resource,
    ResourceFile, DEFAULT_MANIFEST_VERSION, DEFAULT_STRUCTURE,
};
pub use package::{ContentPackage, LaunchPolicy, DEFAULT_LAUNCHER_FRAGMENTS};
