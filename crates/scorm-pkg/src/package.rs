//! A loaded content package: manifest state, launch selection and files.
//!
//! ```text
//! course.zip
//! ├── imsmanifest.xml       # Package manifest
//! ├── index.html            # SCO entry point (resource href)
//! └── scormdriver/
//!     └── indexAPI.html     # Vendor launcher, preferred when present
//! ```

use crate::archive::{read_archive, FileMap, PackageError};
use crate::handle::{HandleTable, ResourceHandle};
use crate::{ManifestError, Organization, ParsedManifest, Resource};
use log::{debug, info};
use std::path::Path;

/// Launcher paths generated by authoring tools whose resources are the real
/// entry point even without a declared SCORM type.
pub const DEFAULT_LAUNCHER_FRAGMENTS: &[&str] = &["scormdriver/indexAPI.html"];

/// How the starting resource of a package is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPolicy {
    /// Href fragments that mark a vendor launcher.
    pub launcher_fragments: Vec<String>,
}

impl Default for LaunchPolicy {
    fn default() -> Self {
        Self {
            launcher_fragments: DEFAULT_LAUNCHER_FRAGMENTS
                .iter()
                .map(|fragment| (*fragment).to_string())
                .collect(),
        }
    }
}

impl LaunchPolicy {
    /// The default fragments plus `extra`.
    pub fn with_extra_fragments<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self::default();
        for fragment in extra {
            let fragment = fragment.into();
            if !fragment.is_empty() && !policy.launcher_fragments.contains(&fragment) {
                policy.launcher_fragments.push(fragment);
            }
        }
        policy
    }

    /// Pick the starting resource.
    ///
    /// A vendor launcher wins over a declared SCO or asset, which wins over
    /// the first declared resource.
    #[must_use]
    pub fn starting_resource<'a>(&self, resources: &'a [Resource]) -> Option<&'a Resource> {
        resources
            .iter()
            .find(|resource| self.is_launcher(&resource.href))
            .or_else(|| resources.iter().find(|resource| resource.is_launchable()))
            .or_else(|| resources.first())
    }

    fn is_launcher(&self, href: &str) -> bool {
        !href.is_empty()
            && self
                .launcher_fragments
                .iter()
                .any(|fragment| href.contains(fragment.as_str()))
    }
}

/// Holds at most one package: its parsed manifest, its extracted files and
/// the handles issued for those files.
#[derive(Debug, Default)]
pub struct ContentPackage {
    policy: LaunchPolicy,
    parsed: Option<ParsedManifest>,
    files: Option<FileMap>,
    handles: HandleTable,
}

impl ContentPackage {
    /// Create an empty package holder with the default launch policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty package holder with a custom launch policy.
    #[must_use]
    pub fn with_policy(policy: LaunchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn policy(&self) -> &LaunchPolicy {
        &self.policy
    }

    /// Parse a manifest and make it the current one.
    ///
    /// Extracted files and issued handles are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed or has no manifest root.
    pub fn parse_manifest(&mut self, xml: &str) -> Result<&ParsedManifest, ManifestError> {
        let parsed = ParsedManifest::parse(xml)?;
        Ok(self.parsed.insert(parsed))
    }

    /// The current manifest, if one was parsed.
    #[must_use]
    pub fn manifest(&self) -> Option<&ParsedManifest> {
        self.parsed.as_ref()
    }

    /// Declared resources, in order.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        self.parsed
            .as_ref()
            .map(|parsed| parsed.resources.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn organizations(&self) -> &[Organization] {
        self.parsed
            .as_ref()
            .map(|parsed| parsed.organizations.as_slice())
            .unwrap_or_default()
    }

    /// The resource to launch first, if there are any resources.
    #[must_use]
    pub fn starting_resource(&self) -> Option<&Resource> {
        self.policy.starting_resource(self.resources())
    }

    /// Resources that are SCOs or carry no SCORM type, in declaration order.
    #[must_use]
    pub fn navigable_resources(&self) -> Vec<&Resource> {
        self.resources()
            .iter()
            .filter(|resource| resource.is_navigable())
            .collect()
    }

    /// Exact, case-sensitive lookup by identifier.
    #[must_use]
    pub fn resource_by_id(&self, identifier: &str) -> Option<&Resource> {
        self.parsed
            .as_ref()
            .and_then(|parsed| parsed.resource_by_id(identifier))
    }

    /// Extract a zip archive and make it the current package.
    ///
    /// The manifest found at the archive root is parsed as part of the
    /// extraction. On success every previous manifest, file and handle is
    /// discarded; on failure the previous package stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is unreadable or its manifest is invalid.
    pub fn extract_archive(&mut self, bytes: &[u8]) -> Result<&FileMap, PackageError> {
        let extracted = read_archive(bytes)?;
        let parsed = extracted
            .manifest
            .as_deref()
            .map(ParsedManifest::parse)
            .transpose()?;

        self.close();
        if parsed.is_none() {
            debug!("archive has no {}", crate::MANIFEST_FILE);
        }
        self.parsed = parsed;
        info!("loaded package with {} files", extracted.files.len());
        Ok(self.files.insert(extracted.files))
    }

    /// Read an archive from disk and extract it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or extraction fails.
    pub fn extract_path(&mut self, path: impl AsRef<Path>) -> Result<&FileMap, PackageError> {
        let bytes = std::fs::read(path)?;
        self.extract_archive(&bytes)
    }

    /// Files of the current package, if an archive was extracted.
    #[must_use]
    pub fn files(&self) -> Option<&FileMap> {
        self.files.as_ref()
    }

    /// Issue a handle for the first file whose path ends with `href`.
    pub fn resource_url(&mut self, href: &str) -> Option<ResourceHandle> {
        if href.is_empty() {
            return None;
        }
        let index = self.files.as_ref()?.position_by_suffix(href)?;
        Some(self.handles.issue(index))
    }

    /// Content behind a live handle.
    #[must_use]
    pub fn open_handle(&self, handle: &ResourceHandle) -> Option<&[u8]> {
        let index = self.handles.resolve(handle)?;
        self.files
            .as_ref()?
            .by_index(index)
            .map(|file| file.data.as_slice())
    }

    /// Content behind a handle given in URL form.
    #[must_use]
    pub fn open_url(&self, url: &str) -> Option<&[u8]> {
        ResourceHandle::from_url(url).and_then(|handle| self.open_handle(&handle))
    }

    /// Archive path behind a live handle.
    #[must_use]
    pub fn handle_path(&self, handle: &ResourceHandle) -> Option<&str> {
        let index = self.handles.resolve(handle)?;
        self.files
            .as_ref()?
            .by_index(index)
            .map(|file| file.path.as_str())
    }

    /// Release one handle. Returns false if it was not live.
    pub fn release_handle(&mut self, handle: &ResourceHandle) -> bool {
        self.handles.release(handle)
    }

    /// Number of handles issued and not yet released.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    /// Drop the current package and release all of its handles.
    pub fn close(&mut self) {
        self.handles.release_all();
        self.parsed = None;
        self.files = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(identifier: &str, href: &str, scorm_type: &str) -> Resource {
        Resource {
            identifier: identifier.to_string(),
            href: href.to_string(),
            scorm_type: scorm_type.to_string(),
            ..Resource::default()
        }
    }

    #[test]
    fn launcher_beats_sco_in_any_order() {
        let policy = LaunchPolicy::default();
        let launcher = resource("rise", "scormdriver/indexAPI.html", "");
        let sco = resource("sco", "index.html", "sco");

        let resources = vec![sco.clone(), launcher.clone()];
        assert_eq!(policy.starting_resource(&resources).unwrap().identifier, "rise");

        let resources = vec![launcher, sco];
        assert_eq!(policy.starting_resource(&resources).unwrap().identifier, "rise");
    }

    #[test]
    fn typed_resource_beats_first_declared() {
        let policy = LaunchPolicy::default();
        let resources = vec![
            resource("plain", "readme.html", ""),
            resource("asset", "media.html", "asset"),
        ];
        assert_eq!(policy.starting_resource(&resources).unwrap().identifier, "asset");

        let resources = vec![resource("plain", "readme.html", "")];
        assert_eq!(policy.starting_resource(&resources).unwrap().identifier, "plain");
    }

    #[test]
    fn empty_resources_have_no_start() {
        assert!(LaunchPolicy::default().starting_resource(&[]).is_none());
        assert!(ContentPackage::new().starting_resource().is_none());
    }

    #[test]
    fn extra_fragments_extend_defaults() {
        let policy = LaunchPolicy::with_extra_fragments(["story_html5.html", ""]);
        assert_eq!(policy.launcher_fragments.len(), 2);

        let resources = vec![
            resource("sco", "index.html", "sco"),
            resource("story", "story_html5.html", ""),
        ];
        assert_eq!(policy.starting_resource(&resources).unwrap().identifier, "story");
    }

    #[test]
    fn navigable_resources_keep_order() {
        let mut package = ContentPackage::new();
        package
            .parse_manifest(
                r#"<manifest xmlns:adlcp="urn:adlcp"><resources>
                  <resource identifier="a" href="a.html" adlcp:scormType="sco"/>
                  <resource identifier="b" href="b.css" adlcp:scormType="asset"/>
                  <resource identifier="c" href="c.html"/>
                </resources></manifest>"#,
            )
            .unwrap();

        let ids: Vec<_> = package
            .navigable_resources()
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(package.resource_by_id("b").unwrap().href, "b.css");
        assert!(package.resource_by_id("B").is_none());
    }

    #[test]
    fn resource_url_needs_extracted_files() {
        let mut package = ContentPackage::new();
        package.parse_manifest("<manifest/>").unwrap();
        assert!(package.resource_url("index.html").is_none());
        assert!(package.resource_url("").is_none());
    }
}
