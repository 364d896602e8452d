//! `scorm inspect` and `scorm launch`.

use anyhow::{bail, Context, Result};
use scorm_pkg::{ContentPackage, LaunchPolicy, ParsedManifest};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Leading bytes of a zip local file header or an empty archive.
const ZIP_MAGIC: [&[u8]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];

/// Load `path` as a zip archive, or as a bare manifest when it is not one.
pub fn load_package(path: &Path, policy: LaunchPolicy) -> Result<ContentPackage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    let mut package = ContentPackage::with_policy(policy);

    if ZIP_MAGIC.iter().any(|magic| bytes.starts_with(magic)) {
        package
            .extract_archive(&bytes)
            .with_context(|| format!("Failed to extract '{}'", path.display()))?;
    } else {
        let xml = String::from_utf8_lossy(&bytes);
        package
            .parse_manifest(&xml)
            .with_context(|| format!("Failed to parse '{}'", path.display()))?;
    }
    Ok(package)
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    parsed: &'a ParsedManifest,

    starting_resource: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<&'a str>>,
}

/// Describe the package at `path`.
pub fn inspect(path: &Path, json: bool, policy: LaunchPolicy, out: &mut impl Write) -> Result<()> {
    let package = load_package(path, policy)?;
    let Some(parsed) = package.manifest() else {
        bail!("'{}' contains no {}", path.display(), scorm_pkg::MANIFEST_FILE);
    };

    if json {
        let report = Report {
            parsed,
            starting_resource: package
                .starting_resource()
                .map(|resource| resource.identifier.as_str()),
            files: package.files().map(|files| files.paths().collect()),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write_summary(&package, parsed, out)?;
    }
    Ok(())
}

fn write_summary(
    package: &ContentPackage,
    parsed: &ParsedManifest,
    out: &mut impl Write,
) -> Result<()> {
    let manifest = &parsed.manifest;
    writeln!(
        out,
        "Package: {} (version {})",
        manifest.identifier, manifest.version
    )?;
    if !manifest.metadata.title.is_empty() {
        writeln!(out, "Title: {}", manifest.metadata.title)?;
    }
    if !manifest.metadata.schema.is_empty() || !manifest.schemaversion.is_empty() {
        writeln!(
            out,
            "Schema: {} {}",
            manifest.metadata.schema, manifest.schemaversion
        )?;
    }
    if let Some(files) = package.files() {
        writeln!(out, "Files: {}", files.len())?;
    }

    writeln!(out)?;
    writeln!(out, "Resources ({}):", parsed.resources.len())?;
    for resource in &parsed.resources {
        let kind = if resource.scorm_type.is_empty() {
            "-"
        } else {
            resource.scorm_type.as_str()
        };
        writeln!(
            out,
            "  [{}] {} -> {}",
            kind, resource.identifier, resource.href
        )?;
    }

    let default_id = parsed
        .default_organization()
        .map(|organization| organization.identifier.as_str());
    for organization in &parsed.organizations {
        writeln!(out)?;
        let marker = if Some(organization.identifier.as_str()) == default_id {
            " [default]"
        } else {
            ""
        };
        writeln!(
            out,
            "Organization: {} ({}){}",
            organization.title, organization.identifier, marker
        )?;
        for item in &organization.items {
            for (depth, item) in item.walk() {
                let indent = "  ".repeat(depth + 1);
                let target = parsed
                    .item_resource(item)
                    .map(|resource| format!(" -> {}", resource.href))
                    .unwrap_or_default();
                let hidden = if item.isvisible { "" } else { " (hidden)" };
                writeln!(out, "{}- {}{}{}", indent, item.title, target, hidden)?;
            }
        }
    }

    writeln!(out)?;
    match package.starting_resource() {
        Some(resource) => writeln!(
            out,
            "Starting resource: {} ({})",
            resource.identifier, resource.href
        )?,
        None => writeln!(out, "Starting resource: none")?,
    }
    Ok(())
}

/// Resolve the starting resource of an archive to a handle and report it.
pub fn launch(path: &Path, policy: LaunchPolicy, out: &mut impl Write) -> Result<()> {
    let mut package = load_package(path, policy)?;
    if package.files().is_none() {
        bail!("'{}' is not a zip archive", path.display());
    }

    let Some(resource) = package.starting_resource() else {
        bail!("'{}' declares no resources", path.display());
    };
    let identifier = resource.identifier.clone();
    let href = resource.href.clone();

    let Some(handle) = package.resource_url(&href) else {
        bail!("starting resource '{}' ({}) is not in the archive", identifier, href);
    };
    let file = package.handle_path(&handle).unwrap_or_default().to_string();
    let size = package.open_handle(&handle).map_or(0, <[u8]>::len);

    writeln!(out, "Resource: {}", identifier)?;
    writeln!(out, "File: {} ({} bytes)", file, size)?;
    writeln!(out, "URL: {}", handle)?;

    package.release_handle(&handle);
    log::debug!("{} handles live after launch", package.live_handles());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<?xml version="1.0"?>
<manifest identifier="demo" xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <metadata><schema>ADL SCORM</schema><schemaversion>1.2</schemaversion></metadata>
  <organizations default="org-1">
    <organization identifier="org-1">
      <title>Demo Course</title>
      <item identifier="i1" identifierref="r1"><title>Lesson 1</title></item>
      <item identifier="i2" isvisible="false"><title>Hidden</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="r1" type="webcontent" adlcp:scormType="sco" href="index.html"/>
  </resources>
</manifest>"#;

    #[test]
    fn summary_of_bare_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("imsmanifest.xml");
        fs::write(&path, MANIFEST).unwrap();

        let mut out = Vec::new();
        inspect(&path, false, LaunchPolicy::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Package: demo (version 1.3)"));
        assert!(text.contains("Schema: ADL SCORM 1.2"));
        assert!(text.contains("  [sco] r1 -> index.html"));
        assert!(text.contains("Organization: Demo Course (org-1) [default]"));
        assert!(text.contains("  - Lesson 1 -> index.html"));
        assert!(text.contains("  - Hidden (hidden)"));
        assert!(text.contains("Starting resource: r1 (index.html)"));
        assert!(!text.contains("Files:"));
    }

    #[test]
    fn json_report() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("imsmanifest.xml");
        fs::write(&path, MANIFEST).unwrap();

        let mut out = Vec::new();
        inspect(&path, true, LaunchPolicy::default(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["manifest"]["identifier"], "demo");
        assert_eq!(value["resources"][0]["scormType"], "sco");
        assert_eq!(value["starting_resource"], "r1");
        assert!(value.get("files").is_none());
    }

    #[test]
    fn launch_requires_an_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("imsmanifest.xml");
        fs::write(&path, MANIFEST).unwrap();

        let err = launch(&path, LaunchPolicy::default(), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("is not a zip archive"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = load_package(Path::new("/nonexistent/pkg.zip"), LaunchPolicy::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
