//! SCORM content package manifest (`imsmanifest.xml`) parsing.

use crate::xml::{attr, child_named, children_named, namespaced_attr, path_text, text_content};
use log::debug;
use serde::Serialize;
use sxd_document::dom::{ChildOfRoot, Element};
use sxd_document::parser;
use thiserror::Error;

/// Version reported when the manifest element has no `version` attribute.
pub const DEFAULT_MANIFEST_VERSION: &str = "1.3";

/// Organization structure used when the attribute is missing.
pub const DEFAULT_STRUCTURE: &str = "hierarchical";

/// Errors that can occur when parsing a manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("failed to parse manifest XML: {0}")]
    Parse(String),

    #[error("invalid manifest structure: {0}")]
    Structure(&'static str),
}

/// Package-level manifest attributes and metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Manifest identifier.
    pub identifier: String,

    /// Manifest version, `"1.3"` when absent.
    pub version: String,

    /// Namespace URI of the manifest element, whether it is bound as the
    /// default namespace or through a prefix (`<imscp:manifest>`). Empty when
    /// the element has no namespace.
    pub xmlns: String,

    /// Metadata block.
    pub metadata: Metadata,

    /// First `schemaversion` found under the manifest.
    pub schemaversion: String,
}

/// The manifest's `<metadata>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub schema: String,
    pub schemaversion: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
}

/// A `<resource>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Identifier, unique within the package.
    pub identifier: String,

    /// The `type` attribute, usually `webcontent`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Entry point relative to the package root.
    pub href: String,

    /// `sco`, `asset`, or empty when undeclared.
    #[serde(rename = "scormType")]
    pub scorm_type: String,

    /// Files that make up the resource.
    pub files: Vec<ResourceFile>,

    /// Identifiers of resources this one depends on.
    pub dependencies: Vec<String>,
}

/// A `<file>` entry of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceFile {
    pub href: String,
}

/// An `<organization>`: one navigable outline over the resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub identifier: String,

    /// Structure tag, `"hierarchical"` when absent.
    pub structure: String,

    pub title: String,

    /// Top-level items.
    pub items: Vec<Item>,
}

/// An `<item>` in an organization tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    pub identifier: String,

    /// Identifier of the resource this item launches.
    pub identifierref: Option<String>,

    /// False only when the attribute is literally `"false"`.
    pub isvisible: bool,

    pub title: String,

    /// Launch parameters appended to the resource href.
    pub parameters: Option<String>,

    /// Child items.
    pub items: Vec<Item>,
}

impl Resource {
    /// Returns true if the resource is declared as an SCO or an asset.
    #[must_use]
    pub fn is_launchable(&self) -> bool {
        self.scorm_type == "sco" || self.scorm_type == "asset"
    }

    /// Returns true if the resource is an SCO or carries no SCORM type.
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        self.scorm_type == "sco" || self.scorm_type.is_empty()
    }
}

impl Item {
    /// Iterate this item and its descendants depth-first, with their depth.
    pub fn walk(&self) -> ItemWalk<'_> {
        ItemWalk {
            stack: vec![(0, self)],
        }
    }
}

/// Depth-first iterator over an item subtree.
#[derive(Debug)]
pub struct ItemWalk<'a> {
    stack: Vec<(usize, &'a Item)>,
}

impl<'a> Iterator for ItemWalk<'a> {
    type Item = (usize, &'a Item);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, item) = self.stack.pop()?;
        self.stack
            .extend(item.items.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, item))
    }
}

/// Everything derived from one `imsmanifest.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedManifest {
    pub manifest: Manifest,

    /// Resources in declaration order.
    pub resources: Vec<Resource>,

    pub organizations: Vec<Organization>,

    /// Value of `<organizations default="...">`.
    pub default_organization_id: Option<String>,
}

impl ParsedManifest {
    /// Parse a manifest from XML text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if the text is not well-formed XML and
    /// [`ManifestError::Structure`] if the root element is not `manifest`.
    pub fn parse(xml: &str) -> Result<Self, ManifestError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let package = parser::parse(xml).map_err(|e| ManifestError::Parse(format!("{e:?}")))?;
        let document = package.as_document();

        let root = document
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(element) => Some(element),
                _ => None,
            })
            .ok_or(ManifestError::Structure("document has no root element"))?;

        if root.name().local_part() != "manifest" {
            return Err(ManifestError::Structure("no manifest element found"));
        }

        let organizations_el = child_named(root, "organizations");
        let parsed = Self {
            manifest: parse_manifest_data(root),
            resources: parse_resources(root),
            organizations: organizations_el.map(parse_organizations).unwrap_or_default(),
            default_organization_id: organizations_el
                .and_then(|el| attr(el, "default"))
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        };

        debug!(
            "parsed manifest '{}': {} resources, {} organizations",
            parsed.manifest.identifier,
            parsed.resources.len(),
            parsed.organizations.len()
        );
        Ok(parsed)
    }

    /// Find a resource by exact identifier.
    #[must_use]
    pub fn resource_by_id(&self, identifier: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|resource| resource.identifier == identifier)
    }

    /// The organization named by the `default` attribute, else the first one.
    #[must_use]
    pub fn default_organization(&self) -> Option<&Organization> {
        self.default_organization_id
            .as_deref()
            .and_then(|id| {
                self.organizations
                    .iter()
                    .find(|organization| organization.identifier == id)
            })
            .or_else(|| self.organizations.first())
    }

    /// The resource an item points to, if any.
    #[must_use]
    pub fn item_resource(&self, item: &Item) -> Option<&Resource> {
        item.identifierref
            .as_deref()
            .and_then(|id| self.resource_by_id(id))
    }
}

fn parse_manifest_data(manifest: Element<'_>) -> Manifest {
    Manifest {
        identifier: attr(manifest, "identifier").unwrap_or_default().to_string(),
        version: attr(manifest, "version")
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_MANIFEST_VERSION)
            .to_string(),
        xmlns: manifest
            .name()
            .namespace_uri()
            .unwrap_or_default()
            .to_string(),
        metadata: child_named(manifest, "metadata")
            .map(parse_metadata)
            .unwrap_or_default(),
        schemaversion: path_text(manifest, &["schemaversion"]),
    }
}

fn parse_metadata(metadata: Element<'_>) -> Metadata {
    // LOM first, then a flat element of the same name.
    let lom_or_flat = |field: &str| {
        let lom = path_text(metadata, &["lom", "general", field, "string"]);
        if lom.is_empty() {
            path_text(metadata, &[field])
        } else {
            lom
        }
    };

    Metadata {
        schema: path_text(metadata, &["schema"]),
        schemaversion: path_text(metadata, &["schemaversion"]),
        title: lom_or_flat("title"),
        description: lom_or_flat("description"),
        keywords: lom_or_flat("keyword"),
    }
}

fn parse_resources(manifest: Element<'_>) -> Vec<Resource> {
    let Some(resources) = child_named(manifest, "resources") else {
        return Vec::new();
    };

    children_named(resources, "resource")
        .into_iter()
        .map(|el| Resource {
            identifier: attr(el, "identifier").unwrap_or_default().to_string(),
            kind: attr(el, "type").unwrap_or_default().to_string(),
            href: attr(el, "href").unwrap_or_default().to_string(),
            scorm_type: namespaced_attr(el, "scormType")
                .or_else(|| attr(el, "scormType"))
                .unwrap_or_default()
                .to_string(),
            files: children_named(el, "file")
                .into_iter()
                .map(|file| ResourceFile {
                    href: attr(file, "href").unwrap_or_default().to_string(),
                })
                .collect(),
            dependencies: children_named(el, "dependency")
                .into_iter()
                .filter_map(|dep| attr(dep, "identifierref"))
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

fn parse_organizations(organizations: Element<'_>) -> Vec<Organization> {
    children_named(organizations, "organization")
        .into_iter()
        .map(|el| Organization {
            identifier: attr(el, "identifier").unwrap_or_default().to_string(),
            structure: attr(el, "structure")
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_STRUCTURE)
                .to_string(),
            title: direct_title(el),
            items: parse_items(el),
        })
        .collect()
}

fn parse_items(parent: Element<'_>) -> Vec<Item> {
    children_named(parent, "item")
        .into_iter()
        .map(|el| Item {
            identifier: attr(el, "identifier").unwrap_or_default().to_string(),
            identifierref: attr(el, "identifierref")
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            isvisible: attr(el, "isvisible") != Some("false"),
            title: direct_title(el),
            parameters: attr(el, "parameters")
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            items: parse_items(el),
        })
        .collect()
}

fn direct_title(el: Element<'_>) -> String {
    child_named(el, "title").map(text_content).unwrap_or_default()
}
