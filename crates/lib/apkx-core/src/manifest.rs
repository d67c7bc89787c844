use std::{error::Error, fmt, io, path::Path};

use roxmltree::{Document, Node};
use serde::Serialize;

pub const MANIFEST_FILE: &str = "AndroidManifest.xml";
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Identity fields read from a decoded `AndroidManifest.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub package: String,
    pub version_name: String,
    pub version_code: String,
}

impl Default for ManifestSummary {
    fn default() -> Self {
        Self {
            package: UNKNOWN_FIELD.to_string(),
            version_name: UNKNOWN_FIELD.to_string(),
            version_code: UNKNOWN_FIELD.to_string(),
        }
    }
}

/// Manifest outcome attached to a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ManifestInfo {
    Parsed(ManifestSummary),
    Unavailable { reason: String },
}

#[derive(Debug)]
pub enum ManifestError {
    Io(io::Error),
    Xml(roxmltree::Error),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read manifest: {err}"),
            Self::Xml(err) => write!(f, "failed to parse manifest: {err}"),
        }
    }
}

impl Error for ManifestError {}

impl From<io::Error> for ManifestError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<roxmltree::Error> for ManifestError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml(err)
    }
}

/// Extracts package and version attributes from manifest XML.
///
/// Attributes are matched by local name, so both `android:versionName` and a
/// bare `versionName` are accepted. Missing attributes read as [`UNKNOWN_FIELD`].
///
/// # Errors
/// Returns `ManifestError::Xml` if the document is not well-formed.
pub fn parse_manifest_summary(xml: &str) -> Result<ManifestSummary, ManifestError> {
    let doc = Document::parse(xml)?;
    let Some(manifest) = doc
        .descendants()
        .find(|node| node.has_tag_name("manifest"))
    else {
        return Ok(ManifestSummary::default());
    };

    Ok(ManifestSummary {
        package: attribute_or_unknown(manifest, "package"),
        version_name: attribute_or_unknown(manifest, "versionName"),
        version_code: attribute_or_unknown(manifest, "versionCode"),
    })
}

/// Reads and parses the manifest at `path`.
///
/// # Errors
/// Returns `ManifestError` if the file cannot be read or parsed.
pub async fn read_manifest_summary(path: &Path) -> Result<ManifestSummary, ManifestError> {
    let xml = tokio::fs::read_to_string(path).await?;
    parse_manifest_summary(&xml)
}

fn attribute_or_unknown(node: Node<'_, '_>, local_name: &str) -> String {
    node.attributes()
        .find(|attr| attr.name() == local_name)
        .map(|attr| attr.value().trim())
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_FIELD)
        .to_string()
}
