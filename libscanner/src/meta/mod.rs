//! Assembled image metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;


/// OCI label holding a human readable description.
pub const LABEL_DESCRIPTION: &str = "org.opencontainers.image.description";
/// OCI label holding the image title.
pub const LABEL_TITLE: &str = "org.opencontainers.image.title";
/// OCI label holding the RFC 3339 creation time.
pub const LABEL_CREATED: &str = "org.opencontainers.image.created";
/// Artifact Hub label holding a logo URL.
pub const LABEL_LOGO_URL: &str = "io.artifacthub.package.logo-url";

/// Metadata for one image: its repository path, tags and config labels.
///
/// Tags keep the order the registry returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    name: String,
    tags: Vec<String>,
    labels: BTreeMap<String, String>,
}

impl ImageMeta {
    /// Creates a new `ImageMeta`.
    pub fn new(
        name: impl Into<String>,
        tags: Vec<String>,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            labels,
        }
    }

    /// Repository path of the image.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags as returned by the registry.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// All config labels.
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Looks up a single label.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    fn label_or_empty(&self, key: &str) -> &str {
        self.label(key).unwrap_or("")
    }

    /// `org.opencontainers.image.description`, or `""`.
    pub fn description(&self) -> &str {
        self.label_or_empty(LABEL_DESCRIPTION)
    }

    /// `org.opencontainers.image.title`, or `""`.
    pub fn title(&self) -> &str {
        self.label_or_empty(LABEL_TITLE)
    }

    /// `org.opencontainers.image.created`, or `""`.
    pub fn created(&self) -> &str {
        self.label_or_empty(LABEL_CREATED)
    }

    /// `io.artifacthub.package.logo-url`, or `""`.
    pub fn logo(&self) -> &str {
        self.label_or_empty(LABEL_LOGO_URL)
    }
}
