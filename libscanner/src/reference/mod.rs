//! Image reference normalization.
//!
//! Splits a free-form image reference such as `ghcr.io/org/name`, `org/name` or
//! `name` into a registry host and a repository path, following the same rules
//! as the Docker CLI: the first path segment is a host only when it looks like
//! one (contains `.` or `:`, or is `localhost`).

use crate::error::{Result, ScanError};
use std::fmt;
use std::str::FromStr;


/// Registry used when a reference names no host.
pub const DEFAULT_DOMAIN: &str = "docker.io";

/// Namespace prepended to bare image names on the default registry.
pub const OFFICIAL_REPO_NAME: &str = "library";

/// Result of parsing a reference, before the default host is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    /// The reference starts with a registry host.
    Explicit { host: String, path: String },
    /// No host segment; the default registry applies.
    Implicit { path: String },
}

impl ParsedReference {
    /// Returns the repository path.
    pub fn path(&self) -> &str {
        match self {
            Self::Explicit { path, .. } | Self::Implicit { path } => path,
        }
    }
}

/// Parses a reference into its host-present or host-absent form.
///
/// # Examples
///
/// ```
/// use libscanner::reference::{parse, ParsedReference};
///
/// let parsed = parse("ghcr.io/ublue-os/bazzite").unwrap();
/// assert_eq!(
///     parsed,
///     ParsedReference::Explicit {
///         host: "ghcr.io".to_string(),
///         path: "ublue-os/bazzite".to_string(),
///     }
/// );
/// ```
pub fn parse(reference: &str) -> Result<ParsedReference> {
    if reference.trim().is_empty() {
        return Err(ScanError::invalid_reference(reference, "reference is empty"));
    }

    let Some((first, rest)) = reference.split_once('/') else {
        return Ok(ParsedReference::Implicit {
            path: format!("{}/{}", OFFICIAL_REPO_NAME, reference),
        });
    };

    if first.is_empty() {
        return Err(ScanError::invalid_reference(
            reference,
            "reference starts with '/'",
        ));
    }

    if !is_host(first) {
        return Ok(ParsedReference::Implicit {
            path: reference.to_string(),
        });
    }

    if rest.is_empty() {
        return Err(ScanError::invalid_reference(
            reference,
            "repository path is empty",
        ));
    }
    if rest.starts_with('/') {
        return Err(ScanError::invalid_reference(
            reference,
            "repository path starts with '/'",
        ));
    }

    Ok(ParsedReference::Explicit {
        host: first.to_string(),
        path: rest.to_string(),
    })
}

/// A segment names a registry host if it has a domain dot, a port colon, or is `localhost`.
fn is_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

/// Normalizes a reference into a [`Reference`] with a concrete registry host.
///
/// # Examples
///
/// ```
/// use libscanner::reference::normalize;
///
/// let reference = normalize("test").unwrap();
/// assert_eq!(reference.host(), "docker.io");
/// assert_eq!(reference.path(), "library/test");
/// ```
pub fn normalize(reference: &str) -> Result<Reference> {
    let reference = match parse(reference)? {
        ParsedReference::Explicit { host, path } => Reference { host, path },
        ParsedReference::Implicit { path } => Reference {
            host: DEFAULT_DOMAIN.to_string(),
            path,
        },
    };
    Ok(reference)
}

/// A normalized image reference: registry host plus repository path.
///
/// The host is never empty and the path never starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    host: String,
    path: String,
}

impl Reference {
    /// Returns the registry host (e.g. `ghcr.io`, `localhost:5000`).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the repository path (e.g. `ublue-os/bazzite`).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the pair as owned strings.
    pub fn into_parts(self) -> (String, String) {
        (self.host, self.path)
    }
}

impl FromStr for Reference {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.path)
    }
}
