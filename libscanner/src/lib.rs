//! Scanner - Container Image Metadata Library
//!
//! Scanner collects metadata about container images published to OCI
//! registries: the tags of an image and the labels of its config blob.
//!
//! # Quick Start
//!
//! ```no_run
//! use libscanner::RegistryClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RegistryClient::new("ghcr.io/ublue-os/bazzite")?;
//!
//!     let meta = client.meta("latest")?;
//!     println!("{}: {}", meta.name(), meta.description());
//!     for tag in meta.tags() {
//!         println!("  {}", tag);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`RegistryClient`] - Per-image registry access (tags, manifest, config)
//! - [`ClientConfig`] - Timeout, scheme and token issuer for a client
//! - [`Reference`] - Normalized `host/path` image reference
//! - [`ImageMeta`] - Tags and labels of one image
//! - [`TagFilter`] - Include/exclude regular expressions over tags
//! - [`GithubClient`] - Container packages of a GitHub organization
//! - [`Config`] - YAML configuration with defaults
//!
//! Requests are blocking and a client performs one at a time. Tokens are
//! fetched on first use and reused for the lifetime of the client.

#![warn(clippy::all)]

/// Returns the libscanner crate version.
///
/// # Examples
///
/// ```
/// let version = libscanner::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// Re-export commonly used types for convenience
pub use auth::{AuthStrategy, TokenIssuer};
pub use client::{ClientConfig, RegistryClient};
pub use config::Config;
pub use digest::Digest;
pub use error::{Result, ScanError};
pub use filter::{TagFilter, filter_tags};
pub use github::GithubClient;
pub use meta::ImageMeta;
pub use reference::Reference;

// Lower-level modules, public for callers that need finer control
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod client;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod digest;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod filter;
#[doc(hidden)]
pub mod github;
#[doc(hidden)]
pub mod meta;
#[doc(hidden)]
pub mod reference;
