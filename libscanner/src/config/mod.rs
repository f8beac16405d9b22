//! Application configuration.
//!
//! Settings are read from a YAML file layered over the built-in defaults, so a
//! file only needs to name the values it changes.

use crate::auth::{AuthStrategy, TokenIssuer};
use crate::client::ClientConfig;
use crate::error::{Result, ScanError};
use crate::github::DEFAULT_API_URL;
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;


/// Root configuration structure.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub registry: Registry,
    #[serde(default)]
    pub github: Github,
    /// Image names skipped by `scan` and `badges`
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub badges: Badges,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(Self::defaults()?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// Without a path the defaults are returned. A given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder().add_source(Self::defaults()?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        Self::from_builder(builder, path.map(|p| p.display().to_string()))
    }

    /// Registry client settings derived from `network` and `registry`.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.network.timeout)
            .with_scheme(self.registry.scheme.clone())
            .with_auth_strategy(self.registry.auth_strategy())
    }

    fn defaults() -> Result<ConfigRs> {
        ConfigRs::try_from(&Config::default()).map_err(|e| {
            ScanError::config_with_source("Failed to serialize defaults", None::<String>, e)
        })
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<String>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                ScanError::config_with_source("Failed to deserialize configuration", path, e)
            })
    }

    /// Returns true if `name` is listed under `ignore`.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|i| i == name)
    }
}

/// Output formatting settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Output {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorChoice,
}

/// Output formats.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,

    Json,

    Yaml,

    Markdown,
}

impl FromStr for OutputFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(ScanError::format(s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "markdown",
        };
        f.write_str(name)
    }
}

/// Color output choices.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,

    Always,

    Never,
}

impl From<&str> for ColorChoice {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::Auto,
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        };
        f.write_str(name)
    }
}

/// Network settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    /// Extra attempts per image after a transient failure
    #[serde(default = "default_network_retries")]
    pub retries: u32,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            retries: default_network_retries(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_network_retries() -> u32 {
    1
}

/// Which issuer strategy registry clients use.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthKind {
    #[default]
    Fixed,

    RegistryHost,

    Challenge,
}

/// Registry access settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registry {
    #[serde(default = "default_registry_scheme")]
    pub scheme: String,

    #[serde(default)]
    pub auth: AuthKind,

    /// Used only with `auth: fixed`
    #[serde(default)]
    pub token_issuer: TokenIssuer,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            scheme: default_registry_scheme(),
            auth: AuthKind::default(),
            token_issuer: TokenIssuer::default(),
        }
    }
}

impl Registry {
    /// Builds the client-side strategy for this configuration.
    pub fn auth_strategy(&self) -> AuthStrategy {
        match self.auth {
            AuthKind::Fixed => AuthStrategy::Fixed(self.token_issuer.clone()),
            AuthKind::RegistryHost => AuthStrategy::RegistryHost,
            AuthKind::Challenge => AuthStrategy::Challenge,
        }
    }
}

fn default_registry_scheme() -> String {
    "https".to_string()
}

/// GitHub API settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Github {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    #[serde(default = "default_github_per_page")]
    pub per_page: u32,

    /// Registry that hosts the organization's packages
    #[serde(default = "default_github_registry")]
    pub registry: String,
}

impl Default for Github {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            per_page: default_github_per_page(),
            registry: default_github_registry(),
        }
    }
}

fn default_github_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_github_per_page() -> u32 {
    100
}

fn default_github_registry() -> String {
    "ghcr.io".to_string()
}

/// Default tag patterns for `badges`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Badges {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}
