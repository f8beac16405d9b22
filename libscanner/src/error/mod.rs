//! Error types for the scanner library
//!
//! Every fallible operation in the library returns [`ScanError`]. The core never
//! retries; callers use [`ScanError::is_transient`] to decide whether another
//! attempt is worthwhile.

use thiserror::Error;


/// Main error type for scanner operations
#[derive(Error, Debug)]
pub enum ScanError {
    /// Malformed or empty image reference
    #[error("Invalid image reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    /// Token issuance failed
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// The manifest carried no `config` descriptor
    #[error("No config found in manifest for {reference}")]
    MissingConfig { reference: String },

    /// A registry API call answered with a non-success status
    #[error("Registry request to {url} failed (status: {status_code}): {message}")]
    RegistryRequest {
        message: String,
        url: String,
        status_code: u16,
    },

    /// A GitHub API call answered with a non-success status
    #[error("API request to {url} failed (status: {status_code}): {message}")]
    Api {
        message: String,
        url: String,
        status_code: u16,
    },

    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        timeout: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors (bad digest, unparsable body, invalid pattern)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, bad values)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unrecognized output format selection
    #[error("Unknown output format '{value}' (expected table, json, yaml or markdown)")]
    Format { value: String },
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Creates a new invalid reference error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// let err = ScanError::invalid_reference("", "reference is empty");
    /// assert!(matches!(err, ScanError::InvalidReference { .. }));
    /// ```
    pub fn invalid_reference<R: Into<String>, M: Into<String>>(reference: R, message: M) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// let err = ScanError::authentication("token request rejected", Some(401));
    /// assert!(matches!(err, ScanError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new missing config error.
    pub fn missing_config<S: Into<String>>(reference: S) -> Self {
        Self::MissingConfig {
            reference: reference.into(),
        }
    }

    /// Creates a new registry request error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// let err = ScanError::registry_request("not found", "https://ghcr.io/v2/x/tags/list", 404);
    /// assert!(matches!(err, ScanError::RegistryRequest { status_code: 404, .. }));
    /// ```
    pub fn registry_request<M: Into<String>, U: Into<String>>(
        message: M,
        url: U,
        status_code: u16,
    ) -> Self {
        Self::RegistryRequest {
            message: message.into(),
            url: url.into(),
            status_code,
        }
    }

    /// Creates a new API error.
    pub fn api<M: Into<String>, U: Into<String>>(message: M, url: U, status_code: u16) -> Self {
        Self::Api {
            message: message.into(),
            url: url.into(),
            status_code,
        }
    }

    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// let err = ScanError::network("connection refused");
    /// assert!(matches!(err, ScanError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            timeout: false,
            source: None,
        }
    }

    /// Creates a new network error for a request that timed out.
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            timeout: true,
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    /// let err = ScanError::network_with_source("failed to connect", io_err);
    /// assert!(matches!(err, ScanError::Network { .. }));
    /// ```
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            timeout: false,
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// let err = ScanError::validation("invalid manifest format");
    /// assert!(matches!(err, ScanError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// let err = ScanError::config("invalid config file", Some("/path/to/config.yaml"));
    /// assert!(matches!(err, ScanError::Config { .. }));
    /// ```
    pub fn config<S: Into<String>, P: Into<String>>(message: S, path: Option<P>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, P, E>(message: S, path: Option<P>, source: E) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new output format error.
    pub fn format<S: Into<String>>(value: S) -> Self {
        Self::Format {
            value: value.into(),
        }
    }

    /// Returns true when a later attempt of the same operation may succeed.
    ///
    /// Network failures (timeouts included), rate limiting and server-side
    /// errors are transient. Everything else is a property of the input or
    /// the remote content and will fail the same way again.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::error::ScanError;
    ///
    /// assert!(ScanError::timeout("timed out").is_transient());
    /// assert!(!ScanError::missing_config("ghcr.io/org/image:latest").is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::RegistryRequest { status_code, .. } | Self::Api { status_code, .. } => {
                *status_code == 429 || *status_code >= 500
            }
            _ => false,
        }
    }
}
