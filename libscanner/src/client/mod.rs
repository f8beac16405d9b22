//! Blocking HTTP client for a single image on an OCI registry.
//!
//! A [`RegistryClient`] is bound to one normalized reference. It obtains an
//! anonymous pull token on first use, keeps it for its whole lifetime, and
//! exposes the tag list, manifest and blob endpoints of the OCI Distribution
//! Specification v2 API on top of which [`RegistryClient::meta`] assembles an
//! [`ImageMeta`].

use crate::auth::{self, AuthState, AuthStrategy};
use crate::digest::Digest;
use crate::error::{Result, ScanError};
use crate::meta::ImageMeta;
use crate::reference::{self, Reference};
use log::{debug, trace};
use oci_spec::image::MediaType;
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;


/// Registry API version segment used in every URL.
pub const API_VERSION: &str = "v2";

/// Tag used when the caller does not name one.
pub const DEFAULT_TAG: &str = "latest";

const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
const DOCKER_MANIFEST_LIST_V2: &str = "application/vnd.docker.distribution.manifest.list.v2+json";

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// List of tag names; some registries send `null` for untagged repositories
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// The `config` section of an image configuration blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRuntimeConfig {
    /// Image labels; Docker writes `null` when there are none
    #[serde(rename = "Labels", default)]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ConfigBlob {
    #[serde(default)]
    config: Option<ImageRuntimeConfig>,
}

/// Configuration for the registry client.
///
/// # Examples
///
/// ```
/// use libscanner::auth::AuthStrategy;
/// use libscanner::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_auth_strategy(AuthStrategy::RegistryHost);
/// assert_eq!(config.timeout_seconds, 60);
/// assert_eq!(config.scheme, "https");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// URL scheme used to reach the registry (default: https)
    pub scheme: String,
    /// Where bearer tokens come from
    pub auth: AuthStrategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            scheme: "https".to_string(),
            auth: AuthStrategy::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the URL scheme (`https` or `http`).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the token issuer strategy.
    pub fn with_auth_strategy(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }
}

/// Registry client for one image.
///
/// Each image gets its own client and therefore its own token. Calls that
/// need a token take `&mut self` because the first one stores it.
#[derive(Debug)]
pub struct RegistryClient {
    /// The underlying HTTP client
    http: HttpClient,
    /// Normalized host and repository path
    reference: Reference,
    /// URL scheme for registry calls
    scheme: String,
    /// Request timeout, kept for error messages
    timeout_seconds: u64,
    /// How the token issuer is found
    auth: AuthStrategy,
    /// Token cache
    state: AuthState,
}

impl RegistryClient {
    /// Creates a client for `reference` with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::RegistryClient;
    ///
    /// let client = RegistryClient::new("ghcr.io/ublue-os/bazzite").unwrap();
    /// assert_eq!(client.host(), "ghcr.io");
    /// assert_eq!(client.path(), "ublue-os/bazzite");
    /// assert!(!client.is_authenticated());
    /// ```
    pub fn new(reference: &str) -> Result<Self> {
        Self::with_config(reference, ClientConfig::default())
    }

    /// Creates a client for `reference` with custom configuration.
    pub fn with_config(reference: &str, config: ClientConfig) -> Result<Self> {
        let reference = reference::normalize(reference)?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("libscanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScanError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http,
            reference,
            scheme: config.scheme,
            timeout_seconds: config.timeout_seconds,
            auth: config.auth,
            state: AuthState::Unauthenticated,
        })
    }

    /// Returns the registry host.
    pub fn host(&self) -> &str {
        self.reference.host()
    }

    /// Returns the repository path.
    pub fn path(&self) -> &str {
        self.reference.path()
    }

    /// Returns the normalized reference.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Base URL of the registry API, e.g. `https://ghcr.io/v2`.
    pub fn url(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.host(), API_VERSION)
    }

    /// Returns true once a token has been obtained.
    pub fn is_authenticated(&self) -> bool {
        self.state.token().is_some()
    }

    /// Returns the current authentication state.
    pub fn auth_state(&self) -> &AuthState {
        &self.state
    }

    /// Requests a pull-scope token and caches it.
    ///
    /// On failure the cached state is left untouched, so an unauthenticated
    /// client stays unauthenticated and the next call asks again.
    pub fn login(&mut self) -> Result<()> {
        let issuer = self.auth.resolve(&self.http, &self.scheme, self.reference.host())?;
        let token = auth::request_token(&self.http, &issuer, self.reference.path())?;
        debug!("Obtained pull token for {}", self.reference);
        self.state = AuthState::Authenticated { token };
        Ok(())
    }

    /// Logs in unless a token is already cached, and returns the token.
    pub fn ensure_authenticated(&mut self) -> Result<&str> {
        if !self.is_authenticated() {
            self.login()?;
        }
        self.state
            .token()
            .ok_or_else(|| ScanError::authentication("No token after login", None))
    }

    /// Sends an authenticated request to `{scheme}://{host}/v2{path}`.
    ///
    /// Redirects are followed. The status code is not inspected; callers
    /// decide what a non-success answer means.
    pub fn request(&mut self, path: &str, method: Method) -> Result<Response> {
        self.send(path, method, None)
    }

    fn send(&mut self, path: &str, method: Method, accept: Option<&str>) -> Result<Response> {
        let token = self.ensure_authenticated()?.to_string();
        let url = format!("{}{}", self.url(), path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url).bearer_auth(token);
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }

        request
            .send()
            .map_err(|e| self.translate_reqwest_error(e, &url))
    }

    /// Lists the repository's tags in registry order.
    ///
    /// A body without a `tags` array yields an empty list.
    pub fn tags(&mut self) -> Result<Vec<String>> {
        let path = format!("/{}/tags/list", self.path());
        let response = self.request(&path, Method::GET)?;
        let response = Self::check_response_status(response)?;

        let bytes = self.read_body(response)?;
        let body: TagsResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ScanError::validation_with_source("Failed to parse tags response", e))?;

        let tags = body.tags.unwrap_or_default();
        trace!("{} has {} tags", self.reference, tags.len());
        Ok(tags)
    }

    /// Fetches the manifest for a tag (or digest) as JSON.
    pub fn manifest(&mut self, tag: &str) -> Result<Value> {
        let path = format!("/{}/manifests/{}", self.path(), tag);
        let accept = manifest_accept();
        let response = self.send(&path, Method::GET, Some(&accept))?;
        let response = Self::check_response_status(response)?;

        let bytes = self.read_body(response)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ScanError::validation_with_source("Failed to parse manifest", e))
    }

    /// Fetches a blob, checks it against `digest`, and parses it as JSON.
    pub fn get_blob(&mut self, digest: &str) -> Result<Value> {
        let expected = Digest::from_str(digest)?;

        let path = format!("/{}/blobs/{}", self.path(), expected);
        let response = self.request(&path, Method::GET)?;
        let response = Self::check_response_status(response)?;

        let bytes = self.read_body(response)?;
        trace!("Blob {} is {} bytes", expected, bytes.len());

        expected.verify(&bytes)?;

        serde_json::from_slice(&bytes)
            .map_err(|e| ScanError::validation_with_source("Failed to parse blob as JSON", e))
    }

    /// Fetches the runtime config of the image behind `tag`.
    ///
    /// When the manifest is an index, the first listed manifest is used.
    ///
    /// # Errors
    ///
    /// [`ScanError::MissingConfig`] when the manifest has no `config`
    /// descriptor; no blob is requested in that case.
    pub fn config(&mut self, tag: &str) -> Result<ImageRuntimeConfig> {
        let mut manifest = self.manifest(tag)?;

        if config_descriptor(&manifest).is_none()
            && let Some(first) = first_manifest_digest(&manifest)
        {
            debug!("{}:{} is an index, using manifest {}", self.reference, tag, first);
            manifest = self.manifest(&first)?;
        }

        let descriptor = config_descriptor(&manifest)
            .ok_or_else(|| ScanError::missing_config(format!("{}:{}", self.reference, tag)))?;

        let digest = descriptor
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| ScanError::validation("Manifest config descriptor has no digest"))?
            .to_string();

        let blob = self.get_blob(&digest)?;
        let blob: ConfigBlob = serde_json::from_value(blob)
            .map_err(|e| ScanError::validation_with_source("Failed to parse image config", e))?;

        Ok(blob.config.unwrap_or_default())
    }

    /// Fetches tags and the config labels of `tag`, in that order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libscanner::RegistryClient;
    ///
    /// # fn example() -> libscanner::Result<()> {
    /// let mut client = RegistryClient::new("ghcr.io/ublue-os/bluefin")?;
    /// let meta = client.meta("latest")?;
    /// println!("{}: {} tags", meta.title(), meta.tags().len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn meta(&mut self, tag: &str) -> Result<ImageMeta> {
        let tags = self.tags()?;
        let config = self.config(tag)?;
        Ok(ImageMeta::new(
            self.path(),
            tags,
            config.labels.unwrap_or_default(),
        ))
    }

    /// Reads a whole response body. Failures while reading (timeouts included)
    /// are network errors; parsing is left to the caller.
    fn read_body(&self, response: Response) -> Result<Vec<u8>> {
        let url = response.url().to_string();
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|e| self.translate_reqwest_error(e, &url))
    }

    /// Translates a reqwest error into a ScanError.
    fn translate_reqwest_error(&self, error: reqwest::Error, url: &str) -> ScanError {
        if error.is_timeout() {
            ScanError::timeout(format!(
                "Request to {} timed out after {} seconds",
                url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            ScanError::network_with_source(format!("Failed to connect to {}", url), error)
        } else {
            ScanError::network_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }

    /// Turns a non-success response into a registry request error.
    fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response
            .text()
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        Err(ScanError::registry_request(body, url, status.as_u16()))
    }
}

/// The `config` descriptor of a manifest, if it carries a usable one.
fn config_descriptor(manifest: &Value) -> Option<&Value> {
    manifest
        .get("config")
        .filter(|c| c.as_object().is_some_and(|o| !o.is_empty()))
}

/// Digest of the first entry of an index's `manifests` array.
fn first_manifest_digest(manifest: &Value) -> Option<String> {
    manifest
        .get("manifests")?
        .as_array()?
        .first()?
        .get("digest")?
        .as_str()
        .map(str::to_string)
}

/// Accept header listing the manifest media types we can read.
fn manifest_accept() -> String {
    [
        MediaType::ImageManifest.to_string(),
        MediaType::ImageIndex.to_string(),
        DOCKER_MANIFEST_V2.to_string(),
        DOCKER_MANIFEST_LIST_V2.to_string(),
    ]
    .join(", ")
}
