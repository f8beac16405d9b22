//! Anonymous bearer-token authentication for OCI registries.
//!
//! Pulling from a registry such as ghcr.io requires a short-lived token obtained
//! from a token endpoint with a `repository:<path>:pull` scope. This module
//! decides which endpoint to ask ([`AuthStrategy`]), performs the exchange and
//! tracks whether a client holds a token ([`AuthState`]).

use crate::error::{Result, ScanError};
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};


/// Token endpoint used when nothing else is configured.
pub const DEFAULT_TOKEN_REALM: &str = "https://ghcr.io/token";

/// Service name sent alongside [`DEFAULT_TOKEN_REALM`].
pub const DEFAULT_TOKEN_SERVICE: &str = "ghcr.io";

/// A token-issuing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIssuer {
    /// Full URL of the token endpoint.
    pub realm: String,
    /// Value of the `service` query parameter.
    pub service: String,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self {
            realm: DEFAULT_TOKEN_REALM.to_string(),
            service: DEFAULT_TOKEN_SERVICE.to_string(),
        }
    }
}

impl TokenIssuer {
    /// Creates an issuer from a realm URL and a service name.
    pub fn new(realm: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            service: service.into(),
        }
    }

    /// Issuer served by the registry itself at `/token`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::auth::TokenIssuer;
    ///
    /// let issuer = TokenIssuer::for_host("https", "quay.io");
    /// assert_eq!(issuer.realm, "https://quay.io/token");
    /// assert_eq!(issuer.service, "quay.io");
    /// ```
    pub fn for_host(scheme: &str, host: &str) -> Self {
        Self {
            realm: format!("{}://{}/token", scheme, host),
            service: host.to_string(),
        }
    }

    /// Returns the pull scope for a repository path.
    pub fn pull_scope(path: &str) -> String {
        format!("repository:{}:pull", path)
    }
}

/// How a client finds the token endpoint for its registry.
///
/// The default, [`AuthStrategy::Fixed`] with the ghcr.io issuer, asks ghcr.io
/// for tokens no matter which registry is targeted. That only works for
/// ghcr.io itself; other registries need [`AuthStrategy::RegistryHost`] or
/// [`AuthStrategy::Challenge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Always use this issuer.
    Fixed(TokenIssuer),
    /// Use `{scheme}://{host}/token` of the target registry.
    RegistryHost,
    /// Probe `/v2/` and follow the `WWW-Authenticate` challenge.
    Challenge,
}

impl Default for AuthStrategy {
    fn default() -> Self {
        Self::Fixed(TokenIssuer::default())
    }
}

impl AuthStrategy {
    /// Resolves the issuer for a registry, probing it when the strategy needs to.
    pub fn resolve(&self, http: &HttpClient, scheme: &str, host: &str) -> Result<TokenIssuer> {
        match self {
            Self::Fixed(issuer) => Ok(issuer.clone()),
            Self::RegistryHost => Ok(TokenIssuer::for_host(scheme, host)),
            Self::Challenge => discover_issuer(http, scheme, host),
        }
    }
}

/// Authentication state of a single registry client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No token yet.
    #[default]
    Unauthenticated,
    /// A token was issued and is reused for every request.
    Authenticated { token: String },
}

impl AuthState {
    /// Returns the cached token, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated { token } => Some(token),
        }
    }
}

/// Body returned by a token endpoint.
///
/// Docker Hub answers with both `token` and `access_token`; ghcr.io only with `token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Option<String> {
        self.token
            .or(self.access_token)
            .filter(|token| !token.is_empty())
    }
}

/// Requests an anonymous pull token for `path` from `issuer`.
pub fn request_token(http: &HttpClient, issuer: &TokenIssuer, path: &str) -> Result<String> {
    let scope = TokenIssuer::pull_scope(path);
    debug!(
        "Requesting token from {} (service={}, scope={})",
        issuer.realm, issuer.service, scope
    );

    let response = http
        .get(&issuer.realm)
        .query(&[("scope", scope.as_str()), ("service", issuer.service.as_str())])
        .send()
        .map_err(|e| {
            ScanError::network_with_source(
                format!("Failed to reach token endpoint {}", issuer.realm),
                e,
            )
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| String::from("(unable to read response body)"));
        return Err(ScanError::authentication(
            format!("Token request to {} rejected: {}", issuer.realm, body),
            Some(status.as_u16()),
        ));
    }

    let body: TokenResponse = response.json().map_err(|e| {
        ScanError::authentication(
            format!("Failed to parse token response from {}: {}", issuer.realm, e),
            None,
        )
    })?;

    body.into_token().ok_or_else(|| {
        ScanError::authentication(
            format!("Token endpoint {} returned no token", issuer.realm),
            None,
        )
    })
}

/// Probes `{scheme}://{host}/v2/` and builds an issuer from its bearer challenge.
pub fn discover_issuer(http: &HttpClient, scheme: &str, host: &str) -> Result<TokenIssuer> {
    let url = format!("{}://{}/v2/", scheme, host);
    debug!("Probing {} for an authentication challenge", url);

    let response = http
        .get(&url)
        .send()
        .map_err(|e| ScanError::network_with_source(format!("Failed to probe {}", url), e))?;

    if response.status() != StatusCode::UNAUTHORIZED {
        return Err(ScanError::authentication(
            format!("{} did not issue an authentication challenge", url),
            Some(response.status().as_u16()),
        ));
    }

    let header = response
        .headers()
        .get(reqwest::header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ScanError::authentication(format!("{} sent no WWW-Authenticate header", url), Some(401))
        })?;

    let challenge = AuthChallenge::parse(header)?;
    if !challenge.scheme.eq_ignore_ascii_case("bearer") {
        return Err(ScanError::authentication(
            format!("Unsupported authentication scheme: {}", challenge.scheme),
            Some(401),
        ));
    }

    Ok(TokenIssuer {
        realm: challenge.realm,
        service: challenge.service.unwrap_or_else(|| host.to_string()),
    })
}

/// Information parsed from a WWW-Authenticate header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// The authentication scheme (e.g., "Bearer")
    pub scheme: String,

    /// The authentication realm
    pub realm: String,

    /// The service identifier
    pub service: Option<String>,

    /// The scope being requested
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parses a WWW-Authenticate header value.
    ///
    /// Example header: `Bearer realm="https://ghcr.io/token",service="ghcr.io",scope="repository:org/image:pull"`
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::auth::AuthChallenge;
    ///
    /// let header = r#"Bearer realm="https://ghcr.io/token",service="ghcr.io""#;
    /// let challenge = AuthChallenge::parse(header).unwrap();
    /// assert_eq!(challenge.scheme, "Bearer");
    /// assert_eq!(challenge.service.as_deref(), Some("ghcr.io"));
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();

        let (scheme, params) = header
            .split_once(' ')
            .ok_or_else(|| ScanError::validation("Invalid WWW-Authenticate header format"))?;

        let mut realm = None;
        let mut service = None;
        let mut scope = None;

        for param in split_params(params) {
            if let Some((key, value)) = param.split_once('=') {
                let value = value.trim().trim_matches('"');
                match key.trim() {
                    "realm" => realm = Some(value.to_string()),
                    "service" => service = Some(value.to_string()),
                    "scope" => scope = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        let realm = realm.ok_or_else(|| {
            ScanError::validation("WWW-Authenticate header missing required 'realm' parameter")
        })?;

        Ok(Self {
            scheme: scheme.to_string(),
            realm,
            service,
            scope,
        })
    }
}

/// Splits challenge parameters on commas that are not inside quotes.
///
/// Scopes such as `repository:a:pull,push` contain commas of their own.
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(params[start..].trim());

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}
