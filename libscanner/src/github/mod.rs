//! GitHub REST API access for organization container packages.
//!
//! Lists the container packages an organization publishes and looks up the
//! repositories they were built from. Listing follows the `Link` response
//! header across pages.

use crate::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;


/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Owner of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOwner {
    pub login: String,
    #[serde(default)]
    pub html_url: String,
}

/// Repository a package is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRepository {
    pub name: String,
    #[serde(default)]
    pub html_url: String,
}

/// A container package published by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: u64,
    pub name: String,
    pub owner: PackageOwner,
    /// Absent for packages not linked to a repository
    #[serde(default)]
    pub repository: Option<PackageRepository>,
}

/// Repository details shown next to each image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDetails {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: String,
}

/// Blocking GitHub API client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: HttpClient,
    api_url: String,
    token: Option<String>,
    per_page: u32,
}

impl GithubClient {
    /// Creates a client for `api_url` (trailing slashes are ignored).
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::github::GithubClient;
    ///
    /// let client = GithubClient::new("https://api.github.com/", None, 30).unwrap();
    /// assert_eq!(client.api_url(), "https://api.github.com");
    /// ```
    pub fn new(api_url: &str, token: Option<String>, timeout_seconds: u64) -> Result<Self> {
        let api_url = api_url.trim().trim_end_matches('/');
        if api_url.is_empty() {
            return Err(ScanError::validation("GitHub API URL cannot be empty"));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("libscanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScanError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http,
            api_url: api_url.to_string(),
            token: token.filter(|t| !t.is_empty()),
            per_page: 100,
        })
    }

    /// Sets the page size requested from the API (GitHub caps it at 100).
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = request.send().map_err(|e| translate_reqwest_error(e, url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .unwrap_or_else(|_| String::from("(unable to read response body)"));
        Err(ScanError::api(body, url, status.as_u16()))
    }

    /// Lists the active container packages of `org`, across all pages.
    ///
    /// Packages are de-duplicated by id. A page that brings no new package
    /// ends the walk even if it advertises a next page.
    pub fn list_org_packages(&self, org: &str) -> Result<Vec<Package>> {
        let mut packages = Vec::new();
        let mut seen = HashSet::new();
        let mut url = format!(
            "{}/orgs/{}/packages?package_type=container&state=active&per_page={}",
            self.api_url, org, self.per_page
        );

        loop {
            debug!("GET {}", url);
            let response = self.send(self.get(&url), &url)?;
            let next = Self::extract_next_link(response.headers());

            let page: Vec<Package> = read_json(response, &url, "packages")?;

            let before = packages.len();
            for package in page {
                if seen.insert(package.id) {
                    packages.push(package);
                }
            }

            if packages.len() == before {
                break;
            }

            match next {
                Some(link) => url = self.resolve_link(&url, &link)?,
                None => break,
            }
        }

        debug!("{} has {} container packages", org, packages.len());
        Ok(packages)
    }

    /// Fetches details of `owner/name`.
    pub fn repository(&self, owner: &str, name: &str) -> Result<RepositoryDetails> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, name);
        debug!("GET {}", url);
        let response = self.send(self.get(&url), &url)?;

        read_json(response, &url, "repository")
    }

    /// Resolves a `Link` target against the page it came from.
    fn resolve_link(&self, current: &str, link: &str) -> Result<String> {
        let base = Url::parse(current)
            .map_err(|e| ScanError::validation_with_source(format!("Invalid URL {}", current), e))?;
        let next = base
            .join(link)
            .map_err(|e| ScanError::validation_with_source(format!("Invalid next link {}", link), e))?;
        Ok(next.to_string())
    }

    /// Extracts the next page URL from the Link header.
    ///
    /// Format: `<https://api.github.com/organizations/1/packages?page=2>; rel="next", <...>; rel="last"`
    fn extract_next_link(headers: &reqwest::header::HeaderMap) -> Option<String> {
        let link_header = headers.get(reqwest::header::LINK)?;
        let link_str = link_header.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            if link_part.contains("rel=\"next\"") || link_part.contains("rel='next'") {
                if let Some(start) = link_part.find('<')
                    && let Some(end) = link_part.find('>')
                {
                    return Some(link_part[start + 1..end].to_string());
                }
            }
        }

        None
    }
}

/// Translates a reqwest error into a ScanError.
fn translate_reqwest_error(error: reqwest::Error, url: &str) -> ScanError {
    if error.is_timeout() {
        ScanError::timeout(format!("Request to {} timed out", url))
    } else {
        ScanError::network_with_source(format!("Failed to reach {}", url), error)
    }
}

/// Reads the body, then parses it. Only the parse step is a validation error.
fn read_json<T: DeserializeOwned>(response: Response, url: &str, what: &str) -> Result<T> {
    let bytes = response
        .bytes()
        .map_err(|e| translate_reqwest_error(e, url))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        ScanError::validation_with_source(format!("Failed to parse {} response", what), e)
    })
}
