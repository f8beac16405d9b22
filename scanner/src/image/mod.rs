//! Image metadata orchestration.
//!
//! Shared by the `scan`, `badges`, `rebase` and `meta` commands. The library
//! never retries and never swallows errors; this layer decides both. Transient
//! failures are retried up to `network.retries` times, and a batch fetch keeps
//! going past images that fail, reporting each failure as a value.

use libscanner::github::Package;
use libscanner::{Config, GithubClient, ImageMeta, RegistryClient, Result, ScanError};
use log::{debug, warn};

/// Runs `op`, retrying transient errors up to `retries` extra times.
pub fn with_retries<T, F>(retries: u32, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                warn!("{}: {} (retry {}/{})", what, e, attempt, retries);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetches tags and labels of `image` at `tag`.
///
/// A single client is used across retries so the token is requested once.
pub fn fetch_meta(config: &Config, image: &str, tag: &str) -> Result<ImageMeta> {
    let mut client = RegistryClient::with_config(image, config.client_config())?;
    debug!("Fetching metadata for {}:{}", client.reference(), tag);
    with_retries(config.network.retries, image, || client.meta(tag))
}

/// Result of fetching one image in a batch.
#[derive(Debug)]
pub enum ImageOutcome {
    Fetched(ImageMeta),
    Skipped { image: String, error: ScanError },
}

/// Fetches every image in turn. A failing image does not stop the others.
pub fn fetch_all(config: &Config, images: &[String], tag: &str) -> Vec<ImageOutcome> {
    images
        .iter()
        .map(|image| match fetch_meta(config, image, tag) {
            Ok(meta) => ImageOutcome::Fetched(meta),
            Err(error) => ImageOutcome::Skipped {
                image: image.clone(),
                error,
            },
        })
        .collect()
}

/// Full reference of a package on its registry: `registry/owner/name`.
pub fn package_image(registry: &str, package: &Package) -> String {
    format!("{}/{}/{}", registry, package.owner.login, package.name)
}

/// Builds a GitHub client from the configuration and an optional token.
pub fn github_client(config: &Config, token: Option<String>) -> Result<GithubClient> {
    Ok(
        GithubClient::new(&config.github.api_url, token, config.network.timeout)?
            .with_per_page(config.github.per_page),
    )
}

/// Lists the organization's packages, dropping the ignored ones.
pub fn org_packages(config: &Config, github: &GithubClient, org: &str) -> Result<Vec<Package>> {
    let packages = with_retries(config.network.retries, org, || github.list_org_packages(org))?;

    Ok(packages
        .into_iter()
        .filter(|p| {
            let ignored = config.is_ignored(&p.name);
            if ignored {
                debug!("Ignoring package {}", p.name);
            }
            !ignored
        })
        .collect())
}

#[cfg(test)]
mod tests;
