use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, OutputFormat, escape_markdown_cell};
use crate::image;
use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use indicatif::ProgressBar;
use libscanner::github::Package;
use libscanner::{Config, GithubClient, Result};
use log::debug;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// One image of the organization with its repository details
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ScanRow {
    #[tabled(rename = "IMAGE")]
    pub name: String,
    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
    #[tabled(rename = "STARS")]
    pub stars: u64,
    #[tabled(rename = "FORKS")]
    pub forks: u64,
    #[tabled(rename = "UPDATED")]
    pub updated: String,
    #[tabled(skip)]
    pub updated_at: DateTime<Utc>,
    #[tabled(rename = "URL")]
    pub url: String,
}

/// Scan results in package order
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ScanReport {
    pub rows: Vec<ScanRow>,
}

impl Formattable for ScanReport {
    fn format_table(&self) -> String {
        if self.rows.is_empty() {
            return "No images found.".to_string();
        }
        Table::new(&self.rows).with(Style::empty()).to_string()
    }

    fn format_markdown(&self) -> String {
        let rows: Vec<ScanRow> = self
            .rows
            .iter()
            .map(|row| ScanRow {
                name: escape_markdown_cell(&row.name),
                description: escape_markdown_cell(&row.description),
                ..row.clone()
            })
            .collect();
        Table::new(&rows).with(Style::markdown()).to_string()
    }
}

/// Relative age of `updated_at` as seen from `now`, e.g. "2 days ago"
pub fn humanize_updated(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    HumanTime::from(updated_at - now).to_string()
}

/// Fetches repository details for each package, in order.
///
/// Packages without a linked repository are skipped. Any other failure ends
/// the scan.
pub fn repository_rows(
    config: &Config,
    github: &GithubClient,
    packages: &[Package],
    now: DateTime<Utc>,
    pb: &ProgressBar,
) -> Result<Vec<ScanRow>> {
    let mut rows = Vec::with_capacity(packages.len());

    for package in packages {
        pb.inc(1);
        let Some(repository) = &package.repository else {
            debug!("{} is not linked to a repository, skipping", package.name);
            continue;
        };

        let details = image::with_retries(config.network.retries, &repository.name, || {
            github.repository(&package.owner.login, &repository.name)
        })?;

        let url = if repository.html_url.is_empty() {
            details.html_url
        } else {
            repository.html_url.clone()
        };

        rows.push(ScanRow {
            name: package.name.clone(),
            description: details.description.unwrap_or_default(),
            stars: details.stargazers_count,
            forks: details.forks,
            updated: humanize_updated(details.updated_at, now),
            updated_at: details.updated_at,
            url,
        });
    }

    Ok(rows)
}

/// Handle the scan command
pub fn handle_scan(ctx: &AppContext, org: &str, token: Option<String>, format: OutputFormat) {
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Scanning container packages of {}", org),
    );

    let github = match image::github_client(&ctx.config, token) {
        Ok(github) => github,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };

    let packages = match image::org_packages(&ctx.config, &github, org) {
        Ok(packages) => packages,
        Err(e) => {
            format::error(ctx, &format!("Failed to list packages of {}: {}", org, e));
            std::process::exit(1);
        }
    };

    let formatter = format::create_formatter(ctx);
    let pb = formatter.progress_bar(packages.len() as u64, "Fetching repositories");
    let rows = match repository_rows(&ctx.config, &github, &packages, Utc::now(), &pb) {
        Ok(rows) => rows,
        Err(e) => {
            pb.abandon();
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };
    formatter.finish_progress(pb, &format!("Fetched {} repositories", rows.len()));

    match format::format_output(&ScanReport { rows }, format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
