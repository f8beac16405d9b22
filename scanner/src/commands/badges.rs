use crate::context::{AppContext, VerbosityLevel};
use crate::format;
use crate::image::{self, ImageOutcome};
use libscanner::client::DEFAULT_TAG;
use libscanner::{ImageMeta, TagFilter};
use log::warn;

/// Escapes a shields.io static badge path segment.
///
/// Characters that would end the path or the surrounding Markdown link are
/// percent-encoded.
pub fn shields_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.replace('-', "--").replace('_', "__").replace(' ', "_").chars() {
        match c {
            '(' | ')' | '[' | ']' | '/' | '?' | '#' | '%' | '<' | '>' => {
                escaped.push_str(&format!("%{:02X}", c as u32));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escapes text placed in Markdown image alt text.
pub fn escape_alt_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' | '\r' => escaped.push(' '),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Badge for one tag, linking to the image on its registry.
pub fn badge(registry: &str, meta: &ImageMeta, tag: &str) -> String {
    let label = meta.name().rsplit('/').next().unwrap_or(meta.name());
    format!(
        "[![{}](https://img.shields.io/badge/{}-{}-blue)](https://{}/{})",
        escape_alt_text(tag),
        shields_escape(label),
        shields_escape(tag),
        registry,
        meta.name()
    )
}

/// Markdown section with badges for every filtered tag of each image.
pub fn render_badges(registry: &str, metas: &[ImageMeta], filter: &TagFilter) -> String {
    let mut out = String::new();

    for meta in metas {
        out.push_str(&format!("### {}\n\n", meta.name()));

        let tags = filter.apply(meta.tags());
        if tags.is_empty() {
            out.push_str("_No matching tags_\n\n");
            continue;
        }

        for tag in &tags {
            out.push_str(&badge(registry, meta, tag));
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Splits outcomes into fetched metadata, logging each skipped image.
pub fn fetched_metas(outcomes: Vec<ImageOutcome>) -> Vec<ImageMeta> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            ImageOutcome::Fetched(meta) => Some(meta),
            ImageOutcome::Skipped { image, error } => {
                warn!("Skipping {}: {}", image, error);
                None
            }
        })
        .collect()
}

/// Handle the badges command
///
/// Patterns given on the command line replace the configured ones.
pub fn handle_badges(
    ctx: &AppContext,
    org: &str,
    token: Option<String>,
    include: &[String],
    exclude: &[String],
) {
    let (include, exclude) = if include.is_empty() && exclude.is_empty() {
        (&ctx.config.badges.include[..], &ctx.config.badges.exclude[..])
    } else {
        (include, exclude)
    };

    let filter = match TagFilter::new(include, exclude) {
        Ok(filter) => filter,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };

    let packages = match image::github_client(&ctx.config, token)
        .and_then(|github| image::org_packages(&ctx.config, &github, org))
    {
        Ok(packages) => packages,
        Err(e) => {
            format::error(ctx, &format!("Failed to list packages of {}: {}", org, e));
            std::process::exit(1);
        }
    };

    let registry = &ctx.config.github.registry;
    let images: Vec<String> = packages
        .iter()
        .map(|p| image::package_image(registry, p))
        .collect();

    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Fetching metadata for {} images", images.len()),
    );

    let metas = fetched_metas(image::fetch_all(&ctx.config, &images, DEFAULT_TAG));
    if metas.len() < images.len() {
        format::warning(
            ctx,
            &format!("{} of {} images skipped", images.len() - metas.len(), images.len()),
        );
    }

    print!("{}", render_badges(registry, &metas, &filter));
}

#[cfg(test)]
#[path = "badges_tests.rs"]
mod tests;
