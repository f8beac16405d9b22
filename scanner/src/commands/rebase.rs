use crate::context::{AppContext, VerbosityLevel};
use crate::format;
use crate::image;
use libscanner::{ImageMeta, Reference, TagFilter};

/// Markdown documentation for rebasing an rpm-ostree system onto `image:tag`.
///
/// `image` is the normalized reference (`host/path`). Missing labels leave
/// their line out; the title falls back to the image path.
pub fn render_rebase(image: &str, tag: &str, meta: &ImageMeta, tags: &[String]) -> String {
    let title = if meta.title().is_empty() {
        meta.name()
    } else {
        meta.title()
    };

    let mut out = format!("# {}\n\n", title);

    if !meta.logo().is_empty() {
        out.push_str(&format!("![{} logo]({})\n\n", title, meta.logo()));
    }
    if !meta.description().is_empty() {
        out.push_str(&format!("{}\n\n", meta.description()));
    }
    if !meta.created().is_empty() {
        out.push_str(&format!("_Created: {}_\n\n", meta.created()));
    }

    out.push_str("## Rebase\n\n");
    out.push_str("Rebase onto the unsigned image first:\n\n");
    out.push_str(&format!(
        "```bash\nrpm-ostree rebase ostree-unverified-registry:{}:{}\nsystemctl reboot\n```\n\n",
        image, tag
    ));
    out.push_str("Then switch to the signed image:\n\n");
    out.push_str(&format!(
        "```bash\nrpm-ostree rebase ostree-image-signed:docker://{}:{}\nsystemctl reboot\n```\n",
        image, tag
    ));

    if !tags.is_empty() {
        out.push_str("\n## Available tags\n\n");
        for t in tags {
            out.push_str(&format!("- `{}`\n", t));
        }
    }

    out
}

/// Handle the rebase command
pub fn handle_rebase(
    ctx: &AppContext,
    image_ref: &str,
    tag: &str,
    include: &[String],
    exclude: &[String],
) {
    let reference: Reference = match image_ref.parse() {
        Ok(reference) => reference,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };

    let filter = match TagFilter::new(include, exclude) {
        Ok(filter) => filter,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };

    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Fetching metadata for {}:{}", reference, tag),
    );

    let meta = match image::fetch_meta(&ctx.config, image_ref, tag) {
        Ok(meta) => meta,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };

    let tags = filter.apply(meta.tags());
    print!(
        "{}",
        render_rebase(&reference.to_string(), tag, &meta, &tags)
    );
}

#[cfg(test)]
#[path = "rebase_tests.rs"]
mod tests;
