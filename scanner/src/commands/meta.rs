use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, OutputFormat, escape_markdown_cell};
use crate::image;
use libscanner::ImageMeta;
use tabled::{Table, Tabled, settings::Style};

#[derive(Debug, Tabled)]
struct MetaField {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn fields(meta: &ImageMeta) -> Vec<MetaField> {
    let mut fields = vec![
        MetaField {
            field: "Name".to_string(),
            value: meta.name().to_string(),
        },
        MetaField {
            field: "Tags".to_string(),
            value: meta.tags().join(", "),
        },
    ];

    fields.extend(meta.labels().iter().map(|(key, value)| MetaField {
        field: key.clone(),
        value: value.clone(),
    }));

    fields
}

impl Formattable for ImageMeta {
    fn format_table(&self) -> String {
        Table::new(fields(self)).with(Style::empty()).to_string()
    }

    fn format_markdown(&self) -> String {
        let rows: Vec<MetaField> = fields(self)
            .into_iter()
            .map(|f| MetaField {
                field: escape_markdown_cell(&f.field),
                value: escape_markdown_cell(&f.value),
            })
            .collect();
        Table::new(rows).with(Style::markdown()).to_string()
    }
}

/// Handle the meta command
pub fn handle_meta(ctx: &AppContext, image_ref: &str, tag: &str, format: OutputFormat) {
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Fetching metadata for {}:{}", image_ref, tag),
    );

    let meta = match image::fetch_meta(&ctx.config, image_ref, tag) {
        Ok(meta) => meta,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(1);
        }
    };

    match format::format_output(&meta, format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
