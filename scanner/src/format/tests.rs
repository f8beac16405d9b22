use super::*;
use libscanner::Config;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
struct TestData {
    name: String,
    value: i32,
}

impl Formattable for TestData {
    fn format_table(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }

    fn format_markdown(&self) -> String {
        format!("**{}**: {}", self.name, self.value)
    }
}

fn test_data() -> TestData {
    TestData {
        name: "test".to_string(),
        value: 42,
    }
}

fn ctx_with(color: ColorChoice, config: Config) -> AppContext {
    AppContext::from_config(config, Some(color), VerbosityLevel::Normal)
}

#[test]
fn test_format_table() {
    let result = format_output(&test_data(), OutputFormat::Table);
    assert_eq!(result.unwrap(), "test: 42");
}

#[test]
fn test_format_markdown() {
    let result = format_output(&test_data(), OutputFormat::Markdown);
    assert_eq!(result.unwrap(), "**test**: 42");
}

#[test]
fn test_format_json() {
    let result = format_output(&test_data(), OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(json["name"], "test");
    assert_eq!(json["value"], 42);
}

#[test]
fn test_format_yaml() {
    let result = format_output(&test_data(), OutputFormat::Yaml).unwrap();
    assert!(result.contains("name: test"));
    assert!(result.contains("value: 42"));
}

#[test]
fn test_resolve_format_prefers_flag() {
    let config = Config::from_yaml_str("output: { format: yaml }").unwrap();
    let ctx = ctx_with(ColorChoice::Never, config);

    assert_eq!(resolve_format(&ctx, Some("json")).unwrap(), OutputFormat::Json);
    assert_eq!(resolve_format(&ctx, None).unwrap(), OutputFormat::Yaml);
}

#[test]
fn test_resolve_format_rejects_unknown() {
    let ctx = ctx_with(ColorChoice::Never, Config::default());

    let err = resolve_format(&ctx, Some("xml")).unwrap_err();
    assert!(matches!(err, ScanError::Format { .. }));
}

#[test]
fn test_should_color_follows_explicit_choice() {
    assert!(should_color(&ctx_with(ColorChoice::Always, Config::default())));
    assert!(!should_color(&ctx_with(ColorChoice::Never, Config::default())));
}

#[test]
fn test_escape_markdown_cell() {
    assert_eq!(escape_markdown_cell("a|b"), "a\\|b");
    assert_eq!(escape_markdown_cell("line\nbreak"), "line break");
    assert_eq!(escape_markdown_cell("plain"), "plain");
}

#[test]
fn test_plain_progress_bar_is_hidden() {
    let pb = PlainFormatter.progress_bar(3, "Working");
    assert!(pb.is_hidden());
    PlainFormatter.finish_progress(pb, "Done");
}
