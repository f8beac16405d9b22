use super::*;

const NONE: &[&str] = &[];

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_include_alternation() {
    let result = filter_tags(&tags(&["a", "b", "c"]), &["a|b"], NONE).unwrap();
    assert_eq!(result, tags(&["a", "b"]));
}

#[test]
fn test_exclude() {
    let result = filter_tags(&tags(&["a", "b"]), NONE, &["b"]).unwrap();
    assert_eq!(result, tags(&["a"]));
}

#[test]
fn test_no_patterns_is_identity() {
    let input = tags(&["latest", "40", "stable", "40"]);
    let result = filter_tags(&input, NONE, NONE).unwrap();
    assert_eq!(result, input);
    assert!(TagFilter::default().is_empty());
}

#[test]
fn test_matching_is_unanchored() {
    let result = filter_tags(&tags(&["stable-daily", "daily", "latest"]), &["ail"], NONE).unwrap();
    assert_eq!(result, tags(&["stable-daily", "daily"]));
}

#[test]
fn test_include_and_exclude_combined() {
    let input = tags(&["40", "40-20240501", "41", "latest", "41-testing"]);
    let result = filter_tags(&input, &["^4[01]"], &["testing", "-\\d{8}$"]).unwrap();
    assert_eq!(result, tags(&["40", "41"]));
}

#[test]
fn test_any_include_pattern_is_enough() {
    let result = filter_tags(&tags(&["gts", "stable", "latest"]), &["gts", "stable"], NONE).unwrap();
    assert_eq!(result, tags(&["gts", "stable"]));
}

#[test]
fn test_order_and_duplicates_preserved() {
    let input = tags(&["b", "a", "b", "c"]);
    let result = filter_tags(&input, &["a|b"], NONE).unwrap();
    assert_eq!(result, tags(&["b", "a", "b"]));
}

#[test]
fn test_invalid_pattern_is_validation_error() {
    let err = TagFilter::new(&["("], NONE).unwrap_err();
    assert!(matches!(err, ScanError::Validation { .. }));
    assert!(err.to_string().contains("("));
}

#[test]
fn test_matches_single_tag() {
    let filter = TagFilter::new(NONE, &["^sha256-"]).unwrap();
    assert!(filter.matches("latest"));
    assert!(!filter.matches("sha256-abc.sig"));
}
