use super::*;

#[test]
fn test_verbosity_from_count() {
    assert_eq!(VerbosityLevel::from_count(0), VerbosityLevel::Normal);
    assert_eq!(VerbosityLevel::from_count(1), VerbosityLevel::Verbose);
    assert_eq!(VerbosityLevel::from_count(2), VerbosityLevel::VeryVerbose);
    assert_eq!(VerbosityLevel::from_count(3), VerbosityLevel::Trace);
    assert_eq!(VerbosityLevel::from_count(9), VerbosityLevel::Trace);
}

#[test]
fn test_verbosity_log_levels() {
    assert_eq!(VerbosityLevel::Normal.log_level(), LevelFilter::Warn);
    assert_eq!(VerbosityLevel::Verbose.log_level(), LevelFilter::Info);
    assert_eq!(VerbosityLevel::VeryVerbose.log_level(), LevelFilter::Debug);
    assert_eq!(VerbosityLevel::Trace.log_level(), LevelFilter::Trace);
}

#[test]
fn test_verbosity_ordering() {
    assert!(VerbosityLevel::Trace > VerbosityLevel::Verbose);
    assert!(VerbosityLevel::Normal < VerbosityLevel::Verbose);
}

#[test]
fn test_cli_color_wins_over_config() {
    let config = Config::from_yaml_str("output: { color: never }").unwrap();
    let ctx = AppContext::from_config(
        config,
        Some(ColorChoice::Always),
        VerbosityLevel::Normal,
    );
    assert_eq!(ctx.color, ColorChoice::Always);
}

#[test]
fn test_build_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "network:\n  retries: 5\n").unwrap();

    let ctx =
        AppContext::build(Some(ColorChoice::Never), VerbosityLevel::Verbose, Some(&path)).unwrap();

    assert_eq!(ctx.config.network.retries, 5);
    assert_eq!(ctx.color, ColorChoice::Never);
    assert_eq!(ctx.verbosity, VerbosityLevel::Verbose);
}

#[test]
fn test_build_with_broken_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "network: { timeout: soon }\n").unwrap();

    let result = AppContext::build(Some(ColorChoice::Never), VerbosityLevel::Normal, Some(&path));

    assert!(matches!(result, Err(libscanner::ScanError::Config { .. })));
}

#[test]
fn test_build_with_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.yaml");

    let result = AppContext::build(Some(ColorChoice::Never), VerbosityLevel::Normal, Some(&path));

    assert!(matches!(result, Err(libscanner::ScanError::Config { .. })));
}

#[test]
fn test_build_without_config_file_uses_defaults() {
    let ctx = AppContext::build(Some(ColorChoice::Never), VerbosityLevel::Normal, None).unwrap();

    assert_eq!(ctx.config, Config::default());
}
