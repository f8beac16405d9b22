use super::*;

#[test]
fn test_explicit_path_wins() {
    let path = resolve_config_path(
        Some(PathBuf::from("/etc/scanner.yaml")),
        Some(PathBuf::from("/home/user/.config")),
    );
    assert_eq!(path, Some(PathBuf::from("/etc/scanner.yaml")));
}

#[test]
fn test_explicit_path_kept_even_if_missing() {
    let dir = tempfile::tempdir().unwrap();
    let typo = dir.path().join("typo.yaml");

    let path = resolve_config_path(Some(typo.clone()), Some(dir.path().to_path_buf()));

    assert_eq!(path, Some(typo));
}

#[test]
fn test_default_path_used_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("ublue-scanner");
    std::fs::create_dir(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.yaml"), "ignore: []\n").unwrap();

    let path = resolve_config_path(None, Some(dir.path().to_path_buf()));

    assert_eq!(path, Some(app_dir.join("config.yaml")));
}

#[test]
fn test_missing_default_path_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(resolve_config_path(None, Some(dir.path().to_path_buf())), None);
}

#[test]
fn test_load_env_file_sets_missing_variables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "UBLUE_SCANNER_TEST_DOTENV_TOKEN=from-file\n",
    )
    .unwrap();

    let loaded = load_env_file(dir.path()).unwrap();

    assert_eq!(loaded, Some(dir.path().join(".env")));
    assert_eq!(
        std::env::var("UBLUE_SCANNER_TEST_DOTENV_TOKEN").unwrap(),
        "from-file"
    );
}

#[test]
fn test_load_env_file_keeps_existing_variables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "UBLUE_SCANNER_TEST_DOTENV_KEEP=from-file\n",
    )
    .unwrap();
    unsafe {
        std::env::set_var("UBLUE_SCANNER_TEST_DOTENV_KEEP", "from-shell");
    }

    load_env_file(dir.path()).unwrap();

    assert_eq!(
        std::env::var("UBLUE_SCANNER_TEST_DOTENV_KEEP").unwrap(),
        "from-shell"
    );
}

#[test]
fn test_load_env_file_without_file() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(load_env_file(dir.path()).unwrap(), None);
}

#[test]
fn test_load_env_file_reports_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "NOT A VALID LINE\n").unwrap();

    assert!(load_env_file(dir.path()).is_err());
}
