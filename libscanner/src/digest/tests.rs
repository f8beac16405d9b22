use super::*;
use std::str::FromStr;

const EMPTY_SHA256: &str =
    "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[test]
fn test_digest_from_valid_string_succeeds() {
    let digest = Digest::from_str(
        "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc",
    )
    .unwrap();
    assert_eq!(digest.algorithm(), "sha256");
    assert_eq!(
        digest.hex(),
        "7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc"
    );
}

#[test]
fn test_digest_from_invalid_string_fails() {
    let digest = Digest::from_str("sha256:invalid-digest");
    assert!(matches!(digest.unwrap_err(), ScanError::Validation { .. }));
}

#[test]
fn test_digest_display_trait() {
    let digest = Digest::from_str(EMPTY_SHA256).unwrap();
    assert_eq!(digest.to_string(), EMPTY_SHA256);
}

#[test]
fn test_verify_matching_content() {
    let content = br#"{"config":{}}"#;
    let digest = format!("sha256:{:x}", Sha256::digest(content));
    let digest = Digest::from_str(&digest).unwrap();

    assert!(digest.verify(content).is_ok());
}

#[test]
fn test_verify_mismatched_content() {
    let digest = Digest::from_str(EMPTY_SHA256).unwrap();

    let err = digest.verify(b"not empty").unwrap_err();
    assert!(matches!(err, ScanError::Validation { .. }));
    assert!(err.to_string().contains("mismatch"));
}

#[test]
fn test_verify_sha512() {
    let content = b"layer";
    let digest = format!("sha512:{:x}", Sha512::digest(content));
    let digest = Digest::from_str(&digest).unwrap();

    assert!(digest.verify(content).is_ok());
}
