use super::*;
use libscanner::github::PackageOwner;
use mockito::{Matcher, Mock, ServerGuard};
use sha2::{Digest as _, Sha256};
use std::cell::Cell;

fn config_for(server: &ServerGuard, retries: u32) -> Config {
    let yaml = format!(
        r#"
network:
  timeout: 5
  retries: {retries}
registry:
  scheme: http
  auth: fixed
  token_issuer:
    realm: "{}/token"
    service: test-registry
github:
  api_url: "{}"
ignore:
  - config
"#,
        server.url(),
        server.url()
    );
    Config::from_yaml_str(&yaml).unwrap()
}

fn image_ref(server: &ServerGuard, path: &str) -> String {
    format!("{}/{}", server.host_with_port(), path)
}

fn mock_token(server: &mut ServerGuard, path: &str) -> Mock {
    server
        .mock("GET", "/token")
        .match_query(Matcher::UrlEncoded(
            "scope".into(),
            format!("repository:{}:pull", path),
        ))
        .with_status(200)
        .with_body(r#"{"token":"test-token"}"#)
        .create()
}

/// Registers a healthy image with one `latest` tag and the given labels.
fn mock_image(server: &mut ServerGuard, path: &str, labels: &str) -> Vec<Mock> {
    let blob = format!(r#"{{"config":{{"Labels":{}}}}}"#, labels);
    let digest = format!("sha256:{:x}", Sha256::digest(blob.as_bytes()));
    let manifest = format!(
        r#"{{"schemaVersion":2,"config":{{"mediaType":"application/vnd.oci.image.config.v1+json","digest":"{}","size":{}}},"layers":[]}}"#,
        digest,
        blob.len()
    );

    vec![
        mock_token(server, path),
        server
            .mock("GET", format!("/v2/{}/tags/list", path).as_str())
            .with_status(200)
            .with_body(format!(r#"{{"name":"{}","tags":["latest","stable"]}}"#, path))
            .create(),
        server
            .mock("GET", format!("/v2/{}/manifests/latest", path).as_str())
            .with_status(200)
            .with_body(manifest)
            .create(),
        server
            .mock("GET", format!("/v2/{}/blobs/{}", path, digest).as_str())
            .with_status(200)
            .with_body(blob)
            .create(),
    ]
}

fn transient() -> ScanError {
    ScanError::network("connection reset")
}

#[test]
fn test_with_retries_recovers_from_transient_error() {
    let calls = Cell::new(0);
    let result = with_retries(1, "op", || {
        calls.set(calls.get() + 1);
        if calls.get() == 1 {
            Err(transient())
        } else {
            Ok(7)
        }
    });

    assert_eq!(result.unwrap(), 7);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_with_retries_gives_up_after_limit() {
    let calls = Cell::new(0);
    let result: Result<()> = with_retries(2, "op", || {
        calls.set(calls.get() + 1);
        Err(transient())
    });

    assert!(matches!(result, Err(ScanError::Network { .. })));
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_with_retries_does_not_retry_permanent_error() {
    let calls = Cell::new(0);
    let result: Result<()> = with_retries(5, "op", || {
        calls.set(calls.get() + 1);
        Err(ScanError::missing_config("ghcr.io/org/image:latest"))
    });

    assert!(matches!(result, Err(ScanError::MissingConfig { .. })));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_fetch_meta() {
    let mut server = mockito::Server::new();
    let _mocks = mock_image(
        &mut server,
        "ublue-os/bazzite",
        r#"{"org.opencontainers.image.title":"Bazzite"}"#,
    );
    let config = config_for(&server, 0);

    let meta = fetch_meta(&config, &image_ref(&server, "ublue-os/bazzite"), "latest").unwrap();

    assert_eq!(meta.name(), "ublue-os/bazzite");
    assert_eq!(meta.title(), "Bazzite");
    assert_eq!(meta.tags(), ["latest".to_string(), "stable".to_string()]);
}

#[test]
fn test_fetch_meta_retries_server_errors() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, "ublue-os/bazzite");
    let tags = server
        .mock("GET", "/v2/ublue-os/bazzite/tags/list")
        .with_status(503)
        .expect(2)
        .create();
    let config = config_for(&server, 1);

    let err = fetch_meta(&config, &image_ref(&server, "ublue-os/bazzite"), "latest").unwrap_err();

    tags.assert();
    assert!(matches!(
        err,
        ScanError::RegistryRequest {
            status_code: 503,
            ..
        }
    ));
}

#[test]
fn test_fetch_meta_does_not_retry_not_found() {
    let mut server = mockito::Server::new();
    let _token = mock_token(&mut server, "ublue-os/gone");
    let tags = server
        .mock("GET", "/v2/ublue-os/gone/tags/list")
        .with_status(404)
        .expect(1)
        .create();
    let config = config_for(&server, 3);

    let result = fetch_meta(&config, &image_ref(&server, "ublue-os/gone"), "latest");

    tags.assert();
    assert!(result.is_err());
}

#[test]
fn test_fetch_all_skips_failing_images() {
    let mut server = mockito::Server::new();
    let _good = mock_image(&mut server, "ublue-os/bluefin", "{}");
    let _broken_token = mock_token(&mut server, "ublue-os/broken");
    let _broken = server
        .mock("GET", "/v2/ublue-os/broken/tags/list")
        .with_status(404)
        .create();
    let _aurora = mock_image(&mut server, "ublue-os/aurora", "null");
    let config = config_for(&server, 0);

    let images = vec![
        image_ref(&server, "ublue-os/bluefin"),
        image_ref(&server, "ublue-os/broken"),
        image_ref(&server, "ublue-os/aurora"),
    ];
    let outcomes = fetch_all(&config, &images, "latest");

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(&outcomes[0], ImageOutcome::Fetched(m) if m.name() == "ublue-os/bluefin"));
    match &outcomes[1] {
        ImageOutcome::Skipped { image, error } => {
            assert_eq!(image, &images[1]);
            assert!(matches!(
                error,
                ScanError::RegistryRequest {
                    status_code: 404,
                    ..
                }
            ));
        }
        other => panic!("expected skipped image, got {other:?}"),
    }
    assert!(matches!(&outcomes[2], ImageOutcome::Fetched(m) if m.labels().is_empty()));
}

#[test]
fn test_fetch_all_reports_invalid_reference() {
    let server = mockito::Server::new();
    let config = config_for(&server, 0);

    let outcomes = fetch_all(&config, &[String::new()], "latest");

    assert!(matches!(
        &outcomes[0],
        ImageOutcome::Skipped {
            error: ScanError::InvalidReference { .. },
            ..
        }
    ));
}

#[test]
fn test_package_image() {
    let package = Package {
        id: 1,
        name: "bazzite".to_string(),
        owner: PackageOwner {
            login: "ublue-os".to_string(),
            html_url: String::new(),
        },
        repository: None,
    };

    assert_eq!(package_image("ghcr.io", &package), "ghcr.io/ublue-os/bazzite");
}

#[test]
fn test_org_packages_drops_ignored() {
    let mut server = mockito::Server::new();
    let _packages = server
        .mock("GET", "/orgs/ublue-os/packages")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[
                {"id":1,"name":"bazzite","owner":{"login":"ublue-os"}},
                {"id":2,"name":"config","owner":{"login":"ublue-os"}}
            ]"#,
        )
        .create();
    let config = config_for(&server, 0);
    let github = github_client(&config, None).unwrap();

    let packages = org_packages(&config, &github, "ublue-os").unwrap();

    let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["bazzite"]);
}
