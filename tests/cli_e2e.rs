//! End-to-end CLI tests for the mcat-dl binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command isolated from the user's config file and log settings.
fn mcat_dl(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mcat-dl").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    mcat_dl(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Monstercat catalog"));
}

#[test]
fn test_binary_version_displays_version() {
    let config_home = TempDir::new().unwrap();
    mcat_dl(&config_home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mcat-dl"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let config_home = TempDir::new().unwrap();
    mcat_dl(&config_home)
        .args(["list", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_invalid_covers_policy() {
    let config_home = TempDir::new().unwrap();
    mcat_dl(&config_home)
        .args(["release", "r1", "--covers", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--covers"));
}

#[test]
fn test_binary_rejects_unknown_config_key() {
    let config_home = TempDir::new().unwrap();
    let dir = config_home.path().join("mcat-dl");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "concurrency = 4\n").unwrap();

    mcat_dl(&config_home)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_downloads_track_then_skips_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/release/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "a1",
            "title": "Alive",
            "type": "Single"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/a1/download"))
        .and(query_param("track", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3 bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config_home = TempDir::new().unwrap();
    let music = TempDir::new().unwrap();
    let config_dir = config_home.path().join("mcat-dl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("api_base = \"{}\"\n", server.uri()),
    )
    .unwrap();

    let args = [
        "-q",
        "track",
        "t1",
        "--album",
        "a1",
        "--title",
        "Alive",
        "--dir",
        music.path().to_str().unwrap(),
    ];
    let first = mcat_dl(&config_home).args(args).output().unwrap();
    assert!(first.status.success(), "first run failed: {first:?}");
    let file = music.path().join("Tracks").join("Alive.mp3");
    assert_eq!(std::fs::read(&file).unwrap(), b"mp3 bytes");

    // The mock expects exactly one download request.
    let second = mcat_dl(&config_home).args(args).output().unwrap();
    assert!(second.status.success(), "second run failed: {second:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_list_prints_releases_grouped_by_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/release"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"id": "r1", "title": "Uncaged", "type": "Album", "renderedArtists": "Various Artists"},
                {"id": "r2", "title": "Alive", "type": "Single", "renderedArtists": "Rootkit"}
            ]
        })))
        .mount(&server)
        .await;

    let config_home = TempDir::new().unwrap();
    let config_dir = config_home.path().join("mcat-dl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("api_base = \"{}\"\n", server.uri()),
    )
    .unwrap();

    let output = mcat_dl(&config_home).args(["-q", "list"]).output().unwrap();

    assert!(output.status.success(), "list failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Album\n  r1  Various Artists - Uncaged"), "{stdout}");
    assert!(stdout.contains("Single\n  r2  Rootkit - Alive"), "{stdout}");
}
