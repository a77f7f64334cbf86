//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! through the `url` command of the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const BASE: &str = "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#";

#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env("CHANGELINK_LOG_DIR", std::env::temp_dir().join("changelink-tests"))
        .env_remove("CHANGELINK_LOG_PATH");
    cmd
}

fn url_in(dir: &std::path::Path, version: &str) -> assert_cmd::assert::Assert {
    cmd()
        .args(["-C", dir.to_str().unwrap(), "url", version])
        .assert()
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    url_in(tmp.path(), "1.5.0")
        .success()
        .stdout(format!("{BASE}v150\n"));
}

#[test]
fn discovers_base_url_from_dotfile() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".changelink.toml"),
        r##"
[link]
base_url = "https://example.com/CHANGELOG.md#"
"##,
    )
    .unwrap();

    url_in(tmp.path(), "1.5.0")
        .success()
        .stdout("https://example.com/CHANGELOG.md#v150\n");
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(
        tmp.path().join("changelink.yaml"),
        "link:\n  comparison: numeric\n",
    )
    .unwrap();

    url_in(&sub_dir, "10.0.0")
        .success()
        .stdout(format!("{BASE}v1000\n"));
}

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(
        tmp.path().join(".changelink.toml"),
        "[link]\nanchor_floor = \"3.0.0\"\n",
    )
    .unwrap();

    // The config outside the repo is ignored, so the stock floor applies.
    url_in(&src, "1.5.0")
        .success()
        .stdout(format!("{BASE}v150\n"));
}

#[test]
fn explicit_config_flag_wins() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".changelink.toml"),
        "[link]\nanchor_floor = \"1.0.0\"\n",
    )
    .unwrap();
    let explicit = tmp.path().join("explicit.json");
    fs::write(&explicit, r#"{"link": {"anchor_floor": "1.6.0"}}"#).unwrap();

    cmd()
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "--config",
            explicit.to_str().unwrap(),
            "url",
            "1.5.0",
        ])
        .assert()
        .success()
        .stdout(format!("{BASE}\n"));
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".changelink.toml"), "this is not valid toml [[[").unwrap();

    url_in(tmp.path(), "1.5.0")
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn invalid_anchor_floor_fails_url() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".changelink.toml"),
        "[link]\nanchor_floor = \"latest\"\n",
    )
    .unwrap();

    url_in(tmp.path(), "1.5.0")
        .failure()
        .stderr(predicate::str::contains("invalid anchor floor"));
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".changelink.toml"),
        r#"
log_level = "info"
unknown_field = "should be ignored"
"#,
    )
    .unwrap();

    url_in(tmp.path(), "1.5.0").success();
}
