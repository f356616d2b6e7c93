use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn botdeck_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("botdeck"));
    cmd.env("HOME", home).env("USERPROFILE", home).env_remove("PORT");
    cmd
}

#[test]
fn init_writes_template_then_refuses_to_overwrite() {
    let home = TempDir::new().expect("home");

    botdeck_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("4 bots configured"));

    let written = fs::read_to_string(home.path().join(".botdeck").join("config.yaml"))
        .expect("config written");
    for id in ["inusual", "verification", "vouch", "support"] {
        assert!(written.contains(id), "missing {id} in:\n{written}");
    }

    botdeck_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(contains("--force"));

    botdeck_cmd(home.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn check_without_config_points_at_init() {
    let home = TempDir::new().expect("home");
    botdeck_cmd(home.path())
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(contains("botdeck config init"));
}

#[test]
fn check_reports_duplicate_ids() {
    let home = TempDir::new().expect("home");
    let path = home.path().join("dup.yaml");
    fs::write(
        &path,
        "bots:\n  - {id: a, name: A, path: /tmp}\n  - {id: a, name: B, path: /tmp}\n",
    )
    .expect("write config");

    botdeck_cmd(home.path())
        .args(["config", "check", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("more than once"));
}

#[test]
fn show_lists_bots_and_honours_port_override() {
    let home = TempDir::new().expect("home");
    botdeck_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .success();

    botdeck_cmd(home.path())
        .env("PORT", "4242")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("127.0.0.1:4242"))
        .stdout(contains("Vouch Bot"))
        .stdout(contains("npm start"));
}

#[test]
fn bots_status_without_server_fails_cleanly() {
    let home = TempDir::new().expect("home");
    // Port 9 (discard) is essentially never served over HTTP locally.
    botdeck_cmd(home.path())
        .args(["bots", "status", "--url", "http://127.0.0.1:9", "--token", "t"])
        .assert()
        .failure()
        .stderr(contains("could not reach botdeck"));
}
