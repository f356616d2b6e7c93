//! End-to-end: `botdeck serve` in the background, driven by `botdeck bots`.
#![cfg(unix)]

use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const TOKEN: &str = "e2e-token";

fn botdeck_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("botdeck"));
    cmd.env("HOME", home).env("USERPROFILE", home).env_remove("PORT");
    cmd
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("free port")
}

/// Kills the server even when an assertion fails midway.
struct Server(Child);

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn write_config(home: &Path, port: u16) {
    let bot_dir = home.join("bots").join("vouch");
    fs::create_dir_all(&bot_dir).expect("bot dir");
    let config = format!(
        "listen: 127.0.0.1:{port}\n\
         auth:\n  tokens: [{TOKEN}]\n\
         bots:\n\
         \x20 - id: vouch\n\
         \x20   name: Vouch Bot\n\
         \x20   path: {}\n\
         \x20   command: sleep\n\
         \x20   args: ['30']\n\
         \x20   shell: false\n",
        bot_dir.display()
    );
    let dir = home.join(".botdeck");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("config.yaml"), config).expect("write config");
}

fn wait_until_serving(home: &Path) {
    for _ in 0..100 {
        let ok = botdeck_cmd(home)
            .args(["bots", "status"])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if ok {
            return;
        }
        sleep(Duration::from_millis(100));
    }
    panic!("botdeck serve did not come up within 10s");
}

#[test]
fn start_status_stop_through_the_cli() {
    let home = TempDir::new().expect("home");
    let port = free_port();
    write_config(home.path(), port);

    let child = botdeck_cmd(home.path())
        .arg("serve")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn serve");
    let _server = Server(child);
    wait_until_serving(home.path());

    botdeck_cmd(home.path())
        .args(["bots", "start", "vouch"])
        .assert()
        .success()
        .stdout(contains("Vouch Bot started"));

    botdeck_cmd(home.path())
        .args(["bots", "start", "vouch"])
        .assert()
        .success()
        .stdout(contains("Bot is already running"));

    botdeck_cmd(home.path())
        .args(["bots", "status", "--json"])
        .assert()
        .success()
        .stdout(contains("\"running\": true"));

    botdeck_cmd(home.path())
        .args(["bots", "stop", "vouch"])
        .assert()
        .success()
        .stdout(contains("Vouch Bot stopped"));

    botdeck_cmd(home.path())
        .args(["bots", "stop", "ghost"])
        .assert()
        .failure()
        .stderr(contains("Bot not found"));

    botdeck_cmd(home.path())
        .args(["bots", "status", "--url", &format!("http://127.0.0.1:{port}"), "--token", "wrong"])
        .assert()
        .failure()
        .stderr(contains("Unauthorized"));
}
