//! `botdeck bots status|start|stop`: client for a running dashboard.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Subcommand, Debug)]
pub enum BotsCommand {
    /// Show running state, pid and uptime of every configured bot.
    Status(StatusArgs),
    /// Launch a bot.
    Start(ActionArgs),
    /// Kill a bot and its process tree.
    Stop(ActionArgs),
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Dashboard base URL. Defaults to the configured listen address.
    #[arg(long)]
    pub url: Option<String>,

    /// Session token. Defaults to the first configured token.
    #[arg(long)]
    pub token: Option<String>,

    /// Config file used to derive the defaults above.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit the raw JSON status map.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub server: ServerArgs,
}

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Bot identifier, e.g. "vouch".
    pub id: String,

    #[command(flatten)]
    pub server: ServerArgs,
}

#[derive(Debug, Deserialize)]
struct BotStatus {
    running: bool,
    pid: Option<u32>,
    uptime: u64,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "bot")]
    bot: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "pid")]
    pid: String,
    #[tabled(rename = "uptime")]
    uptime: String,
}

pub fn run(command: BotsCommand) -> Result<()> {
    match command {
        BotsCommand::Status(args) => status(args),
        BotsCommand::Start(args) => action(args, "start"),
        BotsCommand::Stop(args) => action(args, "stop"),
    }
}

fn status(args: StatusArgs) -> Result<()> {
    let client = Client::resolve(args.server)?;
    let body = client.send("GET", "/api/bots/status")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&body).context("failed to render status JSON")?
        );
        return Ok(());
    }

    let statuses: BTreeMap<String, BotStatus> =
        serde_json::from_value(body).context("unexpected status payload")?;
    if statuses.is_empty() {
        println!("No bots configured.");
        return Ok(());
    }
    let running = statuses.values().filter(|s| s.running).count();
    let rows: Vec<StatusRow> = statuses
        .into_iter()
        .map(|(bot, s)| StatusRow {
            bot,
            state: if s.running {
                "running".green().to_string()
            } else {
                "stopped".bright_black().to_string()
            },
            pid: s.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            uptime: if s.running { format_uptime(s.uptime) } else { "-".to_string() },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{running} running");
    Ok(())
}

fn action(args: ActionArgs, verb: &str) -> Result<()> {
    let client = Client::resolve(args.server)?;
    let body = client.send("POST", &format!("/api/bots/{}/{verb}", args.id))?;

    // Already running / not running come back as 200 with an error message.
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        println!("{} {}: {message}", "!".yellow(), args.id);
        return Ok(());
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("done");
    match body.get("pid").and_then(Value::as_u64) {
        Some(pid) => println!("✓ {message} (pid {pid})"),
        None => println!("✓ {message}"),
    }
    Ok(())
}

/// `3725` → `1h 02m 05s`.
fn format_uptime(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

struct Client {
    base: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl Client {
    /// Fill in whatever `--url` / `--token` left out from the config file.
    fn resolve(args: ServerArgs) -> Result<Self> {
        let (base, token) = match (args.url, args.token) {
            (Some(url), Some(token)) => (url, Some(token)),
            (url, token) => {
                let (_, cfg) = super::load_config(args.config.as_deref())?;
                (
                    url.unwrap_or_else(|| base_url(cfg.listen)),
                    token.or_else(|| cfg.auth.tokens.first().cloned()),
                )
            }
        };
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            token,
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        })
    }

    fn send(&self, method: &str, path: &str) -> Result<Value> {
        let url = format!("{}{path}", self.base);
        let mut request = self.agent.request(method, &url);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        match request.call() {
            Ok(response) => response
                .into_json()
                .with_context(|| format!("invalid JSON from {url}")),
            Err(ureq::Error::Status(code, response)) => {
                let body: Value = response.into_json().unwrap_or(Value::Null);
                let message = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("request failed");
                Err(anyhow::anyhow!("{message} (HTTP {code})"))
            }
            Err(ureq::Error::Transport(err)) => Err(anyhow::Error::new(err))
                .with_context(|| format!("could not reach botdeck at {}", self.base)),
        }
    }
}

/// Loopback URL for `listen`; wildcard addresses are reached via localhost.
fn base_url(listen: SocketAddr) -> String {
    let host = match listen {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => "127.0.0.1".to_string(),
        SocketAddr::V4(v4) => v4.ip().to_string(),
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => "[::1]".to_string(),
        SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
    };
    format!("http://{host}:{}", listen.port())
}
