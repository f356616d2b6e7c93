//! Spawning bot processes and forwarding their output to the log.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use botdeck_core::types::{BotConfig, BotId};

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Launch `bot` in its working directory with piped stdout/stderr.
///
/// On unix the child leads a fresh process group so the whole tree can be
/// signalled at once by [`crate::terminate::kill_tree`].
pub(crate) fn spawn(bot: &BotConfig) -> std::io::Result<Child> {
    let mut cmd = command_for(bot);
    cmd.current_dir(&bot.path)
        .envs(&bot.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    cmd.process_group(0);

    cmd.spawn()
}

fn command_for(bot: &BotConfig) -> Command {
    if bot.shell {
        return shell_command(&bot.command_line());
    }
    let mut cmd = Command::new(&bot.command);
    cmd.args(&bot.args);
    cmd
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

/// Take the child's output pipes and log every line under target `bot`.
///
/// The reader tasks end on EOF, i.e. when the process (and anything holding
/// its pipes) is gone.
pub(crate) fn forward_output(bot: &BotId, child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, bot.clone(), OutputStream::Stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, bot.clone(), OutputStream::Stderr));
    }
}

async fn forward_lines<R>(reader: R, bot: BotId, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    loop {
        match segments.next_segment().await {
            Ok(Some(raw)) => {
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim_end_matches('\r');
                if line.is_empty() {
                    continue;
                }
                match stream {
                    OutputStream::Stdout => tracing::info!(target: "bot", bot = %bot, "{line}"),
                    OutputStream::Stderr => tracing::warn!(target: "bot", bot = %bot, "{line}"),
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(bot = %bot, stream = ?stream, error = %err, "output stream closed");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bot_in(dir: &TempDir, command: &str, args: &[&str], shell: bool) -> BotConfig {
        let mut bot = BotConfig::new("probe", "Probe", dir.path());
        bot.command = command.to_string();
        bot.args = args.iter().map(|a| a.to_string()).collect();
        bot.shell = shell;
        bot
    }

    #[tokio::test]
    async fn spawn_runs_in_working_directory() {
        let dir = TempDir::new().expect("tempdir");
        let bot = bot_in(&dir, "touch", &["marker"], false);
        let mut child = spawn(&bot).expect("spawn");
        let status = child.wait().await.expect("wait");
        assert!(status.success());
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn shell_mode_passes_the_joined_command_line() {
        let dir = TempDir::new().expect("tempdir");
        let bot = bot_in(&dir, "echo", &["ready", ">", "out.txt"], true);
        let mut child = spawn(&bot).expect("spawn");
        child.wait().await.expect("wait");
        let out = std::fs::read_to_string(dir.path().join("out.txt")).expect("read");
        assert_eq!(out.trim(), "ready");
    }

    #[tokio::test]
    async fn env_entries_reach_the_child() {
        let dir = TempDir::new().expect("tempdir");
        let mut bot = bot_in(&dir, "printf %s \"$BOT_TOKEN\" > token.txt", &[], true);
        bot.env.insert("BOT_TOKEN".to_string(), "abc123".to_string());
        let mut child = spawn(&bot).expect("spawn");
        child.wait().await.expect("wait");
        let out = std::fs::read_to_string(dir.path().join("token.txt")).expect("read");
        assert_eq!(out, "abc123");
    }

    #[tokio::test]
    async fn missing_working_directory_fails_to_spawn() {
        let dir = TempDir::new().expect("tempdir");
        let mut bot = bot_in(&dir, "true", &[], false);
        bot.path = dir.path().join("does-not-exist");
        assert!(spawn(&bot).is_err());
    }
}
