//! Forceful termination of a bot's whole process tree.

use std::io;

/// Send `SIGKILL` to the process group led by `pid`.
///
/// Bots are spawned as group leaders, so this reaches every sub-process
/// they started. A group that no longer exists counts as terminated.
#[cfg(unix)]
pub(crate) fn kill_tree(pid: u32) -> io::Result<()> {
    let pgid = i32::try_from(pid)
        .ok()
        .filter(|pgid| *pgid > 1)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("refusing to signal pid {pid}")))?;

    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        tracing::debug!(pid, "process group already gone");
        return Ok(());
    }
    Err(err)
}

/// Run `taskkill /pid <pid> /T /F` without waiting for it.
///
/// Only a failure to launch `taskkill` is reported; its own exit status is
/// logged when it finishes.
#[cfg(windows)]
pub(crate) fn kill_tree(pid: u32) -> io::Result<()> {
    use std::process::Stdio;

    let mut child = tokio::process::Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/T", "/F"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::error!(pid, code = ?status.code(), "taskkill reported failure"),
            Err(err) => tracing::error!(pid, error = %err, "taskkill did not complete"),
        }
    });
    Ok(())
}
