//! Spawning and supervising external tools

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::error::{Error, Result};
use crate::invocation::{ToolInvocation, ToolOutput};
use crate::policy::{FailurePolicy, StepOutcome};

/// Run a tool to completion and capture its combined output.
///
/// stdout and stderr are drained concurrently and appended line by line in
/// the order they arrive. The child is spawned with kill-on-drop, so
/// dropping the returned future terminates it. When the invocation's
/// deadline passes the child is killed and reaped and [`Error::Timeout`] is
/// returned with whatever output was captured.
pub async fn run(invocation: &ToolInvocation) -> Result<ToolOutput> {
    let label = invocation.label();
    tracing::debug!(step = %label, command = %invocation.command_line(), "Running tool");

    let mut command = Command::new(invocation.program());
    command
        .args(invocation.get_args())
        .envs(invocation.get_envs().iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = invocation.get_current_dir() {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|source| Error::Spawn {
        tool: label.to_string(),
        program: invocation.program().to_path_buf(),
        source,
    })?;

    let mut combined = String::new();
    let deadline = invocation.get_timeout();
    let finished = tokio::time::timeout(deadline, drain(&mut child, label, &mut combined)).await;

    match finished {
        Ok(status) => {
            let status = status.map_err(|source| Error::Io {
                tool: label.to_string(),
                source,
            })?;
            Ok(ToolOutput {
                code: status.code(),
                output: combined,
            })
        }
        Err(_) => {
            if let Err(e) = child.kill().await {
                tracing::warn!(step = %label, error = %e, "Failed to kill timed out tool");
            }
            Err(Error::Timeout {
                tool: label.to_string(),
                after: deadline,
                output: combined,
            })
        }
    }
}

/// Run a tool and classify its exit with `policy`.
pub async fn run_with_policy(
    invocation: &ToolInvocation,
    policy: FailurePolicy,
) -> Result<StepOutcome> {
    let output = run(invocation).await?;
    policy.evaluate(invocation.label(), output)
}

async fn drain(child: &mut Child, label: &str, combined: &mut String) -> std::io::Result<ExitStatus> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let mut out = stdout.map(BufReader::new);
    let mut err = stderr.map(BufReader::new);
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();

    while out.is_some() || err.is_some() {
        tokio::select! {
            read = read_line(&mut out, &mut out_buf), if out.is_some() => {
                if !take_line(read?, &mut out_buf, label, combined) {
                    out = None;
                }
            }
            read = read_line(&mut err, &mut err_buf), if err.is_some() => {
                if !take_line(read?, &mut err_buf, label, combined) {
                    err = None;
                }
            }
        }
    }

    child.wait().await
}

async fn read_line<R>(reader: &mut Option<BufReader<R>>, buf: &mut Vec<u8>) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match reader {
        Some(r) => r.read_until(b'\n', buf).await,
        None => Ok(0),
    }
}

/// Move a finished line into `combined`. Returns false at end of stream.
fn take_line(read: usize, buf: &mut Vec<u8>, label: &str, combined: &mut String) -> bool {
    if read == 0 && buf.is_empty() {
        return false;
    }
    let line = String::from_utf8_lossy(buf);
    let line = line.trim_end_matches(['\n', '\r']);
    tracing::debug!(step = %label, "{line}");
    combined.push_str(line);
    combined.push('\n');
    buf.clear();
    read != 0
}
