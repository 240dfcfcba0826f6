//! Command execution primitives with consistent error handling.
//!
//! Every subprocess the sweep starts goes through `run_with_timeout`: no
//! package-manager or build invocation may block the sweep indefinitely.

use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{CommandFailedDetails, Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured output from command execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Run `argv` plus `extra_args` in `dir`, killing it once `timeout` elapses.
///
/// Returns captured output on exit code zero. A non-zero exit is
/// `command.failed`, an overrun is `command.timeout`. The deadline covers
/// draining the pipes too: a background process that inherited them is
/// killed with the rest of the process group.
pub fn run_with_timeout(
    argv: &[String],
    extra_args: &[&str],
    dir: &Path,
    timeout: Duration,
) -> Result<CapturedOutput> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        Error::config_invalid_value("command", None, "Command must name a program")
    })?;
    let label = command_label(argv, extra_args);

    let mut command = Command::new(program);
    command
        .args(args)
        .args(extra_args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|e| {
        Error::internal_io(format!("Failed to run {}: {}", label, e), Some(label.clone()))
    })?;

    let (tx, rx) = mpsc::channel();
    spawn_reader(Stream::Stdout, child.stdout.take(), tx.clone());
    spawn_reader(Stream::Stderr, child.stderr.take(), tx);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill_tree(&mut child);
                return Err(Error::command_timeout(label, timeout.as_secs()));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_tree(&mut child);
                return Err(Error::internal_io(
                    format!("Failed to wait for {}: {}", label, e),
                    Some(label),
                ));
            }
        }
    };

    let mut captured = CapturedOutput::default();
    for _ in 0..2 {
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok((Stream::Stdout, text)) => captured.stdout = text,
            Ok((Stream::Stderr, text)) => captured.stderr = text,
            Err(RecvTimeoutError::Timeout) => {
                crate::core::process::kill_group(child.id());
                return Err(Error::command_timeout(label, timeout.as_secs()));
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if !status.success() {
        return Err(Error::command_failed(CommandFailedDetails {
            command: label,
            exit_code: status.code(),
            stdout: captured.stdout,
            stderr: captured.stderr,
        }));
    }

    Ok(captured)
}

fn kill_tree(child: &mut Child) {
    crate::core::process::kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: Stream,
    pipe: Option<R>,
    tx: Sender<(Stream, String)>,
) {
    thread::spawn(move || {
        let _ = tx.send((stream, read_pipe(pipe)));
    });
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn command_label(argv: &[String], extra_args: &[&str]) -> String {
    argv.iter()
        .map(String::as_str)
        .chain(extra_args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ErrorCode;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn captures_stdout_on_success() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = run_with_timeout(&sh("echo hello"), &[], dir.path(), Duration::from_secs(5))
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn runs_in_requested_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let out = run_with_timeout(&sh("ls"), &[], dir.path(), Duration::from_secs(5)).unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[test]
    fn non_zero_exit_is_command_failed() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_with_timeout(&sh("echo boom >&2; exit 3"), &[], dir.path(), Duration::from_secs(5))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandFailed);
        assert!(err.message.contains("boom"));
    }

    #[test]
    fn overrun_is_killed_and_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let started = Instant::now();
        let err = run_with_timeout(&sh("sleep 5"), &[], dir.path(), Duration::from_millis(200))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandTimeout);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn background_child_holding_pipes_cannot_outlive_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let started = Instant::now();
        let err = run_with_timeout(
            &sh("sleep 8 & echo started"),
            &[],
            dir.path(),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandTimeout);
        assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
    }

    #[test]
    fn extra_args_are_appended() {
        let dir = tempfile::TempDir::new().unwrap();
        let argv = vec!["echo".to_string(), "install".to_string()];
        let out = run_with_timeout(&argv, &["requests"], dir.path(), Duration::from_secs(5)).unwrap();
        assert_eq!(out.stdout.trim(), "install requests");
    }

    #[test]
    fn empty_command_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_with_timeout(&[], &[], dir.path(), Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }
}
