// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Bounded execution of external query tools (`iw`).
//!
//! The child is polled with `try_wait` until it exits or the time budget runs
//! out, in which case it is killed and reaped so no zombie outlives the tick.
//! Both output pipes are drained on helper threads so a chatty child cannot
//! fill a pipe buffer and stall.

use crate::error::{BeaconError, Result};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs a program and returns its stdout when it exits successfully within
/// `timeout`.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let display = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BeaconError::CommandFailed(format!("{}: {}", display, e)))?;

    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BeaconError::CommandTimedOut {
                command: display,
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(stdout_reader, &display)?;
    let stderr = collect(stderr_reader, &display).unwrap_or_default();

    if !status.success() {
        return Err(BeaconError::CommandFailed(format!(
            "{} exited with {}: {}",
            display,
            status,
            stderr.trim()
        )));
    }

    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<String>> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        pipe.read_to_string(&mut buf).map(|_| buf)
    })
}

fn collect(reader: Option<JoinHandle<std::io::Result<String>>>, display: &str) -> Result<String> {
    match reader {
        Some(handle) => Ok(handle
            .join()
            .map_err(|_| BeaconError::CommandFailed(format!("{}: output reader panicked", display)))??),
        None => Ok(String::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = run_with_timeout("echo", &["Station", "aa:bb"], Duration::from_secs(2)).unwrap();
        assert_eq!(out.trim(), "Station aa:bb");
    }

    #[test]
    fn test_output_larger_than_pipe_buffer() {
        let out = run_with_timeout("head", &["-c", "200000", "/dev/zero"], Duration::from_secs(2))
            .unwrap();
        assert_eq!(out.len(), 200_000);
    }

    #[test]
    fn test_large_stderr_does_not_stall() {
        let out = run_with_timeout(
            "sh",
            &["-c", "head -c 200000 /dev/zero >&2; echo done"],
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(out.trim(), "done");
    }

    #[test]
    fn test_stderr_reported_on_failure() {
        let err = run_with_timeout("sh", &["-c", "echo no such device >&2; exit 1"], Duration::from_secs(2))
            .unwrap_err();
        assert!(err.to_string().contains("no such device"));
    }

    #[test]
    fn test_nonzero_exit_is_command_failed() {
        let err = run_with_timeout("false", &[], Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, BeaconError::CommandFailed(_)));
    }

    #[test]
    fn test_missing_program_is_command_failed() {
        let err = run_with_timeout("definitely-not-a-real-tool", &[], Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, BeaconError::CommandFailed(_)));
    }

    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = run_with_timeout("sleep", &["5"], Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, BeaconError::CommandTimedOut { timeout_ms: 100, .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
