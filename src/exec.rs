//! Process execution behind a mockable [`CommandRunner`] trait.
use anyhow::{Context as _, Result, bail};
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs.
///
/// The local executor talks to the host only through this trait, so unit
/// tests can script command results.
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    /// Run a command, allowing failure (returns result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Shared test helpers for code that runs commands.
#[cfg(test)]
pub mod test_helpers {
    use super::{CommandRunner, ExecResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A scripted [`CommandRunner`].
    ///
    /// Maintains a queue of `(code, stdout)` responses consumed in FIFO
    /// order.  When the queue is empty any call returns exit code `127` with
    /// stdout `"unexpected call"`. Every invocation is recorded as
    /// `program arg1 arg2 ...` for later inspection.
    #[derive(Debug, Default)]
    pub struct MockRunner {
        responses: Mutex<VecDeque<(i32, String)>>,
        calls: Mutex<Vec<String>>,
        which_result: bool,
    }

    impl MockRunner {
        /// Create a mock from an ordered list of `(code, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(i32, &str)>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(code, out)| (code, out.to_string()))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        /// Set the value returned by every [`CommandRunner::which`] call.
        #[must_use]
        pub const fn with_which(mut self, result: bool) -> Self {
            self.which_result = result;
            self
        }

        /// Every call made so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        fn next(&self) -> (i32, String) {
            self.responses.lock().map_or_else(
                |_| (127, "mutex poisoned".to_string()),
                |mut guard| {
                    guard
                        .pop_front()
                        .unwrap_or_else(|| (127, "unexpected call".to_string()))
                },
            )
        }
    }

    impl CommandRunner for MockRunner {
        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            if let Ok(mut calls) = self.calls.lock() {
                let mut line = program.to_string();
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                calls.push(line);
            }
            let (code, stdout) = self.next();
            Ok(ExecResult {
                stdout,
                stderr: if code == 0 {
                    String::new()
                } else {
                    "mock failure".to_string()
                },
                success: code == 0,
                code: Some(code),
            })
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }
}
