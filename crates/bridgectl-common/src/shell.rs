//! Subprocess execution for the `brctl` and `ip` tools.
//!
//! Commands are run from an explicit argument vector, never through
//! `/bin/sh -c`, so bridge and port names reach the tool exactly as given.
//! The [`CommandRunner`] trait is the seam between the bridge operations and
//! the operating system; [`SystemRunner`] is the production implementation.
//!
//! # Example
//!
//! ```ignore
//! use bridgectl_common::shell::{self, SystemRunner};
//! use std::path::Path;
//!
//! let runner = SystemRunner;
//! let args = vec!["show".to_string()];
//! let stdout = shell::exec_or_throw(&runner, Path::new("/sbin/brctl"), &args).await?;
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{ShellError, ShellResult};

/// Default path to the `ip` command for link state management.
pub const IP_CMD: &str = "/sbin/ip";

/// Default path to the `brctl` command for bridge control.
pub const BRCTL_CMD: &str = "/sbin/brctl";

/// Path to `which`, used to locate the tools on the search path.
pub const WHICH_CMD: &str = "/usr/bin/which";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Arguments made only of these characters are rendered unquoted.
static SHELL_SAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").expect("Invalid regex pattern"));

/// Quotes a string for display as part of a shell command line.
///
/// The string is wrapped in double quotes and any character with special
/// meaning inside double quotes (`$`, `` ` ``, `"`, `\`, newline) is escaped.
///
/// # Example
///
/// ```
/// use bridgectl_common::shell::shellquote;
///
/// assert_eq!(shellquote("br0"), "\"br0\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Renders a program and its arguments as a single command line.
///
/// Used for logs and error messages only; nothing is ever executed from the
/// rendered string.
pub fn render_command(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        if SHELL_SAFE_RE.is_match(arg) {
            line.push_str(arg);
        } else {
            line.push_str(&shellquote(arg));
        }
    }
    line
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// The exit code of the command (0 = success, -1 = killed by a signal).
    pub exit_code: i32,
    /// Captured stdout with trailing whitespace removed.
    pub stdout: String,
    /// Captured stderr, trimmed.
    pub stderr: String,
}

impl ExecResult {
    /// Builds a successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Builds a failed result with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs on behalf of the bridge operations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, waits for it to exit and captures its output.
    ///
    /// A non-zero exit is reported through [`ExecResult::exit_code`], not as an
    /// error; only a failure to spawn the process is an `Err`.
    async fn run(&self, program: &Path, args: &[String]) -> ShellResult<ExecResult>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[String]) -> ShellResult<ExecResult> {
        tracing::debug!(program = %program.display(), args = ?args, "Executing command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ShellError::Spawn {
                command: render_command(program, args),
                source: e,
            })?;

        Ok(ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Runs a command and turns a non-zero exit into [`ShellError::NonZeroExit`].
///
/// # Returns
///
/// * `Ok(String)` - The stdout output on success
/// * `Err(ShellError)` - If the command could not be spawned or exited non-zero
pub async fn exec_or_throw(
    runner: &dyn CommandRunner,
    program: &Path,
    args: &[String],
) -> ShellResult<String> {
    let result = runner.run(program, args).await?;
    if result.success() {
        tracing::trace!(program = %program.display(), args = ?args, "Command succeeded");
        Ok(result.stdout)
    } else {
        tracing::debug!(
            program = %program.display(),
            args = ?args,
            exit_code = result.exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
        Err(ShellError::NonZeroExit {
            command: render_command(program, args),
            exit_code: result.exit_code,
            stderr: result.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shellquote_special_chars() {
        assert_eq!(shellquote("$HOME"), "\"\\$HOME\"");
        assert_eq!(shellquote("`whoami`"), "\"\\`whoami\\`\"");
        assert_eq!(shellquote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(shellquote(""), "\"\"");
    }

    #[test]
    fn test_render_command_plain() {
        let line = render_command(Path::new("/sbin/brctl"), &args(&["addif", "br0", "eth0"]));
        assert_eq!(line, "/sbin/brctl addif br0 eth0");
    }

    #[test]
    fn test_render_command_quotes_unsafe_args() {
        let line = render_command(Path::new("/sbin/ip"), &args(&["link", "set", "dev", "my br"]));
        assert_eq!(line, "/sbin/ip link set dev \"my br\"");
    }

    #[test]
    fn test_exec_result_constructors() {
        assert!(ExecResult::ok("out").success());
        let failed = ExecResult::failed(2, "boom");
        assert!(!failed.success());
        assert_eq!(failed.stderr, "boom");
    }

    #[tokio::test]
    async fn test_system_runner_echo() {
        let result = SystemRunner
            .run(Path::new("/bin/echo"), &args(&["hello"]))
            .await
            .unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "hello");
    }

    #[tokio::test]
    async fn test_system_runner_exit_code() {
        let result = SystemRunner
            .run(Path::new("/bin/sh"), &args(&["-c", "exit 42"]))
            .await
            .unwrap();
        assert_eq!(result.exit_code, 42);
    }

    #[tokio::test]
    async fn test_system_runner_spawn_failure() {
        let result = SystemRunner
            .run(Path::new("/nonexistent/brctl"), &args(&["show"]))
            .await;
        match result {
            Err(ShellError::Spawn { command, .. }) => {
                assert_eq!(command, "/nonexistent/brctl show");
            }
            other => panic!("Expected Spawn error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exec_or_throw_success() {
        let output = exec_or_throw(&SystemRunner, Path::new("/bin/echo"), &args(&["success"]))
            .await
            .unwrap();
        assert_eq!(output, "success");
    }

    #[tokio::test]
    async fn test_exec_or_throw_failure() {
        let result =
            exec_or_throw(&SystemRunner, Path::new("/bin/sh"), &args(&["-c", "exit 1"])).await;
        match result {
            Err(ShellError::NonZeroExit { exit_code, command, .. }) => {
                assert_eq!(exit_code, 1);
                assert_eq!(command, "/bin/sh -c \"exit 1\"");
            }
            _ => panic!("Expected NonZeroExit error"),
        }
    }
}
