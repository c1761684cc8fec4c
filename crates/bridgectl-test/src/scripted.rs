//! A runner that records invocations and replays queued results.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use bridgectl_common::{shell::render_command, CommandRunner, ExecResult, ShellResult};

/// One recorded call to a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program path as passed to the runner
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<String>,
}

impl Invocation {
    /// Create an invocation from string slices
    pub fn new(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The invocation rendered as a command line
    pub fn command_line(&self) -> String {
        render_command(&self.program, &self.args)
    }
}

/// Replays results in FIFO order; once the queue is empty every call
/// succeeds with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<Invocation>>,
    responses: Mutex<VecDeque<ExecResult>>,
}

impl ScriptedRunner {
    /// Create a runner with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result with the given stdout
    pub fn with_output(self, stdout: impl Into<String>) -> Self {
        self.push(ExecResult::ok(stdout));
        self
    }

    /// Queue a failed result with the given exit code
    pub fn with_failure(self, exit_code: i32) -> Self {
        self.push(ExecResult::failed(exit_code, "simulated failure"));
        self
    }

    /// Queue an arbitrary result
    pub fn push(&self, result: ExecResult) {
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .push_back(result);
    }

    /// All invocations so far
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// All invocations so far, rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(Invocation::command_line).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &Path, args: &[String]) -> ShellResult<ExecResult> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(Invocation {
                program: program.to_path_buf(),
                args: args.to_vec(),
            });
        let next = self
            .responses
            .lock()
            .expect("responses lock poisoned")
            .pop_front();
        Ok(next.unwrap_or_else(|| ExecResult::ok("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_replays_in_order() {
        let runner = ScriptedRunner::new().with_output("first").with_failure(3);
        let args = vec!["show".to_string()];

        let first = runner.run(Path::new("/sbin/brctl"), &args).await.unwrap();
        let second = runner.run(Path::new("/sbin/brctl"), &args).await.unwrap();
        let third = runner.run(Path::new("/sbin/brctl"), &args).await.unwrap();

        assert_eq!(first.stdout, "first");
        assert_eq!(second.exit_code, 3);
        assert!(third.success());
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_records_command_lines() {
        let runner = ScriptedRunner::new();
        let args = vec!["addif".to_string(), "br0".to_string(), "eth0".to_string()];
        runner.run(Path::new("/sbin/brctl"), &args).await.unwrap();

        assert_eq!(runner.command_lines(), vec!["/sbin/brctl addif br0 eth0"]);
        assert_eq!(
            runner.calls()[0],
            Invocation::new("/sbin/brctl", &["addif", "br0", "eth0"])
        );
    }
}
