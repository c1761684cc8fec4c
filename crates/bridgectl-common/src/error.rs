//! Error types for subprocess execution.
//!
//! These are the low-level causes wrapped by the bridge error taxonomy in the
//! `bridgectl` crate. All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The child process could not be spawned at all.
    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The child process exited with a non-zero code.
    #[error("Subprocess returned error code {exit_code}")]
    NonZeroExit {
        /// The rendered command line.
        command: String,
        /// The exit code, or -1 when the process was killed by a signal.
        exit_code: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// An executable could not be located on the search path.
    #[error("Executable path not found for '{tool}'")]
    ToolNotFound {
        /// The executable name that was looked up.
        tool: String,
    },
}

impl ShellError {
    /// Creates a tool-not-found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Returns the exit code when the process ran and failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ShellError::NonZeroExit { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Returns the rendered command line, if one was involved.
    pub fn command(&self) -> Option<&str> {
        match self {
            ShellError::Spawn { command, .. } | ShellError::NonZeroExit { command, .. } => {
                Some(command)
            }
            ShellError::ToolNotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_display() {
        let err = ShellError::NonZeroExit {
            command: "/sbin/brctl addif br0 eth0".to_string(),
            exit_code: 1,
            stderr: "interface eth0 does not exist!".to_string(),
        };
        assert_eq!(err.to_string(), "Subprocess returned error code 1");
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.command(), Some("/sbin/brctl addif br0 eth0"));
    }

    #[test]
    fn test_spawn_error_display() {
        let err = ShellError::Spawn {
            command: "/nonexistent/brctl show".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(err.to_string().contains("/nonexistent/brctl show"));
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn test_tool_not_found() {
        let err = ShellError::tool_not_found("brctl");
        assert_eq!(err.to_string(), "Executable path not found for 'brctl'");
        assert_eq!(err.command(), None);
    }
}
