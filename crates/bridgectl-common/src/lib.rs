//! Common infrastructure for bridgectl.
//!
//! This crate provides what every bridge operation needs before it can touch
//! the kernel:
//!
//! - [`shell`]: Subprocess execution from argument vectors, behind the
//!   [`CommandRunner`] trait
//! - [`tools`]: Where `ip` and `brctl` live ([`ToolPaths`]) and the
//!   [`BridgeTools`] handle that runs them
//! - [`error`]: Low-level error types for subprocess failures
//!
//! # Example
//!
//! ```ignore
//! use bridgectl_common::{BridgeTools, SystemRunner, ToolPaths};
//!
//! let paths = ToolPaths::resolve(&SystemRunner).await?;
//! let tools = BridgeTools::system(paths);
//! let listing = tools.brctl(&["show".to_string()]).await?;
//! ```

pub mod error;
pub mod shell;
pub mod tools;

// Re-export commonly used items at crate root
pub use error::{ShellError, ShellResult};
pub use shell::{CommandRunner, ExecResult, SystemRunner};
pub use tools::{BridgeTools, ToolPaths};
