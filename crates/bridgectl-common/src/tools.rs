//! Locations of the external tools and the handle used to invoke them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ShellError, ShellResult};
use crate::shell::{self, CommandRunner, SystemRunner, BRCTL_CMD, IP_CMD, WHICH_CMD};

/// Resolved paths of the `ip` and `brctl` executables.
///
/// Resolved once by the caller and never refreshed: if a tool is installed
/// after resolution, a new `ToolPaths` has to be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    ip: PathBuf,
    brctl: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::new(IP_CMD, BRCTL_CMD)
    }
}

impl ToolPaths {
    /// Creates tool paths from explicit locations.
    pub fn new(ip: impl Into<PathBuf>, brctl: impl Into<PathBuf>) -> Self {
        Self {
            ip: ip.into(),
            brctl: brctl.into(),
        }
    }

    /// Locates both tools on the search path with `which`.
    pub async fn resolve(runner: &dyn CommandRunner) -> ShellResult<Self> {
        let ip = locate(runner, "ip").await?;
        let brctl = locate(runner, "brctl").await?;
        Ok(Self { ip, brctl })
    }

    /// Replaces the `ip` location.
    pub fn with_ip(mut self, ip: impl Into<PathBuf>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Replaces the `brctl` location.
    pub fn with_brctl(mut self, brctl: impl Into<PathBuf>) -> Self {
        self.brctl = brctl.into();
        self
    }

    pub fn ip(&self) -> &Path {
        &self.ip
    }

    pub fn brctl(&self) -> &Path {
        &self.brctl
    }
}

/// Finds `executable` on the search path.
///
/// Any failure of `which` (spawn error, non-zero exit, empty output) is
/// reported as [`ShellError::ToolNotFound`].
pub async fn locate(runner: &dyn CommandRunner, executable: &str) -> ShellResult<PathBuf> {
    let args = vec![executable.to_string()];
    match shell::exec_or_throw(runner, Path::new(WHICH_CMD), &args).await {
        Ok(stdout) => {
            let path = stdout.lines().next().unwrap_or_default().trim();
            if path.is_empty() {
                warn!(tool = executable, "Executable path not found");
                return Err(ShellError::tool_not_found(executable));
            }
            debug!(tool = executable, path = path, "Resolved executable");
            Ok(PathBuf::from(path))
        }
        Err(e) => {
            warn!(tool = executable, error = %e, "Executable path not found");
            Err(ShellError::tool_not_found(executable))
        }
    }
}

/// Tool locations plus the runner that executes them.
///
/// Cloning is cheap; the runner is shared.
#[derive(Clone)]
pub struct BridgeTools {
    paths: ToolPaths,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for BridgeTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeTools")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl BridgeTools {
    pub fn new(paths: ToolPaths, runner: Arc<dyn CommandRunner>) -> Self {
        Self { paths, runner }
    }

    /// Uses real child processes.
    pub fn system(paths: ToolPaths) -> Self {
        Self::new(paths, Arc::new(SystemRunner))
    }

    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Runs `brctl` with `args`, returning stdout on a zero exit.
    pub async fn brctl(&self, args: &[String]) -> ShellResult<String> {
        shell::exec_or_throw(self.runner(), self.paths.brctl(), args).await
    }

    /// Runs `ip` with `args`, returning stdout on a zero exit.
    pub async fn ip(&self, args: &[String]) -> ShellResult<String> {
        shell::exec_or_throw(self.runner(), self.paths.ip(), args).await
    }
}
