//! Operations over the host's bridge list.

use bridgectl_common::BridgeTools;
use tracing::{info, instrument, warn};

use crate::bridge::Bridge;
use crate::commands::build_show_args;
use crate::error::{BridgeError, BridgeResult};
use crate::parse::parse_bridge_names;

/// Creates, deletes and enumerates bridges.
///
/// Holds nothing but the tool configuration; the bridge list itself always
/// comes from `brctl show`.
#[derive(Debug, Clone)]
pub struct BridgeController {
    tools: BridgeTools,
}

impl BridgeController {
    pub fn new(tools: BridgeTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &BridgeTools {
        &self.tools
    }

    /// Returns a handle to `name` without checking that it exists.
    pub fn bridge(&self, name: impl Into<String>) -> Bridge {
        Bridge::new(name, self.tools.clone())
    }

    /// Creates a bridge and sets its link up.
    ///
    /// If the link cannot be brought up, the freshly created bridge is
    /// removed again before the link-up error is returned.
    #[instrument(skip(self))]
    pub async fn addbr(&self, name: &str) -> BridgeResult<Bridge> {
        let bridge = self.bridge(name);
        bridge.create().await?;

        if let Err(err) = bridge.link_up().await {
            match bridge.remove().await {
                Ok(()) => info!(bridge = name, "Removed bridge after failed link up"),
                Err(cleanup) => warn!(
                    bridge = name,
                    error = %cleanup,
                    "Could not remove bridge after failed link up"
                ),
            }
            return Err(err);
        }

        info!(bridge = name, "Bridge created");
        Ok(bridge)
    }

    /// Sets the link down and deletes the bridge.
    ///
    /// Returns `Ok(false)` without touching anything if no bridge named
    /// `name` exists.
    #[instrument(skip(self))]
    pub async fn delbr(&self, name: &str) -> BridgeResult<bool> {
        let Some(bridge) = self.getbr(name).await? else {
            info!(bridge = name, "Bridge does not exist, nothing to delete");
            return Ok(false);
        };

        bridge.link_down().await?;
        bridge.remove().await?;
        info!(bridge = name, "Bridge deleted");
        Ok(true)
    }

    /// Lists every bridge on the host, in the order `brctl show` prints them.
    pub async fn showall(&self) -> BridgeResult<Vec<Bridge>> {
        let stdout = self
            .tools
            .brctl(&build_show_args(None))
            .await
            .map_err(|e| {
                let err = BridgeError::show_bridges(e);
                warn!(error = %err, "Bridge listing failed");
                err
            })?;

        Ok(parse_bridge_names(&stdout)
            .into_iter()
            .map(|name| self.bridge(name))
            .collect())
    }

    /// Finds a bridge by exact name.
    pub async fn getbr(&self, name: &str) -> BridgeResult<Option<Bridge>> {
        Ok(self
            .showall()
            .await?
            .into_iter()
            .find(|bridge| bridge.name() == name))
    }
}
