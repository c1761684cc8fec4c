//! bridgectl - typed bindings for Linux bridge control
//!
//! Wraps the `brctl` and `ip` command-line tools. Each operation builds an
//! argument vector, runs the tool and turns a non-zero exit into a
//! [`BridgeError`] tagged with the failing [`BridgeOp`].
//!
//! - [`Bridge`]: per-bridge operations (interfaces, STP, timers, link state)
//! - [`BridgeController`]: create, delete, list and look up bridges
//!
//! # Example
//!
//! ```ignore
//! use bridgectl::BridgeController;
//! use bridgectl_common::{BridgeTools, SystemRunner, ToolPaths};
//!
//! let tools = BridgeTools::system(ToolPaths::resolve(&SystemRunner).await?);
//! let controller = BridgeController::new(tools);
//! let br = controller.addbr("br0").await?;
//! br.addif("eth0").await?;
//! br.stp(true).await?;
//! ```

mod bridge;
pub mod commands;
mod controller;
mod error;
pub mod parse;

pub use bridge::Bridge;
pub use controller::BridgeController;
pub use error::{BridgeError, BridgeOp, BridgeResult, OpContext};
pub use parse::BridgeDetails;
