//! Error taxonomy for bridge operations.
//!
//! Every failing external invocation becomes a [`BridgeError::Operation`]
//! tagged with the [`BridgeOp`] that failed and the identifiers involved. The
//! message composes the operation context with the wrapped cause, e.g.
//! `Could not add interface eth0 to br0. Subprocess returned error code 1`.

use std::fmt;

use bridgectl_common::ShellError;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// The kind of operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOp {
    AddInterface,
    DeleteInterface,
    SetHairpin,
    SetStp,
    SetAgeing,
    SetBridgePriority,
    SetForwardDelay,
    SetHelloTime,
    SetMaxAge,
    SetPathCost,
    SetPortPriority,
    ShowDetails,
    CreateBridge,
    DeleteBridge,
    SetLinkUp,
    SetLinkDown,
    ShowBridges,
}

impl BridgeOp {
    /// Returns the operation name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeOp::AddInterface => "addif",
            BridgeOp::DeleteInterface => "delif",
            BridgeOp::SetHairpin => "hairpin",
            BridgeOp::SetStp => "stp",
            BridgeOp::SetAgeing => "setageing",
            BridgeOp::SetBridgePriority => "setbridgeprio",
            BridgeOp::SetForwardDelay => "setfd",
            BridgeOp::SetHelloTime => "sethello",
            BridgeOp::SetMaxAge => "setmaxage",
            BridgeOp::SetPathCost => "setpathcost",
            BridgeOp::SetPortPriority => "setportprio",
            BridgeOp::ShowDetails => "show",
            BridgeOp::CreateBridge => "addbr",
            BridgeOp::DeleteBridge => "delbr",
            BridgeOp::SetLinkUp => "link_up",
            BridgeOp::SetLinkDown => "link_down",
            BridgeOp::ShowBridges => "showall",
        }
    }
}

impl fmt::Display for BridgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an operation was acting on when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpContext {
    pub op: BridgeOp,
    /// Bridge name; absent only for [`BridgeOp::ShowBridges`].
    pub bridge: Option<String>,
    /// Port or interface name for per-port operations.
    pub port: Option<String>,
}

impl fmt::Display for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bridge = self.bridge.as_deref().unwrap_or_default();
        let port = self.port.as_deref().unwrap_or_default();
        match self.op {
            BridgeOp::AddInterface => write!(f, "Could not add interface {} to {}.", port, bridge),
            BridgeOp::DeleteInterface => {
                write!(f, "Could not delete interface {} from {}.", port, bridge)
            }
            BridgeOp::SetHairpin => {
                write!(f, "Could not set hairpin on port {} in {}.", port, bridge)
            }
            BridgeOp::SetStp => write!(f, "Could not set stp on {}.", bridge),
            BridgeOp::SetAgeing => write!(f, "Could not set ageing time on {}.", bridge),
            BridgeOp::SetBridgePriority => {
                write!(f, "Could not set bridge priority on {}.", bridge)
            }
            BridgeOp::SetForwardDelay => write!(f, "Could not set forward delay on {}.", bridge),
            BridgeOp::SetHelloTime => write!(f, "Could not set hello time on {}.", bridge),
            BridgeOp::SetMaxAge => write!(f, "Could not set max message age on {}.", bridge),
            BridgeOp::SetPathCost => {
                write!(f, "Could not set path cost on port {} in {}.", port, bridge)
            }
            BridgeOp::SetPortPriority => {
                write!(f, "Could not set priority on port {} in {}.", port, bridge)
            }
            BridgeOp::ShowDetails => write!(f, "Could not show {}.", bridge),
            BridgeOp::CreateBridge => write!(f, "Could not create bridge {}.", bridge),
            BridgeOp::DeleteBridge => write!(f, "Could not delete bridge {}.", bridge),
            BridgeOp::SetLinkUp => write!(f, "Could not set link up on {}.", bridge),
            BridgeOp::SetLinkDown => write!(f, "Could not set link down on {}.", bridge),
            BridgeOp::ShowBridges => f.write_str("Could not show bridges."),
        }
    }
}

/// Errors returned by [`Bridge`](crate::Bridge) and
/// [`BridgeController`](crate::BridgeController).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// An external tool failed while performing an operation.
    ///
    /// The cause is already part of the message, so it is not reported again
    /// through `Error::source`.
    #[error("{context} {cause}")]
    Operation { context: OpContext, cause: ShellError },

    /// `brctl show <bridge>` printed fewer tokens than the layout requires.
    #[error("Unexpected 'brctl show {bridge}' output: missing {field}")]
    MalformedOutput {
        bridge: String,
        field: &'static str,
    },

    /// The operation exists in brctl but is not supported here.
    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },
}

impl BridgeError {
    /// Creates an operation error for a whole-bridge operation.
    pub fn on_bridge(op: BridgeOp, bridge: impl Into<String>, source: ShellError) -> Self {
        Self::Operation {
            context: OpContext {
                op,
                bridge: Some(bridge.into()),
                port: None,
            },
            cause: source,
        }
    }

    /// Creates an operation error for a per-port operation.
    pub fn on_port(
        op: BridgeOp,
        bridge: impl Into<String>,
        port: impl Into<String>,
        source: ShellError,
    ) -> Self {
        Self::Operation {
            context: OpContext {
                op,
                bridge: Some(bridge.into()),
                port: Some(port.into()),
            },
            cause: source,
        }
    }

    /// Creates the error for a failed bridge listing.
    pub fn show_bridges(source: ShellError) -> Self {
        Self::Operation {
            context: OpContext {
                op: BridgeOp::ShowBridges,
                bridge: None,
                port: None,
            },
            cause: source,
        }
    }

    /// Returns the failed operation kind, if this is an operation error.
    pub fn op(&self) -> Option<BridgeOp> {
        match self {
            BridgeError::Operation { context, .. } => Some(context.op),
            _ => None,
        }
    }

    /// Returns the exit code of the failed tool invocation.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BridgeError::Operation { cause, .. } => cause.exit_code(),
            _ => None,
        }
    }

    /// Returns the tool failure behind an operation error.
    pub fn cause(&self) -> Option<&ShellError> {
        match self {
            BridgeError::Operation { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn bridge(&self) -> Option<&str> {
        match self {
            BridgeError::Operation { context, .. } => context.bridge.as_deref(),
            BridgeError::MalformedOutput { bridge, .. } => Some(bridge.as_str()),
            BridgeError::NotImplemented { .. } => None,
        }
    }

    pub fn port(&self) -> Option<&str> {
        match self {
            BridgeError::Operation { context, .. } => context.port.as_deref(),
            _ => None,
        }
    }
}
