//! Test infrastructure for bridgectl
//!
//! Provides:
//! - A scripted runner that records invocations and replays canned results
//! - A simulated host that answers `brctl` and `ip` from an in-memory
//!   bridge table

pub mod host;
pub mod scripted;

pub use host::{FakeBridge, FakeBridgeHost, SHOW_HEADER};
pub use scripted::{Invocation, ScriptedRunner};
