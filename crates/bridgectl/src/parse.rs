//! Parsing of `brctl show` output.
//!
//! `brctl show` prints a table like:
//!
//! ```text
//! bridge name	bridge id		STP enabled	interfaces
//! br0		8000.001122334455	no		eth0
//! 							eth1
//! docker0		8000.0242ac110002	yes
//! ```
//!
//! The parsing is positional and depends on this exact layout. All knowledge
//! of it lives in this module.

use crate::commands::SHOW_HEADER_TOKENS;

/// Bridge names from the full `brctl show` listing, in the order printed.
///
/// The header line is dropped and the first tab-separated field of every other
/// line is taken as a name. Continuation lines listing further interfaces of
/// the previous bridge start with a tab and are skipped.
pub fn parse_bridge_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split('\t').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token view of `brctl show <bridge>`.
///
/// After the seven header tokens the output is read positionally:
/// `[0]` bridge name, `[1]` bridge id, `[2]` STP flag, `[3..]` interfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeDetails {
    tokens: Vec<String>,
}

impl BridgeDetails {
    pub fn parse(stdout: &str) -> Self {
        Self {
            tokens: stdout
                .split_whitespace()
                .skip(SHOW_HEADER_TOKENS)
                .map(str::to_string)
                .collect(),
        }
    }

    /// All tokens following the header.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn name(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.tokens.get(1).map(String::as_str)
    }

    /// The raw STP column, normally `yes` or `no`.
    pub fn stp_flag(&self) -> Option<&str> {
        self.tokens.get(2).map(String::as_str)
    }

    /// True only for the literal `yes`.
    pub fn stp_enabled(&self) -> Option<bool> {
        self.stp_flag().map(|flag| flag == "yes")
    }

    pub fn interfaces(&self) -> &[String] {
        self.tokens.get(3..).unwrap_or_default()
    }
}
