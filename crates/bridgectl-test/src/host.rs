//! In-memory simulation of a host's `brctl` and `ip` tools.
//!
//! [`FakeBridgeHost`] keeps a bridge table and answers the subset of `brctl`
//! and `ip link` invocations the bridge operations issue, printing
//! `brctl show` output in the real tool's tab layout.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use bridgectl_common::{CommandRunner, ExecResult, ShellResult};
use tracing::trace;

use crate::scripted::Invocation;

/// Header line printed by `brctl show`
pub const SHOW_HEADER: &str = "bridge name\tbridge id\t\tSTP enabled\tinterfaces";

/// Simulated state of one bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeBridge {
    /// Bridge name
    pub name: String,
    /// Bridge id as printed by `brctl show`
    pub id: String,
    /// STP enabled
    pub stp: bool,
    /// Link administratively up
    pub up: bool,
    /// Attached interfaces, in attach order
    pub interfaces: Vec<String>,
    /// Last value written by each `set*`/`hairpin` subcommand, keyed by
    /// subcommand and, for per-port settings, `subcommand:port`
    pub settings: BTreeMap<String, String>,
}

impl FakeBridge {
    fn new(name: &str, index: u64) -> Self {
        Self {
            name: name.to_string(),
            id: format!("8000.{:012x}", index),
            stp: false,
            up: false,
            interfaces: Vec::new(),
            settings: BTreeMap::new(),
        }
    }

    fn render(&self, out: &mut String) {
        let stp = if self.stp { "yes" } else { "no" };
        let first = self.interfaces.first().map(String::as_str).unwrap_or("");
        out.push_str(&format!("{}\t\t{}\t{}\t\t{}\n", self.name, self.id, stp, first));
        for iface in self.interfaces.iter().skip(1) {
            out.push_str(&format!("\t\t\t\t\t\t\t{}\n", iface));
        }
    }
}

#[derive(Debug, Default)]
struct HostState {
    bridges: Vec<FakeBridge>,
    next_index: u64,
}

impl HostState {
    fn find(&self, name: &str) -> Option<&FakeBridge> {
        self.bridges.iter().find(|b| b.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut FakeBridge> {
        self.bridges.iter_mut().find(|b| b.name == name)
    }

    fn add(&mut self, name: &str) {
        self.next_index += 1;
        self.bridges.push(FakeBridge::new(name, self.next_index));
    }
}

/// A simulated host answering `brctl` and `ip` invocations.
///
/// Programs are recognised by file name, so any configured tool path works.
#[derive(Debug, Default)]
pub struct FakeBridgeHost {
    state: Mutex<HostState>,
    calls: Mutex<Vec<Invocation>>,
    failures: Mutex<HashMap<String, i32>>,
}

impl FakeBridgeHost {
    /// Create a host with no bridges
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a bridge (link down, STP off)
    pub fn with_bridge(self, name: &str) -> Self {
        self.lock_state().add(name);
        self
    }

    /// Attach an interface to a pre-created bridge
    pub fn with_interface(self, bridge: &str, iface: &str) -> Self {
        if let Some(b) = self.lock_state().find_mut(bridge) {
            b.interfaces.push(iface.to_string());
        }
        self
    }

    /// Make every command line starting with `prefix` exit with `exit_code`.
    ///
    /// The prefix is matched against `<tool> <args...>` where `<tool>` is the
    /// program's file name, e.g. `"ip link set dev br0 up"`.
    pub fn fail_command(&self, prefix: &str, exit_code: i32) {
        self.failures
            .lock()
            .expect("failures lock poisoned")
            .insert(prefix.to_string(), exit_code);
    }

    /// Snapshot of a bridge
    pub fn bridge(&self, name: &str) -> Option<FakeBridge> {
        self.lock_state().find(name).cloned()
    }

    /// Names of all bridges, in creation order
    pub fn bridge_names(&self) -> Vec<String> {
        self.lock_state()
            .bridges
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    /// All invocations so far
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// All invocations so far as `<tool> <args...>` lines
    pub fn tool_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| tool_line(&call.program, &call.args))
            .collect()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().expect("state lock poisoned")
    }

    fn injected_failure(&self, line: &str) -> Option<i32> {
        self.failures
            .lock()
            .expect("failures lock poisoned")
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, code)| *code)
    }

    fn brctl(&self, args: &[&str]) -> ExecResult {
        let mut state = self.lock_state();
        match args {
            ["show"] => {
                let mut out = format!("{}\n", SHOW_HEADER);
                for bridge in &state.bridges {
                    bridge.render(&mut out);
                }
                ExecResult::ok(out.trim_end())
            }
            ["show", name] => match state.find(name) {
                Some(bridge) => {
                    let mut out = format!("{}\n", SHOW_HEADER);
                    bridge.render(&mut out);
                    ExecResult::ok(out.trim_end())
                }
                None => ExecResult::failed(1, format!("bridge {} does not exist!", name)),
            },
            ["addbr", name] => {
                if state.find(name).is_some() {
                    return ExecResult::failed(
                        1,
                        format!(
                            "device {} already exists; can't create bridge with the same name",
                            name
                        ),
                    );
                }
                state.add(name);
                ExecResult::ok("")
            }
            ["delbr", name] => match state.find(name).map(|b| b.up) {
                None => ExecResult::failed(
                    1,
                    format!("bridge {} doesn't exist; can't delete it", name),
                ),
                Some(true) => ExecResult::failed(
                    1,
                    format!("bridge {} is still up; can't delete it", name),
                ),
                Some(false) => {
                    state.bridges.retain(|b| b.name != *name);
                    ExecResult::ok("")
                }
            },
            ["addif", name, iface] => match state.find_mut(name) {
                None => no_such_bridge(name),
                Some(bridge) if bridge.interfaces.iter().any(|i| i == iface) => {
                    ExecResult::failed(
                        1,
                        format!("device {} is already a member of a bridge", iface),
                    )
                }
                Some(bridge) => {
                    bridge.interfaces.push(iface.to_string());
                    ExecResult::ok("")
                }
            },
            ["delif", name, iface] => match state.find_mut(name) {
                None => no_such_bridge(name),
                Some(bridge) => {
                    let before = bridge.interfaces.len();
                    bridge.interfaces.retain(|i| i != iface);
                    if bridge.interfaces.len() == before {
                        ExecResult::failed(
                            1,
                            format!("device {} is not a slave of {}", iface, name),
                        )
                    } else {
                        ExecResult::ok("")
                    }
                }
            },
            ["stp", name, flag] => match (state.find_mut(name), *flag) {
                (None, _) => no_such_bridge(name),
                (Some(bridge), "on") => {
                    bridge.stp = true;
                    ExecResult::ok("")
                }
                (Some(bridge), "off") => {
                    bridge.stp = false;
                    ExecResult::ok("")
                }
                _ => ExecResult::failed(1, "expect on/off for argument"),
            },
            [cmd @ ("setageing" | "setbridgeprio" | "setfd" | "sethello" | "setmaxage"), name, value] => {
                match state.find_mut(name) {
                    None => no_such_bridge(name),
                    Some(bridge) => {
                        bridge.settings.insert(cmd.to_string(), value.to_string());
                        ExecResult::ok("")
                    }
                }
            }
            [cmd @ ("hairpin" | "setpathcost" | "setportprio"), name, port, value] => {
                match state.find_mut(name) {
                    None => no_such_bridge(name),
                    Some(bridge) if !bridge.interfaces.iter().any(|i| i == port) => {
                        ExecResult::failed(1, format!("interface {} does not exist!", port))
                    }
                    Some(bridge) => {
                        bridge
                            .settings
                            .insert(format!("{}:{}", cmd, port), value.to_string());
                        ExecResult::ok("")
                    }
                }
            }
            _ => ExecResult::failed(1, "Usage: brctl [commands]"),
        }
    }

    fn ip(&self, args: &[&str]) -> ExecResult {
        let mut state = self.lock_state();
        match args {
            ["link", "set", "dev", name, updown @ ("up" | "down")] => match state.find_mut(name) {
                Some(bridge) => {
                    bridge.up = *updown == "up";
                    ExecResult::ok("")
                }
                None => ExecResult::failed(1, format!("Cannot find device \"{}\"", name)),
            },
            _ => ExecResult::failed(255, "Command line is not complete."),
        }
    }
}

fn no_such_bridge(name: &str) -> ExecResult {
    ExecResult::failed(1, format!("bridge {} does not exist!", name))
}

fn tool_line(program: &Path, args: &[String]) -> String {
    let tool = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::iter::once(tool)
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl CommandRunner for FakeBridgeHost {
    async fn run(&self, program: &Path, args: &[String]) -> ShellResult<ExecResult> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(Invocation {
                program: program.to_path_buf(),
                args: args.to_vec(),
            });

        let line = tool_line(program, args);
        trace!(command = %line, "Simulated host invocation");
        if let Some(code) = self.injected_failure(&line) {
            return Ok(ExecResult::failed(code, "injected failure"));
        }

        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = match program.file_name().and_then(|n| n.to_str()) {
            Some("brctl") => self.brctl(&argv),
            Some("ip") => self.ip(&argv),
            _ => ExecResult::failed(127, "command not found"),
        };
        Ok(result)
    }
}
