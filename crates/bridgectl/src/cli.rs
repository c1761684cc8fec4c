//! Command line definition and dispatch for the `bridgectl` binary.

use std::path::PathBuf;

use anyhow::Context;
use bridgectl::{Bridge, BridgeController, BridgeDetails};
use bridgectl_common::{tools, BridgeTools, SystemRunner, ToolPaths};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

/// Manage Linux bridges through brctl and ip.
#[derive(Debug, Parser)]
#[command(name = "bridgectl", version, about)]
pub struct Cli {
    /// Path to the `ip` executable (default: looked up with `which`)
    #[arg(long, global = true, value_name = "PATH")]
    pub ip: Option<PathBuf>,

    /// Path to the `brctl` executable (default: looked up with `which`)
    #[arg(long, global = true, value_name = "PATH")]
    pub brctl: Option<PathBuf>,

    /// Log every command executed
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        self == Switch::On
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a bridge and set it up
    Addbr { bridge: String },
    /// Set a bridge down and delete it
    Delbr { bridge: String },
    /// Show one bridge, or all bridges
    Show {
        bridge: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add an interface to a bridge
    Addif { bridge: String, iface: String },
    /// Remove an interface from a bridge
    Delif { bridge: String, iface: String },
    /// Turn hairpin mode on or off for a port
    Hairpin {
        bridge: String,
        port: String,
        state: Switch,
    },
    /// Turn STP on or off
    Stp { bridge: String, state: Switch },
    /// Set the ageing time, in seconds
    Setageing {
        bridge: String,
        #[arg(value_parser = parse_seconds)]
        seconds: f64,
    },
    /// Set the bridge priority
    Setbridgeprio { bridge: String, prio: u16 },
    /// Set the forward delay, in seconds
    Setfd {
        bridge: String,
        #[arg(value_parser = parse_seconds)]
        seconds: f64,
    },
    /// Set the hello time, in seconds
    Sethello {
        bridge: String,
        #[arg(value_parser = parse_seconds)]
        seconds: f64,
    },
    /// Set the maximum message age, in seconds
    Setmaxage {
        bridge: String,
        #[arg(value_parser = parse_seconds)]
        seconds: f64,
    },
    /// Set the path cost of a port
    Setpathcost {
        bridge: String,
        port: String,
        cost: u32,
    },
    /// Set the priority of a port
    Setportprio {
        bridge: String,
        port: String,
        prio: u16,
    },
    /// Set the bridge link up
    Up { bridge: String },
    /// Set the bridge link down
    Down { bridge: String },
}

/// Accepts a finite, non-negative number of seconds.
fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !value.is_finite() || value.is_sign_negative() {
        return Err(format!("expected a non-negative number of seconds, got {}", s));
    }
    Ok(value)
}

/// One bridge as printed by `show`.
#[derive(Debug, Serialize)]
struct BridgeSummary {
    name: String,
    id: Option<String>,
    stp_enabled: Option<bool>,
    interfaces: Vec<String>,
}

impl BridgeSummary {
    fn new(name: &str, details: &BridgeDetails) -> Self {
        Self {
            name: name.to_string(),
            id: details.id().map(str::to_string),
            stp_enabled: details.stp_enabled(),
            interfaces: details.interfaces().to_vec(),
        }
    }

    fn print_row(&self) {
        let stp = match self.stp_enabled {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        println!(
            "{}\t{}\t{}\t{}",
            self.name,
            self.id.as_deref().unwrap_or("-"),
            stp,
            self.interfaces.join(",")
        );
    }
}

/// Resolves tool paths: command line flags first, then `which`.
async fn tool_paths(cli: &Cli) -> anyhow::Result<ToolPaths> {
    let runner = SystemRunner;
    let ip = match &cli.ip {
        Some(path) => path.clone(),
        None => tools::locate(&runner, "ip")
            .await
            .context("pass --ip to set the ip location")?,
    };
    let brctl = match &cli.brctl {
        Some(path) => path.clone(),
        None => tools::locate(&runner, "brctl")
            .await
            .context("pass --brctl to set the brctl location")?,
    };
    Ok(ToolPaths::new(ip, brctl))
}

async fn show(controller: &BridgeController, bridge: Option<String>, json: bool) -> anyhow::Result<()> {
    let bridges: Vec<Bridge> = match bridge {
        Some(name) => vec![controller.bridge(name)],
        None => controller.showall().await?,
    };

    let mut summaries = Vec::with_capacity(bridges.len());
    for bridge in &bridges {
        let details = bridge.show().await?;
        summaries.push(BridgeSummary::new(bridge.name(), &details));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("bridge name\tbridge id\tSTP enabled\tinterfaces");
        for summary in &summaries {
            summary.print_row();
        }
    }
    Ok(())
}

/// Executes the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = tool_paths(&cli).await?;
    info!(ip = %paths.ip().display(), brctl = %paths.brctl().display(), "Using tools");
    let controller = BridgeController::new(BridgeTools::system(paths));

    match cli.command {
        Command::Addbr { bridge } => {
            controller.addbr(&bridge).await?;
        }
        Command::Delbr { bridge } => {
            if !controller.delbr(&bridge).await? {
                warn!(bridge = %bridge, "Bridge does not exist");
                eprintln!("bridge {} does not exist", bridge);
            }
        }
        Command::Show { bridge, json } => show(&controller, bridge, json).await?,
        Command::Addif { bridge, iface } => controller.bridge(bridge).addif(&iface).await?,
        Command::Delif { bridge, iface } => controller.bridge(bridge).delif(&iface).await?,
        Command::Hairpin {
            bridge,
            port,
            state,
        } => controller.bridge(bridge).hairpin(&port, state.is_on()).await?,
        Command::Stp { bridge, state } => controller.bridge(bridge).stp(state.is_on()).await?,
        Command::Setageing { bridge, seconds } => {
            controller.bridge(bridge).setageing(seconds).await?
        }
        Command::Setbridgeprio { bridge, prio } => {
            controller.bridge(bridge).setbridgeprio(prio).await?
        }
        Command::Setfd { bridge, seconds } => controller.bridge(bridge).setfd(seconds).await?,
        Command::Sethello { bridge, seconds } => {
            controller.bridge(bridge).sethello(seconds).await?
        }
        Command::Setmaxage { bridge, seconds } => {
            controller.bridge(bridge).setmaxage(seconds).await?
        }
        Command::Setpathcost { bridge, port, cost } => {
            controller.bridge(bridge).setpathcost(&port, cost).await?
        }
        Command::Setportprio { bridge, port, prio } => {
            controller.bridge(bridge).setportprio(&port, prio).await?
        }
        Command::Up { bridge } => controller.bridge(bridge).link_up().await?,
        Command::Down { bridge } => controller.bridge(bridge).link_down().await?,
    }
    Ok(())
}
