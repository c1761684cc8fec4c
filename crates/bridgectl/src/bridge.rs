//! Per-bridge operations.

use std::fmt;

use bridgectl_common::{BridgeTools, ShellError};
use tracing::{debug, instrument, warn};

use crate::commands::{
    build_addbr_args, build_addif_args, build_delbr_args, build_delif_args, build_hairpin_args,
    build_link_args, build_setageing_args, build_setbridgeprio_args, build_setfd_args,
    build_sethello_args, build_setmaxage_args, build_setpathcost_args, build_setportprio_args,
    build_show_args, build_stp_args,
};
use crate::error::{BridgeError, BridgeOp, BridgeResult};
use crate::parse::BridgeDetails;

/// A Linux bridge, identified by name.
///
/// Nothing about the bridge is cached: every query runs `brctl` again. A
/// `Bridge` built with [`Bridge::new`] assumes the bridge already exists; use
/// [`BridgeController::addbr`](crate::BridgeController::addbr) to create one.
#[derive(Clone)]
pub struct Bridge {
    name: String,
    tools: BridgeTools,
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Bridge: {}>", self.name)
    }
}

impl Bridge {
    pub fn new(name: impl Into<String>, tools: BridgeTools) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds an interface to the bridge.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn addif(&self, iface: &str) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::AddInterface, Some(iface), build_addif_args(&self.name, iface))
            .await
            .map(drop)
    }

    /// Removes an interface from the bridge.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn delif(&self, iface: &str) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::DeleteInterface, Some(iface), build_delif_args(&self.name, iface))
            .await
            .map(drop)
    }

    /// Turns hairpin mode on or off for a port.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn hairpin(&self, port: &str, on: bool) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::SetHairpin, Some(port), build_hairpin_args(&self.name, port, on))
            .await
            .map(drop)
    }

    /// Turns the spanning tree protocol on or off.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn stp(&self, on: bool) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::SetStp, None, build_stp_args(&self.name, on))
            .await
            .map(drop)
    }

    /// Sets the MAC address ageing time, in seconds.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn setageing(&self, time: f64) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::SetAgeing, None, build_setageing_args(&self.name, time))
            .await
            .map(drop)
    }

    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn setbridgeprio(&self, prio: u16) -> BridgeResult<()> {
        self.run_brctl(
            BridgeOp::SetBridgePriority,
            None,
            build_setbridgeprio_args(&self.name, prio),
        )
        .await
        .map(drop)
    }

    /// Sets the forward delay, in seconds.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn setfd(&self, time: f64) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::SetForwardDelay, None, build_setfd_args(&self.name, time))
            .await
            .map(drop)
    }

    /// Sets the hello time, in seconds.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn sethello(&self, time: f64) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::SetHelloTime, None, build_sethello_args(&self.name, time))
            .await
            .map(drop)
    }

    /// Sets the maximum message age, in seconds.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn setmaxage(&self, time: f64) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::SetMaxAge, None, build_setmaxage_args(&self.name, time))
            .await
            .map(drop)
    }

    /// Sets the STP path cost of a port.
    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn setpathcost(&self, port: &str, cost: u32) -> BridgeResult<()> {
        self.run_brctl(
            BridgeOp::SetPathCost,
            Some(port),
            build_setpathcost_args(&self.name, port, cost),
        )
        .await
        .map(drop)
    }

    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn setportprio(&self, port: &str, prio: u16) -> BridgeResult<()> {
        self.run_brctl(
            BridgeOp::SetPortPriority,
            Some(port),
            build_setportprio_args(&self.name, port, prio),
        )
        .await
        .map(drop)
    }

    /// Runs `brctl show <bridge>` and returns the parsed token view.
    pub async fn show(&self) -> BridgeResult<BridgeDetails> {
        let stdout = self
            .run_brctl(BridgeOp::ShowDetails, None, build_show_args(Some(&self.name)))
            .await?;
        Ok(BridgeDetails::parse(&stdout))
    }

    /// Returns the bridge id, e.g. `8000.001122334455`.
    pub async fn getid(&self) -> BridgeResult<String> {
        let details = self.show().await?;
        details
            .id()
            .map(str::to_string)
            .ok_or_else(|| self.malformed("bridge id"))
    }

    /// Returns the interfaces attached to the bridge.
    pub async fn getifs(&self) -> BridgeResult<Vec<String>> {
        Ok(self.show().await?.interfaces().to_vec())
    }

    /// Returns whether STP is enabled, i.e. the STP column reads `yes`.
    pub async fn getstp(&self) -> BridgeResult<bool> {
        self.show()
            .await?
            .stp_enabled()
            .ok_or_else(|| self.malformed("STP flag"))
    }

    /// MAC table listing is not supported.
    pub async fn showmacs(&self) -> BridgeResult<Vec<String>> {
        Err(BridgeError::NotImplemented {
            operation: "showmacs",
        })
    }

    /// STP state listing is not supported.
    pub async fn showstp(&self) -> BridgeResult<String> {
        Err(BridgeError::NotImplemented {
            operation: "showstp",
        })
    }

    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn link_up(&self) -> BridgeResult<()> {
        self.run_ip(BridgeOp::SetLinkUp, build_link_args(&self.name, true))
            .await
    }

    #[instrument(skip(self), fields(bridge = %self.name))]
    pub async fn link_down(&self) -> BridgeResult<()> {
        self.run_ip(BridgeOp::SetLinkDown, build_link_args(&self.name, false))
            .await
    }

    /// Creates the kernel bridge with `brctl addbr`.
    pub(crate) async fn create(&self) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::CreateBridge, None, build_addbr_args(&self.name))
            .await
            .map(drop)
    }

    /// Removes the kernel bridge with `brctl delbr`.
    pub(crate) async fn remove(&self) -> BridgeResult<()> {
        self.run_brctl(BridgeOp::DeleteBridge, None, build_delbr_args(&self.name))
            .await
            .map(drop)
    }

    async fn run_brctl(
        &self,
        op: BridgeOp,
        port: Option<&str>,
        args: Vec<String>,
    ) -> BridgeResult<String> {
        debug!(bridge = %self.name, op = %op, "Running brctl");
        self.tools
            .brctl(&args)
            .await
            .map_err(|e| self.fail(op, port, e))
    }

    async fn run_ip(&self, op: BridgeOp, args: Vec<String>) -> BridgeResult<()> {
        debug!(bridge = %self.name, op = %op, "Running ip");
        self.tools
            .ip(&args)
            .await
            .map(drop)
            .map_err(|e| self.fail(op, None, e))
    }

    fn fail(&self, op: BridgeOp, port: Option<&str>, source: ShellError) -> BridgeError {
        let err = match port {
            Some(port) => BridgeError::on_port(op, self.name.as_str(), port, source),
            None => BridgeError::on_bridge(op, self.name.as_str(), source),
        };
        warn!(bridge = %self.name, op = %op, error = %err, "Bridge operation failed");
        err
    }

    fn malformed(&self, field: &'static str) -> BridgeError {
        let err = BridgeError::MalformedOutput {
            bridge: self.name.clone(),
            field,
        };
        warn!(bridge = %self.name, error = %err, "Unexpected brctl output");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgectl_common::ToolPaths;
    use bridgectl_test::ScriptedRunner;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const SHOW_BR0: &str = "bridge name\tbridge id\t\tSTP enabled\tinterfaces\n\
                            br0\t\t8000.001122334455\tyes\t\teth0\n\
                            \t\t\t\t\t\t\tveth1";

    fn bridge_with(runner: &Arc<ScriptedRunner>) -> Bridge {
        let tools = BridgeTools::new(ToolPaths::default(), runner.clone());
        Bridge::new("br0", tools)
    }

    #[tokio::test]
    async fn test_addif_invocation() {
        let runner = Arc::new(ScriptedRunner::new());
        bridge_with(&runner).addif("eth0").await.unwrap();
        assert_eq!(runner.command_lines(), vec!["/sbin/brctl addif br0 eth0"]);
    }

    #[tokio::test]
    async fn test_setter_invocations() {
        let runner = Arc::new(ScriptedRunner::new());
        let br = bridge_with(&runner);

        br.delif("eth0").await.unwrap();
        br.hairpin("veth1", true).await.unwrap();
        br.stp(false).await.unwrap();
        br.setageing(300.0).await.unwrap();
        br.setbridgeprio(4096).await.unwrap();
        br.setfd(15.0).await.unwrap();
        br.sethello(2.0).await.unwrap();
        br.setmaxage(20.0).await.unwrap();
        br.setpathcost("eth0", 100).await.unwrap();
        br.setportprio("eth0", 32).await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "/sbin/brctl delif br0 eth0",
                "/sbin/brctl hairpin br0 veth1 on",
                "/sbin/brctl stp br0 off",
                "/sbin/brctl setageing br0 300",
                "/sbin/brctl setbridgeprio br0 4096",
                "/sbin/brctl setfd br0 15",
                "/sbin/brctl sethello br0 2",
                "/sbin/brctl setmaxage br0 20",
                "/sbin/brctl setpathcost br0 eth0 100",
                "/sbin/brctl setportprio br0 eth0 32",
            ]
        );
    }

    #[tokio::test]
    async fn test_link_invocations_use_ip() {
        let runner = Arc::new(ScriptedRunner::new());
        let br = bridge_with(&runner);
        br.link_up().await.unwrap();
        br.link_down().await.unwrap();
        assert_eq!(
            runner.command_lines(),
            vec![
                "/sbin/ip link set dev br0 up",
                "/sbin/ip link set dev br0 down",
            ]
        );
    }

    #[tokio::test]
    async fn test_addif_failure_is_typed() {
        let runner = Arc::new(ScriptedRunner::new().with_failure(1));
        let err = bridge_with(&runner).addif("eth9").await.unwrap_err();

        assert_eq!(err.op(), Some(BridgeOp::AddInterface));
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.bridge(), Some("br0"));
        assert_eq!(err.port(), Some("eth9"));
        assert_eq!(
            err.to_string(),
            "Could not add interface eth9 to br0. Subprocess returned error code 1"
        );
    }

    #[tokio::test]
    async fn test_setpathcost_failure_carries_port() {
        let runner = Arc::new(ScriptedRunner::new().with_failure(3));
        let err = bridge_with(&runner).setpathcost("eth1", 5).await.unwrap_err();
        assert_eq!(err.op(), Some(BridgeOp::SetPathCost));
        assert_eq!(err.exit_code(), Some(3));
        assert_eq!(err.port(), Some("eth1"));
    }

    #[tokio::test]
    async fn test_setter_failures_map_to_their_operation() {
        let cases = [
            (BridgeOp::DeleteInterface, "Could not delete interface eth0 from br0."),
            (BridgeOp::SetHairpin, "Could not set hairpin on port eth0 in br0."),
            (BridgeOp::SetStp, "Could not set stp on br0."),
            (BridgeOp::SetAgeing, "Could not set ageing time on br0."),
            (BridgeOp::SetBridgePriority, "Could not set bridge priority on br0."),
            (BridgeOp::SetForwardDelay, "Could not set forward delay on br0."),
            (BridgeOp::SetHelloTime, "Could not set hello time on br0."),
            (BridgeOp::SetMaxAge, "Could not set max message age on br0."),
            (BridgeOp::SetPortPriority, "Could not set priority on port eth0 in br0."),
            (BridgeOp::SetLinkUp, "Could not set link up on br0."),
        ];

        for (code, (op, prefix)) in (10..).zip(cases) {
            let runner = Arc::new(ScriptedRunner::new().with_failure(code));
            let br = bridge_with(&runner);
            let result = match op {
                BridgeOp::DeleteInterface => br.delif("eth0").await,
                BridgeOp::SetHairpin => br.hairpin("eth0", true).await,
                BridgeOp::SetStp => br.stp(true).await,
                BridgeOp::SetAgeing => br.setageing(300.0).await,
                BridgeOp::SetBridgePriority => br.setbridgeprio(4096).await,
                BridgeOp::SetForwardDelay => br.setfd(15.0).await,
                BridgeOp::SetHelloTime => br.sethello(2.0).await,
                BridgeOp::SetMaxAge => br.setmaxage(20.0).await,
                BridgeOp::SetPortPriority => br.setportprio("eth0", 32).await,
                BridgeOp::SetLinkUp => br.link_up().await,
                other => panic!("no setter for {}", other),
            };

            let err = result.unwrap_err();
            assert_eq!(err.op(), Some(op));
            assert_eq!(err.exit_code(), Some(code));
            assert_eq!(err.bridge(), Some("br0"));
            assert_eq!(
                err.to_string(),
                format!("{} Subprocess returned error code {}", prefix, code)
            );
        }
    }

    #[tokio::test]
    async fn test_link_down_failure_is_typed() {
        let runner = Arc::new(ScriptedRunner::new().with_failure(2));
        let err = bridge_with(&runner).link_down().await.unwrap_err();
        assert_eq!(err.op(), Some(BridgeOp::SetLinkDown));
        assert_eq!(err.port(), None);
    }

    #[tokio::test]
    async fn test_queries_parse_show_output() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .with_output(SHOW_BR0)
                .with_output(SHOW_BR0)
                .with_output(SHOW_BR0),
        );
        let br = bridge_with(&runner);

        assert_eq!(br.getid().await.unwrap(), "8000.001122334455");
        assert!(br.getstp().await.unwrap());
        assert_eq!(br.getifs().await.unwrap(), vec!["eth0", "veth1"]);
        assert_eq!(runner.command_lines()[0], "/sbin/brctl show br0");
    }

    #[tokio::test]
    async fn test_show_failure_is_show_details() {
        let runner = Arc::new(ScriptedRunner::new().with_failure(1));
        let err = bridge_with(&runner).getifs().await.unwrap_err();
        assert_eq!(err.op(), Some(BridgeOp::ShowDetails));
    }

    #[tokio::test]
    async fn test_truncated_show_output_is_malformed() {
        let runner = Arc::new(ScriptedRunner::new().with_output("bridge name bridge id STP enabled interfaces"));
        match bridge_with(&runner).getid().await {
            Err(BridgeError::MalformedOutput { bridge, field }) => {
                assert_eq!(bridge, "br0");
                assert_eq!(field, "bridge id");
            }
            other => panic!("Expected MalformedOutput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_showmacs_and_showstp_not_implemented() {
        let runner = Arc::new(ScriptedRunner::new());
        let br = bridge_with(&runner);
        assert!(matches!(
            br.showmacs().await,
            Err(BridgeError::NotImplemented { operation: "showmacs" })
        ));
        assert!(matches!(
            br.showstp().await,
            Err(BridgeError::NotImplemented { operation: "showstp" })
        ));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_display_and_debug() {
        let runner = Arc::new(ScriptedRunner::new());
        let br = bridge_with(&runner);
        assert_eq!(br.to_string(), "br0");
        assert_eq!(format!("{:?}", br), "<Bridge: br0>");
    }
}
