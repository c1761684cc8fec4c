//! Argument vector builders for `brctl` and `ip`.
//!
//! These must match what the real tools expect, argument for argument.

/// Number of whitespace-separated header tokens printed by `brctl show`:
/// `bridge name bridge id STP enabled interfaces`.
pub const SHOW_HEADER_TOKENS: usize = 7;

fn argv<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Renders a boolean as the `on`/`off` literal brctl expects.
pub fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Renders a timer value in seconds. Whole numbers print without a fraction.
///
/// The value is passed through as is; brctl rejects what it cannot parse, and
/// the CLI only accepts finite, non-negative values.
pub fn seconds(value: f64) -> String {
    value.to_string()
}

/// Build `brctl addbr` args
pub fn build_addbr_args(bridge: &str) -> Vec<String> {
    argv(["addbr", bridge])
}

/// Build `brctl delbr` args
pub fn build_delbr_args(bridge: &str) -> Vec<String> {
    argv(["delbr", bridge])
}

/// Build `brctl addif` args
pub fn build_addif_args(bridge: &str, iface: &str) -> Vec<String> {
    argv(["addif", bridge, iface])
}

/// Build `brctl delif` args
pub fn build_delif_args(bridge: &str, iface: &str) -> Vec<String> {
    argv(["delif", bridge, iface])
}

/// Build `brctl hairpin` args
pub fn build_hairpin_args(bridge: &str, port: &str, on: bool) -> Vec<String> {
    argv(["hairpin", bridge, port, on_off(on)])
}

/// Build `brctl stp` args
pub fn build_stp_args(bridge: &str, on: bool) -> Vec<String> {
    argv(["stp", bridge, on_off(on)])
}

/// Build `brctl setageing` args
pub fn build_setageing_args(bridge: &str, time: f64) -> Vec<String> {
    argv(["setageing", bridge, seconds(time).as_str()])
}

/// Build `brctl setbridgeprio` args
pub fn build_setbridgeprio_args(bridge: &str, prio: u16) -> Vec<String> {
    argv(["setbridgeprio", bridge, prio.to_string().as_str()])
}

/// Build `brctl setfd` args (forward delay)
pub fn build_setfd_args(bridge: &str, time: f64) -> Vec<String> {
    argv(["setfd", bridge, seconds(time).as_str()])
}

/// Build `brctl sethello` args
pub fn build_sethello_args(bridge: &str, time: f64) -> Vec<String> {
    argv(["sethello", bridge, seconds(time).as_str()])
}

/// Build `brctl setmaxage` args
pub fn build_setmaxage_args(bridge: &str, time: f64) -> Vec<String> {
    argv(["setmaxage", bridge, seconds(time).as_str()])
}

/// Build `brctl setpathcost` args
pub fn build_setpathcost_args(bridge: &str, port: &str, cost: u32) -> Vec<String> {
    argv(["setpathcost", bridge, port, cost.to_string().as_str()])
}

/// Build `brctl setportprio` args
pub fn build_setportprio_args(bridge: &str, port: &str, prio: u16) -> Vec<String> {
    argv(["setportprio", bridge, port, prio.to_string().as_str()])
}

/// `brctl show`, optionally restricted to one bridge.
pub fn build_show_args(bridge: Option<&str>) -> Vec<String> {
    match bridge {
        Some(bridge) => argv(["show", bridge]),
        None => argv(["show"]),
    }
}

/// `ip link set dev <bridge> up|down`
pub fn build_link_args(bridge: &str, up: bool) -> Vec<String> {
    argv(["link", "set", "dev", bridge, if up { "up" } else { "down" }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_on_off_literals() {
        assert_eq!(on_off(true), "on");
        assert_eq!(on_off(false), "off");
    }

    #[test]
    fn test_seconds_rendering() {
        assert_eq!(seconds(300.0), "300");
        assert_eq!(seconds(2.5), "2.5");
        assert_eq!(seconds(0.0), "0");
    }

    #[test]
    fn test_build_hairpin_args() {
        assert_eq!(
            build_hairpin_args("br0", "veth0", true),
            vec!["hairpin", "br0", "veth0", "on"]
        );
        assert_eq!(
            build_hairpin_args("br0", "veth0", false),
            vec!["hairpin", "br0", "veth0", "off"]
        );
    }

    #[test]
    fn test_build_timer_args() {
        assert_eq!(build_setageing_args("br0", 300.0), vec!["setageing", "br0", "300"]);
        assert_eq!(build_setfd_args("br0", 15.0), vec!["setfd", "br0", "15"]);
        assert_eq!(build_sethello_args("br0", 2.0), vec!["sethello", "br0", "2"]);
        assert_eq!(build_setmaxage_args("br0", 20.0), vec!["setmaxage", "br0", "20"]);
    }

    #[test]
    fn test_build_port_value_args() {
        assert_eq!(
            build_setpathcost_args("br0", "eth0", 100),
            vec!["setpathcost", "br0", "eth0", "100"]
        );
        assert_eq!(
            build_setportprio_args("br0", "eth0", 32),
            vec!["setportprio", "br0", "eth0", "32"]
        );
    }

    #[test]
    fn test_build_show_args() {
        assert_eq!(build_show_args(None), vec!["show"]);
        assert_eq!(build_show_args(Some("br0")), vec!["show", "br0"]);
    }

    #[test]
    fn test_build_link_args() {
        assert_eq!(
            build_link_args("br0", true),
            vec!["link", "set", "dev", "br0", "up"]
        );
        assert_eq!(
            build_link_args("br0", false),
            vec!["link", "set", "dev", "br0", "down"]
        );
    }
}
