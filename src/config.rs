// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Beacon configuration
//!
//! Static TOML configuration. Every key is optional and falls back to the
//! defaults of a Raspberry Pi access point (`wlan0` serving clients, `wlan1`
//! uplinked to the router, broadcasting on UDP/4000).

use crate::error::{BeaconError, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Longest accepted sampling interval (one day).
pub const MAX_INTERVAL_SECS: f64 = 86_400.0;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self { LogLevel::Info }
}

impl LogLevel {
    /// Filter string understood by `env_logger`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Beacon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Interface clients associate on.
    pub ap_interface: String,
    /// Interface carrying traffic to the upstream router.
    pub uplink_interface: String,
    /// Unicast host or subnet broadcast address.
    pub destination: Ipv4Addr,
    pub port: u16,
    pub interval_secs: f64,
    /// Force SO_BROADCAST even when the destination does not look like a
    /// broadcast address.
    pub broadcast: bool,
    pub command_timeout_ms: u64,
    pub thermal_path: String,
    pub meminfo_path: String,
    pub arp_path: String,
    pub sysfs_net_root: String,
    pub log_level: LogLevel,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            ap_interface: "wlan0".into(),
            uplink_interface: "wlan1".into(),
            destination: Ipv4Addr::new(192, 168, 4, 255),
            port: 4000,
            interval_secs: 1.0,
            broadcast: false,
            command_timeout_ms: 2000,
            thermal_path: crate::telemetry::thermal::DEFAULT_THERMAL_PATH.into(),
            meminfo_path: crate::telemetry::memory::DEFAULT_MEMINFO_PATH.into(),
            arp_path: crate::roster::neighbor::DEFAULT_ARP_PATH.into(),
            sysfs_net_root: crate::telemetry::counters::SYSFS_NET_ROOT.into(),
            log_level: LogLevel::Info,
        }
    }
}

impl BeaconConfig {
    /// Load from TOML file
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BeaconError::Configuration(format!("Cannot read {}: {}", path, e)))?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BeaconError::Configuration(format!("TOML parse error: {}", e)))
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ap_interface.trim().is_empty() {
            return Err(BeaconError::Configuration("ap_interface is empty".into()));
        }
        if self.uplink_interface.trim().is_empty() {
            return Err(BeaconError::Configuration("uplink_interface is empty".into()));
        }
        if self.port == 0 {
            return Err(BeaconError::Configuration("port must be non-zero".into()));
        }
        if !self.interval_secs.is_finite()
            || self.interval_secs <= 0.0
            || self.interval_secs > MAX_INTERVAL_SECS
        {
            return Err(BeaconError::Configuration(format!(
                "interval_secs must be in (0, {}], got {}",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }
        if self.command_timeout_ms == 0 {
            return Err(BeaconError::Configuration(
                "command_timeout_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn target(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.destination, self.port)
    }

    /// Whether SO_BROADCAST has to be set for the configured destination.
    pub fn wants_broadcast(&self) -> bool {
        self.broadcast || self.destination.is_broadcast() || self.destination.octets()[3] == 255
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# AP beacon configuration
ap_interface = "wlan0"
uplink_interface = "wlan1"

# Subnet broadcast or a single consumer, e.g. "192.168.4.110"
destination = "192.168.4.255"
port = 4000
interval_secs = 1.0
# broadcast = true

# Budget for each `iw` query
command_timeout_ms = 2000

# thermal_path = "/sys/class/thermal/thermal_zone0/temp"
# meminfo_path = "/proc/meminfo"
# arp_path = "/proc/net/arp"
# sysfs_net_root = "/sys/class/net"

log_level = "info"
"#.into()
    }
}

/// Interfaces named in the config that the kernel does not know about.
#[cfg(unix)]
pub fn missing_interfaces(config: &BeaconConfig) -> Vec<String> {
    [&config.ap_interface, &config.uplink_interface]
        .into_iter()
        .filter(|name| nix::net::if_::if_nametoindex(name.as_str()).is_err())
        .cloned()
        .collect()
}
