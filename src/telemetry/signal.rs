// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Uplink signal strength from `iw dev <iface> link`.

use crate::command::run_with_timeout;
use crate::error::{BeaconError, Result};
use std::time::Duration;

/// Queries the uplink's link status through `iw`.
#[derive(Debug, Clone)]
pub struct SignalReader {
    timeout: Duration,
}

impl SignalReader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Signal strength in dBm.
    pub fn read_dbm(&self, iface: &str) -> Result<f64> {
        let out = run_with_timeout("iw", &["dev", iface, "link"], self.timeout)
            .map_err(|e| BeaconError::SignalUnavailable(e.to_string()))?;
        parse_link_signal(&out)
    }
}

/// Extracts the dBm value from the `signal:` line of an `iw link` report.
///
/// ```text
/// Connected to 11:22:33:44:55:66 (on wlan1)
///         SSID: upstream
///         freq: 5180
///         signal: -52 dBm
/// ```
pub fn parse_link_signal(output: &str) -> Result<f64> {
    if output.trim_start().starts_with("Not connected") {
        return Err(BeaconError::SignalUnavailable("not connected".to_string()));
    }

    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("signal:"))
        .filter_map(|rest| rest.split_whitespace().next())
        .find_map(|value| value.parse::<f64>().ok())
        .ok_or_else(|| BeaconError::SignalUnavailable("no signal line in link report".to_string()))
}
