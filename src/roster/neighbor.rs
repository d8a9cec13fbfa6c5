// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Kernel neighbor (ARP) table.
//!
//! ```text
//! IP address       HW type     Flags       HW address            Mask     Device
//! 192.168.4.2      0x1         0x2         aa:bb:cc:dd:ee:ff     *        wlan0
//! ```

use crate::error::{BeaconError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_ARP_PATH: &str = "/proc/net/arp";

/// Reads the neighbor table from procfs.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    path: PathBuf,
}

impl NeighborTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// MAC to IP mapping for entries bound to `iface`.
    pub fn resolve(&self, iface: &str) -> Result<HashMap<String, String>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            BeaconError::NeighborTableUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(parse_arp_table(&content, iface))
    }
}

impl Default for NeighborTable {
    fn default() -> Self {
        Self::new(DEFAULT_ARP_PATH)
    }
}

/// Parses `/proc/net/arp` content, keeping rows whose device is `iface`.
pub fn parse_arp_table(content: &str, iface: &str) -> HashMap<String, String> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 || fields[5] != iface {
                return None;
            }
            Some((fields[3].to_ascii_lowercase(), fields[0].to_string()))
        })
        .collect()
}
