// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Interface byte counters.
//!
//! ## Platform Support
//!
//! - **Linux**: `/sys/class/net/<iface>/statistics/{rx,tx}_bytes`

use crate::error::{BeaconError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default sysfs directory holding one entry per network interface.
pub const SYSFS_NET_ROOT: &str = "/sys/class/net";

/// Raw rx/tx counters as read from the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Counters stamped with the wall-clock time they were taken at.
///
/// Counters never decrease while the interface stays up. A decrease means the
/// interface was reset and shows up as a negative rate downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterSample {
    /// Unix time in seconds (fractional).
    pub taken_at: f64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

impl CounterSample {
    pub fn new(taken_at: f64, counters: ByteCounters) -> Self {
        Self {
            taken_at,
            rx_bytes: counters.rx_bytes,
            tx_bytes: counters.tx_bytes,
        }
    }
}

/// Reads per-interface statistics from sysfs.
#[derive(Debug, Clone)]
pub struct CounterSampler {
    root: PathBuf,
}

impl CounterSampler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Current rx/tx byte counters for `iface`.
    pub fn read(&self, iface: &str) -> Result<ByteCounters> {
        let stats = self.root.join(iface).join("statistics");
        if !stats.is_dir() {
            return Err(BeaconError::interface(
                iface,
                format!("{} does not exist", stats.display()),
            ));
        }

        Ok(ByteCounters {
            rx_bytes: Self::read_counter(iface, &stats.join("rx_bytes"))?,
            tx_bytes: Self::read_counter(iface, &stats.join("tx_bytes"))?,
        })
    }

    fn read_counter(iface: &str, path: &Path) -> Result<u64> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BeaconError::interface(iface, format!("{}: {}", path.display(), e)))?;
        raw.trim().parse().map_err(|_| {
            BeaconError::interface(
                iface,
                format!("{}: expected integer, got '{}'", path.display(), raw.trim()),
            )
        })
    }
}

impl Default for CounterSampler {
    fn default() -> Self {
        Self::new(SYSFS_NET_ROOT)
    }
}
