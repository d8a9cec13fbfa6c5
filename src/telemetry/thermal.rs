// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! CPU temperature from a thermal zone.
//!
//! ## Platform Support
//!
//! - **Linux**: `/sys/class/thermal/thermal_zone*/temp` (millidegrees Celsius)

use crate::error::{BeaconError, Result};
use std::path::PathBuf;

/// Zone the SoC temperature is exposed on for Raspberry Pi class boards.
pub const DEFAULT_THERMAL_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Reads one thermal zone.
#[derive(Debug, Clone)]
pub struct ThermalReader {
    path: PathBuf,
}

impl ThermalReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Temperature in degrees Celsius.
    pub fn read_celsius(&self) -> Result<f64> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            BeaconError::ThermalUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        parse_millidegrees(&raw)
    }
}

impl Default for ThermalReader {
    fn default() -> Self {
        Self::new(DEFAULT_THERMAL_PATH)
    }
}

/// Converts a sysfs millidegree string into Celsius.
pub fn parse_millidegrees(raw: &str) -> Result<f64> {
    let temp_mc: i64 = raw.trim().parse().map_err(|_| {
        BeaconError::ThermalUnavailable(format!("expected millidegrees, got '{}'", raw.trim()))
    })?;
    Ok(temp_mc as f64 / 1000.0)
}
