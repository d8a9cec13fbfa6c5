// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Available memory via `/proc/meminfo`.

use crate::error::{BeaconError, Result};
use std::path::PathBuf;

pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Reads `MemAvailable` from a meminfo-formatted file.
#[derive(Debug, Clone)]
pub struct MemoryReader {
    path: PathBuf,
}

impl MemoryReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Available memory in whole megabytes.
    pub fn available_mb(&self) -> Result<u64> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            BeaconError::MemoryInfoUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        parse_available_kb(&content).map(|kb| kb / 1024)
    }
}

impl Default for MemoryReader {
    fn default() -> Self {
        Self::new(DEFAULT_MEMINFO_PATH)
    }
}

/// Extracts the `MemAvailable:` value (kB).
pub fn parse_available_kb(content: &str) -> Result<u64> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("MemAvailable:") {
            continue;
        }
        let value = parts.next().unwrap_or_default();
        return value.parse().map_err(|_| {
            BeaconError::MemoryInfoUnavailable(format!(
                "expected integer kB value, got '{}'",
                value
            ))
        });
    }
    Err(BeaconError::MemoryInfoUnavailable(
        "MemAvailable not found".to_string(),
    ))
}
