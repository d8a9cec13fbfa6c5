// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Error types for the AP beacon

use std::io;
use thiserror::Error;

/// Result type alias for beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Main error type for the AP beacon
///
/// Each telemetry source fails with its own variant so the loop can decide
/// per source whether the failure skips the tick or only nulls a field.
#[derive(Error, Debug)]
pub enum BeaconError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Interface byte counters missing or unreadable
    #[error("Interface unavailable: {iface}: {reason}")]
    InterfaceUnavailable { iface: String, reason: String },

    /// Driver station dump failed
    #[error("Association query failed: {0}")]
    AssociationQueryFailed(String),

    /// Kernel neighbor table unreadable
    #[error("Neighbor table unavailable: {0}")]
    NeighborTableUnavailable(String),

    /// Thermal zone unreadable
    #[error("Thermal reading unavailable: {0}")]
    ThermalUnavailable(String),

    /// Memory information unreadable
    #[error("Memory info unavailable: {0}")]
    MemoryInfoUnavailable(String),

    /// Uplink signal strength could not be determined
    #[error("Signal strength unavailable: {0}")]
    SignalUnavailable(String),

    /// External command exited unsuccessfully or could not be spawned
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// External command exceeded its time budget
    #[error("Command timed out after {timeout_ms} ms: {command}")]
    CommandTimedOut { command: String, timeout_ms: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Datagram transport error
    #[error("Transport error: {0}")]
    Transport(String),
}

impl BeaconError {
    pub(crate) fn interface(iface: &str, reason: impl std::fmt::Display) -> Self {
        BeaconError::InterfaceUnavailable {
            iface: iface.to_string(),
            reason: reason.to_string(),
        }
    }
}
