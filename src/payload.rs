// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Wire payload.
//!
//! One JSON object per datagram:
//!
//! ```json
//! {"t":1716123456,"rx":12345,"tx":6789,
//!  "clients":["192.168.4.2"],"macs":["aa:bb:cc:dd:ee:ff"],
//!  "temp":43.2,"uplink_rssi":-52.0,"mem_avail_MB":2920}
//! ```
//!
//! Failed readings are sent as `null`, never omitted, so the object always
//! has the same keys.

use crate::error::Result;
use crate::rate::RateSample;
use crate::roster::ClientEntry;
use serde::{Deserialize, Serialize};

/// Per-field outcomes gathered during one tick.
///
/// Every slot is filled unconditionally before assembly, so one failing
/// source never prevents the others from being read.
#[derive(Debug)]
pub struct TickReadings {
    pub roster: Result<Vec<ClientEntry>>,
    pub temperature: Result<f64>,
    pub uplink_rssi: Result<f64>,
    pub mem_available_mb: Result<u64>,
}

/// Telemetry record sent once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    /// Unix seconds.
    pub t: i64,
    /// Uplink receive rate, bits/s. Negative after a counter reset.
    pub rx: i64,
    /// Uplink transmit rate, bits/s. Negative after a counter reset.
    pub tx: i64,
    /// Client IPs, index aligned with `macs`.
    clients: Vec<String>,
    macs: Vec<String>,
    pub temp: Option<f64>,
    pub uplink_rssi: Option<f64>,
    #[serde(rename = "mem_avail_MB")]
    pub mem_avail_mb: Option<u64>,
}

impl TelemetryPayload {
    /// Builds the record for a tick taken at `now` (unix seconds).
    pub fn assemble(
        now: f64,
        rate: &RateSample,
        roster: &[ClientEntry],
        temp: Option<f64>,
        uplink_rssi: Option<f64>,
        mem_avail_mb: Option<u64>,
    ) -> Self {
        let (clients, macs) = roster
            .iter()
            .map(|entry| (entry.ip.clone(), entry.mac.clone()))
            .unzip();

        Self {
            t: now.trunc() as i64,
            rx: rate.rx_bps,
            tx: rate.tx_bps,
            clients,
            macs,
            temp,
            uplink_rssi,
            mem_avail_mb,
        }
    }

    /// Collapses field outcomes into nulls and empty sequences.
    pub fn from_readings(now: f64, rate: &RateSample, readings: TickReadings) -> Self {
        let roster = readings.roster.unwrap_or_else(|e| {
            log::warn!("Client roster unavailable: {}", e);
            Vec::new()
        });

        Self::assemble(
            now,
            rate,
            &roster,
            field("temp", readings.temperature),
            field("uplink_rssi", readings.uplink_rssi),
            field("mem_avail_MB", readings.mem_available_mb),
        )
    }

    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn macs(&self) -> &[String] {
        &self.macs
    }

    /// Compact JSON bytes for the datagram body.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn field<T>(name: &str, outcome: Result<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("{} unavailable: {}", name, e);
            None
        }
    }
}
