// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Telemetry sources sampled once per tick.
//!
//! Each source fails on its own; [`TelemetrySource`] is the seam the beacon
//! loop reads through, with [`SystemTelemetry`] wiring the Linux readers.

pub mod counters;
pub mod memory;
pub mod signal;
pub mod thermal;

pub use counters::{ByteCounters, CounterSample, CounterSampler};
pub use memory::MemoryReader;
pub use signal::SignalReader;
pub use thermal::ThermalReader;

use crate::config::BeaconConfig;
use crate::error::Result;
use crate::roster::{IwStationSource, NeighborTable, StationSource};
use std::collections::HashMap;

/// Everything the beacon reads from the host.
pub trait TelemetrySource {
    /// Uplink rx/tx byte counters.
    fn counters(&self, iface: &str) -> Result<ByteCounters>;
    /// Associated station MACs on the AP interface.
    fn stations(&self, iface: &str) -> Result<Vec<String>>;
    /// MAC to IP mapping from the neighbor table for `iface`.
    fn neighbors(&self, iface: &str) -> Result<HashMap<String, String>>;
    /// CPU temperature in Celsius.
    fn temperature(&self) -> Result<f64>;
    /// Uplink signal strength in dBm.
    fn uplink_rssi(&self, iface: &str) -> Result<f64>;
    /// Available memory in MB.
    fn mem_available_mb(&self) -> Result<u64>;
}

/// Production sources backed by sysfs, procfs and `iw`.
pub struct SystemTelemetry {
    counters: CounterSampler,
    stations: Box<dyn StationSource>,
    neighbors: NeighborTable,
    thermal: ThermalReader,
    signal: SignalReader,
    memory: MemoryReader,
}

impl SystemTelemetry {
    pub fn from_config(config: &BeaconConfig) -> Self {
        let timeout = config.command_timeout();
        Self {
            counters: CounterSampler::new(&config.sysfs_net_root),
            stations: Box::new(IwStationSource::new(timeout)),
            neighbors: NeighborTable::new(&config.arp_path),
            thermal: ThermalReader::new(&config.thermal_path),
            signal: SignalReader::new(timeout),
            memory: MemoryReader::new(&config.meminfo_path),
        }
    }

    /// Swaps the association source, e.g. for a netlink implementation.
    pub fn with_station_source(mut self, source: Box<dyn StationSource>) -> Self {
        self.stations = source;
        self
    }
}

impl TelemetrySource for SystemTelemetry {
    fn counters(&self, iface: &str) -> Result<ByteCounters> {
        self.counters.read(iface)
    }

    fn stations(&self, iface: &str) -> Result<Vec<String>> {
        self.stations.associated_stations(iface)
    }

    fn neighbors(&self, iface: &str) -> Result<HashMap<String, String>> {
        self.neighbors.resolve(iface)
    }

    fn temperature(&self) -> Result<f64> {
        self.thermal.read_celsius()
    }

    fn uplink_rssi(&self, iface: &str) -> Result<f64> {
        self.signal.read_dbm(iface)
    }

    fn mem_available_mb(&self) -> Result<u64> {
        self.memory.available_mb()
    }
}
