// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! AP Beacon: periodic network telemetry for a Linux wireless access point
//!
//! Once per interval the beacon samples uplink throughput, CPU temperature,
//! available memory, uplink signal strength and the associated Wi-Fi clients,
//! and sends the result as one JSON datagram to consumers on the LAN.
//!
//! # Examples
//!
//! ```no_run
//! use beaconlib::{Beacon, BeaconConfig, SystemTelemetry, UdpTransport};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BeaconConfig::default();
//!     let transport = UdpTransport::open(config.target(), config.wants_broadcast())?;
//!     let telemetry = SystemTelemetry::from_config(&config);
//!     let mut beacon = Beacon::new(config, telemetry, transport);
//!
//!     let (_stop, shutdown) = std::sync::mpsc::channel();
//!     beacon.run(&shutdown)?;
//!     Ok(())
//! }
//! ```

pub mod beacon;
pub mod command;
pub mod config;
pub mod error;
pub mod payload;
pub mod rate;
pub mod roster;
pub mod telemetry;
pub mod transport;

pub use beacon::{unix_now, Beacon, BeaconState, TickOutcome};
pub use config::{BeaconConfig, LogLevel};
pub use error::{BeaconError, Result};
pub use payload::{TelemetryPayload, TickReadings};
pub use rate::RateSample;
pub use roster::ClientEntry;
pub use telemetry::{CounterSample, SystemTelemetry, TelemetrySource};
pub use transport::{PayloadSink, UdpTransport, WriterSink};
