// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Associated stations as reported by the wireless driver.

use crate::command::run_with_timeout;
use crate::error::{BeaconError, Result};
use std::time::Duration;

/// Lists the link-layer addresses currently associated on an interface.
pub trait StationSource {
    /// MACs in driver order, lowercase colon-hex.
    fn associated_stations(&self, iface: &str) -> Result<Vec<String>>;
}

/// `iw dev <iface> station dump` backed source.
#[derive(Debug, Clone)]
pub struct IwStationSource {
    timeout: Duration,
}

impl IwStationSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl StationSource for IwStationSource {
    fn associated_stations(&self, iface: &str) -> Result<Vec<String>> {
        let out = run_with_timeout("iw", &["dev", iface, "station", "dump"], self.timeout)
            .map_err(|e| BeaconError::AssociationQueryFailed(e.to_string()))?;
        Ok(parse_station_dump(&out))
    }
}

/// Collects the MAC from every `Station <mac> (on <iface>)` header line.
///
/// Header lines whose second token is not a colon-hex MAC are dropped.
pub fn parse_station_dump(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.starts_with("Station"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter(|token| {
            let valid = is_mac(token);
            if !valid {
                log::debug!("Ignoring station header with malformed address {:?}", token);
            }
            valid
        })
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Six colon-separated octets of exactly two hex digits each.
fn is_mac(token: &str) -> bool {
    let mut octets = 0;
    for part in token.split(':') {
        octets += 1;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
    }
    octets == 6
}
