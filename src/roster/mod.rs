// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Client roster.
//!
//! Joins the driver's association list with the kernel neighbor table by
//! link-layer address. The association list decides who is connected; the
//! neighbor table only supplies addresses.

pub mod neighbor;
pub mod station;

pub use neighbor::{parse_arp_table, NeighborTable};
pub use station::{parse_station_dump, IwStationSource, StationSource};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Address reported for a station the neighbor table does not know yet.
pub const UNKNOWN_IP: &str = "unknown";

/// One associated station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEntry {
    pub mac: String,
    pub ip: String,
}

/// Resolves each associated MAC in order. Stations without a neighbor entry
/// get [`UNKNOWN_IP`]; neighbors that are not associated are dropped.
pub fn merge(stations: &[String], neighbors: &HashMap<String, String>) -> Vec<ClientEntry> {
    let mut seen = HashSet::with_capacity(stations.len());
    stations
        .iter()
        .filter(|mac| seen.insert(mac.as_str()))
        .map(|mac| ClientEntry {
            mac: mac.clone(),
            ip: neighbors
                .get(mac)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_IP.to_string()),
        })
        .collect()
}

/// Builds the roster from both reads.
///
/// A failed association query fails the roster. A failed neighbor read only
/// degrades every address to [`UNKNOWN_IP`].
pub fn build(
    stations: Result<Vec<String>>,
    neighbors: Result<HashMap<String, String>>,
) -> Result<Vec<ClientEntry>> {
    let stations = stations?;
    let neighbors = neighbors.unwrap_or_else(|e| {
        log::warn!("Neighbor table unreadable, addresses reported as unknown: {}", e);
        HashMap::new()
    });
    Ok(merge(&stations, &neighbors))
}
