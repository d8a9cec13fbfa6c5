// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Bit rates from consecutive counter samples.
//!
//! Two behaviours are intentional and consumers rely on them:
//!
//! - **Clock skew**: when the wall clock did not advance between samples the
//!   elapsed time is floored at [`MIN_ELAPSED_SECS`], producing a large but
//!   finite spike instead of a division by zero.
//! - **Counter reset**: when a counter went backwards (interface reset or
//!   wrap) the signed delta is reported as a negative rate. Receivers treat a
//!   negative rate as "counter reset, discard this sample".

use crate::telemetry::CounterSample;
use serde::{Deserialize, Serialize};

/// Elapsed time used when the wall clock stood still or went backwards.
pub const MIN_ELAPSED_SECS: f64 = 0.001;

/// Throughput in bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateSample {
    pub rx_bps: i64,
    pub tx_bps: i64,
}

impl RateSample {
    /// Rate from `previous` to `current`, truncated toward zero.
    pub fn between(previous: &CounterSample, current: &CounterSample) -> Self {
        let elapsed = current.taken_at - previous.taken_at;
        let elapsed = if elapsed > 0.0 { elapsed } else { MIN_ELAPSED_SECS };

        Self {
            rx_bps: bits_per_second(previous.rx_bytes, current.rx_bytes, elapsed),
            tx_bps: bits_per_second(previous.tx_bytes, current.tx_bytes, elapsed),
        }
    }
}

fn bits_per_second(previous: u64, current: u64, elapsed_secs: f64) -> i64 {
    let delta_bits = (current as i128 - previous as i128) * 8;
    // `as` truncates toward zero and saturates at the i64 bounds
    (delta_bits as f64 / elapsed_secs) as i64
}
