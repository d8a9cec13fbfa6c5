// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Beacon loop
//!
//! Two states: `Initializing` until the first uplink counter sample has been
//! taken, then `Running` with that sample held as the rate baseline. Every
//! tick reads all sources, assembles one payload and hands it to the sink.
//!
//! Failure handling per tick:
//!
//! - uplink counters unreadable: the tick is skipped and the baseline kept,
//!   so the next rate covers the combined interval;
//! - roster or auxiliary readers failing: the field is sent empty or null;
//! - send failing: logged, the baseline still advances.

use crate::config::BeaconConfig;
use crate::error::{BeaconError, Result};
use crate::payload::{TelemetryPayload, TickReadings};
use crate::rate::RateSample;
use crate::roster;
use crate::telemetry::{CounterSample, TelemetrySource};
use crate::transport::PayloadSink;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

/// Current wall-clock time as fractional unix seconds.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeaconState {
    Initializing,
    Running { previous: CounterSample },
}

/// Result of a single tick
#[derive(Debug)]
pub enum TickOutcome {
    /// First counter sample taken, nothing sent yet.
    Seeded(CounterSample),
    /// Payload assembled and handed to the sink.
    Sent(TelemetryPayload),
    /// Payload assembled but the sink rejected it.
    SendFailed(TelemetryPayload, BeaconError),
    /// Uplink counters unreadable; nothing sent, baseline unchanged.
    Skipped(BeaconError),
}

/// Periodic telemetry beacon
pub struct Beacon<T, S> {
    config: BeaconConfig,
    telemetry: T,
    sink: S,
    state: BeaconState,
}

impl<T: TelemetrySource, S: PayloadSink> Beacon<T, S> {
    pub fn new(config: BeaconConfig, telemetry: T, sink: S) -> Self {
        Self {
            config,
            telemetry,
            sink,
            state: BeaconState::Initializing,
        }
    }

    pub fn state(&self) -> &BeaconState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Takes the baseline sample. Failing here is fatal for the process: no
    /// rate can ever be computed without it.
    pub fn seed(&mut self, now: f64) -> Result<CounterSample> {
        let counters = self.telemetry.counters(&self.config.uplink_interface)?;
        let sample = CounterSample::new(now, counters);
        self.state = BeaconState::Running { previous: sample };
        log::info!(
            "Seeded {} counters: rx={} tx={}",
            self.config.uplink_interface,
            sample.rx_bytes,
            sample.tx_bytes
        );
        Ok(sample)
    }

    /// Runs one tick at wall-clock time `now` (unix seconds).
    pub fn tick(&mut self, now: f64) -> TickOutcome {
        let previous = match self.state {
            BeaconState::Initializing => {
                return match self.seed(now) {
                    Ok(sample) => TickOutcome::Seeded(sample),
                    Err(e) => {
                        log::warn!("Seeding counters failed: {}", e);
                        TickOutcome::Skipped(e)
                    }
                };
            }
            BeaconState::Running { previous } => previous,
        };

        let current = match self.telemetry.counters(&self.config.uplink_interface) {
            Ok(counters) => CounterSample::new(now, counters),
            Err(e) => {
                log::warn!("Skipping tick, uplink counters unreadable: {}", e);
                return TickOutcome::Skipped(e);
            }
        };

        let rate = RateSample::between(&previous, &current);
        self.state = BeaconState::Running { previous: current };

        let payload = TelemetryPayload::from_readings(now, &rate, self.read_all());

        match self.sink.send(&payload) {
            Ok(()) => {
                log::debug!(
                    "Sent t={} rx={} tx={} clients={}",
                    payload.t,
                    payload.rx,
                    payload.tx,
                    payload.macs().len()
                );
                TickOutcome::Sent(payload)
            }
            Err(e) => {
                log::warn!("Dropping payload for t={}: {}", payload.t, e);
                TickOutcome::SendFailed(payload, e)
            }
        }
    }

    /// Reads every field source. None of them short-circuits the others.
    fn read_all(&self) -> TickReadings {
        let ap = self.config.ap_interface.as_str();
        TickReadings {
            roster: roster::build(self.telemetry.stations(ap), self.telemetry.neighbors(ap)),
            temperature: self.telemetry.temperature(),
            uplink_rssi: self.telemetry.uplink_rssi(&self.config.uplink_interface),
            mem_available_mb: self.telemetry.mem_available_mb(),
        }
    }

    /// Ticks on a fixed schedule until `shutdown` fires or its sender is
    /// dropped. Returns the number of payloads handed to the sink.
    pub fn run(&mut self, shutdown: &Receiver<()>) -> Result<u64> {
        if self.state == BeaconState::Initializing {
            self.seed(unix_now())?;
        }

        let interval = self.config.interval();
        let mut next = Instant::now() + interval;
        let mut sent = 0u64;

        loop {
            match shutdown.recv_timeout(next.saturating_duration_since(Instant::now())) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            if let TickOutcome::Sent(_) = self.tick(unix_now()) {
                sent += 1;
            }

            next += interval;
            let now = Instant::now();
            if next <= now {
                log::debug!("Tick overran its interval, resynchronizing");
                next = now + interval;
            }
        }

        log::info!("Beacon stopped after {} payloads", sent);
        Ok(sent)
    }

    /// Seeds, waits one interval and returns a single payload.
    pub fn run_once(&mut self) -> Result<TelemetryPayload> {
        if self.state == BeaconState::Initializing {
            self.seed(unix_now())?;
        }
        std::thread::sleep(self.config.interval());

        match self.tick(unix_now()) {
            TickOutcome::Sent(payload) => Ok(payload),
            TickOutcome::SendFailed(_, e) | TickOutcome::Skipped(e) => Err(e),
            TickOutcome::Seeded(_) => Err(BeaconError::InterfaceUnavailable {
                iface: self.config.uplink_interface.clone(),
                reason: "no baseline sample".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::UNKNOWN_IP;
    use crate::telemetry::ByteCounters;
    use crate::transport::WriterSink;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::sync::mpsc;
    use std::time::Duration;

    /// Scripted host: counters are consumed one per read, the last one repeats.
    struct MockTelemetry {
        counters: RefCell<VecDeque<Result<ByteCounters>>>,
        stations: Vec<String>,
        stations_fail: bool,
        neighbors: HashMap<String, String>,
        thermal_fail: bool,
    }

    impl MockTelemetry {
        fn new(counters: Vec<Result<ByteCounters>>) -> Self {
            Self {
                counters: RefCell::new(counters.into()),
                stations: Vec::new(),
                stations_fail: false,
                neighbors: HashMap::new(),
                thermal_fail: false,
            }
        }

        fn with_roster(mut self, stations: &[&str], neighbors: &[(&str, &str)]) -> Self {
            self.stations = stations.iter().map(|s| s.to_string()).collect();
            self.neighbors = neighbors
                .iter()
                .map(|(m, i)| (m.to_string(), i.to_string()))
                .collect();
            self
        }
    }

    fn ok(rx: u64, tx: u64) -> Result<ByteCounters> {
        Ok(ByteCounters { rx_bytes: rx, tx_bytes: tx })
    }

    fn gone() -> Result<ByteCounters> {
        Err(BeaconError::interface("wlan1", "vanished"))
    }

    impl TelemetrySource for MockTelemetry {
        fn counters(&self, _iface: &str) -> Result<ByteCounters> {
            let mut queue = self.counters.borrow_mut();
            if queue.len() > 1 {
                return queue.pop_front().unwrap();
            }
            match queue.front() {
                Some(Ok(c)) => Ok(*c),
                _ => gone(),
            }
        }

        fn stations(&self, _iface: &str) -> Result<Vec<String>> {
            if self.stations_fail {
                return Err(BeaconError::AssociationQueryFailed("iw: command failed".into()));
            }
            Ok(self.stations.clone())
        }

        fn neighbors(&self, _iface: &str) -> Result<HashMap<String, String>> {
            Ok(self.neighbors.clone())
        }

        fn temperature(&self) -> Result<f64> {
            if self.thermal_fail {
                return Err(BeaconError::ThermalUnavailable("no zone".into()));
            }
            Ok(48.3)
        }

        fn uplink_rssi(&self, _iface: &str) -> Result<f64> {
            Ok(-55.0)
        }

        fn mem_available_mb(&self) -> Result<u64> {
            Ok(731)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<TelemetryPayload>,
        fail: bool,
    }

    impl PayloadSink for RecordingSink {
        fn send(&mut self, payload: &TelemetryPayload) -> Result<()> {
            if self.fail {
                return Err(BeaconError::Transport("network unreachable".into()));
            }
            self.sent.push(payload.clone());
            Ok(())
        }
    }

    fn beacon(telemetry: MockTelemetry) -> Beacon<MockTelemetry, RecordingSink> {
        Beacon::new(BeaconConfig::default(), telemetry, RecordingSink::default())
    }

    fn expect_sent(outcome: TickOutcome) -> TelemetryPayload {
        match outcome {
            TickOutcome::Sent(payload) => payload,
            other => panic!("Expected Sent, got {other:?}"),
        }
    }

    #[test]
    fn test_first_tick_seeds() {
        let mut b = beacon(MockTelemetry::new(vec![ok(1000, 2000)]));
        assert!(matches!(b.tick(1000.0), TickOutcome::Seeded(_)));
        assert_eq!(
            *b.state(),
            BeaconState::Running {
                previous: CounterSample { taken_at: 1000.0, rx_bytes: 1000, tx_bytes: 2000 }
            }
        );
        assert!(b.sink().sent.is_empty());
    }

    #[test]
    fn test_rate_and_timestamp() {
        let mut b = beacon(MockTelemetry::new(vec![ok(1000, 2000), ok(2000, 2000)]));
        b.seed(1000.0).unwrap();
        let payload = expect_sent(b.tick(1001.0));
        assert_eq!(payload.t, 1001);
        assert_eq!((payload.rx, payload.tx), (8000, 0));
        assert_eq!(payload.temp, Some(48.3));
        assert_eq!(payload.uplink_rssi, Some(-55.0));
        assert_eq!(payload.mem_avail_mb, Some(731));
    }

    #[test]
    fn test_seed_failure_is_error() {
        let mut b = beacon(MockTelemetry::new(vec![gone()]));
        assert!(matches!(
            b.seed(1.0),
            Err(BeaconError::InterfaceUnavailable { .. })
        ));
        assert_eq!(*b.state(), BeaconState::Initializing);
    }

    #[test]
    fn test_counter_failure_skips_and_keeps_baseline() {
        let mut b = beacon(MockTelemetry::new(vec![ok(1000, 0), gone(), ok(3000, 0)]));
        b.seed(1000.0).unwrap();

        assert!(matches!(b.tick(1001.0), TickOutcome::Skipped(_)));
        assert!(b.sink().sent.is_empty());

        // 2000 bytes over the combined 2 s window
        let payload = expect_sent(b.tick(1002.0));
        assert_eq!(payload.rx, 8000);
    }

    #[test]
    fn test_resolved_client() {
        let telemetry = MockTelemetry::new(vec![ok(0, 0)])
            .with_roster(&["aa:bb:cc:dd:ee:ff"], &[("aa:bb:cc:dd:ee:ff", "192.168.4.2")]);
        let mut b = beacon(telemetry);
        b.seed(0.0).unwrap();
        let payload = expect_sent(b.tick(1.0));
        assert_eq!(payload.clients(), ["192.168.4.2"]);
        assert_eq!(payload.macs(), ["aa:bb:cc:dd:ee:ff"]);
    }

    #[test]
    fn test_unresolved_client() {
        let telemetry = MockTelemetry::new(vec![ok(0, 0)]).with_roster(&["11:22:33:44:55:66"], &[]);
        let mut b = beacon(telemetry);
        b.seed(0.0).unwrap();
        let payload = expect_sent(b.tick(1.0));
        assert_eq!(payload.clients(), [UNKNOWN_IP]);
        assert_eq!(payload.macs(), ["11:22:33:44:55:66"]);
    }

    #[test]
    fn test_thermal_failure_keeps_other_fields() {
        let mut telemetry = MockTelemetry::new(vec![ok(0, 0), ok(125, 250)])
            .with_roster(&["aa:bb:cc:dd:ee:ff"], &[("aa:bb:cc:dd:ee:ff", "192.168.4.2")]);
        telemetry.thermal_fail = true;
        let mut b = beacon(telemetry);
        b.seed(0.0).unwrap();

        let payload = expect_sent(b.tick(1.0));
        assert_eq!(payload.temp, None);
        assert_eq!((payload.rx, payload.tx), (1000, 2000));
        assert_eq!(payload.uplink_rssi, Some(-55.0));
        assert_eq!(payload.mem_avail_mb, Some(731));
        assert_eq!(payload.clients(), ["192.168.4.2"]);
    }

    #[test]
    fn test_station_failure_sends_empty_roster() {
        let mut telemetry = MockTelemetry::new(vec![ok(0, 0)])
            .with_roster(&["aa:bb:cc:dd:ee:ff"], &[("aa:bb:cc:dd:ee:ff", "192.168.4.2")]);
        telemetry.stations_fail = true;
        let mut b = beacon(telemetry);
        b.seed(0.0).unwrap();

        let payload = expect_sent(b.tick(1.0));
        assert!(payload.clients().is_empty());
        assert!(payload.macs().is_empty());
        assert_eq!(payload.temp, Some(48.3));
    }

    #[test]
    fn test_send_failure_still_advances_baseline() {
        let mut b = Beacon::new(
            BeaconConfig::default(),
            MockTelemetry::new(vec![ok(0, 0), ok(100, 0)]),
            RecordingSink { sent: Vec::new(), fail: true },
        );
        b.seed(0.0).unwrap();
        assert!(matches!(b.tick(1.0), TickOutcome::SendFailed(_, BeaconError::Transport(_))));
        match b.state() {
            BeaconState::Running { previous } => {
                assert_eq!(previous.taken_at, 1.0);
                assert_eq!(previous.rx_bytes, 100);
            }
            other => panic!("Expected Running, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_seed_through_tick_stays_initializing() {
        let mut b = beacon(MockTelemetry::new(vec![gone(), ok(5, 5)]));

        match b.tick(1.0) {
            TickOutcome::Skipped(BeaconError::InterfaceUnavailable { iface, .. }) => {
                assert_eq!(iface, "wlan1")
            }
            other => panic!("Expected Skipped, got {other:?}"),
        }
        assert_eq!(*b.state(), BeaconState::Initializing);
        assert!(b.sink().sent.is_empty());

        // next tick retries the baseline
        assert!(matches!(b.tick(2.0), TickOutcome::Seeded(_)));
        assert!(matches!(b.state(), BeaconState::Running { .. }));
    }

    #[test]
    fn test_run_once_writes_one_json_line() {
        let config = BeaconConfig { interval_secs: 0.01, ..Default::default() };
        let telemetry = MockTelemetry::new(vec![ok(0, 0), ok(1000, 0)])
            .with_roster(&["aa:bb:cc:dd:ee:ff"], &[("aa:bb:cc:dd:ee:ff", "192.168.4.2")]);
        let mut b = Beacon::new(config, telemetry, WriterSink::new(Vec::new()));

        let payload = b.run_once().unwrap();
        assert!(payload.rx > 0, "rx was {}", payload.rx);
        assert_eq!(payload.tx, 0);

        let out = String::from_utf8(b.sink().get_ref().clone()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 1);

        let written: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(written["rx"], payload.rx);
        assert_eq!(written["tx"], 0);
        assert_eq!(written["clients"], serde_json::json!(["192.168.4.2"]));
        assert_eq!(written["temp"], 48.3);
    }

    #[test]
    fn test_run_once_fails_without_uplink() {
        let config = BeaconConfig { interval_secs: 0.01, ..Default::default() };
        let mut b = Beacon::new(config, MockTelemetry::new(vec![gone()]), WriterSink::new(Vec::new()));
        assert!(matches!(b.run_once(), Err(BeaconError::InterfaceUnavailable { .. })));
        assert!(b.sink().get_ref().is_empty());
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let config = BeaconConfig { interval_secs: 0.02, ..Default::default() };
        let mut b = Beacon::new(config, MockTelemetry::new(vec![ok(0, 0)]), RecordingSink::default());

        let (tx, rx) = mpsc::channel();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            tx.send(()).unwrap();
        });

        let sent = b.run(&rx).unwrap();
        stopper.join().unwrap();

        assert!(sent >= 1, "expected at least one payload, got {sent}");
        assert_eq!(sent as usize, b.sink().sent.len());
    }

    #[test]
    fn test_run_fails_without_uplink() {
        let mut b = beacon(MockTelemetry::new(vec![gone()]));
        let (_tx, rx) = mpsc::channel();
        assert!(b.run(&rx).is_err());
    }

    #[test]
    fn test_unix_now_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(unix_now() > 1_704_067_200.0);
    }
}
