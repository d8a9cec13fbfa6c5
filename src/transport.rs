// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Datagram delivery.
//!
//! Fire and forget: one send per tick, nothing is read back and a failed send
//! is not retried.

use crate::error::{BeaconError, Result};
use crate::payload::TelemetryPayload;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

/// Destination for assembled payloads.
pub trait PayloadSink {
    fn send(&mut self, payload: &TelemetryPayload) -> Result<()>;
}

/// UDP sender bound to an ephemeral local port.
///
/// The socket is closed when the transport is dropped.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddrV4,
}

impl UdpTransport {
    pub fn open(target: SocketAddrV4, broadcast: bool) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .map_err(|e| BeaconError::Transport(format!("bind failed: {}", e)))?;
        if broadcast {
            socket
                .set_broadcast(true)
                .map_err(|e| BeaconError::Transport(format!("SO_BROADCAST: {}", e)))?;
        }
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddrV4 {
        self.target
    }
}

impl PayloadSink for UdpTransport {
    fn send(&mut self, payload: &TelemetryPayload) -> Result<()> {
        let body = payload.to_bytes()?;
        let sent = self
            .socket
            .send_to(&body, self.target)
            .map_err(|e| BeaconError::Transport(format!("send to {}: {}", self.target, e)))?;
        if sent != body.len() {
            return Err(BeaconError::Transport(format!(
                "short send to {}: {} of {} bytes",
                self.target,
                sent,
                body.len()
            )));
        }
        Ok(())
    }
}

/// Writes each payload as one JSON line, for dry runs.
pub struct WriterSink<W: std::io::Write> {
    writer: W,
}

impl<W: std::io::Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: std::io::Write> PayloadSink for WriterSink<W> {
    fn send(&mut self, payload: &TelemetryPayload) -> Result<()> {
        self.writer.write_all(&payload.to_bytes()?)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
