//! The single authoritative in-memory record of connection state.
//!
//! Exactly one snapshot exists per process. The lifecycle relay is its only
//! writer; the status poller and the HTTP status handler read it. Mutation
//! goes through the transition methods below, which keep the invariant that
//! a snapshot is awaiting a scan, ready, or disconnected. A QR challenge
//! and a ready flag are never held at the same time.

use std::sync::Arc;

use parking_lot::RwLock;
use warelay_protocol::{ClientIdentity, ConnectionStatus};

#[derive(Debug, Clone, Default)]
pub struct ConnectivitySnapshot {
    qr: Option<String>,
    ready: bool,
    client_info: Option<ClientIdentity>,
    reconnect_attempts: u32,
}

impl ConnectivitySnapshot {
    pub fn qr(&self) -> Option<&str> {
        self.qr.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn client_info(&self) -> Option<&ClientIdentity> {
        self.client_info.as_ref()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Derives the coarse status reported externally: `ready` wins, then a
    /// pending QR challenge, then `disconnected`.
    pub fn status(&self) -> ConnectionStatus {
        if self.ready {
            ConnectionStatus::Ready
        } else if self.qr.is_some() {
            ConnectionStatus::Qr
        } else {
            ConnectionStatus::Disconnected
        }
    }

    /// A QR challenge was issued; the session is back to awaiting a scan.
    pub fn record_qr(&mut self, code: String) {
        self.qr = Some(code);
        self.ready = false;
    }

    /// Credentials were accepted; the challenge is consumed but the client
    /// is not usable until `record_ready`.
    pub fn record_authenticated(&mut self) {
        self.qr = None;
    }

    /// The client is connected and identified.
    pub fn record_ready(&mut self, info: ClientIdentity) {
        self.ready = true;
        self.qr = None;
        self.reconnect_attempts = 0;
        self.client_info = Some(info);
    }

    /// The connection dropped; one more reconnection cycle is underway.
    pub fn record_disconnected(&mut self) {
        self.ready = false;
        self.qr = None;
        self.client_info = None;
        self.reconnect_attempts = self.reconnect_attempts.saturating_add(1);
    }
}

/// Shared handle to the process-wide snapshot.
///
/// The relay and the HTTP handlers run on a multi-threaded runtime, so the
/// snapshot sits behind a lock. Holders never await while the lock is held.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot(Arc<RwLock<ConnectivitySnapshot>>);

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a point-in-time copy of the snapshot.
    pub fn read(&self) -> ConnectivitySnapshot {
        self.0.read().clone()
    }

    /// Applies a transition under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ConnectivitySnapshot) -> R) -> R {
        f(&mut self.0.write())
    }
}
