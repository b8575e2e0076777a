//! Driver line protocol: lifecycle events in, commands out.
//!
//! The driver process emits one JSON object per line on stdout and accepts
//! one JSON command per line on stdin. Variants are tagged with a `type`
//! field so either side can be extended without breaking older peers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::ClientIdentity;

/// Lifecycle event emitted by the automation driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverEvent {
    /// A login QR challenge was issued and must be scanned.
    Qr { code: String },
    /// The account authenticated; `session` is the opaque credential blob
    /// to persist for resume on the next start.
    Authenticated { session: Value },
    /// The client is fully connected and can send/receive messages.
    Ready { info: ClientIdentity },
    /// The client lost its connection.
    Disconnected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// An incoming chat message.
    Message { chat: String, body: String },
}

/// Command sent to the automation driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverCommand {
    /// Start the client. A previously persisted session blob skips the QR
    /// scan; `browser_path` overrides the browser executable the driver
    /// launches.
    Init {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        browser_path: Option<String>,
    },
    /// Send a reply into an existing chat.
    Reply { chat: String, body: String },
}
