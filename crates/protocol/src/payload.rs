//! JSON payloads posted to the external API's webhooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::ClientIdentity;

/// Coarse connectivity state as reported to the external API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Ready,
    Qr,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Ready => "ready",
            ConnectionStatus::Qr => "qr",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a QR challenge webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrWebhookPayload {
    pub session_id: String,
    /// Raw challenge string as issued by WhatsApp.
    pub qr_code: String,
    /// Challenge rendered as a `data:` URI image for direct display.
    pub qr_image: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of a status webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusWebhookPayload {
    pub session_id: String,
    pub status: ConnectionStatus,
    pub is_ready: bool,
    #[serde(rename = "hasQR")]
    pub has_qr: bool,
    pub client_info: Option<ClientIdentity>,
    pub reconnect_attempts: u32,
    pub timestamp: DateTime<Utc>,
}
