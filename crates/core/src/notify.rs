//! Outbound webhook delivery to the external API.
//!
//! Every delivery is fire-and-forget: a bounded-timeout POST whose failure
//! is logged and swallowed. Nothing here may ever propagate an error into
//! the relay or block it; a slow or dead endpoint degrades external
//! visibility only. With no base URL configured both operations are no-ops
//! and perform no network I/O.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use tracing::{debug, warn};
use warelay_protocol::{QrWebhookPayload, StatusWebhookPayload};

use crate::WEBHOOK_TIMEOUT_MS;
use crate::error::{Error, Result};
use crate::snapshot::ConnectivitySnapshot;

struct Endpoints {
    qr_url: String,
    status_url: String,
}

/// Pushes QR challenges and status reports to the configured API.
pub struct WebhookNotifier {
    client: reqwest::Client,
    session_id: String,
    endpoints: Option<Endpoints>,
}

impl WebhookNotifier {
    /// Builds a notifier. `base_url` of `None` disables delivery entirely.
    pub fn new(
        session_id: impl Into<String>,
        base_url: Option<&str>,
        qr_path: &str,
        status_path: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(WEBHOOK_TIMEOUT_MS))
            .build()?;

        let endpoints = base_url.map(|base| Endpoints {
            qr_url: format!("{base}{qr_path}"),
            status_url: format!("{base}{status_path}"),
        });

        Ok(Self {
            client,
            session_id: session_id.into(),
            endpoints,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoints.is_some()
    }

    /// Posts a QR challenge. Failure is logged, never surfaced.
    pub async fn notify_qr(&self, qr: &str) {
        let Some(endpoints) = &self.endpoints else {
            return;
        };

        if let Err(err) = self.post_qr(&endpoints.qr_url, qr).await {
            warn!(target = "wa.notify", error = %err, "QR webhook delivery failed");
        }
    }

    /// Posts the current status report. Failure is logged, never surfaced.
    pub async fn notify_status(&self, snapshot: &ConnectivitySnapshot) {
        let Some(endpoints) = &self.endpoints else {
            return;
        };

        if let Err(err) = self.post_status(&endpoints.status_url, snapshot).await {
            warn!(target = "wa.notify", error = %err, "status webhook delivery failed");
        }
    }

    async fn post_qr(&self, url: &str, qr: &str) -> Result<()> {
        let payload = QrWebhookPayload {
            session_id: self.session_id.clone(),
            qr_code: qr.to_string(),
            qr_image: render_qr_data_uri(qr)?,
            timestamp: Utc::now(),
        };

        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(Error::NotifyStatus(response.status()));
        }

        debug!(target = "wa.notify", %url, "QR challenge delivered");
        Ok(())
    }

    async fn post_status(&self, url: &str, snapshot: &ConnectivitySnapshot) -> Result<()> {
        let payload = StatusWebhookPayload {
            session_id: self.session_id.clone(),
            status: snapshot.status(),
            is_ready: snapshot.is_ready(),
            has_qr: snapshot.qr().is_some(),
            client_info: snapshot.client_info().cloned(),
            reconnect_attempts: snapshot.reconnect_attempts(),
            timestamp: Utc::now(),
        };

        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(Error::NotifyStatus(response.status()));
        }

        debug!(target = "wa.notify", %url, status = %payload.status, "status delivered");
        Ok(())
    }
}

/// Renders the challenge string as an SVG `data:` URI.
///
/// Challenge strings are long enough that the default error-correction
/// level can overflow the symbol capacity; fall back to the lowest level
/// before giving up.
fn render_qr_data_uri(data: &str) -> Result<String> {
    let code = QrCode::new(data)
        .or_else(|_| QrCode::with_error_correction_level(data, EcLevel::L))
        .map_err(|e| Error::QrRender(e.to_string()))?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .build();

    Ok(format!("data:image/svg+xml;base64,{}", BASE64.encode(image)))
}
