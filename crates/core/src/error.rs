use thiserror::Error;

/// Errors surfaced by the relay's collaborators.
///
/// None of these are fatal to the process: store failures degrade session
/// resume, notification failures degrade external visibility, and driver
/// failures end the bridge task. Callers log and continue.
#[derive(Debug, Error)]
pub enum Error {
    /// Session persistence failed (connect, load, or save).
    #[error("session store error: {0}")]
    Store(#[from] mongodb::error::Error),

    /// Webhook delivery failed before a response arrived.
    #[error("webhook delivery failed: {0}")]
    Notify(#[from] reqwest::Error),

    /// Webhook endpoint answered with a non-success status.
    #[error("webhook endpoint returned {0}")]
    NotifyStatus(reqwest::StatusCode),

    /// The QR challenge could not be rendered to an image.
    #[error("QR render failed: {0}")]
    QrRender(String),

    /// Driver process could not be spawned or its stream broke.
    #[error("driver error: {0}")]
    Driver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
