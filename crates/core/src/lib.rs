// warelay: relay logic between the browser-automation driver, the session
// database, and the external API's webhooks.
//
// The HTTP surface and process wiring live in `warelay-cli`; this crate is
// everything that can run (and be tested) without a socket or a browser.

pub mod driver;
pub mod error;
pub mod notify;
pub mod poller;
pub mod relay;
pub mod snapshot;
pub mod store;

/// Timeout applied to every outbound webhook request.
///
/// A hung external endpoint must never stall the relay or the poller; the
/// request is abandoned and the failure logged.
pub const WEBHOOK_TIMEOUT_MS: u64 = 5000;

/// Default interval between recurring status deliveries.
pub const STATUS_UPDATE_INTERVAL_MS: u64 = 5000;

pub use error::{Error, Result};
pub use notify::WebhookNotifier;
pub use poller::StatusPoller;
pub use relay::LifecycleRelay;
pub use snapshot::{ConnectivitySnapshot, SharedSnapshot};
pub use store::{SessionSink, SessionStore};
