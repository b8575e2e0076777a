//! Process wiring: store, notifier, driver, relay, HTTP server.
//!
//! Startup survives a dead database, a missing webhook endpoint, and a
//! driver that fails to spawn: the status endpoints keep serving in a
//! degraded mode so the outside world can observe the failure. The only
//! hard failure left is a port that cannot be bound.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};
use wa::driver::Driver;
use wa::store::SessionSink;
use wa::{LifecycleRelay, SessionStore, SharedSnapshot, WebhookNotifier};

use crate::config::Config;
use crate::server::{self, AppState};

pub async fn run(config: Config) -> Result<()> {
	info!(target = "wa", session = %config.session_id, "starting relay");

	let store = match &config.mongo_uri {
		Some(uri) => match SessionStore::connect(uri, &config.session_id).await {
			Ok(store) => Some(Arc::new(store)),
			Err(err) => {
				warn!(
					target = "wa",
					error = %err,
					"session store unreachable; continuing without persistence"
				);
				None
			}
		},
		None => {
			info!(target = "wa", "MONGO_URI not set; session resume disabled");
			None
		}
	};

	let session = match &store {
		Some(store) => match store.load().await {
			Ok(blob) => blob,
			Err(err) => {
				warn!(target = "wa", error = %err, "failed to load prior session; starting fresh");
				None
			}
		},
		None => None,
	};

	if config.api_base_url.is_none() {
		info!(target = "wa", "API_BASE_URL not set; webhook delivery disabled");
	}
	let notifier = Arc::new(WebhookNotifier::new(
		&config.session_id,
		config.api_base_url.as_deref(),
		&config.qr_webhook_path,
		&config.status_webhook_path,
	)?);

	let snapshot = SharedSnapshot::new();

	// Driver failure degrades to status-only serving; the child process is
	// held here so it lives exactly as long as the server does.
	let (program, args) = config.driver_invocation();
	let _driver = match Driver::spawn(&program, &args) {
		Ok((driver, events)) => {
			driver.init(session, config.browser_path.clone()).await?;
			let relay = LifecycleRelay::new(
				snapshot.clone(),
				notifier,
				store.map(|s| s as Arc<dyn SessionSink>),
				driver.commands(),
				config.status_interval,
			);
			tokio::spawn(relay.run(events));
			Some(driver)
		}
		Err(err) => {
			warn!(
				target = "wa",
				error = %err,
				driver = %config.driver_cmd,
				"driver failed to start; serving status endpoints only"
			);
			None
		}
	};

	server::serve(
		config.port,
		AppState {
			snapshot,
			started_at: Instant::now(),
		},
	)
	.await
}
