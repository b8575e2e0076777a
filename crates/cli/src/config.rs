//! Environment-style configuration with CLI overrides.
//!
//! The relay is deployed the twelve-factor way: everything comes from
//! environment variables, with flags for the handful of values worth
//! overriding in a shell. Lookup goes through a closure so tests never
//! touch process-global state.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::Cli;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_ID: &str = "default";
pub const DEFAULT_QR_PATH: &str = "/webhook/qr";
pub const DEFAULT_STATUS_PATH: &str = "/webhook/status";
pub const DEFAULT_DRIVER_CMD: &str = "warelay-driver";

#[derive(Debug, Clone)]
pub struct Config {
	pub port: u16,
	pub session_id: String,
	/// Absent means no persistence: the relay runs, sessions don't resume.
	pub mongo_uri: Option<String>,
	/// Absent means webhook delivery is disabled entirely.
	pub api_base_url: Option<String>,
	pub qr_webhook_path: String,
	pub status_webhook_path: String,
	pub status_interval: Duration,
	pub driver_cmd: String,
	/// Browser executable override forwarded to the driver.
	pub browser_path: Option<String>,
}

impl Config {
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let port = match lookup("PORT") {
			Some(raw) => raw
				.parse()
				.with_context(|| format!("invalid PORT value `{raw}`"))?,
			None => DEFAULT_PORT,
		};

		let status_interval = match lookup("STATUS_UPDATE_INTERVAL_MS") {
			Some(raw) => Duration::from_millis(
				raw.parse()
					.with_context(|| format!("invalid STATUS_UPDATE_INTERVAL_MS value `{raw}`"))?,
			),
			None => Duration::from_millis(wa::STATUS_UPDATE_INTERVAL_MS),
		};

		Ok(Self {
			port,
			session_id: lookup("SESSION_ID").unwrap_or_else(|| DEFAULT_SESSION_ID.to_string()),
			mongo_uri: lookup("MONGO_URI"),
			api_base_url: lookup("API_BASE_URL"),
			qr_webhook_path: lookup("API_WEBHOOK_QR")
				.unwrap_or_else(|| DEFAULT_QR_PATH.to_string()),
			status_webhook_path: lookup("API_WEBHOOK_STATUS")
				.unwrap_or_else(|| DEFAULT_STATUS_PATH.to_string()),
			status_interval,
			driver_cmd: lookup("WA_DRIVER_CMD").unwrap_or_else(|| DEFAULT_DRIVER_CMD.to_string()),
			browser_path: lookup("CHROME_PATH"),
		})
	}

	/// Flags beat environment values.
	pub fn apply_cli(mut self, cli: &Cli) -> Self {
		if let Some(port) = cli.port {
			self.port = port;
		}
		if let Some(session_id) = &cli.session_id {
			self.session_id = session_id.clone();
		}
		if let Some(driver_cmd) = &cli.driver_cmd {
			self.driver_cmd = driver_cmd.clone();
		}
		self
	}

	/// Splits the driver command line into program and arguments.
	pub fn driver_invocation(&self) -> (String, Vec<String>) {
		let mut parts = self.driver_cmd.split_whitespace().map(String::from);
		let program = parts
			.next()
			.unwrap_or_else(|| DEFAULT_DRIVER_CMD.to_string());
		(program, parts.collect())
	}
}
