use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "warelay")]
#[command(about = "WhatsApp connectivity relay - webhooks, session persistence, status API")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// HTTP port for the health/status endpoints (overrides PORT)
	#[arg(long)]
	pub port: Option<u16>,

	/// Session identity to resume or create (overrides SESSION_ID)
	#[arg(long)]
	pub session_id: Option<String>,

	/// Driver command line to spawn (overrides WA_DRIVER_CMD)
	#[arg(long)]
	pub driver_cmd: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_defaults() {
		let cli = Cli::try_parse_from(["warelay"]).unwrap();
		assert_eq!(cli.verbose, 0);
		assert!(cli.port.is_none());
		assert!(cli.session_id.is_none());
	}

	#[test]
	fn parse_overrides() {
		let cli = Cli::try_parse_from([
			"warelay",
			"-vv",
			"--port",
			"8080",
			"--session-id",
			"support",
			"--driver-cmd",
			"node driver.js",
		])
		.unwrap();
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.port, Some(8080));
		assert_eq!(cli.session_id.as_deref(), Some("support"));
		assert_eq!(cli.driver_cmd.as_deref(), Some("node driver.js"));
	}

	#[test]
	fn invalid_port_fails() {
		assert!(Cli::try_parse_from(["warelay", "--port", "not-a-port"]).is_err());
	}
}
