use clap::Parser;
use tracing::error;
use warelay_cli::cli::Cli;
use warelay_cli::config::Config;
use warelay_cli::{app, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let config = match Config::from_env() {
		Ok(config) => config.apply_cli(&cli),
		Err(err) => {
			error!(target = "wa", error = %err, "invalid configuration");
			std::process::exit(2);
		}
	};

	if let Err(err) = app::run(config).await {
		error!(target = "wa", error = %err, "relay terminated");
		std::process::exit(1);
	}
}
