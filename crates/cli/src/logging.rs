use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` always wins; otherwise `-v` raises the floor to info and
/// `-vv` to debug.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(match verbose {
			0 => "warn,wa=info",
			1 => "info",
			_ => "debug",
		})
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.init();
}
