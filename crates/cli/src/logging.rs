use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v` flags.
pub fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "launchpad=info",
		2 => "launchpad=debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose >= 2)
		.try_init();
}
