use clap::Parser;
use launchpad_cli::{cli::Cli, commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		error!(target = "launchpad", error = %format!("{err:#}"), "command failed");
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}
