mod config;
mod inspect;
mod reset;
mod resolve;

use crate::cli::{Cli, Commands};
use crate::context::CommandContext;

pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
	let ctx = CommandContext::new(cli.config, cli.store)?;
	match cli.command {
		Commands::Resolve(args) => resolve::execute(&ctx, args, cli.format).await,
		Commands::Status => inspect::status(&ctx, cli.format),
		Commands::Cookies => inspect::cookies(&ctx, cli.format),
		Commands::Reset { cookies_only } => reset::execute(&ctx, cookies_only, cli.format),
		Commands::Config => config::execute(&ctx, cli.format),
	}
}
