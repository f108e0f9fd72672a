use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use launchpad::PermissionAnswer;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(about = "Resolve and inspect bootstrap presentation decisions")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Configuration file (defaults to the user config directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Persistent store file (defaults to the user data directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub store: Option<PathBuf>,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run the full bootstrap resolution against the configured endpoint
	Resolve(ResolveArgs),

	/// Show the persisted launch decision
	Status,

	/// Summarize the persisted cookie snapshot
	Cookies,

	/// Clear persisted state
	Reset {
		/// Only drop the cookie snapshot
		#[arg(long)]
		cookies_only: bool,
	},

	/// Print the effective configuration
	Config,
}

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
	/// JSON object with raw attribution fields; omitted means attribution failed
	#[arg(long, value_name = "FILE")]
	pub attribution: Option<PathBuf>,

	/// Answer to give if the push permission prompt is due
	#[arg(long, value_enum, default_value = "skip")]
	pub permission: PermissionChoice,

	/// Push token to report before resolution
	#[arg(long)]
	pub push_token: Option<String>,

	/// One-shot override address, as if delivered by a deep link
	#[arg(long, value_name = "URL")]
	pub deep_link: Option<String>,

	/// Configuration endpoint, overriding the config file
	#[arg(long, value_name = "URL")]
	pub endpoint: Option<String>,

	/// Report lost connectivity before resolving
	#[arg(long, conflicts_with = "probe")]
	pub offline: bool,

	/// Poll the reachability probe while resolving
	#[arg(long)]
	pub probe: bool,
}

/// Caller-supplied answer to the push permission prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PermissionChoice {
	Grant,
	Decline,
	#[default]
	Skip,
}

impl From<PermissionChoice> for PermissionAnswer {
	fn from(choice: PermissionChoice) -> Self {
		match choice {
			PermissionChoice::Grant => PermissionAnswer::Granted,
			PermissionChoice::Decline => PermissionAnswer::Declined,
			PermissionChoice::Skip => PermissionAnswer::Skipped,
		}
	}
}
