use launchpad::{CookieVault, KeyValueStore};
use serde_json::json;
use tracing::info;

use super::inspect::entry_count;
use crate::context::CommandContext;
use crate::output::{OutputFormat, ResultBuilder, print_result};

pub fn execute(ctx: &CommandContext, cookies_only: bool, format: OutputFormat) -> anyhow::Result<()> {
	let store = ctx.open_store();
	let before = entry_count(&store);

	if cookies_only {
		CookieVault::new(store.clone()).clear()?;
	} else {
		store.clear()?;
	}
	let removed = before - entry_count(&store);
	info!(target = "launchpad.cli", removed, cookies_only, "persisted state cleared");

	let data = json!({
		"removed": removed,
		"cookiesOnly": cookies_only,
		"store": ctx.store_path(),
	});
	print_result(&ResultBuilder::new("reset").data(data).build(), format);
	Ok(())
}
