use serde_json::json;

use crate::context::CommandContext;
use crate::output::{OutputFormat, ResultBuilder, print_result};

pub fn execute(ctx: &CommandContext, format: OutputFormat) -> anyhow::Result<()> {
	let config = ctx.config();
	let data = json!({
		"configPath": ctx.config_path(),
		"configFound": ctx.config_path().exists(),
		"storePath": ctx.store_path(),
		"effectiveLocale": config.resolved_locale(),
		"config": config,
	});
	print_result(&ResultBuilder::new("config").data(data).build(), format);
	Ok(())
}
