use launchpad::{CookieVault, KeyValueStore, LaunchDecision, LaunchMode, PermissionLedger, clock};
use serde_json::{Value, json};

use crate::context::CommandContext;
use crate::output::{OutputFormat, ResultBuilder, print_result};

/// JSON view of a persisted decision.
pub(crate) fn decision_json(decision: &LaunchDecision) -> Value {
	let mode = match &decision.mode {
		Some(LaunchMode::WebView { url, expires_at }) => json!({
			"mode": "webView",
			"url": url.as_str(),
			"expiresAt": expires_at,
		}),
		Some(LaunchMode::Fallback { reason }) => json!({
			"mode": "fallback",
			"fallbackReason": reason.as_str(),
			"sticky": reason.is_sticky(),
		}),
		None => json!({ "mode": null }),
	};
	json!({
		"hasLaunchedBefore": decision.has_launched_before,
		"decision": mode,
	})
}

pub fn status(ctx: &CommandContext, format: OutputFormat) -> anyhow::Result<()> {
	let prefs = ctx.preferences();
	let ledger = PermissionLedger::new(&prefs);
	let now = clock::now_ts();

	let mut data = decision_json(&prefs.decision());
	data["unexpired"] = json!(prefs.mode().is_some_and(|mode| mode.is_unexpired(now)));
	data["overrideUrl"] = json!(prefs.override_url().map(|url| url.to_string()));
	data["deviceId"] = json!(prefs.device_id());
	data["pushToken"] = json!(prefs.push_token());
	data["pushPermission"] = json!({
		"granted": ledger.is_granted(),
		"declined": ledger.is_declined(),
		"lastAskedAt": ledger.last_asked_at(),
		"shouldAsk": ledger.should_ask(now),
	});
	data["store"] = json!(ctx.store_path());

	print_result(&ResultBuilder::new("status").data(data).build(), format);
	Ok(())
}

pub fn cookies(ctx: &CommandContext, format: OutputFormat) -> anyhow::Result<()> {
	let vault = CookieVault::new(ctx.open_store());
	let snapshot = vault.load();

	let domains: Vec<Value> = snapshot
		.iter()
		.map(|(domain, names)| {
			json!({
				"domain": domain,
				"names": names.keys().collect::<Vec<_>>(),
			})
		})
		.collect();
	let count: usize = snapshot.values().map(|names| names.len()).sum();

	let data = json!({
		"count": count,
		"domains": domains,
	});
	print_result(&ResultBuilder::new("cookies").data(data).build(), format);
	Ok(())
}

/// Number of keys currently persisted.
pub(crate) fn entry_count(store: &impl KeyValueStore) -> usize {
	store.entries().len()
}
