use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use launchpad::{
	AttributionOutcome, AttributionSnapshot, ConfigResolver, HttpConfigClient, JsonFileStore, Preferences, Reachability, ReachabilityMonitor,
	ResolverHandle, ResolverSettings, ResolverState, SystemClock, TcpProbe, clock, error::parse_url,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::inspect::decision_json;
use crate::cli::ResolveArgs;
use crate::context::CommandContext;
use crate::output::{OutputFormat, ResultBuilder, print_result};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub async fn execute(ctx: &CommandContext, args: ResolveArgs, format: OutputFormat) -> anyhow::Result<()> {
	let config = ctx.config();
	let endpoint = match args.endpoint.as_deref().or(config.endpoint.as_deref()) {
		Some(raw) => parse_url(raw)?,
		None => bail!("no configuration endpoint; set `endpoint` in {} or pass --endpoint", ctx.config_path().display()),
	};
	let attribution = load_attribution(args.attribution.as_deref())?;
	let deep_link = args.deep_link.as_deref().map(parse_url).transpose()?;

	let store = ctx.open_store();
	let device_id = ensure_device_id(&Preferences::new(Arc::clone(&store)))?;
	let client = HttpConfigClient::new(endpoint, config.request_timeout())?;
	let settings = ResolverSettings::from_config(config, device_id.clone());
	let resolver = ConfigResolver::new(Arc::clone(&store), client, settings, Arc::new(SystemClock));
	let (handle, task) = ResolverHandle::spawn_with_deadline(resolver, config.attribution_timeout());

	if args.probe {
		let monitor = Arc::new(ReachabilityMonitor::new());
		handle.follow_reachability(monitor.subscribe());
		let probe = TcpProbe::new(config.reachability_probe.clone(), PROBE_TIMEOUT);
		monitor.spawn_polling(probe, config.reachability_interval());
	} else if args.offline {
		handle.connectivity_changed(Reachability::Unsatisfied);
	}
	if let Some(token) = args.push_token {
		handle.push_token_updated(token);
	}
	if let Some(url) = deep_link {
		handle.deep_link_received(url);
	}
	handle.attribution_received(attribution);

	let settled = handle
		.wait_until(|state| state.is_terminal() || *state == ResolverState::AwaitingPermissionDecision)
		.await
		.context("resolver stopped before reaching a decision")?;
	let mut prompted = false;
	if settled == ResolverState::AwaitingPermissionDecision {
		info!(target = "launchpad.cli", answer = ?args.permission, "answering push permission prompt");
		prompted = true;
		handle.permission_answered(args.permission.into());
	}
	let state = handle.wait_terminal().await.context("resolver stopped before reaching a decision")?;

	drop(handle);
	task.abort();

	let prefs = Preferences::new(store);
	let mut data = decision_json(&prefs.decision());
	data["state"] = json!(state.name());
	data["url"] = json!(match &state {
		ResolverState::WebView(url) => Some(url.as_str()),
		_ => None,
	});
	data["permissionPrompted"] = json!(prompted);
	data["deviceId"] = json!(device_id);

	print_result(&ResultBuilder::new("resolve").data(data).build(), format);
	Ok(())
}

fn load_attribution(path: Option<&Path>) -> anyhow::Result<AttributionOutcome> {
	let Some(path) = path else {
		return Ok(AttributionOutcome::Failure("no attribution data supplied".into()));
	};
	let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	let raw: Value = serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
	let Value::Object(raw) = raw else {
		bail!("attribution file {} must contain a JSON object", path.display());
	};
	Ok(AttributionOutcome::Success(AttributionSnapshot::from_raw(raw, clock::now_ts())))
}

/// Returns the persisted device id, generating one on first use.
fn ensure_device_id(prefs: &Preferences<Arc<JsonFileStore>>) -> anyhow::Result<String> {
	if let Some(id) = prefs.device_id() {
		return Ok(id);
	}
	let id = uuid::Uuid::new_v4().to_string();
	prefs.set_device_id(&id)?;
	debug!(target = "launchpad.cli", device_id = %id, "generated device id");
	Ok(id)
}
