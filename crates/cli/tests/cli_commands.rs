use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{Value, json};
use tempfile::TempDir;

/// Nothing listens here; tests that reach the network would fail loudly.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/config";

fn launchpad_binary() -> PathBuf {
	let mut path = std::env::current_exe().expect("current_exe should resolve");
	path.pop();
	path.pop();
	path.push("launchpad");
	path
}

fn run(workdir: &Path, args: &[&str]) -> (bool, Value, String) {
	let config = workdir.join("config.json");
	let store = workdir.join("store.json");
	let output = Command::new(launchpad_binary())
		.current_dir(workdir)
		.env_remove("RUST_LOG")
		.args(["--config", config.to_str().unwrap(), "--store", store.to_str().unwrap(), "-f", "json"])
		.args(args)
		.output()
		.expect("failed to execute launchpad");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	let parsed = serde_json::from_str::<Value>(&stdout).unwrap_or_else(|_| json!({ "raw": stdout }));
	(output.status.success(), parsed, stderr)
}

fn write_json(path: &Path, value: Value) {
	std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).expect("file should be written");
}

#[test]
fn status_on_fresh_store_reports_defaults() {
	let tmp = TempDir::new().expect("temp dir should be created");

	let (success, json, stderr) = run(tmp.path(), &["status"]);
	assert!(success, "status failed: {stderr}");
	assert_eq!(json["ok"], true);
	assert_eq!(json["command"], "status");
	assert_eq!(json["data"]["hasLaunchedBefore"], false);
	assert_eq!(json["data"]["decision"]["mode"], Value::Null);
	assert_eq!(json["data"]["pushPermission"]["shouldAsk"], true);
}

#[test]
fn organic_first_launch_resolves_to_sticky_fallback_offline() {
	let tmp = TempDir::new().expect("temp dir should be created");
	let attribution = tmp.path().join("attribution.json");
	write_json(&attribution, json!({ "af_status": "Organic", "media_source": "organic" }));

	let (success, json, stderr) = run(
		tmp.path(),
		&["resolve", "--endpoint", DEAD_ENDPOINT, "--attribution", attribution.to_str().unwrap()],
	);
	assert!(success, "resolve failed: {stderr}");
	assert_eq!(json["data"]["state"], "fallback");
	assert_eq!(json["data"]["decision"]["fallbackReason"], "organic");
	assert_eq!(json["data"]["decision"]["sticky"], true);
	assert_eq!(json["data"]["permissionPrompted"], false);

	let (success, status, _) = run(tmp.path(), &["status"]);
	assert!(success);
	assert_eq!(status["data"]["hasLaunchedBefore"], true);
	assert_eq!(status["data"]["deviceId"], json["data"]["deviceId"]);
}

#[test]
fn deep_link_resolves_without_querying() {
	let tmp = TempDir::new().expect("temp dir should be created");

	let (success, json, stderr) = run(
		tmp.path(),
		&["resolve", "--endpoint", DEAD_ENDPOINT, "--deep-link", "https://content.example/promo"],
	);
	assert!(success, "resolve failed: {stderr}");
	assert_eq!(json["data"]["state"], "webView");
	assert_eq!(json["data"]["url"], "https://content.example/promo");
	assert_eq!(json["data"]["decision"]["mode"], Value::Null, "override must not overwrite the stored decision");
}

#[test]
fn resolve_without_endpoint_fails() {
	let tmp = TempDir::new().expect("temp dir should be created");

	let (success, _, stderr) = run(tmp.path(), &["resolve"]);
	assert!(!success);
	assert!(stderr.contains("no configuration endpoint"), "unexpected stderr: {stderr}");
}

#[test]
fn cookies_summarizes_snapshot_and_reset_clears_it() {
	let tmp = TempDir::new().expect("temp dir should be created");
	write_json(
		&tmp.path().join("store.json"),
		json!({
			"hasLaunchedBefore": true,
			"savedCookies": {
				"content.example": { "session": { "value": "abc" }, "csrf": { "value": "def" } },
				"auth.example": { "token": { "value": "ghi" } },
			},
		}),
	);

	let (success, json, stderr) = run(tmp.path(), &["cookies"]);
	assert!(success, "cookies failed: {stderr}");
	assert_eq!(json["data"]["count"], 3);
	assert_eq!(json["data"]["domains"][0]["domain"], "auth.example");

	let (success, json, _) = run(tmp.path(), &["reset", "--cookies-only"]);
	assert!(success);
	assert_eq!(json["data"]["removed"], 1);

	let (_, json, _) = run(tmp.path(), &["cookies"]);
	assert_eq!(json["data"]["count"], 0);
	let (_, json, _) = run(tmp.path(), &["status"]);
	assert_eq!(json["data"]["hasLaunchedBefore"], true);

	let (success, _, _) = run(tmp.path(), &["reset"]);
	assert!(success);
	assert!(!tmp.path().join("store.json").exists());
}

#[test]
fn config_reports_file_values_over_defaults() {
	let tmp = TempDir::new().expect("temp dir should be created");
	write_json(
		&tmp.path().join("config.json"),
		json!({ "endpoint": "https://config.example/v1", "locale": "pt_BR", "staleAddressPolicy": "forceFallback" }),
	);

	let (success, json, stderr) = run(tmp.path(), &["config"]);
	assert!(success, "config failed: {stderr}");
	assert_eq!(json["data"]["configFound"], true);
	assert_eq!(json["data"]["effectiveLocale"], "PT");
	assert_eq!(json["data"]["config"]["endpoint"], "https://config.example/v1");
	assert_eq!(json["data"]["config"]["staleAddressPolicy"], "forceFallback");
	assert_eq!(json["data"]["config"]["requestTimeoutSecs"], 15);
}

#[test]
fn malformed_config_is_an_error() {
	let tmp = TempDir::new().expect("temp dir should be created");
	std::fs::write(tmp.path().join("config.json"), "{ not json").unwrap();

	let (success, _, _) = run(tmp.path(), &["status"]);
	assert!(!success);
}
