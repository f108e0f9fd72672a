//! Bootstrap configuration loaded from `config.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LaunchError, Result};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_ATTRIBUTION_TIMEOUT_SECS: u64 = 20;
const DEFAULT_REACHABILITY_PROBE: &str = "1.1.1.1:443";
const DEFAULT_REACHABILITY_INTERVAL_SECS: u64 = 5;

/// What to do with an expired stored address when the query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StaleAddressPolicy {
	/// Present the expired address rather than falling back.
	#[default]
	UseStale,
	/// Only unexpired addresses survive a failed query.
	ForceFallback,
}

/// Static configuration for the resolver and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchConfig {
	/// Remote configuration endpoint.
	pub endpoint: Option<String>,
	pub bundle_id: String,
	/// Store catalog identifier sent as `store_id`.
	pub store_id: String,
	pub firebase_project_id: Option<String>,
	/// Locale override; derived from `LANG` when absent.
	pub locale: Option<String>,
	pub request_timeout_secs: u64,
	pub attribution_timeout_secs: u64,
	pub stale_address_policy: StaleAddressPolicy,
	/// `host:port` dialed by the reachability probe.
	pub reachability_probe: String,
	pub reachability_interval_secs: u64,
}

impl Default for LaunchConfig {
	fn default() -> Self {
		Self {
			endpoint: None,
			bundle_id: String::new(),
			store_id: String::new(),
			firebase_project_id: None,
			locale: None,
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
			attribution_timeout_secs: DEFAULT_ATTRIBUTION_TIMEOUT_SECS,
			stale_address_policy: StaleAddressPolicy::default(),
			reachability_probe: DEFAULT_REACHABILITY_PROBE.to_string(),
			reachability_interval_secs: DEFAULT_REACHABILITY_INTERVAL_SECS,
		}
	}
}

impl LaunchConfig {
	/// Loads configuration from `path`; a missing file yields defaults.
	pub fn load(path: &Path) -> Result<Self> {
		let content = match fs::read_to_string(path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				debug!(target = "launchpad.config", path = %path.display(), "no config file; using defaults");
				return Ok(Self::default());
			}
			Err(err) => return Err(err.into()),
		};
		serde_json::from_str(&content).map_err(|e| LaunchError::Config(format!("Failed to parse {}: {}", path.display(), e)))
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	pub fn attribution_timeout(&self) -> Duration {
		Duration::from_secs(self.attribution_timeout_secs)
	}

	pub fn reachability_interval(&self) -> Duration {
		Duration::from_secs(self.reachability_interval_secs.max(1))
	}

	/// Returns the two-letter, uppercased locale sent to the endpoint.
	pub fn resolved_locale(&self) -> String {
		let raw = self.locale.clone().or_else(|| std::env::var("LANG").ok()).unwrap_or_default();
		normalize_locale(&raw)
	}
}

/// Reduces a locale identifier (`en_US.UTF-8`, `pt-BR`, `de`) to `EN`, `PT`, `DE`.
///
/// Unusable input yields `EN`.
pub fn normalize_locale(raw: &str) -> String {
	let language = raw.split(['_', '-', '.', '@']).next().unwrap_or_default();
	if language.len() >= 2 && language.chars().take(2).all(|c| c.is_ascii_alphabetic()) {
		language[..2].to_ascii_uppercase()
	} else {
		"EN".to_string()
	}
}

/// Default on-disk location of `config.json`.
pub fn default_config_path() -> PathBuf {
	std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(dirs::config_dir)
		.unwrap_or_else(|| PathBuf::from("."))
		.join("launchpad/config.json")
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn missing_file_yields_defaults() {
		let temp = TempDir::new().unwrap();
		let config = LaunchConfig::load(&temp.path().join("absent.json")).unwrap();
		assert_eq!(config, LaunchConfig::default());
		assert_eq!(config.request_timeout(), Duration::from_secs(15));
	}

	#[test]
	fn partial_file_keeps_remaining_defaults() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("config.json");
		fs::write(
			&path,
			r#"{ "endpoint": "https://config.example/v1", "bundleId": "com.example.app", "staleAddressPolicy": "forceFallback" }"#,
		)
		.unwrap();

		let config = LaunchConfig::load(&path).unwrap();
		assert_eq!(config.endpoint.as_deref(), Some("https://config.example/v1"));
		assert_eq!(config.bundle_id, "com.example.app");
		assert_eq!(config.stale_address_policy, StaleAddressPolicy::ForceFallback);
		assert_eq!(config.attribution_timeout_secs, DEFAULT_ATTRIBUTION_TIMEOUT_SECS);
	}

	#[test]
	fn malformed_file_is_a_config_error() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("config.json");
		fs::write(&path, "{ nope").unwrap();
		let err = LaunchConfig::load(&path).unwrap_err();
		assert!(matches!(err, LaunchError::Config(_)));
	}

	#[test]
	fn locales_are_reduced_to_two_uppercase_letters() {
		assert_eq!(normalize_locale("en_US.UTF-8"), "EN");
		assert_eq!(normalize_locale("pt-BR"), "PT");
		assert_eq!(normalize_locale("de"), "DE");
		assert_eq!(normalize_locale("C"), "EN");
		assert_eq!(normalize_locale(""), "EN");
	}
}
