use std::path::{Path, PathBuf};
use std::sync::Arc;

use launchpad::config::default_config_path;
use launchpad::store::default_store_path;
use launchpad::{JsonFileStore, LaunchConfig, Preferences};
use tracing::debug;

/// Paths and configuration shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
	config_path: PathBuf,
	store_path: PathBuf,
	config: LaunchConfig,
}

impl CommandContext {
	pub fn new(config_path: Option<PathBuf>, store_path: Option<PathBuf>) -> anyhow::Result<Self> {
		let config_path = config_path.unwrap_or_else(default_config_path);
		let store_path = store_path.unwrap_or_else(default_store_path);
		let config = LaunchConfig::load(&config_path)?;
		debug!(target = "launchpad.cli", config = %config_path.display(), store = %store_path.display(), "command context ready");
		Ok(Self {
			config_path,
			store_path,
			config,
		})
	}

	pub fn config(&self) -> &LaunchConfig {
		&self.config
	}

	pub fn config_path(&self) -> &Path {
		&self.config_path
	}

	pub fn store_path(&self) -> &Path {
		&self.store_path
	}

	pub fn open_store(&self) -> Arc<JsonFileStore> {
		Arc::new(JsonFileStore::open(&self.store_path))
	}

	pub fn preferences(&self) -> Preferences<Arc<JsonFileStore>> {
		Preferences::new(self.open_store())
	}
}
