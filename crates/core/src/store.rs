//! Durable key-value storage behind an injectable interface.
//!
//! The resolver and session manager never touch ambient global state: they
//! are handed a [`KeyValueStore`]. [`JsonFileStore`] persists across process
//! restarts; [`MemoryStore`] backs tests and ephemeral runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{LaunchError, Result};

/// Minimal get/set/remove store over JSON values.
///
/// Reads never fail: an absent or unreadable key is `None`.
pub trait KeyValueStore: Send + Sync {
	fn get(&self, key: &str) -> Option<Value>;
	fn set(&self, key: &str, value: Value) -> Result<()>;
	fn remove(&self, key: &str) -> Result<()>;
	/// Removes every key.
	fn clear(&self) -> Result<()>;
	/// Returns a copy of every stored entry.
	fn entries(&self) -> Map<String, Value>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
	fn get(&self, key: &str) -> Option<Value> {
		(**self).get(key)
	}

	fn set(&self, key: &str, value: Value) -> Result<()> {
		(**self).set(key, value)
	}

	fn remove(&self, key: &str) -> Result<()> {
		(**self).remove(key)
	}

	fn clear(&self) -> Result<()> {
		(**self).clear()
	}

	fn entries(&self) -> Map<String, Value> {
		(**self).entries()
	}
}

/// In-memory store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
	values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Option<Value> {
		self.values.lock().get(key).cloned()
	}

	fn set(&self, key: &str, value: Value) -> Result<()> {
		self.values.lock().insert(key.to_string(), value);
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.values.lock().remove(key);
		Ok(())
	}

	fn clear(&self) -> Result<()> {
		self.values.lock().clear();
		Ok(())
	}

	fn entries(&self) -> Map<String, Value> {
		self.values.lock().clone()
	}
}

/// Store persisted as a single pretty-printed JSON object.
///
/// The whole file is rewritten after every mutation. A missing or unreadable
/// file loads as empty (first launch).
#[derive(Debug)]
pub struct JsonFileStore {
	path: PathBuf,
	values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
	pub fn open(path: impl Into<PathBuf>) -> Self {
		let path = path.into();
		let values = fs::read_to_string(&path)
			.ok()
			.and_then(|content| serde_json::from_str::<Map<String, Value>>(&content).ok())
			.unwrap_or_default();
		debug!(target = "launchpad.store", path = %path.display(), keys = values.len(), "opened store");
		Self {
			path,
			values: Mutex::new(values),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn save(&self, values: &Map<String, Value>) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		let json = serde_json::to_string_pretty(values)?;
		fs::write(&self.path, json).map_err(|e| LaunchError::Store(format!("Failed to write {}: {}", self.path.display(), e)))
	}
}

impl KeyValueStore for JsonFileStore {
	fn get(&self, key: &str) -> Option<Value> {
		self.values.lock().get(key).cloned()
	}

	fn set(&self, key: &str, value: Value) -> Result<()> {
		let mut values = self.values.lock();
		values.insert(key.to_string(), value);
		self.save(&values)
	}

	fn remove(&self, key: &str) -> Result<()> {
		let mut values = self.values.lock();
		if values.remove(key).is_some() {
			self.save(&values)?;
		}
		Ok(())
	}

	fn clear(&self) -> Result<()> {
		let mut values = self.values.lock();
		values.clear();
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err.into()),
		}
	}

	fn entries(&self) -> Map<String, Value> {
		self.values.lock().clone()
	}
}

/// Default on-disk location of the store.
pub fn default_store_path() -> PathBuf {
	dirs::data_dir()
		.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
		.unwrap_or_else(|| PathBuf::from("."))
		.join("launchpad/store.json")
}
