//! Cookie persistence across sessions and restarts.

use launchpad_protocol::{CookieRecord, CookieSnapshot};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::preferences::keys;
use crate::store::KeyValueStore;
use crate::surface::BrowsingSurface;

/// Mirrors surface cookies into the durable store under one key.
#[derive(Debug, Clone)]
pub struct CookieVault<S> {
	store: S,
}

impl<S: KeyValueStore> CookieVault<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// Overwrites the stored snapshot with every cookie `surface` can see.
	///
	/// Returns the number of distinct `(domain, name)` pairs written.
	pub fn snapshot(&self, surface: &dyn BrowsingSurface) -> Result<usize> {
		let mut snapshot = CookieSnapshot::new();
		for cookie in surface.cookies() {
			snapshot.entry(cookie.domain).or_default().insert(cookie.name, cookie.properties);
		}
		let written = snapshot.values().map(|names| names.len()).sum();

		self.store.set(keys::SAVED_COOKIES, serde_json::to_value(&snapshot)?)?;
		debug!(target = "launchpad.cookies", cookies = written, domains = snapshot.len(), "cookie snapshot written");
		Ok(written)
	}

	/// Re-applies stored cookies to `surface`; malformed entries are skipped.
	///
	/// Returns the number of cookies applied.
	pub fn restore(&self, surface: &mut dyn BrowsingSurface) -> usize {
		let mut applied = 0;
		for cookie in self.records() {
			match surface.set_cookie(&cookie) {
				Ok(()) => applied += 1,
				Err(err) => {
					warn!(target = "launchpad.cookies", domain = %cookie.domain, name = %cookie.name, error = %err, "failed to restore cookie")
				}
			}
		}
		if applied > 0 {
			info!(target = "launchpad.cookies", cookies = applied, "cookies restored");
		}
		applied
	}

	/// Stored snapshot with malformed entries dropped.
	pub fn load(&self) -> CookieSnapshot {
		let mut snapshot = CookieSnapshot::new();
		for cookie in self.records() {
			snapshot.entry(cookie.domain).or_default().insert(cookie.name, cookie.properties);
		}
		snapshot
	}

	pub fn clear(&self) -> Result<()> {
		self.store.remove(keys::SAVED_COOKIES)
	}

	fn records(&self) -> Vec<CookieRecord> {
		let Some(raw) = self.store.get(keys::SAVED_COOKIES) else {
			return Vec::new();
		};
		let Value::Object(domains) = raw else {
			warn!(target = "launchpad.cookies", "stored cookie snapshot is not an object; ignoring");
			return Vec::new();
		};

		let mut records = Vec::new();
		for (domain, names) in domains {
			let Value::Object(names) = names else {
				debug!(target = "launchpad.cookies", %domain, "skipping malformed cookie domain");
				continue;
			};
			for (name, properties) in names {
				match properties {
					Value::Object(properties) if !domain.is_empty() && !name.is_empty() => {
						records.push(CookieRecord::new(domain.clone(), name, properties));
					}
					_ => debug!(target = "launchpad.cookies", %domain, %name, "skipping malformed cookie"),
				}
			}
		}
		records
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::fake::FakeSurface;
	use crate::store::MemoryStore;

	fn cookie(domain: &str, name: &str, value: &str) -> CookieRecord {
		let Value::Object(properties) = json!({ "value": value, "path": "/" }) else { unreachable!() };
		CookieRecord::new(domain, name, properties)
	}

	#[test]
	fn last_write_wins_within_domain_and_name() {
		let vault = CookieVault::new(MemoryStore::new());
		let surface = FakeSurface::with_cookies(vec![
			cookie("content.example", "session", "old"),
			cookie("content.example", "session", "new"),
			cookie("cdn.example", "session", "cdn"),
		]);

		assert_eq!(vault.snapshot(&surface).unwrap(), 2);
		let stored = vault.load();
		assert_eq!(stored["content.example"]["session"]["value"], "new");
		assert_eq!(stored["cdn.example"]["session"]["value"], "cdn");
	}

	#[test]
	fn snapshot_overwrites_instead_of_merging() {
		let vault = CookieVault::new(MemoryStore::new());
		vault.snapshot(&FakeSurface::with_cookies(vec![cookie("a.example", "x", "1")])).unwrap();
		vault.snapshot(&FakeSurface::with_cookies(vec![cookie("b.example", "y", "2")])).unwrap();

		let stored = vault.load();
		assert!(!stored.contains_key("a.example"));
		assert!(stored.contains_key("b.example"));
	}

	#[test]
	fn restore_skips_malformed_entries() {
		let store = MemoryStore::new();
		store
			.set(
				keys::SAVED_COOKIES,
				json!({
					"content.example": {
						"session": { "value": "abc" },
						"broken": "not-an-object",
					},
					"bad.example": 42,
				}),
			)
			.unwrap();
		let vault = CookieVault::new(store);
		let mut surface = FakeSurface::new();

		assert_eq!(vault.restore(&mut surface), 1);
		let restored = surface.cookies();
		assert_eq!(restored.len(), 1);
		assert_eq!(restored[0].key(), ("content.example", "session"));
		assert_eq!(restored[0].value(), Some("abc"));
	}

	#[test]
	fn round_trip_preserves_every_pair() {
		let vault = CookieVault::new(MemoryStore::new());
		let original = vec![
			cookie("content.example", "session", "abc"),
			cookie("content.example", "csrf", "def"),
			cookie("auth.example", "token", "ghi"),
		];
		vault.snapshot(&FakeSurface::with_cookies(original.clone())).unwrap();

		let mut fresh = FakeSurface::new();
		vault.restore(&mut fresh);

		let mut restored = fresh.cookies();
		let mut expected = original;
		restored.sort_by(|a, b| a.key().cmp(&b.key()));
		expected.sort_by(|a, b| a.key().cmp(&b.key()));
		assert_eq!(restored, expected);
	}

	#[test]
	fn missing_snapshot_restores_nothing() {
		let vault = CookieVault::new(MemoryStore::new());
		assert_eq!(vault.restore(&mut FakeSurface::new()), 0);
		assert!(vault.load().is_empty());
	}
}
