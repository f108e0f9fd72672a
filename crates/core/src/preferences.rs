//! Typed access to the durable keys the bootstrap reads and writes.
//!
//! Every read tolerates absence and returns the documented default, so a
//! first launch (empty store) and a corrupted entry behave the same way.

use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::decision::{FallbackReason, LaunchDecision, LaunchMode};
use crate::error::Result;
use crate::store::KeyValueStore;

/// Durable key names.
pub mod keys {
	pub const LAUNCHED_BEFORE: &str = "hasLaunchedBefore";
	pub const LAUNCH_MODE: &str = "launchMode";
	pub const FALLBACK_REASON: &str = "fallbackReason";
	pub const RESOLVED_URL: &str = "resolvedUrl";
	pub const RESOLVED_URL_EXPIRES: &str = "resolvedUrlExpires";
	pub const OVERRIDE_URL: &str = "overrideUrl";
	pub const PUSH_GRANTED: &str = "pushPermissionGranted";
	pub const PUSH_DECLINED: &str = "pushPermissionDeclined";
	pub const PUSH_LAST_ASKED: &str = "pushPermissionLastAsked";
	pub const PUSH_TOKEN: &str = "pushToken";
	pub const DEVICE_ID: &str = "deviceId";
	pub const SAVED_COOKIES: &str = "savedCookies";
}

const MODE_WEB_VIEW: &str = "webview";
const MODE_FALLBACK: &str = "fallback";

/// Typed facade over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Preferences<S> {
	store: S,
}

impl<S: KeyValueStore> Preferences<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Defaults to `false`.
	pub fn has_launched_before(&self) -> bool {
		self.bool(keys::LAUNCHED_BEFORE)
	}

	pub fn mark_launched(&self) -> Result<()> {
		self.store.set(keys::LAUNCHED_BEFORE, json!(true))
	}

	/// Returns the persisted mode, or `None` when nothing usable is stored.
	///
	/// A web-view mode whose address no longer parses is treated as absent.
	pub fn mode(&self) -> Option<LaunchMode> {
		match self.string(keys::LAUNCH_MODE)?.as_str() {
			MODE_WEB_VIEW => {
				let raw = self.string(keys::RESOLVED_URL)?;
				let url = match Url::parse(&raw) {
					Ok(url) => url,
					Err(err) => {
						warn!(target = "launchpad.store", url = %raw, error = %err, "ignoring unparsable stored address");
						return None;
					}
				};
				let expires_at = self.store.get(keys::RESOLVED_URL_EXPIRES).and_then(|v| v.as_f64());
				Some(LaunchMode::WebView { url, expires_at })
			}
			MODE_FALLBACK => {
				let reason = self
					.string(keys::FALLBACK_REASON)
					.and_then(|raw| FallbackReason::parse(&raw))
					// Entries written before reasons existed were always sticky.
					.unwrap_or(FallbackReason::ServerDisabled);
				Some(LaunchMode::Fallback { reason })
			}
			other => {
				debug!(target = "launchpad.store", mode = other, "unknown stored mode");
				None
			}
		}
	}

	/// Overwrites the persisted mode. Only the resolver calls this.
	pub fn save_mode(&self, mode: &LaunchMode) -> Result<()> {
		match mode {
			LaunchMode::WebView { url, expires_at } => {
				self.store.set(keys::RESOLVED_URL, json!(url.as_str()))?;
				match expires_at {
					Some(expires) => self.store.set(keys::RESOLVED_URL_EXPIRES, json!(expires))?,
					None => self.store.remove(keys::RESOLVED_URL_EXPIRES)?,
				}
				self.store.remove(keys::FALLBACK_REASON)?;
				self.store.set(keys::LAUNCH_MODE, json!(MODE_WEB_VIEW))
			}
			LaunchMode::Fallback { reason } => {
				self.store.set(keys::FALLBACK_REASON, json!(reason.as_str()))?;
				self.store.set(keys::LAUNCH_MODE, json!(MODE_FALLBACK))
			}
		}
	}

	pub fn decision(&self) -> LaunchDecision {
		LaunchDecision {
			mode: self.mode(),
			has_launched_before: self.has_launched_before(),
		}
	}

	pub fn override_url(&self) -> Option<Url> {
		self.string(keys::OVERRIDE_URL).and_then(|raw| Url::parse(&raw).ok())
	}

	pub fn set_override_url(&self, url: &Url) -> Result<()> {
		self.store.set(keys::OVERRIDE_URL, json!(url.as_str()))
	}

	/// Returns and removes the one-shot override address.
	pub fn take_override_url(&self) -> Result<Option<Url>> {
		if self.store.get(keys::OVERRIDE_URL).is_none() {
			return Ok(None);
		}
		let url = self.override_url();
		self.store.remove(keys::OVERRIDE_URL)?;
		Ok(url)
	}

	pub fn push_token(&self) -> Option<String> {
		self.string(keys::PUSH_TOKEN)
	}

	pub fn set_push_token(&self, token: &str) -> Result<()> {
		self.store.set(keys::PUSH_TOKEN, json!(token))
	}

	pub fn device_id(&self) -> Option<String> {
		self.string(keys::DEVICE_ID)
	}

	pub fn set_device_id(&self, id: &str) -> Result<()> {
		self.store.set(keys::DEVICE_ID, json!(id))
	}

	pub(crate) fn bool(&self, key: &str) -> bool {
		self.store.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
	}

	pub(crate) fn u64(&self, key: &str) -> Option<u64> {
		self.store.get(key).and_then(|v| v.as_u64())
	}

	fn string(&self, key: &str) -> Option<String> {
		match self.store.get(key)? {
			Value::String(s) if !s.is_empty() => Some(s),
			_ => None,
		}
	}
}
