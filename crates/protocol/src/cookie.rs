//! Cookie records and the persisted cookie snapshot shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque cookie attributes (`value`, `path`, `expires`, `secure`, ...).
pub type CookieProperties = Map<String, Value>;

/// Persisted cookies keyed by domain, then by cookie name.
pub type CookieSnapshot = BTreeMap<String, BTreeMap<String, CookieProperties>>;

/// A single cookie, unique by `(domain, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
	pub domain: String,
	pub name: String,
	#[serde(default)]
	pub properties: CookieProperties,
}

impl CookieRecord {
	pub fn new(domain: impl Into<String>, name: impl Into<String>, properties: CookieProperties) -> Self {
		Self {
			domain: domain.into(),
			name: name.into(),
			properties,
		}
	}

	/// Returns the `value` attribute when it is a string.
	pub fn value(&self) -> Option<&str> {
		self.properties.get("value").and_then(Value::as_str)
	}

	/// Returns the `(domain, name)` identity of this cookie.
	pub fn key(&self) -> (&str, &str) {
		(&self.domain, &self.name)
	}
}
