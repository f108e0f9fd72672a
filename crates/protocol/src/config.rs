//! Remote configuration request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attribution::AttributionFields;

/// Platform tag sent as `os`.
pub const PLATFORM_TAG: &str = "iOS";

/// Configuration query sent as a JSON `POST` body.
///
/// On the wire the attribution fields are flattened into the same object as
/// the device fields. Device fields win when an attribution field carries
/// the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRequest {
	pub attribution: AttributionFields,
	/// Attribution-network device id.
	pub af_id: String,
	pub bundle_id: String,
	pub os: String,
	/// Store catalog identifier.
	pub store_id: String,
	/// Two-letter, uppercased.
	pub locale: String,
	pub push_token: Option<String>,
	pub firebase_project_id: Option<String>,
}

impl ConfigRequest {
	/// Builds the JSON object posted to the endpoint.
	pub fn body(&self) -> Value {
		let mut body = self.attribution.to_raw();
		insert_str(&mut body, "af_id", &self.af_id);
		insert_str(&mut body, "bundle_id", &self.bundle_id);
		insert_str(&mut body, "os", &self.os);
		insert_str(&mut body, "store_id", &self.store_id);
		insert_str(&mut body, "locale", &self.locale);
		if let Some(token) = &self.push_token {
			insert_str(&mut body, "push_token", token);
		}
		if let Some(project) = &self.firebase_project_id {
			insert_str(&mut body, "firebase_project_id", project);
		}
		Value::Object(body)
	}
}

fn insert_str(body: &mut Map<String, Value>, key: &str, value: &str) {
	body.insert(key.to_string(), Value::String(value.to_string()));
}

/// Configuration endpoint response.
///
/// ```json
/// { "ok": true, "url": "https://content.example/a", "expires": 1735689600 }
/// ```
///
/// `url` and `expires` are only meaningful when `ok` is true. `expires` is
/// an opaque comparator against the current epoch time in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
	pub ok: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires: Option<f64>,
}
