//! Install-attribution fields as delivered by the attribution collaborator.
//!
//! The collaborator hands over a loosely typed dictionary. The fields the
//! bootstrap reasons about are lifted into typed slots; everything else is
//! preserved verbatim in [`AttributionFields::extra`] so it can be forwarded
//! to the configuration endpoint untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `af_status` value reported for installs without a paid acquisition source.
pub const ORGANIC_STATUS: &str = "Organic";

/// Attribution conversion data with typed known fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionFields {
	/// `Organic` or `Non-organic`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub af_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub af_message: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub media_source: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub campaign: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub campaign_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub adset: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub adgroup: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub af_channel: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub install_time: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub click_time: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_first_launch: Option<bool>,
	/// Unrecognized fields and known fields of an unexpected type, forwarded as-is.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl AttributionFields {
	/// Builds typed fields from the collaborator's raw dictionary.
	///
	/// A known field is lifted only when it carries the expected JSON type
	/// (a string, or a boolean for `is_first_launch`). Any other value stays
	/// in `extra` unchanged, so [`Self::to_raw`] reproduces the input.
	pub fn from_raw(raw: Map<String, Value>) -> Self {
		let mut fields = Self::default();
		for (key, value) in raw {
			if key == "is_first_launch" {
				match value {
					Value::Bool(flag) => fields.is_first_launch = Some(flag),
					other => {
						fields.extra.insert(key, other);
					}
				}
				continue;
			}

			let slot = match key.as_str() {
				"af_status" => Some(&mut fields.af_status),
				"af_message" => Some(&mut fields.af_message),
				"media_source" => Some(&mut fields.media_source),
				"campaign" => Some(&mut fields.campaign),
				"campaign_id" => Some(&mut fields.campaign_id),
				"adset" => Some(&mut fields.adset),
				"adgroup" => Some(&mut fields.adgroup),
				"af_channel" => Some(&mut fields.af_channel),
				"install_time" => Some(&mut fields.install_time),
				"click_time" => Some(&mut fields.click_time),
				_ => None,
			};

			match (slot, value) {
				(Some(slot), Value::String(s)) => *slot = Some(s),
				(_, other) => {
					fields.extra.insert(key, other);
				}
			}
		}
		fields
	}

	/// First-launch flag, accepting a boolean or a `"true"`/`"false"` string.
	pub fn first_launch(&self) -> Option<bool> {
		self.is_first_launch.or_else(|| match self.extra.get("is_first_launch") {
			Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
			Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
			_ => None,
		})
	}

	/// Flattens the fields back into a JSON object, known fields included.
	pub fn to_raw(&self) -> Map<String, Value> {
		let mut map = self.extra.clone();
		let known = [
			("af_status", &self.af_status),
			("af_message", &self.af_message),
			("media_source", &self.media_source),
			("campaign", &self.campaign),
			("campaign_id", &self.campaign_id),
			("adset", &self.adset),
			("adgroup", &self.adgroup),
			("af_channel", &self.af_channel),
			("install_time", &self.install_time),
			("click_time", &self.click_time),
		];
		for (key, value) in known {
			if let Some(value) = value {
				map.insert(key.to_string(), Value::String(value.clone()));
			}
		}
		if let Some(first) = self.is_first_launch {
			map.insert("is_first_launch".to_string(), Value::Bool(first));
		}
		map
	}

	/// Returns true when the install source is classified as organic.
	pub fn is_organic(&self) -> bool {
		self.af_status.as_deref().is_some_and(|status| status.eq_ignore_ascii_case(ORGANIC_STATUS))
	}
}
