//! Attribution intake and organic-install classification.

use launchpad_protocol::AttributionFields;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Attribution data received once per install.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionSnapshot {
	pub fields: AttributionFields,
	/// Epoch seconds.
	pub received_at: u64,
}

impl AttributionSnapshot {
	pub fn from_raw(raw: Map<String, Value>, received_at: u64) -> Self {
		Self {
			fields: AttributionFields::from_raw(raw),
			received_at,
		}
	}
}

/// Terminal notification from the attribution collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributionOutcome {
	Success(AttributionSnapshot),
	Failure(String),
}

/// What the resolver learns from attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionVerdict {
	/// `None` when attribution failed and no classification is available.
	pub organic: Option<bool>,
	pub first_launch: bool,
	pub snapshot: Option<AttributionSnapshot>,
}

impl AttributionVerdict {
	/// True when this is the first launch of an organic install.
	pub fn requires_organic_fallback(&self) -> bool {
		self.first_launch && self.organic == Some(true)
	}

	/// Fields forwarded to the configuration endpoint.
	pub fn fields(&self) -> AttributionFields {
		self.snapshot.as_ref().map(|s| s.fields.clone()).unwrap_or_default()
	}
}

/// Accepts exactly one attribution outcome per install.
///
/// Later outcomes are ignored; retries belong to the collaborator.
#[derive(Debug)]
pub struct AttributionGate {
	first_launch: bool,
	verdict: Option<AttributionVerdict>,
}

impl AttributionGate {
	pub fn new(first_launch: bool) -> Self {
		Self {
			first_launch,
			verdict: None,
		}
	}

	/// Consumes `outcome`; returns the verdict only for the first call.
	pub fn accept(&mut self, outcome: AttributionOutcome) -> Option<&AttributionVerdict> {
		if self.verdict.is_some() {
			debug!(target = "launchpad.resolver", "attribution outcome already consumed; ignoring");
			return None;
		}

		let verdict = match outcome {
			AttributionOutcome::Success(snapshot) => {
				let organic = snapshot.fields.is_organic();
				info!(
					target = "launchpad.resolver",
					organic,
					first_launch = self.first_launch,
					status = ?snapshot.fields.af_status,
					"attribution received"
				);
				AttributionVerdict {
					organic: Some(organic),
					first_launch: self.first_launch,
					snapshot: Some(snapshot),
				}
			}
			AttributionOutcome::Failure(reason) => {
				info!(target = "launchpad.resolver", %reason, "attribution unavailable");
				AttributionVerdict {
					organic: None,
					first_launch: self.first_launch,
					snapshot: None,
				}
			}
		};

		self.verdict = Some(verdict);
		self.verdict.as_ref()
	}

	pub fn verdict(&self) -> Option<&AttributionVerdict> {
		self.verdict.as_ref()
	}
}
