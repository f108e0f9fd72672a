//! The persisted launch decision.

use serde::{Deserialize, Serialize};
use url::Url;

/// Why the client was placed in fallback mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackReason {
	/// First launch classified as an organic install.
	Organic,
	/// The endpoint answered `ok: false`.
	ServerDisabled,
	/// The query failed and no usable stored address existed.
	QueryFailed,
}

impl FallbackReason {
	/// Sticky fallbacks are never re-queried on later launches.
	pub fn is_sticky(self) -> bool {
		!matches!(self, Self::QueryFailed)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Organic => "organic",
			Self::ServerDisabled => "serverDisabled",
			Self::QueryFailed => "queryFailed",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"organic" => Some(Self::Organic),
			"serverDisabled" => Some(Self::ServerDisabled),
			"queryFailed" => Some(Self::QueryFailed),
			_ => None,
		}
	}
}

/// Presentation mode chosen by the resolver.
///
/// `WebView` always carries its address, so a web-view decision without an
/// address cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchMode {
	WebView { url: Url, expires_at: Option<f64> },
	Fallback { reason: FallbackReason },
}

impl LaunchMode {
	pub fn web_view(url: Url, expires_at: f64) -> Self {
		Self::WebView {
			url,
			expires_at: Some(expires_at),
		}
	}

	pub fn fallback(reason: FallbackReason) -> Self {
		Self::Fallback { reason }
	}

	/// Returns the stored address for web-view decisions.
	pub fn url(&self) -> Option<&Url> {
		match self {
			Self::WebView { url, .. } => Some(url),
			Self::Fallback { .. } => None,
		}
	}

	/// True when a web-view address is still valid at `now` (epoch seconds).
	///
	/// An address stored without an expiry never expires.
	pub fn is_unexpired(&self, now: u64) -> bool {
		match self {
			Self::WebView { expires_at, .. } => expires_at.is_none_or(|expires| expires > now as f64),
			Self::Fallback { .. } => false,
		}
	}

	/// True for fallback decisions that must never be revisited.
	pub fn is_sticky_fallback(&self) -> bool {
		matches!(self, Self::Fallback { reason } if reason.is_sticky())
	}
}

/// Snapshot of everything persisted about the launch decision.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchDecision {
	pub mode: Option<LaunchMode>,
	pub has_launched_before: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn url() -> Url {
		Url::parse("https://content.example/a").unwrap()
	}

	#[test]
	fn expiry_is_compared_against_now() {
		let mode = LaunchMode::web_view(url(), 1_000.0);
		assert!(mode.is_unexpired(999));
		assert!(!mode.is_unexpired(1_000));
		assert!(!mode.is_unexpired(5_000));
	}

	#[test]
	fn missing_expiry_never_expires() {
		let mode = LaunchMode::WebView { url: url(), expires_at: None };
		assert!(mode.is_unexpired(u64::MAX));
	}

	#[test]
	fn only_query_failures_are_revisited() {
		assert!(LaunchMode::fallback(FallbackReason::Organic).is_sticky_fallback());
		assert!(LaunchMode::fallback(FallbackReason::ServerDisabled).is_sticky_fallback());
		assert!(!LaunchMode::fallback(FallbackReason::QueryFailed).is_sticky_fallback());
		assert!(!LaunchMode::web_view(url(), 1.0).is_sticky_fallback());
	}

	#[test]
	fn reasons_round_trip_through_their_names() {
		for reason in [FallbackReason::Organic, FallbackReason::ServerDisabled, FallbackReason::QueryFailed] {
			assert_eq!(FallbackReason::parse(reason.as_str()), Some(reason));
		}
		assert_eq!(FallbackReason::parse("bogus"), None);
	}
}
