//! Error types for bootstrap resolution and content delivery.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the launchpad subsystems.
///
/// None of these are fatal to the process: the resolver folds transport,
/// malformed-response and timeout errors into a terminal presentation mode.
#[derive(Debug, Error)]
pub enum LaunchError {
	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Malformed configuration response: {0}")]
	MalformedResponse(String),

	#[error("Configuration request timed out after {0:?}")]
	Timeout(Duration),

	#[error("Store error: {0}")]
	Store(String),

	#[error("Invalid URL '{url}': {source}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	#[error("Configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl LaunchError {
	/// Returns true for failures the resolver recovers from locally.
	///
	/// Covers transport errors, timeouts and malformed bodies.
	pub fn is_recoverable_transport(&self) -> bool {
		matches!(self, Self::Transport(_) | Self::MalformedResponse(_) | Self::Timeout(_))
	}
}

impl From<reqwest::Error> for LaunchError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			Self::MalformedResponse(err.to_string())
		} else {
			Self::Transport(err.to_string())
		}
	}
}

pub type Result<T> = std::result::Result<T, LaunchError>;

/// Parses `raw` as an absolute URL.
pub fn parse_url(raw: &str) -> Result<url::Url> {
	url::Url::parse(raw).map_err(|source| LaunchError::InvalidUrl { url: raw.to_string(), source })
}
