//! Remote configuration client.

use std::time::Duration;

use async_trait::async_trait;
use launchpad_protocol::{ConfigRequest, ConfigResponse};
use tracing::debug;
use url::Url;

use crate::error::{LaunchError, Result, parse_url};

/// Interpreted configuration response.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigVerdict {
	Enabled { url: Url, expires: f64 },
	Disabled,
}

impl TryFrom<ConfigResponse> for ConfigVerdict {
	type Error = LaunchError;

	/// `ok: true` without a usable `url` and `expires` is malformed.
	fn try_from(response: ConfigResponse) -> Result<Self> {
		if !response.ok {
			return Ok(Self::Disabled);
		}
		let raw = response
			.url
			.filter(|u| !u.trim().is_empty())
			.ok_or_else(|| LaunchError::MalformedResponse("ok response without url".into()))?;
		let expires = response
			.expires
			.ok_or_else(|| LaunchError::MalformedResponse("ok response without expires".into()))?;
		let url = parse_url(raw.trim()).map_err(|e| LaunchError::MalformedResponse(e.to_string()))?;
		Ok(Self::Enabled { url, expires })
	}
}

/// Issues configuration queries.
#[async_trait]
pub trait ConfigClient: Send + Sync {
	async fn fetch(&self, request: &ConfigRequest) -> Result<ConfigResponse>;
}

/// `POST`s the request body as JSON with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpConfigClient {
	client: reqwest::Client,
	endpoint: Url,
}

impl HttpConfigClient {
	pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| LaunchError::Config(format!("Failed to create HTTP client: {}", e)))?;
		Ok(Self { client, endpoint })
	}
}

#[async_trait]
impl ConfigClient for HttpConfigClient {
	async fn fetch(&self, request: &ConfigRequest) -> Result<ConfigResponse> {
		debug!(target = "launchpad.resolver", endpoint = %self.endpoint, "sending configuration request");
		let response = self.client.post(self.endpoint.clone()).json(&request.body()).send().await?;

		let status = response.status();
		if !status.is_success() {
			return Err(LaunchError::Transport(format!("unexpected status {}", status)));
		}

		let body = response.text().await?;
		serde_json::from_str(&body).map_err(|e| LaunchError::MalformedResponse(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn response(ok: bool, url: Option<&str>, expires: Option<f64>) -> ConfigResponse {
		ConfigResponse {
			ok,
			url: url.map(String::from),
			expires,
		}
	}

	#[test]
	fn disabled_ignores_remaining_fields() {
		let verdict = ConfigVerdict::try_from(response(false, Some("https://x.example"), None)).unwrap();
		assert_eq!(verdict, ConfigVerdict::Disabled);
	}

	#[test]
	fn enabled_requires_url_and_expiry() {
		assert!(ConfigVerdict::try_from(response(true, None, Some(1.0))).is_err());
		assert!(ConfigVerdict::try_from(response(true, Some(""), Some(1.0))).is_err());
		assert!(ConfigVerdict::try_from(response(true, Some("https://x.example"), None)).is_err());
		assert!(ConfigVerdict::try_from(response(true, Some("not a url"), Some(1.0))).is_err());

		let verdict = ConfigVerdict::try_from(response(true, Some("https://content.example/a"), Some(42.0))).unwrap();
		assert_eq!(
			verdict,
			ConfigVerdict::Enabled {
				url: Url::parse("https://content.example/a").unwrap(),
				expires: 42.0
			}
		);
	}

	#[test]
	fn malformed_enabled_response_is_recoverable() {
		let err = ConfigVerdict::try_from(response(true, None, None)).unwrap_err();
		assert!(err.is_recoverable_transport());
	}
}
