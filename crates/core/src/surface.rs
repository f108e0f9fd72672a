//! Browsing-surface abstraction.
//!
//! The rendering engine is a platform collaborator. The session manager only
//! configures surfaces, issues navigations, and reacts to lifecycle callbacks
//! identified by a manager-assigned [`SurfaceId`].

use std::fmt;

use launchpad_protocol::CookieRecord;
use url::Url;

use crate::error::Result;

/// Manager-assigned surface identity; never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "surface-{}", self.0)
	}
}

/// Surface options applied before the first navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
	pub javascript_enabled: bool,
	pub inline_media_playback: bool,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Allow content to open new browsing contexts without a user gesture.
	pub popups_allowed: bool,
}

impl Default for SurfaceConfig {
	/// Scripts on, inline media on, zoom locked to 1.0.
	fn default() -> Self {
		Self {
			javascript_enabled: true,
			inline_media_playback: true,
			min_zoom: 1.0,
			max_zoom: 1.0,
			popups_allowed: true,
		}
	}
}

/// Reasons a provisional navigation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
	TooManyRedirects,
	Other(String),
}

impl fmt::Display for LoadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::TooManyRedirects => f.write_str("too many redirects"),
			Self::Other(message) => f.write_str(message),
		}
	}
}

/// A platform renderer instance.
pub trait BrowsingSurface: Send {
	fn configure(&mut self, config: &SurfaceConfig);

	fn load(&mut self, url: &Url);

	fn stop_loading(&mut self);

	fn can_go_back(&self) -> bool;

	fn go_back(&mut self);

	/// Runs `script` in the current document; results are ignored.
	fn evaluate_script(&mut self, script: &str);

	/// All cookies visible to this surface's storage area.
	fn cookies(&self) -> Vec<CookieRecord>;

	fn set_cookie(&mut self, cookie: &CookieRecord) -> Result<()>;
}

/// Creates platform surfaces on demand.
pub trait SurfaceFactory: Send {
	type Surface: BrowsingSurface;

	fn create(&mut self, id: SurfaceId) -> Self::Surface;
}

/// Hands non-web addresses (`tel:`, `mailto:`, app schemes) to the platform.
pub trait ExternalOpener: Send + Sync {
	/// Returns false when no handler accepted the address.
	fn open(&self, url: &Url) -> bool;
}

/// Content asked for a new browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupRequest {
	/// Requested address as supplied by the content; may be empty.
	pub address: String,
	/// The request names a frame that already exists.
	pub targets_existing_frame: bool,
}

impl PopupRequest {
	pub fn new(address: impl Into<String>) -> Self {
		Self {
			address: address.into(),
			targets_existing_frame: false,
		}
	}

	/// Address to load immediately, if the request carries a real one.
	pub fn initial_url(&self) -> Option<Url> {
		let address = self.address.trim();
		if address.is_empty() || address.eq_ignore_ascii_case("about:blank") {
			return None;
		}
		Url::parse(address).ok()
	}
}

/// Answer to a navigation-policy callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPolicy {
	Allow,
	Cancel,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_locks_zoom() {
		let config = SurfaceConfig::default();
		assert!(config.javascript_enabled);
		assert_eq!(config.min_zoom, 1.0);
		assert_eq!(config.max_zoom, 1.0);
	}

	#[test]
	fn blank_popups_have_no_initial_url() {
		assert_eq!(PopupRequest::new("").initial_url(), None);
		assert_eq!(PopupRequest::new("  ").initial_url(), None);
		assert_eq!(PopupRequest::new("about:blank").initial_url(), None);
		assert_eq!(PopupRequest::new("ABOUT:BLANK").initial_url(), None);
		assert_eq!(
			PopupRequest::new("https://pay.example/checkout").initial_url(),
			Some(Url::parse("https://pay.example/checkout").unwrap())
		);
	}
}
