//! Per-surface redirect circuit breaker.

use tracing::{debug, warn};
use url::Url;

/// Redirects tolerated within one surface's lifetime.
pub const REDIRECT_LIMIT: u32 = 70;

/// What the surface must do after a server redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectVerdict {
	/// Under the limit; let the redirect proceed.
	Continue { count: u32 },
	/// Limit exceeded; stop and reload this address.
	Reload(Url),
	/// Limit exceeded with nothing to recover to; stop and stay idle.
	Halt,
}

/// Counts server redirects for one surface.
///
/// The count is never reset. A runaway loop trips the breaker on every
/// further redirect until the surface is destroyed.
#[derive(Debug, Clone)]
pub struct RedirectGuard {
	count: u32,
	limit: u32,
	last_good: Option<Url>,
}

impl Default for RedirectGuard {
	fn default() -> Self {
		Self::new()
	}
}

impl RedirectGuard {
	pub fn new() -> Self {
		Self::with_limit(REDIRECT_LIMIT)
	}

	pub fn with_limit(limit: u32) -> Self {
		Self {
			count: 0,
			limit,
			last_good: None,
		}
	}

	pub fn count(&self) -> u32 {
		self.count
	}

	pub fn last_good(&self) -> Option<&Url> {
		self.last_good.as_ref()
	}

	/// Records an address that passed the navigation policy.
	pub fn record_allowed(&mut self, url: &Url) {
		self.last_good = Some(url.clone());
	}

	pub fn record_redirect(&mut self) -> RedirectVerdict {
		self.count = self.count.saturating_add(1);
		if self.count <= self.limit {
			debug!(target = "launchpad.session", count = self.count, "server redirect");
			return RedirectVerdict::Continue { count: self.count };
		}

		match &self.last_good {
			Some(url) => {
				warn!(target = "launchpad.session", count = self.count, %url, "redirect limit exceeded; reloading last good address");
				RedirectVerdict::Reload(url.clone())
			}
			None => {
				warn!(target = "launchpad.session", count = self.count, "redirect limit exceeded; no address to recover to");
				RedirectVerdict::Halt
			}
		}
	}
}
