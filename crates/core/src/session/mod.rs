//! Content session management.
//!
//! [`ContentSessionManager`] owns one primary browsing surface plus a stack of
//! auxiliary surfaces spawned by content pop-ups. It answers navigation-policy
//! callbacks, runs each surface's [`RedirectGuard`], and checkpoints cookies
//! into the [`CookieVault`].
//!
//! All callbacks run on the caller's UI context and return immediately; the
//! navigation policy always produces a decision.

use tracing::{debug, info, warn};
use url::Url;

use crate::cookies::CookieVault;
use crate::redirect::{RedirectGuard, RedirectVerdict};
use crate::store::KeyValueStore;
use crate::surface::{BrowsingSurface, ExternalOpener, LoadError, NavigationPolicy, PopupRequest, SurfaceConfig, SurfaceFactory, SurfaceId};

/// Injected after every completed navigation. Guarded by element ids, so
/// re-running it on the same document changes nothing.
pub const LOAD_FINISHED_SCRIPT: &str = include_str!("viewport.js");

/// Result of a back gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
	/// The topmost auxiliary surface was removed.
	Closed(SurfaceId),
	/// No auxiliary surfaces; the primary surface navigated back.
	NavigatedBack,
	/// Nothing to dismiss and no back history.
	Ignored,
}

/// How a failed provisional navigation was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRecovery {
	Reloaded(Url),
	/// Terminal failure for this surface; report it to the caller.
	Failed(LoadError),
}

struct Slot<T> {
	id: SurfaceId,
	surface: T,
	guard: RedirectGuard,
}

/// Owner of every browsing surface in a content session.
pub struct ContentSessionManager<F: SurfaceFactory, O, S> {
	factory: F,
	opener: O,
	vault: CookieVault<S>,
	config: SurfaceConfig,
	next_id: u64,
	primary: Option<Slot<F::Surface>>,
	/// Most recently created last.
	auxiliaries: Vec<Slot<F::Surface>>,
}

impl<F, O, S> ContentSessionManager<F, O, S>
where
	F: SurfaceFactory,
	O: ExternalOpener,
	S: KeyValueStore,
{
	pub fn new(factory: F, opener: O, vault: CookieVault<S>) -> Self {
		Self::with_config(factory, opener, vault, SurfaceConfig::default())
	}

	pub fn with_config(factory: F, opener: O, vault: CookieVault<S>, config: SurfaceConfig) -> Self {
		Self {
			factory,
			opener,
			vault,
			config,
			next_id: 0,
			primary: None,
			auxiliaries: Vec::new(),
		}
	}

	/// Loads `url` in the primary surface, creating it on first use.
	///
	/// A new primary surface is configured and gets the stored cookies
	/// before its first navigation.
	pub fn load_primary(&mut self, url: &Url) -> SurfaceId {
		let mut primary = match self.primary.take() {
			Some(slot) => slot,
			None => {
				let mut slot = self.create_slot();
				let restored = self.vault.restore(&mut slot.surface);
				info!(target = "launchpad.session", surface = %slot.id, cookies = restored, "primary surface created");
				slot
			}
		};

		info!(target = "launchpad.session", surface = %primary.id, %url, "loading primary surface");
		primary.surface.load(url);
		let id = primary.id;
		self.primary = Some(primary);
		id
	}

	/// Opens an auxiliary surface for a content pop-up.
	///
	/// Returns `None` when pop-ups are disabled or the request targets an
	/// existing frame. Blank requests get an empty surface that the content
	/// populates itself.
	pub fn handle_popup_request(&mut self, request: &PopupRequest) -> Option<SurfaceId> {
		if !self.config.popups_allowed {
			debug!(target = "launchpad.session", address = %request.address, "pop-ups disabled; ignoring");
			return None;
		}
		if request.targets_existing_frame {
			debug!(target = "launchpad.session", address = %request.address, "pop-up targets an existing frame; ignoring");
			return None;
		}

		let mut slot = self.create_slot();
		let id = slot.id;
		match request.initial_url() {
			Some(url) => {
				info!(target = "launchpad.session", surface = %id, %url, "opening pop-up");
				slot.surface.load(&url);
			}
			None => info!(target = "launchpad.session", surface = %id, "opening blank pop-up"),
		}
		self.auxiliaries.push(slot);
		Some(id)
	}

	/// Back gesture: pops the top auxiliary surface, else navigates the
	/// primary surface back.
	pub fn dismiss_top_auxiliary(&mut self) -> Dismissal {
		if let Some(slot) = self.auxiliaries.pop() {
			info!(target = "launchpad.session", surface = %slot.id, remaining = self.auxiliaries.len(), "auxiliary surface dismissed");
			return Dismissal::Closed(slot.id);
		}

		match self.primary.as_mut() {
			Some(primary) if primary.surface.can_go_back() => {
				debug!(target = "launchpad.session", surface = %primary.id, "navigating primary surface back");
				primary.surface.go_back();
				Dismissal::NavigatedBack
			}
			_ => Dismissal::Ignored,
		}
	}

	/// Content closed one of its own pop-ups.
	pub fn handle_close_request(&mut self, id: SurfaceId) -> bool {
		match self.auxiliaries.iter().position(|slot| slot.id == id) {
			Some(index) => {
				self.auxiliaries.remove(index);
				info!(target = "launchpad.session", surface = %id, remaining = self.auxiliaries.len(), "auxiliary surface closed by content");
				true
			}
			None => {
				debug!(target = "launchpad.session", surface = %id, "close request for unknown or primary surface; ignoring");
				false
			}
		}
	}

	/// Navigation policy: web schemes stay in-surface, everything else goes
	/// to the platform handler.
	pub fn on_navigation_decision(&mut self, id: SurfaceId, url: &Url) -> NavigationPolicy {
		match url.scheme() {
			"http" | "https" => {
				match self.slot_mut(id) {
					Some(slot) => slot.guard.record_allowed(url),
					None => debug!(target = "launchpad.session", surface = %id, %url, "navigation on unknown surface"),
				}
				NavigationPolicy::Allow
			}
			"about" | "data" | "blob" => NavigationPolicy::Allow,
			scheme => {
				let opened = self.opener.open(url);
				info!(target = "launchpad.session", surface = %id, scheme, opened, "handing address to external handler");
				NavigationPolicy::Cancel
			}
		}
	}

	/// Redirect checkpoint: counts the redirect and snapshots cookies.
	pub fn on_server_redirect(&mut self, id: SurfaceId) -> Option<RedirectVerdict> {
		let verdict = {
			let slot = self.slot_mut(id)?;
			let verdict = slot.guard.record_redirect();
			match &verdict {
				RedirectVerdict::Continue { .. } => {}
				RedirectVerdict::Reload(url) => {
					slot.surface.stop_loading();
					slot.surface.load(url);
				}
				RedirectVerdict::Halt => slot.surface.stop_loading(),
			}
			verdict
		};

		self.checkpoint_cookies(id);
		Some(verdict)
	}

	/// Re-applies the viewport and gesture lock after every completed load.
	pub fn on_load_finished(&mut self, id: SurfaceId) {
		match self.slot_mut(id) {
			Some(slot) => slot.surface.evaluate_script(LOAD_FINISHED_SCRIPT),
			None => debug!(target = "launchpad.session", surface = %id, "load finished on unknown surface"),
		}
	}

	pub fn on_provisional_navigation_failed(&mut self, id: SurfaceId, error: &LoadError) -> LoadRecovery {
		let Some(slot) = self.slot_mut(id) else {
			return LoadRecovery::Failed(error.clone());
		};

		if *error == LoadError::TooManyRedirects {
			if let Some(url) = slot.guard.last_good().cloned() {
				warn!(target = "launchpad.session", surface = %id, %url, "redirect loop reported by surface; reloading last good address");
				slot.surface.load(&url);
				return LoadRecovery::Reloaded(url);
			}
		}

		warn!(target = "launchpad.session", surface = %id, %error, "navigation failed");
		LoadRecovery::Failed(error.clone())
	}

	/// Final cookie snapshot, then destroys every surface.
	///
	/// Returns the number of surfaces destroyed.
	pub fn teardown(&mut self) -> usize {
		if let Some(id) = self.primary.as_ref().map(|slot| slot.id) {
			self.checkpoint_cookies(id);
		}
		let destroyed = self.auxiliaries.len() + usize::from(self.primary.is_some());
		self.auxiliaries.clear();
		self.primary = None;
		info!(target = "launchpad.session", destroyed, "content session torn down");
		destroyed
	}

	pub fn primary_id(&self) -> Option<SurfaceId> {
		self.primary.as_ref().map(|slot| slot.id)
	}

	/// The surface currently receiving dismissal gestures.
	pub fn topmost(&self) -> Option<SurfaceId> {
		self.auxiliaries.last().or(self.primary.as_ref()).map(|slot| slot.id)
	}

	pub fn auxiliary_ids(&self) -> Vec<SurfaceId> {
		self.auxiliaries.iter().map(|slot| slot.id).collect()
	}

	pub fn surface(&self, id: SurfaceId) -> Option<&F::Surface> {
		self.slot(id).map(|slot| &slot.surface)
	}

	pub fn redirect_count(&self, id: SurfaceId) -> Option<u32> {
		self.slot(id).map(|slot| slot.guard.count())
	}

	pub fn vault(&self) -> &CookieVault<S> {
		&self.vault
	}

	fn create_slot(&mut self) -> Slot<F::Surface> {
		self.next_id += 1;
		let id = SurfaceId(self.next_id);
		let mut surface = self.factory.create(id);
		surface.configure(&self.config);
		Slot {
			id,
			surface,
			guard: RedirectGuard::new(),
		}
	}

	fn checkpoint_cookies(&self, id: SurfaceId) {
		let Some(slot) = self.slot(id) else { return };
		if let Err(err) = self.vault.snapshot(&slot.surface) {
			warn!(target = "launchpad.cookies", surface = %id, error = %err, "cookie snapshot failed");
		}
	}

	fn slot(&self, id: SurfaceId) -> Option<&Slot<F::Surface>> {
		self.primary.iter().chain(self.auxiliaries.iter()).find(|slot| slot.id == id)
	}

	fn slot_mut(&mut self, id: SurfaceId) -> Option<&mut Slot<F::Surface>> {
		self.primary.iter_mut().chain(self.auxiliaries.iter_mut()).find(|slot| slot.id == id)
	}
}
