//! Bootstrap resolution state machine.
//!
//! [`ConfigResolver`] combines the attribution verdict, the persisted prior
//! decision, reachability and one remote configuration query into a single
//! presentation mode, and is the only writer of the persisted decision.
//!
//! # Transitions
//!
//! 1. A sticky persisted fallback short-circuits to `Fallback`.
//! 2. First launch + organic attribution persists and enters `Fallback`.
//! 3. A pending one-shot override address enters `WebView` without a query.
//!    One that arrives later is consumed by the next query or by the
//!    presented content, whichever comes first.
//! 4. An undecided push permission outside its cooldown parks the machine in
//!    `AwaitingPermissionDecision` until the caller answers.
//! 5. `Querying` issues exactly one request; success persists `WebView`,
//!    disablement persists `Fallback`, and failures degrade to a stored
//!    address (see [`StaleAddressPolicy`]) or `Fallback`. Only transport
//!    failures ([`LaunchError::is_recoverable_transport`]) persist it.
//! 6. Connectivity loss while presenting `WebView` enters `Offline`; the
//!    restore signal re-queries or returns to the last presented address.
//!
//! Every path ends in `WebView`, `Fallback` or `Offline`; no failure leaves
//! the machine without a presentable state.
//!
//! The machine itself is sequential. [`ResolverHandle`] serializes inbound
//! signals onto one task so at most one query is ever in flight.

mod handle;

use std::sync::Arc;
use std::time::Duration;

use launchpad_protocol::{ConfigRequest, PLATFORM_TAG};
use tracing::{debug, info, warn};
use url::Url;

pub use handle::{ResolverEvent, ResolverHandle};

use crate::attribution::{AttributionGate, AttributionOutcome, AttributionVerdict};
use crate::client::{ConfigClient, ConfigVerdict};
use crate::clock::Clock;
use crate::config::{LaunchConfig, StaleAddressPolicy};
use crate::decision::{FallbackReason, LaunchMode};
use crate::error::LaunchError;
use crate::permission::{PermissionAnswer, PermissionLedger};
use crate::preferences::Preferences;
use crate::reachability::Reachability;
use crate::store::KeyValueStore;

/// Observable resolver state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
	Loading,
	ResolvingAttribution,
	AwaitingPermissionDecision,
	Querying,
	/// Present remote content at this address.
	WebView(Url),
	/// Present the local placeholder experience.
	Fallback,
	/// Connectivity lost while presenting remote content.
	Offline,
}

impl ResolverState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::WebView(_) | Self::Fallback | Self::Offline)
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Loading => "loading",
			Self::ResolvingAttribution => "resolvingAttribution",
			Self::AwaitingPermissionDecision => "awaitingPermissionDecision",
			Self::Querying => "querying",
			Self::WebView(_) => "webView",
			Self::Fallback => "fallback",
			Self::Offline => "offline",
		}
	}
}

/// Request-side settings fixed for the lifetime of a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
	/// Attribution-network device id, sent as `af_id`.
	pub device_id: String,
	pub bundle_id: String,
	pub store_id: String,
	pub locale: String,
	pub firebase_project_id: Option<String>,
	pub request_timeout: Duration,
	pub stale_address_policy: StaleAddressPolicy,
}

impl ResolverSettings {
	pub fn from_config(config: &LaunchConfig, device_id: impl Into<String>) -> Self {
		Self {
			device_id: device_id.into(),
			bundle_id: config.bundle_id.clone(),
			store_id: config.store_id.clone(),
			locale: config.resolved_locale(),
			firebase_project_id: config.firebase_project_id.clone(),
			request_timeout: config.request_timeout(),
			stale_address_policy: config.stale_address_policy,
		}
	}
}

/// The bootstrap state machine.
pub struct ConfigResolver<S, C> {
	prefs: Preferences<S>,
	client: C,
	clock: Arc<dyn Clock>,
	settings: ResolverSettings,
	state: ResolverState,
	gate: AttributionGate,
	push_token: Option<String>,
	reachable: bool,
	/// Last `WebView`/`Fallback` state handed to the caller.
	last_presented: Option<ResolverState>,
	/// The presented mode did not come from a successful query.
	degraded: bool,
}

impl<S: KeyValueStore, C: ConfigClient> ConfigResolver<S, C> {
	pub fn new(store: S, client: C, settings: ResolverSettings, clock: Arc<dyn Clock>) -> Self {
		let prefs = Preferences::new(store);
		let first_launch = !prefs.has_launched_before();
		let push_token = prefs.push_token();
		Self {
			prefs,
			client,
			clock,
			settings,
			state: ResolverState::Loading,
			gate: AttributionGate::new(first_launch),
			push_token,
			reachable: true,
			last_presented: None,
			degraded: false,
		}
	}

	pub fn state(&self) -> &ResolverState {
		&self.state
	}

	pub fn preferences(&self) -> &Preferences<S> {
		&self.prefs
	}

	/// Leaves `Loading` and starts waiting for attribution.
	pub fn start(&mut self) -> ResolverState {
		if self.state == ResolverState::Loading {
			self.transition(ResolverState::ResolvingAttribution);
		}
		self.state.clone()
	}

	/// Dispatches one inbound signal.
	pub async fn handle(&mut self, event: ResolverEvent) -> ResolverState {
		match event {
			ResolverEvent::Attribution(outcome) => self.on_attribution(outcome).await,
			ResolverEvent::Permission(answer) => self.on_permission(answer).await,
			ResolverEvent::Connectivity(status) => self.on_connectivity(status).await,
			ResolverEvent::DeepLink(url) => self.on_deep_link(url),
			ResolverEvent::PushToken(token) => self.on_push_token(token),
		}
	}

	/// Consumes the attribution outcome and runs rules 1–5.
	pub async fn on_attribution(&mut self, outcome: AttributionOutcome) -> ResolverState {
		let Some(verdict) = self.gate.accept(outcome).cloned() else {
			return self.state.clone();
		};
		if !matches!(self.state, ResolverState::Loading | ResolverState::ResolvingAttribution) {
			debug!(target = "launchpad.resolver", state = self.state.name(), "attribution arrived after resolution; ignoring");
			return self.state.clone();
		}
		self.resolve(&verdict).await;
		self.state.clone()
	}

	/// Records the caller's prompt outcome and proceeds to the query.
	pub async fn on_permission(&mut self, answer: PermissionAnswer) -> ResolverState {
		if self.state != ResolverState::AwaitingPermissionDecision {
			debug!(target = "launchpad.resolver", ?answer, state = self.state.name(), "unsolicited permission answer; ignoring");
			return self.state.clone();
		}
		let now = self.clock.now_ts();
		if let Err(err) = PermissionLedger::new(&self.prefs).record(answer, now) {
			warn!(target = "launchpad.resolver", error = %err, "failed to persist permission answer");
		}
		self.query().await;
		self.state.clone()
	}

	pub async fn on_connectivity(&mut self, status: Reachability) -> ResolverState {
		let was_reachable = self.reachable;
		self.reachable = status.is_satisfied();
		if was_reachable == self.reachable {
			return self.state.clone();
		}

		let presenting_web = matches!(self.state, ResolverState::WebView(_));
		let offline = self.state == ResolverState::Offline;
		match status {
			Reachability::Unsatisfied if presenting_web => self.transition(ResolverState::Offline),
			Reachability::Unsatisfied => {
				debug!(target = "launchpad.resolver", state = self.state.name(), "connectivity lost outside web content; deferring");
			}
			Reachability::Satisfied if offline => {
				if self.degraded {
					info!(target = "launchpad.resolver", "connectivity restored; re-querying");
					self.query().await;
				} else if let Some(last) = self.last_presented.clone() {
					info!(target = "launchpad.resolver", "connectivity restored; resuming last mode");
					self.transition(last);
				}
			}
			Reachability::Satisfied => {}
		}
		self.state.clone()
	}

	/// Stores a one-shot override; switches immediately when already presenting.
	///
	/// While `Offline` the override replaces the address resumed on restore.
	pub fn on_deep_link(&mut self, url: Url) -> ResolverState {
		if let Err(err) = self.prefs.set_override_url(&url) {
			warn!(target = "launchpad.resolver", error = %err, "failed to persist override address");
		}
		if matches!(self.state, ResolverState::WebView(_) | ResolverState::Offline) {
			if let Some(url) = self.take_override() {
				self.present(ResolverState::WebView(url));
			}
		}
		self.state.clone()
	}

	pub fn on_push_token(&mut self, token: String) -> ResolverState {
		if let Err(err) = self.prefs.set_push_token(&token) {
			warn!(target = "launchpad.resolver", error = %err, "failed to persist push token");
		}
		self.push_token = Some(token);
		self.state.clone()
	}

	async fn resolve(&mut self, verdict: &AttributionVerdict) {
		if let Some(mode) = self.prefs.mode().filter(LaunchMode::is_sticky_fallback) {
			info!(target = "launchpad.resolver", ?mode, "sticky fallback persisted");
			self.present(ResolverState::Fallback);
			return;
		}

		if verdict.requires_organic_fallback() {
			self.persist(&LaunchMode::fallback(FallbackReason::Organic));
			self.present(ResolverState::Fallback);
			return;
		}

		if let Some(url) = self.take_override() {
			self.present(ResolverState::WebView(url));
			return;
		}

		if PermissionLedger::new(&self.prefs).should_ask(self.clock.now_ts()) {
			self.transition(ResolverState::AwaitingPermissionDecision);
			return;
		}

		self.query().await;
	}

	async fn query(&mut self) {
		// A deep link may have arrived while parked on the prompt or offline.
		if let Some(url) = self.take_override() {
			self.present(ResolverState::WebView(url));
			return;
		}
		self.transition(ResolverState::Querying);

		let request = self.build_request();
		let outcome = match tokio::time::timeout(self.settings.request_timeout, self.client.fetch(&request)).await {
			Ok(result) => result.and_then(ConfigVerdict::try_from),
			Err(_) => Err(LaunchError::Timeout(self.settings.request_timeout)),
		};

		match outcome {
			Ok(ConfigVerdict::Enabled { url, expires }) => {
				info!(target = "launchpad.resolver", %url, expires, "content enabled");
				self.persist(&LaunchMode::web_view(url.clone(), expires));
				self.degraded = false;
				self.present(ResolverState::WebView(url));
			}
			Ok(ConfigVerdict::Disabled) => {
				info!(target = "launchpad.resolver", "content disabled by endpoint");
				self.persist(&LaunchMode::fallback(FallbackReason::ServerDisabled));
				self.degraded = false;
				self.present(ResolverState::Fallback);
			}
			Err(err) => self.degrade(err),
		}
	}

	/// Consumes the pending one-shot override, if any.
	fn take_override(&mut self) -> Option<Url> {
		match self.prefs.take_override_url() {
			Ok(Some(url)) => {
				info!(target = "launchpad.resolver", %url, "using one-shot override address");
				self.degraded = false;
				Some(url)
			}
			Ok(None) => None,
			Err(err) => {
				warn!(target = "launchpad.resolver", error = %err, "failed to consume override address");
				None
			}
		}
	}

	fn degrade(&mut self, err: LaunchError) {
		let recoverable = err.is_recoverable_transport();
		if recoverable {
			warn!(target = "launchpad.resolver", error = %err, "configuration query failed");
		} else {
			warn!(target = "launchpad.resolver", error = %err, "configuration client failed outside transport; decision left unpersisted");
		}
		self.degraded = true;

		let now = self.clock.now_ts();
		let stored = self.prefs.mode();
		if let Some(url) = stored.as_ref().and_then(LaunchMode::url).cloned() {
			let fresh = stored.as_ref().is_some_and(|mode| mode.is_unexpired(now));
			if fresh || self.settings.stale_address_policy == StaleAddressPolicy::UseStale {
				info!(target = "launchpad.resolver", %url, stale = !fresh, "reusing stored address");
				self.present(ResolverState::WebView(url));
				return;
			}
			debug!(target = "launchpad.resolver", %url, "stored address expired; falling back");
		}

		if recoverable {
			self.persist(&LaunchMode::fallback(FallbackReason::QueryFailed));
		}
		self.present(ResolverState::Fallback);
	}

	fn build_request(&self) -> ConfigRequest {
		let attribution = self.gate.verdict().map(AttributionVerdict::fields).unwrap_or_default();
		ConfigRequest {
			attribution,
			af_id: self.settings.device_id.clone(),
			bundle_id: self.settings.bundle_id.clone(),
			os: PLATFORM_TAG.to_string(),
			store_id: self.settings.store_id.clone(),
			locale: self.settings.locale.clone(),
			push_token: self.push_token.clone(),
			firebase_project_id: self.settings.firebase_project_id.clone(),
		}
	}

	fn persist(&self, mode: &LaunchMode) {
		if let Err(err) = self.prefs.save_mode(mode) {
			warn!(target = "launchpad.resolver", error = %err, "failed to persist launch decision");
		}
	}

	/// Enters a `WebView`/`Fallback` state, honoring deferred connectivity loss.
	fn present(&mut self, state: ResolverState) {
		if let Err(err) = self.prefs.mark_launched() {
			warn!(target = "launchpad.resolver", error = %err, "failed to persist launch flag");
		}
		self.last_presented = Some(state.clone());
		if !self.reachable && matches!(state, ResolverState::WebView(_)) {
			self.transition(ResolverState::Offline);
		} else {
			self.transition(state);
		}
	}

	fn transition(&mut self, next: ResolverState) {
		if self.state == next {
			return;
		}
		info!(target = "launchpad.resolver", from = self.state.name(), to = next.name(), "state transition");
		self.state = next;
	}
}
