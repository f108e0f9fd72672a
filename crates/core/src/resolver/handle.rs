//! Event loop that serializes inbound signals onto one resolver task.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use super::{ConfigResolver, ResolverState};
use crate::attribution::AttributionOutcome;
use crate::client::ConfigClient;
use crate::config::LaunchConfig;
use crate::permission::PermissionAnswer;
use crate::reachability::Reachability;
use crate::store::KeyValueStore;

/// Inbound signal consumed by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverEvent {
	Attribution(AttributionOutcome),
	PushToken(String),
	Connectivity(Reachability),
	DeepLink(Url),
	Permission(PermissionAnswer),
}

/// Cloneable handle to a resolver running on its own task.
///
/// Each inbound signal has one send method. Events are processed strictly in
/// arrival order, and a configuration query finishes before the next event
/// is looked at. State changes are published on a `watch` channel.
#[derive(Debug, Clone)]
pub struct ResolverHandle {
	tx: mpsc::UnboundedSender<ResolverEvent>,
	state: watch::Receiver<ResolverState>,
}

impl ResolverHandle {
	/// Moves `resolver` onto a new task with the default attribution deadline.
	pub fn spawn<S, C>(resolver: ConfigResolver<S, C>) -> (Self, JoinHandle<()>)
	where
		S: KeyValueStore + 'static,
		C: ConfigClient + 'static,
	{
		Self::spawn_with_deadline(resolver, LaunchConfig::default().attribution_timeout())
	}

	/// Moves `resolver` onto a new task.
	///
	/// When `attribution_deadline` elapses before any attribution outcome
	/// arrives, the loop feeds the resolver an attribution failure so the
	/// bootstrap never stalls on a silent collaborator.
	pub fn spawn_with_deadline<S, C>(mut resolver: ConfigResolver<S, C>, attribution_deadline: Duration) -> (Self, JoinHandle<()>)
	where
		S: KeyValueStore + 'static,
		C: ConfigClient + 'static,
	{
		let (tx, mut rx) = mpsc::unbounded_channel();
		let (state_tx, state_rx) = watch::channel(resolver.state().clone());

		let task = tokio::spawn(async move {
			state_tx.send_replace(resolver.start());

			let deadline = tokio::time::sleep(attribution_deadline);
			tokio::pin!(deadline);
			let mut deadline_armed = true;

			loop {
				let event = tokio::select! {
					event = rx.recv() => match event {
						Some(event) => event,
						None => break,
					},
					_ = &mut deadline, if deadline_armed => {
						info!(target = "launchpad.resolver", "attribution deadline elapsed");
						deadline_armed = false;
						ResolverEvent::Attribution(AttributionOutcome::Failure("attribution deadline elapsed".into()))
					}
				};

				if matches!(event, ResolverEvent::Attribution(_)) {
					deadline_armed = false;
				}

				let state = resolver.handle(event).await;
				state_tx.send_replace(state);
			}

			debug!(target = "launchpad.resolver", "event loop ended (all handles dropped)");
		});

		(Self { tx, state: state_rx }, task)
	}

	pub fn attribution_received(&self, outcome: AttributionOutcome) {
		self.send(ResolverEvent::Attribution(outcome));
	}

	pub fn push_token_updated(&self, token: impl Into<String>) {
		self.send(ResolverEvent::PushToken(token.into()));
	}

	pub fn connectivity_changed(&self, status: Reachability) {
		self.send(ResolverEvent::Connectivity(status));
	}

	pub fn deep_link_received(&self, url: Url) {
		self.send(ResolverEvent::DeepLink(url));
	}

	pub fn permission_answered(&self, answer: PermissionAnswer) {
		self.send(ResolverEvent::Permission(answer));
	}

	/// Current published state.
	pub fn state(&self) -> ResolverState {
		self.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<ResolverState> {
		self.state.clone()
	}

	/// Waits until the published state satisfies `predicate`.
	///
	/// Returns `None` when the resolver task has ended first.
	pub async fn wait_until(&self, mut predicate: impl FnMut(&ResolverState) -> bool) -> Option<ResolverState> {
		let mut rx = self.state.clone();
		rx.wait_for(|state| predicate(state)).await.ok().map(|state| state.clone())
	}

	/// Waits for `WebView`, `Fallback` or `Offline`.
	pub async fn wait_terminal(&self) -> Option<ResolverState> {
		self.wait_until(ResolverState::is_terminal).await
	}

	/// Forwards every reachability transition into the resolver.
	pub fn follow_reachability(&self, mut updates: watch::Receiver<Option<Reachability>>) -> JoinHandle<()> {
		let handle = self.clone();
		tokio::spawn(async move {
			loop {
				let current = *updates.borrow_and_update();
				if let Some(status) = current {
					handle.connectivity_changed(status);
				}
				if updates.changed().await.is_err() || handle.tx.is_closed() {
					break;
				}
			}
		})
	}

	fn send(&self, event: ResolverEvent) {
		if self.tx.send(event).is_err() {
			debug!(target = "launchpad.resolver", "resolver task gone; dropping event");
		}
	}
}
