//! Network reachability observation.
//!
//! [`ReachabilityMonitor`] publishes connectivity on a `watch` channel and
//! only notifies subscribers on transitions. Status can be pushed by the
//! platform through [`ReachabilityMonitor::report`] or polled from a
//! [`ReachabilityProbe`] by a background task.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Network connectivity as seen by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
	Satisfied,
	Unsatisfied,
}

impl Reachability {
	pub fn is_satisfied(self) -> bool {
		matches!(self, Self::Satisfied)
	}
}

/// One-shot connectivity check.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync + 'static {
	async fn probe(&self) -> Reachability;
}

/// Probe that succeeds when a TCP connection to `target` opens in time.
#[derive(Debug, Clone)]
pub struct TcpProbe {
	target: String,
	timeout: Duration,
}

impl TcpProbe {
	pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
		Self {
			target: target.into(),
			timeout,
		}
	}
}

#[async_trait]
impl ReachabilityProbe for TcpProbe {
	async fn probe(&self) -> Reachability {
		match tokio::time::timeout(self.timeout, TcpStream::connect(&self.target)).await {
			Ok(Ok(_)) => Reachability::Satisfied,
			Ok(Err(err)) => {
				debug!(target = "launchpad.reachability", probe = %self.target, error = %err, "probe failed");
				Reachability::Unsatisfied
			}
			Err(_) => {
				debug!(target = "launchpad.reachability", probe = %self.target, "probe timed out");
				Reachability::Unsatisfied
			}
		}
	}
}

/// Long-lived connectivity observer.
#[derive(Debug)]
pub struct ReachabilityMonitor {
	tx: watch::Sender<Option<Reachability>>,
}

impl Default for ReachabilityMonitor {
	fn default() -> Self {
		Self::new()
	}
}

impl ReachabilityMonitor {
	/// Creates a monitor with unknown status.
	pub fn new() -> Self {
		let (tx, _rx) = watch::channel(None);
		Self { tx }
	}

	pub fn subscribe(&self) -> watch::Receiver<Option<Reachability>> {
		self.tx.subscribe()
	}

	pub fn current(&self) -> Option<Reachability> {
		*self.tx.borrow()
	}

	/// Records `status`; returns true (and notifies) only on a transition.
	pub fn report(&self, status: Reachability) -> bool {
		let changed = self.tx.send_if_modified(|current| {
			if *current == Some(status) {
				return false;
			}
			*current = Some(status);
			true
		});
		if changed {
			info!(target = "launchpad.reachability", ?status, "connectivity changed");
		}
		changed
	}

	/// Polls `probe` every `interval` until every subscriber is gone.
	pub fn spawn_polling<P: ReachabilityProbe>(self: Arc<Self>, probe: P, interval: Duration) -> JoinHandle<()> {
		tokio::spawn(async move {
			loop {
				let status = probe.probe().await;
				self.report(status);
				if self.tx.is_closed() {
					debug!(target = "launchpad.reachability", "no subscribers left; stopping probe");
					break;
				}
				tokio::time::sleep(interval).await;
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	struct ScriptedProbe {
		calls: AtomicUsize,
		script: Vec<Reachability>,
	}

	#[async_trait]
	impl ReachabilityProbe for ScriptedProbe {
		async fn probe(&self) -> Reachability {
			let i = self.calls.fetch_add(1, Ordering::SeqCst);
			self.script[i.min(self.script.len() - 1)]
		}
	}

	#[test]
	fn report_only_signals_transitions() {
		let monitor = ReachabilityMonitor::new();
		assert_eq!(monitor.current(), None);
		assert!(monitor.report(Reachability::Satisfied));
		assert!(!monitor.report(Reachability::Satisfied));
		assert!(monitor.report(Reachability::Unsatisfied));
		assert_eq!(monitor.current(), Some(Reachability::Unsatisfied));
	}

	#[tokio::test]
	async fn subscribers_see_transitions() {
		let monitor = ReachabilityMonitor::new();
		let mut rx = monitor.subscribe();
		monitor.report(Reachability::Unsatisfied);
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow_and_update(), Some(Reachability::Unsatisfied));

		monitor.report(Reachability::Unsatisfied);
		assert!(!rx.has_changed().unwrap());
	}

	#[tokio::test(start_paused = true)]
	async fn polling_publishes_probe_results() {
		let monitor = Arc::new(ReachabilityMonitor::new());
		let mut rx = monitor.subscribe();
		let probe = ScriptedProbe {
			calls: AtomicUsize::new(0),
			script: vec![Reachability::Satisfied, Reachability::Satisfied, Reachability::Unsatisfied],
		};
		let task = Arc::clone(&monitor).spawn_polling(probe, Duration::from_secs(5));

		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow_and_update(), Some(Reachability::Satisfied));
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow_and_update(), Some(Reachability::Unsatisfied));

		task.abort();
	}

	#[tokio::test]
	async fn tcp_probe_reports_listening_port() {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let probe = TcpProbe::new(addr.to_string(), Duration::from_secs(2));
		assert_eq!(probe.probe().await, Reachability::Satisfied);
	}
}
