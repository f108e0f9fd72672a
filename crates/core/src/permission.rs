//! Push-permission prompt bookkeeping.

use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::preferences::{Preferences, keys};
use crate::store::KeyValueStore;

/// Minimum time between two permission prompts.
pub const ASK_COOLDOWN_SECS: u64 = 72 * 60 * 60;

/// Outcome of a push-permission prompt supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAnswer {
	Granted,
	Declined,
	/// The user dismissed the prompt without deciding; ask again after the cooldown.
	Skipped,
	/// The platform failed to produce an answer. Recorded as a decline.
	Failed,
}

/// Reads and writes the push-permission flags and last-ask timestamp.
pub struct PermissionLedger<'a, S> {
	prefs: &'a Preferences<S>,
}

impl<'a, S: KeyValueStore> PermissionLedger<'a, S> {
	pub fn new(prefs: &'a Preferences<S>) -> Self {
		Self { prefs }
	}

	pub fn is_granted(&self) -> bool {
		self.prefs.bool(keys::PUSH_GRANTED)
	}

	pub fn is_declined(&self) -> bool {
		self.prefs.bool(keys::PUSH_DECLINED)
	}

	pub fn last_asked_at(&self) -> Option<u64> {
		self.prefs.u64(keys::PUSH_LAST_ASKED)
	}

	/// True iff no decision is recorded and the cooldown has elapsed.
	pub fn should_ask(&self, now: u64) -> bool {
		if self.is_granted() || self.is_declined() {
			return false;
		}
		self.last_asked_at().is_none_or(|last| now.saturating_sub(last) >= ASK_COOLDOWN_SECS)
	}

	pub fn record(&self, answer: PermissionAnswer, now: u64) -> Result<()> {
		debug!(target = "launchpad.resolver", ?answer, "recording push permission answer");
		let store = self.prefs.store();
		match answer {
			PermissionAnswer::Granted => store.set(keys::PUSH_GRANTED, json!(true))?,
			PermissionAnswer::Declined | PermissionAnswer::Failed => store.set(keys::PUSH_DECLINED, json!(true))?,
			PermissionAnswer::Skipped => {}
		}
		store.set(keys::PUSH_LAST_ASKED, json!(now))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryStore;

	const NOW: u64 = 1_700_000_000;

	#[test]
	fn fresh_install_should_ask() {
		let prefs = Preferences::new(MemoryStore::new());
		assert!(PermissionLedger::new(&prefs).should_ask(NOW));
	}

	#[test]
	fn skip_starts_the_cooldown() {
		let prefs = Preferences::new(MemoryStore::new());
		let ledger = PermissionLedger::new(&prefs);
		ledger.record(PermissionAnswer::Skipped, NOW).unwrap();

		assert!(!ledger.should_ask(NOW + 60));
		assert!(!ledger.should_ask(NOW + ASK_COOLDOWN_SECS - 1));
		assert!(ledger.should_ask(NOW + ASK_COOLDOWN_SECS));
	}

	#[test]
	fn decisions_stop_further_prompts() {
		let prefs = Preferences::new(MemoryStore::new());
		let ledger = PermissionLedger::new(&prefs);
		ledger.record(PermissionAnswer::Granted, NOW).unwrap();
		assert!(ledger.is_granted());
		assert!(!ledger.should_ask(NOW + 10 * ASK_COOLDOWN_SECS));
	}

	#[test]
	fn failed_prompt_counts_as_decline() {
		let prefs = Preferences::new(MemoryStore::new());
		let ledger = PermissionLedger::new(&prefs);
		ledger.record(PermissionAnswer::Failed, NOW).unwrap();
		assert!(ledger.is_declined());
		assert!(!ledger.should_ask(NOW + 10 * ASK_COOLDOWN_SECS));
	}
}
