//! Wall-clock access, injectable for tests.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current epoch time in seconds.
pub trait Clock: Send + Sync {
	fn now_ts(&self) -> u64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_ts(&self) -> u64 {
		now_ts()
	}
}

pub fn now_ts() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
