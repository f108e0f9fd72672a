//! In-memory collaborators for testing without a network or a renderer.
//!
//! Every fake is a cheap clone sharing its state, so a test can hand one copy
//! to the component under test and keep another to script and inspect it.
//!
//! # Example
//!
//! ```ignore
//! let client = FakeConfigClient::new();
//! client.push_response(FakeConfigClient::enabled("https://content.example/a", 1_700_003_600.0));
//!
//! let mut resolver = ConfigResolver::new(MemoryStore::new(), client.clone(), settings, Arc::new(FixedClock::new(1_700_000_000)));
//! resolver.start();
//! resolver.on_attribution(AttributionOutcome::Failure("offline".into())).await;
//! assert_eq!(client.requests().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use launchpad_protocol::{ConfigRequest, ConfigResponse, CookieRecord};
use parking_lot::Mutex;
use url::Url;

use crate::client::ConfigClient;
use crate::clock::Clock;
use crate::error::{LaunchError, Result};
use crate::surface::{BrowsingSurface, ExternalOpener, SurfaceConfig, SurfaceFactory, SurfaceId};

/// Scripted configuration endpoint.
///
/// Replies are consumed in order; an exhausted script answers with a
/// transport error.
#[derive(Debug, Clone, Default)]
pub struct FakeConfigClient {
	inner: Arc<FakeConfigInner>,
}

#[derive(Debug, Default)]
struct FakeConfigInner {
	replies: Mutex<VecDeque<Result<ConfigResponse>>>,
	requests: Mutex<Vec<ConfigRequest>>,
	delay: Mutex<Option<Duration>>,
}

impl FakeConfigClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn enabled(url: &str, expires: f64) -> ConfigResponse {
		ConfigResponse {
			ok: true,
			url: Some(url.to_string()),
			expires: Some(expires),
		}
	}

	pub fn disabled() -> ConfigResponse {
		ConfigResponse {
			ok: false,
			url: None,
			expires: None,
		}
	}

	pub fn push_response(&self, response: ConfigResponse) {
		self.inner.replies.lock().push_back(Ok(response));
	}

	pub fn push_error(&self, error: LaunchError) {
		self.inner.replies.lock().push_back(Err(error));
	}

	/// Sleeps this long before every reply.
	pub fn set_delay(&self, delay: Duration) {
		*self.inner.delay.lock() = Some(delay);
	}

	/// Requests received so far, oldest first.
	pub fn requests(&self) -> Vec<ConfigRequest> {
		self.inner.requests.lock().clone()
	}
}

#[async_trait]
impl ConfigClient for FakeConfigClient {
	async fn fetch(&self, request: &ConfigRequest) -> Result<ConfigResponse> {
		self.inner.requests.lock().push(request.clone());
		let delay = *self.inner.delay.lock();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		let reply = self.inner.replies.lock().pop_front();
		reply.unwrap_or_else(|| Err(LaunchError::Transport("no scripted response".into())))
	}
}

/// Settable clock.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
	now: Arc<AtomicU64>,
}

impl FixedClock {
	pub fn new(now: u64) -> Self {
		Self {
			now: Arc::new(AtomicU64::new(now)),
		}
	}

	pub fn advance(&self, secs: u64) {
		self.now.fetch_add(secs, Ordering::SeqCst);
	}
}

impl Clock for FixedClock {
	fn now_ts(&self) -> u64 {
		self.now.load(Ordering::SeqCst)
	}
}

#[derive(Debug, Default)]
struct SurfaceState {
	config: Option<SurfaceConfig>,
	loads: Vec<Url>,
	stops: usize,
	scripts: Vec<String>,
	can_go_back: bool,
	back_navigations: usize,
	cookies: Vec<CookieRecord>,
}

/// Browsing surface that records every call.
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
	state: Arc<Mutex<SurfaceState>>,
}

impl FakeSurface {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_cookies(cookies: Vec<CookieRecord>) -> Self {
		let surface = Self::new();
		surface.state.lock().cookies = cookies;
		surface
	}

	pub fn config(&self) -> Option<SurfaceConfig> {
		self.state.lock().config.clone()
	}

	pub fn loads(&self) -> Vec<Url> {
		self.state.lock().loads.clone()
	}

	pub fn stops(&self) -> usize {
		self.state.lock().stops
	}

	pub fn scripts(&self) -> Vec<String> {
		self.state.lock().scripts.clone()
	}

	pub fn set_can_go_back(&self, can_go_back: bool) {
		self.state.lock().can_go_back = can_go_back;
	}

	pub fn back_navigations(&self) -> usize {
		self.state.lock().back_navigations
	}

	/// Simulates content setting a cookie.
	pub fn add_cookie(&self, cookie: CookieRecord) {
		upsert(&mut self.state.lock().cookies, cookie);
	}
}

impl BrowsingSurface for FakeSurface {
	fn configure(&mut self, config: &SurfaceConfig) {
		self.state.lock().config = Some(config.clone());
	}

	fn load(&mut self, url: &Url) {
		self.state.lock().loads.push(url.clone());
	}

	fn stop_loading(&mut self) {
		self.state.lock().stops += 1;
	}

	fn can_go_back(&self) -> bool {
		self.state.lock().can_go_back
	}

	fn go_back(&mut self) {
		self.state.lock().back_navigations += 1;
	}

	fn evaluate_script(&mut self, script: &str) {
		self.state.lock().scripts.push(script.to_string());
	}

	fn cookies(&self) -> Vec<CookieRecord> {
		self.state.lock().cookies.clone()
	}

	fn set_cookie(&mut self, cookie: &CookieRecord) -> Result<()> {
		upsert(&mut self.state.lock().cookies, cookie.clone());
		Ok(())
	}
}

fn upsert(cookies: &mut Vec<CookieRecord>, cookie: CookieRecord) {
	match cookies.iter_mut().find(|existing| existing.key() == cookie.key()) {
		Some(existing) => *existing = cookie,
		None => cookies.push(cookie),
	}
}

/// Factory handing out [`FakeSurface`]s and remembering each one.
#[derive(Debug, Clone, Default)]
pub struct FakeSurfaceFactory {
	created: Arc<Mutex<Vec<(SurfaceId, FakeSurface)>>>,
}

impl FakeSurfaceFactory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn created(&self) -> Vec<SurfaceId> {
		self.created.lock().iter().map(|(id, _)| *id).collect()
	}

	/// Shared handle to a surface created earlier.
	pub fn surface(&self, id: SurfaceId) -> Option<FakeSurface> {
		self.created.lock().iter().find(|(created, _)| *created == id).map(|(_, surface)| surface.clone())
	}
}

impl SurfaceFactory for FakeSurfaceFactory {
	type Surface = FakeSurface;

	fn create(&mut self, id: SurfaceId) -> FakeSurface {
		let surface = FakeSurface::new();
		self.created.lock().push((id, surface.clone()));
		surface
	}
}

/// External handler that accepts and records every address.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
	opened: Arc<Mutex<Vec<Url>>>,
}

impl RecordingOpener {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn opened(&self) -> Vec<Url> {
		self.opened.lock().clone()
	}
}

impl ExternalOpener for RecordingOpener {
	fn open(&self, url: &Url) -> bool {
		self.opened.lock().push(url.clone());
		true
	}
}
