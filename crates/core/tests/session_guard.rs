use std::sync::Arc;

use launchpad::fake::{FakeSurfaceFactory, RecordingOpener};
use launchpad::{
	BrowsingSurface, ContentSessionManager, CookieVault, MemoryStore, NavigationPolicy, PopupRequest, REDIRECT_LIMIT, RedirectVerdict,
};
use launchpad_protocol::CookieRecord;
use serde_json::{Value, json};
use url::Url;

type Manager = ContentSessionManager<FakeSurfaceFactory, RecordingOpener, Arc<MemoryStore>>;

fn manager(store: &Arc<MemoryStore>, factory: &FakeSurfaceFactory) -> Manager {
	ContentSessionManager::new(factory.clone(), RecordingOpener::new(), CookieVault::new(Arc::clone(store)))
}

fn url(raw: &str) -> Url {
	Url::parse(raw).unwrap()
}

fn cookie(domain: &str, name: &str, value: &str) -> CookieRecord {
	let Value::Object(properties) = json!({ "value": value, "path": "/", "secure": true }) else { unreachable!() };
	CookieRecord::new(domain, name, properties)
}

#[test]
fn eighty_redirects_reload_the_last_allowed_address() {
	let store = Arc::new(MemoryStore::new());
	let factory = FakeSurfaceFactory::new();
	let mut manager = manager(&store, &factory);

	let requested = url("https://content.example/start");
	let id = manager.load_primary(&requested);
	let good = url("https://content.example/landing");
	assert_eq!(manager.on_navigation_decision(id, &good), NavigationPolicy::Allow);

	let mut verdicts = Vec::new();
	for _ in 0..80 {
		verdicts.push(manager.on_server_redirect(id).unwrap());
	}

	for (i, verdict) in verdicts.iter().take(REDIRECT_LIMIT as usize).enumerate() {
		assert_eq!(*verdict, RedirectVerdict::Continue { count: i as u32 + 1 });
	}
	assert_eq!(verdicts[REDIRECT_LIMIT as usize], RedirectVerdict::Reload(good.clone()));
	assert_eq!(manager.redirect_count(id), Some(80));

	let surface = factory.surface(id).unwrap();
	assert_eq!(surface.stops(), 80 - REDIRECT_LIMIT as usize);
	assert_eq!(surface.loads().last(), Some(&good));
	assert!(!surface.loads()[1..].contains(&requested), "recovery must not reload the original address");
}

#[test]
fn popups_have_independent_redirect_counters() {
	let store = Arc::new(MemoryStore::new());
	let factory = FakeSurfaceFactory::new();
	let mut manager = manager(&store, &factory);

	let primary = manager.load_primary(&url("https://content.example/"));
	let popup = manager.handle_popup_request(&PopupRequest::new("https://pay.example/")).unwrap();
	manager.on_server_redirect(primary);
	manager.on_server_redirect(popup);
	manager.on_server_redirect(popup);

	assert_eq!(manager.redirect_count(primary), Some(1));
	assert_eq!(manager.redirect_count(popup), Some(2));
}

#[test]
fn cookies_carry_over_to_the_next_session() {
	let store = Arc::new(MemoryStore::new());
	let factory = FakeSurfaceFactory::new();
	let mut first = manager(&store, &factory);

	let id = first.load_primary(&url("https://content.example/"));
	let surface = factory.surface(id).unwrap();
	surface.add_cookie(cookie("content.example", "session", "abc"));
	surface.add_cookie(cookie("auth.example", "token", "xyz"));
	first.on_server_redirect(id);
	surface.add_cookie(cookie("content.example", "session", "rotated"));
	assert_eq!(first.teardown(), 1);

	let next_factory = FakeSurfaceFactory::new();
	let mut second = manager(&store, &next_factory);
	let next_id = second.load_primary(&url("https://content.example/"));

	let mut restored = next_factory.surface(next_id).unwrap().cookies();
	restored.sort_by(|a, b| a.key().cmp(&b.key()));
	assert_eq!(restored, vec![cookie("auth.example", "token", "xyz"), cookie("content.example", "session", "rotated")]);
}

#[test]
fn redirect_checkpoint_snapshots_cookies() {
	let store = Arc::new(MemoryStore::new());
	let factory = FakeSurfaceFactory::new();
	let mut manager = manager(&store, &factory);

	let id = manager.load_primary(&url("https://content.example/"));
	assert!(manager.vault().load().is_empty());

	factory.surface(id).unwrap().add_cookie(cookie("content.example", "session", "abc"));
	manager.on_server_redirect(id);
	assert_eq!(manager.vault().load()["content.example"]["session"]["value"], "abc");
}
