//! launchpad: bootstrap mode resolution and guarded content delivery.
//!
//! [`ConfigResolver`] decides at start-up whether a client presents remote
//! content or its local fallback experience, using attribution data, the
//! persisted prior decision, reachability and one remote configuration
//! query. [`ContentSessionManager`] then delivers the resolved address
//! inside platform browsing surfaces with a redirect circuit breaker, a
//! pop-up stack and cookie carry-over.
//!
//! Platform collaborators (renderer, attribution SDK, permission prompt,
//! durable storage) stay behind narrow traits; see [`fake`] for in-memory
//! stand-ins.

pub mod attribution;
pub mod client;
pub mod clock;
pub mod config;
pub mod cookies;
pub mod decision;
pub mod error;
pub mod fake;
pub mod permission;
pub mod preferences;
pub mod reachability;
pub mod redirect;
pub mod resolver;
pub mod session;
pub mod store;
pub mod surface;

pub use attribution::{AttributionGate, AttributionOutcome, AttributionSnapshot, AttributionVerdict};
pub use client::{ConfigClient, ConfigVerdict, HttpConfigClient};
pub use clock::{Clock, SystemClock};
pub use config::{LaunchConfig, StaleAddressPolicy};
pub use cookies::CookieVault;
pub use decision::{FallbackReason, LaunchDecision, LaunchMode};
pub use error::{LaunchError, Result};
pub use permission::{PermissionAnswer, PermissionLedger};
pub use preferences::Preferences;
pub use reachability::{Reachability, ReachabilityMonitor, ReachabilityProbe, TcpProbe};
pub use redirect::{REDIRECT_LIMIT, RedirectGuard, RedirectVerdict};
pub use resolver::{ConfigResolver, ResolverEvent, ResolverHandle, ResolverSettings, ResolverState};
pub use session::{ContentSessionManager, Dismissal, LoadRecovery};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use surface::{BrowsingSurface, ExternalOpener, LoadError, NavigationPolicy, PopupRequest, SurfaceConfig, SurfaceFactory, SurfaceId};
