//! Wire and persistence types for the launchpad bootstrap.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! remote configuration endpoint, delivered by the attribution collaborator,
//! and written to durable storage for cookie carry-over.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization and field access
//! * 1:1 with the wire: Field names match what the endpoint and store expect
//! * Stable: Changes only when the wire or on-disk format changes
//!
//! Orchestration built on top of these types lives in `launchpad`.

pub mod attribution;
pub mod config;
pub mod cookie;

pub use attribution::*;
pub use config::*;
pub use cookie::*;
