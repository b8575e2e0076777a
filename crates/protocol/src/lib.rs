//! Wire types for the warelay driver bridge and webhook surface.
//!
//! This crate contains the serde-serializable types that cross a process or
//! network boundary: lifecycle events and commands exchanged with the
//! browser-automation driver, payloads posted to the external API's webhooks,
//! and the persisted session document.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with the wire: Match the driver line protocol and webhook JSON
//! * Stable: Changes only when the wire format changes
//!
//! The relay logic built on top of these types lives in `warelay`.

pub mod event;
pub mod identity;
pub mod payload;
pub mod session;

pub use event::*;
pub use identity::*;
pub use payload::*;
pub use session::*;
