//! Governance roles and guard checks for the Arx registry.
//!
//! Every external operation resolves the acting principal against the
//! process-wide role sets before it touches asset state. This crate holds
//! those sets ([`Roles`]) and the guard evaluators ([`gate`]) the engines
//! call in front of their transitions.
//!
//! Guards are pure reads: they either pass or return a [`GateError`], and
//! they never mutate anything, so a failed guard leaves no trace.

pub mod error;
pub mod gate;
pub mod roles;

pub use error::GateError;
pub use gate::{require_admin, require_minter, require_not_banned, require_not_paused};
pub use roles::Roles;
