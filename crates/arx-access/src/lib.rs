//! Access and subscription engine for the Arx registry.
//!
//! Per-asset time-gated access: expiry timestamps, paid additive extension,
//! an expiry notification window, a one-shot post-expiry certificate, and
//! short-term lending of access without transferring ownership.
//!
//! Lending is a read-time overlay: [`AccessEngine::effective_access_level`]
//! folds an active loan into the answer and simply ignores a lapsed one, so
//! no background sweep ever runs.

pub mod config;
pub mod engine;

pub use config::AccessConfig;
pub use engine::AccessEngine;
