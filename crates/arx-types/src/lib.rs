//! Foundation types for the Arx asset registry.
//!
//! This crate provides the identity, monetary, and temporal types used
//! throughout the Arx system. Every other Arx crate depends on `arx-types`.
//!
//! # Key Types
//!
//! - [`Principal`] — Opaque comparable actor identity derived from seed material
//! - [`AssetId`] — Dense, zero-based asset identifier
//! - [`Amount`] — Payment value in indivisible base units
//! - [`BasisPoints`] — Bounded royalty rate (0–10000)
//! - [`Timestamp`] — Seconds-since-epoch instant with saturating arithmetic
//! - [`Clock`] — Monotone time source sampled once per operation

pub mod asset;
pub mod error;
pub mod funds;
pub mod principal;
pub mod temporal;

pub use asset::AssetId;
pub use error::TypeError;
pub use funds::{Amount, BasisPoints, RoyaltySplit};
pub use principal::{Principal, PrincipalSeed};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp, DAY_SECS};
