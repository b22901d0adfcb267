//! Asset record store and royalty ledger for the Arx registry.
//!
//! This crate is the heart of Arx. It provides:
//! - The single owned [`Registry`] store every engine reads and writes
//! - Per-asset records: ownership, market state, expiry, access levels
//! - Ownership transfer with auction locking and listing invalidation
//! - Revocation to a tombstone (identifiers are never reused)
//! - Bundling of owned assets under a new parent record
//! - Per-asset royalty policy, consulted at settlement time
//! - The unified operation error ([`OpError`]) shared by every engine

pub mod error;
pub mod record;
pub mod store;

pub use error::OpError;
pub use record::{
    AccessLevel, AssetRecord, Auction, CertificateState, Listing, Loan, MarketState,
    RoyaltyPolicy,
};
pub use store::Registry;
