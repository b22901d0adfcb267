//! High-level facade for the Arx asset registry.
//!
//! [`Arx`] owns the asset store, role sets, payout ledger, event log, and
//! bookkeeping annex, and exposes the complete operation surface: minting,
//! transfer, revocation, auctions, fixed-price sales, royalties, access
//! levels, subscriptions, certificates, lending, bundling, and role
//! management.
//!
//! Every operation samples the clock once, runs its guards in front of any
//! mutation, and on success appends one durable event record. A returned
//! error means nothing changed — the host can treat each call as one
//! atomically applied transaction.

pub mod bookkeeping;
pub mod request;
pub mod service;

pub use request::MintRequest;
pub use service::{Arx, ArxConfig, ArxResult};

// Re-export key types so embedders need only this crate.
pub use arx_access::AccessConfig;
pub use arx_events::{EventFilter, EventKind, EventLog, EventRecord};
pub use arx_market::{BidOutcome, CloseOutcome, MarketConfig, PurchaseOutcome};
pub use arx_registry::{AssetRecord, Auction, Listing, Loan, OpError};
pub use arx_types::{
    Amount, AssetId, BasisPoints, Clock, ManualClock, Principal, SystemClock, Timestamp,
};
