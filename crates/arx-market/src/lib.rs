//! Marketplace engines for the Arx registry.
//!
//! Two mutually exclusive ways to exchange an asset for value:
//! - [`AuctionEngine`] — open-bid auctions with anti-snipe extension and a
//!   single-escrow refund discipline
//! - [`listing`] — fixed-price list / delist / update / buy
//!
//! Both settle through the registry's royalty ledger and record every value
//! transfer as a credit in [`Payouts`], so a rejected operation leaves no
//! payment trace.

pub mod auction;
pub mod config;
pub mod listing;
pub mod payouts;

pub use auction::{AuctionEngine, BidOutcome, CloseOutcome};
pub use config::MarketConfig;
pub use listing::{buy, delist, list, update_price, PurchaseOutcome};
pub use payouts::Payouts;
