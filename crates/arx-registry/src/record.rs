use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use arx_types::{Amount, AssetId, BasisPoints, Principal, Timestamp};

/// Stored access level: a small ordinal, conventionally 1–3.
pub type AccessLevel = u8;

/// A live fixed-price listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// The principal who listed the asset (its owner at listing time).
    pub seller: Principal,
    /// The asking price.
    pub price: Amount,
}

/// A live auction. At most one exists per asset, held inside
/// [`MarketState::Auction`] so it doubles as the asset's transfer lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    /// The owner who opened the auction.
    pub seller: Principal,
    /// The floor: bids must strictly exceed this (and every later high bid).
    pub floor: Amount,
    /// Highest accepted bid; starts at the floor. Non-decreasing.
    pub highest_bid: Amount,
    /// Highest bidder; unset until a bid exceeds the floor. While set, the
    /// bid amount is held in escrow by the auction.
    pub highest_bidder: Option<Principal>,
    /// Instant after which bids are rejected and the auction may close.
    pub ends_at: Timestamp,
}

/// Market standing of an asset. A listing and a live auction are mutually
/// exclusive by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketState {
    /// Neither listed nor in auction.
    #[default]
    Open,
    /// Listed at a fixed price.
    Listed(Listing),
    /// Under a live auction; the asset is locked against transfer and listing.
    Auction(Auction),
}

impl MarketState {
    /// `true` if a live auction holds the asset.
    pub fn is_auction(&self) -> bool {
        matches!(self, Self::Auction(_))
    }

    /// The live listing, if any.
    pub fn listing(&self) -> Option<&Listing> {
        match self {
            Self::Listed(listing) => Some(listing),
            _ => None,
        }
    }

    /// The live auction, if any.
    pub fn auction(&self) -> Option<&Auction> {
        match self {
            Self::Auction(auction) => Some(auction),
            _ => None,
        }
    }
}

/// One-shot post-expiry certificate state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateState {
    /// Not issued yet.
    #[default]
    NotIssued,
    /// Issued; a second issue attempt must fail.
    Issued { to: Principal, at: Timestamp },
}

impl CertificateState {
    /// `true` once issued.
    pub fn is_issued(&self) -> bool {
        matches!(self, Self::Issued { .. })
    }
}

/// An active loan of access. Ownership is untouched; the overlay is
/// evaluated at read time and goes inert once `until` passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// The borrower granted temporary access elevation.
    pub borrower: Principal,
    /// Return instant; the overlay is disregarded from this instant on.
    pub until: Timestamp,
}

/// Per-asset royalty policy, read at settlement time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyPolicy {
    /// Recipient of the royalty share.
    pub recipient: Principal,
    /// Rate in basis points.
    pub rate: BasisPoints,
}

/// The full stored record of one asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Current owner.
    pub owner: Principal,
    /// Creation-time descriptive pointer, opaque to the core.
    pub pointer: String,
    /// Subscription expiry instant.
    pub expiry: Timestamp,
    /// Stored access levels by principal.
    pub access_levels: HashMap<Principal, AccessLevel>,
    /// Listing / auction standing.
    pub market: MarketState,
    /// Permanent latch: once sold at auction, the asset can never be listed
    /// again. Later auctions remain legal, so this lives outside
    /// [`MarketState`].
    pub auction_sold: bool,
    /// Royalty policy, if the owner has set one.
    pub royalty: Option<RoyaltyPolicy>,
    /// Most recent loan, if any. Staleness is judged against `until`.
    pub loan: Option<Loan>,
    /// One-shot certificate state.
    pub certificate: CertificateState,
    /// Member assets if this record is a bundle parent, in bundling order.
    pub bundle: Option<Vec<AssetId>>,
}

impl AssetRecord {
    /// A fresh record owned by `owner`, with the given descriptive pointer,
    /// expiry, and the owner's initial access level.
    pub fn new(
        owner: Principal,
        pointer: String,
        expiry: Timestamp,
        initial_level: AccessLevel,
    ) -> Self {
        let mut access_levels = HashMap::new();
        access_levels.insert(owner, initial_level);
        Self {
            owner,
            pointer,
            expiry,
            access_levels,
            market: MarketState::Open,
            auction_sold: false,
            royalty: None,
            loan: None,
            certificate: CertificateState::default(),
            bundle: None,
        }
    }

    /// The stored access level for `principal` (zero if none stored).
    pub fn stored_level(&self, principal: Principal) -> AccessLevel {
        self.access_levels.get(&principal).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_grants_owner_the_initial_level() {
        let owner = Principal::named("owner");
        let record = AssetRecord::new(owner, "ptr://a".into(), Timestamp::new(100), 2);
        assert_eq!(record.stored_level(owner), 2);
        assert_eq!(record.stored_level(Principal::named("other")), 0);
        assert_eq!(record.market, MarketState::Open);
        assert!(!record.auction_sold);
        assert!(!record.certificate.is_issued());
    }

    #[test]
    fn market_state_accessors() {
        let seller = Principal::named("seller");
        let listed = MarketState::Listed(Listing {
            seller,
            price: Amount::new(10),
        });
        assert!(listed.listing().is_some());
        assert!(listed.auction().is_none());
        assert!(!listed.is_auction());

        let auction = MarketState::Auction(Auction {
            seller,
            floor: Amount::new(5),
            highest_bid: Amount::new(5),
            highest_bidder: None,
            ends_at: Timestamp::new(100),
        });
        assert!(auction.is_auction());
        assert!(auction.listing().is_none());
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = AssetRecord::new(
            Principal::named("owner"),
            "ptr://a".into(),
            Timestamp::new(100),
            1,
        );
        let json = serde_json::to_string(&record).unwrap();
        let parsed: AssetRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn certificate_latch() {
        let state = CertificateState::Issued {
            to: Principal::named("holder"),
            at: Timestamp::new(5),
        };
        assert!(state.is_issued());
        assert!(!CertificateState::NotIssued.is_issued());
    }
}
