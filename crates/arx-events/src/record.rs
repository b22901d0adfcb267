use serde::{Deserialize, Serialize};

use arx_types::{Amount, AssetId, Principal, Timestamp};

/// Classification of registry events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A new asset was minted.
    Minted,
    /// Ownership of an asset changed hands outside a sale.
    Transferred,
    /// An asset was revoked (cleared to nonexistent).
    Revoked,
    /// Several assets were bundled under a new parent asset.
    Bundled,
    /// An asset's royalty policy was set or replaced.
    RoyaltySet,
    /// An auction opened for an asset.
    AuctionStarted,
    /// A bid was accepted on a live auction.
    BidPlaced,
    /// A late bid extended a live auction's end time.
    AuctionExtended,
    /// An auction closed with a winning bidder and the asset was sold.
    AuctionSettled,
    /// An auction closed with no bids; ownership was unchanged.
    AuctionClosed,
    /// An asset was listed at a fixed price.
    Listed,
    /// A fixed-price listing was withdrawn.
    Delisted,
    /// A live listing's price changed.
    PriceUpdated,
    /// A listed asset was bought.
    Purchased,
    /// A principal's stored access level changed.
    AccessLevelSet,
    /// An asset's expiry timestamp was overridden.
    ExpirySet,
    /// A paid extension moved an asset's expiry forward.
    SubscriptionExtended,
    /// The post-expiry certificate was issued.
    CertificateIssued,
    /// An asset was lent to a borrower.
    Lent,
    /// A principal was added to the minter whitelist.
    MinterAdded,
    /// A principal was removed from the minter whitelist.
    MinterRemoved,
    /// A principal was banned from the registry.
    PrincipalBanned,
    /// A ban was lifted.
    PrincipalUnbanned,
    /// A co-owner was recorded for an asset.
    CoOwnerAdded,
    /// The administrator role moved to a new principal.
    AdminTransferred,
    /// The registry was paused.
    Paused,
    /// The registry was unpaused.
    Unpaused,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Payload data carried by a registry event.
///
/// Each payload names the principals and amounts the operation touched; the
/// event kind says what happened to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// No additional data beyond the kind and asset.
    Empty,
    /// A mint: who received the asset and who authorized the mint.
    Minted {
        owner: Principal,
        minted_by: Principal,
    },
    /// An ownership move with no payment attached.
    Transferred { from: Principal, to: Principal },
    /// Membership list of a new bundle parent.
    Bundle {
        owner: Principal,
        members: Vec<AssetId>,
    },
    /// Royalty policy contents.
    Royalty {
        recipient: Principal,
        rate_bps: u16,
    },
    /// Auction opening terms.
    AuctionOpened {
        seller: Principal,
        floor: Amount,
        ends_at: Timestamp,
    },
    /// An accepted bid, including the displaced bidder's refund if any.
    Bid {
        bidder: Principal,
        amount: Amount,
        refunded: Option<(Principal, Amount)>,
        ends_at: Timestamp,
    },
    /// A sale settlement: auction hammer or fixed-price purchase.
    Settlement {
        seller: Principal,
        buyer: Principal,
        price: Amount,
        royalty: Amount,
        royalty_recipient: Principal,
        change_returned: Amount,
    },
    /// Listing terms.
    Listing { seller: Principal, price: Amount },
    /// A new price on a live listing.
    Price { price: Amount },
    /// A stored access-level change.
    AccessLevel {
        principal: Principal,
        level: u8,
        set_by: Principal,
    },
    /// A new expiry timestamp.
    Expiry { expiry: Timestamp },
    /// A paid subscription extension.
    Extension {
        paid_by: Principal,
        extra_days: u64,
        paid: Amount,
        new_expiry: Timestamp,
    },
    /// A loan grant.
    Loan {
        borrower: Principal,
        until: Timestamp,
    },
    /// A single affected principal: role-set changes, certificate issuance.
    Actor { principal: Principal },
}

/// A single durable event record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Dense, zero-based position in the log.
    pub seq: u64,
    /// The operation's sampled clock instant.
    pub timestamp: Timestamp,
    /// The affected asset, if the operation targets one.
    pub asset: Option<AssetId>,
    /// Classification of the operation.
    pub kind: EventKind,
    /// Principals and amounts involved.
    pub payload: EventPayload,
}

impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.asset {
            Some(asset) => write!(f, "#{} {} {}", self.seq, self.kind, asset),
            None => write!(f, "#{} {}", self.seq, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", EventKind::AuctionSettled), "AuctionSettled");
        assert_eq!(format!("{}", EventKind::Paused), "Paused");
    }

    #[test]
    fn record_display_with_and_without_asset() {
        let with = EventRecord {
            seq: 3,
            timestamp: Timestamp::new(10),
            asset: Some(AssetId::new(0)),
            kind: EventKind::Minted,
            payload: EventPayload::Empty,
        };
        assert_eq!(format!("{with}"), "#3 Minted asset:0");

        let without = EventRecord {
            seq: 4,
            timestamp: Timestamp::new(11),
            asset: None,
            kind: EventKind::Paused,
            payload: EventPayload::Empty,
        };
        assert_eq!(format!("{without}"), "#4 Paused");
    }

    #[test]
    fn serde_roundtrip() {
        let record = EventRecord {
            seq: 0,
            timestamp: Timestamp::new(99),
            asset: Some(AssetId::new(1)),
            kind: EventKind::Purchased,
            payload: EventPayload::Settlement {
                seller: Principal::named("s"),
                buyer: Principal::named("b"),
                price: Amount::new(100),
                royalty: Amount::new(5),
                royalty_recipient: Principal::named("r"),
                change_returned: Amount::ZERO,
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
