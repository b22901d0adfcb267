use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use arx_registry::{Auction, MarketState, OpError, Registry};
use arx_types::{Amount, AssetId, Principal, Timestamp};

use crate::config::MarketConfig;
use crate::payouts::Payouts;

/// Result of an accepted bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOutcome {
    /// The displaced bidder and the amount released back to them, if a
    /// previous bid was held.
    pub refunded: Option<(Principal, Amount)>,
    /// End time after the bid (possibly extended).
    pub ends_at: Timestamp,
    /// `true` if the bid landed inside the trailing window and pushed the
    /// end time out.
    pub extended: bool,
}

/// Result of closing an auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseOutcome {
    /// The asset was hammered to the highest bidder.
    Sold {
        seller: Principal,
        winner: Principal,
        price: Amount,
        royalty: Amount,
        royalty_recipient: Principal,
    },
    /// No bid ever exceeded the floor; the asset stays with its owner.
    NoSale,
}

/// Per-asset auction lifecycle: `start` → `place_bid`* → `end`.
///
/// A live auction doubles as the asset's lock: transfer and listing fail
/// while it runs, and the lock is only released by `end`. Only the current
/// highest bid is held in escrow at any instant; accepting a higher bid
/// releases the previous one in full before the new one is recorded.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuctionEngine {
    config: MarketConfig,
}

impl AuctionEngine {
    /// An engine with the given tuning.
    pub fn new(config: MarketConfig) -> Self {
        Self { config }
    }

    /// The engine's tuning.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Open an auction on `asset` with the given floor and duration.
    ///
    /// Caller must be the current owner. Fails `AlreadyActive` if an auction
    /// is already live. A fixed-price listing, if present, is superseded:
    /// the asset cannot be listed and auctioned at once.
    pub fn start(
        &self,
        registry: &mut Registry,
        caller: Principal,
        asset: AssetId,
        floor: Amount,
        duration_secs: u64,
        now: Timestamp,
    ) -> Result<Timestamp, OpError> {
        let record = registry.require_owner(asset, caller)?;
        if record.market.is_auction() {
            return Err(OpError::AlreadyActive(asset));
        }

        let ends_at = now.saturating_add_secs(duration_secs);
        let record = registry.get_mut(asset)?;
        record.market = MarketState::Auction(Auction {
            seller: caller,
            floor,
            highest_bid: floor,
            highest_bidder: None,
            ends_at,
        });
        info!(%asset, seller = %caller, %floor, %ends_at, "auction started");
        Ok(ends_at)
    }

    /// Accept a bid of `amount` from `caller`.
    ///
    /// Fails `NotActive` if no auction is live or its end time has passed
    /// (a stale auction rejects bids even before `end` closes it), and
    /// `BidTooLow` unless `amount` strictly exceeds the current highest
    /// bid. On success the displaced bidder, if any, is credited their full
    /// bid, and a bid inside the trailing window extends the end time.
    pub fn place_bid(
        &self,
        registry: &mut Registry,
        payouts: &mut Payouts,
        caller: Principal,
        asset: AssetId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<BidOutcome, OpError> {
        let record = registry.get(asset)?;
        let auction = match record.market.auction() {
            Some(auction) if now < auction.ends_at => *auction,
            _ => return Err(OpError::NotActive(asset)),
        };
        if amount <= auction.highest_bid {
            return Err(OpError::BidTooLow {
                bid: amount,
                highest: auction.highest_bid,
            });
        }

        // Release the displaced escrow before recording the new bid; only
        // one bid is ever held.
        let refunded = auction.highest_bidder.map(|prev| {
            payouts.credit(prev, auction.highest_bid);
            (prev, auction.highest_bid)
        });

        let extended = now.secs_until(auction.ends_at) <= self.config.snipe_window_secs;
        let ends_at = if extended {
            auction.ends_at.saturating_add_secs(self.config.snipe_extension_secs)
        } else {
            auction.ends_at
        };

        let record = registry.get_mut(asset)?;
        record.market = MarketState::Auction(Auction {
            highest_bid: amount,
            highest_bidder: Some(caller),
            ends_at,
            ..auction
        });

        debug!(%asset, bidder = %caller, %amount, extended, "bid accepted");
        Ok(BidOutcome {
            refunded,
            ends_at,
            extended,
        })
    }

    /// Close the auction on `asset`.
    ///
    /// Caller must be the current owner; fails `TooEarly` before the end
    /// time. With a recorded highest bidder the asset is settled through
    /// the royalty ledger, ownership moves to the bidder, and the permanent
    /// auction-sold latch is set. With no bids the lock is simply released.
    pub fn end(
        &self,
        registry: &mut Registry,
        payouts: &mut Payouts,
        caller: Principal,
        asset: AssetId,
        now: Timestamp,
    ) -> Result<CloseOutcome, OpError> {
        let record = registry.require_owner(asset, caller)?;
        let auction = match record.market.auction() {
            Some(auction) => *auction,
            None => return Err(OpError::NotActive(asset)),
        };
        if now < auction.ends_at {
            return Err(OpError::TooEarly {
                asset,
                ends_at: auction.ends_at,
            });
        }

        let Some(winner) = auction.highest_bidder else {
            let record = registry.get_mut(asset)?;
            record.market = MarketState::Open;
            info!(%asset, "auction closed with no bids");
            return Ok(CloseOutcome::NoSale);
        };

        // Settlement: split the hammer price by the royalty policy as it
        // stands right now, then move ownership.
        let price = auction.highest_bid;
        let (royalty_recipient, royalty) = registry.royalty_info(asset, price)?;
        let seller_share = price.checked_sub(royalty).unwrap_or(Amount::ZERO);

        payouts.credit(royalty_recipient, royalty);
        payouts.credit(caller, seller_share);

        let record = registry.get_mut(asset)?;
        record.owner = winner;
        record.market = MarketState::Open;
        record.auction_sold = true;

        info!(
            %asset, seller = %caller, winner = %winner, %price, %royalty,
            "auction settled"
        );
        Ok(CloseOutcome::Sold {
            seller: caller,
            winner,
            price,
            royalty,
            royalty_recipient,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arx_types::BasisPoints;

    fn engine() -> AuctionEngine {
        AuctionEngine::new(MarketConfig {
            snipe_window_secs: 600,
            snipe_extension_secs: 600,
        })
    }

    fn seller() -> Principal {
        Principal::named("seller")
    }

    fn setup() -> (Registry, Payouts, AssetId) {
        let mut registry = Registry::new();
        let asset = registry.mint(seller(), "ptr://meta".into(), Timestamp::new(1_000_000), 1);
        (registry, Payouts::new(), asset)
    }

    fn eth(n: u64) -> Amount {
        // Tests use whole units scaled by 10^6 so fractional bids read cleanly.
        Amount::new(n as u128 * 1_000_000)
    }

    #[test]
    fn full_lifecycle_transfers_to_highest_bidder() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        let (a, b) = (Principal::named("a"), Principal::named("b"));
        let start = Timestamp::new(100);

        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, start)
            .unwrap();
        engine
            .place_bid(&mut registry, &mut payouts, a, asset, eth(1) + Amount::new(500_000), start)
            .unwrap();
        engine
            .place_bid(&mut registry, &mut payouts, b, asset, eth(2), start)
            .unwrap();

        let after_end = Timestamp::new(100 + 3_601);
        let outcome = engine
            .end(&mut registry, &mut payouts, seller(), asset, after_end)
            .unwrap();

        assert_eq!(
            outcome,
            CloseOutcome::Sold {
                seller: seller(),
                winner: b,
                price: eth(2),
                royalty: Amount::ZERO,
                royalty_recipient: seller(),
            }
        );
        assert_eq!(registry.owner_of(asset).unwrap(), b);
        assert!(registry.get(asset).unwrap().auction_sold);
        assert!(!registry.get(asset).unwrap().market.is_auction());

        // a was refunded in full; seller got the hammer price.
        assert_eq!(payouts.balance(a), eth(1) + Amount::new(500_000));
        assert_eq!(payouts.balance(seller()), eth(2));
    }

    #[test]
    fn start_requires_ownership() {
        let (mut registry, _, asset) = setup();
        let err = engine()
            .start(
                &mut registry,
                Principal::named("mallory"),
                asset,
                eth(1),
                3_600,
                Timestamp::new(0),
            )
            .unwrap_err();
        assert!(matches!(err, OpError::NotOwner { .. }));
    }

    #[test]
    fn second_start_fails_already_active() {
        let (mut registry, _, asset) = setup();
        let engine = engine();
        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, Timestamp::new(0))
            .unwrap();
        let err = engine
            .start(&mut registry, seller(), asset, eth(2), 3_600, Timestamp::new(0))
            .unwrap_err();
        assert_eq!(err, OpError::AlreadyActive(asset));
    }

    #[test]
    fn bids_must_strictly_increase() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        let now = Timestamp::new(0);
        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, now)
            .unwrap();

        // Equal to the floor: rejected.
        let err = engine
            .place_bid(&mut registry, &mut payouts, Principal::named("a"), asset, eth(1), now)
            .unwrap_err();
        assert_eq!(
            err,
            OpError::BidTooLow {
                bid: eth(1),
                highest: eth(1)
            }
        );

        engine
            .place_bid(&mut registry, &mut payouts, Principal::named("a"), asset, eth(2), now)
            .unwrap();

        // Below the new highest: rejected, and the escrow is untouched.
        let err = engine
            .place_bid(
                &mut registry,
                &mut payouts,
                Principal::named("b"),
                asset,
                eth(1) + Amount::new(500_000),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, OpError::BidTooLow { .. }));
        assert_eq!(payouts.balance(Principal::named("a")), Amount::ZERO);
    }

    #[test]
    fn displaced_bidder_is_refunded_in_full() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        let now = Timestamp::new(0);
        let (a, b) = (Principal::named("a"), Principal::named("b"));

        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, now)
            .unwrap();
        engine
            .place_bid(&mut registry, &mut payouts, a, asset, eth(2), now)
            .unwrap();
        let outcome = engine
            .place_bid(&mut registry, &mut payouts, b, asset, eth(3), now)
            .unwrap();

        assert_eq!(outcome.refunded, Some((a, eth(2))));
        assert_eq!(payouts.balance(a), eth(2));
        // b's bid is escrowed, not credited anywhere.
        assert_eq!(payouts.balance(b), Amount::ZERO);
    }

    #[test]
    fn bidding_on_idle_asset_fails_not_active() {
        let (mut registry, mut payouts, asset) = setup();
        let err = engine()
            .place_bid(
                &mut registry,
                &mut payouts,
                Principal::named("a"),
                asset,
                eth(2),
                Timestamp::new(0),
            )
            .unwrap_err();
        assert_eq!(err, OpError::NotActive(asset));
    }

    #[test]
    fn stale_auction_rejects_bids_before_close() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        engine
            .start(&mut registry, seller(), asset, eth(1), 100, Timestamp::new(0))
            .unwrap();

        // Past the end time but not yet closed: lazy expiry.
        let err = engine
            .place_bid(
                &mut registry,
                &mut payouts,
                Principal::named("a"),
                asset,
                eth(2),
                Timestamp::new(100),
            )
            .unwrap_err();
        assert_eq!(err, OpError::NotActive(asset));
    }

    #[test]
    fn late_bid_inside_window_extends_the_auction() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine(); // window 600s, bump 600s
        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, Timestamp::new(0))
            .unwrap();

        // 3_100s in: 500s remain, inside the 600s window.
        let outcome = engine
            .place_bid(
                &mut registry,
                &mut payouts,
                Principal::named("a"),
                asset,
                eth(2),
                Timestamp::new(3_100),
            )
            .unwrap();
        assert!(outcome.extended);
        assert_eq!(outcome.ends_at, Timestamp::new(4_200));

        let stored = registry.get(asset).unwrap().market.auction().unwrap().ends_at;
        assert_eq!(stored, Timestamp::new(4_200));
    }

    #[test]
    fn early_bid_does_not_extend() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, Timestamp::new(0))
            .unwrap();

        let outcome = engine
            .place_bid(
                &mut registry,
                &mut payouts,
                Principal::named("a"),
                asset,
                eth(2),
                Timestamp::new(1_000),
            )
            .unwrap();
        assert!(!outcome.extended);
        assert_eq!(outcome.ends_at, Timestamp::new(3_600));
    }

    #[test]
    fn end_before_end_time_fails_too_early() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, Timestamp::new(0))
            .unwrap();

        let err = engine
            .end(&mut registry, &mut payouts, seller(), asset, Timestamp::new(3_599))
            .unwrap_err();
        assert_eq!(
            err,
            OpError::TooEarly {
                asset,
                ends_at: Timestamp::new(3_600)
            }
        );
    }

    #[test]
    fn end_requires_ownership_even_after_expiry() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        engine
            .start(&mut registry, seller(), asset, eth(1), 100, Timestamp::new(0))
            .unwrap();

        let err = engine
            .end(
                &mut registry,
                &mut payouts,
                Principal::named("mallory"),
                asset,
                Timestamp::new(200),
            )
            .unwrap_err();
        assert!(matches!(err, OpError::NotOwner { .. }));
    }

    #[test]
    fn end_without_auction_fails_not_active() {
        let (mut registry, mut payouts, asset) = setup();
        let err = engine()
            .end(&mut registry, &mut payouts, seller(), asset, Timestamp::new(0))
            .unwrap_err();
        assert_eq!(err, OpError::NotActive(asset));
    }

    #[test]
    fn no_bid_close_releases_the_lock_without_transfer() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        engine
            .start(&mut registry, seller(), asset, eth(1), 100, Timestamp::new(0))
            .unwrap();

        let outcome = engine
            .end(&mut registry, &mut payouts, seller(), asset, Timestamp::new(100))
            .unwrap();
        assert_eq!(outcome, CloseOutcome::NoSale);
        assert_eq!(registry.owner_of(asset).unwrap(), seller());
        assert!(!registry.get(asset).unwrap().auction_sold);
        assert!(!registry.get(asset).unwrap().market.is_auction());
        assert_eq!(payouts.total(), Amount::ZERO);
    }

    #[test]
    fn settlement_honors_the_royalty_policy_read_at_close() {
        let (mut registry, mut payouts, asset) = setup();
        let engine = engine();
        let recipient = Principal::named("recipient");
        let bidder = Principal::named("bidder");

        engine
            .start(&mut registry, seller(), asset, eth(1), 3_600, Timestamp::new(0))
            .unwrap();
        engine
            .place_bid(&mut registry, &mut payouts, bidder, asset, eth(2), Timestamp::new(0))
            .unwrap();

        // Policy set while the auction runs: it governs the closing split.
        registry
            .set_royalty(seller(), asset, recipient, BasisPoints::new(500).unwrap())
            .unwrap();

        let outcome = engine
            .end(&mut registry, &mut payouts, seller(), asset, Timestamp::new(4_300))
            .unwrap();

        let expected_royalty = eth(2).split_bps(BasisPoints::new(500).unwrap()).royalty;
        assert_eq!(
            outcome,
            CloseOutcome::Sold {
                seller: seller(),
                winner: bidder,
                price: eth(2),
                royalty: expected_royalty,
                royalty_recipient: recipient,
            }
        );
        assert_eq!(payouts.balance(recipient), expected_royalty);
        assert_eq!(
            payouts.balance(seller()),
            eth(2).checked_sub(expected_royalty).unwrap()
        );
    }

    #[test]
    fn start_supersedes_a_live_listing() {
        let (mut registry, _, asset) = setup();
        crate::listing::list(&mut registry, seller(), asset, eth(1)).unwrap();

        engine()
            .start(&mut registry, seller(), asset, eth(1), 3_600, Timestamp::new(0))
            .unwrap();
        let record = registry.get(asset).unwrap();
        assert!(record.market.is_auction());
        assert!(record.market.listing().is_none());
    }
}
