use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use arx_registry::{Listing, MarketState, OpError, Registry};
use arx_types::{Amount, AssetId, Principal};

use crate::payouts::Payouts;

/// Result of a completed fixed-price purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    /// The owner who was paid.
    pub seller: Principal,
    /// The asking price actually charged.
    pub price: Amount,
    /// The royalty share carved out of the price.
    pub royalty: Amount,
    /// Recipient of the royalty share.
    pub royalty_recipient: Principal,
    /// Overpayment returned to the buyer.
    pub change: Amount,
}

/// List `asset` at a fixed price.
///
/// Caller must be the current owner. Fails `AlreadySoldAtAuction` once the
/// permanent auction-sold latch is set (for every caller, forever) and
/// `Locked` while an auction is live. Relisting replaces the price.
pub fn list(
    registry: &mut Registry,
    caller: Principal,
    asset: AssetId,
    price: Amount,
) -> Result<(), OpError> {
    let record = registry.require_owner(asset, caller)?;
    if record.auction_sold {
        return Err(OpError::AlreadySoldAtAuction(asset));
    }
    if record.market.is_auction() {
        return Err(OpError::Locked(asset));
    }

    let record = registry.get_mut(asset)?;
    record.market = MarketState::Listed(Listing {
        seller: caller,
        price,
    });
    info!(%asset, seller = %caller, %price, "asset listed");
    Ok(())
}

/// Withdraw the listing on `asset`.
///
/// Permitted to the current owner or to the party who listed it. Fails
/// `NotForSale` if no listing is live.
pub fn delist(registry: &mut Registry, caller: Principal, asset: AssetId) -> Result<(), OpError> {
    let record = registry.get(asset)?;
    let listing = match record.market.listing() {
        Some(listing) => *listing,
        None => return Err(OpError::NotForSale(asset)),
    };
    if caller != record.owner && caller != listing.seller {
        return Err(OpError::NotOwner { asset, caller });
    }

    registry.get_mut(asset)?.market = MarketState::Open;
    debug!(%asset, by = %caller, "asset delisted");
    Ok(())
}

/// Change the price of a live listing. Owner-only; fails `NotForSale` if the
/// asset is not listed.
pub fn update_price(
    registry: &mut Registry,
    caller: Principal,
    asset: AssetId,
    new_price: Amount,
) -> Result<(), OpError> {
    let record = registry.require_owner(asset, caller)?;
    if record.market.listing().is_none() {
        return Err(OpError::NotForSale(asset));
    }

    let record = registry.get_mut(asset)?;
    record.market = MarketState::Listed(Listing {
        seller: caller,
        price: new_price,
    });
    debug!(%asset, %new_price, "listing price updated");
    Ok(())
}

/// Buy a listed asset for `paid`.
///
/// Fails `NotForSale` without a live listing and `InsufficientPayment`
/// below the asking price. On success the price is split by the royalty
/// policy as configured at this instant (royalty share to its recipient,
/// remainder to the seller, any overpayment back to the buyer) and
/// ownership moves to the buyer with the listing cleared. All of it happens
/// in this one operation or not at all.
pub fn buy(
    registry: &mut Registry,
    payouts: &mut Payouts,
    caller: Principal,
    asset: AssetId,
    paid: Amount,
) -> Result<PurchaseOutcome, OpError> {
    let record = registry.get(asset)?;
    let listing = match record.market.listing() {
        Some(listing) => *listing,
        None => return Err(OpError::NotForSale(asset)),
    };
    if paid < listing.price {
        return Err(OpError::InsufficientPayment {
            required: listing.price,
            paid,
        });
    }

    let seller = record.owner;
    let (royalty_recipient, royalty) = registry.royalty_info(asset, listing.price)?;
    let seller_share = listing.price.checked_sub(royalty).unwrap_or(Amount::ZERO);
    let change = paid.checked_sub(listing.price).unwrap_or(Amount::ZERO);

    payouts.credit(royalty_recipient, royalty);
    payouts.credit(seller, seller_share);
    payouts.credit(caller, change);

    let record = registry.get_mut(asset)?;
    record.owner = caller;
    record.market = MarketState::Open;

    info!(
        %asset, seller = %seller, buyer = %caller, price = %listing.price, %royalty,
        "asset purchased"
    );
    Ok(PurchaseOutcome {
        seller,
        price: listing.price,
        royalty,
        royalty_recipient,
        change,
    })
}
