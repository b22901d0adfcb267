use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use arx_access::{AccessConfig, AccessEngine};
use arx_annex::Annex;
use arx_events::{EventFilter, EventKind, EventLog, EventPayload, EventStream};
use arx_gate::{require_admin, require_minter, require_not_banned, require_not_paused, Roles};
use arx_market::{listing, AuctionEngine, BidOutcome, CloseOutcome, MarketConfig, Payouts, PurchaseOutcome};
use arx_registry::{AccessLevel, AssetRecord, Auction, Listing, Loan, OpError, Registry};
use arx_types::{Amount, AssetId, BasisPoints, Clock, Principal, SystemClock, Timestamp};

use crate::request::MintRequest;

/// Result alias for facade operations.
pub type ArxResult<T> = Result<T, OpError>;

/// Combined tuning for all engines.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArxConfig {
    pub market: MarketConfig,
    pub access: AccessConfig,
}

pub(crate) struct State {
    pub(crate) registry: Registry,
    pub(crate) roles: Roles,
    pub(crate) payouts: Payouts,
    pub(crate) annex: Annex,
}

/// The Arx registry facade.
///
/// Owns every piece of shared state and exposes the full operation surface.
/// Operations follow one shape: sample the clock once, run every guard, then
/// mutate, then record the event. Guards always precede mutations, so any
/// error return means the operation changed nothing.
pub struct Arx {
    pub(crate) state: RwLock<State>,
    pub(crate) auctions: AuctionEngine,
    pub(crate) access: AccessEngine,
    pub(crate) events: EventLog,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Arx {
    /// A registry administered by `admin`, on the system clock.
    pub fn new(admin: Principal) -> Self {
        Self::with_clock(admin, ArxConfig::default(), Arc::new(SystemClock))
    }

    /// A registry with explicit tuning and time source.
    pub fn with_clock(admin: Principal, config: ArxConfig, clock: Arc<dyn Clock>) -> Self {
        info!(admin = %admin, "registry started");
        Self {
            state: RwLock::new(State {
                registry: Registry::new(),
                roles: Roles::new(admin),
                payouts: Payouts::new(),
                annex: Annex::new(),
            }),
            auctions: AuctionEngine::new(config.market),
            access: AccessEngine::new(config.access),
            events: EventLog::new(),
            clock,
        }
    }

    pub(crate) fn state_read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().expect("state lock poisoned")
    }

    pub(crate) fn state_write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().expect("state lock poisoned")
    }

    /// Shared guard prefix of every state-changing operation.
    pub(crate) fn guard_mutation(state: &State, caller: Principal) -> ArxResult<()> {
        require_not_banned(&state.roles, caller)?;
        require_not_paused(&state.roles)?;
        Ok(())
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Subscribe to events matching `filter`.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        self.events.subscribe(filter)
    }

    // =====================================================================
    // Asset record store
    // =====================================================================

    /// Mint a new asset per `request`.
    ///
    /// Caller must be the administrator or a whitelisted minter.
    pub fn mint(&self, caller: Principal, request: MintRequest) -> ArxResult<AssetId> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        require_minter(&state.roles, caller)?;

        let asset = state.registry.mint(
            request.owner,
            request.metadata_uri.clone(),
            request.expiry,
            request.initial_level,
        );
        if let Some(rate) = request.royalty_rate {
            state
                .registry
                .set_royalty(request.owner, asset, request.owner, rate)?;
        }
        state
            .annex
            .init_asset(asset, request.metadata_uri, request.document_uri);

        self.events.append(
            now,
            Some(asset),
            EventKind::Minted,
            EventPayload::Minted {
                owner: request.owner,
                minted_by: caller,
            },
        );
        Ok(asset)
    }

    /// Transfer `asset` from the caller to `to`.
    pub fn transfer(&self, caller: Principal, asset: AssetId, to: Principal) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.transfer(asset, caller, to)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::Transferred,
            EventPayload::Transferred { from: caller, to },
        );
        Ok(())
    }

    /// Transfer several assets to `to` as one all-or-nothing operation.
    pub fn batch_transfer(
        &self,
        caller: Principal,
        assets: &[AssetId],
        to: Principal,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.batch_transfer(assets, caller, to)?;

        for &asset in assets {
            self.events.append(
                now,
                Some(asset),
                EventKind::Transferred,
                EventPayload::Transferred { from: caller, to },
            );
        }
        Ok(())
    }

    /// Revoke `asset`, clearing it to nonexistent. Permitted to the asset's
    /// owner or the administrator; refused while an auction holds the asset.
    pub fn revoke(&self, caller: Principal, asset: AssetId) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;

        let record = state.registry.get(asset)?;
        if caller != record.owner && !state.roles.is_admin(caller) {
            return Err(OpError::Unauthorized(caller));
        }
        if record.market.is_auction() {
            return Err(OpError::Locked(asset));
        }

        state.registry.revoke(asset)?;
        state.annex.remove_asset(asset);

        self.events.append(
            now,
            Some(asset),
            EventKind::Revoked,
            EventPayload::Actor { principal: caller },
        );
        Ok(())
    }

    /// Bundle `members` under a new parent asset owned by the caller.
    pub fn bundle(
        &self,
        caller: Principal,
        members: &[AssetId],
        metadata_uri: String,
    ) -> ArxResult<AssetId> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;

        let parent = state.registry.bundle(caller, members, metadata_uri.clone())?;
        state.annex.init_asset(parent, metadata_uri, String::new());

        self.events.append(
            now,
            Some(parent),
            EventKind::Bundled,
            EventPayload::Bundle {
                owner: caller,
                members: members.to_vec(),
            },
        );
        Ok(parent)
    }

    /// Current owner of `asset`.
    pub fn owner_of(&self, asset: AssetId) -> ArxResult<Principal> {
        self.state_read().registry.owner_of(asset)
    }

    /// Snapshot of the full asset record.
    pub fn record(&self, asset: AssetId) -> ArxResult<AssetRecord> {
        Ok(self.state_read().registry.get(asset)?.clone())
    }

    /// Member list of a bundle parent (empty for a plain asset).
    pub fn bundle_members(&self, asset: AssetId) -> ArxResult<Vec<AssetId>> {
        Ok(self.state_read().registry.bundle_members(asset)?.to_vec())
    }

    /// Identifiers of all live assets, in mint order.
    pub fn live_assets(&self) -> Vec<AssetId> {
        self.state_read().registry.live_assets()
    }

    // =====================================================================
    // Royalty ledger
    // =====================================================================

    /// Set the royalty policy for `asset`. Owner-only; the policy in force
    /// at settlement time governs the split.
    pub fn set_royalty(
        &self,
        caller: Principal,
        asset: AssetId,
        recipient: Principal,
        rate: BasisPoints,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.set_royalty(caller, asset, recipient, rate)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::RoyaltySet,
            EventPayload::Royalty {
                recipient,
                rate_bps: rate.get(),
            },
        );
        Ok(())
    }

    /// The royalty recipient and share for selling `asset` at `price`.
    pub fn royalty_info(&self, asset: AssetId, price: Amount) -> ArxResult<(Principal, Amount)> {
        self.state_read().registry.royalty_info(asset, price)
    }

    // =====================================================================
    // Auction engine
    // =====================================================================

    /// Open an auction. Returns the end time.
    pub fn start_auction(
        &self,
        caller: Principal,
        asset: AssetId,
        floor: Amount,
        duration_secs: u64,
    ) -> ArxResult<Timestamp> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let ends_at = self
            .auctions
            .start(&mut state.registry, caller, asset, floor, duration_secs, now)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::AuctionStarted,
            EventPayload::AuctionOpened {
                seller: caller,
                floor,
                ends_at,
            },
        );
        Ok(ends_at)
    }

    /// Place a bid of `amount` on a live auction.
    pub fn place_bid(
        &self,
        caller: Principal,
        asset: AssetId,
        amount: Amount,
    ) -> ArxResult<BidOutcome> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let State {
            registry, payouts, ..
        } = &mut *state;
        let outcome = self
            .auctions
            .place_bid(registry, payouts, caller, asset, amount, now)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::BidPlaced,
            EventPayload::Bid {
                bidder: caller,
                amount,
                refunded: outcome.refunded,
                ends_at: outcome.ends_at,
            },
        );
        if outcome.extended {
            self.events.append(
                now,
                Some(asset),
                EventKind::AuctionExtended,
                EventPayload::Empty,
            );
        }
        Ok(outcome)
    }

    /// Close the auction on `asset`. Owner-only; `TooEarly` before the end
    /// time. Settles to the highest bidder if one exists.
    pub fn end_auction(&self, caller: Principal, asset: AssetId) -> ArxResult<CloseOutcome> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let State {
            registry, payouts, ..
        } = &mut *state;
        let outcome = self.auctions.end(registry, payouts, caller, asset, now)?;

        match outcome {
            CloseOutcome::Sold {
                seller,
                winner,
                price,
                royalty,
                royalty_recipient,
            } => {
                self.events.append(
                    now,
                    Some(asset),
                    EventKind::AuctionSettled,
                    EventPayload::Settlement {
                        seller,
                        buyer: winner,
                        price,
                        royalty,
                        royalty_recipient,
                        change_returned: Amount::ZERO,
                    },
                );
            }
            CloseOutcome::NoSale => {
                self.events.append(
                    now,
                    Some(asset),
                    EventKind::AuctionClosed,
                    EventPayload::Empty,
                );
            }
        }
        Ok(outcome)
    }

    /// The live auction on `asset`, if any.
    pub fn auction(&self, asset: AssetId) -> ArxResult<Option<Auction>> {
        Ok(self.state_read().registry.get(asset)?.market.auction().copied())
    }

    // =====================================================================
    // Fixed-price marketplace
    // =====================================================================

    /// List `asset` at a fixed price.
    pub fn list(&self, caller: Principal, asset: AssetId, price: Amount) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        listing::list(&mut state.registry, caller, asset, price)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::Listed,
            EventPayload::Listing {
                seller: caller,
                price,
            },
        );
        Ok(())
    }

    /// Withdraw the listing on `asset`.
    pub fn delist(&self, caller: Principal, asset: AssetId) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        listing::delist(&mut state.registry, caller, asset)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::Delisted,
            EventPayload::Actor { principal: caller },
        );
        Ok(())
    }

    /// Change the price of a live listing.
    pub fn update_price(
        &self,
        caller: Principal,
        asset: AssetId,
        new_price: Amount,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        listing::update_price(&mut state.registry, caller, asset, new_price)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::PriceUpdated,
            EventPayload::Price { price: new_price },
        );
        Ok(())
    }

    /// Buy a listed asset for `paid`.
    pub fn buy(
        &self,
        caller: Principal,
        asset: AssetId,
        paid: Amount,
    ) -> ArxResult<PurchaseOutcome> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let State {
            registry, payouts, ..
        } = &mut *state;
        let outcome = listing::buy(registry, payouts, caller, asset, paid)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::Purchased,
            EventPayload::Settlement {
                seller: outcome.seller,
                buyer: caller,
                price: outcome.price,
                royalty: outcome.royalty,
                royalty_recipient: outcome.royalty_recipient,
                change_returned: outcome.change,
            },
        );
        Ok(outcome)
    }

    /// The live listing on `asset`, if any.
    pub fn listing(&self, asset: AssetId) -> ArxResult<Option<Listing>> {
        Ok(self.state_read().registry.get(asset)?.market.listing().copied())
    }

    /// `true` if `asset` is listed.
    pub fn is_for_sale(&self, asset: AssetId) -> ArxResult<bool> {
        Ok(self.listing(asset)?.is_some())
    }

    /// Accumulated payout credit of `principal`.
    pub fn payout_balance(&self, principal: Principal) -> Amount {
        self.state_read().payouts.balance(principal)
    }

    // =====================================================================
    // Access & subscription
    // =====================================================================

    /// `true` from the expiry instant onward.
    pub fn is_expired(&self, asset: AssetId) -> ArxResult<bool> {
        let now = self.clock.now();
        self.access.is_expired(&self.state_read().registry, asset, now)
    }

    /// Owner-only direct override of the expiry timestamp.
    pub fn set_expiry(
        &self,
        caller: Principal,
        asset: AssetId,
        expiry: Timestamp,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        self.access
            .set_expiry(&mut state.registry, caller, asset, expiry)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::ExpirySet,
            EventPayload::Expiry { expiry },
        );
        Ok(())
    }

    /// Raise a principal's stored access level. Owner-only.
    pub fn upgrade_access(
        &self,
        caller: Principal,
        asset: AssetId,
        principal: Principal,
        level: AccessLevel,
    ) -> ArxResult<()> {
        self.set_access_level(caller, asset, principal, level)
    }

    /// Lower a principal's stored access level. The same symmetric setter
    /// as [`upgrade_access`](Self::upgrade_access).
    pub fn downgrade_access(
        &self,
        caller: Principal,
        asset: AssetId,
        principal: Principal,
        level: AccessLevel,
    ) -> ArxResult<()> {
        self.set_access_level(caller, asset, principal, level)
    }

    fn set_access_level(
        &self,
        caller: Principal,
        asset: AssetId,
        principal: Principal,
        level: AccessLevel,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        self.access
            .set_access_level(&mut state.registry, caller, asset, principal, level)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::AccessLevelSet,
            EventPayload::AccessLevel {
                principal,
                level,
                set_by: caller,
            },
        );
        Ok(())
    }

    /// The effective access level of `principal`, with any active loan
    /// folded in.
    pub fn access_level(&self, asset: AssetId, principal: Principal) -> ArxResult<AccessLevel> {
        let now = self.clock.now();
        self.access
            .effective_access_level(&self.state_read().registry, asset, principal, now)
    }

    /// Extend the subscription by `extra_days` for `paid`. Returns the new
    /// expiry.
    pub fn extend_subscription(
        &self,
        caller: Principal,
        asset: AssetId,
        extra_days: u64,
        paid: Amount,
    ) -> ArxResult<Timestamp> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let State {
            registry, payouts, ..
        } = &mut *state;
        let new_expiry = self
            .access
            .extend_subscription(registry, payouts, caller, asset, extra_days, paid)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::SubscriptionExtended,
            EventPayload::Extension {
                paid_by: caller,
                extra_days,
                paid,
                new_expiry,
            },
        );
        Ok(new_expiry)
    }

    /// `true` iff the asset is inside the notice window of its expiry.
    pub fn expiry_notification_due(&self, asset: AssetId) -> ArxResult<bool> {
        let now = self.clock.now();
        self.access
            .expiry_notification_due(&self.state_read().registry, asset, now)
    }

    /// Seconds until expiry; zero once expired.
    pub fn remaining_secs(&self, asset: AssetId) -> ArxResult<u64> {
        let now = self.clock.now();
        self.access
            .remaining_secs(&self.state_read().registry, asset, now)
    }

    /// Issue the one-shot post-expiry certificate.
    pub fn issue_certificate(&self, caller: Principal, asset: AssetId) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        self.access
            .issue_certificate(&mut state.registry, caller, asset, now)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::CertificateIssued,
            EventPayload::Actor { principal: caller },
        );
        Ok(())
    }

    /// Lend access on `asset` to `borrower` for `days`. Returns the return
    /// time.
    pub fn lend(
        &self,
        caller: Principal,
        asset: AssetId,
        borrower: Principal,
        days: u64,
    ) -> ArxResult<Timestamp> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let until = self
            .access
            .lend(&mut state.registry, caller, asset, borrower, days, now)?;

        self.events.append(
            now,
            Some(asset),
            EventKind::Lent,
            EventPayload::Loan { borrower, until },
        );
        Ok(until)
    }

    /// The recorded loan on `asset`, if any.
    pub fn lending_info(&self, asset: AssetId) -> ArxResult<Option<Loan>> {
        self.access.lending_info(&self.state_read().registry, asset)
    }

    // =====================================================================
    // Governance / roles
    // =====================================================================

    /// The current administrator.
    pub fn admin(&self) -> Principal {
        self.state_read().roles.admin()
    }

    /// `true` if the registry is paused.
    pub fn is_paused(&self) -> bool {
        self.state_read().roles.is_paused()
    }

    /// `true` if `principal` is banned.
    pub fn is_banned(&self, principal: Principal) -> bool {
        self.state_read().roles.is_banned(principal)
    }

    /// `true` if `principal` may mint.
    pub fn is_minter(&self, principal: Principal) -> bool {
        self.state_read().roles.is_minter(principal)
    }

    /// Recorded co-owners of `asset`.
    pub fn co_owners(&self, asset: AssetId) -> Vec<Principal> {
        self.state_read().roles.co_owners(asset).to_vec()
    }

    /// Whitelist `principal` as a minter. Admin-only.
    pub fn add_minter(&self, caller: Principal, principal: Principal) -> ArxResult<()> {
        self.role_change(caller, principal, EventKind::MinterAdded, |roles, p| {
            roles.add_minter(p);
        })
    }

    /// Remove `principal` from the minter whitelist. Admin-only.
    pub fn remove_minter(&self, caller: Principal, principal: Principal) -> ArxResult<()> {
        self.role_change(caller, principal, EventKind::MinterRemoved, |roles, p| {
            roles.remove_minter(p);
        })
    }

    /// Ban `principal` from every state-changing operation. Admin-only.
    pub fn ban(&self, caller: Principal, principal: Principal) -> ArxResult<()> {
        self.role_change(caller, principal, EventKind::PrincipalBanned, |roles, p| {
            roles.ban(p);
        })
    }

    /// Lift a ban. Admin-only.
    pub fn unban(&self, caller: Principal, principal: Principal) -> ArxResult<()> {
        self.role_change(caller, principal, EventKind::PrincipalUnbanned, |roles, p| {
            roles.unban(p);
        })
    }

    /// Hand the administrator role to `new_admin`. Admin-only.
    pub fn transfer_admin(&self, caller: Principal, new_admin: Principal) -> ArxResult<()> {
        self.role_change(caller, new_admin, EventKind::AdminTransferred, |roles, p| {
            roles.transfer_admin(p);
        })
    }

    fn role_change(
        &self,
        caller: Principal,
        principal: Principal,
        kind: EventKind,
        apply: impl FnOnce(&mut Roles, Principal),
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        require_admin(&state.roles, caller)?;
        apply(&mut state.roles, principal);

        self.events
            .append(now, None, kind, EventPayload::Actor { principal });
        Ok(())
    }

    /// Record a co-owner for `asset`. Permitted to the asset's owner or the
    /// administrator; the list is append-only.
    pub fn add_co_owner(
        &self,
        caller: Principal,
        asset: AssetId,
        principal: Principal,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;

        let owner = state.registry.owner_of(asset)?;
        if caller != owner && !state.roles.is_admin(caller) {
            return Err(OpError::Unauthorized(caller));
        }
        state.roles.add_co_owner(asset, principal);

        self.events.append(
            now,
            Some(asset),
            EventKind::CoOwnerAdded,
            EventPayload::Actor { principal },
        );
        Ok(())
    }

    /// Pause the registry: every state-changing operation except `unpause`
    /// is rejected with `Suspended`. Admin-only.
    pub fn pause(&self, caller: Principal) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        require_admin(&state.roles, caller)?;
        state.roles.set_paused(true);

        self.events
            .append(now, None, EventKind::Paused, EventPayload::Empty);
        Ok(())
    }

    /// Unpause the registry. Admin-only; the one state-changing operation
    /// that works while paused.
    pub fn unpause(&self, caller: Principal) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        require_not_banned(&state.roles, caller)?;
        require_admin(&state.roles, caller)?;
        state.roles.set_paused(false);

        self.events
            .append(now, None, EventKind::Unpaused, EventPayload::Empty);
        Ok(())
    }
}
