use tracing::debug;

use arx_types::{Amount, AssetId, BasisPoints, Principal, Timestamp};

use crate::error::OpError;
use crate::record::{AccessLevel, AssetRecord, MarketState, RoyaltyPolicy};

/// The single owned asset store.
///
/// Every engine receives the registry by reference; there are no ambient
/// globals. Identifiers are dense and zero-based; a revoked asset leaves a
/// tombstone slot behind so its identifier is never reused and later reads
/// fail with `NotFound`.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    slots: Vec<Option<AssetRecord>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers ever assigned, including revoked ones.
    pub fn minted_count(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Number of live (non-revoked) assets.
    pub fn live_count(&self) -> u64 {
        self.slots.iter().filter(|s| s.is_some()).count() as u64
    }

    /// Identifiers of all live assets, in mint order.
    pub fn live_assets(&self) -> Vec<AssetId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| AssetId::new(i as u64)))
            .collect()
    }

    // ---- Record access ----

    /// The record for `asset`, or `NotFound`.
    pub fn get(&self, asset: AssetId) -> Result<&AssetRecord, OpError> {
        self.slots
            .get(asset.index())
            .and_then(Option::as_ref)
            .ok_or(OpError::NotFound(asset))
    }

    /// Mutable record for `asset`, or `NotFound`.
    pub fn get_mut(&mut self, asset: AssetId) -> Result<&mut AssetRecord, OpError> {
        self.slots
            .get_mut(asset.index())
            .and_then(Option::as_mut)
            .ok_or(OpError::NotFound(asset))
    }

    /// Current owner of `asset`.
    pub fn owner_of(&self, asset: AssetId) -> Result<Principal, OpError> {
        Ok(self.get(asset)?.owner)
    }

    /// The record, after checking that `caller` is its current owner.
    pub fn require_owner(
        &self,
        asset: AssetId,
        caller: Principal,
    ) -> Result<&AssetRecord, OpError> {
        let record = self.get(asset)?;
        if record.owner != caller {
            return Err(OpError::NotOwner { asset, caller });
        }
        Ok(record)
    }

    /// Mutable record, after checking that `caller` is its current owner.
    pub fn require_owner_mut(
        &mut self,
        asset: AssetId,
        caller: Principal,
    ) -> Result<&mut AssetRecord, OpError> {
        let owner = self.owner_of(asset)?;
        if owner != caller {
            return Err(OpError::NotOwner { asset, caller });
        }
        self.get_mut(asset)
    }

    // ---- Lifecycle ----

    /// Mint a new asset. Authorization (minter whitelist, pause) is the
    /// caller's concern; the store only assigns the identifier.
    pub fn mint(
        &mut self,
        owner: Principal,
        pointer: String,
        expiry: Timestamp,
        initial_level: AccessLevel,
    ) -> AssetId {
        let asset = AssetId::new(self.slots.len() as u64);
        self.slots
            .push(Some(AssetRecord::new(owner, pointer, expiry, initial_level)));
        debug!(%asset, owner = %owner, "asset minted");
        asset
    }

    /// Transfer ownership of `asset` from `from` to `to`.
    ///
    /// Fails `NotOwner` unless `from` is the current owner and `Locked`
    /// while an auction holds the asset. Any fixed-price listing is cleared:
    /// a listing never survives an ownership change, through any path.
    pub fn transfer(
        &mut self,
        asset: AssetId,
        from: Principal,
        to: Principal,
    ) -> Result<(), OpError> {
        let record = self.get(asset)?;
        if record.owner != from {
            return Err(OpError::NotOwner {
                asset,
                caller: from,
            });
        }
        if record.market.is_auction() {
            return Err(OpError::Locked(asset));
        }

        let record = self.get_mut(asset)?;
        record.owner = to;
        record.market = MarketState::Open;
        debug!(%asset, from = %from, to = %to, "ownership transferred");
        Ok(())
    }

    /// Transfer several assets from `from` to `to` as one operation.
    ///
    /// Every member is validated before any ownership changes, so a failing
    /// member rejects the whole batch with no partial state.
    pub fn batch_transfer(
        &mut self,
        assets: &[AssetId],
        from: Principal,
        to: Principal,
    ) -> Result<(), OpError> {
        for &asset in assets {
            let record = self.get(asset)?;
            if record.owner != from {
                return Err(OpError::NotOwner {
                    asset,
                    caller: from,
                });
            }
            if record.market.is_auction() {
                return Err(OpError::Locked(asset));
            }
        }
        for &asset in assets {
            let record = self.get_mut(asset)?;
            record.owner = to;
            record.market = MarketState::Open;
        }
        debug!(count = assets.len(), from = %from, to = %to, "batch transferred");
        Ok(())
    }

    /// Revoke `asset`: clear the record to a tombstone. Subsequent reads
    /// fail `NotFound`; the identifier is never reused.
    pub fn revoke(&mut self, asset: AssetId) -> Result<AssetRecord, OpError> {
        let slot = self
            .slots
            .get_mut(asset.index())
            .ok_or(OpError::NotFound(asset))?;
        let record = slot.take().ok_or(OpError::NotFound(asset))?;
        debug!(%asset, "asset revoked");
        Ok(record)
    }

    // ---- Bundling ----

    /// Bundle `members` under a newly minted parent asset owned by `caller`.
    ///
    /// Fails `NotOwner` if any member is not owned by `caller`. The member
    /// list is preserved verbatim on the parent; members themselves are not
    /// revoked, reparented, or locked.
    pub fn bundle(
        &mut self,
        caller: Principal,
        members: &[AssetId],
        pointer: String,
    ) -> Result<AssetId, OpError> {
        let mut max_expiry = Timestamp::ZERO;
        for &member in members {
            let record = self.get(member)?;
            if record.owner != caller {
                return Err(OpError::NotOwner {
                    asset: member,
                    caller,
                });
            }
            max_expiry = max_expiry.max(record.expiry);
        }

        let parent = self.mint(caller, pointer, max_expiry, 1);
        self.get_mut(parent)?.bundle = Some(members.to_vec());
        debug!(%parent, members = members.len(), "assets bundled");
        Ok(parent)
    }

    /// Member list of a bundle parent, in bundling order. Empty for a
    /// non-bundle asset.
    pub fn bundle_members(&self, asset: AssetId) -> Result<&[AssetId], OpError> {
        Ok(self
            .get(asset)?
            .bundle
            .as_deref()
            .unwrap_or(&[]))
    }

    // ---- Royalty ledger ----

    /// Set the royalty policy for `asset`. Only the current owner may set
    /// it; the policy read at settlement time governs the split, so a later
    /// owner can replace it before a pending sale closes.
    pub fn set_royalty(
        &mut self,
        caller: Principal,
        asset: AssetId,
        recipient: Principal,
        rate: BasisPoints,
    ) -> Result<(), OpError> {
        let record = self.require_owner_mut(asset, caller)?;
        record.royalty = Some(RoyaltyPolicy { recipient, rate });
        debug!(%asset, recipient = %recipient, rate = %rate, "royalty policy set");
        Ok(())
    }

    /// The settlement split for selling `asset` at `price`: the recipient
    /// and their royalty share. With no policy set, the recipient defaults
    /// to the current owner at rate zero — a net-zero split with ordinary
    /// behavior.
    pub fn royalty_info(
        &self,
        asset: AssetId,
        price: Amount,
    ) -> Result<(Principal, Amount), OpError> {
        let record = self.get(asset)?;
        match record.royalty {
            Some(policy) => Ok((policy.recipient, price.split_bps(policy.rate).royalty)),
            None => Ok((record.owner, Amount::ZERO)),
        }
    }
}
