use tracing::{debug, info};

use arx_market::Payouts;
use arx_registry::{AccessLevel, CertificateState, Loan, OpError, Registry};
use arx_types::{Amount, AssetId, Principal, Timestamp};

use crate::config::AccessConfig;

/// Per-asset access levels, subscription expiry, certificates, and lending.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessEngine {
    config: AccessConfig,
}

impl AccessEngine {
    /// An engine with the given tuning.
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// The engine's tuning.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    // ---- Expiry ----

    /// `true` from the expiry instant onward.
    pub fn is_expired(
        &self,
        registry: &Registry,
        asset: AssetId,
        now: Timestamp,
    ) -> Result<bool, OpError> {
        Ok(now >= registry.get(asset)?.expiry)
    }

    /// Owner-only direct override of the expiry timestamp.
    pub fn set_expiry(
        &self,
        registry: &mut Registry,
        caller: Principal,
        asset: AssetId,
        expiry: Timestamp,
    ) -> Result<(), OpError> {
        let record = registry.require_owner_mut(asset, caller)?;
        record.expiry = expiry;
        debug!(%asset, %expiry, "expiry overridden");
        Ok(())
    }

    /// Extend the subscription by `extra_days`, paid for with `paid`.
    ///
    /// The extension is additive to the *current* expiry, not to now, so a
    /// pre-expiry renewal keeps the remaining time. Fails
    /// `InsufficientPayment` below `rate_per_day × extra_days`. The charge
    /// is credited to the asset's owner and any overpayment back to the
    /// caller. Returns the new expiry.
    pub fn extend_subscription(
        &self,
        registry: &mut Registry,
        payouts: &mut Payouts,
        caller: Principal,
        asset: AssetId,
        extra_days: u64,
        paid: Amount,
    ) -> Result<Timestamp, OpError> {
        let required = self
            .config
            .rate_per_day
            .checked_mul_units(extra_days)
            .ok_or(OpError::InsufficientPayment {
                required: Amount::new(u128::MAX),
                paid,
            })?;
        if paid < required {
            return Err(OpError::InsufficientPayment { required, paid });
        }

        let owner = registry.owner_of(asset)?;
        let change = paid.checked_sub(required).unwrap_or(Amount::ZERO);
        payouts.credit(owner, required);
        payouts.credit(caller, change);

        let record = registry.get_mut(asset)?;
        record.expiry = record.expiry.saturating_add_days(extra_days);
        info!(%asset, extra_days, new_expiry = %record.expiry, "subscription extended");
        Ok(record.expiry)
    }

    /// `true` iff the asset is not yet expired and within the notice window
    /// of its expiry. Never `true` once expired.
    pub fn expiry_notification_due(
        &self,
        registry: &Registry,
        asset: AssetId,
        now: Timestamp,
    ) -> Result<bool, OpError> {
        let expiry = registry.get(asset)?.expiry;
        Ok(now < expiry && now.secs_until(expiry) <= self.config.notice_window_secs)
    }

    /// Seconds until expiry; zero once expired.
    pub fn remaining_secs(
        &self,
        registry: &Registry,
        asset: AssetId,
        now: Timestamp,
    ) -> Result<u64, OpError> {
        Ok(now.secs_until(registry.get(asset)?.expiry))
    }

    // ---- Certificate ----

    /// Issue the one-shot post-expiry certificate to the owner.
    ///
    /// Fails `NotExpired` while the subscription still runs and
    /// `AlreadyIssued` on any second attempt.
    pub fn issue_certificate(
        &self,
        registry: &mut Registry,
        caller: Principal,
        asset: AssetId,
        now: Timestamp,
    ) -> Result<(), OpError> {
        let record = registry.require_owner(asset, caller)?;
        if now < record.expiry {
            return Err(OpError::NotExpired(asset));
        }
        if record.certificate.is_issued() {
            return Err(OpError::AlreadyIssued(asset));
        }

        let record = registry.get_mut(asset)?;
        record.certificate = CertificateState::Issued {
            to: caller,
            at: now,
        };
        info!(%asset, to = %caller, "certificate issued");
        Ok(())
    }

    // ---- Access levels ----

    /// Store an access level for `principal`. Owner-only. Upgrade and
    /// downgrade are the same setter; nothing enforces monotonicity.
    pub fn set_access_level(
        &self,
        registry: &mut Registry,
        caller: Principal,
        asset: AssetId,
        principal: Principal,
        level: AccessLevel,
    ) -> Result<(), OpError> {
        let record = registry.require_owner_mut(asset, caller)?;
        record.access_levels.insert(principal, level);
        debug!(%asset, principal = %principal, level, "access level stored");
        Ok(())
    }

    /// The effective access level of `principal` for `asset` at `now`.
    ///
    /// The stored level, except that an active borrower is treated as
    /// holding at least the owner's stored level. A lapsed loan changes
    /// nothing — the overlay is evaluated here and nowhere else.
    pub fn effective_access_level(
        &self,
        registry: &Registry,
        asset: AssetId,
        principal: Principal,
        now: Timestamp,
    ) -> Result<AccessLevel, OpError> {
        let record = registry.get(asset)?;
        let stored = record.stored_level(principal);
        match record.loan {
            Some(loan) if loan.borrower == principal && now < loan.until => {
                Ok(stored.max(record.stored_level(record.owner)))
            }
            _ => Ok(stored),
        }
    }

    // ---- Lending ----

    /// Lend access on `asset` to `borrower` for `days`. Owner-only;
    /// ownership itself is untouched. A new loan replaces any previous one.
    pub fn lend(
        &self,
        registry: &mut Registry,
        caller: Principal,
        asset: AssetId,
        borrower: Principal,
        days: u64,
        now: Timestamp,
    ) -> Result<Timestamp, OpError> {
        let until = now.saturating_add_days(days);
        let record = registry.require_owner_mut(asset, caller)?;
        record.loan = Some(Loan { borrower, until });
        info!(%asset, borrower = %borrower, %until, "asset lent");
        Ok(until)
    }

    /// The recorded loan, if any — including a lapsed one, which callers
    /// judge against `until` themselves.
    pub fn lending_info(
        &self,
        registry: &Registry,
        asset: AssetId,
    ) -> Result<Option<Loan>, OpError> {
        Ok(registry.get(asset)?.loan)
    }
}
