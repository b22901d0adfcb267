use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use arx_types::{Amount, Principal};

/// Credit ledger for settlement payouts.
///
/// Every value transfer the marketplace performs (seller proceeds, royalty
/// shares, displaced-bid refunds, overpayment change) lands here as a
/// credit in the same operation that caused it. The host drains credits to
/// its real payment rail; the registry only guarantees the bookkeeping is
/// exact and atomic with the state change.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Payouts {
    credits: HashMap<Principal, Amount>,
}

impl Payouts {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `principal`.
    pub fn credit(&mut self, principal: Principal, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let entry = self.credits.entry(principal).or_insert(Amount::ZERO);
        *entry = entry.saturating_add(amount);
        debug!(principal = %principal, %amount, balance = %entry, "payout credited");
    }

    /// Accumulated credit of `principal`.
    pub fn balance(&self, principal: Principal) -> Amount {
        self.credits.get(&principal).copied().unwrap_or(Amount::ZERO)
    }

    /// Sum of all outstanding credits.
    pub fn total(&self) -> Amount {
        self.credits.values().copied().sum()
    }

    /// Number of principals holding a credit.
    pub fn holder_count(&self) -> usize {
        self.credits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credits_accumulate_per_principal() {
        let mut payouts = Payouts::new();
        let a = Principal::named("a");
        let b = Principal::named("b");

        payouts.credit(a, Amount::new(10));
        payouts.credit(a, Amount::new(5));
        payouts.credit(b, Amount::new(7));

        assert_eq!(payouts.balance(a), Amount::new(15));
        assert_eq!(payouts.balance(b), Amount::new(7));
        assert_eq!(payouts.total(), Amount::new(22));
        assert_eq!(payouts.holder_count(), 2);
    }

    #[test]
    fn zero_credits_leave_no_entry() {
        let mut payouts = Payouts::new();
        payouts.credit(Principal::named("a"), Amount::ZERO);
        assert_eq!(payouts.holder_count(), 0);
        assert_eq!(payouts.balance(Principal::named("a")), Amount::ZERO);
    }
}
