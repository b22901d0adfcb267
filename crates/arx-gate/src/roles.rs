use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use arx_types::{AssetId, Principal};

/// Process-wide role sets consulted by every operation.
///
/// The role sets are one owned value handed to the engines by reference;
/// mutation goes through the registry facade after the corresponding guard
/// has passed, so the mutators here carry no checks of their own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roles {
    admin: Principal,
    minters: HashSet<Principal>,
    banned: HashSet<Principal>,
    co_owners: HashMap<AssetId, Vec<Principal>>,
    paused: bool,
}

impl Roles {
    /// Fresh role sets with the given administrator and nothing else.
    pub fn new(admin: Principal) -> Self {
        Self {
            admin,
            minters: HashSet::new(),
            banned: HashSet::new(),
            co_owners: HashMap::new(),
            paused: false,
        }
    }

    // ---- Queries ----

    /// The current administrator.
    pub fn admin(&self) -> Principal {
        self.admin
    }

    /// `true` if `principal` is the administrator.
    pub fn is_admin(&self, principal: Principal) -> bool {
        self.admin == principal
    }

    /// `true` if `principal` may mint: administrator or whitelisted minter.
    pub fn is_minter(&self, principal: Principal) -> bool {
        self.is_admin(principal) || self.minters.contains(&principal)
    }

    /// `true` if `principal` is banned.
    pub fn is_banned(&self, principal: Principal) -> bool {
        self.banned.contains(&principal)
    }

    /// `true` if the registry is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The recorded co-owners of `asset`, in insertion order.
    pub fn co_owners(&self, asset: AssetId) -> &[Principal] {
        self.co_owners.get(&asset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` if `principal` is a recorded co-owner of `asset`.
    pub fn is_co_owner(&self, asset: AssetId, principal: Principal) -> bool {
        self.co_owners(asset).contains(&principal)
    }

    // ---- Mutators (guard first at the call site) ----

    /// Hand the administrator role to `new_admin`.
    pub fn transfer_admin(&mut self, new_admin: Principal) {
        info!(from = %self.admin, to = %new_admin, "administrator transferred");
        self.admin = new_admin;
    }

    /// Add `principal` to the minter whitelist. Returns `false` if already present.
    pub fn add_minter(&mut self, principal: Principal) -> bool {
        self.minters.insert(principal)
    }

    /// Remove `principal` from the minter whitelist. Returns `false` if absent.
    pub fn remove_minter(&mut self, principal: Principal) -> bool {
        self.minters.remove(&principal)
    }

    /// Ban `principal`. Returns `false` if already banned.
    pub fn ban(&mut self, principal: Principal) -> bool {
        info!(principal = %principal, "principal banned");
        self.banned.insert(principal)
    }

    /// Lift a ban. Returns `false` if `principal` was not banned.
    pub fn unban(&mut self, principal: Principal) -> bool {
        self.banned.remove(&principal)
    }

    /// Record a co-owner for `asset`. The list is append-only; duplicates
    /// are ignored. Returns `false` on a duplicate.
    pub fn add_co_owner(&mut self, asset: AssetId, principal: Principal) -> bool {
        let list = self.co_owners.entry(asset).or_default();
        if list.contains(&principal) {
            return false;
        }
        list.push(principal);
        true
    }

    /// Set the pause flag.
    pub fn set_paused(&mut self, paused: bool) {
        info!(paused, "pause flag changed");
        self.paused = paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Principal {
        Principal::named("admin")
    }

    #[test]
    fn admin_is_implicit_minter() {
        let roles = Roles::new(admin());
        assert!(roles.is_admin(admin()));
        assert!(roles.is_minter(admin()));
        assert!(!roles.is_minter(Principal::named("mallory")));
    }

    #[test]
    fn minter_whitelist_add_remove() {
        let mut roles = Roles::new(admin());
        let merchant = Principal::named("merchant");

        assert!(roles.add_minter(merchant));
        assert!(!roles.add_minter(merchant));
        assert!(roles.is_minter(merchant));

        assert!(roles.remove_minter(merchant));
        assert!(!roles.is_minter(merchant));
        assert!(!roles.remove_minter(merchant));
    }

    #[test]
    fn ban_and_unban() {
        let mut roles = Roles::new(admin());
        let target = Principal::named("target");

        assert!(!roles.is_banned(target));
        assert!(roles.ban(target));
        assert!(roles.is_banned(target));
        assert!(roles.unban(target));
        assert!(!roles.is_banned(target));
    }

    #[test]
    fn co_owner_list_is_append_only_and_deduplicated() {
        let mut roles = Roles::new(admin());
        let asset = AssetId::new(0);
        let a = Principal::named("a");
        let b = Principal::named("b");

        assert!(roles.add_co_owner(asset, a));
        assert!(roles.add_co_owner(asset, b));
        assert!(!roles.add_co_owner(asset, a));

        assert_eq!(roles.co_owners(asset), &[a, b]);
        assert!(roles.is_co_owner(asset, a));
        assert!(!roles.is_co_owner(AssetId::new(1), a));
    }

    #[test]
    fn admin_transfer_moves_the_role() {
        let mut roles = Roles::new(admin());
        let next = Principal::named("next");

        roles.transfer_admin(next);
        assert!(roles.is_admin(next));
        assert!(!roles.is_admin(admin()));
    }

    #[test]
    fn pause_flag() {
        let mut roles = Roles::new(admin());
        assert!(!roles.is_paused());
        roles.set_paused(true);
        assert!(roles.is_paused());
        roles.set_paused(false);
        assert!(!roles.is_paused());
    }

    #[test]
    fn serde_roundtrip() {
        let mut roles = Roles::new(admin());
        roles.add_minter(Principal::named("m"));
        roles.ban(Principal::named("x"));
        let json = serde_json::to_string(&roles).unwrap();
        let parsed: Roles = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_minter(Principal::named("m")));
        assert!(parsed.is_banned(Principal::named("x")));
    }
}
