use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an asset tracked by the registry.
///
/// Identifiers are dense and zero-based: the first minted asset is `0`, the
/// next is `1`, and so on. A revoked asset's identifier is never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(u64);

impl AssetId {
    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier as a slot index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for AssetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<AssetId> for u64 {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_roundtrip() {
        let id = AssetId::new(7);
        assert_eq!(u64::from(id), 7);
        assert_eq!(AssetId::from(7u64), id);
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", AssetId::new(3)), "asset:3");
    }

    #[test]
    fn ordering_follows_mint_order() {
        assert!(AssetId::new(0) < AssetId::new(1));
    }

    #[test]
    fn serde_roundtrip() {
        let id = AssetId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
