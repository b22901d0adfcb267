use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Material used to derive a [`Principal`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrincipalSeed {
    /// An ed25519-style public key (32 bytes). The registry never inspects
    /// the key; it only hashes it.
    PublicKey([u8; 32]),
    /// A human-readable account label, for tooling and tests.
    Label(String),
}

/// Opaque, comparable identity of an actor interacting with the registry.
///
/// A `Principal` is derived deterministically from [`PrincipalSeed`] using
/// BLAKE3. The same seed always produces the same principal. Principals
/// carry no structure beyond equality, hashing, and ordering — the registry
/// makes no cryptographic assumptions about them.
///
/// Serializes as the 64-character hex string, so principal-keyed maps stay
/// representable in JSON.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal {
    hash: [u8; 32],
}

impl Principal {
    /// Derive a `Principal` from seed material.
    pub fn derive(seed: &PrincipalSeed) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"arx-principal-v1:");
        match seed {
            PrincipalSeed::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            PrincipalSeed::Label(label) => {
                hasher.update(b"label:");
                hasher.update(label.as_bytes());
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Derive a principal from a label. Shorthand for tooling and tests.
    pub fn named(label: &str) -> Self {
        Self::derive(&PrincipalSeed::Label(label.to_string()))
    }

    /// Create an ephemeral (random) principal for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&PrincipalSeed::PublicKey(bytes))
    }

    /// The raw 32-byte identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("pr:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `pr:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("pr:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }

    /// Create from a raw 32-byte identity. Use `derive()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl Serialize for Principal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.short_id())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let seed = PrincipalSeed::PublicKey([42u8; 32]);
        let p1 = Principal::derive(&seed);
        let p2 = Principal::derive(&seed);
        assert_eq!(p1, p2);
    }

    #[test]
    fn different_seeds_produce_different_principals() {
        let p1 = Principal::derive(&PrincipalSeed::PublicKey([1; 32]));
        let p2 = Principal::derive(&PrincipalSeed::PublicKey([2; 32]));
        assert_ne!(p1, p2);
    }

    #[test]
    fn label_and_pubkey_namespaces_are_distinct() {
        let bytes = [7u8; 32];
        let from_key = Principal::derive(&PrincipalSeed::PublicKey(bytes));
        let from_label = Principal::derive(&PrincipalSeed::Label(hex::encode(bytes)));
        assert_ne!(from_key, from_label);
    }

    #[test]
    fn named_principals_differ_by_label() {
        assert_ne!(Principal::named("alice"), Principal::named("bob"));
        assert_eq!(Principal::named("alice"), Principal::named("alice"));
    }

    #[test]
    fn ephemeral_principals_are_unique() {
        assert_ne!(Principal::ephemeral(), Principal::ephemeral());
    }

    #[test]
    fn short_id_format() {
        let p = Principal::derive(&PrincipalSeed::PublicKey([0; 32]));
        let short = p.short_id();
        assert!(short.starts_with("pr:"));
        assert_eq!(short.len(), 11); // "pr:" + 8 hex chars
    }

    #[test]
    fn hex_roundtrip() {
        let p = Principal::named("carol");
        let parsed = Principal::from_hex(&p.to_hex()).unwrap();
        assert_eq!(p, parsed);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let p = Principal::named("dave");
        let prefixed = format!("pr:{}", p.to_hex());
        assert_eq!(Principal::from_hex(&prefixed).unwrap(), p);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = Principal::from_hex("deadbeef").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 4
            }
        );
    }

    #[test]
    fn serde_roundtrip() {
        let p = Principal::named("erin");
        let json = serde_json::to_string(&p).unwrap();
        let parsed: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(p, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let p1 = Principal::from_raw([0; 32]);
        let p2 = Principal::from_raw([1; 32]);
        assert!(p1 < p2);
    }
}
