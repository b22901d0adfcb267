use serde::{Deserialize, Serialize};

use arx_registry::AccessLevel;
use arx_types::{BasisPoints, Principal, Timestamp};

/// Parameters of a mint operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintRequest {
    /// Initial owner of the new asset.
    pub owner: Principal,
    /// Descriptive metadata pointer, opaque to the core.
    pub metadata_uri: String,
    /// Document pointer, opaque to the core.
    pub document_uri: String,
    /// Royalty policy to install at mint, payable to the owner. `None`
    /// leaves the asset without a policy until the owner sets one.
    pub royalty_rate: Option<BasisPoints>,
    /// Initial subscription expiry.
    pub expiry: Timestamp,
    /// Access level stored for the owner.
    pub initial_level: AccessLevel,
}

impl MintRequest {
    /// A minimal request: no royalty policy, access level 1.
    pub fn to_owner(owner: Principal, expiry: Timestamp) -> Self {
        Self {
            owner,
            metadata_uri: String::new(),
            document_uri: String::new(),
            royalty_rate: None,
            expiry,
            initial_level: 1,
        }
    }
}
