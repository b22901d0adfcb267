use thiserror::Error;

use arx_gate::GateError;
use arx_types::{Amount, AssetId, Principal, Timestamp};

/// Structured failure returned by every registry operation.
///
/// The whole operation surface shares one failure-kind vocabulary, so a
/// single enum carries it. Every variant is raised before any mutation; a
/// returned `OpError` therefore implies the operation changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("unknown asset: {0}")]
    NotFound(AssetId),

    #[error("caller {caller} does not own {asset}")]
    NotOwner { asset: AssetId, caller: Principal },

    #[error("caller {0} lacks the required role")]
    Unauthorized(Principal),

    #[error("registry is paused")]
    Suspended,

    #[error("{0} is locked by a live auction")]
    Locked(AssetId),

    #[error("auction already active for {0}")]
    AlreadyActive(AssetId),

    #[error("no live auction for {0}")]
    NotActive(AssetId),

    #[error("auction for {asset} cannot close before {ends_at}")]
    TooEarly { asset: AssetId, ends_at: Timestamp },

    #[error("bid {bid} does not exceed the current highest bid {highest}")]
    BidTooLow { bid: Amount, highest: Amount },

    #[error("{0} is not for sale")]
    NotForSale(AssetId),

    #[error("insufficient payment: required {required}, paid {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    #[error("{0} was sold at auction and can no longer be listed")]
    AlreadySoldAtAuction(AssetId),

    #[error("subscription for {0} has not expired")]
    NotExpired(AssetId),

    #[error("certificate for {0} was already issued")]
    AlreadyIssued(AssetId),

    #[error("principal {0} is banned from the registry")]
    Banned(Principal),
}

impl From<GateError> for OpError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthorized(p) => Self::Unauthorized(p),
            GateError::Banned(p) => Self::Banned(p),
            GateError::Suspended => Self::Suspended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_asset() {
        let err = OpError::NotFound(AssetId::new(999));
        assert_eq!(err.to_string(), "unknown asset: asset:999");
    }

    #[test]
    fn display_names_amounts() {
        let err = OpError::BidTooLow {
            bid: Amount::new(100),
            highest: Amount::new(150),
        };
        assert_eq!(
            err.to_string(),
            "bid 100 does not exceed the current highest bid 150"
        );
    }

    #[test]
    fn gate_errors_convert() {
        let p = Principal::named("x");
        assert_eq!(OpError::from(GateError::Banned(p)), OpError::Banned(p));
        assert_eq!(OpError::from(GateError::Suspended), OpError::Suspended);
        assert_eq!(
            OpError::from(GateError::Unauthorized(p)),
            OpError::Unauthorized(p)
        );
    }
}
