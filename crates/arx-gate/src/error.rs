use thiserror::Error;

use arx_types::Principal;

/// Errors produced by authorization guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("caller {0} lacks the required role")]
    Unauthorized(Principal),

    #[error("principal {0} is banned from the registry")]
    Banned(Principal),

    #[error("registry is paused")]
    Suspended,
}
