use arx_types::Principal;

use crate::error::GateError;
use crate::roles::Roles;

/// Fail unless `caller` is the administrator.
pub fn require_admin(roles: &Roles, caller: Principal) -> Result<(), GateError> {
    if roles.is_admin(caller) {
        Ok(())
    } else {
        Err(GateError::Unauthorized(caller))
    }
}

/// Fail unless `caller` may mint (administrator or whitelisted minter).
pub fn require_minter(roles: &Roles, caller: Principal) -> Result<(), GateError> {
    if roles.is_minter(caller) {
        Ok(())
    } else {
        Err(GateError::Unauthorized(caller))
    }
}

/// Fail if `caller` is banned.
pub fn require_not_banned(roles: &Roles, caller: Principal) -> Result<(), GateError> {
    if roles.is_banned(caller) {
        Err(GateError::Banned(caller))
    } else {
        Ok(())
    }
}

/// Fail if the registry is paused.
pub fn require_not_paused(roles: &Roles) -> Result<(), GateError> {
    if roles.is_paused() {
        Err(GateError::Suspended)
    } else {
        Ok(())
    }
}
