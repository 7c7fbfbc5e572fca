use sudo::RunningAs;

use super::error::{ProvisionError, Result};

/// Fails unless the effective user is root. A setuid-root binary counts as
/// privileged since only the effective uid matters to the account tools.
///
/// Must run before any lookup or mutation; dry runs go through it as well.
pub fn require_elevated_privilege() -> Result<()> {
    check_running_as(sudo::check())
}

pub fn check_running_as(current: RunningAs) -> Result<()> {
    match current {
        RunningAs::Root | RunningAs::Suid => Ok(()),
        RunningAs::User => Err(ProvisionError::Privilege),
    }
}
