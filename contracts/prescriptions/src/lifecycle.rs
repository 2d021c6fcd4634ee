//! Prescription state machine.
//!
//! ```text
//!            revoke (prescriber)
//!   Active ───────────────────────▶ Revoked
//!     │  fill, not past expiry
//!     ├───────────────────────────▶ Filled
//!     │  fill or expire, past expiry
//!     └───────────────────────────▶ Expired
//! ```
//!
//! Filled, Revoked and Expired are terminal.

use crate::expiry;
use crate::record::{Prescription, PrescriptionStatus};
use crate::ContractError;

/// What a fill attempt on an `Active` prescription turns into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FillOutcome {
    Fill,
    Expire,
}

/// Any trigger applied to a terminal status fails with a status-specific error.
fn require_active(status: PrescriptionStatus) -> Result<(), ContractError> {
    match status {
        PrescriptionStatus::Active => Ok(()),
        PrescriptionStatus::Filled => Err(ContractError::AlreadyFilled),
        PrescriptionStatus::Revoked => Err(ContractError::AlreadyRevoked),
        PrescriptionStatus::Expired => Err(ContractError::AlreadyExpired),
    }
}

pub fn is_terminal(status: PrescriptionStatus) -> bool {
    require_active(status).is_err()
}

pub fn check_revocable(rx: &Prescription) -> Result<(), ContractError> {
    require_active(rx.status)
}

/// Decides the fill transition. Terminal statuses and unparseable expiry
/// dates are rejected before anything is written.
pub fn check_fillable(rx: &Prescription, now: u64) -> Result<FillOutcome, ContractError> {
    require_active(rx.status)?;
    if expiry::is_expired(&rx.expiry_date, now)? {
        Ok(FillOutcome::Expire)
    } else {
        Ok(FillOutcome::Fill)
    }
}

/// Only an `Active` prescription already past its expiry date may be expired.
pub fn check_expirable(rx: &Prescription, now: u64) -> Result<(), ContractError> {
    match check_fillable(rx, now)? {
        FillOutcome::Expire => Ok(()),
        FillOutcome::Fill => Err(ContractError::NotExpired),
    }
}

/// Moves `rx` to `to`, stamping the transaction that did it.
pub fn transition(rx: &mut Prescription, to: PrescriptionStatus, tx_id: u64, now: u64) {
    rx.status = to;
    rx.tx_id = tx_id;
    rx.timestamp = now;
}
