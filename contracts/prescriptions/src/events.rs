use crate::errors::ErrorContext;
use crate::rbac::Role;
use soroban_sdk::{symbol_short, Address, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

/// Event published when the admin assigns a role.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleAssignedEvent {
    pub user: Address,
    pub role: Role,
    pub expires_at: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleRemovedEvent {
    pub user: Address,
    pub timestamp: u64,
}

/// Event published when a doctor issues a prescription.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionIssuedEvent {
    pub patient_id: Address,
    pub prescription_id: String,
    pub created_by: Address,
    pub tx_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionRevokedEvent {
    pub patient_id: Address,
    pub prescription_id: String,
    pub revoked_by: Address,
    pub tx_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionFilledEvent {
    pub patient_id: Address,
    pub prescription_id: String,
    pub filled_by: Address,
    pub tx_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionExpiredEvent {
    pub patient_id: Address,
    pub prescription_id: String,
    pub expiry_date: String,
    pub tx_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientRenamedEvent {
    pub patient_id: Address,
    pub timestamp: u64,
}

/// Event published when the admin deletes a patient record.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordDeletedEvent {
    pub patient_id: Address,
    pub deleted_by: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_role_assigned(env: &Env, user: Address, role: Role, expires_at: u64) {
    let topics = (symbol_short!("ROLE_SET"), user.clone());
    let data = RoleAssignedEvent {
        user,
        role,
        expires_at,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_role_removed(env: &Env, user: Address) {
    let topics = (symbol_short!("ROLE_DEL"), user.clone());
    let data = RoleRemovedEvent {
        user,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes the `prescription_issued` notification for a patient and prescription.
pub fn publish_prescription_issued(
    env: &Env,
    patient_id: Address,
    prescription_id: String,
    created_by: Address,
    tx_id: u64,
) {
    let topics = (symbol_short!("RX_ISSUE"), patient_id.clone());
    let data = PrescriptionIssuedEvent {
        patient_id,
        prescription_id,
        created_by,
        tx_id,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_prescription_revoked(
    env: &Env,
    patient_id: Address,
    prescription_id: String,
    revoked_by: Address,
    tx_id: u64,
) {
    let topics = (symbol_short!("RX_REVOKE"), patient_id.clone());
    let data = PrescriptionRevokedEvent {
        patient_id,
        prescription_id,
        revoked_by,
        tx_id,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_prescription_filled(
    env: &Env,
    patient_id: Address,
    prescription_id: String,
    filled_by: Address,
    tx_id: u64,
) {
    let topics = (symbol_short!("RX_FILL"), patient_id.clone());
    let data = PrescriptionFilledEvent {
        patient_id,
        prescription_id,
        filled_by,
        tx_id,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_prescription_expired(
    env: &Env,
    patient_id: Address,
    prescription_id: String,
    expiry_date: String,
    tx_id: u64,
) {
    let topics = (symbol_short!("RX_EXPIRE"), patient_id.clone());
    let data = PrescriptionExpiredEvent {
        patient_id,
        prescription_id,
        expiry_date,
        tx_id,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_patient_renamed(env: &Env, patient_id: Address) {
    let topics = (symbol_short!("PAT_NAME"), patient_id.clone());
    let data = PatientRenamedEvent {
        patient_id,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_deleted(env: &Env, patient_id: Address, deleted_by: Address) {
    let topics = (symbol_short!("REC_DEL"), patient_id.clone());
    let data = RecordDeletedEvent {
        patient_id,
        deleted_by,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an error event for monitoring and indexing.
/// This event includes error code, category, severity, message, user, resource ID, retryable flag, and timestamp.
pub fn publish_error(env: &Env, error_code: u32, context: ErrorContext) {
    let topics = (
        symbol_short!("ERROR"),
        context.category.clone(),
        context.severity.clone(),
    );
    let data = (
        error_code,
        context.category,
        context.severity,
        context.message,
        context.user,
        context.resource_id,
        context.retryable,
        context.timestamp,
    );
    env.events().publish(topics, data);
}
