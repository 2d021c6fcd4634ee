#![no_std]

pub mod config;
pub mod errors;
pub mod events;
pub mod expiry;
pub mod history;
pub mod lifecycle;
pub mod rbac;
pub mod record;
pub mod service;
pub mod store;
pub mod validation;

use soroban_sdk::{contract, contractimpl, Address, Env, String, Vec};

pub use config::Config;
pub use errors::{create_error_context, ContractError, ErrorCategory, ErrorContext, ErrorSeverity};
pub use history::{PrescriptionVersion, RecordChange, RecordVersion};
pub use rbac::{Role, RoleAssignment};
pub use record::{PatientRecord, Prescription, PrescriptionStatus};

use errors::report;
use rbac::Caller;
use service::IssueRequest;

#[contract]
pub struct PrescriptionLedgerContract;

/// Authenticates `caller` and resolves its role from the registry.
fn authenticate(env: &Env, caller: &Address) -> Result<Caller, ContractError> {
    caller.require_auth();
    rbac::resolve(env, caller)
}

/// Authenticates `caller` and checks it is the configured admin.
fn authenticate_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    config::require_admin(env, caller)
}

#[contractimpl]
impl PrescriptionLedgerContract {
    /// Initialize the contract with an admin address
    pub fn initialize(env: Env, admin: Address) -> Result<(), ContractError> {
        admin.require_auth();
        config::initialize(&env, &admin)
            .map_err(|e| report(&env, e, Some(admin.clone()), "initialize"))?;

        events::publish_initialized(&env, admin);
        Ok(())
    }

    /// Get the admin address
    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        config::get_admin(&env)
    }

    /// Check if the contract is initialized
    pub fn is_initialized(env: Env) -> bool {
        config::is_initialized(&env)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }

    pub fn get_config(env: Env) -> Config {
        config::get_config(&env)
    }

    /// Replace the contract configuration. Admin only.
    pub fn set_config(env: Env, caller: Address, config: Config) -> Result<(), ContractError> {
        authenticate_admin(&env, &caller)
            .and_then(|_| config::set_config(&env, &config))
            .map_err(|e| report(&env, e, Some(caller), "set_config"))
    }

    // ======================== Role Registry ========================

    /// Grants `role` to `user`. `expires_at` is a ledger timestamp, 0 for never.
    pub fn assign_role(
        env: Env,
        caller: Address,
        user: Address,
        role: Role,
        expires_at: u64,
    ) -> Result<(), ContractError> {
        authenticate_admin(&env, &caller)
            .map_err(|e| report(&env, e, Some(caller.clone()), "assign_role"))?;
        if role == Role::Unknown {
            return Err(report(
                &env,
                ContractError::InvalidInput,
                Some(caller),
                "assign_role",
            ));
        }

        rbac::assign_role(&env, &caller, &user, role, expires_at);
        events::publish_role_assigned(&env, user, role, expires_at);
        Ok(())
    }

    pub fn remove_role(env: Env, caller: Address, user: Address) -> Result<(), ContractError> {
        authenticate_admin(&env, &caller)
            .map_err(|e| report(&env, e, Some(caller.clone()), "remove_role"))?;
        if !rbac::remove_role(&env, &user) {
            return Err(report(
                &env,
                ContractError::RoleNotAssigned,
                Some(user),
                "remove_role",
            ));
        }

        events::publish_role_removed(&env, user);
        Ok(())
    }

    /// Role attribute of `user`, ignoring expired assignments.
    pub fn get_user_role(env: Env, user: Address) -> Result<Role, ContractError> {
        rbac::get_role(&env, &user)
    }

    // ======================== Prescriptions ========================

    /// Issue a new `Active` prescription. Doctors only, never to themselves.
    ///
    /// The patient's record is created with a placeholder name on first use.
    #[allow(clippy::too_many_arguments)]
    pub fn issue_prescription(
        env: Env,
        caller: Address,
        prescription_id: String,
        patient_id: Address,
        medication_name: String,
        dosage: String,
        instructions: String,
        expiry_date: Option<String>,
    ) -> Result<Prescription, ContractError> {
        let request = IssueRequest {
            prescription_id,
            patient_id,
            medication_name,
            dosage,
            instructions,
            expiry_date,
        };
        authenticate(&env, &caller)
            .and_then(|c| service::issue(&env, &c, request))
            .map_err(|e| report(&env, e, Some(caller), "issue_prescription"))
    }

    /// Revoke an `Active` prescription. Only the doctor who issued it may do so.
    pub fn revoke_prescription(
        env: Env,
        caller: Address,
        patient_id: Address,
        prescription_id: String,
    ) -> Result<Prescription, ContractError> {
        authenticate(&env, &caller)
            .and_then(|c| service::revoke(&env, &c, &patient_id, &prescription_id))
            .map_err(|e| report(&env, e, Some(caller), "revoke_prescription"))
    }

    /// Dispense an `Active` prescription. Pharmacists only.
    ///
    /// A prescription past its expiry date fails with `PrescriptionExpired`.
    /// The host discards the writes of a failed invocation, so the `Expired`
    /// status is only persisted through [`Self::expire_prescription`].
    pub fn fill_prescription(
        env: Env,
        caller: Address,
        patient_id: Address,
        prescription_id: String,
    ) -> Result<Prescription, ContractError> {
        authenticate(&env, &caller)
            .and_then(|c| service::fill(&env, &c, &patient_id, &prescription_id))
            .map_err(|e| report(&env, e, Some(caller), "fill_prescription"))
    }

    /// Record `Active -> Expired` for a prescription whose expiry date has
    /// passed. Doctors and pharmacists only.
    pub fn expire_prescription(
        env: Env,
        caller: Address,
        patient_id: Address,
        prescription_id: String,
    ) -> Result<Prescription, ContractError> {
        authenticate(&env, &caller)
            .and_then(|c| service::expire(&env, &c, &patient_id, &prescription_id))
            .map_err(|e| report(&env, e, Some(caller), "expire_prescription"))
    }

    /// All prescriptions on the caller's own record, in issuance order.
    pub fn get_my_prescriptions(
        env: Env,
        caller: Address,
    ) -> Result<Vec<Prescription>, ContractError> {
        caller.require_auth();
        service::my_prescriptions(&env, &caller)
            .map_err(|e| report(&env, e, Some(caller), "get_my_prescriptions"))
    }

    /// Current prescriptions of a patient for one medication name (exact match).
    pub fn get_prescription_history(
        env: Env,
        patient_id: Address,
        medication_name: String,
    ) -> Result<Vec<Prescription>, ContractError> {
        service::history_by_medication(&env, &patient_id, &medication_name)
            .map_err(|e| report(&env, e, Some(patient_id), "get_prescription_history"))
    }

    /// Successive states of a single prescription, oldest first.
    pub fn get_prescription_versions(
        env: Env,
        patient_id: Address,
        prescription_id: String,
    ) -> Result<Vec<PrescriptionVersion>, ContractError> {
        service::history_by_prescription(&env, &patient_id, &prescription_id)
            .map_err(|e| report(&env, e, Some(patient_id), "get_prescription_versions"))
    }

    /// Retained change log of a patient record, including deletes.
    pub fn get_record_history(env: Env, patient_id: Address) -> Vec<RecordVersion> {
        history::versions(&env, &patient_id)
    }

    // ======================== Patient Records ========================

    pub fn read_asset(env: Env, patient_id: Address) -> Result<PatientRecord, ContractError> {
        store::read_record(&env, &patient_id)
            .map_err(|e| report(&env, e, Some(patient_id), "read_asset"))
    }

    pub fn asset_exists(env: Env, patient_id: Address) -> bool {
        store::exists(&env, &patient_id)
    }

    /// Lets a patient replace the placeholder name on their own record.
    pub fn update_patient_name(
        env: Env,
        caller: Address,
        patient_id: Address,
        name: String,
    ) -> Result<PatientRecord, ContractError> {
        caller.require_auth();
        service::rename_patient(&env, &caller, &patient_id, name)
            .map_err(|e| report(&env, e, Some(caller), "update_patient_name"))
    }

    /// Remove a patient record. Admin only; the deletion stays in the version log.
    pub fn delete_asset(env: Env, caller: Address, patient_id: Address) -> Result<(), ContractError> {
        authenticate_admin(&env, &caller)
            .and_then(|_| service::delete(&env, &caller, &patient_id))
            .map_err(|e| report(&env, e, Some(caller), "delete_asset"))
    }
}

#[cfg(test)]
mod test;
