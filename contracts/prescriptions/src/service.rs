//! Prescription operations.
//!
//! Every operation is one read-modify-write of a single patient record:
//! check the caller's role, load the record, validate and mutate in memory,
//! write back, notify. Validation failures never write, with one exception:
//! filling an `Active` prescription past its expiry date persists the
//! `Expired` transition and then reports [`ContractError::PrescriptionExpired`].

use soroban_sdk::{Address, Env, String, Vec};

use crate::events;
use crate::history::{self, PrescriptionVersion, RecordChange};
use crate::lifecycle::{self, FillOutcome};
use crate::rbac::{Caller, Role};
use crate::record::{PatientRecord, Prescription, PrescriptionStatus};
use crate::store::{self, TxContext};
use crate::validation;
use crate::ContractError;

/// Input of [`issue`], bundled so the contract surface stays readable.
#[derive(Clone, Debug)]
pub struct IssueRequest {
    pub prescription_id: String,
    pub patient_id: Address,
    pub medication_name: String,
    pub dosage: String,
    pub instructions: String,
    pub expiry_date: Option<String>,
}

pub fn issue(env: &Env, caller: &Caller, req: IssueRequest) -> Result<Prescription, ContractError> {
    caller.require(Role::Doctor)?;
    if caller.address == req.patient_id {
        return Err(ContractError::SelfPrescription);
    }

    let tx = TxContext::begin(env);
    let mut record = store::find_or_create(env, &tx, &req.patient_id, &caller.address)?;

    let prescription = Prescription {
        prescription_id: req.prescription_id,
        patient_id: req.patient_id,
        created_by: caller.address.clone(),
        medication_name: req.medication_name,
        dosage: req.dosage,
        instructions: req.instructions,
        status: PrescriptionStatus::Active,
        tx_id: tx.tx_id,
        timestamp: tx.now,
        expiry_date: req.expiry_date,
    };
    record.append(prescription.clone(), tx.now);
    store::write_record(
        env,
        &tx,
        &record,
        RecordChange::Prescription(prescription.clone()),
    );

    events::publish_prescription_issued(
        env,
        prescription.patient_id.clone(),
        prescription.prescription_id.clone(),
        caller.address.clone(),
        tx.tx_id,
    );

    Ok(prescription)
}

/// Loads the record and the first prescription matching `prescription_id`.
fn locate(
    env: &Env,
    patient_id: &Address,
    prescription_id: &String,
) -> Result<(PatientRecord, u32, Prescription), ContractError> {
    let record = store::read_record(env, patient_id)?;
    let (idx, rx) = record
        .find(prescription_id)
        .ok_or(ContractError::PrescriptionNotFound)?;
    Ok((record, idx, rx))
}

pub fn revoke(
    env: &Env,
    caller: &Caller,
    patient_id: &Address,
    prescription_id: &String,
) -> Result<Prescription, ContractError> {
    caller.require(Role::Doctor)?;
    let (mut record, idx, mut rx) = locate(env, patient_id, prescription_id)?;

    lifecycle::check_revocable(&rx)?;
    if rx.created_by != caller.address {
        return Err(ContractError::NotPrescriber);
    }

    let tx = TxContext::begin(env);
    lifecycle::transition(&mut rx, PrescriptionStatus::Revoked, tx.tx_id, tx.now);
    record.replace(idx, rx.clone(), tx.now);
    store::write_record(env, &tx, &record, RecordChange::Prescription(rx.clone()));

    events::publish_prescription_revoked(
        env,
        patient_id.clone(),
        prescription_id.clone(),
        caller.address.clone(),
        tx.tx_id,
    );

    Ok(rx)
}

/// Persists `Active -> Expired` for the prescription at `idx`.
fn write_expired(
    env: &Env,
    record: &mut PatientRecord,
    idx: u32,
    mut rx: Prescription,
) -> Prescription {
    let tx = TxContext::begin(env);
    lifecycle::transition(&mut rx, PrescriptionStatus::Expired, tx.tx_id, tx.now);
    record.replace(idx, rx.clone(), tx.now);
    store::write_record(env, &tx, record, RecordChange::Prescription(rx.clone()));

    events::publish_prescription_expired(
        env,
        rx.patient_id.clone(),
        rx.prescription_id.clone(),
        rx.expiry_date
            .clone()
            .unwrap_or_else(|| String::from_str(env, "")),
        tx.tx_id,
    );
    rx
}

pub fn fill(
    env: &Env,
    caller: &Caller,
    patient_id: &Address,
    prescription_id: &String,
) -> Result<Prescription, ContractError> {
    caller.require(Role::Pharmacist)?;
    let (mut record, idx, mut rx) = locate(env, patient_id, prescription_id)?;

    match lifecycle::check_fillable(&rx, env.ledger().timestamp())? {
        FillOutcome::Expire => {
            // Deliberate partial effect: the expiry is recorded even though
            // the fill itself is reported as failed.
            write_expired(env, &mut record, idx, rx);
            Err(ContractError::PrescriptionExpired)
        }
        FillOutcome::Fill => {
            let tx = TxContext::begin(env);
            lifecycle::transition(&mut rx, PrescriptionStatus::Filled, tx.tx_id, tx.now);
            record.replace(idx, rx.clone(), tx.now);
            store::write_record(env, &tx, &record, RecordChange::Prescription(rx.clone()));

            events::publish_prescription_filled(
                env,
                patient_id.clone(),
                prescription_id.clone(),
                caller.address.clone(),
                tx.tx_id,
            );
            Ok(rx)
        }
    }
}

/// Records the expiry of an `Active` prescription whose date has passed.
pub fn expire(
    env: &Env,
    caller: &Caller,
    patient_id: &Address,
    prescription_id: &String,
) -> Result<Prescription, ContractError> {
    caller.require_clinician()?;
    let (mut record, idx, rx) = locate(env, patient_id, prescription_id)?;
    lifecycle::check_expirable(&rx, env.ledger().timestamp())?;
    Ok(write_expired(env, &mut record, idx, rx))
}

/// The caller's own prescriptions; the caller's address is the record key.
pub fn my_prescriptions(env: &Env, caller: &Address) -> Result<Vec<Prescription>, ContractError> {
    let record = store::read_record(env, caller)?;
    Ok(record.prescriptions)
}

pub fn history_by_medication(
    env: &Env,
    patient_id: &Address,
    medication_name: &String,
) -> Result<Vec<Prescription>, ContractError> {
    let record = store::read_record(env, patient_id)?;
    let matches = record.by_medication(env, medication_name);
    if matches.is_empty() {
        return Err(ContractError::NoMatchingPrescription);
    }
    Ok(matches)
}

pub fn history_by_prescription(
    env: &Env,
    patient_id: &Address,
    prescription_id: &String,
) -> Result<Vec<PrescriptionVersion>, ContractError> {
    history::require_versions(env, patient_id, prescription_id)
}

/// Lets a patient replace the placeholder name on their own record.
pub fn rename_patient(
    env: &Env,
    caller: &Address,
    patient_id: &Address,
    name: String,
) -> Result<PatientRecord, ContractError> {
    if caller != patient_id {
        return Err(ContractError::NotRecordOwner);
    }
    validation::validate_name(&name)?;

    let mut record = store::read_record(env, patient_id)?;
    let tx = TxContext::begin(env);
    record.patient_name = name.clone();
    record.touch(tx.now);
    store::write_record(env, &tx, &record, RecordChange::Renamed(name));

    events::publish_patient_renamed(env, patient_id.clone());
    Ok(record)
}

/// Administrative removal; the caller has already been checked as admin.
pub fn delete(env: &Env, admin: &Address, patient_id: &Address) -> Result<(), ContractError> {
    if !store::exists(env, patient_id) {
        return Err(ContractError::RecordNotFound);
    }
    let tx = TxContext::begin(env);
    store::del_state(env, &tx, patient_id);
    events::publish_record_deleted(env, patient_id.clone(), admin.clone());
    Ok(())
}
