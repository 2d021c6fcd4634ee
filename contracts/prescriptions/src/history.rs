//! Bounded change log per patient record.
//!
//! Soroban storage keeps only the latest value of a key, so the contract
//! logs every change itself. Each entry lives under its own key
//! `(REC_HIST, patient, seq)` and holds only what changed, never a copy of
//! the whole record. A small `(REC_HIDX, patient)` entry tracks the live
//! window of sequence numbers; the oldest entries are removed once the window
//! exceeds [`Config::history_depth`](crate::config::Config).

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::config;
use crate::record::{Prescription, PrescriptionStatus};
use crate::store::TxContext;
use crate::ContractError;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// What one transaction changed on a patient record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordChange {
    /// A prescription was issued or changed status; holds its new state.
    Prescription(Prescription),
    /// The patient name was replaced.
    Renamed(String),
    /// The record was deleted.
    Deleted,
}

/// One entry of a record's change log.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordVersion {
    pub tx_id: u64,
    pub timestamp: u64,
    pub change: RecordChange,
}

/// A prescription as it stood after one transaction.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionVersion {
    pub tx_id: u64,
    pub timestamp: u64,
    pub prescription: Prescription,
}

/// Live window `[first, next)` of log sequence numbers.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HistoryIndex {
    pub first: u64,
    pub next: u64,
}

impl HistoryIndex {
    pub fn retained(&self) -> u64 {
        self.next - self.first
    }
}

pub fn index_key(patient_id: &Address) -> (Symbol, Address) {
    (symbol_short!("REC_HIDX"), patient_id.clone())
}

pub fn version_key(patient_id: &Address, seq: u64) -> (Symbol, Address, u64) {
    (symbol_short!("REC_HIST"), patient_id.clone(), seq)
}

pub fn index(env: &Env, patient_id: &Address) -> HistoryIndex {
    env.storage()
        .persistent()
        .get(&index_key(patient_id))
        .unwrap_or_default()
}

/// Logs `change` as made by `tx`, dropping entries beyond the configured depth.
pub fn record(env: &Env, tx: &TxContext, patient_id: &Address, change: RecordChange) {
    let depth = u64::from(config::get_config(env).history_depth);
    let storage = env.storage().persistent();
    let mut idx = index(env, patient_id);

    let key = version_key(patient_id, idx.next);
    storage.set(
        &key,
        &RecordVersion {
            tx_id: tx.tx_id,
            timestamp: tx.now,
            change,
        },
    );
    storage.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    idx.next += 1;

    while idx.retained() > depth {
        storage.remove(&version_key(patient_id, idx.first));
        idx.first += 1;
    }

    let key = index_key(patient_id);
    storage.set(&key, &idx);
    storage.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// The retained log, oldest first.
pub fn versions(env: &Env, patient_id: &Address) -> Vec<RecordVersion> {
    let idx = index(env, patient_id);
    let mut out = Vec::new(env);
    for seq in idx.first..idx.next {
        if let Some(version) = env
            .storage()
            .persistent()
            .get::<_, RecordVersion>(&version_key(patient_id, seq))
        {
            out.push_back(version);
        }
    }
    out
}

/// Successive states of one prescription, oldest first.
///
/// Lookups by id hit the first issued prescription, so a later `Active`
/// entry with the same id is a duplicate issuance and is left out. A delete
/// starts the sequence over.
pub fn prescription_versions(
    env: &Env,
    patient_id: &Address,
    prescription_id: &String,
) -> Vec<PrescriptionVersion> {
    let mut out: Vec<PrescriptionVersion> = Vec::new(env);
    let mut issued = false;

    for version in versions(env, patient_id).iter() {
        let rx = match version.change {
            RecordChange::Deleted => {
                issued = false;
                continue;
            }
            RecordChange::Renamed(_) => continue,
            RecordChange::Prescription(rx) => rx,
        };
        if rx.prescription_id != *prescription_id {
            continue;
        }
        if rx.status == PrescriptionStatus::Active {
            if issued {
                continue;
            }
            issued = true;
        }
        out.push_back(PrescriptionVersion {
            tx_id: version.tx_id,
            timestamp: version.timestamp,
            prescription: rx,
        });
    }
    out
}

pub fn require_versions(
    env: &Env,
    patient_id: &Address,
    prescription_id: &String,
) -> Result<Vec<PrescriptionVersion>, ContractError> {
    let out = prescription_versions(env, patient_id, prescription_id);
    if out.is_empty() {
        return Err(ContractError::NoMatchingPrescription);
    }
    Ok(out)
}
