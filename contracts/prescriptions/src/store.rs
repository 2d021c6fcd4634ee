//! Single-key access to patient records.
//!
//! Each record lives under `(RECORD, patient)` in persistent storage as the
//! XDR encoding of [`PatientRecord`]. Every write and delete is logged as a
//! [`RecordChange`] in the record's history (see [`crate::history`]).

use soroban_sdk::xdr::{FromXdr, ToXdr};
use soroban_sdk::{symbol_short, Address, Bytes, Env, Symbol};

use crate::history::{self, RecordChange};
use crate::record::PatientRecord;
use crate::ContractError;

const TX_SEQ: Symbol = symbol_short!("TX_SEQ");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Identifier and clock reading of the invocation that is mutating state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TxContext {
    pub tx_id: u64,
    pub now: u64,
}

impl TxContext {
    /// Draws the next transaction sequence number.
    pub fn begin(env: &Env) -> Self {
        let tx_id = env
            .storage()
            .instance()
            .get::<_, u64>(&TX_SEQ)
            .unwrap_or(0)
            .saturating_add(1);
        env.storage().instance().set(&TX_SEQ, &tx_id);
        TxContext {
            tx_id,
            now: env.ledger().timestamp(),
        }
    }
}

pub fn record_key(patient_id: &Address) -> (Symbol, Address) {
    (symbol_short!("RECORD"), patient_id.clone())
}

fn extend_ttl_record_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn get_state(env: &Env, patient_id: &Address) -> Option<Bytes> {
    env.storage().persistent().get(&record_key(patient_id))
}

pub fn put_state(env: &Env, patient_id: &Address, value: &Bytes) {
    let key = record_key(patient_id);
    env.storage().persistent().set(&key, value);
    extend_ttl_record_key(env, &key);
}

pub fn del_state(env: &Env, tx: &TxContext, patient_id: &Address) {
    env.storage().persistent().remove(&record_key(patient_id));
    history::record(env, tx, patient_id, RecordChange::Deleted);
}

pub fn exists(env: &Env, patient_id: &Address) -> bool {
    env.storage().persistent().has(&record_key(patient_id))
}

pub fn encode(env: &Env, record: &PatientRecord) -> Bytes {
    record.clone().to_xdr(env)
}

pub fn decode(env: &Env, value: &Bytes) -> Result<PatientRecord, ContractError> {
    PatientRecord::from_xdr(env, value).map_err(|_| ContractError::MalformedRecord)
}

/// Loads a record, distinguishing absence from an undecodable payload.
pub fn read_record(env: &Env, patient_id: &Address) -> Result<PatientRecord, ContractError> {
    let value = get_state(env, patient_id).ok_or(ContractError::RecordNotFound)?;
    decode(env, &value)
}

/// Persists `record` and logs `change` against it.
pub fn write_record(env: &Env, tx: &TxContext, record: &PatientRecord, change: RecordChange) {
    let value = encode(env, record);
    put_state(env, &record.patient_id, &value);
    history::record(env, tx, &record.patient_id, change);
}

/// Loads the record for `patient_id`, or builds the placeholder record the
/// first issuance creates. Only absence creates; a malformed record is an
/// error rather than something to overwrite.
pub fn find_or_create(
    env: &Env,
    tx: &TxContext,
    patient_id: &Address,
    doctor_id: &Address,
) -> Result<PatientRecord, ContractError> {
    match read_record(env, patient_id) {
        Ok(record) => Ok(record),
        Err(ContractError::RecordNotFound) => Ok(PatientRecord::placeholder(
            env,
            patient_id.clone(),
            doctor_id.clone(),
            tx.now,
        )),
        Err(e) => Err(e),
    }
}
