#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use super::*;
use soroban_sdk::testutils::{Address as _, Events, Ledger};
use soroban_sdk::xdr::{ContractEventBody, ToXdr};
use soroban_sdk::{symbol_short, Env, IntoVal, TryFromVal, TryIntoVal, Val};

const OCT_19_2026: u64 = 1_792_368_000;

struct Setup {
    env: Env,
    contract_id: Address,
    admin: Address,
    doctor: Address,
    pharmacist: Address,
    patient: Address,
}

fn setup() -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(OCT_19_2026);

    let contract_id = env.register(PrescriptionLedgerContract, ());
    let client = PrescriptionLedgerContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin);

    let doctor = Address::generate(&env);
    let pharmacist = Address::generate(&env);
    let patient = Address::generate(&env);
    client.assign_role(&admin, &doctor, &Role::Doctor, &0);
    client.assign_role(&admin, &pharmacist, &Role::Pharmacist, &0);
    client.assign_role(&admin, &patient, &Role::Patient, &0);

    Setup {
        env,
        contract_id,
        admin,
        doctor,
        pharmacist,
        patient,
    }
}

impl Setup {
    fn client(&self) -> PrescriptionLedgerContractClient<'_> {
        PrescriptionLedgerContractClient::new(&self.env, &self.contract_id)
    }

    fn s(&self, value: &str) -> String {
        String::from_str(&self.env, value)
    }

    fn issue(&self, id: &str, medication: &str, expiry: Option<&str>) -> Prescription {
        self.client().issue_prescription(
            &self.doctor,
            &self.s(id),
            &self.patient,
            &self.s(medication),
            &self.s("500mg"),
            &self.s("take with food"),
            &expiry.map(|d| self.s(d)),
        )
    }
}

/// Payload of the latest event this contract published under `topics`.
fn last_event(env: &Env, contract_id: &Address, topics: Vec<Val>) -> Option<Val> {
    let mut found = None;
    for event in env.events().all().filter_by_contract(contract_id).events() {
        let ContractEventBody::V0(body) = &event.body;
        let mut event_topics: Vec<Val> = Vec::new(env);
        for topic in body.topics.iter() {
            event_topics.push_back(Val::try_from_val(env, topic).unwrap());
        }
        if event_topics == topics {
            found = Some(Val::try_from_val(env, &body.data).unwrap());
        }
    }
    found
}

#[test]
fn test_initialize() {
    let t = setup();
    let client = t.client();

    assert!(client.is_initialized());
    assert_eq!(client.get_admin(), t.admin);
    assert_eq!(client.version(), 1);
    assert_eq!(client.get_config(), Config::default());

    let result = client.try_initialize(&t.admin);
    assert_eq!(result, Err(Ok(ContractError::AlreadyInitialized)));
}

#[test]
fn test_get_admin_before_initialize() {
    let env = Env::default();
    let contract_id = env.register(PrescriptionLedgerContract, ());
    let client = PrescriptionLedgerContractClient::new(&env, &contract_id);

    assert!(!client.is_initialized());
    assert_eq!(client.try_get_admin(), Err(Ok(ContractError::NotInitialized)));
}

#[test]
fn test_issue_creates_placeholder_record() {
    let t = setup();
    let client = t.client();
    assert!(!client.asset_exists(&t.patient));

    let rx = t.issue("rx1", "Amoxicillin", Some("2099-12-31"));
    assert_eq!(rx.status, PrescriptionStatus::Active);
    assert_eq!(rx.created_by, t.doctor);
    assert_eq!(rx.timestamp, OCT_19_2026);

    let record = client.read_asset(&t.patient);
    assert_eq!(record.patient_name, t.s(record::PLACEHOLDER_NAME));
    assert_eq!(record.doctor_id, t.doctor);
    assert_eq!(record.patient_id, t.patient);
    assert_eq!(record.prescriptions.len(), 1);
    assert_eq!(record.last_updated, OCT_19_2026);
}

#[test]
fn test_fill_then_refill_fails() {
    let t = setup();
    let client = t.client();
    let issued = t.issue("rx1", "Amoxicillin", Some("2099-12-31"));

    let filled = client.fill_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));
    assert_eq!(filled.status, PrescriptionStatus::Filled);
    assert_ne!(filled.tx_id, issued.tx_id);

    let again = client.try_fill_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));
    assert_eq!(again, Err(Ok(ContractError::AlreadyFilled)));
}

#[test]
fn test_fill_expired_persists_expired_status() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", Some("2026-10-18"));

    let caller = rbac::Caller {
        address: t.pharmacist.clone(),
        role: Role::Pharmacist,
    };
    let rx_id = t.s("rx1");
    let result = t.env.as_contract(&t.contract_id, || {
        service::fill(&t.env, &caller, &t.patient, &rx_id)
    });
    assert_eq!(result, Err(ContractError::PrescriptionExpired));

    let stored = t.client().read_asset(&t.patient);
    let rx = stored.prescriptions.get(0).unwrap();
    assert_eq!(rx.status, PrescriptionStatus::Expired);

    // Further triggers see the terminal status.
    let again = t.env.as_contract(&t.contract_id, || {
        service::fill(&t.env, &caller, &t.patient, &rx_id)
    });
    assert_eq!(again, Err(ContractError::AlreadyExpired));
}

#[test]
fn test_fill_expired_through_client_reports_error() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", Some("2026-10-18"));

    let result = t
        .client()
        .try_fill_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));
    assert_eq!(result, Err(Ok(ContractError::PrescriptionExpired)));

    let expired = t
        .client()
        .expire_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));
    assert_eq!(expired.status, PrescriptionStatus::Expired);
}

#[test]
fn test_fill_on_expiry_day_succeeds() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", Some("2026-10-19"));

    let filled = t
        .client()
        .fill_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));
    assert_eq!(filled.status, PrescriptionStatus::Filled);
}

#[test]
fn test_fill_with_malformed_expiry_writes_nothing() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", Some("31/12/2099"));
    let before = t.client().get_record_history(&t.patient).len();

    let result = t
        .client()
        .try_fill_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));
    assert_eq!(result, Err(Ok(ContractError::InvalidExpiryDate)));

    let rx = t.client().read_asset(&t.patient).prescriptions.get(0).unwrap();
    assert_eq!(rx.status, PrescriptionStatus::Active);
    assert_eq!(t.client().get_record_history(&t.patient).len(), before);
}

#[test]
fn test_malformed_record() {
    let t = setup();
    t.env.as_contract(&t.contract_id, || {
        let garbage = 7u32.to_xdr(&t.env);
        t.env
            .storage()
            .persistent()
            .set(&store::record_key(&t.patient), &garbage);
    });

    assert!(t.client().asset_exists(&t.patient));
    assert_eq!(
        t.client().try_read_asset(&t.patient),
        Err(Ok(ContractError::MalformedRecord))
    );

    // A corrupt record is never silently replaced by a fresh one.
    let result = t.client().try_issue_prescription(
        &t.doctor,
        &t.s("rx1"),
        &t.patient,
        &t.s("Amoxicillin"),
        &t.s("500mg"),
        &t.s("take with food"),
        &None,
    );
    assert_eq!(result, Err(Ok(ContractError::MalformedRecord)));
}

#[test]
fn test_update_patient_name() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", None);

    let record = t
        .client()
        .update_patient_name(&t.patient, &t.patient, &t.s("Jane Doe"));
    assert_eq!(record.patient_name, t.s("Jane Doe"));
    assert_eq!(record.prescriptions.len(), 1);

    let other = t
        .client()
        .try_update_patient_name(&t.doctor, &t.patient, &t.s("Mallory"));
    assert_eq!(other, Err(Ok(ContractError::NotRecordOwner)));

    let blank = t
        .client()
        .try_update_patient_name(&t.patient, &t.patient, &t.s(""));
    assert_eq!(blank, Err(Ok(ContractError::InvalidInput)));
}

#[test]
fn test_set_config() {
    let t = setup();
    let client = t.client();

    client.set_config(&t.admin, &Config { history_depth: 5 });
    assert_eq!(client.get_config().history_depth, 5);

    let zero = client.try_set_config(&t.admin, &Config { history_depth: 0 });
    assert_eq!(zero, Err(Ok(ContractError::InvalidConfig)));

    let not_admin = client.try_set_config(&t.doctor, &Config { history_depth: 10 });
    assert_eq!(not_admin, Err(Ok(ContractError::Unauthorized)));
}

#[test]
fn test_tx_ids_are_increasing() {
    let t = setup();
    let a = t.issue("rx1", "Amoxicillin", None);
    let b = t.issue("rx2", "Ibuprofen", None);
    let c = t
        .client()
        .revoke_prescription(&t.doctor, &t.patient, &t.s("rx1"));

    assert!(a.tx_id < b.tx_id);
    assert!(b.tx_id < c.tx_id);
}

#[test]
fn test_issue_publishes_event() {
    let t = setup();
    let rx = t.issue("rx1", "Amoxicillin", Some("2099-12-31"));

    let topics = (symbol_short!("RX_ISSUE"), t.patient.clone()).into_val(&t.env);
    let data = last_event(&t.env, &t.contract_id, topics).unwrap();
    let event: events::PrescriptionIssuedEvent = data.try_into_val(&t.env).unwrap();
    assert_eq!(event.patient_id, t.patient);
    assert_eq!(event.prescription_id, t.s("rx1"));
    assert_eq!(event.created_by, t.doctor);
    assert_eq!(event.tx_id, rx.tx_id);
    assert_eq!(event.timestamp, OCT_19_2026);
}

#[test]
fn test_revoke_publishes_event() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", None);
    let rx = t
        .client()
        .revoke_prescription(&t.doctor, &t.patient, &t.s("rx1"));

    let topics = (symbol_short!("RX_REVOKE"), t.patient.clone()).into_val(&t.env);
    let data = last_event(&t.env, &t.contract_id, topics).unwrap();
    let event: events::PrescriptionRevokedEvent = data.try_into_val(&t.env).unwrap();
    assert_eq!(event.patient_id, t.patient);
    assert_eq!(event.prescription_id, t.s("rx1"));
    assert_eq!(event.revoked_by, t.doctor);
    assert_eq!(event.tx_id, rx.tx_id);
}

#[test]
fn test_fill_publishes_event() {
    let t = setup();
    t.issue("rx1", "Amoxicillin", Some("2099-12-31"));
    let rx = t
        .client()
        .fill_prescription(&t.pharmacist, &t.patient, &t.s("rx1"));

    let topics = (symbol_short!("RX_FILL"), t.patient.clone()).into_val(&t.env);
    let data = last_event(&t.env, &t.contract_id, topics).unwrap();
    let event: events::PrescriptionFilledEvent = data.try_into_val(&t.env).unwrap();
    assert_eq!(event.patient_id, t.patient);
    assert_eq!(event.prescription_id, t.s("rx1"));
    assert_eq!(event.filled_by, t.pharmacist);
    assert_eq!(event.tx_id, rx.tx_id);
    assert_eq!(event.timestamp, OCT_19_2026);
}

#[test]
fn test_report_publishes_error_event() {
    let t = setup();
    let returned = t.env.as_contract(&t.contract_id, || {
        errors::report(
            &t.env,
            ContractError::AlreadyFilled,
            Some(t.pharmacist.clone()),
            "fill_prescription",
        )
    });
    assert_eq!(returned, ContractError::AlreadyFilled);

    let topics = (
        symbol_short!("ERROR"),
        ErrorCategory::InvalidState,
        ErrorSeverity::Medium,
    )
        .into_val(&t.env);
    let data = last_event(&t.env, &t.contract_id, topics).unwrap();
    let (code, category, severity, message, user, resource, retryable, timestamp): (
        u32,
        ErrorCategory,
        ErrorSeverity,
        String,
        Option<Address>,
        Option<String>,
        bool,
        u64,
    ) = data.try_into_val(&t.env).unwrap();
    assert_eq!(code, ContractError::AlreadyFilled as u32);
    assert_eq!(category, ErrorCategory::InvalidState);
    assert_eq!(severity, ErrorSeverity::Medium);
    assert_eq!(message, t.s("prescription already filled"));
    assert_eq!(user, Some(t.pharmacist.clone()));
    assert_eq!(resource, Some(t.s("fill_prescription")));
    assert!(!retryable);
    assert_eq!(timestamp, OCT_19_2026);
}
