use soroban_sdk::{contracttype, Address, Env, String, Vec};

/// Display name given to a record created implicitly by the first issuance.
pub const PLACEHOLDER_NAME: &str = "Unknown";

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PrescriptionStatus {
    Active = 1,
    Filled = 2,
    Revoked = 3,
    Expired = 4,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prescription {
    pub prescription_id: String,
    pub patient_id: Address,
    pub created_by: Address,
    pub medication_name: String,
    pub dosage: String,
    pub instructions: String,
    pub status: PrescriptionStatus,
    /// Transaction that last changed `status`.
    pub tx_id: u64,
    /// Ledger time of the last status change.
    pub timestamp: u64,
    /// `YYYY-MM-DD`; `None` never expires.
    pub expiry_date: Option<String>,
}

/// The per-patient aggregate persisted under the patient's key.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientRecord {
    pub doctor_id: Address,
    pub patient_name: String,
    pub patient_id: Address,
    pub prescriptions: Vec<Prescription>,
    pub last_updated: u64,
}

impl PatientRecord {
    /// Fresh record for a patient seen for the first time.
    pub fn placeholder(env: &Env, patient_id: Address, doctor_id: Address, now: u64) -> Self {
        PatientRecord {
            doctor_id,
            patient_name: String::from_str(env, PLACEHOLDER_NAME),
            patient_id,
            prescriptions: Vec::new(env),
            last_updated: now,
        }
    }

    /// Index of the first prescription carrying `prescription_id`.
    ///
    /// Ids are not unique; when duplicates exist the earliest issued one wins.
    pub fn position(&self, prescription_id: &String) -> Option<u32> {
        self.prescriptions
            .iter()
            .position(|rx| rx.prescription_id == *prescription_id)
            .map(|idx| idx as u32)
    }

    /// First prescription carrying `prescription_id`, with its index.
    pub fn find(&self, prescription_id: &String) -> Option<(u32, Prescription)> {
        let idx = self.position(prescription_id)?;
        self.prescriptions.get(idx).map(|rx| (idx, rx))
    }

    pub fn append(&mut self, prescription: Prescription, now: u64) {
        self.prescriptions.push_back(prescription);
        self.touch(now);
    }

    pub fn replace(&mut self, idx: u32, prescription: Prescription, now: u64) {
        self.prescriptions.set(idx, prescription);
        self.touch(now);
    }

    /// `last_updated` never moves backwards, even if the ledger clock does.
    pub fn touch(&mut self, now: u64) {
        if now > self.last_updated {
            self.last_updated = now;
        }
    }

    /// Prescriptions whose medication name matches exactly, in issuance order.
    pub fn by_medication(&self, env: &Env, medication_name: &String) -> Vec<Prescription> {
        let mut matches = Vec::new(env);
        for rx in self.prescriptions.iter() {
            if rx.medication_name == *medication_name {
                matches.push_back(rx);
            }
        }
        matches
    }
}
