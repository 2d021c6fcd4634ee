use soroban_sdk::{contracterror, contracttype, Address, Env, String};

use crate::events;

/// Error categories, one per failure class a caller has to handle differently.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// The caller's identity or role attribute could not be resolved.
    Identity = 1,
    /// The resolved identity fails the operation's policy.
    Authorization = 2,
    /// The patient record or prescription does not exist.
    NotFound = 3,
    /// The requested transition is illegal from the current status.
    InvalidState = 4,
    /// Malformed input such as an unparseable expiry date.
    Validation = 5,
    /// Read, write or decode failure of the underlying store.
    Storage = 6,
    /// Contract initialisation problems.
    Lifecycle = 7,
}

/// Error severity levels indicating the impact and urgency of errors
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorContext {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub user: Option<Address>,
    pub resource_id: Option<String>,
    pub timestamp: u64,
    pub retryable: bool,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    RoleNotAssigned = 4,
    WrongRole = 5,
    SelfPrescription = 6,
    NotPrescriber = 7,
    RecordNotFound = 8,
    PrescriptionNotFound = 9,
    NoMatchingPrescription = 10,
    AlreadyFilled = 11,
    AlreadyRevoked = 12,
    AlreadyExpired = 13,
    PrescriptionExpired = 14,
    NotExpired = 15,
    InvalidExpiryDate = 16,
    InvalidInput = 17,
    InvalidConfig = 18,
    MalformedRecord = 19,
    StorageError = 20,
    NotRecordOwner = 21,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::RoleNotAssigned => ErrorCategory::Identity,
            ContractError::Unauthorized
            | ContractError::WrongRole
            | ContractError::SelfPrescription
            | ContractError::NotPrescriber
            | ContractError::NotRecordOwner => ErrorCategory::Authorization,
            ContractError::RecordNotFound
            | ContractError::PrescriptionNotFound
            | ContractError::NoMatchingPrescription => ErrorCategory::NotFound,
            ContractError::AlreadyFilled
            | ContractError::AlreadyRevoked
            | ContractError::AlreadyExpired
            | ContractError::PrescriptionExpired
            | ContractError::NotExpired => ErrorCategory::InvalidState,
            ContractError::InvalidExpiryDate
            | ContractError::InvalidInput
            | ContractError::InvalidConfig => ErrorCategory::Validation,
            ContractError::MalformedRecord | ContractError::StorageError => {
                ErrorCategory::Storage
            }
            ContractError::NotInitialized | ContractError::AlreadyInitialized => {
                ErrorCategory::Lifecycle
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound | ErrorCategory::Validation | ErrorCategory::Lifecycle => {
                ErrorSeverity::Low
            }
            ErrorCategory::InvalidState | ErrorCategory::Identity => ErrorSeverity::Medium,
            ErrorCategory::Authorization => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Only store faults may succeed on a later attempt; retrying is left to
    /// whoever submits the transaction.
    pub fn retryable(&self) -> bool {
        matches!(self, ContractError::StorageError)
    }

    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "contract has not been initialized",
            ContractError::AlreadyInitialized => "contract is already initialized",
            ContractError::Unauthorized => "caller is not the contract admin",
            ContractError::RoleNotAssigned => "failed to get user role",
            ContractError::WrongRole => "caller role does not permit this operation",
            ContractError::SelfPrescription => {
                "doctors may not prescribe medications to themselves"
            }
            ContractError::NotPrescriber => "only prescribing doctor can revoke",
            ContractError::RecordNotFound => "patient record does not exist",
            ContractError::PrescriptionNotFound => "prescription not found",
            ContractError::NoMatchingPrescription => "no prescription found for medication",
            ContractError::AlreadyFilled => "prescription already filled",
            ContractError::AlreadyRevoked => "prescription already revoked",
            ContractError::AlreadyExpired => "prescription already expired",
            ContractError::PrescriptionExpired => "cannot fill expired prescription",
            ContractError::NotExpired => "prescription has not reached its expiry date",
            ContractError::InvalidExpiryDate => "invalid expiry date format",
            ContractError::InvalidInput => "invalid input parameters provided",
            ContractError::InvalidConfig => "invalid configuration value",
            ContractError::MalformedRecord => "stored patient record could not be decoded",
            ContractError::StorageError => "failed to access world state",
            ContractError::NotRecordOwner => "only the patient may update their record",
        }
    }
}

pub fn create_error_context(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource_id: Option<String>,
) -> ErrorContext {
    ErrorContext {
        category: error.category(),
        severity: error.severity(),
        message: String::from_str(env, error.message()),
        user,
        resource_id,
        timestamp: env.ledger().timestamp(),
        retryable: error.retryable(),
    }
}

/// Publishes the error as an `ERROR` event and hands it back, so entrypoints
/// can write `Err(report(..))` or `.map_err(|e| report(..))`.
pub fn report(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource: &str,
) -> ContractError {
    let context = create_error_context(env, error, user, Some(String::from_str(env, resource)));
    events::publish_error(env, error as u32, context);
    error
}
