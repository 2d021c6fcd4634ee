use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Role attribute carried by every identity that touches prescriptions.
///
/// Roles are matched exhaustively; there is no string form to compare, so
/// spelling and case cannot diverge between operations.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Unknown = 0,
    Patient = 1,
    Doctor = 2,
    Pharmacist = 3,
}

/// A role granted by the contract admin.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleAssignment {
    pub role: Role,
    pub assigned_by: Address,
    pub assigned_at: u64,
    pub expires_at: u64, // 0 means never expires
}

/// The authenticated caller of one invocation, with its role resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Caller {
    pub address: Address,
    pub role: Role,
}

impl Caller {
    pub fn require(&self, role: Role) -> Result<(), ContractError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ContractError::WrongRole)
        }
    }

    /// Either clinical role that handles dispensing decisions.
    pub fn require_clinician(&self) -> Result<(), ContractError> {
        match self.role {
            Role::Doctor | Role::Pharmacist => Ok(()),
            Role::Patient | Role::Unknown => Err(ContractError::WrongRole),
        }
    }
}

pub fn assignment_key(user: &Address) -> (Symbol, Address) {
    (symbol_short!("ROLE_ASN"), user.clone())
}

fn extend_ttl_assignment_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn assign_role(env: &Env, admin: &Address, user: &Address, role: Role, expires_at: u64) {
    let assignment = RoleAssignment {
        role,
        assigned_by: admin.clone(),
        assigned_at: env.ledger().timestamp(),
        expires_at,
    };

    let key = assignment_key(user);
    env.storage().persistent().set(&key, &assignment);
    extend_ttl_assignment_key(env, &key);
}

/// Returns `true` if an assignment existed.
pub fn remove_role(env: &Env, user: &Address) -> bool {
    let key = assignment_key(user);
    if !env.storage().persistent().has(&key) {
        return false;
    }
    env.storage().persistent().remove(&key);
    true
}

/// Retrieve the active assignment for a user, or None if it doesn't exist or is expired
pub fn get_active_assignment(env: &Env, user: &Address) -> Option<RoleAssignment> {
    let assignment = env
        .storage()
        .persistent()
        .get::<_, RoleAssignment>(&assignment_key(user))?;
    if assignment.expires_at == 0 || assignment.expires_at > env.ledger().timestamp() {
        Some(assignment)
    } else {
        None
    }
}

pub fn get_role(env: &Env, user: &Address) -> Result<Role, ContractError> {
    get_active_assignment(env, user)
        .map(|a| a.role)
        .ok_or(ContractError::RoleNotAssigned)
}

/// Resolves the role of an address that has already been authenticated.
pub fn resolve(env: &Env, address: &Address) -> Result<Caller, ContractError> {
    let role = get_role(env, address)?;
    Ok(Caller {
        address: address.clone(),
        role,
    })
}
