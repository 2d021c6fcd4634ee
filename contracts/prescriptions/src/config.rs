use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");

pub const DEFAULT_HISTORY_DEPTH: u32 = 20;
pub const MAX_HISTORY_DEPTH: u32 = 100;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Tunables held in instance storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Versions kept per patient record for the history queries.
    pub history_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ContractError> {
        if !(1..=MAX_HISTORY_DEPTH).contains(&self.history_depth) {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }
}

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub fn initialize(env: &Env, admin: &Address) -> Result<(), ContractError> {
    if is_initialized(env) {
        return Err(ContractError::AlreadyInitialized);
    }
    env.storage().instance().set(&ADMIN, admin);
    env.storage().instance().set(&CONFIG, &Config::default());
    env.storage().instance().set(&INITIALIZED, &true);
    extend_ttl_instance(env);
    Ok(())
}

pub fn get_admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&ADMIN)
        .ok_or(ContractError::NotInitialized)
}

/// Fails unless `caller` is the configured admin.
pub fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
    let admin = get_admin(env)?;
    if *caller != admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub fn get_config(env: &Env) -> Config {
    env.storage().instance().get(&CONFIG).unwrap_or_default()
}

pub fn set_config(env: &Env, config: &Config) -> Result<(), ContractError> {
    config.validate()?;
    env.storage().instance().set(&CONFIG, config);
    extend_ttl_instance(env);
    Ok(())
}
