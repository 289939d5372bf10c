use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals

pub const DAY_IN_LEDGERS: u32 = 17280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Parameters fixed at initialization
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    /// Bond token contract (the bond id)
    pub bond_token: Address,
    /// Underlying asset deposited and redeemed
    pub token: Address,
    /// Unix timestamp when deposits open
    pub start_time: u64,
    /// Unix timestamp of maturity
    pub end_time: u64,
    /// Seconds a published quote stays valid
    pub quote_period: u64,
    /// Smallest accepted deposit
    pub min_deposit: i128,
}

/// Bonds issued per unit of underlying, scaled by SCALE
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Quote {
    pub amount: i128,
    pub expiration: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Treasury,
    Config,
    Quote,
    TotalBonds,
    TotalDeposit,
    AvailableRedemption,
    RedemptionSet,
    Initialized,
    Stopped,
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_i128(env: &Env, key: &DataKey) -> i128 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn write_i128(env: &Env, key: &DataKey, amount: i128) {
    env.storage().instance().set(key, &amount);
}

/// Returns the quote only while it is live
pub fn read_live_quote(env: &Env, now: u64) -> Option<Quote> {
    env.storage()
        .instance()
        .get::<DataKey, Quote>(&DataKey::Quote)
        .filter(|quote| quote.amount > 0 && now <= quote.expiration)
}
