use soroban_sdk::{contracttype, Address, Env};

pub const DAY_IN_LEDGERS: u32 = 17280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const POSITION_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const POSITION_LIFETIME_THRESHOLD: u32 = POSITION_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    /// Token staked in every pool
    pub pool_token: Address,
    /// Receipt token minted 1:1 against stakes
    pub receipt_token: Address,
    pub reward_token1: Address,
    pub reward_token2: Option<Address>,
    /// Farm-wide end of reward accrual
    pub maturity: u64,
    pub max_reward_ratio1: i128,
    pub max_reward_ratio2: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub start_time: u64,
    /// Reward units per staked unit per second, scaled by SCALE
    pub reward_ratio1: i128,
    /// Zero when the pool pays no second reward
    pub reward_ratio2: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserData {
    pub deposited: i128,
    /// Start of the current accrual window
    pub deposit_time: u64,
    /// Rewards settled from earlier windows, not yet paid
    pub accrued_rewards1: i128,
    pub accrued_rewards2: i128,
}

/// Rewards promised to stakers through maturity
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Allocation {
    pub rewards1: i128,
    pub rewards2: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    Pool(u32),
    PoolCounter,
    User(Address, u32), // (user, pool_id)
    Allocation,
    Initialized,
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_user(env: &Env, user: &Address, pool_id: u32) -> Option<UserData> {
    let key = DataKey::User(user.clone(), pool_id);
    let data = env.storage().persistent().get::<DataKey, UserData>(&key);
    if data.is_some() {
        env.storage().persistent().extend_ttl(
            &key,
            POSITION_LIFETIME_THRESHOLD,
            POSITION_BUMP_AMOUNT,
        );
    }
    data
}

pub fn write_user(env: &Env, user: &Address, pool_id: u32, data: &UserData) {
    let key = DataKey::User(user.clone(), pool_id);
    env.storage().persistent().set(&key, data);
    env.storage()
        .persistent()
        .extend_ttl(&key, POSITION_LIFETIME_THRESHOLD, POSITION_BUMP_AMOUNT);
}

pub fn remove_user(env: &Env, user: &Address, pool_id: u32) {
    env.storage()
        .persistent()
        .remove(&DataKey::User(user.clone(), pool_id));
}

pub fn read_allocation(env: &Env) -> Allocation {
    env.storage()
        .instance()
        .get(&DataKey::Allocation)
        .unwrap_or_default()
}

pub fn write_allocation(env: &Env, allocation: &Allocation) {
    env.storage().instance().set(&DataKey::Allocation, allocation);
}
