#![no_std]

mod error;
mod events;
mod rewards;
mod storage;

pub use error::Error;
use events::*;
use rewards::{calculate_rewards, elapsed, remaining, reserve_rewards};
pub use storage::{Allocation, FarmConfig, Pool, UserData};
use storage::{
    extend_instance, read_allocation, read_user, remove_user, write_allocation, write_user,
    DataKey,
};

use soroban_sdk::{contract, contractimpl, log, token, vec, Address, Env, IntoVal, Symbol};

#[contract]
pub struct YieldFarm;

#[contractimpl]
impl YieldFarm {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the farm
    ///
    /// The farm must already be the admin and an operator of `receipt_token`.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidTimestamp`: Maturity not in the future
    /// - `InvalidRewardConfig`: Negative max ratio, or only one of
    ///   reward_token2 / max_reward_ratio2 given
    /// - `ReceiptTokenNotLinked`: Farm is not the admin and an operator of the
    ///   receipt token
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token1: Address,
        reward_token2: Option<Address>,
        pool_token: Address,
        receipt_token: Address,
        maturity: u64,
        max_reward_ratio1: i128,
        max_reward_ratio2: Option<i128>,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        if maturity <= env.ledger().timestamp() {
            return Err(Error::InvalidTimestamp);
        }

        if max_reward_ratio1 < 0 {
            return Err(Error::InvalidRewardConfig);
        }

        let max_reward_ratio2 = match (&reward_token2, max_reward_ratio2) {
            (Some(_), Some(max)) if max >= 0 => max,
            (None, None) => 0,
            _ => return Err(Error::InvalidRewardConfig),
        };

        admin.require_auth();

        if !Self::controls_receipt_token(&env, &receipt_token) {
            return Err(Error::ReceiptTokenNotLinked);
        }

        let config = FarmConfig {
            pool_token,
            receipt_token,
            reward_token1,
            reward_token2,
            maturity,
            max_reward_ratio1,
            max_reward_ratio2,
        };

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::PoolCounter, &0u32);
        write_allocation(&env, &Allocation::default());
        extend_instance(&env);

        log!(&env, "farm initialized", maturity);

        Ok(())
    }

    /// Create a reward pool
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidTimestamp`: start_time at or after maturity
    /// - `RewardRatioTooHigh`: Ratio outside [0, max]
    /// - `InvalidRewardConfig`: Second ratio without a second reward token
    pub fn create_pool(
        env: Env,
        start_time: u64,
        reward_ratio1: i128,
        reward_ratio2: Option<i128>,
    ) -> Result<u32, Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        let config = Self::read_config(&env)?;

        if start_time >= config.maturity {
            return Err(Error::InvalidTimestamp);
        }

        if reward_ratio1 < 0 || reward_ratio1 > config.max_reward_ratio1 {
            return Err(Error::RewardRatioTooHigh);
        }

        let reward_ratio2 = match (reward_ratio2, &config.reward_token2) {
            (Some(ratio), Some(_)) => {
                if ratio < 0 || ratio > config.max_reward_ratio2 {
                    return Err(Error::RewardRatioTooHigh);
                }
                ratio
            }
            (Some(_), None) => return Err(Error::InvalidRewardConfig),
            (None, _) => 0,
        };

        let pool_id: u32 = env
            .storage()
            .instance()
            .get(&DataKey::PoolCounter)
            .unwrap_or(0);

        let pool = Pool {
            start_time,
            reward_ratio1,
            reward_ratio2,
        };

        env.storage().instance().set(&DataKey::Pool(pool_id), &pool);
        env.storage()
            .instance()
            .set(&DataKey::PoolCounter, &(pool_id + 1));

        env.events().publish(
            (Symbol::new(&env, "new_pool"), pool_id),
            PoolCreatedEvent {
                pool_id,
                start_time,
                reward_ratio1,
                reward_ratio2,
            },
        );

        Ok(pool_id)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        env.storage().instance().set(&DataKey::Admin, &new_admin);

        env.events().publish(
            (Symbol::new(&env, "admin_changed"), new_admin.clone()),
            AdminChangedEvent {
                previous: admin,
                admin: new_admin,
            },
        );

        Ok(())
    }

    // ============================================
    // USER FLOWS
    // ============================================

    /// Stake pool tokens
    ///
    /// Rewards earned so far on an existing stake are settled and the accrual
    /// window restarts. The new stake's yield through maturity is reserved
    /// against the farm's reward balance.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: amount <= 0
    /// - `PoolNotFound`: Pool doesn't exist
    /// - `PoolNotActive`: Before pool start or at/after maturity
    /// - `InsufficientRewards`: Reward balance cannot cover the allocation
    pub fn deposit(
        env: Env,
        depositor: Address,
        amount: i128,
        pool_id: u32,
    ) -> Result<i128, Error> {
        depositor.require_auth();
        extend_instance(&env);

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let config = Self::read_config(&env)?;
        let pool = Self::read_pool(&env, pool_id)?;

        let now = env.ledger().timestamp();
        if now < pool.start_time || now >= config.maturity {
            return Err(Error::PoolNotActive);
        }

        let mut user = read_user(&env, &depositor, pool_id).unwrap_or(UserData {
            deposited: 0,
            deposit_time: now,
            accrued_rewards1: 0,
            accrued_rewards2: 0,
        });

        let (earned1, earned2) = Self::earned(&pool, &user, now, config.maturity)?;
        user.accrued_rewards1 = earned1;
        user.accrued_rewards2 = earned2;

        // Reserves round up: payouts round down over the merged stake
        let left = remaining(now, config.maturity);
        let potential1 =
            reserve_rewards(amount, pool.reward_ratio1, left).ok_or(Error::InvalidAmount)?;
        let potential2 =
            reserve_rewards(amount, pool.reward_ratio2, left).ok_or(Error::InvalidAmount)?;

        let mut allocation = read_allocation(&env);
        allocation.rewards1 = allocation
            .rewards1
            .checked_add(potential1)
            .ok_or(Error::InvalidAmount)?;
        allocation.rewards2 = allocation
            .rewards2
            .checked_add(potential2)
            .ok_or(Error::InvalidAmount)?;

        if !Self::has_sufficient_rewards(&env, &config, &allocation) {
            return Err(Error::InsufficientRewards);
        }

        let pool_token = token::Client::new(&env, &config.pool_token);
        pool_token.transfer(&depositor, &env.current_contract_address(), &amount);

        env.invoke_contract::<()>(
            &config.receipt_token,
            &Symbol::new(&env, "mint"),
            vec![
                &env,
                env.current_contract_address().to_val(),
                depositor.to_val(),
                amount.into_val(&env),
            ],
        );

        user.deposited = user
            .deposited
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        user.deposit_time = now;

        write_user(&env, &depositor, pool_id, &user);
        write_allocation(&env, &allocation);

        env.events().publish(
            (Symbol::new(&env, "deposit"), depositor.clone()),
            DepositEvent {
                pool_id,
                depositor,
                amount,
            },
        );

        Ok(amount)
    }

    /// Unstake and collect every reward earned so far
    ///
    /// A zero amount only harvests rewards.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: amount < 0
    /// - `PoolNotFound`: Pool doesn't exist
    /// - `UserNotFound`: No stake in this pool
    /// - `ExceedsDeposit`: amount larger than the stake
    /// - `PoolNotActive`: Before pool start
    pub fn withdraw(
        env: Env,
        withdrawer: Address,
        amount: i128,
        pool_id: u32,
    ) -> Result<i128, Error> {
        withdrawer.require_auth();
        extend_instance(&env);

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        let config = Self::read_config(&env)?;
        let pool = Self::read_pool(&env, pool_id)?;
        let mut user = read_user(&env, &withdrawer, pool_id).ok_or(Error::UserNotFound)?;

        if amount > user.deposited {
            return Err(Error::ExceedsDeposit);
        }

        let now = env.ledger().timestamp();
        if now < pool.start_time {
            return Err(Error::PoolNotActive);
        }

        let (rewards1, rewards2) = Self::earned(&pool, &user, now, config.maturity)?;

        // Paid rewards and the withdrawn stake's unearned yield leave the allocation
        let left = remaining(now, config.maturity);
        let release1 =
            calculate_rewards(amount, pool.reward_ratio1, left).ok_or(Error::InvalidAmount)?;
        let release2 =
            calculate_rewards(amount, pool.reward_ratio2, left).ok_or(Error::InvalidAmount)?;

        let mut allocation = read_allocation(&env);
        allocation.rewards1 = allocation
            .rewards1
            .saturating_sub(rewards1)
            .saturating_sub(release1)
            .max(0);
        allocation.rewards2 = allocation
            .rewards2
            .saturating_sub(rewards2)
            .saturating_sub(release2)
            .max(0);

        let contract = env.current_contract_address();

        if amount > 0 {
            env.invoke_contract::<()>(
                &config.receipt_token,
                &Symbol::new(&env, "operator_burn"),
                vec![
                    &env,
                    contract.to_val(),
                    withdrawer.to_val(),
                    amount.into_val(&env),
                ],
            );
            token::Client::new(&env, &config.pool_token).transfer(&contract, &withdrawer, &amount);
        }

        if rewards1 > 0 {
            token::Client::new(&env, &config.reward_token1).transfer(
                &contract,
                &withdrawer,
                &rewards1,
            );
        }

        if rewards2 > 0 {
            let reward_token2 = config
                .reward_token2
                .as_ref()
                .ok_or(Error::InvalidRewardConfig)?;
            token::Client::new(&env, reward_token2).transfer(&contract, &withdrawer, &rewards2);
        }

        user.deposited -= amount;
        user.accrued_rewards1 = 0;
        user.accrued_rewards2 = 0;
        user.deposit_time = now;

        if user.deposited > 0 {
            write_user(&env, &withdrawer, pool_id, &user);
        } else {
            remove_user(&env, &withdrawer, pool_id);
        }
        write_allocation(&env, &allocation);

        env.events().publish(
            (Symbol::new(&env, "withdraw"), withdrawer.clone()),
            WithdrawEvent {
                pool_id,
                withdrawer,
                amount,
                rewards1,
                rewards2,
            },
        );

        Ok(amount)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Rewards reserved for stakers through maturity, per reward token
    pub fn get_global_allocated_rewards(env: Env) -> (i128, i128) {
        let allocation = read_allocation(&env);
        (allocation.rewards1, allocation.rewards2)
    }

    pub fn get_user_info(env: Env, user: Address, pool_id: u32) -> Result<UserData, Error> {
        read_user(&env, &user, pool_id).ok_or(Error::UserNotFound)
    }

    /// Rewards a withdrawal would pay right now
    pub fn pending_rewards(env: Env, user: Address, pool_id: u32) -> Result<(i128, i128), Error> {
        let config = Self::read_config(&env)?;
        let pool = Self::read_pool(&env, pool_id)?;
        let data = read_user(&env, &user, pool_id).ok_or(Error::UserNotFound)?;
        Self::earned(&pool, &data, env.ledger().timestamp(), config.maturity)
    }

    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, Error> {
        Self::read_pool(&env, pool_id)
    }

    pub fn pool_count(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::PoolCounter)
            .unwrap_or(0)
    }

    pub fn get_receipt_token_id(env: Env) -> Result<Address, Error> {
        Ok(Self::read_config(&env)?.receipt_token)
    }

    pub fn maturity(env: Env) -> Result<u64, Error> {
        Ok(Self::read_config(&env)?.maturity)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        Self::read_admin(&env)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    /// Settled rewards plus what accrued since the last deposit time
    fn earned(pool: &Pool, user: &UserData, now: u64, maturity: u64) -> Result<(i128, i128), Error> {
        let window = elapsed(now, user.deposit_time, maturity);

        let earned1 = calculate_rewards(user.deposited, pool.reward_ratio1, window)
            .and_then(|r| r.checked_add(user.accrued_rewards1))
            .ok_or(Error::InvalidAmount)?;
        let earned2 = calculate_rewards(user.deposited, pool.reward_ratio2, window)
            .and_then(|r| r.checked_add(user.accrued_rewards2))
            .ok_or(Error::InvalidAmount)?;

        Ok((earned1, earned2))
    }

    fn has_sufficient_rewards(env: &Env, config: &FarmConfig, required: &Allocation) -> bool {
        let contract = env.current_contract_address();

        if required.rewards1 > 0 {
            let available = token::Client::new(env, &config.reward_token1).balance(&contract);
            if available < required.rewards1 {
                return false;
            }
        }

        if required.rewards2 > 0 {
            let available = match &config.reward_token2 {
                Some(reward_token2) => token::Client::new(env, reward_token2).balance(&contract),
                None => 0,
            };
            if available < required.rewards2 {
                return false;
            }
        }

        true
    }

    /// Receipts may only be minted against stakes held by this farm
    fn controls_receipt_token(env: &Env, receipt_token: &Address) -> bool {
        let farm = env.current_contract_address();

        let is_operator: bool = env.invoke_contract(
            receipt_token,
            &Symbol::new(env, "is_operator"),
            vec![env, farm.to_val()],
        );
        let admin: Address =
            env.invoke_contract(receipt_token, &Symbol::new(env, "admin"), vec![env]);

        is_operator && admin == farm
    }

    fn read_admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    fn read_config(env: &Env) -> Result<FarmConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(Error::NotInitialized)
    }

    fn read_pool(env: &Env, pool_id: u32) -> Result<Pool, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Pool(pool_id))
            .ok_or(Error::PoolNotFound)
    }
}
