#![no_std]

mod error;
mod events;
mod pricing;
mod storage;

pub use error::Error;
use events::*;
use pricing::{calculate_bonds, calculate_payout};
pub use storage::{Quote, VaultConfig};
use storage::{extend_instance, read_i128, read_live_quote, write_i128, DataKey};

use soroban_sdk::{contract, contractimpl, log, token, vec, Address, Env, IntoVal, Symbol};

#[contract]
pub struct BondVault;

#[contractimpl]
impl BondVault {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the vault
    ///
    /// The vault must already be both the admin and an operator of
    /// `bond_token`, so that no one else can mint bonds against its
    /// redemption pool.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidTimestamp`: end_time <= start_time or zero quote_period
    /// - `InvalidAmount`: Negative min_deposit
    /// - `BondTokenNotLinked`: Vault is not the admin and an operator of the
    ///   bond token
    pub fn initialize(
        env: Env,
        bond_token: Address,
        token: Address,
        admin: Address,
        start_time: u64,
        end_time: u64,
        quote_period: u64,
        treasury: Address,
        min_deposit: i128,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        if end_time <= start_time || quote_period == 0 {
            return Err(Error::InvalidTimestamp);
        }

        if min_deposit < 0 {
            return Err(Error::InvalidAmount);
        }

        admin.require_auth();

        if !Self::controls_bond_token(&env, &bond_token) {
            return Err(Error::BondTokenNotLinked);
        }

        let config = VaultConfig {
            bond_token,
            token,
            start_time,
            end_time,
            quote_period,
            min_deposit,
        };

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Treasury, &treasury);
        env.storage().instance().set(&DataKey::Stopped, &false);
        write_i128(&env, &DataKey::TotalBonds, 0);
        write_i128(&env, &DataKey::TotalDeposit, 0);
        write_i128(&env, &DataKey::AvailableRedemption, 0);
        extend_instance(&env);

        log!(&env, "vault initialized", start_time, end_time);

        Ok(())
    }

    /// Publish a quote, valid for the configured quote period
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: quote <= 0
    /// - `QuoteAlreadySet`: The previous quote has not expired
    pub fn set_quote(env: Env, quote: i128) -> Result<i128, Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        if quote <= 0 {
            return Err(Error::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        if read_live_quote(&env, now).is_some() {
            return Err(Error::QuoteAlreadySet);
        }

        let config = Self::read_config(&env)?;
        let expiration = now
            .checked_add(config.quote_period)
            .ok_or(Error::InvalidTimestamp)?;

        env.storage().instance().set(
            &DataKey::Quote,
            &Quote {
                amount: quote,
                expiration,
            },
        );

        env.events().publish(
            (Symbol::new(&env, "quote_set"), quote),
            QuoteSetEvent { quote, expiration },
        );

        Ok(quote)
    }

    /// Live quote, or 0 when none is set or it expired
    pub fn quote(env: Env) -> i128 {
        read_live_quote(&env, env.ledger().timestamp())
            .map(|quote| quote.amount)
            .unwrap_or(0)
    }

    /// Expiration of the most recent quote (0 if none was ever set)
    pub fn quote_expiration(env: Env) -> u64 {
        env.storage()
            .instance()
            .get::<DataKey, Quote>(&DataKey::Quote)
            .map(|quote| quote.expiration)
            .unwrap_or(0)
    }

    /// Fund the redemption pool (principal plus yield) after maturity
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: amount <= 0
    /// - `MaturityNotReached`: Called before end_time
    /// - `RedemptionAlreadySet`: Pool was already funded
    pub fn set_total_redemption(env: Env, amount: i128) -> Result<i128, Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let config = Self::read_config(&env)?;
        if env.ledger().timestamp() < config.end_time {
            return Err(Error::MaturityNotReached);
        }

        if env.storage().instance().has(&DataKey::RedemptionSet) {
            return Err(Error::RedemptionAlreadySet);
        }

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&admin, &env.current_contract_address(), &amount);

        env.storage().instance().set(&DataKey::RedemptionSet, &true);
        write_i128(&env, &DataKey::AvailableRedemption, amount);

        env.events().publish(
            (Symbol::new(&env, "redemption_set"), amount),
            RedemptionSetEvent {
                amount,
                total_bonds: read_i128(&env, &DataKey::TotalBonds),
            },
        );

        Ok(amount)
    }

    pub fn set_treasury(env: Env, treasury: Address) -> Result<(), Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        env.storage().instance().set(&DataKey::Treasury, &treasury);

        env.events().publish(
            (Symbol::new(&env, "treasury_changed"), treasury.clone()),
            TreasuryChangedEvent { treasury },
        );
        Ok(())
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

    /// Stop or resume deposits. Redemptions are never blocked.
    pub fn set_contract_stopped(env: Env, stopped: bool) -> Result<(), Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        env.storage().instance().set(&DataKey::Stopped, &stopped);

        env.events().publish(
            (Symbol::new(&env, "stopped"), stopped),
            StoppedEvent { stopped },
        );
        Ok(())
    }

    // ============================================
    // USER FLOWS
    // ============================================

    /// Deposit underlying and receive bonds at the live quote
    ///
    /// The underlying is forwarded to the treasury.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractStopped`: Deposits are stopped
    /// - `InvalidAmount`: amount <= 0, below min_deposit, or buys no bonds
    /// - `NotOpenYet`: Before start_time
    /// - `MaturityReached`: At or after end_time
    /// - `QuoteRequired`: No live quote
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<i128, Error> {
        from.require_auth();
        extend_instance(&env);

        let config = Self::read_config(&env)?;
        Self::check_not_stopped(&env)?;

        if amount <= 0 || amount < config.min_deposit {
            return Err(Error::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        if now < config.start_time {
            return Err(Error::NotOpenYet);
        }
        if now >= config.end_time {
            return Err(Error::MaturityReached);
        }

        let quote = read_live_quote(&env, now).ok_or(Error::QuoteRequired)?;
        let bonds = calculate_bonds(amount, quote.amount).ok_or(Error::InvalidAmount)?;
        if bonds <= 0 {
            return Err(Error::InvalidAmount);
        }

        let total_bonds = read_i128(&env, &DataKey::TotalBonds)
            .checked_add(bonds)
            .ok_or(Error::InvalidAmount)?;
        let total_deposit = read_i128(&env, &DataKey::TotalDeposit)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;

        let treasury = Self::read_treasury(&env)?;
        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&from, &treasury, &amount);

        env.invoke_contract::<()>(
            &config.bond_token,
            &Symbol::new(&env, "mint"),
            vec![
                &env,
                env.current_contract_address().to_val(),
                from.to_val(),
                bonds.into_val(&env),
            ],
        );

        write_i128(&env, &DataKey::TotalBonds, total_bonds);
        write_i128(&env, &DataKey::TotalDeposit, total_deposit);

        env.events().publish(
            (Symbol::new(&env, "deposit"), from.clone()),
            DepositEvent {
                from,
                amount,
                bonds,
                quote: quote.amount,
            },
        );

        Ok(bonds)
    }

    /// Redeem bonds for a pro-rata share of the redemption pool
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: amount <= 0
    /// - `MaturityNotReached`: Before end_time
    /// - `RedemptionNotSet`: Admin has not funded redemptions
    /// - `InsufficientBonds`: More bonds than are outstanding or held by `to`
    pub fn withdraw(env: Env, to: Address, amount: i128) -> Result<i128, Error> {
        to.require_auth();
        extend_instance(&env);

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let config = Self::read_config(&env)?;
        if env.ledger().timestamp() < config.end_time {
            return Err(Error::MaturityNotReached);
        }

        if !env.storage().instance().has(&DataKey::RedemptionSet) {
            return Err(Error::RedemptionNotSet);
        }

        let available = read_i128(&env, &DataKey::AvailableRedemption);
        let outstanding = read_i128(&env, &DataKey::TotalBonds);
        if amount > outstanding {
            return Err(Error::InsufficientBonds);
        }

        let held = token::Client::new(&env, &config.bond_token).balance(&to);
        if amount > held {
            return Err(Error::InsufficientBonds);
        }

        let payout =
            calculate_payout(available, amount, outstanding).ok_or(Error::InvalidAmount)?;

        env.invoke_contract::<()>(
            &config.bond_token,
            &Symbol::new(&env, "operator_burn"),
            vec![
                &env,
                env.current_contract_address().to_val(),
                to.to_val(),
                amount.into_val(&env),
            ],
        );

        if payout > 0 {
            let token_client = token::Client::new(&env, &config.token);
            token_client.transfer(&env.current_contract_address(), &to, &payout);
        }

        write_i128(&env, &DataKey::AvailableRedemption, available - payout);
        write_i128(&env, &DataKey::TotalBonds, outstanding - amount);

        env.events().publish(
            (Symbol::new(&env, "withdraw"), to.clone()),
            WithdrawEvent {
                to,
                bonds: amount,
                payout,
            },
        );

        Ok(payout)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Address of the bond token issued by this vault
    pub fn bond_id(env: Env) -> Result<Address, Error> {
        Ok(Self::read_config(&env)?.bond_token)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        Ok(Self::read_config(&env)?.token)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        Self::read_admin(&env)
    }

    pub fn treasury_account(env: Env) -> Result<Address, Error> {
        Self::read_treasury(&env)
    }

    pub fn start_time(env: Env) -> Result<u64, Error> {
        Ok(Self::read_config(&env)?.start_time)
    }

    pub fn maturity(env: Env) -> Result<u64, Error> {
        Ok(Self::read_config(&env)?.end_time)
    }

    pub fn min_deposit(env: Env) -> Result<i128, Error> {
        Ok(Self::read_config(&env)?.min_deposit)
    }

    pub fn get_config(env: Env) -> Result<VaultConfig, Error> {
        Self::read_config(&env)
    }

    /// Bonds outstanding
    pub fn total_bonds(env: Env) -> i128 {
        read_i128(&env, &DataKey::TotalBonds)
    }

    /// Underlying collected over the life of the vault
    pub fn total_deposit(env: Env) -> i128 {
        read_i128(&env, &DataKey::TotalDeposit)
    }

    /// Redemption funds not yet paid out
    pub fn available_redemption(env: Env) -> i128 {
        read_i128(&env, &DataKey::AvailableRedemption)
    }

    pub fn is_stopped(env: Env) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Stopped)
            .unwrap_or(false)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    /// The vault must be the only party able to change the bond supply
    fn controls_bond_token(env: &Env, bond_token: &Address) -> bool {
        let vault = env.current_contract_address();

        let is_operator: bool = env.invoke_contract(
            bond_token,
            &Symbol::new(env, "is_operator"),
            vec![env, vault.to_val()],
        );
        let admin: Address =
            env.invoke_contract(bond_token, &Symbol::new(env, "admin"), vec![env]);

        is_operator && admin == vault
    }

    fn read_config(env: &Env) -> Result<VaultConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(Error::NotInitialized)
    }

    fn read_admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    fn read_treasury(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Treasury)
            .ok_or(Error::NotInitialized)
    }

    fn check_not_stopped(env: &Env) -> Result<(), Error> {
        let stopped = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Stopped)
            .unwrap_or(false);

        if stopped {
            return Err(Error::ContractStopped);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test;
