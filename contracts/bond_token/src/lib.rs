#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
use events::{ApproveEvent, BurnEvent, MintEvent, TransferEvent};
use storage::{
    extend_instance, read_allowance, read_balance, read_total_supply, spend_allowance,
    write_allowance, write_balance, write_total_supply, DataKey, TokenMetadata, MAX_DECIMALS,
};

use soroban_sdk::{contract, contractimpl, log, Address, Env, String, Symbol};

/// Fungible bond token. The address of a deployment is the bond id that
/// holders and explorers use to identify a bond issue.
///
/// Holders see the standard token interface. Supply changes only through
/// registered operators, and only the admin registers operators; a vault or
/// farm that issues the token is expected to be its admin.
#[contract]
pub struct BondToken;

#[contractimpl]
impl BondToken {
    // ============================================
    // ADMIN & OPERATORS
    // ============================================

    /// Initialize the token contract
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidDecimals`: More than 18 decimals requested
    pub fn initialize(
        env: Env,
        admin: Address,
        decimals: u32,
        name: String,
        symbol: String,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        if decimals > MAX_DECIMALS {
            return Err(Error::InvalidDecimals);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(
            &DataKey::Metadata,
            &TokenMetadata {
                decimals,
                name,
                symbol,
            },
        );
        write_total_supply(&env, 0);
        extend_instance(&env);

        Ok(())
    }

    /// Add an operator (a bond vault or a farm)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn add_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        env.storage()
            .instance()
            .set(&DataKey::Operator(operator), &true);

        Ok(())
    }

    /// Remove an operator
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn remove_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        env.storage()
            .instance()
            .remove(&DataKey::Operator(operator));

        Ok(())
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();
        extend_instance(&env);

        env.storage().instance().set(&DataKey::Admin, &new_admin);
        Ok(())
    }

    /// Mint bonds (operators only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `NotOperator`: Caller is not a registered operator
    pub fn mint(env: Env, operator: Address, to: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        Self::check_operator(&env, &operator)?;
        extend_instance(&env);

        let new_balance = read_balance(&env, &to)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        let new_supply = read_total_supply(&env)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;

        write_balance(&env, &to, new_balance);
        write_total_supply(&env, new_supply);

        log!(&env, "mint", to, amount);
        env.events().publish(
            (Symbol::new(&env, "mint"), to.clone()),
            MintEvent {
                operator,
                to,
                amount,
            },
        );

        Ok(())
    }

    /// Burn bonds on behalf of a redeeming holder (operators only, holder
    /// must also authorize)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InsufficientBalance`: Not enough balance
    pub fn operator_burn(
        env: Env,
        operator: Address,
        from: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        Self::check_operator(&env, &operator)?;
        from.require_auth();
        extend_instance(&env);

        Self::burn_balance(&env, from, amount)
    }

    // ============================================
    // TOKEN INTERFACE
    // ============================================

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        read_allowance(&env, &from, &spender).amount
    }

    /// Let `spender` move up to `amount` of `from`'s bonds until
    /// `expiration_ledger`
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount < 0
    /// - `InvalidExpiration`: Non-zero amount with an expiration in the past
    pub fn approve(
        env: Env,
        from: Address,
        spender: Address,
        amount: i128,
        expiration_ledger: u32,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        from.require_auth();
        extend_instance(&env);

        write_allowance(&env, &from, &spender, amount, expiration_ledger)?;

        env.events().publish(
            (Symbol::new(&env, "approve"), from.clone(), spender.clone()),
            ApproveEvent {
                from,
                spender,
                amount,
                expiration_ledger,
            },
        );

        Ok(())
    }

    /// Transfer bonds between holders
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();
        extend_instance(&env);

        Self::move_balance(&env, from, to, amount)
    }

    /// Transfer bonds out of an allowance
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientAllowance`: Allowance too small or expired
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        spender.require_auth();
        extend_instance(&env);

        spend_allowance(&env, &from, &spender, amount)?;
        Self::move_balance(&env, from, to, amount)
    }

    /// Holder burns their own bonds. Burned bonds forfeit their redemption.
    pub fn burn(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();
        extend_instance(&env);

        Self::burn_balance(&env, from, amount)
    }

    pub fn burn_from(env: Env, spender: Address, from: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        spender.require_auth();
        extend_instance(&env);

        spend_allowance(&env, &from, &spender, amount)?;
        Self::burn_balance(&env, from, amount)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn balance(env: Env, id: Address) -> i128 {
        read_balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        read_total_supply(&env)
    }

    pub fn decimals(env: Env) -> Result<u32, Error> {
        Ok(Self::read_metadata(&env)?.decimals)
    }

    pub fn name(env: Env) -> Result<String, Error> {
        Ok(Self::read_metadata(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        Ok(Self::read_metadata(&env)?.symbol)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        Self::read_admin(&env)
    }

    /// Check if address is an operator
    pub fn is_operator(env: Env, address: Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operator(address))
            .unwrap_or(false)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn move_balance(env: &Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        let from_balance = read_balance(env, &from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        if from != to {
            let new_to_balance = read_balance(env, &to)
                .checked_add(amount)
                .ok_or(Error::InvalidAmount)?;
            write_balance(env, &from, from_balance - amount);
            write_balance(env, &to, new_to_balance);
        }

        env.events().publish(
            (Symbol::new(env, "transfer"), from.clone(), to.clone()),
            TransferEvent { from, to, amount },
        );

        Ok(())
    }

    fn burn_balance(env: &Env, from: Address, amount: i128) -> Result<(), Error> {
        let balance = read_balance(env, &from);
        if balance < amount {
            return Err(Error::InsufficientBalance);
        }

        write_balance(env, &from, balance - amount);
        write_total_supply(env, read_total_supply(env) - amount);

        env.events().publish(
            (Symbol::new(env, "burn"), from.clone()),
            BurnEvent { from, amount },
        );

        Ok(())
    }

    fn check_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn check_operator(env: &Env, operator: &Address) -> Result<(), Error> {
        let registered = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operator(operator.clone()))
            .unwrap_or(false);
        if !registered {
            return Err(Error::NotOperator);
        }
        operator.require_auth();
        Ok(())
    }

    fn read_admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    fn read_metadata(env: &Env) -> Result<TokenMetadata, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Metadata)
            .ok_or(Error::NotInitialized)
    }
}
