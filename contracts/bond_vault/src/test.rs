extern crate std;

use super::*;
use crate::events::{DepositEvent, QuoteSetEvent, RedemptionSetEvent, WithdrawEvent};
use bond_token::{BondToken, BondTokenClient};
use soroban_sdk::{
    testutils::{Address as _, AuthorizedFunction, AuthorizedInvocation, Events, Ledger},
    token, Address, Env, IntoVal, String, Symbol, TryFromVal, Val, Vec,
};

const SCALE: i128 = 10_000_000;
const START: u64 = 1_000;
const END: u64 = START + 100_000;
const QUOTE_PERIOD: u64 = 600;
const MIN_DEPOSIT: i128 = 100;

struct TestContext<'a> {
    env: Env,
    admin: Address,
    treasury: Address,
    user1: Address,
    user2: Address,
    token: token::Client<'a>,
    token_admin: token::StellarAssetClient<'a>,
    bonds: BondTokenClient<'a>,
    vault: BondVaultClient<'a>,
}

fn create_bond_token<'a>(env: &Env, admin: &Address) -> BondTokenClient<'a> {
    let bonds = BondTokenClient::new(env, &env.register(BondToken, ()));
    bonds.initialize(
        admin,
        &7u32,
        &String::from_str(env, "BondHive BTC Sep 24"),
        &String::from_str(env, "BTCSEP24"),
    );
    bonds
}

fn setup_with_start<'a>(start: u64) -> TestContext<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let admin = Address::generate(&env);
    let treasury = Address::generate(&env);
    let user1 = Address::generate(&env);
    let user2 = Address::generate(&env);
    let issuer = Address::generate(&env);

    // Underlying asset (Stellar Asset Contract)
    let sac = env.register_stellar_asset_contract_v2(issuer);
    let token = token::Client::new(&env, &sac.address());
    let token_admin = token::StellarAssetClient::new(&env, &sac.address());

    let bonds = create_bond_token(&env, &admin);

    // The vault takes over the bond token before it is initialized
    let vault = BondVaultClient::new(&env, &env.register(BondVault, ()));
    bonds.add_operator(&vault.address);
    bonds.set_admin(&vault.address);
    vault.initialize(
        &bonds.address,
        &token.address,
        &admin,
        &start,
        &(start + 100_000),
        &QUOTE_PERIOD,
        &treasury,
        &MIN_DEPOSIT,
    );

    TestContext {
        env,
        admin,
        treasury,
        user1,
        user2,
        token,
        token_admin,
        bonds,
        vault,
    }
}

fn setup<'a>() -> TestContext<'a> {
    setup_with_start(START)
}

fn last_event(env: &Env) -> (Address, Vec<Val>, Val) {
    env.events().all().last().unwrap()
}

fn event_topics<T: IntoVal<Env, Vec<Val>>>(env: &Env, topics: T) -> Vec<Val> {
    topics.into_val(env)
}

#[test]
fn test_full_lifecycle() {
    let ctx = setup();

    ctx.token_admin.mint(&ctx.user1, &1000);

    // Admin publishes a 1:1 quote
    assert_eq!(ctx.vault.set_quote(&SCALE), SCALE);
    assert_eq!(ctx.vault.quote(), SCALE);

    // User deposits to mint bonds
    assert_eq!(ctx.bonds.balance(&ctx.user1), 0);
    let minted = ctx.vault.deposit(&ctx.user1, &200);
    assert_eq!(minted, 200);

    assert_eq!(ctx.bonds.balance(&ctx.user1), 200);
    assert_eq!(ctx.token.balance(&ctx.user1), 800);
    assert_eq!(ctx.token.balance(&ctx.treasury), 200);
    assert_eq!(ctx.vault.total_deposit(), 200);
    assert_eq!(ctx.vault.total_bonds(), 200);

    // Fast forward past maturity
    ctx.env.ledger().set_timestamp(END + 1);

    // Admin funds the redemption (principal + yield)
    ctx.token_admin.mint(&ctx.admin, &1000);
    assert_eq!(ctx.vault.set_total_redemption(&300), 300);
    assert_eq!(ctx.vault.available_redemption(), 300);

    // User redeems all bonds
    let payout = ctx.vault.withdraw(&ctx.user1, &200);
    assert_eq!(payout, 300);

    assert_eq!(ctx.token.balance(&ctx.user1), 1100); // 800 + 300
    assert_eq!(ctx.bonds.balance(&ctx.user1), 0);
    assert_eq!(ctx.bonds.total_supply(), 0);
    assert_eq!(ctx.token.balance(&ctx.vault.address), 0);
    assert_eq!(ctx.vault.total_bonds(), 0);
    assert_eq!(ctx.vault.available_redemption(), 0);
}

#[test]
fn test_views() {
    let ctx = setup();

    assert_eq!(ctx.vault.bond_id(), ctx.bonds.address);
    assert_eq!(ctx.vault.token(), ctx.token.address);
    assert_eq!(ctx.vault.admin(), ctx.admin);
    assert_eq!(ctx.vault.treasury_account(), ctx.treasury);
    assert_eq!(ctx.vault.start_time(), START);
    assert_eq!(ctx.vault.maturity(), END);
    assert_eq!(ctx.vault.min_deposit(), MIN_DEPOSIT);
    assert_eq!(ctx.vault.quote(), 0);
    assert_eq!(ctx.vault.quote_expiration(), 0);
    assert!(!ctx.vault.is_stopped());

    let config = ctx.vault.get_config();
    assert_eq!(config.quote_period, QUOTE_PERIOD);
}

#[test]
fn test_set_quote_requires_admin_auth() {
    let ctx = setup();

    ctx.vault.set_quote(&SCALE);
    assert_eq!(
        ctx.env.auths(),
        std::vec![(
            ctx.admin.clone(),
            AuthorizedInvocation {
                function: AuthorizedFunction::Contract((
                    ctx.vault.address.clone(),
                    Symbol::new(&ctx.env, "set_quote"),
                    (SCALE,).into_val(&ctx.env)
                )),
                sub_invocations: std::vec![]
            }
        )]
    );
    assert_eq!(ctx.vault.quote_expiration(), START + QUOTE_PERIOD);
}

#[test]
fn test_not_double_initialization() {
    let ctx = setup();

    let result = ctx.vault.try_initialize(
        &ctx.bonds.address,
        &ctx.token.address,
        &ctx.admin,
        &START,
        &END,
        &QUOTE_PERIOD,
        &ctx.treasury,
        &MIN_DEPOSIT,
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));

    // Still rejected once the bond has matured
    ctx.env.ledger().set_timestamp(END + 11);
    let result = ctx.vault.try_initialize(
        &ctx.bonds.address,
        &ctx.token.address,
        &ctx.admin,
        &(END + 11),
        &(END + 611),
        &QUOTE_PERIOD,
        &ctx.treasury,
        &MIN_DEPOSIT,
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_initialize_validation() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let token = Address::generate(&env);
    let bonds = create_bond_token(&env, &admin);

    // Vault not yet an operator of the bond token
    let vault = BondVaultClient::new(&env, &env.register(BondVault, ()));
    let result = vault.try_initialize(
        &bonds.address,
        &token,
        &admin,
        &START,
        &END,
        &QUOTE_PERIOD,
        &admin,
        &MIN_DEPOSIT,
    );
    assert_eq!(result, Err(Ok(Error::BondTokenNotLinked)));

    bonds.add_operator(&vault.address);

    // Operator, but the bond token admin could still register other minters
    let result = vault.try_initialize(
        &bonds.address,
        &token,
        &admin,
        &START,
        &END,
        &QUOTE_PERIOD,
        &admin,
        &MIN_DEPOSIT,
    );
    assert_eq!(result, Err(Ok(Error::BondTokenNotLinked)));

    let result = vault.try_initialize(
        &bonds.address,
        &token,
        &admin,
        &END,
        &START,
        &QUOTE_PERIOD,
        &admin,
        &MIN_DEPOSIT,
    );
    assert_eq!(result, Err(Ok(Error::InvalidTimestamp)));

    let result = vault.try_initialize(
        &bonds.address,
        &token,
        &admin,
        &START,
        &END,
        &0u64,
        &admin,
        &MIN_DEPOSIT,
    );
    assert_eq!(result, Err(Ok(Error::InvalidTimestamp)));

    let result = vault.try_initialize(
        &bonds.address,
        &token,
        &admin,
        &START,
        &END,
        &QUOTE_PERIOD,
        &admin,
        &-1i128,
    );
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));

    assert_eq!(vault.try_maturity(), Err(Ok(Error::NotInitialized)));
}

#[test]
fn test_deposit_error_cases() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);

    // No quote yet
    let result = ctx.vault.try_deposit(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::QuoteRequired)));

    ctx.vault.set_quote(&SCALE);

    // Below minimum deposit
    let result = ctx.vault.try_deposit(&ctx.user1, &99);
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));

    let result = ctx.vault.try_deposit(&ctx.user1, &0);
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));

    // After maturity
    ctx.env.ledger().set_timestamp(END + 1);
    let result = ctx.vault.try_deposit(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::MaturityReached)));
}

#[test]
fn test_deposit_before_start() {
    let ctx = setup_with_start(START + 5_000);
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.vault.set_quote(&SCALE);

    let result = ctx.vault.try_deposit(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::NotOpenYet)));
}

#[test]
fn test_quote_expires() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);

    ctx.vault.set_quote(&SCALE);

    // A live quote cannot be overridden
    let result = ctx.vault.try_set_quote(&(2 * SCALE));
    assert_eq!(result, Err(Ok(Error::QuoteAlreadySet)));

    // Still live at the expiration instant
    ctx.env.ledger().set_timestamp(START + QUOTE_PERIOD);
    assert_eq!(ctx.vault.quote(), SCALE);

    ctx.env.ledger().set_timestamp(START + QUOTE_PERIOD + 1);
    assert_eq!(ctx.vault.quote(), 0);
    let result = ctx.vault.try_deposit(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::QuoteRequired)));

    // A new quote can be published once the old one expired
    assert_eq!(ctx.vault.set_quote(&(2 * SCALE)), 2 * SCALE);
    assert_eq!(ctx.vault.deposit(&ctx.user1, &200), 400);

    let result = ctx.vault.try_set_quote(&0);
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));
}

#[test]
fn test_premium_quote() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &(1000 * SCALE));

    ctx.vault.set_quote(&(105 * SCALE / 100)); // 1.05 bonds per unit
    let minted = ctx.vault.deposit(&ctx.user1, &(200 * SCALE));

    assert_eq!(minted, 210 * SCALE);
    assert_eq!(ctx.bonds.balance(&ctx.user1), 210 * SCALE);
    assert_eq!(ctx.vault.total_deposit(), 200 * SCALE);
}

#[test]
fn test_contract_stop_blocks_deposit() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);

    ctx.vault.set_contract_stopped(&true);
    assert!(ctx.vault.is_stopped());

    let result = ctx.vault.try_deposit(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::ContractStopped)));

    ctx.vault.set_contract_stopped(&false);
    assert_eq!(ctx.vault.deposit(&ctx.user1, &200), 200);
}

#[test]
fn test_stop_does_not_block_redemption() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);
    ctx.vault.set_contract_stopped(&true);

    ctx.env.ledger().set_timestamp(END);
    ctx.vault.set_total_redemption(&220);
    assert_eq!(ctx.vault.withdraw(&ctx.user1, &200), 220);
}

#[test]
fn test_withdraw_error_cases() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);

    // Before maturity
    let result = ctx.vault.try_withdraw(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::MaturityNotReached)));

    let result = ctx.vault.try_set_total_redemption(&300);
    assert_eq!(result, Err(Ok(Error::MaturityNotReached)));

    ctx.env.ledger().set_timestamp(END + 1);

    // Redemption pool not funded yet
    let result = ctx.vault.try_withdraw(&ctx.user1, &200);
    assert_eq!(result, Err(Ok(Error::RedemptionNotSet)));

    ctx.vault.set_total_redemption(&300);

    let result = ctx.vault.try_set_total_redemption(&300);
    assert_eq!(result, Err(Ok(Error::RedemptionAlreadySet)));

    let result = ctx.vault.try_withdraw(&ctx.user1, &0);
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));

    let result = ctx.vault.try_withdraw(&ctx.user1, &201);
    assert_eq!(result, Err(Ok(Error::InsufficientBonds)));
}

#[test]
fn test_pro_rata_redemption() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.user2, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);
    ctx.vault.deposit(&ctx.user2, &100);

    ctx.env.ledger().set_timestamp(END + 1);
    ctx.vault.set_total_redemption(&450);

    assert_eq!(ctx.vault.withdraw(&ctx.user2, &100), 150);
    assert_eq!(ctx.vault.available_redemption(), 300);
    assert_eq!(ctx.vault.total_bonds(), 200);

    // Partial redemption, then the rest
    assert_eq!(ctx.vault.withdraw(&ctx.user1, &50), 75);
    assert_eq!(ctx.vault.withdraw(&ctx.user1, &150), 225);

    assert_eq!(ctx.token.balance(&ctx.user1), 800 + 300);
    assert_eq!(ctx.token.balance(&ctx.user2), 900 + 150);
    assert_eq!(ctx.token.balance(&ctx.vault.address), 0);
}

#[test]
fn test_send_bonds_to_another_wallet_and_withdraw() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);

    // Bonds are freely transferable
    ctx.bonds.transfer(&ctx.user1, &ctx.user2, &200);

    ctx.env.ledger().set_timestamp(END + 1);
    ctx.vault.set_total_redemption(&300);

    assert_eq!(ctx.bonds.balance(&ctx.user2), 200);
    assert_eq!(ctx.vault.withdraw(&ctx.user2, &200), 300);
    assert_eq!(ctx.token.balance(&ctx.user2), 300);
}

#[test]
fn test_cannot_mint_bonds_directly() {
    let ctx = setup();

    let result = ctx.bonds.try_mint(&ctx.admin, &ctx.admin, &123);
    assert_eq!(result, Err(Ok(bond_token::Error::NotOperator)));
    assert_eq!(ctx.bonds.balance(&ctx.admin), 0);
}

#[test]
fn test_set_admin_and_treasury() {
    let ctx = setup();
    let new_admin = Address::generate(&ctx.env);
    let new_treasury = Address::generate(&ctx.env);

    ctx.vault.set_admin(&new_admin);
    assert_eq!(ctx.vault.admin(), new_admin);

    ctx.vault.set_treasury(&new_treasury);
    assert_eq!(ctx.vault.treasury_account(), new_treasury);

    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);
    assert_eq!(ctx.token.balance(&new_treasury), 200);
    assert_eq!(ctx.token.balance(&ctx.treasury), 0);
}

#[test]
fn test_bond_supply_is_controlled_by_vault() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);
    assert_eq!(ctx.bonds.admin(), ctx.vault.address);

    // Without the vault's signature nobody can register another minter
    ctx.env.set_auths(&[]);
    assert!(ctx.bonds.try_add_operator(&ctx.admin).is_err());
    assert!(!ctx.bonds.is_operator(&ctx.admin));

    let result = ctx.bonds.try_mint(&ctx.admin, &ctx.user2, &200);
    assert_eq!(result, Err(Ok(bond_token::Error::NotOperator)));

    ctx.env.mock_all_auths();
    assert_eq!(ctx.bonds.total_supply(), ctx.vault.total_bonds());

    ctx.env.ledger().set_timestamp(END + 1);
    ctx.vault.set_total_redemption(&300);
    assert_eq!(ctx.vault.withdraw(&ctx.user1, &200), 300);
}

#[test]
fn test_no_deposit_at_maturity() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.user2, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);

    // Redemptions open at end_time, so deposits close there
    ctx.env.ledger().set_timestamp(END);
    ctx.vault.set_total_redemption(&300);
    ctx.vault.set_quote(&SCALE);

    let result = ctx.vault.try_deposit(&ctx.user2, &200);
    assert_eq!(result, Err(Ok(Error::MaturityReached)));
    assert_eq!(ctx.token.balance(&ctx.user2), 1000);

    assert_eq!(ctx.vault.withdraw(&ctx.user1, &200), 300);
}

#[test]
fn test_withdraw_more_than_held() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.user2, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    ctx.vault.deposit(&ctx.user1, &200);
    ctx.vault.deposit(&ctx.user2, &100);

    ctx.env.ledger().set_timestamp(END + 1);
    ctx.vault.set_total_redemption(&300);

    // Within the outstanding supply, but more than user2 holds
    let result = ctx.vault.try_withdraw(&ctx.user2, &150);
    assert_eq!(result, Err(Ok(Error::InsufficientBonds)));
    assert_eq!(ctx.bonds.balance(&ctx.user2), 100);
    assert_eq!(ctx.vault.available_redemption(), 300);
}

#[test]
fn test_events() {
    let ctx = setup();
    ctx.token_admin.mint(&ctx.user1, &1000);
    ctx.token_admin.mint(&ctx.admin, &1000);

    ctx.vault.set_quote(&SCALE);
    let (contract, topics, data) = last_event(&ctx.env);
    assert_eq!(contract, ctx.vault.address);
    assert_eq!(
        topics,
        event_topics(&ctx.env, (Symbol::new(&ctx.env, "quote_set"), SCALE))
    );
    assert_eq!(
        QuoteSetEvent::try_from_val(&ctx.env, &data).unwrap(),
        QuoteSetEvent {
            quote: SCALE,
            expiration: START + QUOTE_PERIOD,
        }
    );

    ctx.vault.deposit(&ctx.user1, &200);
    let (contract, topics, data) = last_event(&ctx.env);
    assert_eq!(contract, ctx.vault.address);
    assert_eq!(
        topics,
        event_topics(&ctx.env, (Symbol::new(&ctx.env, "deposit"), ctx.user1.clone()))
    );
    assert_eq!(
        DepositEvent::try_from_val(&ctx.env, &data).unwrap(),
        DepositEvent {
            from: ctx.user1.clone(),
            amount: 200,
            bonds: 200,
            quote: SCALE,
        }
    );

    ctx.env.ledger().set_timestamp(END + 1);
    ctx.vault.set_total_redemption(&300);
    let (_, topics, data) = last_event(&ctx.env);
    assert_eq!(
        topics,
        event_topics(&ctx.env, (Symbol::new(&ctx.env, "redemption_set"), 300i128))
    );
    assert_eq!(
        RedemptionSetEvent::try_from_val(&ctx.env, &data).unwrap(),
        RedemptionSetEvent {
            amount: 300,
            total_bonds: 200,
        }
    );

    ctx.vault.withdraw(&ctx.user1, &200);
    let (_, topics, data) = last_event(&ctx.env);
    assert_eq!(
        topics,
        event_topics(&ctx.env, (Symbol::new(&ctx.env, "withdraw"), ctx.user1.clone()))
    );
    assert_eq!(
        WithdrawEvent::try_from_val(&ctx.env, &data).unwrap(),
        WithdrawEvent {
            to: ctx.user1.clone(),
            bonds: 200,
            payout: 300,
        }
    );
}
