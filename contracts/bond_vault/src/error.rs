use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // AMOUNT ERRORS
    // ============================================
    /// Amount must be positive and at least the minimum deposit
    InvalidAmount = 1,
    /// Withdrawal exceeds the bonds outstanding or held
    InsufficientBonds = 14,

    // ============================================
    // QUOTE ERRORS
    // ============================================
    /// No live quote: the admin must publish one before deposits
    QuoteRequired = 2,
    /// A quote is still live and cannot be replaced yet
    QuoteAlreadySet = 11,

    // ============================================
    // INITIALIZATION ERRORS
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 3,
    /// Contract not initialized
    NotInitialized = 4,
    /// Maturity must be after start and the quote period non-zero
    InvalidTimestamp = 12,
    /// The vault does not control its bond token (admin and operator)
    BondTokenNotLinked = 13,

    // ============================================
    // MATURITY ERRORS
    // ============================================
    /// Redemption operations before end_time
    MaturityNotReached = 5,
    /// Deposits at or after end_time
    MaturityReached = 6,
    /// Deposits before start_time
    NotOpenYet = 7,
    /// Admin has not funded the redemption pool yet
    RedemptionNotSet = 8,
    /// Redemption pool can only be funded once
    RedemptionAlreadySet = 9,

    // ============================================
    // OPERATIONAL ERRORS
    // ============================================
    /// Deposits are stopped by the admin
    ContractStopped = 10,
}
