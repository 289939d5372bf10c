use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // AMOUNT ERRORS
    // ============================================
    /// Amount must be positive
    InvalidAmount = 1,
    /// Withdrawal exceeds the user's deposit
    ExceedsDeposit = 5,
    /// Farm reward balance cannot cover the new allocation
    InsufficientRewards = 6,

    // ============================================
    // INITIALIZATION ERRORS
    // ============================================
    /// Contract not initialized
    NotInitialized = 2,
    /// Contract already initialized
    AlreadyInitialized = 11,
    /// The farm is not an operator of its receipt token
    ReceiptTokenNotLinked = 12,
    /// Second reward token and its max ratio must be given together
    InvalidRewardConfig = 13,

    // ============================================
    // POOL ERRORS
    // ============================================
    /// Pool not started yet, or the farm has matured
    PoolNotActive = 4,
    /// Pool not found
    PoolNotFound = 7,
    /// No deposit for this user in this pool
    UserNotFound = 8,
    /// Reward ratio outside [0, max_reward_ratio]
    RewardRatioTooHigh = 9,
    /// Maturity in the past, or pool starting at/after maturity
    InvalidTimestamp = 10,
}
