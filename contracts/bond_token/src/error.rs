use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Initialization errors
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidDecimals = 7,

    // Authorization errors
    NotOperator = 6,
    InsufficientAllowance = 8,
    InvalidExpiration = 9,

    // Balance errors
    InsufficientBalance = 4,
    InvalidAmount = 5,
}
