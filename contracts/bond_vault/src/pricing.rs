use crate::storage::SCALE;

/// Calculate how many bonds a deposit buys at the given quote
///
/// Formula: bonds = amount × quote / SCALE
///
/// Example:
/// - amount: 200
/// - quote: 1.05 (10,500,000)
/// - bonds: 200 × 1.05 = 210
pub fn calculate_bonds(amount: i128, quote: i128) -> Option<i128> {
    amount.checked_mul(quote)?.checked_div(SCALE)
}

/// Calculate the share of the redemption pool owed for `bonds`
///
/// Formula: payout = available × bonds / outstanding
///
/// Multiplying first keeps small positions from truncating to zero; the
/// last holder to redeem collects any rounding remainder.
pub fn calculate_payout(available: i128, bonds: i128, outstanding: i128) -> Option<i128> {
    if outstanding <= 0 || bonds > outstanding {
        return None;
    }
    available.checked_mul(bonds)?.checked_div(outstanding)
}
