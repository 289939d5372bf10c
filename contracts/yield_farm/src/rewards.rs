pub const SCALE: i128 = 10_000_000; // 7 decimals

/// Seconds of accrual since `since`, capped at maturity
pub fn elapsed(now: u64, since: u64, maturity: u64) -> u64 {
    core::cmp::min(now, maturity).saturating_sub(since)
}

/// Seconds left until maturity (0 once matured)
pub fn remaining(now: u64, maturity: u64) -> u64 {
    maturity.saturating_sub(now)
}

/// Calculate rewards earned by a stake over a period
///
/// Formula: rewards = stake × ratio × seconds / SCALE
///
/// Example:
/// - stake: 100
/// - ratio: 1.0 (10,000,000)
/// - seconds: 5,000
/// - rewards: 100 × 1.0 × 5,000 = 500,000
pub fn calculate_rewards(stake: i128, ratio: i128, seconds: u64) -> Option<i128> {
    if ratio <= 0 || stake <= 0 || seconds == 0 {
        return Some(0);
    }
    stake
        .checked_mul(ratio)?
        .checked_mul(seconds as i128)?
        .checked_div(SCALE)
}

/// Rewards to set aside for a stake, rounded up
///
/// Each deposit is reserved on its own while payouts are computed once over
/// the merged stake, so reserves round up and payouts round down.
pub fn reserve_rewards(stake: i128, ratio: i128, seconds: u64) -> Option<i128> {
    if ratio <= 0 || stake <= 0 || seconds == 0 {
        return Some(0);
    }
    stake
        .checked_mul(ratio)?
        .checked_mul(seconds as i128)?
        .checked_add(SCALE - 1)?
        .checked_div(SCALE)
}
