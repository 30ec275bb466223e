//! Capped exponential backoff with jitter, used between status polls.

use rand::Rng;
use std::time::Duration;

/// Delay before poll number `attempt` (1-based).
///
/// Doubles from `base_ms` per attempt, never exceeds `max_ms` before jitter,
/// then adds up to 10% jitter so concurrent pollers spread out.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(max_ms);

    let jitter_ms = match delay_ms / 10 {
        0 => 0,
        range => rand::thread_rng().gen_range(0..range),
    };

    Duration::from_millis(delay_ms + jitter_ms)
}
