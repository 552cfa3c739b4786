//! Account repository contract and its storage implementations.
//!
//! # Responsibility
//! - Define the five-operation account repository contract.
//! - Isolate SQL details from service/business orchestration.
//!
//! # Invariants
//! - `NotFound` is always distinguishable from transport failures.
//! - Implementations assign `id` and `created_at`; callers never do.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod account_repo;
pub mod memory_repo;

/// Current wall-clock time as Unix epoch milliseconds, never below `1`.
///
/// Stores additionally clamp the result to the newest `created_at` they
/// have handed out.
pub(crate) fn now_epoch_ms() -> i64 {
    epoch_ms_at(SystemTime::now())
}

// Clocks set before 1970 collapse to 1 so `created_at` stays non-zero.
fn epoch_ms_at(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::epoch_ms_at;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn epoch_ms_is_never_zero() {
        assert_eq!(epoch_ms_at(UNIX_EPOCH), 1);
        assert_eq!(epoch_ms_at(UNIX_EPOCH - Duration::from_secs(60)), 1);
        assert_eq!(epoch_ms_at(UNIX_EPOCH + Duration::from_millis(1_500)), 1_500);
    }
}
