//! Value helpers shared by the task model and the command layer.
//!
//! Priorities are small integers where `0` means "no priority" and `1..=5`
//! rank ascending importance. Due dates are absolute epoch seconds computed
//! from an hour offset.

use clap::ValueEnum;

/// Priority value meaning "no priority".
pub const NO_PRIORITY: u8 = 0;

/// Highest accepted priority.
pub const MAX_PRIORITY: u8 = 5;

const SECONDS_PER_HOUR: i64 = 3600;

/// Clamp an arbitrary priority into the stored range.
///
/// Values in `0..=5` pass through; anything else becomes [`NO_PRIORITY`].
pub fn normalise_priority(value: i64) -> u8 {
    match u8::try_from(value) {
        Ok(p) if p <= MAX_PRIORITY => p,
        _ => NO_PRIORITY,
    }
}

/// Whether `value` would be changed by [`normalise_priority`].
pub fn is_out_of_range_priority(value: i64) -> bool {
    i64::from(normalise_priority(value)) != value
}

/// Compute `now + hours * 3600`, saturating at the `i64` bounds.
pub fn due_from_now(now: i64, hours: i64) -> i64 {
    now.saturating_add(hours.saturating_mul(SECONDS_PER_HOUR))
}

/// Output styles for `list`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_priority() {
        assert_eq!(normalise_priority(0), 0);
        assert_eq!(normalise_priority(3), 3);
        assert_eq!(normalise_priority(5), 5);
        assert_eq!(normalise_priority(6), NO_PRIORITY);
        assert_eq!(normalise_priority(-1), NO_PRIORITY);
        assert_eq!(normalise_priority(i64::MAX), NO_PRIORITY);
    }

    #[test]
    fn test_out_of_range_detection() {
        assert!(!is_out_of_range_priority(1));
        assert!(!is_out_of_range_priority(0));
        assert!(is_out_of_range_priority(9));
        assert!(is_out_of_range_priority(-4));
    }

    #[test]
    fn test_due_from_now() {
        assert_eq!(due_from_now(1_000, 0), 1_000);
        assert_eq!(due_from_now(1_000, 2), 8_200);
        assert_eq!(due_from_now(10_000, -1), 6_400);
        assert_eq!(due_from_now(0, i64::MAX), i64::MAX);
        assert_eq!(due_from_now(0, i64::MIN), i64::MIN);
    }
}
