//! "Not set" markers used by the engine for scalar attributes.
//!
//! The engine initialises integers to INT_MIN and doubles to -DBL_MAX. The
//! thresholds below are the largest values that can still be such an
//! initial value, so anything at or below them reads as absent.

/// Integers at or below this value have not been set.
pub const INT_UNSET_THRESHOLD: i64 = -(1 << 15) + 1;

/// Doubles at or below this value have not been set.
pub const DOUBLE_UNSET_THRESHOLD: f64 = -1e37;

pub fn int_or_unset(value: i64) -> Option<i64> {
    (value > INT_UNSET_THRESHOLD).then_some(value)
}

pub fn double_or_unset(value: f64) -> Option<f64> {
    (value > DOUBLE_UNSET_THRESHOLD).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_threshold_is_inclusive() {
        assert_eq!(int_or_unset(11), Some(11));
        assert_eq!(int_or_unset(-32766), Some(-32766));
        assert_eq!(int_or_unset(-32767), None);
        assert_eq!(int_or_unset(i32::MIN as i64), None);
    }

    #[test]
    fn double_threshold_is_inclusive() {
        assert_eq!(double_or_unset(1.1), Some(1.1));
        assert_eq!(double_or_unset(-1e36), Some(-1e36));
        assert_eq!(double_or_unset(-1e37), None);
        assert_eq!(double_or_unset(-f64::MAX), None);
    }
}
