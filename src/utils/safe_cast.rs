//! Checked conversions between OpenCV's `i32` dimensions and the unsigned/float types used elsewhere

use crate::{Error, Result};

/// Convert an `OpenCV` dimension to `u32`
///
/// # Errors
///
/// Returns an error if the value is negative
pub fn i32_to_u32(value: i32) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Negative dimension {value}")))
}

/// Safely convert u32 to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn u32_to_i32(value: u32) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Clamp and round f64 to i32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_i32_to_u32() {
        assert_eq!(i32_to_u32(0).unwrap(), 0);
        assert_eq!(i32_to_u32(1920).unwrap(), 1920);
        assert_eq!(i32_to_u32(i32::MAX).unwrap(), i32::MAX as u32);
        assert!(i32_to_u32(-1).is_err());
    }

    #[test]
    fn test_u32_to_i32() {
        assert_eq!(u32_to_i32(256).unwrap(), 256);
        assert!(u32_to_i32(u32::MAX).is_err());
    }

    #[test]
    fn test_f64_to_i32_clamp() {
        assert_eq!(f64_to_i32_clamp(50.4, 0, 100), 50);
        assert_eq!(f64_to_i32_clamp(50.6, 0, 100), 51);
        assert_eq!(f64_to_i32_clamp(-10.0, 0, 100), 0);
        assert_eq!(f64_to_i32_clamp(150.0, 0, 100), 100);
        assert_eq!(f64_to_i32_clamp(f64::NAN, 0, 100), 0);
        assert_eq!(f64_to_i32_clamp(f64::INFINITY, 0, 100), 0);
        assert_eq!(f64_to_i32_clamp(5.0, 100, 0), 5);
    }

    proptest! {
        #[test]
        fn prop_i32_to_u32_non_negative(value in 0..=i32::MAX) {
            prop_assert_eq!(i32_to_u32(value).unwrap() as i32, value);
        }

        #[test]
        fn prop_f64_to_i32_clamp_always_within_bounds(
            value in any::<f64>(),
            min in any::<i32>(),
            max in any::<i32>()
        ) {
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            let result = f64_to_i32_clamp(value, min, max);
            prop_assert!(result >= lo);
            prop_assert!(result <= hi);
        }
    }
}
