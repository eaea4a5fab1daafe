/// Largest signed integer exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_I64_INT: i64 = 9_007_199_254_740_991;

/// Safely converts an `i64` to `f64` if and only if it is exactly
/// representable.
///
/// # Parameters
/// - `value`: The integer to convert.
/// - `error`: The error to return if conversion is not lossless.
///
/// # Returns
/// - `Ok(f64)`: The converted value if it is safe.
/// - `Err(error)`: If the value exceeds `MAX_SAFE_I64_INT` in magnitude.
#[allow(clippy::cast_precision_loss)]
pub fn i64_to_f64_checked<E>(value: i64, error: E) -> Result<f64, E> {
    if value.unsigned_abs() > MAX_SAFE_I64_INT.unsigned_abs() {
        return Err(error);
    }
    Ok(value as f64)
}

/// Safely converts an `f64` to `i64` if the value is finite, within range,
/// and not fractional.
///
/// # Parameters
/// - `value`: The floating-point value to convert.
/// - `error`: The error to return if conversion would lose information.
///
/// # Returns
/// - `Ok(i64)`: The converted value if safe.
/// - `Err(error)`: For non-finite, out-of-range, or fractional values.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn f64_to_i64_checked<E>(value: f64, error: E) -> Result<i64, E> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(error);
    }
    if value < i64::MIN as f64 || value > MAX_SAFE_I64_INT as f64 {
        return Err(error);
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_integers_refuse_lossy_promotion() {
        assert_eq!(i64_to_f64_checked(42, ()), Ok(42.0));
        assert!(i64_to_f64_checked(MAX_SAFE_I64_INT + 1, ()).is_err());
        assert!(i64_to_f64_checked(-(MAX_SAFE_I64_INT + 1), ()).is_err());
    }

    #[test]
    fn fractional_floats_refuse_conversion_to_integers() {
        assert_eq!(f64_to_i64_checked(10.0, ()), Ok(10));
        assert!(f64_to_i64_checked(1.5, ()).is_err());
        assert!(f64_to_i64_checked(f64::NAN, ()).is_err());
        assert!(f64_to_i64_checked(f64::INFINITY, ()).is_err());
    }
}
