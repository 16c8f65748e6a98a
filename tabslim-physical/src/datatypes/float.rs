//! Conversions between [`f64`] and [`f32`] that operate on decimal representations.
//!
//! Values read from text carry a decimal precision. Narrowing keeps that precision
//! if the shortest decimal rendering of the [`f32`] reads back as the original [`f64`];
//! widening goes through the same decimal rendering, so a narrowed value
//! widens back to exactly the value it came from.

/// Narrow a [`f64`] to the nearest [`f32`].
#[allow(clippy::cast_possible_truncation)]
pub fn narrow_f64(value: f64) -> f32 {
    value as f32
}

/// Widen a [`f32`] to the [`f64`] with the same shortest decimal representation.
pub fn widen_f32(value: f32) -> f64 {
    if !value.is_finite() {
        return f64::from(value);
    }

    value
        .to_string()
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(value))
}

/// Whether `value` can be stored as [`f32`] without losing the decimal digits it carries.
pub fn fits_f32(value: f64) -> bool {
    if value.is_nan() {
        return true;
    }

    widen_f32(narrow_f64(value)) == value
}

#[cfg(test)]
mod test {
    use super::{fits_f32, narrow_f64, widen_f32};
    use quickcheck_macros::quickcheck;
    use test_log::test;

    #[test]
    fn short_decimals_fit() {
        assert!(fits_f32(12.34));
        assert!(fits_f32(0.5));
        assert!(fits_f32(1234.0));
        assert!(fits_f32(-0.99));
        assert!(fits_f32(f64::INFINITY));
        assert!(fits_f32(f64::NAN));
    }

    #[test]
    fn long_decimals_do_not_fit() {
        assert!(!fits_f32(0.123456789012));
        assert!(!fits_f32(16777217.0));
        assert!(!fits_f32(1e300));
        assert!(!fits_f32(f64::from(0.1f32)));
    }

    #[test]
    fn widening_restores_decimal() {
        assert_eq!(widen_f32(narrow_f64(12.34)), 12.34);
        assert_eq!(widen_f32(0.1), 0.1);
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn narrowing_is_reversible_when_it_fits(value: f64) -> bool {
        !fits_f32(value) || value.is_nan() || widen_f32(narrow_f64(value)) == value
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn narrowing_error_is_bounded(value: f64) -> bool {
        if !fits_f32(value) || !value.is_finite() {
            return true;
        }

        let narrowed = f64::from(narrow_f64(value));
        let smallest_step = f64::from(f32::from_bits(1));
        (narrowed - value).abs() <= (value.abs() * f64::from(f32::EPSILON)).max(smallest_step)
    }
}
