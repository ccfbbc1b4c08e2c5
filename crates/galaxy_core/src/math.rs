//! Fixed-point math utilities for deterministic simulation.
//!
//! Fractional combat math (damage falloff, flee curves) runs on fixed-point
//! numbers so results are identical on every platform. Floating-point
//! operations can produce different results on different CPUs.

use fixed::types::I32F32;

/// Fixed-point number type for all fractional simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// `numerator / denominator` as a fixed-point ratio.
///
/// A zero denominator yields zero rather than dividing.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> Fixed {
    if denominator == 0 {
        return Fixed::ZERO;
    }
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Round half away from zero and clamp into `u32`.
#[must_use]
pub fn round_to_u32(value: Fixed) -> u32 {
    let rounded: i64 = value.round().to_num();
    u32::try_from(rounded.max(0)).unwrap_or(u32::MAX)
}

/// Truncate toward zero and clamp into `u32`.
#[must_use]
pub fn floor_to_u32(value: Fixed) -> u32 {
    let truncated: i64 = value.to_num();
    u32::try_from(truncated.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(1, 2), Fixed::from_num(0.5));
        assert_eq!(ratio(230, 230), Fixed::ONE);
        assert_eq!(ratio(5, 0), Fixed::ZERO);
    }

    #[test]
    fn test_round_to_u32() {
        assert_eq!(round_to_u32(Fixed::from_num(2.5)), 3);
        assert_eq!(round_to_u32(Fixed::from_num(2.49)), 2);
        assert_eq!(round_to_u32(Fixed::from_num(-4)), 0);
    }

    #[test]
    fn test_floor_to_u32() {
        assert_eq!(floor_to_u32(Fixed::from_num(99.99)), 99);
        assert_eq!(floor_to_u32(Fixed::from_num(-0.5)), 0);
    }
}
