//! Finite binary fractions and their comparison against rationals
//!
//! A [`BinaryFraction`] is a value `r ∈ [0, 1)` known to finitely many binary
//! digits. The CDF inverter grows one lazily while bisecting, and needs two
//! things from it: exact comparison against a rational `p/q` without ever
//! leaving integer arithmetic, and `±1` arithmetic on the digit string so the
//! half-open interval `[r, r + 2^-len)` can be manipulated from both ends.

use std::cmp::Ordering;

/// A finite binary fraction in `[0, 1)`, most significant bit first
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use streaming_quantiles::random::BinaryFraction;
///
/// // r = 0.101 in binary = 5/8
/// let mut r = BinaryFraction::new();
/// r.push(true);
/// r.push(false);
/// r.push(true);
///
/// assert_eq!(r.compare(1, 2), Ordering::Greater); // 5/8 > 1/2
/// assert_eq!(r.compare(5, 8), Ordering::Equal);
/// assert_eq!(r.compare(3, 4), Ordering::Less); // 5/8 < 3/4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryFraction {
    bits: Vec<bool>,
}

impl BinaryFraction {
    /// Creates the empty fraction (zero digits, value 0)
    pub fn new() -> Self {
        BinaryFraction { bits: Vec::new() }
    }

    /// Appends one digit at the least significant position
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Number of known digits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if no digits are known yet
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Compares the fraction against `num / den`
    ///
    /// Returns `sign(value(self) − num/den)`. Walks the digits once,
    /// maintaining only the numerator of the rational mapped into the
    /// remaining half-open interval; all arithmetic stays within integers of
    /// the size of `den`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < den` and `num ≤ den`.
    pub fn compare(&self, num: u64, den: u64) -> Ordering {
        assert!(den > 0, "compare: denominator must be positive");
        assert!(num <= den, "compare: rational must lie in [0, 1]");
        debug_assert!(den <= u64::MAX / 2);

        let mut n = num;
        let half_up = den.div_ceil(2);
        for &bit in &self.bits {
            if bit {
                // remaining value of self is at least 1/2
                if n < half_up {
                    return Ordering::Greater;
                }
                n = 2 * n - den;
            } else {
                // remaining value of self is below 1/2
                if n >= half_up {
                    return Ordering::Less;
                }
                n *= 2;
            }
        }
        if n == 0 {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    }

    /// Adds one unit in the last place
    ///
    /// Returns `false` on overflow (the fraction was all ones and is now all
    /// zeros, i.e. the successor would be 1.0 which is not representable).
    pub fn increment(&mut self) -> bool {
        for bit in self.bits.iter_mut().rev() {
            if *bit {
                *bit = false;
            } else {
                *bit = true;
                return true;
            }
        }
        false
    }

    /// Subtracts one unit in the last place
    ///
    /// Returns `false` on underflow (the fraction was all zeros and is now
    /// all ones). `increment` followed by `decrement` restores the fraction
    /// exactly, including across the overflow/underflow pair.
    pub fn decrement(&mut self) -> bool {
        for bit in self.bits.iter_mut().rev() {
            if *bit {
                *bit = false;
                return true;
            }
            *bit = true;
        }
        false
    }

    /// The fraction's value as a float, for diagnostics and tests
    ///
    /// Exact only while `len() ≤ 53`; the integer comparison in
    /// [`compare`](Self::compare) is authoritative.
    pub fn value(&self) -> f64 {
        self.bits
            .iter()
            .enumerate()
            .map(|(i, &b)| if b { (0.5f64).powi(i as i32 + 1) } else { 0.0 })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction(bits: &[bool]) -> BinaryFraction {
        let mut r = BinaryFraction::new();
        for &b in bits {
            r.push(b);
        }
        r
    }

    #[test]
    fn test_empty_fraction_is_zero() {
        let r = BinaryFraction::new();
        assert_eq!(r.compare(0, 1), Ordering::Equal);
        assert_eq!(r.compare(1, 2), Ordering::Less);
        assert_eq!(r.value(), 0.0);
    }

    #[test]
    fn test_compare_half() {
        // 0.1 binary = exactly 1/2
        let r = fraction(&[true]);
        assert_eq!(r.compare(1, 2), Ordering::Equal);
        assert_eq!(r.compare(0, 1), Ordering::Greater);
        assert_eq!(r.compare(1, 1), Ordering::Less);
        assert_eq!(r.compare(2, 4), Ordering::Equal);
    }

    #[test]
    fn test_compare_against_one() {
        // every finite fraction is below 1 = q/q
        let r = fraction(&[true, true, true, true]);
        assert_eq!(r.compare(7, 7), Ordering::Less);
    }

    #[test]
    fn test_compare_thirds() {
        // 0.01 = 1/4 < 1/3; 0.011 = 3/8 > 1/3
        assert_eq!(fraction(&[false, true]).compare(1, 3), Ordering::Less);
        assert_eq!(
            fraction(&[false, true, true]).compare(1, 3),
            Ordering::Greater
        );
    }

    #[test]
    fn test_increment_carries() {
        let mut r = fraction(&[false, true, true]);
        assert!(r.increment());
        assert_eq!(r, fraction(&[true, false, false]));
    }

    #[test]
    fn test_increment_overflow_wraps() {
        let mut r = fraction(&[true, true]);
        assert!(!r.increment());
        assert_eq!(r, fraction(&[false, false]));
        // decrement undoes the wrap
        assert!(!r.decrement());
        assert_eq!(r, fraction(&[true, true]));
    }

    #[test]
    fn test_increment_decrement_round_trip() {
        let cases: &[&[bool]] = &[
            &[false],
            &[true],
            &[false, false, true],
            &[true, false, true, true],
        ];
        for bits in cases {
            let mut r = fraction(bits);
            let original = r.clone();
            if r.increment() {
                assert!(r.decrement());
                assert_eq!(r, original);
            }
        }
    }

    #[test]
    fn test_value_matches_bits() {
        assert_eq!(fraction(&[true, false, true]).value(), 0.625);
        assert_eq!(fraction(&[false, false, false, true]).value(), 0.0625);
    }
}
