//! Binary fraction tests - rational comparison and digit arithmetic
//!
//! The comparator is the oracle the CDF inverter bisects with, so it gets
//! exhaustive coverage: every fraction up to a fixed length against every
//! rational with a small denominator, checked against exact integer
//! cross-multiplication.

use std::cmp::Ordering;

use proptest::prelude::*;
use streaming_quantiles::random::BinaryFraction;

fn fraction_from(pattern: u64, len: u32) -> BinaryFraction {
    // bit (len - 1 - i) of `pattern` becomes digit i, so patterns enumerate
    // fractions MSB-first
    let mut r = BinaryFraction::new();
    for i in (0..len).rev() {
        r.push(pattern >> i & 1 == 1);
    }
    r
}

/// Exact comparison of `pattern / 2^len` against `num / den`
fn expected(pattern: u64, len: u32, num: u64, den: u64) -> Ordering {
    (u128::from(pattern) * u128::from(den)).cmp(&(u128::from(num) << len))
}

// ============================================================================
// Phase 1: Exhaustive comparison
// ============================================================================

#[test]
fn test_compare_exhaustive_short_fractions_all_denominators() {
    for len in 0..=6u32 {
        for pattern in 0..(1u64 << len) {
            let r = fraction_from(pattern, len);
            for den in 1..=255u64 {
                for num in 0..=den {
                    assert_eq!(
                        r.compare(num, den),
                        expected(pattern, len, num, den),
                        "r = {:0width$b}/2^{}, rational = {}/{}",
                        pattern,
                        len,
                        num,
                        den,
                        width = len as usize
                    );
                }
            }
        }
    }
}

#[test]
fn test_compare_exhaustive_long_fractions_small_denominators() {
    for len in 7..=12u32 {
        for pattern in 0..(1u64 << len) {
            let r = fraction_from(pattern, len);
            for den in 1..=32u64 {
                for num in 0..=den {
                    assert_eq!(r.compare(num, den), expected(pattern, len, num, den));
                }
            }
        }
    }
}

// ============================================================================
// Phase 2: Digit arithmetic
// ============================================================================

#[test]
fn test_increment_matches_integer_successor() {
    for len in 1..=10u32 {
        for pattern in 0..(1u64 << len) {
            let mut r = fraction_from(pattern, len);
            let carried = r.increment();
            if pattern + 1 < (1 << len) {
                assert!(carried);
                assert_eq!(r, fraction_from(pattern + 1, len));
            } else {
                assert!(!carried, "all-ones must report overflow");
                assert_eq!(r, fraction_from(0, len));
            }
        }
    }
}

// ============================================================================
// Phase 3: Property-based tests
// ============================================================================

proptest! {
    #[test]
    fn prop_compare_matches_cross_multiplication(
        pattern in 0u64..(1 << 20),
        den in 1u64..=255,
        num_seed in 0u64..=255,
    ) {
        let len = 20;
        let num = num_seed % (den + 1);
        let r = fraction_from(pattern, len);
        prop_assert_eq!(r.compare(num, den), expected(pattern, len, num, den));
    }

    #[test]
    fn prop_increment_then_decrement_restores(bits in prop::collection::vec(any::<bool>(), 1..24)) {
        let mut r = BinaryFraction::new();
        for &b in &bits {
            r.push(b);
        }
        let original = r.clone();
        if r.increment() {
            prop_assert!(r.decrement());
            prop_assert_eq!(r, original);
        } else {
            // overflow wraps to zero and underflow wraps back
            prop_assert!(!r.decrement());
            prop_assert_eq!(r, original);
        }
    }

    #[test]
    fn prop_value_agrees_with_compare(pattern in 0u64..(1 << 16), den in 1u64..=64, num_seed: u64) {
        let len = 16;
        let num = num_seed % (den + 1);
        let r = fraction_from(pattern, len);
        // the float view is exact at this length, so the two must agree
        let by_value = r.value().partial_cmp(&(num as f64 / den as f64)).unwrap();
        prop_assert_eq!(r.compare(num, den), by_value);
    }
}
