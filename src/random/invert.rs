//! Sampling an integer skip by inverting a rational CDF
//!
//! Given a family of rationals `f(s)` non-decreasing in `s`, [`invert_cdf`]
//! samples `s` with probability mass `f(s+1) − f(s)` while materializing only
//! as many bits of a uniform `U ∈ [0, 1)` as are needed to identify which
//! half-open bucket `[f(s), f(s+1))` contains `U`.
//!
//! The prefix `r` of `U` brackets it: `U ∈ [r, r + 2^-len)`. Bisecting `f`
//! against `r` raises the lower end of the candidate range; bisecting against
//! the incremented `r` lowers the upper end; a fresh bit halves the prefix
//! interval whenever the two ends disagree. Everything runs in integer
//! arithmetic via [`BinaryFraction::compare`].

use std::cmp::Ordering;

use crate::common::Result;
use crate::random::{BinaryFraction, BitSource};

/// A skip distribution described by its CDF as a family of rationals
///
/// `cdf(count, s)` returns `(num, den)` with `num/den = f(s)`, the
/// probability of skipping fewer than `s` items when `count` items have been
/// seen. `f` must be non-decreasing in `s` for fixed `count`.
pub trait SkipCdf {
    /// Exclusive upper bound on positions: skips are sampled from
    /// `[0, MAX_POSITION − count)`
    ///
    /// Bounds the denominators the comparator sees; the probability mass
    /// beyond it is negligible for any stream this crate can ingest.
    const MAX_POSITION: u64 = 1 << 32;

    /// The rational `f(s)` for the given stream position
    fn cdf(count: u64, skip: u64) -> (u64, u64);
}

/// Smallest `s` in `(lo, hi]` with `f(s) ≥ r`, or `hi + 1` if there is none
///
/// Equality counts as "found" for both uses: on the lower end `r` is an
/// inclusive bound on `U`, on the upper end the incremented `r` is an
/// exclusive one, and both tie rules collapse to the same predicate.
fn invert_point<C: SkipCdf>(r: &BinaryFraction, count: u64, lo: u64, hi: u64) -> u64 {
    let mut a = lo + 1;
    let mut b = hi + 1;
    while a < b {
        let mid = a + (b - a) / 2;
        let (num, den) = C::cdf(count, mid);
        if r.compare(num, den) != Ordering::Greater {
            b = mid;
        } else {
            a = mid + 1;
        }
    }
    a
}

/// Samples a skip distance from `C`'s distribution at stream position `count`
///
/// Consumes `O(log MAX_POSITION)` bits in expectation and terminates with
/// probability 1. `count == 0` returns 0 without touching the bit source.
///
/// # Errors
///
/// Propagates bit source failures; no skip is produced in that case.
///
/// # Examples
///
/// ```
/// use streaming_quantiles::random::{invert_cdf, DeterministicBits, SkipCdf};
/// use streaming_quantiles::sampling::VitterCdf;
///
/// let mut bits = DeterministicBits::new(42);
/// let skip = invert_cdf::<VitterCdf, _>(&mut bits, 10).unwrap();
/// assert!(skip < VitterCdf::MAX_POSITION);
/// ```
pub fn invert_cdf<C: SkipCdf, B: BitSource>(bits: &mut B, count: u64) -> Result<u64> {
    if count == 0 {
        return Ok(0);
    }
    let mut lo: u64 = 0;
    let mut hi: u64 = C::MAX_POSITION.saturating_sub(count);
    if hi <= 1 {
        return Ok(0);
    }

    let mut r = BinaryFraction::new();
    r.push(bits.next_bit()?);
    loop {
        // U ≥ r, so everything strictly below r's bucket is excluded.
        let s = invert_point::<C>(&r, count, lo, hi);
        lo = s - 1;
        if lo + 1 >= hi {
            return Ok(hi - 1);
        }

        // U < r + one ulp; a successful increment tightens from above.
        if r.increment() {
            let s = invert_point::<C>(&r, count, lo, hi);
            if s <= hi {
                hi = s;
            }
            if hi - lo == 1 {
                return Ok(hi - 1);
            }
            r.decrement();
        } else {
            // r was all ones; restore it and learn another digit instead.
            r.decrement();
        }
        r.push(bits.next_bit()?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{DeterministicBits, FixedBits};
    use crate::sampling::VitterCdf;

    #[test]
    fn test_zero_count_short_circuits() {
        // must not touch the bit source at all
        let mut bits = FixedBits::new(true);
        for _ in 0..FixedBits::BUDGET {
            assert_eq!(invert_cdf::<VitterCdf, _>(&mut bits, 0).unwrap(), 0);
        }
    }

    #[test]
    fn test_deterministic_given_seed() {
        for count in [1u64, 2, 10, 1000] {
            let mut a = DeterministicBits::new(42);
            let mut b = DeterministicBits::new(42);
            assert_eq!(
                invert_cdf::<VitterCdf, _>(&mut a, count).unwrap(),
                invert_cdf::<VitterCdf, _>(&mut b, count).unwrap()
            );
        }
    }

    #[test]
    fn test_all_zero_bits_sample_smallest_bucket() {
        // U = 0.000... always lands in [f(0), f(1))
        let mut bits = FixedBits::new(false);
        assert_eq!(invert_cdf::<VitterCdf, _>(&mut bits, 5).unwrap(), 0);
    }

    #[test]
    fn test_exhausted_source_propagates() {
        let mut bits = FixedBits::new(true);
        // burn the budget, then every draw must fail cleanly
        while bits.next_bit().is_ok() {}
        assert!(invert_cdf::<VitterCdf, _>(&mut bits, 7).is_err());
    }

    #[test]
    fn test_skip_mean_tracks_count() {
        // E[skip] grows with count; a gross sanity check on the inversion
        let mut bits = DeterministicBits::new(7);
        let trials = 2000;
        let mut small = 0u64;
        let mut large = 0u64;
        for _ in 0..trials {
            small += invert_cdf::<VitterCdf, _>(&mut bits, 2).unwrap().min(1000);
            large += invert_cdf::<VitterCdf, _>(&mut bits, 200).unwrap().min(1000);
        }
        assert!(large > small);
    }
}
