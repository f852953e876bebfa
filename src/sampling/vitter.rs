//! Entropy-optimal reservoir sampling with exact skips

use crate::common::Result;
use crate::random::{invert_cdf, BitSource, SkipCdf};
use crate::sampling::Sampler;

/// The skip distribution of a single-slot reservoir sampler
///
/// After `count` items, the uniform variate attached to the kept item is the
/// maximum of `count` i.i.d. uniforms; the next kept item is the first whose
/// variate exceeds it. The chance of skipping fewer than `s` items is
/// `f(s) = s / (s + count)`, so bucket `s` carries exactly the probability
/// that the sampler skips `s` items.
#[derive(Debug)]
pub struct VitterCdf;

impl SkipCdf for VitterCdf {
    fn cdf(count: u64, skip: u64) -> (u64, u64) {
        (skip, skip + count)
    }
}

/// Reservoir sampling driven by rational CDF inversion
///
/// Consumes only the bits it needs (amortized `O(1)` per item, `O(log n)`
/// per keep) and computes skips exactly, with no floating-point
/// approximation anywhere. This is the sampler that justifies the
/// [`BinaryFraction`](crate::random::BinaryFraction) and
/// [`invert_cdf`](crate::random::invert_cdf) machinery.
///
/// # Examples
///
/// ```
/// use streaming_quantiles::random::DeterministicBits;
/// use streaming_quantiles::sampling::{Sampler, Vitter};
///
/// let mut bits = DeterministicBits::new(42);
/// let mut sampler = Vitter::new();
/// let mut kept = 0u64;
/// for item in 0..1000u64 {
///     if sampler.step(&mut bits).unwrap() {
///         kept = item;
///     }
/// }
/// assert!(kept < 1000);
/// ```
#[derive(Debug, Clone)]
pub struct Vitter {
    count: u64,
    skip: u64,
}

impl Vitter {
    /// Creates an empty sampler; the first step always keeps
    pub fn new() -> Self {
        Vitter { count: 0, skip: 0 }
    }

    /// Number of stream items observed so far
    pub fn seen(&self) -> u64 {
        self.count
    }

    /// Items the sampler will reject before the next keep
    pub fn pending_skip(&self) -> u64 {
        self.skip
    }
}

impl Default for Vitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for Vitter {
    fn step<B: BitSource>(&mut self, bits: &mut B) -> Result<bool> {
        self.count += 1;
        if self.skip > 0 {
            self.skip -= 1;
            return Ok(false);
        }
        self.skip = invert_cdf::<VitterCdf, _>(bits, self.count)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{DeterministicBits, FixedBits};

    #[test]
    fn test_first_step_always_keeps() {
        let mut bits = DeterministicBits::new(5);
        let mut sampler = Vitter::new();
        assert!(sampler.step(&mut bits).unwrap());
        assert_eq!(sampler.seen(), 1);
    }

    #[test]
    fn test_skip_counts_down_exactly() {
        let mut bits = DeterministicBits::new(5);
        let mut sampler = Vitter::new();
        sampler.step(&mut bits).unwrap();
        let skip = sampler.pending_skip();
        for _ in 0..skip {
            assert!(!sampler.step(&mut bits).unwrap());
        }
        assert!(sampler.step(&mut bits).unwrap());
    }

    #[test]
    fn test_reproducible_under_seed() {
        let run = |seed| {
            let mut bits = DeterministicBits::new(seed);
            let mut sampler = Vitter::new();
            let mut kept = 0;
            for item in 0..500 {
                if sampler.step(&mut bits).unwrap() {
                    kept = item;
                }
            }
            kept
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_exhaustion_surfaces_as_error() {
        use crate::random::BitSource;

        let mut bits = FixedBits::new(true);
        while bits.next_bit().is_ok() {}
        let mut sampler = Vitter::new();
        assert!(sampler.step(&mut bits).is_err());
    }

    #[test]
    fn test_keep_rate_roughly_harmonic() {
        let mut bits = DeterministicBits::new(11);
        let mut sampler = Vitter::new();
        let keeps = (0..10_000)
            .filter(|_| sampler.step(&mut bits).unwrap())
            .count();
        assert!((3..=30).contains(&keeps), "got {} keeps", keeps);
    }
}
