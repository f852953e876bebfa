//! The simplest single-slot reservoir sampler

use crate::common::Result;
use crate::random::BitSource;
use crate::sampling::Sampler;

/// Count-based Bernoulli sampling: item `n` is kept with probability `1/n`
///
/// One uniform draw per item makes this the baseline the jump-based samplers
/// are measured against.
///
/// # Examples
///
/// ```
/// use streaming_quantiles::random::DeterministicBits;
/// use streaming_quantiles::sampling::{Sampler, Simple};
///
/// let mut bits = DeterministicBits::new(42);
/// let mut sampler = Simple::new();
/// let mut kept = 0u64;
/// for item in 0..100u64 {
///     if sampler.step(&mut bits).unwrap() {
///         kept = item;
///     }
/// }
/// assert!(kept < 100);
/// ```
#[derive(Debug, Clone)]
pub struct Simple {
    seen: u64,
}

impl Simple {
    /// Creates an empty sampler; the first step always keeps
    pub fn new() -> Self {
        Simple { seen: 0 }
    }

    /// Number of stream items observed so far
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl Default for Simple {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for Simple {
    fn step<B: BitSource>(&mut self, bits: &mut B) -> Result<bool> {
        let keep = bits.uniform_below(self.seen + 1)? == 0;
        self.seen += 1;
        Ok(keep)
    }
}
