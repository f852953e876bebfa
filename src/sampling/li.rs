//! Exponential-jump reservoir sampling (Kim-Hung Li, 1994)

use crate::common::Result;
use crate::random::BitSource;
use crate::sampling::Sampler;

/// Draws a uniform float in `(0, 1]` from 53 fresh bits
fn unit_uniform<B: BitSource>(bits: &mut B) -> Result<f64> {
    let mantissa = bits.next_bits(53)?;
    Ok((mantissa + 1) as f64 / (1u64 << 53) as f64)
}

/// Reservoir sampling with exponential jumps
///
/// Tracks `w`, the running minimum of the uniform variates a per-item
/// sampler would have drawn, and jumps directly to the next item whose
/// variate undercuts it: `skip = ⌊−E / ln(1 − w')⌋` with `E ∼ Exp(1)`.
/// Total randomness consumed is `O(log(N/n))` draws instead of one per item.
///
/// The skip computation runs in 64-bit floating point; the skips have
/// slightly larger variance than exact arithmetic would give, but every item
/// retains its `1/n` inclusion probability. [`Vitter`](crate::sampling::Vitter)
/// is the exact-arithmetic alternative.
///
/// # References
///
/// - Li, K-H. (1994). "Reservoir-sampling algorithms of time complexity
///   O(n(1+log(N/n)))"
#[derive(Debug, Clone)]
pub struct Li {
    w: f64,
    skip: u64,
}

impl Li {
    /// Creates an empty sampler; the first step always keeps
    pub fn new() -> Self {
        Li { w: 1.0, skip: 0 }
    }

    /// Items the sampler will reject before the next keep
    pub fn pending_skip(&self) -> u64 {
        self.skip
    }
}

impl Default for Li {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for Li {
    fn step<B: BitSource>(&mut self, bits: &mut B) -> Result<bool> {
        if self.skip > 0 {
            self.skip -= 1;
            return Ok(false);
        }
        // Shrink w by a uniform factor, then jump to the next undercut.
        let w = self.w * unit_uniform(bits)?;
        let exponential = -unit_uniform(bits)?.ln();
        let jump = -exponential / (1.0 - w).ln();
        self.skip = if jump.is_finite() { jump as u64 } else { 0 };
        self.w = w;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::DeterministicBits;

    #[test]
    fn test_first_step_always_keeps() {
        let mut bits = DeterministicBits::new(5);
        let mut sampler = Li::new();
        assert!(sampler.step(&mut bits).unwrap());
    }

    #[test]
    fn test_skip_counts_down_without_bits() {
        let mut bits = DeterministicBits::new(5);
        let mut sampler = Li::new();
        sampler.step(&mut bits).unwrap();
        let mut remaining = sampler.pending_skip();
        while remaining > 0 {
            assert!(!sampler.step(&mut bits).unwrap());
            remaining -= 1;
        }
        assert!(sampler.step(&mut bits).unwrap());
    }

    #[test]
    fn test_keep_rate_roughly_harmonic() {
        let mut bits = DeterministicBits::new(11);
        let mut sampler = Li::new();
        let keeps = (0..10_000)
            .filter(|_| sampler.step(&mut bits).unwrap())
            .count();
        // H(10000) ≈ 9.8; allow generous slack for one seed
        assert!((3..=30).contains(&keeps), "got {} keeps", keeps);
    }
}
