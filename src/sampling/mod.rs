//! Single-item reservoir samplers
//!
//! This module provides reservoir samplers with a sample size of one, the
//! building block the sampled KLL sketch routes its lightest items through:
//!
//! - [`Simple`]: one uniform draw per item (Algorithm R with k = 1)
//! - [`Li`]: exponential jumps, O(log(N/n)) draws total (Li 1994)
//! - [`Vitter`]: entropy-optimal exact skips via rational CDF inversion
//!
//! # Choosing a Sampler
//!
//! | Sampler | Randomness per item | Skip arithmetic |
//! |---------|--------------------|-----------------|
//! | `Simple` | O(log n) bits | none |
//! | `Li` | amortized o(1) | floating point |
//! | `Vitter` | amortized o(1) | exact rationals |
//!
//! All three expose one operation, [`Sampler::step`]: "on seeing the next
//! stream item, replace the currently-kept item". The caller owns the kept
//! item; the samplers only track the decision state.

pub mod li;
pub mod simple;
pub mod vitter;

pub use li::Li;
pub use simple::Simple;
pub use vitter::{Vitter, VitterCdf};

use crate::common::Result;
use crate::random::BitSource;

/// A single-slot reservoir sampling policy
///
/// Every stream item is fed through `step`, the first included (the first
/// call always keeps). After `n` calls, the item for which `step` most
/// recently returned `true` is a uniform random choice among the `n` items
/// seen.
pub trait Sampler {
    /// Decides whether the next stream item replaces the kept one
    ///
    /// # Errors
    ///
    /// Propagates bit source failures; the sampler state is unchanged in that
    /// case only if no bits were consumed.
    fn step<B: BitSource>(&mut self, bits: &mut B) -> Result<bool>;
}
