//! streaming_quantiles: Mergeable Streaming Quantile Sketches
//!
//! This library implements the KLL quantile sketch with a bottom-level
//! weighted reservoir sampler, together with the single-item reservoir
//! samplers (Simple, Li, Vitter) the sketch family is built from.
//!
//! The sketches summarize an unbounded stream of totally-ordered keys in
//! bounded space and answer approximate rank/quantile queries with provable
//! error. All randomness is drawn one fair bit at a time from a caller-owned
//! [`BitSource`], which makes every probabilistic decision reproducible under
//! a seeded source.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod common;
pub mod quantiles;
pub mod random;
pub mod sampling;

// Re-export core types for convenience
pub use common::{Result, SketchError, StreamSketch};

/// Error types and result aliases for sketch operations
pub mod error {
    pub use crate::common::{Result, SketchError};
}

// Re-export commonly used types
pub use quantiles::{Cdf, Kll, SampledKll};
pub use random::{BinaryFraction, BitSource, BufferedOsBits, DeterministicBits, FixedBits, OsBits};
pub use sampling::{Li, Sampler, Simple, Vitter};
