//! Randomness plumbing for the sketches
//!
//! Everything probabilistic in this crate is driven by a stream of fair
//! independent bits:
//!
//! - [`BitSource`]: the one-bit-at-a-time interface, with OS-entropy, seeded,
//!   and fixed-answer implementations
//! - [`BinaryFraction`]: a finite binary fraction compared against rationals
//!   in pure integer arithmetic
//! - [`invert_cdf`]: samples a skip distance from a rational CDF by
//!   bisection, consuming bits lazily
//!
//! The components know nothing about keys or sketches; they are pure
//! functions of the bit stream and their own state.

pub mod bits;
pub mod fraction;
pub mod invert;

pub use bits::{BitSource, BufferedOsBits, DeterministicBits, FixedBits, OsBits};
pub use fraction::BinaryFraction;
pub use invert::{invert_cdf, SkipCdf};
