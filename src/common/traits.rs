//! Core traits for the sketch implementations

use crate::common::Result;
use crate::quantiles::Cdf;
use crate::random::BitSource;

/// Trait implemented by every mergeable quantile sketch in this crate
///
/// A sketch owns its storage exclusively; the bit source it draws randomness
/// from is owned by the caller and passed by mutable reference to every
/// mutating operation. This keeps a single source shareable across many
/// sketches (one at a time) and makes every probabilistic decision
/// reproducible under a seeded source.
///
/// Implementations must guarantee that `cdf` is a snapshot: the returned
/// [`Cdf`] shares no state with the sketch it came from.
pub trait StreamSketch {
    /// The totally-ordered key type this sketch summarizes
    type Key: Ord + Clone;

    /// Feed one raw stream item into the sketch
    ///
    /// # Errors
    ///
    /// Propagates [`SketchError::EntropyExhausted`](crate::SketchError) from
    /// the bit source; a failed insert leaves the sketch in an undefined
    /// state.
    fn insert<B: BitSource>(&mut self, bits: &mut B, key: Self::Key) -> Result<()>;

    /// Absorb another sketch of the same shape
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::IncompatibleSketches`](crate::SketchError) if
    /// the sketches were built with different capacities, and propagates bit
    /// source failures.
    fn merge<B: BitSource>(&mut self, bits: &mut B, other: &Self) -> Result<()>
    where
        Self: Sized;

    /// Snapshot the sketch's empirical distribution
    fn cdf(&self) -> Cdf<Self::Key>;

    /// Check if the sketch has absorbed any items
    fn is_empty(&self) -> bool;
}
