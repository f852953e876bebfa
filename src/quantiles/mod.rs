//! Mergeable streaming quantile sketches
//!
//! Both sketches summarize a stream of totally-ordered keys in bounded space
//! and answer rank/quantile queries from a [`Cdf`] snapshot:
//!
//! - [`Kll`]: the plain compactor stack. Levels are allocated on demand and
//!   halved on overflow; simple, but the number of levels grows with the
//!   stream.
//! - [`SampledKll`]: the production variant. A fixed memory layout chosen at
//!   construction time, with a weighted single-slot reservoir sampler
//!   absorbing the lightest items. Never allocates after construction.
//!
//! # Choosing a Sketch
//!
//! | Sketch | Memory | Bottom level |
//! |--------|--------|--------------|
//! | `Kll` | grows with log(n) | ordinary compactor |
//! | `SampledKll` | fixed at construction | weighted sampler slot |
//!
//! Both support merging sketches built with the same capacity, which makes
//! them suitable for distributed aggregation: sketch each shard, merge the
//! sketches, query once.
//!
//! # Examples
//!
//! ```
//! use streaming_quantiles::quantiles::SampledKll;
//! use streaming_quantiles::random::OsBits;
//!
//! let mut bits = OsBits::new().unwrap();
//! let mut sketch = SampledKll::new(1000).unwrap();
//! for word in "the quick brown fox jumps over the lazy dog".split_whitespace() {
//!     sketch.insert(&mut bits, word.to_string()).unwrap();
//! }
//! let cdf = sketch.cdf();
//! let median = cdf.value(50.0);
//! assert!(!median.is_empty());
//! ```

mod cdf;
mod kll;
mod sampled_kll;

pub use cdf::Cdf;
pub use kll::Kll;
pub use sampled_kll::SampledKll;
