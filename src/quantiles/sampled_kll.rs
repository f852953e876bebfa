//! The sampled KLL sketch: fixed memory, bottom-level reservoir sampler
//!
//! A single contiguous array of `capacity` key slots is partitioned into
//! levels at construction time; the partition never changes. Level `d` holds
//! keys of weight `2^{d + sample_height}`, where `sample_height` is a global
//! watermark that rises as the stream grows. Items too light for any level
//! are absorbed by a single weighted reservoir slot at the bottom of the
//! array, so the sketch never allocates after construction and never exceeds
//! its budget.
//!
//! Compared to the plain [`Kll`](crate::Kll), the fixed layout trades the
//! growing level stack for two pieces of bookkeeping:
//!
//! - a heavy flag per level, marking post-compaction survivors that must be
//!   promoted before the level accepts new inserts, and
//! - `shuffle_down`, which raises the watermark by one and slides every
//!   level's contents down a slot, reusing the freed top level.
//!
//! # Space and error
//!
//! For capacity `N` the rank error behaves as `ε ∝ √(−ln δ) / N` for a single
//! quantile query at failure rate `δ`.

use crate::common::{Result, SketchError, StreamSketch};
use crate::quantiles::Cdf;
use crate::random::BitSource;

/// Smallest level buffer the layout will produce
const MIN_LEVEL: u32 = 4;

fn round_capacity(x: u32) -> u32 {
    let even = 2 * (x / 2);
    if even > MIN_LEVEL {
        even
    } else {
        MIN_LEVEL
    }
}

/// Walks the residual chain `c → c − round_capacity(c/3)` down to the
/// remainder below `MIN_LEVEL`
fn residual_chain(capacity: u32) -> Vec<u32> {
    let mut chain = vec![capacity];
    let mut c = capacity;
    while c >= MIN_LEVEL {
        c -= round_capacity(c / 3);
        chain.push(c);
    }
    chain
}

/// Computes the slot index where each level starts
///
/// `level_start[d]..level_start[d + 1]` is level `d`'s slice;
/// `level_start.last() == capacity`. Slot 0 is never part of a level: when
/// the chain bottoms out at exactly zero the whole layout is shifted up by
/// one so the sampler payload always has a home.
fn build_level_start(capacity: u32) -> Vec<u32> {
    let tight = *residual_chain(capacity).last().unwrap() == 0;
    let shift = u32::from(tight);
    let chain = residual_chain(capacity - shift);
    // the chain descends from the full budget; level starts ascend
    let level_start: Vec<u32> = chain.iter().rev().map(|&c| c + shift).collect();
    debug_assert_eq!(*level_start.last().unwrap(), capacity);
    level_start
}

/// Sampled KLL sketch over a totally-ordered key type
///
/// All randomness is drawn from a caller-owned [`BitSource`]; the sketch
/// never caches the source. `T: Default` supplies the fill value for slots
/// that hold no key yet.
///
/// # Examples
///
/// ```
/// use streaming_quantiles::quantiles::SampledKll;
/// use streaming_quantiles::random::DeterministicBits;
///
/// let mut bits = DeterministicBits::new(42);
/// let mut sketch = SampledKll::new(1000).unwrap();
/// for i in 0..50_000u64 {
///     sketch.insert(&mut bits, i).unwrap();
/// }
/// let cdf = sketch.cdf();
/// let median = *cdf.value(50.0);
/// assert!(median > 20_000 && median < 30_000);
/// ```
#[derive(Debug, Clone)]
pub struct SampledKll<T> {
    /// One contiguous block of key slots; slot 0 doubles as the sampler
    /// payload
    data: Vec<T>,
    /// Partition of `data` into level slices, fixed at construction
    level_start: Vec<u32>,
    /// Current occupancy of each level's slice
    level_sizes: Vec<u32>,
    /// Set while a level holds compaction survivors awaiting promotion
    heavies: Vec<bool>,
    /// Accumulated weight in the sampler slot, always below `2^sample_height`
    sample_weight: u64,
    /// Weight exponent of level 0; starts negative so early inserts land on
    /// the top level
    sample_height: i32,
    capacity: u32,
}

impl<T: Ord + Clone + Default> SampledKll<T> {
    /// Minimum capacity: enough for one level plus the sampler slot
    pub const MIN_CAPACITY: u32 = 5;

    /// Creates an empty sketch with a fixed total key budget
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `capacity` is below
    /// [`MIN_CAPACITY`](Self::MIN_CAPACITY).
    pub fn new(capacity: u32) -> Result<Self> {
        if capacity < Self::MIN_CAPACITY {
            return Err(SketchError::InvalidParameter {
                param: "capacity".to_string(),
                value: capacity.to_string(),
                constraint: format!("must be at least {}", Self::MIN_CAPACITY),
            });
        }
        let level_start = build_level_start(capacity);
        let levels = level_start.len() - 1;
        debug_assert!(level_start[0] >= 1);
        debug_assert!(level_start.windows(2).all(|w| {
            let cap = w[1] - w[0];
            cap >= MIN_LEVEL && cap % 2 == 0
        }));
        debug_assert!(level_start
            .windows(3)
            .all(|w| w[1] - w[0] <= w[2] - w[1]));
        Ok(SampledKll {
            data: vec![T::default(); capacity as usize],
            level_start,
            level_sizes: vec![0; levels],
            heavies: vec![false; levels],
            sample_weight: 0,
            sample_height: 1 - levels as i32,
            capacity,
        })
    }

    /// The total key budget this sketch was built with
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of levels in the fixed layout
    fn levels(&self) -> usize {
        self.level_sizes.len()
    }

    fn level_capacity(&self, level: usize) -> u32 {
        self.level_start[level + 1] - self.level_start[level]
    }

    /// Weight exponent of keys stored at `level` under the current watermark
    fn level_height(&self, level: usize) -> i32 {
        level as i32 + self.sample_height
    }

    /// Number of keys currently retained, the sampler slot included
    pub fn retained(&self) -> usize {
        let sampled = usize::from(self.sample_weight > 0);
        self.level_sizes.iter().map(|&s| s as usize).sum::<usize>() + sampled
    }

    /// True if the sketch has absorbed no weight at all
    pub fn is_empty(&self) -> bool {
        self.sample_weight == 0 && self.level_sizes.iter().all(|&s| s == 0)
    }

    /// Total stream weight the sketch currently represents
    ///
    /// Equals the sum of inserted weights exactly, modulo the Bernoulli
    /// decisions in flight inside the sampler slot.
    pub fn weighted_len(&self) -> u64 {
        let mut total = self.sample_weight;
        let mut weight = 1u64 << self.sample_height.max(0);
        for level in (-self.sample_height).max(0) as usize..self.levels() {
            total += u64::from(self.level_sizes[level]) * weight;
            weight *= 2;
        }
        total
    }

    /// Feeds one raw stream item into the sketch
    ///
    /// # Errors
    ///
    /// Propagates bit source failures; a failed insert leaves the sketch in
    /// an undefined state.
    pub fn insert<B: BitSource>(&mut self, bits: &mut B, key: T) -> Result<()> {
        self.insert_at_height(bits, key, 0)
    }

    /// Inserts a key that represents `2^height` stream items
    ///
    /// Raw stream inserts use height 0; merges re-insert donor keys at their
    /// effective heights.
    ///
    /// # Panics
    ///
    /// Panics if `height` is negative.
    ///
    /// # Errors
    ///
    /// Propagates bit source failures.
    pub fn insert_at_height<B: BitSource>(&mut self, bits: &mut B, key: T, height: i32) -> Result<()> {
        assert!(height >= 0, "key height must be non-negative");
        // A key heavier than the whole layout forces the watermark up first.
        while height - self.sample_height >= self.levels() as i32 {
            self.shuffle_down(bits)?;
        }

        let mut destination = height - self.sample_height;
        while destination >= 0
            && self.level_sizes[destination as usize] == self.level_capacity(destination as usize)
        {
            let d = destination as usize;
            self.compress(bits, d, self.level_sizes[d])?;
            if d == self.levels() - 1 {
                self.shuffle_down(bits)?;
            } else {
                // Survivors of the compaction are promoted before the level
                // accepts anything new.
                while self.level_sizes[d] > 0 && self.heavies[d] {
                    let top = self.level_start[d] + self.level_sizes[d] - 1;
                    let survivor = self.data[top as usize].clone();
                    self.level_sizes[d] -= 1;
                    self.insert_at_height(bits, survivor, height + 1)?;
                }
                self.heavies[d] = false;
            }
            destination = height - self.sample_height;
        }

        if destination >= 0 {
            let d = destination as usize;
            let slot = self.level_start[d] + self.level_sizes[d];
            debug_assert!(slot < self.level_start[d + 1], "level overran its slice");
            self.data[slot as usize] = key;
            self.level_sizes[d] += 1;
            return Ok(());
        }

        // Too light for any level: weighted reservoir sampling in slot 0.
        debug_assert!(self.sample_height >= 1);
        let limit = 1u64 << self.sample_height;
        let key_weight = 1u64 << height;
        if self.sample_weight + key_weight <= limit {
            if bits.uniform_below(self.sample_weight + key_weight)? < key_weight {
                self.data[0] = key;
            }
            self.sample_weight += key_weight;
            if self.sample_weight == limit {
                self.sample_weight = 0;
                let flushed = self.data[0].clone();
                self.insert_at_height(bits, flushed, self.sample_height)?;
            }
            return Ok(());
        }

        // The slot would overflow. Keep the lighter of the two candidates in
        // the slot and promote the heavier with its fair share of `limit`.
        let mut contender = key;
        let mut contender_weight = key_weight;
        if self.sample_weight > contender_weight {
            std::mem::swap(&mut self.sample_weight, &mut contender_weight);
            std::mem::swap(&mut self.data[0], &mut contender);
        }
        if bits.uniform_below(limit)? < contender_weight {
            self.insert_at_height(bits, contender, self.sample_height)?;
        }
        Ok(())
    }

    /// Sorts a full level and keeps every other element, in place
    ///
    /// The surviving half sits at the front of the level's slice with the
    /// heavy flag set; each survivor now stands for twice its old weight.
    fn compress<B: BitSource>(&mut self, bits: &mut B, level: usize, len: u32) -> Result<()> {
        let start = self.level_start[level] as usize;
        let keys = &mut self.data[start..start + len as usize];
        keys.sort();
        let offset = usize::from(bits.next_bit()?);
        for i in 0..(len as usize) / 2 {
            keys[i] = keys[offset + 2 * i].clone();
        }
        self.heavies[level] = true;
        self.level_sizes[level] = len / 2;
        Ok(())
    }

    /// Raises the sampler watermark by one and slides every level down a slot
    ///
    /// What was level `d` afterwards holds the keys that used to live at
    /// level `d + 1`, at unchanged effective weight. The bottom level's keys
    /// are parked in a side buffer and re-inserted at the end, where the
    /// sampler absorbs them at their new, sub-watermark weight.
    fn shuffle_down<B: BitSource>(&mut self, bits: &mut B) -> Result<()> {
        let mut purgatory: Vec<T> = Vec::new();
        if !self.heavies[0] {
            let start = self.level_start[0] as usize;
            let size = self.level_sizes[0] as usize;
            purgatory.extend_from_slice(&self.data[start..start + size]);
            self.level_sizes[0] = 0;
        }

        for level in 1..self.levels() {
            if self.heavies[level] {
                continue;
            }
            // Parking region for level-1 survivors: the top half-capacity of
            // this level's slice, disjoint from the slots still being
            // drained by construction of the layout.
            let parked_at = (self.level_start[level + 1] - self.level_capacity(level - 1) / 2) as usize;
            let mut parked = false;
            while self.level_sizes[level] > 0 {
                if self.level_sizes[level - 1] == self.level_capacity(level - 1) {
                    self.compress(bits, level - 1, self.level_sizes[level - 1])?;
                    let survivors = self.level_sizes[level - 1] as usize;
                    let src = self.level_start[level - 1] as usize;
                    debug_assert!(
                        (self.level_start[level] + self.level_sizes[level]) as usize <= parked_at
                    );
                    for i in 0..survivors {
                        self.data[parked_at + i] = self.data[src + i].clone();
                    }
                    parked = true;
                    self.level_sizes[level - 1] = 0;
                }
                let from = self.level_start[level] + self.level_sizes[level] - 1;
                let to = self.level_start[level - 1] + self.level_sizes[level - 1];
                self.data[to as usize] = self.data[from as usize].clone();
                self.level_sizes[level - 1] += 1;
                self.level_sizes[level] -= 1;
            }
            if parked {
                let survivors = (self.level_capacity(level - 1) / 2) as usize;
                let dst = self.level_start[level] as usize;
                for i in 0..survivors {
                    self.data[dst + i] = self.data[parked_at + i].clone();
                }
                self.level_sizes[level] = survivors as u32;
            }
            self.heavies[level] = true;
        }

        self.sample_height += 1;
        self.heavies.fill(false);
        for key in purgatory {
            self.insert_at_height(bits, key, self.sample_height - 1)?;
        }
        Ok(())
    }

    /// Snapshot the sketch's empirical distribution
    pub fn cdf(&self) -> Cdf<T> {
        let mut pairs: Vec<(T, u64)> = Vec::with_capacity(self.retained());
        if self.sample_weight > 0 {
            pairs.push((self.data[0].clone(), self.sample_weight));
        }
        let mut weight = 1u64 << self.sample_height.max(0);
        for level in (-self.sample_height).max(0) as usize..self.levels() {
            let start = self.level_start[level] as usize;
            for i in 0..self.level_sizes[level] as usize {
                pairs.push((self.data[start + i].clone(), weight));
            }
            weight *= 2;
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Cdf::from_sorted(pairs)
    }

    /// Absorbs another sketch built with the same capacity
    ///
    /// Donor keys re-enter at their effective heights; the donor's sampler
    /// slot, whose weight need not be a power of two, is re-inserted once per
    /// set bit of that weight so total weight is conserved exactly.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleSketches` on capacity mismatch; propagates bit
    /// source failures.
    pub fn merge<B: BitSource>(&mut self, bits: &mut B, other: &Self) -> Result<()> {
        if self.capacity != other.capacity {
            return Err(SketchError::IncompatibleSketches {
                reason: format!("capacity mismatch: {} vs {}", self.capacity, other.capacity),
            });
        }
        for level in (-other.sample_height).max(0) as usize..other.levels() {
            let start = other.level_start[level] as usize;
            let height = other.level_height(level);
            for i in 0..other.level_sizes[level] as usize {
                self.insert_at_height(bits, other.data[start + i].clone(), height)?;
            }
        }
        let mut slot_weight = other.sample_weight;
        while slot_weight > 0 {
            let bit = slot_weight.trailing_zeros() as i32;
            self.insert_at_height(bits, other.data[0].clone(), bit)?;
            slot_weight &= slot_weight - 1;
        }
        Ok(())
    }
}

impl<T: Ord + Clone + Default> StreamSketch for SampledKll<T> {
    type Key = T;

    fn insert<B: BitSource>(&mut self, bits: &mut B, key: T) -> Result<()> {
        SampledKll::insert(self, bits, key)
    }

    fn merge<B: BitSource>(&mut self, bits: &mut B, other: &Self) -> Result<()> {
        SampledKll::merge(self, bits, other)
    }

    fn cdf(&self) -> Cdf<T> {
        SampledKll::cdf(self)
    }

    fn is_empty(&self) -> bool {
        SampledKll::is_empty(self)
    }
}
