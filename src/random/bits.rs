//! Bit sources: endless streams of fair independent bits
//!
//! Every probabilistic decision in the sketches is made by drawing bits from
//! a [`BitSource`]. The concrete sources cache one machine word and dispense
//! its bits LSB-first until empty, so a sketch that needs a single coin flip
//! does not pay for a full word of entropy.
//!
//! The source is owned by the caller and passed by mutable reference to every
//! mutating sketch operation; sketches never cache it internally.

use crate::common::{Result, SketchError};
use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng, TryRngCore};

/// A stream of fair independent bits
///
/// Implementations must behave as if each call to [`next_bit`](Self::next_bit)
/// returns an independent uniform bit. Failures are real: once a source
/// reports an error, the caller's probabilistic guarantees are void.
pub trait BitSource {
    /// Draws the next bit
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::EntropyExhausted`] if the source has no more
    /// randomness, or [`SketchError::EntropyUnavailable`] if the OS entropy
    /// device fails mid-stream.
    fn next_bit(&mut self) -> Result<bool>;

    /// Assembles `count` bits (at most 64) into a word, LSB first
    fn next_bits(&mut self, count: u32) -> Result<u64> {
        debug_assert!(count <= 64);
        let mut word = 0u64;
        for i in 0..count {
            if self.next_bit()? {
                word |= 1 << i;
            }
        }
        Ok(word)
    }

    /// Draws a uniform integer in `[0, bound)` by rejection sampling
    ///
    /// Consumes `ceil(log2(bound))` bits per attempt; the expected number of
    /// attempts is below 2.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    fn uniform_below(&mut self, bound: u64) -> Result<u64> {
        assert!(bound > 0, "uniform_below: bound must be positive");
        if bound == 1 {
            return Ok(0);
        }
        let width = 64 - (bound - 1).leading_zeros();
        loop {
            let draw = self.next_bits(width)?;
            if draw < bound {
                return Ok(draw);
            }
        }
    }
}

fn os_word() -> Result<u32> {
    OsRng
        .try_next_u32()
        .map_err(|e| SketchError::EntropyUnavailable {
            reason: e.to_string(),
        })
}

/// Bits read from the OS entropy device, one word at a time
///
/// Construction probes the device once so that an unusable source fails fast
/// instead of poisoning the first sketch mutation.
///
/// # Examples
///
/// ```
/// use streaming_quantiles::random::{BitSource, OsBits};
///
/// let mut bits = OsBits::new().unwrap();
/// let coin = bits.next_bit().unwrap();
/// assert!(coin || !coin);
/// ```
#[derive(Debug)]
pub struct OsBits {
    cache: u32,
    remaining: u32,
}

impl OsBits {
    /// Opens the OS entropy device
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::EntropyUnavailable`] if the device cannot be
    /// read.
    pub fn new() -> Result<Self> {
        Ok(OsBits {
            cache: os_word()?,
            remaining: 32,
        })
    }
}

impl BitSource for OsBits {
    fn next_bit(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            self.cache = os_word()?;
            self.remaining = 32;
        }
        let bit = self.cache & 1 == 1;
        self.cache >>= 1;
        self.remaining -= 1;
        Ok(bit)
    }
}

/// OS entropy with an amortizing refill buffer
///
/// Same semantics as [`OsBits`], but each trip to the OS fills `buf_size`
/// bytes at once. Useful when a sketch ingests a long stream and the per-word
/// syscall cost of [`OsBits`] shows up in profiles.
#[derive(Debug)]
pub struct BufferedOsBits {
    buf: Vec<u8>,
    next_byte: usize,
    cache: u8,
    remaining: u32,
}

impl BufferedOsBits {
    /// Opens the OS entropy device behind a buffer of `buf_size` bytes
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `buf_size` is zero and
    /// [`SketchError::EntropyUnavailable`] if the device cannot be read.
    pub fn new(buf_size: usize) -> Result<Self> {
        if buf_size == 0 {
            return Err(SketchError::InvalidParameter {
                param: "buf_size".to_string(),
                value: buf_size.to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }
        let mut buf = vec![0u8; buf_size];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| SketchError::EntropyUnavailable {
                reason: e.to_string(),
            })?;
        Ok(BufferedOsBits {
            buf,
            next_byte: 0,
            cache: 0,
            remaining: 0,
        })
    }
}

impl BitSource for BufferedOsBits {
    fn next_bit(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            if self.next_byte == self.buf.len() {
                OsRng.try_fill_bytes(&mut self.buf).map_err(|e| {
                    SketchError::EntropyUnavailable {
                        reason: e.to_string(),
                    }
                })?;
                self.next_byte = 0;
            }
            self.cache = self.buf[self.next_byte];
            self.next_byte += 1;
            self.remaining = 8;
        }
        let bit = self.cache & 1 == 1;
        self.cache >>= 1;
        self.remaining -= 1;
        Ok(bit)
    }
}

/// Seeded pseudorandom bits, for reproducible tests and benchmarks
///
/// Two sources built from the same seed produce identical bit streams, which
/// makes every downstream sketch decision a pure function of `(seed, stream)`.
///
/// # Examples
///
/// ```
/// use streaming_quantiles::random::{BitSource, DeterministicBits};
///
/// let mut a = DeterministicBits::new(42);
/// let mut b = DeterministicBits::new(42);
/// for _ in 0..1000 {
///     assert_eq!(a.next_bit().unwrap(), b.next_bit().unwrap());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DeterministicBits {
    rng: SmallRng,
    cache: u64,
    remaining: u32,
}

impl DeterministicBits {
    /// Creates a seeded source
    pub fn new(seed: u64) -> Self {
        DeterministicBits {
            rng: SmallRng::seed_from_u64(seed),
            cache: 0,
            remaining: 0,
        }
    }
}

impl BitSource for DeterministicBits {
    fn next_bit(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            self.cache = self.rng.next_u64();
            self.remaining = 64;
        }
        let bit = self.cache & 1 == 1;
        self.cache >>= 1;
        self.remaining -= 1;
        Ok(bit)
    }
}

/// A source that answers `bit` a fixed number of times, then fails
///
/// Exists for crash-safety tests: code under test must propagate
/// [`SketchError::EntropyExhausted`] instead of panicking or looping forever
/// once the budget runs out.
#[derive(Debug, Clone)]
pub struct FixedBits {
    bit: bool,
    calls_left: u32,
}

impl FixedBits {
    /// Number of calls answered before the source reports exhaustion
    pub const BUDGET: u32 = 100;

    /// Creates a source that always answers `bit`
    pub fn new(bit: bool) -> Self {
        FixedBits {
            bit,
            calls_left: Self::BUDGET,
        }
    }
}

impl BitSource for FixedBits {
    fn next_bit(&mut self) -> Result<bool> {
        if self.calls_left == 0 {
            return Err(SketchError::EntropyExhausted);
        }
        self.calls_left -= 1;
        Ok(self.bit)
    }
}
