//! Probe strategies deciding which slot to examine after a collision.
//!
//! A strategy only maps `(key, home, attempt, size)` to a slot index; the
//! table owns the termination rule, so even a strategy that cycles before
//! visiting every slot can never make a lookup loop forever.

use crate::primes::prime_at_least;

/// Collision resolution policy for [`OpenTable`](crate::OpenTable).
pub trait ProbeStrategy {
    /// Slot to examine on the given `attempt` (starting at 1) for `key`,
    /// whose home slot is `home`. Must return a value in `0..size` and be
    /// deterministic for the same inputs.
    fn probe(&self, key: u64, home: usize, attempt: usize, size: usize) -> usize;

    /// Whether the strategy only covers every slot when the capacity is prime.
    fn requires_prime_capacity(&self) -> bool {
        false
    }
}

/// Fixed stride of one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linear;

impl ProbeStrategy for Linear {
    #[inline]
    fn probe(&self, _key: u64, home: usize, attempt: usize, size: usize) -> usize {
        (home + attempt % size) % size
    }
}

/// Stride derived from a secondary hash of the key.
///
/// With `r = key mod size` and `p` the smallest prime `>= r`, the stride is
/// `p - (key mod p)`. On a prime sized table that stride is coprime with the
/// size, so the sequence covers every slot before returning home.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleHash;

impl DoubleHash {
    /// The secondary hash `h2(key)`, always in `1..=p`.
    pub fn secondary_hash(key: u64, size: usize) -> u64 {
        let p = prime_at_least(key % size as u64);
        p - key % p
    }

    fn stride(key: u64, size: usize) -> u64 {
        // a stride that is a multiple of the size would never leave home
        match Self::secondary_hash(key, size) % size as u64 {
            0 => 1,
            step => step,
        }
    }
}

impl ProbeStrategy for DoubleHash {
    #[inline]
    fn probe(&self, key: u64, home: usize, attempt: usize, size: usize) -> usize {
        let size_u = size as u128;
        let step = Self::stride(key, size) as u128;
        let offset = (attempt as u128 % size_u) * step % size_u;
        ((home as u128 + offset) % size_u) as usize
    }

    fn requires_prime_capacity(&self) -> bool {
        true
    }
}

/// Strategy chosen at construction time, usually from a
/// [`TableConfig`](crate::TableConfig).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Linear,
    DoubleHash,
}

impl ProbeStrategy for Strategy {
    #[inline]
    fn probe(&self, key: u64, home: usize, attempt: usize, size: usize) -> usize {
        match self {
            Strategy::Linear => Linear.probe(key, home, attempt, size),
            Strategy::DoubleHash => DoubleHash.probe(key, home, attempt, size),
        }
    }

    fn requires_prime_capacity(&self) -> bool {
        match self {
            Strategy::Linear => Linear.requires_prime_capacity(),
            Strategy::DoubleHash => DoubleHash.requires_prime_capacity(),
        }
    }
}
