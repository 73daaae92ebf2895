//! Fixed-size packed occupancy grid with atomic OR writes
//!
//! Conceptually a bit set over voxel indices `(x, y, z) in [0, N)^3`, linearized as
//! `idx = x*N^2 + y*N + z` and packed 32 bits per word. `set_atomic` is the only write
//! operation: the grid is idempotent (setting a bit twice is a no-op) and safe to write
//! concurrently from many threads without any further locking.

use std::sync::atomic::{AtomicU32, Ordering};

const BITS_PER_WORD: usize = 32;

/// Atomic, word-packed bit set over `[0, capacity)`.
pub struct BitGrid {
    words: Vec<AtomicU32>,
    /// Number of addressable bits (`N^3` for a grid of resolution `N`).
    capacity: usize,
}

impl BitGrid {
    /// Allocates a zeroed grid large enough to address `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        let word_count = (capacity + BITS_PER_WORD - 1) / BITS_PER_WORD;
        let mut words = Vec::with_capacity(word_count);
        words.resize_with(word_count, || AtomicU32::new(0));
        Self { words, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Atomically sets bit `idx`. Linearizable; safe to call concurrently for any `idx`,
    /// including the same `idx` from multiple threads at once.
    pub fn set_atomic(&self, idx: usize) {
        debug_assert!(idx < self.capacity);
        let word = idx / BITS_PER_WORD;
        let bit = idx % BITS_PER_WORD;
        self.words[word].fetch_or(1u32 << bit, Ordering::Relaxed);
    }

    /// Relaxed read of whether bit `idx` is set. May be stale with respect to concurrent
    /// writers but never tears a word.
    pub fn test(&self, idx: usize) -> bool {
        debug_assert!(idx < self.capacity);
        let word = idx / BITS_PER_WORD;
        let bit = idx % BITS_PER_WORD;
        (self.words[word].load(Ordering::Relaxed) >> bit) & 1 == 1
    }

    /// Relaxed read of word `w`.
    pub fn word_load(&self, w: usize) -> u32 {
        self.words[w].load(Ordering::Relaxed)
    }

    /// Clears every word to zero.
    pub fn zero(&self) {
        for w in &self.words {
            w.store(0, Ordering::Relaxed);
        }
    }

    /// In-place XOR of every word of `self` with the corresponding word of `other`, masked
    /// by `mask` (defaults to all-ones, i.e. a plain XOR). Used to complement `voxels_buffer`
    /// into `voxels` at the end of the solid fill: `voxels[w] = voxels_buffer[w] XOR 0xFFFFFFFF`
    /// is `self.xor_inplace(other, u32::MAX)` with `self` zeroed beforehand, or equivalently
    /// `other.complement_into(self)` — see [`BitGrid::complement_into`].
    pub fn xor_inplace(&self, other: &BitGrid, mask: u32) {
        debug_assert_eq!(self.words.len(), other.words.len());
        for (a, b) in self.words.iter().zip(other.words.iter()) {
            let value = b.load(Ordering::Relaxed) & mask;
            a.fetch_xor(value, Ordering::Relaxed);
        }
    }

    /// Overwrites every word of `self` with the bitwise complement of `other`'s corresponding
    /// word. Used for the final solid-fill step: `voxels = NOT voxels_buffer`.
    pub fn complement_into(&self, other: &BitGrid) {
        debug_assert_eq!(self.words.len(), other.words.len());
        for (a, b) in self.words.iter().zip(other.words.iter()) {
            let value = !b.load(Ordering::Relaxed);
            a.store(value, Ordering::Relaxed);
        }
    }
}

/// Linearizes a `(x, y, z)` voxel coordinate in `[0, n)^3` to a flat bit index.
#[inline]
pub fn linear_index(x: usize, y: usize, z: usize, n: usize) -> usize {
    x * n * n + y * n + z
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn set_and_test_roundtrip() {
        let grid = BitGrid::new(100);
        assert!(!grid.test(42));
        grid.set_atomic(42);
        assert!(grid.test(42));
        // Neighboring bits untouched.
        assert!(!grid.test(41));
        assert!(!grid.test(43));
    }

    #[test]
    fn set_atomic_is_idempotent() {
        let grid = BitGrid::new(64);
        grid.set_atomic(5);
        grid.set_atomic(5);
        assert!(grid.test(5));
    }

    #[test]
    fn zero_clears_all_bits() {
        let grid = BitGrid::new(64);
        grid.set_atomic(0);
        grid.set_atomic(63);
        grid.zero();
        assert!(!grid.test(0));
        assert!(!grid.test(63));
    }

    #[test]
    fn complement_into_inverts_every_bit() {
        let exterior = BitGrid::new(64);
        exterior.set_atomic(3);
        exterior.set_atomic(40);
        let solid = BitGrid::new(64);
        solid.complement_into(&exterior);
        for i in 0..64 {
            assert_eq!(solid.test(i), i != 3 && i != 40);
        }
    }

    #[test]
    fn concurrent_set_atomic_is_safe() {
        let grid = Arc::new(BitGrid::new(10_000));
        let mut handles = Vec::new();
        for t in 0..8 {
            let grid = Arc::clone(&grid);
            handles.push(thread::spawn(move || {
                for i in (t..10_000).step_by(8) {
                    grid.set_atomic(i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        for i in 0..10_000 {
            assert!(grid.test(i));
        }
    }

    #[test]
    fn linear_index_matches_row_major_order() {
        let n = 4;
        assert_eq!(linear_index(0, 0, 0, n), 0);
        assert_eq!(linear_index(0, 0, 1, n), 1);
        assert_eq!(linear_index(0, 1, 0, n), 4);
        assert_eq!(linear_index(1, 0, 0, n), 16);
    }
}
