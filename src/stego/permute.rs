// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Password-keyed position permutation.
//!
//! A Fisher-Yates shuffle driven by a ChaCha20 PRNG. Encoder and decoder
//! derive the same seed from the password and therefore the same order.
//!
//! # Cross-platform portability
//!
//! The shuffle draws from `u32` ranges (not `usize`) so the PRNG consumes
//! the same entropy per step on 32-bit and 64-bit targets. Lengths are
//! therefore limited to `u32::MAX + 1`, which the 32-bit bitstream header
//! already guarantees.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Apply Fisher-Yates shuffle using `u32` for portable cross-platform behavior.
pub fn shuffle_portable<T>(items: &mut [T], seed: &[u8; 32]) {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    let n = items.len();
    debug_assert!(n as u64 <= u32::MAX as u64 + 1);
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        items.swap(i, j);
    }
}

/// A pseudo-random permutation of `0..len`.
pub fn permutation(len: usize, seed: &[u8; 32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    shuffle_portable(&mut order, seed);
    order
}

/// Scatter: `out[perm[i]] = items[i]`.
pub fn scatter<T: Copy + Default>(items: &[T], perm: &[usize]) -> Vec<T> {
    debug_assert_eq!(items.len(), perm.len());
    let mut out = vec![T::default(); items.len()];
    for (item, &p) in items.iter().zip(perm) {
        out[p] = *item;
    }
    out
}

/// Gather, the inverse of [`scatter`]: `out[i] = items[perm[i]]`.
pub fn gather<T: Copy>(items: &[T], perm: &[usize]) -> Vec<T> {
    debug_assert_eq!(items.len(), perm.len());
    perm.iter().map(|&p| items[p]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = permutation(500, &[42u8; 32]);
        let b = permutation(500, &[42u8; 32]);
        assert_eq!(a, b);
    }

    #[test]
    fn is_a_bijection() {
        let mut perm = permutation(1000, &[7u8; 32]);
        perm.sort_unstable();
        assert_eq!(perm, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(permutation(64, &[1u8; 32]), permutation(64, &[2u8; 32]));
    }

    #[test]
    fn scatter_then_gather_restores() {
        let items: Vec<u8> = (0..200).map(|i| (i % 2) as u8).collect();
        let perm = permutation(items.len(), &[9u8; 32]);
        let scattered = scatter(&items, &perm);
        assert_eq!(gather(&scattered, &perm), items);
    }

    #[test]
    fn degenerate_lengths() {
        assert!(permutation(0, &[0u8; 32]).is_empty());
        assert_eq!(permutation(1, &[0u8; 32]), vec![0]);
    }
}
