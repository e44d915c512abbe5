// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Password keystream: XOR mask and position permutation.
//!
//! The password is stretched once with Argon2id (fixed salt, fixed
//! parameters) into 64 bytes of seed material:
//!
//! - bytes `0..32` key a ChaCha20 stream used as an XOR mask over payload
//!   bits. Bit `k` of the mask is bit `k % 32` of stream word `k / 32`, so
//!   any slice can be produced independently (`set_word_pos`) and a short
//!   keystream is always a prefix of a longer one.
//! - bytes `32..64` seed the Fisher-Yates permutation in [`super::permute`].
//!
//! This is obfuscation, not encryption: there is no authentication, and a
//! wrong password yields garbled output of the right length rather than an
//! error. No password (or an empty one) is the identity transform.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

use super::error::StegoError;
use super::permute;

/// Fixed Argon2 salt. The decoder must reproduce the seeds from the
/// password alone, so the salt cannot be random.
const KEY_SALT: &[u8; 16] = b"vidsteg-keys-v1\0";

/// Argon2id memory cost in KiB.
const ARGON2_M_COST: u32 = 4096;
/// Argon2id iterations.
const ARGON2_T_COST: u32 = 2;
/// Argon2id lanes.
const ARGON2_P_COST: u32 = 1;

/// Seed material derived from a password.
#[derive(Clone)]
pub struct KeySchedule {
    seeds: Option<Zeroizing<[u8; 64]>>,
}

impl std::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySchedule")
            .field("identity", &self.is_identity())
            .finish()
    }
}

impl KeySchedule {
    /// The no-password schedule: zero mask, identity permutation.
    pub fn identity() -> Self {
        Self { seeds: None }
    }

    /// Stretch `password` into seed material. `None` and `Some("")` give
    /// [`KeySchedule::identity`].
    ///
    /// # Errors
    /// [`StegoError::KeyDerivation`] if Argon2 rejects its inputs.
    pub fn from_password(password: Option<&str>) -> Result<Self, StegoError> {
        let Some(password) = password.filter(|p| !p.is_empty()) else {
            return Ok(Self::identity());
        };
        let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(64))
            .map_err(|_| StegoError::KeyDerivation)?;
        let mut output = Zeroizing::new([0u8; 64]);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password_into(password.as_bytes(), KEY_SALT, &mut *output)
            .map_err(|_| StegoError::KeyDerivation)?;
        Ok(Self { seeds: Some(output) })
    }

    pub fn is_identity(&self) -> bool {
        self.seeds.is_none()
    }

    fn mask_seed(&self) -> Option<[u8; 32]> {
        self.seeds.as_ref().map(|s| {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&s[..32]);
            seed
        })
    }

    fn perm_seed(&self) -> Option<[u8; 32]> {
        self.seeds.as_ref().map(|s| {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&s[32..]);
            seed
        })
    }

    /// `len` mask bits starting at absolute stream bit `offset`.
    pub fn keystream(&self, offset: u64, len: usize) -> Keystream {
        match self.mask_seed() {
            None => Keystream::identity(len),
            Some(seed) => Keystream { bits: mask_bits(&seed, offset, len) },
        }
    }

    /// XOR `bits` in place with the mask starting at stream bit `offset`.
    pub fn apply_mask(&self, offset: u64, bits: &mut [u8]) {
        if let Some(seed) = self.mask_seed() {
            xor_mask(&seed, offset, bits);
        }
    }

    /// Permutation of `0..len`; the identity when there is no password.
    pub fn permutation(&self, len: usize) -> Vec<usize> {
        match self.perm_seed() {
            None => (0..len).collect(),
            Some(seed) => permute::permutation(len, &seed),
        }
    }
}

/// A materialised run of mask bits (one bit per `u8`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystream {
    bits: Vec<u8>,
}

impl Keystream {
    /// All-zero keystream of `len` bits.
    pub fn identity(len: usize) -> Self {
        Self { bits: vec![0; len] }
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `true` if applying this keystream changes nothing.
    pub fn is_identity(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// XOR `bits` in place. Applying twice restores the input. Only the
    /// overlapping prefix is touched.
    pub fn apply(&self, bits: &mut [u8]) {
        for (b, &k) in bits.iter_mut().zip(&self.bits) {
            *b ^= k;
        }
    }
}

/// Derive `length` mask bits from `password`.
///
/// Same password and length always give the same keystream; `derive("", n)`
/// is all-false.
pub fn derive(password: &str, length: usize) -> Result<Keystream, StegoError> {
    Ok(KeySchedule::from_password(Some(password))?.keystream(0, length))
}

fn mask_bits(seed: &[u8; 32], offset: u64, len: usize) -> Vec<u8> {
    let mut bits = vec![0u8; len];
    xor_mask(seed, offset, &mut bits);
    bits
}

fn xor_mask(seed: &[u8; 32], offset: u64, bits: &mut [u8]) {
    if bits.is_empty() {
        return;
    }
    let mut rng = ChaCha20Rng::from_seed(*seed);
    rng.set_word_pos((offset / 32) as u128);
    let mut shift = (offset % 32) as u32;
    let mut word = rng.next_u32();
    for b in bits.iter_mut() {
        if shift == 32 {
            word = rng.next_u32();
            shift = 0;
        }
        *b ^= ((word >> shift) & 1) as u8;
        shift += 1;
    }
}
