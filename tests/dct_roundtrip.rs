// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Round-trip integration tests for the DCT scheme.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use vidsteg_core::stego::dct::{coefficient_gap, grid_for};
use vidsteg_core::{
    Frame, Payload, PayloadKind, Scheme, StegoError, StegoOptions, capacity, decode, encode,
};

/// Smooth gradient with mild noise.
fn natural_cover(seed: u64, frames: usize, width: usize, height: usize, channels: usize) -> Vec<Frame> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..frames)
        .map(|f| {
            let mut data = Vec::with_capacity(width * height * channels);
            for y in 0..height {
                for x in 0..width {
                    for c in 0..channels {
                        let base = 30 + x + y + f * 3 + c * 10;
                        data.push((base + rng.gen_range(0..16)) as u8);
                    }
                }
            }
            Frame::new(width, height, channels, data).unwrap()
        })
        .collect()
}

#[test]
fn dct_single_zero_bit_scenario() {
    let cover = natural_cover(1, 10, 64, 64, 3);
    let out = encode(cover.clone(), Payload::Bits(vec![0]), Scheme::Dct, &StegoOptions::new()).unwrap();
    assert_eq!(out.bits_embedded, 33);

    let grid = grid_for(&out.frames[0]);
    // Header: 31 zero bits then a one (length 1); the payload bit sits in block 32.
    assert!(coefficient_gap(&out.frames[0], &grid, 31) > 0.0);
    assert!(coefficient_gap(&out.frames[0], &grid, 32) < 0.0);

    // Blocks past the stream are untouched.
    for block in 33..grid.total_blocks() {
        let (x0, y0) = grid.origin(block);
        for dy in 0..8 {
            for dx in 0..8 {
                assert_eq!(cover[0].pixel(x0 + dx, y0 + dy), out.frames[0].pixel(x0 + dx, y0 + dy));
            }
        }
    }
    assert_eq!(cover[1..], out.frames[1..]);

    let back = decode(&out.frames, Scheme::Dct, &StegoOptions::new(), PayloadKind::Bits).unwrap();
    assert_eq!(back.payload, Payload::Bits(vec![0]));
}

#[test]
fn dct_text_roundtrip_with_password() {
    let cover = natural_cover(2, 4, 64, 64, 3);
    let message = b"meet at dawn, pier 9".to_vec();
    let options = StegoOptions::new().with_password("harbour");

    let out = encode(cover.clone(), Payload::Bytes(message.clone()), Scheme::Dct, &options).unwrap();
    let back = decode(&out.frames, Scheme::Dct, &options, PayloadKind::Bytes).unwrap();
    assert_eq!(back.payload, Payload::Bytes(message));

    // Distortion stays small on natural-looking content.
    let (mut total, mut count) = (0u64, 0u64);
    for (a, b) in cover.iter().zip(&out.frames) {
        for (&x, &y) in a.samples().iter().zip(b.samples()) {
            total += x.abs_diff(y) as u64;
            count += 1;
        }
    }
    assert!((total as f64 / count as f64) < 4.0);
}

#[test]
fn dct_grayscale_and_partial_blocks() {
    // 70×45 → 8×5 whole blocks; the right and bottom strips are never used.
    let cover = natural_cover(3, 2, 70, 45, 1);
    let bits: Vec<u8> = (0..40).map(|i| ((i * 11) % 7 > 3) as u8).collect();
    let out = encode(cover.clone(), Payload::Bits(bits.clone()), Scheme::Dct, &StegoOptions::new()).unwrap();

    for (a, b) in cover.iter().zip(&out.frames) {
        for y in 0..45 {
            for x in 0..70 {
                if x >= 64 || y >= 40 {
                    assert_eq!(a.pixel(x, y), b.pixel(x, y));
                }
            }
        }
    }
    let back = decode(&out.frames, Scheme::Dct, &StegoOptions::new(), PayloadKind::Bits).unwrap();
    assert_eq!(back.payload, Payload::Bits(bits));
}

#[test]
fn dct_over_capacity_is_rejected() {
    let cover = natural_cover(4, 2, 64, 64, 3);
    let report = capacity(Scheme::Dct, 64, 64, 2);
    assert_eq!(report.max_bits, 64 * 2 - 32);

    let bits = vec![0u8; report.max_bits as usize + 1];
    assert!(matches!(
        encode(cover, Payload::Bits(bits), Scheme::Dct, &StegoOptions::new()),
        Err(StegoError::InsufficientCapacity { needed: 97, available: 96 })
    ));
}

#[test]
fn dct_cover_smaller_than_a_block_cannot_hold_a_header() {
    let cover = natural_cover(5, 3, 7, 7, 3);
    assert!(matches!(
        encode(cover.clone(), Payload::Bits(Vec::new()), Scheme::Dct, &StegoOptions::new()),
        Err(StegoError::InsufficientCapacity { .. })
    ));
    assert!(matches!(
        decode(&cover, Scheme::Dct, &StegoOptions::new(), PayloadKind::Bits),
        Err(StegoError::TruncatedStream { .. })
    ));
}
