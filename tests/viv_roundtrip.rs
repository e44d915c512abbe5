// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Round-trip integration tests for video-in-video embedding.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use vidsteg_core::stego::bitstream::bytes_to_bits;
use vidsteg_core::stego::viv::{HEADER_BITS, VivHeader, read_header};
use vidsteg_core::{
    Frame, Payload, PayloadKind, Scheme, StegoError, StegoOptions, VivOptions, capacity, decode,
    encode,
};

fn random_video(seed: u64, frames: usize, width: usize, height: usize, channels: usize) -> Vec<Frame> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..frames)
        .map(|_| {
            let mut data = vec![0u8; width * height * channels];
            rng.fill(&mut data[..]);
            Frame::new(width, height, channels, data).unwrap()
        })
        .collect()
}

/// One 16×16 grayscale frame whose first `HEADER_BITS` samples carry
/// `header` in their low bit, as a 1×1-block encoder would write it.
fn cover_with_header(header: VivHeader) -> Vec<Frame> {
    let mut frame = Frame::filled(16, 16, 1, 0x80).unwrap();
    let bits = bytes_to_bits(&header.to_bytes());
    assert_eq!(bits.len(), HEADER_BITS);
    for (i, &bit) in bits.iter().enumerate() {
        frame.set_sample(i % 16, i / 16, 0, 0x80 | bit);
    }
    vec![frame]
}

fn forged_header(frame_count: u32, width: u16, height: u16, channels: u8) -> VivHeader {
    VivHeader { frame_count, width, height, channels, secret_depth: 8, lsb_depth: 1, block_size: 1 }
}

fn decoded_frames(result: vidsteg_core::ExtractResult) -> Vec<Frame> {
    match result.payload {
        Payload::Video(frames) => frames,
        other => panic!("expected a video payload, got {other:?}"),
    }
}

#[test]
fn viv_lossless_scenario() {
    let cover = random_video(1, 50, 64, 64, 3);
    let secret = random_video(2, 2, 16, 16, 3);

    let out = encode(cover.clone(), Payload::Video(secret.clone()), Scheme::Viv, &StegoOptions::new())
        .unwrap();
    assert_eq!(out.scheme, Scheme::Viv);
    // 120 header bits + 8 secret blocks of 8×8×3×8 bits.
    assert_eq!(out.bits_embedded, 120 + 8 * 1536);

    let header = read_header(&out.frames).unwrap();
    assert_eq!(header.frame_count, 2);
    assert_eq!((header.width, header.height, header.channels), (16, 16, 3));

    // Default lsb_depth = 2: only the two low planes change.
    for (a, b) in cover.iter().zip(&out.frames) {
        for (&x, &y) in a.samples().iter().zip(b.samples()) {
            assert_eq!(x & 0xFC, y & 0xFC);
        }
    }

    let back = decode(&out.frames, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video).unwrap();
    assert!(back.exact);
    assert_eq!(decoded_frames(back), secret);
}

#[test]
fn viv_password_scrambles_block_placement() {
    let cover = random_video(3, 12, 32, 32, 3);
    let secret = random_video(4, 3, 20, 12, 3);
    let options = StegoOptions::new().with_password("swordfish");

    let out = encode(cover, Payload::Video(secret.clone()), Scheme::Viv, &options).unwrap();
    let back = decode(&out.frames, Scheme::Viv, &options, PayloadKind::Video).unwrap();
    assert_eq!(decoded_frames(back), secret);

    // The header is unmasked, so a wrong password still yields the right shape.
    let wrong = StegoOptions::new().with_password("trout");
    let garbled = decoded_frames(decode(&out.frames, Scheme::Viv, &wrong, PayloadKind::Video).unwrap());
    assert_eq!(garbled.len(), secret.len());
    assert_eq!(garbled[0].width(), 20);
    assert_ne!(garbled, secret);
}

#[test]
fn viv_reduced_depth_is_approximate() {
    let cover = random_video(5, 8, 32, 32, 3);
    let secret = random_video(6, 2, 16, 16, 1);
    let viv = VivOptions { block_size: 4, lsb_depth: 1, secret_depth: 3 };
    let options = StegoOptions::new().with_viv(viv);

    let out = encode(cover, Payload::Video(secret.clone()), Scheme::Viv, &options).unwrap();
    // Decoder takes its parameters from the header, not its own options.
    let back = decode(&out.frames, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video).unwrap();
    assert!(!back.exact);

    let recovered = decoded_frames(back);
    for (a, b) in secret.iter().zip(&recovered) {
        for (&x, &y) in a.samples().iter().zip(b.samples()) {
            assert_eq!(x & 0xE0, y & 0xE0);
            assert!(x.abs_diff(y) <= 16, "{x} vs {y}");
        }
    }
}

#[test]
fn viv_capacity_matches_block_count() {
    let report = capacity(Scheme::Viv, 64, 64, 50);
    assert_eq!(report.max_bits, (64 * 50 - 1) * 384);
    assert_eq!(report.max_bytes, report.max_bits / 8);
}

#[test]
fn viv_cover_too_small() {
    let cover = random_video(7, 2, 32, 32, 3);
    let secret = random_video(8, 1, 32, 32, 3);
    match encode(cover, Payload::Video(secret), Scheme::Viv, &StegoOptions::new()) {
        Err(StegoError::InsufficientCoverCapacity { needed_blocks, available_blocks }) => {
            assert_eq!(needed_blocks, 1 + 16 * 4);
            assert_eq!(available_blocks, 32);
        }
        other => panic!("expected InsufficientCoverCapacity, got {other:?}"),
    }
}

#[test]
fn viv_truncated_cover_detected_before_allocation() {
    // 16×16 cover frames hold 4 blocks each; the secret needs 1 + 8 × 4 = 33.
    let cover = random_video(9, 9, 16, 16, 3);
    let secret = random_video(10, 2, 16, 16, 3);
    let out = encode(cover, Payload::Video(secret), Scheme::Viv, &StegoOptions::new()).unwrap();

    assert!(matches!(
        decode(&out.frames[..5], Scheme::Viv, &StegoOptions::new(), PayloadKind::Video),
        Err(StegoError::InsufficientCoverCapacity { needed_blocks: 33, available_blocks: 20 })
    ));
}

#[test]
fn viv_unmarked_cover_has_invalid_header() {
    let cover = vec![Frame::filled(64, 64, 3, 0x80).unwrap(); 4];
    assert!(matches!(
        decode(&cover, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video),
        Err(StegoError::InvalidHeader(_))
    ));
}

#[test]
fn viv_rejects_bad_options() {
    let cover = random_video(11, 4, 32, 32, 3);
    let secret = random_video(12, 1, 8, 8, 3);
    let options = StegoOptions::new().with_viv(VivOptions { lsb_depth: 5, ..VivOptions::default() });
    assert!(matches!(
        encode(cover, Payload::Video(secret), Scheme::Viv, &options),
        Err(StegoError::InvalidOptions(_))
    ));
}

#[test]
fn viv_secret_larger_than_cover_frame() {
    // Secret frames may be bigger than the cover as long as enough blocks exist.
    let mut rng = ChaCha20Rng::seed_from_u64(13);
    let cover = random_video(14, 40, 32, 32, 4);
    let secret: Vec<Frame> = (0..1)
        .map(|_| {
            let data = (0..48 * 40 * 3).map(|_| rng.gen_range(0..=255u8)).collect();
            Frame::new(48, 40, 3, data).unwrap()
        })
        .collect();

    let out = encode(cover, Payload::Video(secret.clone()), Scheme::Viv, &StegoOptions::new()).unwrap();
    let back = decode(&out.frames, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video).unwrap();
    assert_eq!(decoded_frames(back), secret);
}

#[test]
fn viv_overflowing_header_geometry_is_invalid() {
    let headers = [forged_header(1 << 29, 32768, 32768, 4), forged_header(u32::MAX, u16::MAX, u16::MAX, 4)];
    for header in headers {
        let cover = cover_with_header(header);
        assert_eq!(read_header(&cover).unwrap(), header);
        assert!(matches!(
            decode(&cover, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video),
            Err(StegoError::InvalidHeader(_))
        ));
    }
}

#[test]
fn viv_oversized_header_geometry_is_rejected_before_allocation() {
    // 1000 frames of 64×64×3 at 1×1 blocks: 4_096_000 secret blocks, each
    // 24 bits over 1-bit carriers, behind 120 header blocks.
    let cover = cover_with_header(forged_header(1000, 64, 64, 3));
    assert!(matches!(
        decode(&cover, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video),
        Err(StegoError::InsufficientCoverCapacity { needed_blocks: 98_304_120, available_blocks: 256 })
    ));
}

#[test]
fn viv_nonsensical_header_fields_are_invalid() {
    let bad = [
        forged_header(1, 0, 4, 1),
        forged_header(1, 4, 4, 5),
        forged_header(0, 4, 4, 1),
        VivHeader { secret_depth: 9, ..forged_header(1, 4, 4, 1) },
        VivHeader { lsb_depth: 0, ..forged_header(1, 4, 4, 1) },
    ];
    for header in bad {
        let cover = cover_with_header(header);
        assert!(
            matches!(
                decode(&cover, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video),
                Err(StegoError::InvalidHeader(_))
            ),
            "{header:?}"
        );
    }
}

#[test]
fn viv_small_forged_header_decodes() {
    // A well-formed header over a clean cover yields a video of that shape.
    let cover = cover_with_header(forged_header(1, 2, 2, 1));
    let back = decode(&cover, Scheme::Viv, &StegoOptions::new(), PayloadKind::Video).unwrap();
    let frames = decoded_frames(back);
    assert_eq!(frames.len(), 1);
    assert_eq!((frames[0].width(), frames[0].height(), frames[0].channels()), (2, 2, 1));
}
