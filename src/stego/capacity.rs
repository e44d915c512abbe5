// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Capacity estimation.
//!
//! Computes how much payload a cover of a given geometry can carry under
//! each scheme. Capacities are exact (not estimates): every counted slot is
//! actually written by the corresponding scheme, and header overhead is
//! already subtracted.
//!
//! Encoders call [`check_fits`] before touching any frame, so a payload
//! that is too large is rejected up front, never discovered mid-embed.

use crate::stego::Scheme;
use crate::stego::bitstream::HEADER_BITS;
use crate::stego::error::StegoError;
use crate::stego::options::VivOptions;
use crate::stego::viv;
use crate::video::VideoInfo;
use crate::video::block::BlockGrid;
use crate::video::error::FrameError;
use crate::video::dct::BLOCK;

/// Channel count assumed by [`capacity`] (8-bit RGB/BGR video).
pub const DEFAULT_CHANNELS: usize = 3;

/// Maximum embeddable payload for one scheme and cover geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub scheme: Scheme,
    /// Payload bits available after header overhead.
    pub max_bits: u64,
    /// `max_bits / 8`.
    pub max_bytes: u64,
}

impl CapacityReport {
    fn new(scheme: Scheme, max_bits: u64) -> Self {
        Self { scheme, max_bits, max_bytes: max_bits / 8 }
    }
}

/// Capacity of a `width × height × 3` cover of `frame_count` frames with
/// default VIV options.
pub fn capacity(scheme: Scheme, width: usize, height: usize, frame_count: usize) -> CapacityReport {
    let info = VideoInfo { width, height, channels: DEFAULT_CHANNELS, frame_count };
    capacity_with(scheme, &info, &VivOptions::default())
}

/// Capacity for an explicit cover geometry and VIV configuration.
///
/// A VIV report is zero when `info.channels` is 0 or `viv` fails
/// [`VivOptions::validate`]; such a cover cannot carry anything.
pub fn capacity_with(scheme: Scheme, info: &VideoInfo, viv: &VivOptions) -> CapacityReport {
    let max_bits = match scheme {
        Scheme::Lsb => lsb_slots(info).saturating_sub(HEADER_BITS as u64),
        Scheme::Dct => dct_slots(info).saturating_sub(HEADER_BITS as u64),
        Scheme::Viv if info.channels == 0 || viv.validate().is_err() => 0,
        Scheme::Viv => {
            let carriers = viv_carrier_blocks(info, viv.block_size);
            let per_block = viv::carrier_bits(viv.block_size, info.channels, viv.lsb_depth);
            carriers.saturating_mul(per_block)
        }
    };
    CapacityReport::new(scheme, max_bits)
}

/// One slot per sample: `width * height * channels * frames`.
pub fn lsb_slots(info: &VideoInfo) -> u64 {
    info.samples_per_frame() as u64 * info.frame_count as u64
}

/// One slot per whole 8×8 luma block.
pub fn dct_slots(info: &VideoInfo) -> u64 {
    BlockGrid::within(info.width, info.height, BLOCK).total_blocks() as u64 * info.frame_count as u64
}

/// Whole cover blocks across the sequence, including header blocks.
/// Zero for a zero `block_size`.
pub fn viv_cover_blocks(info: &VideoInfo, block_size: usize) -> u64 {
    if block_size == 0 {
        return 0;
    }
    BlockGrid::within(info.width, info.height, block_size).total_blocks() as u64 * info.frame_count as u64
}

/// Cover blocks left for secret data once the header blocks are reserved.
pub fn viv_carrier_blocks(info: &VideoInfo, block_size: usize) -> u64 {
    viv_cover_blocks(info, block_size)
        .saturating_sub(viv::header_blocks(block_size, info.channels) as u64)
}

/// Reject a payload of `needed_bits` that exceeds `report.max_bits`.
pub fn check_fits(report: &CapacityReport, needed_bits: u64) -> Result<(), StegoError> {
    if needed_bits > report.max_bits {
        return Err(StegoError::InsufficientCapacity {
            needed: needed_bits,
            available: report.max_bits,
        });
    }
    Ok(())
}

/// Check that `secret` fits into `cover` under `options`.
///
/// Returns `(needed_blocks, available_blocks)` on success.
///
/// # Errors
/// - [`StegoError::InvalidOptions`] for out-of-range [`VivOptions`].
/// - [`StegoError::InvalidFrames`] for a cover without channels.
/// - [`StegoError::PayloadTooLarge`] if the block count overflows `u64`.
/// - [`StegoError::InsufficientCoverCapacity`] if the secret does not fit.
pub fn viv_secret_fits(
    cover: &VideoInfo,
    secret: &VideoInfo,
    options: &VivOptions,
) -> Result<(u64, u64), StegoError> {
    options.validate()?;
    if cover.channels == 0 {
        return Err(FrameError::UnsupportedChannels(0).into());
    }
    let needed =
        viv::blocks_needed(secret, cover.channels, options).ok_or(StegoError::PayloadTooLarge)?;
    let available = viv_cover_blocks(cover, options.block_size);
    if needed > available {
        return Err(StegoError::InsufficientCoverCapacity {
            needed_blocks: needed,
            available_blocks: available,
        });
    }
    Ok((needed, available))
}
