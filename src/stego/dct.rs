// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! DCT scheme: one bit per 8×8 luma block.
//!
//! Each whole 8×8 block of the luma plane carries one bit in the relative
//! order of two mid-frequency coefficients:
//!
//! - bit 1 ⇔ `coeff[COEFF_A] > coeff[COEFF_B]`
//! - bit 0 ⇔ `coeff[COEFF_A] < coeff[COEFF_B]`
//!
//! Blocks are consumed in block-raster order within a frame, frames
//! sequentially. Partial edge blocks are never used.
//!
//! To embed, the pair is moved symmetrically around its mean until the gap
//! is at least the configured margin, the block is inverse transformed and
//! the luma change is added equally to every colour channel (so chroma is
//! preserved), then rounded and clipped to 8 bits. Rounding and clipping
//! can eat into the gap, so the written block is re-measured and the
//! adjustment repeated with a wider target until the bit reads back
//! correctly.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use tracing::{trace, warn};

use crate::stego::cancel::CancelFlag;
use crate::stego::cursor::{self, Span};
use crate::stego::error::StegoError;
use crate::stego::options::DctOptions;
use crate::video::Frame;
use crate::video::block::BlockGrid;
use crate::video::dct::{self, BLOCK, BLOCK_AREA};

/// First carrier coefficient (vertical frequency, horizontal frequency).
pub const COEFF_A: (usize, usize) = (4, 1);
/// Second carrier coefficient.
pub const COEFF_B: (usize, usize) = (3, 2);

/// Smallest gap accepted once a block has been written back.
pub const DCT_MIN_GAP: f64 = 1.0;

const IDX_A: usize = COEFF_A.0 * BLOCK + COEFF_A.1;
const IDX_B: usize = COEFF_B.0 * BLOCK + COEFF_B.1;

/// Block grid used for a frame of this size.
pub fn grid_for(frame: &Frame) -> BlockGrid {
    BlockGrid::within(frame.width(), frame.height(), BLOCK)
}

/// Frame, block row and block column of slot `index`.
pub fn locate(index: u64, grid: &BlockGrid) -> (usize, usize, usize) {
    let (frame, block) = cursor::locate(index, grid.total_blocks());
    let (row, col) = grid.position(block);
    (frame, row, col)
}

/// `coeff[A] - coeff[B]` of block `block` as currently stored.
pub fn coefficient_gap(frame: &Frame, grid: &BlockGrid, block: usize) -> f64 {
    let (x0, y0) = grid.origin(block);
    let coeffs = dct::forward(&dct::read_luma_block(frame, x0, y0));
    coeffs[IDX_A] - coeffs[IDX_B]
}

/// The bit carried by block `block`.
pub fn read_bit(frame: &Frame, grid: &BlockGrid, block: usize) -> u8 {
    (coefficient_gap(frame, grid, block) > 0.0) as u8
}

/// Embed `bits` into consecutive blocks starting at global block `start`.
///
/// # Errors
/// - [`StegoError::InsufficientCapacity`] if the blocks run past the last frame.
/// - [`StegoError::BlockSaturated`] if a block cannot be forced to the bit.
/// - [`StegoError::Cancelled`] if `cancel` fires between frames.
pub fn embed_bits(
    frames: &mut [Frame],
    start: u64,
    bits: &[u8],
    options: &DctOptions,
    cancel: &CancelFlag,
) -> Result<(), StegoError> {
    let grid = frames.first().map(grid_for).unwrap_or(BlockGrid::within(0, 0, BLOCK));
    let per_frame = grid.total_blocks();
    let spans = cursor::spans(start, bits.len(), per_frame, frames.len()).ok_or(
        StegoError::InsufficientCapacity {
            needed: start + bits.len() as u64,
            available: cursor::frame_start(frames.len(), per_frame),
        },
    )?;
    let Some(first) = spans.first().map(|s| s.frame) else {
        return Ok(());
    };
    let targets = &mut frames[first..first + spans.len()];

    let write = |(frame, span): (&mut Frame, &Span)| -> Result<(), StegoError> {
        cancel.check()?;
        embed_span(frame, &grid, span, bits, options)
    };

    #[cfg(feature = "parallel")]
    let result = targets.par_iter_mut().zip(spans.par_iter()).try_for_each(write);
    #[cfg(not(feature = "parallel"))]
    let result = targets.iter_mut().zip(spans.iter()).try_for_each(write);

    result
}

/// Read `count` bits from consecutive blocks starting at global block `start`.
///
/// # Errors
/// - [`StegoError::TruncatedStream`] if the blocks run past the last frame.
/// - [`StegoError::Cancelled`] if `cancel` fires between frames.
pub fn extract_bits(
    frames: &[Frame],
    start: u64,
    count: usize,
    cancel: &CancelFlag,
) -> Result<Vec<u8>, StegoError> {
    let grid = frames.first().map(grid_for).unwrap_or(BlockGrid::within(0, 0, BLOCK));
    let per_frame = grid.total_blocks();
    let spans = cursor::spans(start, count, per_frame, frames.len()).ok_or(
        StegoError::TruncatedStream {
            needed: start + count as u64,
            available: cursor::frame_start(frames.len(), per_frame),
        },
    )?;

    let read = |span: &Span| -> Result<Vec<u8>, StegoError> {
        cancel.check()?;
        let frame = &frames[span.frame];
        Ok((span.offset..span.offset + span.items.len())
            .map(|block| read_bit(frame, &grid, block))
            .collect())
    };

    #[cfg(feature = "parallel")]
    let chunks: Vec<Vec<u8>> = spans.par_iter().map(read).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let chunks: Vec<Vec<u8>> = spans.iter().map(read).collect::<Result<_, _>>()?;

    Ok(chunks.concat())
}

fn embed_span(
    frame: &mut Frame,
    grid: &BlockGrid,
    span: &Span,
    bits: &[u8],
    options: &DctOptions,
) -> Result<(), StegoError> {
    for (k, &bit) in bits[span.items.clone()].iter().enumerate() {
        let block = span.offset + k;
        let passes = embed_block(frame, grid, block, bit & 1, options)
            .ok_or(StegoError::BlockSaturated { frame: span.frame, block })?;
        if passes > 2 {
            warn!(frame = span.frame, block, passes, "DCT block needed extra passes");
        }
    }
    trace!(frame = span.frame, blocks = span.items.len(), "DCT frame embedded");
    Ok(())
}

/// Force block `block` to carry `bit`. Returns the number of write passes
/// used (0 if the block already carried the bit with full margin), or
/// `None` if the bit would not stick.
fn embed_block(
    frame: &mut Frame,
    grid: &BlockGrid,
    block: usize,
    bit: u8,
    options: &DctOptions,
) -> Option<usize> {
    let (x0, y0) = grid.origin(block);
    let sign = if bit == 1 { 1.0 } else { -1.0 };

    for pass in 0..=options.max_passes {
        let luma = dct::read_luma_block(frame, x0, y0);
        let mut coeffs = dct::forward(&luma);
        let gap = sign * (coeffs[IDX_A] - coeffs[IDX_B]);
        let required = if pass == 0 { options.margin } else { DCT_MIN_GAP };
        if gap >= required {
            return Some(pass);
        }
        if pass == options.max_passes {
            break;
        }

        // Widen the target each pass to make up for what clipping removed.
        let target = options.margin * (pass + 1) as f64;
        let mean = 0.5 * (coeffs[IDX_A] + coeffs[IDX_B]);
        coeffs[IDX_A] = mean + sign * 0.5 * target;
        coeffs[IDX_B] = mean - sign * 0.5 * target;

        let modified = dct::inverse(&coeffs);
        apply_luma_delta(frame, x0, y0, &luma, &modified);
    }
    None
}

/// Add `after - before` to the luma-bearing channels of every pixel.
fn apply_luma_delta(
    frame: &mut Frame,
    x0: usize,
    y0: usize,
    before: &[f64; BLOCK_AREA],
    after: &[f64; BLOCK_AREA],
) {
    let luma_channels = if frame.channels() >= 3 { 3 } else { 1 };
    for dy in 0..BLOCK {
        for dx in 0..BLOCK {
            let i = dy * BLOCK + dx;
            let delta = after[i] - before[i];
            let px = frame.pixel_mut(x0 + dx, y0 + dy);
            for sample in px.iter_mut().take(luma_channels) {
                *sample = (*sample as f64 + delta).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
