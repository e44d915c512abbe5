// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! LSB scheme: one bit per sample.
//!
//! Slot order is the storage order of [`Frame`] samples: pixels row-major,
//! the channels of each pixel in their stored order, frames sequentially.
//! Slot `k` is sample `k % samples_per_frame` of frame
//! `k / samples_per_frame`. Embedding replaces only bit 0, so every sample
//! changes by at most 1. Slots past the end of the bitstream are neither
//! written nor read.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::stego::cancel::CancelFlag;
use crate::stego::cursor::{self, Span};
use crate::stego::error::StegoError;
use crate::video::Frame;

/// Frame and sample offset of slot `index`.
pub fn locate(index: u64, samples_per_frame: usize) -> (usize, usize) {
    cursor::locate(index, samples_per_frame)
}

/// Write `bits` into the LSBs of consecutive slots starting at `start`.
///
/// # Errors
/// - [`StegoError::InsufficientCapacity`] if the slots run past the last frame.
/// - [`StegoError::Cancelled`] if `cancel` fires between frames.
pub fn embed_bits(
    frames: &mut [Frame],
    start: u64,
    bits: &[u8],
    cancel: &CancelFlag,
) -> Result<(), StegoError> {
    let per_frame = frames.first().map_or(0, Frame::sample_count);
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
        write_span(frame, span, bits);
        Ok(())
    };

    #[cfg(feature = "parallel")]
    let result = targets.par_iter_mut().zip(spans.par_iter()).try_for_each(write);
    #[cfg(not(feature = "parallel"))]
    let result = targets.iter_mut().zip(spans.iter()).try_for_each(write);

    result
}

/// Read `count` LSBs from consecutive slots starting at `start`.
///
/// # Errors
/// - [`StegoError::TruncatedStream`] if the slots run past the last frame.
/// - [`StegoError::Cancelled`] if `cancel` fires between frames.
pub fn extract_bits(
    frames: &[Frame],
    start: u64,
    count: usize,
    cancel: &CancelFlag,
) -> Result<Vec<u8>, StegoError> {
    let per_frame = frames.first().map_or(0, Frame::sample_count);
    let spans = cursor::spans(start, count, per_frame, frames.len()).ok_or(
        StegoError::TruncatedStream {
            needed: start + count as u64,
            available: cursor::frame_start(frames.len(), per_frame),
        },
    )?;

    let read = |span: &Span| -> Result<Vec<u8>, StegoError> {
        cancel.check()?;
        Ok(read_span(&frames[span.frame], span))
    };

    #[cfg(feature = "parallel")]
    let chunks: Vec<Vec<u8>> = spans.par_iter().map(read).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let chunks: Vec<Vec<u8>> = spans.iter().map(read).collect::<Result<_, _>>()?;

    Ok(chunks.concat())
}

fn write_span(frame: &mut Frame, span: &Span, bits: &[u8]) {
    let samples = &mut frame.samples_mut()[span.offset..span.offset + span.items.len()];
    for (sample, &bit) in samples.iter_mut().zip(&bits[span.items.clone()]) {
        *sample = (*sample & !1) | (bit & 1);
    }
}

fn read_span(frame: &Frame, span: &Span) -> Vec<u8> {
    frame.samples()[span.offset..span.offset + span.items.len()]
        .iter()
        .map(|s| s & 1)
        .collect()
}
