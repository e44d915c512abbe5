// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Slot addressing across a frame sequence.
//!
//! Every scheme consumes cover capacity in a fixed order: slots of frame 0
//! first, then frame 1, and so on. A slot is a sample (LSB) or a block
//! (DCT, VIV). The mapping from a global slot index to `(frame, offset)` is
//! a pure function, so workers can find their targets without sharing a
//! mutable cursor.

use std::ops::Range;

/// Frame and in-frame offset of global slot `index`.
pub fn locate(index: u64, slots_per_frame: usize) -> (usize, usize) {
    debug_assert!(slots_per_frame > 0);
    let per = slots_per_frame as u64;
    ((index / per) as usize, (index % per) as usize)
}

/// Global index of the first slot of `frame`.
pub fn frame_start(frame: usize, slots_per_frame: usize) -> u64 {
    frame as u64 * slots_per_frame as u64
}

/// A contiguous run of slots inside one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub frame: usize,
    /// First slot within the frame.
    pub offset: usize,
    /// Positions in the caller's bit (or item) buffer covered by this span.
    pub items: Range<usize>,
}

/// Split `count` consecutive slots starting at global slot `start` into
/// per-frame spans, in frame order. Frames appear at most once and are
/// consecutive.
///
/// Returns `None` if the range runs past the last of `frame_count` frames
/// (including when `slots_per_frame` is 0 and `count > 0`).
pub fn spans(start: u64, count: usize, slots_per_frame: usize, frame_count: usize) -> Option<Vec<Span>> {
    if count == 0 {
        return Some(Vec::new());
    }
    let total = frame_start(frame_count, slots_per_frame);
    if slots_per_frame == 0 || start.checked_add(count as u64)? > total {
        return None;
    }
    let mut out = Vec::new();
    let mut done = 0usize;
    while done < count {
        let (frame, offset) = locate(start + done as u64, slots_per_frame);
        let len = (slots_per_frame - offset).min(count - done);
        out.push(Span { frame, offset, items: done..done + len });
        done += len;
    }
    Some(out)
}
