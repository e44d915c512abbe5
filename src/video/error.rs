// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for frame buffers and frame sequences.

use std::fmt;

/// Errors raised when a caller-supplied frame buffer or sequence is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The sequence contains no frames.
    Empty,
    /// Width or height is zero.
    ZeroDimension,
    /// Channel count outside 1..=4.
    UnsupportedChannels(usize),
    /// `width * height * channels` does not fit in `usize`.
    TooLarge,
    /// Sample buffer length does not equal `width * height * channels`.
    BufferSize { expected: usize, actual: usize },
    /// A frame's geometry differs from the first frame of the sequence.
    GeometryMismatch { index: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "frame sequence is empty"),
            Self::ZeroDimension => write!(f, "frame width and height must be non-zero"),
            Self::UnsupportedChannels(c) => write!(f, "unsupported channel count: {c}"),
            Self::TooLarge => write!(f, "frame dimensions overflow the sample count"),
            Self::BufferSize { expected, actual } => {
                write!(f, "frame buffer holds {actual} samples, expected {expected}")
            }
            Self::GeometryMismatch { index } => {
                write!(f, "frame {index} differs in size from frame 0")
            }
        }
    }
}

impl std::error::Error for FrameError {}

pub type Result<T> = std::result::Result<T, FrameError>;
