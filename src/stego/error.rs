// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers every failure mode from input validation through
//! capacity checks, embedding and extraction. Capacity and size errors are
//! always raised before any cover frame is modified (encode) or any output
//! buffer is allocated (decode).

use core::fmt;

use crate::video::error::FrameError;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug)]
pub enum StegoError {
    /// The cover or secret frame sequence is malformed.
    InvalidFrames(FrameError),
    /// The payload length does not fit the 32-bit bitstream header.
    PayloadTooLarge,
    /// The packed payload needs more bits than the cover can carry.
    InsufficientCapacity { needed: u64, available: u64 },
    /// The cover video has too few blocks for the secret video.
    InsufficientCoverCapacity { needed_blocks: u64, available_blocks: u64 },
    /// The stream ends before the length its header declares.
    TruncatedStream { needed: u64, available: u64 },
    /// An embedded header decodes to nonsensical values.
    InvalidHeader(&'static str),
    /// Unknown scheme name, or a scheme paired with a payload kind it cannot carry.
    UnsupportedScheme(String),
    /// An option is outside its supported range.
    InvalidOptions(&'static str),
    /// A DCT block is so saturated that the bit cannot be forced in.
    BlockSaturated { frame: usize, block: usize },
    /// Password key derivation failed.
    KeyDerivation,
    /// The operation was cancelled by the caller.
    Cancelled,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFrames(e) => write!(f, "invalid frames: {e}"),
            Self::PayloadTooLarge => write!(f, "payload exceeds the bitstream header range"),
            Self::InsufficientCapacity { needed, available } => {
                write!(f, "payload needs {needed} bits, cover holds {available}")
            }
            Self::InsufficientCoverCapacity { needed_blocks, available_blocks } => write!(
                f,
                "secret video needs {needed_blocks} cover blocks, cover has {available_blocks}"
            ),
            Self::TruncatedStream { needed, available } => {
                write!(f, "stream truncated: header declares {needed} bits, {available} available")
            }
            Self::InvalidHeader(msg) => write!(f, "invalid embedded header: {msg}"),
            Self::UnsupportedScheme(s) => write!(f, "unsupported scheme: {s}"),
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::BlockSaturated { frame, block } => {
                write!(f, "block {block} of frame {frame} is too saturated to embed")
            }
            Self::KeyDerivation => write!(f, "password key derivation failed"),
            Self::Cancelled => write!(f, "operation cancelled by user"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidFrames(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameError> for StegoError {
    fn from(e: FrameError) -> Self {
        Self::InvalidFrames(e)
    }
}
