// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # vidsteg-core
//!
//! Pure-Rust steganography engine for hiding data in raw video frames.
//! Provides three embedding schemes:
//!
//! - **LSB**: bit-plane substitution, one bit per channel sample.
//! - **DCT**: one bit per 8×8 luma block in the order of two mid-frequency
//!   coefficients.
//! - **VIV** (video in video): a complete secret frame sequence hidden block
//!   by block in the cover's low bit planes.
//!
//! The crate works on decoded frame buffers only. Demuxing, codecs and file
//! I/O belong to the caller. An optional password derives (Argon2id) a
//! ChaCha20 keystream that masks and scatters the embedded bits; it is
//! obfuscation, not authenticated encryption.
//!
//! Enable the `parallel` feature to spread per-frame work over rayon.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use vidsteg_core::{decode, encode, Payload, PayloadKind, Scheme, StegoOptions};
//!
//! let options = StegoOptions::new().with_password("passphrase");
//! let stego = encode(cover_frames, Payload::Bytes(b"HELLO".to_vec()), Scheme::Lsb, &options)?;
//! let back = decode(&stego.frames, Scheme::Lsb, &options, PayloadKind::Bytes)?;
//! assert_eq!(back.payload, Payload::Bytes(b"HELLO".to_vec()));
//! ```

pub mod stego;
pub mod video;

pub use stego::{CancelFlag, DctOptions, StegoOptions, VivOptions};
pub use stego::{CapacityReport, StegoError, capacity, capacity_with, decode, encode};
pub use stego::{EmbedResult, ExtractResult, Payload, PayloadKind, Scheme};
pub use video::error::FrameError;
pub use video::{Frame, VideoInfo};
