// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Steganographic encoding and decoding of video frame sequences.
//!
//! Three schemes share one entry point:
//!
//! - **LSB** ([`Scheme::Lsb`]): one payload bit in bit 0 of every sample.
//!   Highest capacity, invisible, fragile.
//! - **DCT** ([`Scheme::Dct`]): one payload bit per 8×8 luma block, stored in
//!   the order of two mid-frequency coefficients. Low capacity, more robust.
//! - **VIV** ([`Scheme::Viv`]): a whole secret video transferred block by
//!   block into the low bit planes of the cover.
//!
//! LSB and DCT share the same bitstream framing and optional password
//! keystream (XOR mask plus position permutation). See [`pipeline`] for the
//! encode/decode flow.

pub mod error;
pub mod bitstream;
pub mod capacity;
pub mod cancel;
pub mod cursor;
pub mod dct;
pub mod keystream;
pub mod lsb;
pub mod options;
pub mod permute;
pub mod pipeline;
pub mod viv;

use core::fmt;
use core::str::FromStr;

pub use cancel::CancelFlag;
pub use capacity::{CapacityReport, capacity, capacity_with};
pub use error::StegoError;
pub use options::{DctOptions, StegoOptions, VivOptions};
pub use pipeline::{EmbedResult, ExtractResult, Payload, PayloadKind, decode, encode};

/// Embedding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Lsb,
    Dct,
    Viv,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Lsb, Scheme::Dct, Scheme::Viv];

    pub fn name(self) -> &'static str {
        match self {
            Self::Lsb => "lsb",
            Self::Dct => "dct",
            Self::Viv => "viv",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = StegoError;

    /// Case-insensitive `"lsb"`, `"dct"` or `"viv"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StegoError::UnsupportedScheme(s.to_string()))
    }
}
