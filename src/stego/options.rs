// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Encode/decode configuration.
//!
//! Defaults are the design constants below. Encoder and decoder must use
//! the same password. [`DctOptions`] only affect encoding. VIV parameters
//! are recorded in the embedded header, so the decoder ignores its own
//! [`VivOptions`].

use super::cancel::CancelFlag;
use super::error::StegoError;

/// Minimum coefficient gap forced between the two DCT carrier coefficients.
///
/// Rounding a modified block back to 8-bit samples perturbs every pixel by
/// at most 0.5, which moves the coefficient difference by at most
/// `sqrt(2) * 4 ≈ 5.7`. A gap of 12 survives that with room to spare while
/// keeping the change below one grey level for most pixels.
pub const DCT_MARGIN: f64 = 12.0;

/// Embed/re-measure passes per DCT block before giving up.
pub const DCT_MAX_PASSES: usize = 8;

/// Default VIV transfer block edge.
pub const VIV_BLOCK_SIZE: usize = 8;

/// Default number of cover bit planes used to carry secret data.
pub const VIV_LSB_DEPTH: u8 = 2;

/// Default number of most significant secret bits kept per sample (8 = lossless).
pub const VIV_SECRET_DEPTH: u8 = 8;

/// DCT scheme parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DctOptions {
    /// Target gap between the carrier coefficients.
    pub margin: f64,
    /// Embed/re-measure passes per block.
    pub max_passes: usize,
}

impl Default for DctOptions {
    fn default() -> Self {
        Self { margin: DCT_MARGIN, max_passes: DCT_MAX_PASSES }
    }
}

/// VIV scheme parameters (encode side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VivOptions {
    /// Edge length of the square transfer block, 1..=255.
    pub block_size: usize,
    /// Cover bit planes written per sample, 1..=4.
    pub lsb_depth: u8,
    /// Secret bits kept per sample, 1..=8.
    pub secret_depth: u8,
}

impl Default for VivOptions {
    fn default() -> Self {
        Self {
            block_size: VIV_BLOCK_SIZE,
            lsb_depth: VIV_LSB_DEPTH,
            secret_depth: VIV_SECRET_DEPTH,
        }
    }
}

impl VivOptions {
    pub fn validate(&self) -> Result<(), StegoError> {
        if self.block_size == 0 || self.block_size > u8::MAX as usize {
            return Err(StegoError::InvalidOptions("VIV block size must be 1..=255"));
        }
        if !(1..=4).contains(&self.lsb_depth) {
            return Err(StegoError::InvalidOptions("VIV lsb depth must be 1..=4"));
        }
        if !(1..=8).contains(&self.secret_depth) {
            return Err(StegoError::InvalidOptions("VIV secret depth must be 1..=8"));
        }
        Ok(())
    }
}

/// Options shared by [`encode`](crate::stego::encode) and
/// [`decode`](crate::stego::decode).
#[derive(Debug, Clone, Default)]
pub struct StegoOptions {
    /// Optional password. `None` and `Some("")` both mean "no password".
    pub password: Option<String>,
    pub dct: DctOptions,
    pub viv: VivOptions,
    pub cancel: CancelFlag,
}

impl StegoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_dct(mut self, dct: DctOptions) -> Self {
        self.dct = dct;
        self
    }

    pub fn with_viv(mut self, viv: VivOptions) -> Self {
        self.viv = viv;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The password, if one is set and non-empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Reject out-of-range parameters.
    pub fn validate(&self) -> Result<(), StegoError> {
        if !self.dct.margin.is_finite() || self.dct.margin <= 0.0 {
            return Err(StegoError::InvalidOptions("DCT margin must be positive"));
        }
        if self.dct.max_passes == 0 {
            return Err(StegoError::InvalidOptions("DCT needs at least one pass"));
        }
        self.viv.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(StegoOptions::default().validate().is_ok());
    }

    #[test]
    fn empty_password_is_no_password() {
        assert_eq!(StegoOptions::new().with_password("").password(), None);
        assert_eq!(StegoOptions::new().with_password("pw").password(), Some("pw"));
    }

    #[test]
    fn out_of_range_rejected() {
        let bad_depth = StegoOptions::new().with_viv(VivOptions { lsb_depth: 5, ..Default::default() });
        assert!(matches!(bad_depth.validate(), Err(StegoError::InvalidOptions(_))));

        let bad_secret = StegoOptions::new().with_viv(VivOptions { secret_depth: 0, ..Default::default() });
        assert!(bad_secret.validate().is_err());

        let bad_margin = StegoOptions::new().with_dct(DctOptions { margin: -1.0, ..Default::default() });
        assert!(bad_margin.validate().is_err());

        let bad_block = StegoOptions::new().with_viv(VivOptions { block_size: 256, ..Default::default() });
        assert!(bad_block.validate().is_err());
    }
}
