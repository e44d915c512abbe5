// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Cooperative cancellation.
//!
//! Uses an atomic so it is safe to share with rayon worker threads. Schemes
//! poll the flag between frames (LSB, DCT) or between cover frames (VIV)
//! and return [`StegoError::Cancelled`]; the caller then discards whatever
//! partial output it holds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::StegoError;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation holding this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clear a previous request so the flag can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Return `Err(StegoError::Cancelled)` if cancellation was requested.
    pub fn check(&self) -> Result<(), StegoError> {
        if self.is_cancelled() {
            Err(StegoError::Cancelled)
        } else {
            Ok(())
        }
    }
}
