// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Decoded video frame model.
//!
//! The embedding core never touches containers or codecs. Callers decode
//! their video into [`Frame`] buffers (row-major, channel-interleaved, 8 bits
//! per sample) and hand the sequence over; the core returns frames of the
//! same geometry.
//!
//! This module is std-only.

pub mod block;
pub mod dct;
pub mod error;

use error::{FrameError, Result};

/// Largest supported channel count (e.g. RGBA / BGRA).
pub const MAX_CHANNELS: usize = 4;

/// One decoded frame: `height` rows of `width` pixels, each pixel
/// `channels` consecutive 8-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    /// - [`FrameError::ZeroDimension`] if `width` or `height` is 0.
    /// - [`FrameError::UnsupportedChannels`] unless `1 <= channels <= 4`.
    /// - [`FrameError::TooLarge`] if `width * height * channels` overflows.
    /// - [`FrameError::BufferSize`] if `data.len() != width * height * channels`.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let expected = Self::checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(FrameError::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, channels, data })
    }

    /// A frame with every sample set to `value`.
    ///
    /// # Errors
    /// As [`Frame::new`]; nothing is allocated for a rejected geometry.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Result<Self> {
        let len = Self::checked_len(width, height, channels)?;
        Self::new(width, height, channels, vec![value; len])
    }

    fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension);
        }
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(FrameError::UnsupportedChannels(channels));
        }
        width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(FrameError::TooLarge)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of samples (`width * height * channels`).
    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    /// Sample at pixel (`x`, `y`), channel `c`.
    pub fn sample(&self, x: usize, y: usize, c: usize) -> u8 {
        self.data[self.index(x, y, c)]
    }

    pub fn set_sample(&mut self, x: usize, y: usize, c: usize, value: u8) {
        let idx = self.index(x, y, c);
        self.data[idx] = value;
    }

    /// All channels of pixel (`x`, `y`).
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = self.index(x, y, 0);
        &self.data[start..start + self.channels]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let start = self.index(x, y, 0);
        &mut self.data[start..start + self.channels]
    }

    /// Raw interleaved samples in scan order.
    pub fn samples(&self) -> &[u8] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the frame and return its sample buffer.
    pub fn into_samples(self) -> Vec<u8> {
        self.data
    }

    /// Luma of pixel (`x`, `y`) as used by the DCT scheme.
    ///
    /// Single-channel frames are their own luma. Two-channel frames use the
    /// first channel. Frames with three or more channels use BT.601 weights
    /// over the first three channels; a fourth (alpha) channel is ignored.
    pub fn luma(&self, x: usize, y: usize) -> f64 {
        let px = self.pixel(x, y);
        if self.channels < 3 {
            px[0] as f64
        } else {
            dct::LUMA_WEIGHTS[0] * px[0] as f64
                + dct::LUMA_WEIGHTS[1] * px[1] as f64
                + dct::LUMA_WEIGHTS[2] * px[2] as f64
        }
    }

    /// Full luma plane, row-major.
    pub fn luma_plane(&self) -> Vec<f64> {
        let mut plane = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                plane.push(self.luma(x, y));
            }
        }
        plane
    }

    fn index(&self, x: usize, y: usize, c: usize) -> usize {
        debug_assert!(x < self.width, "x {x} >= {}", self.width);
        debug_assert!(y < self.height, "y {y} >= {}", self.height);
        debug_assert!(c < self.channels);
        (y * self.width + x) * self.channels + c
    }
}

/// Geometry shared by every frame of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub frame_count: usize,
}

impl VideoInfo {
    /// Inspect a frame sequence.
    ///
    /// # Errors
    /// - [`FrameError::Empty`] for an empty slice.
    /// - [`FrameError::GeometryMismatch`] if any frame differs from frame 0
    ///   in width, height or channel count.
    pub fn of(frames: &[Frame]) -> Result<Self> {
        let first = frames.first().ok_or(FrameError::Empty)?;
        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.width != first.width
                || frame.height != first.height
                || frame.channels != first.channels
            {
                return Err(FrameError::GeometryMismatch { index });
            }
        }
        Ok(Self {
            width: first.width,
            height: first.height,
            channels: first.channels,
            frame_count: frames.len(),
        })
    }

    /// Samples per frame (`width * height * channels`).
    pub fn samples_per_frame(&self) -> usize {
        self.width * self.height * self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_bad_buffers() {
        assert_eq!(Frame::new(0, 4, 3, vec![]), Err(FrameError::ZeroDimension));
        assert_eq!(Frame::new(2, 2, 5, vec![0; 20]), Err(FrameError::UnsupportedChannels(5)));
        assert_eq!(
            Frame::new(2, 2, 3, vec![0; 11]),
            Err(FrameError::BufferSize { expected: 12, actual: 11 })
        );
    }

    #[test]
    fn overflowing_geometry_is_too_large() {
        assert_eq!(Frame::new(usize::MAX, 2, 1, vec![]), Err(FrameError::TooLarge));
        assert_eq!(Frame::new(usize::MAX / 2 + 1, 1, 2, vec![]), Err(FrameError::TooLarge));
        assert_eq!(Frame::filled(usize::MAX, usize::MAX, 4, 0), Err(FrameError::TooLarge));
        assert_eq!(Frame::filled(0, usize::MAX, 4, 0), Err(FrameError::ZeroDimension));
    }

    #[test]
    fn sample_layout_is_row_major_interleaved() {
        let data: Vec<u8> = (0..24).collect();
        let frame = Frame::new(4, 2, 3, data).unwrap();
        assert_eq!(frame.sample(0, 0, 0), 0);
        assert_eq!(frame.sample(1, 0, 2), 5);
        assert_eq!(frame.sample(0, 1, 0), 12);
        assert_eq!(frame.pixel(3, 1), &[21, 22, 23]);
    }

    #[test]
    fn luma_of_gray_pixel_is_its_value() {
        let frame = Frame::filled(2, 2, 3, 200).unwrap();
        assert!((frame.luma(1, 1) - 200.0).abs() < 1e-9);
        let mono = Frame::filled(2, 2, 1, 17).unwrap();
        assert_eq!(mono.luma(0, 0), 17.0);
    }

    #[test]
    fn video_info_detects_mismatch() {
        let a = Frame::filled(4, 4, 3, 0).unwrap();
        let b = Frame::filled(4, 2, 3, 0).unwrap();
        assert_eq!(VideoInfo::of(&[]), Err(FrameError::Empty));
        assert_eq!(
            VideoInfo::of(&[a.clone(), a.clone(), b]),
            Err(FrameError::GeometryMismatch { index: 2 })
        );
        let info = VideoInfo::of(&[a.clone(), a]).unwrap();
        assert_eq!(info.frame_count, 2);
        assert_eq!(info.samples_per_frame(), 48);
    }
}
