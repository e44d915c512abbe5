// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! 8×8 orthonormal DCT-II / DCT-III on luma blocks.
//!
//! Coefficients are stored in natural (row-major) order, index = row * 8 + col,
//! where `row` is the vertical frequency and `col` the horizontal one. The
//! transform is orthonormal, so a pixel-domain error of L2 norm `e` moves any
//! single coefficient by at most `e`.

use std::sync::OnceLock;

/// Transform block edge length.
pub const BLOCK: usize = 8;

/// Samples per transform block.
pub const BLOCK_AREA: usize = BLOCK * BLOCK;

/// BT.601 luma weights applied to channels 0, 1, 2.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Pre-computed cosine table.
/// `COSINE[u][x] = cos((2*x + 1) * u * PI / 16)`
static COSINE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();

/// Normalization constants: C(0) = 1/sqrt(8), C(u>0) = 1/2.
static NORM: OnceLock<[f64; 8]> = OnceLock::new();

fn cosine_table() -> &'static [[f64; 8]; 8] {
    COSINE.get_or_init(|| {
        let mut table = [[0.0f64; 8]; 8];
        for (u, row) in table.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos();
            }
        }
        table
    })
}

fn norm_table() -> &'static [f64; 8] {
    NORM.get_or_init(|| {
        let mut n = [0.5f64; 8];
        n[0] = 1.0 / (8.0f64).sqrt();
        n
    })
}

/// Forward 8×8 DCT: 64 spatial samples → 64 coefficients.
pub fn forward(pixels: &[f64; BLOCK_AREA]) -> [f64; BLOCK_AREA] {
    let cos = cosine_table();
    let c = norm_table();

    // Separable: rows, then columns.
    let mut temp = [0.0f64; BLOCK_AREA];
    for row in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;
            for x in 0..8 {
                sum += pixels[row * 8 + x] * cos[u][x];
            }
            temp[row * 8 + u] = c[u] * sum;
        }
    }

    let mut coeffs = [0.0f64; BLOCK_AREA];
    for col in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0;
            for y in 0..8 {
                sum += temp[y * 8 + col] * cos[v][y];
            }
            coeffs[v * 8 + col] = c[v] * sum;
        }
    }
    coeffs
}

/// Inverse 8×8 DCT: 64 coefficients → 64 spatial samples (unclipped).
pub fn inverse(coeffs: &[f64; BLOCK_AREA]) -> [f64; BLOCK_AREA] {
    let cos = cosine_table();
    let c = norm_table();

    // Separable: columns, then rows.
    let mut temp = [0.0f64; BLOCK_AREA];
    for col in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0;
            for v in 0..8 {
                sum += c[v] * coeffs[v * 8 + col] * cos[v][y];
            }
            temp[y * 8 + col] = sum;
        }
    }

    let mut pixels = [0.0f64; BLOCK_AREA];
    for row in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for u in 0..8 {
                sum += c[u] * temp[row * 8 + u] * cos[u][x];
            }
            pixels[row * 8 + x] = sum;
        }
    }
    pixels
}

/// Read the 8×8 luma block whose top-left pixel is (`x0`, `y0`).
pub fn read_luma_block(frame: &super::Frame, x0: usize, y0: usize) -> [f64; BLOCK_AREA] {
    let mut block = [0.0f64; BLOCK_AREA];
    for dy in 0..BLOCK {
        for dx in 0..BLOCK {
            block[dy * BLOCK + dx] = frame.luma(x0 + dx, y0 + dy);
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_lossless_in_float() {
        let mut px = [0.0f64; 64];
        for (i, v) in px.iter_mut().enumerate() {
            *v = ((i * 37) % 256) as f64;
        }
        let back = inverse(&forward(&px));
        for i in 0..64 {
            assert!((px[i] - back[i]).abs() < 1e-9, "sample {i}: {} vs {}", px[i], back[i]);
        }
    }

    #[test]
    fn flat_block_has_only_dc() {
        let px = [100.0f64; 64];
        let coeffs = forward(&px);
        // Orthonormal DC of a flat block = 8 * value.
        assert!((coeffs[0] - 800.0).abs() < 1e-9);
        for (i, &c) in coeffs.iter().enumerate().skip(1) {
            assert!(c.abs() < 1e-9, "AC {i} = {c}");
        }
    }

    #[test]
    fn single_coefficient_basis_has_unit_norm() {
        let mut coeffs = [0.0f64; 64];
        coeffs[4 * 8 + 1] = 1.0;
        let px = inverse(&coeffs);
        let energy: f64 = px.iter().map(|v| v * v).sum();
        assert!((energy - 1.0).abs() < 1e-9);
    }
}
