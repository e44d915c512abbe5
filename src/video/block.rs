// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Block partitioning of a frame.
//!
//! [`BlockGrid`] tiles a `width × height` plane with non-overlapping square
//! blocks in block-raster order (row-major over block rows, then block
//! columns). Block index `k` maps to `(k / blocks_wide, k % blocks_wide)`.

/// Tiling of a frame into `block_size × block_size` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    block_size: usize,
    /// Number of blocks horizontally.
    blocks_wide: usize,
    /// Number of blocks vertically.
    blocks_tall: usize,
}

impl BlockGrid {
    /// Whole blocks only. Partial blocks at the right and bottom edges are
    /// dropped, so every block lies fully inside the frame. Used for cover
    /// frames.
    pub fn within(width: usize, height: usize, block_size: usize) -> Self {
        debug_assert!(block_size > 0);
        Self {
            block_size,
            blocks_wide: width / block_size,
            blocks_tall: height / block_size,
        }
    }

    /// Every pixel belongs to some block. Edge blocks may extend past the
    /// frame; those pixels read as zero and are discarded on write. Used for
    /// secret frames.
    pub fn covering(width: usize, height: usize, block_size: usize) -> Self {
        debug_assert!(block_size > 0);
        Self {
            block_size,
            blocks_wide: width.div_ceil(block_size),
            blocks_tall: height.div_ceil(block_size),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    pub fn blocks_tall(&self) -> usize {
        self.blocks_tall
    }

    /// Total number of blocks.
    pub fn total_blocks(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    /// Block row and column of the `index`-th block.
    pub fn position(&self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.total_blocks(), "block {index} >= {}", self.total_blocks());
        (index / self.blocks_wide, index % self.blocks_wide)
    }

    /// Top-left pixel (`x`, `y`) of the `index`-th block.
    pub fn origin(&self, index: usize) -> (usize, usize) {
        let (br, bc) = self.position(index);
        (bc * self.block_size, br * self.block_size)
    }

    /// Pixels per block.
    pub fn pixels_per_block(&self) -> usize {
        self.block_size * self.block_size
    }
}
