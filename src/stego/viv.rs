// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! VIV scheme: a secret video hidden block by block inside a cover video.
//!
//! Cover frames are tiled into whole `B × B` blocks ([`BlockGrid::within`]),
//! numbered globally in block-raster order, frame after frame. The layout
//! of that block sequence is:
//!
//! ```text
//! [header_blocks]               VivHeader, 1 LSB per sample
//! [k carrier blocks] × blocks   secret block data, lsb_depth LSBs per sample
//! ```
//!
//! Secret frames are tiled with [`BlockGrid::covering`] (edge blocks are
//! zero padded). Secret block `j` (global over secret frames) serialises the
//! top `secret_depth` bits of each of its samples, MSB first, pixel by pixel.
//! It needs `k = ceil(secret_bits / carrier_bits)` carrier blocks and lands
//! in carrier slot `perm[j]`, i.e. cover blocks
//! `header_blocks + perm[j] * k ..+ k`. Without a password `perm` is the
//! identity. With one, block data is additionally XOR-masked at keystream
//! offset `j * secret_bits`; the header is never masked, so a wrong password
//! garbles the video but keeps its shape.
//!
//! ```text
//! header (15 bytes, big-endian)
//! [2] magic "VV"  [1] version  [4] frame_count  [2] width  [2] height
//! [1] channels    [1] secret_depth  [1] lsb_depth  [1] block_size
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use tracing::{debug, trace};

use crate::stego::cancel::CancelFlag;
use crate::stego::capacity;
use crate::stego::cursor;
use crate::stego::error::StegoError;
use crate::stego::keystream::KeySchedule;
use crate::stego::options::VivOptions;
use crate::video::block::BlockGrid;
use crate::video::{Frame, VideoInfo};

const MAGIC: [u8; 2] = *b"VV";
const VERSION: u8 = 1;

/// Serialized header size.
pub const HEADER_BYTES: usize = 15;
/// Serialized header size in bits.
pub const HEADER_BITS: usize = HEADER_BYTES * 8;

/// Secret video description stored ahead of the block data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VivHeader {
    pub frame_count: u32,
    pub width: u16,
    pub height: u16,
    pub channels: u8,
    pub secret_depth: u8,
    pub lsb_depth: u8,
    pub block_size: u8,
}

impl VivHeader {
    /// Describe `secret` embedded with `options`.
    ///
    /// # Errors
    /// [`StegoError::PayloadTooLarge`] if the secret geometry exceeds the
    /// header fields (65535 px per side, `u32::MAX` frames).
    pub fn for_secret(secret: &VideoInfo, options: &VivOptions) -> Result<Self, StegoError> {
        Ok(Self {
            frame_count: u32::try_from(secret.frame_count).map_err(|_| StegoError::PayloadTooLarge)?,
            width: u16::try_from(secret.width).map_err(|_| StegoError::PayloadTooLarge)?,
            height: u16::try_from(secret.height).map_err(|_| StegoError::PayloadTooLarge)?,
            channels: secret.channels as u8,
            secret_depth: options.secret_depth,
            lsb_depth: options.lsb_depth,
            block_size: options.block_size as u8,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut out = [0u8; HEADER_BYTES];
        out[0..2].copy_from_slice(&MAGIC);
        out[2] = VERSION;
        out[3..7].copy_from_slice(&self.frame_count.to_be_bytes());
        out[7..9].copy_from_slice(&self.width.to_be_bytes());
        out[9..11].copy_from_slice(&self.height.to_be_bytes());
        out[11] = self.channels;
        out[12] = self.secret_depth;
        out[13] = self.lsb_depth;
        out[14] = self.block_size;
        out
    }

    /// Parse and sanity-check a header.
    ///
    /// # Errors
    /// [`StegoError::InvalidHeader`] on bad magic, unknown version, or
    /// out-of-range values.
    pub fn from_bytes(data: &[u8; HEADER_BYTES]) -> Result<Self, StegoError> {
        if data[0..2] != MAGIC {
            return Err(StegoError::InvalidHeader("no VIV header found"));
        }
        if data[2] != VERSION {
            return Err(StegoError::InvalidHeader("unsupported VIV header version"));
        }
        let header = Self {
            frame_count: u32::from_be_bytes([data[3], data[4], data[5], data[6]]),
            width: u16::from_be_bytes([data[7], data[8]]),
            height: u16::from_be_bytes([data[9], data[10]]),
            channels: data[11],
            secret_depth: data[12],
            lsb_depth: data[13],
            block_size: data[14],
        };
        if header.frame_count == 0 {
            return Err(StegoError::InvalidHeader("zero secret frames"));
        }
        if header.width == 0 || header.height == 0 {
            return Err(StegoError::InvalidHeader("zero secret dimensions"));
        }
        if header.channels == 0 || header.channels as usize > crate::video::MAX_CHANNELS {
            return Err(StegoError::InvalidHeader("bad secret channel count"));
        }
        if !(1..=8).contains(&header.secret_depth) || !(1..=4).contains(&header.lsb_depth) {
            return Err(StegoError::InvalidHeader("bad bit depth"));
        }
        if header.block_size == 0 {
            return Err(StegoError::InvalidHeader("zero block size"));
        }
        Ok(header)
    }

    /// `None` when the described geometry overflows the block arithmetic.
    fn layout(&self, cover_channels: usize) -> Option<Layout> {
        Layout::new(
            self.block_size as usize,
            cover_channels,
            self.lsb_depth,
            self.channels as usize,
            self.secret_depth,
            self.width as usize,
            self.height as usize,
            self.frame_count as usize,
        )
    }
}

/// Cover blocks reserved for the header.
pub fn header_blocks(block_size: usize, cover_channels: usize) -> usize {
    HEADER_BITS.div_ceil(block_size * block_size * cover_channels)
}

/// Bits one cover block carries at `lsb_depth` planes.
pub fn carrier_bits(block_size: usize, cover_channels: usize, lsb_depth: u8) -> u64 {
    (block_size * block_size * cover_channels) as u64 * lsb_depth as u64
}

/// Bits one secret block serialises to.
pub fn secret_block_bits(block_size: usize, secret_channels: usize, secret_depth: u8) -> u64 {
    (block_size * block_size * secret_channels) as u64 * secret_depth as u64
}

/// Cover blocks (header included) needed to hide `secret` in a cover with
/// `cover_channels` channels, or `None` if the count overflows `u64`.
pub fn blocks_needed(
    secret: &VideoInfo,
    cover_channels: usize,
    options: &VivOptions,
) -> Option<u64> {
    let layout = Layout::new(
        options.block_size,
        cover_channels,
        options.lsb_depth,
        secret.channels,
        options.secret_depth,
        secret.width,
        secret.height,
        secret.frame_count,
    )?;
    Some(layout.needed_blocks)
}

/// Global index of the first cover block of carrier slot `slot`, or `None`
/// if it does not fit in `u64`.
pub fn carrier_slot(slot: usize, header_blocks: usize, carriers_per_block: usize) -> Option<u64> {
    (slot as u64)
        .checked_mul(carriers_per_block as u64)?
        .checked_add(header_blocks as u64)
}

/// Derived geometry shared by encoder and decoder.
#[derive(Debug, Clone, Copy)]
struct Layout {
    block_size: usize,
    cover_channels: usize,
    lsb_depth: u8,
    secret_channels: usize,
    secret_depth: u8,
    secret_width: usize,
    secret_height: usize,
    secret_grid: BlockGrid,
    header_blocks: usize,
    secret_bits: usize,
    carriers_per_block: usize,
    total_secret_blocks: usize,
    /// Header blocks plus every carrier slot.
    needed_blocks: u64,
}

impl Layout {
    #[allow(clippy::too_many_arguments)]
    fn new(
        block_size: usize,
        cover_channels: usize,
        lsb_depth: u8,
        secret_channels: usize,
        secret_depth: u8,
        secret_width: usize,
        secret_height: usize,
        secret_frames: usize,
    ) -> Option<Self> {
        let secret_grid = BlockGrid::covering(secret_width, secret_height, block_size);
        let secret_bits = secret_block_bits(block_size, secret_channels, secret_depth) as usize;
        let carrier = carrier_bits(block_size, cover_channels, lsb_depth) as usize;
        let carriers_per_block = secret_bits.div_ceil(carrier);
        let total_secret_blocks = secret_grid
            .blocks_wide()
            .checked_mul(secret_grid.blocks_tall())?
            .checked_mul(secret_frames)?;
        let header_blocks = header_blocks(block_size, cover_channels);
        let needed_blocks = carrier_slot(total_secret_blocks, header_blocks, carriers_per_block)?;
        Some(Self {
            block_size,
            cover_channels,
            lsb_depth,
            secret_channels,
            secret_depth,
            secret_width,
            secret_height,
            secret_grid,
            header_blocks,
            secret_bits,
            carriers_per_block,
            total_secret_blocks,
            needed_blocks,
        })
    }

    /// `slot < total_secret_blocks`, so this stays below `needed_blocks`.
    fn carrier_start(&self, slot: usize) -> u64 {
        self.header_blocks as u64 + slot as u64 * self.carriers_per_block as u64
    }

    fn carrier_bits(&self) -> usize {
        carrier_bits(self.block_size, self.cover_channels, self.lsb_depth) as usize
    }

    /// Top `secret_depth` bits of every sample of secret block `block`,
    /// MSB first, pixel by pixel.
    fn serialize_block(&self, frame: &Frame, block: usize) -> Vec<u8> {
        let (x0, y0) = self.secret_grid.origin(block);
        let depth = self.secret_depth as usize;
        let mut bits = Vec::with_capacity(self.secret_bits);
        for dy in 0..self.block_size {
            for dx in 0..self.block_size {
                let (x, y) = (x0 + dx, y0 + dy);
                let inside = x < self.secret_width && y < self.secret_height;
                for c in 0..self.secret_channels {
                    let v = if inside { frame.sample(x, y, c) } else { 0 };
                    for i in 0..depth {
                        bits.push((v >> (7 - i)) & 1);
                    }
                }
            }
        }
        bits
    }

    /// Inverse of [`Layout::serialize_block`]. Dropped low bits are filled
    /// with the midpoint of their range; padding pixels are discarded.
    fn deserialize_block(&self, frame: &mut Frame, block: usize, bits: &[u8]) {
        let (x0, y0) = self.secret_grid.origin(block);
        let depth = self.secret_depth as usize;
        let fill = if depth < 8 { 1u8 << (7 - depth) } else { 0 };
        let mut chunks = bits.chunks(depth);
        for dy in 0..self.block_size {
            for dx in 0..self.block_size {
                let (x, y) = (x0 + dx, y0 + dy);
                let inside = x < self.secret_width && y < self.secret_height;
                for c in 0..self.secret_channels {
                    let Some(chunk) = chunks.next() else { return };
                    if inside {
                        let mut v = 0u8;
                        for (i, &b) in chunk.iter().enumerate() {
                            v |= (b & 1) << (7 - i);
                        }
                        frame.set_sample(x, y, c, v | fill);
                    }
                }
            }
        }
    }
}

/// Write bit `t` of a carrier block: sample `t / depth`, plane `t % depth`.
fn write_carrier(frame: &mut Frame, grid: &BlockGrid, block: usize, depth: u8, bits: &[u8]) {
    let (x0, y0) = grid.origin(block);
    let b = grid.block_size();
    let channels = frame.channels();
    let depth = depth as usize;
    for (t, &bit) in bits.iter().enumerate() {
        let s = t / depth;
        let plane = t % depth;
        let (p, c) = (s / channels, s % channels);
        let (x, y) = (x0 + p % b, y0 + p / b);
        let v = frame.sample(x, y, c);
        frame.set_sample(x, y, c, (v & !(1 << plane)) | ((bit & 1) << plane));
    }
}

/// Read `count` bits of a carrier block, the inverse of [`write_carrier`].
fn read_carrier(frame: &Frame, grid: &BlockGrid, block: usize, depth: u8, count: usize) -> Vec<u8> {
    let (x0, y0) = grid.origin(block);
    let b = grid.block_size();
    let channels = frame.channels();
    let depth = depth as usize;
    (0..count)
        .map(|t| {
            let s = t / depth;
            let plane = t % depth;
            let (p, c) = (s / channels, s % channels);
            (frame.sample(x0 + p % b, y0 + p / b, c) >> plane) & 1
        })
        .collect()
}

/// Hide `secret` in `cover`. Returns the number of bits written (header
/// plus serialized secret blocks).
///
/// All geometry and capacity checks run before the first cover sample is
/// written.
///
/// # Errors
/// - [`StegoError::InvalidFrames`] if either sequence is malformed.
/// - [`StegoError::InvalidOptions`] for out-of-range [`VivOptions`].
/// - [`StegoError::PayloadTooLarge`] if the secret geometry exceeds the header.
/// - [`StegoError::InsufficientCoverCapacity`] if the cover has too few blocks.
/// - [`StegoError::Cancelled`] if `cancel` fires between cover frames.
pub fn embed(
    cover: &mut [Frame],
    secret: &[Frame],
    options: &VivOptions,
    keys: &KeySchedule,
    cancel: &CancelFlag,
) -> Result<u64, StegoError> {
    options.validate()?;
    let cover_info = VideoInfo::of(cover)?;
    let secret_info = VideoInfo::of(secret)?;
    let header = VivHeader::for_secret(&secret_info, options)?;
    let layout = header.layout(cover_info.channels).ok_or(StegoError::PayloadTooLarge)?;

    let (needed, available) = capacity::viv_secret_fits(&cover_info, &secret_info, options)?;
    debug!(
        secret_blocks = layout.total_secret_blocks,
        carriers_per_block = layout.carriers_per_block,
        header_blocks = layout.header_blocks,
        needed,
        available,
        "VIV layout"
    );

    let cover_grid = BlockGrid::within(cover_info.width, cover_info.height, options.block_size);
    let per_frame = cover_grid.total_blocks();
    let header_bits = crate::stego::bitstream::bytes_to_bits(&header.to_bytes());
    let perm = keys.permutation(layout.total_secret_blocks);
    let mut slot_owner = vec![0usize; perm.len()];
    for (j, &slot) in perm.iter().enumerate() {
        slot_owner[slot] = j;
    }
    let used_blocks = needed as usize;
    let header_per_block = cover_grid.pixels_per_block() * cover_info.channels;

    let write = |(f, frame): (usize, &mut Frame)| -> Result<(), StegoError> {
        cancel.check()?;
        let first = cursor::frame_start(f, per_frame) as usize;
        let last = (first + per_frame).min(used_blocks);
        for g in first..last {
            let block = g - first;
            if g < layout.header_blocks {
                let start = g * header_per_block;
                let end = (start + header_per_block).min(HEADER_BITS);
                write_carrier(frame, &cover_grid, block, 1, &header_bits[start..end]);
                continue;
            }
            let rel = g - layout.header_blocks;
            let slot = rel / layout.carriers_per_block;
            let part = rel % layout.carriers_per_block;
            let j = slot_owner[slot];
            let (sf, sb) = cursor::locate(j as u64, layout.secret_grid.total_blocks());
            let mut bits = layout.serialize_block(&secret[sf], sb);
            keys.apply_mask(j as u64 * layout.secret_bits as u64, &mut bits);
            let start = part * layout.carrier_bits();
            let end = (start + layout.carrier_bits()).min(bits.len());
            write_carrier(frame, &cover_grid, block, layout.lsb_depth, &bits[start..end]);
        }
        trace!(frame = f, blocks = last.saturating_sub(first), "VIV cover frame written");
        Ok(())
    };

    let active = used_blocks.div_ceil(per_frame.max(1)).min(cover.len());
    let targets = &mut cover[..active];

    #[cfg(feature = "parallel")]
    targets.par_iter_mut().enumerate().try_for_each(write)?;
    #[cfg(not(feature = "parallel"))]
    targets.iter_mut().enumerate().try_for_each(write)?;

    Ok(HEADER_BITS as u64 + layout.total_secret_blocks as u64 * layout.secret_bits as u64)
}

/// Read the header from the first cover blocks.
///
/// `block_size` is not known before the header is read, so every size a
/// header could declare is tried in turn; only a block size that
/// reproduces itself in the parsed header is accepted.
///
/// # Errors
/// - [`StegoError::InvalidFrames`] if the cover is malformed.
/// - [`StegoError::InvalidHeader`] if no valid header is found.
pub fn read_header(cover: &[Frame]) -> Result<VivHeader, StegoError> {
    let info = VideoInfo::of(cover)?;
    let candidates = std::iter::once(crate::stego::options::VIV_BLOCK_SIZE)
        .chain((1..=u8::MAX as usize).filter(|&b| b != crate::stego::options::VIV_BLOCK_SIZE));
    for block_size in candidates {
        let Some(bits) = read_header_bits(cover, &info, block_size) else {
            continue;
        };
        let bytes = crate::stego::bitstream::bits_to_bytes(&bits);
        let Ok(array) = <[u8; HEADER_BYTES]>::try_from(bytes.as_slice()) else {
            continue;
        };
        if let Ok(header) = VivHeader::from_bytes(&array) {
            if header.block_size as usize == block_size {
                return Ok(header);
            }
        }
    }
    Err(StegoError::InvalidHeader("no VIV header found"))
}

fn read_header_bits(cover: &[Frame], info: &VideoInfo, block_size: usize) -> Option<Vec<u8>> {
    let grid = BlockGrid::within(info.width, info.height, block_size);
    let per_frame = grid.total_blocks();
    let h = header_blocks(block_size, info.channels);
    if per_frame == 0 || (h as u64) > capacity::viv_cover_blocks(info, block_size) {
        return None;
    }
    let per_block = grid.pixels_per_block() * info.channels;
    let mut bits = Vec::with_capacity(HEADER_BITS);
    for g in 0..h {
        let (f, block) = cursor::locate(g as u64, per_frame);
        let count = per_block.min(HEADER_BITS - bits.len());
        bits.extend(read_carrier(&cover[f], &grid, block, 1, count));
    }
    Some(bits)
}

/// Recovered secret video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredVideo {
    pub header: VivHeader,
    pub frames: Vec<Frame>,
}

impl RecoveredVideo {
    /// `true` when every sample was carried at full depth.
    pub fn is_exact(&self) -> bool {
        self.header.secret_depth == 8
    }
}

/// Recover the secret video from `cover`.
///
/// # Errors
/// - [`StegoError::InvalidHeader`] if the header is missing or nonsensical.
/// - [`StegoError::InsufficientCoverCapacity`] if the header describes more
///   blocks than the cover holds (checked before output is allocated).
/// - [`StegoError::Cancelled`] if `cancel` fires between secret frames.
pub fn extract(
    cover: &[Frame],
    keys: &KeySchedule,
    cancel: &CancelFlag,
) -> Result<RecoveredVideo, StegoError> {
    let header = read_header(cover)?;
    extract_with_header(cover, header, keys, cancel)
}

/// [`extract`] with a header already obtained from [`read_header`].
pub fn extract_with_header(
    cover: &[Frame],
    header: VivHeader,
    keys: &KeySchedule,
    cancel: &CancelFlag,
) -> Result<RecoveredVideo, StegoError> {
    let info = VideoInfo::of(cover)?;
    let layout = header
        .layout(info.channels)
        .ok_or(StegoError::InvalidHeader("secret geometry overflows"))?;
    let block_size = header.block_size as usize;

    // Output size is bounded by the cover once this holds.
    let needed = layout.needed_blocks;
    let available = capacity::viv_cover_blocks(&info, block_size);
    if needed > available {
        return Err(StegoError::InsufficientCoverCapacity {
            needed_blocks: needed,
            available_blocks: available,
        });
    }
    debug!(
        frames = header.frame_count,
        width = header.width,
        height = header.height,
        block_size,
        "VIV decode layout"
    );

    let cover_grid = BlockGrid::within(info.width, info.height, block_size);
    let per_frame = cover_grid.total_blocks();
    let perm = keys.permutation(layout.total_secret_blocks);
    let secret_per_frame = layout.secret_grid.total_blocks();

    let mut frames = (0..header.frame_count)
        .map(|_| {
            Frame::filled(
                header.width as usize,
                header.height as usize,
                header.channels as usize,
                0,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rebuild = |(sf, frame): (usize, &mut Frame)| -> Result<(), StegoError> {
        cancel.check()?;
        for sb in 0..secret_per_frame {
            let j = sf * secret_per_frame + sb;
            let first = layout.carrier_start(perm[j]);
            let mut bits = Vec::with_capacity(layout.secret_bits);
            for part in 0..layout.carriers_per_block {
                let (f, block) = cursor::locate(first + part as u64, per_frame);
                let count = layout.carrier_bits().min(layout.secret_bits - bits.len());
                bits.extend(read_carrier(&cover[f], &cover_grid, block, layout.lsb_depth, count));
            }
            keys.apply_mask(j as u64 * layout.secret_bits as u64, &mut bits);
            layout.deserialize_block(frame, sb, &bits);
        }
        Ok(())
    };

    #[cfg(feature = "parallel")]
    frames.par_iter_mut().enumerate().try_for_each(rebuild)?;
    #[cfg(not(feature = "parallel"))]
    frames.iter_mut().enumerate().try_for_each(rebuild)?;

    Ok(RecoveredVideo { header, frames })
}
