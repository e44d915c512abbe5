// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Bitstream packing and unpacking.
//!
//! Every LSB and DCT embedding carries one bitstream:
//!
//! ```text
//! [32 bits] body length L in bits (big-endian u32)
//! [L bits ] body, MSB first within each byte
//! ```
//!
//! The header tells the decoder exactly where to stop reading. Bits are
//! stored one per `u8` (values 0 or 1).

use crate::stego::error::StegoError;

/// Width of the length header in bits.
pub const HEADER_BITS: usize = 32;

/// Largest body length the header can describe, in bits.
pub const MAX_BODY_BITS: u64 = u32::MAX as u64;

/// Header followed by body bits.
pub type Bitstream = Vec<u8>;

/// Pack a byte payload into a bitstream.
///
/// # Errors
/// [`StegoError::PayloadTooLarge`] if `payload.len() * 8` exceeds `u32::MAX`.
pub fn pack(payload: &[u8]) -> Result<Bitstream, StegoError> {
    let body_bits = (payload.len() as u64)
        .checked_mul(8)
        .filter(|&n| n <= MAX_BODY_BITS)
        .ok_or(StegoError::PayloadTooLarge)?;
    let mut stream = Vec::with_capacity(HEADER_BITS + body_bits as usize);
    stream.extend(u32_to_bits(body_bits as u32));
    stream.extend(bytes_to_bits(payload));
    Ok(stream)
}

/// Pack a raw bit payload (any length, not necessarily whole bytes).
pub fn pack_bits(bits: &[u8]) -> Result<Bitstream, StegoError> {
    if bits.len() as u64 > MAX_BODY_BITS {
        return Err(StegoError::PayloadTooLarge);
    }
    let mut stream = Vec::with_capacity(HEADER_BITS + bits.len());
    stream.extend(u32_to_bits(bits.len() as u32));
    stream.extend(bits.iter().map(|b| b & 1));
    Ok(stream)
}

/// Read the declared body length from the first [`HEADER_BITS`] bits.
///
/// # Errors
/// [`StegoError::TruncatedStream`] if fewer than 32 bits are given.
pub fn read_header(bits: &[u8]) -> Result<u32, StegoError> {
    if bits.len() < HEADER_BITS {
        return Err(StegoError::TruncatedStream {
            needed: HEADER_BITS as u64,
            available: bits.len() as u64,
        });
    }
    Ok(bits_to_u32(&bits[..HEADER_BITS]))
}

/// Unpack the body bits from the first `count` bits of `bits`.
///
/// # Errors
/// [`StegoError::TruncatedStream`] if `count` exceeds `bits.len()` or is
/// shorter than header + declared length.
pub fn unpack_bits(bits: &[u8], count: usize) -> Result<Vec<u8>, StegoError> {
    if count > bits.len() {
        return Err(StegoError::TruncatedStream {
            needed: count as u64,
            available: bits.len() as u64,
        });
    }
    let bits = &bits[..count];
    let len = read_header(bits)? as usize;
    let needed = HEADER_BITS + len;
    if count < needed {
        return Err(StegoError::TruncatedStream {
            needed: needed as u64,
            available: count as u64,
        });
    }
    Ok(bits[HEADER_BITS..needed].to_vec())
}

/// Unpack a byte payload from the first `count` bits of `bits`.
///
/// A body whose length is not a multiple of 8 has its last byte padded
/// with zero bits.
pub fn unpack(bits: &[u8], count: usize) -> Result<Vec<u8>, StegoError> {
    unpack_bits(bits, count).map(|body| bits_to_bytes(&body))
}

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

/// Big-endian bits of a `u32`.
pub fn u32_to_bits(value: u32) -> impl Iterator<Item = u8> {
    (0..32).rev().map(move |pos| ((value >> pos) & 1) as u8)
}

/// Inverse of [`u32_to_bits`]; reads at most 32 bits.
pub fn bits_to_u32(bits: &[u8]) -> u32 {
    bits.iter().take(32).fold(0u32, |acc, &b| (acc << 1) | (b & 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        for payload in [&b""[..], b"A", b"HELLO", &[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0xFF]] {
            let stream = pack(payload).unwrap();
            assert_eq!(stream.len(), HEADER_BITS + payload.len() * 8);
            assert_eq!(unpack(&stream, stream.len()).unwrap(), payload);
        }
    }

    #[test]
    fn header_is_big_endian_bit_length() {
        let stream = pack(b"HELLO").unwrap();
        // 5 bytes = 40 bits = 0b101000
        assert_eq!(read_header(&stream).unwrap(), 40);
        assert_eq!(&stream[26..32], &[1, 0, 1, 0, 0, 0]);
        assert!(stream[..26].iter().all(|&b| b == 0));
        // 'H' = 0x48 = 0100_1000, MSB first.
        assert_eq!(&stream[32..40], &[0, 1, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn trailing_bits_beyond_declared_length_are_ignored() {
        let mut stream = pack(b"hi").unwrap();
        stream.extend([1, 1, 1, 0, 1]);
        assert_eq!(unpack(&stream, stream.len()).unwrap(), b"hi");
    }

    #[test]
    fn truncated_stream_detected() {
        let stream = pack(b"HELLO").unwrap();
        let err = unpack(&stream, stream.len() - 1).unwrap_err();
        assert!(matches!(err, StegoError::TruncatedStream { needed: 72, available: 71 }));
        assert!(matches!(read_header(&stream[..10]), Err(StegoError::TruncatedStream { .. })));
        assert!(matches!(
            unpack(&stream, stream.len() + 1),
            Err(StegoError::TruncatedStream { needed: 73, available: 72 })
        ));
    }

    #[test]
    fn raw_bit_payloads() {
        let stream = pack_bits(&[0]).unwrap();
        assert_eq!(stream.len(), HEADER_BITS + 1);
        assert_eq!(read_header(&stream).unwrap(), 1);
        assert_eq!(unpack_bits(&stream, stream.len()).unwrap(), vec![0]);

        let odd = pack_bits(&[1, 0, 1]).unwrap();
        // Partial byte is zero padded.
        assert_eq!(unpack(&odd, odd.len()).unwrap(), vec![0b1010_0000]);
    }

    #[test]
    fn u32_bits_roundtrip() {
        for v in [0u32, 1, 40, 0xDEAD_BEEF, u32::MAX] {
            let bits: Vec<u8> = u32_to_bits(v).collect();
            assert_eq!(bits.len(), 32);
            assert_eq!(bits_to_u32(&bits), v);
        }
    }

    #[test]
    fn bits_to_bytes_partial_byte() {
        let bytes = bits_to_bytes(&[1, 0, 1, 1, 0]);
        assert_eq!(bytes, vec![0xB0]);
    }
}
