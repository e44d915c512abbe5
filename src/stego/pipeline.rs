// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Encode/decode driver shared by all schemes.
//!
//! Every call walks a small state machine:
//!
//! ```text
//! encode: Idle → CapacityChecked → Embedding  → Done
//! decode: Idle → HeaderRead      → Extracting → Done
//!         any error              → Failed
//! ```
//!
//! LSB and DCT carry a [`bitstream`](crate::stego::bitstream): the 32-bit
//! length header in the clear, then the body XOR-masked by the password
//! keystream and scattered by the password permutation. VIV carries a
//! whole secret video and does its own framing.
//!
//! Capacity is always checked before the first cover sample is written, and
//! a failed encode consumes the cover frames without returning them, so a
//! partially written cover never reaches the caller.

use tracing::debug;

use crate::stego::Scheme;
use crate::stego::bitstream::{self, HEADER_BITS};
use crate::stego::capacity;
use crate::stego::dct;
use crate::stego::error::StegoError;
use crate::stego::keystream::KeySchedule;
use crate::stego::lsb;
use crate::stego::options::StegoOptions;
use crate::stego::permute;
use crate::stego::viv;
use crate::video::{Frame, VideoInfo};

/// What to hide, or what was recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Arbitrary bytes (text is just UTF-8 bytes).
    Bytes(Vec<u8>),
    /// Raw bits, one per `u8`, any length.
    Bits(Vec<u8>),
    /// A secondary video (VIV only).
    Video(Vec<Frame>),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Bytes(_) => PayloadKind::Bytes,
            Self::Bits(_) => PayloadKind::Bits,
            Self::Video(_) => PayloadKind::Video,
        }
    }
}

/// The payload shape a decoder should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Bytes,
    Bits,
    Video,
}

/// Output of a successful [`encode`].
#[derive(Debug, Clone)]
pub struct EmbedResult {
    /// The modified cover frames, same geometry and order as the input.
    pub frames: Vec<Frame>,
    /// Bits written into the cover, headers included.
    pub bits_embedded: u64,
    pub scheme: Scheme,
}

/// Output of a successful [`decode`].
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub payload: Payload,
    /// `false` when the payload is an approximation of what was embedded
    /// (VIV with fewer than 8 secret bits per sample).
    pub exact: bool,
}

/// Progress of one encode or decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Idle,
    CapacityChecked,
    Embedding,
    HeaderRead,
    Extracting,
    Done,
    Failed,
}

/// Stage tracker; every transition is logged at `debug`.
struct Stages {
    op: &'static str,
    scheme: Scheme,
    stage: Stage,
}

impl Stages {
    fn new(op: &'static str, scheme: Scheme) -> Self {
        Self { op, scheme, stage: Stage::Idle }
    }

    fn advance(&mut self, next: Stage) {
        debug!(op = self.op, scheme = %self.scheme, from = ?self.stage, to = ?next, "stage");
        self.stage = next;
    }

    fn finish<T>(&mut self, result: Result<T, StegoError>) -> Result<T, StegoError> {
        match &result {
            Ok(_) => self.advance(Stage::Done),
            Err(e) => {
                debug!(op = self.op, scheme = %self.scheme, error = %e, "failed");
                self.advance(Stage::Failed);
            }
        }
        result
    }
}

/// Reject scheme/payload combinations that cannot work.
fn check_pairing(scheme: Scheme, kind: PayloadKind) -> Result<(), StegoError> {
    match (scheme, kind) {
        (Scheme::Viv, PayloadKind::Video) => Ok(()),
        (Scheme::Lsb | Scheme::Dct, PayloadKind::Bytes | PayloadKind::Bits) => Ok(()),
        (Scheme::Viv, _) => Err(StegoError::UnsupportedScheme(
            "viv carries video payloads only".into(),
        )),
        (_, PayloadKind::Video) => Err(StegoError::UnsupportedScheme(format!(
            "{scheme} cannot carry a video payload"
        ))),
    }
}

/// Hide `payload` in `cover` with `scheme`.
///
/// # Errors
/// - [`StegoError::InvalidOptions`] / [`StegoError::InvalidFrames`] for bad input.
/// - [`StegoError::UnsupportedScheme`] for a scheme/payload mismatch.
/// - [`StegoError::PayloadTooLarge`] if the payload exceeds the header range.
/// - [`StegoError::InsufficientCapacity`] (LSB, DCT) or
///   [`StegoError::InsufficientCoverCapacity`] (VIV) if it does not fit.
/// - [`StegoError::BlockSaturated`] if a DCT block refuses its bit.
/// - [`StegoError::Cancelled`] if the cancel flag fires.
pub fn encode(
    cover: Vec<Frame>,
    payload: Payload,
    scheme: Scheme,
    options: &StegoOptions,
) -> Result<EmbedResult, StegoError> {
    let mut stages = Stages::new("encode", scheme);
    let result = encode_inner(cover, payload, scheme, options, &mut stages);
    stages.finish(result)
}

fn encode_inner(
    mut cover: Vec<Frame>,
    payload: Payload,
    scheme: Scheme,
    options: &StegoOptions,
    stages: &mut Stages,
) -> Result<EmbedResult, StegoError> {
    options.validate()?;
    let info = VideoInfo::of(&cover)?;
    check_pairing(scheme, payload.kind())?;

    let bits_embedded = match payload {
        Payload::Video(secret) => {
            let secret_info = VideoInfo::of(&secret)?;
            viv::VivHeader::for_secret(&secret_info, &options.viv)?;
            capacity::viv_secret_fits(&info, &secret_info, &options.viv)?;
            stages.advance(Stage::CapacityChecked);

            let keys = KeySchedule::from_password(options.password())?;
            stages.advance(Stage::Embedding);
            viv::embed(&mut cover, &secret, &options.viv, &keys, &options.cancel)?
        }
        Payload::Bytes(bytes) => embed_stream(&mut cover, &info, bitstream::pack(&bytes)?, scheme, options, stages)?,
        Payload::Bits(bits) => embed_stream(&mut cover, &info, bitstream::pack_bits(&bits)?, scheme, options, stages)?,
    };

    Ok(EmbedResult { frames: cover, bits_embedded, scheme })
}

fn embed_stream(
    cover: &mut [Frame],
    info: &VideoInfo,
    mut stream: Vec<u8>,
    scheme: Scheme,
    options: &StegoOptions,
    stages: &mut Stages,
) -> Result<u64, StegoError> {
    let body_bits = (stream.len() - HEADER_BITS) as u64;
    let report = capacity::capacity_with(scheme, info, &options.viv);
    capacity::check_fits(&report, body_bits)?;
    let slots = match scheme {
        Scheme::Dct => capacity::dct_slots(info),
        _ => capacity::lsb_slots(info),
    };
    if (stream.len() as u64) > slots {
        // Too small for even the length header.
        return Err(StegoError::InsufficientCapacity { needed: body_bits, available: report.max_bits });
    }
    debug!(scheme = %scheme, body_bits, max_bits = report.max_bits, "payload fits");
    stages.advance(Stage::CapacityChecked);

    let keys = KeySchedule::from_password(options.password())?;
    let body = &mut stream[HEADER_BITS..];
    keys.apply_mask(0, body);
    let scattered = permute::scatter(body, &keys.permutation(body.len()));
    body.copy_from_slice(&scattered);

    stages.advance(Stage::Embedding);
    match scheme {
        Scheme::Lsb => lsb::embed_bits(cover, 0, &stream, &options.cancel)?,
        Scheme::Dct => dct::embed_bits(cover, 0, &stream, &options.dct, &options.cancel)?,
        Scheme::Viv => return Err(StegoError::UnsupportedScheme("viv carries video payloads only".into())),
    }
    Ok(stream.len() as u64)
}

/// Recover a payload of kind `expected` from `cover`.
///
/// # Errors
/// - [`StegoError::InvalidOptions`] / [`StegoError::InvalidFrames`] for bad input.
/// - [`StegoError::UnsupportedScheme`] for a scheme/payload mismatch.
/// - [`StegoError::TruncatedStream`] if the cover ends before the declared
///   length (LSB, DCT).
/// - [`StegoError::InvalidHeader`] or [`StegoError::InsufficientCoverCapacity`]
///   for a missing or inconsistent VIV header.
/// - [`StegoError::Cancelled`] if the cancel flag fires.
pub fn decode(
    cover: &[Frame],
    scheme: Scheme,
    options: &StegoOptions,
    expected: PayloadKind,
) -> Result<ExtractResult, StegoError> {
    let mut stages = Stages::new("decode", scheme);
    let result = decode_inner(cover, scheme, options, expected, &mut stages);
    stages.finish(result)
}

fn decode_inner(
    cover: &[Frame],
    scheme: Scheme,
    options: &StegoOptions,
    expected: PayloadKind,
    stages: &mut Stages,
) -> Result<ExtractResult, StegoError> {
    options.validate()?;
    let info = VideoInfo::of(cover)?;
    check_pairing(scheme, expected)?;

    if scheme == Scheme::Viv {
        let header = viv::read_header(cover)?;
        stages.advance(Stage::HeaderRead);
        let keys = KeySchedule::from_password(options.password())?;
        stages.advance(Stage::Extracting);
        let recovered = viv::extract_with_header(cover, header, &keys, &options.cancel)?;
        let exact = recovered.is_exact();
        return Ok(ExtractResult { payload: Payload::Video(recovered.frames), exact });
    }

    let slots = match scheme {
        Scheme::Dct => capacity::dct_slots(&info),
        _ => capacity::lsb_slots(&info),
    };
    let extract = |start: u64, count: usize| match scheme {
        Scheme::Dct => dct::extract_bits(cover, start, count, &options.cancel),
        _ => lsb::extract_bits(cover, start, count, &options.cancel),
    };

    let header = extract(0, HEADER_BITS)?;
    let body_bits = bitstream::read_header(&header)? as u64;
    let needed = HEADER_BITS as u64 + body_bits;
    if needed > slots {
        return Err(StegoError::TruncatedStream { needed, available: slots });
    }
    debug!(scheme = %scheme, body_bits, "bitstream header read");
    stages.advance(Stage::HeaderRead);

    stages.advance(Stage::Extracting);
    let scattered = extract(HEADER_BITS as u64, body_bits as usize)?;
    let keys = KeySchedule::from_password(options.password())?;
    let mut body = permute::gather(&scattered, &keys.permutation(scattered.len()));
    keys.apply_mask(0, &mut body);

    let payload = match expected {
        PayloadKind::Bits => Payload::Bits(body),
        _ => Payload::Bytes(bitstream::bits_to_bytes(&body)),
    };
    Ok(ExtractResult { payload, exact: true })
}
