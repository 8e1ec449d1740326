use bytes::{Buf, BufMut, BytesMut};
use pktalign_proto::{BusGeometry, PacketWord};

use crate::error::{CaptureError, Result};

/// Preamble magic: "PKTA".
pub const MAGIC: [u8; 4] = [0x50, 0x4B, 0x54, 0x41];

/// Capture format version written and accepted by this crate.
pub const VERSION: u8 = 1;

/// Preamble size: magic (4) + version (1) + word width (1) + channel bits (1).
pub const PREAMBLE_SIZE: usize = 7;

/// Record header size: marker (1) + flags (1) + channel (2) + valid bytes (1).
pub const RECORD_HEADER_SIZE: usize = 5;

const MARKER_WORD: u8 = 0x57; // 'W'
const MARKER_IDLE: u8 = 0x49; // 'I'

const FLAG_SOP: u8 = 0b01;
const FLAG_EOP: u8 = 0b10;

/// One bus step in a capture stream: a valid word, or an idle step where
/// the bus carried nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Word(PacketWord),
    Idle,
}

impl Step {
    /// The word for a valid step, or `None` for idle.
    pub fn word(self) -> Option<PacketWord> {
        match self {
            Step::Word(word) => Some(word),
            Step::Idle => None,
        }
    }
}

/// Encode the stream preamble.
///
/// Written exactly once, at the head of a capture stream:
/// ```text
/// ┌────────────┬─────────┬────────────┬──────────────┐
/// │ Magic (4B) │ Version │ Word width │ Channel bits │
/// │ "PKTA"     │ (1B)    │ (1B)       │ (1B)         │
/// └────────────┴─────────┴────────────┴──────────────┘
/// ```
pub fn encode_preamble(geometry: &BusGeometry, dst: &mut BytesMut) {
    dst.reserve(PREAMBLE_SIZE);
    dst.put_slice(&MAGIC);
    dst.put_u8(VERSION);
    dst.put_u8(geometry.word_bytes() as u8);
    dst.put_u8(geometry.channel_bits());
}

/// Decode the stream preamble.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete preamble yet.
/// On success, consumes the preamble and returns the validated geometry.
pub fn decode_preamble(src: &mut BytesMut) -> Result<Option<BusGeometry>> {
    if src.len() < PREAMBLE_SIZE {
        return Ok(None);
    }

    if src[0..4] != MAGIC {
        return Err(CaptureError::InvalidMagic);
    }
    let version = src[4];
    if version != VERSION {
        return Err(CaptureError::UnsupportedVersion {
            got: version,
            supported: VERSION,
        });
    }

    let word_bytes = usize::from(src[5]);
    let channel_bits = src[6];
    src.advance(PREAMBLE_SIZE);

    Ok(Some(BusGeometry::new(word_bytes, channel_bits)?))
}

/// Encode one bus step.
///
/// Word records carry marker / flags / channel / valid-byte count followed
/// by the fixed-width payload; idle records are a lone marker byte.
pub fn encode_step(geometry: &BusGeometry, step: &Step, dst: &mut BytesMut) -> Result<()> {
    match step {
        Step::Idle => {
            dst.put_u8(MARKER_IDLE);
        }
        Step::Word(word) => {
            if word.payload.len() != geometry.word_bytes() {
                return Err(CaptureError::WordWidth {
                    got: word.payload.len(),
                    expected: geometry.word_bytes(),
                });
            }
            let mut flags = 0u8;
            if word.sop {
                flags |= FLAG_SOP;
            }
            if word.eop {
                flags |= FLAG_EOP;
            }
            dst.reserve(RECORD_HEADER_SIZE + word.payload.len());
            dst.put_u8(MARKER_WORD);
            dst.put_u8(flags);
            dst.put_u16_le(word.channel);
            dst.put_u8(word.valid_bytes);
            dst.put_slice(&word.payload);
        }
    }
    Ok(())
}

/// Decode one bus step.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete record yet.
/// On success, consumes the record bytes from the buffer.
pub fn decode_step(src: &mut BytesMut, geometry: &BusGeometry) -> Result<Option<Step>> {
    let Some(&marker) = src.first() else {
        return Ok(None);
    };

    match marker {
        MARKER_IDLE => {
            src.advance(1);
            Ok(Some(Step::Idle))
        }
        MARKER_WORD => {
            let total = RECORD_HEADER_SIZE + geometry.word_bytes();
            if src.len() < total {
                return Ok(None);
            }
            let flags = src[1];
            let channel = u16::from_le_bytes([src[2], src[3]]);
            let valid_bytes = src[4];
            src.advance(RECORD_HEADER_SIZE);
            let payload = src.split_to(geometry.word_bytes()).freeze();

            Ok(Some(Step::Word(PacketWord {
                channel,
                payload,
                sop: flags & FLAG_SOP != 0,
                eop: flags & FLAG_EOP != 0,
                valid_bytes,
            })))
        }
        got => Err(CaptureError::InvalidRecordMarker { got }),
    }
}
