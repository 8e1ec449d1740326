use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};

/// Widest length field we decode, in bytes. Lengths decode into a `u64`.
pub const MAX_LEN_FIELD: usize = 8;

/// Static description of a length-prefixed framing protocol.
///
/// A header is `header_len` bytes and carries its own length field in the
/// trailing `header_len - len_start` bytes, interpreted as an unsigned
/// big-endian integer counting from the first header byte. Bytes before the
/// length field may be pattern-matched: where `mask` is true, the byte must
/// equal the corresponding `pattern` entry for an offset to be a header
/// candidate.
///
/// Validated once at construction and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor", into = "RawDescriptor")]
pub struct ProtocolDescriptor {
    header_len: usize,
    min_msg_len: usize,
    len_start: usize,
    mask: Vec<bool>,
    pattern: Vec<u8>,
}

impl ProtocolDescriptor {
    /// Create a validated descriptor.
    ///
    /// Fails when the mask/pattern arrays are not exactly `header_len`
    /// entries, the length field falls outside the header or is wider than
    /// [`MAX_LEN_FIELD`], the minimum message length is shorter than the
    /// header, a length-field byte is masked for matching, or no byte is
    /// masked at all.
    pub fn new(
        header_len: usize,
        min_msg_len: usize,
        len_start: usize,
        mask: Vec<bool>,
        pattern: Vec<u8>,
    ) -> Result<Self> {
        if header_len == 0 {
            return Err(ProtoError::EmptyHeader);
        }
        if mask.len() != header_len {
            return Err(ProtoError::MaskLength {
                got: mask.len(),
                expected: header_len,
            });
        }
        if pattern.len() != header_len {
            return Err(ProtoError::PatternLength {
                got: pattern.len(),
                expected: header_len,
            });
        }
        if len_start > header_len {
            return Err(ProtoError::LenStartOutOfRange {
                len_start,
                header_len,
            });
        }
        if header_len - len_start > MAX_LEN_FIELD {
            return Err(ProtoError::LenFieldTooWide {
                got: header_len - len_start,
                max: MAX_LEN_FIELD,
            });
        }
        if min_msg_len < header_len {
            return Err(ProtoError::MinMessageTooShort {
                min_msg_len,
                header_len,
            });
        }
        if let Some(index) = mask[len_start..].iter().position(|&m| m) {
            return Err(ProtoError::MaskedLengthByte {
                index: len_start + index,
                len_start,
            });
        }
        if !mask.iter().any(|&m| m) {
            return Err(ProtoError::NoMaskedBytes);
        }

        Ok(Self {
            header_len,
            min_msg_len,
            len_start,
            mask,
            pattern,
        })
    }

    /// Total header length in bytes, length field included.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Minimum message length in bytes. Never shorter than the header.
    pub fn min_msg_len(&self) -> usize {
        self.min_msg_len
    }

    /// Byte offset within the header where the length field starts.
    pub fn len_start(&self) -> usize {
        self.len_start
    }

    /// Width of the length field in bytes.
    pub fn len_field_len(&self) -> usize {
        self.header_len - self.len_start
    }

    /// Number of bytes a header can leave unconsumed across a word
    /// boundary: one less than the header length.
    pub fn tail_len(&self) -> usize {
        self.header_len - 1
    }

    /// Per-byte match mask. True entries must equal the pattern.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Expected header byte values, meaningful where the mask is true.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Decode the length field of a header starting at `header[0]`.
    ///
    /// `header` must be at least `header_len` bytes.
    pub fn decode_len(&self, header: &[u8]) -> u64 {
        header[self.len_start..self.header_len]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }
}

/// Unvalidated mirror of [`ProtocolDescriptor`] used for serde.
#[derive(Clone, Serialize, Deserialize)]
struct RawDescriptor {
    header_len: usize,
    min_msg_len: usize,
    len_start: usize,
    mask: Vec<bool>,
    pattern: Vec<u8>,
}

impl TryFrom<RawDescriptor> for ProtocolDescriptor {
    type Error = ProtoError;

    fn try_from(raw: RawDescriptor) -> Result<Self> {
        Self::new(
            raw.header_len,
            raw.min_msg_len,
            raw.len_start,
            raw.mask,
            raw.pattern,
        )
    }
}

impl From<ProtocolDescriptor> for RawDescriptor {
    fn from(desc: ProtocolDescriptor) -> Self {
        Self {
            header_len: desc.header_len,
            min_msg_len: desc.min_msg_len,
            len_start: desc.len_start,
            mask: desc.mask,
            pattern: desc.pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProtocolDescriptor {
        ProtocolDescriptor::new(
            6,
            6,
            3,
            vec![true, true, true, false, false, false],
            vec![0x45, 0x32, 0x11, 0x00, 0x00, 0x00],
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_descriptor() {
        let desc = valid();
        assert_eq!(desc.header_len(), 6);
        assert_eq!(desc.len_start(), 3);
        assert_eq!(desc.len_field_len(), 3);
        assert_eq!(desc.tail_len(), 5);
    }

    #[test]
    fn rejects_wrong_mask_length() {
        let err = ProtocolDescriptor::new(4, 4, 2, vec![true, true], vec![0; 4]).unwrap_err();
        assert!(matches!(err, ProtoError::MaskLength { got: 2, .. }));
    }

    #[test]
    fn rejects_wrong_pattern_length() {
        let err =
            ProtocolDescriptor::new(4, 4, 2, vec![true, true, false, false], vec![0; 3]).unwrap_err();
        assert!(matches!(err, ProtoError::PatternLength { got: 3, .. }));
    }

    #[test]
    fn rejects_len_start_past_header() {
        let err =
            ProtocolDescriptor::new(4, 4, 5, vec![true, true, false, false], vec![0; 4]).unwrap_err();
        assert!(matches!(err, ProtoError::LenStartOutOfRange { .. }));
    }

    #[test]
    fn rejects_min_msg_shorter_than_header() {
        let err =
            ProtocolDescriptor::new(4, 3, 2, vec![true, true, false, false], vec![0; 4]).unwrap_err();
        assert!(matches!(err, ProtoError::MinMessageTooShort { .. }));
    }

    #[test]
    fn rejects_masked_length_byte() {
        let err =
            ProtocolDescriptor::new(4, 4, 2, vec![true, false, true, false], vec![0; 4]).unwrap_err();
        assert!(matches!(err, ProtoError::MaskedLengthByte { index: 2, .. }));
    }

    #[test]
    fn rejects_all_false_mask() {
        let err = ProtocolDescriptor::new(4, 4, 2, vec![false; 4], vec![0; 4]).unwrap_err();
        assert!(matches!(err, ProtoError::NoMaskedBytes));
    }

    #[test]
    fn rejects_over_wide_length_field() {
        let mut mask = vec![false; 10];
        mask[0] = true;
        let err = ProtocolDescriptor::new(10, 10, 1, mask, vec![0; 10]).unwrap_err();
        assert!(matches!(err, ProtoError::LenFieldTooWide { got: 9, .. }));
    }

    #[test]
    fn decodes_big_endian_length() {
        let desc = valid();
        let header = [0x45, 0x32, 0x11, 0x00, 0x01, 0x02];
        assert_eq!(desc.decode_len(&header), 0x0102);
    }

    #[test]
    fn json_round_trip() {
        let desc = valid();
        let json = serde_json::to_string(&desc).unwrap();
        let back: ProtocolDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn json_rejects_invalid_descriptor() {
        let json = r#"{
            "header_len": 4,
            "min_msg_len": 2,
            "len_start": 2,
            "mask": [true, true, false, false],
            "pattern": [1, 2, 0, 0]
        }"#;
        assert!(serde_json::from_str::<ProtocolDescriptor>(json).is_err());
    }
}
