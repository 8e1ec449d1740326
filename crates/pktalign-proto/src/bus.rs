use bytes::Bytes;

use crate::error::{ProtoError, Result};

/// Widest supported bus word, in bytes. Byte counts fit a `u8`.
pub const MAX_WORD_BYTES: usize = 255;

/// Widest supported channel-id field, in bits.
pub const MAX_CHANNEL_BITS: u8 = 16;

/// Physical geometry of the shared word bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusGeometry {
    word_bytes: usize,
    channel_bits: u8,
}

impl BusGeometry {
    /// Create a validated geometry: a word width in `1..=255` bytes and a
    /// channel-id width in `1..=16` bits.
    pub fn new(word_bytes: usize, channel_bits: u8) -> Result<Self> {
        if word_bytes == 0 || word_bytes > MAX_WORD_BYTES {
            return Err(ProtoError::WordWidth {
                got: word_bytes,
                max: MAX_WORD_BYTES,
            });
        }
        if channel_bits == 0 || channel_bits > MAX_CHANNEL_BITS {
            return Err(ProtoError::ChannelBits {
                got: channel_bits,
                max: MAX_CHANNEL_BITS,
            });
        }
        Ok(Self {
            word_bytes,
            channel_bits,
        })
    }

    /// Bus word width in bytes.
    pub fn word_bytes(&self) -> usize {
        self.word_bytes
    }

    /// Channel-id field width in bits.
    pub fn channel_bits(&self) -> u8 {
        self.channel_bits
    }

    /// Number of logical channels: 2^channel_bits.
    pub fn channel_count(&self) -> usize {
        1usize << self.channel_bits
    }

    /// Returns true if `channel` is addressable on this bus.
    pub fn contains_channel(&self, channel: u16) -> bool {
        usize::from(channel) < self.channel_count()
    }
}

/// One fixed-width data word on the multiplexed bus.
///
/// `valid_bytes` is meaningful only when `eop` is set; it counts payload
/// bytes that belong to the frame ending in this word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketWord {
    /// Logical channel this word belongs to.
    pub channel: u16,
    /// Payload bytes; always exactly the bus word width.
    pub payload: Bytes,
    /// This word starts a frame.
    pub sop: bool,
    /// This word ends a frame.
    pub eop: bool,
    /// Count of meaningful payload bytes when `eop` is set.
    pub valid_bytes: u8,
}

impl PacketWord {
    /// Create a plain data word (no frame boundary flags).
    pub fn new(channel: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            channel,
            payload: payload.into(),
            sop: false,
            eop: false,
            valid_bytes: 0,
        }
    }

    /// Mark this word as the start of a frame.
    pub fn with_sop(mut self) -> Self {
        self.sop = true;
        self
    }

    /// Mark this word as the end of a frame with `valid_bytes` meaningful
    /// payload bytes.
    pub fn with_eop(mut self, valid_bytes: u8) -> Self {
        self.eop = true;
        self.valid_bytes = valid_bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_basics() {
        let geo = BusGeometry::new(16, 4).unwrap();
        assert_eq!(geo.word_bytes(), 16);
        assert_eq!(geo.channel_count(), 16);
        assert!(geo.contains_channel(15));
        assert!(!geo.contains_channel(16));
    }

    #[test]
    fn rejects_zero_width_word() {
        assert!(matches!(
            BusGeometry::new(0, 4),
            Err(ProtoError::WordWidth { got: 0, .. })
        ));
    }

    #[test]
    fn rejects_over_wide_word() {
        assert!(matches!(
            BusGeometry::new(256, 4),
            Err(ProtoError::WordWidth { got: 256, .. })
        ));
    }

    #[test]
    fn rejects_bad_channel_bits() {
        assert!(matches!(
            BusGeometry::new(16, 0),
            Err(ProtoError::ChannelBits { got: 0, .. })
        ));
        assert!(matches!(
            BusGeometry::new(16, 17),
            Err(ProtoError::ChannelBits { got: 17, .. })
        ));
    }

    #[test]
    fn word_builders() {
        let word = PacketWord::new(3, vec![0u8; 16]).with_sop().with_eop(9);
        assert!(word.sop);
        assert!(word.eop);
        assert_eq!(word.valid_bytes, 9);
        assert_eq!(word.payload.len(), 16);
    }
}
