use pktalign_proto::{BusGeometry, PacketWord, ProtoError, ProtocolDescriptor};

use crate::error::{AlignError, Result};
use crate::locator::NextMsgLocator;
use crate::matcher::HeaderMatcher;
use crate::state::TailStore;

/// Per-word alignment metadata, indexed by byte offset `i` in `[0, W)`.
///
/// Indices `0 ..= W-H` describe header candidates starting at offset `i` of
/// the current word. Indices `W-H+1 .. W` describe candidates starting at
/// offset `i` of the *previous* word on the same channel: those starts
/// straddle the word boundary and only become decidable once this word
/// supplies the header's remaining bytes.
///
/// Every entry is speculative: `next_msg_*` is computed for all offsets,
/// matched or not, and a true `header_match` may still be payload bytes of
/// an earlier, still-open message. Disambiguation belongs downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketInfo {
    /// True where the masked header pattern matches at offset `i`.
    pub header_match: Vec<bool>,
    /// Whole words between the current word and the following message start.
    /// Negative when the boundary lies before the current word.
    pub next_msg_word_offset: Vec<i64>,
    /// Byte position of the following message start within its word.
    pub next_msg_byte_offset: Vec<usize>,
    /// True when the following message starts within the current word.
    pub next_msg_same_word: Vec<bool>,
}

impl PacketInfo {
    fn zeroed(word_bytes: usize) -> Self {
        Self {
            header_match: vec![false; word_bytes],
            next_msg_word_offset: vec![0; word_bytes],
            next_msg_byte_offset: vec![0; word_bytes],
            next_msg_same_word: vec![false; word_bytes],
        }
    }

    /// Offsets with a header candidate.
    pub fn match_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.header_match
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m)
            .map(|(i, _)| i)
    }

    /// Number of header candidates in this word.
    pub fn match_count(&self) -> usize {
        self.header_match.iter().filter(|&&m| m).count()
    }
}

/// A processed word with its alignment metadata.
#[derive(Debug, Clone)]
pub struct AlignedWord {
    /// The pass-through input word.
    pub word: PacketWord,
    /// The `H-1` carried-over bytes that preceded this word's payload,
    /// for downstream consumers that reassemble straddling headers.
    pub tail: Vec<u8>,
    /// Alignment metadata for this word.
    pub info: PacketInfo,
}

/// Streaming alignment stage: one word in, one word plus metadata out.
///
/// Holds the per-channel tail table and drives the header matcher and
/// next-message locator over the combined `tail ++ payload` window of each
/// valid word. Single steady state; words of the same channel must be fed
/// in arrival order. There is no failure path at steady state: every byte
/// value at every offset produces a defined match/no-match and a numeric
/// candidate position.
#[derive(Debug)]
pub struct Aligner {
    descriptor: ProtocolDescriptor,
    geometry: BusGeometry,
    matcher: HeaderMatcher,
    locator: NextMsgLocator,
    tails: TailStore,
    window: Vec<u8>,
}

impl Aligner {
    /// Build an engine for one protocol on one bus.
    ///
    /// Beyond the descriptor's own invariants this requires the bus word to
    /// be at least as wide as the header: the `H-1`-byte tail only covers
    /// headers that straddle a single word boundary.
    pub fn new(
        descriptor: ProtocolDescriptor,
        geometry: BusGeometry,
    ) -> std::result::Result<Self, ProtoError> {
        if geometry.word_bytes() < descriptor.header_len() {
            return Err(ProtoError::WordTooNarrow {
                word_bytes: geometry.word_bytes(),
                header_len: descriptor.header_len(),
            });
        }

        tracing::debug!(
            header_len = descriptor.header_len(),
            len_start = descriptor.len_start(),
            word_bytes = geometry.word_bytes(),
            channels = geometry.channel_count(),
            "aligner constructed"
        );

        let matcher = HeaderMatcher::new(&descriptor);
        let locator = NextMsgLocator::new(&descriptor);
        let tails = TailStore::new(geometry.channel_count(), descriptor.tail_len());
        let window = Vec::with_capacity(descriptor.tail_len() + geometry.word_bytes());

        Ok(Self {
            descriptor,
            geometry,
            matcher,
            locator,
            tails,
            window,
        })
    }

    /// The protocol this engine aligns against.
    pub fn descriptor(&self) -> &ProtocolDescriptor {
        &self.descriptor
    }

    /// The bus this engine is sized for.
    pub fn geometry(&self) -> &BusGeometry {
        &self.geometry
    }

    /// Process one bus step.
    ///
    /// An invalid step (`None`) emits nothing and leaves all channel tails
    /// untouched: an absent word carries no new bytes. A valid word yields
    /// exactly one [`AlignedWord`] and commits the word's last `H-1` bytes
    /// as the channel's new tail.
    pub fn step(&mut self, word: Option<PacketWord>) -> Result<Option<AlignedWord>> {
        let Some(word) = word else {
            return Ok(None);
        };

        let width = self.geometry.word_bytes();
        if word.payload.len() != width {
            return Err(AlignError::WordWidth {
                got: word.payload.len(),
                expected: width,
            });
        }
        if !self.geometry.contains_channel(word.channel) {
            return Err(AlignError::Channel {
                channel: word.channel,
                channels: self.geometry.channel_count(),
            });
        }

        let tail_len = self.descriptor.tail_len();
        let tail = self.tails.tail(word.channel).to_vec();

        self.window.clear();
        self.window.extend_from_slice(&tail);
        self.window.extend_from_slice(&word.payload);

        let mut info = PacketInfo::zeroed(width);
        for k in 0..width {
            // Window offset k starts tail_len bytes before the payload;
            // report it at the payload-relative offset of its own word.
            let i = (k + width - tail_len) % width;
            info.header_match[i] = self.matcher.matches_at(&self.window, k);
            let cand = self.locator.locate_at(&self.window, k, width);
            info.next_msg_word_offset[i] = cand.word_offset;
            info.next_msg_byte_offset[i] = cand.byte_offset;
            info.next_msg_same_word[i] = cand.same_word;
        }

        self.tails
            .set_tail(word.channel, &word.payload[width - tail_len..]);

        tracing::trace!(
            channel = word.channel,
            matches = info.match_count(),
            "word aligned"
        );

        Ok(Some(AlignedWord { word, tail, info }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktalign_proto::PacketWord;

    fn descriptor() -> ProtocolDescriptor {
        ProtocolDescriptor::new(
            6,
            6,
            3,
            vec![true, true, true, false, false, false],
            vec![0x45, 0x32, 0x11, 0xAA, 0xCC, 0x00],
        )
        .unwrap()
    }

    fn aligner() -> Aligner {
        Aligner::new(descriptor(), BusGeometry::new(16, 2).unwrap()).unwrap()
    }

    #[test]
    fn header_at_word_start() {
        // H=6, L=3, W=16: length field value 9 at payload offset 0.
        let mut engine = aligner();
        let mut payload = vec![0u8; 16];
        payload[..6].copy_from_slice(&[0x45, 0x32, 0x11, 0x00, 0x00, 0x09]);

        let out = engine
            .step(Some(PacketWord::new(0, payload)))
            .unwrap()
            .unwrap();

        assert!(out.info.header_match[0]);
        assert_eq!(out.info.next_msg_word_offset[0], 0);
        assert_eq!(out.info.next_msg_byte_offset[0], 9);
        assert!(out.info.next_msg_same_word[0]);
    }

    #[test]
    fn no_match_window_still_computes_lookahead() {
        let mut engine = aligner();
        let out = engine
            .step(Some(PacketWord::new(1, vec![0x7Fu8; 16])))
            .unwrap()
            .unwrap();

        assert!(out.info.header_match.iter().all(|&m| !m));
        assert_eq!(out.info.next_msg_word_offset.len(), 16);
        assert_eq!(out.info.next_msg_byte_offset.len(), 16);
        // Lookahead is data-independent: every offset has a candidate.
        assert!(out.info.next_msg_byte_offset.iter().all(|&b| b < 16));
    }

    #[test]
    fn invalid_step_emits_nothing_and_keeps_tails() {
        let mut engine = aligner();

        // Seed channel 0's tail with the first five bytes of a header.
        let mut first = vec![0u8; 16];
        first[11..16].copy_from_slice(&[0x45, 0x32, 0x11, 0x00, 0x00]);
        engine.step(Some(PacketWord::new(0, first))).unwrap();

        assert!(engine.step(None).unwrap().is_none());

        // The straddling header still completes on the next valid word.
        let mut second = vec![0u8; 16];
        second[0] = 0x04; // final length byte: header started 5 bytes back
        let out = engine
            .step(Some(PacketWord::new(0, second)))
            .unwrap()
            .unwrap();
        assert!(out.info.header_match[11]);
    }

    #[test]
    fn emitted_tail_is_previous_word_suffix() {
        let mut engine = aligner();
        let payload: Vec<u8> = (0u8..16).collect();
        engine
            .step(Some(PacketWord::new(2, payload.clone())))
            .unwrap();

        let out = engine
            .step(Some(PacketWord::new(2, vec![0u8; 16])))
            .unwrap()
            .unwrap();
        assert_eq!(out.tail, &payload[11..]);
    }

    #[test]
    fn rejects_wrong_word_width() {
        let mut engine = aligner();
        let err = engine
            .step(Some(PacketWord::new(0, vec![0u8; 8])))
            .unwrap_err();
        assert!(matches!(err, AlignError::WordWidth { got: 8, expected: 16 }));
    }

    #[test]
    fn rejects_out_of_range_channel() {
        let mut engine = aligner();
        let err = engine
            .step(Some(PacketWord::new(4, vec![0u8; 16])))
            .unwrap_err();
        assert!(matches!(err, AlignError::Channel { channel: 4, .. }));
    }

    #[test]
    fn rejects_word_narrower_than_header() {
        let err = Aligner::new(descriptor(), BusGeometry::new(4, 2).unwrap()).unwrap_err();
        assert!(matches!(err, ProtoError::WordTooNarrow { .. }));
    }

    #[test]
    fn shadowed_candidate_is_still_reported() {
        // A header-like byte run inside an open message's payload is a
        // candidate like any other; the engine never suppresses it.
        let mut engine = aligner();
        let mut payload = vec![0u8; 16];
        // Real header at offset 0 opening a 14-byte message...
        payload[..6].copy_from_slice(&[0x45, 0x32, 0x11, 0x00, 0x00, 0x0E]);
        // ...and pattern bytes sitting inside that message's payload.
        payload[8..11].copy_from_slice(&[0x45, 0x32, 0x11]);

        let out = engine
            .step(Some(PacketWord::new(0, payload)))
            .unwrap()
            .unwrap();
        assert!(out.info.header_match[0]);
        assert!(out.info.header_match[8]);
    }
}
