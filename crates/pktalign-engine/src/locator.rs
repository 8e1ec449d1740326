use pktalign_proto::ProtocolDescriptor;

/// Decomposed position where the message following a candidate header
/// would begin, relative to the first payload byte of the current word.
///
/// `word_offset` is signed: a message wholly contained in the carried-over
/// tail lands before the current word. `byte_offset` is always in
/// `[0, word_bytes)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub word_offset: i64,
    pub byte_offset: usize,
    pub same_word: bool,
}

/// Per-offset length-field decode and boundary-position arithmetic.
///
/// Evaluated unconditionally for every candidate offset, independent of
/// whether the offset actually matched: the result is speculative and only
/// meaningful to a consumer that also tracks which offset is the true
/// message start.
#[derive(Debug, Clone)]
pub struct NextMsgLocator {
    len_start: usize,
    header_len: usize,
    tail_len: usize,
}

impl NextMsgLocator {
    pub fn new(descriptor: &ProtocolDescriptor) -> Self {
        Self {
            len_start: descriptor.len_start(),
            header_len: descriptor.header_len(),
            tail_len: descriptor.tail_len(),
        }
    }

    /// Locate the boundary for a header starting at `offset` of `window`.
    ///
    /// `window` is the combined `tail ++ payload` window and must hold a
    /// full header at `offset`. Total over all byte values: a zero or
    /// absurdly large length still yields a well-defined position.
    pub fn locate_at(&self, window: &[u8], offset: usize, word_bytes: usize) -> Candidate {
        let len = window[offset + self.len_start..offset + self.header_len]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

        // Shift into payload coordinates: window offset 0 is tail_len bytes
        // before the first payload byte of the current word.
        let rel = offset as i128 - self.tail_len as i128 + len as i128;
        let width = word_bytes as i128;
        let word_offset = rel.div_euclid(width);
        let byte_offset = rel.rem_euclid(width) as usize;

        Candidate {
            // An 8-byte length field divided by a 1-byte bus can exceed i64;
            // saturate rather than wrap.
            word_offset: word_offset.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            byte_offset,
            same_word: word_offset == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ProtocolDescriptor {
        // H=6, L=3: three pattern bytes, three length bytes.
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
    fn same_word_boundary() {
        let locator = NextMsgLocator::new(&descriptor());
        // Header at window offset 5 (= payload offset 0), length 9.
        let mut window = vec![0u8; 21];
        window[5..11].copy_from_slice(&[0x45, 0x32, 0x11, 0x00, 0x00, 0x09]);

        let cand = locator.locate_at(&window, 5, 16);
        assert_eq!(cand.word_offset, 0);
        assert_eq!(cand.byte_offset, 9);
        assert!(cand.same_word);
    }

    #[test]
    fn crosses_into_later_word() {
        let locator = NextMsgLocator::new(&descriptor());
        let mut window = vec![0u8; 21];
        // Length 40 from payload offset 3: lands at byte 43 = word 2, byte 11.
        window[8..14].copy_from_slice(&[0x45, 0x32, 0x11, 0x00, 0x00, 40]);

        let cand = locator.locate_at(&window, 8, 16);
        assert_eq!(cand.word_offset, 2);
        assert_eq!(cand.byte_offset, 11);
        assert!(!cand.same_word);
    }

    #[test]
    fn zero_length_in_tail_lands_before_current_word() {
        let locator = NextMsgLocator::new(&descriptor());
        // Header starting at window offset 0 (five bytes into the previous
        // word) with length 0: the boundary is 5 bytes before this word.
        let window = vec![0u8; 21];
        let cand = locator.locate_at(&window, 0, 16);
        assert_eq!(cand.word_offset, -1);
        assert_eq!(cand.byte_offset, 11);
        assert!(!cand.same_word);
    }

    #[test]
    fn huge_length_stays_well_defined() {
        let locator = NextMsgLocator::new(&descriptor());
        let mut window = vec![0u8; 21];
        window[5..11].copy_from_slice(&[0x45, 0x32, 0x11, 0xFF, 0xFF, 0xFF]);

        let cand = locator.locate_at(&window, 5, 1);
        assert!(cand.word_offset > 0);
        assert_eq!(cand.byte_offset, 0);
    }
}
