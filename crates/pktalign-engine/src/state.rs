/// Per-channel carry-over storage.
///
/// Holds, for each of the bus's channels, the last `tail_len` bytes of the
/// most recent word seen on that channel. Zero-initialized at construction;
/// each processing step performs exactly one read and one write against the
/// slot for the word's channel.
#[derive(Debug)]
pub struct TailStore {
    tails: Vec<u8>,
    tail_len: usize,
}

impl TailStore {
    /// Allocate a zeroed table of `channels` tails of `tail_len` bytes each.
    pub fn new(channels: usize, tail_len: usize) -> Self {
        Self {
            tails: vec![0; channels * tail_len],
            tail_len,
        }
    }

    /// Carried-over bytes for `channel`. Always exactly `tail_len` bytes.
    pub fn tail(&self, channel: u16) -> &[u8] {
        let start = usize::from(channel) * self.tail_len;
        &self.tails[start..start + self.tail_len]
    }

    /// Overwrite the tail for `channel`.
    ///
    /// `tail` must be exactly `tail_len` bytes.
    pub fn set_tail(&mut self, channel: u16, tail: &[u8]) {
        debug_assert_eq!(tail.len(), self.tail_len);
        let start = usize::from(channel) * self.tail_len;
        self.tails[start..start + self.tail_len].copy_from_slice(tail);
    }

    /// Length of each stored tail in bytes.
    pub fn tail_len(&self) -> usize {
        self.tail_len
    }
}
