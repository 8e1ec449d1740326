/// Contract violations at the engine boundary.
///
/// Neither variant can occur at steady state for words produced by a
/// conforming source: matching and lookahead are total over all byte
/// values, so no "header not found" error exists.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// The word payload is not exactly the bus word width.
    #[error("word payload is {got} bytes, bus width is {expected}")]
    WordWidth { got: usize, expected: usize },

    /// The word carries a channel id outside the configured channel space.
    #[error("channel {channel} is outside the {channels}-channel bus")]
    Channel { channel: u16, channels: usize },
}

pub type Result<T> = std::result::Result<T, AlignError>;
