/// Errors raised while validating a protocol descriptor or bus geometry.
///
/// All variants are construction-time failures; once a descriptor or
/// geometry exists it is structurally valid for the life of the process.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The header mask array does not have exactly `header_len` entries.
    #[error("header mask has {got} entries, expected {expected}")]
    MaskLength { got: usize, expected: usize },

    /// The header pattern array does not have exactly `header_len` entries.
    #[error("header pattern has {got} entries, expected {expected}")]
    PatternLength { got: usize, expected: usize },

    /// The header length is zero.
    #[error("header length must be at least 1 byte")]
    EmptyHeader,

    /// The length field starts past the end of the header.
    #[error("length field start {len_start} exceeds header length {header_len}")]
    LenStartOutOfRange { len_start: usize, header_len: usize },

    /// The length field spans more bytes than fit an unsigned 64-bit value.
    #[error("length field spans {got} bytes, max {max}")]
    LenFieldTooWide { got: usize, max: usize },

    /// The minimum message length is shorter than the header itself.
    #[error("minimum message length {min_msg_len} is shorter than header length {header_len}")]
    MinMessageTooShort {
        min_msg_len: usize,
        header_len: usize,
    },

    /// A length-field byte is marked for pattern matching. Length bytes vary
    /// per message and can never be matched against a fixed pattern.
    #[error("mask is set at byte {index}, inside the length field (starts at {len_start})")]
    MaskedLengthByte { index: usize, len_start: usize },

    /// No header byte is marked for pattern matching, which would make every
    /// offset a vacuous match.
    #[error("header mask selects no bytes")]
    NoMaskedBytes,

    /// The bus word width is outside the supported range.
    #[error("bus word width {got} bytes is outside 1..={max}")]
    WordWidth { got: usize, max: usize },

    /// The channel-id bit width is outside the supported range.
    #[error("channel bit width {got} is outside 1..={max}")]
    ChannelBits { got: u8, max: u8 },

    /// The bus word is too narrow to cover single-boundary header straddles.
    #[error("bus word width {word_bytes} is narrower than header length {header_len}")]
    WordTooNarrow {
        word_bytes: usize,
        header_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, ProtoError>;
