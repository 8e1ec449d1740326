use pktalign_proto::ProtoError;

/// Errors that can occur while encoding or decoding a capture stream.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The stream does not start with the `PKTA` preamble magic.
    #[error("invalid capture preamble magic")]
    InvalidMagic,

    /// The capture format version is not supported.
    #[error("unsupported capture version {got} (supported: {supported})")]
    UnsupportedVersion { got: u8, supported: u8 },

    /// A record starts with an unknown record marker.
    #[error("invalid record marker 0x{got:02X}")]
    InvalidRecordMarker { got: u8 },

    /// A word payload does not match the stream's bus word width.
    #[error("word payload is {got} bytes, stream word width is {expected}")]
    WordWidth { got: usize, expected: usize },

    /// The stream ended in the middle of a preamble or record.
    #[error("capture stream truncated mid-record")]
    Truncated,

    /// The preamble carries an invalid bus geometry.
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// An I/O error occurred while reading or writing the stream.
    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
