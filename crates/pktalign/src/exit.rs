use std::fmt;
use std::io;

use pktalign_capture::CaptureError;
use pktalign_engine::AlignError;
use pktalign_proto::ProtoError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn capture_error(context: &str, err: CaptureError) -> CliError {
    match err {
        CaptureError::Io(source) => io_error(context, source),
        CaptureError::Proto(err) => proto_error(context, err),
        CaptureError::InvalidMagic
        | CaptureError::UnsupportedVersion { .. }
        | CaptureError::InvalidRecordMarker { .. }
        | CaptureError::WordWidth { .. }
        | CaptureError::Truncated => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn align_error(context: &str, err: AlignError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}
