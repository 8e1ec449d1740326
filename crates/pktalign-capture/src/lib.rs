//! Bus-word capture stream serialization.
//!
//! A capture stream is how pktalign's collaborators exchange word traffic:
//! a one-time preamble carrying the bus geometry, followed by one record
//! per bus step, either a fixed-width word record or a one-byte idle
//! marker.
//! [`WordReader`] and [`WordWriter`] wrap any `Read`/`Write` so captures
//! move over files and pipes alike, with partial I/O handled internally.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_preamble, decode_step, encode_preamble, encode_step, Step, MAGIC, PREAMBLE_SIZE,
    RECORD_HEADER_SIZE, VERSION,
};
pub use error::{CaptureError, Result};
pub use reader::WordReader;
pub use writer::WordWriter;
