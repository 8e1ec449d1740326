use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use pktalign_proto::BusGeometry;

use crate::codec::{decode_preamble, decode_step, Step};
use crate::error::{CaptureError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete bus steps from any `Read` stream.
///
/// Decodes the preamble on first use and handles partial reads internally;
/// callers always get whole records. A clean end of stream at a record
/// boundary yields `Ok(None)`; EOF inside a record is an error.
pub struct WordReader<R> {
    inner: R,
    buf: BytesMut,
    geometry: Option<BusGeometry>,
}

impl<R: Read> WordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            geometry: None,
        }
    }

    /// The stream's bus geometry, reading the preamble if necessary.
    pub fn geometry(&mut self) -> Result<BusGeometry> {
        if let Some(geometry) = self.geometry {
            return Ok(geometry);
        }
        loop {
            if let Some(geometry) = decode_preamble(&mut self.buf)? {
                tracing::debug!(
                    word_bytes = geometry.word_bytes(),
                    channel_bits = geometry.channel_bits(),
                    "capture preamble decoded"
                );
                self.geometry = Some(geometry);
                return Ok(geometry);
            }
            if self.fill()? == 0 {
                return Err(CaptureError::Truncated);
            }
        }
    }

    /// Read the next bus step (blocking).
    ///
    /// Returns `Ok(None)` when the stream ends cleanly at a record boundary.
    pub fn read_step(&mut self) -> Result<Option<Step>> {
        let geometry = self.geometry()?;
        loop {
            if let Some(step) = decode_step(&mut self.buf, &geometry)? {
                return Ok(Some(step));
            }

            if self.fill()? == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(CaptureError::Truncated);
            }
        }
    }

    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CaptureError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
