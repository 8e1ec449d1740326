use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use pktalign_proto::{BusGeometry, PacketWord};

use crate::codec::{encode_preamble, encode_step, Step};
use crate::error::{CaptureError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes bus steps to any `Write` stream.
///
/// Emits the preamble ahead of the first record and flushes whole records,
/// retrying interrupted and would-block writes.
pub struct WordWriter<W> {
    inner: W,
    buf: BytesMut,
    geometry: BusGeometry,
    preamble_written: bool,
}

impl<W: Write> WordWriter<W> {
    pub fn new(inner: W, geometry: BusGeometry) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            geometry,
            preamble_written: false,
        }
    }

    /// The geometry stamped into this stream's preamble.
    pub fn geometry(&self) -> &BusGeometry {
        &self.geometry
    }

    /// Write one bus step (blocking).
    pub fn write_step(&mut self, step: &Step) -> Result<()> {
        self.buf.clear();
        if !self.preamble_written {
            encode_preamble(&self.geometry, &mut self.buf);
        }
        encode_step(&self.geometry, step, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(CaptureError::Truncated),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(CaptureError::Io(err)),
            }
        }
        self.preamble_written = true;

        self.flush()
    }

    /// Write one valid word.
    pub fn write_word(&mut self, word: PacketWord) -> Result<()> {
        self.write_step(&Step::Word(word))
    }

    /// Write one idle step.
    pub fn write_idle(&mut self) -> Result<()> {
        self.write_step(&Step::Idle)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(CaptureError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
