use std::io::{ErrorKind, Read};

use crate::codec::{CodecConfig, Event, FrameCodec};
use crate::error::{FrameError, Result};
use crate::message::Message;

const READ_CHUNK_SIZE: usize = 256;

/// Reads frames from any `Read` stream, such as an opened serial port.
///
/// Handles partial reads internally; callers always get complete events.
pub struct FrameReader<T> {
    inner: T,
    codec: FrameCodec,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            codec: FrameCodec::new(config),
        }
    }

    /// Read the next event (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_event(&mut self) -> Result<Event> {
        loop {
            if let Some(event) = self.codec.next_event() {
                return Ok(event);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.codec.feed(&chunk[..read]);
        }
    }

    /// Read the next decoded message, skipping raw pass-through frames.
    ///
    /// A per-frame error is returned as `Err`; the reader stays usable.
    pub fn read_message(&mut self) -> Result<Message> {
        loop {
            match self.read_event()? {
                Event::Frame(message) => return Ok(message),
                Event::Raw(raw) => {
                    tracing::trace!(len = raw.len(), "skipping raw frame");
                }
                Event::Error(err) => return Err(err),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current codec configuration.
    pub fn config(&self) -> &CodecConfig {
        self.codec.config()
    }
}
