use std::io::{ErrorKind, Write};
use std::sync::Arc;

use crate::builder::FrameBuilder;
use crate::codec::CodecConfig;
use crate::error::{FrameError, Result};
use crate::frame_id::FrameIdAllocator;
use crate::message::Message;

/// Writes encoded frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    builder: FrameBuilder,
    config: CodecConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            builder: FrameBuilder::new(&config),
            config,
        }
    }

    /// Create a frame writer that draws frame ids from a shared allocator.
    pub fn with_allocator(inner: T, config: CodecConfig, ids: Arc<FrameIdAllocator>) -> Self {
        Self {
            inner,
            builder: FrameBuilder::with_allocator(&config, ids),
            config,
        }
    }

    /// Encode and send one message (blocking), then flush.
    pub fn send(&mut self, message: &Message) -> Result<()> {
        let frame = self.builder.build(message)?;
        self.write_raw(&frame)
    }

    /// Write an already-encoded frame (blocking), then flush.
    pub fn write_raw(&mut self, frame: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < frame.len() {
            match self.inner.write(&frame[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Reserve the next frame id for a request the caller will build.
    pub fn next_frame_id(&self) -> u8 {
        self.builder.next_frame_id()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}
