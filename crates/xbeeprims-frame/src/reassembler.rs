//! Byte-at-a-time frame reassembly.
//!
//! The reassembler scans an unbounded byte stream for start markers,
//! reads the big-endian length, accumulates and sums the declared number
//! of bytes and hands back the frame once its checksum byte arrives. State
//! lives between calls, so a stream may be delivered in chunks of any size.
//!
//! In escaped mode (API mode 2) an unescaped start marker always begins a
//! new frame, abandoning any partial one, and escape sequences are undone
//! as bytes arrive.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{ESCAPE, ESCAPE_WITH, START_BYTE};
use crate::error::FrameError;

/// Where the reassembler is within a candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a start marker.
    Idle,
    /// Start marker seen; next byte is the length high byte.
    LengthHigh,
    LengthLow { high: u8 },
    /// Accumulating `length` bytes starting with the type byte.
    Payload { length: u16, sum: u8 },
    /// All payload bytes seen; next byte is the checksum.
    Checksum { length: u16, sum: u8 },
}

/// A complete unescaped frame, start marker through checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Bytes,
}

impl RawFrame {
    pub(crate) fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn frame_type(&self) -> u8 {
        self.bytes[3]
    }

    /// The bytes after the type byte, without the checksum.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[4..self.bytes.len() - 1]
    }

    /// The checksum byte carried on the wire.
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// The checksum computed over the type and payload bytes.
    pub fn expected_checksum(&self) -> u8 {
        crate::builder::checksum(&self.bytes[3..self.bytes.len() - 1])
    }

    pub fn checksum_ok(&self) -> bool {
        self.checksum() == self.expected_checksum()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Streaming frame reassembler. One per byte stream.
#[derive(Debug)]
pub struct Reassembler {
    escaped: bool,
    capacity: usize,
    phase: Phase,
    escape_pending: bool,
    buf: BytesMut,
}

impl Reassembler {
    /// `capacity` bounds a whole unescaped frame, start marker through checksum.
    pub fn new(escaped: bool, capacity: usize) -> Self {
        Self {
            escaped,
            capacity,
            phase: Phase::Idle,
            escape_pending: false,
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drop any partial frame and wait for the next start marker.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.escape_pending = false;
        self.buf.clear();
    }

    /// Consume one byte. Returns a frame when this byte completes one, or a
    /// capacity error when the partial frame outgrew the buffer.
    pub fn push(&mut self, byte: u8) -> Option<Result<RawFrame, FrameError>> {
        let can_start =
            self.phase == Phase::Idle || (self.escaped && !self.escape_pending);
        if byte == START_BYTE && can_start {
            if self.phase != Phase::Idle {
                tracing::debug!(
                    discarded = self.buf.len(),
                    "start marker inside a frame, resynchronizing"
                );
            }
            self.buf.clear();
            self.buf.put_u8(START_BYTE);
            self.escape_pending = false;
            self.phase = Phase::LengthHigh;
            return None;
        }

        if self.escaped && byte == ESCAPE {
            self.escape_pending = true;
            return None;
        }

        let byte = if self.escape_pending {
            self.escape_pending = false;
            byte ^ ESCAPE_WITH
        } else {
            byte
        };

        if self.phase == Phase::Idle {
            return None;
        }

        if self.buf.len() >= self.capacity {
            tracing::warn!(
                capacity = self.capacity,
                "frame exceeds reassembly buffer, discarding"
            );
            self.phase = Phase::Idle;
            self.buf.clear();
            return Some(Err(FrameError::CapacityExceeded {
                capacity: self.capacity,
            }));
        }
        self.buf.put_u8(byte);

        self.phase = match self.phase {
            Phase::Idle => Phase::Idle,
            Phase::LengthHigh => Phase::LengthLow { high: byte },
            Phase::LengthLow { high } => {
                let length = u16::from_be_bytes([high, byte]);
                if length == 0 {
                    tracing::debug!("zero-length frame header, ignoring");
                    self.buf.clear();
                    Phase::Idle
                } else {
                    Phase::Payload { length, sum: 0 }
                }
            }
            Phase::Payload { length, sum } => {
                let sum = sum.wrapping_add(byte);
                // Header is 3 bytes; the payload ends `length` bytes later.
                if self.buf.len() == 3 + usize::from(length) {
                    Phase::Checksum { length, sum }
                } else {
                    Phase::Payload { length, sum }
                }
            }
            Phase::Checksum { length, sum } => {
                let frame = RawFrame::new(self.buf.split().freeze());
                let expected = 0xFF - sum;
                if byte != expected {
                    tracing::warn!(
                        frame_type = frame.frame_type(),
                        expected,
                        actual = byte,
                        "checksum mismatch"
                    );
                }
                tracing::trace!(frame_type = frame.frame_type(), length, "frame complete");
                self.phase = Phase::Idle;
                return Some(Ok(frame));
            }
        };
        None
    }
}
