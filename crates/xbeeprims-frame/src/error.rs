/// Errors that can occur during frame encoding, decoding, or reassembly.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The trailing checksum byte does not match the payload.
    ///
    /// Reported alongside the frame, which is still delivered.
    #[error("checksum mismatch (expected 0x{expected:02x}, got 0x{actual:02x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// No encoder or decoder is registered for this frame type tag.
    #[error("frame type 0x{0:02x} is not supported")]
    UnsupportedFrameType(u8),

    /// A frame does not fit in the configured scratch buffer.
    #[error("frame exceeds buffer capacity ({capacity} bytes)")]
    CapacityExceeded { capacity: usize },

    /// A payload ended before a fixed-width field could be read.
    #[error("truncated payload (needed {needed} bytes, {remaining} remaining)")]
    Truncated { needed: usize, remaining: usize },

    /// A payload was structurally invalid for its frame type.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// An address could not be parsed from its textual form.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A user-supplied AT command mnemonic was not two ASCII characters.
    #[error("invalid AT command: {0:?}")]
    InvalidAtCommand(String),

    /// The API mode is neither 1 (unescaped) nor 2 (escaped).
    #[error("invalid API mode {0} (expected 1 or 2)")]
    InvalidApiMode(u8),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before another frame could be produced.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for conditions that affect a single frame and leave the stream usable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FrameError::Io(_) | FrameError::ConnectionClosed)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
