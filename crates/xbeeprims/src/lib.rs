//! Encoding and stream decoding for XBee API frames.
//!
//! xbeeprims turns typed messages into escaped, checksummed frames for a
//! radio's serial link, and turns the bytes coming back into typed messages.
//! Opening and configuring the serial port is left to the caller.
//!
//! # Crate Structure
//!
//! - [`frame`]: escaping, frame types, encoder, payload parsers and the
//!   streaming reassembler

/// Re-export frame types.
pub mod frame {
    pub use xbeeprims_frame::*;
}
