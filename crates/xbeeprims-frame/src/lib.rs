//! XBee API frame codec.
//!
//! Every frame on the wire is laid out as:
//! - A start marker (`0x7E`)
//! - A 2-byte big-endian length covering the type byte and payload
//! - A 1-byte frame type followed by type-specific fields
//! - A checksum: `0xFF` minus the low byte of the sum of type and payload
//!
//! In API mode 2 every byte after the start marker that collides with a
//! control byte is escaped. [`FrameCodec`] turns an arbitrary byte stream
//! into [`Event`]s and typed [`Message`]s back into wire frames.

pub mod builder;
pub mod codec;
pub mod constants;
pub mod error;
pub mod escape;
pub mod frame_id;
pub mod io_sample;
pub mod message;
pub mod parser;
pub mod reader;
pub mod reassembler;
pub mod registry;
pub mod types;
pub mod writer;

pub use builder::{checksum, encode, FrameBuilder};
pub use codec::{
    ApiMode, CodecConfig, Event, Events, FrameCodec, DEFAULT_BUFFER_SIZE, DEFAULT_VREF_ADC,
};
pub use error::{FrameError, Result};
pub use escape::{escape, unescape};
pub use frame_id::FrameIdAllocator;
pub use message::{
    CommandData, IoSample, LegacyIoSample, Message, NodeIdentification,
    NodeIdentificationDetails, SensorValues,
};
pub use parser::{decode, parse_frame, DecodeOptions};
pub use reader::FrameReader;
pub use reassembler::{Phase, RawFrame, Reassembler};
pub use registry::{FrameType, ProtocolFamily};
pub use types::{Address16, Address64, AtCommand};
pub use writer::FrameWriter;
