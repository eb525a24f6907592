//! Frame encoder.
//!
//! Wire format:
//! ```text
//! ┌────────┬──────────────┬──────┬───────────────┬──────────┐
//! │ 0x7E   │ Length (2B)  │ Type │ Payload       │ Checksum │
//! │        │ big-endian   │ (1B) │ (Length - 1)  │ (1B)     │
//! └────────┴──────────────┴──────┴───────────────┴──────────┘
//! ```
//! Length counts the type byte and payload. The checksum is
//! `0xFF - (sum of type and payload bytes mod 256)`.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{ApiMode, CodecConfig, DEFAULT_BUFFER_SIZE};
use crate::constants::START_BYTE;
use crate::error::{FrameError, Result};
use crate::escape::escape;
use crate::frame_id::FrameIdAllocator;
use crate::message::Message;

/// Start marker plus the two length bytes.
const HEADER_SIZE: usize = 3;

/// `0xFF - (sum mod 256)`.
pub fn checksum(bytes: &[u8]) -> u8 {
    0xFF - bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encodes messages, assigning frame ids from its allocator.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    ids: Arc<FrameIdAllocator>,
    escaped: bool,
    capacity: usize,
}

impl FrameBuilder {
    /// A builder with its own allocator.
    pub fn new(config: &CodecConfig) -> Self {
        Self::with_allocator(config, Arc::new(FrameIdAllocator::new()))
    }

    /// A builder drawing ids from a shared allocator.
    pub fn with_allocator(config: &CodecConfig, ids: Arc<FrameIdAllocator>) -> Self {
        Self {
            ids,
            escaped: config.api_mode == ApiMode::Escaped,
            capacity: config.encode_buffer_size,
        }
    }

    /// Encode one message into a complete frame.
    pub fn build(&self, message: &Message) -> Result<Bytes> {
        encode_with_capacity(message, self.escaped, &self.ids, self.capacity)
    }

    /// Reserve the next frame id, e.g. to correlate a request before building it.
    pub fn next_frame_id(&self) -> u8 {
        self.ids.next_id()
    }

    pub fn allocator(&self) -> &Arc<FrameIdAllocator> {
        &self.ids
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

/// Encode one message, drawing a frame id from `ids` when the message has none.
///
/// Fails with [`FrameError::UnsupportedFrameType`] for types that are only
/// ever received, and [`FrameError::CapacityExceeded`] when the frame would
/// not fit the default encode buffer.
pub fn encode(message: &Message, escaped: bool, ids: &FrameIdAllocator) -> Result<Bytes> {
    encode_with_capacity(message, escaped, ids, DEFAULT_BUFFER_SIZE)
}

fn encode_with_capacity(
    message: &Message,
    escaped: bool,
    ids: &FrameIdAllocator,
    capacity: usize,
) -> Result<Bytes> {
    let frame_type = message.frame_type();
    let mut buf = BytesMut::with_capacity(capacity.min(64));
    buf.put_u8(START_BYTE);
    buf.put_u16(0);
    buf.put_u8(frame_type.tag());

    let frame_id = |id: &Option<u8>| id.unwrap_or_else(|| ids.next_id());

    match message {
        Message::AtCommand {
            id,
            command,
            command_parameter,
        }
        | Message::AtCommandQueueParameterValue {
            id,
            command,
            command_parameter,
        } => {
            buf.put_u8(frame_id(id));
            buf.put_slice(command.as_bytes());
            buf.put_slice(command_parameter);
        }
        Message::RemoteAtCommandRequest {
            id,
            destination64,
            destination16,
            remote_command_options,
            command,
            command_parameter,
        } => {
            buf.put_u8(frame_id(id));
            buf.put_slice(destination64.as_bytes());
            buf.put_slice(destination16.as_bytes());
            buf.put_u8(*remote_command_options);
            buf.put_slice(command.as_bytes());
            buf.put_slice(command_parameter);
        }
        Message::ZigbeeTransmitRequest {
            id,
            destination64,
            destination16,
            broadcast_radius,
            options,
            data,
        } => {
            buf.put_u8(frame_id(id));
            buf.put_slice(destination64.as_bytes());
            buf.put_slice(destination16.as_bytes());
            buf.put_u8(*broadcast_radius);
            buf.put_u8(*options);
            buf.put_slice(data);
        }
        Message::ExplicitAddressingZigbeeCommandFrame {
            id,
            destination64,
            destination16,
            source_endpoint,
            destination_endpoint,
            cluster_id,
            profile_id,
            broadcast_radius,
            options,
            data,
        } => {
            buf.put_u8(frame_id(id));
            buf.put_slice(destination64.as_bytes());
            buf.put_slice(destination16.as_bytes());
            buf.put_u8(*source_endpoint);
            buf.put_u8(*destination_endpoint);
            buf.put_u16(*cluster_id);
            buf.put_u16(*profile_id);
            buf.put_u8(*broadcast_radius);
            buf.put_u8(*options);
            buf.put_slice(data);
        }
        Message::CreateSourceRoute {
            destination64,
            destination16,
            addresses,
        } => {
            let hops = u8::try_from(addresses.len()).map_err(|_| {
                FrameError::Malformed(format!("{} hops do not fit a route", addresses.len()))
            })?;
            // Frame id and route options are always zero for this type.
            buf.put_u8(0);
            buf.put_slice(destination64.as_bytes());
            buf.put_slice(destination16.as_bytes());
            buf.put_u8(0);
            buf.put_u8(hops);
            for address in addresses {
                buf.put_u16(*address);
            }
        }
        Message::TxRequest64 {
            id,
            destination64,
            options,
            data,
        } => {
            buf.put_u8(frame_id(id));
            buf.put_slice(destination64.as_bytes());
            buf.put_u8(*options);
            buf.put_slice(data);
        }
        Message::TxRequest16 {
            id,
            destination16,
            options,
            data,
        } => {
            buf.put_u8(frame_id(id));
            buf.put_slice(destination16.as_bytes());
            buf.put_u8(*options);
            buf.put_slice(data);
        }
        Message::ZigbeeReceivePacket {
            remote64,
            remote16,
            receive_options,
            data,
        } => {
            buf.put_slice(remote64.as_bytes());
            buf.put_slice(remote16.as_bytes());
            buf.put_u8(*receive_options);
            buf.put_slice(data);
        }
        _ => return Err(FrameError::UnsupportedFrameType(frame_type.tag())),
    }

    let length = buf.len() - HEADER_SIZE;
    if buf.len() + 1 > capacity || length > usize::from(u16::MAX) {
        tracing::warn!(
            frame_type = %frame_type,
            size = buf.len() + 1,
            capacity,
            "frame does not fit the encode buffer"
        );
        return Err(FrameError::CapacityExceeded { capacity });
    }

    let sum = checksum(&buf[HEADER_SIZE..]);
    buf[1..HEADER_SIZE].copy_from_slice(&(length as u16).to_be_bytes());
    buf.put_u8(sum);

    tracing::trace!(frame_type = %frame_type, length, escaped, "encoded frame");

    if escaped {
        Ok(escape(&buf))
    } else {
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address16, Address64, AtCommand};

    fn hex(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    fn unescaped(message: &Message, ids: &FrameIdAllocator) -> String {
        hex(&encode(message, false, ids).unwrap())
    }

    #[test]
    fn test_at_command_with_explicit_id() {
        let msg = Message::AtCommand {
            id: Some(0x52),
            command: AtCommand::NJ,
            command_parameter: Bytes::new(),
        };
        assert_eq!(unescaped(&msg, &FrameIdAllocator::new()), "7e000408524e4a0d");
    }

    #[test]
    fn test_explicit_zero_id_is_preserved() {
        let ids = FrameIdAllocator::new();
        let msg = Message::AtCommand {
            id: Some(0),
            command: AtCommand::NJ,
            command_parameter: Bytes::new(),
        };
        assert_eq!(unescaped(&msg, &ids), "7e000408004e4a5f");
        assert_eq!(ids.last_id(), 0);
    }

    #[test]
    fn test_missing_id_is_assigned() {
        let ids = FrameIdAllocator::new();
        let msg = Message::at_command(AtCommand::NJ, Bytes::new());
        let first = encode(&msg, false, &ids).unwrap();
        let second = encode(&msg, false, &ids).unwrap();
        assert_eq!(first[4], 1);
        assert_eq!(second[4], 2);
    }

    #[test]
    fn test_queue_parameter_value() {
        let msg = Message::AtCommandQueueParameterValue {
            id: Some(1),
            command: AtCommand::BD,
            command_parameter: Bytes::from_static(&[0x07]),
        };
        assert_eq!(unescaped(&msg, &FrameIdAllocator::new()), "7e0005090142440768");
    }

    #[test]
    fn test_remote_at_command() {
        let msg = Message::RemoteAtCommandRequest {
            id: Some(1),
            destination64: "0013a20040401122".parse().unwrap(),
            destination16: Address16::UNKNOWN,
            remote_command_options: 0x02,
            command: "BH".parse().unwrap(),
            command_parameter: Bytes::from_static(&[0x01]),
        };
        assert_eq!(
            unescaped(&msg, &FrameIdAllocator::new()),
            "7e001017010013a20040401122fffe02424801f5"
        );
    }

    #[test]
    fn test_zigbee_transmit_request() {
        let msg = Message::ZigbeeTransmitRequest {
            id: Some(1),
            destination64: "0013a200400a0127".parse().unwrap(),
            destination16: Address16::UNKNOWN,
            broadcast_radius: 0,
            options: 0,
            data: Bytes::from_static(b"TxData0A"),
        };
        assert_eq!(
            unescaped(&msg, &FrameIdAllocator::new()),
            "7e001610010013a200400a0127fffe0000547844617461304113"
        );
    }

    #[test]
    fn test_zigbee_receive_packet() {
        let msg = Message::ZigbeeReceivePacket {
            remote64: "0013A20087654321".parse().unwrap(),
            remote16: "5614".parse().unwrap(),
            receive_options: 0x01,
            data: Bytes::from_static(b"TxData"),
        };
        assert_eq!(
            unescaped(&msg, &FrameIdAllocator::new()),
            "7e0012900013a20087654321561401547844617461b9"
        );
    }

    #[test]
    fn test_create_source_route_forces_zero_id() {
        let ids = FrameIdAllocator::new();
        let msg = Message::CreateSourceRoute {
            destination64: Address64::from(0x0013a20040401122),
            destination16: Address16::from(0x3344),
            addresses: vec![0xeeff, 0xccdd, 0xaabb],
        };
        let frame = encode(&msg, false, &ids).unwrap();
        assert_eq!(frame[3], 0x21);
        assert_eq!(frame[4], 0x00);
        assert_eq!(frame[15], 0x00);
        assert_eq!(frame[16], 3);
        assert_eq!(ids.last_id(), 0);
    }

    #[test]
    fn test_escaped_output() {
        let msg = Message::ZigbeeTransmitRequest {
            id: Some(0x7d),
            destination64: Address64::UNKNOWN,
            destination16: Address16::UNKNOWN,
            broadcast_radius: 0,
            options: 0,
            data: Bytes::from_static(&[0x11]),
        };
        let frame = encode(&msg, true, &FrameIdAllocator::new()).unwrap();
        assert_eq!(&frame[..6], &[0x7e, 0x00, 0x0f, 0x10, 0x7d, 0x5d]);
        assert!(!frame[1..].contains(&0x7e));
        assert!(!frame[1..].contains(&0x11));
    }

    #[test]
    fn test_receive_only_types_are_unsupported() {
        let msg = Message::ModemStatus { modem_status: 0 };
        assert!(matches!(
            encode(&msg, false, &FrameIdAllocator::new()),
            Err(FrameError::UnsupportedFrameType(0x8a))
        ));
    }

    #[test]
    fn test_capacity_exceeded() {
        let config = CodecConfig {
            encode_buffer_size: 16,
            ..CodecConfig::default()
        };
        let builder = FrameBuilder::new(&config);
        let msg = Message::TxRequest16 {
            id: Some(1),
            destination16: Address16::BROADCAST,
            options: 0,
            data: Bytes::from(vec![0u8; 32]),
        };
        assert!(matches!(
            builder.build(&msg),
            Err(FrameError::CapacityExceeded { capacity: 16 })
        ));
    }

    #[test]
    fn test_shared_allocator_across_builders() {
        let ids = Arc::new(FrameIdAllocator::new());
        let config = CodecConfig::default();
        let a = FrameBuilder::with_allocator(&config, Arc::clone(&ids));
        let b = FrameBuilder::with_allocator(&config, Arc::clone(&ids));
        assert_eq!(a.next_frame_id(), 1);
        assert_eq!(b.next_frame_id(), 2);
        assert_eq!(FrameBuilder::default().next_frame_id(), 1);
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&[0x08, 0x52, 0x4e, 0x4a]), 0x0d);
        assert_eq!(checksum(&[]), 0xff);
    }
}
