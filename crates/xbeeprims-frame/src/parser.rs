//! Payload parsers, dispatched on the frame type tag.
//!
//! Every parser reads through a bounds-checked [`Cursor`]; running off the
//! end of a payload fails that one frame with [`FrameError::Truncated`].

use bytes::Bytes;

use crate::constants::command_status;
use crate::error::{FrameError, Result};
use crate::io_sample::{parse_io_sample, parse_legacy_io_sample, parse_sensor_values};
use crate::message::{CommandData, IoSample, Message, NodeIdentification, NodeIdentificationDetails};
use crate::registry::FrameType;
use crate::types::{Address16, Address64, AtCommand};

/// ADC handling for I/O sample payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Scale analog samples to millivolts.
    pub convert_adc: bool,
    /// Reference voltage in millivolts used for scaling.
    pub vref_adc: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            convert_adc: true,
            vref_adc: 1200,
        }
    }
}

/// Checked big-endian reader over a payload slice.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(FrameError::Truncated {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn address16(&mut self) -> Result<Address16> {
        Address16::try_from(self.take(Address16::LEN)?)
    }

    fn address64(&mut self) -> Result<Address64> {
        Address64::try_from(self.take(Address64::LEN)?)
    }

    fn at_command(&mut self) -> Result<AtCommand> {
        let bytes = self.take(2)?;
        Ok(AtCommand::from_raw([bytes[0], bytes[1]]))
    }

    /// Bytes up to (not including) a NUL terminator, which is consumed.
    fn nul_terminated(&mut self) -> Result<String> {
        let rest = &self.buf[self.pos..];
        let end = rest.iter().position(|b| *b == 0).ok_or_else(|| {
            FrameError::Malformed("node identifier is missing its NUL terminator".into())
        })?;
        let text = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += end + 1;
        Ok(text)
    }

    /// Everything not yet consumed.
    fn rest(&mut self) -> Bytes {
        let rest = Bytes::copy_from_slice(&self.buf[self.pos..]);
        self.pos = self.buf.len();
        rest
    }
}

fn parse_node_identification(cur: &mut Cursor<'_>) -> Result<NodeIdentification> {
    let remote16 = cur.address16()?;
    let remote64 = cur.address64()?;
    let node_identifier = cur.nul_terminated()?;

    let details = if cur.remaining() > 0 {
        Some(NodeIdentificationDetails {
            remote_parent16: cur.address16()?,
            device_type: cur.u8()?,
            source_event: cur.u8()?,
            digi_profile_id: cur.u16()?,
            digi_manufacturer_id: cur.u16()?,
        })
    } else {
        None
    };

    Ok(NodeIdentification {
        remote16,
        remote64,
        node_identifier,
        details,
    })
}

/// Decode the payload that follows the type byte of a frame tagged `type_tag`.
pub fn decode(type_tag: u8, payload: &[u8], options: &DecodeOptions) -> Result<Message> {
    let frame_type = FrameType::try_from(type_tag)?;
    let mut cur = Cursor::new(payload);
    let cur = &mut cur;

    let message = match frame_type {
        FrameType::AtCommand => Message::AtCommand {
            id: Some(cur.u8()?),
            command: cur.at_command()?,
            command_parameter: cur.rest(),
        },
        FrameType::AtCommandQueueParameterValue => Message::AtCommandQueueParameterValue {
            id: Some(cur.u8()?),
            command: cur.at_command()?,
            command_parameter: cur.rest(),
        },
        FrameType::ZigbeeTransmitRequest => Message::ZigbeeTransmitRequest {
            id: Some(cur.u8()?),
            destination64: cur.address64()?,
            destination16: cur.address16()?,
            broadcast_radius: cur.u8()?,
            options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::ExplicitAddressingZigbeeCommandFrame => {
            Message::ExplicitAddressingZigbeeCommandFrame {
                id: Some(cur.u8()?),
                destination64: cur.address64()?,
                destination16: cur.address16()?,
                source_endpoint: cur.u8()?,
                destination_endpoint: cur.u8()?,
                cluster_id: cur.u16()?,
                profile_id: cur.u16()?,
                broadcast_radius: cur.u8()?,
                options: cur.u8()?,
                data: cur.rest(),
            }
        }
        FrameType::RemoteAtCommandRequest => Message::RemoteAtCommandRequest {
            id: Some(cur.u8()?),
            destination64: cur.address64()?,
            destination16: cur.address16()?,
            remote_command_options: cur.u8()?,
            command: cur.at_command()?,
            command_parameter: cur.rest(),
        },
        FrameType::CreateSourceRoute => {
            let _frame_id = cur.u8()?;
            let destination64 = cur.address64()?;
            let destination16 = cur.address16()?;
            let _route_options = cur.u8()?;
            let hops = cur.u8()?;
            let addresses = (0..hops).map(|_| cur.u16()).collect::<Result<Vec<_>>>()?;
            Message::CreateSourceRoute {
                destination64,
                destination16,
                addresses,
            }
        }
        FrameType::AtCommandResponse => {
            let id = cur.u8()?;
            let command = cur.at_command()?;
            let command_status = cur.u8()?;
            let command_data = if command == AtCommand::ND
                && command_status == command_status::OK
                && cur.remaining() > 0
            {
                CommandData::NodeIdentification(parse_node_identification(cur)?)
            } else {
                CommandData::Data(cur.rest())
            };
            Message::AtCommandResponse {
                id,
                command,
                command_status,
                command_data,
            }
        }
        FrameType::ModemStatus => Message::ModemStatus {
            modem_status: cur.u8()?,
        },
        FrameType::ZigbeeTransmitStatus => Message::ZigbeeTransmitStatus {
            id: cur.u8()?,
            remote16: cur.address16()?,
            transmit_retry_count: cur.u8()?,
            delivery_status: cur.u8()?,
            discovery_status: cur.u8()?,
        },
        FrameType::ZigbeeReceivePacket => Message::ZigbeeReceivePacket {
            remote64: cur.address64()?,
            remote16: cur.address16()?,
            receive_options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::ZigbeeExplicitRx => Message::ZigbeeExplicitRx {
            remote64: cur.address64()?,
            remote16: cur.address16()?,
            source_endpoint: cur.u8()?,
            destination_endpoint: cur.u8()?,
            cluster_id: cur.u16()?,
            profile_id: cur.u16()?,
            receive_options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::ZigbeeIoDataSampleRx => Message::ZigbeeIoDataSampleRx {
            remote64: cur.address64()?,
            remote16: cur.address16()?,
            receive_options: cur.u8()?,
            io_sample: parse_io_sample(cur, options)?,
        },
        FrameType::XbeeSensorRead => {
            let remote64 = cur.address64()?;
            let remote16 = cur.address16()?;
            let receive_options = cur.u8()?;
            let sensors = cur.u8()?;
            Message::XbeeSensorRead {
                remote64,
                remote16,
                receive_options,
                sensors,
                sensor_values: parse_sensor_values(cur, sensors)?,
            }
        }
        FrameType::NodeIdentification => Message::NodeIdentification {
            sender64: cur.address64()?,
            sender16: cur.address16()?,
            receive_options: cur.u8()?,
            node: parse_node_identification(cur)?,
        },
        FrameType::RemoteCommandResponse => {
            let id = cur.u8()?;
            let remote64 = cur.address64()?;
            let remote16 = cur.address16()?;
            let command = cur.at_command()?;
            let command_status = cur.u8()?;
            // IS is decoded as a sample on the mnemonic alone; a failed
            // status leaves the sample empty.
            let command_data = if command == AtCommand::IS {
                if command_status == command_status::OK {
                    CommandData::IoSample(parse_io_sample(cur, options)?)
                } else {
                    CommandData::IoSample(IoSample::default())
                }
            } else if command == AtCommand::ND
                && command_status == command_status::OK
                && cur.remaining() > 0
            {
                CommandData::NodeIdentification(parse_node_identification(cur)?)
            } else {
                CommandData::Data(cur.rest())
            };
            Message::RemoteCommandResponse {
                id,
                remote64,
                remote16,
                command,
                command_status,
                command_data,
            }
        }
        FrameType::RouteRecord => {
            let remote64 = cur.address64()?;
            let remote16 = cur.address16()?;
            let receive_options = cur.u8()?;
            let hops = cur.u8()?;
            let addresses = (0..hops).map(|_| cur.u16()).collect::<Result<Vec<_>>>()?;
            Message::RouteRecord {
                remote64,
                remote16,
                receive_options,
                addresses,
            }
        }
        FrameType::TxRequest64 => Message::TxRequest64 {
            id: Some(cur.u8()?),
            destination64: cur.address64()?,
            options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::TxRequest16 => Message::TxRequest16 {
            id: Some(cur.u8()?),
            destination16: cur.address16()?,
            options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::TxStatus => Message::TxStatus {
            id: cur.u8()?,
            delivery_status: cur.u8()?,
        },
        FrameType::RxPacket64 => Message::RxPacket64 {
            remote64: cur.address64()?,
            rssi: cur.u8()?,
            receive_options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::RxPacket16 => Message::RxPacket16 {
            remote16: cur.address16()?,
            rssi: cur.u8()?,
            receive_options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::RxPacket64Io => Message::RxPacket64Io {
            remote64: cur.address64()?,
            rssi: cur.u8()?,
            receive_options: cur.u8()?,
            data: cur.rest(),
        },
        FrameType::RxPacket16Io => Message::RxPacket16Io {
            remote16: cur.address16()?,
            rssi: cur.u8()?,
            receive_options: cur.u8()?,
            io_sample: parse_legacy_io_sample(cur)?,
        },
        FrameType::RegisterJoiningDevice
        | FrameType::OtaFirmwareUpdateStatus
        | FrameType::DeviceAuthenticatedIndicator
        | FrameType::MtoRouteRequest
        | FrameType::RegisterJoiningDeviceStatus
        | FrameType::JoinNotificationStatus => {
            return Err(FrameError::UnsupportedFrameType(type_tag));
        }
    };

    Ok(message)
}

/// Decode a whole unescaped frame, start marker through checksum.
///
/// The length prefix and checksum are not re-validated here; the
/// reassembler has already done that.
pub fn parse_frame(raw_frame: &[u8], options: &DecodeOptions) -> Result<Message> {
    if raw_frame.len() < 5 {
        return Err(FrameError::Truncated {
            needed: 5,
            remaining: raw_frame.len(),
        });
    }
    let body = &raw_frame[3..raw_frame.len() - 1];
    decode(body[0], &body[1..], options)
}
