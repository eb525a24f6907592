//! Typed messages, one variant per frame type.
//!
//! Requests carry an optional frame id: `None` asks the encoder to assign
//! one, `Some(0)` is sent as-is (no response wanted). Decoded frames always
//! carry the id that was on the wire.
//!
//! The serde representation is internally tagged by `"type"`. Addresses are
//! lowercase hex strings and byte payloads are hex strings (arrays of byte
//! values are also accepted on input). Fields with a protocol default may be
//! omitted from input.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::REMOTE_COMMAND_APPLY_CHANGES;
use crate::registry::FrameType;
use crate::types::{hex_bytes, hex_or_u16, Address16, Address64, AtCommand};

fn default_remote_command_options() -> u8 {
    REMOTE_COMMAND_APPLY_CHANGES
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Local AT command (0x08).
    AtCommand {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        command: AtCommand,
        #[serde(default, with = "hex_bytes")]
        command_parameter: Bytes,
    },

    /// Local AT command whose value is queued until `AC` (0x09).
    AtCommandQueueParameterValue {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        command: AtCommand,
        #[serde(default, with = "hex_bytes")]
        command_parameter: Bytes,
    },

    /// Transmit to a ZigBee destination (0x10).
    ZigbeeTransmitRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        #[serde(default)]
        destination64: Address64,
        #[serde(default)]
        destination16: Address16,
        #[serde(default)]
        broadcast_radius: u8,
        #[serde(default)]
        options: u8,
        #[serde(default, with = "hex_bytes")]
        data: Bytes,
    },

    /// Transmit with explicit endpoints, cluster and profile (0x11).
    ExplicitAddressingZigbeeCommandFrame {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        #[serde(default)]
        destination64: Address64,
        #[serde(default)]
        destination16: Address16,
        source_endpoint: u8,
        destination_endpoint: u8,
        #[serde(with = "hex_or_u16")]
        cluster_id: u16,
        #[serde(with = "hex_or_u16")]
        profile_id: u16,
        #[serde(default)]
        broadcast_radius: u8,
        #[serde(default)]
        options: u8,
        #[serde(default, with = "hex_bytes")]
        data: Bytes,
    },

    /// AT command addressed to another node (0x17).
    RemoteAtCommandRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        #[serde(default)]
        destination64: Address64,
        #[serde(default)]
        destination16: Address16,
        #[serde(default = "default_remote_command_options")]
        remote_command_options: u8,
        command: AtCommand,
        #[serde(default, with = "hex_bytes")]
        command_parameter: Bytes,
    },

    /// Source route to a destination (0x21). The frame id is always 0.
    CreateSourceRoute {
        destination64: Address64,
        destination16: Address16,
        addresses: Vec<u16>,
    },

    /// Response to a local AT command (0x88).
    AtCommandResponse {
        id: u8,
        command: AtCommand,
        command_status: u8,
        command_data: CommandData,
    },

    ModemStatus {
        modem_status: u8,
    },

    /// Delivery report for a ZigBee transmit request (0x8B).
    ZigbeeTransmitStatus {
        id: u8,
        remote16: Address16,
        transmit_retry_count: u8,
        delivery_status: u8,
        discovery_status: u8,
    },

    /// Received RF data (0x90).
    ZigbeeReceivePacket {
        #[serde(default, alias = "sender64")]
        remote64: Address64,
        #[serde(default, alias = "sender16")]
        remote16: Address16,
        #[serde(default)]
        receive_options: u8,
        #[serde(default, with = "hex_bytes")]
        data: Bytes,
    },

    /// Received RF data with explicit addressing (0x91).
    ZigbeeExplicitRx {
        remote64: Address64,
        remote16: Address16,
        source_endpoint: u8,
        destination_endpoint: u8,
        #[serde(with = "hex_or_u16")]
        cluster_id: u16,
        #[serde(with = "hex_or_u16")]
        profile_id: u16,
        receive_options: u8,
        #[serde(with = "hex_bytes")]
        data: Bytes,
    },

    /// Periodic or change-triggered I/O sample (0x92).
    ZigbeeIoDataSampleRx {
        remote64: Address64,
        remote16: Address16,
        receive_options: u8,
        io_sample: IoSample,
    },

    /// 1-Wire sensor adapter reading (0x94).
    XbeeSensorRead {
        remote64: Address64,
        remote16: Address16,
        receive_options: u8,
        sensors: u8,
        sensor_values: SensorValues,
    },

    /// A node announced itself (0x95).
    NodeIdentification {
        sender64: Address64,
        sender16: Address16,
        receive_options: u8,
        node: NodeIdentification,
    },

    /// Response to a remote AT command (0x97).
    RemoteCommandResponse {
        id: u8,
        remote64: Address64,
        remote16: Address16,
        command: AtCommand,
        command_status: u8,
        command_data: CommandData,
    },

    /// Route a received packet took (0xA1).
    RouteRecord {
        remote64: Address64,
        remote16: Address16,
        receive_options: u8,
        addresses: Vec<u16>,
    },

    #[serde(rename = "tx_request_64")]
    TxRequest64 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        #[serde(default)]
        destination64: Address64,
        #[serde(default)]
        options: u8,
        #[serde(default, with = "hex_bytes")]
        data: Bytes,
    },

    #[serde(rename = "tx_request_16")]
    TxRequest16 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        #[serde(default = "Address16::broadcast")]
        destination16: Address16,
        #[serde(default)]
        options: u8,
        #[serde(default, with = "hex_bytes")]
        data: Bytes,
    },

    TxStatus {
        id: u8,
        delivery_status: u8,
    },

    #[serde(rename = "rx_packet_64")]
    RxPacket64 {
        remote64: Address64,
        rssi: u8,
        receive_options: u8,
        #[serde(with = "hex_bytes")]
        data: Bytes,
    },

    #[serde(rename = "rx_packet_16")]
    RxPacket16 {
        remote16: Address16,
        rssi: u8,
        receive_options: u8,
        #[serde(with = "hex_bytes")]
        data: Bytes,
    },

    #[serde(rename = "rx_packet_64_io")]
    RxPacket64Io {
        remote64: Address64,
        rssi: u8,
        receive_options: u8,
        #[serde(with = "hex_bytes")]
        data: Bytes,
    },

    #[serde(rename = "rx_packet_16_io")]
    RxPacket16Io {
        remote16: Address16,
        rssi: u8,
        receive_options: u8,
        io_sample: LegacyIoSample,
    },
}

impl Message {
    pub fn frame_type(&self) -> FrameType {
        match self {
            Message::AtCommand { .. } => FrameType::AtCommand,
            Message::AtCommandQueueParameterValue { .. } => {
                FrameType::AtCommandQueueParameterValue
            }
            Message::ZigbeeTransmitRequest { .. } => FrameType::ZigbeeTransmitRequest,
            Message::ExplicitAddressingZigbeeCommandFrame { .. } => {
                FrameType::ExplicitAddressingZigbeeCommandFrame
            }
            Message::RemoteAtCommandRequest { .. } => FrameType::RemoteAtCommandRequest,
            Message::CreateSourceRoute { .. } => FrameType::CreateSourceRoute,
            Message::AtCommandResponse { .. } => FrameType::AtCommandResponse,
            Message::ModemStatus { .. } => FrameType::ModemStatus,
            Message::ZigbeeTransmitStatus { .. } => FrameType::ZigbeeTransmitStatus,
            Message::ZigbeeReceivePacket { .. } => FrameType::ZigbeeReceivePacket,
            Message::ZigbeeExplicitRx { .. } => FrameType::ZigbeeExplicitRx,
            Message::ZigbeeIoDataSampleRx { .. } => FrameType::ZigbeeIoDataSampleRx,
            Message::XbeeSensorRead { .. } => FrameType::XbeeSensorRead,
            Message::NodeIdentification { .. } => FrameType::NodeIdentification,
            Message::RemoteCommandResponse { .. } => FrameType::RemoteCommandResponse,
            Message::RouteRecord { .. } => FrameType::RouteRecord,
            Message::TxRequest64 { .. } => FrameType::TxRequest64,
            Message::TxRequest16 { .. } => FrameType::TxRequest16,
            Message::TxStatus { .. } => FrameType::TxStatus,
            Message::RxPacket64 { .. } => FrameType::RxPacket64,
            Message::RxPacket16 { .. } => FrameType::RxPacket16,
            Message::RxPacket64Io { .. } => FrameType::RxPacket64Io,
            Message::RxPacket16Io { .. } => FrameType::RxPacket16Io,
        }
    }

    /// The frame id carried by this message, if its type has one.
    ///
    /// For requests this is `None` until an id has been chosen.
    pub fn frame_id(&self) -> Option<u8> {
        match self {
            Message::AtCommand { id, .. }
            | Message::AtCommandQueueParameterValue { id, .. }
            | Message::ZigbeeTransmitRequest { id, .. }
            | Message::ExplicitAddressingZigbeeCommandFrame { id, .. }
            | Message::RemoteAtCommandRequest { id, .. }
            | Message::TxRequest64 { id, .. }
            | Message::TxRequest16 { id, .. } => *id,
            Message::CreateSourceRoute { .. } => Some(0),
            Message::AtCommandResponse { id, .. }
            | Message::ZigbeeTransmitStatus { id, .. }
            | Message::RemoteCommandResponse { id, .. }
            | Message::TxStatus { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Convenience constructor for a local AT command with no id assigned.
    pub fn at_command(command: AtCommand, parameter: impl Into<Bytes>) -> Self {
        Message::AtCommand {
            id: None,
            command,
            command_parameter: parameter.into(),
        }
    }
}

/// What follows the status byte of an AT command response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandData {
    NodeIdentification(NodeIdentification),
    IoSample(IoSample),
    Data(#[serde(with = "hex_bytes")] Bytes),
}

impl CommandData {
    /// The opaque bytes, if the response was not decoded further.
    pub fn as_data(&self) -> Option<&Bytes> {
        match self {
            CommandData::Data(data) => Some(data),
            _ => None,
        }
    }
}

/// Node identification payload shared by `ND` responses and 0x95 frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentification {
    pub remote16: Address16,
    pub remote64: Address64,
    pub node_identifier: String,
    /// Present only when the radio appended the extended fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<NodeIdentificationDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentificationDetails {
    pub remote_parent16: Address16,
    pub device_type: u8,
    pub source_event: u8,
    #[serde(with = "hex_or_u16")]
    pub digi_profile_id: u16,
    #[serde(with = "hex_or_u16")]
    pub digi_manufacturer_id: u16,
}

/// A decoded I/O sample. Channel names are `DIO0`..`DIO12`, `AD0`..`AD3`
/// and `SUPPLY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSample {
    pub num_samples: u8,
    pub digital_samples: BTreeMap<String, u8>,
    /// Millivolts when ADC conversion is on, raw counts otherwise.
    pub analog_samples: BTreeMap<String, u32>,
}

/// An I/O sample from a 16-bit-address (0x83) frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyIoSample {
    pub sample_quantity: u8,
    pub channel_mask: u16,
    /// Enabled channels: `ADC0`..`ADC5`, then `DIO0`..`DIO8`.
    pub channels: Vec<String>,
    /// One raw digital word per sample, present when any DIO is enabled.
    pub digital_samples: Vec<u16>,
    /// Raw ADC counts, one map per sample.
    pub analog_samples: Vec<BTreeMap<String, u16>>,
}

/// Readings from a 1-Wire sensor adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorValues {
    pub ad0: u32,
    pub ad1: u32,
    pub ad2: u32,
    pub ad3: u32,
    pub temperature_raw: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_humidity: Option<f64>,
    pub water_present: bool,
}
