//! Frame type tags, their supported directions, and the known AT command set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

macro_rules! frame_types {
    ($( $variant:ident = $tag:literal => $name:literal ),+ $(,)?) => {
        /// The 8-bit tag that selects how a frame's payload is laid out.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[repr(u8)]
        pub enum FrameType {
            $( $variant = $tag, )+
        }

        impl FrameType {
            /// Every known frame type, in tag declaration order.
            pub const ALL: &'static [FrameType] = &[$( FrameType::$variant, )+];

            /// Descriptive vendor name, e.g. `"Modem Status (0x8A)"`.
            pub fn name(self) -> &'static str {
                match self {
                    $( FrameType::$variant => $name, )+
                }
            }
        }

        impl TryFrom<u8> for FrameType {
            type Error = FrameError;

            fn try_from(tag: u8) -> Result<Self, Self::Error> {
                match tag {
                    $( $tag => Ok(FrameType::$variant), )+
                    other => Err(FrameError::UnsupportedFrameType(other)),
                }
            }
        }
    };
}

frame_types! {
    AtCommand = 0x08 => "AT Command (0x08)",
    AtCommandQueueParameterValue = 0x09 => "AT Command - Queue Parameter Value (0x09)",
    ZigbeeTransmitRequest = 0x10 => "ZigBee Transmit Request (0x10)",
    ExplicitAddressingZigbeeCommandFrame = 0x11 => "Explicit Addressing ZigBee Command Frame (0x11)",
    RemoteAtCommandRequest = 0x17 => "Remote Command Request (0x17)",
    CreateSourceRoute = 0x21 => "Create Source Route (0x21)",
    RegisterJoiningDevice = 0x24 => "Register Joining Device (0x24)",
    AtCommandResponse = 0x88 => "AT Command Response (0x88)",
    ModemStatus = 0x8A => "Modem Status (0x8A)",
    ZigbeeTransmitStatus = 0x8B => "ZigBee Transmit Status (0x8B)",
    ZigbeeReceivePacket = 0x90 => "ZigBee Receive Packet (AO=0) (0x90)",
    ZigbeeExplicitRx = 0x91 => "ZigBee Explicit Rx Indicator (AO=1) (0x91)",
    ZigbeeIoDataSampleRx = 0x92 => "ZigBee IO Data Sample Rx Indicator (0x92)",
    XbeeSensorRead = 0x94 => "XBee Sensor Read Indicator (AO=0) (0x94)",
    NodeIdentification = 0x95 => "Node Identification Indicator (AO=0) (0x95)",
    RemoteCommandResponse = 0x97 => "Remote Command Response (0x97)",
    OtaFirmwareUpdateStatus = 0xA0 => "Over-the-Air Firmware Update Status (0xA0)",
    RouteRecord = 0xA1 => "Route Record Indicator (0xA1)",
    DeviceAuthenticatedIndicator = 0xA2 => "Device Authenticated Indicator (0xA2)",
    MtoRouteRequest = 0xA3 => "Many-to-One Route Request Indicator (0xA3)",
    RegisterJoiningDeviceStatus = 0xA4 => "Register Joining Device Status (0xA4)",
    JoinNotificationStatus = 0xA5 => "Join Notification Status (0xA5)",
    TxRequest64 = 0x00 => "TX (Transmit) Request: 64-bit address (0x00)",
    TxRequest16 = 0x01 => "TX (Transmit) Request: 16-bit address (0x01)",
    TxStatus = 0x89 => "TX (Transmit) Status (0x89)",
    RxPacket64 = 0x80 => "RX (Receive) Packet: 64-bit Address (0x80)",
    RxPacket16 = 0x81 => "RX (Receive) Packet: 16-bit Address (0x81)",
    RxPacket64Io = 0x82 => "RX (Receive) Packet: 64-bit Address IO (0x82)",
    RxPacket16Io = 0x83 => "RX (Receive) Packet: 16-bit Address IO (0x83)",
}

impl FrameType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// True if a payload serializer is registered for this type.
    pub fn can_encode(self) -> bool {
        use FrameType::*;
        matches!(
            self,
            AtCommand
                | AtCommandQueueParameterValue
                | RemoteAtCommandRequest
                | ZigbeeTransmitRequest
                | ExplicitAddressingZigbeeCommandFrame
                | CreateSourceRoute
                | TxRequest64
                | TxRequest16
                | ZigbeeReceivePacket
        )
    }

    /// True if a payload parser is registered for this type.
    pub fn can_decode(self) -> bool {
        use FrameType::*;
        !matches!(
            self,
            RegisterJoiningDevice
                | OtaFirmwareUpdateStatus
                | DeviceAuthenticatedIndicator
                | MtoRouteRequest
                | RegisterJoiningDeviceStatus
                | JoinNotificationStatus
        )
    }

    /// True if the payload carries a frame id byte after the type.
    pub fn has_frame_id(self) -> bool {
        use FrameType::*;
        matches!(
            self,
            AtCommand
                | AtCommandQueueParameterValue
                | ZigbeeTransmitRequest
                | ExplicitAddressingZigbeeCommandFrame
                | RemoteAtCommandRequest
                | CreateSourceRoute
                | RegisterJoiningDevice
                | AtCommandResponse
                | ZigbeeTransmitStatus
                | RemoteCommandResponse
                | RegisterJoiningDeviceStatus
                | TxRequest64
                | TxRequest16
                | TxStatus
        )
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<FrameType> for u8 {
    fn from(frame_type: FrameType) -> Self {
        frame_type as u8
    }
}

/// Returns true if `tag` has a registered payload parser.
pub fn can_decode(tag: u8) -> bool {
    FrameType::try_from(tag).is_ok_and(FrameType::can_decode)
}

/// Radio firmware families and the frame types each one speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFamily {
    Ieee802154,
    ZNet,
    ZigBee,
    Any,
}

impl ProtocolFamily {
    pub fn name(self) -> &'static str {
        match self {
            ProtocolFamily::Ieee802154 => "802.15.4",
            ProtocolFamily::ZNet => "ZNet",
            ProtocolFamily::ZigBee => "ZigBee",
            ProtocolFamily::Any => "Any",
        }
    }

    pub fn frame_types(self) -> &'static [u8] {
        match self {
            ProtocolFamily::Ieee802154 => &[
                0x00, 0x01, 0x08, 0x09, 0x17, 0x80, 0x81, 0x82, 0x83, 0x88, 0x89, 0x8A, 0x97,
            ],
            ProtocolFamily::ZNet => &[
                0x08, 0x09, 0x10, 0x11, 0x17, 0x88, 0x8A, 0x8B, 0x90, 0x91, 0x92, 0x94, 0x95, 0x97,
            ],
            ProtocolFamily::ZigBee => &[
                0x08, 0x09, 0x10, 0x11, 0x17, 0x21, 0x24, 0x88, 0x8A, 0x8B, 0x90, 0x91, 0x92,
                0x94, 0x95, 0x97, 0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5,
            ],
            ProtocolFamily::Any => &[
                0x00, 0x01, 0x08, 0x09, 0x17, 0x80, 0x81, 0x82, 0x83, 0x88, 0x89, 0x8A, 0x97,
                0x10, 0x11, 0x8B, 0x90, 0x91, 0x92, 0x94, 0x95, 0x21, 0x24, 0xA0, 0xA1, 0xA2,
                0xA3, 0xA4, 0xA5,
            ],
        }
    }

    pub fn supports(self, frame_type: FrameType) -> bool {
        self.frame_types().contains(&frame_type.tag())
    }
}

/// Known AT command mnemonics and what they configure.
pub const AT_COMMANDS: &[(&str, &str)] = &[
    // Network
    ("ID", "Extended PAN ID"),
    ("SC", "Scan Channels"),
    ("SD", "Scan Duration"),
    ("ZS", "Zigbee Stack Profile"),
    ("NJ", "Node Join Time"),
    ("NW", "Network Watchdog Timeout"),
    ("JV", "Coordinator Join Verification"),
    ("JN", "Join Notification"),
    ("OP", "Operating Extended PAN ID"),
    ("OI", "Operating 16-bit PAN ID"),
    ("CH", "Operating Channel"),
    ("NC", "Number of Remaining Children"),
    ("CE", "Coordinator Enable"),
    ("DO", "Miscellaneous Device Options"),
    ("DC", "Joining Device Controls"),
    ("II", "Initial 16-bit PAN ID"),
    ("ED", "Energy Detect"),
    // Addressing
    ("SH", "Serial Number High"),
    ("SL", "Serial Number Low"),
    ("MY", "16-bit Network Address"),
    ("MP", "16-bit Parent Network Address"),
    ("DH", "Destination Address High"),
    ("DL", "Destination Address Low"),
    ("NI", "Node Identifier"),
    ("NH", "Maximum Unicast Hops"),
    ("BH", "Broadcast Hops"),
    ("AR", "Aggregate Routing Notification"),
    ("DD", "Device Type Identifier"),
    ("NT", "Node Discover Timeout"),
    ("NO", "Network Discovery Options"),
    ("NP", "Maximum Packet Payload Bytes"),
    ("CR", "Conflict Report"),
    // Zigbee addressing
    ("SE", "Source Endpoint"),
    ("DE", "Destination Endpoint"),
    ("CI", "Cluster ID"),
    ("TO", "Transmit Options"),
    // RF interfacing
    ("PL", "TX Power Level"),
    ("PP", "Power at PL4"),
    ("PM", "Power Mode"),
    // Security
    ("EE", "Encryption Enable"),
    ("EO", "Encryption Options"),
    ("KY", "Link Key"),
    ("NK", "Trust Center Network Key"),
    // Serial interfacing
    ("BD", "Interface Data Rate"),
    ("NB", "Parity"),
    ("SB", "Stop Bits"),
    ("RO", "Packetization Timeout"),
    ("D6", "DIO6/RTS"),
    ("D7", "DIO7/CTS"),
    ("AP", "API Enable"),
    ("AO", "API Options"),
    // Command mode
    ("CT", "Command Mode Timeout"),
    ("GT", "Guard Times"),
    ("CC", "Command Character"),
    ("CN", "Exit Command mode"),
    // Sleep
    ("SP", "Sleep Period"),
    ("SN", "Number of Cycles Between ON_SLEEP"),
    ("SM", "Sleep Mode"),
    ("ST", "Time before Sleep"),
    ("SO", "Sleep Options"),
    ("WH", "Wake Host Delay"),
    ("PO", "Polling Rate"),
    // I/O settings
    ("D0", "AD0/DIO0 Configuration"),
    ("D1", "AD1/DIO1/PTI_En Configuration"),
    ("D2", "AD2/DIO2 Configuration"),
    ("D3", "AD3/DIO3 Configuration"),
    ("D4", "DIO4 Configuration"),
    ("D5", "DIO5/Associate Configuration"),
    ("D8", "DIO8/DTR/SLP_RQ"),
    ("D9", "DIO9/ON_SLEEP"),
    ("P0", "RSSI/PWM0 Configuration"),
    ("P1", "DIO11/PWM1 Configuration"),
    ("P2", "DIO12 Configuration"),
    ("P3", "DIO13/DOUT Configuration"),
    ("P4", "DIO14/DIN"),
    ("P5", "DIO15/SPI_MISO"),
    ("P6", "SPI_MOSI Configuration"),
    ("P7", "DIO17/SPI_SSEL"),
    ("P8", "DIO18/SPI_SCLK"),
    ("P9", "DIO19/SPI_ATTN/PTI_DATA"),
    ("PR", "Pull-up/Down Resistor Enable"),
    ("PD", "Pull Up/Down Direction"),
    ("LT", "Associate LED Blink Time"),
    ("RP", "RSSI PWM Timer"),
    // I/O sampling
    ("IR", "I/O Sample Rate"),
    ("IC", "Digital Change Detection"),
    ("V+", "Voltage Supply Monitoring"),
    // Diagnostics
    ("VR", "Firmware Version"),
    ("HV", "Hardware Version"),
    ("AI", "Association Indication"),
    ("%V", "Voltage Supply Monitoring"),
    ("DB", "Received Signal Strength"),
    ("TP", "Temperature"),
    ("VL", "Version Long"),
    // Execution
    ("AC", "Apply Changes"),
    ("AS", "Active Scan"),
    ("WR", "Write"),
    ("RE", "Restore Defaults"),
    ("FR", "Software Reset"),
    ("NR", "Network Reset"),
    ("SI", "Sleep Immediately"),
    ("CB", "Commissioning Pushbutton"),
    ("&X", "Clear Binding and Group Tables"),
    ("ND", "Node Discovery"),
    ("DN", "Destination Node"),
    ("DJ", "Disable Joining"),
    ("IS", "Force Sample"),
];

pub fn at_command_description(mnemonic: &str) -> Option<&'static str> {
    AT_COMMANDS
        .iter()
        .find(|(name, _)| *name == mnemonic)
        .map(|(_, description)| *description)
}

pub fn is_known_at_command(mnemonic: &str) -> bool {
    at_command_description(mnemonic).is_some()
}
