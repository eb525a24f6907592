//! Wire markers, sentinel addresses, and named status codes.
//!
//! Status lookups return `None` for codes the radio firmware does not document,
//! so callers can still show the raw value.

/// Marks the first byte of every frame.
pub const START_BYTE: u8 = 0x7E;

/// Prefix for an escaped byte in API mode 2.
pub const ESCAPE: u8 = 0x7D;

/// Software flow control: resume.
pub const XON: u8 = 0x11;

/// Software flow control: pause.
pub const XOFF: u8 = 0x13;

/// Escaped bytes are transmitted XORed with this value.
pub const ESCAPE_WITH: u8 = 0x20;

/// Bytes that must be escaped in API mode 2.
pub const ESCAPE_BYTES: [u8; 4] = [START_BYTE, ESCAPE, XOFF, XON];

pub const UNKNOWN_16: [u8; 2] = [0xFF, 0xFE];
pub const UNKNOWN_64: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF];
pub const BROADCAST_16: [u8; 2] = [0xFF, 0xFF];
pub const COORDINATOR_16: [u8; 2] = [0x00, 0x00];
pub const COORDINATOR_64: [u8; 8] = [0x00; 8];

/// Remote AT command option: apply changes on the remote device.
pub const REMOTE_COMMAND_APPLY_CHANGES: u8 = 0x02;

/// Receive option bit flags.
pub mod receive_options {
    pub const PACKET_ACKNOWLEDGED: u8 = 0x01;
    pub const PACKET_WAS_BROADCAST: u8 = 0x02;
    pub const PACKET_ENCRYPTED: u8 = 0x20;
    pub const PACKET_SENT_FROM_END_DEVICE: u8 = 0x40;
}

/// Command status returned in AT command responses.
pub mod command_status {
    pub const OK: u8 = 0x00;
    pub const ERROR: u8 = 0x01;
    pub const INVALID_COMMAND: u8 = 0x02;
    pub const INVALID_PARAMETER: u8 = 0x03;
    pub const REMOTE_CMD_TRANS_FAILURE: u8 = 0x04;
}

pub fn delivery_status_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "Success",
        0x01 => "MAC ACK Failure",
        0x02 => "CA Failure",
        0x15 => "Invalid destination endpoint",
        0x21 => "Network ACK Failure",
        0x22 => "Not Joined to Network",
        0x23 => "Self-addressed",
        0x24 => "Address Not Found",
        0x25 => "Route Not Found",
        0x26 => "Broadcast source failed to hear a neighbor relay the message",
        0x2B => "Invalid binding table index",
        0x2C | 0x32 => "Resource error lack of free buffers, timers, etc.",
        0x2D => "Attempted broadcast with APS transmission",
        0x2E => "Attempted unicast with APS transmission, but EE=0",
        0x74 => "Data payload too large",
        0x75 => "Indirect message unrequested",
        _ => return None,
    })
}

pub fn discovery_status_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "No Discovery Overhead",
        0x01 => "Address Discovery",
        0x02 => "Route Discovery",
        0x03 => "Address and Route",
        0x40 => "Extended Timeout Discovery",
        _ => return None,
    })
}

pub fn command_status_name(code: u8) -> Option<&'static str> {
    Some(match code {
        command_status::OK => "OK",
        command_status::ERROR => "ERROR",
        command_status::INVALID_COMMAND => "Invalid Command",
        command_status::INVALID_PARAMETER => "Invalid Parameter",
        command_status::REMOTE_CMD_TRANS_FAILURE => "Remote Command Transmission Failed",
        _ => return None,
    })
}

pub fn modem_status_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "Hardware Reset",
        0x01 => "Watchdog timer reset",
        0x02 => "Joined Network",
        0x03 => "Disassociated",
        0x06 => "Coordinator started",
        0x07 => "Network security key was updated",
        0x0D => "Voltage supply limit exceeded",
        0x11 => "Modem Configuration changed while join in progress",
        0x80 => "Stack Error",
        _ => return None,
    })
}

pub fn device_type_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "Coordinator",
        0x01 => "Router",
        0x02 => "End Device",
        _ => return None,
    })
}

/// Names of every receive option flag set in `options`, lowest bit first.
pub fn receive_option_names(options: u8) -> Vec<&'static str> {
    use receive_options::*;

    [
        (PACKET_ACKNOWLEDGED, "Packet Acknowledged"),
        (PACKET_WAS_BROADCAST, "Packet was a broadcast packet"),
        (PACKET_ENCRYPTED, "Packet encrypted with APS encryption"),
        (PACKET_SENT_FROM_END_DEVICE, "Packet was sent from an end device"),
    ]
    .into_iter()
    .filter(|(bit, _)| options & bit != 0)
    .map(|(_, name)| name)
    .collect()
}

/// Returns true if `byte` must be escaped in API mode 2.
pub fn needs_escape(byte: u8) -> bool {
    ESCAPE_BYTES.contains(&byte)
}
