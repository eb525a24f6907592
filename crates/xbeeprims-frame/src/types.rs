//! Fixed-width addresses, AT command mnemonics, and serde helpers for
//! byte-oriented fields.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{BROADCAST_16, COORDINATOR_16, COORDINATOR_64, UNKNOWN_16, UNKNOWN_64};
use crate::error::FrameError;

macro_rules! address_type {
    ($name:ident, $len:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width of the address on the wire.
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase hex rendering, as surfaced to callers.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = FrameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s.trim(), &mut bytes).map_err(|err| {
                    FrameError::InvalidAddress(format!(
                        "{s:?} is not a {}-byte hex address: {err}",
                        $len
                    ))
                })?;
                Ok(Self(bytes))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = FrameError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let bytes: [u8; $len] = slice.try_into().map_err(|_| {
                    FrameError::InvalidAddress(format!(
                        "expected {} bytes, got {}",
                        $len,
                        slice.len()
                    ))
                })?;
                Ok(Self(bytes))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(de::Error::custom)
            }
        }
    };
}

address_type!(Address16, 2, "A 16-bit network address.");
address_type!(Address64, 8, "A 64-bit IEEE (serial number) address.");

impl Address16 {
    pub const UNKNOWN: Self = Self(UNKNOWN_16);
    pub const BROADCAST: Self = Self(BROADCAST_16);
    pub const COORDINATOR: Self = Self(COORDINATOR_16);

    pub fn unknown() -> Self {
        Self::UNKNOWN
    }

    pub fn broadcast() -> Self {
        Self::BROADCAST
    }
}

impl Default for Address16 {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl From<u16> for Address16 {
    fn from(value: u16) -> Self {
        Self(value.to_be_bytes())
    }
}

impl Address64 {
    pub const UNKNOWN: Self = Self(UNKNOWN_64);
    pub const COORDINATOR: Self = Self(COORDINATOR_64);

    pub fn unknown() -> Self {
        Self::UNKNOWN
    }
}

impl Default for Address64 {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl From<u64> for Address64 {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}

/// A two-character AT command mnemonic such as `NJ` or `ND`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommand([u8; 2]);

impl AtCommand {
    /// Node Discovery.
    pub const ND: Self = Self(*b"ND");
    /// Force Sample.
    pub const IS: Self = Self(*b"IS");
    /// Node Identifier.
    pub const NI: Self = Self(*b"NI");
    /// Node Join Time.
    pub const NJ: Self = Self(*b"NJ");
    /// Interface Data Rate.
    pub const BD: Self = Self(*b"BD");
    /// Serial Number High.
    pub const SH: Self = Self(*b"SH");
    /// Serial Number Low.
    pub const SL: Self = Self(*b"SL");
    /// API Enable.
    pub const AP: Self = Self(*b"AP");

    /// Build from raw bytes. Non-ASCII bytes are rejected.
    pub fn from_bytes(bytes: [u8; 2]) -> Result<Self, FrameError> {
        if bytes.iter().all(|b| b.is_ascii_graphic()) {
            Ok(Self(bytes))
        } else {
            Err(FrameError::InvalidAtCommand(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        }
    }

    /// Wrap mnemonic bytes as received, without validation.
    pub const fn from_raw(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Received mnemonics may hold any byte.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    /// Description from the registry, if the mnemonic is a known one.
    pub fn description(&self) -> Option<&'static str> {
        crate::registry::at_command_description(self.as_str())
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtCommand({})", self.as_str())
    }
}

impl FromStr for AtCommand {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 2] = s
            .as_bytes()
            .try_into()
            .map_err(|_| FrameError::InvalidAtCommand(s.to_string()))?;
        Self::from_bytes(bytes)
    }
}

impl Serialize for AtCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AtCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Serde helpers for `Bytes` payloads: written as lowercase hex, read from
/// either a hex string or an array of byte values.
pub mod hex_bytes {
    use bytes::Bytes;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Hex(String),
        Raw(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Hex(text) => hex::decode(text.trim())
                .map(Bytes::from)
                .map_err(de::Error::custom),
            Repr::Raw(raw) => Ok(Bytes::from(raw)),
        }
    }
}

/// Serde helpers for 16-bit identifiers (cluster and profile ids) that may be
/// supplied either as a number or as a 2-byte hex string. Both spellings of
/// the same value yield the same big-endian bytes on the wire.
pub mod hex_or_u16 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u16),
        Hex(String),
    }

    pub fn serialize<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Num(value) => Ok(value),
            Repr::Hex(text) => parse(&text).map_err(de::Error::custom),
        }
    }

    /// Parse a 2-byte hex string such as `"c105"` into its big-endian value.
    pub fn parse(text: &str) -> Result<u16, String> {
        let mut bytes = [0u8; 2];
        hex::decode_to_slice(text.trim(), &mut bytes)
            .map_err(|err| format!("{text:?} is not a 2-byte hex value: {err}"))?;
        Ok(u16::from_be_bytes(bytes))
    }
}
