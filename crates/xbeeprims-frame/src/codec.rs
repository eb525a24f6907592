use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};

use crate::builder::FrameBuilder;
use crate::error::{FrameError, Result};
use crate::frame_id::FrameIdAllocator;
use crate::message::Message;
use crate::parser::{decode, DecodeOptions};
use crate::reassembler::{RawFrame, Reassembler};
use crate::registry;

/// Default scratch size for encoding and reassembly, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// Default ADC reference voltage in millivolts.
pub const DEFAULT_VREF_ADC: u32 = 1200;

/// Transport escaping mode (the radio's `AP` setting).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiMode {
    /// AP=1: bytes are sent as-is.
    #[default]
    Unescaped = 1,
    /// AP=2: reserved bytes are escaped.
    Escaped = 2,
}

impl TryFrom<u8> for ApiMode {
    type Error = FrameError;

    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            1 => Ok(ApiMode::Unescaped),
            2 => Ok(ApiMode::Escaped),
            other => Err(FrameError::InvalidApiMode(other)),
        }
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub api_mode: ApiMode,
    /// Emit validated raw frames instead of decoded messages.
    pub raw_frames: bool,
    /// Scale I/O sample analog readings to millivolts.
    pub convert_adc: bool,
    /// ADC reference voltage in millivolts.
    pub vref_adc: u32,
    /// Largest frame the encoder will produce, header and checksum included.
    pub encode_buffer_size: usize,
    /// Largest frame the reassembler will accept, header and checksum included.
    pub decode_buffer_size: usize,
}

impl CodecConfig {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            convert_adc: self.convert_adc,
            vref_adc: self.vref_adc,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            api_mode: ApiMode::Unescaped,
            raw_frames: false,
            convert_adc: true,
            vref_adc: DEFAULT_VREF_ADC,
            encode_buffer_size: DEFAULT_BUFFER_SIZE,
            decode_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// One item produced from the incoming byte stream.
#[derive(Debug)]
pub enum Event {
    /// A decoded message.
    Frame(Message),
    /// A complete frame passed through undecoded, start marker through checksum.
    Raw(Bytes),
    /// A problem with one frame. The stream stays usable.
    Error(FrameError),
}

impl Event {
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Event::Frame(message) => Some(message),
            _ => None,
        }
    }
}

/// Bidirectional codec for one radio link.
///
/// Outgoing messages go through [`FrameCodec::encode`]. Incoming bytes are
/// queued with [`FrameCodec::feed`] and scanned lazily by
/// [`FrameCodec::next_event`]; bytes not yet scanned stay queued.
#[derive(Debug)]
pub struct FrameCodec {
    config: CodecConfig,
    builder: FrameBuilder,
    reassembler: Reassembler,
    pending: BytesMut,
    ready: VecDeque<Event>,
}

impl FrameCodec {
    pub fn new(config: CodecConfig) -> Self {
        let builder = FrameBuilder::new(&config);
        Self::from_parts(config, builder)
    }

    /// A codec drawing frame ids from a shared allocator.
    pub fn with_allocator(config: CodecConfig, ids: Arc<FrameIdAllocator>) -> Self {
        let builder = FrameBuilder::with_allocator(&config, ids);
        Self::from_parts(config, builder)
    }

    fn from_parts(config: CodecConfig, builder: FrameBuilder) -> Self {
        let reassembler = Reassembler::new(
            config.api_mode == ApiMode::Escaped,
            config.decode_buffer_size,
        );
        Self {
            config,
            builder,
            reassembler,
            pending: BytesMut::new(),
            ready: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn builder(&self) -> &FrameBuilder {
        &self.builder
    }

    /// Encode a message into a frame ready for the wire.
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        self.builder.build(message)
    }

    pub fn next_frame_id(&self) -> u8 {
        self.builder.next_frame_id()
    }

    /// Queue received bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Number of queued bytes not yet scanned.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Scan queued bytes until the next event is ready.
    pub fn next_event(&mut self) -> Option<Event> {
        if let Some(event) = self.ready.pop_front() {
            return Some(event);
        }

        let mut consumed = 0;
        while consumed < self.pending.len() {
            let byte = self.pending[consumed];
            consumed += 1;
            if let Some(result) = self.reassembler.push(byte) {
                self.pending.advance(consumed);
                self.dispatch(result);
                return self.ready.pop_front();
            }
        }
        self.pending.clear();
        None
    }

    /// Drain every event available from the queued bytes.
    pub fn events(&mut self) -> Events<'_> {
        Events { codec: self }
    }

    /// Drop queued bytes, pending events and any partial frame.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.ready.clear();
        self.reassembler.reset();
    }

    fn dispatch(&mut self, result: Result<RawFrame>) {
        let frame = match result {
            Ok(frame) => frame,
            Err(err) => {
                self.ready.push_back(Event::Error(err));
                return;
            }
        };

        if !frame.checksum_ok() {
            self.ready.push_back(Event::Error(FrameError::ChecksumMismatch {
                expected: frame.expected_checksum(),
                actual: frame.checksum(),
            }));
        }

        let frame_type = frame.frame_type();
        if self.config.raw_frames || !registry::can_decode(frame_type) {
            if !self.config.raw_frames {
                tracing::debug!(frame_type, "no decoder for frame type, passing through raw");
            }
            self.ready.push_back(Event::Raw(frame.into_bytes()));
            return;
        }

        let event = match decode(frame_type, frame.payload(), &self.config.decode_options()) {
            Ok(message) => Event::Frame(message),
            Err(err) => {
                tracing::debug!(frame_type, error = %err, "failed to decode frame");
                Event::Error(err)
            }
        };
        self.ready.push_back(event);
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

/// Iterator returned by [`FrameCodec::events`].
pub struct Events<'a> {
    codec: &'a mut FrameCodec,
}

impl Iterator for Events<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.codec.next_event()
    }
}

#[cfg(feature = "async")]
mod tokio_codec {
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    use super::{Event, FrameCodec};
    use crate::error::FrameError;
    use crate::message::Message;

    impl Decoder for FrameCodec {
        type Item = Event;
        type Error = FrameError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>, FrameError> {
            if !src.is_empty() {
                let chunk = src.split();
                self.feed(&chunk);
            }
            Ok(self.next_event())
        }
    }

    impl Encoder<&Message> for FrameCodec {
        type Error = FrameError;

        fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), FrameError> {
            let frame = self.builder.build(item)?;
            dst.extend_from_slice(&frame);
            Ok(())
        }
    }

    impl Encoder<Message> for FrameCodec {
        type Error = FrameError;

        fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), FrameError> {
            Encoder::<&Message>::encode(self, &item, dst)
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::{Address16, Address64, AtCommand};

    fn wire(hex: &str) -> Vec<u8> {
        hex::decode(hex.replace(' ', "")).unwrap()
    }

    fn collect(codec: &mut FrameCodec, bytes: &[u8]) -> Vec<Event> {
        codec.feed(bytes);
        codec.events().collect()
    }

    const RECEIVE_PACKET: &str = "7e 00 12 90 00 13 a2 00 40 52 2b aa 7d 84 01 52 78 44 61 74 61 0d";

    #[test]
    fn test_api_mode_from_u8() {
        assert_eq!(ApiMode::try_from(1).unwrap(), ApiMode::Unescaped);
        assert_eq!(ApiMode::try_from(2).unwrap(), ApiMode::Escaped);
        assert!(matches!(
            ApiMode::try_from(3),
            Err(FrameError::InvalidApiMode(3))
        ));
        assert_eq!(ApiMode::Escaped.to_string(), "2");
    }

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.api_mode, ApiMode::Unescaped);
        assert!(!config.raw_frames);
        assert!(config.convert_adc);
        assert_eq!(config.vref_adc, 1200);
        assert_eq!(config.encode_buffer_size, 512);
        assert_eq!(config.decode_buffer_size, 512);
    }

    #[test]
    fn test_leading_zeros_before_frame() {
        let mut bytes = vec![0u8; 520];
        bytes.extend(wire(RECEIVE_PACKET));
        let mut codec = FrameCodec::default();
        let events = collect(&mut codec, &bytes);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Frame(Message::ZigbeeReceivePacket { data, .. }) => {
                assert_eq!(data.as_ref(), b"RxData")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_escaped_frame_id() {
        let mut codec = FrameCodec::new(CodecConfig {
            api_mode: ApiMode::Escaped,
            ..CodecConfig::default()
        });
        let events = collect(&mut codec, &wire("7e 00 07 8b 7d 5d 2a 6a 00 00 00 63"));
        match &events[..] {
            [Event::Frame(msg)] => assert_eq!(msg.frame_id(), Some(0x7d)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_escaped_node_discovery() {
        let mut codec = FrameCodec::new(CodecConfig {
            api_mode: ApiMode::Escaped,
            ..CodecConfig::default()
        });
        let bytes = wire("7e 00 12 88 01 4e 44 00 ff fe 00 7d 33 a2 00 40 d8 14 a8 34 64 00 c6");
        match collect(&mut codec, &bytes).pop() {
            Some(Event::Frame(Message::AtCommandResponse {
                command_data: crate::message::CommandData::NodeIdentification(node),
                ..
            })) => {
                assert_eq!(node.remote64.to_string(), "0013a20040d814a8");
                assert_eq!(node.node_identifier, "4d");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_checksum_mismatch_reported_then_delivered() {
        let mut codec = FrameCodec::default();
        let events = collect(&mut codec, &wire("7e 00 02 8a 06 00"));
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::Error(FrameError::ChecksumMismatch {
                expected: 0x6f,
                actual: 0x00
            })
        ));
        assert!(matches!(
            events[1],
            Event::Frame(Message::ModemStatus { modem_status: 6 })
        ));
    }

    #[test]
    fn test_unknown_type_passes_through_raw() {
        let bytes = wire("7e 00 02 a5 01 59");
        let mut codec = FrameCodec::default();
        let events = collect(&mut codec, &bytes);
        match &events[..] {
            [Event::Raw(raw)] => assert_eq!(raw.as_ref(), bytes.as_slice()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_raw_frames_mode() {
        let bytes = wire("7e 00 02 8a 06 6f");
        let mut codec = FrameCodec::new(CodecConfig {
            raw_frames: true,
            ..CodecConfig::default()
        });
        match &collect(&mut codec, &bytes)[..] {
            [Event::Raw(raw)] => assert_eq!(raw.as_ref(), bytes.as_slice()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_failure_does_not_poison_stream() {
        // Transmit status truncated to its id byte.
        let mut bytes = wire("7e 00 02 8b 01 73");
        bytes.extend(wire("7e 00 02 8a 06 6f"));
        let mut codec = FrameCodec::default();
        let events = collect(&mut codec, &bytes);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Error(FrameError::Truncated { .. })));
        assert!(matches!(
            events[1],
            Event::Frame(Message::ModemStatus { modem_status: 6 })
        ));
    }

    #[test]
    fn test_next_event_is_lazy() {
        let mut codec = FrameCodec::default();
        let mut bytes = wire("7e 00 02 8a 06 6f");
        bytes.extend(wire("7e 00 02 8a 02 73"));
        codec.feed(&bytes);
        assert!(codec.next_event().is_some());
        assert_eq!(codec.pending_len(), 6);
        assert!(codec.next_event().is_some());
        assert!(codec.next_event().is_none());
        assert_eq!(codec.pending_len(), 0);
    }

    #[test]
    fn test_adc_conversion_toggle() {
        let bytes = wire("7e 00 14 92 00 13 a2 00 41 5b 7e d6 ff fe c2 01 00 00 0c 03 ff 03 ff f8");

        let mut converted = FrameCodec::default();
        let mut raw = FrameCodec::new(CodecConfig {
            convert_adc: false,
            ..CodecConfig::default()
        });
        for (codec, expected) in [(&mut converted, 1200), (&mut raw, 1023)] {
            match collect(codec, &bytes).pop() {
                Some(Event::Frame(Message::ZigbeeIoDataSampleRx {
                    receive_options,
                    io_sample,
                    ..
                })) => {
                    assert_eq!(receive_options, 194);
                    assert!(io_sample.digital_samples.is_empty());
                    assert_eq!(io_sample.analog_samples["AD2"], expected);
                    assert_eq!(io_sample.analog_samples["AD3"], expected);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_capacity_fault_is_an_event() {
        let mut codec = FrameCodec::new(CodecConfig {
            decode_buffer_size: 16,
            ..CodecConfig::default()
        });
        let mut bytes = wire(RECEIVE_PACKET);
        bytes.extend(wire("7e 00 02 8a 06 6f"));
        let events = collect(&mut codec, &bytes);
        assert!(matches!(
            events[0],
            Event::Error(FrameError::CapacityExceeded { capacity: 16 })
        ));
        assert!(matches!(
            events[1],
            Event::Frame(Message::ModemStatus { .. })
        ));
    }

    fn roundtrip_messages() -> Vec<Message> {
        vec![
            Message::AtCommand {
                id: Some(0x52),
                command: AtCommand::NJ,
                command_parameter: Bytes::new(),
            },
            Message::AtCommandQueueParameterValue {
                id: Some(1),
                command: AtCommand::BD,
                command_parameter: Bytes::from_static(&[0x07]),
            },
            Message::RemoteAtCommandRequest {
                id: Some(0x7d),
                destination64: Address64::from(0x0013a20040401122),
                destination16: Address16::UNKNOWN,
                remote_command_options: 0x02,
                command: "BH".parse().unwrap(),
                command_parameter: Bytes::from_static(&[0x01]),
            },
            Message::ZigbeeTransmitRequest {
                id: Some(0x11),
                destination64: Address64::from(0x0013a200400a0127),
                destination16: Address16::from(0x7e13),
                broadcast_radius: 0,
                options: 0,
                data: Bytes::from_static(b"TxData0A"),
            },
            Message::ExplicitAddressingZigbeeCommandFrame {
                id: Some(3),
                destination64: Address64::COORDINATOR,
                destination16: Address16::COORDINATOR,
                source_endpoint: 0xe8,
                destination_endpoint: 0xe8,
                cluster_id: 0x0011,
                profile_id: 0xc105,
                broadcast_radius: 1,
                options: 0x20,
                data: Bytes::from_static(b"explicit"),
            },
            Message::CreateSourceRoute {
                destination64: Address64::from(0x0013a20040401122),
                destination16: Address16::from(0x3344),
                addresses: vec![0xeeff, 0xccdd, 0xaabb],
            },
            Message::TxRequest64 {
                id: Some(9),
                destination64: Address64::from(0x0013a20040401122),
                options: 0x01,
                data: Bytes::from_static(&[0x7e, 0x7d, 0x11, 0x13]),
            },
            Message::TxRequest16 {
                id: Some(10),
                destination16: Address16::BROADCAST,
                options: 0,
                data: Bytes::from_static(b"hi"),
            },
            Message::ZigbeeReceivePacket {
                remote64: Address64::from(0x0013a20087654321),
                remote16: Address16::from(0x5614),
                receive_options: 1,
                data: Bytes::from_static(b"TxData"),
            },
        ]
    }

    #[test]
    fn test_roundtrip_every_bidirectional_type() {
        for api_mode in [ApiMode::Unescaped, ApiMode::Escaped] {
            let mut codec = FrameCodec::new(CodecConfig {
                api_mode,
                ..CodecConfig::default()
            });
            for message in roundtrip_messages() {
                let bytes = codec.encode(&message).unwrap();
                let events = collect(&mut codec, &bytes);
                match &events[..] {
                    [Event::Frame(decoded)] => assert_eq!(decoded, &message, "{api_mode}"),
                    other => panic!("{api_mode}: unexpected {other:?}"),
                }
            }
        }
    }

    fn frame_list(codec: &mut FrameCodec, chunks: &[&[u8]]) -> Vec<String> {
        let mut out = Vec::new();
        for chunk in chunks {
            codec.feed(chunk);
            out.extend(codec.events().map(|event| format!("{event:?}")));
        }
        out
    }

    proptest! {
        #[test]
        fn prop_split_invariance(splits in proptest::collection::vec(any::<prop::sample::Index>(), 0..8)) {
            let mut stream = vec![0x00, 0x13];
            stream.extend(wire(RECEIVE_PACKET));
            stream.extend(wire("7e 00 02 8a 06 00"));
            stream.extend(wire("7e 00 07 8b 01 7d 84 00 00 01 71"));
            stream.extend(wire("7e 00 02 a5 01 59"));

            let whole = frame_list(&mut FrameCodec::default(), &[stream.as_slice()]);

            let mut cuts: Vec<usize> = splits.iter().map(|i| i.index(stream.len() + 1)).collect();
            cuts.sort_unstable();
            let mut chunks = Vec::new();
            let mut start = 0;
            for cut in cuts {
                chunks.push(&stream[start..cut]);
                start = cut;
            }
            chunks.push(&stream[start..]);

            let split = frame_list(&mut FrameCodec::default(), &chunks);
            prop_assert_eq!(whole, split);
        }

        #[test]
        fn prop_escaped_split_invariance(cut in 0usize..64) {
            let config = CodecConfig { api_mode: ApiMode::Escaped, ..CodecConfig::default() };
            let codec = FrameCodec::new(config.clone());
            let mut stream = Vec::new();
            for message in roundtrip_messages().iter().take(4) {
                stream.extend_from_slice(&codec.encode(message).unwrap());
            }
            let cut = cut.min(stream.len());

            let whole = frame_list(&mut FrameCodec::new(config.clone()), &[stream.as_slice()]);
            let split = frame_list(&mut FrameCodec::new(config), &[&stream[..cut], &stream[cut..]]);
            prop_assert_eq!(whole.len(), 4);
            prop_assert_eq!(whole, split);
        }

        #[test]
        fn prop_decoded_checksum_matches(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            let message = Message::TxRequest16 {
                id: Some(1),
                destination16: Address16::BROADCAST,
                options: 0,
                data: Bytes::from(payload),
            };
            let mut codec = FrameCodec::new(CodecConfig { raw_frames: true, ..CodecConfig::default() });
            let bytes = codec.encode(&message).unwrap();
            let events = collect(&mut codec, &bytes);
            match &events[..] {
                [Event::Raw(raw)] => {
                    let body = &raw[3..raw.len() - 1];
                    prop_assert_eq!(crate::builder::checksum(body), raw[raw.len() - 1]);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
