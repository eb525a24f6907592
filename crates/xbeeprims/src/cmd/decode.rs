use std::fs::File;
use std::io::{Cursor, Read};

use xbeeprims_frame::{CodecConfig, Event, FrameError, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_event, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = codec_config(&args);

    let input: Box<dyn Read> = if let Some(text) = &args.hex {
        Box::new(Cursor::new(parse_hex(text)?))
    } else if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
        Box::new(file)
    } else {
        Box::new(std::io::stdin().lock())
    };

    let summary = decode_stream(input, config, args.count, |event| {
        print_event(&event, format)
    })?;
    tracing::debug!(events = summary.events, errors = summary.errors, "decode finished");

    if summary.errors > 0 {
        Ok(DATA_INVALID)
    } else {
        Ok(SUCCESS)
    }
}

fn codec_config(args: &DecodeArgs) -> CodecConfig {
    CodecConfig {
        api_mode: args.codec.api_mode,
        raw_frames: args.raw_frames,
        convert_adc: !args.no_convert_adc,
        vref_adc: args.vref_adc,
        ..CodecConfig::default()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct DecodeSummary {
    events: usize,
    errors: usize,
}

/// Feed `input` through the codec until EOF or `count` events, handing each
/// event to `emit` as soon as it is complete.
fn decode_stream<R: Read>(
    input: R,
    config: CodecConfig,
    count: Option<usize>,
    mut emit: impl FnMut(Event),
) -> CliResult<DecodeSummary> {
    let mut reader = FrameReader::with_config(input, config);
    let mut summary = DecodeSummary::default();

    loop {
        if count.is_some_and(|limit| summary.events >= limit) {
            break;
        }
        match reader.read_event() {
            Ok(event) => {
                if event.is_error() {
                    summary.errors += 1;
                }
                summary.events += 1;
                emit(event);
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        }
    }

    Ok(summary)
}

fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact)
        .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")))
}

#[cfg(test)]
mod tests {
    use xbeeprims_frame::{ApiMode, Message};

    use super::*;

    fn collect(
        wire: &[u8],
        config: CodecConfig,
        count: Option<usize>,
    ) -> (Vec<Event>, DecodeSummary) {
        let mut events = Vec::new();
        let summary = decode_stream(Cursor::new(wire.to_vec()), config, count, |event| {
            events.push(event)
        })
        .unwrap();
        (events, summary)
    }

    #[test]
    fn parse_hex_ignores_whitespace() {
        assert_eq!(
            parse_hex("7E 00 02\n8A 06 6F").unwrap(),
            vec![0x7e, 0x00, 0x02, 0x8a, 0x06, 0x6f]
        );
        let err = parse_hex("7e0").unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn decodes_until_eof() {
        let wire = parse_hex("7e00028a066f 7e00028a066f").unwrap();
        let (events, summary) = collect(&wire, CodecConfig::default(), None);
        assert_eq!(summary, DecodeSummary { events: 2, errors: 0 });
        assert!(matches!(
            events[0],
            Event::Frame(Message::ModemStatus { modem_status: 6 })
        ));
    }

    #[test]
    fn count_limits_events() {
        let wire = parse_hex("7e00028a066f 7e00028a066f").unwrap();
        let (events, summary) = collect(&wire, CodecConfig::default(), Some(1));
        assert_eq!(events.len(), 1);
        assert_eq!(summary.events, 1);
    }

    #[test]
    fn checksum_error_is_counted() {
        let wire = parse_hex("7e00028a0600").unwrap();
        let (events, summary) = collect(&wire, CodecConfig::default(), None);
        assert_eq!(summary, DecodeSummary { events: 2, errors: 1 });
        assert!(matches!(
            events[0],
            Event::Error(FrameError::ChecksumMismatch { .. })
        ));
        assert!(matches!(events[1], Event::Frame(_)));
    }

    #[test]
    fn raw_frames_and_escaped_mode() {
        let wire = parse_hex("7e00078b7d5e2a6a00000062").unwrap();
        let config = CodecConfig {
            api_mode: ApiMode::Escaped,
            raw_frames: true,
            ..CodecConfig::default()
        };
        let (events, _) = collect(&wire, config, None);
        match &events[0] {
            Event::Raw(frame) => assert_eq!(
                frame.as_ref(),
                parse_hex("7e00078b7e2a6a00000062").unwrap().as_slice()
            ),
            other => panic!("unexpected {other:?}"),
        }
    }
}
