use std::fs;
use std::sync::Arc;

use serde_json::Value;
use xbeeprims_frame::{unescape, CodecConfig, FrameBuilder, FrameIdAllocator, Message};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_encoded, EncodedFrame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let text = resolve_input(&args)?;
    let messages = parse_messages(&text)?;

    let config = CodecConfig {
        api_mode: args.codec.api_mode,
        ..CodecConfig::default()
    };
    let ids = match args.frame_id_start {
        Some(first) => FrameIdAllocator::starting_at(first),
        None => FrameIdAllocator::new(),
    };
    let builder = FrameBuilder::with_allocator(&config, Arc::new(ids));

    let frames = messages
        .iter()
        .map(|message| encode_one(&builder, message))
        .collect::<CliResult<Vec<_>>>()?;
    print_encoded(&frames, format);

    Ok(SUCCESS)
}

fn resolve_input(args: &EncodeArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --json or --file is required"))
}

/// Accept one message object or an array of them.
fn parse_messages(text: &str) -> CliResult<Vec<Message>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| CliError::new(USAGE, format!("input is not valid JSON: {err}")))?;

    let messages = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Message>, _>>(),
        other => serde_json::from_value(other).map(|message| vec![message]),
    };
    messages.map_err(|err| CliError::new(DATA_INVALID, format!("invalid message: {err}")))
}

fn encode_one(builder: &FrameBuilder, message: &Message) -> CliResult<EncodedFrame> {
    let bytes = builder
        .build(message)
        .map_err(|err| frame_error("encode failed", err))?;

    let frame_type = message.frame_type();
    let frame_id = if frame_type.has_frame_id() {
        unescape(&bytes).get(4).copied()
    } else {
        None
    };

    Ok(EncodedFrame {
        frame_type,
        frame_id,
        length: bytes.len(),
        bytes: bytes.to_vec(),
    })
}
