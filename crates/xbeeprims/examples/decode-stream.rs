//! Decode a captured serial stream, delivered in arbitrary chunks.
//!
//! Run with:
//!   cargo run --example decode-stream

use xbeeprims::frame::{CodecConfig, Event, FrameCodec};

// Line noise, a transmit status, a sensor read and a frame type with no
// parser, as a radio in API mode 1 might deliver them.
const CAPTURE: &str = concat!(
    "ff13",
    "7e00078b01000000000073",
    "7e0017940013a20040522baadd6c0103000200ce00ea0052016a8b",
    "7e0002a0015e",
);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stream = hex::decode(CAPTURE)?;
    let mut codec = FrameCodec::new(CodecConfig::default());

    // Serial reads rarely line up with frame boundaries.
    for chunk in stream.chunks(5) {
        codec.feed(chunk);
        for event in codec.events() {
            match event {
                Event::Frame(message) => {
                    println!("{}", message.frame_type());
                    println!("{}", serde_json::to_string_pretty(&message)?);
                }
                Event::Raw(frame) => println!("raw frame: {}", hex::encode(&frame)),
                Event::Error(err) => eprintln!("frame error: {err}"),
            }
        }
    }

    Ok(())
}
