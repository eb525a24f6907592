//! Decode frames from an async byte source with `tokio_util::codec`.
//!
//! Run with:
//!   cargo run --example async-decode --features async

use futures_util::StreamExt;
use tokio_util::codec::FramedRead;
use xbeeprims::frame::{Event, FrameCodec};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Modem status, transmit status, then a join notification with no parser.
    let wire = hex::decode("7e00028a066f7e00078b017d84000001717e0002a50159")?;
    let mut events = FramedRead::new(wire.as_slice(), FrameCodec::default());

    while let Some(event) = events.next().await {
        match event? {
            Event::Frame(message) => {
                println!("{:?} {}", message.frame_id(), message.frame_type());
            }
            Event::Raw(frame) => println!("raw frame: {}", hex::encode(&frame)),
            Event::Error(err) => eprintln!("frame error: {err}"),
        }
    }

    Ok(())
}
