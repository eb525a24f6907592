//! Build request frames for a radio in escaped API mode.
//!
//! Run with:
//!   cargo run --example build-frames

use std::sync::Arc;

use xbeeprims::frame::{
    Address16, Address64, ApiMode, AtCommand, CodecConfig, FrameIdAllocator, FrameWriter, Message,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CodecConfig {
        api_mode: ApiMode::Escaped,
        ..CodecConfig::default()
    };

    // One allocator per radio so ids stay unique across writers.
    let ids = Arc::new(FrameIdAllocator::new());
    let mut writer = FrameWriter::with_allocator(Vec::new(), config, Arc::clone(&ids));

    writer.send(&Message::at_command(AtCommand::NJ, Vec::new()))?;
    writer.send(&Message::RemoteAtCommandRequest {
        id: None,
        destination64: "0013a20040401122".parse::<Address64>()?,
        destination16: Address16::UNKNOWN,
        remote_command_options: 0x02,
        command: "BH".parse()?,
        command_parameter: vec![0x01].into(),
    })?;
    writer.send(&Message::ZigbeeTransmitRequest {
        id: None,
        destination64: Address64::COORDINATOR,
        destination16: Address16::UNKNOWN,
        broadcast_radius: 0,
        options: 0,
        data: "TxData0A".into(),
    })?;

    println!("last frame id: {}", ids.last_id());
    println!("{}", hex::encode(writer.get_ref()));
    Ok(())
}
