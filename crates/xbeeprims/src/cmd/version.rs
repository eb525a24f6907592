use xbeeprims_frame::{FrameType, DEFAULT_BUFFER_SIZE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("xbeeprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let encodable = FrameType::ALL.iter().filter(|ft| ft.can_encode()).count();
    let decodable = FrameType::ALL.iter().filter(|ft| ft.can_decode()).count();

    println!("name: xbeeprims");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("XBEEPRIMS_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("features: async={}, cli=true", cfg!(feature = "async"));
    println!(
        "frame_types: {} known, {encodable} encode, {decodable} decode",
        FrameType::ALL.len()
    );
    println!("buffer_size: {DEFAULT_BUFFER_SIZE}");

    Ok(SUCCESS)
}
