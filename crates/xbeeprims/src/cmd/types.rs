use xbeeprims_frame::{FrameType, ProtocolFamily};

use crate::cmd::TypesArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame_types, OutputFormat};

pub fn run(args: TypesArgs, format: OutputFormat) -> CliResult<i32> {
    let frame_types = select(args.family.map(ProtocolFamily::from));
    print_frame_types(&frame_types, format);
    Ok(SUCCESS)
}

fn select(family: Option<ProtocolFamily>) -> Vec<FrameType> {
    let mut frame_types: Vec<FrameType> = FrameType::ALL
        .iter()
        .copied()
        .filter(|ft| family.is_none_or(|family| family.supports(*ft)))
        .collect();
    frame_types.sort_by_key(|ft| ft.tag());
    frame_types
}
