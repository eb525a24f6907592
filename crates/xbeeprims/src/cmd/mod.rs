use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use xbeeprims_frame::{ApiMode, ProtocolFamily, DEFAULT_VREF_ADC};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod types;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames from hex, a file, or stdin.
    Decode(DecodeArgs),
    /// Encode JSON messages into wire frames.
    Encode(EncodeArgs),
    /// List known frame types and which directions are supported.
    Types(TypesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Types(args) => types::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone)]
pub struct CodecArgs {
    /// API mode of the radio: 1 (unescaped) or 2 (escaped).
    #[arg(
        long,
        env = "XBEEPRIMS_API_MODE",
        default_value = "1",
        value_parser = parse_api_mode
    )]
    pub api_mode: ApiMode,
}

fn parse_api_mode(input: &str) -> Result<ApiMode, String> {
    let mode: u8 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid API mode: {input}"))?;
    ApiMode::try_from(mode).map_err(|err| err.to_string())
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (whitespace allowed).
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read frame bytes from a file or device.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub codec: CodecArgs,
    /// Emit frames as raw bytes instead of decoding them.
    #[arg(long)]
    pub raw_frames: bool,
    /// Keep analog samples as raw ADC counts.
    #[arg(long)]
    pub no_convert_adc: bool,
    /// ADC reference voltage in millivolts.
    #[arg(long, env = "XBEEPRIMS_VREF_ADC", default_value_t = DEFAULT_VREF_ADC)]
    pub vref_adc: u32,
    /// Exit after N events.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON message, or an array of messages.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the JSON message(s) from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub codec: CodecArgs,
    /// First frame id to assign to messages without one.
    #[arg(long, value_name = "ID")]
    pub frame_id_start: Option<u8>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    #[value(name = "802.15.4")]
    Ieee802154,
    Znet,
    Zigbee,
    Any,
}

impl From<FamilyArg> for ProtocolFamily {
    fn from(family: FamilyArg) -> Self {
        match family {
            FamilyArg::Ieee802154 => ProtocolFamily::Ieee802154,
            FamilyArg::Znet => ProtocolFamily::ZNet,
            FamilyArg::Zigbee => ProtocolFamily::ZigBee,
            FamilyArg::Any => ProtocolFamily::Any,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct TypesArgs {
    /// Only list frame types spoken by this firmware family.
    #[arg(long)]
    pub family: Option<FamilyArg>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
