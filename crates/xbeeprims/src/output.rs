use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xbeeprims_frame::{Event, FrameType, Message};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventOutput<'a> {
    Frame {
        frame_type: &'static str,
        frame_id: Option<u8>,
        message: &'a Message,
    },
    Raw {
        frame_type: String,
        frame: String,
    },
    Error {
        error: String,
    },
}

impl<'a> EventOutput<'a> {
    fn from_event(event: &'a Event) -> Self {
        match event {
            Event::Frame(message) => EventOutput::Frame {
                frame_type: message.frame_type().name(),
                frame_id: message.frame_id(),
                message,
            },
            Event::Raw(frame) => EventOutput::Raw {
                frame_type: raw_type_label(frame),
                frame: hex::encode(frame),
            },
            Event::Error(err) => EventOutput::Error {
                error: err.to_string(),
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            EventOutput::Frame { .. } => "frame",
            EventOutput::Raw { .. } => "raw",
            EventOutput::Error { .. } => "error",
        }
    }
}

/// A frame produced by `encode`, with the id that ended up on the wire.
#[derive(Debug, Serialize)]
pub struct EncodedFrame {
    pub frame_type: FrameType,
    pub frame_id: Option<u8>,
    pub length: usize,
    #[serde(serialize_with = "serialize_hex")]
    pub bytes: Vec<u8>,
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

#[derive(Serialize)]
struct FrameTypeOutput {
    tag: String,
    id: FrameType,
    name: &'static str,
    encode: bool,
    decode: bool,
    frame_id: bool,
}

pub fn print_event(event: &Event, format: OutputFormat) {
    let out = EventOutput::from_event(event);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let (frame_type, frame_id, detail) = match &out {
                EventOutput::Frame {
                    frame_type,
                    frame_id,
                    message,
                } => (
                    frame_type.to_string(),
                    frame_id.map(|id| id.to_string()).unwrap_or_default(),
                    serde_json::to_string(message).unwrap_or_default(),
                ),
                EventOutput::Raw { frame_type, frame } => {
                    (frame_type.clone(), String::new(), frame.clone())
                }
                EventOutput::Error { error } => (String::new(), String::new(), error.clone()),
            };
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "TYPE", "ID", "DETAIL"])
                .add_row(vec![out.kind().to_string(), frame_type, frame_id, detail]);
            println!("{table}");
        }
        OutputFormat::Pretty => match &out {
            EventOutput::Frame {
                frame_type,
                frame_id,
                message,
            } => {
                let id = frame_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
                println!("frame {frame_type} id={id}");
                println!(
                    "{}",
                    serde_json::to_string_pretty(message).unwrap_or_default()
                );
            }
            EventOutput::Raw { frame_type, frame } => {
                println!("raw {frame_type} {frame}");
            }
            EventOutput::Error { error } => println!("error {error}"),
        },
        OutputFormat::Raw => match event {
            Event::Frame(message) => {
                println!("{}", serde_json::to_string(message).unwrap_or_default());
            }
            Event::Raw(frame) => print_raw(frame),
            Event::Error(err) => tracing::warn!(error = %err, "frame error"),
        },
    }
}

pub fn print_encoded(frames: &[EncodedFrame], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for frame in frames {
                println!(
                    "{}",
                    serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "ID", "LENGTH", "FRAME"]);
            for frame in frames {
                table.add_row(vec![
                    frame.frame_type.name().to_string(),
                    frame.frame_id.map(|id| id.to_string()).unwrap_or_default(),
                    frame.length.to_string(),
                    hex::encode(&frame.bytes),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for frame in frames {
                println!("{}", spaced_hex(&frame.bytes));
            }
        }
        OutputFormat::Raw => {
            for frame in frames {
                print_raw(&frame.bytes);
            }
        }
    }
}

pub fn print_frame_types(frame_types: &[FrameType], format: OutputFormat) {
    let rows: Vec<FrameTypeOutput> = frame_types
        .iter()
        .map(|ft| FrameTypeOutput {
            tag: format!("0x{:02x}", ft.tag()),
            id: *ft,
            name: ft.name(),
            encode: ft.can_encode(),
            decode: ft.can_decode(),
            frame_id: ft.has_frame_id(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TAG", "NAME", "ENCODE", "DECODE", "FRAME ID"]);
            for row in &rows {
                table.add_row(vec![
                    row.tag.clone(),
                    row.name.to_string(),
                    yes_no(row.encode).to_string(),
                    yes_no(row.decode).to_string(),
                    yes_no(row.frame_id).to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Raw => {
            for row in &rows {
                println!("{}\t{}", row.tag, row.name);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Uppercase, space-separated hex, the way radio datasheets print frames.
pub fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn raw_type_label(frame: &[u8]) -> String {
    match frame.get(3) {
        Some(tag) => match FrameType::try_from(*tag) {
            Ok(frame_type) => frame_type.name().to_string(),
            Err(_) => format!("0x{tag:02x}"),
        },
        None => "unknown".to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
