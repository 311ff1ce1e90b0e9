use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use cmdframe_frame::Frame;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

const PREVIEW_LIMIT: usize = 64;

#[derive(Clone, Debug, Copy, ValueEnum)]
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
struct FrameOutput {
    index: usize,
    checksummed: bool,
    payload_size: usize,
    payload: String,
}

pub fn print_frame(index: usize, frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                index,
                checksummed: frame.checksummed,
                payload_size: frame.payload.len(),
                payload: payload_preview(frame.payload.as_ref()),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "CHECKSUM", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    yes_no(frame.checksummed).to_string(),
                    frame.payload.len().to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame={} checksummed={} size={} payload={}",
                index,
                frame.checksummed,
                frame.payload.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

#[derive(Serialize)]
pub struct ChecksumReport {
    pub algorithm: &'static str,
    pub checksum: String,
    pub length: usize,
}

pub fn print_checksum(report: &ChecksumReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["ALGORITHM", "CHECKSUM", "LENGTH"])
                .add_row(vec![
                    report.algorithm.to_string(),
                    report.checksum.clone(),
                    report.length.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => println!("{}", report.checksum),
    }
}

#[derive(Serialize)]
pub struct VerifyReport {
    pub valid: bool,
    pub checksum: String,
    pub payload_size: usize,
    /// Size declared by the inner message frame, when the payload is one.
    pub message_size: Option<u32>,
}

pub fn print_verify(report: &VerifyReport, payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["VALID", "CHECKSUM", "PAYLOAD", "MESSAGE"])
                .add_row(vec![
                    yes_no(report.valid).to_string(),
                    report.checksum.clone(),
                    report.payload_size.to_string(),
                    report
                        .message_size
                        .map_or_else(|| "-".to_string(), |size| size.to_string()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "valid={} checksum={} payload_size={}",
            report.valid, report.checksum, report.payload_size
        ),
        OutputFormat::Raw => print_raw(payload),
    }
}

#[derive(Serialize)]
pub struct FrameWritten {
    pub wire_size: usize,
    pub payload_size: usize,
    pub checksummed: bool,
}

pub fn print_written(report: &FrameWritten, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        _ => println!(
            "wrote frame: wire_size={} payload_size={} checksummed={}",
            report.wire_size, report.payload_size, report.checksummed
        ),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if text.len() <= PREVIEW_LIMIT => text.to_string(),
        Ok(_) | Err(_) if payload.len() <= PREVIEW_LIMIT => hex::encode(payload),
        _ => format!("<{} bytes>", payload.len()),
    }
}
