use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use cmdframe_frame::{ChecksumCodec, Magic, DEFAULT_MAX_PAYLOAD};
use tracing::debug;

use crate::exit::{frame_error, io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod checksum;
pub mod frame;
pub mod unframe;
pub mod verify;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wrap a payload in a frame and write the wire bytes.
    Frame(FrameArgs),
    /// Decode consecutive frames from a byte stream.
    Unframe(UnframeArgs),
    /// Print the CRC-32C of the input.
    Checksum(ChecksumArgs),
    /// Verify one checksummed frame.
    Verify(VerifyArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Frame(args) => frame::run(args, format),
        Command::Unframe(args) => unframe::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Verify(args) => verify::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read payload from file (default: stdin).
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Magic marker (hex) enabling the checksummed frame.
    #[arg(long, env = "CMDFRAME_MAGIC", value_name = "HEX")]
    pub magic: Option<String>,
    /// Write the frame to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Print the frame as hex instead of raw bytes.
    #[arg(long, conflicts_with = "out")]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct UnframeArgs {
    /// Read frames from file (default: stdin).
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Magic marker (hex) identifying checksummed frames.
    #[arg(long, env = "CMDFRAME_MAGIC", value_name = "HEX")]
    pub magic: Option<String>,
    /// Maximum accepted payload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
    /// Exit after decoding N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Raw string input.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read input from file (default: stdin).
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Magic marker (hex) the frame must start with.
    #[arg(long, env = "CMDFRAME_MAGIC", value_name = "HEX")]
    pub magic: String,
    /// Read the frame from file (default: stdin).
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a hex magic marker into a checksum codec.
pub(crate) fn parse_magic(input: &str) -> CliResult<ChecksumCodec> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits)
        .map_err(|err| CliError::new(USAGE, format!("--magic is not valid hex: {err}")))?;
    let magic = Magic::new(bytes).map_err(|err| frame_error("--magic", err))?;
    Ok(ChecksumCodec::new(magic))
}

/// Open the input source: the named file, or stdin.
pub(crate) fn open_input(path: Option<&Path>) -> CliResult<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Read the whole input source into memory.
pub(crate) fn read_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    let mut input = open_input(path)?;
    let mut data = Vec::new();
    input
        .read_to_end(&mut data)
        .map_err(|err| io_error("failed reading input", err))?;
    debug!(bytes = data.len(), "read input");
    Ok(data)
}
