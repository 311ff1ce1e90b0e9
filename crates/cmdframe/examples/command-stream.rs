//! Command stream example: JSON commands over TCP with checksummed frames.
//!
//! Run with:
//!   cargo run --example command-stream

use std::net::{TcpListener, TcpStream};
use std::thread;

use cmdframe::frame::{ChecksumCodec, FrameConfig, FrameReader, FrameWriter, JsonCodec, Magic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Command {
    op: String,
    seq: u32,
}

fn config() -> Result<FrameConfig, Box<dyn std::error::Error>> {
    let magic = Magic::new(b"\xC3\x5A".to_vec())?;
    Ok(FrameConfig {
        checksum: Some(ChecksumCodec::new(magic)),
        ..FrameConfig::default()
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let server_config = config()?;

    let server = thread::spawn(
        move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let (stream, peer) = listener.accept()?;
            eprintln!("[server] peer connected: {peer}");

            let mut reader = FrameReader::with_config(stream, server_config);
            for _ in 0..3 {
                let cmd: Command = reader.read_message(&JsonCodec)?;
                eprintln!("[server] {} (seq {})", cmd.op, cmd.seq);
            }
            Ok(())
        },
    );

    let stream = TcpStream::connect(addr)?;
    let mut writer = FrameWriter::with_config(stream, config()?);
    for (seq, op) in ["status", "reload", "shutdown"].into_iter().enumerate() {
        let cmd = Command {
            op: op.to_string(),
            seq: seq as u32,
        };
        writer.send_message(&JsonCodec, &cmd)?;
    }

    server
        .join()
        .map_err(|_| "server thread panicked")?
        .map_err(|err| err.to_string())?;
    Ok(())
}
