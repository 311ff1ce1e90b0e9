//! Checksummed pipe example: shows corruption detection on the read side.
//!
//! Run with:
//!   cargo run --example checksummed-pipe

use std::io::Cursor;

use cmdframe::frame::{ChecksumCodec, FrameConfig, FrameError, FrameReader, FrameWriter, Magic};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FrameConfig {
        checksum: Some(ChecksumCodec::new(Magic::new(b"CF".to_vec())?)),
        ..FrameConfig::default()
    };

    let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), config.clone());
    writer.send(b"apply config v42")?;
    let mut wire = writer.into_inner().into_inner();
    eprintln!("wire bytes: {wire:02x?}");

    let mut reader = FrameReader::with_config(Cursor::new(wire.clone()), config.clone());
    let frame = reader.read_frame()?;
    eprintln!(
        "intact frame: {:?} (checksummed={})",
        String::from_utf8_lossy(&frame.payload),
        frame.checksummed
    );

    // Flip one payload bit.
    let last = wire.len() - 1;
    wire[last] ^= 0x01;

    let mut reader = FrameReader::with_config(Cursor::new(wire), config);
    match reader.read_frame() {
        Err(FrameError::ChecksumMismatch { received, computed }) => {
            eprintln!("corruption detected: received {received:#010x}, computed {computed:#010x}");
        }
        other => eprintln!("unexpected result: {other:?}"),
    }

    Ok(())
}
