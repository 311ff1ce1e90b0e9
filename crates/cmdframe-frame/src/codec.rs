use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::checksummed::ChecksumCodec;
use crate::error::{FrameError, Result};
use crate::message::{decode_size_field, put_message_frame, split_message_frame, SIZE_FIELD_WIDTH};

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// A decoded message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The message payload, size field stripped.
    pub payload: Bytes,
    /// Whether the frame arrived inside a checksummed frame.
    pub checksummed: bool,
}

impl Frame {
    /// Create a plain frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            checksummed: false,
        }
    }

    /// The total wire size of this frame under `config`.
    pub fn wire_size(&self, config: &FrameConfig) -> usize {
        let outer = config.checksum.as_ref().map_or(0, ChecksumCodec::header_len);
        outer + SIZE_FIELD_WIDTH + self.payload.len()
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// When set, outgoing frames are checksummed and incoming checksummed
    /// frames are recognised and verified.
    ///
    /// Plain frames are told apart by their first bytes, so pick a magic whose
    /// first byte is non-zero. A size prefix starts with `0x00` for payloads
    /// under 16 MiB, and while buffered bytes still match the magic the
    /// decoder waits for more input instead of decoding a plain frame.
    pub checksum: Option<ChecksumCodec>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            checksum: None,
        }
    }
}

/// Encode `payload` into the wire format.
///
/// Wire format:
/// ```text
/// plain:       [ Size (4B BE) ][ Payload ]
/// checksummed: [ Magic ][ CRC-32C (4B BE) ][ Size (4B BE) ][ Payload ]
/// ```
pub fn encode_frame(payload: &[u8], config: &FrameConfig, dst: &mut BytesMut) -> Result<()> {
    if payload.len() > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: config.max_payload_size,
        });
    }

    match &config.checksum {
        Some(codec) => {
            let mut inner = BytesMut::with_capacity(SIZE_FIELD_WIDTH + payload.len());
            put_message_frame(payload, &mut inner)?;
            codec.encode_checksum_frame(&inner, dst);
        }
        None => put_message_frame(payload, dst)?,
    }

    trace!(
        payload_len = payload.len(),
        checksummed = config.checksum.is_some(),
        "encoded frame"
    );
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Frame>> {
    if let Some(codec) = &config.checksum {
        if src.len() < codec.magic().width() {
            if codec.may_start_with_magic(src) {
                return Ok(None); // Need more data
            }
        } else if codec.has_checksum(src)? {
            return decode_checksummed(src, codec, config.max_payload_size);
        }
    }

    decode_plain(src, config.max_payload_size)
}

fn decode_plain(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < SIZE_FIELD_WIDTH {
        return Ok(None); // Need more data
    }

    let payload_len = checked_size(src, max_payload)?;
    let total = SIZE_FIELD_WIDTH + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(SIZE_FIELD_WIDTH);
    let payload = src.split_to(payload_len).freeze();
    trace!(payload_len, "decoded plain frame");

    Ok(Some(Frame {
        payload,
        checksummed: false,
    }))
}

fn decode_checksummed(
    src: &mut BytesMut,
    codec: &ChecksumCodec,
    max_payload: usize,
) -> Result<Option<Frame>> {
    let header_len = codec.header_len();
    if src.len() < header_len + SIZE_FIELD_WIDTH {
        return Ok(None); // Need more data
    }

    let payload_len = checked_size(&src[header_len..], max_payload)?;
    let total = header_len + SIZE_FIELD_WIDTH + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let wire = src.split_to(total).freeze();
    let inner = codec.verify_checksum_bytes(wire)?;
    let payload_len = split_message_frame(&inner)?.len();
    let payload = inner.slice(SIZE_FIELD_WIDTH..);
    trace!(payload_len, "decoded checksummed frame");

    Ok(Some(Frame {
        payload,
        checksummed: true,
    }))
}

fn checked_size(src: &[u8], max_payload: usize) -> Result<usize> {
    let size = decode_size_field(src)? as usize;
    if size > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size,
            max: max_payload,
        });
    }
    Ok(size)
}
