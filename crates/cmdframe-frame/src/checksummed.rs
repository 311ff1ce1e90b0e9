//! Checksum-protected outer frames.
//!
//! ```text
//! ┌────────────┬──────────────────┬───────────────────────────┐
//! │ Magic (NB) │ Checksum (4B BE) │ Protected payload         │
//! │            │ CRC-32C(payload) │ (usually a message frame) │
//! └────────────┴──────────────────┴───────────────────────────┘
//! ```
//!
//! The magic marker is agreed with peers out of band, so the codec takes it as
//! configuration rather than defining one.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::checksum::{checksum, crc32c, CHECKSUM_WIDTH};
use crate::error::{FrameError, Result};

/// Non-empty byte marker that opens every checksummed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Magic(Bytes);

impl Magic {
    /// Create a magic marker. Fails with [`FrameError::InvalidMagic`] if empty.
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(FrameError::InvalidMagic);
        }
        Ok(Self(bytes))
    }

    /// Marker width in bytes.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Builds and verifies checksummed frames for one magic marker.
#[derive(Debug, Clone)]
pub struct ChecksumCodec {
    magic: Magic,
}

impl ChecksumCodec {
    pub fn new(magic: Magic) -> Self {
        Self { magic }
    }

    /// The configured magic marker.
    pub fn magic(&self) -> &Magic {
        &self.magic
    }

    /// Bytes preceding the protected payload: magic plus checksum field.
    pub fn header_len(&self) -> usize {
        self.magic.width() + CHECKSUM_WIDTH
    }

    /// Whether `frame` starts with the magic marker.
    ///
    /// A frame shorter than the marker is [`FrameError::Malformed`]; callers
    /// must buffer enough bytes before asking.
    pub fn has_checksum(&self, frame: &[u8]) -> Result<bool> {
        let width = self.magic.width();
        let head = frame.get(..width).ok_or(FrameError::Malformed {
            needed: width,
            actual: frame.len(),
        })?;
        Ok(head == self.magic.as_bytes())
    }

    /// Verify a checksummed frame and return the protected payload.
    ///
    /// The magic bytes themselves are not inspected; branch on
    /// [`has_checksum`](Self::has_checksum) first.
    pub fn verify_checksum<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let (received, payload) = self.split_header(data)?;
        let computed = crc32c(payload);
        if received != computed {
            warn!(
                received = format_args!("{received:#010x}"),
                computed = format_args!("{computed:#010x}"),
                payload_len = payload.len(),
                "checksum mismatch"
            );
            return Err(FrameError::ChecksumMismatch { received, computed });
        }
        Ok(payload)
    }

    /// Like [`verify_checksum`](Self::verify_checksum) but returns a view into
    /// `data` without copying.
    pub fn verify_checksum_bytes(&self, data: Bytes) -> Result<Bytes> {
        self.verify_checksum(&data)?;
        Ok(data.slice(self.header_len()..))
    }

    /// Wrap `payload` in a checksummed frame.
    pub fn build_checksum_frame(&self, payload: &[u8]) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.header_len() + payload.len());
        self.encode_checksum_frame(payload, &mut dst);
        dst.freeze()
    }

    /// Append a checksummed frame for `payload` to `dst`.
    pub fn encode_checksum_frame(&self, payload: &[u8], dst: &mut BytesMut) {
        dst.reserve(self.header_len() + payload.len());
        dst.put_slice(self.magic.as_bytes());
        dst.put_slice(&checksum(payload));
        dst.put_slice(payload);
    }

    /// Whether `prefix` could still grow into a frame that starts with the
    /// magic marker.
    pub(crate) fn may_start_with_magic(&self, prefix: &[u8]) -> bool {
        let magic = self.magic.as_bytes();
        let n = prefix.len().min(magic.len());
        prefix[..n] == magic[..n]
    }

    fn split_header<'a>(&self, data: &'a [u8]) -> Result<(u32, &'a [u8])> {
        let header_len = self.header_len();
        if data.len() < header_len {
            return Err(FrameError::Malformed {
                needed: header_len,
                actual: data.len(),
            });
        }
        let width = self.magic.width();
        let mut field = [0u8; CHECKSUM_WIDTH];
        field.copy_from_slice(&data[width..header_len]);
        Ok((u32::from_be_bytes(field), &data[header_len..]))
    }
}
