/// Boxed error produced by an external message codec.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload size does not fit in the 4-byte size field.
    #[error("size {size} is not representable as a u32 size field")]
    Encoding { size: usize },

    /// The message codec failed to serialize a message.
    #[error("message serialization failed: {0}")]
    Serialization(#[source] BoxError),

    /// The message codec failed to deserialize a payload.
    #[error("message deserialization failed: {0}")]
    Deserialization(#[source] BoxError),

    /// The input is shorter than the fixed header width an operation requires.
    #[error("malformed frame: need at least {needed} bytes, got {actual}")]
    Malformed { needed: usize, actual: usize },

    /// The size field disagrees with the number of bytes that follow it.
    #[error("size field declares {declared} bytes but {actual} follow")]
    SizeMismatch { declared: usize, actual: usize },

    /// The received checksum differs from the one computed over the payload.
    #[error("checksum mismatch: received {received:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { received: u32, computed: u32 },

    /// The configured magic marker is empty.
    #[error("magic marker must not be empty")]
    InvalidMagic,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;

impl FrameError {
    /// Returns true when the error means the bytes on the wire are corrupt.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            FrameError::ChecksumMismatch { .. }
                | FrameError::Malformed { .. }
                | FrameError::SizeMismatch { .. }
        )
    }
}
