//! Size-prefixed message framing with optional CRC-32C checksummed frames.
//!
//! Every message travels as a message frame:
//! - A 4-byte big-endian payload length
//! - The serialized message payload
//!
//! A message frame may be wrapped in a checksummed frame:
//! - A magic marker agreed with the peer (any non-empty width)
//! - A 4-byte big-endian CRC-32C (Castagnoli) of everything after it
//! - The protected payload, normally the message frame
//!
//! Readers peek for the magic marker to tell the two apart. All encode and
//! verify operations are pure functions over byte buffers; the CRC table is a
//! compile-time constant.

pub mod checksum;
pub mod checksummed;
pub mod codec;
pub mod error;
pub mod message;
pub mod reader;
pub mod serializer;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use checksum::{checksum, crc32c, Crc32c, CHECKSUM_WIDTH};
pub use checksummed::{ChecksumCodec, Magic};
pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD};
pub use error::{BoxError, FrameError, Result};
pub use message::{
    build_message_frame, build_message_frame_from_bytes, decode_size_field, encode_size_field,
    parse_message_frame, split_message_frame, SIZE_FIELD_WIDTH,
};
pub use reader::FrameReader;
pub use serializer::{MessageCodec, RawCodec};
pub use writer::FrameWriter;

#[cfg(feature = "json")]
pub use serializer::JsonCodec;

#[cfg(feature = "async")]
pub use tokio_codec::CmdFrameCodec;
