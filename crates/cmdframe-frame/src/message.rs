//! Size-prefixed message frames.
//!
//! ```text
//! ┌──────────────┬──────────────────────┐
//! │ Size (4B BE) │ Payload (Size bytes) │
//! └──────────────┴──────────────────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::serializer::MessageCodec;

/// Width in bytes of the size field.
pub const SIZE_FIELD_WIDTH: usize = 4;

/// Encode `size` as a big-endian u32 size field.
pub fn encode_size_field(size: usize) -> Result<[u8; SIZE_FIELD_WIDTH]> {
    let value = u32::try_from(size).map_err(|_| FrameError::Encoding { size })?;
    Ok(value.to_be_bytes())
}

/// Read the size field at the start of `bytes`.
pub fn decode_size_field(bytes: &[u8]) -> Result<u32> {
    let field: [u8; SIZE_FIELD_WIDTH] = bytes
        .get(..SIZE_FIELD_WIDTH)
        .and_then(|b| b.try_into().ok())
        .ok_or(FrameError::Malformed {
            needed: SIZE_FIELD_WIDTH,
            actual: bytes.len(),
        })?;
    Ok(u32::from_be_bytes(field))
}

/// Serialize `message` and prefix it with its size.
///
/// Returns the total wire length (payload plus size field) together with the
/// frame bytes. Codec failures surface as [`FrameError::Serialization`] with
/// the codec's error as the source.
pub fn build_message_frame<M, C>(codec: &C, message: &M) -> Result<(usize, Bytes)>
where
    C: MessageCodec<M>,
{
    let payload = codec
        .serialize(message)
        .map_err(|err| FrameError::Serialization(Box::new(err)))?;
    build_message_frame_from_bytes(&payload)
}

/// Prefix already serialized `payload` with its size.
pub fn build_message_frame_from_bytes(payload: &[u8]) -> Result<(usize, Bytes)> {
    let mut dst = BytesMut::with_capacity(SIZE_FIELD_WIDTH + payload.len());
    put_message_frame(payload, &mut dst)?;
    Ok((dst.len(), dst.freeze()))
}

/// Append a message frame for `payload` to `dst`.
pub fn put_message_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let size = encode_size_field(payload.len())?;
    dst.reserve(SIZE_FIELD_WIDTH + payload.len());
    dst.put_slice(&size);
    dst.put_slice(payload);
    Ok(())
}

/// Strip the size field from a complete message frame.
///
/// The declared size must match the number of trailing bytes exactly.
pub fn split_message_frame(frame: &[u8]) -> Result<&[u8]> {
    let declared = decode_size_field(frame)? as usize;
    let payload = &frame[SIZE_FIELD_WIDTH..];
    if payload.len() != declared {
        return Err(FrameError::SizeMismatch {
            declared,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

/// Strip the size field and deserialize the payload.
pub fn parse_message_frame<M, C>(codec: &C, frame: &[u8]) -> Result<M>
where
    C: MessageCodec<M>,
{
    let payload = split_message_frame(frame)?;
    codec
        .deserialize(payload)
        .map_err(|err| FrameError::Deserialization(Box::new(err)))
}
