//! The seam between framing and the message schema.
//!
//! Framing never interprets payloads. A [`MessageCodec`] turns a message into
//! bytes and back; its errors are carried through [`FrameError::Serialization`]
//! and [`FrameError::Deserialization`] with the original error as the source.
//!
//! [`FrameError::Serialization`]: crate::FrameError::Serialization
//! [`FrameError::Deserialization`]: crate::FrameError::Deserialization

use std::convert::Infallible;

use bytes::Bytes;

/// Serializes and deserializes messages of type `M`.
pub trait MessageCodec<M> {
    /// Error reported by the codec.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encode `message` into its wire payload.
    fn serialize(&self, message: &M) -> Result<Vec<u8>, Self::Error>;

    /// Decode a wire payload into a message.
    fn deserialize(&self, bytes: &[u8]) -> Result<M, Self::Error>;
}

/// Pass-through codec for payloads that are already bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl MessageCodec<Bytes> for RawCodec {
    type Error = Infallible;

    fn serialize(&self, message: &Bytes) -> Result<Vec<u8>, Self::Error> {
        Ok(message.to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Bytes, Self::Error> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

impl MessageCodec<Vec<u8>> for RawCodec {
    type Error = Infallible;

    fn serialize(&self, message: &Vec<u8>) -> Result<Vec<u8>, Self::Error> {
        Ok(message.clone())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<u8>, Self::Error> {
        Ok(bytes.to_vec())
    }
}

/// JSON codec for any serde message type.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl<M> MessageCodec<M> for JsonCodec
where
    M: serde::Serialize + serde::de::DeserializeOwned,
{
    type Error = serde_json::Error;

    fn serialize(&self, message: &M) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(message)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<M, Self::Error> {
        serde_json::from_slice(bytes)
    }
}
