//! `tokio_util::codec` adapter over the frame wire format.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame, FrameConfig};
use crate::error::FrameError;

/// Frame codec for `FramedRead`/`FramedWrite`/`Framed`.
#[derive(Debug, Clone, Default)]
pub struct CmdFrameCodec {
    config: FrameConfig,
}

impl CmdFrameCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for CmdFrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        decode_frame(src, &self.config)
    }
}

impl Encoder<Bytes> for CmdFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(&item, &self.config, dst)
    }
}

impl Encoder<&[u8]> for CmdFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(item, &self.config, dst)
    }
}
