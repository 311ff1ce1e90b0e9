use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::serializer::MessageCodec;

const READ_CHUNK: usize = 8 * 1024;

/// Pulls frames out of a blocking byte source.
///
/// Bytes are accumulated until [`decode_frame`] yields a frame, so a frame may
/// arrive split across any number of reads. A corrupt checksummed frame is
/// consumed before its error is returned; the next call resumes at the frame
/// after it.
pub struct FrameReader<R> {
    source: R,
    pending: BytesMut,
    config: FrameConfig,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    pub fn with_config(source: R, config: FrameConfig) -> Self {
        Self {
            source,
            pending: BytesMut::new(),
            config,
        }
    }

    /// Block until the next frame is complete.
    ///
    /// End of input yields [`FrameError::ConnectionClosed`]; check
    /// [`buffered`](Self::buffered) to tell a clean end from a truncated frame.
    /// `WouldBlock` from the source is returned as [`FrameError::Io`].
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.pending, &self.config)? {
                return Ok(frame);
            }
            if self.fill()? == 0 {
                return Err(FrameError::ConnectionClosed);
            }
        }
    }

    /// Read the next frame and deserialize its payload with `codec`.
    pub fn read_message<M, C>(&mut self, codec: &C) -> Result<M>
    where
        C: MessageCodec<M>,
    {
        let frame = self.read_frame()?;
        codec
            .deserialize(&frame.payload)
            .map_err(|err| FrameError::Deserialization(Box::new(err)))
    }

    /// Bytes received but not yet part of a decoded frame.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn fill(&mut self) -> Result<usize> {
        let start = self.pending.len();
        self.pending.resize(start + READ_CHUNK, 0);
        let result = loop {
            match self.source.read(&mut self.pending[start..]) {
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                other => break other,
            }
        };
        let read = *result.as_ref().unwrap_or(&0);
        self.pending.truncate(start + read);
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use bytes::Bytes;

    use super::*;
    use crate::checksum::crc32c;
    use crate::checksummed::{ChecksumCodec, Magic};
    use crate::codec::encode_frame;

    fn guarded() -> FrameConfig {
        FrameConfig {
            checksum: Some(ChecksumCodec::new(
                Magic::new(Bytes::from_static(b"\xC3\x5A")).unwrap(),
            )),
            ..FrameConfig::default()
        }
    }

    fn encode_all(config: &FrameConfig, payloads: &[&[u8]]) -> Vec<u8> {
        let mut wire = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, config, &mut wire).unwrap();
        }
        wire.to_vec()
    }

    /// Hands out one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0.len()).min(1);
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn mixed_stream_keeps_checksum_flags() {
        let mut wire = encode_all(&guarded(), &[b"alpha"]);
        wire.extend(encode_all(&FrameConfig::default(), &[b"beta"]));
        wire.extend(encode_all(&guarded(), &[b""]));

        let mut reader = FrameReader::with_config(Cursor::new(wire), guarded());
        let flags: Vec<(Vec<u8>, bool)> = (0..3)
            .map(|_| reader.read_frame().unwrap())
            .map(|frame| (frame.payload.to_vec(), frame.checksummed))
            .collect();

        assert_eq!(
            flags,
            vec![
                (b"alpha".to_vec(), true),
                (b"beta".to_vec(), false),
                (Vec::new(), true),
            ]
        );
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn magic_split_across_reads() {
        let wire = encode_all(&guarded(), &[b"trickled", b"again"]);
        let mut reader = FrameReader::with_config(Trickle(&wire), guarded());

        assert_eq!(reader.read_frame().unwrap().payload.as_ref(), b"trickled");
        let second = reader.read_frame().unwrap();
        assert!(second.checksummed);
        assert_eq!(second.payload.as_ref(), b"again");
    }

    #[test]
    fn corrupt_frame_reports_values_then_resumes() {
        let mut wire = encode_all(&guarded(), &[b"damaged", b"intact"]);
        // Last payload byte of the first frame.
        wire[2 + 4 + 4 + 6] ^= 0x40;

        let mut reader = FrameReader::with_config(Cursor::new(wire), guarded());
        match reader.read_frame() {
            Err(FrameError::ChecksumMismatch { received, computed }) => {
                assert_eq!(received, crc32c(b"\x00\x00\x00\x07damaged"));
                assert_eq!(computed, crc32c(b"\x00\x00\x00\x07damage$"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let next = reader.read_frame().unwrap();
        assert_eq!(next.payload.as_ref(), b"intact");
    }

    #[test]
    fn truncated_checksummed_frame_stays_buffered() {
        let wire = encode_all(&guarded(), &[b"cut short"]);
        let cut = wire.len() - 3;

        let mut reader = FrameReader::with_config(Cursor::new(&wire[..cut]), guarded());
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
        assert_eq!(reader.buffered(), cut);
    }

    #[test]
    fn oversized_declared_size_rejected_before_payload() {
        let config = FrameConfig {
            max_payload_size: 16,
            ..guarded()
        };
        let wire = b"\xC3\x5A\x00\x00\x00\x00\x00\x00\x04\x00".to_vec();

        let mut reader = FrameReader::with_config(Cursor::new(wire), config);
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::PayloadTooLarge { size: 1024, max: 16 })
        ));
        assert_eq!(reader.config().max_payload_size, 16);
    }

    #[test]
    fn typed_message_from_checksummed_frame() {
        let wire = encode_all(&guarded(), &[b"raw command"]);
        let mut reader = FrameReader::with_config(Cursor::new(wire), guarded());

        let message: Vec<u8> = reader.read_message(&crate::serializer::RawCodec).unwrap();
        assert_eq!(message, b"raw command");
    }

    #[cfg(feature = "json")]
    #[test]
    fn bad_json_payload_is_deserialization_error() {
        let wire = encode_all(&guarded(), &[b"{oops"]);
        let mut reader = FrameReader::with_config(Cursor::new(wire), guarded());

        let err = reader
            .read_message::<serde_json::Value, _>(&crate::serializer::JsonCodec)
            .unwrap_err();
        assert!(matches!(err, FrameError::Deserialization(_)));
    }

    #[test]
    fn would_block_surfaces_immediately() {
        struct NotReady(usize);

        impl Read for NotReady {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                self.0 += 1;
                Err(io::Error::from(ErrorKind::WouldBlock))
            }
        }

        let mut reader = FrameReader::new(NotReady(0));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(reader.into_inner().0, 1);
    }

    #[test]
    fn interrupted_read_is_retried() {
        struct SignalFirst {
            signalled: bool,
            wire: Cursor<Vec<u8>>,
        }

        impl Read for SignalFirst {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.signalled {
                    self.signalled = true;
                    return Err(io::Error::from(ErrorKind::Interrupted));
                }
                self.wire.read(buf)
            }
        }

        let source = SignalFirst {
            signalled: false,
            wire: Cursor::new(encode_all(&guarded(), &[b"after signal"])),
        };
        let mut reader = FrameReader::with_config(source, guarded());

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), b"after signal");
        assert_eq!(reader.buffered(), 0);
    }
}
