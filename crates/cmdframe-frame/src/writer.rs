use std::io::{self, ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::serializer::MessageCodec;

/// Pushes frames into a blocking byte sink, one `write_all` plus flush each.
///
/// With a checksum codec configured every frame goes out checksummed.
pub struct FrameWriter<W> {
    sink: W,
    scratch: BytesMut,
    config: FrameConfig,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, FrameConfig::default())
    }

    pub fn with_config(sink: W, config: FrameConfig) -> Self {
        Self {
            sink,
            scratch: BytesMut::new(),
            config,
        }
    }

    /// Frame `payload` and write it out.
    ///
    /// Nothing reaches the sink if encoding fails. A sink that accepts zero
    /// bytes yields [`FrameError::ConnectionClosed`]; `WouldBlock` is returned
    /// as [`FrameError::Io`] and the frame may be partially written.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.scratch.clear();
        encode_frame(payload, &self.config, &mut self.scratch)?;
        self.sink
            .write_all(&self.scratch)
            .and_then(|()| self.sink.flush())
            .map_err(closed_or_io)
    }

    /// Re-send a decoded frame's payload under this writer's configuration.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(&frame.payload)
    }

    /// Serialize `message` with `codec` and send it as one frame.
    pub fn send_message<M, C>(&mut self, codec: &C, message: &M) -> Result<()>
    where
        C: MessageCodec<M>,
    {
        let payload = codec
            .serialize(message)
            .map_err(|err| FrameError::Serialization(Box::new(err)))?;
        self.send(&payload)
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn closed_or_io(err: io::Error) -> FrameError {
    match err.kind() {
        ErrorKind::WriteZero => FrameError::ConnectionClosed,
        _ => FrameError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::checksum::checksum;
    use crate::checksummed::{ChecksumCodec, Magic};
    use crate::reader::FrameReader;

    fn guarded() -> FrameConfig {
        FrameConfig {
            checksum: Some(ChecksumCodec::new(
                Magic::new(Bytes::from_static(b"\xC3\x5A")).unwrap(),
            )),
            ..FrameConfig::default()
        }
    }

    /// Records writes and flushes; optionally fails the first write.
    #[derive(Default)]
    struct Recorder {
        data: Vec<u8>,
        writes: usize,
        flushes: usize,
        fail_first: Option<ErrorKind>,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if let Some(kind) = self.fail_first.take() {
                return Err(io::Error::from(kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn checksummed_layout_on_the_wire() {
        let mut writer = FrameWriter::with_config(Recorder::default(), guarded());
        writer.send(b"abc").unwrap();

        let sink = writer.into_inner();
        let inner = b"\x00\x00\x00\x03abc";
        assert_eq!(&sink.data[..2], b"\xC3\x5A");
        assert_eq!(sink.data[2..6], checksum(inner));
        assert_eq!(&sink.data[6..], inner);
    }

    #[test]
    fn flushes_once_per_frame() {
        let mut writer = FrameWriter::with_config(Recorder::default(), guarded());
        writer.send(b"one").unwrap();
        writer.send(b"two").unwrap();

        assert_eq!(writer.into_inner().flushes, 2);
    }

    #[test]
    fn oversized_payload_never_reaches_sink() {
        let config = FrameConfig {
            max_payload_size: 4,
            ..guarded()
        };
        let mut writer = FrameWriter::with_config(Recorder::default(), config);

        let err = writer.send(b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));

        let sink = writer.into_inner();
        assert_eq!(sink.writes, 0);
        assert!(sink.data.is_empty());
    }

    #[test]
    fn would_block_is_returned_not_retried() {
        let sink = Recorder {
            fail_first: Some(ErrorKind::WouldBlock),
            ..Recorder::default()
        };
        let mut writer = FrameWriter::with_config(sink, guarded());

        let err = writer.send(b"busy").unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(writer.into_inner().writes, 1);
    }

    #[test]
    fn interrupted_write_is_retried() {
        let sink = Recorder {
            fail_first: Some(ErrorKind::Interrupted),
            ..Recorder::default()
        };
        let mut writer = FrameWriter::new(sink);
        writer.send(b"retry").unwrap();

        assert_eq!(writer.into_inner().data, b"\x00\x00\x00\x05retry");
    }

    #[test]
    fn zero_length_write_means_closed() {
        let mut full = [0u8; 3];
        let mut writer = FrameWriter::new(&mut full[..]);

        let err = writer.send(b"does not fit").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn decoded_frame_can_be_rewrapped() {
        let mut plain = FrameWriter::new(Vec::<u8>::new());
        plain.send(b"forward me").unwrap();

        let wire = plain.into_inner();
        let mut reader = FrameReader::new(wire.as_slice());
        let frame = reader.read_frame().unwrap();
        assert!(!frame.checksummed);

        let mut guarded_writer = FrameWriter::with_config(Vec::<u8>::new(), guarded());
        guarded_writer.write_frame(&frame).unwrap();
        assert!(guarded_writer.config().checksum.is_some());

        let wire = guarded_writer.into_inner();
        let mut reader = FrameReader::with_config(wire.as_slice(), guarded());
        let again = reader.read_frame().unwrap();
        assert!(again.checksummed);
        assert_eq!(again.payload, frame.payload);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_message_roundtrip_with_checksum() {
        let mut writer = FrameWriter::with_config(Vec::<u8>::new(), guarded());
        let command = serde_json::json!({"op": "reload", "seq": 4});
        writer
            .send_message(&crate::serializer::JsonCodec, &command)
            .unwrap();

        let wire = writer.into_inner();
        let mut reader = FrameReader::with_config(wire.as_slice(), guarded());
        let back: serde_json::Value = reader
            .read_message(&crate::serializer::JsonCodec)
            .unwrap();
        assert_eq!(back, command);
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = FrameWriter::with_config(left, guarded());
        let mut reader = FrameReader::with_config(right, guarded());

        let sender = std::thread::spawn(move || {
            for i in 0..32u8 {
                writer.send(&[i; 100]).unwrap();
            }
        });

        for i in 0..32u8 {
            let frame = reader.read_frame().unwrap();
            assert!(frame.checksummed);
            assert_eq!(frame.payload.as_ref(), &[i; 100][..]);
        }
        sender.join().unwrap();
    }
}
