use cmdframe_frame::{split_message_frame, ChecksumCodec};

use crate::cmd::{parse_magic, read_input, VerifyArgs};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_verify, OutputFormat, VerifyReport};

pub fn run(args: VerifyArgs, format: OutputFormat) -> CliResult<i32> {
    let codec = parse_magic(&args.magic)?;
    let data = read_input(args.file.as_deref())?;

    let payload = verify(&codec, &data)?;
    let report = VerifyReport {
        valid: true,
        checksum: hex::encode(&data[codec.magic().width()..codec.header_len()]),
        payload_size: payload.len(),
        message_size: split_message_frame(payload)
            .ok()
            .map(|message| message.len() as u32),
    };
    print_verify(&report, payload, format);
    Ok(SUCCESS)
}

fn verify<'a>(codec: &ChecksumCodec, data: &'a [u8]) -> CliResult<&'a [u8]> {
    let has_checksum = codec
        .has_checksum(data)
        .map_err(|err| frame_error("verify failed", err))?;
    if !has_checksum {
        return Err(CliError::new(
            DATA_INVALID,
            "verify failed: input does not start with the magic marker",
        ));
    }
    codec
        .verify_checksum(data)
        .map_err(|err| frame_error("verify failed", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_rejects_plain_and_corrupt_frames() {
        let codec = parse_magic("c35a").unwrap();
        let mut frame = codec.build_checksum_frame(b"\x00\x00\x00\x02ok").to_vec();
        assert_eq!(verify(&codec, &frame).unwrap(), b"\x00\x00\x00\x02ok");

        let err = verify(&codec, b"\x00\x00\x00\x02ok").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);

        frame[7] ^= 0x10;
        let err = verify(&codec, &frame).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("checksum mismatch"));
    }

    #[test]
    fn verify_short_input_is_data_invalid() {
        let codec = parse_magic("c35a").unwrap();
        let err = verify(&codec, b"\xC3").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
