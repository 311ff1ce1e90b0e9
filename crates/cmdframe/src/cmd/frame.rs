use std::fs;

use bytes::BytesMut;
use cmdframe_frame::{encode_frame, FrameConfig};
use tracing::info;

use crate::cmd::{parse_magic, read_input, FrameArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_raw, print_written, FrameWritten, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let config = FrameConfig {
        checksum: args.magic.as_deref().map(parse_magic).transpose()?,
        ..FrameConfig::default()
    };

    let mut wire = BytesMut::new();
    encode_frame(&payload, &config, &mut wire).map_err(|err| frame_error("frame failed", err))?;
    info!(
        payload_size = payload.len(),
        wire_size = wire.len(),
        checksummed = config.checksum.is_some(),
        "built frame"
    );

    match (&args.out, args.hex) {
        (Some(path), _) => {
            fs::write(path, &wire)
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
            print_written(
                &FrameWritten {
                    wire_size: wire.len(),
                    payload_size: payload.len(),
                    checksummed: config.checksum.is_some(),
                },
                format,
            );
        }
        (None, true) => println!("{}", hex::encode(&wire)),
        (None, false) => print_raw(&wire),
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &FrameArgs) -> CliResult<Vec<u8>> {
    if let Some(json) = &args.json {
        serde_json::from_str::<serde_json::Value>(json).map_err(|err| {
            CliError::new(DATA_INVALID, format!("--json is not valid JSON: {err}"))
        })?;
        return Ok(json.as_bytes().to_vec());
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    read_input(args.file.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_args(json: &str) -> FrameArgs {
        FrameArgs {
            json: Some(json.to_string()),
            data: None,
            file: None,
            magic: None,
            out: None,
            hex: false,
        }
    }

    #[test]
    fn invalid_json_payload_is_data_invalid() {
        let err = resolve_payload(&json_args("{nope")).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn json_payload_is_passed_verbatim() {
        let payload = resolve_payload(&json_args(r#"{"op":"status"}"#)).unwrap();
        assert_eq!(payload, br#"{"op":"status"}"#);
    }
}
