use cmdframe_frame::{FrameConfig, FrameError, FrameReader};
use tracing::debug;

use crate::cmd::{open_input, parse_magic, UnframeArgs};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: UnframeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = FrameConfig {
        max_payload_size: args.max_payload,
        checksum: args.magic.as_deref().map(parse_magic).transpose()?,
    };
    let input = open_input(args.file.as_deref())?;
    let mut reader = FrameReader::with_config(input, config);

    let mut decoded = 0usize;
    loop {
        if args.count.is_some_and(|count| decoded >= count) {
            break;
        }

        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) if reader.buffered() == 0 => break,
            Err(FrameError::ConnectionClosed) => {
                return Err(CliError::new(
                    DATA_INVALID,
                    format!(
                        "unframe failed: {} trailing bytes do not form a complete frame",
                        reader.buffered()
                    ),
                ));
            }
            Err(err) => {
                return Err(frame_error(&format!("frame {decoded} invalid"), err));
            }
        };

        debug!(
            index = decoded,
            payload_size = frame.payload.len(),
            checksummed = frame.checksummed,
            "decoded frame"
        );
        print_frame(decoded, &frame, format);
        decoded += 1;
    }

    debug!(frames = decoded, "input exhausted");
    Ok(SUCCESS)
}
