use cmdframe_frame::checksum;

use crate::cmd::{read_input, ChecksumArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_checksum, ChecksumReport, OutputFormat};

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let data = match &args.data {
        Some(data) => data.as_bytes().to_vec(),
        None => read_input(args.file.as_deref())?,
    };

    let report = ChecksumReport {
        algorithm: "crc32c",
        checksum: hex::encode(checksum(&data)),
        length: data.len(),
    };
    print_checksum(&report, format);
    Ok(SUCCESS)
}
