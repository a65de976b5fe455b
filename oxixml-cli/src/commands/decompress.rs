//! Decompress command implementation.

use crate::utils::{decompressed_path, is_stdio, read_input, write_output};
use std::path::Path;
use tracing::info;

pub fn cmd_decompress(
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.map_or_else(|| decompressed_path(input), Path::to_path_buf);
    info!(input = %input.display(), output = %output.display(), "decompressing");

    let data = read_input(input)?;
    let markup = oxixml_structure::decompress(&data)?;
    write_output(&output, &markup)?;

    if !is_stdio(&output) {
        println!(
            "{} -> {} ({} -> {} bytes)",
            input.display(),
            output.display(),
            data.len(),
            markup.len()
        );
    }
    Ok(())
}
