//! Compress command implementation.

use crate::utils::{
    compressed_path, create_progress_bar, is_stdio, read_input, savings, write_output,
};
use oxixml_lzrc::LzConfig;
use oxixml_structure::{EncodedDocument, Section};
use std::path::Path;
use tracing::info;

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    level: u8,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.map_or_else(|| compressed_path(input), Path::to_path_buf);
    let config = LzConfig::from_level(level);
    info!(input = %input.display(), output = %output.display(), level, "compressing");

    let data = read_input(input)?;
    let doc = EncodedDocument::from_markup(&data)?;

    let pb = create_progress_bar(Section::ALL.len() as u64, progress);
    let mut packed = doc.header().to_vec();
    for section in Section::ALL {
        pb.set_message(section.name());
        packed.extend_from_slice(&doc.pack_section(section, &config));
        pb.inc(1);
    }
    pb.finish_and_clear();

    write_output(&output, &packed)?;

    if !is_stdio(&output) {
        println!(
            "{} -> {} ({} -> {} bytes, {:.1}% saved)",
            input.display(),
            output.display(),
            data.len(),
            packed.len(),
            savings(data.len(), packed.len())
        );
    }
    Ok(())
}
