//! Dump command implementation.

use crate::utils::{read_input, write_output};
use std::path::Path;

/// Print the token stream of a compressed file, or of an XML file with `xml`.
pub fn cmd_dump(
    input: &Path,
    output: Option<&Path>,
    xml: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;
    let text = if xml {
        oxixml_structure::EncodedDocument::from_markup(&data)?.dump()?
    } else {
        oxixml_structure::dump(&data)?
    };
    write_output(output.unwrap_or(Path::new("-")), text.as_bytes())?;
    Ok(())
}
