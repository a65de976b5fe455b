//! Info command implementation.

use crate::utils::{read_input, savings};
use oxixml_structure::{ContainerInfo, SectionInfo, inspect};
use serde::Serialize;
use std::path::Path;

/// JSON serializable section sizes.
#[derive(Debug, Serialize)]
struct SectionJson {
    name: &'static str,
    compressed_size: usize,
    raw_size: usize,
}

impl SectionJson {
    fn from_info(info: &SectionInfo) -> Self {
        Self {
            name: info.section.name(),
            compressed_size: info.compressed_size,
            raw_size: info.raw_size,
        }
    }
}

/// JSON output for file information.
#[derive(Debug, Serialize)]
struct InfoJson {
    file: String,
    file_size: usize,
    raw_size: usize,
    markup_id_width: usize,
    attribute_id_width: usize,
    markup_names: usize,
    attribute_names: usize,
    sections: Vec<SectionJson>,
}

impl InfoJson {
    fn new(file: &Path, info: &ContainerInfo) -> Self {
        Self {
            file: file.display().to_string(),
            file_size: info.file_size,
            raw_size: info.raw_size(),
            markup_id_width: info.widths.markup.size(),
            attribute_id_width: info.widths.attribute.size(),
            markup_names: info.markup_names,
            attribute_names: info.attribute_names,
            sections: info.sections.iter().map(SectionJson::from_info).collect(),
        }
    }
}

pub fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;
    let info = inspect(&data)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&InfoJson::new(input, &info))?
        );
        return Ok(());
    }

    println!("OxiXml File Information");
    println!("=======================");
    println!("File: {}", input.display());
    println!("Size: {} bytes", info.file_size);
    println!(
        "Id widths: markup {} byte(s), attribute {} byte(s)",
        info.widths.markup.size(),
        info.widths.attribute.size()
    );
    println!("Markup names: {}", info.markup_names);
    println!("Attribute names: {}", info.attribute_names);
    println!();
    println!(
        "{:<18} {:>12} {:>12} {:>7}",
        "Section", "Compressed", "Raw", "Saved"
    );
    println!("{}", "-".repeat(52));
    for section in &info.sections {
        println!(
            "{:<18} {:>12} {:>12} {:>6.1}%",
            section.section.name(),
            section.compressed_size,
            section.raw_size,
            savings(section.raw_size, section.compressed_size)
        );
    }
    println!("{}", "-".repeat(52));
    println!(
        "{:<18} {:>12} {:>12} {:>6.1}%",
        "total",
        info.file_size,
        info.raw_size(),
        savings(info.raw_size(), info.file_size)
    );
    Ok(())
}
