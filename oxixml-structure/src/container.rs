//! Compressed file layout.
//!
//! ```text
//! +--------+--------+------------------------------------------+
//! | markup | attr   | 5 self-terminating LZRC sections:        |
//! | width  | width  | markup names, attribute names,           |
//! | (1 B)  | (1 B)  | markup values, attribute values, tokens  |
//! +--------+--------+------------------------------------------+
//! ```
//!
//! Width bytes are the id size in bytes (1, 2 or 4). The sections carry no
//! lengths; each one ends where its range-coded stream ends.

use crate::dictionary::{DictionaryBuilder, DocumentStreams, NameDictionary};
use crate::dump::dump_tokens;
use crate::sniff::check_encoding;
use crate::structure::{StructuralDecoder, StructuralEncoder};
use crate::token::IdWidths;
use crate::tree::{ParsedNode, parse_document};
use oxixml_core::error::{OxiXmlError, Result};
use oxixml_core::width::IdWidth;
use oxixml_lzrc::LzConfig;
use std::fmt;
use tracing::{debug, info};

/// Size of the width header.
pub const HEADER_SIZE: usize = 2;

/// The sections of a compressed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Markup name dictionary records.
    MarkupNames,
    /// Attribute name dictionary records.
    AttributeNames,
    /// Node value stream.
    MarkupValues,
    /// Attribute value stream.
    AttributeValues,
    /// Structural token stream.
    Tokens,
}

impl Section {
    /// All sections in file order.
    pub const ALL: [Section; 5] = [
        Self::MarkupNames,
        Self::AttributeNames,
        Self::MarkupValues,
        Self::AttributeValues,
        Self::Tokens,
    ];

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MarkupNames => "markup-names",
            Self::AttributeNames => "attribute-names",
            Self::MarkupValues => "markup-values",
            Self::AttributeValues => "attribute-values",
            Self::Tokens => "tokens",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document in its uncompressed, split form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    /// Dictionaries and value streams.
    pub streams: DocumentStreams,
    /// Id widths used by `tokens`.
    pub widths: IdWidths,
    /// Structural token stream.
    pub tokens: Vec<u8>,
}

impl EncodedDocument {
    /// Split a parsed tree into dictionaries, value streams and tokens.
    pub fn from_tree(roots: &[ParsedNode]) -> Result<Self> {
        let streams = DictionaryBuilder::build(roots);
        let widths = IdWidths::for_counts(
            streams.markup_names.len(),
            streams.attribute_names.len(),
        );
        let tokens = StructuralEncoder::new(&streams, widths).encode(roots)?;
        debug!(
            markup_names = streams.markup_names.len(),
            attribute_names = streams.attribute_names.len(),
            markup_width = widths.markup.size(),
            attribute_width = widths.attribute.size(),
            tokens = tokens.len(),
            "document encoded"
        );
        Ok(Self {
            streams,
            widths,
            tokens,
        })
    }

    /// Parse and split raw markup.
    pub fn from_markup(input: &[u8]) -> Result<Self> {
        let body = check_encoding(input)?;
        let roots = parse_document(body).into_nodes();
        Self::from_tree(&roots)
    }

    /// Rebuild canonical markup.
    pub fn to_markup(&self) -> Result<Vec<u8>> {
        StructuralDecoder::new(&self.streams).decode(&self.tokens, self.widths)
    }

    /// Human-readable dump of the token stream.
    pub fn dump(&self) -> Result<String> {
        dump_tokens(&self.tokens, self.widths)
    }

    /// Raw bytes of one section.
    pub fn section(&self, section: Section) -> Vec<u8> {
        match section {
            Section::MarkupNames => self.streams.markup_names.to_records(),
            Section::AttributeNames => self.streams.attribute_names.to_records(),
            Section::MarkupValues => self.streams.markup_values.clone(),
            Section::AttributeValues => self.streams.attribute_values.clone(),
            Section::Tokens => self.tokens.clone(),
        }
    }

    /// The width header.
    pub fn header(&self) -> [u8; HEADER_SIZE] {
        [self.widths.markup.selector(), self.widths.attribute.selector()]
    }

    /// Compress one section.
    pub fn pack_section(&self, section: Section, config: &LzConfig) -> Vec<u8> {
        let raw = self.section(section);
        let compressed = oxixml_lzrc::compress(&raw, config);
        debug!(
            %section,
            raw = raw.len(),
            compressed = compressed.len(),
            "section packed"
        );
        compressed
    }

    /// Write the compressed file.
    pub fn pack(&self, config: &LzConfig) -> Vec<u8> {
        let mut out = self.header().to_vec();
        for section in Section::ALL {
            out.extend_from_slice(&self.pack_section(section, config));
        }
        out
    }

    /// Read a compressed file.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        let (widths, sections) = read_sections(data)?;
        let [markup_names, attribute_names, markup_values, attribute_values, tokens] =
            sections.map(|(raw, _)| raw);

        let streams = DocumentStreams {
            markup_names: NameDictionary::from_records(&markup_names)?,
            attribute_names: NameDictionary::from_records(&attribute_names)?,
            markup_values,
            attribute_values,
        };
        Ok(Self {
            streams,
            widths,
            tokens,
        })
    }
}

fn read_header(data: &[u8]) -> Result<IdWidths> {
    match data {
        [markup, attribute, ..] => Ok(IdWidths {
            markup: IdWidth::from_selector(*markup)?,
            attribute: IdWidth::from_selector(*attribute)?,
        }),
        _ => Err(OxiXmlError::invalid_header(format!(
            "file is {} bytes, shorter than the {HEADER_SIZE}-byte header",
            data.len()
        ))),
    }
}

/// Decompress every section, returning `(raw bytes, compressed size)` pairs
/// in file order.
fn read_sections(data: &[u8]) -> Result<(IdWidths, [(Vec<u8>, usize); 5])> {
    let widths = read_header(data)?;

    let mut cursor = HEADER_SIZE;
    let mut sections: [(Vec<u8>, usize); 5] = Default::default();
    for (slot, section) in sections.iter_mut().zip(Section::ALL) {
        let (raw, next) = oxixml_lzrc::decompress_at(data, cursor)?;
        debug!(%section, compressed = next - cursor, raw = raw.len(), "section unpacked");
        *slot = (raw, next - cursor);
        cursor = next;
    }

    if cursor != data.len() {
        return Err(OxiXmlError::corrupted(
            cursor,
            format!("{} trailing bytes after the last section", data.len() - cursor),
        ));
    }
    Ok((widths, sections))
}

/// Sizes of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    /// Which section.
    pub section: Section,
    /// Bytes in the file.
    pub compressed_size: usize,
    /// Bytes after decompression.
    pub raw_size: usize,
}

/// Summary of a compressed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Total file size.
    pub file_size: usize,
    /// Id widths from the header.
    pub widths: IdWidths,
    /// Number of markup names.
    pub markup_names: usize,
    /// Number of attribute names.
    pub attribute_names: usize,
    /// Per-section sizes in file order.
    pub sections: Vec<SectionInfo>,
}

impl ContainerInfo {
    /// Sum of decompressed section sizes.
    pub fn raw_size(&self) -> usize {
        self.sections.iter().map(|s| s.raw_size).sum()
    }
}

/// Compress a markup document.
pub fn compress(input: &[u8], config: &LzConfig) -> Result<Vec<u8>> {
    let doc = EncodedDocument::from_markup(input)?;
    let packed = doc.pack(config);
    info!(input = input.len(), output = packed.len(), "compressed");
    Ok(packed)
}

/// Decompress a file written by [`compress`] into canonical markup.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let markup = EncodedDocument::unpack(data)?.to_markup()?;
    info!(input = data.len(), output = markup.len(), "decompressed");
    Ok(markup)
}

/// Dump the token stream of a compressed file.
pub fn dump(data: &[u8]) -> Result<String> {
    EncodedDocument::unpack(data)?.dump()
}

/// Read the header and section sizes of a compressed file.
pub fn inspect(data: &[u8]) -> Result<ContainerInfo> {
    let (widths, sections) = read_sections(data)?;
    let markup_names = NameDictionary::from_records(&sections[0].0)?.len();
    let attribute_names = NameDictionary::from_records(&sections[1].0)?.len();

    Ok(ContainerInfo {
        file_size: data.len(),
        widths,
        markup_names,
        attribute_names,
        sections: Section::ALL
            .iter()
            .zip(&sections)
            .map(|(&section, (raw, compressed))| SectionInfo {
                section,
                compressed_size: *compressed,
                raw_size: raw.len(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let packed = compress(br#"<a><b x="1">hi</b></a>"#, &LzConfig::DEFAULT).unwrap();
        assert_eq!(&packed[..2], &[1, 1]);
    }

    #[test]
    fn test_sections_of_simple_document() {
        let doc = EncodedDocument::from_markup(br#"<a><b x="1">hi</b></a>"#).unwrap();
        assert_eq!(doc.section(Section::MarkupNames), b"0 a\n1 b\n");
        assert_eq!(doc.section(Section::AttributeNames), b"0 x\n");
        assert_eq!(doc.section(Section::MarkupValues), b"hi");
        assert_eq!(doc.section(Section::AttributeValues), b"1");
    }

    #[test]
    fn test_pack_unpack() {
        let doc = EncodedDocument::from_markup(b"<r><i n=\"1\"/><i n=\"2\">t</i></r>").unwrap();
        let packed = doc.pack(&LzConfig::DEFAULT);
        assert_eq!(EncodedDocument::unpack(&packed).unwrap(), doc);
    }

    #[test]
    fn test_inspect() {
        let input = b"<r><i n=\"1\"/><i n=\"2\">t</i></r>";
        let packed = compress(input, &LzConfig::DEFAULT).unwrap();
        let info = inspect(&packed).unwrap();

        assert_eq!(info.file_size, packed.len());
        assert_eq!(info.markup_names, 2);
        assert_eq!(info.attribute_names, 1);
        assert_eq!(info.sections.len(), 5);
        assert_eq!(info.sections[2].raw_size, 1);
        assert_eq!(
            HEADER_SIZE + info.sections.iter().map(|s| s.compressed_size).sum::<usize>(),
            packed.len()
        );
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(
            decompress(b""),
            Err(OxiXmlError::InvalidHeader { .. })
        ));
        assert!(matches!(
            decompress(&[3, 1]),
            Err(OxiXmlError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut packed = compress(b"<a/>", &LzConfig::DEFAULT).unwrap();
        packed.push(0);
        assert!(decompress(&packed).is_err());
    }
}
