//! # OxiXml Structure
//!
//! Structure-aware XML compression.
//!
//! A document is split into five streams that compress far better apart than
//! together:
//!
//! - **Markup names**: element names, one dense id each
//! - **Attribute names**: attribute names, one dense id each
//! - **Markup values**: node text, concatenated
//! - **Attribute values**: attribute text, concatenated
//! - **Tokens**: the tree shape, with ids and typed values
//!
//! Each stream is then compressed on its own with [`oxixml_lzrc`].
//!
//! ## Example
//!
//! ```rust
//! use oxixml_lzrc::LzConfig;
//! use oxixml_structure::{compress, decompress};
//!
//! let xml = br#"<a><b x="1">hi</b></a>"#;
//! let packed = compress(xml, &LzConfig::DEFAULT).unwrap();
//! let markup = decompress(&packed).unwrap();
//! assert_eq!(markup, b"<a>\n\t<b x=\"1\">hi</b>\n</a>\n");
//! ```
//!
//! Decompression yields canonical markup (see [`render`]), not the original
//! bytes: whitespace between elements, comments and the prolog are not kept.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod dictionary;
pub mod dump;
pub mod render;
pub mod sniff;
pub mod structure;
pub mod token;
pub mod tree;
pub mod value;

// Re-exports
pub use container::{
    ContainerInfo, EncodedDocument, Section, SectionInfo, compress, decompress, dump, inspect,
};
pub use dictionary::{DictionaryBuilder, DocumentStreams, NameDictionary};
pub use render::{MarkupWriter, canonicalize};
pub use sniff::{InputEncoding, check_encoding};
pub use structure::{StructuralDecoder, StructuralEncoder};
pub use token::{IdWidths, Token, TokenReader, TokenWriter};
pub use tree::{Attribute, ParseOutcome, ParsedNode, TreeWalk, WalkEvent, parse_document};
pub use value::{TypeTag, TypedValue};
