//! Name dictionaries and value streams.
//!
//! Markup names and attribute names each get their own dictionary of dense
//! ids, assigned in order of first encounter during a pre-order walk. Values
//! are not interned: every non-empty node value and every attribute value is
//! appended to its stream, and the token stream refers to them by position.
//!
//! A dictionary section is stored as text records, one per id in order:
//!
//! ```text
//! 0 root
//! 1 item
//! ```

use crate::tree::{ParsedNode, TreeWalk, WalkEvent};
use oxixml_core::error::{OxiXmlError, Result};
use std::collections::HashMap;

/// Bidirectional name <-> id table with dense ids starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDictionary {
    names: Vec<Vec<u8>>,
    ids: HashMap<Vec<u8>, u32>,
}

impl NameDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `name`, assigning the next id on first sight.
    pub fn insert(&mut self, name: &[u8]) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_vec());
        self.ids.insert(name.to_vec(), id);
        id
    }

    /// Look up the id of `name`.
    pub fn id_of(&self, name: &[u8]) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Look up the name of `id`.
    pub fn name_of(&self, id: u32) -> Option<&[u8]> {
        self.names.get(id as usize).map(Vec::as_slice)
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(id, name)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.names
            .iter()
            .enumerate()
            .map(|(id, name)| (id as u32, name.as_slice()))
    }

    /// Serialize as `"<id> <name>\n"` records.
    pub fn to_records(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (id, name) in self.iter() {
            out.extend_from_slice(id.to_string().as_bytes());
            out.push(b' ');
            out.extend_from_slice(name);
            out.push(b'\n');
        }
        out
    }

    /// Parse records written by [`NameDictionary::to_records`].
    ///
    /// Ids must be dense and in order; a missing final newline is accepted.
    pub fn from_records(data: &[u8]) -> Result<Self> {
        let mut dict = Self::new();
        let mut offset = 0;

        for line in data.split(|&b| b == b'\n') {
            let line_start = offset;
            offset += line.len() + 1;
            if line.is_empty() {
                if offset > data.len() {
                    break;
                }
                return Err(OxiXmlError::corrupted(line_start, "empty dictionary record"));
            }

            let space = line.iter().position(|&b| b == b' ').ok_or_else(|| {
                OxiXmlError::corrupted(line_start, "dictionary record has no separator")
            })?;
            let (id, name) = (&line[..space], &line[space + 1..]);

            let expected = dict.len() as u32;
            if parse_decimal(id) != Some(expected) {
                return Err(OxiXmlError::corrupted(
                    line_start,
                    format!(
                        "dictionary record id {:?}, expected {expected}",
                        String::from_utf8_lossy(id)
                    ),
                ));
            }
            if name.is_empty() || dict.id_of(name).is_some() {
                return Err(OxiXmlError::corrupted(
                    line_start,
                    format!("invalid or duplicate name for id {expected}"),
                ));
            }
            dict.insert(name);
        }

        Ok(dict)
    }
}

fn parse_decimal(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Dictionaries and value streams of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStreams {
    /// Element names.
    pub markup_names: NameDictionary,
    /// Attribute names.
    pub attribute_names: NameDictionary,
    /// Concatenated node values, in visit order.
    pub markup_values: Vec<u8>,
    /// Concatenated attribute values, in visit order.
    pub attribute_values: Vec<u8>,
}

/// Pre-order walk filling [`DocumentStreams`].
///
/// Visits a node's name and value, then its attributes, then its children,
/// following exactly what the structural encoder will emit.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    streams: DocumentStreams,
}

impl DictionaryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `nodes` and their descendants.
    pub fn visit(&mut self, nodes: &[ParsedNode]) {
        for event in TreeWalk::new(nodes) {
            let WalkEvent::Enter { node, .. } = event else {
                continue;
            };
            if !node.is_text() {
                self.streams.markup_names.insert(&node.name);
            }
            self.streams.markup_values.extend_from_slice(&node.value);

            for attr in node.encoded_attributes() {
                self.streams.attribute_names.insert(&attr.name);
                self.streams.attribute_values.extend_from_slice(&attr.value);
            }
        }
    }

    /// Finish and return the streams.
    pub fn finish(self) -> DocumentStreams {
        self.streams
    }

    /// Build the streams of a whole document.
    pub fn build(roots: &[ParsedNode]) -> DocumentStreams {
        let mut builder = Self::new();
        builder.visit(roots);
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_encounter_ids() {
        let mut dict = NameDictionary::new();
        assert_eq!(dict.insert(b"a"), 0);
        assert_eq!(dict.insert(b"b"), 1);
        assert_eq!(dict.insert(b"a"), 0);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.name_of(1), Some(&b"b"[..]));
        assert_eq!(dict.name_of(2), None);
    }

    #[test]
    fn test_records() {
        let mut dict = NameDictionary::new();
        dict.insert(b"root");
        dict.insert(b"ns:item");
        let records = dict.to_records();
        assert_eq!(records, b"0 root\n1 ns:item\n");
        assert_eq!(NameDictionary::from_records(&records).unwrap(), dict);
        assert_eq!(
            NameDictionary::from_records(b"0 root\n1 ns:item").unwrap(),
            dict
        );
        assert!(NameDictionary::from_records(b"").unwrap().is_empty());
    }

    #[test]
    fn test_records_reject_gaps_and_garbage() {
        assert!(NameDictionary::from_records(b"1 root\n").is_err());
        assert!(NameDictionary::from_records(b"0 a\n0 b\n").is_err());
        assert!(NameDictionary::from_records(b"0root\n").is_err());
        assert!(NameDictionary::from_records(b"0 a\n\n1 b\n").is_err());
        assert!(NameDictionary::from_records(b"0 a\n1 a\n").is_err());
    }

    #[test]
    fn test_builder_walk_order() {
        let tree = ParsedNode::element("a").with_child(
            ParsedNode::element("b")
                .with_attribute("x", "1")
                .with_value("hi"),
        );
        let streams = DictionaryBuilder::build(&[tree]);

        assert_eq!(streams.markup_names.to_records(), b"0 a\n1 b\n");
        assert_eq!(streams.attribute_names.to_records(), b"0 x\n");
        assert_eq!(streams.markup_values, b"hi");
        assert_eq!(streams.attribute_values, b"1");
    }

    #[test]
    fn test_builder_skips_text_node_names() {
        let tree = ParsedNode::element("p")
            .with_child(ParsedNode::text("one"))
            .with_child(ParsedNode::element("br"))
            .with_child(ParsedNode::text("two"));
        let streams = DictionaryBuilder::build(&[tree]);

        assert_eq!(streams.markup_names.len(), 2);
        assert_eq!(streams.markup_values, b"onetwo");
    }
}
