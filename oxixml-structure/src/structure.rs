//! Structural codec.
//!
//! Encoding walks the tree and writes the token stream; decoding replays the
//! token stream against the dictionaries and value streams and writes
//! canonical markup. Neither direction recurses: the encoder follows a
//! [`TreeWalk`] and the decoder keeps an explicit stack of open elements.

use crate::dictionary::{DocumentStreams, NameDictionary};
use crate::render::MarkupWriter;
use crate::token::{IdWidths, Token, TokenReader, TokenWriter};
use crate::tree::{ParsedNode, TreeWalk, WalkEvent};
use crate::value::TypedValue;
use oxixml_core::cursor::ByteCursor;
use oxixml_core::error::{OxiXmlError, Result};
use tracing::debug;

/// Writes the token stream of a tree.
#[derive(Debug)]
pub struct StructuralEncoder<'a> {
    streams: &'a DocumentStreams,
    writer: TokenWriter,
}

impl<'a> StructuralEncoder<'a> {
    /// Create an encoder over dictionaries built from the same tree.
    pub fn new(streams: &'a DocumentStreams, widths: IdWidths) -> Self {
        Self {
            streams,
            writer: TokenWriter::new(widths),
        }
    }

    /// Encode `roots` and return the token stream.
    pub fn encode(mut self, roots: &[ParsedNode]) -> Result<Vec<u8>> {
        for event in TreeWalk::new(roots) {
            match event {
                WalkEvent::Enter { node, .. } => self.enter(node)?,
                WalkEvent::Leave { .. } => self.writer.write(Token::End),
            }
        }
        Ok(self.writer.finish())
    }

    fn enter(&mut self, node: &ParsedNode) -> Result<()> {
        let id = if node.is_text() {
            None
        } else {
            Some(lookup(&self.streams.markup_names, "markup name", &node.name)?)
        };
        self.writer.write(Token::Node(id));

        for attr in node.encoded_attributes() {
            let id = lookup(&self.streams.attribute_names, "attribute name", &attr.name)?;
            self.writer.write(Token::Attribute {
                id,
                value: TypedValue::classify(&attr.value),
            });
        }

        if !node.value.is_empty() {
            self.writer
                .write(Token::Value(TypedValue::classify(&node.value)));
        } else if !node.encoded_children().is_empty() {
            self.writer.write(Token::Children);
        }
        Ok(())
    }
}

/// Id of a name the dictionaries were built from.
fn lookup(dict: &NameDictionary, kind: &'static str, name: &[u8]) -> Result<u32> {
    dict.id_of(name)
        .ok_or_else(|| OxiXmlError::unknown_name(kind, name))
}

/// Decoder position relative to the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Between nodes: a sibling starts or the enclosing element ends.
    ExpectNodeOrEnd,
    /// After a node start: attributes may follow.
    InAttributes,
    /// Attributes are done: a value, children or the end follow.
    ExpectValueOrChildrenOrEnd,
    /// After a value: only the end may follow.
    ExpectEnd,
    /// After a children marker: the first child must start.
    Descending,
}

/// The node whose start has been read but not yet closed.
#[derive(Debug, Clone, Copy)]
enum Current<'a> {
    Element(&'a [u8]),
    Text,
}

/// Rebuilds canonical markup from a token stream.
#[derive(Debug)]
pub struct StructuralDecoder<'a> {
    markup_names: &'a NameDictionary,
    attribute_names: &'a NameDictionary,
    markup_values: ByteCursor<'a>,
    attribute_values: ByteCursor<'a>,
    writer: MarkupWriter,
    open: Vec<&'a [u8]>,
    current: Option<Current<'a>>,
    state: DecodeState,
}

impl<'a> StructuralDecoder<'a> {
    /// Create a decoder over the dictionaries and value streams of a document.
    pub fn new(streams: &'a DocumentStreams) -> Self {
        Self {
            markup_names: &streams.markup_names,
            attribute_names: &streams.attribute_names,
            markup_values: ByteCursor::new(&streams.markup_values),
            attribute_values: ByteCursor::new(&streams.attribute_values),
            writer: MarkupWriter::new(),
            open: Vec::new(),
            current: None,
            state: DecodeState::ExpectNodeOrEnd,
        }
    }

    fn depth(&self) -> usize {
        self.open.len()
    }

    fn begin_node(&mut self, id: Option<u32>) -> Result<()> {
        match id {
            Some(id) => {
                let name = self
                    .markup_names
                    .name_of(id)
                    .ok_or_else(|| OxiXmlError::unknown_id("markup name", id))?;
                self.writer.start_tag(self.depth(), name);
                self.current = Some(Current::Element(name));
                self.state = DecodeState::InAttributes;
            }
            None => {
                self.current = Some(Current::Text);
                self.state = DecodeState::ExpectValueOrChildrenOrEnd;
            }
        }
        Ok(())
    }

    fn step(&mut self, offset: usize, token: Token) -> Result<()> {
        if self.state == DecodeState::InAttributes && !matches!(token, Token::Attribute { .. }) {
            self.state = DecodeState::ExpectValueOrChildrenOrEnd;
        }

        match (self.state, token, self.current) {
            (DecodeState::ExpectNodeOrEnd | DecodeState::Descending, Token::Node(id), _) => {
                self.begin_node(id)?;
            }
            (DecodeState::ExpectNodeOrEnd, Token::End, _) => {
                let name = self.open.pop().ok_or_else(|| {
                    OxiXmlError::corrupted(offset, "end token with no open element")
                })?;
                self.writer.end_tag(self.depth(), name);
            }
            (DecodeState::InAttributes, Token::Attribute { id, value }, _) => {
                let name = self
                    .attribute_names
                    .name_of(id)
                    .ok_or_else(|| OxiXmlError::unknown_id("attribute name", id))?;
                let text = value.materialize(&mut self.attribute_values)?;
                self.writer.attribute(name, &text);
            }
            (DecodeState::ExpectValueOrChildrenOrEnd, Token::Value(value), Some(current)) => {
                let text = value.materialize(&mut self.markup_values)?;
                match current {
                    Current::Element(name) => self.writer.inline_value(name, &text),
                    Current::Text => self.writer.text_line(self.depth(), &text),
                }
                self.state = DecodeState::ExpectEnd;
            }
            (
                DecodeState::ExpectValueOrChildrenOrEnd,
                Token::Children,
                Some(Current::Element(name)),
            ) => {
                self.writer.open_children();
                self.open.push(name);
                self.current = None;
                self.state = DecodeState::Descending;
            }
            (DecodeState::ExpectValueOrChildrenOrEnd, Token::End, Some(current)) => {
                if let Current::Element(_) = current {
                    self.writer.close_empty();
                }
                self.current = None;
                self.state = DecodeState::ExpectNodeOrEnd;
            }
            (DecodeState::ExpectEnd, Token::End, _) => {
                self.current = None;
                self.state = DecodeState::ExpectNodeOrEnd;
            }
            (state, token, _) => {
                return Err(OxiXmlError::corrupted(
                    offset,
                    format!("unexpected {token:?} in state {state:?}"),
                ));
            }
        }
        Ok(())
    }

    /// Decode every token of `tokens` and return the markup.
    pub fn decode(mut self, tokens: &[u8], widths: IdWidths) -> Result<Vec<u8>> {
        let mut reader = TokenReader::new(tokens, widths);
        for item in reader.by_ref() {
            let (offset, token) = item?;
            self.step(offset, token)?;
        }

        if self.state != DecodeState::ExpectNodeOrEnd || !self.open.is_empty() {
            return Err(OxiXmlError::corrupted(
                reader.position(),
                format!(
                    "token stream ended with {} open elements in state {:?}",
                    self.open.len(),
                    self.state
                ),
            ));
        }
        for (kind, cursor) in [
            ("markup", &self.markup_values),
            ("attribute", &self.attribute_values),
        ] {
            if !cursor.is_empty() {
                return Err(OxiXmlError::corrupted(
                    cursor.position(),
                    format!("{} unused bytes in the {kind} value stream", cursor.remaining()),
                ));
            }
        }

        let markup = self.writer.finish();
        debug!(tokens = tokens.len(), markup = markup.len(), "structure decoded");
        Ok(markup)
    }
}
