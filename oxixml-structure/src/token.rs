//! Token stream markers and reader.
//!
//! Each node is written as:
//!
//! ```text
//! NODE <name id>
//! { ATTRIBUTE <attr id> <typed value> }
//! ( VALUE <typed value> | CHILDREN <child nodes...> )?
//! END
//! ```
//!
//! Ids use the widths chosen for their dictionary. A text node carries the
//! width's null id as its name.

use crate::value::TypedValue;
use oxixml_core::cursor::ByteCursor;
use oxixml_core::error::{OxiXmlError, Result};
use oxixml_core::width::IdWidth;

/// Start of a node.
pub const NODE: u8 = 0x01;
/// One attribute of the current node.
pub const ATTRIBUTE: u8 = 0x02;
/// Text value of the current node.
pub const VALUE: u8 = 0x03;
/// The current node's children follow.
pub const CHILDREN: u8 = 0x04;
/// End of the current node.
pub const END: u8 = 0x05;

/// Id widths of the two name dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWidths {
    /// Width of markup name ids.
    pub markup: IdWidth,
    /// Width of attribute name ids.
    pub attribute: IdWidth,
}

impl IdWidths {
    /// Widths fitting dictionaries of the given sizes.
    pub fn for_counts(markup_names: usize, attribute_names: usize) -> Self {
        Self {
            markup: IdWidth::for_count(markup_names),
            attribute: IdWidth::for_count(attribute_names),
        }
    }
}

/// A decoded token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Node start; `None` for a text node.
    Node(Option<u32>),
    /// Attribute with its typed value.
    Attribute {
        /// Attribute name id.
        id: u32,
        /// Typed value.
        value: TypedValue,
    },
    /// Node value.
    Value(TypedValue),
    /// Children follow.
    Children,
    /// Node end.
    End,
}

/// Iterator over the tokens of a token stream.
///
/// Yields `(offset, token)` pairs. After the first error it stops.
#[derive(Debug)]
pub struct TokenReader<'a> {
    cursor: ByteCursor<'a>,
    widths: IdWidths,
    failed: bool,
}

impl<'a> TokenReader<'a> {
    /// Read tokens from `data` using `widths`.
    pub fn new(data: &'a [u8], widths: IdWidths) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            widths,
            failed: false,
        }
    }

    /// Offset of the next token.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    fn read_token(&mut self) -> Result<Token> {
        let offset = self.cursor.position();
        let token = match self.cursor.read_u8()? {
            NODE => {
                let id = self.widths.markup.read_id(&mut self.cursor)?;
                Token::Node((id != self.widths.markup.null_id()).then_some(id))
            }
            ATTRIBUTE => {
                let id = self.widths.attribute.read_id(&mut self.cursor)?;
                let value = TypedValue::read_from(&mut self.cursor)?;
                Token::Attribute { id, value }
            }
            VALUE => Token::Value(TypedValue::read_from(&mut self.cursor)?),
            CHILDREN => Token::Children,
            END => Token::End,
            marker => {
                return Err(OxiXmlError::corrupted(
                    offset,
                    format!("unknown token marker 0x{marker:02X}"),
                ));
            }
        };
        Ok(token)
    }
}

impl Iterator for TokenReader<'_> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }
        let offset = self.cursor.position();
        let result = self.read_token().map(|token| (offset, token));
        self.failed = result.is_err();
        Some(result)
    }
}

/// Appends tokens to a byte buffer.
#[derive(Debug)]
pub struct TokenWriter {
    out: Vec<u8>,
    widths: IdWidths,
}

impl TokenWriter {
    /// Create a writer using `widths`.
    pub fn new(widths: IdWidths) -> Self {
        Self {
            out: Vec::new(),
            widths,
        }
    }

    /// Write one token.
    pub fn write(&mut self, token: Token) {
        match token {
            Token::Node(id) => {
                self.out.push(NODE);
                let width = self.widths.markup;
                width.write_id(&mut self.out, id.unwrap_or(width.null_id()));
            }
            Token::Attribute { id, value } => {
                self.out.push(ATTRIBUTE);
                self.widths.attribute.write_id(&mut self.out, id);
                value.write_to(&mut self.out);
            }
            Token::Value(value) => {
                self.out.push(VALUE);
                value.write_to(&mut self.out);
            }
            Token::Children => self.out.push(CHILDREN),
            Token::End => self.out.push(END),
        }
    }

    /// Finish and return the bytes.
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_tokens() {
        let widths = IdWidths::for_counts(2, 300);
        let tokens = [
            Token::Node(Some(0)),
            Token::Attribute {
                id: 299,
                value: TypedValue::Char(1),
            },
            Token::Children,
            Token::Node(None),
            Token::Value(TypedValue::Str(3)),
            Token::End,
            Token::End,
        ];

        let mut writer = TokenWriter::new(widths);
        for token in tokens {
            writer.write(token);
        }
        let bytes = writer.finish();
        assert_eq!(&bytes[..2], &[NODE, 0x00]);
        assert_eq!(&bytes[2..5], &[ATTRIBUTE, 0x01, 0x2B]);

        let read: Vec<Token> = TokenReader::new(&bytes, widths)
            .map(|item| item.map(|(_, token)| token))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read, tokens);
    }

    #[test]
    fn test_text_node_uses_null_id() {
        let mut writer = TokenWriter::new(IdWidths::for_counts(1, 0));
        writer.write(Token::Node(None));
        assert_eq!(writer.finish(), [NODE, 0xFF]);
    }

    #[test]
    fn test_unknown_marker_stops_iteration() {
        let widths = IdWidths::for_counts(1, 1);
        let mut reader = TokenReader::new(&[END, 0x42, END], widths);
        assert!(matches!(reader.next(), Some(Ok((0, Token::End)))));
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_id() {
        let widths = IdWidths::for_counts(1000, 1);
        let mut reader = TokenReader::new(&[NODE, 0x00], widths);
        assert!(matches!(reader.next(), Some(Err(_))));
    }
}
