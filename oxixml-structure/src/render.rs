//! Canonical markup output.
//!
//! Decompressed documents are not byte-identical to their input; they are
//! written in one canonical layout:
//!
//! ```text
//! <root>
//! 	<empty a="1"/>
//! 	<leaf>value</leaf>
//! 	<mixed>
//! 		text
//! 		<br/>
//! 	</mixed>
//! </root>
//! ```
//!
//! One tab per depth level, `\n` after every line. A double quote inside an
//! attribute value is written as `&quot;`.

use crate::tree::{ParsedNode, TreeWalk, WalkEvent};

/// Incremental writer of canonical markup.
#[derive(Debug, Default)]
pub struct MarkupWriter {
    out: Vec<u8>,
}

impl MarkupWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self, depth: usize) {
        self.out.extend(std::iter::repeat_n(b'\t', depth));
    }

    /// Open a start tag: `<name`.
    pub fn start_tag(&mut self, depth: usize, name: &[u8]) {
        self.indent(depth);
        self.out.push(b'<');
        self.out.extend_from_slice(name);
    }

    /// Write ` name="value"` inside an open start tag.
    pub fn attribute(&mut self, name: &[u8], value: &[u8]) {
        self.out.push(b' ');
        self.out.extend_from_slice(name);
        self.out.extend_from_slice(b"=\"");
        for &b in value {
            if b == b'"' {
                self.out.extend_from_slice(b"&quot;");
            } else {
                self.out.push(b);
            }
        }
        self.out.push(b'"');
    }

    /// Close the open start tag as an empty element.
    pub fn close_empty(&mut self) {
        self.out.extend_from_slice(b"/>\n");
    }

    /// Close the open start tag, write `value` and the end tag on one line.
    pub fn inline_value(&mut self, name: &[u8], value: &[u8]) {
        self.out.push(b'>');
        self.out.extend_from_slice(value);
        self.out.extend_from_slice(b"</");
        self.out.extend_from_slice(name);
        self.out.extend_from_slice(b">\n");
    }

    /// Close the open start tag before child lines.
    pub fn open_children(&mut self) {
        self.out.extend_from_slice(b">\n");
    }

    /// End tag on its own line.
    pub fn end_tag(&mut self, depth: usize, name: &[u8]) {
        self.indent(depth);
        self.out.extend_from_slice(b"</");
        self.out.extend_from_slice(name);
        self.out.extend_from_slice(b">\n");
    }

    /// Text node on its own line.
    pub fn text_line(&mut self, depth: usize, text: &[u8]) {
        self.indent(depth);
        self.out.extend_from_slice(text);
        self.out.push(b'\n');
    }

    /// Finish and return the bytes.
    pub fn finish(self) -> Vec<u8> {
        self.out
    }

    fn enter(&mut self, depth: usize, node: &ParsedNode) {
        if node.is_text() {
            if !node.value.is_empty() {
                self.text_line(depth, &node.value);
            }
            return;
        }

        self.start_tag(depth, &node.name);
        for attr in node.encoded_attributes() {
            self.attribute(&attr.name, &attr.value);
        }

        if !node.value.is_empty() {
            self.inline_value(&node.name, &node.value);
        } else if !node.encoded_children().is_empty() {
            self.open_children();
        } else {
            self.close_empty();
        }
    }

    fn leave(&mut self, depth: usize, node: &ParsedNode) {
        if !node.encoded_children().is_empty() {
            self.end_tag(depth, &node.name);
        }
    }
}

/// Canonical markup of a parsed tree.
///
/// This is exactly what compressing and decompressing the tree produces.
pub fn canonicalize(nodes: &[ParsedNode]) -> Vec<u8> {
    let mut writer = MarkupWriter::new();
    for event in TreeWalk::new(nodes) {
        match event {
            WalkEvent::Enter { node, depth } => writer.enter(depth, node),
            WalkEvent::Leave { node, depth } => writer.leave(depth, node),
        }
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_layout() {
        let tree = ParsedNode::element("root")
            .with_child(ParsedNode::element("empty").with_attribute("a", "1"))
            .with_child(ParsedNode::element("leaf").with_value("value"))
            .with_child(
                ParsedNode::element("mixed")
                    .with_child(ParsedNode::text("text"))
                    .with_child(ParsedNode::element("br")),
            );

        let expected = "<root>\n\t<empty a=\"1\"/>\n\t<leaf>value</leaf>\n\t<mixed>\n\t\ttext\n\t\t<br/>\n\t</mixed>\n</root>\n";
        assert_eq!(String::from_utf8(canonicalize(&[tree])).unwrap(), expected);
    }

    #[test]
    fn test_attribute_quote_is_escaped() {
        let tree = ParsedNode::element("a").with_attribute("t", "say \"hi\"");
        assert_eq!(canonicalize(&[tree]), b"<a t=\"say &quot;hi&quot;\"/>\n");
    }

    #[test]
    fn test_empty_tree() {
        assert!(canonicalize(&[]).is_empty());
    }
}
