//! Parsed XML tree.
//!
//! The tree is produced from `quick-xml` events and keeps names and values as
//! raw bytes: entity references stay escaped exactly as they appeared in the
//! source, so writing a value back out reproduces the original text.
//!
//! Element content is folded the way the structural codec consumes it:
//! - text-only content becomes the element's `value`
//! - mixed content keeps every text run as a nameless child node
//!
//! Comments, processing instructions, the XML declaration and the doctype are
//! dropped. CDATA sections are kept verbatim (with their delimiters) as text.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

/// A single `name="value"` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: Vec<u8>,
    /// Raw attribute value, without quotes.
    pub value: Vec<u8>,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One node of the parsed document.
///
/// A node with an empty `name` is a text node. Siblings are consecutive
/// entries of the parent's `children` (or of the root list).
///
/// A node is encoded with either its value or its children, never both: a
/// non-empty value wins. Text nodes carry neither attributes nor children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNode {
    /// Element name, empty for text nodes.
    pub name: Vec<u8>,
    /// Text value, empty when absent.
    pub value: Vec<u8>,
    /// Attributes in document order.
    pub attributes: Vec<Attribute>,
    /// Child nodes in document order.
    pub children: Vec<ParsedNode>,
}

impl ParsedNode {
    /// Create an element with no content.
    pub fn element(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a nameless text node.
    pub fn text(value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: Vec::new(),
            value: value.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attribute(mut self, name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Builder: set the text value.
    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: ParsedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Check if this is a nameless text node.
    pub fn is_text(&self) -> bool {
        self.name.is_empty()
    }

    /// Attributes that take part in encoding.
    pub fn encoded_attributes(&self) -> &[Attribute] {
        if self.is_text() {
            &[]
        } else {
            &self.attributes
        }
    }

    /// Children that take part in encoding.
    pub fn encoded_children(&self) -> &[ParsedNode] {
        if self.is_text() || !self.value.is_empty() {
            &[]
        } else {
            &self.children
        }
    }
}

impl Drop for ParsedNode {
    fn drop(&mut self) {
        // Flatten descendants so dropping a deep tree does not recurse
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// One step of a [`TreeWalk`].
#[derive(Debug, Clone, Copy)]
pub enum WalkEvent<'a> {
    /// A node starts; its children (if any) follow.
    Enter {
        /// The node.
        node: &'a ParsedNode,
        /// Nesting level, 0 for top-level nodes.
        depth: usize,
    },
    /// A node and all of its descendants are done.
    Leave {
        /// The node.
        node: &'a ParsedNode,
        /// Nesting level, 0 for top-level nodes.
        depth: usize,
    },
}

#[derive(Debug)]
struct WalkFrame<'a> {
    parent: Option<&'a ParsedNode>,
    siblings: std::slice::Iter<'a, ParsedNode>,
}

/// Depth-first walk over the encoded shape of a tree.
///
/// Descends into [`ParsedNode::encoded_children`] only, so the walk visits
/// exactly the nodes the structural codec writes. Every node yields an
/// `Enter` and a matching `Leave`. The pending siblings of each level are
/// kept on an explicit stack, so depth is not limited by the call stack.
#[derive(Debug)]
pub struct TreeWalk<'a> {
    stack: Vec<WalkFrame<'a>>,
}

impl<'a> TreeWalk<'a> {
    /// Walk `roots` and their descendants.
    pub fn new(roots: &'a [ParsedNode]) -> Self {
        Self {
            stack: vec![WalkFrame {
                parent: None,
                siblings: roots.iter(),
            }],
        }
    }
}

impl<'a> Iterator for TreeWalk<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let depth = self.stack.len().checked_sub(1)?;
        let frame = self.stack.last_mut()?;
        match frame.siblings.next() {
            Some(node) => {
                self.stack.push(WalkFrame {
                    parent: Some(node),
                    siblings: node.encoded_children().iter(),
                });
                Some(WalkEvent::Enter { node, depth })
            }
            None => {
                let frame = self.stack.pop()?;
                frame.parent.map(|node| WalkEvent::Leave {
                    node,
                    depth: depth - 1,
                })
            }
        }
    }
}

/// Result of the lenient parse boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Top-level nodes (possibly partial if the parser stopped early).
    Parsed(Vec<ParsedNode>),
    /// Nothing usable was parsed.
    Empty,
}

impl ParseOutcome {
    /// Top-level nodes, empty for [`ParseOutcome::Empty`].
    pub fn into_nodes(self) -> Vec<ParsedNode> {
        match self {
            Self::Parsed(nodes) => nodes,
            Self::Empty => Vec::new(),
        }
    }
}

enum Content {
    Text(Vec<u8>),
    Element(ParsedNode),
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    node: ParsedNode,
    content: Vec<Content>,
}

impl OpenElement {
    fn new(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut node = ParsedNode::element(start.name().as_ref());
        for attr in start.attributes() {
            let attr = attr?;
            node.attributes
                .push(Attribute::new(attr.key.as_ref(), attr.value.into_owned()));
        }
        Ok(Self {
            node,
            content: Vec::new(),
        })
    }

    fn finish(mut self) -> ParsedNode {
        if self
            .content
            .iter()
            .all(|item| matches!(item, Content::Text(_)))
        {
            for item in self.content {
                if let Content::Text(text) = item {
                    self.node.value.extend_from_slice(&text);
                }
            }
        } else {
            self.node.children = fold_content(self.content);
        }
        self.node
    }
}

fn fold_content(content: Vec<Content>) -> Vec<ParsedNode> {
    content
        .into_iter()
        .map(|item| match item {
            Content::Text(text) => ParsedNode::text(text),
            Content::Element(node) => node,
        })
        .collect()
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<OpenElement>,
    top: Vec<Content>,
}

impl TreeBuilder {
    fn push_content(&mut self, item: Content) {
        match self.stack.last_mut() {
            Some(open) => open.content.push(item),
            None => self.top.push(item),
        }
    }

    fn close(&mut self) -> bool {
        match self.stack.pop() {
            Some(open) => {
                let node = open.finish();
                self.push_content(Content::Element(node));
                true
            }
            None => false,
        }
    }

    fn feed(&mut self, reader: &mut Reader<&[u8]>) -> Result<(), quick_xml::Error> {
        loop {
            match reader.read_event()? {
                Event::Start(start) => self.stack.push(OpenElement::new(&start)?),
                Event::Empty(start) => {
                    let node = OpenElement::new(&start)?.finish();
                    self.push_content(Content::Element(node));
                }
                Event::End(_) => {
                    self.close();
                }
                Event::Text(text) => {
                    self.push_content(Content::Text(text.into_inner().into_owned()));
                }
                Event::CData(cdata) => {
                    let mut text = b"<![CDATA[".to_vec();
                    text.extend_from_slice(&cdata.into_inner());
                    text.extend_from_slice(b"]]>");
                    self.push_content(Content::Text(text));
                }
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    fn finish(mut self) -> ParseOutcome {
        while self.close() {}
        let nodes = fold_content(self.top);
        if nodes.is_empty() {
            ParseOutcome::Empty
        } else {
            ParseOutcome::Parsed(nodes)
        }
    }
}

/// Parse `input` into a tree.
///
/// Never fails: on a parse error the nodes built so far are kept (still-open
/// elements are closed at the point of failure) and a warning is logged.
pub fn parse_document(input: &[u8]) -> ParseOutcome {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut builder = TreeBuilder::default();
    if let Err(err) = builder.feed(&mut reader) {
        warn!(
            position = reader.buffer_position(),
            error = %err,
            "XML parse error, continuing with partial tree"
        );
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<ParsedNode> {
        parse_document(input.as_bytes()).into_nodes()
    }

    #[test]
    fn test_text_only_content_becomes_value() {
        let nodes = parse(r#"<a><b x="1">hi</b></a>"#);
        let expected = ParsedNode::element("a")
            .with_child(ParsedNode::element("b").with_attribute("x", "1").with_value("hi"));
        assert_eq!(nodes, vec![expected]);
    }

    #[test]
    fn test_mixed_content_keeps_text_nodes() {
        let nodes = parse("<p>one<br/>two</p>");
        let expected = ParsedNode::element("p")
            .with_child(ParsedNode::text("one"))
            .with_child(ParsedNode::element("br"))
            .with_child(ParsedNode::text("two"));
        assert_eq!(nodes, vec![expected]);
    }

    #[test]
    fn test_whitespace_and_prolog_are_dropped() {
        let nodes = parse(
            "<?xml version=\"1.0\"?>\n<!-- note -->\n<root>\n  <item/>\n  <item/>\n</root>\n",
        );
        let expected = ParsedNode::element("root")
            .with_child(ParsedNode::element("item"))
            .with_child(ParsedNode::element("item"));
        assert_eq!(nodes, vec![expected]);
    }

    #[test]
    fn test_entities_stay_escaped() {
        let nodes = parse(r#"<a t="x &amp; y">1 &lt; 2</a>"#);
        assert_eq!(nodes[0].attributes[0].value, b"x &amp; y");
        assert_eq!(nodes[0].value, b"1 &lt; 2");
    }

    #[test]
    fn test_cdata_is_kept_verbatim() {
        let nodes = parse("<a><![CDATA[<raw>]]></a>");
        assert_eq!(nodes[0].value, b"<![CDATA[<raw>]]>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_document(b""), ParseOutcome::Empty);
        assert_eq!(parse_document(b"   \n"), ParseOutcome::Empty);
    }

    #[test]
    fn test_malformed_input_keeps_partial_tree() {
        let outcome = parse_document(b"<a><b>ok</b><c></a>");
        let ParseOutcome::Parsed(nodes) = outcome else {
            panic!("expected a partial tree");
        };
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, b"a");
        assert_eq!(nodes[0].children[0], ParsedNode::element("b").with_value("ok"));
    }

    #[test]
    fn test_encoded_views() {
        let text = ParsedNode::text("t").with_attribute("x", "1");
        assert!(text.encoded_attributes().is_empty());

        let both = ParsedNode::element("a")
            .with_value("v")
            .with_child(ParsedNode::element("b"));
        assert!(both.encoded_children().is_empty());
    }

    fn nested(depth: usize) -> ParsedNode {
        let mut node = ParsedNode::element("a");
        for _ in 1..depth {
            node = ParsedNode::element("a").with_child(node);
        }
        node
    }

    #[test]
    fn test_walk_order() {
        let roots = parse("<a><b>v</b><c><d/></c></a><e/>");
        let steps: Vec<String> = TreeWalk::new(&roots)
            .map(|event| match event {
                WalkEvent::Enter { node, depth } => {
                    format!("+{}{}", String::from_utf8_lossy(&node.name), depth)
                }
                WalkEvent::Leave { node, depth } => {
                    format!("-{}{}", String::from_utf8_lossy(&node.name), depth)
                }
            })
            .collect();
        assert_eq!(
            steps,
            ["+a0", "+b1", "-b1", "+c1", "+d2", "-d2", "-c1", "-a0", "+e0", "-e0"]
        );
    }

    #[test]
    fn test_walk_skips_children_hidden_by_value() {
        let roots = [ParsedNode::element("a")
            .with_value("v")
            .with_child(ParsedNode::element("b"))];
        assert_eq!(TreeWalk::new(&roots).count(), 2);
        assert_eq!(TreeWalk::new(&[]).count(), 0);
    }

    #[test]
    fn test_deep_tree_walk_and_drop() {
        let roots = [nested(200_000)];
        let max_depth = TreeWalk::new(&roots)
            .filter_map(|event| match event {
                WalkEvent::Enter { depth, .. } => Some(depth),
                WalkEvent::Leave { .. } => None,
            })
            .max();
        assert_eq!(max_depth, Some(199_999));
        drop(roots);
    }
}
