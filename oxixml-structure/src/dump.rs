//! Human-readable token stream dump.
//!
//! One line per node, indented with one tab per depth:
//!
//! ```text
//! -1 0
//! 	-1 1 @0=char:1 =str:2 -2
//! -2
//! ```
//!
//! `-1` opens a node and is followed by its name id (`#` for a text node),
//! then `@<attr id>=<type>:<payload>` per attribute and `=<type>:<payload>`
//! for a value. `-2` closes the node, on the same line unless the node has
//! children.

use crate::token::{IdWidths, Token, TokenReader};
use oxixml_core::error::{OxiXmlError, Result};

const HEAD: &str = "-1";
const TAIL: &str = "-2";

fn push_indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat_n('\t', depth));
}

/// Render the token stream `tokens` as dump text.
pub fn dump_tokens(tokens: &[u8], widths: IdWidths) -> Result<String> {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut line_open = false;

    for item in TokenReader::new(tokens, widths) {
        let (offset, token) = item?;
        match token {
            Token::Node(id) => {
                if line_open {
                    return Err(OxiXmlError::corrupted(offset, "node start inside a node"));
                }
                push_indent(&mut out, depth);
                line_open = true;
                out.push_str(HEAD);
                out.push(' ');
                match id {
                    Some(id) => out.push_str(&id.to_string()),
                    None => out.push('#'),
                }
            }
            Token::Attribute { id, value } => {
                out.push_str(" @");
                out.push_str(&id.to_string());
                out.push('=');
                out.push_str(&value.to_string());
            }
            Token::Value(value) => {
                out.push_str(" =");
                out.push_str(&value.to_string());
            }
            Token::Children => {
                line_open = false;
                depth += 1;
                out.push('\n');
            }
            Token::End => {
                if line_open {
                    line_open = false;
                    out.push(' ');
                } else {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        OxiXmlError::corrupted(offset, "end token with no open node")
                    })?;
                    push_indent(&mut out, depth);
                }
                out.push_str(TAIL);
                out.push('\n');
            }
        }
    }

    Ok(out)
}
