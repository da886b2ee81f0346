//! Serialize a [`DomTree`](super::DomTree) back to HTML text.
//!
//! Used to write out annotated documents after a scan and the restored
//! document once the highlight timer has fired.

use super::{DomTree, NodeId, NodeKind};

// Elements with no closing tag and no children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

// Elements whose text content is emitted raw, not entity-escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Render the whole tree, doctype included, as an HTML string.
pub fn to_html(tree: &DomTree) -> String {
    let mut out = String::new();
    if let Some(name) = tree.doctype() {
        out.push_str("<!DOCTYPE ");
        out.push_str(name);
        out.push('>');
    }
    for &child in tree.children(tree.root()) {
        write_node(tree, child, &mut out);
    }
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Document => {
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(el.tag());
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag()) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(el.tag());
            out.push('>');
        }
        NodeKind::Text(text) => {
            let raw_parent = tree
                .parent(id)
                .and_then(|p| tree.element(p))
                .map(|el| RAW_TEXT_ELEMENTS.contains(&el.tag()))
                .unwrap_or(false);
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
