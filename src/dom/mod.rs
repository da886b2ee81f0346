//! Owned DOM tree built from a parsed HTML document.
//!
//! `scraper` owns the parse; the resulting tree is copied into a flat arena
//! (`Vec` of nodes addressed by `NodeId`) so analyses can mutate attributes
//! and inline styles without fighting the parser's borrowed node handles.
//! Document order is preserved: a parent always precedes its descendants.

pub mod serialize;
pub mod style;

use scraper::Html;

/// Index of a node inside a [`DomTree`] arena.
pub type NodeId = usize;

/// The kinds of node retained from the parse.
///
/// Doctypes are folded into the tree header; fragments and processing
/// instructions do not occur in a parsed page and are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Tag name plus attribute list for an element node.
///
/// The `style` attribute is the single source of truth for inline styles;
/// the property accessors below parse and rewrite it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        Self { tag, attrs }
    }

    /// Tag name, lowercase as produced by the HTML parser.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Remove an attribute, returning its previous value if present.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of an inline style declaration, if declared.
    pub fn style_property(&self, name: &str) -> Option<String> {
        let decls = style::parse_declarations(self.attr("style")?);
        decls
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Set or replace an inline style declaration, rewriting the `style` attribute.
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        let mut decls = self
            .attr("style")
            .map(style::parse_declarations)
            .unwrap_or_default();
        if let Some(entry) = decls.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            entry.1 = value.to_string();
        } else {
            decls.push((name.to_ascii_lowercase(), value.to_string()));
        }
        self.set_attr("style", &style::serialize_declarations(&decls));
    }

    /// Remove an inline style declaration; drops the whole attribute when the
    /// last declaration goes away.
    pub fn remove_style_property(&mut self, name: &str) {
        let Some(raw) = self.attr("style") else { return };
        let mut decls = style::parse_declarations(raw);
        decls.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        if decls.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", &style::serialize_declarations(&decls));
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable DOM tree in a flat arena.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    root: NodeId,
    doctype: Option<String>,
}

impl DomTree {
    /// Parse an HTML document into an owned tree.
    ///
    /// Traversal mirrors the parser's tree with an explicit stack, pushing
    /// children in reverse so ids are assigned in document order.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut tree = DomTree {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: 0,
            doctype: None,
        };

        let mut stack: Vec<(ego_tree::NodeRef<scraper::Node>, NodeId)> = document
            .tree
            .root()
            .children()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|c| (c, tree.root))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            let kind = match node.value() {
                scraper::Node::Element(el) => NodeKind::Element(ElementData::new(
                    el.name().to_string(),
                    el.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                )),
                scraper::Node::Text(t) => NodeKind::Text(t.text.to_string()),
                scraper::Node::Comment(c) => NodeKind::Comment(c.comment.to_string()),
                scraper::Node::Doctype(d) => {
                    tree.doctype = Some(d.name().to_string());
                    continue;
                }
                _ => continue,
            };

            let id = tree.push_node(kind, parent);
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, id));
            }
        }

        tree
    }

    fn push_node(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// The document node anchoring the tree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Doctype name from the source, if any.
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Element payload of a node, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Direct children that are elements, in document order.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    /// All element descendants of `id` (excluding `id` itself) in document
    /// pre-order, so an ancestor never appears after its descendants.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if self.element(n).is_some() {
                out.push(n);
            }
            stack.extend(self.nodes[n].children.iter().rev());
        }
        out
    }

    /// Concatenated text of all text nodes under `id`, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if let NodeKind::Text(t) = &self.nodes[n].kind {
                out.push_str(t);
            }
            stack.extend(self.nodes[n].children.iter().rev());
        }
        out
    }

    /// The document element (`<html>` in a full document).
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root).into_iter().next()
    }

    /// The `<body>` element, when present.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .into_iter()
            .find(|&c| self.element(c).map(|e| e.tag() == "body").unwrap_or(false))
    }

    /// Remove `id` from its parent's child list. The node stays in the arena
    /// but is no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Whether `id` is still reachable from the root via parent links.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.nodes[cur].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_document_order() {
        let tree = DomTree::parse("<html><body><div><span>a</span></div><p>b</p></body></html>");
        let body = tree.body().expect("body");
        let tags: Vec<_> = tree
            .descendant_elements(body)
            .into_iter()
            .map(|id| tree.element(id).unwrap().tag().to_string())
            .collect();
        assert_eq!(tags, vec!["div", "span", "p"]);
    }

    #[test]
    fn parse_keeps_text_and_comments() {
        let tree = DomTree::parse("<html><body><!-- note --><p>hi</p></body></html>");
        let body = tree.body().expect("body");
        let kinds: Vec<_> = tree.children(body).iter().map(|&c| tree.kind(c).clone()).collect();
        assert!(matches!(kinds[0], NodeKind::Comment(ref c) if c.contains("note")));
        assert_eq!(tree.text_content(body), "hi");
    }

    #[test]
    fn attribute_roundtrip() {
        let mut tree = DomTree::parse("<html><body><div id=\"x\" class=\"a b\"></div></body></html>");
        let body = tree.body().unwrap();
        let div = tree.element_children(body)[0];
        assert_eq!(tree.element(div).unwrap().attr("id"), Some("x"));

        let el = tree.element_mut(div).unwrap();
        el.set_attr("data-mark", "1");
        assert_eq!(el.attr("data-mark"), Some("1"));
        assert_eq!(el.remove_attr("data-mark"), Some("1".to_string()));
        assert!(!el.has_attr("data-mark"));
    }

    #[test]
    fn style_property_accessors_rewrite_the_attribute() {
        let mut tree =
            DomTree::parse("<html><body><div style=\"display: none; color: red\"></div></body></html>");
        let body = tree.body().unwrap();
        let div = tree.element_children(body)[0];

        let el = tree.element_mut(div).unwrap();
        assert_eq!(el.style_property("display").as_deref(), Some("none"));

        el.set_style_property("display", "block");
        assert_eq!(el.style_property("display").as_deref(), Some("block"));
        assert_eq!(el.style_property("color").as_deref(), Some("red"));

        el.remove_style_property("display");
        el.remove_style_property("color");
        assert!(!el.has_attr("style"));
    }

    #[test]
    fn detach_makes_node_unreachable() {
        let mut tree = DomTree::parse("<html><body><div></div></body></html>");
        let body = tree.body().unwrap();
        let div = tree.element_children(body)[0];
        assert!(tree.is_attached(div));

        tree.detach(div);
        assert!(!tree.is_attached(div));
        assert!(tree.element_children(body).is_empty());
    }

    #[test]
    fn document_element_and_body_lookups() {
        let tree = DomTree::parse("<html><head><title>t</title></head><body></body></html>");
        assert!(tree.body().is_some());
        assert_eq!(
            tree.element(tree.document_element().unwrap()).unwrap().tag(),
            "html"
        );
    }
}
