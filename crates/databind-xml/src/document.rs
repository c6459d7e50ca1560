//! XML documents parsed into an arena of nodes.

use std::path::Path;

use databind_model::{DataError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// Handle to a node of an [`XmlDocument`].
///
/// Handles are ordered in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element { name: String },
    Attribute { name: String, value: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
}

/// A parsed XML document.
///
/// Comments, processing instructions and whitespace-only text are dropped.
/// Attributes are nodes of their element but not among its children.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
}

impl XmlDocument {
    /// Parse `text`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Xml`] for malformed or unbalanced markup.
    pub fn parse(text: &str) -> Result<Self> {
        let mut document = XmlDocument {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                attributes: Vec::new(),
            }],
        };
        let mut open = vec![document.root()];
        let mut reader = Reader::from_str(text);
        loop {
            let parent = *open.last().unwrap_or(&document.root());
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => {
                    let element = document.push_element(parent, &start)?;
                    open.push(element);
                }
                Event::Empty(start) => {
                    document.push_element(parent, &start)?;
                }
                Event::End(end) => {
                    let qname = end.name();
                    let name = utf8(qname.as_ref())?;
                    if open.len() <= 1 {
                        return Err(DataError::Xml(format!("unexpected closing tag </{name}>")));
                    }
                    open.pop();
                }
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    let unescaped = quick_xml::escape::unescape(raw).map_err(xml_error)?;
                    document.push_text(parent, &unescaped);
                }
                Event::CData(data) => {
                    document.push_text(parent, utf8(&data)?);
                }
                Event::GeneralRef(reference) => {
                    let entity = format!("&{};", utf8(&reference)?);
                    let resolved = quick_xml::escape::unescape(&entity).map_err(xml_error)?;
                    document.push_text(parent, &resolved);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if open.len() > 1 {
            return Err(DataError::Xml("unexpected end of document".to_string()));
        }
        if document.element_children(document.root()).next().is_none() {
            return Err(DataError::Xml("document has no root element".to_string()));
        }
        debug!(nodes = document.nodes.len(), "parsed xml document");
        Ok(document)
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Io`] if the file cannot be read, otherwise as
    /// [`XmlDocument::parse`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The document node, parent of the root element.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Element and text children in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn attributes(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].attributes
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| matches!(self.kind(*child), NodeKind::Element { .. }))
    }

    /// Element or attribute name.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element { name } | NodeKind::Attribute { name, .. } => Some(name),
            NodeKind::Root | NodeKind::Text(_) => None,
        }
    }

    /// Value of the attribute `name` on `node`.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find_map(|attribute| match self.kind(*attribute) {
                NodeKind::Attribute {
                    name: candidate,
                    value,
                } if candidate == name => Some(value.as_str()),
                _ => None,
            })
    }

    /// The XPath string-value: the concatenated text of all descendants for
    /// elements and the document, the value itself for attributes and text.
    pub fn string_value(&self, node: NodeId) -> String {
        match self.kind(node) {
            NodeKind::Attribute { value, .. } => value.clone(),
            NodeKind::Text(text) => text.clone(),
            NodeKind::Root | NodeKind::Element { .. } => {
                let mut out = String::new();
                self.collect_text(node, &mut out);
                out
            }
        }
    }

    /// `node` followed by all of its descendants, attributes excluded.
    pub fn descendants_or_self(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        let mut index = 0;
        while index < out.len() {
            let current = out[index];
            out.extend_from_slice(self.children(current));
            index += 1;
        }
        out.sort_unstable();
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        for child in self.children(node) {
            match self.kind(*child) {
                NodeKind::Text(text) => out.push_str(text),
                _ => self.collect_text(*child, out),
            }
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
        });
        id
    }

    fn push_element(&mut self, parent: NodeId, start: &BytesStart<'_>) -> Result<NodeId> {
        if parent == self.root() && self.element_children(parent).next().is_some() {
            return Err(DataError::Xml(
                "document has more than one root element".to_string(),
            ));
        }
        let name = utf8(start.name().as_ref())?.to_string();
        let element = self.push(parent, NodeKind::Element { name });
        self.nodes[parent.0].children.push(element);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(xml_error)?;
            let name = utf8(attribute.key.as_ref())?.to_string();
            let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
            let id = self.push(element, NodeKind::Attribute { name, value });
            self.nodes[element.0].attributes.push(id);
        }
        Ok(element)
    }

    fn push_text(&mut self, parent: NodeId, text: &str) {
        if parent == self.root() || text.trim().is_empty() {
            return;
        }
        // Adjacent text pieces (entity references, CDATA) form one node.
        if let Some(&last) = self.nodes[parent.0].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last.0].kind
        {
            existing.push_str(text);
            return;
        }
        let id = self.push(parent, NodeKind::Text(text.to_string()));
        self.nodes[parent.0].children.push(id);
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(xml_error)
}

fn xml_error(error: impl std::fmt::Display) -> DataError {
    DataError::Xml(error.to_string())
}
