//! Owned XML element tree on top of `quick-xml`.
//!
//! Parsing keeps, next to the tree, the exact source text of every top-level
//! section so that sections the reader does not understand can be written back
//! unchanged.

use std::fmt::Write as _;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{NafError, Result};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Character data (unescaped).
    Text(String),
    /// `<![CDATA[...]]>` section.
    CData(String),
    /// `<!--...-->` comment.
    Comment(String),
    /// Pre-serialized markup, written as is.
    Raw(String),
}

/// An element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name (`xml:lang` style prefixes are kept).
    pub name: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Set an attribute, replacing a previous value.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    /// Set an attribute when `value` is present.
    pub fn set_opt_attr<V: ToString>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set_attr(key, value.to_string());
        }
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append any node.
    pub fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First present attribute among `keys`.
    pub fn attr_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.attr(k))
    }

    /// Attribute value, or `MalformedInput` naming the element.
    pub fn req_attr(&self, key: &str) -> Result<&str> {
        self.attr(key)
            .ok_or_else(|| NafError::malformed(format!("<{}> is missing attribute '{}'", self.name, key)))
    }

    /// Child elements, in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements called `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated text and CDATA content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn is_inline(&self) -> bool {
        self.children.iter().all(|n| matches!(n, Node::Text(_) | Node::CData(_)))
    }
}

/// A parsed document: the root element plus the source text of its sections.
#[derive(Debug, Clone)]
pub struct Parsed {
    /// Root element.
    pub root: Element,
    /// Source text of each child element of the root, in order.
    pub sections: Vec<String>,
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| NafError::malformed(format!("invalid UTF-8: {}", e)))
}

fn open(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn source_slice(src: &str, from: usize, to: usize) -> String {
    let from = src[from..to].find('<').map_or(from, |i| from + i);
    src[from..to].to_string()
}

fn close(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(NafError::malformed("more than one root element")),
    }
    Ok(())
}

/// Parse `src` into an element tree.
///
/// Whitespace-only text between elements is dropped; all other text is kept
/// verbatim.
pub fn parse(src: &str) -> Result<Parsed> {
    let mut reader = Reader::from_str(src);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    let mut sections = Vec::new();
    let mut section_start = 0;

    loop {
        let before = reader.buffer_position();
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() == 1 {
                    section_start = before;
                }
                stack.push(open(&start)?);
            }
            Event::Empty(start) => {
                let element = open(&start)?;
                if stack.len() == 1 {
                    sections.push(source_slice(src, before, reader.buffer_position()));
                }
                close(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| NafError::malformed("unexpected closing tag"))?;
                if stack.len() == 1 {
                    sections.push(source_slice(src, section_start, reader.buffer_position()));
                }
                close(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text.unescape()?;
                    if !text.trim().is_empty() {
                        parent.push_node(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_node(Node::CData(utf8(&data.into_inner())?));
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_node(Node::Comment(utf8(&comment)?));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(NafError::malformed("document ends inside an element"));
    }
    let root = root.ok_or_else(|| NafError::malformed("document has no root element"))?;
    Ok(Parsed { root, sections })
}

/// Serialize `root` with an XML declaration, `indent` spaces per level.
pub fn to_string(root: &Element, indent: usize) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0, indent);
    out
}

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn write_cdata(out: &mut String, data: &str) {
    out.push_str("<![CDATA[");
    out.push_str(&data.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

fn write_element(out: &mut String, element: &Element, depth: usize, indent: usize) {
    pad(out, depth * indent);
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attrs {
        let _ = write!(out, " {}=\"{}\"", key, escape(value.as_str()));
    }
    if element.children.is_empty() {
        out.push_str(" />\n");
        return;
    }
    out.push('>');
    if element.is_inline() {
        for node in &element.children {
            match node {
                Node::Text(text) => out.push_str(&escape(text.as_str())),
                Node::CData(data) => write_cdata(out, data),
                _ => {}
            }
        }
    } else {
        out.push('\n');
        let inner = (depth + 1) * indent;
        for node in &element.children {
            match node {
                Node::Element(child) => write_element(out, child, depth + 1, indent),
                Node::Text(text) => {
                    pad(out, inner);
                    out.push_str(&escape(text.as_str()));
                    out.push('\n');
                }
                Node::CData(data) => {
                    pad(out, inner);
                    write_cdata(out, data);
                    out.push('\n');
                }
                Node::Comment(comment) => {
                    pad(out, inner);
                    let _ = writeln!(out, "<!--{}-->", comment);
                }
                Node::Raw(raw) => {
                    pad(out, inner);
                    out.push_str(raw);
                    out.push('\n');
                }
            }
        }
        pad(out, depth * indent);
    }
    let _ = writeln!(out, "</{}>", element.name);
}
