//! Owned XML element tree.
//!
//! Package parts are parsed into an [`XmlElement`] tree, transformed by
//! functions that take the tree by value, and serialized once. Element and
//! attribute names keep their original qualified form (`w:style`); lookups
//! go through local names so prefix choices in foreign producers do not
//! matter.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name (e.g., "w:style")
    pub name: String,
    /// Attributes as (qualified name, unescaped value), in order
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<XmlNode>,
}

/// Strip the namespace prefix from a qualified name.
pub fn local_name(qname: &str) -> &str {
    match qname.rfind(':') {
        Some(idx) => &qname[idx + 1..],
        None => qname,
    }
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: append an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder: append a child element.
    pub fn child(mut self, element: XmlElement) -> Self {
        self.children.push(XmlNode::Element(element));
        self
    }

    /// Builder: append child elements.
    pub fn children(mut self, elements: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children
            .extend(elements.into_iter().map(XmlNode::Element));
        self
    }

    /// Builder: append a text node.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Append a child element.
    pub fn push(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Insert a child element at a raw child index.
    pub fn insert(&mut self, index: usize, element: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(element));
    }

    /// Local part of the element name.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix of the element name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.rfind(':').map(|idx| &self.name[..idx])
    }

    /// Qualify a local name with this element's prefix.
    pub fn qualify(&self, local: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Get an attribute value by local name.
    pub fn get_attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute by local name, keeping its position if present.
    pub fn set_attr(&mut self, local: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self
            .attributes
            .iter_mut()
            .find(|(k, _)| local_name(k) == local)
        {
            slot.1 = value;
        } else {
            let key = self.qualify(local);
            self.attributes.push((key, value));
        }
    }

    /// Remove an attribute by local name, returning it.
    pub fn remove_attr(&mut self, local: &str) -> Option<(String, String)> {
        let idx = self
            .attributes
            .iter()
            .position(|(k, _)| local_name(k) == local)?;
        Some(self.attributes.remove(idx))
    }

    /// Iterate child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate child elements mutably.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn find(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// Raw child index of the first element with the given local name.
    pub fn position(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(e) if e.local_name() == local))
    }

    /// Remove every child element with the given local name.
    pub fn remove_children(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(e) if e.local_name() == local));
        before - self.children.len()
    }

    /// Serialize as a standalone UTF-8 part.
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.get_mut().extend_from_slice(b"\r\n");
        write_element(&mut writer, self)?;
        Ok(writer.into_inner())
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &element.children {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            XmlNode::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
            XmlNode::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Parse raw part bytes (any supported encoding) into a tree.
pub fn parse_bytes(bytes: &[u8]) -> Result<XmlElement> {
    let content = decode_xml_bytes(bytes)?;
    parse(&content)
}

/// Parse a well-formed XML document into its root element.
///
/// Unclosed elements, mismatched end tags, stray text outside the root and
/// a missing root are all reported as [`Error::XmlParse`].
pub fn parse(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlParse("unexpected end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::XmlParse(err.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => return Err(Error::XmlParse("text outside root element".to_string())),
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.children.push(XmlNode::CData(text));
                }
            }
            Ok(Event::Comment(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    parent.children.push(XmlNode::Comment(text));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::XmlParse(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::XmlParse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::XmlParse("no root element".to_string()))
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::XmlParse(err.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::XmlParse("multiple root elements".to_string()));
    }
    *root = Some(element);
    Ok(())
}
