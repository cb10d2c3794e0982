//! Owned, mutable XML element tree
//!
//! Read with quick-xml's event reader and written back with its writer.
//! Text and attribute values are stored in their escaped source form, and
//! markup the slicer never touches (declaration, DOCTYPE, comments, PIs,
//! CDATA) is kept as the original event, so untouched content is written
//! back as it was read.

use crate::errors::{EmaError, Result};
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// A node inside an element
#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Escaped character data, exactly as it appeared in the source
    Text(String),
    /// Comments, processing instructions, CDATA, declaration, DOCTYPE
    Markup(Event<'static>),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, XmlNode::Text(text) if !text.is_empty() && text.chars().all(char::is_whitespace))
    }
}

/// An element with ordered attributes and children
#[derive(Clone, Debug, PartialEq)]
pub struct XmlElement {
    pub name: String,
    /// `(name, escaped value)` in source order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Written as `<name/>` when it has no children
    self_closing: bool,
}

impl XmlElement {
    /// New empty element, written as `<name/>` until it gets children
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// New element holding a single (unescaped) text value
    pub fn with_text(name: impl Into<String>, text: &str) -> Self {
        let mut element = XmlElement::new(name);
        element.set_text(text);
        element
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Raw (escaped) attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |element| element.is(name))
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children
            .iter_mut()
            .filter_map(XmlNode::as_element_mut)
            .find(|element| element.is(name))
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Index into `children` of the first element called `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(element) if element.is(name)))
    }

    /// Element stored at a `children` index
    pub fn element_at(&self, index: usize) -> Option<&XmlElement> {
        self.children.get(index).and_then(XmlNode::as_element)
    }

    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        self.children.get_mut(index).and_then(XmlNode::as_element_mut)
    }

    /// Unescaped text content, `None` when the element holds no text
    pub fn text(&self) -> Option<String> {
        let mut raw = String::new();
        let mut found = false;
        for node in &self.children {
            if let XmlNode::Text(text) = node {
                raw.push_str(text);
                found = true;
            }
        }
        if !found {
            return None;
        }
        match unescape(&raw) {
            Ok(text) => Some(text.into_owned()),
            Err(_) => Some(raw),
        }
    }

    /// Parse the trimmed text content
    pub fn parse_text<T: std::str::FromStr>(&self) -> Option<T> {
        self.text()?.trim().parse().ok()
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![XmlNode::Text(partial_escape(text).into_owned())];
        self.self_closing = false;
    }

    /// Whitespace text immediately before `index`, used to indent inserted siblings
    fn indent_before(&self, index: usize) -> Option<XmlNode> {
        index
            .checked_sub(1)
            .and_then(|previous| self.children.get(previous))
            .filter(|node| node.is_whitespace())
            .cloned()
    }

    /// Insert `element` in front of the node at `index`, copying its indentation.
    /// Returns the number of nodes inserted.
    pub fn insert_element_before(&mut self, index: usize, element: XmlElement) -> usize {
        let index = index.min(self.children.len());
        let indent = self.indent_before(index);
        self.children.insert(index, XmlNode::Element(element));
        self.self_closing = false;
        match indent {
            Some(whitespace) => {
                self.children.insert(index + 1, whitespace);
                2
            }
            None => 1,
        }
    }

    /// Insert `element` after the node at `index`, copying its indentation.
    /// Returns the number of nodes inserted.
    pub fn insert_element_after(&mut self, index: usize, element: XmlElement) -> usize {
        if index >= self.children.len() {
            self.push_element(element);
            return 1;
        }
        let indent = self.indent_before(index);
        self.children.insert(index + 1, XmlNode::Element(element));
        self.self_closing = false;
        match indent {
            Some(whitespace) => {
                self.children.insert(index + 1, whitespace);
                2
            }
            None => 1,
        }
    }

    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
        self.self_closing = false;
    }

    /// Remove the node at `index` together with the indentation in front of it.
    /// Returns the index at which the following node now sits.
    pub fn remove_element_at(&mut self, index: usize) -> usize {
        if index >= self.children.len() {
            return index;
        }
        self.children.remove(index);
        if index > 0 && self.children[index - 1].is_whitespace() {
            self.children.remove(index - 1);
            return index - 1;
        }
        index
    }

    /// Remove every child element whose name is in `names`; returns how many went
    pub fn remove_children_named(&mut self, names: &[&str]) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.children.len() {
            match self.element_at(index) {
                Some(element) if names.contains(&element.name.as_str()) => {
                    index = self.remove_element_at(index);
                    removed += 1;
                }
                _ => index += 1,
            }
        }
        removed
    }

    fn from_start(start: &BytesStart, self_closing: bool) -> Result<Self> {
        let name = String::from_utf8(start.name().as_ref().to_vec())
            .map_err(|e| EmaError::MalformedDocument(format!("element name is not UTF-8: {}", e)))?;

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| {
                EmaError::MalformedDocument(format!("bad attribute on <{}>: {}", name, e))
            })?;
            let key = String::from_utf8(attribute.key.as_ref().to_vec()).map_err(|e| {
                EmaError::MalformedDocument(format!("attribute name on <{}> is not UTF-8: {}", name, e))
            })?;
            let value = String::from_utf8(attribute.value.into_owned()).map_err(|e| {
                EmaError::MalformedDocument(format!("attribute '{}' on <{}> is not UTF-8: {}", key, name, e))
            })?;
            attributes.push((key, value));
        }

        Ok(XmlElement {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> std::result::Result<(), quick_xml::Error> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            // Byte tuples are pushed verbatim: values are already escaped.
            // A single-quoted source value may still hold `"`, which the
            // double-quoted output cannot.
            let value: Cow<'_, str> = if value.contains('"') {
                Cow::Owned(value.replace('"', "&quot;"))
            } else {
                Cow::Borrowed(value.as_str())
            };
            start.push_attribute((key.as_bytes(), value.as_bytes()));
        }

        if self.children.is_empty() && self.self_closing {
            return writer.write_event(Event::Empty(start));
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> std::result::Result<(), quick_xml::Error> {
    match node {
        XmlNode::Element(element) => element.write(writer),
        XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::from_escaped(text.as_str()))),
        XmlNode::Markup(event) => writer.write_event(event.clone()),
    }
}

/// A whole XML document: prolog, root element, trailing nodes
#[derive(Clone, Debug, PartialEq)]
pub struct XmlDocument {
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
    pub epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a document, keeping every node
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                EmaError::MalformedDocument(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            let node = match event {
                Event::Start(start) => {
                    stack.push(XmlElement::from_start(&start, false)?);
                    continue;
                }
                Event::Empty(start) => XmlNode::Element(XmlElement::from_start(&start, true)?),
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        EmaError::MalformedDocument("closing tag without an open element".to_string())
                    })?;
                    XmlNode::Element(element)
                }
                Event::Text(text) => {
                    let raw = String::from_utf8(text.into_inner().into_owned()).map_err(|e| {
                        EmaError::MalformedDocument(format!("text is not UTF-8: {}", e))
                    })?;
                    XmlNode::Text(raw)
                }
                Event::Eof => break,
                other => XmlNode::Markup(other.into_owned()),
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }
            match node {
                XmlNode::Element(element) => {
                    if root.is_some() {
                        return Err(EmaError::MalformedDocument(format!(
                            "second root element <{}>",
                            element.name
                        )));
                    }
                    root = Some(element);
                }
                other if root.is_none() => prolog.push(other),
                other => epilog.push(other),
            }
        }

        if let Some(open) = stack.last() {
            return Err(EmaError::MalformedDocument(format!("unclosed element <{}>", open.name)));
        }
        let root = root.ok_or_else(|| EmaError::MalformedDocument("document has no root element".to_string()))?;

        Ok(XmlDocument { prolog, root, epilog })
    }

    /// Serialize the document back to a string
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let to_error = |e: quick_xml::Error| EmaError::Serialization(format!("XML write error: {}", e));

        for node in &self.prolog {
            write_node(&mut writer, node).map_err(to_error)?;
        }
        self.root.write(&mut writer).map_err(to_error)?;
        for node in &self.epilog {
            write_node(&mut writer, node).map_err(to_error)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| EmaError::Serialization(format!("output is not UTF-8: {}", e)))
    }
}
