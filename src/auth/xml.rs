//! XML document codec
//!
//! The login handshake and write actions answer in XML. Responses are small,
//! so they are parsed into an owned element tree and rendered as JSON when
//! handed back to API callers.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use crate::error::{ProxyError, Result};

// == XML Element ==
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Concatenated text content directly under this element
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Renders the element as JSON: attributes become members, text is stored
    /// under `_`, and repeated child names collapse into arrays.
    pub fn to_json(&self) -> Value {
        let mut members = Map::new();

        for (key, value) in &self.attributes {
            members.insert(key.clone(), Value::String(value.clone()));
        }
        if !self.text.is_empty() {
            members.insert("_".to_string(), Value::String(self.text.clone()));
        }
        for child in &self.children {
            let rendered = child.to_json();
            match members.get_mut(&child.name) {
                Some(Value::Array(items)) => items.push(rendered),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, rendered]);
                }
                None => {
                    members.insert(child.name.clone(), rendered);
                }
            }
        }

        Value::Object(members)
    }
}

// == XML Document ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    /// Parses a complete document. Anything that is not well-formed XML with
    /// exactly one root element is a malformed response.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(malformed)?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    let data = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&data);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(malformed("unclosed element"));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| malformed("document has no root element"))
    }

    /// True when the upstream answered with an `<error>` document.
    pub fn is_error(&self) -> bool {
        self.root.name == "error"
    }

    /// Message carried by an `<error>` document, if it has one.
    pub fn error_message(&self) -> Option<&str> {
        if !self.is_error() {
            return None;
        }
        let text = self.root.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Renders the document as `{ rootName: { ... } }`.
    pub fn to_json(&self) -> Value {
        let mut wrapper = Map::new();
        wrapper.insert(self.root.name.clone(), self.root.to_json());
        Value::Object(wrapper)
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = BTreeMap::new();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(malformed)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(malformed)?.into_owned();
        attributes.insert(key, value);
    }

    Ok(XmlElement {
        name,
        attributes,
        ..XmlElement::default()
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("more than one root element")),
    }
    Ok(())
}

fn malformed(err: impl std::fmt::Display) -> ProxyError {
    ProxyError::MalformedResponse(format!("invalid XML: {}", err))
}
