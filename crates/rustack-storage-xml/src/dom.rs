//! A small read-only XML element tree.
//!
//! Response bodies are parsed once into an [`Element`] tree and then queried
//! by the record filler and the feed adapter. Namespace prefixes are resolved
//! while building the tree, so lookups compare namespace URIs rather than
//! prefixes.
//!
//! An element's text is the character data before its first child element,
//! with entity and character references resolved. Whitespace is kept as-is.

use quick_xml::NsReader;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::XmlError;

/// An attribute of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Resolved namespace URI, `None` for plain attributes.
    pub namespace: Option<String>,
    /// Local name.
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

/// An XML element with its attributes, text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Parse a complete document and return its root element.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the document is not well-formed, uses an unbound
    /// namespace prefix, or has no root element.
    pub fn parse(xml: &[u8]) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_reader(xml);
        let mut builder = TreeBuilder::default();

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = namespace_of(resolved)?;
            match event {
                Event::Start(e) => {
                    let element = open(&reader, &e, namespace)?;
                    builder.stack.push(element);
                }
                Event::Empty(e) => {
                    let element = open(&reader, &e, namespace)?;
                    builder.close(element)?;
                }
                Event::End(_) => {
                    let element = builder.stack.pop().ok_or_else(|| {
                        XmlError::UnexpectedElement("end tag without start tag".to_owned())
                    })?;
                    builder.close(element)?;
                }
                Event::Text(e) => {
                    let decoded = e
                        .decode()
                        .map_err(|err| XmlError::ParseError(err.to_string()))?;
                    let unescaped = quick_xml::escape::unescape(&decoded)
                        .map_err(|err| XmlError::ParseError(err.to_string()))?;
                    builder.push_text(&unescaped);
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|err| XmlError::ParseError(err.to_string()))?;
                    builder.push_text(text);
                }
                Event::GeneralRef(e) => {
                    let text = resolve_reference(&e)?;
                    builder.push_text(&text);
                }
                Event::Eof => break,
                // Skip declaration, comments, processing instructions, doctype.
                _ => {}
            }
        }

        if !builder.stack.is_empty() {
            return Err(XmlError::UnexpectedElement(
                "unexpected EOF inside an element".to_owned(),
            ));
        }
        builder
            .root
            .ok_or_else(|| XmlError::MissingElement("root element".to_owned()))
    }

    /// Local name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI of the element, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Text before the first child element; empty when there is none.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// All child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Whether this element has the given namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.name == name
    }

    /// First child without a namespace named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(None, name))
    }

    /// All children without a namespace named `name`.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(None, name))
    }

    /// First child in `namespace` named `name`.
    #[must_use]
    pub fn find_ns(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(Some(namespace), name))
    }

    /// All children in `namespace` named `name`.
    pub fn find_all_ns<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |c| c.is(Some(namespace), name))
    }

    /// Text of the first child without a namespace named `name`.
    #[must_use]
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(Element::text)
    }

    /// Value of a plain (non-namespaced) attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of an attribute in `namespace`.
    #[must_use]
    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    /// Attach a finished element to its parent, or make it the root.
    fn close(&mut self, element: Element) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                if self.root.is_some() {
                    return Err(XmlError::UnexpectedElement(format!(
                        "second root element: {}",
                        element.name
                    )));
                }
                self.root = Some(element);
            }
        }
        Ok(())
    }

    /// Append character data to the open element, before its first child only.
    fn push_text(&mut self, text: &str) {
        if let Some(current) = self.stack.last_mut() {
            if current.children.is_empty() {
                current.text.push_str(text);
            }
        }
    }
}

/// Build an element from a start tag whose namespace is already resolved.
fn open(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<Element, XmlError> {
    let name = utf8(start.local_name().into_inner())?.to_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        // Unprefixed attributes never take the default namespace.
        let (resolved, local) = reader.resolve_attribute(attr.key);
        attributes.push(XmlAttribute {
            namespace: namespace_of(resolved)?,
            name: utf8(local.into_inner())?.to_owned(),
            value: attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| XmlError::ParseError(e.to_string()))?
                .into_owned(),
        });
    }

    Ok(Element {
        name,
        namespace,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn namespace_of(resolved: ResolveResult<'_>) -> Result<Option<String>, XmlError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(utf8(ns.into_inner())?.to_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(XmlError::ParseError(format!(
            "unbound namespace prefix: {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|e| XmlError::ParseError(e.to_string()))
}

/// Resolve a character or predefined entity reference to its text.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, XmlError> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| XmlError::ParseError(e.to_string()))?
    {
        return Ok(ch.to_string());
    }
    let name = reference
        .decode()
        .map_err(|e| XmlError::ParseError(e.to_string()))?;
    quick_xml::escape::resolve_predefined_entity(&name)
        .map(str::to_owned)
        .ok_or_else(|| XmlError::ParseError(format!("unknown entity reference: &{name};")))
}
