// crates/icd-rs/src/xml.rs

//! A minimal element tree built from `quick-xml` events.
//!
//! The ICD dialect carries almost everything in attributes, and the parser needs
//! to see every child tag by name (unknown ones are reported, not rejected), so
//! the document is read into this small owned tree instead of typed serde structs.

use crate::error::IcdError;
use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use log::warn;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

/// One XML element with its attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlElement {
    /// Local name of the tag (namespace prefix stripped).
    pub tag: String,
    /// Attributes in document order, keyed by their qualified name.
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content, if any.
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Returns the value of the attribute with the given qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content, or an empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Reads `xml_content` into an element tree and returns its root element.
///
/// # Errors
/// Returns `IcdError::XmlParsing` for syntax errors, `IcdError::UnknownEntity`
/// for an entity reference other than the predefined XML ones,
/// `IcdError::UnclosedElement` if the input ends inside an element and
/// `IcdError::MissingElement` if there is no root element at all.
pub(crate) fn read_document(xml_content: &str) -> Result<XmlElement, IcdError> {
    // Text is trimmed once per element, after entity references are joined in.
    let mut reader = Reader::from_str(xml_content);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_element(&reader, &start)?),
            Event::Empty(start) => {
                let element = open_element(&reader, &start)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // quick-xml checks that end tags match, so the stack cannot be empty here.
                if let Some(element) = stack.pop() {
                    close_element(&mut stack, &mut root, element);
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    append_text(current, &String::from_utf8_lossy(&text));
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    append_text(current, &String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                let resolved = resolve_reference(&reference)?;
                if let Some(current) = stack.last_mut() {
                    append_text(current, &resolved);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no ICD data.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(IcdError::UnclosedElement { tag: open.tag });
    }
    root.ok_or(IcdError::MissingElement {
        element: "document root",
    })
}

fn open_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement, IcdError> {
    let tag = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attribute.decode_and_unescape_value(reader.decoder())?;
        attributes.push((key, value.into_owned()));
    }
    Ok(XmlElement {
        tag,
        attributes,
        text: None,
        children: Vec::new(),
    })
}

fn close_element(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    mut element: XmlElement,
) {
    element.text = element
        .text
        .take()
        .map(|text| String::from(text.trim()))
        .filter(|text| !text.is_empty());
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => warn!("Ignoring extra top-level element <{}>", element.tag),
    }
}

/// Expands `&name;` and `&#N;` references found in element text.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, IcdError> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(String::from(ch));
    }
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    resolve_predefined_entity(&name)
        .map(String::from)
        .ok_or_else(|| IcdError::UnknownEntity {
            entity: name.into_owned(),
        })
}

fn append_text(element: &mut XmlElement, text: &str) {
    match element.text.as_mut() {
        Some(existing) => existing.push_str(text),
        None => element.text = Some(String::from(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_nested_elements() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ate:ICD xmlns:ate="http://example.org/ate">
  <devices index="0" name="D1" channels="//@bus/@channels.0">
    <parents>Root</parents>
  </devices>
  <bus/>
</ate:ICD>"#;
        let root = read_document(xml).unwrap();
        assert_eq!(root.tag, "ICD");
        assert_eq!(root.attribute("xmlns:ate"), Some("http://example.org/ate"));
        assert_eq!(root.children.len(), 2);

        let device = &root.children[0];
        assert_eq!(device.tag, "devices");
        assert_eq!(device.attribute("index"), Some("0"));
        assert_eq!(device.attribute("channels"), Some("//@bus/@channels.0"));
        assert_eq!(device.attribute("missing"), None);
        assert_eq!(device.children[0].text(), "Root");

        assert_eq!(root.children[1].tag, "bus");
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let root = read_document(r#"<ICD><devices index="1" name="A &amp; B"/></ICD>"#).unwrap();
        assert_eq!(root.children[0].attribute("name"), Some("A & B"));
    }

    #[test]
    fn test_text_entity_references_are_resolved() {
        let root = read_document(
            "<ICD><parents>A &amp; B</parents><channelTypes> X&lt;Y&#x41;&#66; </channelTypes></ICD>",
        )
        .unwrap();
        assert_eq!(root.children[0].text(), "A & B");
        assert_eq!(root.children[1].text(), "X<YAB");
        // Whitespace-only content between children does not become text.
        assert_eq!(root.text, None);
    }

    #[test]
    fn test_unknown_entity_is_rejected() {
        let result = read_document("<ICD><parents>&nbsp;</parents></ICD>");
        assert!(
            matches!(&result, Err(IcdError::UnknownEntity { entity }) if entity == "nbsp"),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_malformed_xml() {
        let result = read_document("<ICD><devices></bus></ICD>");
        assert!(matches!(result, Err(IcdError::XmlParsing(_))), "{:?}", result);
    }

    #[test]
    fn test_unclosed_element() {
        let result = read_document("<ICD><devices index=\"0\">");
        assert!(
            matches!(
                result,
                Err(IcdError::UnclosedElement { .. }) | Err(IcdError::XmlParsing(_))
            ),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_document(""),
            Err(IcdError::MissingElement { .. })
        ));
    }
}
