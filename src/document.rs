//! Owned, mutable SVG presentation tree.
//!
//! An uploaded map is parsed once into an [`SvgDocument`]. Elements keep
//! their attributes in source order and everything that is not an element
//! (text, comments, declarations, CDATA) is kept as raw markup, so
//! serializing an unedited document reproduces the uploaded structure.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

// ============================================================================
// Nodes
// ============================================================================

/// A child of an element in the presentation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),

    /// Any other markup, stored exactly as it appeared in the source.
    Raw(String),
}

/// A single attribute. The value is kept in its escaped source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An SVG element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,

    /// Whether the element was written as `<name/>` in the source.
    pub self_closing: bool,
}

impl Element {
    /// Creates an empty element with the given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        element.self_closing = self_closing;

        for attr in start.attributes() {
            let attr = attr?;
            element.attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: String::from_utf8_lossy(&attr.value).into_owned(),
            });
        }

        Ok(element)
    }

    /// Returns the unescaped value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| unescape(&attr.value).unwrap_or(Cow::Borrowed(attr.value.as_str())))
    }

    /// Sets an attribute, replacing an existing value in place or appending
    /// a new attribute at the end.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let value = escape(value).into_owned();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// The whitespace-separated names in the unescaped `class` attribute.
    pub fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns true if `class` is one of this element's class names.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Reads one property from the inline `style` attribute.
    pub fn style_property(&self, property: &str) -> Option<String> {
        let style = self.attribute("style")?;
        style_declarations(&style)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Sets one property of the inline `style` attribute, keeping the
    /// other declarations in order.
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut declarations = self
            .attribute("style")
            .map(|style| style_declarations(&style))
            .unwrap_or_default();

        match declarations.iter_mut().find(|(name, _)| name == property) {
            Some(declaration) => declaration.1 = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }

        let style = declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute("style", &style);
    }

    /// The fill the element is painted with: the inline style wins over the
    /// presentation attribute.
    pub fn effective_fill(&self) -> Option<String> {
        self.style_property("fill")
            .or_else(|| self.attribute("fill").map(Cow::into_owned))
    }

    /// Iterates over the element children, skipping raw markup.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Raw(_) => None,
        })
    }

    /// Visits this element and all of its descendants in document order.
    pub fn try_for_each_element_mut<F>(&mut self, f: &mut F) -> Result<()>
    where
        F: FnMut(&mut Element) -> Result<()>,
    {
        f(self)?;
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.try_for_each_element_mut(f)?;
            }
        }
        Ok(())
    }

    /// Counts this element and its descendants that carry `class`.
    pub fn count_with_class(&self, class: &str) -> usize {
        let own = usize::from(self.has_class(class));
        own + self
            .child_elements()
            .map(|child| child.count_with_class(class))
            .sum::<usize>()
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attributes {
            // Values containing a double quote came from a single-quoted source attribute.
            let quote = if attr.value.contains('"') { '\'' } else { '"' };
            out.push(' ');
            out.push_str(&attr.name);
            out.push('=');
            out.push(quote);
            out.push_str(&attr.value);
            out.push(quote);
        }

        if self.self_closing && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_markup(out),
                Node::Raw(raw) => out.push_str(raw),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Splits an inline style into `(property, value)` pairs.
fn style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

// ============================================================================
// SvgDocument
// ============================================================================

/// A parsed SVG file: the root element plus whatever markup surrounds it
/// (XML declaration, doctype, comments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl SvgDocument {
    /// Parses SVG markup into a presentation tree.
    ///
    /// A leading byte order mark is discarded.
    pub fn parse(markup: &str) -> Result<Self> {
        let markup = markup.strip_prefix('\u{feff}').unwrap_or(markup);
        let mut reader = Reader::from_str(markup);
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut root: Option<Element> = None;
        let mut epilog = Vec::new();

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let end = reader.buffer_position() as usize;

            let node = match event {
                Event::Start(tag) => {
                    stack.push(Element::from_start(&tag, false)?);
                    continue;
                }
                Event::Empty(tag) => Node::Element(Element::from_start(&tag, true)?),
                Event::End(_) => match stack.pop() {
                    Some(element) => Node::Element(element),
                    None => return Err(Error::NoRootElement),
                },
                Event::Eof => break,
                _ => Node::Raw(markup[start..end].to_string()),
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }

            match node {
                Node::Element(element) if root.is_none() => root = Some(element),
                Node::Element(element) => return Err(Error::MultipleRootElements(element.name)),
                raw if root.is_none() => prolog.push(raw),
                raw => epilog.push(raw),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(Error::UnclosedElement(open.name));
        }

        let root = root.ok_or(Error::NoRootElement)?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// The root element (normally `<svg>`).
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serializes the whole document back to markup.
    ///
    /// The output never starts with a byte order mark, even if the parsed
    /// source did; it is always UTF-8.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            if let Node::Raw(raw) = node {
                out.push_str(raw);
            }
        }
        self.root.write_markup(&mut out);
        for node in &self.epilog {
            if let Node::Raw(raw) = node {
                out.push_str(raw);
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" class="mapviz-map" viewBox="0 0 100 100">
  <!-- generated -->
  <polygon class="mapviz-water" fill="#0000ff" points="0,0 10,0 10,10"/>
  <path class="mapviz-building extra" fill="#888888" d="M0 0 L5 5"></path>
  <g><circle class="mapviz-water" fill="#0000ff" r="1"/></g>
</svg>
"##;

    #[test]
    fn parse_keeps_root_and_children() {
        let doc = SvgDocument::parse(MAP).unwrap();
        assert_eq!(doc.root().name, "svg");

        let names: Vec<_> = doc.root().child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["polygon", "path", "g"]);
    }

    #[test]
    fn unedited_document_serializes_verbatim() {
        let doc = SvgDocument::parse(MAP).unwrap();
        assert_eq!(doc.to_markup(), MAP);
    }

    #[test]
    fn classes_and_attributes() {
        let doc = SvgDocument::parse(MAP).unwrap();
        let path = doc.root().child_elements().nth(1).unwrap();

        assert_eq!(path.classes(), ["mapviz-building", "extra"]);
        assert!(path.has_class("extra"));
        assert!(!path.has_class("mapviz"));
        assert_eq!(path.attribute("fill").as_deref(), Some("#888888"));
        assert!(path.attribute("stroke").is_none());
    }

    #[test]
    fn inline_style_overrides_fill_without_touching_attribute() {
        let mut doc = SvgDocument::parse(MAP).unwrap();
        let root = doc.root_mut();
        let Node::Element(polygon) = root
            .children
            .iter_mut()
            .find(|n| matches!(n, Node::Element(_)))
            .unwrap()
        else {
            unreachable!()
        };

        polygon.set_style_property("fill", "#00ff00");
        assert_eq!(polygon.attribute("fill").as_deref(), Some("#0000ff"));
        assert_eq!(polygon.effective_fill().as_deref(), Some("#00ff00"));

        polygon.set_style_property("fill", "#ff0000");
        assert_eq!(polygon.attribute("style").as_deref(), Some("fill: #ff0000;"));
    }

    #[test]
    fn style_property_preserves_other_declarations() {
        let mut element = Element::new("rect");
        element.set_attribute("style", "stroke: black; fill: red");
        element.set_style_property("fill", "#123456");

        assert_eq!(element.style_property("stroke").as_deref(), Some("black"));
        assert_eq!(element.style_property("fill").as_deref(), Some("#123456"));
    }

    #[test]
    fn count_with_class_descends_into_groups() {
        let doc = SvgDocument::parse(MAP).unwrap();
        assert_eq!(doc.root().count_with_class("mapviz-water"), 2);
        assert_eq!(doc.root().count_with_class("mapviz-map"), 1);
    }

    #[test]
    fn class_names_are_compared_unescaped() {
        let doc = SvgDocument::parse(r#"<svg><path class="mapviz-a&amp;b"/></svg>"#).unwrap();
        let path = doc.root().child_elements().next().unwrap();

        assert_eq!(path.classes(), ["mapviz-a&b"]);
        assert!(path.has_class("mapviz-a&b"));
        assert!(!path.has_class("mapviz-a&amp;b"));
    }

    #[test]
    fn leading_bom_is_not_reproduced() {
        let doc = SvgDocument::parse("\u{feff}<svg/>").unwrap();
        assert_eq!(doc.to_markup(), "<svg/>");
    }

    #[test]
    fn single_quoted_attribute_survives_serialization() {
        let markup = r#"<svg><text data-label='say "hi"'/></svg>"#;
        let doc = SvgDocument::parse(markup).unwrap();
        assert_eq!(doc.to_markup(), markup);
    }

    #[test]
    fn rejects_unclosed_and_empty_markup() {
        assert!(matches!(
            SvgDocument::parse("<svg><g>"),
            Err(Error::UnclosedElement(_)) | Err(Error::Xml(_))
        ));
        assert!(matches!(
            SvgDocument::parse("just text"),
            Err(Error::NoRootElement)
        ));
    }

    #[test]
    fn rejects_second_root() {
        assert!(matches!(
            SvgDocument::parse("<svg/><svg/>"),
            Err(Error::MultipleRootElements(name)) if name == "svg"
        ));
    }
}
