//! Minimal XML document model for tally configuration files
//!
//! Only the small subset of XML needed by the tally documents is supported:
//! nested elements, attributes, text content, comments and the declaration.
//! Parsing lives in the [readers](crate::readers) module, this module holds
//! the tree and the writer.
//!
//! Output is deterministic. Attributes and children are written in insertion
//! order with a two space indent, so that writing a document read back from
//! disk reproduces the original bytes.
//!
//! ```rust
//! # use meshtally::xml::Element;
//! let element = Element::new("trigger")
//!     .with_attribute("type", "rel_err")
//!     .with_attribute("threshold", "0.025");
//!
//! assert_eq!(element.to_xml_string(), "<trigger type=\"rel_err\" threshold=\"0.025\"/>\n");
//! ```

// standard library
use std::io::Write;
use std::str::FromStr;

// internal modules
use crate::error::{Error, Result};
use crate::utils::f;

/// Declaration written at the top of every document
pub const DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

/// A single element and everything nested inside it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data, entities already decoded
    pub text: String,
    /// Child elements in document order
    pub children: Vec<Element>,
}

/// Builder helpers
impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl ToString) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: impl ToString) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Shorthand for a child that only holds text, e.g. `<scores>a b</scores>`
    pub fn with_text_child(self, name: &str, text: impl ToString) -> Self {
        self.with_child(Element::new(name).with_text(text))
    }
}

/// Lookups used when rebuilding objects from a document
impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute that must be present, or a parse error naming the element
    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| {
            Error::Parse(f!(
                "<{}> element is missing the required '{name}' attribute",
                self.name
            ))
        })
    }

    /// Attribute converted with [FromStr], if present
    pub fn parse_attribute<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.attribute(name)
            .map(|value| parse_value(value, &f!("'{name}' attribute of <{}>", self.name)))
            .transpose()
    }

    /// Required attribute converted with [FromStr]
    pub fn parse_required_attribute<T: FromStr>(&self, name: &str) -> Result<T> {
        let value = self.required_attribute(name)?;
        parse_value(value, &f!("'{name}' attribute of <{}>", self.name))
    }

    /// First child with the given tag name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Child that must be present, or a parse error naming the parent
    pub fn required_child(&self, name: &str) -> Result<&Element> {
        self.child(name).ok_or_else(|| {
            Error::Parse(f!(
                "<{}> element is missing the required <{name}> element",
                self.name
            ))
        })
    }

    /// Every child with the given tag name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Whitespace separated words of the text content
    pub fn words(&self) -> Vec<String> {
        self.text.split_whitespace().map(String::from).collect()
    }

    /// Whitespace separated values of the text content
    pub fn values<T: FromStr>(&self) -> Result<Vec<T>> {
        split_values(&self.text, &f!("<{}>", self.name))
    }
}

/// Writers
impl Element {
    /// Render the element and its children, one element per line
    pub fn to_xml_string(&self) -> String {
        let mut s = String::new();
        self.render(&mut s, 0);
        s
    }

    /// Write the full document, declaration included
    pub fn write_document<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{DECLARATION}")?;
        writer.write_all(self.to_xml_string().as_bytes())
    }

    fn render(&self, s: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        s.push_str(&indent);
        s.push('<');
        s.push_str(&self.name);
        for (name, value) in &self.attributes {
            s.push_str(&f!(" {name}=\"{}\"", escape(value)));
        }

        let text = self.text.trim();
        match (text.is_empty(), self.children.is_empty()) {
            (true, true) => s.push_str("/>\n"),
            (false, true) => s.push_str(&f!(">{}</{}>\n", escape(text), self.name)),
            _ => {
                s.push_str(">\n");
                if !text.is_empty() {
                    s.push_str(&f!("{indent}  {}\n", escape(text)));
                }
                for child in &self.children {
                    child.render(s, depth + 1);
                }
                s.push_str(&f!("{indent}</{}>\n", self.name));
            }
        }
    }
}

/// Escape the five predefined XML entities
///
/// ```rust
/// # use meshtally::xml::escape;
/// assert_eq!(escape("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
/// ```
pub fn escape(text: &str) -> String {
    let mut s = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(c),
        }
    }
    s
}

/// Decode the predefined and numeric character references
///
/// ```rust
/// # use meshtally::xml::unescape;
/// assert_eq!(unescape("a&lt;b &amp; &#65;").unwrap(), "a<b & A");
/// assert!(unescape("&bogus;").is_err());
/// ```
pub fn unescape(text: &str) -> Result<String> {
    let mut s = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        s.push_str(&rest[..start]);
        let end = rest[start..]
            .find(';')
            .ok_or_else(|| Error::Parse(f!("Unterminated entity in \"{text}\"")))?;
        let entity = &rest[start + 1..start + end];
        s.push(decode_entity(entity).ok_or_else(|| {
            Error::Parse(f!("Unknown entity '&{entity};' in \"{text}\""))
        })?);
        rest = &rest[start + end + 1..];
    }
    s.push_str(rest);
    Ok(s)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match entity.strip_prefix("#x") {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn parse_value<T: FromStr>(value: &str, context: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| Error::Parse(f!("Could not parse \"{value}\" in {context}")))
}

/// Parse every whitespace separated value of `text`
pub(crate) fn split_values<T: FromStr>(text: &str, context: &str) -> Result<Vec<T>> {
    text.split_whitespace()
        .map(|v| parse_value(v, context))
        .collect()
}
