//! nom parsers for the subset of XML used by tally documents
//!
//! Elements, attributes in either quote style, character data with entity
//! references, comments and processing instructions such as the declaration.
//! DTDs and CDATA sections are not supported.

// internal modules
use crate::xml::{unescape, Element};

// external crates
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till, take_until, take_while};
use nom::character::complete::{char, multispace0, multispace1, satisfy};
use nom::combinator::{map, map_res, recognize, value};
use nom::multi::{many0, many0_count};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

/// Pieces of element content, folded into text and children
enum Node {
    Text(String),
    Child(Element),
    Ignored,
}

/// Full document, a single root element surrounded by optional prolog/epilog
///
/// ```rust
/// # use meshtally::readers::parsers::document;
/// let text = "<?xml version='1.0'?>\n<a x=\"1\"><b>2</b></a>\n";
/// let (rest, root) = document(text).unwrap();
/// assert!(rest.is_empty());
/// assert_eq!(root.attribute("x"), Some("1"));
/// assert_eq!(root.children[0].text, "2");
/// ```
pub fn document(i: &str) -> IResult<&str, Element> {
    delimited(misc, element, misc)(i)
}

/// Any element, including everything nested inside it
pub fn element(i: &str) -> IResult<&str, Element> {
    let (i, (name, attributes)) = preceded(
        char('<'),
        pair(tag_name, terminated(many0(attribute), multispace0)),
    )(i)?;

    let (i, body) = alt((
        value(None, tag("/>")),
        map(delimited(char('>'), content, closing_tag(name)), Some),
    ))(i)?;

    let (text, children) = body.unwrap_or_default();
    Ok((
        i,
        Element {
            name: name.to_string(),
            attributes,
            text,
            children,
        },
    ))
}

/// Whitespace, comments and processing instructions between elements
fn misc(i: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((multispace1, comment, processing_instruction))),
    )(i)
}

fn comment(i: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(i)
}

fn processing_instruction(i: &str) -> IResult<&str, &str> {
    delimited(tag("<?"), take_until("?>"), tag("?>"))(i)
}

fn tag_name(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_' || c == ':'),
        take_while(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')),
    ))(i)
}

fn attribute(i: &str) -> IResult<&str, (String, String)> {
    let (i, (name, _, value)) = tuple((
        preceded(multispace1, tag_name),
        delimited(multispace0, char('='), multispace0),
        quoted,
    ))(i)?;
    Ok((i, (name.to_string(), value)))
}

fn quoted(i: &str) -> IResult<&str, String> {
    map_res(
        alt((
            delimited(char('"'), take_till(|c| c == '"'), char('"')),
            delimited(char('\''), take_till(|c| c == '\''), char('\'')),
        )),
        unescape,
    )(i)
}

/// Everything between the start and end tags
///
/// Whitespace-only text around child elements is layout and is dropped.
fn content(i: &str) -> IResult<&str, (String, Vec<Element>)> {
    let (i, nodes) = many0(alt((
        map(comment, |_| Node::Ignored),
        map(processing_instruction, |_| Node::Ignored),
        map(element, Node::Child),
        map(map_res(is_not("<"), unescape), Node::Text),
    )))(i)?;

    let mut text = String::new();
    let mut children = Vec::new();
    for node in nodes {
        match node {
            Node::Text(t) => text.push_str(&t),
            Node::Child(c) => children.push(c),
            Node::Ignored => (),
        }
    }

    if text.trim().is_empty() {
        text.clear();
    }
    Ok((i, (text, children)))
}

fn closing_tag<'a>(name: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    value((), tuple((tag("</"), tag(name), multispace0, char('>'))))
}
