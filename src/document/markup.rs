//! Minimal element-tree reader for net definition documents.
//!
//! Only what entity extraction needs is kept: element names, their character
//! data and their child elements. Attributes are parsed and dropped; comments,
//! processing instructions and a simple `DOCTYPE` line are skipped.
use std::borrow::Cow;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{all_consuming, recognize, value};
use nom::error::ErrorKind;
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::{IResult, Parser};

use super::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    /// Character data of this element with entities decoded, child markup removed.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Leaf elements carry scalar field values.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// Subnets nest without bound, so the tree is torn down without recursion.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Parses a whole document and returns its root element.
pub fn parse_document(source: &str) -> Result<Element, DocumentError> {
    match all_consuming(delimited(misc, element, misc)).parse(source) {
        Ok((_, root)) => Ok(root),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
            let (line, column) = position(source, err.input);
            Err(DocumentError::Syntax { line, column })
        }
        Err(nom::Err::Incomplete(_)) => {
            let (line, column) = position(source, "");
            Err(DocumentError::Syntax { line, column })
        }
    }
}

// 1-based line and column of the start of `rest` inside `source`.
fn position(source: &str, rest: &str) -> (usize, usize) {
    let consumed = &source[..source.len() - rest.len()];
    let line = consumed.matches('\n').count() + 1;
    let column = consumed
        .rsplit('\n')
        .next()
        .map(|last| last.chars().count())
        .unwrap_or_default()
        + 1;
    (line, column)
}

/// Reads one element and everything nested in it.
///
/// Open ancestors are kept on an explicit stack so nesting depth is bounded
/// by memory, not by the call stack.
fn element(input: &str) -> IResult<&str, Element> {
    let (mut input, (tag_name, self_closing)) = start_tag(input)?;
    let mut node = Element::new(tag_name);
    if self_closing {
        return Ok((input, node));
    }
    let mut ancestors: Vec<Element> = Vec::new();

    loop {
        if input.starts_with("</") {
            let (rest, closing) = end_tag(input)?;
            if closing != node.name {
                return Err(nom::Err::Failure(nom::error::Error::new(input, ErrorKind::Tag)));
            }
            input = rest;
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.children.push(node);
                    node = parent;
                }
                None => return Ok((input, node)),
            }
            continue;
        }

        input = if input.starts_with("<!--") {
            comment(input)?.0
        } else if input.starts_with("<![CDATA[") {
            let (rest, data) = cdata(input)?;
            node.text.push_str(data);
            rest
        } else if input.starts_with("<?") {
            processing_instruction(input)?.0
        } else if input.starts_with('<') {
            let (rest, (child_name, self_closing)) = start_tag(input)?;
            let child = Element::new(child_name);
            if self_closing {
                node.children.push(child);
            } else {
                ancestors.push(std::mem::replace(&mut node, child));
            }
            rest
        } else {
            let (rest, chunk) = char_data(input)?;
            node.text.push_str(&decode_entities(chunk));
            rest
        };
    }
}

fn start_tag(input: &str) -> IResult<&str, (&str, bool)> {
    let (input, tag_name) = preceded(char('<'), name).parse(input)?;
    let (input, _) = many0(attribute).parse(input)?;
    let (input, close) = tag_close(input)?;
    Ok((input, (tag_name, close == "/>")))
}

fn tag_close(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((tag("/>"), tag(">")))).parse(input)
}

fn end_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), name, preceded(multispace0, char('>'))).parse(input)
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_' || c == ':'),
        take_while(|c: char| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')),
    ))
    .parse(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        multispace1,
        separated_pair(
            name,
            delimited(multispace0, char('='), multispace0),
            alt((
                delimited(char('"'), take_until("\""), char('"')),
                delimited(char('\''), take_until("'"), char('\'')),
            )),
        ),
    )
    .parse(input)
}

fn comment(input: &str) -> IResult<&str, ()> {
    value((), delimited(tag("<!--"), take_until("-->"), tag("-->"))).parse(input)
}

fn processing_instruction(input: &str) -> IResult<&str, ()> {
    value((), delimited(tag("<?"), take_until("?>"), tag("?>"))).parse(input)
}

fn doctype(input: &str) -> IResult<&str, ()> {
    value((), delimited(tag("<!DOCTYPE"), take_until(">"), char('>'))).parse(input)
}

fn char_data(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '<').parse(input)
}

fn cdata(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>")).parse(input)
}

// Whitespace, comments and prolog noise around the root element.
fn misc(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            comment,
            processing_instruction,
            doctype,
        ))),
    )
    .parse(input)
}

fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .and_then(|end| resolve_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                // unknown entities pass through verbatim
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported -->
<document>
  <subnet id="root">
    <place><id>1</id><label>p&amp;q</label></place>
    <empty/>
  </subnet>
</document>
"#,
        )
        .unwrap();

        assert_eq!(root.name, "document");
        let subnet = root.children_named("subnet").next().unwrap();
        let place = subnet.children_named("place").next().unwrap();
        assert_eq!(place.children[0].text, "1");
        assert_eq!(place.children[1].text, "p&q");
        assert!(subnet.children_named("empty").next().unwrap().is_leaf());
    }

    #[test]
    fn cdata_and_character_references_become_text() {
        let root = parse_document("<a><![CDATA[<raw>]]>&#65;&#x42;&bogus;</a>").unwrap();
        assert_eq!(root.text, "<raw>AB&bogus;");
    }

    #[test]
    fn mismatched_tags_report_position() {
        let err = parse_document("<a>\n  <b></c>\n</a>").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 2, column: 6 }), "{err:?}");
    }

    #[test]
    fn deeply_nested_elements_do_not_exhaust_the_stack() {
        let depth = 20_000;
        let source = format!("{}<leaf>x</leaf>{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let root = parse_document(&source).unwrap();

        let mut levels = 1;
        let mut node = &root;
        while let Some(child) = node.children.first() {
            levels += 1;
            node = child;
        }
        assert_eq!(levels, depth + 1);
        assert_eq!(node.name, "leaf");
        assert_eq!(node.text, "x");
    }

    #[test]
    fn mismatched_tag_deep_inside_reports_position() {
        let err = parse_document("<a><b><c></b></c></a>").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 1, column: 10 }), "{err:?}");
    }

    #[test]
    fn unclosed_and_trailing_input_are_rejected() {
        assert!(parse_document("<a><b></b>").is_err());
        assert!(parse_document("<a/><b/>").is_err());
        assert!(parse_document("").is_err());
    }
}
