//! XML element text addressed by a slash-separated path below the root element.
//!
//! The document is scanned rather than parsed into a tree so that an update
//! only touches the text of the target element; declarations, comments,
//! attributes and whitespace elsewhere are kept byte for byte.

use std::path::Path;

use super::{read_text, write_text};
use crate::error::{BumpCalverError, Result};

/// Byte span of an element's content, between its start and end tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ElementSpan {
    content_start: usize,
    content_end: usize,
}

impl ElementSpan {
    /// Span of the leading text, up to the first child node.
    fn text(&self, document: &str) -> (usize, usize) {
        let content = &document[self.content_start..self.content_end];
        let end = content.find('<').unwrap_or(content.len());
        (self.content_start, self.content_start + end)
    }
}

enum Lookup {
    Found(ElementSpan),
    Empty,
    Missing,
}

struct OpenElement<'a> {
    name: &'a str,
    content_start: usize,
}

fn malformed(what: &str) -> BumpCalverError {
    BumpCalverError::handler(format!("Malformed XML: {}", what))
}

fn path_segments(variable: &str) -> Vec<&str> {
    let trimmed = variable.strip_prefix("./").unwrap_or(variable);
    trimmed.split('/').filter(|s| !s.is_empty()).collect()
}

/// True when the open elements plus `name` address `target` (the root is not part of the path).
fn addresses(stack: &[OpenElement<'_>], name: &str, target: &[&str]) -> bool {
    stack.len() == target.len()
        && target.last() == Some(&name)
        && stack
            .iter()
            .skip(1)
            .zip(target.iter())
            .all(|(open, segment)| open.name == *segment)
}

/// Index of the `>` closing the tag starting at `start`, skipping quoted attribute values.
fn tag_end(document: &str, start: usize) -> Result<usize> {
    let mut quote: Option<char> = None;
    for (offset, c) in document[start..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Ok(start + offset),
            _ => {}
        }
    }
    Err(malformed("unterminated tag"))
}

fn skip_past(document: &str, from: usize, terminator: &str, what: &str) -> Result<usize> {
    document[from..]
        .find(terminator)
        .map(|offset| from + offset + terminator.len())
        .ok_or_else(|| malformed(what))
}

fn find_element(document: &str, target: &[&str]) -> Result<Lookup> {
    let mut stack: Vec<OpenElement<'_>> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = document[pos..].find('<') {
        let start = pos + offset;
        let rest = &document[start..];

        if rest.starts_with("<!--") {
            pos = skip_past(document, start, "-->", "unterminated comment")?;
        } else if rest.starts_with("<![CDATA[") {
            pos = skip_past(document, start, "]]>", "unterminated CDATA section")?;
        } else if rest.starts_with("<?") {
            pos = skip_past(document, start, "?>", "unterminated processing instruction")?;
        } else if rest.starts_with("<!") {
            pos = skip_past(document, start, ">", "unterminated declaration")?;
        } else if rest.starts_with("</") {
            let end = tag_end(document, start)?;
            let name = document[start + 2..end].trim();
            let open = stack
                .pop()
                .ok_or_else(|| malformed(&format!("unexpected closing tag '{}'", name)))?;
            if open.name != name {
                return Err(malformed(&format!(
                    "expected closing tag '{}', found '{}'",
                    open.name, name
                )));
            }
            if addresses(&stack, name, target) {
                return Ok(Lookup::Found(ElementSpan {
                    content_start: open.content_start,
                    content_end: start,
                }));
            }
            pos = end + 1;
        } else {
            let end = tag_end(document, start)?;
            let inner = &document[start + 1..end];
            let self_closing = inner.ends_with('/');
            let name = inner
                .trim_end_matches('/')
                .split(|c: char| c.is_whitespace())
                .next()
                .unwrap_or_default();
            if name.is_empty() {
                return Err(malformed("element without a name"));
            }

            if self_closing {
                if addresses(&stack, name, target) {
                    return Ok(Lookup::Empty);
                }
            } else {
                stack.push(OpenElement {
                    name,
                    content_start: end + 1,
                });
            }
            pos = end + 1;
        }
    }

    Ok(Lookup::Missing)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Reads the text of the element at `variable` (e.g. `version` or `properties/revision`).
pub fn read_xml(path: &Path, variable: &str) -> Result<Option<String>> {
    let document = read_text(path)?;
    let target = path_segments(variable);
    if target.is_empty() {
        return Ok(None);
    }

    match find_element(&document, &target)? {
        Lookup::Found(span) => {
            let (start, end) = span.text(&document);
            let text = unescape(document[start..end].trim());
            Ok(Some(text).filter(|t| !t.is_empty()))
        }
        Lookup::Empty | Lookup::Missing => Ok(None),
    }
}

/// Replaces the text of the element at `variable` in place.
pub fn update_xml(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let document = read_text(path)?;
    let target = path_segments(variable);
    if target.is_empty() {
        return Ok(false);
    }

    let span = match find_element(&document, &target)? {
        Lookup::Found(span) => span,
        Lookup::Empty | Lookup::Missing => return Ok(false),
    };

    let (start, end) = span.text(&document);
    let updated = format!(
        "{}{}{}",
        &document[..start],
        escape(new_version),
        &document[end..]
    );
    write_text(path, &updated)?;
    Ok(true)
}
