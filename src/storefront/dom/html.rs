//! HTML parsing and serialization for the document arena.
//!
//! The parser is lenient: unknown end tags are ignored and unclosed elements are
//! closed at end of input. It only needs to handle server-rendered storefront
//! markup, not arbitrary tag soup.

use super::{Document, Element, NodeId, NodeKind};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Parse `html` and append the resulting nodes under `parent`
pub fn parse_into(document: &mut Document, parent: NodeId, html: &str) -> Result<()> {
    let bytes = html.as_bytes();
    let mut stack = vec![parent];
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            i = match find_subslice(bytes, i + 4, b"-->") {
                Some(end) => end + 3,
                None => bytes.len(),
            };
            continue;
        }

        if bytes[i] == b'<' && i + 1 < bytes.len() {
            let next = bytes[i + 1];
            if next == b'/' {
                let (tag, after) = parse_end_tag(html, i)?;
                i = after;
                if let Some(pos) = stack
                    .iter()
                    .rposition(|node| document.tag_name(*node) == Some(tag.as_str()))
                {
                    if pos > 0 {
                        stack.truncate(pos);
                    }
                }
                continue;
            }
            if next == b'!' || next == b'?' {
                i = match find_subslice(bytes, i, b">") {
                    Some(end) => end + 1,
                    None => bytes.len(),
                };
                continue;
            }
            if next.is_ascii_alphabetic() {
                let (tag, attrs, self_closing, after) = parse_start_tag(html, i)?;
                i = after;
                close_implied_end_tags(document, &mut stack, &tag);

                let current = *stack
                    .last()
                    .ok_or_else(|| anyhow!("HTML parse: missing parent element"))?;
                let node = document.append_element(current, Element::new(&tag, attrs));

                if RAW_TEXT_TAGS.contains(&tag.as_str()) && !self_closing {
                    let close = find_raw_end_tag(bytes, i, tag.as_bytes()).unwrap_or(bytes.len());
                    let body = html.get(i..close).unwrap_or("");
                    if !body.is_empty() {
                        let text = if tag == "textarea" || tag == "title" {
                            decode_character_references(body)
                        } else {
                            body.to_string()
                        };
                        document.append_text(node, text);
                    }
                    i = if close < bytes.len() {
                        parse_end_tag(html, close)?.1
                    } else {
                        close
                    };
                    continue;
                }

                if !self_closing && !is_void_tag(&tag) {
                    stack.push(node);
                }
                continue;
            }
        }

        let text_start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }
        if let Some(text) = html.get(text_start..i) {
            let current = *stack
                .last()
                .ok_or_else(|| anyhow!("HTML parse: missing parent element"))?;
            document.append_text(current, decode_character_references(text));
        }
    }

    Ok(())
}

fn close_implied_end_tags(document: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    let (closes, boundary): (&[&str], &[&str]) = match tag {
        "li" => (&["li"], &["ul", "ol"]),
        "option" => (&["option"], &["select", "datalist"]),
        "dt" | "dd" => (&["dt", "dd"], &["dl"]),
        _ => return,
    };
    for index in (1..stack.len()).rev() {
        let Some(open) = document.tag_name(stack[index]) else {
            continue;
        };
        if closes.contains(&open) {
            stack.truncate(index);
            return;
        }
        if boundary.contains(&open) {
            return;
        }
    }
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes.get(at..at + needle.len()) == Some(needle)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

fn find_raw_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + 2 + tag.len() <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn parse_end_tag(html: &str, start: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = start + 2;
    let name_start = i;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    let tag = html
        .get(name_start..i)
        .ok_or_else(|| anyhow!("HTML parse: invalid end tag at {start}"))?
        .to_ascii_lowercase();
    let end = find_subslice(bytes, i, b">").unwrap_or(bytes.len().saturating_sub(1));
    Ok((tag, end + 1))
}

type StartTag = (String, BTreeMap<String, String>, bool, usize);

fn parse_start_tag(html: &str, start: usize) -> Result<StartTag> {
    let bytes = html.as_bytes();
    let mut i = start + 1;
    let name_start = i;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    let tag = html
        .get(name_start..i)
        .ok_or_else(|| anyhow!("HTML parse: invalid start tag at {start}"))?
        .to_ascii_lowercase();

    let mut attrs = BTreeMap::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(anyhow!("HTML parse: unclosed <{tag}> tag"));
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                self_closing = true;
                i += 1;
                continue;
            }
            _ => {}
        }

        let key_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let key = html
            .get(key_start..i)
            .unwrap_or_default()
            .to_ascii_lowercase();
        self_closing = false;

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = decode_character_references(html.get(value_start..i).unwrap_or(""));
                i = (i + 1).min(bytes.len());
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = decode_character_references(html.get(value_start..i).unwrap_or(""));
            }
        }

        if !key.is_empty() {
            attrs.entry(key).or_insert(value);
        }
    }

    Ok((tag, attrs, self_closing, i))
}

/// Decode the character references server templates actually emit
pub fn decode_character_references(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let name = &tail[1..end];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{00A0}'),
                "yen" => Some('¥'),
                _ => name.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                        None => num.parse::<u32>().ok()?,
                    };
                    char::from_u32(code)
                }),
            };
            ch.map(|ch| (ch, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Serialize the children of `node` back to markup
pub fn serialize_children(document: &Document, node: NodeId) -> String {
    let mut out = String::new();
    let raw = document
        .tag_name(node)
        .is_some_and(|tag| RAW_TEXT_TAGS.contains(&tag) && tag != "textarea");
    for child in document.children(node) {
        serialize_node(document, *child, raw, &mut out);
    }
    out
}

fn serialize_node(document: &Document, node: NodeId, raw: bool, out: &mut String) {
    match document.kind(node) {
        Some(NodeKind::Text(text)) => {
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag_name);
            for (key, value) in &element.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void_tag(&element.tag_name) {
                return;
            }
            out.push_str(&serialize_children(document, node));
            out.push_str("</");
            out.push_str(&element.tag_name);
            out.push('>');
        }
        Some(NodeKind::Document) | None => {}
    }
}
