//! A small CSS selector engine.
//!
//! Supports compound steps (`tag`, `#id`, `.class`, `[attr]`, `[attr="value"]`,
//! `:checked`) joined by descendant combinators, which covers every selector
//! the storefront controllers use.

use super::{Document, NodeId};
use anyhow::{anyhow, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorStep {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrCondition>,
    pub checked: bool,
}

impl SelectorStep {
    fn matches(&self, document: &Document, node: NodeId) -> bool {
        let Some(element) = document.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if &element.tag_name != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        let attrs_match = self.attrs.iter().all(|condition| match condition {
            AttrCondition::Exists { key } => element.attrs.contains_key(key),
            AttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
        });
        attrs_match && (!self.checked || element.checked)
    }
}

/// A parsed selector: steps from outermost ancestor to the subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    steps: Vec<SelectorStep>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(anyhow!("empty selector"));
        }

        let mut steps = Vec::new();
        for part in split_outside_brackets(selector) {
            steps.push(parse_step(&part)?);
        }
        Ok(Self { steps })
    }

    /// Check `node` against the selector, walking ancestors for descendant steps
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        let Some((subject, ancestors)) = self.steps.split_last() else {
            return false;
        };
        if !subject.matches(document, node) {
            return false;
        }

        let mut current = document.parent(node);
        for step in ancestors.iter().rev() {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = document.parent(candidate);
                if step.matches(document, candidate) {
                    break;
                }
            }
        }
        true
    }
}

fn split_outside_brackets(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        match (ch, quote) {
            ('"' | '\'', None) => quote = Some(ch),
            (c, Some(q)) if c == q => quote = None,
            ('[', None) => depth += 1,
            (']', None) => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 && quote.is_none() {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b'_')) {
        i += 1;
    }
    (i > start).then(|| (src[start..i].to_string(), i))
}

fn parse_step(part: &str) -> Result<SelectorStep> {
    let unsupported = || anyhow!("unsupported selector step '{part}'");
    let bytes = part.as_bytes();
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                let (id, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                step.id = Some(id);
                i = next;
            }
            b'.' => {
                let (class_name, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let close = part[i..].find(']').ok_or_else(unsupported)? + i;
                let body = &part[i + 1..close];
                let condition = match body.split_once('=') {
                    Some((key, value)) => AttrCondition::Eq {
                        key: key.trim().to_ascii_lowercase(),
                        value: value.trim().trim_matches(['"', '\'']).to_string(),
                    },
                    None => AttrCondition::Exists {
                        key: body.trim().to_ascii_lowercase(),
                    },
                };
                step.attrs.push(condition);
                i = close + 1;
            }
            b':' => {
                let (pseudo, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                if pseudo != "checked" {
                    return Err(unsupported());
                }
                step.checked = true;
                i = next;
            }
            _ => {
                if step.tag.is_some() || i != 0 {
                    return Err(unsupported());
                }
                let (tag, next) = parse_ident(part, i).ok_or_else(unsupported)?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }
    Ok(step)
}
