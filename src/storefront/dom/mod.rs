//! # Document Model
//!
//! An arena-backed document that stands in for the browser DOM. Controllers read
//! form state and markup from it, and views project view-state records onto it.
//!
//! `remove` only detaches a node, so it can be appended again. Subtrees dropped
//! by `release` (and children replaced through `set_inner_html` or
//! `set_text_content`) go back to a free list and their slots are reused. Every
//! slot carries a generation, so a `NodeId` kept past its release resolves to
//! nothing instead of to the slot's next occupant.

pub mod html;
pub mod selector;
pub mod validity;

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

pub use selector::Selector;
pub use validity::ValidityState;

/// Document shared between the page controllers on the single UI thread
pub type SharedDocument = Arc<Mutex<Document>>;

/// Lock a shared document. Poisoning is ignored; the arena has no invariants a
/// panicking holder could break halfway.
pub fn lock(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Slot of a node inside its document arena, tagged with the slot's generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Element data, including the live form-control state that diverges from attributes
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag_name: String,
    pub attrs: BTreeMap<String, String>,
    pub value: String,
    pub checked: bool,
    pub custom_validity: String,
}

impl Element {
    pub fn new(tag_name: &str, attrs: BTreeMap<String, String>) -> Self {
        let checked = attrs.contains_key("checked");
        let value = attrs.get("value").cloned().unwrap_or_default();
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            value,
            checked,
            custom_validity: String::new(),
        }
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.attrs
            .get("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }

    fn class_tokens(&self) -> Vec<String> {
        self.attrs
            .get("class")
            .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
            .unwrap_or_default()
    }

    fn set_class_tokens(&mut self, classes: &[String]) {
        if classes.is_empty() {
            self.attrs.remove("class");
        } else {
            self.attrs.insert("class".to_string(), classes.join(" "));
        }
    }
}

/// The page document plus the browsing state that belongs to it (location, history, focus)
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    /// Released slots waiting for reuse
    free: Vec<usize>,
    root: NodeId,
    location: Url,
    history: Vec<Url>,
    focused: Option<NodeId>,
}

impl Document {
    /// Create an empty document at `location`
    pub fn new(location: Url) -> Self {
        Self {
            nodes: vec![Node {
                generation: 0,
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            history: vec![location.clone()],
            location,
            focused: None,
        }
    }

    /// Parse a full HTML page served from `location`
    pub fn parse(html: &str, location: Url) -> Result<Self> {
        let mut document = Self::new(location);
        let root = document.root;
        html::parse_into(&mut document, root, html)?;
        document.initialize_form_controls(root);
        Ok(document)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<html>` element, if the markup had one
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|child| self.tag_name(*child) == Some("html"))
    }

    /// The `<body>` element, falling back to the document root for fragments
    pub fn body(&self) -> NodeId {
        self.query_selector("body").unwrap_or(self.root)
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Replace the location without reloading, recording a history entry
    pub fn push_state(&mut self, url: Url) {
        tracing::debug!("history push: {}", url);
        self.history.push(url.clone());
        self.location = url;
    }

    pub fn history(&self) -> &[Url] {
        &self.history
    }

    pub fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|node| self.is_connected(*node))
    }

    // ---- tree structure -------------------------------------------------

    fn slot(&self, node: NodeId) -> Option<&Node> {
        self.nodes
            .get(node.index)
            .filter(|slot| slot.generation == node.generation)
    }

    fn slot_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(node.index)
            .filter(|slot| slot.generation == node.generation)
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.parent = parent;
                slot.kind = kind;
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.nodes.push(Node {
                    generation: 0,
                    parent,
                    children: Vec::new(),
                    kind,
                });
                NodeId {
                    index: self.nodes.len() - 1,
                    generation: 0,
                }
            }
        };
        if let Some(parent) = parent.and_then(|parent| self.slot_mut(parent)) {
            parent.children.push(id);
        }
        id
    }

    /// Number of live node slots, the document node included
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        self.push_node(None, NodeKind::Element(Element::new(tag_name, attrs)))
    }

    pub(crate) fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.push_node(Some(parent), NodeKind::Element(element))
    }

    pub(crate) fn append_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.push_node(Some(parent), NodeKind::Text(text))
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.slot(parent).is_none() || self.slot(child).is_none() {
            return;
        }
        self.remove(child);
        if let Some(slot) = self.slot_mut(child) {
            slot.parent = Some(parent);
        }
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.push(child);
        }
    }

    /// Detach a node (and its subtree) from the tree; it can be appended again
    pub fn remove(&mut self, node: NodeId) {
        let parent = self.slot_mut(node).and_then(|slot| slot.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.slot_mut(parent)) {
            parent.children.retain(|child| *child != node);
        }
    }

    /// Detach a node and free its subtree. Ids into the subtree stop resolving.
    pub fn release(&mut self, node: NodeId) {
        if node == self.root || self.slot(node).is_none() {
            return;
        }
        self.remove(node);
        self.free_subtree(node);
    }

    fn free_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slot_mut(current) else {
                continue;
            };
            stack.append(&mut slot.children);
            slot.parent = None;
            slot.kind = NodeKind::Text(String::new());
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.slot(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children only, skipping text nodes
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// All descendants of `scope` in document order, excluding `scope`
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub(crate) fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.slot(node).map(|n| &n.kind)
    }

    // ---- element accessors ---------------------------------------------

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match self.slot_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element
                .attrs
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node) {
            element.attrs.remove(name);
        }
    }

    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id").filter(|id| !id.is_empty())
    }

    pub fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.element(node)
            .map(|e| e.has_class(class_name))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class_name: &str) {
        self.set_class(node, class_name, true);
    }

    pub fn remove_class(&mut self, node: NodeId, class_name: &str) {
        self.set_class(node, class_name, false);
    }

    /// Add or remove a class token
    pub fn set_class(&mut self, node: NodeId, class_name: &str, on: bool) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        let mut classes = element.class_tokens();
        let present = classes.iter().any(|c| c == class_name);
        if on && !present {
            classes.push(class_name.to_string());
        } else if !on && present {
            classes.retain(|c| c != class_name);
        } else {
            return;
        }
        element.set_class_tokens(&classes);
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        if let Some(NodeKind::Text(text)) = self.kind(node) {
            return text.clone();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if self.element(node).is_none() {
            return;
        }
        self.clear_children(node);
        if !text.is_empty() {
            self.append_text(node, text.to_string());
        }
        if self.tag_name(node) == Some("textarea") {
            if let Some(element) = self.element_mut(node) {
                element.value = text.to_string();
            }
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = self
            .slot_mut(node)
            .map(|slot| std::mem::take(&mut slot.children))
            .unwrap_or_default();
        for child in children {
            if let Some(slot) = self.slot_mut(child) {
                slot.parent = None;
            }
            self.free_subtree(child);
        }
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        html::serialize_children(self, node)
    }

    /// Replace the subtree of `node` with parsed `markup`
    pub fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<()> {
        self.clear_children(node);
        html::parse_into(self, node, markup)?;
        self.initialize_form_controls(node);
        Ok(())
    }

    // ---- form control state -------------------------------------------

    pub fn value(&self, node: NodeId) -> String {
        self.element(node)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.value = value.to_string();
        }
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.element(node).map(|e| e.checked).unwrap_or(false)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(element) = self.element_mut(node) {
            element.checked = checked;
        }
    }

    pub fn custom_validity(&self, node: NodeId) -> &str {
        self.element(node)
            .map(|e| e.custom_validity.as_str())
            .unwrap_or("")
    }

    pub fn set_custom_validity(&mut self, node: NodeId, message: &str) {
        if let Some(element) = self.element_mut(node) {
            element.custom_validity = message.to_string();
        }
    }

    /// Derive textarea and select values from their markup
    fn initialize_form_controls(&mut self, scope: NodeId) {
        for node in self.descendants(scope) {
            match self.tag_name(node) {
                Some("textarea") => {
                    let text = self.text_content(node);
                    self.set_value(node, &text);
                }
                Some("select") => {
                    let options = self.query_selector_all_in(node, "option");
                    let chosen = options
                        .iter()
                        .copied()
                        .find(|option| self.attr(*option, "selected").is_some())
                        .or_else(|| options.first().copied());
                    let value = chosen.map(|option| self.option_value(option));
                    self.set_value(node, &value.unwrap_or_default());
                }
                _ => {}
            }
        }
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(value) => value.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    // ---- selectors -----------------------------------------------------

    /// First element in the document matching `selector`
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_in(self.root, selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.query_selector_all_in(self.root, selector)
    }

    pub fn query_selector_in(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let selector = self.parse_selector(selector)?;
        self.descendants(scope)
            .into_iter()
            .find(|node| selector.matches(self, *node))
    }

    pub fn query_selector_all_in(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = self.parse_selector(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    /// Whether `node` itself matches `selector`
    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        self.parse_selector(selector)
            .is_some_and(|selector| selector.matches(self, node))
    }

    /// `node` or its nearest ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let selector = self.parse_selector(selector)?;
        self.ancestors_inclusive(node)
            .into_iter()
            .find(|candidate| selector.matches(self, *candidate))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.id(*node) == Some(id))
    }

    /// Element with `id` inside `scope`
    pub fn get_element_by_id_in(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.id(*node) == Some(id))
    }

    /// Whether `node` is `scope` or lies inside it
    pub fn contains(&self, scope: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == scope {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// `node` and its ancestors, innermost first
    pub fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        let mut current = self.parent(node);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    fn parse_selector(&self, selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("unsupported selector '{}': {}", selector, e);
                None
            }
        }
    }
}
