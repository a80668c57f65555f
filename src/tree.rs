//! UI tree snapshot
//!
//! An arena of nodes describing what the host currently shows: tag, classes,
//! attributes, bounding box and visibility. Node ids are arena indices and
//! stay stable for the lifetime of the tree; detached subtrees keep their
//! slots but are no longer reachable from the root.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::geometry::Rect;

/// Stable identifier of a node within a [`UiTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element kind, named after the HTML tags the navigation heuristics care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Body,
    A,
    Button,
    Input,
    Select,
    Textarea,
    Nav,
    Section,
    Div,
    Span,
    Ul,
    Li,
    Img,
}

/// A node in the snapshot
#[derive(Debug, Clone)]
pub struct UiNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub tag: Tag,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub rect: Rect,
    pub text: String,
    /// `display: none` on this node
    pub display_none: bool,
    /// `visibility: hidden` on this node
    pub visibility_hidden: bool,
    pub disabled: bool,
}

impl UiNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn has_any_class(&self, classes: &[&str]) -> bool {
        classes.iter().any(|c| self.has_class(c))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Human readable label: text, then aria-label, then href
    pub fn label(&self) -> String {
        let text = self.text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
        self.attr("aria-label")
            .or_else(|| self.attr("href"))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Description of a node to append to a tree
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: Tag,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    rect: Rect,
    text: String,
    display_none: bool,
    visibility_hidden: bool,
    disabled: bool,
}

impl ElementSpec {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            rect: Rect::default(),
            text: String::new(),
            display_none: false,
            visibility_hidden: false,
            disabled: false,
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn rect(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.rect = Rect::new(left, top, width, height);
        self
    }

    pub fn bounds(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn display_none(mut self, hidden: bool) -> Self {
        self.display_none = hidden;
        self
    }

    pub fn visibility_hidden(mut self, hidden: bool) -> Self {
        self.visibility_hidden = hidden;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Arena-backed snapshot of the host UI
#[derive(Debug, Clone)]
pub struct UiTree {
    nodes: Vec<UiNode>,
}

impl UiTree {
    /// Create a tree whose root (`body`) spans the viewport
    pub fn new(viewport: Rect) -> Self {
        let root = UiNode {
            id: NodeId(0),
            parent: None,
            children: Vec::new(),
            tag: Tag::Body,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            rect: viewport,
            text: String::new(),
            display_none: false,
            visibility_hidden: false,
            disabled: false,
        };
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn viewport(&self) -> Rect {
        self.nodes[0].rect
    }

    /// Number of node slots, detached ones included
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Append a child node, returning its id
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(UiNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            tag: spec.tag,
            classes: spec.classes,
            attrs: spec.attrs,
            rect: spec.rect,
            text: spec.text,
            display_none: spec.display_none,
            visibility_hidden: spec.visibility_hidden,
            disabled: spec.disabled,
        });
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Detach a subtree from its parent. The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|c| *c != id);
        }
        self.nodes[id.0].parent = None;
        true
    }

    pub fn get(&self, id: NodeId) -> Option<&UiNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut UiNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.get_mut(id) {
            if !node.has_class(class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.get_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }

    pub fn set_display_none(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.get_mut(id) {
            node.display_none = hidden;
        }
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    /// First node among `id` and its ancestors matching `pred`
    pub fn closest<F>(&self, id: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&UiNode) -> bool,
    {
        let node = self.get(id)?;
        if pred(node) {
            return Some(id);
        }
        self.ancestors(id).find(|a| self.get(*a).is_some_and(&pred))
    }

    /// True when `node` is a strict descendant of `ancestor`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor != node && self.ancestors(node).any(|a| a == ancestor)
    }

    /// Descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.get(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every attached node in document order, root first
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut out = vec![self.root()];
        out.extend(self.descendants(self.root()));
        out
    }

    /// True when the node is attached and neither it nor an ancestor is hidden
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if node.display_none || node.visibility_hidden {
            return false;
        }
        let mut last = id;
        for ancestor in self.ancestors(id) {
            match self.get(ancestor) {
                Some(a) if a.display_none || a.visibility_hidden => return false,
                Some(_) => last = ancestor,
                None => return false,
            }
        }
        last == self.root()
    }

    /// Find an attached node by its `id` attribute
    pub fn find_by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|id| self.get(*id).and_then(|n| n.attr("id")) == Some(dom_id))
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    tree: &'a UiTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|n| n.parent);
        Some(current)
    }
}
