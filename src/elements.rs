//! Focusable element scanning
//!
//! Turns a [`UiTree`] snapshot into the ordered list of elements the remote
//! can land on. The list is rebuilt wholesale whenever the UI changes; it is
//! never patched incrementally, except for dropdown items pruned on close.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::geometry::Rect;
use crate::tree::{NodeId, Tag, UiNode, UiTree};

/// Rows whose tops are within this many pixels are ordered left to right
pub const ROW_TOLERANCE: f64 = 50.0;

/// Classes that make any node focusable
const INTERACTIVE_CLASSES: &[&str] = &[
    "nav-link",
    "dropdown-item",
    "dropdown-toggle",
    "profile-card",
    "category-card",
    "thumbnail",
    "thumbnail-item",
    "video-thumbnail",
    "thumbnail-container",
];

/// Classes identifying a thumbnail card
pub const THUMBNAIL_CLASSES: &[&str] = &[
    "thumbnail",
    "thumbnail-item",
    "video-thumbnail",
    "thumbnail-container",
];

/// Carousel prev/next buttons are never focus targets
const CAROUSEL_CONTROL_CLASSES: &[&str] = &["carousel-control-prev", "carousel-control-next"];

/// Coarse region of the page an element belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Navbar,
    Profile,
    Carousel,
    News,
    Program,
    Content,
    Other,
}

impl Section {
    /// Sort priority, lower comes first
    pub fn priority(&self) -> u8 {
        match self {
            Section::Navbar => 1,
            Section::Profile => 2,
            Section::Carousel => 3,
            _ => 4,
        }
    }

    /// Sections where left/right stays within the same row
    pub fn is_row_locked(&self) -> bool {
        matches!(self, Section::Content | Section::News | Section::Program)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Navbar => "navbar",
            Section::Profile => "profile",
            Section::Carousel => "carousel",
            Section::News => "news",
            Section::Program => "program",
            Section::Content => "content",
            Section::Other => "other",
        }
    }
}

/// One stop for the remote
#[derive(Debug, Clone, PartialEq)]
pub struct FocusableElement {
    pub node: NodeId,
    pub rect: Rect,
    pub section: Section,
    /// Enclosing carousel, if any
    pub carousel: Option<NodeId>,
    /// Position in the sorted list
    pub index: usize,
    /// "TV mode" and toggle buttons, which upward navigation avoids
    pub low_value: bool,
    pub label: String,
}

impl FocusableElement {
    pub fn is_thumbnail(&self, tree: &UiTree) -> bool {
        tree.get(self.node)
            .is_some_and(|n| n.has_any_class(THUMBNAIL_CLASSES))
    }
}

/// The focus arena
#[derive(Debug, Clone, Default)]
pub struct FocusableElements {
    elements: Vec<FocusableElement>,
}

impl FocusableElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the current snapshot
    pub fn update_focusable_elements(&mut self, tree: &UiTree) {
        self.elements = collect_focusable(tree);
        debug!("NAV: rebuilt focusable list with {} elements", self.elements.len());
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FocusableElement> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FocusableElement> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[FocusableElement] {
        &self.elements
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.elements.iter().position(|e| e.node == node)
    }

    /// Drop elements by node and re-index the rest. Returns how many were removed.
    pub fn remove_nodes(&mut self, nodes: &[NodeId]) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !nodes.contains(&e.node));
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.index = index;
        }
        before - self.elements.len()
    }
}

#[cfg(test)]
impl FocusableElements {
    /// Build an arena directly, bypassing the tree scan
    pub fn from_elements(elements: Vec<FocusableElement>) -> Self {
        Self { elements }
    }
}

/// Scan, filter, sort and index the focusable elements of a tree
pub fn collect_focusable(tree: &UiTree) -> Vec<FocusableElement> {
    let candidates: Vec<NodeId> = tree
        .document_order()
        .into_iter()
        .filter(|id| tree.get(*id).is_some_and(is_interactive))
        .filter(|id| is_eligible(tree, *id))
        .collect();

    let kept = dedupe_thumbnails(tree, &candidates);

    let mut elements: Vec<FocusableElement> = kept
        .into_iter()
        .filter_map(|id| {
            let node = tree.get(id)?;
            Some(FocusableElement {
                node: id,
                rect: node.rect,
                section: classify_section(tree, id),
                carousel: tree.closest(id, |n| n.has_class("carousel")),
                index: 0,
                low_value: is_low_value(node),
                label: node.label(),
            })
        })
        .collect();

    sort_by_position(&mut elements);
    for (index, element) in elements.iter_mut().enumerate() {
        element.index = index;
    }
    elements
}

/// Fixed interactive selector list
fn is_interactive(node: &UiNode) -> bool {
    match node.tag {
        Tag::A if node.attr("href").is_some() => return true,
        Tag::Button | Tag::Input | Tag::Select | Tag::Textarea => return true,
        _ => {}
    }
    if node.attr("tabindex").is_some_and(|t| t.trim() != "-1") {
        return true;
    }
    node.has_any_class(INTERACTIVE_CLASSES)
}

/// Layout, visibility, disabled and carousel-control checks
fn is_eligible(tree: &UiTree, id: NodeId) -> bool {
    let Some(node) = tree.get(id) else {
        return false;
    };
    if !node.rect.has_area() || node.disabled || !tree.is_rendered(id) {
        return false;
    }
    tree.closest(id, is_carousel_control).is_none()
}

fn is_carousel_control(node: &UiNode) -> bool {
    node.has_any_class(CAROUSEL_CONTROL_CLASSES) || node.attr("data-bs-slide").is_some()
}

/// Keep the innermost thumbnail of a nested stack and drop interactive
/// nodes living inside a kept thumbnail card
fn dedupe_thumbnails(tree: &UiTree, candidates: &[NodeId]) -> Vec<NodeId> {
    let is_thumb = |id: NodeId| {
        tree.get(id)
            .is_some_and(|n| n.has_any_class(THUMBNAIL_CLASSES))
    };
    let thumbnails: Vec<NodeId> = candidates.iter().copied().filter(|id| is_thumb(*id)).collect();

    let kept_thumbnails: Vec<NodeId> = thumbnails
        .iter()
        .copied()
        .filter(|outer| !thumbnails.iter().any(|inner| tree.contains(*outer, *inner)))
        .collect();

    candidates
        .iter()
        .copied()
        .filter(|id| {
            if is_thumb(*id) {
                let keep = kept_thumbnails.contains(id);
                if !keep {
                    trace!("NAV: dropping container thumbnail {}", id);
                }
                keep
            } else {
                !kept_thumbnails.iter().any(|card| tree.contains(*card, *id))
            }
        })
        .collect()
}

/// Innermost recognizable region wins
pub fn classify_section(tree: &UiTree, id: NodeId) -> Section {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .find_map(|ancestor| tree.get(ancestor).and_then(section_of))
        .unwrap_or(Section::Other)
}

fn section_of(node: &UiNode) -> Option<Section> {
    if node.tag == Tag::Nav || node.has_class("navbar") {
        Some(Section::Navbar)
    } else if node.has_any_class(&["profile-section", "profile-selector", "profiles"]) {
        Some(Section::Profile)
    } else if node.has_class("carousel") {
        Some(Section::Carousel)
    } else if node.has_any_class(&["news-section", "news"]) {
        Some(Section::News)
    } else if node.has_any_class(&["program-section", "programs"]) {
        Some(Section::Program)
    } else if node.has_any_class(&["content-section", "category-section", "main-content"]) {
        Some(Section::Content)
    } else {
        None
    }
}

fn is_low_value(node: &UiNode) -> bool {
    let text = node.label().to_lowercase();
    text.contains("tv mode")
        || text.contains("toggle")
        || node.has_any_class(&["tv-mode-toggle", "navbar-toggler"])
}

/// Section priority, then row, then left edge
///
/// Rows are assigned with a sweep over tops so that the comparison is a
/// total order: a new row starts when an element sits more than
/// [`ROW_TOLERANCE`] below the first element of the current row.
fn sort_by_position(elements: &mut [FocusableElement]) {
    elements.sort_by(|a, b| {
        a.section
            .priority()
            .cmp(&b.section.priority())
            .then(cmp_f64(a.rect.top, b.rect.top))
            .then(cmp_f64(a.rect.left, b.rect.left))
    });

    let mut rows = Vec::with_capacity(elements.len());
    let mut row = 0usize;
    let mut row_top = f64::NEG_INFINITY;
    let mut priority = 0u8;
    for element in elements.iter() {
        let p = element.section.priority();
        if p != priority || element.rect.top - row_top > ROW_TOLERANCE {
            row += 1;
            row_top = element.rect.top;
            priority = p;
        }
        rows.push(row);
    }

    let mut keyed: Vec<(usize, FocusableElement)> =
        rows.into_iter().zip(elements.iter().cloned()).collect();
    keyed.sort_by(|(row_a, a), (row_b, b)| {
        row_a.cmp(row_b).then(cmp_f64(a.rect.left, b.rect.left))
    });
    for (slot, (_, element)) in elements.iter_mut().zip(keyed) {
        *slot = element;
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
