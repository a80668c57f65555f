//! Focus state for remote navigation
//!
//! Tracks which element of the focus arena is current and keeps the host's
//! highlight and native focus in step with it.

use tracing::{debug, warn};

use crate::config::FocusStyle;
use crate::elements::{FocusableElement, FocusableElements};
use crate::surface::Surface;
use crate::tree::NodeId;

/// Manages the single current selection
#[derive(Debug, Clone, Default)]
pub struct FocusManager {
    /// Currently focused element index (None = no focus)
    current: Option<usize>,
    /// Node carrying the highlight, which may have left the list since
    highlighted: Option<NodeId>,
    style: FocusStyle,
}

impl FocusManager {
    pub fn new(style: FocusStyle) -> Self {
        Self {
            current: None,
            highlighted: None,
            style,
        }
    }

    /// Move focus to `index`
    ///
    /// Out-of-range indices are logged and ignored; nothing on the surface
    /// changes. Returns true if focus was applied.
    pub fn set_focus(
        &mut self,
        elements: &FocusableElements,
        surface: &mut dyn Surface,
        index: usize,
    ) -> bool {
        let Some(target) = elements.get(index) else {
            warn!(
                "FOCUS: index {} out of bounds ({} elements), ignoring",
                index,
                elements.len()
            );
            return false;
        };

        if let Some(previous) = self.highlighted.take() {
            surface.set_highlight(previous, None);
        }
        for element in elements.iter() {
            surface.set_highlight(element.node, None);
        }
        surface.set_highlight(target.node, Some(&self.style));
        self.highlighted = Some(target.node);
        surface.scroll_into_view(target.node);
        surface.focus(target.node);
        self.current = Some(index);
        debug!("FOCUS: focused {} '{}' ({})", index, target.label, target.section.label());
        true
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_element<'a>(&self, elements: &'a FocusableElements) -> Option<&'a FocusableElement> {
        self.current.and_then(|idx| elements.get(idx))
    }

    pub fn current_node(&self, elements: &FocusableElements) -> Option<NodeId> {
        self.current_element(elements).map(|e| e.node)
    }

    /// Re-point the index after a rebuild without touching the surface
    pub fn reindex(&mut self, index: Option<usize>) {
        self.current = index;
    }

    /// Drop focus and its highlight
    pub fn blur(&mut self, elements: &FocusableElements, surface: &mut dyn Surface) {
        if let Some(node) = self.highlighted.take() {
            surface.set_highlight(node, None);
        }
        if let Some(node) = self.current_node(elements) {
            surface.set_highlight(node, None);
        }
        self.current = None;
    }

    pub fn style(&self) -> &FocusStyle {
        &self.style
    }
}
