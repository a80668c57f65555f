//! Host capability for the navigation engine
//!
//! The engine never touches a concrete UI toolkit. Everything it reads comes
//! from [`Surface::tree`] and everything it does goes through the other
//! methods. [`MemorySurface`] is the in-memory host used by the tests and
//! the terminal preview.

use std::collections::BTreeSet;

use tracing::trace;

use crate::carousel::{self, SlideStep};
use crate::config::FocusStyle;
use crate::dropdown::OPEN_MARKER;
use crate::geometry::Point;
use crate::keys::MediaCommand;
use crate::tree::{NodeId, UiTree};

/// Operations a host exposes to the navigation engine
pub trait Surface {
    /// Current snapshot of the UI
    fn tree(&self) -> &UiTree;

    /// Apply (`Some`) or clear (`None`) the focus highlight on a node
    fn set_highlight(&mut self, node: NodeId, style: Option<&FocusStyle>);

    /// Scroll so the node sits in the middle of the viewport on both axes
    fn scroll_into_view(&mut self, node: NodeId);

    /// Native focus
    fn focus(&mut self, node: NodeId);

    /// Synthetic click
    fn click(&mut self, node: NodeId);

    /// Follow a link
    fn navigate_to(&mut self, href: &str);

    /// Browser-style back navigation
    fn history_back(&mut self);

    /// Show or hide a dropdown menu, keeping the open marker in sync
    fn set_menu_open(&mut self, menu: NodeId, open: bool);

    /// Move a carousel one slide. Returns false when there is no such slide.
    fn step_carousel(&mut self, carousel: NodeId, step: SlideStep) -> bool;

    /// Transport keys for the player
    fn media_command(&mut self, _command: MediaCommand) {}
}

/// Record of an operation performed on a [`MemorySurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Highlight(NodeId),
    ClearHighlight(NodeId),
    ScrollIntoView(NodeId),
    Focus(NodeId),
    Click(NodeId),
    Navigate(String),
    HistoryBack,
    MenuOpened(NodeId),
    MenuClosed(NodeId),
    CarouselStep(NodeId, SlideStep),
    Media(MediaCommand),
}

/// In-memory host backed by a [`UiTree`]
#[derive(Debug, Clone)]
pub struct MemorySurface {
    tree: UiTree,
    highlighted: BTreeSet<NodeId>,
    focused: Option<NodeId>,
    scroll: Point,
    ops: Vec<SurfaceOp>,
}

impl MemorySurface {
    pub fn new(tree: UiTree) -> Self {
        Self {
            tree,
            highlighted: BTreeSet::new(),
            focused: None,
            scroll: Point::default(),
            ops: Vec::new(),
        }
    }

    /// Mutable access for hosts that change the UI (the caller reports the
    /// change to the controller as a mutation)
    pub fn tree_mut(&mut self) -> &mut UiTree {
        &mut self.tree
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn highlighted(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.highlighted.iter().copied()
    }

    pub fn is_highlighted(&self, node: NodeId) -> bool {
        self.highlighted.contains(&node)
    }

    /// Scroll offset of the viewport's top-left corner
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn history_back_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == SurfaceOp::HistoryBack).count()
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl Surface for MemorySurface {
    fn tree(&self) -> &UiTree {
        &self.tree
    }

    fn set_highlight(&mut self, node: NodeId, style: Option<&FocusStyle>) {
        match style {
            Some(_) => {
                self.highlighted.insert(node);
                self.ops.push(SurfaceOp::Highlight(node));
            }
            None => {
                if self.highlighted.remove(&node) {
                    self.ops.push(SurfaceOp::ClearHighlight(node));
                }
            }
        }
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        let Some(rect) = self.tree.get(node).map(|n| n.rect) else {
            return;
        };
        let viewport = self.tree.viewport();
        let center = rect.center();
        self.scroll = Point::new(
            (center.x - viewport.width / 2.0).max(0.0),
            (center.y - viewport.height / 2.0).max(0.0),
        );
        trace!("SURFACE: scrolled to ({}, {}) for {}", self.scroll.x, self.scroll.y, node);
        self.ops.push(SurfaceOp::ScrollIntoView(node));
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
        self.ops.push(SurfaceOp::Focus(node));
    }

    fn click(&mut self, node: NodeId) {
        self.ops.push(SurfaceOp::Click(node));
    }

    fn navigate_to(&mut self, href: &str) {
        self.ops.push(SurfaceOp::Navigate(href.to_string()));
    }

    fn history_back(&mut self) {
        self.ops.push(SurfaceOp::HistoryBack);
    }

    fn set_menu_open(&mut self, menu: NodeId, open: bool) {
        if open {
            self.tree.add_class(menu, OPEN_MARKER);
            self.tree.add_class(menu, "show");
            self.ops.push(SurfaceOp::MenuOpened(menu));
        } else {
            self.tree.remove_class(menu, OPEN_MARKER);
            self.tree.remove_class(menu, "show");
            self.ops.push(SurfaceOp::MenuClosed(menu));
        }
        self.tree.set_display_none(menu, !open);
    }

    fn step_carousel(&mut self, carousel: NodeId, step: SlideStep) -> bool {
        let slides = carousel::slides(&self.tree, carousel);
        let Some(active) = slides
            .iter()
            .position(|s| self.tree.get(*s).is_some_and(|n| n.has_class("active")))
        else {
            return false;
        };
        let target = match step {
            SlideStep::Next if active + 1 < slides.len() => active + 1,
            SlideStep::Prev if active > 0 => active - 1,
            _ => return false,
        };
        let (from, to) = (slides[active], slides[target]);
        self.tree.remove_class(from, "active");
        self.tree.set_display_none(from, true);
        self.tree.add_class(to, "active");
        self.tree.set_display_none(to, false);
        self.ops.push(SurfaceOp::CarouselStep(carousel, step));
        true
    }

    fn media_command(&mut self, command: MediaCommand) {
        self.ops.push(SurfaceOp::Media(command));
    }
}
