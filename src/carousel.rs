//! Carousel slide transitions
//!
//! When horizontal search runs out of candidates at the edge of a carousel's
//! active slide, the remote moves the carousel instead. The host animates the
//! slide; the controller lands focus on the new slide after a fixed delay.

use tracing::{debug, info};

use crate::elements::FocusableElements;
use crate::navigator::Direction;
use crate::surface::Surface;
use crate::tree::{NodeId, UiTree};

/// Direction a carousel moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideStep {
    Next,
    Prev,
}

impl SlideStep {
    /// Where focus lands once the new slide is showing
    pub fn landing(&self) -> SlideLanding {
        match self {
            SlideStep::Next => SlideLanding::First,
            SlideStep::Prev => SlideLanding::Last,
        }
    }
}

/// Which item of the new slide receives focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLanding {
    First,
    Last,
}

/// Result of trying a slide transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    /// The carousel moved; focus lands after the slide delay
    Transitioned(SlideStep),
    /// At the outer edge with nowhere to go; the key is swallowed
    Absorbed,
    /// Not a carousel edge, normal handling applies
    NotApplicable,
}

impl SlideOutcome {
    /// True if the caller must not move focus itself
    pub fn handled(&self) -> bool {
        !matches!(self, SlideOutcome::NotApplicable)
    }
}

/// Slides belonging to `carousel`, in document order
///
/// Slides of a nested carousel belong to that carousel, not this one.
pub fn slides(tree: &UiTree, carousel: NodeId) -> Vec<NodeId> {
    tree.descendants(carousel)
        .into_iter()
        .filter(|id| {
            tree.get(*id).is_some_and(|n| n.has_class("carousel-item"))
                && tree.closest(*id, |n| n.has_class("carousel")) == Some(carousel)
        })
        .collect()
}

/// The slide currently marked active
pub fn active_slide(tree: &UiTree, carousel: NodeId) -> Option<NodeId> {
    slides(tree, carousel)
        .into_iter()
        .find(|id| tree.get(*id).is_some_and(|n| n.has_class("active")))
}

/// Indices of focusable elements inside a slide, in list order
fn slide_items(elements: &FocusableElements, tree: &UiTree, slide: NodeId) -> Vec<usize> {
    elements
        .iter()
        .filter(|e| tree.contains(slide, e.node))
        .map(|e| e.index)
        .collect()
}

/// Try to move the carousel holding `current` one slide in `direction`
pub fn navigate_carousel_slide(
    surface: &mut dyn Surface,
    elements: &FocusableElements,
    current: usize,
    direction: Direction,
) -> SlideOutcome {
    let step = match direction {
        Direction::Right => SlideStep::Next,
        Direction::Left => SlideStep::Prev,
        Direction::Up | Direction::Down => return SlideOutcome::NotApplicable,
    };
    let Some(carousel) = elements.get(current).and_then(|e| e.carousel) else {
        return SlideOutcome::NotApplicable;
    };

    let tree = surface.tree();
    let all_slides = slides(tree, carousel);
    let Some(active_pos) = all_slides
        .iter()
        .position(|s| tree.get(*s).is_some_and(|n| n.has_class("active")))
    else {
        debug!("CAROUSEL: {} has no active slide", carousel);
        return SlideOutcome::NotApplicable;
    };
    let items = slide_items(elements, tree, all_slides[active_pos]);
    let Some(pos) = items.iter().position(|i| *i == current) else {
        return SlideOutcome::NotApplicable;
    };

    let (at_edge, has_more) = match step {
        SlideStep::Next => (pos + 1 == items.len(), active_pos + 1 < all_slides.len()),
        SlideStep::Prev => (pos == 0, active_pos > 0),
    };
    if !at_edge {
        return SlideOutcome::NotApplicable;
    }
    if !has_more {
        debug!("CAROUSEL: {} already on its {:?} edge slide", carousel, step);
        return SlideOutcome::Absorbed;
    }

    if surface.step_carousel(carousel, step) {
        info!("CAROUSEL: {} stepped {:?} from slide {}", carousel, step, active_pos);
        SlideOutcome::Transitioned(step)
    } else {
        debug!("CAROUSEL: host refused {:?} on {}", step, carousel);
        SlideOutcome::Absorbed
    }
}

/// Element to focus on the carousel's active slide after a transition
///
/// Thumbnails are preferred; any focusable item on the slide is used
/// otherwise.
pub fn landing_target(
    elements: &FocusableElements,
    tree: &UiTree,
    carousel: NodeId,
    landing: SlideLanding,
) -> Option<usize> {
    let slide = active_slide(tree, carousel)?;
    let items = slide_items(elements, tree, slide);
    let thumbnails: Vec<usize> = items
        .iter()
        .copied()
        .filter(|i| elements.get(*i).is_some_and(|e| e.is_thumbnail(tree)))
        .collect();
    let pool = if thumbnails.is_empty() { &items } else { &thumbnails };
    match landing {
        SlideLanding::First => pool.first().copied(),
        SlideLanding::Last => pool.last().copied(),
    }
}
