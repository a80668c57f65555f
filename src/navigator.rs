//! Directional focus search
//!
//! Given the focused element and a direction, score every other element and
//! pick the closest eligible one. Scores are distances biased by section
//! transitions; the bias constants were tuned by feel on real TVs and are
//! exposed as [`NavigationWeights`].

use serde::Deserialize;
use tracing::trace;

use crate::elements::{FocusableElement, FocusableElements, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Thresholds and multipliers used by the search
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NavigationWeights {
    /// Minimum vertical center offset for up/down candidates
    pub vertical_threshold: f64,
    /// Minimum horizontal center offset for left/right candidates
    pub horizontal_threshold: f64,
    /// Maximum vertical center offset for left/right inside carousels and rows
    pub row_tolerance: f64,
    /// Weight of horizontal distance in up/down scores
    pub vertical_cross_axis: f64,
    /// Weight of vertical distance in left/right scores
    pub horizontal_cross_axis: f64,
    pub leave_navbar_down: f64,
    pub leave_carousel_down: f64,
    pub same_carousel_down: f64,
    pub enter_navbar_up: f64,
    pub low_value_up: f64,
}

impl Default for NavigationWeights {
    fn default() -> Self {
        NavigationWeights {
            vertical_threshold: 30.0,
            horizontal_threshold: 10.0,
            row_tolerance: 50.0,
            vertical_cross_axis: 0.2,
            horizontal_cross_axis: 0.1,
            leave_navbar_down: 0.3,
            leave_carousel_down: 0.7,
            same_carousel_down: 2.0,
            enter_navbar_up: 3.0,
            low_value_up: 5.0,
        }
    }
}

/// Index of the best candidate from `current` in `direction`
///
/// Ties keep the first candidate in list order. The search is not symmetric:
/// going right and then left may land somewhere other than the start.
pub fn find_next_in_direction(
    elements: &FocusableElements,
    current: usize,
    direction: Direction,
    weights: &NavigationWeights,
) -> Option<usize> {
    let origin = elements.get(current)?;

    let mut best: Option<(usize, f64)> = None;
    for candidate in elements.iter() {
        if candidate.index == origin.index {
            continue;
        }
        let score = if direction.is_vertical() {
            vertical_score(origin, candidate, direction, weights)
        } else {
            horizontal_score(origin, candidate, direction, weights)
        };
        let Some(score) = score else {
            continue;
        };
        trace!(
            "NAV: {} candidate {} ({}) score {:.1}",
            direction.label(),
            candidate.index,
            candidate.label,
            score
        );
        let better = match best {
            Some((_, best_score)) => score < best_score,
            None => true,
        };
        if better {
            best = Some((candidate.index, score));
        }
    }
    best.map(|(index, _)| index)
}

fn vertical_score(
    origin: &FocusableElement,
    candidate: &FocusableElement,
    direction: Direction,
    weights: &NavigationWeights,
) -> Option<f64> {
    let from = origin.rect.center();
    let to = candidate.rect.center();
    let dy = to.y - from.y;
    let beyond = match direction {
        Direction::Down => dy > weights.vertical_threshold,
        _ => dy < -weights.vertical_threshold,
    };
    if !beyond {
        return None;
    }

    let mut score = dy.abs() + weights.vertical_cross_axis * (to.x - from.x).abs();
    let same_carousel = origin.carousel.is_some() && origin.carousel == candidate.carousel;

    match direction {
        Direction::Down => {
            if origin.section == Section::Navbar && candidate.section != Section::Navbar {
                score *= weights.leave_navbar_down;
            }
            if same_carousel {
                score *= weights.same_carousel_down;
            } else if origin.carousel.is_some() {
                score *= weights.leave_carousel_down;
            }
        }
        _ => {
            let from_body = !matches!(origin.section, Section::Navbar | Section::Profile);
            if from_body && candidate.section == Section::Navbar {
                score *= weights.enter_navbar_up;
            }
            if candidate.low_value {
                score *= weights.low_value_up;
            }
        }
    }
    Some(score)
}

fn horizontal_score(
    origin: &FocusableElement,
    candidate: &FocusableElement,
    direction: Direction,
    weights: &NavigationWeights,
) -> Option<f64> {
    let from = origin.rect.center();
    let to = candidate.rect.center();
    let dx = to.x - from.x;
    let dy = (to.y - from.y).abs();

    if origin.section == Section::Navbar && candidate.section != Section::Navbar {
        return None;
    }
    if origin.carousel.is_some() {
        if candidate.carousel != origin.carousel || dy > weights.row_tolerance {
            return None;
        }
    } else if origin.section.is_row_locked()
        && (candidate.section != origin.section || dy > weights.row_tolerance)
    {
        return None;
    }

    let beyond = match direction {
        Direction::Right => dx > weights.horizontal_threshold,
        _ => dx < -weights.horizontal_threshold,
    };
    if !beyond {
        return None;
    }
    Some(dx.abs() + weights.horizontal_cross_axis * dy)
}
