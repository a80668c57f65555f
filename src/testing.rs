//! Shared fixtures for navigation tests.
//!
//! # Usage
//!
//! ```rust
//! #[cfg(test)]
//! mod tests {
//!     use crate::testing::*;
//!
//!     #[test]
//!     fn test_example() {
//!         let page = home_page();
//!         // Drive page.surface through the controller...
//!     }
//! }
//! ```

use crate::geometry::Rect;
use crate::surface::MemorySurface;
use crate::tree::{ElementSpec, NodeId, Tag, UiTree};

/// Full-HD viewport used by every fixture
pub const VIEWPORT: Rect = Rect {
    left: 0.0,
    top: 0.0,
    width: 1920.0,
    height: 1080.0,
};

/// Empty page
pub fn blank_tree() -> UiTree {
    UiTree::new(VIEWPORT)
}

/// A streaming home page and handles to its interesting nodes
///
/// Layout, top to bottom:
/// - navbar: Home, Categories, Search links, a Profile dropdown and a TV Mode toggle
/// - profile section: two profile cards
/// - carousel: two slides of three thumbnails each, second slide hidden
/// - content section: one row of three thumbnails
pub struct HomePage {
    pub surface: MemorySurface,
    pub navbar: NodeId,
    pub nav_links: Vec<NodeId>,
    pub profile_toggle: NodeId,
    pub profile_menu: NodeId,
    pub menu_items: Vec<NodeId>,
    pub tv_toggle: NodeId,
    pub profile_cards: Vec<NodeId>,
    pub carousel: NodeId,
    pub slides: Vec<Vec<NodeId>>,
    pub carousel_controls: Vec<NodeId>,
    pub content_cards: Vec<NodeId>,
}

pub fn home_page() -> HomePage {
    let mut tree = blank_tree();
    let root = tree.root();

    let navbar = tree.append(root, ElementSpec::new(Tag::Nav).class("navbar"));
    let nav_links = [("Home", "/"), ("Categories", "/categories"), ("Search", "/search")]
        .iter()
        .enumerate()
        .map(|(i, (text, href))| {
            tree.append(
                navbar,
                ElementSpec::new(Tag::A)
                    .class("nav-link")
                    .attr("href", *href)
                    .text(*text)
                    .rect(40.0 + 160.0 * i as f64, 20.0, 120.0, 40.0),
            )
        })
        .collect();

    let dropdown = tree.append(navbar, ElementSpec::new(Tag::Div).class("dropdown"));
    let profile_toggle = tree.append(
        dropdown,
        ElementSpec::new(Tag::A)
            .class("dropdown-toggle")
            .attr("data-bs-toggle", "dropdown")
            .attr("href", "#")
            .text("Profile")
            .rect(1500.0, 20.0, 120.0, 40.0),
    );
    let profile_menu = tree.append(
        dropdown,
        ElementSpec::new(Tag::Ul)
            .class("dropdown-menu")
            .rect(1500.0, 70.0, 200.0, 80.0)
            .display_none(true),
    );
    let menu_items = [("Switch profile", "/profiles"), ("Sign out", "/logout")]
        .iter()
        .enumerate()
        .map(|(i, (text, href))| {
            tree.append(
                profile_menu,
                ElementSpec::new(Tag::A)
                    .class("dropdown-item")
                    .attr("href", *href)
                    .text(*text)
                    .rect(1500.0, 70.0 + 40.0 * i as f64, 200.0, 40.0),
            )
        })
        .collect();

    let tv_toggle = tree.append(
        navbar,
        ElementSpec::new(Tag::Button)
            .class("tv-mode-toggle")
            .text("TV Mode")
            .rect(1700.0, 20.0, 150.0, 40.0),
    );

    let profiles = tree.append(root, ElementSpec::new(Tag::Section).class("profile-section"));
    let profile_cards = (0..2)
        .map(|i| {
            tree.append(
                profiles,
                ElementSpec::new(Tag::Div)
                    .class("profile-card")
                    .text(format!("Profile {}", i + 1))
                    .rect(100.0 + 200.0 * i as f64, 120.0, 150.0, 60.0),
            )
        })
        .collect();

    let carousel = tree.append(
        root,
        ElementSpec::new(Tag::Div)
            .class("carousel")
            .attr("id", "featured")
            .rect(0.0, 280.0, 1920.0, 240.0),
    );
    let inner = tree.append(carousel, ElementSpec::new(Tag::Div).class("carousel-inner"));
    let slides = (0..2)
        .map(|s| {
            let mut spec = ElementSpec::new(Tag::Div)
                .class("carousel-item")
                .rect(0.0, 280.0, 1920.0, 240.0);
            spec = if s == 0 {
                spec.class("active")
            } else {
                spec.display_none(true)
            };
            let slide = tree.append(inner, spec);
            (0..3)
                .map(|i| thumbnail(&mut tree, slide, 100.0 + 400.0 * i as f64, 300.0, s * 3 + i + 1))
                .collect()
        })
        .collect();
    let carousel_controls = vec![
        tree.append(
            carousel,
            ElementSpec::new(Tag::Button)
                .class("carousel-control-prev")
                .attr("data-bs-slide", "prev")
                .rect(0.0, 350.0, 60.0, 100.0),
        ),
        tree.append(
            carousel,
            ElementSpec::new(Tag::Button)
                .class("carousel-control-next")
                .attr("data-bs-slide", "next")
                .rect(1860.0, 350.0, 60.0, 100.0),
        ),
    ];

    let content = tree.append(root, ElementSpec::new(Tag::Section).class("content-section"));
    let content_cards = (0..3)
        .map(|i| thumbnail(&mut tree, content, 100.0 + 400.0 * i as f64, 620.0, 100 + i))
        .collect();

    HomePage {
        surface: MemorySurface::new(tree),
        navbar,
        nav_links,
        profile_toggle,
        profile_menu,
        menu_items,
        tv_toggle,
        profile_cards,
        carousel,
        slides,
        carousel_controls,
        content_cards,
    }
}

/// A thumbnail card wrapping a link to a video
fn thumbnail(tree: &mut UiTree, parent: NodeId, left: f64, top: f64, video: usize) -> NodeId {
    let card = tree.append(
        parent,
        ElementSpec::new(Tag::Div)
            .class("thumbnail-item")
            .rect(left, top, 300.0, 200.0),
    );
    tree.append(
        card,
        ElementSpec::new(Tag::A)
            .attr("href", format!("/video/{}", video))
            .text(format!("Video {}", video))
            .rect(left, top, 300.0, 200.0),
    );
    card
}

/// Stacked buttons at the given tops, each 50px tall
pub fn stacked_buttons(tops: &[f64]) -> (UiTree, Vec<NodeId>) {
    let mut tree = blank_tree();
    let root = tree.root();
    let nodes = tops
        .iter()
        .map(|top| tree.append(root, ElementSpec::new(Tag::Button).rect(100.0, *top, 100.0, 50.0)))
        .collect();
    (tree, nodes)
}
