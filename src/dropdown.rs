//! Dropdown menus under remote control
//!
//! Menus are opened and closed through [`Surface::set_menu_open`], which
//! keeps the [`OPEN_MARKER`] class on the menu node in step.

use tracing::{debug, info};

use crate::elements::FocusableElements;
use crate::surface::Surface;
use crate::tree::{NodeId, UiNode, UiTree};

/// Class carried by a menu while the remote has it open
pub const OPEN_MARKER: &str = "tv-dropdown-open";

/// True for nodes that open a dropdown menu
pub fn is_dropdown_trigger(node: &UiNode) -> bool {
    node.attr("data-bs-toggle") == Some("dropdown")
        || node.attr("data-toggle") == Some("dropdown")
        || matches!(node.attr("aria-haspopup"), Some("true") | Some("menu"))
        || node.has_class("dropdown-toggle")
}

/// The menu controlled by `trigger`
///
/// `aria-controls` wins; otherwise the `dropdown-menu` inside the nearest
/// `dropdown` container, or inside the trigger's parent.
pub fn menu_for(tree: &UiTree, trigger: NodeId) -> Option<NodeId> {
    let node = tree.get(trigger)?;
    if let Some(target) = node.attr("aria-controls").and_then(|id| tree.find_by_dom_id(id)) {
        return Some(target);
    }
    let container = tree
        .ancestors(trigger)
        .find(|id| tree.get(*id).is_some_and(|n| n.has_class("dropdown")))
        .or(node.parent)?;
    tree.descendants(container)
        .into_iter()
        .find(|id| tree.get(*id).is_some_and(|n| n.has_class("dropdown-menu")))
}

/// The trigger that opens `menu`, if one can be found
pub fn trigger_for(tree: &UiTree, menu: NodeId) -> Option<NodeId> {
    let dom_id = tree.get(menu).and_then(|n| n.attr("id"));
    if let Some(dom_id) = dom_id {
        let by_aria = tree
            .document_order()
            .into_iter()
            .find(|id| tree.get(*id).and_then(|n| n.attr("aria-controls")) == Some(dom_id));
        if by_aria.is_some() {
            return by_aria;
        }
    }
    let container = tree
        .ancestors(menu)
        .find(|id| tree.get(*id).is_some_and(|n| n.has_class("dropdown")))
        .or(tree.get(menu)?.parent)?;
    tree.descendants(container).into_iter().find(|id| {
        !tree.contains(menu, *id) && tree.get(*id).is_some_and(is_dropdown_trigger)
    })
}

/// The menu enclosing `node`, if any
pub fn enclosing_menu(tree: &UiTree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node)
        .find(|id| tree.get(*id).is_some_and(|n| n.has_class("dropdown-menu")))
}

pub fn is_open(tree: &UiTree, menu: NodeId) -> bool {
    tree.get(menu).is_some_and(|n| n.has_class(OPEN_MARKER))
}

/// Every menu currently carrying the open marker
pub fn open_menus(tree: &UiTree) -> Vec<NodeId> {
    tree.document_order()
        .into_iter()
        .filter(|id| is_open(tree, *id))
        .collect()
}

/// Open a closed menu (closing any other) or close an open one
///
/// Returns the new open state, or `None` when the trigger has no menu.
pub fn toggle(
    surface: &mut dyn Surface,
    elements: &mut FocusableElements,
    trigger: NodeId,
) -> Option<bool> {
    let Some(menu) = menu_for(surface.tree(), trigger) else {
        debug!("DROPDOWN: no menu found for trigger {}", trigger);
        return None;
    };

    if is_open(surface.tree(), menu) {
        close(surface, elements, menu);
        return Some(false);
    }

    for other in open_menus(surface.tree()) {
        if other != menu {
            close(surface, elements, other);
        }
    }
    surface.set_menu_open(menu, true);
    info!("DROPDOWN: opened menu {} from trigger {}", menu, trigger);
    Some(true)
}

/// Close a menu and drop its items from the focusable list
///
/// Returns how many list entries were pruned.
pub fn close(surface: &mut dyn Surface, elements: &mut FocusableElements, menu: NodeId) -> usize {
    let tree = surface.tree();
    let items: Vec<NodeId> = elements
        .iter()
        .filter(|e| tree.contains(menu, e.node))
        .map(|e| e.node)
        .collect();
    surface.set_menu_open(menu, false);
    let removed = elements.remove_nodes(&items);
    info!("DROPDOWN: closed menu {} ({} items pruned)", menu, removed);
    removed
}

/// Close every open menu. Returns the menus that were closed.
pub fn close_all(surface: &mut dyn Surface, elements: &mut FocusableElements) -> Vec<NodeId> {
    let menus = open_menus(surface.tree());
    for menu in &menus {
        close(surface, elements, *menu);
    }
    menus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MemorySurface, SurfaceOp};
    use crate::testing::*;
    use crate::tree::{ElementSpec, Tag};

    fn arena(surface: &MemorySurface) -> FocusableElements {
        let mut elements = FocusableElements::new();
        elements.update_focusable_elements(surface.tree());
        elements
    }

    #[test]
    fn test_trigger_detection() {
        let page = home_page();
        let tree = page.surface.tree();
        assert!(is_dropdown_trigger(tree.get(page.profile_toggle).unwrap()));
        assert!(!is_dropdown_trigger(tree.get(page.nav_links[0]).unwrap()));

        let popup = ElementSpec::new(Tag::Button).attr("aria-haspopup", "menu");
        let mut tree = blank_tree();
        let id = tree.append(tree.root(), popup);
        assert!(is_dropdown_trigger(tree.get(id).unwrap()));
    }

    #[test]
    fn test_menu_lookup_through_container() {
        let page = home_page();
        let tree = page.surface.tree();
        assert_eq!(menu_for(tree, page.profile_toggle), Some(page.profile_menu));
        assert_eq!(trigger_for(tree, page.profile_menu), Some(page.profile_toggle));
        assert_eq!(enclosing_menu(tree, page.menu_items[1]), Some(page.profile_menu));
        assert_eq!(enclosing_menu(tree, page.profile_toggle), None);
    }

    #[test]
    fn test_menu_lookup_through_aria_controls() {
        let mut tree = blank_tree();
        let root = tree.root();
        let trigger = tree.append(
            root,
            ElementSpec::new(Tag::Button)
                .attr("aria-haspopup", "true")
                .attr("aria-controls", "user-menu"),
        );
        let menu = tree.append(
            root,
            ElementSpec::new(Tag::Ul).class("dropdown-menu").attr("id", "user-menu"),
        );
        assert_eq!(menu_for(&tree, trigger), Some(menu));
        assert_eq!(trigger_for(&tree, menu), Some(trigger));
    }

    #[test]
    fn test_toggle_opens_then_closes() {
        let mut page = home_page();
        let mut elements = arena(&page.surface);

        assert_eq!(toggle(&mut page.surface, &mut elements, page.profile_toggle), Some(true));
        assert!(is_open(page.surface.tree(), page.profile_menu));
        assert_eq!(open_menus(page.surface.tree()), vec![page.profile_menu]);

        assert_eq!(toggle(&mut page.surface, &mut elements, page.profile_toggle), Some(false));
        assert!(!is_open(page.surface.tree(), page.profile_menu));
        assert!(open_menus(page.surface.tree()).is_empty());
    }

    #[test]
    fn test_close_prunes_menu_items() {
        let mut page = home_page();
        let mut elements = arena(&page.surface);
        toggle(&mut page.surface, &mut elements, page.profile_toggle);

        // Opening relies on the next rebuild to pick the items up
        elements.update_focusable_elements(page.surface.tree());
        let total = elements.len();
        assert!(elements.index_of(page.menu_items[0]).is_some());

        let removed = close(&mut page.surface, &mut elements, page.profile_menu);
        assert_eq!(removed, 2);
        assert_eq!(elements.len(), total - 2);
        assert!(elements.index_of(page.menu_items[0]).is_none());
        assert!(elements.iter().enumerate().all(|(i, e)| e.index == i));
    }

    #[test]
    fn test_toggle_closes_other_menus() {
        let mut page = home_page();
        let navbar = page.navbar;
        let (second_trigger, second_menu) = {
            let tree = page.surface.tree_mut();
            let dropdown = tree.append(navbar, ElementSpec::new(Tag::Div).class("dropdown"));
            let trigger = tree.append(
                dropdown,
                ElementSpec::new(Tag::Button)
                    .class("dropdown-toggle")
                    .rect(1300.0, 20.0, 120.0, 40.0),
            );
            let menu = tree.append(
                dropdown,
                ElementSpec::new(Tag::Ul).class("dropdown-menu").display_none(true),
            );
            (trigger, menu)
        };
        let mut elements = arena(&page.surface);

        toggle(&mut page.surface, &mut elements, page.profile_toggle);
        toggle(&mut page.surface, &mut elements, second_trigger);
        assert_eq!(open_menus(page.surface.tree()), vec![second_menu]);
    }

    #[test]
    fn test_close_all() {
        let mut page = home_page();
        let mut elements = arena(&page.surface);
        assert!(close_all(&mut page.surface, &mut elements).is_empty());

        toggle(&mut page.surface, &mut elements, page.profile_toggle);
        page.surface.clear_ops();
        assert_eq!(close_all(&mut page.surface, &mut elements), vec![page.profile_menu]);
        assert_eq!(page.surface.ops(), &[SurfaceOp::MenuClosed(page.profile_menu)]);
    }

    #[test]
    fn test_toggle_without_menu() {
        let mut tree = blank_tree();
        let trigger = tree.append(tree.root(), ElementSpec::new(Tag::Button).class("dropdown-toggle"));
        let mut surface = MemorySurface::new(tree);
        let mut elements = arena(&surface);
        assert_eq!(toggle(&mut surface, &mut elements, trigger), None);
    }
}
