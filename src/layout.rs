//! UI snapshots stored as TOML
//!
//! A layout file describes a viewport and a nested list of nodes:
//!
//! ```toml
//! viewport = [0, 0, 1920, 1080]
//!
//! [[nodes]]
//! tag = "nav"
//! class = ["navbar"]
//!
//! [[nodes.children]]
//! tag = "a"
//! class = ["nav-link"]
//! attrs = { href = "/" }
//! rect = [40, 20, 120, 40]
//! text = "Home"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{NavError, NavResult};
use crate::geometry::Rect;
use crate::tree::{ElementSpec, NodeId, Tag, UiTree};

#[derive(Debug, Deserialize)]
struct LayoutFile {
    #[serde(default = "default_viewport")]
    viewport: Rect,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeEntry {
    tag: Tag,
    #[serde(default)]
    class: Vec<String>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    rect: Rect,
    #[serde(default)]
    text: String,
    /// `display: none`
    #[serde(default)]
    hidden: bool,
    /// `visibility: hidden`
    #[serde(default)]
    invisible: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    children: Vec<NodeEntry>,
}

impl NodeEntry {
    fn spec(&self) -> ElementSpec {
        let mut spec = ElementSpec::new(self.tag)
            .bounds(self.rect)
            .text(self.text.clone())
            .display_none(self.hidden)
            .visibility_hidden(self.invisible)
            .disabled(self.disabled);
        for class in &self.class {
            spec = spec.class(class.clone());
        }
        for (name, value) in &self.attrs {
            spec = spec.attr(name.clone(), value.clone());
        }
        spec
    }
}

/// Build a tree from layout text
pub fn parse_layout(content: &str) -> NavResult<UiTree> {
    let file: LayoutFile = toml::from_str(content)?;
    let mut tree = UiTree::new(file.viewport);
    let root = tree.root();
    for entry in &file.nodes {
        append_entry(&mut tree, root, entry);
    }
    debug!("LAYOUT: parsed {} nodes", tree.capacity());
    Ok(tree)
}

/// Read and parse a layout file
pub fn load_layout(path: &Path) -> NavResult<UiTree> {
    let content = fs::read_to_string(path).map_err(|source| NavError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout(&content)
}

fn default_viewport() -> Rect {
    Rect::new(0.0, 0.0, 1920.0, 1080.0)
}

fn append_entry(tree: &mut UiTree, parent: NodeId, entry: &NodeEntry) {
    let id = tree.append(parent, entry.spec());
    for child in &entry.children {
        append_entry(tree, id, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::collect_focusable;

    const SAMPLE: &str = r#"
viewport = [0, 0, 1280, 720]

[[nodes]]
tag = "nav"
class = ["navbar"]

[[nodes.children]]
tag = "a"
class = ["nav-link"]
attrs = { href = "/" }
rect = [40, 20, 120, 40]
text = "Home"

[[nodes.children]]
tag = "button"
rect = [200, 20, 120, 40]
text = "Hidden"
hidden = true

[[nodes]]
tag = "section"
class = ["content-section"]

[[nodes.children]]
tag = "div"
class = ["thumbnail-item"]
rect = [40, 200, 300, 200]
"#;

    #[test]
    fn test_parse_layout_builds_tree() {
        let tree = parse_layout(SAMPLE).unwrap();
        assert_eq!(tree.viewport(), Rect::new(0.0, 0.0, 1280.0, 720.0));

        let elements = collect_focusable(&tree);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].label, "Home");
        let link = tree.get(elements[0].node).unwrap();
        assert_eq!(link.attr("href"), Some("/"));
        assert_eq!(link.tag, Tag::A);
    }

    #[test]
    fn test_demo_home_layout() {
        let tree = parse_layout(include_str!("../demos/home.toml")).unwrap();
        let elements = collect_focusable(&tree);
        // navbar 5, profiles 2, first slide 3, content 12
        assert_eq!(elements.len(), 22);
        assert_eq!(elements[0].label, "Home");
        assert!(tree.find_by_dom_id("featured").is_some());
    }

    #[test]
    fn test_default_viewport() {
        let tree = parse_layout("").unwrap();
        assert_eq!(tree.viewport(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let result = parse_layout("[[nodes]]\ntag = \"marquee\"\n");
        assert!(matches!(result, Err(NavError::Layout(_))));
    }

    #[test]
    fn test_load_layout_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_layout(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(NavError::Read { .. })));
    }

    #[test]
    fn test_load_layout_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let tree = load_layout(&path).unwrap();
        assert_eq!(collect_focusable(&tree).len(), 2);
    }
}
