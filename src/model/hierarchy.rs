use log::{debug, error};
use serde_json::Value;

use crate::common::connection_common::json_to_string;
use crate::error::{WebDriverError, WebDriverResult};
use crate::model::criterion::{match_text, TextMatchingCriterion, PATH_SEPARATOR};
use crate::model::element::Element;

pub const PROPERTY_CHILDREN: &str = "children";
pub const PROPERTY_SUBMENUID: &str = "submenuid";

/// Index of a node inside an [`ElementHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A tree node or menu item together with its place in the hierarchy.
#[derive(Debug, Clone)]
pub struct HierarchicalElement {
    pub element: Element,
    pub submenu_id: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HierarchicalElement {
    fn new(element: Element) -> Self {
        HierarchicalElement {
            element,
            submenu_id: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn label(&self) -> &str {
        self.element.label()
    }
}

/// The content of a tree or menu.
///
/// Nodes live in one arena and refer to each other by [`NodeId`]. The
/// top-level nodes are usually the children of a container node (the tree or
/// menu itself), which has no label and therefore never shows up in paths.
#[derive(Debug, Clone, Default)]
pub struct ElementHierarchy {
    nodes: Vec<HierarchicalElement>,
    top: Vec<NodeId>,
}

impl ElementHierarchy {
    pub fn new() -> Self {
        ElementHierarchy::default()
    }

    /// Build from a nested script result: `value` is the container, its
    /// `children` become the top level.
    pub fn from_json(value: &Value) -> Self {
        let mut hierarchy = ElementHierarchy::new();
        let root = hierarchy.add_json(value, None);
        hierarchy.top = hierarchy.nodes[root.0].children.clone();
        hierarchy
    }

    fn add_json(&mut self, value: &Value, parent: Option<NodeId>) -> NodeId {
        let mut node = HierarchicalElement::new(Element::from_json(value));
        node.submenu_id = json_to_string(&value[PROPERTY_SUBMENUID]).filter(|s| !s.is_empty());
        node.parent = parent;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }

        match &value[PROPERTY_CHILDREN] {
            Value::Array(children) => {
                for child in children {
                    self.add_json(child, Some(id));
                }
            }
            Value::Null => {}
            other => error!("unexpected children for {}: {}", self.nodes[id.0].element, other),
        }
        id
    }

    /// Add a node. Without a parent it is appended to the top level.
    pub fn add_node(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = HierarchicalElement::new(element);
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.top.push(id),
        }
        id
    }

    /// Move `child` from the top level under `parent`.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) {
        self.top.retain(|n| *n != child);
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|n| *n != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Replace the top level with the children of the current first top-level
    /// node, for widgets whose root item is never shown.
    pub fn descend_into_first(&mut self) {
        if let Some(first) = self.top.first().copied() {
            self.top = self.nodes[first.0].children.clone();
        }
    }

    pub fn reverse_children(&mut self, id: NodeId) {
        self.nodes[id.0].children.reverse();
    }

    pub fn reverse_top(&mut self) {
        self.top.reverse();
    }

    pub fn top(&self) -> &[NodeId] {
        &self.top
    }

    pub fn node(&self, id: NodeId) -> &HierarchicalElement {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut HierarchicalElement {
        &mut self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0].element
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Id of the outermost ancestor, typically the tree or menu itself.
    pub fn root_id(&self, id: NodeId) -> Option<&str> {
        self.ancestors(id).last().and_then(|r| self.element(*r).id.as_deref())
    }

    /// Labels from the top level down to `id`, joined with `->`.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut labels: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.element(a).label.as_deref())
            .filter(|l| !l.is_empty())
            .collect();
        labels.reverse();
        labels.push(self.element(id).label());
        labels.join(PATH_SEPARATOR)
    }

    /// Every node reachable from the top level, depth first.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.top.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// The first node, depth first, that `element` matches.
    pub fn find(&self, element: &Element) -> Option<NodeId> {
        self.depth_first().into_iter().find(|id| element.matches(self.element(*id)))
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// Find the node described by `criterion`.
    ///
    /// With per-level indices the n-th match is taken at each level. Otherwise
    /// matches of the full path are counted over the whole hierarchy and the
    /// one at the expected index is returned.
    pub fn matched_node(&self, criterion: &TextMatchingCriterion) -> WebDriverResult<NodeId> {
        let path = criterion.path();
        let found = match criterion.expected_indices() {
            Some(indices) => self.match_by_indices(&self.top, path, criterion.is_partial(), indices),
            None => {
                let mut counter = 0;
                let found = self.match_by_count(
                    &self.top,
                    path,
                    criterion.is_partial(),
                    &mut counter,
                    criterion.expected_index(),
                );
                debug!("found {} matches of {}", counter, criterion);
                found
            }
        };

        found.ok_or_else(|| {
            error!("Fail to find element {}", criterion);
            WebDriverError::general(format!(
                "Fail to find element '{}'.",
                criterion.text().unwrap_or_default()
            ))
        })
    }

    fn match_by_count(
        &self,
        nodes: &[NodeId],
        path: &[String],
        partial: bool,
        counter: &mut i64,
        expected: i64,
    ) -> Option<NodeId> {
        let (label, rest) = path.split_first()?;
        for id in nodes {
            if !match_text(self.element(*id).label(), label, partial) {
                continue;
            }
            if rest.is_empty() {
                let n = *counter;
                *counter += 1;
                if n == expected {
                    return Some(*id);
                }
            } else if let Some(found) =
                self.match_by_count(self.children(*id), rest, partial, counter, expected)
            {
                return Some(found);
            }
        }
        None
    }

    fn match_by_indices(
        &self,
        nodes: &[NodeId],
        path: &[String],
        partial: bool,
        indices: &[i64],
    ) -> Option<NodeId> {
        if path.is_empty() || indices.len() != path.len() {
            error!(
                "path '{}' and index path of length {} do not fit",
                path.join(PATH_SEPARATOR),
                indices.len()
            );
            return None;
        }

        let mut matched = 0;
        for id in nodes {
            if !match_text(self.element(*id).label(), &path[0], partial) {
                continue;
            }
            if matched == indices[0] {
                if path.len() == 1 {
                    return Some(*id);
                }
                return self.match_by_indices(self.children(*id), &path[1..], partial, &indices[1..]);
            }
            matched += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ElementHierarchy {
        ElementHierarchy::from_json(&json!({
            "id": "tree1",
            "children": [
                {"id": "n1", "label": "Fruit", "children": [
                    {"id": "n1a", "label": "Apple"},
                    {"id": "n1b", "label": "Pear"},
                ]},
                {"id": "n2", "label": "Fruit", "children": [
                    {"id": "n2a", "label": "Apple"},
                    {"id": "n2b", "label": "Apple pie", "submenuid": "sub9"},
                ]},
            ]
        }))
    }

    #[test]
    fn test_structure() {
        let h = sample();
        assert_eq!(h.top().len(), 2);
        let order: Vec<&str> = h.depth_first().iter().map(|n| h.element(*n).id()).collect();
        assert_eq!(order, vec!["n1", "n1a", "n1b", "n2", "n2a", "n2b"]);

        let pie = h.depth_first()[5];
        assert_eq!(h.full_path(pie), "Fruit->Apple pie");
        assert_eq!(h.root_id(pie), Some("tree1"));
        assert_eq!(h.node(pie).submenu_id.as_deref(), Some("sub9"));
    }

    #[test]
    fn test_match_by_count() {
        let h = sample();
        let c = TextMatchingCriterion::new("Fruit->Apple", false, 1);
        let found = h.matched_node(&c).unwrap();
        assert_eq!(h.element(found).id(), "n2a");

        let c = TextMatchingCriterion::new("Fruit->Apple", true, 2);
        let found = h.matched_node(&c).unwrap();
        assert_eq!(h.element(found).id(), "n2b");

        let c = TextMatchingCriterion::new("Fruit->Apple", false, 2);
        let err = h.matched_node(&c).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Fail to find element 'Fruit->Apple'.");
    }

    #[test]
    fn test_match_by_indices() {
        let h = sample();
        let c = TextMatchingCriterion::from_path("Fruit->Apple", false, Some("2->1"));
        let found = h.matched_node(&c).unwrap();
        assert_eq!(h.element(found).id(), "n2a");

        let c = TextMatchingCriterion::from_path("Fruit->Pear", false, Some("2->1"));
        assert!(h.matched_node(&c).is_err());

        let c = TextMatchingCriterion::from_path("Fruit->Apple", false, Some("1"));
        assert!(h.matched_node(&c).is_err());
    }

    #[test]
    fn test_attach_and_reverse() {
        let mut h = ElementHierarchy::new();
        let a = h.add_node(Element::from_json(&json!({"label": "a"})), None);
        let b = h.add_node(Element::from_json(&json!({"label": "b"})), None);
        let c = h.add_node(Element::from_json(&json!({"label": "c"})), None);
        h.attach(c, a);
        h.attach(b, a);
        h.reverse_children(a);
        assert_eq!(h.top(), &[a][..]);
        assert_eq!(h.children(a), &[b, c][..]);
        assert_eq!(h.full_path(c), "a->c");
        assert_eq!(h.root_id(c), None);
    }

    #[test]
    fn test_descend_into_first() {
        let mut h = ElementHierarchy::from_json(&json!({
            "id": "menu",
            "children": [{"label": "Home", "children": [{"label": "One"}, {"label": "Two"}]}]
        }));
        h.descend_into_first();
        let labels: Vec<&str> = h.top().iter().map(|n| h.element(*n).label()).collect();
        assert_eq!(labels, vec!["One", "Two"]);
    }
}
