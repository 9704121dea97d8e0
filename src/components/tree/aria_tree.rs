use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};

use crate::common::command::By;
use crate::component::Component;
use crate::components::selectable::{verify_selected_flag, ContentCache, HierarchicalSelectable};
use crate::components::tree::{click_node_element, parse_tree_node_text, tree_node, TreeSelectable};
use crate::components::ClickOptions;
use crate::error::{WebDriverError, WebDriverResult};
use crate::model::aria::{ATTRIBUTE_ARIA_EXPANDED, ATTRIBUTE_WAI_ROLE, ROLE_TREEITEM};
use crate::model::{ElementHierarchy, NodeId, TextMatchingCriterion};
use crate::query::ElementWaitable;
use crate::rs::xpath;
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

/// Pause after a double-click that toggles a node.
const TOGGLE_PAUSE: Duration = Duration::from_millis(500);
const TOGGLE_POLL: Duration = Duration::from_millis(100);

/// Give a toggled node a moment to report its new state. Nodes that never
/// report `aria-expanded` just cost the pause.
fn wait_toggled(element: &WebElement<'_>, expanded: bool) {
    let state = if expanded { "true" } else { "false" };
    if let Err(e) = element
        .wait_until()
        .wait(TOGGLE_PAUSE, TOGGLE_POLL)
        .has_attribute(ATTRIBUTE_ARIA_EXPANDED, state)
    {
        debug!("{} did not report {}={}: {}", element, ATTRIBUTE_ARIA_EXPANDED, state, e);
    }
}

/// The node's element, to be re-read from the page.
fn node_element<'a>(component: &Component<'a>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<WebElement<'a>> {
    tree.element(node).web_element(component.session())
}

fn treeitem_xpath() -> String {
    xpath::from_attribute(xpath::TAG_ANY, ATTRIBUTE_WAI_ROLE, ROLE_TREEITEM, false, true)
}

/// Rebuild the hierarchy from the flat, document-ordered list of treeitems.
///
/// The parent of a node is the nearest preceding treeitem that has the node
/// among its own treeitem descendants.
fn build_hierarchy(root: &WebElement<'_>) -> WebDriverResult<ElementHierarchy> {
    let criteria = treeitem_xpath();
    let items = root.find_elements(By::XPath(&criteria))?;
    let mut tree = ElementHierarchy::new();
    let ids: Vec<NodeId> = items.iter().map(|we| tree.add_node(tree_node(we), None)).collect();

    for i in (0..items.len()).rev() {
        for j in (0..i).rev() {
            let descendants = items[j].find_elements(By::XPath(&criteria))?;
            if descendants.iter().any(|d| d.element_id == items[i].element_id) {
                debug!("'{}' is direct parent of '{}'", tree.element(ids[j]).label(), tree.element(ids[i]).label());
                tree.attach(ids[i], ids[j]);
                break;
            }
        }
        // Children were attached last first.
        tree.reverse_children(ids[i]);
    }
    Ok(tree)
}

/// A tree following the WAI-ARIA tree pattern (`role="treeitem"` nodes).
#[derive(Debug, Default)]
pub struct AriaTree {
    cache: ContentCache<ElementHierarchy>,
}

impl AriaTree {
    pub fn new() -> Self {
        AriaTree::default()
    }

    /// Walk the path one level at a time, in the DOM rather than in the
    /// cached content. The result is a chain from the top level to the node.
    fn walk_path(&self, component: &Component<'_>, criterion: &TextMatchingCriterion) -> Option<ElementHierarchy> {
        let root = component.element();
        let accessible = component.is_accessible();
        let criteria = treeitem_xpath();
        let mut chain = ElementHierarchy::new();
        let mut parent_element = root.clone();
        let mut parent_node = None;

        for (level, text) in criterion.path().iter().enumerate() {
            let found = if accessible {
                parent_element.find_elements(By::XPath(&criteria)).ok().and_then(|children| {
                    children.into_iter().find(|child| {
                        parse_tree_node_text(child).map_or(false, |t| criterion.match_text_at_level(&t, level))
                    })
                })
            } else {
                let query = xpath::from_text(xpath::TAG_ANY, text, criterion.is_partial(), true);
                root.find_elements(By::XPath(&query)).ok().and_then(|found| found.into_iter().next())
            };
            match found {
                Some(element) => {
                    parent_node = Some(chain.add_node(tree_node(&element), parent_node));
                    parent_element = element;
                }
                None => {
                    error!("node '{}' not found.", text);
                    return None;
                }
            }
        }
        parent_node.map(|_| chain)
    }

    fn leaf(chain: &ElementHierarchy) -> Option<NodeId> {
        let mut node = *chain.top().first()?;
        while let Some(child) = chain.children(node).first() {
            node = *child;
        }
        Some(node)
    }

    /// Double-click every collapsed node of `path`, top level first.
    fn expand_path(&self, component: &Component<'_>, tree: &ElementHierarchy, path: &[NodeId]) -> WebDriverResult<()> {
        for id in path {
            let element = node_element(component, tree, *id)?;
            if !tree_node(&element).expanded {
                element.double_click()?;
                wait_toggled(&element, true);
            }
        }
        Ok(())
    }

    /// Make a node reachable by expanding its ancestors.
    fn show_node(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        let mut path = tree.ancestors(node);
        path.reverse();
        self.expand_path(component, tree, &path).map_err(|e| {
            error!("Met {}", e);
            WebDriverError::general(format!("Fail to show node '{}'. due to '{}'", tree.element(node).label(), e))
        })
    }
}

impl HierarchicalSelectable for AriaTree {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<ElementHierarchy> {
        if !component.is_accessible() {
            return Err(WebDriverError::general("Cannot get content from a tree, which is not Web Accessible!"));
        }
        let root = component.element();
        component.session().without_implicit_wait(|| build_hierarchy(&root)).map_err(|e| {
            error!("Fail to get content from a tree. {}", e);
            WebDriverError::general(format!("Fail to get content from a tree. Met {}", e))
        })
    }

    fn cache(&self) -> &ContentCache<ElementHierarchy> {
        &self.cache
    }

    /// The cached content is searched first; a node hidden from it (for
    /// example under a collapsed parent) is then looked up level by level.
    fn matched_node(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
    ) -> WebDriverResult<(Arc<ElementHierarchy>, NodeId)> {
        match self.content(component).and_then(|tree| tree.matched_node(criterion).map(|n| (tree, n))) {
            Ok(found) => return Ok(found),
            Err(e) => debug!("Fail to find tree node {}", e),
        }

        self.walk_path(component, criterion)
            .and_then(|chain| Self::leaf(&chain).map(|leaf| (Arc::new(chain), leaf)))
            .ok_or_else(|| {
                error!("Fail to find tree node matching '{}'", criterion);
                WebDriverError::general(format!("Fail to find tree node '{}'.", criterion.text().unwrap_or_default()))
            })
    }

    fn click_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        options: &ClickOptions,
        clicks: u32,
    ) -> WebDriverResult<()> {
        self.show_node(component, tree, node)?;
        click_node_element(component, tree.element(node), options, clicks)
    }

    fn verify_node_selected(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        let element = node_element(component, tree, node)?;
        verify_selected_flag(&tree_node(&element))
    }
}

impl TreeSelectable for AriaTree {
    fn expand_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        _expand_children: bool,
    ) -> WebDriverResult<()> {
        let mut path = tree.ancestors(node);
        path.reverse();
        path.push(node);
        self.expand_path(component, tree, &path)
    }

    fn collapse_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        _collapse_children: bool,
    ) -> WebDriverResult<()> {
        let element = node_element(component, tree, node)?;
        if tree_node(&element).expanded {
            element.double_click()?;
            wait_toggled(&element, false);
        }
        Ok(())
    }

    fn is_node_expanded(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<bool> {
        let element = node_element(component, tree, node)?;
        Ok(tree_node(&element).expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use serde_json::json;

    /// Fruits (f) -> Apple (a), Pear (p); Vegetables (v).
    fn tree_mock() -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/t1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/t1/attribute/role", json!("tree"));
        let items = json!([element_json("f"), element_json("a"), element_json("p"), element_json("v")]);
        mock.on_request(RequestMethod::Post, "/element/t1/elements", items);
        for (id, text) in &[("f", "Fruits\nApple\nPear"), ("a", "Apple"), ("p", "Pear"), ("v", "Vegetables")] {
            mock.on_request(RequestMethod::Post, &format!("/element/{}/elements", id), json!([]));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/text", id), json!(text));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/attribute/id", id), json!(id));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/enabled", id), json!(true));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/selected", id), json!(false));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/displayed", id), json!(true));
        }
        mock.on_request(
            RequestMethod::Post,
            "/element/f/elements",
            json!([element_json("a"), element_json("p")]),
        );
        mock
    }

    #[test]
    fn test_hierarchy_from_flat_treeitems() {
        let mock = tree_mock();
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let tree = AriaTree::new().load_content(&component).unwrap();

        let labels: Vec<&str> = tree.top().iter().map(|n| tree.element(*n).label()).collect();
        assert_eq!(labels, vec!["Fruits", "Vegetables"]);
        let fruits = tree.top()[0];
        let children: Vec<&str> = tree.children(fruits).iter().map(|n| tree.element(*n).label()).collect();
        assert_eq!(children, vec!["Apple", "Pear"]);
        assert_eq!(tree.full_path(tree.children(fruits)[1]), "Fruits->Pear");

        // The implicit wait is cleared and restored around the rebuild.
        assert_eq!(mock.requests_to(RequestMethod::Post, "/timeouts").len(), 2);
    }

    #[test]
    fn test_not_accessible() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/t1/displayed", json!(true));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let err = AriaTree::new().load_content(&component).unwrap_err();
        assert!(err.to_string().contains("which is not Web Accessible!"));
    }

    #[test]
    fn test_expand_double_clicks_collapsed_ancestors() {
        let mock = tree_mock();
        mock.on_request(RequestMethod::Get, "/element/f/attribute/aria-expanded", json!("false"));
        mock.on_request(RequestMethod::Get, "/element/p/attribute/aria-expanded", json!("true"));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let aria = AriaTree::new();
        let criterion = TextMatchingCriterion::from_path("Fruits->Pear", false, None);
        aria.expand_item(&component, &criterion, false, false).unwrap();

        let actions = mock.requests_to(RequestMethod::Post, "/actions");
        assert_eq!(actions.len(), 1);
        let pointer = &actions[0].body.as_ref().unwrap()["actions"][0]["actions"];
        let moved = pointer.as_array().unwrap().iter().find(|a| a["type"] == "pointerMove").unwrap();
        assert_eq!(moved["origin"]["element-6066-11e4-a52e-4f735466cecf"], json!("f"));
    }

    #[test]
    fn test_select_clicks_node_under_expanded_parent() {
        let mock = tree_mock();
        mock.on_request(RequestMethod::Get, "/element/f/attribute/aria-expanded", json!("true"));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let aria = AriaTree::new();
        let criterion = TextMatchingCriterion::from_path("Fruits->Apple", false, None);
        aria.select_item(&component, &criterion, false, &ClickOptions::new()).unwrap();

        assert!(mock.requests_to(RequestMethod::Post, "/actions").is_empty());
        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/a/click").len(), 1);

        let missing = TextMatchingCriterion::from_path("Fruits->Cherry", false, None);
        let err = aria.select_item(&component, &missing, false, &ClickOptions::new()).unwrap_err();
        assert!(err.to_string().contains("Fail to find tree node 'Fruits->Cherry'."), "{}", err);
    }
}
