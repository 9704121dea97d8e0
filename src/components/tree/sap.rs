use std::thread;
use std::time::Duration;

use log::{debug, error, warn};
use serde_json::{json, Value};

use crate::common::command::By;
use crate::common::scriptargs::ScriptArgs;
use crate::component::Component;
use crate::components::ensure_supported;
use crate::components::selectable::{verify_selected_flag, ContentCache, HierarchicalSelectable};
use crate::components::tree::{click_node_element, is_tree_node_expanded, is_tree_node_selected, TreeSelectable};
use crate::components::ClickOptions;
use crate::domain::Domain;
use crate::error::{WebDriverError, WebDriverResult};
use crate::js::{self, sap, JsFunction};
use crate::model::{ElementHierarchy, NodeId};
use crate::webelement::WebElement;

pub const CLASS_NAME_TREE: &str = "sap.ui.commons.Tree";

const SHOW_PAUSE: Duration = Duration::from_millis(500);

/// `sap.ui.commons.Tree`, driven through the UI5 API.
#[derive(Debug, Default)]
pub struct SapTree {
    cache: ContentCache<ElementHierarchy>,
}

/// Run a tree node function with the node id and extra arguments.
fn call_node(component: &Component<'_>, function: &JsFunction, node_id: &str, extra: &[Value]) -> WebDriverResult<Value> {
    let mut args = ScriptArgs::new();
    args.push(node_id)?;
    for value in extra {
        args.push_value(value.clone());
    }
    let ret = js::call(component.session(), function, &args)?;
    Ok(ret.value().clone())
}

fn node_id<'t>(tree: &'t ElementHierarchy, node: NodeId, action: &str) -> WebDriverResult<&'t str> {
    tree.element(node)
        .id
        .as_deref()
        .ok_or_else(|| WebDriverError::general(format!("TreeNode's id is null, cannot {}.", action)))
}

/// The node's DOM element inside the tree, by id.
fn dom_node<'a>(component: &Component<'a>, id: &str) -> Option<WebElement<'a>> {
    component.element().find_elements(By::Id(id)).ok().and_then(|found| found.into_iter().next())
}

impl SapTree {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_TREE])?;
        Ok(SapTree::default())
    }

    /// Expand the whole tree and scroll the node into view.
    fn show_node(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        let label = tree.element(node).label();
        let id = node_id(tree, node, "show node on page")?;
        let shown = js::call_on(&component.element(), &sap::SAP_TREE_EXPAND_ALL, &[]).and_then(|_| {
            thread::sleep(SHOW_PAUSE);
            call_node(component, &sap::SAP_TREENODE_SHOW_ON_PAGE, id, &[])?;
            thread::sleep(SHOW_PAUSE);
            Ok(())
        });
        shown.map_err(|e| {
            error!("Met {}", e);
            WebDriverError::general(format!("Fail to show node '{}'. due to '{}'", label, e))
        })
    }
}

impl HierarchicalSelectable for SapTree {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<ElementHierarchy> {
        let ret = component.with_element(|e| js::call_on(e, &sap::SAP_TREE_GET_NODES, &[]))?;
        match ret.value() {
            v @ Value::Object(_) => Ok(ElementHierarchy::from_json(v)),
            other => {
                warn!("Need to handle javascript result: {}", other);
                Err(WebDriverError::general("Fail to get content from a tree."))
            }
        }
    }

    fn cache(&self) -> &ContentCache<ElementHierarchy> {
        &self.cache
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

    /// Asks the control, then the node's `aria-selected`.
    fn verify_node_selected(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        let element = tree.element(node);
        if element.selected {
            return Ok(());
        }
        let id = node_id(tree, node, "verify its status")?;
        let mut checked = element.clone();
        match call_node(component, &sap::SAP_TREENODE_GET_IS_SELECTED, id, &[]) {
            Ok(v) => checked.selected = v.as_bool().unwrap_or(false),
            Err(e) => debug!("Met {}", e),
        }
        if !checked.selected {
            checked.selected = dom_node(component, id).map_or(false, |e| is_tree_node_selected(&e));
        }
        debug!("node {} selected={}", tree.full_path(node), checked.selected);
        verify_selected_flag(&checked)
    }
}

impl TreeSelectable for SapTree {
    /// Ancestors are expanded from the top without their children, then the
    /// node itself.
    fn expand_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        expand_children: bool,
    ) -> WebDriverResult<()> {
        let mut ancestors: Vec<NodeId> =
            tree.ancestors(node).into_iter().filter(|a| tree.parent(*a).is_some()).collect();
        ancestors.reverse();
        let expanded = ancestors
            .iter()
            .map(|a| node_id(tree, *a, "expand it"))
            .collect::<WebDriverResult<Vec<&str>>>()
            .and_then(|ids| {
                for id in ids {
                    call_node(component, &sap::SAP_TREENODE_EXPAND, id, &[json!(false)])?;
                }
                let id = node_id(tree, node, "expand it")?;
                call_node(component, &sap::SAP_TREENODE_EXPAND, id, &[json!(expand_children)])?;
                Ok(())
            });
        expanded.map_err(|e| {
            error!("Met {}", e);
            WebDriverError::general(format!("Fail to expand node '{}'. due to '{}'", tree.element(node).label(), e))
        })
    }

    fn collapse_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        collapse_children: bool,
    ) -> WebDriverResult<()> {
        let id = node_id(tree, node, "collapse it")?;
        call_node(component, &sap::SAP_TREENODE_COLLAPSE, id, &[json!(collapse_children)])
            .map(|_| ())
            .map_err(|e| {
                error!("Met {}", e);
                WebDriverError::general(format!(
                    "Fail to collapse node '{}'. due to '{}'",
                    tree.element(node).label(),
                    e
                ))
            })
    }

    fn is_node_expanded(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<bool> {
        let id = node_id(tree, node, "verify its status")?;
        let expanded = match call_node(component, &sap::SAP_TREENODE_GET_EXPANDED, id, &[]) {
            Ok(v) => v.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Met {}", e);
                false
            }
        };
        debug!("node {} expanded={}", tree.full_path(node), expanded);
        Ok(expanded || dom_node(component, id).map_or(false, |e| is_tree_node_expanded(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::MockDriverSync;
    use crate::model::TextMatchingCriterion;

    fn sap_tree_mock() -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/t1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/t1/attribute/class", json!("sapUiTree"));
        mock.on_script("sap_objectIsInstanceof", json!(true));
        mock.on_script(
            "return sap_ui_commons_Tree_getNodes(",
            json!({
                "id": "tree1",
                "children": [
                    {"id": "n1", "label": "Europe", "children": [
                        {"id": "n2", "label": "France", "children": [
                            {"id": "n3", "label": "Paris"}
                        ]}
                    ]}
                ]
            }),
        );
        mock
    }

    fn script_args(mock: &MockDriverSync, call: &str) -> Vec<Value> {
        mock.requests()
            .into_iter()
            .filter_map(|r| r.body)
            .filter(|b| b["script"].as_str().map_or(false, |s| s.contains(call)))
            .map(|b| b["args"].clone())
            .collect()
    }

    #[test]
    fn test_expand_from_the_top() {
        let mock = sap_tree_mock();
        mock.on_script("return sap_ui_commons_TreeNode_getExpanded(", json!(true));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let tree = SapTree::new(&component).unwrap();
        let criterion = TextMatchingCriterion::from_path("Europe->France->Paris", false, None);
        tree.expand_item(&component, &criterion, true, false).unwrap();

        let args = script_args(&mock, "return sap_ui_commons_TreeNode_expand(");
        assert_eq!(args, vec![json!(["n1", false]), json!(["n2", false]), json!(["n3", true])]);

        tree.verify_item_expanded(&component, &criterion, true).unwrap();
        let err = tree.verify_item_expanded(&component, &criterion, false).unwrap_err();
        assert!(err.to_string().contains("node 'Paris' has not been collapsed."));
    }

    #[test]
    fn test_node_without_id() {
        let mock = MockDriverSync::new();
        let mut tree = ElementHierarchy::new();
        let node = tree.add_node(crate::model::Element::default(), None);
        let session = mock.session();
        mock.on_request(RequestMethod::Get, "/element/t1/displayed", json!(true));
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let err = SapTree::default().collapse_node(&component, &tree, node, false).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: TreeNode's id is null, cannot collapse it.");
    }
}
