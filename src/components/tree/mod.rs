//! Trees: WAI-ARIA trees (the default) and `sap.ui.commons.Tree`.

use std::fmt;
use std::sync::Arc;

use log::{debug, error};

use crate::component::{no_operable, Component, OperableCache};
use crate::components::selectable::{wait_ready, HierarchicalSelectable};
use crate::components::{click, ClickOptions};
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::model::aria::{self, ATTRIBUTE_ARIA_EXPANDED, ATTRIBUTE_ARIA_SELECTED, ATTRIBUTE_DATA_EXPANDED};
use crate::model::{parse_web_element_text, Element, ElementHierarchy, NodeId, TextMatchingCriterion};
use crate::webelement::WebElement;

pub mod aria_tree;
pub mod sap;

pub use aria_tree::AriaTree;
pub use sap::SapTree;

/// The first attribute present among `names` decides.
fn attribute_flag(element: &WebElement<'_>, names: &[&str]) -> bool {
    for name in names {
        match element.get_attribute(name) {
            Ok(Some(v)) => return aria::is_true(Some(&v)),
            Ok(None) => {}
            Err(e) => debug!("cannot read '{}': {}", name, e),
        }
    }
    false
}

pub fn is_tree_node_expanded(element: &WebElement<'_>) -> bool {
    attribute_flag(element, &[ATTRIBUTE_ARIA_EXPANDED, ATTRIBUTE_DATA_EXPANDED])
}

pub fn is_tree_node_selected(element: &WebElement<'_>) -> bool {
    attribute_flag(element, &[ATTRIBUTE_ARIA_SELECTED])
}

/// The first line of the node's text; the rest belongs to its children.
pub fn parse_tree_node_text(element: &WebElement<'_>) -> Option<String> {
    parse_web_element_text(element).map(|t| t.lines().next().unwrap_or_default().trim().to_string())
}

/// A tree node read from its DOM element.
pub fn tree_node(element: &WebElement<'_>) -> Element {
    let mut node = Element::from_web_element(element);
    node.label = parse_tree_node_text(element);
    node.expanded = is_tree_node_expanded(element);
    node.selected = node.selected || is_tree_node_selected(element);
    node
}

fn not_in_state(node: &Element, state: &str) -> WebDriverError {
    let msg = format!("verification error: node '{}' has not been {}.", node.label(), state);
    debug!("{}", msg);
    WebDriverError::widget(ErrorCode::VerificationFail, msg)
}

/// Click a node that is already visible, without scrolling.
pub(crate) fn click_node_element(
    component: &Component<'_>,
    node: &Element,
    options: &ClickOptions,
    clicks: u32,
) -> WebDriverResult<()> {
    node.web_element(component.session()).and_then(|e| click(&e, options, clicks)).map_err(|e| {
        error!("Met {}", e);
        WebDriverError::general(format!("Fail to select element by id '{}'. due to '{}'", node.id(), e))
    })
}

/// A tree strategy: node selection plus expansion.
pub trait TreeSelectable: HierarchicalSelectable + fmt::Debug {
    fn expand_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        expand_children: bool,
    ) -> WebDriverResult<()>;

    fn collapse_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        collapse_children: bool,
    ) -> WebDriverResult<()>;

    fn is_node_expanded(&self, component: &Component<'_>, tree: &ElementHierarchy, node: NodeId)
        -> WebDriverResult<bool>;

    fn verify_node_expanded(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        expect_expanded: bool,
    ) -> WebDriverResult<()> {
        if self.is_node_expanded(component, tree, node)? == expect_expanded {
            Ok(())
        } else {
            let state = if expect_expanded { "expanded" } else { "collapsed" };
            Err(not_in_state(tree.element(node), state))
        }
    }

    fn expand_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        expand_children: bool,
        verify: bool,
    ) -> WebDriverResult<()> {
        let (tree, node) = self.matched_node(component, criterion)?;
        self.expand_node(component, &tree, node, expand_children)?;
        if verify {
            wait_ready(component);
            self.verify_node_expanded(component, &tree, node, true)?;
        }
        Ok(())
    }

    fn collapse_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        collapse_children: bool,
        verify: bool,
    ) -> WebDriverResult<()> {
        let (tree, node) = self.matched_node(component, criterion)?;
        self.collapse_node(component, &tree, node, collapse_children)?;
        if verify {
            wait_ready(component);
            self.verify_node_expanded(component, &tree, node, false)?;
        }
        Ok(())
    }

    fn verify_item_expanded(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        expect_expanded: bool,
    ) -> WebDriverResult<()> {
        let (tree, node) = self.matched_node(component, criterion)?;
        self.verify_node_expanded(component, &tree, node, expect_expanded)
    }
}

fn create_tree_selectable(component: &Component<'_>) -> WebDriverResult<Arc<dyn TreeSelectable>> {
    let element = component.element();
    match Domain::detect(&element) {
        Domain::Sap => match SapTree::new(component) {
            Ok(t) => Ok(Arc::new(t)),
            Err(e) => {
                debug!("Met {}", e);
                Err(no_operable())
            }
        },
        _ => Ok(Arc::new(AriaTree::new())),
    }
}

/// A tree widget. Nodes are addressed by `->` separated paths.
pub struct Tree<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn TreeSelectable>,
}

impl<'a> fmt::Debug for Tree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("component", &self.component).finish()
    }
}

impl<'a> Tree<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let tree = Tree {
            component,
            operables: OperableCache::new(),
        };
        tree.selectable()?;
        Ok(tree)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn selectable(&self) -> WebDriverResult<Arc<dyn TreeSelectable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_tree_selectable(&self.component))
    }

    pub fn select_item(
        &self,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        self.selectable()?.select_item(&self.component, criterion, verify, options)
    }

    pub fn select_index(&self, index: i64, verify: bool, options: &ClickOptions) -> WebDriverResult<()> {
        self.selectable()?.select_index(&self.component, index, verify, options)
    }

    pub fn activate_item(
        &self,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        self.selectable()?.activate_item(&self.component, criterion, verify, options)
    }

    pub fn activate_index(&self, index: i64, verify: bool, options: &ClickOptions) -> WebDriverResult<()> {
        self.selectable()?.activate_index(&self.component, index, verify, options)
    }

    pub fn verify_item_selection(&self, criterion: &TextMatchingCriterion, expect_selected: bool) -> WebDriverResult<()> {
        self.selectable()?.verify_item_selection(&self.component, criterion, expect_selected)
    }

    pub fn verify_index_selection(&self, index: i64, expect_selected: bool) -> WebDriverResult<()> {
        self.selectable()?.verify_index_selection(&self.component, index, expect_selected)
    }

    pub fn verify_contains(&self, criterion: &TextMatchingCriterion) -> WebDriverResult<()> {
        self.selectable()?.verify_contains(&self.component, criterion)
    }

    pub fn content(&self) -> WebDriverResult<Arc<ElementHierarchy>> {
        self.selectable()?.content(&self.component)
    }

    pub fn matched_node(&self, criterion: &TextMatchingCriterion) -> WebDriverResult<(Arc<ElementHierarchy>, NodeId)> {
        self.selectable()?.matched_node(&self.component, criterion)
    }

    pub fn expand_item(&self, criterion: &TextMatchingCriterion, expand_children: bool, verify: bool) -> WebDriverResult<()> {
        self.selectable()?.expand_item(&self.component, criterion, expand_children, verify)
    }

    pub fn collapse_item(
        &self,
        criterion: &TextMatchingCriterion,
        collapse_children: bool,
        verify: bool,
    ) -> WebDriverResult<()> {
        self.selectable()?.collapse_item(&self.component, criterion, collapse_children, verify)
    }

    pub fn verify_item_expanded(&self, criterion: &TextMatchingCriterion, expect_expanded: bool) -> WebDriverResult<()> {
        self.selectable()?.verify_item_expanded(&self.component, criterion, expect_expanded)
    }

    /// Forget the content read so far.
    pub fn clear_cache(&self) -> WebDriverResult<()> {
        self.selectable()?.clear_cache();
        Ok(())
    }
}
