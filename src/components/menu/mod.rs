//! Menus and menu bars.
//!
//! Items are addressed by `->` separated paths such as `File->Open`. Opening
//! an item clicks its ancestors first so that the sub-menus are shown.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};

use crate::component::{no_operable, Component, OperableCache};
use crate::components::selectable::HierarchicalSelectable;
use crate::components::ClickOptions;
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::model::aria::{self, ATTRIBUTE_ARIA_SELECTED};
use crate::model::{parse_web_element_text, ElementHierarchy, MenuItem, NodeId, TextMatchingCriterion};
use crate::webelement::WebElement;

pub mod aria_menu;
pub mod sap;

pub use aria_menu::AriaMenu;
pub use sap::{PushMenu, SapMenu};

/// Selecting this "item" of a PushMenu goes back to its home page.
pub const HOME_KEY: &str = "SAS_PushMenu_GoHome_SAS";

pub fn is_menu_item_selected(element: &WebElement<'_>) -> bool {
    aria::is_true(element.get_attribute(ATTRIBUTE_ARIA_SELECTED).ok().flatten().as_deref())
}

/// The first line of the item's text; further lines belong to its sub-menu.
pub fn parse_menu_item_text(element: &WebElement<'_>) -> Option<String> {
    parse_web_element_text(element).map(|t| t.lines().next().unwrap_or_default().to_string())
}

/// A menu strategy.
///
/// A clicked menu item usually closes its menu, so there is no selection
/// state to read back; verification is about the item's status instead.
pub trait MenuSelectable: HierarchicalSelectable + fmt::Debug {
    /// Check the item against a status such as `Enabled Menu With 2 MenuItems`.
    fn verify_menu_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        expected_status: &str,
    ) -> WebDriverResult<()> {
        let (tree, node) = self.matched_node(component, criterion)?;
        let item = MenuItem::new(&tree, node);
        if item.match_status(expected_status) {
            return Ok(());
        }
        let msg = format!(
            "verification error: menu item '{}' does not match status '{}'",
            tree.full_path(node),
            expected_status
        );
        debug!("{}", msg);
        Err(WebDriverError::widget(ErrorCode::VerificationFail, msg))
    }
}

/// Clicked menu items have nothing left to verify once the click went
/// through.
pub(crate) fn menu_item_clicked(tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
    debug!("menu item '{}' was clicked", tree.full_path(node));
    Ok(())
}

fn create_menu_selectable(component: &Component<'_>) -> WebDriverResult<Arc<dyn MenuSelectable>> {
    let element = component.element();
    match Domain::detect(&element) {
        Domain::Sap => match SapMenu::new(component) {
            Ok(m) => Ok(Arc::new(m)),
            Err(e) => {
                debug!("Cannot create a SAP menu: {}", e);
                match PushMenu::new(component) {
                    Ok(m) => Ok(Arc::new(m)),
                    Err(e) => {
                        warn!("Cannot create a PushMenu: {}", e);
                        Err(no_operable())
                    }
                }
            }
        },
        _ => Ok(Arc::new(AriaMenu::new())),
    }
}

/// A menu or menu bar widget.
pub struct Menu<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn MenuSelectable>,
}

impl<'a> fmt::Debug for Menu<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu").field("component", &self.component).finish()
    }
}

impl<'a> Menu<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let menu = Menu {
            component,
            operables: OperableCache::new(),
        };
        menu.selectable()?;
        Ok(menu)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn selectable(&self) -> WebDriverResult<Arc<dyn MenuSelectable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_menu_selectable(&self.component))
    }

    pub fn select_item(&self, criterion: &TextMatchingCriterion, verify: bool, options: &ClickOptions) -> WebDriverResult<()> {
        self.selectable()?.select_item(&self.component, criterion, verify, options).map_err(|e| {
            error!("Fail to select menu item {}: {}", criterion, e);
            e
        })
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

    pub fn verify_menu_item(&self, criterion: &TextMatchingCriterion, expected_status: &str) -> WebDriverResult<()> {
        self.selectable()?.verify_menu_item(&self.component, criterion, expected_status)
    }

    pub fn content(&self) -> WebDriverResult<Arc<ElementHierarchy>> {
        self.selectable()?.content(&self.component)
    }

    pub fn matched_node(&self, criterion: &TextMatchingCriterion) -> WebDriverResult<(Arc<ElementHierarchy>, NodeId)> {
        self.selectable()?.matched_node(&self.component, criterion)
    }

    pub fn clear_cache(&self) -> WebDriverResult<()> {
        self.selectable()?.clear_cache();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::MockDriverSync;
    use serde_json::json;

    #[test]
    fn test_menu_item_text_and_selection() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/m1/text", json!("File\nNew\nOpen"));
        mock.on_request(RequestMethod::Get, "/element/m1/attribute/aria-selected", json!("TRUE"));
        let session = mock.session();
        let m1 = WebElement::new(&session, ElementId::from("m1"));
        assert_eq!(parse_menu_item_text(&m1).as_deref(), Some("File"));
        assert!(is_menu_item_selected(&m1));
    }
}
