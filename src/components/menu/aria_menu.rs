use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error};

use crate::common::command::By;
use crate::component::Component;
use crate::components::menu::{is_menu_item_selected, menu_item_clicked, parse_menu_item_text, MenuSelectable};
use crate::components::selectable::{click_item, ContentCache, HierarchicalSelectable};
use crate::components::ClickOptions;
use crate::error::{WebDriverError, WebDriverResult};
use crate::model::aria::{ATTRIBUTE_WAI_ROLE, ROLE_MENUITEM};
use crate::model::{Element, ElementHierarchy, NodeId, TextMatchingCriterion};
use crate::rs::xpath;
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

/// Pause after opening a sub-menu.
const OPEN_PAUSE: Duration = Duration::from_millis(500);

fn menu_item(element: &WebElement<'_>) -> Element {
    let mut item = Element::from_web_element(element);
    item.label = parse_menu_item_text(element);
    item.selected = item.selected || is_menu_item_selected(element);
    item
}

/// A menu following the WAI-ARIA menu pattern (`role="menuitem"` items).
///
/// The full content of such a menu is not readable; items are found by
/// walking the path in the page.
#[derive(Debug, Default)]
pub struct AriaMenu {
    cache: ContentCache<ElementHierarchy>,
}

impl AriaMenu {
    pub fn new() -> Self {
        AriaMenu::default()
    }

    /// The chain of items from the top level down to the one at the end of
    /// the path.
    fn walk_path(&self, component: &Component<'_>, criterion: &TextMatchingCriterion) -> Option<(ElementHierarchy, NodeId)> {
        let root = component.element();
        let accessible = component.is_accessible();
        let menuitems = xpath::from_attribute(xpath::TAG_ANY, ATTRIBUTE_WAI_ROLE, ROLE_MENUITEM, false, true);
        let mut chain = ElementHierarchy::new();
        let mut parent_element = root.clone();
        let mut parent_node = None;

        for (level, text) in criterion.path().iter().enumerate() {
            let found = if accessible {
                parent_element.find_elements(By::XPath(&menuitems)).ok().and_then(|items| {
                    items.into_iter().find(|item| {
                        parse_menu_item_text(item).map_or(false, |t| criterion.match_text_at_level(&t, level))
                    })
                })
            } else {
                let query = xpath::from_text(xpath::TAG_ANY, text, criterion.is_partial(), true);
                root.find_elements(By::XPath(&query)).ok().and_then(|found| found.into_iter().next())
            };
            match found {
                Some(element) => {
                    parent_node = Some(chain.add_node(menu_item(&element), parent_node));
                    parent_element = element;
                }
                None => {
                    error!("node '{}' not found.", text);
                    return None;
                }
            }
        }
        parent_node.map(|node| (chain, node))
    }
}

impl HierarchicalSelectable for AriaMenu {
    fn load_content(&self, _component: &Component<'_>) -> WebDriverResult<ElementHierarchy> {
        Err(WebDriverError::general("Not supported yet."))
    }

    fn cache(&self) -> &ContentCache<ElementHierarchy> {
        &self.cache
    }

    fn matched_node(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
    ) -> WebDriverResult<(Arc<ElementHierarchy>, NodeId)> {
        match self.walk_path(component, criterion) {
            Some((chain, node)) => Ok((Arc::new(chain), node)),
            None => {
                error!("Fail to find element {}", criterion);
                Err(WebDriverError::general(format!(
                    "Fail to find element '{}'.",
                    criterion.text().unwrap_or_default()
                )))
            }
        }
    }

    /// Opens each ancestor from the top, then clicks the item.
    fn click_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        options: &ClickOptions,
        clicks: u32,
    ) -> WebDriverResult<()> {
        let mut path = tree.ancestors(node);
        path.reverse();
        for id in path {
            let opened = tree
                .element(id)
                .web_element(component.session())
                .and_then(|e| component.session().action_chain().click_element(&e).perform());
            opened.map_err(|e| {
                error!("Met {}", e);
                WebDriverError::general(format!("Fail to show node '{}'. due to '{}'", tree.element(node).label(), e))
            })?;
            debug!("opened '{}'", tree.element(id).label());
            thread::sleep(OPEN_PAUSE);
        }
        click_item(component, tree.element(node), options, clicks)
    }

    fn verify_node_selected(&self, _component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        menu_item_clicked(tree, node)
    }
}

impl MenuSelectable for AriaMenu {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::components::menu::Menu;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use serde_json::json;

    fn menubar_mock() -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/mb/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/mb/attribute/role", json!("menubar"));
        for (id, text) in &[("file", "File\nNew\nOpen"), ("edit", "Edit"), ("new", "New"), ("open", "Open")] {
            mock.on_request(RequestMethod::Get, &format!("/element/{}/text", id), json!(text));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/enabled", id), json!(true));
            mock.on_request(RequestMethod::Post, &format!("/element/{}/elements", id), json!([]));
        }
        mock.on_request(
            RequestMethod::Post,
            "/element/mb/elements",
            json!([element_json("file"), element_json("new"), element_json("open"), element_json("edit")]),
        );
        mock.on_request(
            RequestMethod::Post,
            "/element/file/elements",
            json!([element_json("new"), element_json("open")]),
        );
        mock
    }

    #[test]
    fn test_select_opens_ancestors_then_clicks_item() {
        let mock = menubar_mock();
        let session = mock.session();
        let menu = Menu::new(WebElement::new(&session, ElementId::from("mb"))).unwrap();
        let criterion = TextMatchingCriterion::from_path("File->Open", false, None);
        menu.select_item(&criterion, false, &ClickOptions::new()).unwrap();

        let actions = mock.requests_to(RequestMethod::Post, "/actions");
        assert_eq!(actions.len(), 1);
        let pointer = &actions[0].body.as_ref().unwrap()["actions"][0]["actions"];
        let moved = pointer.as_array().unwrap().iter().find(|a| a["type"] == "pointerMove").unwrap();
        assert_eq!(moved["origin"], element_json("file"));
        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/open/click").len(), 1);
        assert!(mock.requests_to(RequestMethod::Post, "/element/file/click").is_empty());
    }

    #[test]
    fn test_missing_item() {
        let mock = menubar_mock();
        let session = mock.session();
        let menu = Menu::new(WebElement::new(&session, ElementId::from("mb"))).unwrap();
        let criterion = TextMatchingCriterion::from_path("File->Close", false, None);
        let err = menu.select_item(&criterion, false, &ClickOptions::new()).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Fail to find element 'File->Close'.");
        assert!(menu.verify_contains(&criterion).is_err());
        menu.verify_contains(&TextMatchingCriterion::from_path("Edit", false, None)).unwrap();
        assert_eq!(menu.select_index(0, false, &ClickOptions::new()).unwrap_err().to_string(), "NOT_SUPPORTED: Not supported.");
    }
}
