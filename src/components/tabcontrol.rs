//! Tab controls: `sap.ui.commons.TabStrip` and Dojo's
//! `dijit.layout.TabContainer`.
//!
//! Tabs are a flat list, so both strategies are [`ListSelectable`]. A tab
//! that cannot be clicked is selected through the control's own API, and
//! the selection is verified by comparing the control's selected index.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::{json, Value};

use crate::component::{no_operable, Component, OperableCache};
use crate::components::ensure_supported;
use crate::components::selectable::{click_item, verify_selected_flag, ContentCache, ListSelectable};
use crate::components::ClickOptions;
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::js::{self, dojo, sap, JsFunction};
use crate::model::{parse_items, Element, TextMatchingCriterion};
use crate::webelement::WebElement;

pub const CLASS_NAME_TABSTRIP: &str = "sap.ui.commons.TabStrip";
pub const CLASS_NAME_TABCONTAINER: &str = "dijit.layout.TabContainer";

/// A tab strategy.
pub trait TabSelectable: ListSelectable + fmt::Debug {}

impl<T: ListSelectable + fmt::Debug> TabSelectable for T {}

fn load_tabs(component: &Component<'_>, function: &JsFunction) -> WebDriverResult<Vec<Element>> {
    let ret = component.with_element(|e| js::call_on(e, function, &[]))?;
    match ret.value() {
        v @ Value::Array(_) => Ok(parse_items(v)),
        other => {
            warn!("Need to handle javascript result: {}", other);
            Ok(Vec::new())
        }
    }
}

/// Compare the control's selected index with the item's.
fn verify_selected_index(component: &Component<'_>, function: &JsFunction, item: &Element) -> WebDriverResult<()> {
    let index = match item.index {
        Some(i) if i >= 0 => i,
        _ => return Err(WebDriverError::general("Item's index is invalid, cannot verify.")),
    };
    match js::call_on(&component.element(), function, &[]) {
        Ok(ret) => {
            let selected = ret.value().as_i64();
            debug!("selected index {:?}", selected);
            if selected == Some(index) {
                return Ok(());
            }
            let msg = format!(
                "verification error: selectedIndex '{}' doesn't equal to index '{}'",
                selected.map_or_else(|| "null".to_string(), |s| s.to_string()),
                index
            );
            debug!("{}", msg);
            Err(WebDriverError::widget(ErrorCode::VerificationFail, msg))
        }
        Err(e) => {
            warn!("Fail to get the selected index. Met {}", e);
            verify_selected_flag(item)
        }
    }
}

/// `sap.ui.commons.TabStrip`.
#[derive(Debug, Default)]
pub struct SapTabStrip {
    cache: ContentCache<Vec<Element>>,
}

impl SapTabStrip {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_TABSTRIP])?;
        Ok(SapTabStrip::default())
    }
}

impl ListSelectable for SapTabStrip {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        load_tabs(component, &sap::SAP_TABSTRIP_GET_TABS)
    }

    fn cache(&self) -> &ContentCache<Vec<Element>> {
        &self.cache
    }

    /// A failed click falls back to selecting the index through the control.
    fn click_item(&self, component: &Component<'_>, item: &Element, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
        let index = item.index.unwrap_or(-1);
        if index < 0 {
            return Err(WebDriverError::general("Item's index is less than zero, cannot select."));
        }
        if let Err(e) = click_item(component, item, options, clicks) {
            warn!("Fail to click tab '{}', selecting it by index. Met {}", item.label(), e);
            js::call_on(&component.element(), &sap::SAP_TABSTRIP_SET_SELECTED_INDEX, &[json!(index)]).map_err(|ex| {
                error!("Met {}", ex);
                WebDriverError::general(format!("Fail to select index '{}'. due to {}", index, ex))
            })?;
        }
        Ok(())
    }

    fn verify_item_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        verify_selected_index(component, &sap::SAP_GET_SELECTED_INDEX, item)
    }
}

/// `dijit.layout.TabContainer`, whose tabs are its child panes.
#[derive(Debug, Default)]
pub struct DojoTabContainer {
    cache: ContentCache<Vec<Element>>,
}

impl DojoTabContainer {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Dojo, &[CLASS_NAME_TABCONTAINER])?;
        Ok(DojoTabContainer::default())
    }
}

impl ListSelectable for DojoTabContainer {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        load_tabs(component, &dojo::TAB_CONTAINER_GET_CHILDREN)
    }

    fn cache(&self) -> &ContentCache<Vec<Element>> {
        &self.cache
    }

    /// A failed click falls back to `selectChild` with the pane's id.
    fn click_item(&self, component: &Component<'_>, item: &Element, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
        if let Err(e) = click_item(component, item, options, clicks) {
            warn!("Fail to click tab '{}', selecting its pane. Met {}", item.label(), e);
            js::call_on(&component.element(), &dojo::STACK_CONTAINER_SELECT_CHILD, &[json!(item.id())]).map_err(|ex| {
                error!("Met {}", ex);
                WebDriverError::general(format!("Fail to select tab due to {}", ex))
            })?;
        }
        Ok(())
    }

    fn verify_item_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        verify_selected_index(component, &dojo::STACK_CONTAINER_GET_SELECTED_INDEX, item)
    }
}

fn create_tab_selectable(component: &Component<'_>) -> WebDriverResult<Arc<dyn TabSelectable>> {
    let created: WebDriverResult<Arc<dyn TabSelectable>> = match Domain::detect(&component.element()) {
        Domain::Dojo => {
            info!("trying to create a Dojo TabContainer.");
            DojoTabContainer::new(component).map(|t| Arc::new(t) as Arc<dyn TabSelectable>)
        }
        Domain::Sap => {
            info!("trying to create a SAP TabStrip.");
            SapTabStrip::new(component).map(|t| Arc::new(t) as Arc<dyn TabSelectable>)
        }
        Domain::Html => {
            error!("HTML tab controls are not supported.");
            Err(no_operable())
        }
    };
    created.map_err(|e| {
        debug!("Cannot create a tab control: {}", e);
        no_operable()
    })
}

/// A tab control whose tabs are selected by label or by index.
pub struct TabControl<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn TabSelectable>,
}

impl<'a> fmt::Debug for TabControl<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabControl").field("component", &self.component).finish()
    }
}

impl<'a> TabControl<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let tabs = TabControl {
            component,
            operables: OperableCache::new(),
        };
        tabs.selectable()?;
        Ok(tabs)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn selectable(&self) -> WebDriverResult<Arc<dyn TabSelectable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_tab_selectable(&self.component))
    }

    /// Select the `match_index`th tab whose label matches `text`.
    pub fn select_tab(&self, text: &str, partial: bool, match_index: i64, verify: bool) -> WebDriverResult<()> {
        let criterion = TextMatchingCriterion::new(text, partial, match_index);
        self.selectable()?.select_item(&self.component, &criterion, verify, &ClickOptions::new())
    }

    pub fn select_tab_index(&self, index: i64, verify: bool) -> WebDriverResult<()> {
        self.selectable()?.select_index(&self.component, index, verify, &ClickOptions::new())
    }

    pub fn verify_tab_selection(&self, text: &str, partial: bool, expect_selected: bool) -> WebDriverResult<()> {
        let criterion = TextMatchingCriterion::new(text, partial, 0);
        self.selectable()?.verify_item_selection(&self.component, &criterion, expect_selected)
    }

    pub fn content(&self) -> WebDriverResult<Arc<Vec<Element>>> {
        self.selectable()?.content(&self.component)
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
    use crate::http::mock_sync::{element_json, MockDriverSync};

    fn tab_args(mock: &MockDriverSync, call: &str) -> Vec<Value> {
        mock.requests()
            .into_iter()
            .filter_map(|r| r.body)
            .filter(|b| b["script"].as_str().map_or(false, |s| s.contains(call)))
            .map(|b| b["args"].clone())
            .collect()
    }

    /// A tab control `t1` whose tabs are found by id as `we-tab`. Any other
    /// lookup is the control being refreshed.
    fn tabs_mock(class: &str) -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/t1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/t1/attribute/class", json!(class));
        mock.on(|r| {
            if r.method != RequestMethod::Post || !r.url.ends_with("/element") {
                return None;
            }
            let by_id = r.body.as_ref().and_then(|b| b["value"].as_str()).map_or(false, |v| v.starts_with("[id="));
            let id = if by_id { "we-tab" } else { "t1" };
            Some(Ok(json!({ "value": element_json(id) })))
        });
        mock.on_request(RequestMethod::Get, "/element/we-tab/displayed", json!(true));
        mock
    }

    fn sap_tabs() -> Value {
        json!([
            {"id": "general", "label": "General", "selected": true, "index": 0},
            {"id": "details", "label": "Details", "index": 1},
            {"id": "history", "label": "History", "disabled": true, "index": 2}
        ])
    }

    #[test]
    fn test_sap_tab_strip_selects_by_index_when_click_fails() {
        let mock = tabs_mock("sapUiTabStrip");
        mock.on_script("sap_objectIsInstanceof", json!(true));
        mock.on_script("return sap_ui_commons_TabStrip_getTabs(", sap_tabs());
        mock.on_script("return sap_ui_commons_getSelectedIndex(", json!(1));
        mock.on_error(RequestMethod::Post, "/element/we-tab/click", "element not interactable");
        let session = mock.session();
        let tabs = TabControl::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();

        assert_eq!(tabs.content().unwrap().len(), 3);
        tabs.select_tab("Det", true, 0, true).unwrap();
        let set = tab_args(&mock, "return sap_ui_commons_TabStrip_setSelectedIndex(");
        assert_eq!(set.len(), 1);
        assert_eq!(set[0][0], element_json("t1"));
        assert_eq!(set[0][1], json!(1));

        tabs.verify_tab_selection("Details", false, true).unwrap();
        let err = tabs.select_tab_index(0, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "VERIFICATION_FAIL: verification error: selectedIndex '1' doesn't equal to index '0'"
        );
        assert!(tabs.select_tab("History", false, 0, false).is_err());
    }

    #[test]
    fn test_sap_tab_without_index() {
        let mock = tabs_mock("sapUiTabStrip");
        mock.on_script("sap_objectIsInstanceof", json!(true));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();
        let strip = SapTabStrip::new(&component).unwrap();

        let tab = Element::from_json(&json!({"id": "x", "label": "X"}));
        let err = strip.click_item(&component, &tab, &ClickOptions::new(), 1).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Item's index is less than zero, cannot select.");
        let err = strip.verify_item_selected(&component, &tab).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Item's index is invalid, cannot verify.");
        // Anything but an array is an empty strip.
        assert!(strip.load_content(&component).unwrap().is_empty());
    }

    #[test]
    fn test_dojo_tab_container_selects_child() {
        let mock = tabs_mock("dijitTabContainer dijitContainer");
        mock.on_request(RequestMethod::Get, "/element/t1/attribute/widgetid", json!("tabs"));
        mock.on_script("dojo_objectIsInstanceof", json!(true));
        mock.on_script(
            "return dojo_dijit_layout_TabContainerBase_getChildren(",
            json!([{"id": "pane1", "label": "One", "index": 0}, {"id": "pane2", "label": "Two", "index": 1}]),
        );
        mock.on_script("return dojo_dijit_layout_StackContainer_getSelectedIndex(", json!(1));
        mock.on_error(RequestMethod::Post, "/element/we-tab/click", "element click intercepted");
        let session = mock.session();
        let tabs = TabControl::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();

        tabs.select_tab("Two", false, 0, true).unwrap();
        let select = tab_args(&mock, "return dojo_dijit_layout_StackContainer_selectChild(");
        assert_eq!(select.len(), 1);
        assert_eq!(select[0][1], json!("pane2"));
    }

    #[test]
    fn test_dojo_select_child_failure() {
        let mock = tabs_mock("dijitTabContainer");
        mock.on_request(RequestMethod::Get, "/element/t1/attribute/widgetid", json!("tabs"));
        mock.on_script("dojo_objectIsInstanceof", json!(true));
        mock.on_script(
            "return dojo_dijit_layout_TabContainerBase_getChildren(",
            json!([{"id": "pane1", "label": "One", "index": 0}]),
        );
        mock.on_error(RequestMethod::Post, "/element/we-tab/click", "element click intercepted");
        mock.on_script_error("return dojo_dijit_layout_StackContainer_selectChild(");
        let session = mock.session();
        let tabs = TabControl::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();

        let err = tabs.select_tab_index(0, false).unwrap_err();
        assert!(err.to_string().starts_with("GENERAL: Fail to select tab due to"), "{}", err);
    }

    #[test]
    fn test_html_tabs_are_not_supported() {
        let mock = tabs_mock("tabs");
        let session = mock.session();
        let err = TabControl::new(WebElement::new(&session, ElementId::from("t1"))).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ObjectIsNull));
    }
}
