//! List views: SAP `ListBox`, `sap.m.ListBase` and `sap.m.SelectList`, and
//! plain `<ul>`/`<ol>` lists.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::component::{no_operable, Component, OperableCache};
use crate::components::selectable::ListSelectable;
use crate::components::ClickOptions;
use crate::domain::Domain;
use crate::error::WebDriverResult;
use crate::model::{Element, TextMatchingCriterion};
use crate::webelement::WebElement;

pub mod generic;
pub mod sap;

pub use generic::GenericList;
pub use sap::{SapListBox, SapMList, SapSelectList};

/// A list strategy.
pub trait ListViewSelectable: ListSelectable + fmt::Debug {}

impl<T: ListSelectable + fmt::Debug> ListViewSelectable for T {}

fn create_sap_listable(component: &Component<'_>) -> Option<Arc<dyn ListViewSelectable>> {
    info!("trying to create a SAP/OpenUI5 list.");
    match SapListBox::new(component) {
        Ok(l) => return Some(Arc::new(l)),
        Err(e) => debug!("Cannot create a SAP ListBox: {}", e),
    }
    match SapMList::new(component) {
        Ok(l) => return Some(Arc::new(l)),
        Err(e) => warn!("Cannot create a sap.m.ListBase: {}", e),
    }
    match SapSelectList::new(component) {
        Ok(l) => Some(Arc::new(l)),
        Err(e) => {
            warn!("Cannot create a sap.m.SelectList: {}", e);
            None
        }
    }
}

fn create_list_selectable(component: &Component<'_>) -> WebDriverResult<Arc<dyn ListViewSelectable>> {
    let element = component.element();
    let sap = match Domain::detect(&element) {
        Domain::Dojo => {
            warn!("Dojo lists are handled as generic lists.");
            None
        }
        Domain::Sap => create_sap_listable(component),
        Domain::Html => None,
    };
    if let Some(s) = sap {
        return Ok(s);
    }

    info!("trying to create a generic list.");
    match GenericList::new(component) {
        Ok(l) => Ok(Arc::new(l)),
        Err(e) => {
            debug!("Cannot create a generic list: {}", e);
            error!("Can not create a proper Selectable object.");
            Err(no_operable())
        }
    }
}

/// A list widget whose items are selected by text or by index.
pub struct ListView<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn ListViewSelectable>,
}

impl<'a> fmt::Debug for ListView<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView").field("component", &self.component).finish()
    }
}

impl<'a> ListView<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let list = ListView {
            component,
            operables: OperableCache::new(),
        };
        list.selectable()?;
        Ok(list)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn selectable(&self) -> WebDriverResult<Arc<dyn ListViewSelectable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_list_selectable(&self.component))
    }

    pub fn select_item(&self, criterion: &TextMatchingCriterion, verify: bool, options: &ClickOptions) -> WebDriverResult<()> {
        self.selectable()?.select_item(&self.component, criterion, verify, options)
    }

    pub fn select_index(&self, index: i64, verify: bool, options: &ClickOptions) -> WebDriverResult<()> {
        self.selectable()?.select_index(&self.component, index, verify, options)
    }

    pub fn activate_item(&self, criterion: &TextMatchingCriterion, verify: bool, options: &ClickOptions) -> WebDriverResult<()> {
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

    pub fn content(&self) -> WebDriverResult<Arc<Vec<Element>>> {
        self.selectable()?.content(&self.component)
    }

    pub fn matched_item(&self, criterion: &TextMatchingCriterion) -> WebDriverResult<Element> {
        self.selectable()?.matched_item(&self.component, criterion)
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

    /// The strategy picked for a list with this class and tag, where the
    /// page claims the control is an instance of `instance` only.
    fn detected(class: &str, tag: &str, instance: Option<&'static str>, dojo: bool) -> (String, MockDriverSync) {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/l1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/l1/attribute/class", json!(class));
        mock.on_request(RequestMethod::Get, "/element/l1/name", json!(tag));
        if dojo {
            mock.on_request(RequestMethod::Get, "/element/l1/attribute/widgetid", json!("dijit_List_0"));
        }
        mock.on(move |r| {
            let body = r.body.as_ref()?;
            if !body["script"].as_str()?.ends_with("return sap_objectIsInstanceof(arguments[0], arguments[1]);") {
                return None;
            }
            let wanted = body["args"][1].as_array()?;
            let yes = instance.map_or(false, |i| wanted.iter().any(|c| *c == i));
            Some(Ok(json!({ "value": yes })))
        });
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("l1"))).unwrap();
        let strategy = create_list_selectable(&component).map(|s| format!("{:?}", s)).unwrap_or_default();
        (strategy, mock)
    }

    #[test]
    fn test_sap_lists_in_order() {
        let (s, _) = detected("sapUiLbx", "div", Some(sap::CLASS_NAME_LISTBOX), false);
        assert!(s.starts_with("SapListBox"), "{}", s);
        let (s, _) = detected("sapMList sapMListBase", "ul", Some(sap::CLASS_NAME_M_LISTBASE), false);
        assert!(s.starts_with("SapMList"), "{}", s);
        let (s, _) = detected("sapMSelectList", "ul", Some(sap::CLASS_NAME_M_SELECTLIST), false);
        assert!(s.starts_with("SapSelectList"), "{}", s);
    }

    #[test]
    fn test_unknown_sap_list_is_generic() {
        let (s, mock) = detected("sapUiSomething", "ol", None, false);
        assert!(s.starts_with("GenericList"), "{}", s);
        let checks = mock.scripts().iter().filter(|s| s.contains("return sap_objectIsInstanceof(")).count();
        assert_eq!(checks, 3);
    }

    #[test]
    fn test_dojo_and_html_lists_are_generic() {
        let (s, mock) = detected("dijitList", "ul", Some(sap::CLASS_NAME_LISTBOX), true);
        assert!(s.starts_with("GenericList"), "{}", s);
        assert!(mock.scripts().iter().all(|s| !s.contains("sap_objectIsInstanceof(")));

        let (s, _) = detected("plain", "ul", None, false);
        assert!(s.starts_with("GenericList"), "{}", s);
        let (s, _) = detected("plain", "table", None, false);
        assert_eq!(s, "");
    }
}
