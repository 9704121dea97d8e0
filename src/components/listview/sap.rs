use log::{debug, error, warn};
use serde_json::{json, Value};

use crate::component::Component;
use crate::components::ensure_supported;
use crate::components::selectable::{
    click_item, show_on_page, verify_selected_flag, verify_selected_in_content, ContentCache, ListSelectable,
};
use crate::components::ClickOptions;
use crate::domain::Domain;
use crate::error::{WebDriverError, WebDriverResult};
use crate::js::{self, sap, JsFunction};
use crate::model::{parse_items, Element};

pub const CLASS_NAME_LISTBOX: &str = "sap.ui.commons.ListBox";
pub const CLASS_NAME_M_LISTBASE: &str = "sap.m.ListBase";
pub const CLASS_NAME_M_SELECTLIST: &str = "sap.m.SelectList";

fn load_items(component: &Component<'_>, function: &JsFunction) -> WebDriverResult<Vec<Element>> {
    let ret = component.with_element(|e| js::call_on(e, function, &[]))?;
    match ret.value() {
        v @ Value::Array(_) => Ok(parse_items(v)),
        other => {
            warn!("Need to handle javascript result: {}", other);
            Err(WebDriverError::general("Fail to get content from a list."))
        }
    }
}

/// `sap.ui.commons.ListBox`.
#[derive(Debug, Default)]
pub struct SapListBox {
    cache: ContentCache<Vec<Element>>,
}

impl SapListBox {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_LISTBOX])?;
        Ok(SapListBox::default())
    }

    fn index_of(item: &Element) -> WebDriverResult<i64> {
        match item.index {
            Some(i) if i >= 0 => Ok(i),
            _ => Err(WebDriverError::general("Item's index is invalid, cannot click.")),
        }
    }

    /// Let the control scroll to the item; the page's own scrolling is the
    /// fallback.
    fn show_item(&self, component: &Component<'_>, item: &Element, index: i64) -> WebDriverResult<()> {
        if let Err(e) = js::call_on(&component.element(), &sap::SAP_LISTBOX_SCROLL_TO_INDEX, &[json!(index)]) {
            warn!("Fail to scroll to item '{}' by index. Met {}", item.label(), e);
            let element = item.web_element(component.session())?;
            show_on_page(component, item, &element)?;
        }
        component.refresh(true);
        Ok(())
    }
}

impl ListSelectable for SapListBox {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        load_items(component, &sap::SAP_LISTBOX_GET_ITEMS)
    }

    fn cache(&self) -> &ContentCache<Vec<Element>> {
        &self.cache
    }

    /// A failed click falls back to selecting the index through the control.
    fn click_item(&self, component: &Component<'_>, item: &Element, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
        let index = Self::index_of(item)?;
        let clicked = self
            .show_item(component, item, index)
            .and_then(|_| click_item(component, item, options, clicks));
        if let Err(e) = clicked {
            warn!("Fail to click item '{}', selecting it by index. Met {}", item.label(), e);
            js::call_on(&component.element(), &sap::SAP_LISTBOX_SET_SELECTED_INDEX, &[json!(index)]).map_err(|ex| {
                error!("Met {}", ex);
                WebDriverError::general(format!(
                    "Fail to select item '{}' by index '{}'. due to '{}'",
                    item.label(),
                    index,
                    ex
                ))
            })?;
        }
        Ok(())
    }

    fn verify_item_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        let index = Self::index_of(item)?;
        match js::call_on(&component.element(), &sap::SAP_LISTBOX_GET_SELECTED_INDICES, &[]) {
            Ok(ret) => {
                let indices = ret.value().as_array().cloned().unwrap_or_default();
                debug!("selected indices {:?}", indices);
                if indices.iter().any(|i| i.as_i64() == Some(index)) {
                    return Ok(());
                }
                let mut checked = item.clone();
                checked.selected = false;
                verify_selected_flag(&checked)
            }
            Err(e) => {
                warn!("Fail to get selected indices. Met {}", e);
                verify_selected_in_content(self, component, item)
            }
        }
    }
}

/// Shared behaviour of the `sap.m` lists, which select items by their id.
#[derive(Debug)]
struct SapMItems {
    cache: ContentCache<Vec<Element>>,
    get_items: &'static JsFunction,
    get_selected_items: &'static JsFunction,
    set_selected_item_by_id: &'static JsFunction,
}

impl SapMItems {
    fn click_item(&self, component: &Component<'_>, item: &Element, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
        let id = match item.id.as_deref() {
            Some(id) => id,
            None => return Err(WebDriverError::general("Item's id is invalid, cannot click.")),
        };
        if let Err(e) = click_item(component, item, options, clicks) {
            warn!("Fail to click item '{}', selecting it by id. Met {}", item.label(), e);
            js::call_on(&component.element(), self.set_selected_item_by_id, &[json!(id)]).map_err(|ex| {
                error!("Met {}", ex);
                WebDriverError::general(format!("Fail to select item '{}' by id '{}'. due to '{}'", item.label(), id, ex))
            })?;
        }
        Ok(())
    }

    fn verify_item_selected<S>(&self, selectable: &S, component: &Component<'_>, item: &Element) -> WebDriverResult<()>
    where
        S: ListSelectable + ?Sized,
    {
        match js::call_on(&component.element(), self.get_selected_items, &[]) {
            Ok(ret) => {
                if parse_items(ret.value()).iter().any(|selected| item.matches(selected)) {
                    return Ok(());
                }
                let mut checked = item.clone();
                checked.selected = false;
                verify_selected_flag(&checked)
            }
            Err(e) => {
                warn!("Fail to get selected items. Met {}", e);
                verify_selected_in_content(selectable, component, item)
            }
        }
    }
}

/// `sap.m.List`, `sap.m.Table` and the other `sap.m.ListBase` controls.
#[derive(Debug)]
pub struct SapMList {
    items: SapMItems,
}

impl SapMList {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_M_LISTBASE])?;
        Ok(SapMList {
            items: SapMItems {
                cache: ContentCache::new(),
                get_items: &sap::SAP_M_LIST_GET_ITEMS,
                get_selected_items: &sap::SAP_M_LIST_GET_SELECTED_ITEMS,
                set_selected_item_by_id: &sap::SAP_M_LIST_SET_SELECTED_ITEM_BY_ID,
            },
        })
    }
}

impl ListSelectable for SapMList {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        load_items(component, self.items.get_items)
    }

    fn cache(&self) -> &ContentCache<Vec<Element>> {
        &self.items.cache
    }

    fn click_item(&self, component: &Component<'_>, item: &Element, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
        self.items.click_item(component, item, options, clicks)
    }

    fn verify_item_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        self.items.verify_item_selected(self, component, item)
    }
}

/// `sap.m.SelectList`, the list inside a `sap.m.Select` popup.
#[derive(Debug)]
pub struct SapSelectList {
    items: SapMItems,
}

impl SapSelectList {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_M_SELECTLIST])?;
        Ok(SapSelectList {
            items: SapMItems {
                cache: ContentCache::new(),
                get_items: &sap::SAP_M_SELECTLIST_GET_ITEMS,
                get_selected_items: &sap::SAP_M_SELECTLIST_GET_SELECTED_ITEMS,
                set_selected_item_by_id: &sap::SAP_M_SELECTLIST_SET_SELECTED_ITEM_BY_ID,
            },
        })
    }
}

impl ListSelectable for SapSelectList {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        load_items(component, self.items.get_items)
    }

    fn cache(&self) -> &ContentCache<Vec<Element>> {
        &self.items.cache
    }

    fn click_item(&self, component: &Component<'_>, item: &Element, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
        self.items.click_item(component, item, options, clicks)
    }

    fn verify_item_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        self.items.verify_item_selected(self, component, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::components::listview::ListView;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use crate::model::TextMatchingCriterion;
    use crate::webelement::WebElement;

    fn list_mock(class: &str) -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/l1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/l1/attribute/class", json!(class));
        // Items are found by id; anything else is the list being refreshed.
        mock.on(|r| {
            if r.method != RequestMethod::Post || !r.url.ends_with("/element") {
                return None;
            }
            let by_id = r.body.as_ref().and_then(|b| b["value"].as_str()).map_or(false, |v| v.starts_with("[id="));
            let id = if by_id { "we-item" } else { "l1" };
            Some(Ok(json!({ "value": element_json(id) })))
        });
        mock.on_request(RequestMethod::Get, "/element/we-item/displayed", json!(true));
        mock
    }

    #[test]
    fn test_listbox_selects_by_index_when_click_fails() {
        let mock = list_mock("sapUiLbx");
        mock.on_script("sap_objectIsInstanceof", json!(true));
        mock.on_script(
            "return sap_ui_commons_ListBox_getItems(",
            json!([{"id": "a", "label": "Apple"}, {"id": "b", "label": "Banana"}]),
        );
        mock.on_script("return sap_ui_commons_ListBox_getSelectedIndices(", json!([1]));
        mock.on_error(RequestMethod::Post, "/element/we-item/click", "element not interactable");
        let session = mock.session();
        let list = ListView::new(WebElement::new(&session, ElementId::from("l1"))).unwrap();

        let criterion = TextMatchingCriterion::new("Banana", false, 0);
        list.select_item(&criterion, true, &ClickOptions::new()).unwrap();

        let set = mock
            .requests()
            .into_iter()
            .filter_map(|r| r.body)
            .find(|b| b["script"].as_str().map_or(false, |s| s.contains("return sap_ui_commons_ListBox_setSelectedIndex(")))
            .unwrap();
        assert_eq!(set["args"][1], json!(1));
        assert_eq!(set["args"][0], element_json("l1"));

        list.verify_index_selection(1, true).unwrap();
        let err = list.verify_index_selection(0, true).unwrap_err();
        assert!(err.to_string().starts_with("VERIFICATION_FAIL"));
    }

    #[test]
    fn test_listbox_item_without_index() {
        let mock = list_mock("sapUiLbx");
        mock.on_script("sap_objectIsInstanceof", json!(true));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("l1"))).unwrap();
        let list = SapListBox::new(&component).unwrap();
        let item = Element::from_json(&json!({"id": "x", "label": "X"}));
        let err = list.click_item(&component, &item, &ClickOptions::new(), 1).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Item's index is invalid, cannot click.");
    }

    #[test]
    fn test_m_list_verifies_selected_items() {
        let mock = list_mock("sapMList sapMListBase");
        mock.on(|r| {
            let body = r.body.as_ref()?;
            let script = body["script"].as_str()?;
            if script.ends_with("return sap_objectIsInstanceof(arguments[0], arguments[1]);") {
                let listbase = body["args"][1].as_array()?.iter().any(|c| *c == CLASS_NAME_M_LISTBASE);
                return Some(Ok(json!({ "value": listbase })));
            }
            None
        });
        mock.on_script(
            "return sap_m_List_getItems(",
            json!([{"id": "a", "label": "Apple", "index": 0}, {"id": "b", "label": "Banana", "index": 1}]),
        );
        mock.on_script("return sap_m_List_getSelectedItems(", json!([{"id": "a", "label": "Apple", "index": 0}]));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("l1"))).unwrap();
        assert!(SapListBox::new(&component).is_err());
        let list = SapMList::new(&component).unwrap();

        let apple = list.matched_item(&component, &TextMatchingCriterion::new("Apple", false, 0)).unwrap();
        list.verify_item_selected(&component, &apple).unwrap();
        let banana = list.item_at(&component, 1).unwrap();
        assert!(list.verify_item_selected(&component, &banana).is_err());

        let item = Element::from_json(&json!({"label": "No id"}));
        let err = list.click_item(&component, &item, &ClickOptions::new(), 1).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Item's id is invalid, cannot click.");
    }
}
