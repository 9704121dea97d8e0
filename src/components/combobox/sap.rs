use log::debug;
use serde_json::json;

use crate::common::keys::Keys;
use crate::component::Component;
use crate::components::combobox::{deselect_all_unsupported, select_scripted, Selectable};
use crate::components::ensure_supported;
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::js::{self, sap};
use crate::model::{parse_items, Element};

pub const SUPPORTED_CLASSES: [&str; 3] = ["sap.ui.commons.ComboBox", "sap.m.Select", "sap.m.ComboBoxBase"];

/// Operates SAP UI5 combo boxes and selects through the control's API.
#[derive(Debug)]
pub struct SapSelect;

impl SapSelect {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &SUPPORTED_CLASSES)?;
        Ok(SapSelect)
    }

    fn set_selected_key(&self, component: &Component<'_>, option: &Element) -> WebDriverResult<()> {
        let key = option.value.clone().unwrap_or_default();
        debug!("Selecting SAP option '{}' by key '{}'", option.label(), key);
        js::call_on(&component.element(), &sap::SAP_COMBOBOX_SET_SELECTED_KEY, &[json!(key)])?;
        Ok(())
    }
}

impl Selectable for SapSelect {
    fn is_multiple(&self) -> bool {
        false
    }

    fn options(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        let ret = component.with_element(|e| js::call_on(e, &sap::SAP_COMBOBOX_GET_ITEMS, &[]))?;
        Ok(parse_items(ret.value()))
    }

    fn select_by_visible_text(&self, component: &Component<'_>, text: &str) -> WebDriverResult<()> {
        let options = self.options(component)?;
        select_scripted(
            component,
            &options,
            |o| o.label() == text,
            format!("Cannot locate element with text: {}", text),
            |o| self.set_selected_key(component, o),
        )
    }

    fn select_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<()> {
        let options = self.options(component)?;
        select_scripted(
            component,
            &options,
            |o| o.index == Some(index),
            format!("Cannot locate option with index: {}", index),
            |o| self.set_selected_key(component, o),
        )
    }

    fn select_by_value(&self, component: &Component<'_>, value: &str) -> WebDriverResult<()> {
        let options = self.options(component)?;
        select_scripted(
            component,
            &options,
            |o| o.value.as_deref() == Some(value),
            format!("Cannot locate option with value: {}", value),
            |o| self.set_selected_key(component, o),
        )
    }

    fn deselect_all(&self, _component: &Component<'_>) -> WebDriverResult<()> {
        Err(deselect_all_unsupported(self.is_multiple()))
    }

    fn deselect_by_value(&self, _component: &Component<'_>, _value: &str) -> WebDriverResult<()> {
        Err(WebDriverError::not_supported())
    }

    fn deselect_by_index(&self, _component: &Component<'_>, _index: i64) -> WebDriverResult<()> {
        Err(WebDriverError::not_supported())
    }

    fn deselect_by_visible_text(&self, _component: &Component<'_>, _text: &str) -> WebDriverResult<()> {
        Err(WebDriverError::not_supported())
    }

    fn hide_popup(&self, component: &Component<'_>) -> WebDriverResult<()> {
        component.element().send_keys(Keys::Escape).map_err(|e| {
            debug!("Met {}", e);
            WebDriverError::widget(ErrorCode::FailClosePopup, "Fail to hide the combo-box's popup.")
        })
    }

    /// Clicks the drop-down arrow, a square at the right end of the box.
    fn show_popup(&self, component: &Component<'_>) -> WebDriverResult<()> {
        let element = component.element();
        let opened = element.send_keys(Keys::Escape).and_then(|_| element.rect()).and_then(|rect| {
            let x = (rect.width - rect.height / 2.0) as i64;
            let y = (rect.height / 2.0) as i64;
            element.click_at(x, y)
        });
        opened.map_err(|e| {
            debug!("Met {}", e);
            WebDriverError::widget(ErrorCode::FailOpenPopup, "Fail to show the combo-box's popup.")
        })
    }
}
