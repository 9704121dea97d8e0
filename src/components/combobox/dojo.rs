use std::fmt;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::common::command::By;
use crate::component::{Component, ATTRIBUTE_WIDGETID};
use crate::components::combobox::{deselect_all_unsupported, select_scripted, Selectable};
use crate::domain::{self, Domain};
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::js::{self, dojo};
use crate::model::{parse_items, Element};
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

/// The Dojo widgets a [`DojoSelect`] can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DojoSelectKind {
    ComboBox,
    FilteringSelect,
    Select,
}

impl DojoSelectKind {
    /// In the order they are tried.
    pub const ALL: [DojoSelectKind; 3] =
        [DojoSelectKind::ComboBox, DojoSelectKind::FilteringSelect, DojoSelectKind::Select];

    pub fn class_name(&self) -> &'static str {
        match self {
            DojoSelectKind::ComboBox => "dijit.form.ComboBox",
            DojoSelectKind::FilteringSelect => "dijit.form.FilteringSelect",
            DojoSelectKind::Select => "dijit.form.Select",
        }
    }

    /// The widget's root css class and tag, for pages where the Dojo class
    /// cannot be read.
    fn fallback(&self) -> (&'static str, &'static str) {
        match self {
            DojoSelectKind::ComboBox => ("dijit dijitReset dijitInline dijitLeft dijitTextBox dijitComboBox", "div"),
            DojoSelectKind::FilteringSelect => {
                ("dijit dijitReset dijitInline dijitLeft dijitTextBox dijitComboBox", "div")
            }
            DojoSelectKind::Select => ("dijit dijitReset dijitInline dijitLeft dijitDownArrowButton dijitSelect", "table"),
        }
    }

    /// Store-backed widgets select by setting `item`, the others by `value`.
    fn uses_store(&self) -> bool {
        !matches!(self, DojoSelectKind::Select)
    }
}

impl fmt::Display for DojoSelectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Operates a Dojo select-like widget through its widget object.
#[derive(Debug)]
pub struct DojoSelect {
    kind: DojoSelectKind,
    multiple: bool,
}

impl DojoSelect {
    pub fn new(component: &Component<'_>, kind: DojoSelectKind) -> WebDriverResult<Self> {
        let element = component.element();
        let supported = Domain::Dojo.supports(&element, &[kind.class_name()]) || {
            let (class, tag) = kind.fallback();
            component.class().as_deref() == Some(class)
                && component.tag().map_or(false, |t| t.eq_ignore_ascii_case(tag))
        };
        if !supported {
            debug!("Supported {} classes: {}", Domain::Dojo, kind);
            return Err(crate::components::unsupported_type(component));
        }
        let multiple = match domain::dojo_get_property(&element, "multiple") {
            Ok(v) => v.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Met {}", e);
                false
            }
        };
        Ok(DojoSelect {
            kind,
            multiple,
        })
    }

    pub fn kind(&self) -> DojoSelectKind {
        self.kind
    }

    fn set(&self, component: &Component<'_>, property: &str, value: Value) -> WebDriverResult<()> {
        js::call_on(&component.element(), &dojo::WIDGET_BASE_SET, &[json!(property), value])?;
        Ok(())
    }

    fn select_option(&self, component: &Component<'_>, option: &Element) -> WebDriverResult<()> {
        if self.kind.uses_store() {
            let id = option.id.clone().or_else(|| option.value.clone());
            let item = json!({"id": id, "value": option.value, "name": option.label});
            self.set(component, "item", item)
        } else {
            self.set(component, "value", json!(option.value))
        }
    }

    /// The drop-down of the widget, looked up by its popup parent or by the
    /// `<widgetid>_menu` / `<widgetid>_popup` naming convention.
    pub fn popup<'a>(&self, component: &Component<'a>) -> Option<WebElement<'a>> {
        let session = component.session();
        let first = |css: String| match session.find_elements(By::Css(&css)) {
            Ok(found) => found.into_iter().next(),
            Err(e) => {
                warn!("cannot find the popup by '{}': {}", css, e);
                None
            }
        };
        if let Some(parent) = component.dijitpopupparent() {
            if let Some(e) = first(format!("[{}='{}']", ATTRIBUTE_WIDGETID, parent)) {
                return Some(e);
            }
        }
        let wid = component.widgetid()?;
        first(format!("[{0}='{1}_menu'],[{0}='{1}_popup']", ATTRIBUTE_WIDGETID, wid))
    }
}

impl Selectable for DojoSelect {
    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn options(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        let ret = component.with_element(|e| {
            if self.kind.uses_store() {
                js::call_on(e, &dojo::STORE_QUERY, &[json!({}), json!({})])
            } else {
                js::call_on(e, &dojo::FORM_SELECT_WIDGET_GET_OPTIONS, &[])
            }
        })?;
        Ok(parse_items(ret.value()))
    }

    fn select_by_visible_text(&self, component: &Component<'_>, text: &str) -> WebDriverResult<()> {
        let options = self.options(component)?;
        select_scripted(
            component,
            &options,
            |o| o.label() == text,
            format!("Cannot locate element with text: {}", text),
            |o| self.select_option(component, o),
        )
    }

    fn select_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<()> {
        let options = self.options(component)?;
        select_scripted(
            component,
            &options,
            |o| o.index == Some(index),
            format!("Cannot locate option with index: {}", index),
            |o| self.select_option(component, o),
        )
    }

    fn select_by_value(&self, component: &Component<'_>, value: &str) -> WebDriverResult<()> {
        let options = self.options(component)?;
        select_scripted(
            component,
            &options,
            |o| o.value.as_deref() == Some(value),
            format!("Cannot locate option with value: {}", value),
            |o| self.select_option(component, o),
        )
    }

    fn deselect_all(&self, _component: &Component<'_>) -> WebDriverResult<()> {
        Err(deselect_all_unsupported(self.multiple))
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
        js::call_on(&component.element(), &dojo::HAS_DROP_DOWN_CLOSE, &[json!(true)]).map(|_| ()).map_err(|e| {
            debug!("Met {}", e);
            WebDriverError::widget(ErrorCode::FailClosePopup, "Fail to hide the combo-box's popup.")
        })
    }

    fn show_popup(&self, component: &Component<'_>) -> WebDriverResult<()> {
        let element = component.element();
        let opened = js::call_on(&element, &dojo::HAS_DROP_DOWN_IS_LOADED, &[]).and_then(|loaded| {
            if loaded.value().as_bool().unwrap_or(false) {
                js::call_on(&element, &dojo::HAS_DROP_DOWN_OPEN, &[])
            } else {
                js::call_on(&element, &dojo::HAS_DROP_DOWN_LOAD_AND_OPEN, &[])
            }
        });
        opened.map(|_| ()).map_err(|e| {
            debug!("Met {}", e);
            WebDriverError::widget(ErrorCode::FailOpenPopup, "Fail to show the combo-box's popup.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::MockDriverSync;

    fn dojo_mock(class_name: &'static str) -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/w1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/w1/attribute/class", json!("dijit dijitReset"));
        mock.on_request(RequestMethod::Get, "/element/w1/attribute/widgetid", json!("fruit"));
        mock.on(move |r| {
            let body = r.body.as_ref()?;
            let script = body["script"].as_str()?;
            if !script.ends_with("return dojo_objectIsInstanceof(arguments[0], arguments[1]);") {
                return None;
            }
            let matched = body["args"][1].as_array()?.iter().any(|c| c == class_name);
            Some(Ok(json!({ "value": matched })))
        });
        mock
    }

    fn script_calls(mock: &MockDriverSync, call: &str) -> Vec<Value> {
        mock.requests()
            .into_iter()
            .filter_map(|r| r.body)
            .filter(|b| b["script"].as_str().map_or(false, |s| s.contains(call)))
            .collect()
    }

    #[test]
    fn test_filtering_select_sets_item() {
        let mock = dojo_mock("dijit.form.FilteringSelect");
        mock.on_script(
            "return dojo_store_api_Store_query(",
            json!([
                {"id": "1", "label": "Apple", "value": "apple", "index": 0},
                {"id": "2", "label": "Pear", "value": "pear", "index": 1},
            ]),
        );
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("w1"))).unwrap();
        assert!(DojoSelect::new(&component, DojoSelectKind::ComboBox).is_err());
        let select = DojoSelect::new(&component, DojoSelectKind::FilteringSelect).unwrap();

        select.select_by_visible_text(&component, "Pear").unwrap();
        let calls = script_calls(&mock, "return dojo_dijit_WidgetBase_set(");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["args"][1], json!("item"));
        assert_eq!(calls[0]["args"][2], json!({"id": "2", "value": "pear", "name": "Pear"}));
    }

    #[test]
    fn test_select_sets_value_and_opens_popup() {
        let mock = dojo_mock("dijit.form.Select");
        mock.on_script(
            "return dojo_FormSelectWidget_getOptions(",
            json!([{"label": "Red", "value": "r", "selected": true}, {"label": "Blue", "value": "b"}]),
        );
        mock.on_script("return dojo_HasDropDown_isLoaded(", json!(false));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("w1"))).unwrap();
        let select = DojoSelect::new(&component, DojoSelectKind::Select).unwrap();
        assert_eq!(select.kind(), DojoSelectKind::Select);

        select.select_by_index(&component, 1).unwrap();
        let calls = script_calls(&mock, "return dojo_dijit_WidgetBase_set(");
        assert_eq!(calls[0]["args"][1], json!("value"));
        assert_eq!(calls[0]["args"][2], json!("b"));

        select.show_popup(&component).unwrap();
        assert_eq!(script_calls(&mock, "return dojo_HasDropDown_loadAndOpenDropDown(").len(), 1);
        assert!(script_calls(&mock, "return dojo_HasDropDown_openDropDown(").is_empty());
    }

    #[test]
    fn test_popup_by_widgetid_convention() {
        let mock = dojo_mock("dijit.form.Select");
        mock.on(|r| {
            let using = r.body.as_ref()?["value"].as_str()?;
            if r.url.ends_with("/elements") && using.contains("fruit_menu") {
                Some(Ok(json!({"value": [crate::http::mock_sync::element_json("pm")]})))
            } else {
                None
            }
        });
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("w1"))).unwrap();
        let select = DojoSelect::new(&component, DojoSelectKind::Select).unwrap();
        let popup = select.popup(&component).unwrap();
        assert_eq!(popup.element_id.to_string(), "pm");
    }
}
