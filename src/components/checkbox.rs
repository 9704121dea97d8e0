//! Check boxes: `<input type="checkbox">` and the SAP UI5 check boxes.
//!
//! Dojo's `dijit.form.CheckBox` renders a real checkbox input, so it is
//! driven as plain HTML.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::{json, Value};

use crate::component::{no_operable, Component, OperableCache};
use crate::components::{ensure_supported, unsupported_type};
use crate::domain::{Domain, ATTRIBUTE_TYPE, TAG_HTML_INPUT};
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::js::{self, sap};
use crate::webelement::WebElement;

pub const CLASS_NAME_CHECKBOX: &str = "sap.ui.commons.CheckBox";
pub const CLASS_NAME_M_CHECKBOX: &str = "sap.m.CheckBox";

const PROPERTY_CHECKED: &str = "checked";
const TYPE_CHECKBOX: &str = "checkbox";

pub trait Checkable: Send + Sync + fmt::Debug {
    fn is_checked(&self, component: &Component<'_>) -> WebDriverResult<bool>;

    /// Set the state through the page, for when a click did not take.
    fn set_checked_natively(&self, component: &Component<'_>, checked: bool) -> WebDriverResult<()>;

    /// Click the box if it is not in the wanted state, then fall back to
    /// setting it natively.
    fn set_checked(&self, component: &Component<'_>, checked: bool) -> WebDriverResult<()> {
        if self.is_checked(component)? == checked {
            return Ok(());
        }
        if let Err(e) = component.with_element(|e| e.click()) {
            warn!("Fail to click the check box. Met {}", e);
        }
        component.refresh(false);
        if self.is_checked(component)? != checked {
            debug!("clicking did not change the check box, setting it natively.");
            self.set_checked_natively(component, checked)?;
        }
        Ok(())
    }
}

fn property_failure(action: &str, e: WebDriverError) -> WebDriverError {
    error!("Met {}", e);
    WebDriverError::general(format!("Fail to {} value of property '{}'", action, PROPERTY_CHECKED))
}

/// `<input type="checkbox">`.
#[derive(Debug)]
pub struct HtmlCheckBox;

impl HtmlCheckBox {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        let element = component.element();
        let is_input = element.tag_name().map_or(false, |t| t.eq_ignore_ascii_case(TAG_HTML_INPUT));
        let is_checkbox = matches!(
            element.get_attribute(ATTRIBUTE_TYPE),
            Ok(Some(t)) if t.eq_ignore_ascii_case(TYPE_CHECKBOX)
        );
        if is_input && is_checkbox {
            Ok(HtmlCheckBox)
        } else {
            Err(unsupported_type(component))
        }
    }
}

impl Checkable for HtmlCheckBox {
    fn is_checked(&self, component: &Component<'_>) -> WebDriverResult<bool> {
        component.with_element(|e| e.is_selected())
    }

    fn set_checked_natively(&self, component: &Component<'_>, checked: bool) -> WebDriverResult<()> {
        component
            .with_element(|e| js::call_on(e, &js::HTML_SET_CHECKED, &[json!(checked)]))
            .map_err(|e| property_failure("set", e))?;
        component.refresh(false);
        Ok(())
    }
}

/// `sap.ui.commons.CheckBox` and `sap.m.CheckBox`.
#[derive(Debug)]
pub struct SapCheckBox;

impl SapCheckBox {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_CHECKBOX, CLASS_NAME_M_CHECKBOX])?;
        Ok(SapCheckBox)
    }
}

impl Checkable for SapCheckBox {
    /// The rendered input when there is one, otherwise the control itself.
    fn is_checked(&self, component: &Component<'_>) -> WebDriverResult<bool> {
        if let Ok(true) = component.element().is_selected() {
            return Ok(true);
        }
        let ret = component
            .with_element(|e| js::call_on(e, &sap::SAP_CHECKBOX_GET_CHECKED, &[]))
            .map_err(|e| property_failure("get", e))?;
        match ret.value() {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
            other => {
                warn!("Need to handle javascript result: {}", other);
                Err(WebDriverError::general(format!(
                    "Fail to get value of property '{}'",
                    PROPERTY_CHECKED
                )))
            }
        }
    }

    fn set_checked_natively(&self, component: &Component<'_>, checked: bool) -> WebDriverResult<()> {
        component
            .with_element(|e| js::call_on(e, &sap::SAP_CHECKBOX_SET_CHECKED, &[json!(checked)]))
            .map_err(|e| property_failure("set", e))?;
        component.refresh(true);
        Ok(())
    }
}

fn create_checkable(component: &Component<'_>) -> WebDriverResult<Arc<dyn Checkable>> {
    match Domain::detect(&component.element()) {
        Domain::Sap => match SapCheckBox::new(component) {
            Ok(c) => return Ok(Arc::new(c)),
            Err(e) => debug!("Cannot create a SAP CheckBox: {}", e),
        },
        Domain::Dojo => info!("Dojo check boxes are handled as HTML inputs."),
        Domain::Html => {}
    }
    match HtmlCheckBox::new(component) {
        Ok(c) => Ok(Arc::new(c)),
        Err(e) => {
            debug!("Cannot create an HTML CheckBox: {}", e);
            error!("Can not create a proper Checkable object.");
            Err(no_operable())
        }
    }
}

/// A check box that is checked, unchecked and read.
pub struct CheckBox<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn Checkable>,
}

impl<'a> fmt::Debug for CheckBox<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBox").field("component", &self.component).finish()
    }
}

impl<'a> CheckBox<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let check_box = CheckBox {
            component,
            operables: OperableCache::new(),
        };
        check_box.checkable()?;
        Ok(check_box)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn checkable(&self) -> WebDriverResult<Arc<dyn Checkable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_checkable(&self.component))
    }

    pub fn is_checked(&self) -> WebDriverResult<bool> {
        self.checkable()?.is_checked(&self.component)
    }

    /// Check the box and verify that it is checked.
    pub fn check(&self) -> WebDriverResult<()> {
        self.set(true, "Fail to check checkbox.", "Check box has not been checked.")
    }

    /// Uncheck the box and verify that it is not checked.
    pub fn uncheck(&self) -> WebDriverResult<()> {
        self.set(false, "Fail to uncheck checkbox.", "Check box is still checked.")
    }

    fn set(&self, checked: bool, failure: &str, unverified: &str) -> WebDriverResult<()> {
        let checkable = self.checkable()?;
        checkable.set_checked(&self.component, checked).map_err(|e| {
            error!("Met {}", e);
            WebDriverError::general(failure)
        })?;
        if checkable.is_checked(&self.component)? != checked {
            debug!("{}", unverified);
            return Err(WebDriverError::widget(ErrorCode::VerificationFail, unverified));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::MockDriverSync;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A check box `c1` whose state lives in `state`. Clicks toggle it only
    /// when `clicks_work` is set; the native setter always works.
    fn checkbox_mock(class: &str, tag: &str, state: Arc<AtomicBool>, clicks_work: bool) -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/c1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/c1/attribute/class", json!(class));
        mock.on_request(RequestMethod::Get, "/element/c1/name", json!(tag));
        mock.on_request(RequestMethod::Get, "/element/c1/attribute/type", json!("checkbox"));
        mock.on(move |r| {
            if r.method == RequestMethod::Get && r.url.ends_with("/element/c1/selected") {
                return Some(Ok(json!({ "value": state.load(Ordering::SeqCst) })));
            }
            if r.method == RequestMethod::Post && r.url.ends_with("/element/c1/click") {
                if clicks_work {
                    state.fetch_xor(true, Ordering::SeqCst);
                }
                return Some(Ok(json!({ "value": null })));
            }
            let body = r.body.as_ref()?;
            let script = body["script"].as_str()?;
            if script.contains("return html_setChecked(") || script.contains("return sap_ui_commons_CheckBox_setChecked(") {
                state.store(body["args"][1].as_bool()?, Ordering::SeqCst);
                return Some(Ok(json!({ "value": null })));
            }
            None
        });
        mock
    }

    #[test]
    fn test_html_check_by_click() {
        let state = Arc::new(AtomicBool::new(false));
        let mock = checkbox_mock("", "input", state.clone(), true);
        let session = mock.session();
        let check_box = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap();

        assert!(!check_box.is_checked().unwrap());
        check_box.check().unwrap();
        assert!(state.load(Ordering::SeqCst));
        check_box.check().unwrap();
        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/c1/click").len(), 1);
        assert!(mock.scripts().iter().all(|s| !s.contains("return html_setChecked(")));
    }

    #[test]
    fn test_html_sets_natively_when_click_does_not_take() {
        let state = Arc::new(AtomicBool::new(true));
        let mock = checkbox_mock("", "input", state.clone(), false);
        let session = mock.session();
        let check_box = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap();

        check_box.uncheck().unwrap();
        assert!(!state.load(Ordering::SeqCst));
        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/c1/click").len(), 1);
        let set = mock.scripts().iter().filter(|s| s.contains("return html_setChecked(")).count();
        assert_eq!(set, 1);
    }

    #[test]
    fn test_unverified_check() {
        let state = Arc::new(AtomicBool::new(false));
        let mock = checkbox_mock("", "input", state, false);
        mock.on_script("return html_setChecked(", json!(null));
        let session = mock.session();
        let check_box = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap();

        let err = check_box.check().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::VerificationFail));
        assert_eq!(err.to_string(), "VERIFICATION_FAIL: Check box has not been checked.");
    }

    #[test]
    fn test_failed_native_set() {
        let state = Arc::new(AtomicBool::new(false));
        let mock = checkbox_mock("", "input", state, false);
        mock.on_script_error("return html_setChecked(");
        let session = mock.session();
        let check_box = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap();

        let err = check_box.check().unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Fail to check checkbox.");
    }

    #[test]
    fn test_not_a_check_box() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/c1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/c1/name", json!("div"));
        let session = mock.session();
        let err = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ObjectIsNull));
    }

    #[test]
    fn test_sap_check_box_reads_control_state() {
        let state = Arc::new(AtomicBool::new(false));
        let mock = checkbox_mock("sapUiCb", "span", state.clone(), false);
        mock.on_script("sap_objectIsInstanceof", json!(true));
        let read = state.clone();
        mock.on(move |r| {
            let script = r.body.as_ref()?["script"].as_str()?;
            if !script.contains("return sap_ui_commons_CheckBox_getChecked(") {
                return None;
            }
            Some(Ok(json!({ "value": read.load(Ordering::SeqCst).to_string() })))
        });
        // The span itself never reports as selected.
        mock.on_request(RequestMethod::Get, "/element/c1/selected", json!(false));
        let session = mock.session();
        let check_box = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap();

        check_box.check().unwrap();
        assert!(state.load(Ordering::SeqCst));
        assert!(check_box.is_checked().unwrap());
        let set = mock.scripts().iter().filter(|s| s.contains("return sap_ui_commons_CheckBox_setChecked(")).count();
        assert_eq!(set, 1);
    }

    #[test]
    fn test_sap_state_unreadable() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/c1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/c1/attribute/class", json!("sapMCb"));
        mock.on_script("sap_objectIsInstanceof", json!(true));
        let session = mock.session();
        let check_box = CheckBox::new(WebElement::new(&session, ElementId::from("c1"))).unwrap();

        let err = check_box.is_checked().unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Fail to get value of property 'checked'");
    }
}
