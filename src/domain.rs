//! Detect which toolkit renders a DOM element.
//!
//! Dojo is checked first, then SAP UI5, and plain HTML is the fallback.

use std::fmt;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::common::scriptargs::ScriptArgs;
use crate::error::WebDriverResult;
use crate::js::{self, dojo, sap};
use crate::webelement::WebElement;

pub const CSS_CLASS_SAP_PREFIX: &str = "sap";
pub const CSS_CLASS_DOJO_DIJIT_PREFIX: &str = "dijit";
pub const ATTRIBUTE_WIDGETID: &str = "widgetid";
pub const ATTRIBUTE_TYPE: &str = "type";
pub const TAG_HTML_INPUT: &str = "input";

/// The toolkit behind a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Dojo,
    Sap,
    Html,
}

impl Domain {
    pub fn detect(element: &WebElement<'_>) -> Domain {
        if is_dojo_domain(element) {
            Domain::Dojo
        } else if is_sap_domain(element) {
            Domain::Sap
        } else {
            Domain::Html
        }
    }

    /// Whether `element` is one of `class_names` in this toolkit's terms.
    pub fn supports(&self, element: &WebElement<'_>, class_names: &[&str]) -> bool {
        match self {
            Domain::Dojo => dojo_is_supported(element, class_names),
            Domain::Sap => sap_is_supported(element, class_names),
            Domain::Html => html_is_supported(element, class_names),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Domain::Dojo => "DOJO",
            Domain::Sap => "SAP",
            Domain::Html => "HTML",
        };
        f.write_str(s)
    }
}

/// Whether `element` is any of `class_names` in any toolkit it may belong
/// to, trying Dojo, then SAP, then plain HTML.
pub fn is_supported(element: &WebElement<'_>, class_names: &[&str]) -> bool {
    (is_dojo_domain(element) && dojo_is_supported(element, class_names))
        || (is_sap_domain(element) && sap_is_supported(element, class_names))
        || html_is_supported(element, class_names)
}

fn has_class_with_prefix(element: &WebElement<'_>, prefix: &str) -> bool {
    match element.class_name() {
        Ok(Some(class)) => class.split_whitespace().any(|c| c.starts_with(prefix)),
        Ok(None) => false,
        Err(e) => {
            debug!("cannot read the class of {}: {}", element, e);
            false
        }
    }
}

pub fn is_sap_domain(element: &WebElement<'_>) -> bool {
    if has_class_with_prefix(element, CSS_CLASS_SAP_PREFIX) {
        return true;
    }
    warn!("{}: css class is not a SAP one, trying the UI5 class names", element);
    match sap_class_names(element) {
        Ok(names) => names.iter().any(|n| n.starts_with(CSS_CLASS_SAP_PREFIX)),
        Err(e) => {
            warn!("fail to get native class names: {}", e);
            false
        }
    }
}

pub fn is_dojo_domain(element: &WebElement<'_>) -> bool {
    has_class_with_prefix(element, CSS_CLASS_DOJO_DIJIT_PREFIX)
        && matches!(element.get_attribute(ATTRIBUTE_WIDGETID), Ok(Some(_)))
}

/// The names an HTML element answers to: its class attribute, the type of
/// an `input`, and its tag.
pub fn html_class_names(element: &WebElement<'_>) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(Some(class)) = element.class_name() {
        names.push(class);
    }
    let tag = element.tag_name().ok();
    if let Some(tag) = &tag {
        if tag.eq_ignore_ascii_case(TAG_HTML_INPUT) {
            if let Ok(Some(t)) = element.get_attribute(ATTRIBUTE_TYPE) {
                names.push(t);
            }
        }
    } else {
        warn!("cannot get the tag name of {}", element);
    }
    names.extend(tag);
    names
}

pub fn html_is_supported(element: &WebElement<'_>, class_names: &[&str]) -> bool {
    let actual = html_class_names(element);
    class_names.iter().any(|wanted| actual.iter().any(|a| a.eq_ignore_ascii_case(wanted)))
}

/// UI5 metadata class names of the control with this element's id, most
/// derived first.
pub fn sap_class_names(element: &WebElement<'_>) -> WebDriverResult<Vec<String>> {
    let id = element.id()?.unwrap_or_default();
    let mut args = ScriptArgs::new();
    args.push(&id)?;
    let ret = js::call(element.session(), &sap::GET_SAP_CLASS_NAMES_BY_ID, &args)?;
    if ret.value().is_null() {
        return Ok(Vec::new());
    }
    ret.convert()
}

pub fn sap_class_name(element: &WebElement<'_>) -> WebDriverResult<Option<String>> {
    let id = element.id()?.unwrap_or_default();
    let mut args = ScriptArgs::new();
    args.push(&id)?;
    let ret = js::call(element.session(), &sap::GET_SAP_CLASS_NAME_BY_ID, &args)?;
    Ok(ret.value().as_str().map(|s| s.to_string()))
}

pub fn dojo_class_name(element: &WebElement<'_>) -> WebDriverResult<Option<String>> {
    let ret = js::call_on(element, &dojo::GET_DOJO_CLASS_NAME, &[])?;
    Ok(ret.value().as_str().map(|s| s.to_string()))
}

/// A property of the Dojo widget behind `element`, `null` when unset.
pub fn dojo_get_property(element: &WebElement<'_>, property: &str) -> WebDriverResult<Value> {
    let ret = js::call_on(element, &dojo::DOJO_GET_PROPERTY, &[json!(property)])?;
    Ok(ret.value().clone())
}

fn instance_of(element: &WebElement<'_>, function: &js::JsFunction, class_names: &[&str]) -> Option<bool> {
    match js::call_on(element, function, &[json!(class_names)]) {
        Ok(ret) => ret.value().as_bool(),
        Err(e) => {
            debug!("{} failed: {}", function.name, e);
            None
        }
    }
}

/// Checked with `instanceof` in the page, falling back to comparing the
/// control's own class name.
pub fn sap_is_supported(element: &WebElement<'_>, class_names: &[&str]) -> bool {
    if let Some(b) = instance_of(element, &sap::SAP_OBJECT_IS_INSTANCEOF, class_names) {
        return b;
    }
    match sap_class_name(element) {
        Ok(Some(name)) => class_names.contains(&name.as_str()),
        Ok(None) => false,
        Err(e) => {
            debug!("Not supported: {}", e);
            false
        }
    }
}

pub fn dojo_is_supported(element: &WebElement<'_>, class_names: &[&str]) -> bool {
    if let Some(b) = instance_of(element, &dojo::DOJO_OBJECT_IS_INSTANCEOF, class_names) {
        return b;
    }
    match dojo_class_name(element) {
        Ok(Some(name)) => class_names.contains(&name.as_str()),
        Ok(None) => false,
        Err(e) => {
            debug!("Not supported: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::MockDriverSync;

    #[test]
    fn test_dojo_needs_widgetid() {
        let mock = MockDriverSync::new();
        mock.on_request(
            RequestMethod::Get,
            "/element/e1/attribute/class",
            json!("dijit dijitReset dijitSelect"),
        );
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        assert!(!is_dojo_domain(&elem));

        mock.on_request(RequestMethod::Get, "/element/e1/attribute/widgetid", json!("sel_1"));
        assert!(is_dojo_domain(&elem));
        assert_eq!(Domain::detect(&elem), Domain::Dojo);
    }

    #[test]
    fn test_sap_by_class_then_by_script() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e1/attribute/class", json!("foo sapUiLbx"));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        assert!(is_sap_domain(&elem));

        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e2/attribute/class", json!("plain"));
        mock.on_script("getSAPClassNamesById", json!(["sap.m.List", "sap.m.ListBase"]));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e2"));
        assert!(is_sap_domain(&elem));
    }

    #[test]
    fn test_html_supported_by_input_type() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e1/name", json!("INPUT"));
        mock.on_request(RequestMethod::Get, "/element/e1/attribute/type", json!("text"));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        assert_eq!(html_class_names(&elem), vec!["text".to_string(), "INPUT".to_string()]);
        assert!(html_is_supported(&elem, &["TEXT"]));
        assert!(!html_is_supported(&elem, &["select"]));
        assert_eq!(Domain::detect(&elem), Domain::Html);
    }

    #[test]
    fn test_sap_supported_falls_back_to_class_name() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e1/attribute/id", json!("lb1"));
        mock.on_script_error("sap_objectIsInstanceof");
        mock.on_script("getSAPClassNameById", json!("sap.ui.commons.ListBox"));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        assert!(sap_is_supported(&elem, &["sap.ui.commons.ListBox"]));
        assert!(!sap_is_supported(&elem, &["sap.m.List"]));
    }
}
