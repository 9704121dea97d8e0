use std::fmt;

use log::{debug, warn};
use serde_json::Value;

use crate::common::command::By;
use crate::common::connection_common::{json_to_bool, json_to_string};
use crate::common::types::{ElementId, ElementRef};
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::session::WebDriverSession;
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

pub const PROPERTY_ID: &str = "id";
pub const PROPERTY_LABEL: &str = "label";
pub const PROPERTY_VALUE: &str = "value";
pub const PROPERTY_INDEX: &str = "index";
pub const PROPERTY_SELECTED: &str = "selected";
pub const PROPERTY_DISABLED: &str = "disabled";
pub const PROPERTY_EXPANDED: &str = "expanded";
pub const PROPERTY_SELECTABLE: &str = "selectable";
pub const PROPERTY_ICON: &str = "icon";
pub const PROPERTY_TEXTCONTENT: &str = "textContent";
pub const PROPERTY_CLASS: &str = "class";
pub const PROPERTY_VISIBLE: &str = "visible";
pub const PROPERTY_ELEMENT: &str = "element";

/// One item of a widget: a combo box option, a list item, a tree node or a
/// menu item.
///
/// Items come either from a script result (a JSON object using the
/// `PROPERTY_*` keys) or from a DOM element. Only the latter carries an
/// element reference, but an item with an `id` can always be located again
/// with [`Element::web_element`].
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub id: Option<String>,
    pub label: Option<String>,
    pub value: Option<String>,
    pub index: Option<i64>,
    pub selected: bool,
    pub disabled: bool,
    pub expanded: bool,
    pub selectable: bool,
    pub visible: bool,
    pub icon: Option<String>,
    pub text_content: Option<String>,
    pub class: Option<String>,
    pub tag: Option<String>,
    pub element_id: Option<ElementId>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|x| !x.is_empty())
}

impl Element {
    /// Build an item from a script result object.
    ///
    /// An item that is not flagged as selected still counts as selected when
    /// its css class mentions `selected` after the first character, which is
    /// how several toolkits mark the current item.
    pub fn from_json(value: &Value) -> Self {
        let class = json_to_string(&value[PROPERTY_CLASS]);
        let mut selected = json_to_bool(&value[PROPERTY_SELECTED]);
        if !selected {
            if let Some(c) = &class {
                selected = c.to_lowercase().find("selected").map(|p| p > 0).unwrap_or(false);
            }
        }

        Element {
            id: non_empty(json_to_string(&value[PROPERTY_ID])),
            label: json_to_string(&value[PROPERTY_LABEL]).map(|l| l.trim().to_string()),
            value: json_to_string(&value[PROPERTY_VALUE]),
            index: value[PROPERTY_INDEX].as_i64(),
            selected,
            disabled: json_to_bool(&value[PROPERTY_DISABLED]),
            expanded: json_to_bool(&value[PROPERTY_EXPANDED]),
            selectable: value[PROPERTY_SELECTABLE].as_bool().unwrap_or(true),
            visible: json_to_bool(&value[PROPERTY_VISIBLE]),
            icon: non_empty(json_to_string(&value[PROPERTY_ICON])),
            text_content: json_to_string(&value[PROPERTY_TEXTCONTENT]),
            class,
            tag: None,
            element_id: ElementRef::from_json(&value[PROPERTY_ELEMENT]),
        }
    }

    /// Build an item from a DOM element, reading its state through WebDriver.
    ///
    /// Individual reads that fail leave the field at its default; the item
    /// is still usable for matching by label.
    pub fn from_web_element(element: &WebElement<'_>) -> Self {
        let label = parse_web_element_text(element).map(|l| l.trim().to_string());
        let read_flag = |name: &str, r: WebDriverResult<bool>| match r {
            Ok(b) => b,
            Err(e) => {
                debug!("cannot read '{}' of {}: {}", name, element, e);
                false
            }
        };

        Element {
            id: non_empty(element.id().ok().flatten()),
            label,
            value: None,
            index: None,
            selected: read_flag("selected", element.is_selected()),
            disabled: !read_flag("enabled", element.is_enabled()),
            expanded: false,
            selectable: true,
            visible: read_flag("displayed", element.is_displayed()),
            icon: None,
            text_content: None,
            class: element.class_name().ok().flatten(),
            tag: element.tag_name().ok(),
            element_id: Some(element.element_id.clone()),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Whether `other` is the item this one describes: both share a
    /// non-empty id, or else the label and the tag, where present on `self`,
    /// agree. Fields missing from `self` match anything, so the relation is
    /// one-way.
    pub fn matches(&self, other: &Element) -> bool {
        if let Some(id) = &self.id {
            if other.id.as_ref() == Some(id) {
                return true;
            }
            warn!("ID does NOT equal! '{}' != '{}'", id, other.id());
        }

        let mut ok = true;
        if let Some(label) = self.label.as_ref().filter(|l| !l.is_empty()) {
            ok &= other.label.as_ref() == Some(label);
        }
        if let Some(tag) = self.tag.as_ref().filter(|t| !t.is_empty()) {
            ok &= other.tag.as_ref() == Some(tag);
        }
        ok
    }

    /// The DOM element for this item: the held reference, or a lookup by id.
    pub fn web_element<'a>(&self, session: &'a WebDriverSession) -> WebDriverResult<WebElement<'a>> {
        if let Some(element_id) = &self.element_id {
            return Ok(WebElement::new(session, element_id.clone()));
        }
        match &self.id {
            Some(id) => session.find_element(By::Id(id)),
            None => Err(WebDriverError::widget(
                ErrorCode::ObjectIsNull,
                format!("Cannot find the web element of '{}', its id is null.", self.label()),
            )),
        }
    }
}

/// The visible text of an element, falling back to its `textContent` when
/// the text is blank (for example when the element is scrolled out of view).
pub fn parse_web_element_text(element: &WebElement<'_>) -> Option<String> {
    match element.text() {
        Ok(text) if !text.trim().is_empty() => Some(text),
        _ => element.get_attribute(PROPERTY_TEXTCONTENT).ok().flatten(),
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={}; label={}",
            self.id.as_deref().unwrap_or("null"),
            self.label.as_deref().unwrap_or("null")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::http::mock_sync::MockDriverSync;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let item = Element::from_json(&json!({
            "id": "opt1",
            "label": "  Canada ",
            "value": "CA",
            "index": 2,
            "disabled": "false",
            "selected": true,
        }));
        assert_eq!(item.id(), "opt1");
        assert_eq!(item.label(), "Canada");
        assert_eq!(item.value.as_deref(), Some("CA"));
        assert_eq!(item.index, Some(2));
        assert!(item.selected);
        assert!(!item.disabled);
        assert_eq!(item.to_string(), "id=opt1; label=Canada");
    }

    #[test]
    fn test_selected_from_class() {
        let item = Element::from_json(&json!({"label": "a", "class": "sapMLIB sapMLIBSelected"}));
        assert!(item.selected);
        // A class that starts with "selected" does not count.
        let item = Element::from_json(&json!({"label": "a", "class": "selected"}));
        assert!(!item.selected);
    }

    #[test]
    fn test_matches() {
        let a = Element::from_json(&json!({"id": "x", "label": "One"}));
        let b = Element::from_json(&json!({"id": "x", "label": "Two"}));
        assert!(a.matches(&b) && b.matches(&a));

        let c = Element::from_json(&json!({"label": "One"}));
        let d = Element::from_json(&json!({"id": "y", "label": "One"}));
        assert!(c.matches(&d));
        // d has an id that c lacks, and then its tag-less label decides.
        assert!(d.matches(&c));
        let e = Element::from_json(&json!({"label": "Three"}));
        assert!(!c.matches(&e) && !e.matches(&c));

        let blank = Element::default();
        assert!(blank.matches(&e));
        assert!(!e.matches(&blank));
    }

    #[test]
    fn test_text_falls_back_to_text_content() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/li1/text", json!("  "));
        mock.on_request(
            RequestMethod::Get,
            "/element/li1/attribute/textContent",
            json!("Hidden item"),
        );
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("li1"));
        assert_eq!(parse_web_element_text(&elem).as_deref(), Some("Hidden item"));
    }

    #[test]
    fn test_web_element_by_id() {
        let mock = MockDriverSync::new();
        mock.on_request(
            RequestMethod::Post,
            "/element",
            crate::http::mock_sync::element_json("found"),
        );
        let session = mock.session();
        let item = Element::from_json(&json!({"id": "node-3", "label": "Node"}));
        let elem = item.web_element(&session).unwrap();
        assert_eq!(elem.element_id.to_string(), "found");

        let orphan = Element::from_json(&json!({"label": "Node"}));
        let err = orphan.web_element(&session).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ObjectIsNull));
    }
}
