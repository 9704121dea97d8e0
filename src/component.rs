use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};

use crate::common::keys::{Keys, TypingData};
use crate::common::types::ElementId;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::model::aria::ATTRIBUTE_WAI_ROLE;
use crate::rs::{self, Recognition};
use crate::session::WebDriverSession;
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

pub const ATTRIBUTE_ID: &str = "id";
pub const ATTRIBUTE_CLASS: &str = "class";
pub const ATTRIBUTE_VALUE: &str = "value";
pub const ATTRIBUTE_MULTIPLE: &str = "multiple";
pub const ATTRIBUTE_INDEX: &str = "index";
pub const ATTRIBUTE_VISIBILITY: &str = "visibility";
pub const VALUE_VISIBILITY_HIDDEN: &str = "hidden";
pub const ATTRIBUTE_WIDGETID: &str = "widgetid";
pub const ATTRIBUTE_DIJITPOPUPPARENT: &str = "dijitpopupparent";
pub const TAG_HTML_SELECT: &str = "select";

/// Properties read, in order, to get the text value of an edit box.
pub const TEXT_VALUE_ATTRIBUTES: [&str; 3] = ["value", "text", "placeholder"];

/// The attributes of a component's element, re-read after every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFields {
    pub id: Option<String>,
    pub class: Option<String>,
    pub tag: Option<String>,
    pub widgetid: Option<String>,
    pub dijitpopupparent: Option<String>,
    pub role: Option<String>,
}

impl ComponentFields {
    fn read(element: &WebElement<'_>) -> Self {
        let attr = |name: &str| match element.get_attribute(name) {
            Ok(v) => v,
            Err(e) => {
                debug!("cannot read '{}' of {}: {}", name, element, e);
                None
            }
        };
        ComponentFields {
            id: attr(ATTRIBUTE_ID),
            class: attr(ATTRIBUTE_CLASS),
            tag: element.tag_name().ok(),
            widgetid: attr(ATTRIBUTE_WIDGETID),
            dijitpopupparent: attr(ATTRIBUTE_DIJITPOPUPPARENT),
            role: attr(ATTRIBUTE_WAI_ROLE),
        }
    }
}

/// Options for [`Component::with_options`].
#[derive(Debug, Clone, Default)]
pub struct ComponentOptions<'a> {
    /// Where to look first when the element has to be found again.
    pub search_context: Option<WebElement<'a>>,
    /// Recognition strings tried first when the element has to be found again.
    pub recognitions: Vec<Recognition>,
    /// Accept an element that is not displayed.
    pub permit_invisible: bool,
}

/// A widget's DOM element that can find itself again after the page
/// re-renders it.
///
/// A stale element is located again using the recognition strings, then the
/// element's `id`, then a `tag[class='...']` selector. Each locator is tried
/// in the search context before the whole document.
pub struct Component<'a> {
    session: &'a WebDriverSession,
    element: RefCell<WebElement<'a>>,
    fields: RefCell<ComponentFields>,
    search_context: Option<WebElement<'a>>,
    recognitions: Vec<Recognition>,
}

impl<'a> fmt::Debug for Component<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("element", &self.element.borrow().element_id)
            .field("fields", &*self.fields.borrow())
            .finish()
    }
}

/// Whether a WebDriver call on this element reports it as stale.
pub fn is_stale(element: &WebElement<'_>) -> bool {
    matches!(element.is_enabled(), Err(e) if e.is_stale())
}

/// `is_displayed()`, or when that says no, a `visibility` other than hidden.
/// A stale element is never visible.
pub fn is_visible(element: &WebElement<'_>) -> bool {
    match element.is_displayed() {
        Ok(true) => return true,
        Err(e) if e.is_stale() => return false,
        Err(e) => warn!("cannot check if {} is displayed: {}", element, e),
        Ok(false) => {}
    }
    match element.get_css_property(ATTRIBUTE_VISIBILITY) {
        Ok(v) => {
            debug!("visibility is '{}'", v);
            !v.is_empty() && !v.eq_ignore_ascii_case(VALUE_VISIBILITY_HIDDEN)
        }
        Err(e) => {
            warn!("Fail to check property '{}': {}", ATTRIBUTE_VISIBILITY, e);
            false
        }
    }
}

impl<'a> Component<'a> {
    /// Wrap a visible element.
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::with_options(element, ComponentOptions::default())
    }

    pub fn with_options(element: WebElement<'a>, options: ComponentOptions<'a>) -> WebDriverResult<Self> {
        if !is_visible(&element) {
            let msg = "The web element is NOT visible! You should not operate it.";
            warn!("{}", msg);
            if !options.permit_invisible {
                return Err(WebDriverError::widget(ErrorCode::ObjectIsInvisible, msg));
            }
            debug!("Invisible component allowed.");
        }

        let fields = ComponentFields::read(&element);
        Ok(Component {
            session: element.session(),
            element: RefCell::new(element),
            fields: RefCell::new(fields),
            search_context: options.search_context,
            recognitions: options.recognitions,
        })
    }

    pub fn session(&self) -> &'a WebDriverSession {
        self.session
    }

    /// The current element. This changes after a successful refresh.
    pub fn element(&self) -> WebElement<'a> {
        self.element.borrow().clone()
    }

    pub fn element_id(&self) -> ElementId {
        self.element.borrow().element_id.clone()
    }

    pub fn fields(&self) -> Ref<'_, ComponentFields> {
        self.fields.borrow()
    }

    pub fn id(&self) -> Option<String> {
        self.fields.borrow().id.clone()
    }

    pub fn class(&self) -> Option<String> {
        self.fields.borrow().class.clone()
    }

    pub fn tag(&self) -> Option<String> {
        self.fields.borrow().tag.clone()
    }

    pub fn widgetid(&self) -> Option<String> {
        self.fields.borrow().widgetid.clone()
    }

    pub fn dijitpopupparent(&self) -> Option<String> {
        self.fields.borrow().dijitpopupparent.clone()
    }

    pub fn role(&self) -> Option<String> {
        self.fields.borrow().role.clone()
    }

    /// Accessible components carry a WAI-ARIA role.
    pub fn is_accessible(&self) -> bool {
        self.fields.borrow().role.is_some()
    }

    /// Find the element again. Unless `force` is set this only happens when
    /// the current element is stale. Returns whether a new element is in use.
    pub fn refresh(&self, force: bool) -> bool {
        if !force && !is_stale(&self.element.borrow()) {
            return false;
        }

        let fields = self.fields.borrow().clone();
        let mut candidates: Vec<Recognition> = self.recognitions.clone();
        if let Some(id) = fields.id.as_ref().filter(|id| !id.trim().is_empty()) {
            candidates.push(Recognition::Id(id.clone()));
        }
        if let Some(class) = &fields.class {
            let tag = fields.tag.clone().unwrap_or_default();
            candidates.push(Recognition::Css(rs::css::from(&tag, class)));
        }

        for recognition in &candidates {
            if let Some(fresh) = self.search(recognition) {
                let new_fields = ComponentFields::read(&fresh);
                *self.element.borrow_mut() = fresh;
                *self.fields.borrow_mut() = new_fields;
                return true;
            }
        }
        warn!("Fail to refresh the embedded web element.");
        false
    }

    fn search(&self, recognition: &Recognition) -> Option<WebElement<'a>> {
        let (kind, query) = recognition.to_selector();
        if let Some(context) = &self.search_context {
            match context.find_element(kind.by(&query)) {
                Ok(e) => return Some(e),
                Err(e) => debug!("cannot find {} in the search context: {}", recognition, e),
            }
        }
        match self.session.find_element(kind.by(&query)) {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("cannot find {}: {}", recognition, e);
                None
            }
        }
    }

    /// Read an attribute, refreshing once if the element went stale.
    pub fn get_attribute(&self, name: &str) -> WebDriverResult<Option<String>> {
        let first = self.element().get_attribute(name);
        match first {
            Err(e) if e.is_stale() => {
                warn!("WebElement is stale, refresh it.");
                self.refresh(true);
                self.element().get_attribute(name)
            }
            other => other,
        }
    }

    /// Run `f` on the element, refreshing and retrying once when it is stale.
    pub fn with_element<R, F>(&self, f: F) -> WebDriverResult<R>
    where
        F: Fn(&WebElement<'a>) -> WebDriverResult<R>,
    {
        match f(&self.element()) {
            Err(e) if e.is_stale() => {
                warn!("Met {}", e);
                self.refresh(true);
                f(&self.element())
            }
            other => other,
        }
    }

    /// The text value of an edit box: the first of the `value`, `text` and
    /// `placeholder` properties that is present.
    pub fn value(&self) -> String {
        self.refresh(false);
        let element = self.element();
        for name in TEXT_VALUE_ATTRIBUTES.iter() {
            if let Ok(Some(v)) = element.get_property(name) {
                return v;
            }
        }
        String::new()
    }

    /// Empty an edit box.
    ///
    /// WebDriver's clear is tried first, then Ctrl+A Delete as keys and as an
    /// action. Whatever happened, Ctrl+A Delete is sent once more and any
    /// text still left is deleted character by character.
    pub fn clear_box(&self, lib_name: &str) -> WebDriverResult<()> {
        match self.with_element(|e| e.clear()) {
            Ok(()) => {
                self.refresh(false);
            }
            Err(e) if e.is_no_such_element() => {
                debug!("Object not found: {}", e);
                return Err(WebDriverError::general(format!("{} object not found", lib_name)));
            }
            Err(e) => {
                debug!("Met {}", e);
                self.refresh(false);
                let select_all = Keys::Control + "a" + Keys::Delete;
                if let Err(x) = self.element().send_keys(select_all.clone()) {
                    debug!("Met {}", x);
                    self.refresh(false);
                    let element = self.element();
                    let performed = self
                        .session
                        .action_chain()
                        .click_element(&element)
                        .key_down(Keys::Control)
                        .send_keys("a")
                        .key_up(Keys::Control)
                        .send_keys(Keys::Delete)
                        .perform();
                    if let Err(ex) = performed {
                        warn!("{} clear action failed, Met {}", lib_name, ex);
                    }
                }
            }
        }

        debug!("Finally use (Ctrl+A Delete) to clear again.");
        self.element().send_keys(TypingData::from_keystrokes("^a{Delete}")?)?;
        let text = self.value();
        if !text.is_empty() {
            let repeat = text.chars().count();
            warn!(
                "The component's text value '{}' is still not empty, use {} times of Delete + Backspace to clear again.",
                text, repeat
            );
            let element = self.element();
            element.send_keys(TypingData::from_keystrokes(&format!("{{Delete {}}}", repeat))?)?;
            element.send_keys(TypingData::from_keystrokes(&format!("{{Backspace {}}}", repeat))?)?;
        }
        Ok(())
    }

    /// Type `text` as plain characters.
    pub fn input_chars(&self, lib_name: &str, text: &str) -> WebDriverResult<()> {
        self.input(lib_name, text, TypingData::from(text))
    }

    /// Type `text` as keystrokes, e.g. `^a{Delete}Hello{Enter}`.
    pub fn input_keys(&self, lib_name: &str, text: &str) -> WebDriverResult<()> {
        let keys = TypingData::from_keystrokes(text)?;
        self.input(lib_name, text, keys)
    }

    fn input(&self, lib_name: &str, text: &str, keys: TypingData) -> WebDriverResult<()> {
        let failed = |e: &WebDriverError| {
            format!("{} enter action failed(input value = {}): caused by {}", lib_name, text, e)
        };
        if let Err(e) = self.element().send_keys(keys.clone()) {
            debug!("{}", failed(&e));
            self.refresh(true);
            if let Err(e) = self.element().send_keys(keys) {
                let msg = failed(&e);
                debug!("{}", msg);
                return Err(WebDriverError::general(msg));
            }
        }
        Ok(())
    }

    /// Compare the box's value with `expected`, trying once more after a
    /// second if it differs.
    pub fn verify_box(&self, lib_name: &str, expected: &str) -> bool {
        let mut contents = self.value();
        if contents == expected {
            return true;
        }
        debug!("Tried another time to get text value and verify.");
        thread::sleep(Duration::from_secs(1));
        contents = self.value();
        if contents == expected {
            return true;
        }
        debug!(
            "{}Box verify errors: property:\n'{}' does NOT equal to expected value:\n'{}'.",
            lib_name, contents, expected
        );
        false
    }
}

/// One operable strategy per element, created on first use.
///
/// A refreshed component has a new element and therefore gets a new
/// strategy.
pub struct OperableCache<O: ?Sized> {
    objects: Mutex<HashMap<ElementId, Arc<O>>>,
}

impl<O: ?Sized> Default for OperableCache<O> {
    fn default() -> Self {
        OperableCache {
            objects: Mutex::new(HashMap::new()),
        }
    }
}

impl<O: ?Sized> fmt::Debug for OperableCache<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperableCache {{ len: {} }}", self.len())
    }
}

impl<O: ?Sized> OperableCache<O> {
    pub fn new() -> Self {
        OperableCache::default()
    }

    /// The strategy for `key`, calling `create` if there is none yet.
    pub fn get_or_create<F>(&self, key: &ElementId, create: F) -> WebDriverResult<Arc<O>>
    where
        F: FnOnce() -> WebDriverResult<Arc<O>>,
    {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(o) = objects.get(key) {
            return Ok(o.clone());
        }
        let created = create().map_err(|e| {
            error!("The Operable object is null! {}", e);
            e
        })?;
        objects.insert(key.clone(), created.clone());
        Ok(created)
    }

    pub fn clear(&self) {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Failure when no strategy fits the element.
pub fn no_operable() -> WebDriverError {
    WebDriverError::widget(ErrorCode::ObjectIsNull, "Can not create a proper Operable object.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use serde_json::json;

    fn displayed(mock: &MockDriverSync, id: &str) {
        mock.on_request(RequestMethod::Get, &format!("/element/{}/displayed", id), json!(true));
    }

    #[test]
    fn test_invisible_rejected() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e1/displayed", json!(false));
        mock.on_request(RequestMethod::Get, "/element/e1/css/visibility", json!("hidden"));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        let err = Component::new(elem.clone()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ObjectIsInvisible));

        let options = ComponentOptions {
            permit_invisible: true,
            ..Default::default()
        };
        assert!(Component::with_options(elem, options).is_ok());
    }

    #[test]
    fn test_refresh_by_id_when_stale() {
        let mock = MockDriverSync::new();
        displayed(&mock, "old");
        mock.on_request(RequestMethod::Get, "/element/old/attribute/id", json!("country"));
        mock.on_request(RequestMethod::Get, "/element/old/name", json!("select"));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("old"))).unwrap();
        assert_eq!(component.id().as_deref(), Some("country"));

        // Not stale: nothing happens.
        assert!(!component.refresh(false));

        mock.on_error(RequestMethod::Get, "/element/old/enabled", "stale element reference");
        mock.on_request(RequestMethod::Post, "/element", element_json("new"));
        mock.on_request(RequestMethod::Get, "/element/new/attribute/id", json!("country"));
        assert!(component.refresh(false));
        assert_eq!(component.element_id().to_string(), "new");

        let finds = mock.requests_to(RequestMethod::Post, "/element");
        assert_eq!(finds.len(), 1);
        assert_eq!(finds[0].body.as_ref().unwrap()["using"], json!("css selector"));
    }

    #[test]
    fn test_get_attribute_retries_after_stale() {
        let mock = MockDriverSync::new();
        displayed(&mock, "old");
        mock.on_request(RequestMethod::Get, "/element/old/attribute/id", json!("box"));
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("old"))).unwrap();

        mock.on_error(RequestMethod::Get, "/element/old/attribute/title", "stale element reference");
        mock.on_error(RequestMethod::Get, "/element/old/enabled", "stale element reference");
        mock.on_request(RequestMethod::Post, "/element", element_json("new"));
        mock.on_request(RequestMethod::Get, "/element/new/attribute/title", json!("Hello"));
        assert_eq!(component.get_attribute("title").unwrap().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_operable_cache() {
        let cache: OperableCache<String> = OperableCache::new();
        let key = ElementId::from("e1");
        let a = cache.get_or_create(&key, || Ok(Arc::new("first".to_string()))).unwrap();
        let b = cache.get_or_create(&key, || Ok(Arc::new("second".to_string()))).unwrap();
        assert_eq!(*a, "first");
        assert!(Arc::ptr_eq(&a, &b));

        let err = cache.get_or_create(&ElementId::from("e2"), || Err(no_operable())).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ObjectIsNull));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_input_failure_message() {
        let mock = MockDriverSync::new();
        displayed(&mock, "e1");
        mock.on_error(RequestMethod::Post, "/element/e1/value", "element not interactable");
        let session = mock.session();
        let component = Component::new(WebElement::new(&session, ElementId::from("e1"))).unwrap();
        let err = component.input_chars("EditBox", "abc").unwrap_err();
        assert!(err.to_string().contains("EditBox enter action failed(input value = abc)"));
    }
}
