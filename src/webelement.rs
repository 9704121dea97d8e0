use std::fmt;

use base64::decode;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::action_chain::ActionChain;
use crate::common::command::MAGIC_ELEMENTID;
use crate::js;
use crate::webdrivercommands::WebDriverCommands;
use crate::WebDriverSession;
use crate::{
    common::{
        command::Command,
        connection_common::convert_json,
        keys::TypingData,
        types::{ElementId, ElementRect, ElementRef},
    },
    error::WebDriverResult,
    By,
};

/// Unwrap the raw JSON into a WebElement struct.
pub fn convert_element_sync<'a>(
    session: &'a WebDriverSession,
    value: &serde_json::Value,
) -> WebDriverResult<WebElement<'a>> {
    let elem_id: ElementRef = serde_json::from_value(value.clone())?;
    Ok(WebElement::new(session, ElementId::from(elem_id.id)))
}

/// Unwrap the raw JSON into a Vec of WebElement structs.
pub fn convert_elements_sync<'a>(
    session: &'a WebDriverSession,
    value: &serde_json::Value,
) -> WebDriverResult<Vec<WebElement<'a>>> {
    let values: Vec<ElementRef> = serde_json::from_value(value.clone())?;
    Ok(values.into_iter().map(|x| WebElement::new(session, ElementId::from(x.id))).collect())
}

/// The WebElement struct encapsulates a single element on a page.
///
/// WebElement structs are generally not constructed manually, but rather
/// they are returned from a 'find_element()' operation using a WebDriver,
/// or from a script that returns DOM nodes.
///
/// # Example:
/// ```no_run
/// # use widgetdriver_sync::prelude::*;
/// #
/// # fn main() -> WebDriverResult<()> {
/// #     let caps = DesiredCapabilities::chrome();
/// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
/// let form = driver.find_element(By::Css("form[name='order']"))?;
/// let country = form.find_element(By::Tag("select"))?;
/// assert_eq!(country.tag_name()?, "select");
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebElement<'a> {
    pub element_id: ElementId,
    session: &'a WebDriverSession,
}

impl<'a> WebElement<'a> {
    /// Create a new WebElement struct.
    ///
    /// Typically you would not call this directly. WebElement structs are
    /// usually constructed by calling one of the find_element*() methods
    /// either on WebDriver or another WebElement.
    pub fn new(session: &'a WebDriverSession, element_id: ElementId) -> Self {
        WebElement {
            element_id,
            session,
        }
    }

    /// The session this element belongs to.
    pub fn session(&self) -> &'a WebDriverSession {
        self.session
    }

    ///Convenience wrapper for executing a WebDriver command.
    fn cmd(&self, command: Command) -> WebDriverResult<serde_json::Value> {
        self.session.cmd(command)
    }

    /// Get the bounding rectangle for this WebElement.
    pub fn rect(&self) -> WebDriverResult<ElementRect> {
        let v = self.cmd(Command::GetElementRect(self.element_id.clone()))?;
        let r: ElementRect = serde_json::from_value((&v["value"]).clone())?;
        Ok(r)
    }

    /// Get the tag name for this WebElement.
    pub fn tag_name(&self) -> WebDriverResult<String> {
        let v = self.cmd(Command::GetElementTagName(self.element_id.clone()))?;
        convert_json(&v["value"])
    }

    /// Get the class name for this WebElement.
    pub fn class_name(&self) -> WebDriverResult<Option<String>> {
        self.get_attribute("class")
    }

    /// Get the id for this WebElement.
    pub fn id(&self) -> WebDriverResult<Option<String>> {
        self.get_attribute("id")
    }

    /// Get the text contents for this WebElement.
    ///
    /// # Example:
    /// ```no_run
    /// # use widgetdriver_sync::prelude::*;
    /// #
    /// # fn main() -> WebDriverResult<()> {
    /// #     let caps = DesiredCapabilities::chrome();
    /// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
    /// let option = driver.find_element(By::XPath("//select[@id='country']/option[1]"))?;
    /// let text = option.text()?;
    /// #     Ok(())
    /// # }
    /// ```
    pub fn text(&self) -> WebDriverResult<String> {
        let v = self.cmd(Command::GetElementText(self.element_id.clone()))?;
        convert_json(&v["value"])
    }

    /// Convenience method for getting the (optional) value attribute of this element.
    pub fn value(&self) -> WebDriverResult<Option<String>> {
        self.get_attribute("value")
    }

    /// Click the WebElement.
    pub fn click(&self) -> WebDriverResult<()> {
        self.cmd(Command::ElementClick(self.element_id.clone()))?;
        Ok(())
    }

    /// Double-click the WebElement using the actions API.
    pub fn double_click(&self) -> WebDriverResult<()> {
        ActionChain::new(self.session).double_click_element(self).perform()
    }

    /// Click at an offset measured from the top-left corner of the element.
    pub fn click_at(&self, x: i64, y: i64) -> WebDriverResult<()> {
        let rect = self.rect()?;
        let dx = x - (rect.width / 2.0) as i64;
        let dy = y - (rect.height / 2.0) as i64;
        ActionChain::new(self.session).move_to_element_with_offset(self, dx, dy).click().perform()
    }

    /// Clear the WebElement contents.
    pub fn clear(&self) -> WebDriverResult<()> {
        self.cmd(Command::ElementClear(self.element_id.clone()))?;
        Ok(())
    }

    /// Get the specified property.
    ///
    /// Non-string properties are returned in their JSON form, so a boolean
    /// property reads as `Some("true")`.
    pub fn get_property(&self, name: &str) -> WebDriverResult<Option<String>> {
        let v = self.cmd(Command::GetElementProperty(self.element_id.clone(), name.to_owned()))?;
        if v["value"].is_null() {
            Ok(None)
        } else if !v["value"].is_string() {
            Ok(Some(v["value"].to_string()))
        } else {
            convert_json(&v["value"]).map(Some)
        }
    }

    /// Get the specified attribute.
    ///
    /// # Example:
    /// ```no_run
    /// # use widgetdriver_sync::prelude::*;
    /// #
    /// # fn main() -> WebDriverResult<()> {
    /// #     let caps = DesiredCapabilities::chrome();
    /// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
    /// let elem = driver.find_element(By::Id("country"))?;
    /// let widget_id = elem.get_attribute("widgetid")?;  // Option<String>
    /// #     Ok(())
    /// # }
    /// ```
    pub fn get_attribute(&self, name: &str) -> WebDriverResult<Option<String>> {
        let v = self.cmd(Command::GetElementAttribute(self.element_id.clone(), name.to_owned()))?;
        if !v["value"].is_string() {
            Ok(None)
        } else {
            convert_json(&v["value"])
        }
    }

    /// Get the specified CSS property.
    pub fn get_css_property(&self, name: &str) -> WebDriverResult<String> {
        let v = self.cmd(Command::GetElementCssValue(self.element_id.clone(), name.to_owned()))?;
        if !v["value"].is_string() {
            Ok(String::new())
        } else {
            convert_json(&v["value"])
        }
    }

    /// Return true if the WebElement is currently selected, otherwise false.
    pub fn is_selected(&self) -> WebDriverResult<bool> {
        let v = self.cmd(Command::IsElementSelected(self.element_id.clone()))?;
        convert_json(&v["value"])
    }

    /// Return true if the WebElement is currently enabled, otherwise false.
    pub fn is_enabled(&self) -> WebDriverResult<bool> {
        let v = self.cmd(Command::IsElementEnabled(self.element_id.clone()))?;
        convert_json(&v["value"])
    }

    /// Return true if the WebElement is currently displayed, otherwise false.
    pub fn is_displayed(&self) -> WebDriverResult<bool> {
        let v = self.cmd(Command::IsElementDisplayed(self.element_id.clone()))?;
        convert_json(&v["value"])
    }

    /// Return true if the WebElement is still attached to the page.
    pub fn is_present(&self) -> WebDriverResult<bool> {
        match self.tag_name() {
            Ok(_) => Ok(true),
            Err(e) if e.is_stale() || e.is_no_such_element() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Search for a child element of this WebElement using the specified
    /// selector.
    pub fn find_element(&self, by: By) -> WebDriverResult<WebElement<'a>> {
        let v = self
            .cmd(Command::FindElementFromElement(self.element_id.clone(), by.get_w3c_selector()))?;
        convert_element_sync(self.session, &v["value"])
    }

    /// Search for all child elements of this WebElement that match the
    /// specified selector.
    ///
    /// # Example:
    /// ```no_run
    /// # use widgetdriver_sync::prelude::*;
    /// #
    /// # fn main() -> WebDriverResult<()> {
    /// #     let caps = DesiredCapabilities::chrome();
    /// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
    /// let select = driver.find_element(By::Id("country"))?;
    /// for option in select.find_elements(By::Tag("option"))? {
    ///     assert_eq!(option.tag_name()?, "option");
    /// }
    /// #     Ok(())
    /// # }
    /// ```
    pub fn find_elements(&self, by: By) -> WebDriverResult<Vec<WebElement<'a>>> {
        let v = self.cmd(Command::FindElementsFromElement(
            self.element_id.clone(),
            by.get_w3c_selector(),
        ))?;
        convert_elements_sync(self.session, &v["value"])
    }

    /// Send the specified input.
    ///
    /// # Example:
    /// You can specify anything that implements `Into<TypingData>`. This
    /// includes &str and String.
    /// ```no_run
    /// # use widgetdriver_sync::prelude::*;
    /// #
    /// # fn main() -> WebDriverResult<()> {
    /// #     let caps = DesiredCapabilities::chrome();
    /// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
    /// let elem = driver.find_element(By::Name("city"))?;
    /// elem.send_keys("Cary")?;
    /// elem.send_keys(Keys::Control + "a")?;
    /// elem.send_keys(TypingData::from("Raleigh") + Keys::Enter)?;
    /// #     Ok(())
    /// # }
    /// ```
    pub fn send_keys<S>(&self, keys: S) -> WebDriverResult<()>
    where
        S: Into<TypingData>,
    {
        self.cmd(Command::ElementSendKeys(self.element_id.clone(), keys.into()))?;
        Ok(())
    }

    /// PNG bytes of a screenshot of just this element.
    pub fn screenshot_as_png(&self) -> WebDriverResult<Vec<u8>> {
        let v = self.cmd(Command::TakeElementScreenshot(self.element_id.clone()))?;
        let encoded: String = convert_json(&v["value"])?;
        Ok(decode(&encoded)?)
    }

    pub fn scroll_into_view(&self) -> WebDriverResult<()> {
        js::scroll_into_view(self, true)
    }
}

impl<'a> fmt::Display for WebElement<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, r#"(session="{}", element="{}")"#, self.session.session_id(), self.element_id)
    }
}

impl<'a> Serialize for WebElement<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(MAGIC_ELEMENTID, &self.element_id.to_string())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::keys::Keys;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use serde_json::json;

    #[test]
    fn test_element_requests() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e1/attribute/widgetid", json!("dijit_0"));
        mock.on_request(RequestMethod::Get, "/element/e1/property/checked", json!(true));
        mock.on_request(RequestMethod::Get, "/element/e1/css/visibility", json!("hidden"));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));

        elem.click().unwrap();
        elem.clear().unwrap();
        assert_eq!(elem.get_attribute("widgetid").unwrap().as_deref(), Some("dijit_0"));
        assert_eq!(elem.get_attribute("missing").unwrap(), None);
        assert_eq!(elem.get_property("checked").unwrap().as_deref(), Some("true"));
        assert_eq!(elem.get_css_property("visibility").unwrap(), "hidden");

        let urls: Vec<String> = mock.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls[0], "/session/mock-session/element/e1/click");
        assert_eq!(urls[1], "/session/mock-session/element/e1/clear");
        assert!(urls[3].ends_with("/element/e1/attribute/missing"));
    }

    #[test]
    fn test_send_keys_body() {
        let mock = MockDriverSync::new();
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        elem.send_keys(TypingData::from("ab") + Keys::Enter).unwrap();

        let sent = mock.requests_to(RequestMethod::Post, "/element/e1/value");
        let body = sent[0].body.clone().unwrap();
        assert_eq!(body["text"], json!("ab\u{e007}"));
        assert_eq!(body["value"], json!(["a", "b", "\u{e007}"]));
    }

    #[test]
    fn test_find_from_element_body() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Post, "/element/e1/element", element_json("child"));
        mock.on_request(RequestMethod::Post, "/element/e1/elements", json!([element_json("c1"), element_json("c2")]));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));

        assert_eq!(elem.find_element(By::Tag("option")).unwrap().element_id.to_string(), "child");
        assert_eq!(elem.find_elements(By::XPath("./li")).unwrap().len(), 2);
        let bodies: Vec<_> = mock.requests().into_iter().filter_map(|r| r.body).collect();
        assert_eq!(bodies[0], json!({"using": "tag name", "value": "option"}));
        assert_eq!(bodies[1], json!({"using": "xpath", "value": "./li"}));
    }

    #[test]
    fn test_double_click_uses_actions() {
        let mock = MockDriverSync::new();
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        elem.double_click().unwrap();

        let body = mock.requests_to(RequestMethod::Post, "/actions")[0].body.clone().unwrap();
        let pointer = body["actions"][0]["actions"].as_array().unwrap();
        assert_eq!(pointer[0]["origin"], element_json("e1"));
        let kinds: Vec<&str> = pointer.iter().map(|a| a["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["pointerMove", "pointerDown", "pointerUp", "pointerDown", "pointerUp"]);
    }

    #[test]
    fn test_click_at_offsets_from_center() {
        let mock = MockDriverSync::new();
        mock.on_request(
            RequestMethod::Get,
            "/element/e1/rect",
            json!({"x": 10.0, "y": 20.0, "width": 100.0, "height": 40.0}),
        );
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        elem.click_at(5, 5).unwrap();

        let body = mock.requests_to(RequestMethod::Post, "/actions")[0].body.clone().unwrap();
        let moved = &body["actions"][0]["actions"][0];
        assert_eq!((&moved["x"], &moved["y"]), (&json!(-45), &json!(-15)));
    }

    #[test]
    fn test_is_present() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/e1/name", json!("div"));
        mock.on_error(RequestMethod::Get, "/element/gone/name", "stale element reference");
        let session = mock.session();
        assert!(WebElement::new(&session, ElementId::from("e1")).is_present().unwrap());
        assert!(!WebElement::new(&session, ElementId::from("gone")).is_present().unwrap());
    }
}
