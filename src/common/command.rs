use std::fmt::Debug;

use serde_json::{json, Value};

use crate::common::keys::TypingData;
use crate::common::types::{ElementId, SessionId, TimeoutConfiguration};

pub const MAGIC_ELEMENTID: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestData {
    pub method: RequestMethod,
    pub url: String,
    pub body: Option<Value>,
}

impl RequestData {
    pub fn new<S: Into<String>>(method: RequestMethod, url: S) -> Self {
        RequestData {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn add_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Element selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum By<'a> {
    Id(&'a str),
    XPath(&'a str),
    LinkText(&'a str),
    PartialLinkText(&'a str),
    Name(&'a str),
    Tag(&'a str),
    ClassName(&'a str),
    Css(&'a str),
}

/// A selector in the form the W3C find-element endpoints accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub name: String,
    pub query: String,
}

impl Selector {
    pub fn new(name: &str, query: String) -> Self {
        Self {
            name: name.to_string(),
            query,
        }
    }
}

impl<'a> By<'a> {
    pub fn get_w3c_selector(&self) -> Selector {
        match self {
            By::Id(x) => Selector::new("css selector", format!("[id=\"{}\"]", x)),
            By::XPath(x) => Selector::new("xpath", x.to_string()),
            By::LinkText(x) => Selector::new("link text", x.to_string()),
            By::PartialLinkText(x) => Selector::new("partial link text", x.to_string()),
            By::Name(x) => Selector::new("css selector", format!("[name=\"{}\"]", x)),
            By::Tag(x) => Selector::new("tag name", x.to_string()),
            By::ClassName(x) => Selector::new("css selector", format!(".{}", x)),
            By::Css(x) => Selector::new("css selector", x.to_string()),
        }
    }
}

/// A vendor command that is not part of the W3C protocol, such as the
/// chromedriver `goog/cdp/execute` endpoint.
pub trait ExtensionCommand: Debug {
    /// Request body, if any.
    fn parameters_json(&self) -> Option<Value>;

    fn method(&self) -> RequestMethod;

    /// Endpoint relative to `/session/{session_id}`, starting with `/`.
    fn endpoint(&self) -> String;
}

#[derive(Debug)]
pub enum Command<'a> {
    NewSession(&'a Value),
    DeleteSession,
    NavigateTo(&'a str),
    GetCurrentUrl,
    GetTitle,
    GetPageSource,
    GetTimeouts,
    SetTimeouts(TimeoutConfiguration),
    FindElement(Selector),
    FindElements(Selector),
    FindElementFromElement(ElementId, Selector),
    FindElementsFromElement(ElementId, Selector),
    GetActiveElement,
    IsElementSelected(ElementId),
    IsElementEnabled(ElementId),
    IsElementDisplayed(ElementId),
    GetElementAttribute(ElementId, String),
    GetElementProperty(ElementId, String),
    GetElementCssValue(ElementId, String),
    GetElementText(ElementId),
    GetElementTagName(ElementId),
    GetElementRect(ElementId),
    ElementClick(ElementId),
    ElementClear(ElementId),
    ElementSendKeys(ElementId, TypingData),
    ExecuteScript(String, Vec<Value>),
    PerformActions(Value),
    ReleaseActions,
    TakeScreenshot,
    TakeElementScreenshot(ElementId),
    ExtensionCommand(Box<dyn ExtensionCommand + Send + Sync + 'a>),
}

impl<'a> Command<'a> {
    pub fn format_request(&self, session_id: &SessionId) -> RequestData {
        let base = format!("/session/{}", session_id);
        match self {
            Command::NewSession(caps) => {
                RequestData::new(RequestMethod::Post, "/session").add_body(json!({
                    "capabilities": { "alwaysMatch": caps },
                    "desiredCapabilities": caps,
                }))
            }
            Command::DeleteSession => RequestData::new(RequestMethod::Delete, base),
            Command::NavigateTo(url) => {
                RequestData::new(RequestMethod::Post, format!("{}/url", base))
                    .add_body(json!({ "url": url }))
            }
            Command::GetCurrentUrl => RequestData::new(RequestMethod::Get, format!("{}/url", base)),
            Command::GetTitle => RequestData::new(RequestMethod::Get, format!("{}/title", base)),
            Command::GetPageSource => {
                RequestData::new(RequestMethod::Get, format!("{}/source", base))
            }
            Command::GetTimeouts => {
                RequestData::new(RequestMethod::Get, format!("{}/timeouts", base))
            }
            Command::SetTimeouts(timeouts) => {
                RequestData::new(RequestMethod::Post, format!("{}/timeouts", base))
                    .add_body(json!(timeouts))
            }
            Command::FindElement(selector) => {
                RequestData::new(RequestMethod::Post, format!("{}/element", base))
                    .add_body(json!({"using": selector.name, "value": selector.query}))
            }
            Command::FindElements(selector) => {
                RequestData::new(RequestMethod::Post, format!("{}/elements", base))
                    .add_body(json!({"using": selector.name, "value": selector.query}))
            }
            Command::FindElementFromElement(element_id, selector) => RequestData::new(
                RequestMethod::Post,
                format!("{}/element/{}/element", base, element_id),
            )
            .add_body(json!({"using": selector.name, "value": selector.query})),
            Command::FindElementsFromElement(element_id, selector) => RequestData::new(
                RequestMethod::Post,
                format!("{}/element/{}/elements", base, element_id),
            )
            .add_body(json!({"using": selector.name, "value": selector.query})),
            Command::GetActiveElement => {
                RequestData::new(RequestMethod::Get, format!("{}/element/active", base))
            }
            Command::IsElementSelected(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/selected", base, element_id),
            ),
            Command::IsElementEnabled(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/enabled", base, element_id),
            ),
            Command::IsElementDisplayed(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/displayed", base, element_id),
            ),
            Command::GetElementAttribute(element_id, name) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/attribute/{}", base, element_id, name),
            ),
            Command::GetElementProperty(element_id, name) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/property/{}", base, element_id, name),
            ),
            Command::GetElementCssValue(element_id, name) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/css/{}", base, element_id, name),
            ),
            Command::GetElementText(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/text", base, element_id),
            ),
            Command::GetElementTagName(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/name", base, element_id),
            ),
            Command::GetElementRect(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/rect", base, element_id),
            ),
            Command::ElementClick(element_id) => RequestData::new(
                RequestMethod::Post,
                format!("{}/element/{}/click", base, element_id),
            )
            .add_body(json!({})),
            Command::ElementClear(element_id) => RequestData::new(
                RequestMethod::Post,
                format!("{}/element/{}/clear", base, element_id),
            )
            .add_body(json!({})),
            Command::ElementSendKeys(element_id, keys) => RequestData::new(
                RequestMethod::Post,
                format!("{}/element/{}/value", base, element_id),
            )
            .add_body(json!({"text": keys.to_string(), "value": keys.as_vec()})),
            Command::ExecuteScript(script, args) => {
                RequestData::new(RequestMethod::Post, format!("{}/execute/sync", base))
                    .add_body(json!({"script": script, "args": args}))
            }
            Command::PerformActions(actions) => {
                RequestData::new(RequestMethod::Post, format!("{}/actions", base))
                    .add_body(actions.clone())
            }
            Command::ReleaseActions => {
                RequestData::new(RequestMethod::Delete, format!("{}/actions", base))
            }
            Command::TakeScreenshot => {
                RequestData::new(RequestMethod::Get, format!("{}/screenshot", base))
            }
            Command::TakeElementScreenshot(element_id) => RequestData::new(
                RequestMethod::Get,
                format!("{}/element/{}/screenshot", base, element_id),
            ),
            Command::ExtensionCommand(command) => {
                let request = RequestData::new(
                    command.method(),
                    format!("{}{}", base, command.endpoint()),
                );
                match command.parameters_json() {
                    Some(body) => request.add_body(body),
                    None => request,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_element_from_element_request() {
        let cmd = Command::FindElementsFromElement(
            ElementId::from("e1"),
            By::XPath(".//option").get_w3c_selector(),
        );
        let req = cmd.format_request(&SessionId::from("s1"));
        assert_eq!(req.method, RequestMethod::Post);
        assert_eq!(req.url, "/session/s1/element/e1/elements");
        assert_eq!(req.body, Some(json!({"using": "xpath", "value": ".//option"})));
    }

    #[test]
    fn test_id_selector_uses_css() {
        let selector = By::Id("menu_1").get_w3c_selector();
        assert_eq!(selector.name, "css selector");
        assert_eq!(selector.query, "[id=\"menu_1\"]");
    }
}
