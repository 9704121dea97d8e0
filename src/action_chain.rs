use serde_json::{json, Value};

use crate::common::command::{Command, MAGIC_ELEMENTID};
use crate::common::keys::TypingData;
use crate::error::WebDriverResult;
use crate::session::WebDriverSession;
use crate::webelement::WebElement;

const MOUSE_BUTTON_LEFT: u32 = 0;
const MOUSE_BUTTON_RIGHT: u32 = 2;

/// Builder for W3C input actions.
///
/// Pointer and key actions are recorded as two parallel input sources; each
/// step pauses the source it does not use so both stay in lock-step.
///
/// # Example:
/// ```no_run
/// # use widgetdriver_sync::prelude::*;
/// #
/// # fn main() -> WebDriverResult<()> {
/// #     let caps = DesiredCapabilities::chrome();
/// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
/// let node = driver.find_element(By::XPath("//*[@role='treeitem']"))?;
/// driver.action_chain().double_click_element(&node).perform()?;
/// #     Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ActionChain<'a> {
    session: &'a WebDriverSession,
    pointer_actions: Vec<Value>,
    key_actions: Vec<Value>,
}

impl<'a> ActionChain<'a> {
    pub fn new(session: &'a WebDriverSession) -> Self {
        ActionChain {
            session,
            pointer_actions: Vec::new(),
            key_actions: Vec::new(),
        }
    }

    fn pointer(mut self, action: Value) -> Self {
        self.pointer_actions.push(action);
        self.key_actions.push(json!({"type": "pause", "duration": 0}));
        self
    }

    fn key(mut self, action: Value) -> Self {
        self.key_actions.push(action);
        self.pointer_actions.push(json!({"type": "pause", "duration": 0}));
        self
    }

    /// Move the pointer to the element, offset from its center.
    pub fn move_to_element_with_offset(self, element: &WebElement<'_>, x: i64, y: i64) -> Self {
        let origin = json!({ MAGIC_ELEMENTID: element.element_id.to_string() });
        self.pointer(json!({
            "type": "pointerMove",
            "duration": 100,
            "origin": origin,
            "x": x,
            "y": y,
        }))
    }

    pub fn move_to_element_center(self, element: &WebElement<'_>) -> Self {
        self.move_to_element_with_offset(element, 0, 0)
    }

    fn press(self, button: u32) -> Self {
        self.pointer(json!({"type": "pointerDown", "button": button}))
    }

    fn release(self, button: u32) -> Self {
        self.pointer(json!({"type": "pointerUp", "button": button}))
    }

    pub fn click(self) -> Self {
        self.press(MOUSE_BUTTON_LEFT).release(MOUSE_BUTTON_LEFT)
    }

    pub fn click_element(self, element: &WebElement<'_>) -> Self {
        self.move_to_element_center(element).click()
    }

    pub fn double_click(self) -> Self {
        self.click().click()
    }

    pub fn double_click_element(self, element: &WebElement<'_>) -> Self {
        self.move_to_element_center(element).double_click()
    }

    pub fn context_click(self) -> Self {
        self.press(MOUSE_BUTTON_RIGHT).release(MOUSE_BUTTON_RIGHT)
    }

    /// Press and hold each character or key in `keys`.
    pub fn key_down<S: Into<TypingData>>(self, keys: S) -> Self {
        keys.into()
            .as_vec()
            .into_iter()
            .fold(self, |chain, c| chain.key(json!({"type": "keyDown", "value": c.to_string()})))
    }

    pub fn key_up<S: Into<TypingData>>(self, keys: S) -> Self {
        keys.into()
            .as_vec()
            .into_iter()
            .fold(self, |chain, c| chain.key(json!({"type": "keyUp", "value": c.to_string()})))
    }

    /// Type the characters or keys, pressing and releasing each in turn.
    pub fn send_keys<S: Into<TypingData>>(self, keys: S) -> Self {
        keys.into().as_vec().into_iter().fold(self, |chain, c| {
            let value = c.to_string();
            chain
                .key(json!({"type": "keyDown", "value": value}))
                .key(json!({"type": "keyUp", "value": value}))
        })
    }

    /// The W3C actions payload for the recorded steps.
    pub fn to_json(&self) -> Value {
        json!({
            "actions": [
                {
                    "type": "pointer",
                    "id": "mouse",
                    "parameters": {"pointerType": "mouse"},
                    "actions": self.pointer_actions,
                },
                {
                    "type": "key",
                    "id": "keyboard",
                    "actions": self.key_actions,
                },
            ]
        })
    }

    /// Send all recorded actions to the browser.
    pub fn perform(&self) -> WebDriverResult<()> {
        self.session.execute(Command::PerformActions(self.to_json()))?;
        Ok(())
    }

    /// Release all keys and buttons held by earlier actions.
    pub fn reset_actions(&self) -> WebDriverResult<()> {
        self.session.execute(Command::ReleaseActions)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::keys::Keys;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::{element_json, MockDriverSync};

    #[test]
    fn test_sources_stay_in_step() {
        let mock = MockDriverSync::new();
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("e1"));
        let chain = ActionChain::new(&session)
            .click_element(&elem)
            .key_down(Keys::Control)
            .send_keys("a")
            .key_up(Keys::Control);

        let actions = chain.to_json();
        let pointer = actions["actions"][0]["actions"].as_array().unwrap();
        let keys = actions["actions"][1]["actions"].as_array().unwrap();
        assert_eq!(pointer.len(), keys.len());
        assert_eq!(pointer[0]["origin"], element_json("e1"));
        assert_eq!(keys[0], json!({"type": "pause", "duration": 0}));
        assert_eq!(keys[3], json!({"type": "keyDown", "value": "\u{e009}"}));
        assert_eq!(keys[4], json!({"type": "keyDown", "value": "a"}));
        assert_eq!(keys[5], json!({"type": "keyUp", "value": "a"}));
        assert_eq!(keys[6], json!({"type": "keyUp", "value": "\u{e009}"}));
        assert_eq!(pointer[6], json!({"type": "pause", "duration": 0}));
    }

    #[test]
    fn test_context_click_and_perform() {
        let mock = MockDriverSync::new();
        let session = mock.session();
        let chain = ActionChain::new(&session).context_click();
        chain.perform().unwrap();
        chain.reset_actions().unwrap();

        let sent = mock.requests_to(RequestMethod::Post, "/actions");
        assert_eq!(sent[0].body.as_ref(), Some(&chain.to_json()));
        let pointer = &sent[0].body.as_ref().unwrap()["actions"][0];
        assert_eq!(pointer["parameters"], json!({"pointerType": "mouse"}));
        assert_eq!(pointer["actions"][0], json!({"type": "pointerDown", "button": 2}));
        assert_eq!(mock.requests_to(RequestMethod::Delete, "/actions").len(), 1);
    }
}
