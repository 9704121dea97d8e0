use log::{debug, info};

use crate::common::command::By;
use crate::common::keys::TypingData;
use crate::component::Component;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::rs::xpath;
use crate::session::WebDriverSession;
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

pub const LIBRARY_NAME: &str = "EditBox";
/// Times the text is typed again after a failed verification.
pub const DEFAULT_MAX_RETRY_ENTER: usize = 5;

/// Text inputs and text areas whose placeholder or content is `label`.
pub fn find_text_fields<'a>(session: &'a WebDriverSession, label: &str) -> WebDriverResult<Vec<WebElement<'a>>> {
    let quoted = xpath::quote(label);
    let query = [
        format!("//textarea[@placeholder={}]", quoted),
        format!("//input[@placeholder={}]", quoted),
        format!("//*[@aria-placeholder={}]", quoted),
        format!("//textarea[.={}]", quoted),
        format!("//input[.={}]", quoted),
    ]
    .join(xpath::REGEX_OR);
    let found = session.find_elements(By::XPath(&query))?;
    info!("got {} text input elements with placeholder-text or with text '{}'", found.len(), label);
    Ok(found)
}

/// A text box.
///
/// Text is either typed as plain characters or as keystrokes such as
/// `^a{Delete}Hello{Enter}`. The box is emptied first either way, and text
/// that fails verification is typed again up to `max_retry` times.
#[derive(Debug)]
pub struct EditBox<'a> {
    component: Component<'a>,
    max_retry: usize,
}

impl<'a> EditBox<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Ok(Self::from_component(Component::new(element)?))
    }

    pub fn from_component(component: Component<'a>) -> Self {
        EditBox {
            component,
            max_retry: DEFAULT_MAX_RETRY_ENTER,
        }
    }

    pub fn with_max_retry(mut self, max_retry: usize) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    pub fn text(&self) -> String {
        self.component.value()
    }

    pub fn clear(&self) -> WebDriverResult<()> {
        self.component.clear_box(LIBRARY_NAME)
    }

    /// Replace the content with `text` typed character by character.
    pub fn set_text_characters(&self, text: &str, verify: bool) -> WebDriverResult<()> {
        self.set_text(text, verify, |c| c.input_chars(LIBRARY_NAME, text))
    }

    /// Replace the content with `keys`, special keys included. Keys that
    /// hold special keys such as `{Tab}` or `^a` are never verified, since
    /// the box cannot show them.
    pub fn set_text_value(&self, keys: &str, verify: bool) -> WebDriverResult<()> {
        let plain = TypingData::from_keystrokes(keys)? == TypingData::from(keys);
        if verify && !plain {
            debug!("Input text '{}' contains special keys, ignoring verification.", keys);
        }
        self.set_text(keys, verify && plain, |c| c.input_keys(LIBRARY_NAME, keys))
    }

    fn set_text<F>(&self, text: &str, verify: bool, enter: F) -> WebDriverResult<()>
    where
        F: Fn(&Component<'a>) -> WebDriverResult<()>,
    {
        self.clear()?;
        enter(&self.component)?;
        if !verify {
            return Ok(());
        }

        info!("Verifying the {} ...", LIBRARY_NAME);
        for _ in 0..self.max_retry {
            if self.component.verify_box(LIBRARY_NAME, text) {
                return Ok(());
            }
            debug!("retry to enter '{}'", text);
            self.clear()?;
            enter(&self.component)?;
        }
        self.verify_text(text)
    }

    pub fn verify_text(&self, expected: &str) -> WebDriverResult<()> {
        if self.component.verify_box(LIBRARY_NAME, expected) {
            return Ok(());
        }
        let msg = format!(
            "{} value '{}' does not match expected value '{}'",
            LIBRARY_NAME,
            self.text(),
            expected
        );
        debug!("{}", msg);
        Err(WebDriverError::widget(ErrorCode::VerificationFail, msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use serde_json::json;

    fn box_mock(values: Vec<serde_json::Value>) -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/eb/displayed", json!(true));
        mock.on_sequence(RequestMethod::Get, "/element/eb/property/value", values);
        mock
    }

    #[test]
    fn test_set_text_characters() {
        let mock = box_mock(vec![json!(""), json!("Hello")]);
        let session = mock.session();
        let editbox = EditBox::new(WebElement::new(&session, ElementId::from("eb"))).unwrap();
        editbox.set_text_characters("Hello", true).unwrap();

        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/eb/clear").len(), 1);
        let typed = mock.requests_to(RequestMethod::Post, "/element/eb/value");
        assert_eq!(typed.last().unwrap().body.as_ref().unwrap()["text"], json!("Hello"));
    }

    #[test]
    fn test_verification_failure() {
        let mock = box_mock(vec![json!(""), json!("Hel")]);
        let session = mock.session();
        let editbox = EditBox::new(WebElement::new(&session, ElementId::from("eb"))).unwrap().with_max_retry(1);
        let err = editbox.set_text_characters("Hello", true).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::VerificationFail));
        assert!(err.to_string().ends_with("EditBox value 'Hel' does not match expected value 'Hello'"));
        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/eb/clear").len(), 2);
    }

    #[test]
    fn test_retypes_after_failed_verification() {
        // clear, verify, verify again, clear, verify
        let mock = box_mock(vec![json!(""), json!("Hel"), json!("Hel"), json!(""), json!("Hello")]);
        let session = mock.session();
        let editbox = EditBox::new(WebElement::new(&session, ElementId::from("eb"))).unwrap();
        editbox.set_text_value("Hello", true).unwrap();

        let typed = mock.requests_to(RequestMethod::Post, "/element/eb/value");
        let texts: Vec<_> = typed.iter().filter_map(|r| r.body.as_ref()).filter(|b| b["text"] == json!("Hello")).collect();
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn test_special_keys_skip_verification() {
        let mock = box_mock(vec![json!(""), json!("Hello")]);
        let session = mock.session();
        let editbox = EditBox::new(WebElement::new(&session, ElementId::from("eb"))).unwrap();
        editbox.set_text_value("Hello{Tab}", true).unwrap();

        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/eb/clear").len(), 1);
    }

    #[test]
    fn test_find_text_fields_by_placeholder() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Post, "/elements", json!([element_json("name")]));
        let session = mock.session();
        let found = find_text_fields(&session, "Your name").unwrap();
        assert_eq!(found.len(), 1);
        let query = mock.requests_to(RequestMethod::Post, "/elements")[0].body.clone().unwrap();
        assert!(query["value"].as_str().unwrap().starts_with("//textarea[@placeholder='Your name']|//input"));
    }
}
