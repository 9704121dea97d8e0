use std::time::Duration;

use stringmatch::Needle;

use crate::common::config::ElementPoller;
use crate::error::{WebDriverError, WebDriverResult};
use crate::query::conditions::{self, handle_errors, ElementPredicate};
use crate::query::poller::ElementPollerTicker;
use crate::webelement::WebElement;

/// High-level interface for performing explicit waits using the builder pattern.
///
/// # Example:
/// ```no_run
/// # use widgetdriver_sync::prelude::*;
/// #
/// # fn main() -> WebDriverResult<()> {
/// #     let caps = DesiredCapabilities::chrome();
/// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
/// let popup = driver.find_element(By::Id("country_popup"))?;
/// // Wait until the drop-down is displayed.
/// popup.wait_until().displayed()?;
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ElementWaiter<'a> {
    element: &'a WebElement<'a>,
    poller: ElementPoller,
    message: String,
    ignore_errors: bool,
}

impl<'a> ElementWaiter<'a> {
    fn new(element: &'a WebElement<'a>, poller: ElementPoller) -> Self {
        Self {
            element,
            poller,
            message: String::new(),
            ignore_errors: true,
        }
    }

    /// Use the specified ElementPoller for this ElementWaiter.
    /// This will not affect the default ElementPoller used for other waits.
    pub fn with_poller(mut self, poller: ElementPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Provide a human-readable error message to be returned in the case of timeout.
    pub fn error(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    /// By default a waiter will ignore any errors that occur while polling for the desired
    /// condition(s). However, this behaviour can be modified so that the waiter will return
    /// early if an error is returned by the WebDriver server.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Force this ElementWaiter to wait for the specified timeout, polling once
    /// after each interval.
    pub fn wait(self, timeout: Duration, interval: Duration) -> Self {
        self.with_poller(ElementPoller::TimeoutWithInterval(timeout, interval))
    }

    fn run_poller(&self, conditions: Vec<ElementPredicate>) -> WebDriverResult<bool> {
        let mut ticker = ElementPollerTicker::new(self.poller);
        loop {
            let mut conditions_met = true;
            for f in &conditions {
                if !f(self.element)? {
                    conditions_met = false;
                    break;
                }
            }

            if conditions_met {
                return Ok(true);
            }

            if !ticker.tick() {
                return Ok(false);
            }
        }
    }

    fn timeout(self) -> WebDriverResult<()> {
        Err(WebDriverError::Timeout(self.message))
    }

    pub fn condition(self, f: ElementPredicate) -> WebDriverResult<()> {
        self.conditions(vec![f])
    }

    pub fn conditions(self, conditions: Vec<ElementPredicate>) -> WebDriverResult<()> {
        match self.run_poller(conditions)? {
            true => Ok(()),
            false => self.timeout(),
        }
    }

    /// Wait until the element has been detached from the page.
    pub fn stale(self) -> WebDriverResult<()> {
        let ignore_errors = self.ignore_errors;
        self.condition(Box::new(move |elem| {
            handle_errors(elem.is_present().map(|x| !x), ignore_errors)
        }))
    }

    pub fn displayed(self) -> WebDriverResult<()> {
        let ignore_errors = self.ignore_errors;
        self.condition(conditions::element_is_displayed(ignore_errors))
    }

    pub fn not_displayed(self) -> WebDriverResult<()> {
        let ignore_errors = self.ignore_errors;
        self.condition(conditions::element_is_not_displayed(ignore_errors))
    }

    pub fn enabled(self) -> WebDriverResult<()> {
        let ignore_errors = self.ignore_errors;
        self.condition(conditions::element_is_enabled(ignore_errors))
    }

    pub fn has_text<N>(self, text: N) -> WebDriverResult<()>
    where
        N: Needle + Clone + Send + Sync + 'static,
    {
        let ignore_errors = self.ignore_errors;
        self.condition(conditions::element_has_text(text, ignore_errors))
    }

    pub fn has_class<N>(self, class_name: N) -> WebDriverResult<()>
    where
        N: Needle + Clone + Send + Sync + 'static,
    {
        let ignore_errors = self.ignore_errors;
        self.condition(conditions::element_has_class(class_name, ignore_errors))
    }

    pub fn has_attribute<S, N>(self, attribute_name: S, value: N) -> WebDriverResult<()>
    where
        S: Into<String>,
        N: Needle + Clone + Send + Sync + 'static,
    {
        let ignore_errors = self.ignore_errors;
        self.condition(conditions::element_has_attribute(attribute_name, value, ignore_errors))
    }
}

/// Trait for enabling the ElementWaiter interface.
pub trait ElementWaitable {
    fn wait_until(&self) -> ElementWaiter;
}

impl ElementWaitable for WebElement<'_> {
    /// Return an ElementWaiter using the session's default poller.
    fn wait_until(&self) -> ElementWaiter {
        let poller: ElementPoller = self.session().config().query_poller;
        ElementWaiter::new(self, poller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::http::mock_sync::MockDriverSync;
    use serde_json::json;

    #[test]
    fn test_wait_until_attribute() {
        let mock = MockDriverSync::new();
        mock.on_sequence(
            RequestMethod::Get,
            "/element/n1/attribute/aria-expanded",
            vec![json!("false"), json!("false"), json!("true")],
        );
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("n1"));
        elem.wait_until()
            .with_poller(ElementPoller::NumTriesWithInterval(5, Duration::from_millis(1)))
            .has_attribute("aria-expanded", "true")
            .expect("attribute should become true");
        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn test_wait_times_out_with_message() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/p1/displayed", json!(false));
        let session = mock.session();
        let elem = WebElement::new(&session, ElementId::from("p1"));
        let err = elem
            .wait_until()
            .with_poller(ElementPoller::NumTriesWithInterval(2, Duration::from_millis(1)))
            .error("popup never opened")
            .displayed()
            .unwrap_err();
        match err {
            WebDriverError::Timeout(msg) => assert_eq!(msg, "popup never opened"),
            e => panic!("unexpected error: {:?}", e),
        }
    }
}
