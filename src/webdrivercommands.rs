use std::time::Duration;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::action_chain::ActionChain;
use crate::common::command::{By, Command};
use crate::common::connection_common::convert_json;
use crate::common::scriptargs::ScriptArgs;
use crate::common::types::{SessionId, TimeoutConfiguration};
use crate::error::{WebDriverError, WebDriverResult};
use crate::http::connection_sync::WebDriverHttpClientSync;
use crate::session::WebDriverSession;
use crate::webelement::{convert_element_sync, convert_elements_sync, WebElement};

/// Start a new WebDriver session, returning the session id and the
/// capabilities returned by the server.
pub fn start_session<C>(
    conn: &dyn WebDriverHttpClientSync,
    capabilities: C,
) -> WebDriverResult<(SessionId, Value)>
where
    C: Serialize,
{
    let caps = serde_json::to_value(capabilities)?;
    let request = Command::NewSession(&caps).format_request(&SessionId::from(""));
    let v = conn.execute(request)?;

    // W3C puts everything under "value"; older servers return the id at the top level.
    let (session_id, capabilities) = match v["value"]["sessionId"].as_str() {
        Some(id) => (id.to_string(), v["value"]["capabilities"].clone()),
        None => match v["sessionId"].as_str() {
            Some(id) => (id.to_string(), v["value"].clone()),
            None => {
                return Err(WebDriverError::UnknownResponse(format!(
                    "new session returned no session id: {}",
                    v
                )))
            }
        },
    };
    Ok((SessionId::from(session_id), capabilities))
}

/// Helper for converting the result of a script.
#[derive(Debug)]
pub struct ScriptRetSync<'a> {
    session: &'a WebDriverSession,
    value: Value,
}

impl<'a> ScriptRetSync<'a> {
    pub fn new(session: &'a WebDriverSession, value: Value) -> Self {
        ScriptRetSync {
            session,
            value,
        }
    }

    /// The raw script result.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn convert<T>(&self) -> WebDriverResult<T>
    where
        T: DeserializeOwned,
    {
        convert_json(&self.value)
    }

    /// Interpret the result as a single element.
    pub fn get_element(&self) -> WebDriverResult<WebElement<'a>> {
        convert_element_sync(self.session, &self.value)
    }

    /// Interpret the result as a list of elements.
    pub fn get_elements(&self) -> WebDriverResult<Vec<WebElement<'a>>> {
        convert_elements_sync(self.session, &self.value)
    }
}

/// All browser-level WebDriver commands.
///
/// This trait is implemented by both `WebDriver` and `WebDriverSession`, so
/// widgets holding only a session reference can use it too.
pub trait WebDriverCommands {
    fn session(&self) -> &WebDriverSession;

    /// Convenience wrapper for executing a WebDriver command.
    fn cmd(&self, command: Command<'_>) -> WebDriverResult<Value> {
        self.session().execute(command)
    }

    /// Navigate to the specified URL.
    fn get<S: Into<String>>(&self, url: S) -> WebDriverResult<()> {
        let url = url.into();
        self.cmd(Command::NavigateTo(&url))?;
        Ok(())
    }

    fn current_url(&self) -> WebDriverResult<String> {
        let v = self.cmd(Command::GetCurrentUrl)?;
        convert_json(&v["value"])
    }

    fn title(&self) -> WebDriverResult<String> {
        let v = self.cmd(Command::GetTitle)?;
        convert_json(&v["value"])
    }

    fn page_source(&self) -> WebDriverResult<String> {
        let v = self.cmd(Command::GetPageSource)?;
        convert_json(&v["value"])
    }

    /// Search for an element on the current page.
    ///
    /// # Example:
    /// ```no_run
    /// # use widgetdriver_sync::prelude::*;
    /// #
    /// # fn main() -> WebDriverResult<()> {
    /// #     let caps = DesiredCapabilities::chrome();
    /// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
    /// let elem = driver.find_element(By::Id("country"))?;
    /// #     Ok(())
    /// # }
    /// ```
    fn find_element(&self, by: By<'_>) -> WebDriverResult<WebElement<'_>> {
        let v = self.cmd(Command::FindElement(by.get_w3c_selector()))?;
        convert_element_sync(self.session(), &v["value"])
    }

    /// Search for all elements on the current page that match the selector.
    fn find_elements(&self, by: By<'_>) -> WebDriverResult<Vec<WebElement<'_>>> {
        let v = self.cmd(Command::FindElements(by.get_w3c_selector()))?;
        convert_elements_sync(self.session(), &v["value"])
    }

    fn active_element(&self) -> WebDriverResult<WebElement<'_>> {
        let v = self.cmd(Command::GetActiveElement)?;
        convert_element_sync(self.session(), &v["value"])
    }

    /// Execute a script synchronously and return the result.
    fn execute_script(&self, script: &str) -> WebDriverResult<ScriptRetSync<'_>> {
        let v = self.cmd(Command::ExecuteScript(script.to_owned(), Vec::new()))?;
        Ok(ScriptRetSync::new(self.session(), v["value"].clone()))
    }

    /// Execute a script synchronously with the given arguments.
    ///
    /// # Example:
    /// ```no_run
    /// # use widgetdriver_sync::prelude::*;
    /// #
    /// # fn main() -> WebDriverResult<()> {
    /// #     let caps = DesiredCapabilities::chrome();
    /// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
    /// let elem = driver.find_element(By::Id("country"))?;
    /// let mut args = ScriptArgs::new();
    /// args.push(&elem)?;
    /// let ret = driver.execute_script_with_args("return arguments[0].tagName;", &args)?;
    /// let tag: String = ret.convert()?;
    /// #     Ok(())
    /// # }
    /// ```
    fn execute_script_with_args(
        &self,
        script: &str,
        args: &ScriptArgs,
    ) -> WebDriverResult<ScriptRetSync<'_>> {
        let v = self.cmd(Command::ExecuteScript(script.to_owned(), args.get_args()))?;
        Ok(ScriptRetSync::new(self.session(), v["value"].clone()))
    }

    fn get_timeouts(&self) -> WebDriverResult<TimeoutConfiguration> {
        let v = self.cmd(Command::GetTimeouts)?;
        convert_json(&v["value"])
    }

    fn set_timeouts(&self, timeouts: TimeoutConfiguration) -> WebDriverResult<()> {
        self.cmd(Command::SetTimeouts(timeouts))?;
        Ok(())
    }

    fn set_implicit_wait_timeout(&self, time_to_wait: Duration) -> WebDriverResult<()> {
        self.set_timeouts(TimeoutConfiguration::new(None, None, Some(time_to_wait)))
    }

    /// Run `f` with the implicit wait set to zero, restoring the configured
    /// implicit wait afterwards even if `f` fails.
    fn without_implicit_wait<R, F>(&self, f: F) -> WebDriverResult<R>
    where
        F: FnOnce() -> WebDriverResult<R>,
        Self: Sized,
    {
        self.set_implicit_wait_timeout(Duration::from_secs(0))?;
        let result = f();
        let restore = self.session().config().implicit_wait;
        if let Err(e) = self.set_implicit_wait_timeout(restore) {
            warn!("Failed to restore implicit wait to {:?}: {}", restore, e);
        }
        result
    }

    fn screenshot_as_base64(&self) -> WebDriverResult<String> {
        let v = self.cmd(Command::TakeScreenshot)?;
        convert_json(&v["value"])
    }

    fn screenshot_as_png(&self) -> WebDriverResult<Vec<u8>> {
        let s = self.screenshot_as_base64()?;
        let bytes: Vec<u8> = base64::decode(&s)?;
        Ok(bytes)
    }

    /// Create a new action chain for low-level mouse and keyboard input.
    fn action_chain(&self) -> ActionChain<'_> {
        ActionChain::new(self.session())
    }
}
