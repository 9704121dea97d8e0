use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{WebDriverError, WebDriverResult};

/// Browsers known to the capability presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    InternetExplorer,
    Chrome,
    Firefox,
    Safari,
    Edge,
    ChromiumEdge,
    HtmlUnit,
}

impl Browser {
    /// The short name used in test configuration, e.g. `"chrome"`.
    pub fn short_name(&self) -> &'static str {
        match self {
            Browser::InternetExplorer => "explorer",
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::Edge => "edge",
            Browser::ChromiumEdge => "chromium edge",
            Browser::HtmlUnit => "htmlunit",
        }
    }

    /// The `browserName` capability value reported by the driver.
    pub fn capability_name(&self) -> &'static str {
        match self {
            Browser::InternetExplorer => "internet explorer",
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::Edge | Browser::ChromiumEdge => "MicrosoftEdge",
            Browser::HtmlUnit => "htmlunit",
        }
    }

    /// True if `current` (as reported by the driver) is the browser named by
    /// `expected`, which may be either a short name or a capability name.
    pub fn is_browser(current: &str, expected: &str) -> bool {
        let current = current.trim();
        let expected = expected.trim();
        if current.eq_ignore_ascii_case(expected) {
            return true;
        }
        match expected.parse::<Browser>() {
            Ok(b) => current.eq_ignore_ascii_case(b.capability_name()),
            Err(_) => false,
        }
    }
}

impl FromStr for Browser {
    type Err = WebDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let browser = match name.as_str() {
            "chrome" | "googlechrome" => Browser::Chrome,
            "firefox" | "ff" => Browser::Firefox,
            "safari" => Browser::Safari,
            "edge" => Browser::Edge,
            "chromium edge" | "chromiumedge" | "microsoftedge" => Browser::ChromiumEdge,
            "htmlunit" => Browser::HtmlUnit,
            n if n == "ie" || n.contains("explorer") => Browser::InternetExplorer,
            _ => return Err(WebDriverError::general(format!("Unknown browser '{}'", s))),
        };
        Ok(browser)
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A JSON capabilities document sent with "new session".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DesiredCapabilities {
    capabilities: Value,
}

impl DesiredCapabilities {
    pub fn new(capabilities: Value) -> Self {
        DesiredCapabilities {
            capabilities,
        }
    }

    pub fn for_browser(browser: Browser) -> Self {
        let mut caps = DesiredCapabilities::new(json!({
            "browserName": browser.capability_name(),
        }));
        match browser {
            Browser::Chrome => caps.insert("goog:chromeOptions", json!({ "args": [] })),
            Browser::ChromiumEdge => caps.insert("ms:edgeOptions", json!({ "args": [] })),
            Browser::Firefox => caps.insert("moz:firefoxOptions", json!({})),
            _ => {}
        }
        caps
    }

    pub fn chrome() -> Self {
        Self::for_browser(Browser::Chrome)
    }

    pub fn firefox() -> Self {
        Self::for_browser(Browser::Firefox)
    }

    pub fn edge() -> Self {
        Self::for_browser(Browser::ChromiumEdge)
    }

    pub fn safari() -> Self {
        Self::for_browser(Browser::Safari)
    }

    pub fn internet_explorer() -> Self {
        Self::for_browser(Browser::InternetExplorer)
    }

    pub fn browser_name(&self) -> Option<&str> {
        self.capabilities["browserName"].as_str()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.capabilities.get(key)
    }

    /// Set a capability, replacing any existing value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> WebDriverResult<()> {
        let value = serde_json::to_value(value)?;
        self.insert(key, value);
        Ok(())
    }

    /// Append a command-line argument for chromium based browsers.
    pub fn add_chrome_arg(&mut self, arg: &str) -> WebDriverResult<()> {
        let key = match self.browser_name() {
            Some("MicrosoftEdge") => "ms:edgeOptions",
            _ => "goog:chromeOptions",
        };
        let mut args: Vec<String> = match self.capabilities[key]["args"].as_array() {
            Some(a) => serde_json::from_value(Value::Array(a.clone()))?,
            None => Vec::new(),
        };
        if !args.iter().any(|a| a == arg) {
            args.push(arg.to_string());
        }
        self.insert(key, json!({ "args": args }));
        Ok(())
    }

    pub fn as_json(&self) -> &Value {
        &self.capabilities
    }

    fn insert(&mut self, key: &str, value: Value) {
        if let Value::Object(map) = &mut self.capabilities {
            map.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_names() {
        assert_eq!("Internet Explorer".parse::<Browser>().unwrap(), Browser::InternetExplorer);
        assert_eq!("chromium edge".parse::<Browser>().unwrap(), Browser::ChromiumEdge);
        assert!("lynx".parse::<Browser>().is_err());
        assert!(Browser::is_browser("MicrosoftEdge", "edge"));
        assert!(Browser::is_browser("internet explorer", "explorer"));
        assert!(!Browser::is_browser("firefox", "chrome"));
    }

    #[test]
    fn test_chrome_args() {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_arg("--headless").unwrap();
        caps.add_chrome_arg("--headless").unwrap();
        assert_eq!(caps.browser_name(), Some("chrome"));
        assert_eq!(caps.get("goog:chromeOptions"), Some(&json!({"args": ["--headless"]})));
    }
}
