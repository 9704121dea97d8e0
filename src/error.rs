use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub type WebDriverResult<T> = Result<T, WebDriverError>;

/// Machine-readable tag attached to every widget-level failure.
///
/// The string form (see [`ErrorCode::as_str`]) is what the calling
/// automation layer matches on, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ObjectIsNull,
    ObjectIsInvisible,
    TypeIsWrong,
    VerificationFail,
    NotSupported,
    General,
    NoMatchingItem,
    IndexOutOfRange,
    FailVerification,
    NothingSelected,
    FailOpenPopup,
    FailClosePopup,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ObjectIsNull => "OBJECT_IS_NULL",
            ErrorCode::ObjectIsInvisible => "OBJECT_IS_INVISIBLE",
            ErrorCode::TypeIsWrong => "TYPE_IS_WRONG",
            ErrorCode::VerificationFail => "VERIFICATION_FAIL",
            ErrorCode::NotSupported => "NOT_SUPPORTED",
            ErrorCode::General => "GENERAL",
            ErrorCode::NoMatchingItem => "NO_MATCHING_ITEM",
            ErrorCode::IndexOutOfRange => "INDEX_OUTOF_RANGE",
            ErrorCode::FailVerification => "FAIL_VERIFICATION",
            ErrorCode::NothingSelected => "NOTHING_SELECTED",
            ErrorCode::FailOpenPopup => "FAIL_OPEN_POPUP",
            ErrorCode::FailClosePopup => "FAIL_CLOSE_POPUP",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A widget operation failure, carrying a code, a message and an optional
/// payload (for example the texts that were actually selected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetError {
    pub code: ErrorCode,
    pub message: String,
    pub info: Option<String>,
}

impl WidgetError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(info) = &self.info {
            write!(f, " ({})", info)?;
        }
        Ok(())
    }
}

impl std::error::Error for WidgetError {}

/// The error payload returned by a W3C WebDriver server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebDriverErrorInfo {
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stacktrace: String,
}

impl fmt::Display for WebDriverErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status: {}, error: {}, message: {}", self.status, self.error, self.message)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    value: WebDriverErrorInfo,
}

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("The WebDriver server returned an unrecognised response: {0}")]
    UnknownResponse(String),
    #[error("Failed to send request to the WebDriver server: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Unable to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to decode base64 data: {0}")]
    DecodeError(#[from] base64::DecodeError),
    #[error("The WebDriver session is not available: {0}")]
    NotConnected(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("No such element: {0}")]
    NoSuchElement(WebDriverErrorInfo),
    #[error("Stale element reference: {0}")]
    StaleElementReference(WebDriverErrorInfo),
    #[error("Element not interactable: {0}")]
    ElementNotInteractable(WebDriverErrorInfo),
    #[error("Element click intercepted: {0}")]
    ElementClickIntercepted(WebDriverErrorInfo),
    #[error("Invalid selector: {0}")]
    InvalidSelector(WebDriverErrorInfo),
    #[error("JavaScript error: {0}")]
    JavascriptError(WebDriverErrorInfo),
    #[error("Script timeout: {0}")]
    ScriptTimeout(WebDriverErrorInfo),
    #[error("Invalid session id: {0}")]
    InvalidSessionId(WebDriverErrorInfo),
    #[error("Unknown command: {0}")]
    UnknownCommand(WebDriverErrorInfo),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(WebDriverErrorInfo),
    #[error("WebDriver error: {0}")]
    UnknownError(WebDriverErrorInfo),
    #[error("{0}")]
    Widget(#[from] WidgetError),
}

impl WebDriverError {
    /// Convert an HTTP error response into the matching error variant.
    pub fn parse(status: u16, body: String) -> Self {
        let mut info = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => envelope.value,
            Err(_) => {
                return WebDriverError::UnknownResponse(format!("status {}: {}", status, body));
            }
        };
        info.status = status;

        match info.error.as_str() {
            "no such element" => WebDriverError::NoSuchElement(info),
            "stale element reference" => WebDriverError::StaleElementReference(info),
            "element not interactable" => WebDriverError::ElementNotInteractable(info),
            "element click intercepted" => WebDriverError::ElementClickIntercepted(info),
            "invalid selector" => WebDriverError::InvalidSelector(info),
            "javascript error" => WebDriverError::JavascriptError(info),
            "script timeout" | "timeout" => WebDriverError::ScriptTimeout(info),
            "invalid session id" => WebDriverError::InvalidSessionId(info),
            "unknown command" | "unknown method" => WebDriverError::UnknownCommand(info),
            "unsupported operation" => WebDriverError::UnsupportedOperation(info),
            _ => WebDriverError::UnknownError(info),
        }
    }

    pub fn widget(code: ErrorCode, message: impl Into<String>) -> Self {
        WebDriverError::Widget(WidgetError::new(code, message))
    }

    pub fn widget_with_info(
        code: ErrorCode,
        message: impl Into<String>,
        info: impl Into<String>,
    ) -> Self {
        WebDriverError::Widget(WidgetError::new(code, message).with_info(info))
    }

    /// Shorthand for a [`ErrorCode::General`] widget error.
    pub fn general(message: impl Into<String>) -> Self {
        Self::widget(ErrorCode::General, message)
    }

    pub fn not_supported() -> Self {
        Self::widget(ErrorCode::NotSupported, "Not supported.")
    }

    /// The widget error code, if this is a widget error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            WebDriverError::Widget(e) => Some(e.code),
            _ => None,
        }
    }

    /// The widget error payload, if any.
    pub fn info(&self) -> Option<&str> {
        match self {
            WebDriverError::Widget(e) => e.info.as_deref(),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, WebDriverError::StaleElementReference(_))
    }

    pub fn is_no_such_element(&self) -> bool {
        matches!(self, WebDriverError::NoSuchElement(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_w3c_error() {
        let body = r#"{"value":{"error":"stale element reference","message":"gone","stacktrace":""}}"#;
        let err = WebDriverError::parse(404, body.to_string());
        assert!(err.is_stale());
        match err {
            WebDriverError::StaleElementReference(info) => {
                assert_eq!(info.status, 404);
                assert_eq!(info.message, "gone");
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_parse_garbage() {
        let err = WebDriverError::parse(500, "<html>oops</html>".to_string());
        assert!(matches!(err, WebDriverError::UnknownResponse(_)));
    }

    #[test]
    fn test_widget_error_display() {
        let err = WebDriverError::widget_with_info(
            ErrorCode::FailVerification,
            "Fail to verify selected items",
            "a;b",
        );
        assert_eq!(err.code(), Some(ErrorCode::FailVerification));
        assert_eq!(err.info(), Some("a;b"));
        assert_eq!(err.to_string(), "FAIL_VERIFICATION: Fail to verify selected items (a;b)");
    }
}
