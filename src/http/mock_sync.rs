use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::{json, Value};

use crate::common::command::{RequestData, RequestMethod, MAGIC_ELEMENTID};
use crate::common::types::SessionId;
use crate::error::{WebDriverError, WebDriverResult};
use crate::http::connection_sync::{HttpClientCreateParams, WebDriverHttpClientSync};
use crate::session::WebDriverSession;

type Responder = Box<dyn Fn(&RequestData) -> Option<WebDriverResult<Value>> + Send + Sync>;

#[derive(Default)]
struct MockState {
    responders: Vec<Responder>,
    requests: Vec<RequestData>,
}

/// In-process WebDriver "server" with scripted responses.
///
/// Responders are tried newest first, so a later `on_*` call overrides an
/// earlier one for the same request. Unmatched requests answer
/// `{"value": null}`. Clones share the same script and request log.
#[derive(Clone, Default)]
pub struct MockDriverSync {
    state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for MockDriverSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockDriverSync {{ requests: {} }}", self.lock().requests.len())
    }
}

/// JSON for an element reference, as returned by find-element.
pub fn element_json(id: &str) -> Value {
    json!({ MAGIC_ELEMENTID: id })
}

fn url_matches(request: &RequestData, method: RequestMethod, url_suffix: &str) -> bool {
    request.method == method && request.url.ends_with(url_suffix)
}

fn script_of(request: &RequestData) -> Option<&str> {
    if !request.url.ends_with("/execute/sync") {
        return None;
    }
    request.body.as_ref().and_then(|b| b["script"].as_str())
}

impl MockDriverSync {
    pub fn new() -> Self {
        MockDriverSync::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A session backed by this mock.
    pub fn session(&self) -> WebDriverSession {
        WebDriverSession::new(SessionId::from("mock-session"), Arc::new(Mutex::new(self.clone())))
    }

    /// Register a raw responder.
    pub fn on<F>(&self, responder: F)
    where
        F: Fn(&RequestData) -> Option<WebDriverResult<Value>> + Send + Sync + 'static,
    {
        self.lock().responders.push(Box::new(responder));
    }

    /// Answer `{"value": value}` for requests whose url ends with `url_suffix`.
    pub fn on_request(&self, method: RequestMethod, url_suffix: &str, value: Value) {
        let suffix = url_suffix.to_string();
        self.on(move |r| {
            if url_matches(r, method, &suffix) {
                Some(Ok(json!({ "value": value })))
            } else {
                None
            }
        });
    }

    /// Answer with each value in turn; the last one repeats.
    pub fn on_sequence(&self, method: RequestMethod, url_suffix: &str, values: Vec<Value>) {
        let suffix = url_suffix.to_string();
        let counter = AtomicUsize::new(0);
        self.on(move |r| {
            if !url_matches(r, method, &suffix) || values.is_empty() {
                return None;
            }
            let n = counter.fetch_add(1, Ordering::SeqCst).min(values.len() - 1);
            Some(Ok(json!({ "value": values[n] })))
        });
    }

    /// Answer with a W3C error such as `"stale element reference"`.
    pub fn on_error(&self, method: RequestMethod, url_suffix: &str, error: &str) {
        let suffix = url_suffix.to_string();
        let error = error.to_string();
        self.on(move |r| {
            if url_matches(r, method, &suffix) {
                let body = json!({"value": {"error": error, "message": error, "stacktrace": ""}});
                Some(Err(WebDriverError::parse(404, body.to_string())))
            } else {
                None
            }
        });
    }

    /// Answer `{"value": value}` for scripts containing `fragment`.
    pub fn on_script(&self, fragment: &str, value: Value) {
        let fragment = fragment.to_string();
        self.on(move |r| match script_of(r) {
            Some(s) if s.contains(&fragment) => Some(Ok(json!({ "value": value }))),
            _ => None,
        });
    }

    /// Fail scripts containing `fragment` with a javascript error.
    pub fn on_script_error(&self, fragment: &str) {
        let fragment = fragment.to_string();
        self.on(move |r| match script_of(r) {
            Some(s) if s.contains(&fragment) => {
                let body = json!({"value": {"error": "javascript error", "message": fragment}});
                Some(Err(WebDriverError::parse(500, body.to_string())))
            }
            _ => None,
        });
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RequestData> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: RequestMethod, url_suffix: &str) -> Vec<RequestData> {
        self.requests().into_iter().filter(|r| url_matches(r, method, url_suffix)).collect()
    }

    /// The scripts executed so far, oldest first.
    pub fn scripts(&self) -> Vec<String> {
        self.requests().iter().filter_map(|r| script_of(r).map(|s| s.to_string())).collect()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

impl WebDriverHttpClientSync for MockDriverSync {
    fn create(_params: HttpClientCreateParams) -> WebDriverResult<Self> {
        let mock = MockDriverSync::new();
        mock.on(|r| {
            if r.method == RequestMethod::Post && r.url == "/session" {
                Some(Ok(json!({"value": {"sessionId": "mock-session", "capabilities": {}}})))
            } else {
                None
            }
        });
        Ok(mock)
    }

    fn set_request_timeout(&mut self, _timeout: Duration) {}

    fn execute(&self, request_data: RequestData) -> WebDriverResult<Value> {
        let mut state = self.lock();
        state.requests.push(request_data.clone());
        for responder in state.responders.iter().rev() {
            if let Some(response) = responder(&request_data) {
                return response;
            }
        }
        Ok(json!({ "value": null }))
    }
}
