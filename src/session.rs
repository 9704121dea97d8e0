use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;

use crate::common::command::Command;
use crate::common::config::WebDriverConfig;
use crate::common::types::SessionId;
use crate::error::WebDriverResult;
use crate::http::connection_sync::WebDriverHttpClientSync;
use crate::webdrivercommands::WebDriverCommands;

/// A session id, the connection it lives on and the settings used by
/// element queries and widgets operating within it.
#[derive(Debug)]
pub struct WebDriverSession {
    session_id: SessionId,
    conn: Arc<Mutex<dyn WebDriverHttpClientSync>>,
    config: WebDriverConfig,
}

impl WebDriverSession {
    pub fn new(session_id: SessionId, conn: Arc<Mutex<dyn WebDriverHttpClientSync>>) -> Self {
        Self {
            session_id,
            conn,
            config: WebDriverConfig::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &WebDriverConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WebDriverConfig {
        &mut self.config
    }

    pub fn execute(&self, command: Command<'_>) -> WebDriverResult<serde_json::Value> {
        let request = command.format_request(&self.session_id);
        debug!("session {}: {:?} {}", self.session_id, request.method, request.url);
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(request)
    }

    pub fn set_request_timeout(&mut self, timeout: Duration) -> WebDriverResult<()> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.set_request_timeout(timeout);
        Ok(())
    }
}

impl WebDriverCommands for WebDriverSession {
    fn session(&self) -> &WebDriverSession {
        self
    }
}
