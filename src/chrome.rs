//! Chromedriver extension commands.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::command::{Command, ExtensionCommand, RequestMethod};
use crate::common::connection_common::convert_json;
use crate::error::WebDriverResult;
use crate::webdrivercommands::WebDriverCommands;

/// Emulated network conditions for chromium browsers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConditions {
    pub offline: bool,
    /// Extra latency in milliseconds.
    pub latency: u32,
    /// Bytes per second; negative means unthrottled.
    pub download_throughput: i64,
    pub upload_throughput: i64,
}

#[derive(Debug)]
pub enum ChromeCommand {
    LaunchApp(String),
    ExecuteCdpCommand(String, Value),
    GetNetworkConditions,
    SetNetworkConditions(NetworkConditions),
    DeleteNetworkConditions,
}

impl ExtensionCommand for ChromeCommand {
    fn parameters_json(&self) -> Option<Value> {
        match self {
            ChromeCommand::LaunchApp(id) => Some(json!({ "id": id })),
            ChromeCommand::ExecuteCdpCommand(cmd, params) => {
                Some(json!({ "cmd": cmd, "params": params }))
            }
            ChromeCommand::SetNetworkConditions(conditions) => {
                Some(json!({ "network_conditions": conditions }))
            }
            ChromeCommand::GetNetworkConditions | ChromeCommand::DeleteNetworkConditions => None,
        }
    }

    fn method(&self) -> RequestMethod {
        match self {
            ChromeCommand::GetNetworkConditions => RequestMethod::Get,
            ChromeCommand::DeleteNetworkConditions => RequestMethod::Delete,
            _ => RequestMethod::Post,
        }
    }

    fn endpoint(&self) -> String {
        match self {
            ChromeCommand::LaunchApp(_) => "/chromium/launch_app",
            ChromeCommand::ExecuteCdpCommand(..) => "/goog/cdp/execute",
            ChromeCommand::GetNetworkConditions
            | ChromeCommand::SetNetworkConditions(_)
            | ChromeCommand::DeleteNetworkConditions => "/chromium/network_conditions",
        }
        .to_string()
    }
}

/// Chromium-only commands, available on anything that can run WebDriver commands.
pub trait ChromeCommands: WebDriverCommands {
    /// Launch the Chrome app with the given id.
    fn launch_app(&self, app_id: &str) -> WebDriverResult<()> {
        self.cmd(Command::ExtensionCommand(Box::new(ChromeCommand::LaunchApp(
            app_id.to_string(),
        ))))?;
        Ok(())
    }

    /// Run a Chrome DevTools Protocol command and return its result.
    fn execute_cdp(&self, cmd: &str, params: Value) -> WebDriverResult<Value> {
        let v = self.cmd(Command::ExtensionCommand(Box::new(ChromeCommand::ExecuteCdpCommand(
            cmd.to_string(),
            params,
        ))))?;
        Ok(v["value"].clone())
    }

    fn get_network_conditions(&self) -> WebDriverResult<NetworkConditions> {
        let v = self.cmd(Command::ExtensionCommand(Box::new(ChromeCommand::GetNetworkConditions)))?;
        convert_json(&v["value"])
    }

    fn set_network_conditions(&self, conditions: &NetworkConditions) -> WebDriverResult<()> {
        self.cmd(Command::ExtensionCommand(Box::new(ChromeCommand::SetNetworkConditions(
            conditions.clone(),
        ))))?;
        Ok(())
    }

    fn delete_network_conditions(&self) -> WebDriverResult<()> {
        self.cmd(Command::ExtensionCommand(Box::new(ChromeCommand::DeleteNetworkConditions)))?;
        Ok(())
    }
}

impl<T: WebDriverCommands> ChromeCommands for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock_sync::MockDriverSync;

    #[test]
    fn test_cdp_request() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Post, "/goog/cdp/execute", json!({"result": 1}));
        let session = mock.session();
        let v = session.execute_cdp("Runtime.evaluate", json!({"expression": "1"})).unwrap();
        assert_eq!(v, json!({"result": 1}));
        let reqs = mock.requests();
        assert_eq!(reqs[0].url, "/session/mock-session/goog/cdp/execute");
        assert_eq!(
            reqs[0].body,
            Some(json!({"cmd": "Runtime.evaluate", "params": {"expression": "1"}}))
        );
    }

    #[test]
    fn test_network_conditions_endpoints() {
        let mock = MockDriverSync::new();
        mock.on_request(
            RequestMethod::Get,
            "/chromium/network_conditions",
            json!({"offline": true, "latency": 5, "download_throughput": 100, "upload_throughput": 50}),
        );
        let session = mock.session();
        let conditions = session.get_network_conditions().unwrap();
        assert!(conditions.offline);
        assert_eq!(conditions.latency, 5);
        session.delete_network_conditions().unwrap();
        assert_eq!(mock.requests_to(RequestMethod::Delete, "/chromium/network_conditions").len(), 1);
    }
}
