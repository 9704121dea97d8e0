use serde::Serialize;
use serde_json::Value;

use crate::error::WebDriverResult;

/// Arguments passed to `execute_script_with_args`, available to the script
/// as `arguments[0]`, `arguments[1]` and so on.
#[derive(Debug, Clone, Default)]
pub struct ScriptArgs {
    values: Vec<Value>,
}

impl ScriptArgs {
    pub fn new() -> Self {
        ScriptArgs::default()
    }

    /// Push any serializable value, including a `WebElement`.
    pub fn push<T>(&mut self, value: T) -> WebDriverResult<&mut Self>
    where
        T: Serialize,
    {
        self.values.push(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn push_value(&mut self, value: Value) -> &mut Self {
        self.values.push(value);
        self
    }

    pub fn get_args(&self) -> Vec<Value> {
        self.values.clone()
    }
}
