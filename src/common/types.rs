use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::common::command::MAGIC_ELEMENTID;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId {
    id: String,
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId {
            id: value,
        }
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId {
            id: value.to_string(),
        }
    }
}

impl Deref for SessionId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId {
    id: String,
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        ElementId {
            id: value,
        }
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        ElementId {
            id: value.to_string(),
        }
    }
}

impl Deref for ElementId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The W3C wire form of an element: `{"element-6066-...": "<id>"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

impl ElementRef {
    /// Extract an element reference from an arbitrary JSON value, if it is one.
    pub fn from_json(value: &serde_json::Value) -> Option<ElementId> {
        value.get(MAGIC_ELEMENTID).and_then(|v| v.as_str()).map(ElementId::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn icenter(&self) -> (i64, i64) {
        ((self.x + (self.width / 2.0)) as i64, (self.y + (self.height / 2.0)) as i64)
    }
}

/// Timeouts as reported and accepted by the W3C timeouts endpoint, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<u64>,
    #[serde(rename = "pageLoad", skip_serializing_if = "Option::is_none")]
    page_load: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    implicit: Option<u64>,
}

impl TimeoutConfiguration {
    pub fn new(
        script: Option<std::time::Duration>,
        page_load: Option<std::time::Duration>,
        implicit: Option<std::time::Duration>,
    ) -> Self {
        TimeoutConfiguration {
            script: script.map(|x| x.as_millis() as u64),
            page_load: page_load.map(|x| x.as_millis() as u64),
            implicit: implicit.map(|x| x.as_millis() as u64),
        }
    }

    pub fn script(&self) -> Option<std::time::Duration> {
        self.script.map(std::time::Duration::from_millis)
    }

    pub fn page_load(&self) -> Option<std::time::Duration> {
        self.page_load.map(std::time::Duration::from_millis)
    }

    pub fn implicit(&self) -> Option<std::time::Duration> {
        self.implicit.map(std::time::Duration::from_millis)
    }
}
