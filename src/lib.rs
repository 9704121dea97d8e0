//! Widgetdriver is a synchronous WebDriver library for Rust that drives
//! composite UI widgets (combo boxes, trees, menus, lists, tabs, check boxes,
//! scroll bars and edit boxes) built with plain HTML, SAP UI5 or Dojo.
//!
//! Each widget facade wraps a [`WebElement`], detects which toolkit rendered
//! it and picks a strategy for that toolkit. Strategies talk to the page with
//! the W3C WebDriver protocol and, where the toolkit has its own API, with
//! injected JavaScript.
//!
//! ## Features
//!
//! - Create a new browser session directly via WebDriver (e.g. chromedriver)
//!   or via Selenium Standalone / Grid
//! - Find elements with recognition strings as well as the usual selectors
//! - Combo boxes: select, verify and read the selection of HTML selects,
//!   SAP combo boxes and Dojo `dijit.form.Select` / `FilteringSelect`
//! - Trees and menus: expand, collapse, select and verify nodes by path
//! - Lists, scroll bars and edit boxes
//! - Check boxes, and SAP / Dojo tab controls
//! - Wait for element conditions
//! - Persist session details between processes
//!
//! ## Example
//!
//! The following example assumes you have a selenium server running
//! at localhost:4444 and a page with a select element with id `country`.
//!
//! ```no_run
//! use widgetdriver_sync::prelude::*;
//!
//! fn main() -> WebDriverResult<()> {
//!     let caps = DesiredCapabilities::chrome();
//!     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
//!
//!     driver.get("http://localhost:8080/html/form.html")?;
//!
//!     let combo = ComboBox::new(driver.find_element(By::Id("country"))?)?;
//!     combo.select("Norway", true, false, false)?;
//!     combo.verify_selected("Norway")?;
//!
//!     let tree = Tree::new(driver.find_element(By::Id("files"))?)?;
//!     let reports = TextMatchingCriterion::from_path("Documents->Reports", false, None);
//!     tree.expand_item(&reports, false, true)?;
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::needless_doctest_main)]

pub use common::{
    capabilities::{Browser, DesiredCapabilities},
    command::{By, ExtensionCommand, RequestMethod},
    keys::{Keys, TypingData},
    scriptargs::ScriptArgs,
    types::*,
};

pub use component::Component;
pub use components::{CheckBox, ComboBox, EditBox, ListView, Menu, ScrollBar, ScrollBarType, TabControl, Tree};
pub use session::WebDriverSession;
pub use webdriver::GenericWebDriver;
pub use webdriver::WebDriver;
pub use webdrivercommands::WebDriverCommands;
pub use webelement::WebElement;

pub mod prelude {
    pub use crate::common::capabilities::DesiredCapabilities;
    pub use crate::common::command::By;
    pub use crate::common::keys::{Keys, TypingData};
    pub use crate::common::scriptargs::ScriptArgs;
    pub use crate::components::{
        CheckBox, ClickOptions, ComboBox, EditBox, ListView, Menu, ScrollBar, ScrollBarType, TabControl, Tree,
    };
    pub use crate::error::WebDriverResult;
    pub use crate::model::TextMatchingCriterion;
    pub use crate::query::ElementWaitable;
    pub use crate::webdriver::WebDriver;
    pub use crate::webdrivercommands::{ScriptRetSync, WebDriverCommands};
    pub use crate::webelement::WebElement;
}

pub mod common;
pub mod error;
pub mod http {
    pub mod connection_sync;
    pub mod mock_sync;
    pub mod reqwest_sync;
}

mod action_chain;
pub mod chrome;
pub mod component;
pub mod components;
pub mod domain;
pub mod js;
pub mod model;
pub mod query;
pub mod rs;
mod session;
pub mod session_store;
mod webdriver;
mod webdrivercommands;
mod webelement;

pub use action_chain::ActionChain;
