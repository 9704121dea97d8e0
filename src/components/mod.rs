//! Facades for the supported widget types.
//!
//! Each facade wraps a [`Component`] and picks an operable strategy for the
//! toolkit that renders it (Dojo, then SAP UI5, then plain HTML). Strategies
//! are cached per DOM element, so a refreshed widget gets a fresh one.

use log::{debug, error};

use crate::common::keys::Keys;
use crate::component::Component;
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::webdrivercommands::WebDriverCommands;
use crate::webelement::WebElement;

pub mod checkbox;
pub mod combobox;
pub mod editbox;
pub mod listview;
pub mod menu;
pub mod scrollbar;
pub mod selectable;
pub mod tabcontrol;
pub mod tree;

pub use checkbox::CheckBox;
pub use combobox::ComboBox;
pub use editbox::EditBox;
pub use listview::ListView;
pub use menu::Menu;
pub use scrollbar::{ScrollBar, ScrollBarType};
pub use tabcontrol::TabControl;
pub use tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

impl Default for MouseButton {
    fn default() -> Self {
        MouseButton::Left
    }
}

/// How to click an item: an optional key held down, an optional offset from
/// the item's top-left corner and the mouse button.
#[derive(Debug, Clone, Default)]
pub struct ClickOptions {
    pub key: Option<Keys>,
    pub offset: Option<(i64, i64)>,
    pub button: MouseButton,
}

impl ClickOptions {
    pub fn new() -> Self {
        ClickOptions::default()
    }

    pub fn with_key(mut self, key: Keys) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_offset(mut self, x: i64, y: i64) -> Self {
        self.offset = Some((x, y));
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// The same options with the left button, as used for activation.
    pub fn left_button(&self) -> Self {
        ClickOptions {
            button: MouseButton::Left,
            ..self.clone()
        }
    }

    fn is_plain(&self) -> bool {
        self.key.is_none() && self.offset.is_none() && self.button == MouseButton::Left
    }
}

/// Click `element` once or twice.
///
/// A plain left click goes through WebDriver's element click; anything else
/// is sent as an action chain.
pub fn click(element: &WebElement<'_>, options: &ClickOptions, clicks: u32) -> WebDriverResult<()> {
    if options.is_plain() {
        return if clicks >= 2 {
            element.double_click()
        } else {
            element.click()
        };
    }

    let mut chain = element.session().action_chain();
    if let Some(key) = options.key {
        chain = chain.key_down(key);
    }
    chain = match options.offset {
        Some((x, y)) => {
            let rect = element.rect()?;
            let dx = x - (rect.width / 2.0) as i64;
            let dy = y - (rect.height / 2.0) as i64;
            chain.move_to_element_with_offset(element, dx, dy)
        }
        None => chain.move_to_element_center(element),
    };
    chain = match (clicks, options.button) {
        (n, _) if n >= 2 => chain.double_click(),
        (_, MouseButton::Right) => chain.context_click(),
        _ => chain.click(),
    };
    if let Some(key) = options.key {
        chain = chain.key_up(key);
    }
    chain.perform()
}

/// Fails with `TYPE_IS_WRONG` unless the component's element is one of
/// `class_names` in the given toolkit.
pub fn ensure_supported(component: &Component<'_>, domain: Domain, class_names: &[&str]) -> WebDriverResult<()> {
    if domain.supports(&component.element(), class_names) {
        return Ok(());
    }
    debug!("Supported {} classes: {:?}", domain, class_names);
    Err(unsupported_type(component))
}

pub fn unsupported_type(component: &Component<'_>) -> WebDriverError {
    let msg = format!(
        "WebElement <{} class='{}'> is not an appropriate type or is not supported yet.",
        component.tag().unwrap_or_default(),
        component.class().unwrap_or_default()
    );
    error!("{}", msg);
    WebDriverError::widget(ErrorCode::TypeIsWrong, msg)
}
