// The option lookups here started as a port of the Select class from the
// python selenium library at:
// https://github.com/SeleniumHQ/selenium/blob/trunk/py/selenium/webdriver/support/select.py

// Copyright 2021 Stephen Pryde and the thirtyfour_sync contributors
// Derived (and modified) from the Selenium project at https://github.com/SeleniumHQ/selenium.
//
// Copyright 2011-2020 Software Freedom Conservancy
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::convert::TryFrom;

use log::debug;

use crate::common::command::By;
use crate::common::keys::Keys;
use crate::component::{Component, ATTRIBUTE_MULTIPLE, ATTRIBUTE_VALUE, TAG_HTML_SELECT};
use crate::components::combobox::{deselect_all_unsupported, force_refresh, Selectable};
use crate::components::ensure_supported;
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::model::Element;
use crate::webelement::WebElement;

pub const SUPPORTED_CLASSES: [&str; 1] = [TAG_HTML_SELECT];
const TAG_OPTION: &str = "option";

/// Escape the specified string for use in an XPath selector.
pub fn escape_string(value: &str) -> String {
    let contains_single = value.contains('\'');
    let contains_double = value.contains('\"');
    if contains_single && contains_double {
        let mut result = vec![String::from("concat(")];
        for substring in value.split('\"') {
            result.push(format!("\"{}\"", substring));
            result.push(String::from(", '\"', "));
        }
        result.pop();
        return result.join("") + ")";
    }

    if contains_double {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}

/// The longest space-separated word of `value`.
pub fn get_longest_token(value: &str) -> &str {
    value.split(' ').fold("", |longest, item| if item.len() > longest.len() { item } else { longest })
}

/// Operates a plain HTML `<select>`.
#[derive(Debug)]
pub struct HtmlSelect {
    multiple: bool,
}

impl HtmlSelect {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Html, &SUPPORTED_CLASSES)?;
        let multiple = component.get_attribute(ATTRIBUTE_MULTIPLE)?.filter(|x| x != "false").is_some();
        Ok(HtmlSelect {
            multiple,
        })
    }

    fn option_elements<'a>(&self, component: &Component<'a>) -> WebDriverResult<Vec<WebElement<'a>>> {
        component.with_element(|e| e.find_elements(By::Tag(TAG_OPTION)))
    }

    /// Flip the option's selection state if it is not `select` already.
    ///
    /// A failing click is only logged; the selection is read back afterwards.
    fn set_selected(&self, component: &Component<'_>, option: &WebElement<'_>, select: bool) -> WebDriverResult<()> {
        if option.is_selected()? == select {
            return Ok(());
        }
        let before = component.element_id();
        if let Err(e) = option.click() {
            debug!("Met {}", e);
        }
        force_refresh(component, &before);
        Ok(())
    }

    fn options_by_text<'a>(&self, component: &Component<'a>, text: &str) -> WebDriverResult<Vec<WebElement<'a>>> {
        let xpath = format!(".//option[normalize-space(.) = {}]", escape_string(text));
        let element = component.element();
        let options = element.find_elements(By::XPath(&xpath))?;
        if !options.is_empty() || !text.contains(' ') {
            return Ok(options);
        }

        let token = get_longest_token(text);
        let candidates = if token.is_empty() {
            self.option_elements(component)?
        } else {
            let xpath = format!(".//option[contains(.,{})]", escape_string(token));
            element.find_elements(By::XPath(&xpath))?
        };
        let mut matched = Vec::new();
        for candidate in candidates {
            if candidate.text()? == text {
                matched.push(candidate);
            }
        }
        Ok(matched)
    }

    fn set_selection_by_text(&self, component: &Component<'_>, text: &str, select: bool) -> WebDriverResult<()> {
        let options = self.options_by_text(component, text)?;
        if options.is_empty() {
            return Err(WebDriverError::general(format!("Cannot locate element with text: {}", text)));
        }
        for option in &options {
            self.set_selected(component, option, select)?;
            if !self.multiple {
                break;
            }
        }
        Ok(())
    }

    fn set_selection_by_value(&self, component: &Component<'_>, value: &str, select: bool) -> WebDriverResult<()> {
        let xpath = format!(".//option[@value = {}]", escape_string(value));
        let options = component.element().find_elements(By::XPath(&xpath))?;
        if options.is_empty() {
            return Err(WebDriverError::general(format!("Cannot locate option with value: {}", value)));
        }
        for option in &options {
            self.set_selected(component, option, select)?;
            if !self.multiple {
                break;
            }
        }
        Ok(())
    }

    fn set_selection_by_index(&self, component: &Component<'_>, index: i64, select: bool) -> WebDriverResult<()> {
        let options = self.option_elements(component)?;
        let option = usize::try_from(index)
            .ok()
            .and_then(|i| options.get(i))
            .ok_or_else(|| WebDriverError::general(format!("Cannot locate option with index: {}", index)))?;
        self.set_selected(component, option, select)
    }

    fn check_multiple(&self) -> WebDriverResult<()> {
        if self.multiple {
            Ok(())
        } else {
            Err(WebDriverError::widget(
                ErrorCode::NotSupported,
                "You may only deselect options of a multi-select",
            ))
        }
    }

    fn press_escape(&self, component: &Component<'_>) -> WebDriverResult<()> {
        if let Err(e) = component.element().send_keys(Keys::Escape) {
            debug!("Met {}", e);
            component.input_keys("ComboBox", "{Esc}")?;
        }
        Ok(())
    }
}

impl Selectable for HtmlSelect {
    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn options(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        let mut options = Vec::new();
        for (i, option) in self.option_elements(component)?.iter().enumerate() {
            options.push(Element {
                label: Some(option.text()?.trim().to_string()),
                value: option.get_attribute(ATTRIBUTE_VALUE)?,
                index: Some(i as i64),
                selected: option.is_selected()?,
                disabled: !option.is_enabled()?,
                tag: Some(TAG_OPTION.to_string()),
                element_id: Some(option.element_id.clone()),
                ..Default::default()
            });
        }
        Ok(options)
    }

    fn select_by_visible_text(&self, component: &Component<'_>, text: &str) -> WebDriverResult<()> {
        self.set_selection_by_text(component, text, true)
    }

    fn select_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<()> {
        self.set_selection_by_index(component, index, true)
    }

    fn select_by_value(&self, component: &Component<'_>, value: &str) -> WebDriverResult<()> {
        self.set_selection_by_value(component, value, true)
    }

    fn deselect_all(&self, component: &Component<'_>) -> WebDriverResult<()> {
        if !self.multiple {
            return Err(deselect_all_unsupported(false));
        }
        for option in self.option_elements(component)? {
            self.set_selected(component, &option, false)?;
        }
        Ok(())
    }

    fn deselect_by_value(&self, component: &Component<'_>, value: &str) -> WebDriverResult<()> {
        self.check_multiple()?;
        self.set_selection_by_value(component, value, false)
    }

    fn deselect_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<()> {
        self.check_multiple()?;
        self.set_selection_by_index(component, index, false)
    }

    fn deselect_by_visible_text(&self, component: &Component<'_>, text: &str) -> WebDriverResult<()> {
        self.check_multiple()?;
        self.set_selection_by_text(component, text, false)
    }

    fn hide_popup(&self, component: &Component<'_>) -> WebDriverResult<()> {
        self.press_escape(component).map_err(|e| {
            debug!("Met {}", e);
            WebDriverError::widget(ErrorCode::FailClosePopup, "Fail to hide the combo-box's popup.")
        })
    }

    fn show_popup(&self, component: &Component<'_>) -> WebDriverResult<()> {
        self.press_escape(component)
            .and_then(|_| component.element().click())
            .map_err(|e| {
                debug!("Met {}", e);
                WebDriverError::widget(ErrorCode::FailOpenPopup, "Fail to show the combo-box's popup.")
            })
    }
}
