//! Recognition strings: the `key=value` locators used to find widgets, and
//! the XPath/CSS builders that produce them.
//!
//! ```rust
//! use widgetdriver_sync::rs::{self, Recognition};
//!
//! let locator = rs::text("Save", false, true);
//! assert_eq!(locator, "XPATH=.//*[ text()='Save']");
//! let recognition: Recognition = locator.parse().unwrap();
//! assert_eq!(recognition, Recognition::XPath(".//*[ text()='Save']".to_string()));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::common::command::By;
pub use crate::components::combobox::html::{escape_string, get_longest_token};
use crate::error::{ErrorCode, WebDriverError};

pub const ASSIGN_SEPARATOR: &str = "=";

/// A parsed recognition string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recognition {
    Id(String),
    Name(String),
    Css(String),
    XPath(String),
    Tag(String),
    ClassName(String),
    LinkText(String),
    PartialLinkText(String),
}

impl Recognition {
    pub fn key(&self) -> &'static str {
        match self {
            Recognition::Id(_) => "ID",
            Recognition::Name(_) => "NAME",
            Recognition::Css(_) => "CSS",
            Recognition::XPath(_) => "XPATH",
            Recognition::Tag(_) => "TAG",
            Recognition::ClassName(_) => "CLASSNAME",
            Recognition::LinkText(_) => "LINK",
            Recognition::PartialLinkText(_) => "PARTIALLINK",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Recognition::Id(v)
            | Recognition::Name(v)
            | Recognition::Css(v)
            | Recognition::XPath(v)
            | Recognition::Tag(v)
            | Recognition::ClassName(v)
            | Recognition::LinkText(v)
            | Recognition::PartialLinkText(v) => v,
        }
    }

    /// The selector that locates this recognition.
    ///
    /// A CSS selector using the non-standard `:contains()` is translated to
    /// the equivalent XPath, which is why this may return an owned query.
    pub fn to_selector(&self) -> (SelectorKind, String) {
        match self {
            Recognition::Id(v) => (SelectorKind::Id, v.clone()),
            Recognition::Name(v) => (SelectorKind::Name, v.clone()),
            Recognition::Css(v) => match css::convert_deprecated(v) {
                Some(xpath) => (SelectorKind::XPath, xpath),
                None => (SelectorKind::Css, v.clone()),
            },
            Recognition::XPath(v) => (SelectorKind::XPath, v.clone()),
            Recognition::Tag(v) => (SelectorKind::Tag, v.clone()),
            Recognition::ClassName(v) => (SelectorKind::ClassName, v.clone()),
            Recognition::LinkText(v) => (SelectorKind::LinkText, v.clone()),
            Recognition::PartialLinkText(v) => (SelectorKind::PartialLinkText, v.clone()),
        }
    }
}

/// The selector strategy of a [`Recognition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Id,
    Name,
    Css,
    XPath,
    Tag,
    ClassName,
    LinkText,
    PartialLinkText,
}

impl SelectorKind {
    pub fn by<'a>(&self, query: &'a str) -> By<'a> {
        match self {
            SelectorKind::Id => By::Id(query),
            SelectorKind::Name => By::Name(query),
            SelectorKind::Css => By::Css(query),
            SelectorKind::XPath => By::XPath(query),
            SelectorKind::Tag => By::Tag(query),
            SelectorKind::ClassName => By::ClassName(query),
            SelectorKind::LinkText => By::LinkText(query),
            SelectorKind::PartialLinkText => By::PartialLinkText(query),
        }
    }
}

impl FromStr for Recognition {
    type Err = WebDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = match s.find(ASSIGN_SEPARATOR) {
            Some(i) => (s[..i].trim(), s[i + ASSIGN_SEPARATOR.len()..].to_string()),
            None => {
                return Err(WebDriverError::widget(
                    ErrorCode::TypeIsWrong,
                    format!("Recognition string '{}' has no '{}'", s, ASSIGN_SEPARATOR),
                ))
            }
        };
        let r = match key.to_lowercase().as_str() {
            "id" => Recognition::Id(value),
            "name" => Recognition::Name(value),
            "css" => Recognition::Css(value),
            "xpath" => Recognition::XPath(value),
            "tag" | "tagname" => Recognition::Tag(value),
            "class" | "classname" => Recognition::ClassName(value),
            "link" | "linktext" => Recognition::LinkText(value),
            "partiallink" | "partiallinktext" => Recognition::PartialLinkText(value),
            _ => {
                return Err(WebDriverError::widget(
                    ErrorCode::TypeIsWrong,
                    format!("Unknown recognition key '{}' in '{}'", key, s),
                ))
            }
        };
        Ok(r)
    }
}

impl fmt::Display for Recognition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key(), ASSIGN_SEPARATOR, self.value())
    }
}

pub fn id(id: &str) -> String {
    Recognition::Id(id.to_string()).to_string()
}

pub fn xpath(xpath: &str) -> String {
    Recognition::XPath(xpath.to_string()).to_string()
}

/// `css=tag[class='class']`.
pub fn css(tag: &str, class_name: &str) -> String {
    Recognition::Css(css::from(tag, class_name)).to_string()
}

/// Locate any element by its text.
pub fn text(text: &str, partial: bool, relative: bool) -> String {
    Recognition::XPath(xpath::from_text(xpath::TAG_ANY, text, partial, relative)).to_string()
}

/// Locate any element by an attribute value.
pub fn attribute(attribute: &str, value: &str, partial: bool, relative: bool) -> String {
    Recognition::XPath(xpath::from_attribute(xpath::TAG_ANY, attribute, value, partial, relative))
        .to_string()
}

pub mod xpath {
    pub const TAG_ANY: &str = "*";
    pub const DESCENDANTS_PREFIX: &str = ".//";
    pub const ALL_ELEMENTS_PREFIX: &str = "//";
    pub const REGEX_OR: &str = "|";

    const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

    /// Quote text as an XPath string literal.
    ///
    /// Text containing `'` is expressed with `concat()`. Text that is already
    /// wrapped in single quotes is returned unchanged.
    pub fn quote(text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.len() > 1 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            return text.to_string();
        }
        if !text.contains('\'') {
            return format!("'{}'", text);
        }
        let parts: Vec<String> = text.split('\'').map(|t| format!("'{}'", t)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }

    pub fn condition(attribute: &str, value: &str, partial: bool) -> String {
        let quoted = quote(value);
        if partial {
            format!(" contains(@{}, {})", attribute, quoted)
        } else {
            format!(" @{}={}", attribute, quoted)
        }
    }

    pub fn condition_for_text(text: &str, partial: bool) -> String {
        let quoted = quote(text);
        if partial {
            format!(" contains(text(), {})", quoted)
        } else {
            format!(" text()={}", quoted)
        }
    }

    fn start(tag: &str, relative: bool) -> String {
        let prefix = if relative {
            DESCENDANTS_PREFIX
        } else {
            ALL_ELEMENTS_PREFIX
        };
        format!("{}{}[", prefix, tag.to_uppercase())
    }

    pub fn from_text(tag: &str, text: &str, partial: bool, relative: bool) -> String {
        format!("{}{}]", start(tag, relative), condition_for_text(text, partial))
    }

    pub fn from_attribute(
        tag: &str,
        attribute: &str,
        value: &str,
        partial: bool,
        relative: bool,
    ) -> String {
        format!("{}{}]", start(tag, relative), condition(attribute, value, partial))
    }

    /// `.//a|.//b` for each target.
    pub fn relative_descendants(targets: &[String]) -> String {
        targets.iter().map(|t| format!("{}{}", DESCENDANTS_PREFIX, t)).collect::<Vec<_>>().join(REGEX_OR)
    }

    /// `//a|//b` for each target.
    pub fn all_descendants(targets: &[String]) -> String {
        targets.iter().map(|t| format!("{}{}", ALL_ELEMENTS_PREFIX, t)).collect::<Vec<_>>().join(REGEX_OR)
    }

    /// Case-insensitive attribute test, e.g. `@type='text' or translate(@type, ...)='text'`.
    fn for_attribute(attribute: &str, values: &[&str]) -> String {
        values
            .iter()
            .map(|v| {
                let v = v.to_lowercase();
                format!(
                    "@{a}='{v}' or translate(@{a}, '{u}', '{l}')='{v}'",
                    a = attribute,
                    v = v,
                    u = UPPER,
                    l = LOWER
                )
            })
            .collect::<Vec<_>>()
            .join(" or ")
    }

    fn input(types: &[&str]) -> String {
        format!("input[{}]", for_attribute("type", types))
    }

    fn role(role: &str) -> String {
        format!("*[{}]", for_attribute("role", &[role]))
    }

    fn sap_class(classes: &[&str]) -> String {
        let tests: Vec<String> = classes
            .iter()
            .map(|c| format!("contains(concat(' ',@class,' '), ' {} ')", c))
            .collect();
        format!("*[{}]", tests.join(" or "))
    }

    /// The element patterns (without prefix) for a control type such as
    /// `"COMBOBOX"`, covering HTML, ARIA and SAP renderings.
    pub fn targets_of_type(control_type: &str) -> Option<Vec<String>> {
        let targets = match control_type.to_uppercase().as_str() {
            "BUTTON" => vec![
                input(&["button", "reset", "submit"]),
                "button".to_string(),
                role("button"),
                sap_class(&["sapMBtn"]),
            ],
            "CHECKBOX" => vec![input(&["checkbox"]), role("checkbox"), sap_class(&["sapMCb"])],
            "COMBOBOX" => vec!["select".to_string(), role("combobox"), sap_class(&["sapMComboBox"])],
            "EDITBOX" | "INPUTFIELD" | "TEXTBOX" | "TEXTAREA" => vec![
                input(&["email", "number", "password", "search", "tel", "text", "url"]),
                "textarea".to_string(),
                role("textbox"),
                sap_class(&["sapMInput", "sapMTextArea", "sapUiTf"]),
            ],
            "COLOR" => vec![input(&["color"])],
            "DATETIME" => vec![input(&["date", "datetime-local", "month", "time", "week"])],
            "FILE" => vec![input(&["file"])],
            "RADIO" | "RADIOBUTTON" => vec![input(&["radio"]), role("radio"), sap_class(&["sapMRbB"])],
            "RANGE" => vec![input(&["range"]), sap_class(&["sapMSlider"])],
            "IMAGE" => vec![
                "img".to_string(),
                "image".to_string(),
                input(&["image"]),
                role("img"),
                sap_class(&["sapMImg"]),
            ],
            "LIST" => vec![
                "ul".to_string(),
                "ol".to_string(),
                "input[@list]".to_string(),
                role("listbox"),
                role("list"),
                sap_class(&["sapUiList", "sapMList"]),
            ],
            "TREE" => vec![role("tree"), sap_class(&["sapUiTree"])],
            "TABLE" => vec!["table".to_string(), role("table"), sap_class(&["sapUiTable"])],
            _ => return None,
        };
        Some(targets)
    }

    /// Relative XPath matching every descendant of the given control type.
    pub fn of_type(control_type: &str) -> Option<String> {
        targets_of_type(control_type).map(|t| relative_descendants(&t))
    }

    /// Whether an element with these properties is of the given control type.
    pub fn matches_type(
        control_type: &str,
        tag: &str,
        role: Option<&str>,
        input_type: Option<&str>,
        class: Option<&str>,
    ) -> bool {
        let xpath = match of_type(control_type) {
            Some(x) => x,
            None => return false,
        };
        if let Some(r) = role.filter(|r| !r.is_empty()) {
            if xpath.contains(&format!("@role='{}'", r.to_lowercase())) {
                return true;
            }
        }
        if let Some(t) = input_type.filter(|t| !t.is_empty()) {
            if tag.eq_ignore_ascii_case("input")
                && xpath.contains(&format!("@type='{}'", t.to_lowercase()))
            {
                return true;
            }
        }
        if let Some(c) = class {
            let found = c.split_whitespace().any(|token| {
                xpath.contains(&format!("contains(concat(' ',@class,' '), ' {} ')", token))
            });
            if found {
                return true;
            }
        }
        !tag.is_empty()
            && !tag.eq_ignore_ascii_case("input")
            && xpath
                .split(REGEX_OR)
                .any(|t| t.trim_start_matches(DESCENDANTS_PREFIX) == tag.to_lowercase())
    }
}

pub mod css {
    use super::xpath;

    pub fn from(tag: &str, class_name: &str) -> String {
        format!("{}[class='{}']", tag, class_name)
    }

    /// True if the selector uses a function browsers no longer support.
    pub fn is_deprecated(selector: &str) -> bool {
        selector.contains("contains(")
    }

    /// Translate `E:contains('text')` into `//E[ contains(text(), 'text')]`.
    pub fn convert_deprecated(selector: &str) -> Option<String> {
        let trimmed = selector.trim();
        if !trimmed.ends_with(')') {
            return None;
        }
        let pivot = ":contains(";
        let start = trimmed.find(pivot)?;
        let end = trimmed.find(')')?;
        if end <= start {
            return None;
        }
        let tag = &trimmed[..start];
        let text = &trimmed[start + pivot.len()..end];
        let tag = if tag.is_empty() {
            xpath::TAG_ANY
        } else {
            tag
        };
        Some(xpath::from_text(tag, text, true, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(xpath::quote("hello"), "'hello'");
        assert_eq!(xpath::quote("hello\"work"), "'hello\"work'");
        assert_eq!(xpath::quote(" hello ' world "), "concat(' hello ', \"'\", ' world ')");
        assert_eq!(
            xpath::quote("hello'e ll' word"),
            "concat('hello', \"'\", 'e ll', \"'\", ' word')"
        );
        assert_eq!(xpath::quote(" 'already' "), " 'already' ");
    }

    #[test]
    fn test_from_text_and_attribute() {
        assert_eq!(xpath::from_text("li", "Apple", true, false), "//LI[ contains(text(), 'Apple')]");
        assert_eq!(
            xpath::from_attribute("*", "role", "treeitem", false, true),
            ".//*[ @role='treeitem']"
        );
    }

    #[test]
    fn test_recognition_parse() {
        let r: Recognition = "ID=country".parse().unwrap();
        assert_eq!(r, Recognition::Id("country".to_string()));
        let r: Recognition = "css=div[class='a=b']".parse().unwrap();
        assert_eq!(r.value(), "div[class='a=b']");
        assert!("bogus=1".parse::<Recognition>().is_err());
        assert!("nothing".parse::<Recognition>().is_err());
        assert_eq!(id("x"), "ID=x");
        assert_eq!(css("select", "dijit"), "CSS=select[class='dijit']");
    }

    #[test]
    fn test_deprecated_css() {
        assert!(css::is_deprecated("span:contains(Save)"));
        assert_eq!(
            css::convert_deprecated("span:contains(Save)"),
            Some("//SPAN[ contains(text(), 'Save')]".to_string())
        );
        let r = Recognition::Css("span:contains(Save)".to_string());
        assert_eq!(r.to_selector().0, SelectorKind::XPath);
        assert_eq!(css::convert_deprecated("div.a"), None);
    }

    #[test]
    fn test_matches_type() {
        assert!(xpath::matches_type("COMBOBOX", "select", None, None, None));
        assert!(xpath::matches_type("editbox", "input", None, Some("Text"), None));
        assert!(xpath::matches_type("TREE", "div", Some("tree"), None, None));
        assert!(xpath::matches_type("LIST", "div", None, None, Some("sapMList sapMListBase")));
        assert!(!xpath::matches_type("COMBOBOX", "input", None, Some("text"), None));
        assert!(xpath::of_type("UNKNOWN").is_none());
    }
}
