use std::fmt;
use std::ops::Add;

use crate::error::{WebDriverError, WebDriverResult};

/// Special keys, using the W3C WebDriver code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keys {
    Null,
    Cancel,
    Help,
    Backspace,
    Tab,
    Clear,
    Return,
    Enter,
    Shift,
    Control,
    Alt,
    Pause,
    Escape,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    Insert,
    Delete,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Meta,
}

impl Keys {
    pub fn value(&self) -> char {
        match self {
            Keys::Null => '\u{e000}',
            Keys::Cancel => '\u{e001}',
            Keys::Help => '\u{e002}',
            Keys::Backspace => '\u{e003}',
            Keys::Tab => '\u{e004}',
            Keys::Clear => '\u{e005}',
            Keys::Return => '\u{e006}',
            Keys::Enter => '\u{e007}',
            Keys::Shift => '\u{e008}',
            Keys::Control => '\u{e009}',
            Keys::Alt => '\u{e00a}',
            Keys::Pause => '\u{e00b}',
            Keys::Escape => '\u{e00c}',
            Keys::Space => '\u{e00d}',
            Keys::PageUp => '\u{e00e}',
            Keys::PageDown => '\u{e00f}',
            Keys::End => '\u{e010}',
            Keys::Home => '\u{e011}',
            Keys::Left => '\u{e012}',
            Keys::Up => '\u{e013}',
            Keys::Right => '\u{e014}',
            Keys::Down => '\u{e015}',
            Keys::Insert => '\u{e016}',
            Keys::Delete => '\u{e017}',
            Keys::F1 => '\u{e031}',
            Keys::F2 => '\u{e032}',
            Keys::F3 => '\u{e033}',
            Keys::F4 => '\u{e034}',
            Keys::F5 => '\u{e035}',
            Keys::F6 => '\u{e036}',
            Keys::F7 => '\u{e037}',
            Keys::F8 => '\u{e038}',
            Keys::F9 => '\u{e039}',
            Keys::F10 => '\u{e03a}',
            Keys::F11 => '\u{e03b}',
            Keys::F12 => '\u{e03c}',
            Keys::Meta => '\u{e03d}',
        }
    }

    /// Look up a key by the name used inside `{...}` in a keystroke string.
    pub fn from_name(name: &str) -> Option<Keys> {
        let key = match name.to_ascii_uppercase().as_str() {
            "ENTER" => Keys::Enter,
            "RETURN" => Keys::Return,
            "TAB" => Keys::Tab,
            "ESC" | "ESCAPE" => Keys::Escape,
            "BACKSPACE" | "BS" | "BKSP" => Keys::Backspace,
            "DELETE" | "DEL" => Keys::Delete,
            "INSERT" | "INS" => Keys::Insert,
            "HOME" => Keys::Home,
            "END" => Keys::End,
            "PGUP" | "PAGEUP" => Keys::PageUp,
            "PGDN" | "PAGEDOWN" => Keys::PageDown,
            "UP" => Keys::Up,
            "DOWN" => Keys::Down,
            "LEFT" => Keys::Left,
            "RIGHT" => Keys::Right,
            "SPACE" => Keys::Space,
            "HELP" => Keys::Help,
            "BREAK" | "CANCEL" => Keys::Cancel,
            "CLEAR" => Keys::Clear,
            "PAUSE" => Keys::Pause,
            "F1" => Keys::F1,
            "F2" => Keys::F2,
            "F3" => Keys::F3,
            "F4" => Keys::F4,
            "F5" => Keys::F5,
            "F6" => Keys::F6,
            "F7" => Keys::F7,
            "F8" => Keys::F8,
            "F9" => Keys::F9,
            "F10" => Keys::F10,
            "F11" => Keys::F11,
            "F12" => Keys::F12,
            _ => return None,
        };
        Some(key)
    }
}

/// A sequence of characters and special keys to type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingData {
    data: Vec<char>,
}

impl TypingData {
    pub fn as_vec(&self) -> Vec<char> {
        self.data.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Parse a keystroke string into the keys it represents.
    ///
    /// `^`, `+` and `%` hold Control, Shift and Alt for the next character,
    /// `{KEY}` group or `(...)` group. `~` is Enter. `{KEY N}` repeats a key
    /// N times and `{^}` (or any single character in braces) is that
    /// character literally.
    ///
    /// ```rust
    /// # use widgetdriver_sync::{Keys, TypingData};
    /// let keys = TypingData::from_keystrokes("^a{Delete}").unwrap();
    /// let expected = TypingData::from(Keys::Control) + "a" + Keys::Null + Keys::Delete;
    /// assert_eq!(keys, expected);
    /// ```
    pub fn from_keystrokes(keystrokes: &str) -> WebDriverResult<TypingData> {
        let mut out = Vec::new();
        let chars: Vec<char> = keystrokes.chars().collect();
        let mut pos = 0;
        let mut modifiers: Vec<Keys> = Vec::new();

        while pos < chars.len() {
            let c = chars[pos];
            let modifier = match c {
                '^' => Some(Keys::Control),
                '+' => Some(Keys::Shift),
                '%' => Some(Keys::Alt),
                _ => None,
            };
            if let Some(m) = modifier {
                modifiers.push(m);
                pos += 1;
                continue;
            }

            let (token, next) = match c {
                '~' => (vec![Keys::Enter.value()], pos + 1),
                '{' => parse_braced(&chars, pos)?,
                '(' if !modifiers.is_empty() => {
                    let end = find_closing(&chars, pos, ')')?;
                    (chars[pos + 1..end].to_vec(), end + 1)
                }
                _ => (vec![c], pos + 1),
            };

            if modifiers.is_empty() {
                out.extend(token);
            } else {
                out.extend(modifiers.iter().map(|m| m.value()));
                out.extend(token);
                out.push(Keys::Null.value());
                modifiers.clear();
            }
            pos = next;
        }

        if !modifiers.is_empty() {
            return Err(WebDriverError::general(format!(
                "Keystrokes '{}' end with a dangling modifier",
                keystrokes
            )));
        }
        Ok(TypingData {
            data: out,
        })
    }
}

fn find_closing(chars: &[char], start: usize, close: char) -> WebDriverResult<usize> {
    // Skip the first character after the opener so "{}}" yields a literal '}'.
    chars
        .iter()
        .enumerate()
        .skip(start + 2)
        .find(|(_, c)| **c == close)
        .map(|(i, _)| i)
        .ok_or_else(|| {
            WebDriverError::general(format!(
                "Unbalanced '{}' in keystrokes '{}'",
                close,
                chars.iter().collect::<String>()
            ))
        })
}

fn parse_braced(chars: &[char], start: usize) -> WebDriverResult<(Vec<char>, usize)> {
    let end = find_closing(chars, start, '}')?;
    let inner: String = chars[start + 1..end].iter().collect();
    if inner.chars().count() == 1 {
        return Ok((inner.chars().collect(), end + 1));
    }

    let mut parts = inner.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let repeat = match parts.next() {
        Some(n) => n.parse::<usize>().map_err(|_| {
            WebDriverError::general(format!("Invalid repeat count in '{{{}}}'", inner))
        })?,
        None => 1,
    };

    match Keys::from_name(name) {
        Some(key) => Ok((vec![key.value(); repeat], end + 1)),
        None => Err(WebDriverError::general(format!("Unknown key '{{{}}}'", inner))),
    }
}

impl fmt::Display for TypingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data.iter().collect::<String>())
    }
}

impl From<&str> for TypingData {
    fn from(value: &str) -> Self {
        TypingData {
            data: value.chars().collect(),
        }
    }
}

impl From<String> for TypingData {
    fn from(value: String) -> Self {
        TypingData::from(value.as_str())
    }
}

impl From<&String> for TypingData {
    fn from(value: &String) -> Self {
        TypingData::from(value.as_str())
    }
}

impl From<Keys> for TypingData {
    fn from(value: Keys) -> Self {
        TypingData {
            data: vec![value.value()],
        }
    }
}

impl<S> Add<S> for TypingData
where
    S: Into<TypingData>,
{
    type Output = TypingData;

    fn add(mut self, rhs: S) -> Self::Output {
        self.data.extend(rhs.into().data);
        self
    }
}

impl<S> Add<S> for Keys
where
    S: Into<TypingData>,
{
    type Output = TypingData;

    fn add(self, rhs: S) -> Self::Output {
        TypingData::from(self) + rhs
    }
}
