//! Browser sessions recorded on disk so that a later process can attach to
//! them again.
//!
//! The store is a properties file: each key is the alias a session was
//! started under, and each value holds the session's fields joined by
//! [`SPLITTER`]. The alias of the most recently stored session is kept under
//! [`LAST_SESSION_KEY`].
//!
//! ```no_run
//! use widgetdriver_sync::session_store::{SessionInfo, SessionStore};
//!
//! # fn main() -> widgetdriver_sync::error::WebDriverResult<()> {
//! let store = SessionStore::new();
//! let info = SessionInfo::new("myBrowser", "http://localhost:4444/wd/hub", "4f3c", "chrome");
//! store.store(&info)?;
//! let last = store.retrieve_last()?;
//! assert_eq!(last.map(|s| s.session), Some("4f3c".to_string()));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

use crate::common::capabilities::DesiredCapabilities;
use crate::common::connection_common::json_to_string;
use crate::error::{WebDriverError, WebDriverResult};

pub const SESSION_FILE: &str = "selenium.session.tmp";
pub const LAST_SESSION_KEY: &str = "LASTSESSION";
pub const SPLITTER: &str = "_SP_";

/// Capabilities appended, in this order, after the fixed fields.
pub const OPTIONAL_KEYS: [&str; 8] = [
    "firefoxProfile",
    "user-data-dir",
    "profile-directory",
    "chromePreference",
    "excludeSwitches",
    "firefoxPreference",
    "setNetworkConditions",
    "customCapabilities",
];

/// One recorded session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    /// The alias the session was started under.
    pub id: String,
    /// Whether this is the last stored session.
    pub is_current: bool,
    pub server_host: String,
    pub session: String,
    pub browser: String,
    pub browser_version: String,
    pub platform: String,
    /// Values of [`OPTIONAL_KEYS`], by key; absent ones are left out.
    pub extra: BTreeMap<String, String>,
}

impl SessionInfo {
    pub fn new(id: &str, server_host: &str, session: &str, browser: &str) -> Self {
        SessionInfo {
            id: id.to_string(),
            server_host: server_host.to_string(),
            session: session.to_string(),
            browser: browser.to_string(),
            ..Default::default()
        }
    }

    /// Record a session using the capabilities the server returned.
    pub fn from_capabilities(id: &str, server_host: &str, session: &str, caps: &DesiredCapabilities) -> Self {
        let read = |keys: &[&str]| {
            keys.iter().filter_map(|k| caps.get(k).and_then(json_to_string)).next().unwrap_or_default()
        };
        let mut info = SessionInfo::new(id, server_host, session, caps.browser_name().unwrap_or_default());
        info.browser_version = read(&["browserVersion", "version"]);
        info.platform = read(&["platformName", "platform"]);
        for key in OPTIONAL_KEYS.iter() {
            if let Some(v) = caps.get(key).and_then(json_to_string) {
                info.extra.insert(key.to_string(), v);
            }
        }
        info
    }

    fn parse(id: &str, is_current: bool, content: &str) -> WebDriverResult<Self> {
        let fields: Vec<&str> = content.split(SPLITTER).collect();
        if fields.len() < 3 {
            return Err(WebDriverError::general(format!(
                "Session info of '{}' is not valid or complete: '{}'",
                id, content
            )));
        }
        let field = |i: usize| fields.get(i).map(|s| s.to_string()).unwrap_or_default();
        let mut extra = BTreeMap::new();
        for (key, value) in OPTIONAL_KEYS.iter().zip(fields.iter().skip(5)) {
            if !value.is_empty() {
                extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(SessionInfo {
            id: id.to_string(),
            is_current,
            server_host: field(0),
            session: field(1),
            browser: field(2),
            browser_version: field(3),
            platform: field(4),
            extra,
        })
    }

    fn content(&self) -> String {
        let mut fields = vec![
            self.server_host.as_str(),
            self.session.as_str(),
            self.browser.as_str(),
            self.browser_version.as_str(),
            self.platform.as_str(),
        ];
        for key in OPTIONAL_KEYS.iter() {
            fields.push(self.extra.get(*key).map(|s| s.as_str()).unwrap_or_default());
        }
        fields.join(SPLITTER)
    }
}

/// Escape a key or value the way `java.util.Properties` writes them. Keys
/// also escape their spaces; values only a leading one.
fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' | '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
    out
}

/// Undo [`escape`]. `\uXXXX` escapes are UTF-16 code units, so surrogate
/// pairs decode to one char.
fn unescape(text: &str) -> String {
    fn push(units: &mut Vec<u16>, c: char) {
        let mut buf = [0u16; 2];
        units.extend_from_slice(c.encode_utf16(&mut buf));
    }

    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            push(&mut units, c);
            continue;
        }
        match chars.next() {
            Some('n') => push(&mut units, '\n'),
            Some('t') => push(&mut units, '\t'),
            Some('r') => push(&mut units, '\r'),
            Some('f') => push(&mut units, '\x0c'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let valid = hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit());
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) if valid => {
                        units.push(unit);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => {
                        warn!("malformed \\uxxxx escape in '{}'", text);
                        push(&mut units, 'u');
                    }
                }
            }
            Some(other) => push(&mut units, other),
            None => {}
        }
    }
    String::from_utf16_lossy(&units)
}

/// Split a logical line into its raw key and value. The key ends at the
/// first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                let rest = line[i..].trim_start_matches(|c| c == ' ' || c == '\t' || c == '\x0c');
                let rest = rest.strip_prefix(|c| c == '=' || c == ':').unwrap_or(rest);
                return (&line[..i], rest.trim_start_matches(|c| c == ' ' || c == '\t' || c == '\x0c'));
            }
            _ => {}
        }
    }
    (line, "")
}

fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    for line in text.lines().map(str::trim_start) {
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = split_entry(line);
        props.insert(unescape(key), unescape(value));
    }
    props
}

fn format_properties(props: &BTreeMap<String, String>, comment: &str) -> String {
    let mut out = format!("#{}\n", comment);
    for (key, value) in props {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn check_id(id: &str) -> WebDriverResult<()> {
    if id.is_empty() {
        Err(WebDriverError::general("Id cannot be null or zero-length."))
    } else {
        Ok(())
    }
}

/// The session file, and the lock serializing access to it from this
/// process.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new()
    }
}

impl SessionStore {
    /// The session file in the OS temp directory.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        SessionStore {
            path: dir.as_ref().join(SESSION_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file's properties; none when it does not exist.
    fn load(&self) -> WebDriverResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(parse_properties(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("session file does NOT exist yet: {}", self.path.display());
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, props: &BTreeMap<String, String>) -> WebDriverResult<()> {
        fs::write(&self.path, format_properties(props, &self.path.display().to_string()))?;
        Ok(())
    }

    /// Record `info` and make it the last session.
    pub fn store(&self, info: &SessionInfo) -> WebDriverResult<()> {
        check_id(&info.id)?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        debug!("storing session '{}' to {}", info.id, self.path.display());
        let mut props = self.load()?;
        props.insert(info.id.clone(), info.content());
        props.insert(LAST_SESSION_KEY.to_string(), info.id.clone());
        self.save(&props)
    }

    /// Forget a session. The last-session marker goes too when it names it.
    pub fn delete(&self, id: &str) -> WebDriverResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut props = self.load()?;
        props.remove(id);
        if props.get(LAST_SESSION_KEY).map(|s| s.as_str()) == Some(id) {
            debug!("deleting {} from session file.", LAST_SESSION_KEY);
            props.remove(LAST_SESSION_KEY);
        }
        self.save(&props)
    }

    pub fn retrieve(&self, id: &str) -> WebDriverResult<Option<SessionInfo>> {
        check_id(id)?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let props = self.load()?;
        let content = match props.get(id) {
            Some(c) => c,
            None => return Ok(None),
        };
        let is_current = props.get(LAST_SESSION_KEY).map_or(false, |last| last.eq_ignore_ascii_case(id));
        SessionInfo::parse(id, is_current, content).map(Some)
    }

    pub fn retrieve_last(&self) -> WebDriverResult<Option<SessionInfo>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let props = self.load()?;
        let id = match props.get(LAST_SESSION_KEY) {
            Some(id) => id,
            None => return Ok(None),
        };
        match props.get(id) {
            Some(content) => SessionInfo::parse(id, true, content).map(Some),
            None => {
                warn!("last session '{}' has no record.", id);
                Ok(None)
            }
        }
    }

    /// Every recorded session; records that cannot be parsed are skipped.
    pub fn sessions(&self) -> WebDriverResult<Vec<SessionInfo>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let props = self.load()?;
        let last = props.get(LAST_SESSION_KEY);
        Ok(props
            .iter()
            .filter(|(k, _)| k.as_str() != LAST_SESSION_KEY)
            .filter_map(|(k, v)| match SessionInfo::parse(k, last == Some(k), v) {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .collect())
    }

    /// Mark `id` as the last session. Nothing is written when there is no
    /// session file yet.
    pub fn set_last(&self, id: &str) -> WebDriverResult<()> {
        check_id(id)?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.path.exists() {
            debug!("session file does NOT exist: {}", self.path.display());
            return Ok(());
        }
        let mut props = self.load()?;
        props.insert(LAST_SESSION_KEY.to_string(), id.to_string());
        self.save(&props)
    }

    pub fn delete_file(&self) -> WebDriverResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());
        (dir, store)
    }

    #[test]
    fn test_store_and_retrieve() {
        let (_dir, store) = store();
        assert_eq!(store.retrieve_last().unwrap(), None);

        let mut first = SessionInfo::new("b1", "http://localhost:4444/wd/hub", "s-1", "chrome");
        first.extra.insert("user-data-dir".to_string(), "C:\\profiles\\p1".to_string());
        store.store(&first).unwrap();
        store.store(&SessionInfo::new("b2", "http://grid:4444", "s-2", "firefox")).unwrap();

        let b1 = store.retrieve("b1").unwrap().unwrap();
        assert!(!b1.is_current);
        assert_eq!(b1.server_host, "http://localhost:4444/wd/hub");
        assert_eq!(b1.extra.get("user-data-dir").map(|s| s.as_str()), Some("C:\\profiles\\p1"));
        assert_eq!(store.retrieve_last().unwrap().unwrap().id, "b2");
        assert_eq!(store.retrieve("nope").unwrap(), None);

        store.set_last("b1").unwrap();
        let ids: Vec<(String, bool)> = store.sessions().unwrap().into_iter().map(|s| (s.id, s.is_current)).collect();
        assert_eq!(ids, vec![("b1".to_string(), true), ("b2".to_string(), false)]);
    }

    #[test]
    fn test_delete_drops_last_session_marker() {
        let (_dir, store) = store();
        store.store(&SessionInfo::new("b1", "h", "s-1", "chrome")).unwrap();
        store.store(&SessionInfo::new("b2", "h", "s-2", "chrome")).unwrap();

        store.delete("b1").unwrap();
        assert_eq!(store.retrieve_last().unwrap().unwrap().id, "b2");
        store.delete("b2").unwrap();
        assert_eq!(store.retrieve_last().unwrap(), None);
        assert!(store.sessions().unwrap().is_empty());

        store.delete_file().unwrap();
        assert!(!store.path().exists());
        store.delete_file().unwrap();
    }

    #[test]
    fn test_set_last_without_file() {
        let (_dir, store) = store();
        store.set_last("b1").unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.retrieve("").unwrap_err().to_string(), "GENERAL: Id cannot be null or zero-length.");
    }

    #[test]
    fn test_reads_escaped_properties() {
        let props = parse_properties("#comment\nb1=http\\://h\\:4444_SP_s-1_SP_chrome\nLASTSESSION=b1\n");
        let info = SessionInfo::parse("b1", true, &props["b1"]).unwrap();
        assert_eq!(info.server_host, "http://h:4444");
        assert_eq!(info.browser, "chrome");
        assert_eq!(info.browser_version, "");
    }

    #[test]
    fn test_reads_unicode_escapes() {
        let props = parse_properties("user-data-dir=C\\:\\\\Users\\\\Jos\\u00e9\nkey\\ one : v\n");
        assert_eq!(props["user-data-dir"], "C:\\Users\\Jos\u{e9}");
        assert_eq!(props["key one"], "v");
    }

    #[test]
    fn test_non_ascii_round_trip() {
        let mut props = BTreeMap::new();
        props.insert("my browser=1:x".to_string(), " C:\\Users\\Jos\u{e9}\t\u{1F600} ".to_string());
        let text = format_properties(&props, "store");
        assert!(text.contains("Jos\\u00E9"), "{}", text);
        assert!(text.contains("\\uD83D\\uDE00"), "{}", text);
        assert!(text.starts_with("#store\nmy\\ browser\\=1\\:x=\\ C"), "{}", text);
        assert!(text.is_ascii());
        assert_eq!(parse_properties(&text), props);
    }

    #[test]
    fn test_from_capabilities() {
        let caps = DesiredCapabilities::new(json!({
            "browserName": "chrome",
            "browserVersion": "91.0",
            "platformName": "linux",
            "setNetworkConditions": "offline"
        }));
        let info = SessionInfo::from_capabilities("b1", "http://h", "s", &caps);
        assert_eq!(info.browser_version, "91.0");
        assert_eq!(info.platform, "linux");
        assert_eq!(info.extra.len(), 1);
        assert!(info.content().starts_with("http://h_SP_s_SP_chrome_SP_91.0_SP_linux_SP__SP_"));
    }
}
