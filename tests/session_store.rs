use serde_json::json;
use widgetdriver_sync::session_store::{SessionInfo, SessionStore, SESSION_FILE};
use widgetdriver_sync::DesiredCapabilities;

#[test]
fn sessions_survive_between_stores() {
    let dir = tempfile::tempdir().unwrap();

    let mut caps = DesiredCapabilities::chrome();
    caps.set("browserVersion", "118.0").unwrap();
    caps.set("platformName", "linux").unwrap();
    caps.set("excludeSwitches", json!("enable-automation")).unwrap();
    let info = SessionInfo::from_capabilities("login", "http://grid:4444", "a1b2", &caps);

    let writer = SessionStore::in_dir(dir.path());
    writer.store(&info).unwrap();
    writer.store(&SessionInfo::new("report", "http://grid:4444", "c3d4", "firefox")).unwrap();
    assert!(dir.path().join(SESSION_FILE).exists());

    let reader = SessionStore::in_dir(dir.path());
    let login = reader.retrieve("login").unwrap().unwrap();
    assert_eq!(login.browser, "chrome");
    assert_eq!(login.browser_version, "118.0");
    assert_eq!(login.platform, "linux");
    assert_eq!(login.extra.get("excludeSwitches").map(String::as_str), Some("enable-automation"));
    assert!(!login.is_current);

    assert_eq!(reader.retrieve_last().unwrap().unwrap().id, "report");
    reader.set_last("login").unwrap();
    assert!(writer.retrieve("login").unwrap().unwrap().is_current);

    writer.delete("login").unwrap();
    assert!(reader.retrieve_last().unwrap().is_none());
    let ids: Vec<String> = reader.sessions().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["report".to_string()]);

    reader.delete_file().unwrap();
    assert!(writer.sessions().unwrap().is_empty());
}
