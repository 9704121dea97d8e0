use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use widgetdriver_sync::error::ErrorCode;
use widgetdriver_sync::http::mock_sync::{element_json, MockDriverSync};
use widgetdriver_sync::prelude::*;
use widgetdriver_sync::{ElementId, RequestMethod};

const OPTIONS: [(&str, &str); 3] = [("o1", "Red"), ("o2", "Green"), ("o3", "Dark Blue")];

/// A single select whose selection moves to whichever option was clicked last.
fn country_select() -> (MockDriverSync, Arc<Mutex<String>>) {
    let mock = MockDriverSync::new();
    let selected = Arc::new(Mutex::new(String::from("o1")));

    mock.on_request(RequestMethod::Get, "/element/s1/displayed", json!(true));
    mock.on_request(RequestMethod::Get, "/element/s1/name", json!("select"));
    for (id, text) in OPTIONS.iter() {
        mock.on_request(RequestMethod::Get, &format!("/element/{}/text", id), json!(text));
        mock.on_request(RequestMethod::Get, &format!("/element/{}/enabled", id), json!(true));
    }

    let state = selected.clone();
    mock.on(move |r| {
        let id = OPTIONS.iter().map(|(id, _)| *id).find(|id| r.url.contains(&format!("/element/{}/", id)))?;
        if r.url.ends_with("/selected") {
            let current = state.lock().unwrap();
            Some(Ok(json!({ "value": *current == id })))
        } else if r.url.ends_with("/click") {
            *state.lock().unwrap() = id.to_string();
            Some(Ok(json!({ "value": null })))
        } else {
            None
        }
    });

    mock.on(|r| {
        if r.method != RequestMethod::Post || !r.url.ends_with("/element/s1/elements") {
            return None;
        }
        let body = r.body.as_ref()?;
        let query = body["value"].as_str().unwrap_or_default();
        let found: Vec<Value> = match body["using"].as_str() {
            Some("tag name") => OPTIONS.iter().map(|(id, _)| element_json(id)).collect(),
            Some("xpath") => OPTIONS
                .iter()
                .filter(|(_, text)| query.contains(&format!("\"{}\"", text)))
                .map(|(id, _)| element_json(id))
                .collect(),
            _ => Vec::new(),
        };
        Some(Ok(json!({ "value": found })))
    });
    (mock, selected)
}

#[test]
fn select_by_text_clicks_the_matching_option() {
    let (mock, selected) = country_select();
    let session = mock.session();
    let combo = ComboBox::new(WebElement::new(&session, ElementId::from("s1"))).unwrap();

    assert!(!combo.is_multiple().unwrap());
    assert_eq!(combo.get_data_list().unwrap(), vec!["Red", "Green", "Dark Blue"]);

    let result = combo.select("Green", true, false, false).unwrap();
    assert_eq!(result, vec!["Green".to_string()]);
    assert_eq!(*selected.lock().unwrap(), "o2");
    assert_eq!(mock.requests_to(RequestMethod::Post, "/element/o2/click").len(), 1);

    combo.verify_selected("Green").unwrap();
}

#[test]
fn select_by_partial_text_and_index() {
    let (mock, _) = country_select();
    let session = mock.session();
    let combo = ComboBox::new(WebElement::new(&session, ElementId::from("s1"))).unwrap();

    let result = combo.select("Blue", true, true, false).unwrap();
    assert_eq!(result, vec!["Dark Blue".to_string()]);

    let result = combo.select_index(1, true, false).unwrap();
    assert_eq!(result, vec!["Green".to_string()]);
    assert_eq!(combo.get_item(1).unwrap().label(), "Green");
}

#[test]
fn selection_errors_carry_codes() {
    let (mock, _) = country_select();
    let session = mock.session();
    let combo = ComboBox::new(WebElement::new(&session, ElementId::from("s1"))).unwrap();

    let err = combo.select("Purple", true, false, false).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::NoMatchingItem));

    let err = combo.select_index(7, true, false).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::IndexOutOfRange));

    let err = combo.verify_selected("Green").unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::FailVerification));
    assert_eq!(err.info(), Some("Red"));
}
