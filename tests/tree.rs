use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use widgetdriver_sync::error::ErrorCode;
use widgetdriver_sync::http::mock_sync::{element_json, MockDriverSync};
use widgetdriver_sync::prelude::*;
use widgetdriver_sync::{ElementId, RequestMethod};

/// An ARIA tree: Fruits (f) -> Apple (a), Pear (p); Vegetables (v).
/// Double-clicking Fruits toggles its `aria-expanded` state.
fn fruit_tree(expanded: bool) -> (MockDriverSync, Arc<AtomicBool>) {
    let mock = MockDriverSync::new();
    let state = Arc::new(AtomicBool::new(expanded));

    mock.on_request(RequestMethod::Get, "/element/t1/displayed", json!(true));
    mock.on_request(RequestMethod::Get, "/element/t1/attribute/role", json!("tree"));
    let items = json!([element_json("f"), element_json("a"), element_json("p"), element_json("v")]);
    mock.on_request(RequestMethod::Post, "/element/t1/elements", items);
    for (id, text) in &[("f", "Fruits\nApple\nPear"), ("a", "Apple"), ("p", "Pear"), ("v", "Vegetables")] {
        mock.on_request(RequestMethod::Post, &format!("/element/{}/elements", id), json!([]));
        mock.on_request(RequestMethod::Get, &format!("/element/{}/text", id), json!(text));
        mock.on_request(RequestMethod::Get, &format!("/element/{}/attribute/id", id), json!(id));
        mock.on_request(RequestMethod::Get, &format!("/element/{}/enabled", id), json!(true));
        mock.on_request(RequestMethod::Get, &format!("/element/{}/selected", id), json!(false));
        mock.on_request(RequestMethod::Get, &format!("/element/{}/displayed", id), json!(true));
    }
    mock.on_request(RequestMethod::Post, "/element/f/elements", json!([element_json("a"), element_json("p")]));
    mock.on_request(RequestMethod::Get, "/element/a/attribute/aria-selected", json!("true"));

    let toggled = state.clone();
    mock.on(move |r| {
        if r.url.ends_with("/element/f/attribute/aria-expanded") {
            return Some(Ok(json!({ "value": toggled.load(Ordering::SeqCst).to_string() })));
        }
        let on_fruits = r.body.as_ref().map_or(false, |b| b.to_string().contains("\"f\""));
        if r.method == RequestMethod::Post && r.url.ends_with("/actions") && on_fruits {
            toggled.fetch_xor(true, Ordering::SeqCst);
            return Some(Ok(json!({ "value": null })));
        }
        None
    });
    (mock, state)
}

#[test]
fn expand_and_collapse_by_path() {
    let (mock, state) = fruit_tree(false);
    let session = mock.session();
    let tree = Tree::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();

    let fruits = TextMatchingCriterion::from_path("Fruits", false, None);
    tree.verify_item_expanded(&fruits, false).unwrap();

    tree.expand_item(&fruits, false, true).unwrap();
    assert!(state.load(Ordering::SeqCst));
    tree.verify_item_expanded(&fruits, true).unwrap();

    tree.collapse_item(&fruits, false, true).unwrap();
    assert!(!state.load(Ordering::SeqCst));
    assert_eq!(mock.requests_to(RequestMethod::Post, "/actions").len(), 2);
}

#[test]
fn select_and_verify_nodes() {
    let (mock, _) = fruit_tree(true);
    let session = mock.session();
    let tree = Tree::new(WebElement::new(&session, ElementId::from("t1"))).unwrap();

    let apple = TextMatchingCriterion::from_path("Fruits->Apple", false, None);
    tree.select_item(&apple, false, &ClickOptions::new()).unwrap();
    assert_eq!(mock.requests_to(RequestMethod::Post, "/element/a/click").len(), 1);
    tree.verify_item_selection(&apple, true).unwrap();

    let pear = TextMatchingCriterion::from_path("Fruits->Pear", false, None);
    tree.verify_contains(&pear).unwrap();
    tree.verify_item_selection(&pear, false).unwrap();

    let cherry = TextMatchingCriterion::from_path("Fruits->Cherry", false, None);
    let err = tree.verify_contains(&cherry).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::VerificationFail));
}
