//! Items of widgets and the rules for finding them by text or index.

use log::{error, info, warn};
use serde_json::Value;

use crate::error::{WebDriverError, WebDriverResult};

pub mod aria;
pub mod criterion;
pub mod element;
pub mod hierarchy;
pub mod menu_item;

pub use criterion::{TextMatchingCriterion, INDEX_TRY_ALL_MATCHED_ITEMS, INVALID_INDEX};
pub use element::{parse_web_element_text, Element};
pub use hierarchy::{ElementHierarchy, HierarchicalElement, NodeId};
pub use menu_item::MenuItem;

/// Find the item of a flat list described by `criterion`.
///
/// With a text, the n-th item (0-based, n being the expected index) whose
/// label matches is taken. Without a text the item whose own `index` equals
/// the expected index is taken.
pub fn match_list_item<'e>(
    items: &'e [Element],
    criterion: &TextMatchingCriterion,
) -> WebDriverResult<&'e Element> {
    if criterion.text().is_none() {
        return item_by_index(items, criterion.expected_index());
    }

    if items.is_empty() {
        error!("did not get any items from the container");
    }
    let expected = criterion.expected_index();
    let mut matched = 0;
    for (i, item) in items.iter().enumerate() {
        if criterion.match_text(item.label()) {
            if matched == expected {
                info!("matched item '{}' at child index {}", item.label(), i);
                return Ok(item);
            }
            matched += 1;
        }
    }

    error!("Failed to find matching element {}", criterion);
    Err(WebDriverError::general(format!(
        "Failed to find matching element '{}'.",
        criterion.text().unwrap_or_default()
    )))
}

/// The item whose `index` field equals `index`.
pub fn item_by_index(items: &[Element], index: i64) -> WebDriverResult<&Element> {
    items.iter().find(|item| item.index == Some(index)).ok_or_else(|| {
        error!("Fail to find item by index '{}'", index);
        WebDriverError::general(format!("Fail to find item by index '{}'", index))
    })
}

/// Items from a script result: an array of item objects. Items without an
/// index get their position; `null` entries are skipped.
pub fn parse_items(value: &Value) -> Vec<Element> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .enumerate()
            .map(|(i, v)| {
                let mut item = Element::from_json(v);
                item.index.get_or_insert(i as i64);
                item
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("Need to handle javascript result: {}", other);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> Vec<Element> {
        vec![
            Element::from_json(&json!({"label": "Red", "index": 0})),
            Element::from_json(&json!({"label": "Green", "index": 1})),
            Element::from_json(&json!({"label": "Red", "index": 2})),
        ]
    }

    #[test]
    fn test_match_by_text_and_occurrence() {
        let items = items();
        let c = TextMatchingCriterion::new("Red", false, 1);
        assert_eq!(match_list_item(&items, &c).unwrap().index, Some(2));

        let c = TextMatchingCriterion::new("Re", false, 0);
        let err = match_list_item(&items, &c).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Failed to find matching element 'Re'.");
    }

    #[test]
    fn test_match_by_index() {
        let items = items();
        let c = TextMatchingCriterion::new_index(1);
        assert_eq!(match_list_item(&items, &c).unwrap().label(), "Green");

        let err = item_by_index(&items, 7).unwrap_err();
        assert_eq!(err.to_string(), "GENERAL: Fail to find item by index '7'");
    }

    #[test]
    fn test_parse_items_fills_index() {
        let items = parse_items(&json!([
            {"label": "A", "value": "a"},
            null,
            {"label": "B", "value": "b", "index": 7, "selected": true},
        ]));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, Some(0));
        assert_eq!(items[1].index, Some(7));
        assert!(items[1].selected);
        assert!(parse_items(&json!("oops")).is_empty());
        assert!(parse_items(&Value::Null).is_empty());
    }
}
