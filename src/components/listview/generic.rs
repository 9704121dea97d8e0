use log::debug;

use crate::component::Component;
use crate::components::ensure_supported;
use crate::components::selectable::{ContentCache, ListSelectable};
use crate::domain::Domain;
use crate::error::WebDriverResult;
use crate::js;
use crate::model::Element;

pub const SUPPORTED_TAGS: [&str; 2] = ["ul", "ol"];

/// A plain HTML list; its items are the `LI` elements.
#[derive(Debug, Default)]
pub struct GenericList {
    cache: ContentCache<Vec<Element>>,
}

impl GenericList {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Html, &SUPPORTED_TAGS)?;
        Ok(GenericList::default())
    }
}

impl ListSelectable for GenericList {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        let ret = component.with_element(|e| js::call_on(e, &js::GENERIC_GET_LIST_ITEMS, &[]))?;
        let items = ret
            .get_elements()?
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut item = Element::from_web_element(e);
                item.index = Some(i as i64);
                item
            })
            .collect::<Vec<_>>();
        debug!("{} items in list {}", items.len(), component.element_id());
        Ok(items)
    }

    fn cache(&self) -> &ContentCache<Vec<Element>> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::RequestMethod;
    use crate::common::types::ElementId;
    use crate::components::listview::ListView;
    use crate::components::ClickOptions;
    use crate::error::ErrorCode;
    use crate::http::mock_sync::{element_json, MockDriverSync};
    use crate::model::TextMatchingCriterion;
    use crate::webelement::WebElement;
    use serde_json::json;

    fn ul_mock() -> MockDriverSync {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/ul/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/ul/name", json!("ul"));
        mock.on_script("return generic_getListItems(", json!([element_json("li0"), element_json("li1"), element_json("li2")]));
        for (id, text) in &[("li0", "Red"), ("li1", "Green"), ("li2", "Blue")] {
            mock.on_request(RequestMethod::Get, &format!("/element/{}/text", id), json!(text));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/enabled", id), json!(true));
            mock.on_request(RequestMethod::Get, &format!("/element/{}/displayed", id), json!(true));
        }
        mock.on_request(RequestMethod::Get, "/element/li1/selected", json!(true));
        mock
    }

    #[test]
    fn test_items_are_indexed_li_elements() {
        let mock = ul_mock();
        let session = mock.session();
        let list = ListView::new(WebElement::new(&session, ElementId::from("ul"))).unwrap();

        let content = list.content().unwrap();
        let labels: Vec<&str> = content.iter().map(|i| i.label()).collect();
        assert_eq!(labels, vec!["Red", "Green", "Blue"]);
        assert_eq!(content[2].index, Some(2));
        assert!(content[1].selected);

        list.select_index(2, false, &ClickOptions::new()).unwrap();
        assert_eq!(mock.requests_to(RequestMethod::Post, "/element/li2/click").len(), 1);

        list.verify_item_selection(&TextMatchingCriterion::new("Green", false, 0), true).unwrap();
        list.verify_contains(&TextMatchingCriterion::new("Blu", true, 0)).unwrap();
        let err = list.verify_contains(&TextMatchingCriterion::new("Pink", false, 0)).unwrap_err();
        assert_eq!(err.to_string(), "VERIFICATION_FAIL: verification error: does not contain element 'Pink'");
    }

    #[test]
    fn test_not_a_list() {
        let mock = MockDriverSync::new();
        mock.on_request(RequestMethod::Get, "/element/d1/displayed", json!(true));
        mock.on_request(RequestMethod::Get, "/element/d1/name", json!("div"));
        let session = mock.session();
        let err = ListView::new(WebElement::new(&session, ElementId::from("d1"))).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ObjectIsNull));

        let component = Component::new(WebElement::new(&session, ElementId::from("d1"))).unwrap();
        let err = GenericList::new(&component).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TypeIsWrong));
    }
}
