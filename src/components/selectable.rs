//! Selection logic shared by list views and trees.
//!
//! A strategy loads the widget's content once per DOM element and keeps it
//! in a [`ContentCache`]. Items are matched against a
//! [`TextMatchingCriterion`], clicked, and the selection is optionally
//! verified after giving the page time to react.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};

use crate::common::types::ElementId;
use crate::component::{is_visible, Component};
use crate::components::{click, ClickOptions};
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::js;
use crate::model::{
    self, Element, ElementHierarchy, NodeId, TextMatchingCriterion, INDEX_TRY_ALL_MATCHED_ITEMS,
};
use crate::webelement::WebElement;

/// Pause between refreshing the widget and checking a selection.
pub const VERIFY_SETTLE: Duration = Duration::from_millis(500);

/// Content read from a widget, kept per DOM element.
pub struct ContentCache<T> {
    contents: Mutex<HashMap<ElementId, Arc<T>>>,
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        ContentCache {
            contents: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> fmt::Debug for ContentCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.contents.lock().map(|c| c.len()).unwrap_or_default();
        write!(f, "ContentCache {{ len: {} }}", len)
    }
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        ContentCache::default()
    }

    pub fn get_or_load<F>(&self, key: &ElementId, load: F) -> WebDriverResult<Arc<T>>
    where
        F: FnOnce() -> WebDriverResult<T>,
    {
        let mut contents = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(c) = contents.get(key) {
            debug!("Get Content from cache.");
            return Ok(c.clone());
        }
        let loaded = Arc::new(load()?);
        contents.insert(key.clone(), loaded.clone());
        Ok(loaded)
    }

    pub fn clear(&self) {
        self.contents.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

fn disabled(what: &str, action: &str) -> WebDriverError {
    let msg = format!("This {} is disabled, it cannot be {}.", what, action);
    error!("{}", msg);
    WebDriverError::general(msg)
}

fn verification_error(msg: String) -> WebDriverError {
    debug!("{}", msg);
    WebDriverError::widget(ErrorCode::VerificationFail, msg)
}

/// Scroll an item to the top of the view, falling back to WebDriver's own
/// scrolling. The widget is refreshed afterwards either way.
pub fn show_on_page(component: &Component<'_>, item: &Element, element: &WebElement<'_>) -> WebDriverResult<()> {
    let shown = js::scroll_into_view(element, true).or_else(|e| {
        let msg = format!("Fail to scroll to item '{}'. Met {}", item.label(), e);
        warn!("{}", msg);
        element.scroll_into_view().map_err(|ex| {
            warn!("Fail to show item '{}' in browser's viewport, due to {}", item.label(), ex);
            WebDriverError::general(msg)
        })
    });
    component.refresh(true);
    shown
}

/// Click an item `clicks` times, scrolling it into view first when forced
/// to or when it is hidden.
pub fn click_item(
    component: &Component<'_>,
    item: &Element,
    options: &ClickOptions,
    clicks: u32,
) -> WebDriverResult<()> {
    let fail = |e: WebDriverError| {
        error!("Met {}", e);
        WebDriverError::general(format!(
            "Fail to select element by id '{}'. due to '{}'",
            item.id(),
            e
        ))
    };

    let element = item.web_element(component.session()).map_err(fail)?;
    if component.session().config().force_scroll || !is_visible(&element) {
        show_on_page(component, item, &element).map_err(fail)?;
    }
    click(&element, options, clicks).map_err(fail)
}

/// Wait for the page to settle after a click and refresh the widget.
pub fn wait_ready(component: &Component<'_>) {
    thread::sleep(component.session().config().wait_ready);
    component.refresh(true);
    thread::sleep(VERIFY_SETTLE);
}

/// Fails unless the item's own selected flag is set.
pub fn verify_selected_flag(item: &Element) -> WebDriverResult<()> {
    if item.selected {
        Ok(())
    } else {
        Err(verification_error(format!(
            "verification error: node '{}' has not been selected.",
            item.label()
        )))
    }
}

/// Check that `item` is (or is not) selected, using `wait_and_verify` which
/// fails with `VERIFICATION_FAIL` when the item is not selected.
pub fn verify_item_state<F>(item: &Element, expect_selected: bool, wait_and_verify: F) -> WebDriverResult<()>
where
    F: FnOnce() -> WebDriverResult<()>,
{
    if item.disabled {
        return Err(disabled("element", "selected"));
    }
    let ok = match wait_and_verify() {
        Ok(()) => expect_selected,
        Err(e) if e.code() == Some(ErrorCode::VerificationFail) => !expect_selected,
        Err(e) => return Err(e),
    };
    if ok {
        Ok(())
    } else {
        Err(verification_error(format!(
            "verification error: element='{}' is {}",
            item,
            if expect_selected { "unselected" } else { "selected" }
        )))
    }
}

/// Verify the selection state of the item described by `criterion`.
///
/// With [`INDEX_TRY_ALL_MATCHED_ITEMS`] every match is tried in turn until
/// one passes.
pub fn verify_criterion_selection<T, F, V>(
    criterion: &TextMatchingCriterion,
    expect_selected: bool,
    mut find: F,
    mut verify: V,
) -> WebDriverResult<()>
where
    F: FnMut(&TextMatchingCriterion) -> WebDriverResult<T>,
    V: FnMut(&T) -> WebDriverResult<()>,
{
    if criterion.expected_index() != INDEX_TRY_ALL_MATCHED_ITEMS {
        let item = find(criterion)?;
        return verify(&item);
    }

    let mut attempt = criterion.clone();
    let mut index = 0;
    loop {
        attempt.set_expected_index(index);
        match find(&attempt) {
            Ok(item) => {
                if verify(&item).is_ok() {
                    return Ok(());
                }
            }
            Err(_) => {
                warn!("cannot find matched element '{}' at {}", criterion.text().unwrap_or_default(), index);
                break;
            }
        }
        index += 1;
    }
    Err(verification_error(format!(
        "verification error: element='{}' is {}",
        criterion.text().unwrap_or_default(),
        if expect_selected { "unselected" } else { "selected" }
    )))
}

fn does_not_contain(criterion: &TextMatchingCriterion) -> WebDriverError {
    verification_error(format!(
        "verification error: does not contain element '{}'",
        criterion.text().unwrap_or_default()
    ))
}

/// A flat list of items, such as a list box.
pub trait ListSelectable: Send + Sync {
    /// Read the items from the page, bypassing the cache.
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>>;

    fn cache(&self) -> &ContentCache<Vec<Element>>;

    fn click_item(
        &self,
        component: &Component<'_>,
        item: &Element,
        options: &ClickOptions,
        clicks: u32,
    ) -> WebDriverResult<()> {
        click_item(component, item, options, clicks)
    }

    fn content(&self, component: &Component<'_>) -> WebDriverResult<Arc<Vec<Element>>> {
        self.cache().get_or_load(&component.element_id(), || self.load_content(component))
    }

    fn clear_cache(&self) {
        self.cache().clear();
    }

    fn matched_item(&self, component: &Component<'_>, criterion: &TextMatchingCriterion) -> WebDriverResult<Element> {
        let items = self.content(component).map_err(|e| {
            error!("Cannot get elements from container. {}", e);
            WebDriverError::general(format!(
                "Failed to find matching element '{}'.",
                criterion.text().unwrap_or_default()
            ))
        })?;
        model::match_list_item(&items, criterion).map(|i| i.clone())
    }

    fn item_at(&self, component: &Component<'_>, index: i64) -> WebDriverResult<Element> {
        let items = self.content(component)?;
        model::item_by_index(&items, index).map(|i| i.clone())
    }

    fn select_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        let item = self.matched_item(component, criterion)?;
        if item.disabled {
            return Err(disabled("element", "selected"));
        }
        self.click_item(component, &item, options, 1)?;
        if verify {
            self.wait_and_verify_selected(component, &item)?;
        }
        Ok(())
    }

    fn activate_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        let item = self.matched_item(component, criterion)?;
        if item.disabled {
            return Err(disabled("element", "activated"));
        }
        self.click_item(component, &item, &options.left_button(), 2)?;
        if verify {
            self.wait_and_verify_selected(component, &item)?;
        }
        Ok(())
    }

    fn select_index(
        &self,
        component: &Component<'_>,
        index: i64,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        let item = self.item_at(component, index)?;
        if item.disabled {
            return Err(disabled("item", "selected"));
        }
        self.click_item(component, &item, options, 1)?;
        if verify {
            self.wait_and_verify_selected(component, &item)?;
        }
        Ok(())
    }

    fn activate_index(
        &self,
        component: &Component<'_>,
        index: i64,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        let item = self.item_at(component, index)?;
        if item.disabled {
            return Err(disabled("item", "activated"));
        }
        self.click_item(component, &item, &options.left_button(), 2)?;
        if verify {
            self.wait_and_verify_selected(component, &item)?;
        }
        Ok(())
    }

    fn verify_item_selection(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        expect_selected: bool,
    ) -> WebDriverResult<()> {
        verify_criterion_selection(
            criterion,
            expect_selected,
            |c| self.matched_item(component, c),
            |item| {
                verify_item_state(item, expect_selected, || self.wait_and_verify_selected(component, item))
            },
        )
    }

    fn verify_index_selection(
        &self,
        component: &Component<'_>,
        index: i64,
        expect_selected: bool,
    ) -> WebDriverResult<()> {
        let item = self.item_at(component, index)?;
        verify_item_state(&item, expect_selected, || self.wait_and_verify_selected(component, &item))
    }

    fn verify_contains(&self, component: &Component<'_>, criterion: &TextMatchingCriterion) -> WebDriverResult<()> {
        self.matched_item(component, criterion).map(|_| ()).map_err(|_| does_not_contain(criterion))
    }

    fn wait_and_verify_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        wait_ready(component);
        self.verify_item_selected(component, item)
    }

    fn verify_item_selected(&self, component: &Component<'_>, item: &Element) -> WebDriverResult<()> {
        verify_selected_in_content(self, component, item)
    }
}

/// Re-read the list and look for the item among the selected ones.
pub fn verify_selected_in_content<S>(selectable: &S, component: &Component<'_>, item: &Element) -> WebDriverResult<()>
where
    S: ListSelectable + ?Sized,
{
    warn!("get all contents to check if item '{}' is selected.", item.label());
    selectable.clear_cache();
    match selectable.content(component) {
        Ok(items) => {
            if items.iter().any(|i| item.matches(i) && i.selected) {
                return Ok(());
            }
        }
        Err(e) => warn!("could not get items from container. Met {}", e),
    }
    verify_selected_flag(item)
}

/// A tree or menu: content is an [`ElementHierarchy`] and items are found by
/// path. Index based operations are not supported.
pub trait HierarchicalSelectable: Send + Sync {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<ElementHierarchy>;

    fn cache(&self) -> &ContentCache<ElementHierarchy>;

    fn content(&self, component: &Component<'_>) -> WebDriverResult<Arc<ElementHierarchy>> {
        self.cache().get_or_load(&component.element_id(), || self.load_content(component))
    }

    fn clear_cache(&self) {
        self.cache().clear();
    }

    /// The hierarchy holding the matched node, and the node itself.
    fn matched_node(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
    ) -> WebDriverResult<(Arc<ElementHierarchy>, NodeId)> {
        match self.content(component) {
            Ok(tree) => {
                let node = tree.matched_node(criterion)?;
                Ok((tree, node))
            }
            Err(e) => {
                error!("Cannot get elements from container. {}", e);
                Err(WebDriverError::general(format!(
                    "Fail to find element '{}'.",
                    criterion.text().unwrap_or_default()
                )))
            }
        }
    }

    fn click_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        options: &ClickOptions,
        clicks: u32,
    ) -> WebDriverResult<()> {
        click_item(component, tree.element(node), options, clicks)
    }

    fn select_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        let (tree, node) = self.matched_node(component, criterion)?;
        if tree.element(node).disabled {
            return Err(disabled("element", "selected"));
        }
        self.click_node(component, &tree, node, options, 1)?;
        if verify {
            self.wait_and_verify_selected(component, &tree, node)?;
        }
        Ok(())
    }

    fn activate_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        let (tree, node) = self.matched_node(component, criterion)?;
        if tree.element(node).disabled {
            return Err(disabled("element", "activated"));
        }
        self.click_node(component, &tree, node, &options.left_button(), 2)?;
        if verify {
            self.wait_and_verify_selected(component, &tree, node)?;
        }
        Ok(())
    }

    fn select_index(&self, _: &Component<'_>, _: i64, _: bool, _: &ClickOptions) -> WebDriverResult<()> {
        Err(WebDriverError::not_supported())
    }

    fn activate_index(&self, _: &Component<'_>, _: i64, _: bool, _: &ClickOptions) -> WebDriverResult<()> {
        Err(WebDriverError::not_supported())
    }

    fn verify_index_selection(&self, _: &Component<'_>, _: i64, _: bool) -> WebDriverResult<()> {
        Err(WebDriverError::not_supported())
    }

    fn verify_item_selection(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        expect_selected: bool,
    ) -> WebDriverResult<()> {
        verify_criterion_selection(
            criterion,
            expect_selected,
            |c| self.matched_node(component, c),
            |(tree, node)| {
                verify_item_state(tree.element(*node), expect_selected, || {
                    self.wait_and_verify_selected(component, tree, *node)
                })
            },
        )
    }

    fn verify_contains(&self, component: &Component<'_>, criterion: &TextMatchingCriterion) -> WebDriverResult<()> {
        self.matched_node(component, criterion).map(|_| ()).map_err(|_| does_not_contain(criterion))
    }

    fn wait_and_verify_selected(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
    ) -> WebDriverResult<()> {
        wait_ready(component);
        self.verify_node_selected(component, tree, node)
    }

    fn verify_node_selected(
        &self,
        _component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
    ) -> WebDriverResult<()> {
        verify_selected_flag(tree.element(node))
    }
}
