//! Combo boxes: HTML `<select>`, SAP UI5 combo boxes and selects, and the
//! Dojo Select, ComboBox and FilteringSelect widgets.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};

use crate::common::types::ElementId;
use crate::component::{no_operable, Component, OperableCache};
use crate::domain::Domain;
use crate::error::{ErrorCode, WebDriverError, WebDriverResult};
use crate::model::Element;
use crate::webelement::WebElement;

pub mod dojo;
pub mod html;
pub mod sap;

pub use dojo::{DojoSelect, DojoSelectKind};
pub use html::HtmlSelect;
pub use sap::SapSelect;

/// Joins selected option texts in error details.
pub const ITEM_SEPARATOR: &str = ";";
/// Default for [`WebDriverConfig::max_refresh_times`](crate::common::config::WebDriverConfig).
pub const DEFAULT_MAX_REFRESH_TIMES: u32 = 3;

/// A toolkit-specific way of operating a combo box.
///
/// Options are [`Element`]s with a label, a value, an index and a selected
/// flag. The component is passed to every call so that a refreshed element
/// is always the one operated on.
pub trait Selectable: Send + Sync + fmt::Debug {
    fn is_multiple(&self) -> bool;

    fn options(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>>;

    fn select_by_visible_text(&self, component: &Component<'_>, text: &str) -> WebDriverResult<()>;
    fn select_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<()>;
    fn select_by_value(&self, component: &Component<'_>, value: &str) -> WebDriverResult<()>;
    fn deselect_all(&self, component: &Component<'_>) -> WebDriverResult<()>;
    fn deselect_by_value(&self, component: &Component<'_>, value: &str) -> WebDriverResult<()>;
    fn deselect_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<()>;
    fn deselect_by_visible_text(&self, component: &Component<'_>, text: &str) -> WebDriverResult<()>;
    fn hide_popup(&self, component: &Component<'_>) -> WebDriverResult<()>;
    fn show_popup(&self, component: &Component<'_>) -> WebDriverResult<()>;

    /// Labels of all options. A failure to read them gives an empty list.
    fn options_visible_text(&self, component: &Component<'_>) -> Vec<String> {
        match self.options(component) {
            Ok(options) => options.into_iter().filter_map(|o| o.label).collect(),
            Err(e) => {
                debug!("Met {}", e);
                Vec::new()
            }
        }
    }

    fn options_value(&self, component: &Component<'_>) -> Vec<String> {
        match self.options(component) {
            Ok(options) => options.into_iter().filter_map(|o| o.value).collect(),
            Err(e) => {
                debug!("Met {}", e);
                Vec::new()
            }
        }
    }

    fn option_visible_text(&self, component: &Component<'_>, index: i64) -> Option<String> {
        let text = self.item_by_index(component, index).ok().and_then(|o| o.label);
        if text.is_none() {
            warn!("Cannot get option visible text for index '{}'!", index);
        }
        text
    }

    fn option_value(&self, component: &Component<'_>, index: i64) -> Option<String> {
        let value = self.item_by_index(component, index).ok().and_then(|o| o.value);
        if value.is_none() {
            warn!("Cannot get option value for index '{}'!", index);
        }
        value
    }

    fn item_by_index(&self, component: &Component<'_>, index: i64) -> WebDriverResult<Element> {
        self.options(component)?
            .into_iter()
            .find(|o| o.index == Some(index))
            .ok_or_else(|| WebDriverError::general(format!("Cannot locate option with index: {}", index)))
    }

    fn all_selected_options(&self, component: &Component<'_>) -> WebDriverResult<Vec<Element>> {
        Ok(self.options(component)?.into_iter().filter(|o| o.selected).collect())
    }

    fn all_selected_options_text(&self, component: &Component<'_>) -> WebDriverResult<Vec<String>> {
        Ok(self.all_selected_options(component)?.into_iter().filter_map(|o| o.label).collect())
    }

    fn first_selected_option(&self, component: &Component<'_>) -> WebDriverResult<Element> {
        self.options(component)?
            .into_iter()
            .find(|o| o.selected)
            .ok_or_else(|| WebDriverError::general("No options are selected"))
    }

    fn clear_cache(&self) {}
}

/// After selecting an option, keep refreshing the component while it still
/// holds the old element, if the session asks for it.
pub(crate) fn force_refresh(component: &Component<'_>, before: &ElementId) {
    let config = component.session().config();
    let mut repeat = 0;
    while config.force_refresh && component.element_id() == *before && repeat < config.max_refresh_times {
        repeat += 1;
        debug!("Force web page refreshing, refresh repeating times: '{}'", repeat);
        component.refresh(true);
        thread::sleep(Duration::from_secs(1));
    }
}

/// Select the first scripted option accepted by `matches`.
pub(crate) fn select_scripted<P, S>(
    component: &Component<'_>,
    options: &[Element],
    matches: P,
    missing: String,
    select_option: S,
) -> WebDriverResult<()>
where
    P: Fn(&Element) -> bool,
    S: FnOnce(&Element) -> WebDriverResult<()>,
{
    let option = options.iter().find(|o| matches(o)).ok_or_else(|| WebDriverError::general(missing))?;
    if option.selected {
        return Ok(());
    }
    let before = component.element_id();
    select_option(option)?;
    force_refresh(component, &before);
    Ok(())
}

pub(crate) fn deselect_all_unsupported(multiple: bool) -> WebDriverError {
    if multiple {
        WebDriverError::not_supported()
    } else {
        only_multi_select()
    }
}

pub(crate) fn only_multi_select() -> WebDriverError {
    WebDriverError::widget(ErrorCode::NotSupported, "You may only deselect all options of a multi-select")
}

fn create_selectable(component: &Component<'_>) -> WebDriverResult<Arc<dyn Selectable>> {
    let element = component.element();
    match Domain::detect(&element) {
        Domain::Dojo => {
            for kind in DojoSelectKind::ALL.iter() {
                match DojoSelect::new(component, *kind) {
                    Ok(s) => return Ok(Arc::new(s)),
                    Err(e) => debug!("Cannot create Selectable of {}: {}", kind.class_name(), e),
                }
            }
        }
        Domain::Sap => match SapSelect::new(component) {
            Ok(s) => return Ok(Arc::new(s)),
            Err(e) => debug!("Cannot create Selectable of {:?}: {}", sap::SUPPORTED_CLASSES, e),
        },
        Domain::Html => match HtmlSelect::new(component) {
            Ok(s) => return Ok(Arc::new(s)),
            Err(e) => debug!("Cannot create Selectable of {:?}: {}", html::SUPPORTED_CLASSES, e),
        },
    }
    Err(no_operable())
}

fn option_matches(option: &str, item: &str, partial: bool) -> bool {
    if partial {
        option.contains(item)
    } else {
        option == item
    }
}

/// The texts of the selected options, failing with `NOTHING_SELECTED` when
/// there are none.
pub fn selected_options(select: &dyn Selectable, component: &Component<'_>) -> WebDriverResult<Vec<String>> {
    let selected = select.all_selected_options_text(component)?;
    if selected.is_empty() {
        let msg = "Nothing is selected.";
        error!("{}", msg);
        return Err(WebDriverError::widget(ErrorCode::NothingSelected, msg));
    }
    Ok(selected)
}

/// Check that one of the selected options matches `item`.
pub fn verify_selected_text(
    select: &dyn Selectable,
    component: &Component<'_>,
    item: &str,
    partial: bool,
) -> WebDriverResult<Vec<String>> {
    let selected = selected_options(select, component)?;
    if selected.iter().any(|o| option_matches(o, item, partial)) {
        return Ok(selected);
    }
    let items = selected.join(ITEM_SEPARATOR);
    let msg = format!("None of selected options '{}' can match text '{}'", items, item);
    debug!("{}", msg);
    Err(WebDriverError::widget_with_info(ErrorCode::FailVerification, msg, items))
}

/// A combo box, operated through the strategy that fits its toolkit.
///
/// # Example:
/// ```no_run
/// # use widgetdriver_sync::prelude::*;
/// # use widgetdriver_sync::components::ComboBox;
/// #
/// # fn main() -> WebDriverResult<()> {
/// #     let caps = DesiredCapabilities::chrome();
/// #     let driver = WebDriver::new("http://localhost:4444/wd/hub", &caps)?;
/// let combo = ComboBox::new(driver.find_element(By::Id("country"))?)?;
/// let selected = combo.select("Norway", true, false, false)?;
/// assert_eq!(selected, vec!["Norway".to_string()]);
/// #     Ok(())
/// # }
/// ```
pub struct ComboBox<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn Selectable>,
}

impl<'a> fmt::Debug for ComboBox<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboBox").field("component", &self.component).finish()
    }
}

impl<'a> ComboBox<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    /// Wrap a component, failing when no strategy supports its element.
    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let combo = ComboBox {
            component,
            operables: OperableCache::new(),
        };
        let select = combo.selectable()?;
        debug!("Using Operable '{:?}'", select);
        Ok(combo)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn selectable(&self) -> WebDriverResult<Arc<dyn Selectable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_selectable(&self.component))
    }

    /// Select the first option whose text is (or with `partial`, contains)
    /// `item`. Returns the texts selected afterwards.
    ///
    /// With `clean`, a multi-select is cleared first.
    pub fn select(&self, item: &str, verify: bool, partial: bool, clean: bool) -> WebDriverResult<Vec<String>> {
        let select = self.selectable()?;
        let component = &self.component;

        let options = select.options_visible_text(component);
        let to_select = options.into_iter().find(|o| option_matches(o, item, partial)).ok_or_else(|| {
            let msg = format!("Cannot find an option matching text '{}'", item);
            error!("{}", msg);
            WebDriverError::widget(ErrorCode::NoMatchingItem, msg)
        })?;

        if clean && select.is_multiple() {
            select.deselect_all(component)?;
        }
        debug!("Trying to select item '{}'", to_select);
        select.select_by_visible_text(component, &to_select)?;
        let selected = selected_options(select.as_ref(), component)?;
        if verify {
            verify_selected_text(select.as_ref(), component, item, partial)?;
        }
        Ok(selected)
    }

    /// Select the option at `index`, counted from 0.
    pub fn select_index(&self, index: i64, verify: bool, clean: bool) -> WebDriverResult<Vec<String>> {
        let select = self.selectable()?;
        let component = &self.component;

        let count = select.options(component)?.len() as i64;
        if index < 0 || index >= count {
            let msg = format!("The index '{}' is out of range.", index);
            error!("{}", msg);
            return Err(WebDriverError::widget(ErrorCode::IndexOutOfRange, msg));
        }

        if clean && select.is_multiple() {
            select.deselect_all(component)?;
        }
        debug!("Trying to select item by index '{}'", index);
        select.select_by_index(component, index)?;
        let selected = selected_options(select.as_ref(), component)?;

        if verify {
            let all = select.options_visible_text(component);
            let selected_index =
                all.iter().position(|o| selected.contains(o)).unwrap_or_else(|| all.len()) as i64;
            if selected_index != index {
                let msg = format!(
                    "Selected option index '{}' does not equal to index '{}'",
                    selected_index, index
                );
                debug!("{}", msg);
                return Err(WebDriverError::widget_with_info(
                    ErrorCode::FailVerification,
                    msg,
                    selected_index.to_string(),
                ));
            }
        }
        Ok(selected)
    }

    /// Check that `item` is among the selected options.
    pub fn verify_selected(&self, item: &str) -> WebDriverResult<Vec<String>> {
        let select = self.selectable()?;
        debug!("verifying that '{}' has been selected.", item);
        verify_selected_text(select.as_ref(), &self.component, item, false)
    }

    pub fn get_item(&self, index: i64) -> WebDriverResult<Element> {
        self.selectable()?.item_by_index(&self.component, index)
    }

    /// The labels of all options.
    pub fn get_data_list(&self) -> WebDriverResult<Vec<String>> {
        let select = self.selectable()?;
        Ok(select.options(&self.component)?.into_iter().map(|o| o.label().to_string()).collect())
    }

    pub fn show_popup(&self) -> WebDriverResult<()> {
        self.selectable()?.show_popup(&self.component)
    }

    pub fn hide_popup(&self) -> WebDriverResult<()> {
        self.selectable()?.hide_popup(&self.component)
    }

    pub fn is_multiple(&self) -> WebDriverResult<bool> {
        Ok(self.selectable()?.is_multiple())
    }

    pub fn clear_cache(&self) {
        self.operables.clear();
    }
}
