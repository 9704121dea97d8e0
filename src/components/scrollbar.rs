//! Scroll bars.
//!
//! A `sap.ui.core.ScrollBar` is moved through its own API. Anything else is
//! scrolled with `scrollBy`, which moves the element's scroll area or, when
//! it has none, the window.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};
use serde_json::json;

use crate::component::{Component, OperableCache};
use crate::components::ensure_supported;
use crate::domain::Domain;
use crate::error::{WebDriverError, WebDriverResult};
use crate::js::{self, sap, JsFunction};
use crate::webelement::WebElement;

/// One page is this many steps.
pub const STEPS_OF_A_PAGE: i64 = 7;

/// Pixels moved by one step of a plain scroll area.
pub const PIXELS_OF_A_STEP: i64 = 20;

pub const CLASS_NAME_SCROLLBAR: &str = "sap.ui.core.ScrollBar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBarType {
    Horizontal,
    Vertical,
}

impl fmt::Display for ScrollBarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollBarType::Horizontal => f.write_str("horizontally"),
            ScrollBarType::Vertical => f.write_str("vertically"),
        }
    }
}

/// Negative amounts scroll left or up.
pub trait Scrollable: Send + Sync + fmt::Debug {
    fn scroll(&self, component: &Component<'_>, bar: ScrollBarType, steps: i64) -> WebDriverResult<()>;

    fn page(&self, component: &Component<'_>, bar: ScrollBarType, pages: i64) -> WebDriverResult<()>;
}

#[derive(Debug)]
pub struct SapScrollBar;

impl SapScrollBar {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_SCROLLBAR])?;
        Ok(SapScrollBar)
    }

    fn run(component: &Component<'_>, function: &JsFunction, amount: i64, failure: String) -> WebDriverResult<()> {
        match component.with_element(|e| js::call_on(e, function, &[json!(amount)])) {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Met {}", e);
                Err(WebDriverError::general(failure))
            }
        }
    }
}

impl Scrollable for SapScrollBar {
    fn scroll(&self, component: &Component<'_>, bar: ScrollBarType, steps: i64) -> WebDriverResult<()> {
        Self::run(
            component,
            &sap::SAP_SCROLLBAR_SCROLL,
            steps,
            format!("Fail to scroll {} '{}' steps.", bar, steps),
        )
    }

    fn page(&self, component: &Component<'_>, bar: ScrollBarType, pages: i64) -> WebDriverResult<()> {
        Self::run(
            component,
            &sap::SAP_SCROLLBAR_PAGE,
            pages,
            format!("Fail to scroll {} '{}' pages.", bar, pages),
        )
    }
}

#[derive(Debug)]
pub struct GenericScrollBar;

impl GenericScrollBar {
    fn scroll_by(component: &Component<'_>, bar: ScrollBarType, pixels: i64) -> WebDriverResult<()> {
        let (x, y) = match bar {
            ScrollBarType::Horizontal => (pixels, 0),
            ScrollBarType::Vertical => (0, pixels),
        };
        component.with_element(|e| js::call_on(e, &js::SCROLL_BY, &[json!(x), json!(y)]))?;
        Ok(())
    }
}

impl Scrollable for GenericScrollBar {
    fn scroll(&self, component: &Component<'_>, bar: ScrollBarType, steps: i64) -> WebDriverResult<()> {
        Self::scroll_by(component, bar, steps.saturating_mul(PIXELS_OF_A_STEP)).map_err(|e| {
            error!("Met {}", e);
            WebDriverError::general(format!("Fail to scroll {} '{}' steps.", bar, steps))
        })
    }

    fn page(&self, component: &Component<'_>, bar: ScrollBarType, pages: i64) -> WebDriverResult<()> {
        Self::scroll_by(component, bar, pages.saturating_mul(STEPS_OF_A_PAGE * PIXELS_OF_A_STEP)).map_err(|e| {
            error!("Met {}", e);
            WebDriverError::general(format!("Fail to scroll {} '{}' pages.", bar, pages))
        })
    }
}

fn create_scrollable(component: &Component<'_>) -> WebDriverResult<Arc<dyn Scrollable>> {
    if Domain::detect(&component.element()) == Domain::Sap {
        match SapScrollBar::new(component) {
            Ok(s) => return Ok(Arc::new(s)),
            Err(e) => debug!("Cannot create a SAP ScrollBar: {}", e),
        }
    }
    warn!("scrolling {} with scrollBy.", component.element());
    Ok(Arc::new(GenericScrollBar))
}

pub struct ScrollBar<'a> {
    component: Component<'a>,
    operables: OperableCache<dyn Scrollable>,
}

impl<'a> fmt::Debug for ScrollBar<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBar").field("component", &self.component).finish()
    }
}

impl<'a> ScrollBar<'a> {
    pub fn new(element: WebElement<'a>) -> WebDriverResult<Self> {
        Self::from_component(Component::new(element)?)
    }

    pub fn from_component(component: Component<'a>) -> WebDriverResult<Self> {
        let bar = ScrollBar {
            component,
            operables: OperableCache::new(),
        };
        bar.scrollable()?;
        Ok(bar)
    }

    pub fn component(&self) -> &Component<'a> {
        &self.component
    }

    fn scrollable(&self) -> WebDriverResult<Arc<dyn Scrollable>> {
        self.component.refresh(false);
        let key = self.component.element_id();
        self.operables.get_or_create(&key, || create_scrollable(&self.component))
    }

    pub fn scroll(&self, bar: ScrollBarType, steps: i64) -> WebDriverResult<()> {
        self.scrollable()?.scroll(&self.component, bar, steps)
    }

    pub fn page(&self, bar: ScrollBarType, pages: i64) -> WebDriverResult<()> {
        self.scrollable()?.page(&self.component, bar, pages)
    }
}
