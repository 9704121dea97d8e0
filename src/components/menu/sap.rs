use std::thread;
use std::time::Duration;

use log::{debug, error, warn};
use serde_json::Value;

use crate::component::Component;
use crate::components::ensure_supported;
use crate::components::menu::{menu_item_clicked, MenuSelectable, HOME_KEY};
use crate::components::selectable::{click_item, ContentCache, HierarchicalSelectable};
use crate::components::ClickOptions;
use crate::domain::Domain;
use crate::error::{WebDriverError, WebDriverResult};
use crate::js::{self, sap, JsFunction};
use crate::model::{ElementHierarchy, MenuItem, NodeId, TextMatchingCriterion};
use crate::webdrivercommands::WebDriverCommands;

pub const CLASS_NAME_MENUBAR: &str = "sap.ui.commons.MenuBar";
pub const CLASS_NAME_MENU: &str = "sap.ui.commons.Menu";
pub const CLASS_NAME_UNIFIED_MENU: &str = "sap.ui.unified.Menu";
pub const SUPPORTED_CLASSES: [&str; 3] = [CLASS_NAME_MENUBAR, CLASS_NAME_MENU, CLASS_NAME_UNIFIED_MENU];

pub const CLASS_NAME_PUSHMENU: &str = "sas.hc.ui.commons.pushmenu.PushMenu";

/// Wait for a sub-menu to show.
const SUBMENU_PAUSE: Duration = Duration::from_millis(200);

fn load_menu(component: &Component<'_>, function: &JsFunction) -> WebDriverResult<ElementHierarchy> {
    let ret = component.with_element(|e| js::call_on(e, function, &[]))?;
    match ret.value() {
        v @ Value::Object(_) => Ok(ElementHierarchy::from_json(v)),
        other => {
            warn!("Need to handle javascript result: {}", other);
            Err(WebDriverError::general("Fail to get content from a menu."))
        }
    }
}

/// The items to open before `node` can be clicked, top level first. The
/// menu bar itself and the first `hidden_levels` levels are left out.
fn items_to_open(tree: &ElementHierarchy, node: NodeId, hidden_levels: usize) -> Vec<NodeId> {
    let mut items: Vec<NodeId> = tree.ancestors(node).into_iter().filter(|a| tree.parent(*a).is_some()).collect();
    items.reverse();
    items.into_iter().skip(hidden_levels).collect()
}

/// Open each item with a sub-menu, stopping at the first one without.
fn open_submenus<F>(tree: &ElementHierarchy, node: NodeId, hidden_levels: usize, mut open: F) -> WebDriverResult<()>
where
    F: FnMut(NodeId) -> WebDriverResult<()>,
{
    let opened = items_to_open(tree, node, hidden_levels)
        .into_iter()
        .try_for_each(|id| -> Result<(), Option<WebDriverError>> {
            if !MenuItem::new(tree, id).has_sub_menu() {
                warn!("There is no submenu for item '{}'", tree.element(id).label());
                return Err(None);
            }
            open(id).map_err(Some)?;
            thread::sleep(SUBMENU_PAUSE);
            Ok(())
        });
    match opened {
        Ok(()) | Err(None) => Ok(()),
        Err(Some(e)) => {
            error!("Met {}", e);
            Err(WebDriverError::general(format!(
                "Fail to expand node '{}'. due to '{}'",
                tree.element(node).label(),
                e
            )))
        }
    }
}

/// `sap.ui.commons.MenuBar` and the SAP menus.
#[derive(Debug, Default)]
pub struct SapMenu {
    cache: ContentCache<ElementHierarchy>,
}

impl SapMenu {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &SUPPORTED_CLASSES)?;
        Ok(SapMenu::default())
    }
}

impl HierarchicalSelectable for SapMenu {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<ElementHierarchy> {
        load_menu(component, &sap::SAP_MENU_GET_ITEMS)
    }

    fn cache(&self) -> &ContentCache<ElementHierarchy> {
        &self.cache
    }

    fn click_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        options: &ClickOptions,
        clicks: u32,
    ) -> WebDriverResult<()> {
        // A sub-menu opened by WebDriver's element click may close again, a
        // pointer action keeps it open.
        open_submenus(tree, node, 0, |id| {
            let element = tree.element(id).web_element(component.session())?;
            component.session().action_chain().click_element(&element).perform()
        })?;
        click_item(component, tree.element(node), options, clicks)
    }

    fn verify_node_selected(&self, _component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        menu_item_clicked(tree, node)
    }
}

impl MenuSelectable for SapMenu {}

/// `sas.hc.ui.commons.pushmenu.PushMenu`. Its items sit inside an invisible
/// group, which is left out of paths.
#[derive(Debug)]
pub struct PushMenu {
    cache: ContentCache<ElementHierarchy>,
    has_invisible_root: bool,
}

impl PushMenu {
    pub fn new(component: &Component<'_>) -> WebDriverResult<Self> {
        ensure_supported(component, Domain::Sap, &[CLASS_NAME_PUSHMENU])?;
        Ok(PushMenu {
            cache: ContentCache::new(),
            has_invisible_root: true,
        })
    }

    fn go_home(&self, component: &Component<'_>) {
        if let Err(e) = js::call_on(&component.element(), &sap::PUSHMENU_GO_HOME, &[]) {
            debug!("Met {}", e);
        }
    }
}

impl HierarchicalSelectable for PushMenu {
    fn load_content(&self, component: &Component<'_>) -> WebDriverResult<ElementHierarchy> {
        let mut tree = load_menu(component, &sap::PUSHMENU_GET_ITEMS)?;
        if self.has_invisible_root {
            tree.descend_into_first();
        }
        Ok(tree)
    }

    fn cache(&self) -> &ContentCache<ElementHierarchy> {
        &self.cache
    }

    fn select_item(
        &self,
        component: &Component<'_>,
        criterion: &TextMatchingCriterion,
        verify: bool,
        options: &ClickOptions,
    ) -> WebDriverResult<()> {
        if criterion.text().map_or(false, |t| t.eq_ignore_ascii_case(HOME_KEY)) {
            self.go_home(component);
            return Ok(());
        }
        let (tree, node) = self.matched_node(component, criterion)?;
        self.click_node(component, &tree, node, options, 1)?;
        if verify {
            self.wait_and_verify_selected(component, &tree, node)?;
        }
        Ok(())
    }

    fn click_node(
        &self,
        component: &Component<'_>,
        tree: &ElementHierarchy,
        node: NodeId,
        options: &ClickOptions,
        clicks: u32,
    ) -> WebDriverResult<()> {
        let hidden = if self.has_invisible_root { 1 } else { 0 };
        open_submenus(tree, node, hidden, |id| {
            let element = tree.element(id).web_element(component.session())?;
            js::scroll_into_view(&element, true)?;
            element.click()
        })?;
        click_item(component, tree.element(node), options, clicks)
    }

    fn verify_node_selected(&self, _component: &Component<'_>, tree: &ElementHierarchy, node: NodeId) -> WebDriverResult<()> {
        menu_item_clicked(tree, node)
    }
}

impl MenuSelectable for PushMenu {}
