use log::{debug, error};

use crate::model::hierarchy::{ElementHierarchy, NodeId};

pub const STATUS_ENABLED: &str = "Enabled";
pub const STATUS_UNGRAYED: &str = "Ungrayed";
pub const STATUS_DISABLED: &str = "Disabled";
pub const STATUS_GRAYED: &str = "Grayed";
pub const STATUS_CHECKED: &str = "Checked";
pub const STATUS_UNCHECKED: &str = "UnChecked";
/// Starts `Menu With <n> MenuItems`.
pub const STATUS_SUBMENU_NUM: &str = "Menu";
pub const STATUS_BITMAP: &str = "Bitmap";
pub const STATUS_SEPARATOR: &str = "Separator";
pub const STATUS_BARBREAK: &str = "BarBreak";
pub const STATUS_BREAK: &str = "Break";
pub const STATUS_HILITED: &str = "Hilited";
pub const STATUS_UNHILITED: &str = "Unhilited";
pub const STATUS_DEFAULT: &str = "Default";
pub const STATUS_NORMAL: &str = "Normal";

/// A menu item: a node of a menu's [`ElementHierarchy`].
#[derive(Debug, Clone, Copy)]
pub struct MenuItem<'h> {
    tree: &'h ElementHierarchy,
    node: NodeId,
}

impl<'h> MenuItem<'h> {
    pub fn new(tree: &'h ElementHierarchy, node: NodeId) -> Self {
        MenuItem {
            tree,
            node,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn label(&self) -> &'h str {
        self.tree.element(self.node).label()
    }

    pub fn submenu_id(&self) -> Option<&'h str> {
        self.tree.node(self.node).submenu_id.as_deref()
    }

    pub fn has_sub_menu(&self) -> bool {
        self.submenu_id().is_some() || !self.tree.children(self.node).is_empty()
    }

    pub fn is_disabled(&self) -> bool {
        self.tree.element(self.node).disabled
    }

    /// Check marks are not exposed by any supported menu.
    pub fn is_checked(&self) -> bool {
        false
    }

    pub fn is_separator(&self) -> bool {
        false
    }

    pub fn contains_bitmap(&self) -> bool {
        self.tree.element(self.node).icon.as_ref().map(|i| !i.is_empty()).unwrap_or(false)
    }

    fn sub_menu_count_ok(&self, count: Option<&str>) -> bool {
        match count.map(|c| c.parse::<usize>()) {
            Some(Ok(n)) => self.tree.children(self.node).len() == n,
            _ => {
                error!("'{:?}' is not a valid number of menu items", count);
                false
            }
        }
    }

    /// Check the item against a space separated status such as
    /// `Enabled Menu With 3 MenuItems`. Unknown tokens are ignored.
    pub fn match_status(&self, expected: &str) -> bool {
        let mut matched = true;
        let mut tokens = expected.split_whitespace();
        while let Some(token) = tokens.next() {
            let is = |s: &str| token.eq_ignore_ascii_case(s);
            if is(STATUS_ENABLED) || is(STATUS_UNGRAYED) {
                matched &= !self.is_disabled();
            } else if is(STATUS_DISABLED) || is(STATUS_GRAYED) {
                matched &= self.is_disabled();
            } else if is(STATUS_CHECKED) {
                matched &= self.is_checked();
            } else if is(STATUS_UNCHECKED) {
                matched &= !self.is_checked();
            } else if is(STATUS_SUBMENU_NUM) {
                tokens.next(); // "With"
                let count = tokens.next();
                matched &= self.sub_menu_count_ok(count);
                tokens.next(); // "MenuItems"
            } else if is(STATUS_BITMAP) {
                matched &= self.contains_bitmap();
            } else if is(STATUS_SEPARATOR) {
                matched &= self.is_separator();
            } else if is(STATUS_DEFAULT)
                || is(STATUS_NORMAL)
                || is(STATUS_BARBREAK)
                || is(STATUS_BREAK)
                || is(STATUS_HILITED)
                || is(STATUS_UNHILITED)
            {
                debug!("menu status '{}' is not checked", token);
            }
        }
        matched
    }
}
