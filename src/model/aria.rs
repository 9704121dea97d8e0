//! WAI-ARIA attribute and role names used to recognise accessible widgets.

pub const ATTRIBUTE_WAI_ROLE: &str = "role";
pub const ATTRIBUTE_ARIA_DISABLED: &str = "aria-disabled";
pub const ATTRIBUTE_ARIA_HASPOPUP: &str = "aria-haspopup";
pub const ATTRIBUTE_ARIA_HIDDEN: &str = "aria-hidden";
pub const ATTRIBUTE_ARIA_LABEL: &str = "aria-label";
pub const ATTRIBUTE_ARIA_CONTROLS: &str = "aria-controls";
pub const ATTRIBUTE_ARIA_OWNS: &str = "aria-owns";
pub const ATTRIBUTE_ARIA_EXPANDED: &str = "aria-expanded";
pub const ATTRIBUTE_ARIA_SELECTED: &str = "aria-selected";
pub const ATTRIBUTE_ARIA_CHECKED: &str = "aria-checked";
pub const ATTRIBUTE_ARIA_LEVEL: &str = "aria-level";
pub const ATTRIBUTE_ARIA_MULTISELECTABLE: &str = "aria-multiselectable";
pub const ATTRIBUTE_ARIA_ORIENTATION: &str = "aria-orientation";
pub const ATTRIBUTE_ARIA_VALUENOW: &str = "aria-valuenow";

/// Some toolkits keep the expansion state here instead of `aria-expanded`.
pub const ATTRIBUTE_DATA_EXPANDED: &str = "data-expanded";

pub const ROLE_BUTTON: &str = "button";
pub const ROLE_CHECKBOX: &str = "checkbox";
pub const ROLE_COMBOBOX: &str = "combobox";
pub const ROLE_GRID: &str = "grid";
pub const ROLE_GROUP: &str = "group";
pub const ROLE_LINK: &str = "link";
pub const ROLE_LIST: &str = "list";
pub const ROLE_LISTBOX: &str = "listbox";
pub const ROLE_LISTITEM: &str = "listitem";
pub const ROLE_MENU: &str = "menu";
pub const ROLE_MENUBAR: &str = "menubar";
pub const ROLE_MENUITEM: &str = "menuitem";
pub const ROLE_MENUITEMCHECKBOX: &str = "menuitemcheckbox";
pub const ROLE_MENUITEMRADIO: &str = "menuitemradio";
pub const ROLE_OPTION: &str = "option";
pub const ROLE_RADIO: &str = "radio";
pub const ROLE_SCROLLBAR: &str = "scrollbar";
pub const ROLE_SEPARATOR: &str = "separator";
pub const ROLE_TAB: &str = "tab";
pub const ROLE_TEXTBOX: &str = "textbox";
pub const ROLE_TREE: &str = "tree";
pub const ROLE_TREEITEM: &str = "treeitem";

/// True for an ARIA boolean attribute value of `"true"`.
pub fn is_true(value: Option<&str>) -> bool {
    value.map(|v| v.trim().eq_ignore_ascii_case("true")).unwrap_or(false)
}
