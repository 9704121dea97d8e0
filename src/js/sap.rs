//! Scripts for SAP UI5 / OpenUI5 controls.
//!
//! Controls are looked up from their DOM element through the UI5 core, and
//! their items are returned as plain objects using the keys read by
//! [`Element::from_json`](crate::model::Element::from_json): `id`, `label`,
//! `value`, `index`, `selected`, `disabled`, `expanded`, `icon`, `class`,
//! `visible`, `children` and `submenuid`.

use super::{JsFunction, OBJECT_IS_INSTANCEOF};

pub static SAP_GET_OBJECT: JsFunction = JsFunction {
    name: "sap_getObject",
    source: r#"function sap_getObject(domElement){
  try{
    var object = sap.ui.getCore().byId(domElement.getAttribute('id'));
    if(object==undefined) object = jQuery(domElement).control()[0];
    return object;
  }catch(error){}
}"#,
    deps: &[],
};

pub static SAP_GET_OBJECT_BY_ID: JsFunction = JsFunction {
    name: "sap_getObjectById",
    source: r#"function sap_getObjectById(id){
  try{
    return sap.ui.getCore().byId(id);
  }catch(error){}
}"#,
    deps: &[],
};

pub static SAP_GET_DOM_REF: JsFunction = JsFunction {
    name: "sap_getDOMRef",
    source: r#"function sap_getDOMRef(sapElement){
  var object = sapElement.getDomRef();
  if(object==undefined) throw new Error('can not find the embedded DOM object.');
  return object;
}"#,
    deps: &[],
};

pub static SAP_OBJECT_IS_INSTANCEOF: JsFunction = JsFunction {
    name: "sap_objectIsInstanceof",
    source: r#"function sap_objectIsInstanceof(domelement, clazzes){
  return objectIsInstanceof(sap_getObject(domelement), clazzes);
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF, &SAP_GET_OBJECT],
};

/// The metadata class names of a control and all its ancestors, most
/// derived first.
pub static GET_SAP_CLASS_NAMES_BY_ID: JsFunction = JsFunction {
    name: "getSAPClassNamesById",
    source: r#"function getSAPClassNamesById(id){
  var names = new Array();
  try{
    var object = sap_getObjectById(id);
    if(object!=undefined && object instanceof sap.ui.core.Element){
      var metadata = object.getMetadata();
      while(metadata!=undefined){
        names.push(metadata.getName());
        metadata = metadata.getParent();
      }
    }
  }catch(error){}
  return names;
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static GET_SAP_CLASS_NAME_BY_ID: JsFunction = JsFunction {
    name: "getSAPClassNameById",
    source: r#"function getSAPClassNameById(id){
  try{
    var object = sap_getObjectById(id);
    if(object!=undefined && object instanceof sap.ui.core.Element) return object.getMetadata().getName();
  }catch(error){}
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static PARSE_SAP_UI_CORE_ITEM: JsFunction = JsFunction {
    name: "parse_sap_ui_core_Item",
    source: r#"function parse_sap_ui_core_Item(itemobject, index, selectedKeys){
  if(itemobject==undefined) return undefined;
  var item = new Object();
  item.id = itemobject.getId();
  item.disabled = !itemobject.getEnabled();
  item.label = itemobject.getText();
  item.value = itemobject.getKey();
  item.selected = false;
  if(selectedKeys instanceof Array){
    for(var i=0; i<selectedKeys.length; i++){
      if(itemobject.getKey()==selectedKeys[i]){ item.selected = true; break; }
    }
  }else{
    item.selected = (itemobject.getKey()==selectedKeys);
  }
  item.index = index;
  return item;
}"#,
    deps: &[],
};

pub static PARSE_SAP_M_LIST_ITEM_BASE: JsFunction = JsFunction {
    name: "parse_sap_m_ListItemBase",
    source: r#"function parse_sap_m_ListItemBase(itemobject, index){
  if(itemobject==undefined) return undefined;
  var item = new Object();
  item.id = itemobject.getId();
  item.index = index;
  item.selected = itemobject.getSelected();
  item.visible = itemobject.getVisible();
  try{ item['class'] = sap_getDOMRef(itemobject).getAttribute('class'); }catch(ignore){}
  if(objectIsInstanceof(itemobject, ['sap.m.StandardListItem','sap.m.ObjectListItem','sap.m.GroupHeaderListItem'])){
    item.label = itemobject.getTitle();
    item.value = itemobject.getTitle();
  }else if(objectIsInstanceof(itemobject, ['sap.m.InputListItem'])){
    item.label = itemobject.getLabel();
  }else if(objectIsInstanceof(itemobject, ['sap.m.FacetFilterItem'])){
    item.label = itemobject.getText();
    item.value = itemobject.getKey();
  }else if(objectIsInstanceof(itemobject, ['sap.m.DisplayListItem'])){
    item.label = itemobject.getLabel();
    item.value = itemobject.getValue();
  }else if(objectIsInstanceof(itemobject, ['sap.m.FeedListItem','sap.m.ActionListItem'])){
    item.label = itemobject.getText();
    item.value = itemobject.getText();
  }else{
    try{ item.label = itemobject.getText(); }catch(ignore){}
    if(item.label==undefined){
      try{ item.label = itemobject.getTitle(); }catch(ignore){}
    }
    item.value = item.label;
  }
  return item;
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF, &SAP_GET_DOM_REF],
};

/// Select by key on `sap.ui.commons.ComboBox`, `sap.m.Select` or
/// `sap.m.ComboBoxBase`, then fire the matching change event.
pub static SAP_COMBOBOX_SET_SELECTED_KEY: JsFunction = JsFunction {
    name: "sap_ComboBox_setSelectedKey",
    source: r#"function sap_ComboBox_setSelectedKey(domelement, key){
  var object = sap_getObject(domelement);
  if(object==undefined) throw new Error('sap component is undefined.');
  if(!objectIsInstanceof(object, ['sap.ui.commons.ComboBox','sap.m.Select','sap.m.ComboBoxBase'])){
    throw new Error(object.getMetadata().getName()+' is not supported');
  }
  object.setSelectedKey(key);
  var selectedKey = object.getSelectedKey();
  var items = object.getItems();
  for(var i=0; i<items.length; i++){
    if(items[i].getKey()==selectedKey){
      var args = {newValue: items[i].getText(), selectedItem: items[i]};
      if(objectIsInstanceof(object, ['sap.m.ComboBox'])) object.fireSelectionChange(args);
      else object.fireChange(args);
      break;
    }
  }
}"#,
    deps: &[&SAP_GET_OBJECT, &OBJECT_IS_INSTANCEOF],
};

pub static SAP_COMBOBOX_GET_ITEMS: JsFunction = JsFunction {
    name: "sap_ComboBox_getItems",
    source: r#"function sap_ComboBox_getItems(domelement){
  var object = sap_getObject(domelement);
  if(object==undefined) throw new Error('sap component is undefined.');
  if(!objectIsInstanceof(object, ['sap.ui.commons.ComboBox','sap.m.Select','sap.m.ComboBoxBase'])){
    throw new Error(object.getMetadata().getName()+' is not supported');
  }
  var properties = new Array();
  var items = object.getItems();
  var selectedKey = object.getSelectedKey();
  if(items!=undefined){
    if(!(items instanceof Array)) items = [items];
    for(var i=0; i<items.length; i++) properties.push(parse_sap_ui_core_Item(items[i], i, selectedKey));
  }
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_UI_CORE_ITEM, &OBJECT_IS_INSTANCEOF],
};

/// The selected index of a `sap.ui.commons.ListBox` or `TabStrip`.
pub static SAP_GET_SELECTED_INDEX: JsFunction = JsFunction {
    name: "sap_ui_commons_getSelectedIndex",
    source: r#"function sap_ui_commons_getSelectedIndex(domelement){
  var object = sap_getObject(domelement);
  try{
    if(object!=undefined && (object instanceof sap.ui.commons.ListBox || object instanceof sap.ui.commons.TabStrip)){
      return object.getSelectedIndex();
    }
  }catch(error){}
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static SAP_LISTBOX_GET_SELECTED_INDICES: JsFunction = JsFunction {
    name: "sap_ui_commons_ListBox_getSelectedIndices",
    source: r#"function sap_ui_commons_ListBox_getSelectedIndices(domelement){
  var object = sap_getObject(domelement);
  try{
    if(object!=undefined && object instanceof sap.ui.commons.ListBox) return object.getSelectedIndices();
  }catch(error){}
}"#,
    deps: &[&SAP_GET_OBJECT],
};

/// Scroll to, select and fire `select` for the item at `index`.
pub static SAP_LISTBOX_SET_SELECTED_INDEX: JsFunction = JsFunction {
    name: "sap_ui_commons_ListBox_setSelectedIndex",
    source: r#"function sap_ui_commons_ListBox_setSelectedIndex(domelement, index){
  var object = sap_getObject(domelement);
  if(object!=undefined && object instanceof sap.ui.commons.ListBox){
    object.scrollToIndex(index);
    object.setSelectedIndex(index);
    object.fireSelect({'selectedIndex': index});
  }
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static SAP_LISTBOX_SCROLL_TO_INDEX: JsFunction = JsFunction {
    name: "sap_ui_commons_ListBox_scrollToIndex",
    source: r#"function sap_ui_commons_ListBox_scrollToIndex(domelement, index){
  var object = sap_getObject(domelement);
  if(object!=undefined && object instanceof sap.ui.commons.ListBox) object.scrollToIndex(index);
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static SAP_LISTBOX_GET_ITEMS: JsFunction = JsFunction {
    name: "sap_ui_commons_ListBox_getItems",
    source: r#"function sap_ui_commons_ListBox_getItems(domelement){
  var object = sap_getObject(domelement);
  var properties = new Array();
  if(object!=undefined && object instanceof sap.ui.commons.ListBox){
    var items = object.getItems();
    var selectedKeys = object.getSelectedKeys();
    if(items!=undefined){
      if(!(items instanceof Array)) items = [items];
      for(var i=0; i<items.length; i++) properties.push(parse_sap_ui_core_Item(items[i], i, selectedKeys));
    }
  }
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_UI_CORE_ITEM],
};

pub static SAP_M_LIST_GET_ITEMS: JsFunction = JsFunction {
    name: "sap_m_List_getItems",
    source: r#"function sap_m_List_getItems(domelement){
  var object = sap_getObject(domelement);
  var properties = new Array();
  if(object!=undefined && object instanceof sap.m.ListBase){
    var items = object.getItems();
    if(items!=undefined){
      if(!(items instanceof Array)) items = [items];
      for(var i=0; i<items.length; i++) properties.push(parse_sap_m_ListItemBase(items[i], i));
    }
  }
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_M_LIST_ITEM_BASE],
};

pub static SAP_M_LIST_GET_SELECTED_ITEMS: JsFunction = JsFunction {
    name: "sap_m_List_getSelectedItems",
    source: r#"function sap_m_List_getSelectedItems(domelement){
  var object = sap_getObject(domelement);
  var properties = new Array();
  if(object!=undefined && object instanceof sap.m.ListBase){
    var items = object.getSelectedItems();
    if(items!=undefined){
      if(!(items instanceof Array)) items = [items];
      for(var i=0; i<items.length; i++) properties.push(parse_sap_m_ListItemBase(items[i], object.indexOfItem(items[i])));
    }
  }
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_M_LIST_ITEM_BASE],
};

pub static SAP_M_LIST_SET_SELECTED_ITEM_BY_ID: JsFunction = JsFunction {
    name: "sap_m_List_setSelectedItemById",
    source: r#"function sap_m_List_setSelectedItemById(domelement, itemId){
  var object = sap_getObject(domelement);
  if(object!=undefined && object instanceof sap.m.ListBase){
    var item = sap_getObjectById(itemId);
    object.setSelectedItem(item, true);
    object.fireSelectionChange({listItem: item, selected: true});
  }
}"#,
    deps: &[&SAP_GET_OBJECT, &SAP_GET_OBJECT_BY_ID],
};

pub static SAP_M_SELECTLIST_GET_ITEMS: JsFunction = JsFunction {
    name: "sap_m_SelectList_getItems",
    source: r#"function sap_m_SelectList_getItems(domelement){
  var object = sap_getObject(domelement);
  var properties = new Array();
  if(object!=undefined && object instanceof sap.m.SelectList){
    var items = object.getItems();
    var selectedKey = object.getSelectedKey();
    if(items!=undefined){
      if(!(items instanceof Array)) items = [items];
      for(var i=0; i<items.length; i++) properties.push(parse_sap_ui_core_Item(items[i], i, selectedKey));
    }
  }
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_UI_CORE_ITEM],
};

pub static SAP_M_SELECTLIST_GET_SELECTED_ITEMS: JsFunction = JsFunction {
    name: "sap_m_SelectList_getSelectedItems",
    source: r#"function sap_m_SelectList_getSelectedItems(domelement){
  var object = sap_getObject(domelement);
  var properties = new Array();
  if(object!=undefined && object instanceof sap.m.SelectList){
    var selectedItem = object.getSelectedItem();
    if(selectedItem!=undefined && selectedItem instanceof sap.ui.core.Item){
      properties.push(parse_sap_ui_core_Item(selectedItem, object.indexOfItem(selectedItem), object.getSelectedKey()));
    }
  }
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_UI_CORE_ITEM],
};

pub static SAP_M_SELECTLIST_SET_SELECTED_ITEM_BY_ID: JsFunction = JsFunction {
    name: "sap_m_SelectList_setSelectedItemById",
    source: r#"function sap_m_SelectList_setSelectedItemById(domelement, itemId){
  var object = sap_getObject(domelement);
  if(object!=undefined && object instanceof sap.m.SelectList){
    object.setSelectedItemId(itemId);
    object.fireSelectionChange({selectedItem: sap_getObjectById(itemId)});
  }
}"#,
    deps: &[&SAP_GET_OBJECT, &SAP_GET_OBJECT_BY_ID],
};

pub static PARSE_SAP_MENU_ITEM: JsFunction = JsFunction {
    name: "parse_sap_ui_commons_MenuItem",
    source: r#"function parse_sap_ui_commons_MenuItem(itemobject){
  if(itemobject==undefined) return undefined;
  var item = new Object();
  item.id = itemobject.getId();
  item.disabled = !itemobject.getEnabled();
  if(objectIsInstanceof(itemobject, ['sap.ui.commons.MenuItem','sap.ui.unified.MenuItem'])){
    item.label = itemobject.getText();
    item.icon = itemobject.getIcon();
  }else if(objectIsInstanceof(itemobject, ['sap.ui.commons.MenuTextFieldItem','sap.ui.unified.MenuTextFieldItem'])){
    item.label = itemobject.getLabel();
    item.value = itemobject.getValue();
    item.icon = itemobject.getIcon();
  }
  return item;
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF],
};

pub static SAP_MENU_GET_ITEMS_REC: JsFunction = JsFunction {
    name: "sap_ui_commons_Menu_getItems_Rec",
    source: r#"function sap_ui_commons_Menu_getItems_Rec(menu, node){
  if(menu==undefined || !objectIsInstanceof(menu, ['sap.ui.commons.MenuBar','sap.ui.commons.Menu','sap.ui.unified.Menu'])) return;
  var items = menu.getItems();
  if(items==undefined) return;
  if(!(items instanceof Array)) items = [items];
  var children = new Array();
  for(var i=0; i<items.length; i++){
    var child = parse_sap_ui_commons_MenuItem(items[i]);
    children.push(child);
    var submenu = items[i].getSubmenu();
    if(submenu!=undefined && objectIsInstanceof(submenu, ['sap.ui.commons.Menu','sap.ui.unified.Menu'])){
      child.submenuid = submenu.getId();
      sap_ui_commons_Menu_getItems_Rec(submenu, child);
    }
  }
  node.children = children;
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF, &PARSE_SAP_MENU_ITEM],
};

/// The whole menu as a tree rooted at `{id: <menubar id>}`.
pub static SAP_MENU_GET_ITEMS: JsFunction = JsFunction {
    name: "sap_ui_commons_Menu_getItems",
    source: r#"function sap_ui_commons_Menu_getItems(domelement){
  var menubar = sap_getObject(domelement);
  var menu = new Object();
  menu.id = menubar.getId();
  sap_ui_commons_Menu_getItems_Rec(menubar, menu);
  return menu;
}"#,
    deps: &[&SAP_GET_OBJECT, &SAP_MENU_GET_ITEMS_REC],
};

pub static PUSHMENU_GET_ITEMS_REC: JsFunction = JsFunction {
    name: "sas_hc_ui_commons_pushmenu_PushMenu_getItems_Rec",
    source: r#"function sas_hc_ui_commons_pushmenu_PushMenu_getItems_Rec(menu, node){
  if(menu==undefined || !objectIsInstanceof(menu, ['sas.hc.ui.commons.pushmenu.PushMenu','sas.hc.ui.commons.pushmenu.PushMenuItemBase'])) return;
  var items = menu.getItems ? menu.getItems() : undefined;
  if(items==undefined) return;
  node.submenuid = menu.getId();
  if(!(items instanceof Array)) items = [items];
  var children = new Array();
  for(var i=0; i<items.length; i++){
    var child = new Object();
    child.id = items[i].getId();
    child.label = items[i].getLabel();
    child.value = items[i].getKey();
    child.icon = items[i].getIcon();
    children.push(child);
    sas_hc_ui_commons_pushmenu_PushMenu_getItems_Rec(items[i], child);
  }
  node.children = children;
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF],
};

pub static PUSHMENU_GET_ITEMS: JsFunction = JsFunction {
    name: "sas_hc_ui_commons_pushmenu_PushMenu_getItems",
    source: r#"function sas_hc_ui_commons_pushmenu_PushMenu_getItems(domelement){
  var pushmenu = sap_getObject(domelement);
  var menu = new Object();
  menu.id = pushmenu.getId();
  sas_hc_ui_commons_pushmenu_PushMenu_getItems_Rec(pushmenu, menu);
  return menu;
}"#,
    deps: &[&SAP_GET_OBJECT, &PUSHMENU_GET_ITEMS_REC],
};

pub static PUSHMENU_GO_HOME: JsFunction = JsFunction {
    name: "sas_hc_ui_commons_pushmenu_PushMenu_goHome",
    source: r#"function sas_hc_ui_commons_pushmenu_PushMenu_goHome(domelement){
  var pushmenu = sap_getObject(domelement);
  pushmenu.fireHomeClick({homeAppInfo: pushmenu.settings.homeAppInfo});
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static PARSE_SAP_TREE_NODE: JsFunction = JsFunction {
    name: "parse_sap_ui_commons_TreeNode",
    source: r#"function parse_sap_ui_commons_TreeNode(itemobject){
  if(itemobject==undefined) return undefined;
  var item = new Object();
  item.id = itemobject.getId();
  item.disabled = !itemobject.getSelectable();
  item.label = itemobject.getText();
  item.expanded = itemobject.getExpanded();
  item.selected = itemobject.getIsSelected();
  return item;
}"#,
    deps: &[],
};

pub static SAP_TREE_GET_NODES_REC: JsFunction = JsFunction {
    name: "sap_ui_commons_Tree_getNodes_Rec",
    source: r#"function sap_ui_commons_Tree_getNodes_Rec(nodeObject, node){
  if(nodeObject==undefined || !objectIsInstanceof(nodeObject, ['sap.ui.commons.Tree','sap.ui.commons.TreeNode'])) return;
  var nodes = nodeObject.getNodes();
  if(nodes==undefined) return;
  if(!(nodes instanceof Array)) nodes = [nodes];
  var children = new Array();
  for(var i=0; i<nodes.length; i++){
    var child = parse_sap_ui_commons_TreeNode(nodes[i]);
    children.push(child);
    sap_ui_commons_Tree_getNodes_Rec(nodes[i], child);
  }
  node.children = children;
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF, &PARSE_SAP_TREE_NODE],
};

/// The whole tree as nested nodes rooted at `{id: <tree id>}`.
pub static SAP_TREE_GET_NODES: JsFunction = JsFunction {
    name: "sap_ui_commons_Tree_getNodes",
    source: r#"function sap_ui_commons_Tree_getNodes(domelement){
  var tree = sap_getObject(domelement);
  var root = new Object();
  root.id = tree.getId();
  sap_ui_commons_Tree_getNodes_Rec(tree, root);
  return root;
}"#,
    deps: &[&SAP_GET_OBJECT, &SAP_TREE_GET_NODES_REC],
};

pub static SAP_TREE_COLLAPSE_ALL: JsFunction = JsFunction {
    name: "sap_ui_commons_Tree_collapseAll",
    source: r#"function sap_ui_commons_Tree_collapseAll(domelement){
  var tree = sap_getObject(domelement);
  if(tree!=undefined && tree instanceof sap.ui.commons.Tree) tree.collapseAll();
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static SAP_TREE_EXPAND_ALL: JsFunction = JsFunction {
    name: "sap_ui_commons_Tree_expandAll",
    source: r#"function sap_ui_commons_Tree_expandAll(domelement){
  var tree = sap_getObject(domelement);
  if(tree!=undefined && tree instanceof sap.ui.commons.Tree) tree.expandAll();
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static SAP_TREENODE_EXPAND: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_expand",
    source: r#"function sap_ui_commons_TreeNode_expand(treeNodeId, expandChildren){
  var treenode = sap_getObjectById(treeNodeId);
  if(treenode!=undefined && treenode instanceof sap.ui.commons.TreeNode) treenode.expand(expandChildren);
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static SAP_TREENODE_COLLAPSE: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_collapse",
    source: r#"function sap_ui_commons_TreeNode_collapse(treeNodeId, collapseChildren){
  var treenode = sap_getObjectById(treeNodeId);
  if(treenode!=undefined && treenode instanceof sap.ui.commons.TreeNode) treenode.collapse(collapseChildren);
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static SAP_TREENODE_SELECT: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_select",
    source: r#"function sap_ui_commons_TreeNode_select(treeId, treeNodeId){
  var tree = sap_getObjectById(treeId);
  var treenode = sap_getObjectById(treeNodeId);
  treenode.select();
  treenode.fireSelected();
  tree.fireSelect({'node': treenode});
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static SAP_TREENODE_SHOW_ON_PAGE: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_showOnPage",
    source: r#"function sap_ui_commons_TreeNode_showOnPage(treeNodeId){
  var treenode = sap_getObjectById(treeNodeId);
  if(treenode!=undefined && treenode instanceof sap.ui.commons.TreeNode) treenode.showOnPage();
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static SAP_TREENODE_GET_IS_SELECTED: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_getIsSelected",
    source: r#"function sap_ui_commons_TreeNode_getIsSelected(treeNodeId){
  var treenode = sap_getObjectById(treeNodeId);
  if(treenode!=undefined && treenode instanceof sap.ui.commons.TreeNode) return treenode.getIsSelected();
  return false;
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static SAP_TREENODE_GET_EXPANDED: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_getExpanded",
    source: r#"function sap_ui_commons_TreeNode_getExpanded(treeNodeId){
  var treenode = sap_getObjectById(treeNodeId);
  if(treenode!=undefined && treenode instanceof sap.ui.commons.TreeNode) return treenode.getExpanded();
  return false;
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

pub static SAP_TREENODE_GET_SELECTABLE: JsFunction = JsFunction {
    name: "sap_ui_commons_TreeNode_getSelectable",
    source: r#"function sap_ui_commons_TreeNode_getSelectable(treeNodeId){
  var treenode = sap_getObjectById(treeNodeId);
  if(treenode!=undefined && treenode instanceof sap.ui.commons.TreeNode) return treenode.getSelectable();
  return false;
}"#,
    deps: &[&SAP_GET_OBJECT_BY_ID],
};

/// Page a `sap.ui.core.ScrollBar`. If paging does not move it, the scroll
/// position is set directly, one page being 7 steps.
pub static SAP_SCROLLBAR_PAGE: JsFunction = JsFunction {
    name: "sap_ui_core_ScrollBar_page",
    source: r#"function sap_ui_core_ScrollBar_page(domelement, pages){
  var object = sap_getObject(domelement);
  if(object==undefined) throw new Error('cannot find SAP object, it is null.');
  if(!(object instanceof sap.ui.core.ScrollBar)) throw new Error(object.getMetadata().getName()+' is not supported');
  if(pages==0) return;
  var position = object.getScrollPosition();
  for(var i=0; i<Math.abs(pages); i++){
    if(pages>0) object.pageDown(); else object.pageUp();
  }
  if(position==object.getScrollPosition()) object.setScrollPosition(position + pages*7);
}"#,
    deps: &[&SAP_GET_OBJECT],
};

pub static SAP_SCROLLBAR_SCROLL: JsFunction = JsFunction {
    name: "sap_ui_core_ScrollBar_scroll",
    source: r#"function sap_ui_core_ScrollBar_scroll(domelement, steps){
  var object = sap_getObject(domelement);
  if(object==undefined) throw new Error('cannot find SAP object, it is null.');
  if(!(object instanceof sap.ui.core.ScrollBar)) throw new Error(object.getMetadata().getName()+' is not supported');
  object.setScrollPosition(object.getScrollPosition() + steps);
}"#,
    deps: &[&SAP_GET_OBJECT],
};

/// Set a `sap.ui.commons.CheckBox` or `sap.m.CheckBox` and fire the event
/// its listeners expect.
pub static SAP_CHECKBOX_SET_CHECKED: JsFunction = JsFunction {
    name: "sap_ui_commons_CheckBox_setChecked",
    source: r#"function sap_ui_commons_CheckBox_setChecked(domelement, checked){
  var object = sap_getObject(domelement);
  if(object==undefined) throw new Error('cannot find SAP object, it is null.');
  if(object instanceof sap.ui.commons.CheckBox){
    object.setChecked(checked);
    object.fireChange({'checked': object.getChecked()});
  }else if(objectIsInstanceof(object, ['sap.m.CheckBox'])){
    object.setSelected(checked);
    object.fireSelect({'selected': object.getSelected()});
  }else{
    throw new Error(object.getMetadata().getName()+' is not supported');
  }
}"#,
    deps: &[&SAP_GET_OBJECT, &OBJECT_IS_INSTANCEOF],
};

pub static SAP_CHECKBOX_GET_CHECKED: JsFunction = JsFunction {
    name: "sap_ui_commons_CheckBox_getChecked",
    source: r#"function sap_ui_commons_CheckBox_getChecked(domelement){
  var object = sap_getObject(domelement);
  if(object==undefined) throw new Error('cannot find SAP object, it is null.');
  if(object instanceof sap.ui.commons.CheckBox) return object.getChecked();
  if(objectIsInstanceof(object, ['sap.m.CheckBox'])) return object.getSelected();
  throw new Error(object.getMetadata().getName()+' is not supported');
}"#,
    deps: &[&SAP_GET_OBJECT, &OBJECT_IS_INSTANCEOF],
};

pub static PARSE_SAP_TAB: JsFunction = JsFunction {
    name: "parse_sap_ui_commons_Tab",
    source: r#"function parse_sap_ui_commons_Tab(tab, index){
  if(tab==undefined) return undefined;
  return {
    id: tab.getId(),
    label: tab.getText(),
    selected: tab.getSelected(),
    disabled: !tab.getEnabled(),
    index: index
  };
}"#,
    deps: &[],
};

/// The tabs of a `sap.ui.commons.TabStrip` with id, label, selected,
/// disabled and index.
pub static SAP_TABSTRIP_GET_TABS: JsFunction = JsFunction {
    name: "sap_ui_commons_TabStrip_getTabs",
    source: r#"function sap_ui_commons_TabStrip_getTabs(domelement){
  var object = sap_getObject(domelement);
  var properties = new Array();
  if(object==undefined || !(object instanceof sap.ui.commons.TabStrip)) return undefined;
  var tabs = object.getTabs();
  if(tabs==undefined) return properties;
  if(tabs.length==undefined) tabs = [tabs];
  for(var i=0; i<tabs.length; i++) properties.push(parse_sap_ui_commons_Tab(tabs[i], i));
  return properties;
}"#,
    deps: &[&SAP_GET_OBJECT, &PARSE_SAP_TAB],
};

pub static SAP_TABSTRIP_SET_SELECTED_INDEX: JsFunction = JsFunction {
    name: "sap_ui_commons_TabStrip_setSelectedIndex",
    source: r#"function sap_ui_commons_TabStrip_setSelectedIndex(domelement, index){
  var object = sap_getObject(domelement);
  if(object==undefined || !(object instanceof sap.ui.commons.TabStrip)) throw new Error('not a sap.ui.commons.TabStrip');
  object.setSelectedIndex(index);
  object.fireSelect({'index': index});
}"#,
    deps: &[&SAP_GET_OBJECT],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combobox_items_script_defines_helpers_once() {
        let script = SAP_COMBOBOX_GET_ITEMS.call_script(1);
        assert_eq!(script.matches("function sap_getObject(").count(), 1);
        assert_eq!(script.matches("function resolveClass(").count(), 1);
        assert!(script.contains("function parse_sap_ui_core_Item("));
        assert!(script.ends_with("return sap_ComboBox_getItems(arguments[0]);"));
    }

    #[test]
    fn test_menu_items_script_is_recursive() {
        let script = SAP_MENU_GET_ITEMS.with_dependencies();
        let rec = script.find("function sap_ui_commons_Menu_getItems_Rec(").expect("rec");
        let top = script.find("function sap_ui_commons_Menu_getItems(").expect("top");
        assert!(rec < top);
        assert!(script.contains("child.submenuid = submenu.getId();"));
    }
}
