//! Scripts for Dojo / dijit widgets.
//!
//! A widget is found from its DOM node through `dijit.registry`, falling back
//! to a lookup by the node's `id`.

use super::{JsFunction, OBJECT_IS_INSTANCEOF};

pub static GET_DOJO_OBJECT_BY_ID: JsFunction = JsFunction {
    name: "getDojoObjectById",
    source: r#"function getDojoObjectById(id){
  var dojoObject = dijit.registry.byId(id);
  if(dojoObject==undefined){
    var domObjects = dojo.query("[id='"+id+"']");
    if(domObjects!=undefined && domObjects[0]!=undefined) dojoObject = dijit.registry.byNode(domObjects[0]);
  }
  return dojoObject;
}"#,
    deps: &[],
};

pub static GET_DOJO_OBJECT_BY_DOM_NODE: JsFunction = JsFunction {
    name: "getDojoObjectByDomNode",
    source: r#"function getDojoObjectByDomNode(domNode){
  return dijit.registry.byNode(domNode);
}"#,
    deps: &[],
};

pub static GET_DOJO_OBJECT: JsFunction = JsFunction {
    name: "getDojoObject",
    source: r#"function getDojoObject(domElement){
  var dojoObject = getDojoObjectByDomNode(domElement);
  if(dojoObject==undefined){
    var id = domElement.getAttribute('id');
    if(id!=undefined) dojoObject = getDojoObjectById(id);
  }
  return dojoObject;
}"#,
    deps: &[&GET_DOJO_OBJECT_BY_ID, &GET_DOJO_OBJECT_BY_DOM_NODE],
};

pub static DOJO_OBJECT_IS_INSTANCEOF: JsFunction = JsFunction {
    name: "dojo_objectIsInstanceof",
    source: r#"function dojo_objectIsInstanceof(domelement, clazzes){
  return objectIsInstanceof(getDojoObject(domelement), clazzes);
}"#,
    deps: &[&OBJECT_IS_INSTANCEOF, &GET_DOJO_OBJECT],
};

/// The widget's `declaredClass`, e.g. `dijit.form.Select`.
pub static GET_DOJO_CLASS_NAME: JsFunction = JsFunction {
    name: "getDojoClassName",
    source: r#"function getDojoClassName(domelement){
  var dojoObject = getDojoObject(domelement);
  if(dojoObject!=undefined) return dojoObject.declaredClass;
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static DOJO_GET_PROPERTY: JsFunction = JsFunction {
    name: "dojo_get_property",
    source: r#"function dojo_get_property(domelement, property){
  try{
    return getDojoObject(domelement).get(property);
  }catch(error){}
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static HAS_DROP_DOWN_CLOSE: JsFunction = JsFunction {
    name: "dojo_HasDropDown_closeDropDown",
    source: r#"function dojo_HasDropDown_closeDropDown(domelement, focusButton){
  getDojoObject(domelement).closeDropDown(focusButton);
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static HAS_DROP_DOWN_IS_LOADED: JsFunction = JsFunction {
    name: "dojo_HasDropDown_isLoaded",
    source: r#"function dojo_HasDropDown_isLoaded(domelement){
  try{
    return getDojoObject(domelement).isLoaded();
  }catch(error){}
  return false;
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static HAS_DROP_DOWN_LOAD_AND_OPEN: JsFunction = JsFunction {
    name: "dojo_HasDropDown_loadAndOpenDropDown",
    source: r#"function dojo_HasDropDown_loadAndOpenDropDown(domelement){
  getDojoObject(domelement).loadAndOpenDropDown();
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static HAS_DROP_DOWN_OPEN: JsFunction = JsFunction {
    name: "dojo_HasDropDown_openDropDown",
    source: r#"function dojo_HasDropDown_openDropDown(domelement){
  getDojoObject(domelement).openDropDown();
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

/// Options of a `dijit.form._FormSelectWidget` with label, value, selected,
/// disabled and index.
pub static FORM_SELECT_WIDGET_GET_OPTIONS: JsFunction = JsFunction {
    name: "dojo_FormSelectWidget_getOptions",
    source: r#"function dojo_FormSelectWidget_getOptions(domelement){
  var options = getDojoObject(domelement).getOptions();
  var properties = new Array();
  if(options==undefined) return properties;
  if(!(options instanceof Array)) options = [options];
  for(var i=0; i<options.length; i++){
    properties.push({
      label: options[i].label,
      value: options[i].value,
      selected: options[i].selected==true,
      disabled: options[i].disabled==true,
      index: i
    });
  }
  return properties;
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static WIDGET_BASE_SET: JsFunction = JsFunction {
    name: "dojo_dijit_WidgetBase_set",
    source: r#"function dojo_dijit_WidgetBase_set(domelement, property, value){
  getDojoObject(domelement).set(property, value);
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

/// Query the widget's store. Items carry `id`, `label` (the store `name`),
/// `value`, `index`, `disabled` (always false) and `selected` when they
/// equal the widget's current `item` on id, value and name.
pub static STORE_QUERY: JsFunction = JsFunction {
    name: "dojo_store_api_Store_query",
    source: r#"function dojo_store_api_Store_query(domelement, query, options){
  var dojoObject = getDojoObject(domelement);
  if(dojoObject==undefined || dojoObject.store==undefined) return undefined;
  if(!objectIsInstanceof(dojoObject.store, ['dojo.store.api.Store','dojo.store.Memory','dijit.form.DataList'])) return undefined;
  var results = dojoObject.store.query(query, options);
  var properties = new Array();
  if(results==undefined) return properties;
  if(results.length==undefined) results = [results];
  var current = dojoObject.item;
  for(var i=0; i<results.length; i++){
    var r = results[i];
    properties.push({
      id: r.id,
      label: r.name,
      value: r.value,
      index: i,
      disabled: false,
      selected: current!=undefined && current.id==r.id && current.value==r.value && current.name==r.name
    });
  }
  return properties;
}"#,
    deps: &[&GET_DOJO_OBJECT, &OBJECT_IS_INSTANCEOF],
};

/// The child panes of a `dijit.layout.TabContainer` with id, label (the
/// pane title), selected, disabled and index.
pub static TAB_CONTAINER_GET_CHILDREN: JsFunction = JsFunction {
    name: "dojo_dijit_layout_TabContainerBase_getChildren",
    source: r#"function dojo_dijit_layout_TabContainerBase_getChildren(domelement){
  var object = getDojoObject(domelement);
  var properties = new Array();
  if(object==undefined || !object.hasChildren()) return properties;
  var children = object.getChildren();
  if(children.length==undefined) children = [children];
  for(var i=0; i<children.length; i++){
    properties.push({
      id: children[i].id,
      label: children[i].title,
      selected: children[i].selected==true,
      disabled: children[i].disabled==true,
      index: i
    });
  }
  return properties;
}"#,
    deps: &[&GET_DOJO_OBJECT],
};

pub static STACK_CONTAINER_SELECT_CHILD: JsFunction = JsFunction {
    name: "dojo_dijit_layout_StackContainer_selectChild",
    source: r#"function dojo_dijit_layout_StackContainer_selectChild(container, childId){
  var object = getDojoObject(container);
  if(object==undefined || !objectIsInstanceof(object, ['dijit.layout.StackContainer'])) throw new Error('not a dijit.layout.StackContainer');
  object.selectChild(childId);
}"#,
    deps: &[&GET_DOJO_OBJECT, &OBJECT_IS_INSTANCEOF],
};

pub static STACK_CONTAINER_GET_SELECTED_INDEX: JsFunction = JsFunction {
    name: "dojo_dijit_layout_StackContainer_getSelectedIndex",
    source: r#"function dojo_dijit_layout_StackContainer_getSelectedIndex(container){
  var object = getDojoObject(container);
  if(object!=undefined && objectIsInstanceof(object, ['dijit.layout.StackContainer'])){
    return object.getIndexOfChild(object.selectedChildWidget);
  }
}"#,
    deps: &[&GET_DOJO_OBJECT, &OBJECT_IS_INSTANCEOF],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_query_includes_lookup_chain() {
        let script = STORE_QUERY.call_script(3);
        for name in &["getDojoObjectById", "getDojoObjectByDomNode", "getDojoObject", "resolveClass"] {
            assert!(script.contains(&format!("function {}(", name)), "{} missing", name);
        }
        assert!(script.ends_with(
            "return dojo_store_api_Store_query(arguments[0], arguments[1], arguments[2]);"
        ));
    }
}
