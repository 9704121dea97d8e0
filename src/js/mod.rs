//! JavaScript injected into the page to talk to widget toolkits.
//!
//! Each script is a named function with a static list of the functions it
//! calls. [`JsFunction::call_script`] emits every dependency once, in
//! dependency order, followed by a `return name(arguments[0], ...)` call.
//!
//! Class names are passed as string arrays and resolved against `window`
//! inside the page, so no script text is ever generated from user input.

use std::collections::HashSet;

use serde_json::{json, Value};

use crate::common::scriptargs::ScriptArgs;
use crate::error::WebDriverResult;
use crate::session::WebDriverSession;
use crate::webdrivercommands::{ScriptRetSync, WebDriverCommands};
use crate::webelement::WebElement;

pub mod dojo;
pub mod sap;

/// A JavaScript function definition and the functions it depends on.
#[derive(Debug)]
pub struct JsFunction {
    pub name: &'static str,
    pub source: &'static str,
    pub deps: &'static [&'static JsFunction],
}

impl JsFunction {
    /// The definitions of all dependencies (depth first, each once) and then
    /// this function.
    pub fn with_dependencies(&self) -> String {
        let mut seen = HashSet::new();
        let mut out = String::new();
        self.collect(&mut seen, &mut out);
        out
    }

    fn collect(&self, seen: &mut HashSet<&'static str>, out: &mut String) {
        if !seen.insert(self.name) {
            return;
        }
        for dep in self.deps {
            dep.collect(seen, out);
        }
        out.push_str(self.source);
        out.push('\n');
    }

    /// A complete script that defines this function and returns the result
    /// of calling it with the first `argc` script arguments.
    ///
    /// ```rust
    /// use widgetdriver_sync::js::SCROLL_INTO_VIEW;
    ///
    /// let script = SCROLL_INTO_VIEW.call_script(2);
    /// assert!(script.starts_with("function scrollIntoView("));
    /// assert!(script.ends_with("return scrollIntoView(arguments[0], arguments[1]);"));
    /// ```
    pub fn call_script(&self, argc: usize) -> String {
        let args: Vec<String> = (0..argc).map(|i| format!("arguments[{}]", i)).collect();
        format!("{}return {}({});", self.with_dependencies(), self.name, args.join(", "))
    }
}

/// Run `function` in the browser with the given arguments.
pub fn call<'a>(
    session: &'a WebDriverSession,
    function: &JsFunction,
    args: &ScriptArgs,
) -> WebDriverResult<ScriptRetSync<'a>> {
    let argc = args.get_args().len();
    session.execute_script_with_args(&function.call_script(argc), args)
}

/// Run `function` on a DOM element, optionally followed by extra arguments.
pub fn call_on<'a>(
    element: &WebElement<'a>,
    function: &JsFunction,
    extra: &[Value],
) -> WebDriverResult<ScriptRetSync<'a>> {
    let mut args = ScriptArgs::new();
    args.push(element)?;
    for value in extra {
        args.push_value(value.clone());
    }
    call(element.session(), function, &args)
}

/// Resolve a dotted class name such as `sap.m.Select` against `window`.
pub static RESOLVE_CLASS: JsFunction = JsFunction {
    name: "resolveClass",
    source: r#"function resolveClass(name){
  var parts = String(name).split('.');
  var clazz = window;
  for(var i=0; i<parts.length && clazz!=undefined; i++){
    clazz = clazz[parts[i]];
  }
  return clazz;
}"#,
    deps: &[],
};

/// `true` if `object` is an instance of any of the named classes.
pub static OBJECT_IS_INSTANCEOF: JsFunction = JsFunction {
    name: "objectIsInstanceof",
    source: r#"function objectIsInstanceof(object, clazzes){
  if(object==undefined || clazzes==undefined) return false;
  for(var i=0; i<clazzes.length; i++){
    try{
      var clazz = resolveClass(clazzes[i]);
      if(clazz!=undefined && object instanceof clazz) return true;
    }catch(error){}
  }
  return false;
}"#,
    deps: &[&RESOLVE_CLASS],
};

/// The `LI` elements of a plain `ul`/`ol` list.
pub static GENERIC_GET_LIST_ITEMS: JsFunction = JsFunction {
    name: "generic_getListItems",
    source: r#"function generic_getListItems(webElement){
  var items = webElement.getElementsByTagName('LI');
  if(items==undefined) throw new Error('can not find items in List.');
  return items;
}"#,
    deps: &[],
};

pub static SCROLL_INTO_VIEW: JsFunction = JsFunction {
    name: "scrollIntoView",
    source: r#"function scrollIntoView(element, alignToTop){
  element.scrollIntoView(alignToTop);
}"#,
    deps: &[],
};

/// Scroll an element (or the window when the element has no scroll area)
/// by a pixel offset.
pub static SCROLL_BY: JsFunction = JsFunction {
    name: "scrollBy",
    source: r#"function scrollBy(element, x, y){
  if(element!=undefined && (element.scrollHeight > element.clientHeight || element.scrollWidth > element.clientWidth)){
    element.scrollLeft += x;
    element.scrollTop += y;
  }else{
    window.scrollBy(x, y);
  }
}"#,
    deps: &[],
};

/// Set an `input` check box and fire the events a click would.
pub static HTML_SET_CHECKED: JsFunction = JsFunction {
    name: "html_setChecked",
    source: r#"function html_setChecked(element, checked){
  element.checked = checked;
  element.dispatchEvent(new Event('input', {bubbles: true}));
  element.dispatchEvent(new Event('change', {bubbles: true}));
}"#,
    deps: &[],
};

/// Scroll `element` into view, aligned to the top of the visible area.
pub fn scroll_into_view(element: &WebElement<'_>, align_to_top: bool) -> WebDriverResult<()> {
    call_on(element, &SCROLL_INTO_VIEW, &[json!(align_to_top)])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    static A: JsFunction = JsFunction {
        name: "a",
        source: "function a(){}",
        deps: &[],
    };
    static B: JsFunction = JsFunction {
        name: "b",
        source: "function b(){ a(); }",
        deps: &[&A],
    };
    static C: JsFunction = JsFunction {
        name: "c",
        source: "function c(){ a(); b(); }",
        deps: &[&A, &B],
    };

    #[test]
    fn test_dependencies_emitted_once_in_order() {
        let script = C.with_dependencies();
        assert_eq!(script, "function a(){}\nfunction b(){ a(); }\nfunction c(){ a(); b(); }\n");
    }

    #[test]
    fn test_call_script_without_arguments() {
        assert!(A.call_script(0).ends_with("return a();"));
    }

    #[test]
    fn test_instanceof_pulls_in_class_resolution() {
        let script = OBJECT_IS_INSTANCEOF.with_dependencies();
        let resolve = script.find("function resolveClass").expect("resolveClass defined");
        let check = script.find("function objectIsInstanceof").expect("instanceof defined");
        assert!(resolve < check);
    }
}
