use stringmatch::Needle;

use crate::error::WebDriverResult;
use crate::webelement::WebElement;

/// A check evaluated against an element on every poll.
pub type ElementPredicate = Box<dyn Fn(&WebElement) -> WebDriverResult<bool> + Send + Sync>;

/// Turn an error into `false` when errors are being ignored.
pub fn handle_errors(result: WebDriverResult<bool>, ignore_errors: bool) -> WebDriverResult<bool> {
    match result {
        Ok(x) => Ok(x),
        Err(e) => match ignore_errors {
            true => Ok(false),
            false => Err(e),
        },
    }
}

pub fn element_is_displayed(ignore_errors: bool) -> ElementPredicate {
    Box::new(move |elem| handle_errors(elem.is_displayed(), ignore_errors))
}

pub fn element_is_not_displayed(ignore_errors: bool) -> ElementPredicate {
    Box::new(move |elem| handle_errors(elem.is_displayed().map(|x| !x), ignore_errors))
}

pub fn element_is_enabled(ignore_errors: bool) -> ElementPredicate {
    Box::new(move |elem| handle_errors(elem.is_enabled(), ignore_errors))
}

pub fn element_has_text<N>(text: N, ignore_errors: bool) -> ElementPredicate
where
    N: Needle + Clone + Send + Sync + 'static,
{
    Box::new(move |elem| handle_errors(elem.text().map(|x| text.is_match(&x)), ignore_errors))
}

/// The attribute is present and matches. A missing attribute never matches.
pub fn element_has_attribute<S, N>(
    attribute_name: S,
    value: N,
    ignore_errors: bool,
) -> ElementPredicate
where
    S: Into<String>,
    N: Needle + Clone + Send + Sync + 'static,
{
    let attribute_name: String = attribute_name.into();
    Box::new(move |elem| {
        handle_errors(
            elem.get_attribute(&attribute_name)
                .map(|x| x.map(|v| value.is_match(&v)).unwrap_or(false)),
            ignore_errors,
        )
    })
}

/// One of the whitespace separated class tokens matches.
pub fn element_has_class<N>(class_name: N, ignore_errors: bool) -> ElementPredicate
where
    N: Needle + Clone + Send + Sync + 'static,
{
    Box::new(move |elem| {
        handle_errors(
            elem.class_name().map(|x| {
                x.map(|c| c.split_whitespace().any(|t| class_name.is_match(t))).unwrap_or(false)
            }),
            ignore_errors,
        )
    })
}
