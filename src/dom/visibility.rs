use scraper::node::Element;
use scraper::ElementRef;

/// Tags whose content a browser never lays out.
const NEVER_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "noscript", "title", "meta", "link",
];

/// True when the element itself is `display: none` or `visibility: hidden`.
///
/// Styles are resolved from the markup: the `hidden` attribute, the inline
/// `style` declarations and the never-rendered tags. Stylesheet rules are
/// not evaluated.
pub fn hides_subtree(element: &Element) -> bool {
    if NEVER_RENDERED.contains(&element.name()) || element.attr("hidden").is_some() {
        return true;
    }

    let Some(style) = element.attr("style") else {
        return false;
    };

    let display = inline_declaration(style, "display");
    let visibility = inline_declaration(style, "visibility");

    display.as_deref() == Some("none")
        || matches!(visibility.as_deref(), Some("hidden") | Some("collapse"))
}

/// True when neither the element nor any ancestor hides it.
pub fn is_rendered(element: ElementRef) -> bool {
    if hides_subtree(element.value()) {
        return false;
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .all(|ancestor| !hides_subtree(ancestor.value()))
}

// Last declaration of `property` wins, as in the cascade.
fn inline_declaration(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
        .last()
}
