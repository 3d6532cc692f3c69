//! Null-safe DOM helpers shared by every site extractor.
//!
//! Nothing in here fails: a missing node, an unparseable selector or a
//! hidden subtree all collapse to an empty value.

pub mod markdown;
pub mod visibility;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

pub use markdown::to_markdown;
pub use visibility::{hides_subtree, is_rendered};

pub fn parse_selector(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

pub fn select_first<'a>(root: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(selector)?;
    root.select(&selector).next()
}

pub fn select_all<'a>(root: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    match parse_selector(selector) {
        Some(selector) => root.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Visible text of the first match under `root`, or an empty string.
pub fn safe_text(root: ElementRef, selector: &str) -> String {
    select_first(root, selector)
        .map(visible_text)
        .unwrap_or_default()
}

/// Rendered text of an element: hidden subtrees are skipped and the trimmed
/// pieces are joined with single spaces.
pub fn visible_text(element: ElementRef) -> String {
    if !is_rendered(element) {
        return String::new();
    }
    collect_visible(element)
}

fn collect_visible(element: ElementRef) -> String {
    let mut parts: Vec<String> = Vec::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if hides_subtree(el) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    let text = collect_visible(child_el);
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    parts.join(" ")
}

/// Raw text content, hidden nodes included.
pub fn text_content(element: ElementRef) -> String {
    element.text().collect()
}

/// The `<body>` element, or the document root when there is none.
pub fn body(document: &Html) -> ElementRef<'_> {
    select_first(document.root_element(), "body").unwrap_or_else(|| document.root_element())
}
