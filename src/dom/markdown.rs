use scraper::node::Node;
use scraper::ElementRef;

use super::hides_subtree;

/// Renders the children of `element` as markdown.
///
/// Any element whose rendered content trims to nothing is dropped, so the
/// output never carries an empty heading, paragraph or list item.
pub fn to_markdown(element: ElementRef) -> String {
    let mut markdown = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => markdown.push_str(text.trim()),
            Node::Element(el) => {
                if hides_subtree(el) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };

                let tag = el.name();
                // A line break has no content of its own, so it is mapped
                // before the empty-content skip below.
                if tag == "br" {
                    markdown.push('\n');
                    continue;
                }

                let rendered = to_markdown(child_el);
                let content = rendered.trim();
                if content.is_empty() {
                    continue;
                }

                match tag {
                    "h1" => push_block(&mut markdown, "# ", content),
                    "h2" => push_block(&mut markdown, "## ", content),
                    "h3" => push_block(&mut markdown, "### ", content),
                    "p" => push_block(&mut markdown, "", content),
                    "ul" => push_list(&mut markdown, content, |_| "- ".to_string()),
                    "ol" => push_list(&mut markdown, content, |n| format!("{}. ", n + 1)),
                    "li" => {
                        markdown.push_str(content);
                        markdown.push('\n');
                    }
                    "strong" | "b" => {
                        markdown.push_str("**");
                        markdown.push_str(content);
                        markdown.push_str("**");
                    }
                    "em" | "i" => {
                        markdown.push('*');
                        markdown.push_str(content);
                        markdown.push('*');
                    }
                    "div" | "span" => {
                        markdown.push_str(content);
                        markdown.push(' ');
                    }
                    _ => markdown.push_str(content),
                }
            }
            _ => {}
        }
    }

    markdown
}

fn push_block(markdown: &mut String, prefix: &str, content: &str) {
    markdown.push_str(prefix);
    markdown.push_str(content);
    markdown.push_str("\n\n");
}

fn push_list<F>(markdown: &mut String, content: &str, marker: F)
where
    F: Fn(usize) -> String,
{
    for (n, line) in content.lines().filter(|line| !line.trim().is_empty()).enumerate() {
        markdown.push_str(&marker(n));
        markdown.push_str(line);
        markdown.push('\n');
    }
    markdown.push('\n');
}
