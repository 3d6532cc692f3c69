use scraper::{ElementRef, Html};

use crate::dom::{self, safe_text, select_all, visible_text};
use super::record::{GithubProfile, PageContent};

pub fn extract(document: &Html) -> GithubProfile {
    let root = document.root_element();
    let body = dom::body(document);
    let full_page = visible_text(body);

    GithubProfile {
        username: either(root, "[itemprop=\"name\"]", "[itemprop=\"additionalName\"]"),
        bio: either(root, "[itemprop=\"description\"]", ".user-profile-bio"),
        repos: select_all(root, "[itemprop=\"owns\"]")
            .into_iter()
            .map(visible_text)
            .filter(|repo| !repo.is_empty())
            .collect(),
        content: full_page.clone(),
        page_content: PageContent {
            text: full_page,
            markdown: dom::to_markdown(body),
            sections: None,
        },
    }
}

fn either(root: ElementRef, primary: &str, fallback: &str) -> String {
    let text = safe_text(root, primary);
    if text.is_empty() {
        safe_text(root, fallback)
    } else {
        text
    }
}
