use scraper::{ElementRef, Html};
use uuid::Uuid;

use crate::dom::{self, safe_text, select_all, select_first, visible_text};
use super::record::{
    Certification, Education, Experience, LinkedinProfile, PageContent, Project, Publication,
    RawContent, SectionMap,
};

/// Elements a profile page must show before it is worth reading.
pub const READY_SELECTORS: &[&str] = &["h1", "main", ".pv-top-card"];

const TITLE: &[&str] = &[".t-bold span", ".t-bold .visually-hidden", ".t-bold"];
const SUBTITLE: &[&str] = &[".t-normal span", ".t-normal .visually-hidden", ".t-normal"];
const DURATION: &[&str] = &[
    ".pvs-entity__caption-wrapper",
    ".date-range .visually-hidden",
    ".date-range",
];
const LOCATION: &[&str] = &[".pvs-entity__sub-navigational-text"];
const DESCRIPTION: &[&str] = &[
    ".pvs-list__item--with-top-padding",
    ".pvs-list__item--with-top-padding .visually-hidden",
];

pub fn extract(document: &Html) -> LinkedinProfile {
    let root = document.root_element();
    let body = dom::body(document);

    let sections = section_map(root);
    let full_page = visible_text(body);

    LinkedinProfile {
        name: safe_text(root, "h1"),
        headline: safe_text(root, "div.text-body-medium"),
        about: first_text(
            root,
            &[
                "#about ~ div .pv-shared-text-with-see-more",
                "#about ~ div .inline-show-more-text",
            ],
        ),
        experience: experience(root),
        education: education(root),
        skills: entries(root, "skills")
            .into_iter()
            .map(|skill| first_text(skill, TITLE))
            .filter(|skill| !skill.is_empty())
            .collect(),
        certifications: certifications(root),
        projects: projects(root),
        publications: publications(root),
        recommendations: entries(root, "recommendations")
            .into_iter()
            .map(visible_text)
            .filter(|text| !text.is_empty())
            .collect(),
        raw_content: RawContent {
            intro: select_first(root, ".pv-top-card")
                .map(visible_text)
                .unwrap_or_default(),
            sections: sections.clone(),
            full_page: full_page.clone(),
        },
        content: full_page.clone(),
        page_content: PageContent {
            text: full_page,
            markdown: dom::to_markdown(body),
            sections: Some(sections),
        },
    }
}

/// Every profile card keyed by its id, or by a generated token when the
/// card has none (or repeats one already taken).
pub fn section_map(root: ElementRef) -> SectionMap {
    let mut sections = SectionMap::new();

    for section in select_all(root, "section.artdeco-card") {
        let mut key = section
            .value()
            .id()
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(section_token);
        while sections.contains_key(&key) {
            key = section_token();
        }
        sections.insert(key, visible_text(section));
    }

    sections
}

fn section_token() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("section_{}", &token[..9])
}

/// The entities listed under the section anchored at `#section_id`.
fn entries<'a>(root: ElementRef<'a>, section_id: &str) -> Vec<ElementRef<'a>> {
    select_all(root, &format!("#{} ~ div .pvs-list .pvs-entity", section_id))
}

/// The first non-empty text among `selectors`.
fn first_text(root: ElementRef, selectors: &[&str]) -> String {
    selectors
        .iter()
        .map(|selector| safe_text(root, selector))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn experience(root: ElementRef) -> Vec<Experience> {
    entries(root, "experience")
        .into_iter()
        .map(|exp| Experience {
            full_text: visible_text(exp),
            title: first_text(exp, TITLE),
            company: first_text(exp, SUBTITLE),
            duration: first_text(exp, DURATION),
            location: first_text(exp, LOCATION),
            description: first_text(exp, DESCRIPTION),
        })
        .collect()
}

fn education(root: ElementRef) -> Vec<Education> {
    entries(root, "education")
        .into_iter()
        .map(|edu| Education {
            full_text: visible_text(edu),
            school: first_text(edu, TITLE),
            degree: first_text(edu, SUBTITLE),
            duration: first_text(edu, DURATION),
        })
        .collect()
}

fn certifications(root: ElementRef) -> Vec<Certification> {
    entries(root, "licenses_and_certifications")
        .into_iter()
        .map(|cert| Certification {
            full_text: visible_text(cert),
            name: first_text(cert, TITLE),
            issuer: first_text(cert, SUBTITLE),
        })
        .collect()
}

fn projects(root: ElementRef) -> Vec<Project> {
    entries(root, "projects")
        .into_iter()
        .map(|proj| Project {
            full_text: visible_text(proj),
            title: first_text(proj, TITLE),
            description: first_text(proj, DESCRIPTION),
        })
        .collect()
}

fn publications(root: ElementRef) -> Vec<Publication> {
    entries(root, "publications")
        .into_iter()
        .map(|publication| Publication {
            full_text: visible_text(publication),
            title: first_text(publication, TITLE),
            publisher: first_text(publication, SUBTITLE),
        })
        .collect()
}
