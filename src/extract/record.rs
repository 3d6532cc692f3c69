use std::collections::BTreeMap;

use serde::Serialize;

/// Section identifier to the visible text of that section.
pub type SectionMap = BTreeMap<String, String>;

/// What the content script sends back for one extraction request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProfileRecord {
    Linkedin(Extraction<LinkedinProfile>),
    Github(Extraction<GithubProfile>),
}

impl ProfileRecord {
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            ProfileRecord::Linkedin(Extraction::Degraded(_))
                | ProfileRecord::Github(Extraction::Degraded(_))
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Extraction<T> {
    Complete(T),
    Degraded(DegradedProfile),
}

/// Best-effort record produced when extraction itself failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedProfile {
    pub error: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedinProfile {
    pub name: String,
    pub headline: String,
    pub about: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<Project>,
    pub publications: Vec<Publication>,
    pub recommendations: Vec<String>,
    pub raw_content: RawContent,
    pub content: String,
    pub page_content: PageContent,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub full_text: String,
    pub title: String,
    pub company: String,
    pub duration: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub full_text: String,
    pub school: String,
    pub degree: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub full_text: String,
    pub name: String,
    pub issuer: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub full_text: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub full_text: String,
    pub title: String,
    pub publisher: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub intro: String,
    pub sections: SectionMap,
    pub full_page: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageContent {
    pub text: String,
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<SectionMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubProfile {
    pub username: String,
    pub bio: String,
    pub repos: Vec<String>,
    pub content: String,
    pub page_content: PageContent,
}
