//! Page-context extraction: turns a live page into a [`ProfileRecord`].

pub mod github;
pub mod linkedin;
pub mod record;

use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::dom;
use crate::error::{AppError, Result};
use crate::page::Page;
use crate::readiness::wait_for_elements;

pub use record::{DegradedProfile, Extraction, ProfileRecord, SectionMap};

pub const UNSUPPORTED_PAGE: &str = "Please navigate to a LinkedIn or GitHub profile page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Linkedin,
    Github,
}

impl Site {
    pub fn from_url(url: &str) -> Option<Site> {
        let url = Url::parse(url).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();

        let on = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));
        if on("linkedin.com") {
            Some(Site::Linkedin)
        } else if on("github.com") {
            Some(Site::Github)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub readiness_timeout: Duration,
    pub include_raw_html: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            readiness_timeout: Duration::from_secs(10),
            include_raw_html: true,
        }
    }
}

/// Extracts whatever the page offers. Only an unsupported host is an
/// error; every failure past that point degrades into a record that still
/// carries the page text.
pub async fn extract_profile(page: &Page, options: &ExtractOptions) -> Result<ProfileRecord> {
    let site = Site::from_url(page.url())
        .ok_or_else(|| AppError::UnsupportedPage(UNSUPPORTED_PAGE.to_string()))?;

    let record = match site {
        Site::Github => ProfileRecord::Github(Extraction::Complete(read_github(page))),
        Site::Linkedin => {
            let ready = wait_for_elements(page, linkedin::READY_SELECTORS, options.readiness_timeout).await;
            match ready {
                Ok(()) => ProfileRecord::Linkedin(Extraction::Complete(read_linkedin(page))),
                Err(err) => {
                    warn!("Profile extraction error: {}", err);
                    ProfileRecord::Linkedin(Extraction::Degraded(degrade(page, &err, options)))
                }
            }
        }
    };

    info!("Extracted {:?} profile from {} (degraded: {})", site, page.url(), record.is_degraded());
    Ok(record)
}

// Parsed trees are not `Send`, so they never outlive these synchronous reads.
fn read_github(page: &Page) -> record::GithubProfile {
    github::extract(&page.snapshot())
}

fn read_linkedin(page: &Page) -> record::LinkedinProfile {
    linkedin::extract(&page.snapshot())
}

fn degrade(page: &Page, err: &AppError, options: &ExtractOptions) -> DegradedProfile {
    let document = page.snapshot();
    DegradedProfile {
        error: err.to_string(),
        content: dom::visible_text(dom::body(&document)),
        raw_html: options.include_raw_html.then(|| page.html()),
    }
}
