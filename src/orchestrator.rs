//! The privileged side of an analysis: find the tab, pull the profile out
//! of it, have it scored and render the verdict.

use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dom;
use crate::error::{AppError, Result};
use crate::extract::{Site, UNSUPPORTED_PAGE};
use crate::render::{PopupView, RenderedAnalysis};
use crate::fetch::fetch_html;
use crate::scoring::ScoringClient;
use crate::tabs::{Tab, TabHost};

pub const EMPTY_JOB_DESCRIPTION: &str = "Please enter or fetch a job description";
pub const EMPTY_JOB_URL: &str = "Please enter a valid URL";
pub const JOB_FETCH_FAILED: &str = "Failed to fetch job description";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum AnalysisState {
    Idle,
    Loading,
    Success(RenderedAnalysis),
    Error(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        RetryPolicy {
            attempts: config.extract_attempts,
            backoff: config.extract_backoff,
        }
    }
}

pub struct Orchestrator<H: TabHost> {
    tabs: Arc<H>,
    scoring: ScoringClient,
    retry: RetryPolicy,
    state: watch::Sender<AnalysisState>,
}

impl<H: TabHost> Orchestrator<H> {
    pub fn new(tabs: Arc<H>, scoring: ScoringClient, retry: RetryPolicy) -> Self {
        let (state, _) = watch::channel(AnalysisState::Idle);
        Orchestrator {
            tabs,
            scoring,
            retry,
            state,
        }
    }

    pub fn tabs(&self) -> &Arc<H> {
        &self.tabs
    }

    /// The state the last analysis cycle is in.
    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Follows state transitions as cycles run.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    /// Runs one analysis cycle against the active tab and renders the
    /// outcome into `view`. Every error ends up in the view; the returned
    /// state is the one the cycle settled in.
    pub async fn analyze<V>(&self, job_description: &str, view: &mut V) -> AnalysisState
    where
        V: PopupView + Send,
    {
        let job_description = job_description.trim();
        if job_description.is_empty() {
            view.show_notice(EMPTY_JOB_DESCRIPTION);
            return AnalysisState::Idle;
        }

        view.dismiss_error();
        view.set_analyze_enabled(false);
        self.state.send_replace(AnalysisState::Loading);
        view.set_loading(true);

        let state = match self.run(job_description).await {
            Ok(rendered) => {
                view.show_results(&rendered);
                AnalysisState::Success(rendered)
            }
            Err(err) => {
                error!("Analysis error: {}", err);
                let message = err.to_string();
                view.show_error(&message);
                AnalysisState::Error(message)
            }
        };

        self.state.send_replace(state.clone());
        view.set_loading(false);
        view.set_analyze_enabled(true);
        state
    }

    async fn run(&self, job_description: &str) -> Result<RenderedAnalysis> {
        let tab = self
            .tabs
            .active_tab()
            .await?
            .ok_or_else(|| AppError::UnsupportedPage("No active tab found".to_string()))?;

        if Site::from_url(&tab.url).is_none() {
            return Err(AppError::UnsupportedPage(UNSUPPORTED_PAGE.to_string()));
        }
        info!("Analyzing profile in tab {} ({})", tab.tab_id, tab.url);

        if let Err(err) = self.tabs.inject_extractor(tab.tab_id).await {
            debug!("Content script already injected: {}", err);
        }

        let profile = self.request_profile(&tab).await?;
        let result = self.scoring.analyze(&profile, job_description).await?;
        info!("Match percentage: {}", result.match_score);

        Ok(RenderedAnalysis::from(&result))
    }

    /// Asks the tab's extractor for the profile, attempt after attempt,
    /// until a reply with content arrives.
    pub async fn request_profile(&self, tab: &Tab) -> Result<Value> {
        for attempt in 1..=self.retry.attempts {
            match self
                .tabs
                .send_message(tab.tab_id, json!({ "action": "extractProfile" }))
                .await
            {
                Ok(reply) if !is_empty_reply(&reply) => return Ok(reply),
                Ok(_) => warn!("Attempt {} returned no profile data", attempt),
                Err(err) => {
                    warn!("Attempt {} failed: {}", attempt, err);
                    if attempt < self.retry.attempts {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
            }
        }

        Err(AppError::ExtractionExhausted {
            attempts: self.retry.attempts,
        })
    }

    /// Fills the job-description field from the `.job-description` element
    /// of the page at `url`.
    pub async fn fetch_job<V>(&self, url: &str, view: &mut V) -> Result<String>
    where
        V: PopupView + Send,
    {
        let url = url.trim();
        if url.is_empty() {
            view.show_notice(EMPTY_JOB_URL);
            return Err(AppError::ValidationError(EMPTY_JOB_URL.to_string()));
        }

        view.set_loading(true);
        let fetched = fetch_html(url).await;
        view.set_loading(false);

        match fetched {
            Ok(html) => {
                let text = job_description_text(&html);
                view.set_job_description(&text);
                Ok(text)
            }
            Err(err) => {
                warn!("Job description fetch failed for {}: {}", url, err);
                view.show_notice(JOB_FETCH_FAILED);
                Err(err)
            }
        }
    }
}

fn is_empty_reply(reply: &Value) -> bool {
    match reply {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Text content of the first `.job-description` element; empty when the
/// page has none.
pub fn job_description_text(html: &str) -> String {
    let document = Html::parse_document(html);
    dom::select_first(document.root_element(), ".job-description")
        .map(dom::text_content)
        .unwrap_or_default()
}
