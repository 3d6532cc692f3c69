use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::orchestrator::AnalysisState;
use crate::render::PopupState;

#[derive(Deserialize)]
pub struct OpenTabRequest {
    pub url: String,
    /// Markup to load; fetched from `url` when absent.
    pub html: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTabResponse {
    pub tab_id: u32,
    pub url: String,
    pub opened_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTabResponse {
    pub tab_id: u32,
    pub closed_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct JobDescriptionRequest {
    pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionResponse {
    pub url: String,
    pub job_description: String,
    pub word_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub job_description: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub state: AnalysisState,
    pub popup: PopupState,
    pub analyzed_at: DateTime<Utc>,
}
