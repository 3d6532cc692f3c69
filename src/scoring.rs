use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    profile: &'a Value,
    #[serde(rename = "jobDescription")]
    job_description: &'a str,
}

/// The scoring service's verdict, read defensively: every field may be
/// missing or mistyped upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// 0 unless upstream sent an integer; clamped to 0–100.
    pub match_score: u8,
    /// `matchScore` exactly as received, for diagnostics.
    pub raw_score: Value,
    pub score_reasoning: Option<String>,
    pub analysis: String,
    pub message: String,
    pub success: Option<bool>,
}

impl AnalysisResult {
    pub fn from_value(value: &Value) -> Self {
        let raw_score = value.get("matchScore").cloned().unwrap_or(Value::Null);

        AnalysisResult {
            match_score: integer_score(&raw_score),
            raw_score,
            score_reasoning: markdown_field(value, "scoreReasoning").filter(|s| !s.is_empty()),
            analysis: markdown_field(value, "analysis").unwrap_or_default(),
            message: markdown_field(value, "message").unwrap_or_default(),
            success: value.get("success").and_then(Value::as_bool),
        }
    }
}

// Integers only: `73.0` counts, `73.5` and `"73"` do not.
fn integer_score(raw: &Value) -> u8 {
    let Value::Number(number) = raw else {
        return 0;
    };

    let score = if let Some(n) = number.as_i64() {
        n
    } else if let Some(n) = number.as_u64() {
        i64::try_from(n).unwrap_or(i64::MAX)
    } else {
        match number.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
            _ => return 0,
        }
    };

    score.clamp(0, 100) as u8
}

fn markdown_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[derive(Clone)]
pub struct ScoringClient {
    client: Client,
    endpoint: String,
}

impl ScoringClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(ScoringClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// POSTs `{ profile, jobDescription }`; the profile goes out untouched.
    pub async fn analyze(&self, profile: &Value, job_description: &str) -> Result<AnalysisResult> {
        info!("Sending profile to {} for analysis", self.endpoint);
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest {
                profile,
                job_description,
            })
            .send()
            .await?;

        let status = response.status();
        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        debug!("Analysis response ({}): {}", status, body);
        info!("Scoring round trip took {:?}", start.elapsed());

        Ok(AnalysisResult::from_value(&body))
    }
}
