//! Popup rendering: analysis results and errors as sanitized HTML
//! fragments, written into a [`PopupView`] handed in by the caller.

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;
use serde_json::Value;

use crate::scoring::AnalysisResult;

pub const SCORE_FALLBACK: &str = "Score calculation failed";
pub const GENERIC_ERROR: &str = "Error analyzing profile. Please try again.";

/// The popup's controls as the orchestrator drives them.
pub trait PopupView {
    fn set_loading(&mut self, loading: bool);
    fn set_analyze_enabled(&mut self, enabled: bool);
    fn set_job_description(&mut self, text: &str);
    fn show_results(&mut self, rendered: &RenderedAnalysis);
    /// Replaces the results pane with an error.
    fn show_error(&mut self, message: &str);
    /// A short-lived notice above the results pane.
    fn show_notice(&mut self, message: &str);
    /// Clears a shown error and any notice.
    fn dismiss_error(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedAnalysis {
    pub match_percentage: u8,
    pub bar_width: String,
    pub match_value: String,
    pub match_label_html: String,
    pub qualifications_html: String,
    pub message_html: String,
    pub debug_info: String,
}

impl From<&AnalysisResult> for RenderedAnalysis {
    fn from(result: &AnalysisResult) -> Self {
        let percent = format!("{}%", result.match_score);

        RenderedAnalysis {
            match_percentage: result.match_score,
            bar_width: percent.clone(),
            match_value: percent,
            match_label_html: match &result.score_reasoning {
                Some(reasoning) => markdown_to_html(reasoning),
                None => SCORE_FALLBACK.to_string(),
            },
            qualifications_html: markdown_to_html(&result.analysis),
            message_html: markdown_to_html(&result.message),
            debug_info: format!(
                "Raw score: {}, Parsed: {}, Success: {}",
                display_raw(&result.raw_score),
                result.match_score,
                result
                    .success
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "undefined".to_string()),
            ),
        }
    }
}

fn display_raw(raw: &Value) -> String {
    match raw {
        Value::Null => "undefined".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn error_html(message: &str) -> String {
    let message = if message.trim().is_empty() { GENERIC_ERROR } else { message };
    format!(
        "<div class=\"error-message\"><span class=\"material-icons\">error</span><p>{}</p></div>",
        escape_html(message)
    )
}

/// Popup state captured as data, for callers without a real document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupState {
    pub loading: bool,
    pub analyze_enabled: bool,
    pub job_description: String,
    pub results_visible: bool,
    pub results: Option<RenderedAnalysis>,
    pub error_html: Option<String>,
    pub notice: Option<String>,
}

impl Default for PopupState {
    fn default() -> Self {
        PopupState {
            loading: false,
            analyze_enabled: true,
            job_description: String::new(),
            results_visible: false,
            results: None,
            error_html: None,
            notice: None,
        }
    }
}

impl PopupView for PopupState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if loading {
            self.results_visible = false;
        }
    }

    fn set_analyze_enabled(&mut self, enabled: bool) {
        self.analyze_enabled = enabled;
    }

    fn set_job_description(&mut self, text: &str) {
        self.job_description = text.to_string();
    }

    fn show_results(&mut self, rendered: &RenderedAnalysis) {
        self.results = Some(rendered.clone());
        self.error_html = None;
        self.results_visible = true;
    }

    fn show_error(&mut self, message: &str) {
        self.results = None;
        self.error_html = Some(error_html(message));
        self.results_visible = true;
    }

    fn show_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    fn dismiss_error(&mut self) {
        self.error_html = None;
        self.notice = None;
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Markdown to sanitized HTML. GFM tables and strikethrough are parsed,
/// single newlines become line breaks and raw HTML in the source is shown
/// as text.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, events);

    ammonia::clean(&rendered).trim_end().to_string()
}
