use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_match::error::Result;
use profile_match::extract::ExtractOptions;
use profile_match::orchestrator::{AnalysisState, Orchestrator, RetryPolicy};
use profile_match::render::{PopupState, SCORE_FALLBACK};
use profile_match::scoring::ScoringClient;
use profile_match::tabs::{LocalTabHost, Tab, TabHost};

/// A browser whose only tab answers with a fixed extractor reply.
struct CannedTab {
    url: String,
    reply: Value,
}

#[async_trait]
impl TabHost for CannedTab {
    async fn active_tab(&self) -> Result<Option<Tab>> {
        Ok(Some(Tab {
            tab_id: 1,
            url: self.url.clone(),
        }))
    }

    async fn inject_extractor(&self, _tab_id: u32) -> Result<()> {
        Ok(())
    }

    async fn send_message(&self, _tab_id: u32, _message: Value) -> Result<Value> {
        Ok(self.reply.clone())
    }
}

fn quick_retries() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        backoff: Duration::from_millis(10),
    }
}

fn orchestrator_for<H: TabHost>(host: H, server: &MockServer) -> Orchestrator<H> {
    Orchestrator::new(
        Arc::new(host),
        ScoringClient::new(format!("{}/analyze", server.uri())).unwrap(),
        quick_retries(),
    )
}

#[tokio::test]
async fn github_profile_is_forwarded_verbatim() {
    let server = MockServer::start().await;
    let profile = json!({ "type": "github", "username": "alice", "bio": "", "repos": [] });

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_json(json!({
            "profile": profile.clone(),
            "jobDescription": "Senior Rust engineer"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchScore": 88,
            "scoreReasoning": "**Strong** systems background",
            "analysis": "- Rust\n- Tokio",
            "message": "Hi Alice",
            "success": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(
        CannedTab {
            url: "https://github.com/alice".to_string(),
            reply: profile,
        },
        &server,
    );
    let mut popup = PopupState::default();

    let state = orchestrator.analyze("  Senior Rust engineer \n", &mut popup).await;

    let AnalysisState::Success(rendered) = state else {
        panic!("expected success, got {:?}", state);
    };
    assert_eq!(rendered.match_value, "88%");
    assert_eq!(rendered.bar_width, "88%");
    assert_eq!(rendered.match_label_html, "<p><strong>Strong</strong> systems background</p>");
    assert_eq!(rendered.qualifications_html, "<ul>\n<li>Rust</li>\n<li>Tokio</li>\n</ul>");
    assert_eq!(rendered.message_html, "<p>Hi Alice</p>");
    assert_eq!(rendered.debug_info, "Raw score: 88, Parsed: 88, Success: true");
    assert!(popup.results_visible);
    assert!(popup.analyze_enabled);
}

#[tokio::test]
async fn string_scores_render_as_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matchScore": "73" })))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(
        CannedTab {
            url: "https://www.linkedin.com/in/jane".to_string(),
            reply: json!({ "type": "linkedin", "name": "Jane" }),
        },
        &server,
    );
    let mut popup = PopupState::default();

    let state = orchestrator.analyze("Rust engineer", &mut popup).await;

    let AnalysisState::Success(rendered) = state else {
        panic!("expected success, got {:?}", state);
    };
    assert_eq!(rendered.match_value, "0%");
    assert_eq!(rendered.match_label_html, SCORE_FALLBACK);
    assert_eq!(rendered.qualifications_html, "");
    assert_eq!(rendered.message_html, "");
}

#[tokio::test]
async fn malformed_scoring_replies_render_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Internal Server Error</html>"))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(
        CannedTab {
            url: "https://github.com/alice".to_string(),
            reply: json!({ "type": "github", "username": "alice" }),
        },
        &server,
    );
    let mut popup = PopupState::default();

    let state = orchestrator.analyze("Rust engineer", &mut popup).await;

    assert!(matches!(state, AnalysisState::Error(ref msg) if msg.starts_with("Error parsing content")));
    assert!(popup.results.is_none());
    assert!(popup.error_html.unwrap().contains("error-message"));
    assert!(popup.analyze_enabled);
}

#[tokio::test]
async fn linkedin_page_is_extracted_once_it_finishes_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(json!({
            "profile": {
                "type": "linkedin",
                "name": "Jane Doe",
                "headline": "Compiler engineer",
                "skills": ["Rust", "LLVM"]
            },
            "jobDescription": "Compiler engineer"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchScore": 91,
            "scoreReasoning": "Excellent fit",
            "analysis": "## Strengths",
            "message": "Hello Jane",
            "success": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = LocalTabHost::new(ExtractOptions {
        readiness_timeout: Duration::from_secs(5),
        include_raw_html: false,
    });
    let tab = host.open(
        "https://www.linkedin.com/in/jane-doe",
        "<html><body><h1>Jane Doe</h1></body></html>",
    );
    let page = host.page(tab.tab_id).unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        page.mutate(
            r#"<html><body><main>
                 <section class="artdeco-card pv-top-card">
                   <h1>Jane Doe</h1>
                   <div class="text-body-medium">Compiler engineer</div>
                 </section>
                 <section class="artdeco-card" id="skills-card">
                   <div id="skills"></div>
                   <div><ul class="pvs-list">
                     <li class="pvs-entity"><div class="t-bold"><span>Rust</span></div></li>
                     <li class="pvs-entity"><div class="t-bold"><span>LLVM</span></div></li>
                   </ul></div>
                 </section>
               </main></body></html>"#,
        );
    });

    let orchestrator = orchestrator_for(host, &server);
    let mut popup = PopupState::default();

    let state = orchestrator.analyze("Compiler engineer", &mut popup).await;

    let AnalysisState::Success(rendered) = state else {
        panic!("expected success, got {:?}", state);
    };
    assert_eq!(rendered.match_value, "91%");
    assert_eq!(rendered.qualifications_html, "<h2>Strengths</h2>");

    let page = orchestrator.tabs().page(tab.tab_id).unwrap();
    assert_eq!(page.active_observers(), 0);
}

#[tokio::test]
async fn tab_without_extractor_reply_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matchScore": 50 })))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(
        CannedTab {
            url: "https://github.com/alice".to_string(),
            reply: Value::Null,
        },
        &server,
    );
    let mut popup = PopupState::default();

    let state = orchestrator.analyze("Rust engineer", &mut popup).await;

    assert_eq!(
        state,
        AnalysisState::Error("Could not extract profile data after 3 attempts".to_string())
    );
}
