use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_match::api::routes::create_router;
use profile_match::config::Config;
use profile_match::AppState;

async fn spawn_app(scoring: &MockServer) -> String {
    let config = Config {
        scoring_url: format!("{}/analyze", scoring.uri()),
        ..Config::default()
    };
    let app = create_router(AppState::new(config).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn post(url: String, body: Value) -> (u16, Value) {
    send(reqwest::Client::new().post(url).json(&body)).await
}

async fn send(request: reqwest::RequestBuilder) -> (u16, Value) {
    let response = request.send().await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn open_tab_then_analyze() {
    let scoring = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchScore": 64,
            "scoreReasoning": "Decent overlap",
            "analysis": "Knows *Rust*",
            "message": "Hi",
            "success": true
        })))
        .expect(1)
        .mount(&scoring)
        .await;
    let base = spawn_app(&scoring).await;

    let (status, body) = post(
        format!("{}/api/tabs", base),
        json!({
            "url": "https://github.com/alice",
            "html": "<html><body><span itemprop=\"name\">alice</span></body></html>"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["tabId"], 1);

    let (status, body) = post(
        format!("{}/api/analyze", base),
        json!({ "jobDescription": "Rust engineer" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"]["state"]["state"], "success");
    assert_eq!(body["data"]["popup"]["results"]["matchValue"], "64%");
    assert_eq!(body["data"]["popup"]["results"]["qualificationsHtml"], "<p>Knows <em>Rust</em></p>");

    let (status, body) = send(reqwest::Client::new().get(format!("{}/api/analyze/state", base))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["state"], "success");
    assert_eq!(body["data"]["detail"]["matchValue"], "64%");
}

#[tokio::test]
async fn tabs_can_be_activated_and_closed() {
    let scoring = MockServer::start().await;
    let base = spawn_app(&scoring).await;
    let client = reqwest::Client::new();

    for url in ["https://github.com/alice", "https://www.linkedin.com/in/jane"] {
        post(format!("{}/api/tabs", base), json!({ "url": url, "html": "<body></body>" })).await;
    }

    let (status, body) = send(client.post(format!("{}/api/tabs/1/activate", base))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["url"], "https://github.com/alice");

    let (status, body) = send(client.delete(format!("{}/api/tabs/1", base))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["tabId"], 1);

    let (status, body) = send(client.post(format!("{}/api/tabs/1/activate", base))).await;
    assert_eq!(status, 404);
    assert_eq!(body["meta"]["status"], "error");
    assert_eq!(body["meta"]["message"], "No tab with id 1");

    let (status, body) = post(format!("{}/api/tabs", base), json!({ "url": "  " })).await;
    assert_eq!(status, 400);
    assert_eq!(body["meta"]["message"], "A tab needs a URL");
}

#[tokio::test]
async fn analyze_without_job_description_is_rejected() {
    let scoring = MockServer::start().await;
    let base = spawn_app(&scoring).await;

    let (status, body) = post(format!("{}/api/analyze", base), json!({ "jobDescription": " " })).await;
    assert_eq!(status, 400);
    assert_eq!(body["meta"]["message"], "Please enter or fetch a job description");
}

#[tokio::test]
async fn analyze_on_unsupported_tab_reports_the_rendered_error() {
    let scoring = MockServer::start().await;
    let base = spawn_app(&scoring).await;

    post(
        format!("{}/api/tabs", base),
        json!({ "url": "https://example.com/", "html": "<html><body></body></html>" }),
    )
    .await;

    let (status, body) = post(
        format!("{}/api/analyze", base),
        json!({ "jobDescription": "Rust engineer" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["status"], "error");
    assert_eq!(
        body["meta"]["message"],
        "Please navigate to a LinkedIn or GitHub profile page"
    );
    assert!(body["data"]["popup"]["errorHtml"]
        .as_str()
        .unwrap()
        .contains("LinkedIn or GitHub"));
}

#[tokio::test]
async fn job_description_is_fetched_from_its_page() {
    let scoring = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>Careers</h1><div class=\"job-description\">Write async Rust services</div></body></html>",
        ))
        .mount(&scoring)
        .await;
    let base = spawn_app(&scoring).await;

    let (status, body) = post(
        format!("{}/api/job-description", base),
        json!({ "url": format!("{}/jobs/rust", scoring.uri()) }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["jobDescription"], "Write async Rust services");
    assert_eq!(body["data"]["wordCount"], 4);

    let (status, body) = post(format!("{}/api/job-description", base), json!({ "url": "" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["meta"]["message"], "Please enter a valid URL");
}
