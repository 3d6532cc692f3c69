use axum::{
    routing::{delete, get, post},
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::api::models::{
    AnalyzeRequest, AnalyzeResponse, CloseTabResponse, JobDescriptionRequest,
    JobDescriptionResponse, OpenTabRequest, OpenTabResponse,
};
use crate::api::response;
use crate::fetch::fetch_html;
use crate::orchestrator::AnalysisState;
use crate::render::PopupState;
use crate::AppState;

/// Upper bound for a whole analysis cycle, retries and scoring included.
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(90);

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/tabs", post(open_tab_handler))
        .route("/api/tabs/:tab_id/activate", post(activate_tab_handler))
        .route("/api/tabs/:tab_id", delete(close_tab_handler))
        .route("/api/job-description", post(job_description_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/state", get(analysis_state_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn open_tab_handler(
    State(state): State<AppState>,
    Json(req): Json<OpenTabRequest>,
) -> Result<Response> {
    let tab = open_tab(&state, req)
        .await
        .inspect_err(|err| warn!("Could not open tab: {}", err))?;

    Ok(response::success(tab).into_response())
}

async fn activate_tab_handler(
    State(state): State<AppState>,
    Path(tab_id): Path<u32>,
) -> Result<Response> {
    let tab = state.tabs.activate(tab_id)?;
    Ok(response::success(tab).into_response())
}

async fn close_tab_handler(
    State(state): State<AppState>,
    Path(tab_id): Path<u32>,
) -> Result<Response> {
    state.tabs.close(tab_id)?;
    Ok(response::success(CloseTabResponse {
        tab_id,
        closed_at: Utc::now(),
    })
    .into_response())
}

async fn open_tab(state: &AppState, req: OpenTabRequest) -> Result<OpenTabResponse> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::ValidationError("A tab needs a URL".to_string()));
    }

    let html = match req.html {
        Some(html) => html,
        None => fetch_html(url).await?,
    };

    let tab = state.tabs.open(url, html);
    Ok(OpenTabResponse {
        tab_id: tab.tab_id,
        url: tab.url,
        opened_at: Utc::now(),
    })
}

async fn job_description_handler(
    State(state): State<AppState>,
    Json(req): Json<JobDescriptionRequest>,
) -> Response {
    let mut popup = PopupState::default();

    match state.orchestrator.fetch_job(&req.url, &mut popup).await {
        Ok(job_description) => response::success(JobDescriptionResponse {
            url: req.url.trim().to_string(),
            word_count: job_description.split_whitespace().count(),
            job_description,
        })
        .into_response(),
        Err(err) => {
            let message = popup.notice.unwrap_or_else(|| err.to_string());
            response::error::<()>(err.status(), message).into_response()
        }
    }
}

async fn analysis_state_handler(State(state): State<AppState>) -> Response {
    response::success(state.orchestrator.state()).into_response()
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    let start_time = std::time::Instant::now();
    let mut popup = PopupState::default();

    let result = tokio::time::timeout(
        ANALYZE_TIMEOUT,
        state.orchestrator.analyze(&req.job_description, &mut popup),
    )
    .await;

    info!("Analysis took {:?}", start_time.elapsed());

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("Analysis timed out after {:?}", ANALYZE_TIMEOUT);
            return response::error::<()>(
                StatusCode::REQUEST_TIMEOUT,
                "Request processing timed out".to_string(),
            )
            .into_response();
        }
    };

    match outcome {
        AnalysisState::Idle | AnalysisState::Loading => {
            let message = popup.notice.clone().unwrap_or_default();
            response::error::<()>(StatusCode::BAD_REQUEST, message).into_response()
        }
        AnalysisState::Error(message) => response::rendered_error(
            AnalyzeResponse {
                state: AnalysisState::Error(message.clone()),
                popup,
                analyzed_at: Utc::now(),
            },
            message,
        )
        .into_response(),
        success @ AnalysisState::Success(_) => response::success(AnalyzeResponse {
            state: success,
            popup,
            analyzed_at: Utc::now(),
        })
        .into_response(),
    }
}
