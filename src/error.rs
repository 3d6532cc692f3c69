use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    UnsupportedPage(String),

    #[error("{0}")]
    ExtractionTimeout(String),

    #[error("Could not extract profile data after {attempts} attempts")]
    ExtractionExhausted { attempts: u32 },

    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("Error parsing content: {0}")]
    ParseError(String),

    #[error("Messaging error: {0}")]
    MessagingError(String),

    #[error("Injection error: {0}")]
    InjectionError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("No tab with id {0}")]
    TabNotFound(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnsupportedPage(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ExtractionTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ExtractionExhausted { .. } | AppError::MessagingError(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::TabNotFound(_) => StatusCode::NOT_FOUND,
            AppError::FetchError(_) => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InjectionError(_) => StatusCode::CONFLICT,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error::<()>(self.status(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::ParseError(err.to_string())
        } else {
            AppError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
