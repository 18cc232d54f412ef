use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors surfaced to HTTP clients and the command line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Language '{0}' not supported")]
    UnsupportedLanguage(String),

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown mode '{0}'")]
    InvalidMode(String),

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("Failed to render page: {0}")]
    Template(#[from] askama::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyQuery
            | AppError::UnsupportedLanguage(_)
            | AppError::UnknownCategory(_)
            | AppError::InvalidMode(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadySubmitting => StatusCode::CONFLICT,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}

/// Errors raised while reading corpus files.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the remote rhyme service.
#[derive(Debug, Error)]
pub enum RhymeError {
    #[error("Rhyme service request failed: {0}")]
    Request(#[from] reqwest::Error),
}
