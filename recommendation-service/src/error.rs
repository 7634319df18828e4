use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use book_recommender::{AnswersError, ErrorKind, RecommendError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::messages::{Locale, Message};

/// Problems with the incoming request body.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("request body is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Answers(#[from] AnswersError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Recommend(#[from] RecommendError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::Recommend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn localized(self, locale: Locale) -> LocalizedError {
        LocalizedError {
            error: self,
            locale,
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// An [`ApiError`] paired with the locale its message is rendered in.
#[derive(Debug)]
pub struct LocalizedError {
    pub error: ApiError,
    pub locale: Locale,
}

impl LocalizedError {
    fn body(&self) -> ErrorBody {
        let text = |message| self.locale.text(message).to_string();

        let (code, message) = match &self.error {
            ApiError::MethodNotAllowed => ("Method not allowed", text(Message::MethodNotAllowed)),
            ApiError::Input(input) => {
                let message = match input {
                    InputError::EmptyBody | InputError::Answers(AnswersError::Empty) => {
                        Message::MissingAnswers
                    }
                    InputError::NotJson(_) | InputError::NotAnObject(_) => Message::MalformedBody,
                    InputError::Answers(AnswersError::NotText(_)) => Message::NonTextAnswer,
                };
                ("Invalid request", text(message))
            }
            ApiError::Recommend(err) => match err.kind() {
                ErrorKind::Configuration => ("Configuration Error", text(Message::Misconfigured)),
                ErrorKind::Authentication => {
                    ("Authentication Error", text(Message::AuthenticationFailed))
                }
                ErrorKind::BadRequest
                | ErrorKind::Shape
                | ErrorKind::Decode
                | ErrorKind::Transport => (
                    "Internal server error",
                    format!("{}: {err}", text(Message::GenerationFailed)),
                ),
            },
        };

        ErrorBody {
            error: code.to_string(),
            message,
        }
    }
}

impl IntoResponse for LocalizedError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        match &self.error {
            ApiError::Recommend(err) => error!(kind = ?err.kind(), error = %err, "Recommendation failed"),
            other => warn!(%status, error = %other, "Rejected request"),
        }

        (status, Json(self.body())).into_response()
    }
}
