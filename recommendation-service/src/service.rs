use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use book_recommender::{
    BedrockConnector, QuestionnaireAnswers, RecommendationBatch, RecommendationOrchestrator,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::{ApiError, InputError, LocalizedError};
use crate::messages::Locale;

pub const RECOMMENDATIONS_PATH: &str = "/api/recommendations";

type ApiResult<T> = Result<Json<T>, LocalizedError>;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: RecommendationOrchestrator,
    pub locale: Locale,
}

impl AppState {
    fn reject(&self, error: impl Into<ApiError>) -> LocalizedError {
        error.into().localized(self.locale)
    }
}

/// Wire the production router: Bedrock credentials are read from the process
/// environment on every request.
pub fn create_app(config: &ServiceConfig) -> Router {
    let mut connector = BedrockConnector::from_env();
    if let Some(endpoint) = &config.bedrock_endpoint {
        connector = connector.with_endpoint(endpoint.clone());
    }

    let orchestrator = RecommendationOrchestrator::new(
        Arc::new(connector),
        config.generation.clone(),
        config.profile.clone(),
    );

    build_router(AppState {
        orchestrator,
        locale: config.locale,
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route(
            RECOMMENDATIONS_PATH,
            post(recommend).fallback(method_not_allowed),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Book Recommendation Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Turns a reading-preference questionnaire into book recommendations with bookstore links",
        "endpoints": {
            "POST /api/recommendations": "Recommend books for a JSON object of questionnaire answers",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn method_not_allowed(State(state): State<AppState>) -> Response {
    (
        [(header::ALLOW, "POST")],
        state.reject(ApiError::MethodNotAllowed),
    )
        .into_response()
}

async fn recommend(State(state): State<AppState>, body: Bytes) -> ApiResult<RecommendationBatch> {
    let request_id = Uuid::new_v4();

    async move {
        let answers = parse_answers(&body).map_err(|e| state.reject(e))?;
        info!(answers = answers.len(), "Received recommendation request");

        let batch = state
            .orchestrator
            .recommend(&answers)
            .await
            .map_err(|e| state.reject(e))?;

        Ok(Json(batch))
    }
    .instrument(info_span!("recommendation", %request_id))
    .await
}

fn parse_answers(body: &[u8]) -> Result<QuestionnaireAnswers, InputError> {
    if body.trim_ascii().is_empty() {
        return Err(InputError::EmptyBody);
    }

    match serde_json::from_slice::<Value>(body).map_err(InputError::NotJson)? {
        Value::Object(object) => Ok(QuestionnaireAnswers::from_json_object(object)?),
        Value::Null => Err(InputError::EmptyBody),
        Value::Array(_) => Err(InputError::NotAnObject("an array")),
        Value::String(_) => Err(InputError::NotAnObject("a string")),
        Value::Number(_) => Err(InputError::NotAnObject("a number")),
        Value::Bool(_) => Err(InputError::NotAnObject("a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_recommender::AnswersError;

    #[test]
    fn parses_an_object_of_string_answers() {
        let answers = parse_answers(br#"{"mood":"melancholy","length":"short"}"#).unwrap();
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn rejects_bodies_without_answers() {
        assert!(matches!(parse_answers(b""), Err(InputError::EmptyBody)));
        assert!(matches!(parse_answers(b" \n "), Err(InputError::EmptyBody)));
        assert!(matches!(parse_answers(b"null"), Err(InputError::EmptyBody)));
        assert!(matches!(
            parse_answers(b"{}"),
            Err(InputError::Answers(AnswersError::Empty))
        ));
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert!(matches!(parse_answers(b"{oops"), Err(InputError::NotJson(_))));
        assert!(matches!(
            parse_answers(br#"["a","b"]"#),
            Err(InputError::NotAnObject("an array"))
        ));
        assert!(matches!(
            parse_answers(br#"{"q1":5}"#),
            Err(InputError::Answers(AnswersError::NotText(_)))
        ));
    }
}
