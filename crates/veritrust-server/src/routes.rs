//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use veritrust_core::{
    Error, ErrorBody, HealthResponse, PredictionResponse, ReviewRequest,
};

use crate::state::AppState;

pub fn create_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .layer(cors_layer(cors_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// CORS for exactly one browser origin, with credentials
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))?;

    // Wildcards are not allowed together with credentials, so mirror the request.
    // `list` only echoes a matching origin; other origins get no ACAO header.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::counter!("veritrust_requests_total", "endpoint" => "health").increment(1);
    Json(HealthResponse::ok(state.model_loaded()))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    metrics::counter!("veritrust_requests_total", "endpoint" => "predict").increment(1);

    let Json(req) = payload?;
    let response = state.predict(&req).await?;

    info!(
        label = %response.label,
        confidence = response.confidence,
        signals = response.signals.len(),
        "prediction served"
    );
    metrics::counter!("veritrust_predictions_total", "label" => response.label.as_str())
        .increment(1);

    Ok(Json(response))
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Error handling
///
/// Every failure, including a body the JSON extractor rejects, is answered
/// with an `ErrorBody`.
#[derive(Debug)]
pub enum AppError {
    Service(Error),
    Rejected(JsonRejection),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Service(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, detail) = match &self {
            AppError::Rejected(rejection) => {
                (rejection.status(), "invalid_request", rejection.body_text())
            }
            AppError::Service(err @ Error::EmptyInput) => {
                (StatusCode::BAD_REQUEST, "empty_input", err.to_string())
            }
            AppError::Service(err @ Error::ModelNotLoaded) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "model_not_loaded",
                err.to_string(),
            ),
            AppError::Service(other) => {
                error!("Prediction failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal Server Error".to_string(),
                )
            }
        };

        if status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!(status = status.as_u16(), "{}", detail);
        }
        metrics::counter!("veritrust_errors_total", "kind" => kind).increment(1);

        (status, Json(ErrorBody::new(detail))).into_response()
    }
}
