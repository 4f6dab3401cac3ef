use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::{WeatherWizError, report, web::AppState};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub city: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/report", get(get_report))
        .route("/health", get(health))
}

async fn get_report(State(state): State<AppState>, Query(query): Query<ReportQuery>) -> Response {
    match report::generate(state.weather.as_ref(), &state.predictor, &query.city).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            if !matches!(err, WeatherWizError::Fetch(_)) {
                tracing::error!(error = %err, "Report failed");
            }
            (err.status_code(), Json(json!({ "error": err.user_message() }))).into_response()
        }
    }
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
