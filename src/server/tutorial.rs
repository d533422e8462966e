//! Edge function endpoint for tutorial generation
//!
//! Mirrors a hosted function: open CORS, its own bearer handling, and every
//! failure reported as a 500 with `{success: false, error, timestamp}`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::ServerAppState;
use crate::tutorial::{TutorRequest, TutorResponse, TutorialError};

pub const TUTORIAL_PATH: &str = "/functions/v1/generate-tutorial";

fn failure(error: TutorialError) -> Response {
    log::warn!("Tutorial generation failed: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(TutorResponse::error(error.to_string())),
    )
        .into_response()
}

/// `POST /functions/v1/generate-tutorial`
pub async fn generate_tutorial_handler(
    State(state): State<ServerAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(tutor) = state.tutor.as_ref() else {
        return failure(TutorialError::NotConfigured(
            "model API key and auth service URL are required".to_string(),
        ));
    };

    let request: TutorRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return failure(TutorialError::InvalidRequest(e.to_string())),
    };

    let authorization = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

    match tutor.generate(authorization, &request).await {
        Ok(content) => (StatusCode::OK, Json(TutorResponse::success(content))).into_response(),
        Err(e) => failure(e),
    }
}

/// Preflight for the tutorial function; the CORS layer adds the headers
pub async fn tutorial_preflight_handler() -> StatusCode {
    StatusCode::OK
}
