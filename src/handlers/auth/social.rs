use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::dtos::auth::GoogleCallbackQuery;
use crate::error::AppError;
use crate::services::{CallbackOutcome, CallbackParams};
use crate::AppState;

/// Provider redirect target. Thin shim over the orchestrator: parses the
/// query, then renders the outcome as 200 JSON or a 302 to the frontend.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Response, AppError> {
    let outcome = state
        .login
        .handle_callback(CallbackParams {
            code: query.code,
            error: query.error,
        })
        .await?;

    Ok(match outcome {
        CallbackOutcome::Success(body) => (StatusCode::OK, Json(body)).into_response(),
        CallbackOutcome::ErrorRedirect { location } => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    })
}
