use serde::{Deserialize, Serialize};

use crate::models::UserResponse;

/// Query parameters delivered by the provider redirect. At most one of
/// `code` and `error` is meaningful; absence of both is itself an error.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Success payload for a completed login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}
