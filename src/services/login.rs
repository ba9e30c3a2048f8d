//! Callback orchestrator: sequences the code exchange, identity
//! reconciliation, and credential issuance for one login attempt, and
//! folds every recoverable failure into a frontend error redirect.

use std::sync::Arc;

use crate::config::FrontendConfig;
use crate::dtos::auth::AuthResponse;
use crate::error::AppError;
use crate::models::User;
use crate::services::directory::UserDirectory;
use crate::services::error::LoginError;
use crate::services::google::IdentityProvider;
use crate::services::jwt::JwtService;
use crate::services::reconcile::IdentityReconciler;

/// Validated callback parameters. Exactly one of `code` and `error` is
/// meaningful; absence of both is an input error.
#[derive(Debug)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Terminal state of one callback invocation.
#[derive(Debug)]
pub enum CallbackOutcome {
    Success(AuthResponse),
    ErrorRedirect { location: String },
}

#[derive(Clone)]
pub struct GoogleLoginService {
    provider: Arc<dyn IdentityProvider>,
    reconciler: IdentityReconciler,
    jwt: JwtService,
    frontend: FrontendConfig,
}

impl GoogleLoginService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        directory: Arc<dyn UserDirectory>,
        jwt: JwtService,
        frontend: FrontendConfig,
    ) -> Self {
        Self {
            provider,
            reconciler: IdentityReconciler::new(directory),
            jwt,
            frontend,
        }
    }

    /// Run the state machine for one callback. Returns `Err` only for a
    /// signing/configuration fault, which is a server-side problem rather
    /// than a failed login and must not be redirected.
    pub async fn handle_callback(
        &self,
        params: CallbackParams,
    ) -> Result<CallbackOutcome, AppError> {
        if let Some(provider_error) = params.error {
            tracing::warn!(error = %provider_error, "Provider callback carried an error");
            return Ok(self.error_redirect(&provider_error));
        }

        let Some(code) = params.code else {
            return Ok(self.error_redirect("missing code"));
        };

        let user = match self.authenticate(&code).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "Google login failed");
                return Ok(self.error_redirect(&err.user_message()));
            }
        };

        let (access_token, refresh_token) = self
            .jwt
            .generate_token_pair(&user.user_id.to_string(), &user.email)
            .map_err(AppError::InternalError)?;

        tracing::info!(user_id = %user.user_id, "User logged in via Google");

        Ok(CallbackOutcome::Success(AuthResponse {
            user: user.sanitized(),
            access_token,
            refresh_token,
        }))
    }

    async fn authenticate(&self, code: &str) -> Result<User, LoginError> {
        let redirect_uri = self.frontend.redirect_uri();
        let access_token = self.provider.exchange_code(code, &redirect_uri).await?;
        let claims = self.provider.fetch_user_info(&access_token).await?;
        let user = self.reconciler.reconcile(&claims).await?;
        Ok(user)
    }

    fn error_redirect(&self, reason: &str) -> CallbackOutcome {
        CallbackOutcome::ErrorRedirect {
            location: self.frontend.error_redirect(reason),
        }
    }
}
