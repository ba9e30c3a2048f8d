use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::GoogleOAuthConfig;
use crate::error::AppError;

/// Failure of an outbound provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// User-meaningful fault, safe to surface verbatim.
    #[error("{0}")]
    Validation(String),

    /// Network fault, unexpected status, or malformed response body.
    #[error("provider request failed: {0}")]
    Transport(#[source] anyhow::Error),
}

/// Identity attributes asserted by the provider about the end user.
#[derive(Debug, Clone)]
pub struct ProviderClaims {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}

/// The two outbound calls of the authorization-code flow. Both are
/// idempotent; neither is retried internally.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<String, ProviderError>;

    async fn fetch_user_info(&self, access_token: &str) -> Result<ProviderClaims, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfoResponse {
    email: Option<String>,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

/// Google implementation of [`IdentityProvider`].
#[derive(Clone)]
pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_endpoint: String,
    userinfo_endpoint: String,
}

impl GoogleProvider {
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_endpoint: config.token_endpoint.clone(),
            userinfo_endpoint: config.userinfo_endpoint.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google token exchange request failed");
                ProviderError::Transport(anyhow::anyhow!(e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange error");
            return Err(ProviderError::Transport(anyhow::anyhow!(
                "token endpoint returned {}",
                status
            )));
        }

        let token: GoogleTokenResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Google token response");
            ProviderError::Transport(anyhow::anyhow!(e))
        })?;

        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<ProviderClaims, ProviderError> {
        let response = self
            .http
            .get(&self.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch Google user info");
                ProviderError::Transport(anyhow::anyhow!(e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "Google userinfo error");
            return Err(ProviderError::Transport(anyhow::anyhow!(
                "userinfo endpoint returned {}",
                status
            )));
        }

        let info: GoogleUserInfoResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Google user info");
            ProviderError::Transport(anyhow::anyhow!(e))
        })?;

        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                ProviderError::Validation(
                    "Google account did not provide an email address.".to_string(),
                )
            })?;

        Ok(ProviderClaims {
            email,
            given_name: info.given_name,
            family_name: info.family_name,
        })
    }
}
