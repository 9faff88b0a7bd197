//! Contributor identity resolution.
//!
//! The identity provider is a black box: it either yields the stable GitHub
//! account id of the signed-in contributor or reports that there is no
//! session.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::error::PayoutError;
use super::models::ContributorId;

const USER_ENDPOINT: &str = "auth/v1/user";

/// Resolves the contributor for the active session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the contributor, or `None` when there is no session.
    async fn resolve(&self) -> Result<Option<ContributorId>, PayoutError>;
}

/// Identity fixed at construction time, typically from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    contributor: Option<ContributorId>,
}

impl StaticIdentity {
    /// A session for `contributor`.
    #[must_use]
    pub const fn signed_in(contributor: ContributorId) -> Self {
        Self {
            contributor: Some(contributor),
        }
    }

    /// No session.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { contributor: None }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve(&self) -> Result<Option<ContributorId>, PayoutError> {
        Ok(self.contributor.clone())
    }
}

/// Looks up the signed-in user through the hosted auth provider's user
/// endpoint and reads the GitHub account id from `user_metadata.provider_id`.
#[derive(Debug, Clone)]
pub struct SessionIdentityResolver {
    client: Client,
    user_endpoint: Url,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSessionUser {
    #[serde(default)]
    user_metadata: Option<ApiUserMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiUserMetadata {
    #[serde(default)]
    provider_id: Option<serde_json::Value>,
}

impl SessionIdentityResolver {
    /// Builds a resolver for the auth provider at `auth_url`.
    ///
    /// A missing or blank `access_token` means there is no session.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::InvalidUrl`] when `auth_url` does not parse and
    /// [`PayoutError::Configuration`] when the HTTP client cannot be built.
    pub fn new(
        auth_url: &str,
        api_key: impl Into<String>,
        access_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, PayoutError> {
        let mut base = Url::parse(auth_url.trim())
            .map_err(|error| PayoutError::InvalidUrl(error.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let user_endpoint = base
            .join(USER_ENDPOINT)
            .map_err(|error| PayoutError::InvalidUrl(error.to_string()))?;

        let builder = Client::builder();
        let configured = match timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        };
        let client = configured
            .build()
            .map_err(|error| PayoutError::Configuration {
                message: format!("failed to configure identity HTTP client: {error}"),
            })?;

        Ok(Self {
            client,
            user_endpoint,
            api_key: api_key.into(),
            access_token: access_token.filter(|token| !token.trim().is_empty()),
        })
    }
}

#[async_trait]
impl IdentityResolver for SessionIdentityResolver {
    async fn resolve(&self) -> Result<Option<ContributorId>, PayoutError> {
        let Some(token) = self.access_token.as_deref() else {
            tracing::debug!("no access token configured; treating session as signed out");
            return Ok(None);
        };

        let response = self
            .client
            .get(self.user_endpoint.clone())
            .header("apikey", self.api_key.as_str())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| PayoutError::IdentityProvider {
                message: format!("session lookup failed: {error}"),
            })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::debug!("identity provider rejected the session with {status}");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PayoutError::IdentityProvider {
                message: format!("session lookup failed with status {status}"),
            });
        }

        let user: ApiSessionUser =
            response
                .json()
                .await
                .map_err(|error| PayoutError::IdentityProvider {
                    message: format!("session response deserialisation failed: {error}"),
                })?;

        let provider_id = user
            .user_metadata
            .and_then(|metadata| metadata.provider_id)
            .and_then(|value| match value {
                serde_json::Value::String(text) => Some(text),
                serde_json::Value::Number(number) => Some(number.to_string()),
                _ => None,
            });

        Ok(provider_id.and_then(|id| ContributorId::new(id).ok()))
    }
}
