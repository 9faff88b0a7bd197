//! HTTP gateway for the payout backend.

use std::time::Duration;

use async_trait::async_trait;
use http::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;

use super::PayoutGateway;
use super::error_mapping::{map_decode_error, map_transport_error};
use super::http_utils::read_success_body;
use crate::payout::error::PayoutError;
use crate::payout::locator::BackendUrl;
use crate::payout::models::{
    ApiClaimRequest, ApiPullRequest, ClaimOutcome, ClaimRequest, ContributorId,
    PullRequestSummary,
};
use crate::payout::status::PayoutStatus;

const PULL_REQUESTS_ENDPOINT: &str = "getPRs";
const CLAIM_ENDPOINT: &str = "claimPR";

/// reqwest-backed payout gateway.
#[derive(Debug, Clone)]
pub struct HttpPayoutGateway {
    client: Client,
    base: BackendUrl,
}

impl HttpPayoutGateway {
    /// Creates a gateway from an existing client.
    #[must_use]
    pub const fn new(client: Client, base: BackendUrl) -> Self {
        Self { client, base }
    }

    /// Builds a client for the backend with an optional transport timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn for_backend(base: BackendUrl, timeout: Option<Duration>) -> Result<Self, PayoutError> {
        let builder = Client::builder();
        let configured = match timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        };
        let client = configured
            .build()
            .map_err(|error| PayoutError::Configuration {
                message: format!("failed to configure payout HTTP client: {error}"),
            })?;
        Ok(Self::new(client, base))
    }
}

#[async_trait]
impl PayoutGateway for HttpPayoutGateway {
    async fn pull_requests(
        &self,
        contributor: &ContributorId,
        status: PayoutStatus,
    ) -> Result<Vec<PullRequestSummary>, PayoutError> {
        const OPERATION: &str = "list pull requests";

        let endpoint = self.base.endpoint(PULL_REQUESTS_ENDPOINT)?;
        tracing::debug!(
            contributor = contributor.as_str(),
            status = status.as_str(),
            "querying payout backend"
        );

        let response = self
            .client
            .get(endpoint)
            .query(&[("user_id", contributor.as_str()), ("status", status.as_str())])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|error| map_transport_error(OPERATION, &error))?;

        let body = read_success_body(response, OPERATION).await?;
        let records: Vec<ApiPullRequest> =
            serde_json::from_str(&body).map_err(|error| map_decode_error(OPERATION, &error))?;

        records
            .into_iter()
            .map(|record| record.into_summary(status))
            .collect()
    }

    async fn claim(&self, request: &ClaimRequest) -> Result<ClaimOutcome, PayoutError> {
        const OPERATION: &str = "claim pull request";

        let endpoint = self.base.endpoint(CLAIM_ENDPOINT)?;
        tracing::debug!(
            contributor = request.contributor.as_str(),
            pr_id = request.pr_id.get(),
            "submitting claim to payout backend"
        );

        let response = self
            .client
            .post(endpoint)
            .json(&ApiClaimRequest::from(request))
            .send()
            .await
            .map_err(|error| map_transport_error(OPERATION, &error))?;

        let body = read_success_body(response, OPERATION).await?;
        serde_json::from_str(&body).map_err(|error| map_decode_error(OPERATION, &error))
    }
}
