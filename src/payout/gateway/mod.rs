//! Gateways for querying and claiming pull request payouts.
//!
//! The trait-based design enables mocking in tests while
//! [`HttpPayoutGateway`] handles real HTTP requests to the payout backend.

mod backend;
mod error_mapping;
mod http_utils;

pub use backend::HttpPayoutGateway;

use async_trait::async_trait;

use super::error::PayoutError;
use super::models::{ClaimOutcome, ClaimRequest, ContributorId, PullRequestSummary};
use super::status::PayoutStatus;

/// Payout backend operations used by the workflow.
///
/// Each call is one backend request. Implementations do not cache and do not
/// retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayoutGateway: Send + Sync {
    /// Fetch the contributor's pull requests currently in `status`.
    ///
    /// Zero matches is an empty vector, never an error.
    async fn pull_requests(
        &self,
        contributor: &ContributorId,
        status: PayoutStatus,
    ) -> Result<Vec<PullRequestSummary>, PayoutError>;

    /// Submit a claim and return the backend's outcome.
    async fn claim(&self, request: &ClaimRequest) -> Result<ClaimOutcome, PayoutError>;
}
