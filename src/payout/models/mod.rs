//! Data models for contributors, pull request summaries, and claims.
//!
//! Types prefixed with `Api` are internal deserialisation targets for the
//! payout backend's JSON and convert into the public domain types at the
//! gateway boundary.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::PayoutError;
use super::status::PayoutStatus;
use crate::wallet::WalletAddress;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Stable contributor identifier issued by the identity provider (the GitHub
/// account id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContributorId(String);

impl ContributorId {
    /// Validates that the identifier is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::Unauthenticated`] when the value is blank, so an
    /// empty identifier can never be used as a query key.
    pub fn new(value: impl AsRef<str>) -> Result<Self, PayoutError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PayoutError::Unauthenticated);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ContributorId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Backend identifier of a pull request, stable across fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestId(u64);

impl PullRequestId {
    /// Wraps a raw backend identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One pull request as seen by the payout workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    /// Backend identifier.
    pub id: PullRequestId,
    /// Display title.
    pub title: String,
    /// Creation time of the pull request.
    pub created_at: DateTime<Utc>,
    /// Canonical link on the source-control host.
    pub url: Url,
    /// Payout amount, absent until the backend computes it.
    pub payout: Option<Decimal>,
    /// Status filter of the query that returned this pull request.
    pub status: PayoutStatus,
}

/// Claim submitted to the payout backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Contributor claiming the payout.
    pub contributor: ContributorId,
    /// Pull request being claimed.
    pub pr_id: PullRequestId,
    /// Wallet address bound at the time of the claim.
    pub wallet_address: WalletAddress,
}

/// Backend response to a claim, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClaimOutcome {
    /// Whether the backend accepted the claim.
    pub success: bool,
    /// Human-readable explanation from the backend.
    pub message: String,
    /// Review record identifier, when the backend found one.
    #[serde(default)]
    pub review_id: Option<u64>,
    /// Backend status label after the claim attempt (e.g. `claimed`).
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) pr_id: u64,
    pub(crate) pr_title: String,
    pub(crate) pr_created_at: String,
    pub(crate) pr_url: String,
    #[serde(default)]
    pub(crate) payout: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiClaimRequest<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) pr_id: u64,
    pub(crate) wallet_address: &'a str,
}

impl<'a> From<&'a ClaimRequest> for ApiClaimRequest<'a> {
    fn from(value: &'a ClaimRequest) -> Self {
        Self {
            user_id: value.contributor.as_str(),
            pr_id: value.pr_id.get(),
            wallet_address: value.wallet_address.as_str(),
        }
    }
}

impl ApiPullRequest {
    /// Converts the wire record into a summary tagged with the queried status.
    pub(crate) fn into_summary(
        self,
        status: PayoutStatus,
    ) -> Result<PullRequestSummary, PayoutError> {
        let url = Url::parse(&self.pr_url).map_err(|error| PayoutError::BackendUnavailable {
            message: format!("pull request {} has an invalid URL: {error}", self.pr_id),
        })?;
        let created_at = parse_timestamp(&self.pr_created_at).ok_or_else(|| {
            PayoutError::BackendUnavailable {
                message: format!(
                    "pull request {} has an invalid creation time: {}",
                    self.pr_id, self.pr_created_at
                ),
            }
        })?;

        Ok(PullRequestSummary {
            id: PullRequestId::new(self.pr_id),
            title: self.pr_title,
            created_at,
            url,
            payout: self.payout,
            status,
        })
    }
}

/// Parses RFC 3339 timestamps, treating offset-less values as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
