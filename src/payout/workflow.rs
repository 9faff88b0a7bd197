//! Payout workflow: bucket retrieval and claim gating.
//!
//! The workflow relays backend answers. It resolves the contributor, issues
//! one query per status, and hands back what the backend returned without
//! merging, deduplicating, or reclassifying. Claims are gated on the session's
//! wallet binding before any network call is made.

use std::sync::Arc;

use futures::future::join_all;

use super::error::PayoutError;
use super::gateway::PayoutGateway;
use super::identity::IdentityResolver;
use super::models::{ClaimOutcome, ClaimRequest, ContributorId, PullRequestId, PullRequestSummary};
use super::status::{PayoutStatus, ViewKind};
use super::view::{Bucket, BucketView};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};
use crate::wallet::WalletBinding;

/// Orchestrates identity, backend queries, and the wallet claim gate.
pub struct PayoutWorkflow<'session, Identity, Gateway>
where
    Identity: IdentityResolver,
    Gateway: PayoutGateway,
{
    identity: &'session Identity,
    gateway: &'session Gateway,
    wallet: &'session WalletBinding,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<'session, Identity, Gateway> PayoutWorkflow<'session, Identity, Gateway>
where
    Identity: IdentityResolver,
    Gateway: PayoutGateway,
{
    /// Create a workflow over the session's collaborators.
    #[must_use]
    pub fn new(
        identity: &'session Identity,
        gateway: &'session Gateway,
        wallet: &'session WalletBinding,
    ) -> Self {
        Self {
            identity,
            gateway,
            wallet,
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Report bucket and claim events to `telemetry`.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Fetch one bucket for `contributor`.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures with their kind intact, typically
    /// [`PayoutError::BackendUnavailable`]. Zero matches is `Ok(vec![])`.
    pub async fn fetch_bucket(
        &self,
        contributor: &ContributorId,
        status: PayoutStatus,
    ) -> Result<Vec<PullRequestSummary>, PayoutError> {
        let outcome = self.gateway.pull_requests(contributor, status).await;
        match &outcome {
            Ok(prs) => self.telemetry.record(TelemetryEvent::BucketLoaded {
                status,
                count: prs.len(),
            }),
            Err(error) => {
                tracing::warn!("{status} bucket failed: {error}");
                self.telemetry.record(TelemetryEvent::BucketFailed {
                    status,
                    message: error.to_string(),
                });
            }
        }
        outcome
    }

    /// Resolve the session's contributor and fetch every bucket in
    /// `statuses` concurrently, returning once all have completed.
    ///
    /// A failed bucket is reported in place; other buckets are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::Unauthenticated`] without querying the backend
    /// when there is no session, and propagates identity provider failures.
    pub async fn load_view(&self, statuses: &[PayoutStatus]) -> Result<BucketView, PayoutError> {
        let contributor = self.require_contributor().await?;

        let queries = statuses.iter().map(|&status| {
            let contributor_ref = &contributor;
            async move {
                Bucket {
                    status,
                    outcome: self.fetch_bucket(contributor_ref, status).await,
                }
            }
        });
        let buckets = join_all(queries).await;

        let view = BucketView::new(contributor, buckets);
        let duplicates = view.duplicate_ids();
        if !duplicates.is_empty() {
            tracing::warn!("backend reported pull requests in several buckets: {duplicates:?}");
        }
        Ok(view)
    }

    /// Fetch the buckets of a named view.
    ///
    /// # Errors
    ///
    /// See [`Self::load_view`].
    pub async fn load(&self, kind: ViewKind) -> Result<BucketView, PayoutError> {
        self.load_view(kind.statuses()).await
    }

    /// Claim the payout for `pr_id` to the bound wallet.
    ///
    /// The wallet gate is checked first; without a bound address neither the
    /// identity provider nor the backend is contacted. The backend's outcome,
    /// including a rejection, is returned unmodified. Failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::WalletNotConnected`] when no wallet is bound,
    /// [`PayoutError::Unauthenticated`] when there is no session, and
    /// propagates gateway failures.
    pub async fn claim(&self, pr_id: PullRequestId) -> Result<ClaimOutcome, PayoutError> {
        let wallet_address = self.wallet.current().ok_or(PayoutError::WalletNotConnected)?;
        let contributor = self.require_contributor().await?;

        let request = ClaimRequest {
            contributor,
            pr_id,
            wallet_address,
        };
        let outcome = self.gateway.claim(&request).await?;

        self.telemetry.record(TelemetryEvent::ClaimSubmitted {
            pr_id: pr_id.get(),
            success: outcome.success,
        });
        if !outcome.success {
            tracing::info!("backend declined claim for {pr_id}: {}", outcome.message);
        }
        Ok(outcome)
    }

    async fn require_contributor(&self) -> Result<ContributorId, PayoutError> {
        self.identity
            .resolve()
            .await?
            .ok_or(PayoutError::Unauthenticated)
    }
}
