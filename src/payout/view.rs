//! Bucketed views of a contributor's pull requests.
//!
//! Buckets are relayed exactly as the backend returned them. The helpers here
//! report overlaps between buckets; they never remove or reclassify anything.

use std::collections::{BTreeMap, BTreeSet};

use super::error::PayoutError;
use super::models::{ContributorId, PullRequestId, PullRequestSummary};
use super::status::PayoutStatus;

/// Outcome of one bucket query.
pub type BucketResult = Result<Vec<PullRequestSummary>, PayoutError>;

/// One status bucket and the outcome of its query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Status filter that produced this bucket.
    pub status: PayoutStatus,
    /// Pull requests returned, or why the query failed.
    pub outcome: BucketResult,
}

/// Buckets fetched for one contributor at (approximately) one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketView {
    contributor: ContributorId,
    buckets: Vec<Bucket>,
}

impl BucketView {
    /// Creates a view from buckets in display order.
    #[must_use]
    pub const fn new(contributor: ContributorId, buckets: Vec<Bucket>) -> Self {
        Self {
            contributor,
            buckets,
        }
    }

    /// The contributor the buckets belong to.
    #[must_use]
    pub const fn contributor(&self) -> &ContributorId {
        &self.contributor
    }

    /// All buckets in the order they were requested.
    #[must_use]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The outcome for `status`, if that status was part of the view.
    #[must_use]
    pub fn bucket(&self, status: PayoutStatus) -> Option<&BucketResult> {
        self.buckets
            .iter()
            .find(|bucket| bucket.status == status)
            .map(|bucket| &bucket.outcome)
    }

    /// Pull requests in `status`, or `None` when the bucket is missing or
    /// failed.
    #[must_use]
    pub fn pull_requests(&self, status: PayoutStatus) -> Option<&[PullRequestSummary]> {
        match self.bucket(status)? {
            Ok(prs) => Some(prs.as_slice()),
            Err(_) => None,
        }
    }

    /// Failed buckets and their errors.
    #[must_use]
    pub fn failures(&self) -> Vec<(PayoutStatus, &PayoutError)> {
        self.buckets
            .iter()
            .filter_map(|bucket| match &bucket.outcome {
                Ok(_) => None,
                Err(error) => Some((bucket.status, error)),
            })
            .collect()
    }

    /// Whether every bucket query succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.outcome.is_ok())
    }

    /// Ids present in the successful buckets.
    #[must_use]
    pub fn all_ids(&self) -> BTreeSet<PullRequestId> {
        self.successful()
            .flat_map(|(_, prs)| prs.iter().map(|pr| pr.id))
            .collect()
    }

    /// Ids the backend reported more than once across the view, with every
    /// status they appeared under.
    ///
    /// An empty map means the successful buckets form a partition.
    #[must_use]
    pub fn duplicate_ids(&self) -> BTreeMap<PullRequestId, Vec<PayoutStatus>> {
        let mut seen: BTreeMap<PullRequestId, Vec<PayoutStatus>> = BTreeMap::new();
        for (status, prs) in self.successful() {
            for pr in prs {
                seen.entry(pr.id).or_default().push(status);
            }
        }
        seen.retain(|_, statuses| statuses.len() > 1);
        seen
    }

    fn successful(&self) -> impl Iterator<Item = (PayoutStatus, &[PullRequestSummary])> {
        self.buckets
            .iter()
            .filter_map(|bucket| match &bucket.outcome {
                Ok(prs) => Some((bucket.status, prs.as_slice())),
                Err(_) => None,
            })
    }
}
