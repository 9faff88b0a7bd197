//! Pull request payout workflow.
//!
//! This module resolves the signed-in contributor, queries the payout backend
//! for pull requests by payout status, and gates claims on the session's wallet
//! binding. Backend answers are decoded into strongly typed summaries at the
//! gateway boundary and relayed without reclassification.

pub mod error;
pub mod gateway;
pub mod identity;
pub mod locator;
pub mod models;
pub mod status;
pub mod view;
pub mod workflow;

pub use error::PayoutError;
pub use gateway::{HttpPayoutGateway, PayoutGateway};
pub use identity::{IdentityResolver, SessionIdentityResolver, StaticIdentity};
pub use locator::BackendUrl;
pub use models::{ClaimOutcome, ClaimRequest, ContributorId, PullRequestId, PullRequestSummary};
pub use status::{PayoutStatus, ViewKind};
pub use view::{Bucket, BucketResult, BucketView};
pub use workflow::PayoutWorkflow;

#[cfg(test)]
pub use gateway::MockPayoutGateway;
#[cfg(test)]
pub use identity::MockIdentityResolver;

#[cfg(test)]
mod tests;
