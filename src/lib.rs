//! `prpay` library crate for the contributor pull request payout workflow.
//!
//! The library resolves the signed-in contributor, asks the payout backend
//! which of their pull requests sit in each payout status, and gates claims
//! on the wallet bound to the session. Failures are surfaced per bucket so a
//! broken query never hides the others.

pub mod config;
pub mod payout;
pub mod telemetry;
pub mod wallet;

pub use config::{OperationMode, PrPayConfig};
pub use payout::{
    BackendUrl, Bucket, BucketView, ClaimOutcome, ContributorId, HttpPayoutGateway,
    IdentityResolver, PayoutError, PayoutGateway, PayoutStatus, PayoutWorkflow, PullRequestId,
    PullRequestSummary, SessionIdentityResolver, StaticIdentity, ViewKind,
};
pub use telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetryEvent, TelemetrySink};
pub use wallet::{
    ChannelWalletProvider, WalletAddress, WalletBinding, WalletConnection, WalletProvider,
};
