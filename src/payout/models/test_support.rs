//! Test helpers for constructing `PullRequestSummary` fixtures.
//!
//! # Examples
//!
//! ```
//! use prpay::payout::models::test_support::summary;
//! use prpay::payout::PayoutStatus;
//!
//! let pr = summary(1, "Fix typo", PayoutStatus::Requested);
//! assert_eq!(pr.id.get(), 1);
//! assert_eq!(pr.url.as_str(), "https://github.com/octo/repo/pull/1");
//! ```

use chrono::{DateTime, Utc};
use url::Url;

use super::{PullRequestId, PullRequestSummary};
use crate::payout::status::PayoutStatus;

/// Builds a summary with a fixed creation time, no payout, and a GitHub URL
/// derived from the id.
///
/// # Panics
///
/// Never in practice: the generated URL is always valid.
#[must_use]
pub fn summary(id: u64, title: &str, status: PayoutStatus) -> PullRequestSummary {
    let url = Url::parse(&format!("https://github.com/octo/repo/pull/{id}"))
        .unwrap_or_else(|error| panic!("fixture URL should parse: {error}"));
    PullRequestSummary {
        id: PullRequestId::new(id),
        title: title.to_owned(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        url,
        payout: None,
        status,
    }
}

/// Builds the JSON record the payout backend returns for [`summary`].
#[must_use]
pub fn api_record(id: u64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "pr_id": id,
        "pr_title": title,
        "pr_created_at": "1970-01-01T00:00:00+00:00",
        "pr_url": format!("https://github.com/octo/repo/pull/{id}"),
        "payout": null
    })
}
