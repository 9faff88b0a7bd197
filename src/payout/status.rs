//! Payout status taxonomy for pull requests.
//!
//! Statuses are server-authoritative. The lifecycle helpers here describe the
//! transitions the payout backend performs; the workflow never uses them to
//! move a pull request between buckets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PayoutError;

/// Payout status of a pull request as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Review requested; payout eligibility not yet decided.
    Requested,
    /// Closed without merge or failed an eligibility rule.
    Ineligible,
    /// Merged and approved; the contributor may claim the payout.
    Claimable,
    /// Payout executed by the payment backend.
    Paid,
}

impl PayoutStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Requested, Self::Ineligible, Self::Claimable, Self::Paid];

    /// Returns the query parameter value for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Ineligible => "ineligible",
            Self::Claimable => "claimable",
            Self::Paid => "paid",
        }
    }

    /// Whether a pull request in this status offers a user action (review or
    /// claim).
    #[must_use]
    pub const fn offers_action(self) -> bool {
        matches!(self, Self::Requested | Self::Claimable)
    }

    /// Whether no action available to the contributor leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ineligible | Self::Paid)
    }

    /// Whether the backend may move a pull request from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Requested, Self::Claimable | Self::Ineligible) | (Self::Claimable, Self::Paid)
        )
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PayoutStatus {
    type Err = PayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| PayoutError::InvalidStatusFilter {
                value: value.to_owned(),
            })
    }
}

/// Named groups of buckets rendered together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Current and cancelled reviews.
    Review,
    /// Claimable and paid rewards.
    Rewards,
    /// All four buckets.
    #[default]
    All,
}

impl ViewKind {
    /// Statuses queried for this view, in display order.
    #[must_use]
    pub const fn statuses(self) -> &'static [PayoutStatus] {
        match self {
            Self::Review => &[PayoutStatus::Requested, PayoutStatus::Ineligible],
            Self::Rewards => &[PayoutStatus::Claimable, PayoutStatus::Paid],
            Self::All => &PayoutStatus::ALL,
        }
    }
}

impl FromStr for ViewKind {
    type Err = PayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "review" => Ok(Self::Review),
            "rewards" => Ok(Self::Rewards),
            "all" => Ok(Self::All),
            other => Err(PayoutError::Configuration {
                message: format!("unknown view '{other}' (expected review, rewards, or all)"),
            }),
        }
    }
}
