//! Error types exposed by the payout workflow layer.

use thiserror::Error;

/// Errors surfaced while resolving identity, querying the payout backend, or
/// gating claims on the wallet binding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayoutError {
    /// No session is available, so no contributor could be resolved.
    #[error("no authenticated session; sign in with GitHub to view pull requests")]
    Unauthenticated,

    /// The payout backend could not be reached, returned a non-success
    /// response, or returned a payload that does not decode.
    #[error("payout backend unavailable: {message}")]
    BackendUnavailable {
        /// Transport, status, or decode detail naming the failed operation.
        message: String,
    },

    /// A claim was attempted while no wallet address is bound.
    #[error("connect a wallet before claiming a payout")]
    WalletNotConnected,

    /// A status label outside the four known statuses was supplied.
    #[error("unrecognised pull request status filter: {value}")]
    InvalidStatusFilter {
        /// The rejected label.
        value: String,
    },

    /// The identity provider failed for a reason other than a missing session.
    #[error("identity provider error: {message}")]
    IdentityProvider {
        /// Detail returned by the identity provider or transport.
        message: String,
    },

    /// A configured URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl PayoutError {
    /// Returns `false` for programming errors that no user action can fix.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidStatusFilter { .. })
    }
}
