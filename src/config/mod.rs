//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.prpay.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PRPAY_BACKEND_URL`, `PRPAY_CONTRIBUTOR_ID`,
//!    and friends, or legacy `NEXT_PUBLIC_BACKEND_URL`
//! 4. **Command-line arguments** – `--backend-url`/`-b`, `--contributor-id`/`-c`,
//!    `--wallet-address`/`-w`, `--view`/`-i`, `--verbose`/`-v`, ...
//!
//! # Configuration File
//!
//! ```toml
//! backend_url = "http://localhost:8000/"
//! contributor_id = "12345"
//! wallet_address = "0xABC"
//! view = "rewards"
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::payout::{PayoutError, PullRequestId, ViewKind};

/// Legacy environment variable holding the payout backend base URL.
pub const LEGACY_BACKEND_URL_ENV: &str = "NEXT_PUBLIC_BACKEND_URL";

const DEFAULT_BACKEND_TIMEOUT_SECONDS: u64 = 30;

/// Operation mode determined by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Render the buckets of a view.
    Dashboard,
    /// Claim the payout of one pull request.
    Claim(PullRequestId),
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use prpay::PrPayConfig;
///
/// let config = PrPayConfig::load().expect("failed to load configuration");
/// let backend_url = config.resolve_backend_url().expect("backend URL required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PRPAY",
    discovery(
        dotfile_name = ".prpay.toml",
        config_file_name = "prpay.toml",
        app_name = "prpay"
    )
)]
pub struct PrPayConfig {
    /// Base URL of the payout backend.
    ///
    /// Can be provided via:
    /// - CLI: `--backend-url <URL>` or `-b <URL>`
    /// - Environment: `PRPAY_BACKEND_URL` or `NEXT_PUBLIC_BACKEND_URL` (legacy)
    /// - Config file: `backend_url = "..."`
    #[ortho_config(cli_short = 'b')]
    pub backend_url: Option<String>,

    /// Transport timeout for backend and identity requests, in seconds.
    ///
    /// Zero disables the timeout. Defaults to 30 seconds.
    #[ortho_config()]
    pub backend_timeout_seconds: u64,

    /// Contributor identifier (GitHub account id) to act as.
    ///
    /// Takes precedence over the session lookup.
    ///
    /// Can be provided via:
    /// - CLI: `--contributor-id <ID>` or `-c <ID>`
    /// - Environment: `PRPAY_CONTRIBUTOR_ID`
    /// - Config file: `contributor_id = "..."`
    #[ortho_config(cli_short = 'c')]
    pub contributor_id: Option<String>,

    /// Base URL of the hosted auth provider used for the session lookup.
    #[ortho_config()]
    pub auth_url: Option<String>,

    /// Public API key sent to the auth provider.
    #[ortho_config()]
    pub auth_api_key: Option<String>,

    /// Session access token issued by the auth provider.
    #[ortho_config()]
    pub access_token: Option<String>,

    /// Wallet address to bind for this session.
    ///
    /// Can be provided via:
    /// - CLI: `--wallet-address <ADDRESS>` or `-w <ADDRESS>`
    /// - Environment: `PRPAY_WALLET_ADDRESS`
    /// - Config file: `wallet_address = "..."`
    #[ortho_config(cli_short = 'w')]
    pub wallet_address: Option<String>,

    /// View to render: `review`, `rewards`, or `all`.
    ///
    /// Can be provided via:
    /// - CLI: `--view <VIEW>` or `-i <VIEW>`
    /// - Environment: `PRPAY_VIEW`
    /// - Config file: `view = "..."`
    #[ortho_config(cli_short = 'i')]
    pub view: Option<String>,

    /// Pull request id to claim instead of rendering a view.
    #[ortho_config()]
    pub claim: Option<u64>,

    /// Emits telemetry events to stderr as JSON lines.
    ///
    /// Note: like other boolean flags this is not read from the environment.
    #[ortho_config()]
    pub telemetry: bool,

    /// Enables debug logging unless `RUST_LOG` is set.
    ///
    /// Can be provided via:
    /// - CLI: `--verbose` / `-v`
    /// - Config file: `verbose = true`
    #[ortho_config(cli_short = 'v')]
    pub verbose: bool,
}

impl Default for PrPayConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            backend_timeout_seconds: DEFAULT_BACKEND_TIMEOUT_SECONDS,
            contributor_id: None,
            auth_url: None,
            auth_api_key: None,
            access_token: None,
            wallet_address: None,
            view: None,
            claim: None,
            telemetry: false,
            verbose: false,
        }
    }
}

impl PrPayConfig {
    /// Resolves the backend URL from configuration or the legacy
    /// `NEXT_PUBLIC_BACKEND_URL` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::Configuration`] when no source provides a
    /// non-blank value.
    pub fn resolve_backend_url(&self) -> Result<String, PayoutError> {
        self.backend_url
            .clone()
            .or_else(|| env::var(LEGACY_BACKEND_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| PayoutError::Configuration {
                message: "payout backend URL is required (use --backend-url, \
                          PRPAY_BACKEND_URL, or NEXT_PUBLIC_BACKEND_URL)"
                    .to_owned(),
            })
    }

    /// Transport timeout, or `None` when disabled.
    #[must_use]
    pub const fn backend_timeout(&self) -> Option<Duration> {
        if self.backend_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.backend_timeout_seconds))
        }
    }

    /// The configured view, defaulting to all buckets.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::Configuration`] for an unknown view name.
    pub fn view_kind(&self) -> Result<ViewKind, PayoutError> {
        self.view
            .as_deref()
            .map_or_else(|| Ok(ViewKind::default()), str::parse)
    }

    /// Determines the operation mode based on provided configuration.
    #[must_use]
    pub fn operation_mode(&self) -> OperationMode {
        self.claim
            .map_or(OperationMode::Dashboard, |id| {
                OperationMode::Claim(PullRequestId::new(id))
            })
    }

    /// Returns the auth provider URL and API key when a session lookup is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::Configuration`] when only one of the two is set.
    pub fn session_lookup(&self) -> Result<Option<(&str, &str)>, PayoutError> {
        match (self.auth_url.as_deref(), self.auth_api_key.as_deref()) {
            (Some(url), Some(key)) => Ok(Some((url, key))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(PayoutError::Configuration {
                message: "auth API key is required when auth_url is set".to_owned(),
            }),
            (None, Some(_)) => Err(PayoutError::Configuration {
                message: "auth_url is required when auth_api_key is set".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests;
