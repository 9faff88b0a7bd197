//! Base URL parsing for the payout backend.

use url::Url;

use super::error::PayoutError;

/// Validated payout backend base URL.
///
/// The path always ends in `/` so that endpoint names resolve beneath any
/// path prefix the backend is mounted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrl(Url);

impl BackendUrl {
    /// Parses an absolute `http` or `https` base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::InvalidUrl`] when the value does not parse, is
    /// not HTTP(S), or carries a query or fragment.
    pub fn parse(input: &str) -> Result<Self, PayoutError> {
        let mut url =
            Url::parse(input.trim()).map_err(|error| PayoutError::InvalidUrl(error.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PayoutError::InvalidUrl(format!(
                "unsupported scheme '{}' in {input}",
                url.scheme()
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(PayoutError::InvalidUrl(format!(
                "base URL must not carry a query or fragment: {input}"
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    /// Resolves an endpoint beneath the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutError::InvalidUrl`] when the endpoint cannot be joined.
    pub fn endpoint(&self, name: &str) -> Result<Url, PayoutError> {
        self.0
            .join(name)
            .map_err(|error| PayoutError::InvalidUrl(error.to_string()))
    }

    /// Borrow the base URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}
