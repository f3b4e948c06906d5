use thiserror::Error;

use crate::terms;

/// Top-level error type for the `gsa-api` crate.
///
/// One variant family per failure category the appliance API can produce:
/// target construction, transport, authentication, service-reported errors
/// and payload parsing. The client never recovers from any of these locally.
#[derive(Debug, Error)]
pub enum Error {
    // ── Target ──────────────────────────────────────────────────────
    /// A feed name or entry id required to build the resource URL is missing.
    #[error("Malformed target: {message}")]
    MalformedTarget { message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Credentials were rejected by the appliance.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Service ─────────────────────────────────────────────────────
    /// The appliance answered but reported an application-level error.
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        status: u16,
        /// Appliance error code (e.g. `EntryNotExist`) when recognizable.
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The response body is not a valid entry or feed document.
    #[error("Parse error: {message}")]
    Parse { message: String, body: String },

    /// An entry could not be serialized to XML.
    #[error("Encoding error: {message}")]
    Encoding { message: String },
}

impl Error {
    /// Build a `MalformedTarget` error.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTarget {
            message: message.into(),
        }
    }

    /// Translate a `reqwest` failure, surfacing timeouts as their own variant.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Transport(err)
        }
    }

    /// Build a `Service` error from an HTTP status and response body,
    /// picking out a known appliance error code if the body carries one.
    pub(crate) fn service(status: u16, body: &str) -> Self {
        let code = terms::errors::ALL
            .iter()
            .find(|code| body.contains(*code))
            .map(|code| (*code).to_owned());
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.chars().take(200).collect()
        };
        Self::Service {
            status,
            code,
            message,
        }
    }

    /// Returns `true` if the failure means the whole batch should stop,
    /// rather than just the current item.
    ///
    /// Transport, timeout, authentication and target errors affect every
    /// following request equally; service rejections and parse failures are
    /// specific to the item that triggered them.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(
            self,
            Self::MalformedTarget { .. }
                | Self::InvalidUrl(_)
                | Self::Transport(_)
                | Self::Timeout { .. }
                | Self::Tls(_)
                | Self::Authentication { .. }
        )
    }
}
