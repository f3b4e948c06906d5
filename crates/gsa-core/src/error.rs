// ── Core error types ──
//
// Errors surfaced by monitoring and bulk operations. Transport-level
// failures from `gsa_api` are folded into operator-facing variants by the
// `From<gsa_api::Error>` impl.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach appliance at {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Appliance request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Appliance-reported errors ────────────────────────────────────
    #[error("Rejected by appliance: {message}")]
    Rejected {
        message: String,
        /// Appliance error code, e.g. `EntryAlreadyExist`.
        code: Option<String>,
        status: u16,
    },

    #[error("Invalid target: {message}")]
    InvalidTarget { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unreadable response: {message}")]
    Parse { message: String },

    #[error("Column {column}: cannot read {value:?} as {expected}")]
    InvalidValue {
        column: String,
        value: String,
        expected: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gsa_api::Error> for CoreError {
    fn from(err: gsa_api::Error) -> Self {
        match err {
            gsa_api::Error::MalformedTarget { message } => CoreError::InvalidTarget { message },
            gsa_api::Error::InvalidUrl(e) => CoreError::InvalidTarget {
                message: format!("invalid URL: {e}"),
            },
            gsa_api::Error::Transport(ref e) => CoreError::ConnectionFailed {
                address: e
                    .url()
                    .and_then(|u| u.host_str().map(str::to_owned))
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            gsa_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            gsa_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                address: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            gsa_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            gsa_api::Error::Service {
                status,
                code,
                message,
            } => CoreError::Rejected {
                message,
                code,
                status,
            },
            gsa_api::Error::Parse { message, .. } => CoreError::Parse { message },
            gsa_api::Error::Encoding { message } => CoreError::Parse {
                message: format!("cannot encode entry: {message}"),
            },
        }
    }
}
