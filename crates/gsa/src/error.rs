//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use gsa_api::terms::errors;
use gsa_config::ConfigError;
use gsa_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to appliance at {address}")]
    #[diagnostic(
        code(gsa::connection_failed),
        help(
            "Check that the admin port is reachable.\n\
             Reason: {reason}\n\
             For self-signed certificates try --insecure (-k)."
        )
    )]
    ConnectionFailed { address: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(gsa::timeout),
        help("Increase the timeout with --timeout or check the appliance load.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(gsa::auth_failed),
        help(
            "Verify the admin username and password.\n\
             Store a password with: gsa config set-password --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(gsa::no_credentials),
        help(
            "Pass --username with --password-stdin, set GSA_USERNAME/GSA_PASSWORD,\n\
             or add username/password to the profile."
        )
    )]
    NoCredentials { profile: String },

    // ── Appliance replies ────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(gsa::not_found),
        help("Run: gsa retrieve <feed> to see the available entries")
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(gsa::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(gsa::permission_denied),
        help("The account lacks rights for this feed.")
    )]
    PermissionDenied { message: String },

    #[error("Appliance error ({code}): {message}")]
    #[diagnostic(code(gsa::api_error))]
    ApiError { code: String, message: String },

    #[error("{action} failed on {failed} of {total} appliances")]
    #[diagnostic(
        code(gsa::partial_failure),
        help("The report above lists each appliance and why it failed.")
    )]
    PartialFailure {
        action: String,
        failed: usize,
        total: usize,
    },

    #[error("Unreadable appliance response: {message}")]
    #[diagnostic(code(gsa::parse))]
    Parse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gsa::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(gsa::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("No appliance configured")]
    #[diagnostic(
        code(gsa::no_config),
        help(
            "Pass --host, or add a profile to the config file.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(gsa::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(gsa::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(gsa::io))]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    #[diagnostic(code(gsa::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { address, reason } => {
                CliError::ConnectionFailed { address, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Rejected {
                message,
                code,
                status,
            } => match code.as_deref() {
                Some(errors::ENTRY_NOT_EXIST) => CliError::NotFound { message },
                Some(errors::ENTRY_ALREADY_EXIST) => CliError::Conflict { message },
                Some(errors::PERMISSION_DENIED) => CliError::PermissionDenied { message },
                _ if status == 404 => CliError::NotFound { message },
                _ if status == 403 => CliError::PermissionDenied { message },
                _ => CliError::ApiError {
                    code: code.unwrap_or_else(|| format!("HTTP {status}")),
                    message,
                },
            },
            CoreError::InvalidTarget { message } => CliError::Validation {
                field: "target".into(),
                reason: message,
            },
            CoreError::Parse { message } => CliError::Parse { message },
            invalid @ CoreError::InvalidValue { .. } => CliError::Parse {
                message: invalid.to_string(),
            },
            CoreError::Io(e) => CliError::Io(e),
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available,
                path: gsa_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

impl From<gsa_api::Error> for CliError {
    fn from(err: gsa_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
