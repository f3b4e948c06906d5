// ── Runtime connection configuration ──
//
// Describes how to reach and log in to one appliance. Carries credential
// data and transport tuning but never touches disk; the CLI builds a
// `ConnectionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use gsa_api::{Endpoint, GsaClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use tracing::info;

use crate::error::CoreError;

/// TLS verification strategy for `https` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed appliance certs).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to open one authenticated session.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: Endpoint,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(endpoint: Endpoint, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: TransportConfig::default().timeout,
        }
    }

    /// Same credentials and tuning, different appliance.
    pub fn for_endpoint(&self, endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..self.clone()
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_tls(TlsMode::from(&self.tls))
            .with_timeout(self.timeout)
    }

    /// Log in and return a ready client.
    pub async fn connect(&self) -> Result<GsaClient, CoreError> {
        if self.username.is_empty() {
            return Err(CoreError::Config {
                message: format!("no username configured for {}", self.endpoint.address()),
            });
        }
        let client = GsaClient::connect(
            self.endpoint.clone(),
            &self.username,
            &self.password,
            &self.transport(),
        )
        .await?;
        info!(address = %client.address(), "connected");
        Ok(client)
    }
}
