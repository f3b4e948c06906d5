// ClientLogin session
//
// The appliance hands out a session token from `/accounts/ClientLogin`
// in exchange for an administrator's credentials. The token is attached
// to every later request as `Authorization: GoogleLogin auth=<token>`.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Service name the appliance expects in the login form.
pub const SERVICE: &str = "GSA";
/// Application name reported as the login `source`.
pub const APP_NAME: &str = "gsa-api-client";

const LOGIN_PATH: &str = "/accounts/ClientLogin";
const ACCOUNT_TYPE: &str = "HOSTED_OR_GOOGLE";

/// Header value for a token-authenticated request.
pub(crate) fn authorization_header(token: &SecretString) -> String {
    format!("GoogleLogin auth={}", token.expose_secret())
}

/// Exchange credentials for a session token.
///
/// `origin` is the appliance root (`protocol://host:port`).
pub async fn client_login(
    http: &reqwest::Client,
    origin: &Url,
    username: &str,
    password: &SecretString,
    timeout_secs: u64,
) -> Result<SecretString, Error> {
    let url = origin.join(LOGIN_PATH)?;
    debug!("logging in at {}", url);

    let form = [
        ("accountType", ACCOUNT_TYPE),
        ("Email", username),
        ("Passwd", password.expose_secret()),
        ("service", SERVICE),
        ("source", APP_NAME),
    ];

    let resp = http
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::from_transport(e, timeout_secs))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| Error::from_transport(e, timeout_secs))?;

    if !status.is_success() {
        let reason = login_field(&body, "Error").unwrap_or("rejected");
        return Err(Error::Authentication {
            message: format!("login failed (HTTP {status}): {reason}"),
        });
    }

    let token = login_field(&body, "Auth").ok_or_else(|| Error::Authentication {
        message: "login response carried no Auth token".into(),
    })?;

    debug!("login successful");
    Ok(SecretString::from(token.to_owned()))
}

/// Pick `key=value` out of the line-oriented ClientLogin response.
fn login_field<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    body.lines()
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}
