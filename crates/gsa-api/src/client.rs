// Feed API HTTP client
//
// Wraps `reqwest::Client` with appliance-specific URL construction,
// header handling, and Atom payload (de)serialization. Every operation is
// a single request: nothing is retried or cached.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::auth;
use crate::entry::Entry;
use crate::error::Error;
use crate::feed::Feed;
use crate::transport::TransportConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PROTOCOL: &str = "http";

const FEED_PATH: &str = "feeds";
const GDATA_VERSION_HEADER: &str = "GData-Version";
const GDATA_VERSION: &str = "2.0";
const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// Protocol, host and port of one appliance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Plain-HTTP endpoint on the default admin port.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_owned(),
            host: host.into(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// `host:port`, the form shown to operators.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `protocol://host:port`
    pub fn origin(&self) -> Result<Url, Error> {
        if self.host.trim().is_empty() {
            return Err(Error::malformed("host is not specified"));
        }
        Ok(Url::parse(&self.to_string())?)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Accepts `host`, `host:port` and `protocol://host[:port]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (protocol, rest) = match s.split_once("://") {
            Some((protocol, rest)) => (protocol, rest),
            None => (DEFAULT_PROTOCOL, s),
        };
        let rest = rest.trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::malformed(format!("invalid port in {s:?}")))?;
                (host, port)
            }
            None => (rest, DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(Error::malformed(format!("no host in {s:?}")));
        }
        Ok(Self {
            protocol: protocol.to_owned(),
            host: host.to_owned(),
            port,
        })
    }
}

/// Percent-encode one URL component. Only `A-Z a-z 0-9 - _ . *` pass
/// through; space becomes `%20`.
pub fn percent_encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// HTTP client for one appliance's administration feeds.
///
/// The session token is obtained once by [`connect`](Self::connect) and
/// never refreshed; an expired token surfaces as
/// [`Error::Authentication`].
pub struct GsaClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    base_url: String,
    token: Option<SecretString>,
    timeout_secs: u64,
}

impl fmt::Debug for GsaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GsaClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GsaClient {
    /// Build an HTTP client from `transport`, log in, and return a client
    /// bound to the resulting session.
    pub async fn connect(
        endpoint: Endpoint,
        username: &str,
        password: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut client = Self::from_transport(endpoint, None, transport)?;
        let origin = client.endpoint.origin()?;
        let token =
            auth::client_login(&client.http, &origin, username, password, client.timeout_secs)
                .await?;
        client.token = Some(token);
        Ok(client)
    }

    /// Build the HTTP client from `transport` without logging in. Timeouts
    /// are reported against `transport.timeout`.
    pub fn from_transport(
        endpoint: Endpoint,
        token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, endpoint, token);
        client.timeout_secs = transport.timeout_secs();
        Ok(client)
    }

    /// Create a client around a pre-built `reqwest::Client` and an optional
    /// existing session token. Timeouts are reported against the default
    /// transport timeout.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: Endpoint,
        token: Option<SecretString>,
    ) -> Self {
        let base_url = format!("{endpoint}/{FEED_PATH}");
        Self {
            http,
            endpoint,
            base_url,
            token,
            timeout_secs: TransportConfig::default().timeout_secs(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// `host:port` of the appliance.
    pub fn address(&self) -> String {
        self.endpoint.address()
    }

    /// `protocol://host:port/feeds`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{feed}[?query]`
    pub fn feed_url(
        &self,
        feed: &str,
        query: Option<&IndexMap<String, String>>,
    ) -> Result<Url, Error> {
        check_feed(feed)?;
        let mut url = format!("{}/{feed}", self.base_url);
        append_query(&mut url, query);
        Ok(Url::parse(&url)?)
    }

    /// `{base}/{feed}/{pct(entry)}[?query]`
    pub fn entry_url(
        &self,
        feed: &str,
        entry: &str,
        query: Option<&IndexMap<String, String>>,
    ) -> Result<Url, Error> {
        check_feed(feed)?;
        if entry.is_empty() {
            return Err(Error::malformed("entry is not specified"));
        }
        let mut url = format!("{}/{feed}/{}", self.base_url, percent_encode(entry));
        append_query(&mut url, query);
        Ok(Url::parse(&url)?)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// List every entry of a feed.
    pub async fn get_feed(&self, feed: &str) -> Result<Feed, Error> {
        let url = self.feed_url(feed, None)?;
        let body = self.send(Method::GET, url, None).await?;
        Feed::from_xml(&body)
    }

    /// List the entries of a feed that match the query parameters.
    pub async fn query_feed(
        &self,
        feed: &str,
        query: &IndexMap<String, String>,
    ) -> Result<Feed, Error> {
        let url = self.feed_url(feed, Some(query))?;
        let body = self.send(Method::GET, url, None).await?;
        Feed::from_xml(&body)
    }

    pub async fn get_entry(&self, feed: &str, entry: &str) -> Result<Entry, Error> {
        let url = self.entry_url(feed, entry, None)?;
        let body = self.send(Method::GET, url, None).await?;
        Entry::from_xml(&body)
    }

    pub async fn query_entry(
        &self,
        feed: &str,
        entry: &str,
        query: &IndexMap<String, String>,
    ) -> Result<Entry, Error> {
        let url = self.entry_url(feed, entry, Some(query))?;
        let body = self.send(Method::GET, url, None).await?;
        Entry::from_xml(&body)
    }

    /// Create an entry. Returns the appliance's copy, id included.
    pub async fn insert_entry(&self, feed: &str, entry: &Entry) -> Result<Entry, Error> {
        let url = self.feed_url(feed, None)?;
        let payload = entry.to_xml()?;
        let body = self.send(Method::POST, url, Some(payload)).await?;
        Entry::from_xml(&body)
    }

    /// Replace an existing entry. Returns the updated entry.
    pub async fn update_entry(
        &self,
        feed: &str,
        entry_id: &str,
        entry: &Entry,
    ) -> Result<Entry, Error> {
        let url = self.entry_url(feed, entry_id, None)?;
        let payload = entry.to_xml()?;
        let body = self.send(Method::PUT, url, Some(payload)).await?;
        Entry::from_xml(&body)
    }

    pub async fn delete_entry(&self, feed: &str, entry_id: &str) -> Result<(), Error> {
        let url = self.entry_url(feed, entry_id, None)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one request and return the body of a successful response.
    async fn send(&self, method: Method, url: Url, payload: Option<String>) -> Result<String, Error> {
        debug!("{} {}", method, url);

        let mut req = self
            .http
            .request(method, url)
            .header(GDATA_VERSION_HEADER, GDATA_VERSION);
        if let Some(ref token) = self.token {
            req = req.header(AUTHORIZATION, auth::authorization_header(token));
        }
        if let Some(payload) = payload {
            req = req.header(CONTENT_TYPE, ATOM_CONTENT_TYPE).body(payload);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout_secs))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout_secs))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session token expired or invalid credentials".into(),
            });
        }
        if !status.is_success() {
            return Err(Error::service(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Feed names go into the path verbatim, so they must not carry URL
/// delimiters.
fn check_feed(feed: &str) -> Result<(), Error> {
    if feed.is_empty() {
        return Err(Error::malformed("feed is not specified"));
    }
    if feed.contains(['/', '?', '#']) {
        return Err(Error::malformed(format!(
            "feed name {feed:?} contains '/', '?' or '#'"
        )));
    }
    Ok(())
}

fn append_query(url: &mut String, query: Option<&IndexMap<String, String>>) {
    let Some(query) = query else { return };
    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(&percent_encode(key));
        url.push('=');
        url.push_str(&percent_encode(value));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> GsaClient {
        GsaClient::with_client(
            reqwest::Client::new(),
            Endpoint::new("gsa1").with_port(8000),
            None,
        )
    }

    #[test]
    fn percent_encode_keeps_unreserved_set() {
        assert_eq!(percent_encode("aZ09-_.*"), "aZ09-_.*");
        assert_eq!(percent_encode("a b&c"), "a%20b%26c");
        assert_eq!(percent_encode("a+b/c~"), "a%2Bb%2Fc%7E");
    }

    #[test]
    fn base_url_appends_feed_path() {
        assert_eq!(client().base_url(), "http://gsa1:8000/feeds");
        assert_eq!(client().address(), "gsa1:8000");
    }

    #[test]
    fn entry_url_encodes_id() {
        let url = client().entry_url("policyAcls", "a b&c", None).unwrap();
        assert_eq!(url.as_str(), "http://gsa1:8000/feeds/policyAcls/a%20b%26c");
    }

    #[test]
    fn query_keeps_insertion_order() {
        let mut query = IndexMap::new();
        query.insert("startLine".to_owned(), "0".to_owned());
        query.insert("maxLines".to_owned(), "500".to_owned());
        query.insert("query".to_owned(), "a&b c".to_owned());
        let url = client().feed_url("policyAcls", Some(&query)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://gsa1:8000/feeds/policyAcls?startLine=0&maxLines=500&query=a%26b%20c"
        );
    }

    #[test]
    fn missing_target_is_malformed() {
        let c = client();
        assert!(matches!(
            c.feed_url("", None),
            Err(Error::MalformedTarget { .. })
        ));
        assert!(matches!(
            c.entry_url("config", "", None),
            Err(Error::MalformedTarget { .. })
        ));
    }

    #[test]
    fn feed_name_with_url_delimiters_is_malformed() {
        let c = client();
        for feed in ["a/b", "a?x", "status#top"] {
            assert!(
                matches!(c.feed_url(feed, None), Err(Error::MalformedTarget { .. })),
                "{feed} accepted"
            );
            assert!(
                matches!(c.entry_url(feed, "x", None), Err(Error::MalformedTarget { .. })),
                "{feed} accepted"
            );
        }
    }

    #[test]
    fn endpoint_parses_operator_forms() {
        assert_eq!("gsa1".parse::<Endpoint>().unwrap(), Endpoint::new("gsa1"));
        assert_eq!(
            "gsa2:8443".parse::<Endpoint>().unwrap(),
            Endpoint::new("gsa2").with_port(8443)
        );
        assert_eq!(
            "https://gsa3:8443/".parse::<Endpoint>().unwrap(),
            Endpoint::new("gsa3").with_port(8443).with_protocol("https")
        );
        assert!("gsa1:notaport".parse::<Endpoint>().is_err());
        assert!(":8000".parse::<Endpoint>().is_err());
    }
}
