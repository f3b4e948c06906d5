#![allow(clippy::unwrap_used)]
// Integration tests for fleet commands using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gsa_api::{Endpoint, GsaClient};
use gsa_core::column::dashboard_columns;
use gsa_core::fleet::{self, FleetCommand};
use gsa_core::{ConnectionConfig, CoreError, Monitor, MonitorConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const NS: &str = "xmlns='http://www.w3.org/2005/Atom' \
                  xmlns:gsa='http://schemas.google.com/gsa/2007'";

fn updated(entry_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<entry {NS}><gsa:content name='entryID'>{entry_id}</gsa:content></entry>"
    ))
}

fn client_for(server: &MockServer) -> GsaClient {
    GsaClient::with_client(reqwest::Client::new(), server.uri().parse().unwrap(), None)
}

fn unreachable_client() -> GsaClient {
    GsaClient::with_client(
        reqwest::Client::new(),
        Endpoint::new("127.0.0.1").with_port(1),
        None,
    )
}

// ── apply ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pause_crawl_continues_past_unreachable_appliance() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/feeds/command/pauseCrawl"))
        .and(body_string_contains(
            "<gsa:content name=\"pauseCrawl\">1</gsa:content>",
        ))
        .respond_with(updated("pauseCrawl"))
        .expect(1)
        .mount(&server)
        .await;

    let down = unreachable_client();
    let up = client_for(&server);
    let report = fleet::apply([&down, &up], FleetCommand::PauseCrawl).await;

    assert_eq!(report.applied, vec![up.address()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].address, "127.0.0.1:1");
    assert!(!report.is_complete());
    server.verify().await;
}

#[tokio::test]
async fn test_set_doc_limit_updates_host_load() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/feeds/config/hostLoad"))
        .and(body_string_contains(
            "<gsa:content name=\"maxURLs\">500000</gsa:content>",
        ))
        .respond_with(updated("hostLoad"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = fleet::apply([&client], FleetCommand::SetDocLimit { max_urls: 500_000 }).await;

    assert!(report.is_complete());
    assert_eq!(report.applied.len(), 1);
    server.verify().await;
}

#[tokio::test]
async fn test_refused_command_is_recorded_with_reason() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/feeds/command/resetIndex"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Insufficient privileges"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = fleet::apply([&client], FleetCommand::ResetIndex).await;

    assert!(report.applied.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(
        report.failed[0].reason.contains("Insufficient privileges"),
        "got {:?}",
        report.failed[0].reason
    );
}

// ── Monitor selection ───────────────────────────────────────────────

#[tokio::test]
async fn test_apply_to_selected_skips_unselected_and_clears_selection() {
    let chosen = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/feeds/command/pauseCrawl"))
        .and(body_string_contains(
            "<gsa:content name=\"pauseCrawl\">0</gsa:content>",
        ))
        .respond_with(updated("pauseCrawl"))
        .expect(1)
        .mount(&chosen)
        .await;
    Mock::given(method("PUT"))
        .respond_with(updated("pauseCrawl"))
        .expect(0)
        .mount(&other)
        .await;

    let monitor = Monitor::new(MonitorConfig {
        columns: dashboard_columns(),
        refresh_interval: Duration::from_secs(3600),
    });
    let row = monitor.add_endpoint(client_for(&chosen));
    monitor.add_endpoint(client_for(&other));
    assert!(monitor.set_selected(row, true));

    let report = monitor.apply_to_selected(FleetCommand::ResumeCrawl).await;

    assert_eq!(report.applied, vec![client_for(&chosen).address()]);
    assert!(monitor.selected_clients().is_empty());
    assert!(!monitor.row(row).unwrap().selected);
    assert_eq!(monitor.len(), 2);
    chosen.verify().await;
    other.verify().await;
}

// ── connect_all ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_all_keeps_input_order_across_slow_logins() {
    let slow = MockServer::start().await;
    let refused = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts/ClientLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Auth=tok\n")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&slow)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/ClientLogin"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Error=BadAuthentication\n"))
        .mount(&refused)
        .await;

    let connections: Vec<ConnectionConfig> = [&slow, &refused]
        .into_iter()
        .map(|server| {
            ConnectionConfig::new(
                server.uri().parse().unwrap(),
                "admin",
                SecretString::from("pw".to_owned()),
            )
        })
        .collect();

    let results = fleet::connect_all(&connections).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, connections[0].endpoint.address());
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, connections[1].endpoint.address());
    assert!(
        matches!(results[1].1, Err(CoreError::AuthenticationFailed { .. })),
        "got {:?}",
        results[1].1
    );
}
