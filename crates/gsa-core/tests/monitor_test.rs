#![allow(clippy::unwrap_used)]
// Integration tests for `Monitor` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

use gsa_api::{Endpoint, GsaClient, TransportConfig};
use gsa_core::column::{ERROR_DECIMAL, ERROR_INTEGER, dashboard_columns};
use gsa_core::monitor::refresh_row;
use gsa_core::{
    ColumnKind, ColumnSource, ColumnSpec, ColumnValue, CoreError, Monitor, MonitorConfig,
    MonitorEvent, RowId, RowStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

const NS: &str = "xmlns='http://www.w3.org/2005/Atom' \
                  xmlns:gsa='http://schemas.google.com/gsa/2007'";

fn feed_doc(entries: &[&[(&str, &str)]]) -> String {
    let mut doc = format!("<feed {NS}>");
    for props in entries {
        doc.push_str("<entry>");
        for (name, value) in *props {
            doc.push_str(&format!("<gsa:content name='{name}'>{value}</gsa:content>"));
        }
        doc.push_str("</entry>");
    }
    doc.push_str("</feed>");
    doc
}

fn atom(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body)
}

/// Mount a healthy appliance: crawl paused, 2,000 doc limit, counts and
/// rate on `status`. Each feed may be fetched `per_feed` times.
async fn mount_healthy(server: &MockServer, per_feed: impl Into<Times> + Clone) {
    Mock::given(method("GET"))
        .and(path("/feeds/command"))
        .respond_with(atom(feed_doc(&[&[
            ("entryID", "pauseCrawl"),
            ("pauseCrawl", "1"),
        ]])))
        .expect(per_feed.clone())
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feeds/config"))
        .respond_with(atom(feed_doc(&[
            &[("entryID", "crawlURLs"), ("startURLs", "http://intranet/")],
            &[("entryID", "hostLoad"), ("maxURLs", "2,000")],
        ])))
        .expect(per_feed.clone())
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feeds/status"))
        .respond_with(atom(feed_doc(&[&[
            ("entryID", "documentStatus"),
            ("foundURLs", "1,234,567"),
            ("servedURLs", "1,000"),
            ("crawlPagesPerSecond", "2.5"),
        ]])))
        .expect(per_feed.clone())
        .mount(server)
        .await;
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

fn config(interval: Duration) -> MonitorConfig {
    MonitorConfig {
        columns: dashboard_columns(),
        refresh_interval: interval,
    }
}

async fn next_update(rx: &mut broadcast::Receiver<MonitorEvent>) -> (RowId, bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let MonitorEvent::RowUpdated { row, ok } = rx.recv().await.unwrap() {
                return (row, ok);
            }
        }
    })
    .await
    .expect("timed out waiting for a row update")
}

fn drain_updates(rx: &mut broadcast::Receiver<MonitorEvent>) -> Vec<RowId> {
    let mut rows = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let MonitorEvent::RowUpdated { row, .. } = event {
            rows.push(row);
        }
    }
    rows
}

// ── Row isolation ───────────────────────────────────────────────────

#[tokio::test]
async fn test_failing_row_degrades_without_touching_healthy_row() {
    let server = MockServer::start().await;
    mount_healthy(&server, 1_u64).await;

    let monitor = Monitor::new(config(Duration::from_secs(3600)));
    let mut events = monitor.subscribe();

    let healthy = monitor.add_endpoint(client_for(&server));
    let failing = monitor.add_endpoint(unreachable_client());

    let mut seen = vec![next_update(&mut events).await, next_update(&mut events).await];
    seen.sort_by_key(|(row, _)| *row);
    assert_eq!(seen, vec![(healthy, true), (failing, false)]);

    // One cycle each, so exactly one update each.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(drain_updates(&mut events).is_empty());

    let good = monitor.row(healthy).unwrap();
    assert!(matches!(good.status, RowStatus::Fresh { .. }));
    assert_eq!(good.value("Crawl Paused"), Some(&ColumnValue::Flag(true)));
    assert_eq!(good.value("Doc Limit"), Some(&ColumnValue::Integer(2_000)));
    assert_eq!(good.value("Docs Found"), Some(&ColumnValue::Integer(1_234_567)));
    assert_eq!(good.value("Docs Served"), Some(&ColumnValue::Integer(1_000)));
    assert_eq!(good.value("Crawl Rate"), Some(&ColumnValue::Decimal(2.5)));
    assert_eq!(good.value("Selected"), Some(&ColumnValue::Flag(false)));

    let bad = monitor.row(failing).unwrap();
    assert!(matches!(bad.status, RowStatus::Failed { .. }));
    for header in ["Doc Limit", "Docs Found", "Docs Served"] {
        assert_eq!(bad.value(header), Some(&ColumnValue::Integer(ERROR_INTEGER)));
    }
    assert_eq!(bad.value("Crawl Rate"), Some(&ColumnValue::Decimal(ERROR_DECIMAL)));
    // Never known, so nothing to keep.
    assert_eq!(bad.value("Crawl Paused"), None);
    assert_eq!(
        bad.value("Host"),
        Some(&ColumnValue::Text("127.0.0.1:1".into()))
    );

    // `expect(1)` per feed: status served three columns from one fetch.
    server.verify().await;
}

#[tokio::test]
async fn test_failure_keeps_last_flag_and_sentinels_numbers() {
    let server = MockServer::start().await;
    mount_healthy(&server, 1_u64..).await;

    let monitor = Monitor::new(config(Duration::from_millis(50)));
    let mut events = monitor.subscribe();
    let row = monitor.add_endpoint(client_for(&server));

    assert_eq!(next_update(&mut events).await, (row, true));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("InternalError"))
        .with_priority(1)
        .mount(&server)
        .await;

    loop {
        let (_, ok) = next_update(&mut events).await;
        if !ok {
            break;
        }
    }

    let snap = monitor.row(row).unwrap();
    assert_eq!(snap.value("Crawl Paused"), Some(&ColumnValue::Flag(true)));
    assert!(snap.value("Docs Found").unwrap().is_sentinel());
    assert!(snap.value("Crawl Rate").unwrap().is_sentinel());
    match snap.status {
        RowStatus::Failed { ref message, .. } => assert!(message.contains("InternalError")),
        ref other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cycles_repeat_on_fixed_delay() {
    let server = MockServer::start().await;
    mount_healthy(&server, 1_u64..).await;

    let monitor = Monitor::new(config(Duration::from_millis(50)));
    let mut events = monitor.subscribe();
    let row = monitor.add_endpoint(client_for(&server));

    for _ in 0..3 {
        assert_eq!(next_update(&mut events).await, (row, true));
    }
}

#[tokio::test]
async fn test_hanging_row_times_out_while_healthy_row_keeps_updating() {
    let healthy_server = MockServer::start().await;
    mount_healthy(&healthy_server, 1_u64..).await;
    let hanging_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(atom(feed_doc(&[])).set_delay(Duration::from_secs(10)))
        .mount(&hanging_server)
        .await;

    let monitor = Monitor::new(config(Duration::from_millis(50)));
    let mut events = monitor.subscribe();
    let healthy = monitor.add_endpoint(client_for(&healthy_server));
    let hanging = monitor.add_endpoint(
        GsaClient::from_transport(
            hanging_server.uri().parse().unwrap(),
            None,
            &TransportConfig::default().with_timeout(Duration::from_millis(800)),
        )
        .unwrap(),
    );

    let mut healthy_updates = 0;
    loop {
        let (row, ok) = next_update(&mut events).await;
        if row == hanging {
            assert!(!ok);
            break;
        }
        assert_eq!((row, ok), (healthy, true));
        healthy_updates += 1;
    }
    assert!(
        healthy_updates >= 3,
        "healthy row stalled behind the hanging one: {healthy_updates} updates"
    );

    let snap = monitor.row(hanging).unwrap();
    match snap.status {
        RowStatus::Failed { ref message, .. } => {
            assert!(message.contains("timed out after 1s"), "got {message:?}");
        }
        ref other => panic!("expected Failed, got {other:?}"),
    }
    for header in ["Doc Limit", "Docs Found", "Docs Served", "Crawl Rate"] {
        assert!(snap.value(header).unwrap().is_sentinel(), "{header}");
    }
    assert!(matches!(
        monitor.row(healthy).unwrap().status,
        RowStatus::Fresh { .. }
    ));
}

// ── Removal ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_removed_row_is_not_resurrected_by_in_flight_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            atom(feed_doc(&[&[("entryID", "pauseCrawl"), ("pauseCrawl", "0")]]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let monitor = Monitor::new(config(Duration::from_millis(50)));
    let mut events = monitor.subscribe();
    let row = monitor.add_endpoint(client_for(&server));

    // Wait until the first request is on the wire.
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.received_requests().await.unwrap_or_default().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert!(monitor.remove(row));
    assert!(monitor.row(row).is_none());

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(monitor.is_empty());
    assert!(monitor.row(row).is_none());
    let mut saw_removed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            MonitorEvent::RowUpdated { row: updated, .. } => {
                panic!("update delivered for removed row {updated}")
            }
            MonitorEvent::RowRemoved(removed) => saw_removed = removed == row,
            _ => {}
        }
    }
    assert!(saw_removed);
    assert!(!monitor.remove(row));
}

#[tokio::test]
async fn test_selection_drives_removal() {
    let monitor = Monitor::new(config(Duration::from_secs(3600)));
    let a = monitor.add_endpoint(unreachable_client());
    let b = monitor.add_endpoint(GsaClient::with_client(
        reqwest::Client::new(),
        Endpoint::new("127.0.0.1").with_port(2),
        None,
    ));

    assert!(monitor.selected_clients().is_empty());
    assert!(monitor.set_selected(a, true));
    let selected = monitor.selected_clients();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].address(), "127.0.0.1:1");

    assert_eq!(monitor.remove_selected(), 1);
    assert_eq!(monitor.len(), 1);
    assert!(!monitor.set_selected(a, true));

    monitor.select_all(true);
    assert!(monitor.row(b).unwrap().selected);
    monitor.select_all(false);
    assert!(monitor.selected_clients().is_empty());
}

// ── Single cycle ────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_row_leaves_missing_values_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/status"))
        .respond_with(atom(feed_doc(&[&[
            ("entryID", "documentStatus"),
            ("foundURLs", "42"),
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let columns = vec![
        ColumnSpec::new("Host", ColumnSource::Host, ColumnKind::Text),
        ColumnSpec::new(
            "Found",
            ColumnSource::remote("status", "documentStatus", "foundURLs"),
            ColumnKind::Integer,
        ),
        ColumnSpec::new(
            "Served",
            ColumnSource::remote("status", "documentStatus", "servedURLs"),
            ColumnKind::Integer,
        ),
        ColumnSpec::new(
            "Health",
            ColumnSource::remote("status", "systemStatus", "overallHealth"),
            ColumnKind::Text,
        ),
    ];

    let values = refresh_row(&client_for(&server), &columns).await.unwrap();
    assert_eq!(
        values,
        vec![None, Some(ColumnValue::Integer(42)), None, None]
    );
}

#[tokio::test]
async fn test_refresh_row_fails_on_unreadable_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/status"))
        .respond_with(atom(feed_doc(&[&[
            ("entryID", "documentStatus"),
            ("crawlPagesPerSecond", "fast"),
        ]])))
        .mount(&server)
        .await;

    let columns = vec![ColumnSpec::new(
        "Rate",
        ColumnSource::remote("status", "documentStatus", "crawlPagesPerSecond"),
        ColumnKind::Decimal,
    )];

    let err = refresh_row(&client_for(&server), &columns)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidValue { .. }), "got {err:?}");
}
