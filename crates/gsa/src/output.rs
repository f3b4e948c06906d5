//! Output formatting: XML, JSON, YAML, table.
//!
//! Renders data in the format selected by `--output`. Feeds and entries
//! can be echoed as Atom XML; everything else uses serde for structured
//! formats and a `tabled` builder for tables.

use std::io::{self, Write};

use gsa_api::{Entry, Feed};
use indexmap::IndexMap;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Serde views ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EntryView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    properties: IndexMap<String, String>,
}

impl<'a> From<&'a Entry> for EntryView<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            id: entry.id.as_deref(),
            title: entry.title.as_deref(),
            properties: entry.all(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeedView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    entries: Vec<EntryView<'a>>,
}

// ── Render dispatchers ───────────────────────────────────────────────

pub fn render_entry(format: OutputFormat, entry: &Entry) -> Result<String, CliError> {
    match format {
        OutputFormat::Xml => Ok(entry.to_xml()?),
        OutputFormat::Json => render_json(&EntryView::from(entry)),
        OutputFormat::Yaml => render_yaml(&EntryView::from(entry)),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Property", "Value"]);
            for (name, value) in entry.all() {
                builder.push_record([name, value]);
            }
            Ok(finish_table(builder))
        }
    }
}

/// Feeds render as one table row per entry, one column per property name
/// in first-seen order.
pub fn render_feed(format: OutputFormat, feed: &Feed) -> Result<String, CliError> {
    match format {
        OutputFormat::Xml => Ok(feed.to_xml()?),
        OutputFormat::Json => render_json(&feed_view(feed)),
        OutputFormat::Yaml => render_yaml(&feed_view(feed)),
        OutputFormat::Table => Ok(feed_table(feed)),
    }
}

/// Render one serde value; table/XML use the pre-formatted `detail`.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    detail: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Table | OutputFormat::Xml => Ok(detail(data)),
    }
}

/// A table from a header row and string cells.
pub fn render_grid(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    finish_table(builder)
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn feed_view(feed: &Feed) -> FeedView<'_> {
    FeedView {
        id: feed.id.as_deref(),
        title: feed.title.as_deref(),
        entries: feed.iter().map(EntryView::from).collect(),
    }
}

fn feed_table(feed: &Feed) -> String {
    let maps: Vec<IndexMap<String, String>> = feed.iter().map(Entry::all).collect();
    let mut header: Vec<String> = Vec::new();
    for map in &maps {
        for name in map.keys() {
            if !header.contains(name) {
                header.push(name.clone());
            }
        }
    }
    let rows = maps
        .iter()
        .map(|map| {
            header
                .iter()
                .map(|name| map.get(name).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    render_grid(header, rows)
}

fn finish_table(builder: Builder) -> String {
    builder.build().with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(data).map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}
