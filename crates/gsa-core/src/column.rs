// ── Monitor columns ──
//
// A column names where one dashboard value comes from and how the raw
// property string is coerced. Remote columns are fetched per refresh;
// `Host` and `Selection` are filled locally from row state.

use std::fmt;

use gsa_api::terms::{entries, feeds, properties};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Reported for an integer column whose row failed to refresh.
pub const ERROR_INTEGER: i64 = -99_999;
/// Reported for a decimal column whose row failed to refresh.
pub const ERROR_DECIMAL: f64 = -99_999.9999;

/// Expected type of a column's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Flag,
    Integer,
    Decimal,
}

impl ColumnKind {
    /// Sentinel substituted on refresh failure. Only numeric kinds have one;
    /// text and flag columns keep their last known value.
    pub fn sentinel(self) -> Option<ColumnValue> {
        match self {
            Self::Integer => Some(ColumnValue::Integer(ERROR_INTEGER)),
            Self::Decimal => Some(ColumnValue::Decimal(ERROR_DECIMAL)),
            Self::Text | Self::Flag => None,
        }
    }
}

/// Where a column's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ColumnSource {
    /// The row's `host:port`.
    Host,
    /// The operator's selection flag.
    Selection,
    /// One property of one entry of one feed.
    Remote {
        feed: String,
        entry: String,
        property: String,
    },
}

impl ColumnSource {
    pub fn remote(feed: &str, entry: &str, property: &str) -> Self {
        Self::Remote {
            feed: feed.to_owned(),
            entry: entry.to_owned(),
            property: property.to_owned(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub header: String,
    #[serde(flatten)]
    pub source: ColumnSource,
    pub kind: ColumnKind,
    /// An empty property reads as zero instead of failing the row.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub empty_as_zero: bool,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, source: ColumnSource, kind: ColumnKind) -> Self {
        Self {
            header: header.into(),
            source,
            kind,
            empty_as_zero: false,
        }
    }

    pub fn empty_as_zero(mut self) -> Self {
        self.empty_as_zero = true;
        self
    }

    /// Coerce a raw property string into this column's kind.
    pub fn coerce(&self, raw: &str) -> Result<ColumnValue, CoreError> {
        if self.empty_as_zero && raw.is_empty() {
            match self.kind {
                ColumnKind::Integer => return Ok(ColumnValue::Integer(0)),
                ColumnKind::Decimal => return Ok(ColumnValue::Decimal(0.0)),
                ColumnKind::Text | ColumnKind::Flag => {}
            }
        }
        coerce(self.kind, raw).ok_or_else(|| CoreError::InvalidValue {
            column: self.header.clone(),
            value: raw.to_owned(),
            expected: self.kind.to_string(),
        })
    }
}

/// The crawl dashboard: host, selection, crawl state, document limit,
/// found/served counts and crawl rate.
pub fn dashboard_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("Host", ColumnSource::Host, ColumnKind::Text),
        ColumnSpec::new("Selected", ColumnSource::Selection, ColumnKind::Flag),
        ColumnSpec::new(
            "Crawl Paused",
            ColumnSource::remote(feeds::COMMAND, entries::PAUSE_CRAWL, properties::PAUSE_CRAWL),
            ColumnKind::Flag,
        ),
        ColumnSpec::new(
            "Doc Limit",
            ColumnSource::remote(feeds::CONFIG, entries::HOST_LOAD, properties::MAX_URLS),
            ColumnKind::Integer,
        )
        .empty_as_zero(),
        ColumnSpec::new(
            "Docs Found",
            ColumnSource::remote(feeds::STATUS, entries::DOCUMENT_STATUS, properties::FOUND_URLS),
            ColumnKind::Integer,
        ),
        ColumnSpec::new(
            "Docs Served",
            ColumnSource::remote(feeds::STATUS, entries::DOCUMENT_STATUS, properties::SERVED_URLS),
            ColumnKind::Integer,
        ),
        ColumnSpec::new(
            "Crawl Rate",
            ColumnSource::remote(
                feeds::STATUS,
                entries::DOCUMENT_STATUS,
                properties::CRAWL_PAGES_PER_SECOND,
            ),
            ColumnKind::Decimal,
        ),
    ]
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Decimal(f64),
}

impl ColumnValue {
    /// Whether this value is the failure sentinel of its kind.
    #[allow(clippy::float_cmp)]
    pub fn is_sentinel(&self) -> bool {
        match self {
            Self::Integer(v) => *v == ERROR_INTEGER,
            Self::Decimal(v) => *v == ERROR_DECIMAL,
            Self::Text(_) | Self::Flag(_) => false,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => f.write_str(if *b { "yes" } else { "no" }),
            Self::Integer(v) => write!(f, "{v}"),
            // Rounding would turn the sentinel into -100000.00.
            Self::Decimal(_) if self.is_sentinel() => write!(f, "{ERROR_DECIMAL}"),
            Self::Decimal(v) => write!(f, "{v:.2}"),
        }
    }
}

/// Coerce a raw property string.
///
/// - Flag: an integer, non-zero meaning `true`.
/// - Integer: thousands separators stripped.
/// - Decimal: thousands separators stripped, surrounding whitespace ignored.
///
/// Empty input fails for every numeric kind; see [`ColumnSpec::empty_as_zero()`].
pub fn coerce(kind: ColumnKind, raw: &str) -> Option<ColumnValue> {
    match kind {
        ColumnKind::Text => Some(ColumnValue::Text(raw.to_owned())),
        ColumnKind::Flag => raw.parse::<i64>().ok().map(|n| ColumnValue::Flag(n != 0)),
        ColumnKind::Integer => raw
            .replace(',', "")
            .parse()
            .ok()
            .map(ColumnValue::Integer),
        ColumnKind::Decimal => raw
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ColumnValue::Decimal),
    }
}
