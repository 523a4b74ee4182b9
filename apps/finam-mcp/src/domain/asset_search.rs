//! Asset Search
//!
//! The Finam asset listing is returned whole, unfiltered and in no
//! particular order. [`AssetQuery::apply`] turns it into a deterministic
//! page: sort by identifier, keep records that pass every supplied filter,
//! then skip `offset` and take `limit`.

use serde::{Deserialize, Serialize};

use super::enums::{AssetType, WireEnum};

/// Default page size.
pub const DEFAULT_LIMIT: usize = 50;

/// Read access to the fields an asset search filters on.
pub trait AssetRecord {
    /// Stable unique identifier; the sole sort key.
    fn id(&self) -> &str;
    /// Full symbol, `TICKER@MIC`.
    fn symbol(&self) -> &str;
    /// Exchange ticker.
    fn ticker(&self) -> &str;
    /// Market identifier code.
    fn mic(&self) -> &str;
    /// Human-readable name.
    fn name(&self) -> &str;
    /// Instrument type as sent by the API.
    fn asset_type(&self) -> &str;
}

/// Filters and window for one search. Unset filters match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetQuery {
    /// Exact symbol match.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Case-insensitive substring of the ticker.
    #[serde(default)]
    pub ticker: Option<String>,
    /// Exact MIC match.
    #[serde(default)]
    pub mic: Option<String>,
    /// Case-insensitive substring of the name.
    #[serde(default)]
    pub name: Option<String>,
    /// Exact instrument type match.
    #[serde(default, rename = "type")]
    pub asset_type: Option<AssetType>,
    /// Page size.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Records to skip after filtering.
    #[serde(default)]
    pub offset: usize,
}

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for AssetQuery {
    fn default() -> Self {
        Self {
            symbol: None,
            ticker: None,
            mic: None,
            name: None,
            asset_type: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl AssetQuery {
    /// Set the page window.
    #[must_use]
    pub const fn with_window(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Set the ticker filter.
    #[must_use]
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Set the name filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the MIC filter.
    #[must_use]
    pub fn with_mic(mut self, mic: impl Into<String>) -> Self {
        self.mic = Some(mic.into());
        self
    }

    /// Set the symbol filter.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the instrument type filter.
    #[must_use]
    pub const fn with_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = Some(asset_type);
        self
    }

    /// Whether a record passes every supplied filter.
    pub fn matches<R: AssetRecord>(&self, record: &R) -> bool {
        exact(self.symbol.as_deref(), record.symbol())
            && exact(self.mic.as_deref(), record.mic())
            && exact(
                self.asset_type.map(WireEnum::name),
                record.asset_type(),
            )
            && contains_ignore_case(self.ticker.as_deref(), record.ticker())
            && contains_ignore_case(self.name.as_deref(), record.name())
    }

    /// Sort by identifier, filter, and cut the `offset`/`limit` window.
    pub fn apply<R: AssetRecord>(&self, mut records: Vec<R>) -> Vec<R> {
        records.sort_by(|a, b| a.id().cmp(b.id()));

        records
            .into_iter()
            .filter(|record| self.matches(record))
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

fn exact(filter: Option<&str>, value: &str) -> bool {
    match filter {
        None | Some("") => true,
        Some(expected) => expected == value,
    }
}

fn contains_ignore_case(filter: Option<&str>, value: &str) -> bool {
    match filter {
        None | Some("") => true,
        Some(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
    }
}
