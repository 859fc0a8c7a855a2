//! One decoded trade-log row.
//!
//! Trade logs come from several exporters with no agreed column set, so a
//! record is an ordered list of string values keyed by a shared [`Header`]
//! rather than a fixed struct. The header carries both the exact and the
//! lowercased lookup index, built once per decoded file and shared by every
//! row through an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Column names of a trade log plus their lookup indexes.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        let mut exact = HashMap::with_capacity(columns.len());
        let mut folded = HashMap::with_capacity(columns.len());
        // Later duplicates shadow earlier ones, same as assigning into a map.
        for (i, name) in columns.iter().enumerate() {
            exact.insert(name.clone(), i);
            folded.insert(name.to_lowercase(), i);
        }
        Self {
            columns,
            exact,
            folded,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column index for an exact name match.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.exact.get(name).copied()
    }

    /// Column index ignoring case.
    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        self.folded.get(&name.to_lowercase()).copied()
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Header").field(&self.columns).finish()
    }
}

/// A single trade-log row. Immutable once built.
#[derive(Clone)]
pub struct TradeRecord {
    header: Arc<Header>,
    values: Vec<String>,
}

impl TradeRecord {
    /// Build a record against a shared header.
    ///
    /// Values beyond the header width are dropped; missing trailing values
    /// become empty strings.
    pub fn new(header: Arc<Header>, mut values: Vec<String>) -> Self {
        values.resize(header.len(), String::new());
        Self { header, values }
    }

    /// Build a standalone record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(Arc::new(Header::new(columns)), values)
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    pub fn columns(&self) -> &[String] {
        self.header.columns()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of an exactly-named column.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.header
            .position(name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Value of a column, matching the name case-insensitively.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.header
            .position_ignore_case(name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .columns()
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PartialEq for TradeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.columns() == other.columns() && self.values == other.values
    }
}

impl fmt::Debug for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
