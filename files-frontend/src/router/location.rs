use axum::http::Uri;
use std::fmt;

/// A path plus its decoded query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Parse `path?query`. An undecodable query is dropped.
    pub fn parse(raw: &str) -> Self {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };

        Self {
            path: path.to_string(),
            query: query.map(decode_query).unwrap_or_default(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of `key` in the query.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Same query, different path.
    pub(crate) fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: self.query.clone(),
        }
    }

    /// Path followed by the encoded query, if any.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        match serde_urlencoded::to_string(&self.query) {
            Ok(query) => format!("{}?{}", self.path, query),
            Err(_) => self.path.clone(),
        }
    }
}

fn decode_query(query: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str(query).unwrap_or_default()
}

impl From<&Uri> for Location {
    fn from(uri: &Uri) -> Self {
        Self {
            path: uri.path().to_string(),
            query: uri.query().map(decode_query).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}
