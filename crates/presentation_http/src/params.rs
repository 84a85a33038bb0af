//! Request parameter extraction
//!
//! [`Params`] collects route parameters and the query string once per
//! request. Single-value lookups try the route parameters first, then the
//! query string; an empty value counts as missing. Values are percent-decoded
//! exactly once.

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use chrono::{DateTime, FixedOffset, NaiveDate};
use domain::value_objects::params::{
    parse_bool, parse_int, parse_int_or, parse_ints, parse_short_date, parse_site_id,
    parse_timestamp,
};
use domain::{DomainError, SiteId};

use crate::error::ApiError;

/// Typed access to route and query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    path: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Routes without captures (and nested services) carry no path params
        let path = RawPathParams::from_request_parts(parts, state)
            .await
            .map(|raw| {
                raw.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let query = match parts.uri.query() {
            Some(q) => serde_urlencoded::from_str(q)
                .map_err(|e| ApiError::BadRequest(format!("Malformed query string: {e}")))?,
            None => Vec::new(),
        };

        Ok(Self { path, query })
    }
}

impl Params {
    /// Build from already decoded pairs
    pub fn new<P, Q, K, V>(path: P, query: Q) -> Self
    where
        P: IntoIterator<Item = (K, V)>,
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let owned = |(k, v): (K, V)| (k.into(), v.into());
        Self {
            path: path.into_iter().map(owned).collect(),
            query: query.into_iter().map(owned).collect(),
        }
    }

    fn find<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Single value, route parameters first
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        Self::find(&self.path, key).or_else(|| Self::find(&self.query, key))
    }

    /// Single value that must be present
    pub fn require(&self, key: &str) -> Result<&str, DomainError> {
        self.string(key)
            .ok_or_else(|| DomainError::MissingParameter(key.to_string()))
    }

    /// Integer value
    pub fn int(&self, key: &str) -> Result<i64, DomainError> {
        parse_int(key, self.require(key)?)
    }

    /// Integer value, or `default` when missing or malformed
    #[must_use]
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        parse_int_or(self.string(key), default)
    }

    /// Boolean value; missing and unrecognised values are `false`
    #[must_use]
    pub fn bool(&self, key: &str) -> bool {
        self.string(key).is_some_and(parse_bool)
    }

    /// RFC 3339 timestamp
    pub fn timestamp(&self, key: &str) -> Result<DateTime<FixedOffset>, DomainError> {
        parse_timestamp(key, self.require(key)?)
    }

    /// Compact `YYYYMMDD` date
    pub fn short_date(&self, key: &str) -> Result<NaiveDate, DomainError> {
        parse_short_date(key, self.require(key)?)
    }

    /// Every value of a repeated parameter, in request order
    ///
    /// Query values are used when present, otherwise the route parameter.
    #[must_use]
    pub fn strings(&self, key: &str) -> Vec<&str> {
        let values: Vec<&str> = self
            .query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect();
        if values.is_empty() {
            Self::find(&self.path, key).into_iter().collect()
        } else {
            values
        }
    }

    /// Every value of a repeated parameter as integers
    pub fn ints(&self, key: &str) -> Result<Vec<i64>, DomainError> {
        parse_ints(key, self.strings(key))
    }

    /// Validated site identifier
    pub fn site_id(&self, key: &str) -> Result<SiteId, DomainError> {
        parse_site_id(key, self.require(key)?)
    }
}
