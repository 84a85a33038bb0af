//! Canonical host enforcement
//!
//! In production every request must arrive on the configured canonical host.
//! Requests on any other host are answered with a permanent redirect to the
//! same path, query and fragment on the canonical host.

use crate::settings::GatewaySettings;

/// Parts of the inbound request URL that survive a canonical redirect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    /// Value of the `Host` header
    pub host: &'a str,
    /// Request path, starting with `/`
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    /// Fragment without the leading `#`
    pub fragment: Option<&'a str>,
}

impl<'a> RequestTarget<'a> {
    /// Target with a host and a path
    #[must_use]
    pub const fn new(host: &'a str, path: &'a str) -> Self {
        Self {
            host,
            path,
            query: None,
            fragment: None,
        }
    }

    /// Attach the raw query string
    #[must_use]
    pub const fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query;
        self
    }

    /// Attach the fragment
    #[must_use]
    pub const fn with_fragment(mut self, fragment: Option<&'a str>) -> Self {
        self.fragment = fragment;
        self
    }
}

/// Decide whether the request must be redirected to the canonical host
///
/// Returns the absolute redirect location, or `None` when the request may
/// proceed. Hosts are compared case-insensitively with a trailing slash on
/// both sides, so `Example.COM` and `example.com/` are both canonical.
/// Empty query and fragment components are omitted from the location.
#[must_use]
pub fn canonical_redirect(settings: &GatewaySettings, target: &RequestTarget<'_>) -> Option<String> {
    if !settings.is_production() {
        return None;
    }
    let canonical = settings.canonical_host.as_deref()?;
    if canonical.is_empty() {
        return None;
    }

    if with_trailing_slash(target.host) == with_trailing_slash(canonical) {
        return None;
    }

    let scheme = if settings.is_https { "https" } else { "http" };
    let host = canonical.trim_end_matches('/');
    let mut location = format!("{scheme}://{host}{}", target.path);

    if let Some(query) = target.query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }
    if let Some(fragment) = target.fragment.filter(|f| !f.is_empty()) {
        location.push('#');
        location.push_str(fragment);
    }

    Some(location)
}

fn with_trailing_slash(host: &str) -> String {
    let mut normalized = host.trim().to_lowercase();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
