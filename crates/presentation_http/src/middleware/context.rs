//! Context enrichment
//!
//! Turns request headers and the URL into a [`RequestContext`]. The values
//! are rendering hints only and are copied without validation.

use application::RequestContext;
use axum::http::{HeaderMap, request::Parts};
use domain::{Identity, SiteId};
use uuid::Uuid;

use super::access_log::RequestId;

/// Header set by htmx on boosted navigations
pub const HX_BOOSTED: &str = "hx-boosted";

/// Header set by htmx on every htmx request
pub const HX_REQUEST: &str = "hx-request";

/// Header carrying the browser's current URL on htmx requests
pub const HX_CURRENT_URL: &str = "hx-current-url";

fn flag(headers: &HeaderMap, name: &str) -> bool {
    headers.get(name).is_some_and(|v| v.as_bytes() == b"true")
}

/// Build the context for a request that passed the gate
///
/// The site comes from the identity when it has one, otherwise from the
/// configured default.
pub fn enrich(
    parts: &Parts,
    identity: Option<Identity>,
    default_site: Option<SiteId>,
) -> RequestContext {
    let headers = &parts.headers;
    let request_id = parts
        .extensions
        .get::<RequestId>()
        .map_or_else(Uuid::now_v7, RequestId::as_uuid);
    let site_id = identity
        .as_ref()
        .and_then(|i| i.site_id)
        .or(default_site);
    let previous_url = headers
        .get(HX_CURRENT_URL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    RequestContext::builder(parts.uri.path())
        .request_id(request_id)
        .site_id(site_id)
        .boosted(flag(headers, HX_BOOSTED))
        .partial_request(flag(headers, HX_REQUEST))
        .previous_url(previous_url)
        .identity(identity)
        .build()
}
