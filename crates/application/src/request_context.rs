//! Request-scoped context bags
//!
//! [`RequestContext`] is attached once per request after the authentication
//! gate lets it through and is read-only afterwards. [`RpcContext`] is the
//! equivalent for requests entering through an authenticated RPC mount.
//!
//! # Examples
//!
//! ```
//! use application::RequestContext;
//!
//! let ctx = RequestContext::builder("/invoices")
//!     .boosted(true)
//!     .previous_url("https://example.com/")
//!     .build();
//!
//! assert!(ctx.is_layout_skipped());
//! assert_eq!(ctx.current_path(), "/invoices");
//! ```

use domain::{Identity, SiteId};
use serde::Serialize;
use uuid::Uuid;

/// Metadata about one request, readable by downstream handlers
///
/// Serialized in PascalCase so templates can read `Context.CurrentUrlPath`
/// and friends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestContext {
    request_id: Uuid,
    site_id: Option<SiteId>,
    current_url_path: String,
    is_layout_skipped: bool,
    is_boosted: bool,
    is_partial_request: bool,
    previous_url: String,
    #[serde(skip)]
    identity: Option<Identity>,
}

impl RequestContext {
    /// Start building a context for the given path
    pub fn builder(current_path: impl Into<String>) -> RequestContextBuilder {
        RequestContextBuilder {
            request_id: None,
            site_id: None,
            current_path: current_path.into(),
            is_boosted: false,
            is_partial_request: false,
            previous_url: String::new(),
            identity: None,
        }
    }

    /// Unique request identifier used for log correlation
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Site the request is served for
    #[must_use]
    pub const fn site_id(&self) -> Option<SiteId> {
        self.site_id
    }

    /// Path of the current request
    #[must_use]
    pub fn current_path(&self) -> &str {
        &self.current_url_path
    }

    /// Whether the page layout should be skipped (boosted or partial request)
    #[must_use]
    pub const fn is_layout_skipped(&self) -> bool {
        self.is_layout_skipped
    }

    /// Whether this is a boosted navigation
    #[must_use]
    pub const fn is_boosted(&self) -> bool {
        self.is_boosted
    }

    /// Whether this is a partial-content request
    #[must_use]
    pub const fn is_partial_request(&self) -> bool {
        self.is_partial_request
    }

    /// URL the client reported as its current page, verbatim
    #[must_use]
    pub fn previous_url(&self) -> &str {
        &self.previous_url
    }

    /// Logged-in identity, when the gate resolved one
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Builder for [`RequestContext`]
#[derive(Debug, Clone)]
pub struct RequestContextBuilder {
    request_id: Option<Uuid>,
    site_id: Option<SiteId>,
    current_path: String,
    is_boosted: bool,
    is_partial_request: bool,
    previous_url: String,
    identity: Option<Identity>,
}

impl RequestContextBuilder {
    /// Reuse a request ID issued upstream
    #[must_use]
    pub const fn request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Set the site
    #[must_use]
    pub const fn site_id(mut self, site_id: Option<SiteId>) -> Self {
        self.site_id = site_id;
        self
    }

    /// Mark the request as a boosted navigation
    #[must_use]
    pub const fn boosted(mut self, boosted: bool) -> Self {
        self.is_boosted = boosted;
        self
    }

    /// Mark the request as a partial-content request
    #[must_use]
    pub const fn partial_request(mut self, partial: bool) -> Self {
        self.is_partial_request = partial;
        self
    }

    /// Record the client's current URL
    #[must_use]
    pub fn previous_url(mut self, url: impl Into<String>) -> Self {
        self.previous_url = url.into();
        self
    }

    /// Attach the resolved identity
    #[must_use]
    pub fn identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Finish the context; the layout flag is derived from the two request flags
    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            request_id: self.request_id.unwrap_or_else(Uuid::now_v7),
            site_id: self.site_id,
            current_url_path: self.current_path,
            is_layout_skipped: self.is_boosted || self.is_partial_request,
            is_boosted: self.is_boosted,
            is_partial_request: self.is_partial_request,
            previous_url: self.previous_url,
            identity: self.identity,
        }
    }
}

/// Context attached to requests entering an authenticated RPC mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcContext {
    /// Raw `Authorization` header value
    pub authorization: String,
    /// Site of the authenticated user
    pub site_id: SiteId,
}
