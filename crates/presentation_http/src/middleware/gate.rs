//! Per-route gate middleware
//!
//! Runs, in order: the canonical host redirect, the authentication gate and
//! context enrichment. Exactly one of these happens per request: a 301 to
//! the canonical host, a 403 error report, a 303 to the login path, or the
//! wrapped handler running with a [`RequestContext`](application::RequestContext)
//! in its extensions.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use application::{
    GateDecision, GatewaySettings, RequestTarget, canonical_redirect, ports::Credentials,
};
use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, COOKIE, HOST},
        request::Parts,
    },
    response::Response,
};
use domain::RouteAccess;
use tower::{Layer, Service};
use tracing::debug;

use super::context;
use crate::state::AppState;
use crate::view::View;

/// Cookie holding the session token
pub const SESSION_COOKIE: &str = "session";

/// Layer applying the gate with a fixed access rule
#[derive(Debug, Clone)]
pub struct GateLayer {
    state: AppState,
    access: RouteAccess,
}

impl GateLayer {
    /// Create a gate layer for one route registration
    pub fn new(state: AppState, access: impl Into<RouteAccess>) -> Self {
        Self {
            state,
            access: access.into(),
        }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateService {
            inner,
            state: self.state.clone(),
            access: self.access,
        }
    }
}

/// Service produced by [`GateLayer`]
#[derive(Debug, Clone)]
pub struct GateService<S> {
    inner: S,
    state: AppState,
    access: RouteAccess,
}

impl<S> Service<Request<Body>> for GateService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let access = self.access;
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (mut parts, body) = request.into_parts();

            if let Some(location) = canonical_location(&state.settings, &parts) {
                debug!(%location, "Redirecting to canonical host");
                return Ok(permanent_redirect(state, &parts.headers, &location));
            }

            let credentials = credentials(&parts.headers);
            match state.gate.decide(access, &credentials).await {
                GateDecision::Proceed { identity } => {
                    let ctx = context::enrich(&parts, identity, state.settings.default_site_id);
                    parts.extensions.insert(ctx);
                    inner.call(Request::from_parts(parts, body)).await
                },
                GateDecision::Reject(rejection) => {
                    let view = View::new(Some(state.clone()), accept(&parts.headers), None);
                    Ok(view.error_at(
                        rejection.site,
                        StatusCode::FORBIDDEN,
                        rejection.friendly,
                        [rejection.error],
                    ))
                },
                GateDecision::RedirectToLogin => {
                    let login = state.settings.login_path.clone();
                    let view = View::new(Some(state), accept(&parts.headers), None);
                    Ok(view.redirect(&login, StatusCode::SEE_OTHER))
                },
            }
        })
    }
}

/// Redirect location when the request is not on the canonical host
fn canonical_location(settings: &GatewaySettings, parts: &Parts) -> Option<String> {
    let host = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))
        .unwrap_or_default();
    let target = RequestTarget::new(host, parts.uri.path()).with_query(parts.uri.query());
    canonical_redirect(settings, &target)
}

fn permanent_redirect(state: AppState, headers: &HeaderMap, location: &str) -> Response {
    View::new(Some(state), accept(headers), None).redirect(location, StatusCode::MOVED_PERMANENTLY)
}

fn accept(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Credentials presented by the request
pub fn credentials(headers: &HeaderMap) -> Credentials {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let session_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string());

    Credentials {
        authorization,
        session_cookie,
    }
}
