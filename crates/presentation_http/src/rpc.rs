//! Authenticated RPC mount
//!
//! Wraps an RPC service with the route policy check. Authenticated requests
//! reach the service with an [`RpcContext`] in their extensions; rejected
//! ones get the RPC error envelope instead of an error page:
//!
//! ```text
//! HTTP/1.1 401 Unauthorized
//! {"code":"unauthenticated","msg":"not logged in"}
//! ```

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use application::{RpcContext, RpcDecision};
use axum::{
    Json,
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::RoutePolicy;
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};
use tracing::debug;

use crate::middleware::gate::credentials;
use crate::state::AppState;

/// Error code sent when authentication fails
pub const UNAUTHENTICATED: &str = "unauthenticated";

/// RPC error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Machine readable code
    pub code: String,
    /// Human readable detail
    pub msg: String,
}

impl RpcError {
    /// Authentication failure
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self {
            code: UNAUTHENTICATED.to_string(),
            msg: msg.into(),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = if self.code == UNAUTHENTICATED {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

/// Layer applying an RPC mount's policy
#[derive(Debug, Clone)]
pub struct RpcAuthLayer {
    state: AppState,
    policy: RoutePolicy,
}

impl RpcAuthLayer {
    /// Create the layer for one mount
    pub fn new(state: AppState, policy: RoutePolicy) -> Self {
        Self { state, policy }
    }
}

impl<S> Layer<S> for RpcAuthLayer {
    type Service = RpcAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RpcAuth {
            inner,
            state: self.state.clone(),
            policy: self.policy,
        }
    }
}

/// Service produced by [`RpcAuthLayer`]
#[derive(Debug, Clone)]
pub struct RpcAuth<S> {
    inner: S,
    state: AppState,
    policy: RoutePolicy,
}

impl<S> Service<Request<Body>> for RpcAuth<S>
where
    S: Service<Request<Body>> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let policy = self.policy;
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let credentials = credentials(request.headers());
            let decision = state
                .gate
                .decide_rpc(policy, &credentials, state.settings.default_site_id)
                .await;

            match decision {
                RpcDecision::Authenticated(ctx) => {
                    debug!(site_id = %ctx.site_id, "RPC request authenticated");
                    request.extensions_mut().insert::<RpcContext>(ctx);
                },
                RpcDecision::Unchecked => {},
                RpcDecision::Unauthenticated(msg) => {
                    return Ok(RpcError::unauthenticated(msg).into_response());
                },
            }

            inner.call(request).await.map(IntoResponse::into_response)
        })
    }
}
