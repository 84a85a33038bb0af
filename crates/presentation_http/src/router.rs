//! Gateway router
//!
//! Every route is registered together with its access rule. The rule is
//! fixed at registration time and applied by a per-route [`GateLayer`];
//! unregistered paths never pass through the gate.
//!
//! ```rust,ignore
//! let app = GatewayRouter::new(state)
//!     .get("/", pages::home, RoutePolicy::Open)
//!     .get("/invoices/{id}", invoices::show, RoutePolicy::Secure.redirect_anonymous())
//!     .post("/invoices", invoices::create, RoutePolicy::Secure)
//!     .rpc("/rpc", rpc_service, RoutePolicy::Secure)
//!     .into_router();
//! ```

use std::convert::Infallible;

use axum::{
    Extension, Router,
    extract::Request,
    handler::Handler,
    response::IntoResponse,
    routing::{MethodRouter, delete, get, options, patch, post, put},
};
use domain::{RouteAccess, RoutePolicy};
use tower::{Layer, Service};
use tracing::info;

use crate::middleware::{AccessLogLayer, GateLayer};
use crate::rpc::RpcAuthLayer;
use crate::state::AppState;

/// Router whose registrations carry an access rule
#[derive(Debug)]
pub struct GatewayRouter<S = ()> {
    router: Router<S>,
    state: AppState,
}

macro_rules! verb {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name<H, T>(self, path: &str, handler: H, access: impl Into<RouteAccess>) -> Self
        where
            H: Handler<T, S>,
            T: 'static,
        {
            self.register(path, $name(handler), access.into())
        }
    };
}

impl GatewayRouter {
    /// Create an empty router without application state
    pub fn new(state: AppState) -> Self {
        Self::from_router(Router::new(), state)
    }
}

impl<S> GatewayRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Register gated routes on an existing router
    pub const fn from_router(router: Router<S>, state: AppState) -> Self {
        Self { router, state }
    }

    /// Gateway state used by the gate and views
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    fn register(mut self, path: &str, method_router: MethodRouter<S>, access: RouteAccess) -> Self {
        let gated = method_router.route_layer(GateLayer::new(self.state.clone(), access));
        self.router = self.router.route(path, gated);
        self
    }

    verb!(
        /// Register a GET handler
        get
    );
    verb!(
        /// Register a POST handler
        post
    );
    verb!(
        /// Register a PUT handler
        put
    );
    verb!(
        /// Register a PATCH handler
        patch
    );
    verb!(
        /// Register a DELETE handler
        delete
    );
    verb!(
        /// Register an OPTIONS handler
        options
    );

    /// Mount an RPC service under a path prefix
    #[must_use]
    pub fn rpc<T>(mut self, prefix: &str, service: T, policy: RoutePolicy) -> Self
    where
        T: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        T::Response: IntoResponse,
        T::Future: Send + 'static,
    {
        info!(prefix, %policy, "Mounting RPC service");
        let service = RpcAuthLayer::new(self.state.clone(), policy).layer(service);
        self.router = self.router.nest_service(prefix, service);
        self
    }

    /// Merge routes that manage their own access, such as static assets
    #[must_use]
    pub fn merge_open(mut self, other: Router<S>) -> Self {
        self.router = self.router.merge(other);
        self
    }

    /// Finish registration
    ///
    /// Adds the gateway state for views and the access log around every
    /// route.
    pub fn into_router(self) -> Router<S> {
        self.router
            .layer(Extension(self.state))
            .layer(AccessLogLayer::new())
    }
}
