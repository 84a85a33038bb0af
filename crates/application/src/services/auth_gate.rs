//! Authentication gate
//!
//! Decides, for one request on a route with a given [`RouteAccess`], whether
//! the handler may run. The decision is a value; writing the response is left
//! to the HTTP layer so that exactly one outcome is produced per request.

use std::sync::Arc;

use domain::{
    AnonymousDisposition, CallSite, Environment, Identity, RouteAccess, RoutePolicy,
    SessionIdentity, SiteId, call_site,
};
use tracing::{debug, instrument, warn};

use crate::ports::{Credentials, IdentityError, IdentityPort};
use crate::request_context::RpcContext;

/// Friendly message for malformed, missing or expired credentials
pub const LOGIN_EXPIRED: &str = "Login Expired";

/// Friendly message for identity backend failures
pub const AUTH_FAILURE: &str = "Auth Failure";

/// Friendly message for anonymous callers on disallowing routes
pub const NOT_LOGGED_IN: &str = "You're not currently logged in";

/// Detail sent with RPC rejections
pub const RPC_NOT_LOGGED_IN: &str = "not logged in";

/// A rejected request, ready to be reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRejection {
    /// Message meant for a person
    pub friendly: &'static str,
    /// Underlying failure, `None` when nothing failed technically
    pub error: Option<String>,
    /// Where the rejection was decided
    pub site: CallSite,
}

/// Outcome of the gate for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Run the handler, with the identity when one was resolved
    Proceed {
        /// Resolved identity, `None` for open or bypassed routes and anonymous callers
        identity: Option<Identity>,
    },
    /// Report a 403 failure and do not run the handler
    Reject(GateRejection),
    /// Send the anonymous caller to the login page with a 303
    RedirectToLogin,
}

impl GateDecision {
    const fn proceed(identity: Option<Identity>) -> Self {
        Self::Proceed { identity }
    }

    /// Whether the handler will run
    #[must_use]
    pub const fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed { .. })
    }
}

/// Outcome of the gate for one RPC request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcDecision {
    /// Delegate with the authenticated context
    Authenticated(RpcContext),
    /// Delegate without any authentication
    Unchecked,
    /// Answer with the RPC layer's unauthenticated error
    Unauthenticated(String),
}

/// Route-level authentication policy evaluation
#[derive(Clone)]
pub struct AuthGate {
    identity: Arc<dyn IdentityPort>,
    environment: Environment,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    /// Create a gate backed by an identity lookup
    pub fn new(identity: Arc<dyn IdentityPort>, environment: Environment) -> Self {
        Self {
            identity,
            environment,
        }
    }

    /// Environment the gate evaluates policies in
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Evaluate the route policy for one page or API request
    #[instrument(skip(self, access, credentials), fields(policy = %access.policy))]
    pub async fn decide(&self, access: RouteAccess, credentials: &Credentials) -> GateDecision {
        if access.policy.bypasses_lookup(self.environment) {
            debug!("Route policy skips identity lookup");
            return GateDecision::proceed(None);
        }

        match self.identity.lookup(credentials).await {
            Ok(SessionIdentity::Authenticated(identity)) => GateDecision::proceed(Some(identity)),
            Ok(SessionIdentity::Anonymous) => match access.disposition {
                AnonymousDisposition::Redirect => GateDecision::RedirectToLogin,
                AnonymousDisposition::Disallow => GateDecision::Reject(GateRejection {
                    friendly: NOT_LOGGED_IN,
                    error: None,
                    site: call_site!(),
                }),
            },
            Err(err) => {
                let friendly = match err {
                    IdentityError::InvalidCredentials(_) | IdentityError::Expired(_) => {
                        LOGIN_EXPIRED
                    },
                    IdentityError::Backend(_) => AUTH_FAILURE,
                };
                GateDecision::Reject(GateRejection {
                    friendly,
                    error: Some(err.to_string()),
                    site: call_site!(),
                })
            },
        }
    }

    /// Evaluate the policy of an RPC mount
    ///
    /// Authenticated mounts need both an identity and a site; the fallback
    /// site is used when the identity carries none.
    #[instrument(skip(self, credentials, fallback_site))]
    pub async fn decide_rpc(
        &self,
        policy: RoutePolicy,
        credentials: &Credentials,
        fallback_site: Option<SiteId>,
    ) -> RpcDecision {
        match policy {
            RoutePolicy::Open => return RpcDecision::Unchecked,
            RoutePolicy::Todo if !self.environment.is_production() => {
                warn!("RPC mount is marked TODO; skipping authentication outside production");
                return RpcDecision::Unchecked;
            },
            RoutePolicy::Todo | RoutePolicy::Secure => {},
        }

        let identity = match self.identity.lookup(credentials).await {
            Ok(SessionIdentity::Authenticated(identity)) => identity,
            Ok(SessionIdentity::Anonymous) => {
                return RpcDecision::Unauthenticated(RPC_NOT_LOGGED_IN.to_string());
            },
            Err(err) => {
                debug!(error = %err, "RPC identity lookup failed");
                return RpcDecision::Unauthenticated(err.to_string());
            },
        };

        let Some(site_id) = identity.site_id.or(fallback_site) else {
            return RpcDecision::Unauthenticated(RPC_NOT_LOGGED_IN.to_string());
        };

        RpcDecision::Authenticated(RpcContext {
            authorization: credentials.authorization.clone().unwrap_or_default(),
            site_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockIdentityPort;

    fn gate(mock: MockIdentityPort, environment: Environment) -> AuthGate {
        AuthGate::new(Arc::new(mock), environment)
    }

    fn never_called() -> MockIdentityPort {
        let mut mock = MockIdentityPort::new();
        mock.expect_lookup().never();
        mock
    }

    fn answering(
        result: impl Fn() -> Result<SessionIdentity, IdentityError> + Send + 'static,
    ) -> MockIdentityPort {
        let mut mock = MockIdentityPort::new();
        mock.expect_lookup().times(1).returning(move |_| result());
        mock
    }

    fn alice() -> Identity {
        Identity::new("alice")
    }

    #[tokio::test]
    async fn open_routes_never_look_up() {
        for env in [Environment::Development, Environment::Production] {
            let decision = gate(never_called(), env)
                .decide(RoutePolicy::Open.into(), &Credentials::default())
                .await;
            assert_eq!(decision, GateDecision::Proceed { identity: None });
        }
    }

    #[tokio::test]
    async fn todo_in_development_never_looks_up() {
        let decision = gate(never_called(), Environment::Development)
            .decide(RoutePolicy::Todo.into(), &Credentials::default())
            .await;
        assert!(decision.is_proceed());
    }

    #[tokio::test]
    async fn todo_in_production_behaves_as_secure() {
        let decision = gate(
            answering(|| Ok(SessionIdentity::Anonymous)),
            Environment::Production,
        )
        .decide(RoutePolicy::Todo.into(), &Credentials::default())
        .await;
        match decision {
            GateDecision::Reject(rejection) => assert_eq!(rejection.friendly, NOT_LOGGED_IN),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolved_identity_always_proceeds() {
        for access in [
            RoutePolicy::Secure.disallow_anonymous(),
            RoutePolicy::Secure.redirect_anonymous(),
            RoutePolicy::Todo.disallow_anonymous(),
        ] {
            let decision = gate(
                answering(|| Ok(SessionIdentity::Authenticated(alice()))),
                Environment::Production,
            )
            .decide(access, &Credentials::bearer("Bearer k"))
            .await;
            assert_eq!(decision, GateDecision::Proceed { identity: Some(alice()) });
        }
    }

    #[tokio::test]
    async fn anonymous_with_redirect_disposition_goes_to_login() {
        let decision = gate(
            answering(|| Ok(SessionIdentity::Anonymous)),
            Environment::Production,
        )
        .decide(RoutePolicy::Secure.redirect_anonymous(), &Credentials::default())
        .await;
        assert_eq!(decision, GateDecision::RedirectToLogin);
    }

    #[tokio::test]
    async fn anonymous_with_disallow_disposition_is_rejected_without_detail() {
        let decision = gate(
            answering(|| Ok(SessionIdentity::Anonymous)),
            Environment::Production,
        )
        .decide(RoutePolicy::Secure.into(), &Credentials::default())
        .await;
        let GateDecision::Reject(rejection) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.friendly, NOT_LOGGED_IN);
        assert_eq!(rejection.error, None);
        assert!(rejection.site.function().contains("decide"));
    }

    #[tokio::test]
    async fn credential_and_expiry_failures_report_login_expired() {
        let failures: [fn() -> IdentityError; 2] = [
            || IdentityError::InvalidCredentials("bad header".into()),
            || IdentityError::Expired("no entry".into()),
        ];
        for err in failures {
            let decision = gate(answering(move || Err(err())), Environment::Production)
                .decide(RoutePolicy::Secure.into(), &Credentials::bearer("junk"))
                .await;
            let GateDecision::Reject(rejection) = decision else {
                panic!("expected rejection");
            };
            assert_eq!(rejection.friendly, LOGIN_EXPIRED);
            assert!(rejection.error.is_some());
        }
    }

    #[tokio::test]
    async fn backend_failure_reports_auth_failure() {
        let decision = gate(
            answering(|| Err(IdentityError::Backend("store offline".into()))),
            Environment::Production,
        )
        .decide(RoutePolicy::Secure.into(), &Credentials::bearer("Bearer k"))
        .await;
        let GateDecision::Reject(rejection) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.friendly, AUTH_FAILURE);
        assert_eq!(
            rejection.error.as_deref(),
            Some("Identity lookup failed: store offline")
        );
    }

    #[tokio::test]
    async fn rpc_open_and_dev_todo_skip_lookup() {
        let gate = gate(never_called(), Environment::Development);
        let creds = Credentials::default();
        assert_eq!(
            gate.decide_rpc(RoutePolicy::Open, &creds, None).await,
            RpcDecision::Unchecked
        );
        assert_eq!(
            gate.decide_rpc(RoutePolicy::Todo, &creds, None).await,
            RpcDecision::Unchecked
        );
    }

    #[tokio::test]
    async fn rpc_secure_attaches_authorization_and_site() {
        let site = SiteId::new();
        let decision = gate(
            answering(move || Ok(SessionIdentity::Authenticated(alice().with_site(site)))),
            Environment::Production,
        )
        .decide_rpc(RoutePolicy::Secure, &Credentials::bearer("Bearer k"), None)
        .await;
        assert_eq!(
            decision,
            RpcDecision::Authenticated(RpcContext {
                authorization: "Bearer k".to_string(),
                site_id: site,
            })
        );
    }

    #[tokio::test]
    async fn rpc_secure_uses_fallback_site() {
        let fallback = SiteId::new();
        let decision = gate(
            answering(|| Ok(SessionIdentity::Authenticated(alice()))),
            Environment::Production,
        )
        .decide_rpc(RoutePolicy::Secure, &Credentials::bearer("Bearer k"), Some(fallback))
        .await;
        let RpcDecision::Authenticated(ctx) = decision else {
            panic!("expected authenticated");
        };
        assert_eq!(ctx.site_id, fallback);
    }

    #[tokio::test]
    async fn rpc_secure_without_site_is_unauthenticated() {
        let decision = gate(
            answering(|| Ok(SessionIdentity::Authenticated(alice()))),
            Environment::Production,
        )
        .decide_rpc(RoutePolicy::Secure, &Credentials::bearer("Bearer k"), None)
        .await;
        assert_eq!(
            decision,
            RpcDecision::Unauthenticated(RPC_NOT_LOGGED_IN.to_string())
        );
    }

    #[tokio::test]
    async fn rpc_lookup_failure_is_unauthenticated() {
        let decision = gate(
            answering(|| Err(IdentityError::Expired("gone".into()))),
            Environment::Production,
        )
        .decide_rpc(RoutePolicy::Todo, &Credentials::bearer("Bearer k"), None)
        .await;
        assert!(matches!(decision, RpcDecision::Unauthenticated(_)));
    }
}
