//! Fakes shared by the unit tests of this crate

use std::sync::atomic::{AtomicUsize, Ordering};

use application::{
    ApplicationError,
    ports::{Credentials, IdentityError, IdentityPort, TemplateRenderer, ViewData},
};
use async_trait::async_trait;
use domain::{Identity, SessionIdentity};
use serde_json::Value;

#[derive(Debug, Clone)]
enum Outcome {
    Identity(Identity),
    Anonymous,
    Expired,
    Backend,
}

/// Identity lookup returning a fixed outcome and counting calls
#[derive(Debug)]
pub struct FixedIdentity {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl FixedIdentity {
    fn with(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn user(identity: Identity) -> Self {
        Self::with(Outcome::Identity(identity))
    }

    pub fn anonymous() -> Self {
        Self::with(Outcome::Anonymous)
    }

    pub fn expired() -> Self {
        Self::with(Outcome::Expired)
    }

    pub fn backend_failure() -> Self {
        Self::with(Outcome::Backend)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityPort for FixedIdentity {
    async fn lookup(&self, _credentials: &Credentials) -> Result<SessionIdentity, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Identity(identity) => Ok(SessionIdentity::Authenticated(identity.clone())),
            Outcome::Anonymous => Ok(SessionIdentity::Anonymous),
            Outcome::Expired => Err(IdentityError::Expired("no entry".to_string())),
            Outcome::Backend => Err(IdentityError::Backend("store down".to_string())),
        }
    }
}

/// Renderer with three hard-coded templates
///
/// - `hello`: `hello {Name}`
/// - `layout`: `[{yield}]`
/// - `error`: `error:{FriendlyError}|{NastyError}|status={ErrorCode}`
#[derive(Debug, Clone, Copy)]
pub struct StubRenderer;

fn field(data: &ViewData, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

impl StubRenderer {
    fn render_one(template: &str, data: &ViewData) -> Result<String, ApplicationError> {
        match template {
            "hello" => Ok(format!("hello {}", field(data, "Name"))),
            "layout" => Ok(format!("[{}]", field(data, "yield"))),
            "error" => Ok(format!(
                "error:{}|{}|status={}",
                field(data, "FriendlyError"),
                field(data, "NastyError"),
                field(data, "ErrorCode")
            )),
            other => Err(ApplicationError::Template(format!(
                "template '{other}' not found"
            ))),
        }
    }
}

impl TemplateRenderer for StubRenderer {
    fn render(
        &self,
        template: &str,
        data: &ViewData,
        layout: Option<&str>,
    ) -> Result<String, ApplicationError> {
        let inner = Self::render_one(template, data)?;
        match layout {
            Some(layout) => {
                let mut outer = data.clone();
                outer.insert("yield".to_string(), Value::String(inner));
                Self::render_one(layout, &outer)
            },
            None => Ok(inner),
        }
    }

    fn has_template(&self, name: &str) -> bool {
        matches!(name, "hello" | "layout" | "error")
    }
}
