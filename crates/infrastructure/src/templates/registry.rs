//! Template function registry
//!
//! Helper functions and filters are collected here at startup and copied
//! into every template engine built from the registry. Once the registry is
//! sealed, which happens when an engine is built from it, further
//! registrations fail with [`RegistryError::Sealed`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tera::{Filter, Function, Tera, Value};
use thiserror::Error;
use tracing::debug;

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Registration attempted after request serving started
    #[error("Template function registry is sealed, cannot register '{0}'")]
    Sealed(String),
}

/// Process-wide set of template helpers
#[derive(Default)]
pub struct TemplateFunctionRegistry {
    functions: RwLock<Vec<(String, Arc<dyn Function>)>>,
    filters: RwLock<Vec<(String, Arc<dyn Filter>)>>,
    sealed: AtomicBool,
}

impl std::fmt::Debug for TemplateFunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateFunctionRegistry")
            .field("functions", &self.function_names())
            .field("filters", &self.filter_names())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

impl TemplateFunctionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the default helper set
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        super::helpers::install(&registry);
        registry
    }

    /// Register a template function, replacing any previous one of the same name
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Sealed`] once the registry has been sealed.
    pub fn register_function<F>(&self, name: &str, function: F) -> Result<(), RegistryError>
    where
        F: Function + 'static,
    {
        let mut functions = self.functions.write();
        if self.is_sealed() {
            return Err(RegistryError::Sealed(name.to_string()));
        }
        let function: Arc<dyn Function> = Arc::new(function);
        upsert(&mut functions, name, function);
        debug!(name, "Registered template function");
        Ok(())
    }

    /// Register a template filter, replacing any previous one of the same name
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Sealed`] once the registry has been sealed.
    pub fn register_filter<F>(&self, name: &str, filter: F) -> Result<(), RegistryError>
    where
        F: Filter + 'static,
    {
        let mut filters = self.filters.write();
        if self.is_sealed() {
            return Err(RegistryError::Sealed(name.to_string()));
        }
        let filter: Arc<dyn Filter> = Arc::new(filter);
        upsert(&mut filters, name, filter);
        debug!(name, "Registered template filter");
        Ok(())
    }

    /// Forbid further registrations; there is no way back
    pub fn seal(&self) {
        let _functions = self.functions.write();
        let _filters = self.filters.write();
        self.sealed.store(true, Ordering::Release);
    }

    /// Whether registrations are still accepted
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Names of the registered functions
    #[must_use]
    pub fn function_names(&self) -> Vec<String> {
        self.functions.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Names of the registered filters
    #[must_use]
    pub fn filter_names(&self) -> Vec<String> {
        self.filters.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Copy every helper into a Tera instance
    pub(crate) fn install_into(&self, tera: &mut Tera) {
        for (name, function) in self.functions.read().iter() {
            tera.register_function(name, SharedFunction(Arc::clone(function)));
        }
        for (name, filter) in self.filters.read().iter() {
            tera.register_filter(name, SharedFilter(Arc::clone(filter)));
        }
    }
}

fn upsert<T: ?Sized>(entries: &mut Vec<(String, Arc<T>)>, name: &str, value: Arc<T>) {
    match entries.iter_mut().find(|(n, _)| n == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name.to_string(), value)),
    }
}

struct SharedFunction(Arc<dyn Function>);

impl Function for SharedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

struct SharedFilter(Arc<dyn Filter>);

impl Filter for SharedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.filter(value, args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(value.as_str().unwrap_or_default().to_uppercase()))
    }

    fn answer(_: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::from(42))
    }

    #[test]
    fn registration_before_seal_succeeds() {
        let registry = TemplateFunctionRegistry::new();
        assert!(registry.register_filter("shout", shout).is_ok());
        assert!(registry.register_function("answer", answer).is_ok());
        assert_eq!(registry.filter_names(), vec!["shout"]);
        assert_eq!(registry.function_names(), vec!["answer"]);
    }

    #[test]
    fn registration_after_seal_fails() {
        let registry = TemplateFunctionRegistry::new();
        registry.seal();
        assert!(registry.is_sealed());
        assert_eq!(
            registry.register_filter("shout", shout),
            Err(RegistryError::Sealed("shout".to_string()))
        );
        assert_eq!(
            registry.register_function("answer", answer),
            Err(RegistryError::Sealed("answer".to_string()))
        );
        assert!(registry.filter_names().is_empty());
    }

    #[test]
    fn same_name_replaces() {
        let registry = TemplateFunctionRegistry::new();
        registry.register_filter("shout", shout).unwrap();
        registry.register_filter("shout", shout).unwrap();
        assert_eq!(registry.filter_names().len(), 1);
    }

    #[test]
    fn installed_helpers_render() {
        let registry = TemplateFunctionRegistry::new();
        registry.register_filter("shout", shout).unwrap();
        registry.register_function("answer", answer).unwrap();

        let mut tera = Tera::default();
        registry.install_into(&mut tera);
        tera.add_raw_template("t", "{{ name | shout }} {{ answer() }}")
            .unwrap();

        let mut ctx = tera::Context::new();
        ctx.insert("name", "ada");
        assert_eq!(tera.render("t", &ctx).unwrap(), "ADA 42");
    }

    #[test]
    fn defaults_are_present() {
        let registry = TemplateFunctionRegistry::with_defaults();
        let filters = registry.filter_names();
        let functions = registry.function_names();
        for name in ["plain_to_html", "slugify", "currency", "json", "imagepath"] {
            assert!(filters.iter().any(|f| f == name), "missing filter {name}");
        }
        for name in ["javascript", "stylesheet", "image", "year", "icon"] {
            assert!(functions.iter().any(|f| f == name), "missing function {name}");
        }
        assert!(!registry.is_sealed());
    }
}
