//! Parameters shared by every bridged invocation

use crate::config::Config;
use crate::store::{EmbeddedStore, ResourceStore};

/// Type alias for the host assertion hook
///
/// Called with the pass/fail outcome and a message after the sandbox has been
/// cleaned up.
pub type AssertFn = Box<dyn Fn(bool, &str)>;

/// Configuration parameters for running bridged tests
pub struct RunParams {
    /// Resolved configuration snapshot
    pub config: Config,
    /// Where scripts and support files are read from
    pub store: Box<dyn ResourceStore>,
    /// Origin used by descriptors that don't name their own
    pub default_origin: Option<String>,
    /// Host assertion; `None` leaves the result to the caller
    pub assert: Option<AssertFn>,
}

impl RunParams {
    /// Create parameters with default configuration, an empty store, and a
    /// panicking assertion
    pub fn new() -> Self {
        RunParams {
            config: Config::default(),
            store: Box::new(EmbeddedStore::new()),
            default_origin: None,
            assert: Some(Box::new(panic_on_failure)),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: impl ResourceStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn default_origin(mut self, origin: impl Into<String>) -> Self {
        self.default_origin = Some(origin.into());
        self
    }

    /// Replace the host assertion
    pub fn assert_with<F>(mut self, func: F) -> Self
    where
        F: Fn(bool, &str) + 'static,
    {
        self.assert = Some(Box::new(func));
        self
    }

    /// Enable or disable the host assertion
    pub fn assert_on_failure(mut self, enabled: bool) -> Self {
        self.assert = if enabled {
            Some(Box::new(panic_on_failure))
        } else {
            None
        };
        self
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_on_failure(passed: bool, message: &str) {
    assert!(passed, "{}", message);
}
