//! # scriptbridge-rs
//!
//! A Rust crate for running test cases written for an external script
//! interpreter from ordinary Rust `#[test]` functions.
//!
//! Each bridged test copies its script and support files into a fresh
//! sandbox directory, runs the interpreter there, and reads the summary line
//! the interpreter prints (`3 tests, 5 assertions, 0 failures, 0 errors`)
//! into a [`TestResult`]. The sandbox is removed afterwards whatever the
//! outcome.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod parser;
pub mod report;
pub mod result;
pub mod run;
pub mod store;

pub use config::{Config, OutputStream};
pub use descriptor::{Descriptor, Registry, Resolution, SupportFile, TestDescriptor, Variant};
pub use error::{Error, Result};
pub use result::TestResult;
pub use run::{AssertFn, RunParams};
pub use store::{DirStore, EmbeddedStore, ResourceStore};

// Re-export for advanced users who need direct access
pub use run::{run_bridge, run_registered};

/// Builder for configuring and running one bridged test
///
/// This provides a fluent interface for attaching descriptors and running
/// the external test they describe.
///
/// # Examples
///
/// ```no_run
/// use scriptbridge_rs::{bridge, Config, DirStore, SupportFile, TestDescriptor};
///
/// // Inside a #[test] function
/// bridge::test("math_adds")
///     .descriptor(TestDescriptor::new("tests/math.js", "testAdd").unwrap())
///     .descriptor(SupportFile::new("fixtures/numbers.json", "data/numbers.json").unwrap())
///     .store(DirStore::new().origin("assets", "tests/assets"))
///     .origin("assets")
///     .config(Config::from_env())
///     .execute()
///     .unwrap();
/// ```
pub struct Builder {
    test: String,
    descriptors: Vec<Descriptor>,
    params: RunParams,
}

impl Builder {
    /// Create a new builder for the named calling test
    fn new(test: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            descriptors: Vec::new(),
            params: RunParams::new(),
        }
    }

    /// Attach a test or support-file descriptor
    ///
    /// Exactly one test descriptor must be attached; support files may be
    /// attached in any number.
    pub fn descriptor(mut self, descriptor: impl Into<Descriptor>) -> Self {
        self.descriptors.push(descriptor.into());
        self
    }

    /// Attach every descriptor registered for the test in `registry`
    pub fn registered(mut self, registry: &Registry) -> Self {
        self.descriptors
            .extend(registry.descriptors(&self.test).iter().cloned());
        self
    }

    /// Set the store scripts and support files are read from
    pub fn store(mut self, store: impl ResourceStore + 'static) -> Self {
        self.params = self.params.store(store);
        self
    }

    /// Set the origin used by descriptors that don't name their own
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.params = self.params.default_origin(origin);
        self
    }

    /// Set the configuration snapshot for this run
    pub fn config(mut self, config: Config) -> Self {
        self.params = self.params.config(config);
        self
    }

    /// Replace the host assertion called with the outcome
    pub fn assert_with<F>(mut self, func: F) -> Self
    where
        F: Fn(bool, &str) + 'static,
    {
        self.params = self.params.assert_with(func);
        self
    }

    /// Enable or disable panicking when the external test fails
    ///
    /// Enabled by default. When disabled, inspect the returned result.
    pub fn assert_on_failure(mut self, enabled: bool) -> Self {
        self.params = self.params.assert_on_failure(enabled);
        self
    }

    /// Run the external test
    ///
    /// # Returns
    /// The parsed result, or the fault that kept the test from running.
    pub fn execute(self) -> Result<TestResult> {
        run_bridge(&self.test, &self.descriptors, &self.params)
    }
}

/// Create a new bridge builder for the named calling test
///
/// This is the main entry point for running bridged tests.
///
/// # Examples
///
/// ```no_run
/// use scriptbridge_rs::{bridge, Registry};
///
/// let registry = Registry::load("tests/bridge.manifest").unwrap();
/// let result = bridge::test("math_adds")
///     .registered(&registry)
///     .assert_on_failure(false)
///     .execute()
///     .unwrap();
/// println!("{}", result);
/// ```
pub mod bridge {
    use super::*;

    /// Create a new bridge builder for the named calling test
    pub fn test(name: impl Into<String>) -> Builder {
        Builder::new(name)
    }
}
