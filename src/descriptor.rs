//! Descriptors naming an external test and the files it needs
//!
//! A bridged test is described by exactly one [`TestDescriptor`] plus any
//! number of [`SupportFile`]s. Descriptors are attached to a test either
//! directly through the builder or by test id in a [`Registry`].

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Kind of external test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Plain,
    /// Accepts the display-suppression flag
    Suppressible,
}

/// Identifies one external test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescriptor {
    script_locator: String,
    test_method_name: String,
    origin: Option<String>,
    variant: Variant,
}

impl TestDescriptor {
    /// Describe a plain external test
    pub fn new(
        script_locator: impl Into<String>,
        test_method_name: impl Into<String>,
    ) -> Result<Self> {
        Self::with_variant(script_locator, test_method_name, Variant::Plain)
    }

    /// Describe a test that supports display suppression
    pub fn suppressible(
        script_locator: impl Into<String>,
        test_method_name: impl Into<String>,
    ) -> Result<Self> {
        Self::with_variant(script_locator, test_method_name, Variant::Suppressible)
    }

    pub fn with_variant(
        script_locator: impl Into<String>,
        test_method_name: impl Into<String>,
        variant: Variant,
    ) -> Result<Self> {
        let script_locator = script_locator.into();
        let test_method_name = test_method_name.into();
        if script_locator.trim().is_empty() {
            return Err(Error::invalid_descriptor("script locator is empty"));
        }
        if test_method_name.trim().is_empty() {
            return Err(Error::invalid_descriptor("test method name is empty"));
        }
        Ok(TestDescriptor {
            script_locator,
            test_method_name,
            origin: None,
            variant,
        })
    }

    /// Set the origin the script is read from
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn script_locator(&self) -> &str {
        &self.script_locator
    }

    pub fn test_method_name(&self) -> &str {
        &self.test_method_name
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

/// A file copied into the sandbox before the test runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    source_locator: String,
    target_relative_path: String,
    origin: Option<String>,
}

impl SupportFile {
    pub fn new(
        source_locator: impl Into<String>,
        target_relative_path: impl Into<String>,
    ) -> Result<Self> {
        let source_locator = source_locator.into();
        let target_relative_path = target_relative_path.into();
        if source_locator.trim().is_empty() {
            return Err(Error::invalid_descriptor("support source locator is empty"));
        }
        if target_relative_path.trim().is_empty() {
            return Err(Error::invalid_descriptor("support target path is empty"));
        }
        Ok(SupportFile {
            source_locator,
            target_relative_path,
            origin: None,
        })
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn source_locator(&self) -> &str {
        &self.source_locator
    }

    /// Path relative to the sandbox root
    pub fn target_relative_path(&self) -> &str {
        &self.target_relative_path
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

/// One descriptor attached to a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Test(TestDescriptor),
    Support(SupportFile),
}

impl From<TestDescriptor> for Descriptor {
    fn from(descriptor: TestDescriptor) -> Self {
        Descriptor::Test(descriptor)
    }
}

impl From<SupportFile> for Descriptor {
    fn from(support: SupportFile) -> Self {
        Descriptor::Support(support)
    }
}

/// The descriptors that drive one bridged invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub test: TestDescriptor,
    pub supports: Vec<SupportFile>,
}

/// Pick the single test descriptor and collect support files in order
///
/// `test` names the caller in error messages.
pub fn resolve(test: &str, descriptors: &[Descriptor]) -> Result<Resolution> {
    let mut primary: Option<&TestDescriptor> = None;
    let mut supports = Vec::new();

    for descriptor in descriptors {
        match descriptor {
            Descriptor::Test(candidate) => {
                if let Some(existing) = primary {
                    return Err(Error::configuration(format!(
                        "'{}' has more than one test descriptor ('{}' and '{}'); only one external test can be bridged per invocation",
                        test,
                        existing.test_method_name(),
                        candidate.test_method_name()
                    )));
                }
                primary = Some(candidate);
            }
            Descriptor::Support(support) => supports.push(support.clone()),
        }
    }

    let test_descriptor = primary.ok_or_else(|| Error::MissingDescriptor {
        test: test.to_string(),
    })?;

    Ok(Resolution {
        test: test_descriptor.clone(),
        supports,
    })
}

/// Declarative table mapping test ids to their descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, Vec<Descriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a descriptor to a test id
    pub fn attach(mut self, test_id: &str, descriptor: impl Into<Descriptor>) -> Self {
        self.insert(test_id, descriptor);
        self
    }

    pub fn insert(&mut self, test_id: &str, descriptor: impl Into<Descriptor>) {
        self.entries
            .entry(test_id.to_string())
            .or_default()
            .push(descriptor.into());
    }

    /// Register a test id without attaching anything to it
    pub(crate) fn insert_section(&mut self, test_id: &str) {
        self.entries.entry(test_id.to_string()).or_default();
    }

    /// Whether the registry knows the test id
    pub fn contains(&self, test_id: &str) -> bool {
        self.entries.contains_key(test_id)
    }

    /// Registered test ids in sorted order
    pub fn test_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Descriptors attached to a test id, in declaration order
    pub fn descriptors(&self, test_id: &str) -> &[Descriptor] {
        self.entries
            .get(test_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve the descriptors attached to a test id
    pub fn resolve(&self, test_id: &str) -> Result<Resolution> {
        resolve(test_id, self.descriptors(test_id))
    }
}
