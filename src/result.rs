//! Structured outcome of one bridged test

use std::fmt;

/// Counts reported by the external interpreter for one bridged test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    test_count: u32,
    assertion_count: u32,
    failure_count: u32,
    error_count: u32,
    raw_message: String,
}

impl TestResult {
    /// Create a result, or `None` when `test_count` is zero
    pub fn new(
        test_count: u32,
        assertion_count: u32,
        failure_count: u32,
        error_count: u32,
        raw_message: impl Into<String>,
    ) -> Option<Self> {
        if test_count == 0 {
            return None;
        }
        Some(TestResult {
            test_count,
            assertion_count,
            failure_count,
            error_count,
            raw_message: raw_message.into(),
        })
    }

    /// The losing result used when output cannot be interpreted
    pub(crate) fn fail_safe(raw_message: String) -> Self {
        TestResult {
            test_count: 1,
            assertion_count: 0,
            failure_count: 0,
            error_count: 1,
            raw_message,
        }
    }

    pub fn test_count(&self) -> u32 {
        self.test_count
    }

    pub fn assertion_count(&self) -> u32 {
        self.assertion_count
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Full interpreter output, or a diagnostic when it could not be parsed
    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    /// True when no failures and no errors were reported
    pub fn success(&self) -> bool {
        self.failure_count == 0 && self.error_count == 0
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests, {} assertions, {} failures, {} errors",
            self.test_count, self.assertion_count, self.failure_count, self.error_count
        )
    }
}
